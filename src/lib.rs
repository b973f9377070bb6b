// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app;
pub mod app_dirs;
pub mod celebration;
pub mod coloring;
pub mod config;
pub mod cues;
pub mod dice;
pub mod i18n;
pub mod layout;
pub mod random;
pub mod round;
pub mod rules;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod ui;
