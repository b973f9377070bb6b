use abagames::{
    app::{App, AppAction},
    app_dirs::AppDirs,
    config::{ConfigStore, FileConfigStore, Settings},
    i18n::{Catalog, Language},
    rules::GameKind,
    runtime::{AppEvent, CrosstermEventSource, Runner},
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const TICK_RATE_MS: u64 = 100;

/// counting and letter mini-games for early learners
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Small counting and letter games for early learners, with spoken prompts shown as captions, timed hints and a reward after every right answer."
)]
pub struct Cli {
    /// skip the home screen and start this game
    #[clap(short = 'g', long, value_enum)]
    game: Option<GameKind>,

    /// interface and speech language (fr or en)
    #[clap(short = 'l', long = "lang")]
    language: Option<String>,

    /// largest group size for both counting games
    #[clap(short = 'm', long)]
    max_objects: Option<u32>,

    /// letters the listening game draws from, e.g. "ABCDE"
    #[clap(long)]
    letters: Option<String>,

    /// seconds before the first counting hint (11 disables hints)
    #[clap(long)]
    hint_delay: Option<u32>,

    /// seconds between hint sequences
    #[clap(long)]
    hint_repeat: Option<u32>,

    /// show the answer pointer after this many seconds, in every game
    #[clap(long)]
    pointer_delay: Option<u32>,

    /// turn the answer pointer off in every game
    #[clap(long, conflicts_with = "pointer_delay")]
    no_pointer: bool,

    /// draw dice next to the number in "find the group"
    #[clap(long)]
    dice: bool,

    /// skip the colouring reward in the letter game
    #[clap(long)]
    no_coloring: bool,

    /// seed for reproducible rounds
    #[clap(long)]
    seed: Option<u64>,

    /// settings file to read (and write with --save)
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// persist the resulting settings
    #[clap(long)]
    save: bool,
}

impl Cli {
    /// Layers command-line overrides on top of stored settings.
    fn apply(&self, mut settings: Settings) -> Settings {
        settings.language = Language::parse_or(self.language.as_deref(), settings.language);

        if let Some(max) = self.max_objects {
            settings.counting.max_objects = max;
            settings.reverse_counting.max_objects = max;
        }
        if let Some(letters) = &self.letters {
            settings.letter_listening.allowed_letters = letters.clone();
        }
        if let Some(secs) = self.hint_delay {
            settings.counting.hint_first_delay_secs = secs;
        }
        if let Some(secs) = self.hint_repeat {
            settings.counting.hint_repeat_delay_secs = secs;
        }
        if let Some(secs) = self.pointer_delay {
            settings.counting.answer_pointer_enabled = true;
            settings.counting.answer_pointer_delay_secs = secs;
            settings.reverse_counting.answer_pointer_enabled = true;
            settings.reverse_counting.answer_pointer_delay_secs = secs;
            settings.letter_listening.answer_pointer_enabled = true;
            settings.letter_listening.answer_pointer_delay_secs = secs;
        }
        if self.no_pointer {
            settings.counting.answer_pointer_enabled = false;
            settings.reverse_counting.answer_pointer_enabled = false;
            settings.letter_listening.answer_pointer_enabled = false;
        }
        if self.dice {
            settings.reverse_counting.dice_hint = true;
        }
        if self.no_coloring {
            settings.letter_listening.coloring_reward = false;
        }

        settings.clamped()
    }

    fn store(&self) -> FileConfigStore {
        self.config
            .as_ref()
            .map(FileConfigStore::with_path)
            .unwrap_or_default()
    }
}

/// File-only logging; a TUI owns stderr. Returns `None` when no log
/// directory can be created.
fn setup_logging() -> Option<WorkerGuard> {
    let log_dir = AppDirs::log_dir()?;
    std::fs::create_dir_all(&log_dir).ok()?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "abagames.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .ok()?;

    info!(log_dir = %log_dir.display(), "logging initialized");
    Some(guard)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let _log_guard = setup_logging();

    let store = cli.store();
    let settings = cli.apply(store.load());
    if cli.save {
        if let Err(err) = store.save(&settings) {
            warn!(%err, path = %store.path().display(), "could not save settings");
        }
    }

    let catalog = Catalog::load()?;
    let mut app = App::new(catalog, settings, cli.seed);
    if let Some(kind) = cli.game {
        app.start_game(kind);
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("exiting");
    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );

    loop {
        let size = terminal.size()?;
        app.viewport = (size.width, size.height);
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            AppEvent::Tick(elapsed) => app.on_tick(elapsed),
            AppEvent::Resize => {}
            AppEvent::Key(key) => {
                if app.on_key(key) == AppAction::Quit {
                    break;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["abagames"]);
        assert_eq!(cli.game, None);
        assert_eq!(cli.language, None);
        assert!(!cli.no_pointer);
        assert!(!cli.save);
        assert_eq!(cli.apply(Settings::default()), Settings::default());
    }

    #[test]
    fn test_cli_game() {
        let cli = Cli::parse_from(["abagames", "-g", "reverse-counting"]);
        assert_eq!(cli.game, Some(GameKind::ReverseCounting));
        let cli = Cli::parse_from(["abagames", "--game", "letter-listening"]);
        assert_eq!(cli.game, Some(GameKind::LetterListening));
        assert!(Cli::try_parse_from(["abagames", "--game", "chess"]).is_err());
    }

    #[test]
    fn test_cli_language() {
        let cli = Cli::parse_from(["abagames", "--lang", "en"]);
        assert_eq!(cli.apply(Settings::default()).language, Language::En);

        let cli = Cli::parse_from(["abagames", "-l", "de"]);
        assert_eq!(cli.apply(Settings::default()).language, Language::Fr);
    }

    #[test]
    fn test_cli_max_objects_is_clamped_per_game() {
        let cli = Cli::parse_from(["abagames", "-m", "1"]);
        let settings = cli.apply(Settings::default());
        assert_eq!(settings.counting.max_objects, 1);
        assert_eq!(settings.reverse_counting.max_objects, 3);

        let cli = Cli::parse_from(["abagames", "--max-objects", "40"]);
        let settings = cli.apply(Settings::default());
        assert_eq!(settings.counting.max_objects, 10);
        assert_eq!(settings.reverse_counting.max_objects, 10);
    }

    #[test]
    fn test_cli_letters_are_normalized() {
        let cli = Cli::parse_from(["abagames", "--letters", "abca1"]);
        let settings = cli.apply(Settings::default());
        assert_eq!(settings.letter_listening.allowed_letters, "ABC");
    }

    #[test]
    fn test_cli_pointer_flags() {
        let cli = Cli::parse_from(["abagames", "--pointer-delay", "2"]);
        let settings = cli.apply(Settings::default());
        assert!(settings.counting.answer_pointer_enabled);
        assert!(settings.letter_listening.answer_pointer_enabled);
        assert_eq!(settings.reverse_counting.answer_pointer_delay_secs, 5);

        let mut stored = Settings::default();
        stored.counting.answer_pointer_enabled = true;
        let cli = Cli::parse_from(["abagames", "--no-pointer"]);
        assert!(!cli.apply(stored).counting.answer_pointer_enabled);

        assert!(
            Cli::try_parse_from(["abagames", "--no-pointer", "--pointer-delay", "6"]).is_err()
        );
    }

    #[test]
    fn test_cli_hint_delay_never() {
        let cli = Cli::parse_from(["abagames", "--hint-delay", "30"]);
        let settings = cli.apply(Settings::default());
        assert_eq!(settings.counting.hint_first_delay_secs, 11);
        assert!(!settings.hints_enabled());
    }

    #[test]
    fn test_cli_reward_toggles() {
        let cli = Cli::parse_from(["abagames", "--dice", "--no-coloring"]);
        let settings = cli.apply(Settings::default());
        assert!(settings.reverse_counting.dice_hint);
        assert!(!settings.letter_listening.coloring_reward);
    }

    #[test]
    fn test_cli_config_path() {
        let cli = Cli::parse_from(["abagames", "-c", "/tmp/abagames-test.json"]);
        assert_eq!(
            cli.store().path(),
            std::path::Path::new("/tmp/abagames-test.json")
        );
    }
}
