//! Persisted user settings and their mapping to [`DifficultyConfig`].
//!
//! Every value is clamped into its documented range at this boundary, both
//! after loading from disk and after applying command-line overrides, so the
//! game core only ever sees valid configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::app_dirs::AppDirs;
use crate::i18n::Language;
use crate::round::{normalize_letters, ALPHABET};
use crate::rules::GameKind;
use crate::session::{DifficultyConfig, HintTiming};

pub const COUNTING_MAX_OBJECTS: RangeInclusive<u32> = 1..=10;
pub const REVERSE_MAX_OBJECTS: RangeInclusive<u32> = 3..=10;
/// First-delay values; the top of the range means "never".
pub const HINT_FIRST_DELAY_SECS: RangeInclusive<u32> = 1..=11;
pub const HINT_NEVER: u32 = 11;
pub const HINT_REPEAT_DELAY_SECS: RangeInclusive<u32> = 3..=20;
pub const ANSWER_POINTER_DELAY_SECS: RangeInclusive<u32> = 5..=20;

fn clamp_to(value: u32, range: &RangeInclusive<u32>) -> u32 {
    value.clamp(*range.start(), *range.end())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CountingSettings {
    pub max_objects: u32,
    pub hint_first_delay_secs: u32,
    pub hint_repeat_delay_secs: u32,
    pub answer_pointer_enabled: bool,
    pub answer_pointer_delay_secs: u32,
}

impl Default for CountingSettings {
    fn default() -> Self {
        Self {
            max_objects: 5,
            hint_first_delay_secs: 5,
            hint_repeat_delay_secs: 10,
            answer_pointer_enabled: false,
            answer_pointer_delay_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReverseCountingSettings {
    pub max_objects: u32,
    pub dice_hint: bool,
    pub answer_pointer_enabled: bool,
    pub answer_pointer_delay_secs: u32,
}

impl Default for ReverseCountingSettings {
    fn default() -> Self {
        Self {
            max_objects: 5,
            dice_hint: false,
            answer_pointer_enabled: false,
            answer_pointer_delay_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LetterListeningSettings {
    /// Letters to draw from, e.g. `"ABCDE"`. Normalised on clamp.
    pub allowed_letters: String,
    pub answer_pointer_enabled: bool,
    pub answer_pointer_delay_secs: u32,
    pub coloring_reward: bool,
}

impl Default for LetterListeningSettings {
    fn default() -> Self {
        Self {
            allowed_letters: ALPHABET.iter().collect(),
            answer_pointer_enabled: false,
            answer_pointer_delay_secs: 10,
            coloring_reward: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub language: Language,
    pub counting: CountingSettings,
    pub reverse_counting: ReverseCountingSettings,
    pub letter_listening: LetterListeningSettings,
}

impl Settings {
    /// Every numeric value forced into its documented range; the letter pool
    /// upper-cased and de-duplicated.
    pub fn clamped(mut self) -> Self {
        let counting = &mut self.counting;
        counting.max_objects = clamp_to(counting.max_objects, &COUNTING_MAX_OBJECTS);
        counting.hint_first_delay_secs =
            clamp_to(counting.hint_first_delay_secs, &HINT_FIRST_DELAY_SECS);
        counting.hint_repeat_delay_secs =
            clamp_to(counting.hint_repeat_delay_secs, &HINT_REPEAT_DELAY_SECS);
        counting.answer_pointer_delay_secs =
            clamp_to(counting.answer_pointer_delay_secs, &ANSWER_POINTER_DELAY_SECS);

        let reverse = &mut self.reverse_counting;
        reverse.max_objects = clamp_to(reverse.max_objects, &REVERSE_MAX_OBJECTS);
        reverse.answer_pointer_delay_secs =
            clamp_to(reverse.answer_pointer_delay_secs, &ANSWER_POINTER_DELAY_SECS);

        let letters = &mut self.letter_listening;
        letters.allowed_letters = normalize_letters(letters.allowed_letters.chars())
            .into_iter()
            .collect();
        letters.answer_pointer_delay_secs =
            clamp_to(letters.answer_pointer_delay_secs, &ANSWER_POINTER_DELAY_SECS);

        self
    }

    pub fn hints_enabled(&self) -> bool {
        self.counting.hint_first_delay_secs < HINT_NEVER
    }

    /// Resolved configuration for one game. Callers should pass clamped
    /// settings.
    pub fn difficulty(&self, game: GameKind) -> DifficultyConfig {
        let pointer = |enabled: bool, secs: u32| {
            enabled.then(|| Duration::from_secs(u64::from(secs)))
        };

        match game {
            GameKind::Counting => DifficultyConfig {
                max_objects: self.counting.max_objects,
                hints: self.hints_enabled().then(|| HintTiming {
                    first_delay: Duration::from_secs(u64::from(self.counting.hint_first_delay_secs)),
                    repeat_delay: Duration::from_secs(u64::from(
                        self.counting.hint_repeat_delay_secs,
                    )),
                }),
                answer_pointer: pointer(
                    self.counting.answer_pointer_enabled,
                    self.counting.answer_pointer_delay_secs,
                ),
                ..DifficultyConfig::default()
            },
            GameKind::ReverseCounting => DifficultyConfig {
                max_objects: self.reverse_counting.max_objects,
                dice_hint: self.reverse_counting.dice_hint,
                answer_pointer: pointer(
                    self.reverse_counting.answer_pointer_enabled,
                    self.reverse_counting.answer_pointer_delay_secs,
                ),
                ..DifficultyConfig::default()
            },
            GameKind::LetterListening => DifficultyConfig {
                allowed_letters: self.letter_listening.allowed_letters.chars().collect(),
                coloring_reward: self.letter_listening.coloring_reward,
                answer_pointer: pointer(
                    self.letter_listening.answer_pointer_enabled,
                    self.letter_listening.answer_pointer_delay_secs,
                ),
                ..DifficultyConfig::default()
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not access settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait ConfigStore {
    fn try_load(&self) -> Result<Settings, ConfigError>;
    fn save(&self, settings: &Settings) -> Result<(), ConfigError>;

    /// Clamped settings, or defaults when the file is missing or unreadable.
    fn load(&self) -> Settings {
        match self.try_load() {
            Ok(settings) => settings.clamped(),
            Err(ConfigError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("no settings file, using defaults");
                Settings::default()
            }
            Err(err) => {
                warn!(%err, "ignoring settings file");
                Settings::default()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn try_load(&self) -> Result<Settings, ConfigError> {
        let bytes = fs::read(&self.path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, data)?;
        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let settings = Settings::default();
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let settings = Settings {
            language: Language::En,
            counting: CountingSettings {
                max_objects: 8,
                answer_pointer_enabled: true,
                ..CountingSettings::default()
            },
            ..Settings::default()
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert!(store.try_load().is_err());
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"{ not json").unwrap();
        let store = FileConfigStore::with_path(&path);
        assert!(matches!(store.try_load(), Err(ConfigError::Json(_))));
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn partial_file_fills_in_defaults_and_clamps() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            br#"{ "language": "en", "counting": { "max_objects": 42 } }"#,
        )
        .unwrap();
        let settings = FileConfigStore::with_path(&path).load();
        assert_eq!(settings.language, Language::En);
        assert_eq!(settings.counting.max_objects, 10);
        assert_eq!(settings.counting.hint_repeat_delay_secs, 10);
        assert_eq!(settings.reverse_counting, ReverseCountingSettings::default());
    }

    #[test]
    fn clamps_every_range() {
        let settings = Settings {
            counting: CountingSettings {
                max_objects: 0,
                hint_first_delay_secs: 99,
                hint_repeat_delay_secs: 1,
                answer_pointer_enabled: true,
                answer_pointer_delay_secs: 100,
            },
            reverse_counting: ReverseCountingSettings {
                max_objects: 1,
                answer_pointer_delay_secs: 0,
                ..ReverseCountingSettings::default()
            },
            letter_listening: LetterListeningSettings {
                allowed_letters: "aab c?d".into(),
                answer_pointer_delay_secs: 2,
                ..LetterListeningSettings::default()
            },
            ..Settings::default()
        }
        .clamped();

        assert_eq!(settings.counting.max_objects, 1);
        assert_eq!(settings.counting.hint_first_delay_secs, HINT_NEVER);
        assert_eq!(settings.counting.hint_repeat_delay_secs, 3);
        assert_eq!(settings.counting.answer_pointer_delay_secs, 20);
        assert_eq!(settings.reverse_counting.max_objects, 3);
        assert_eq!(settings.reverse_counting.answer_pointer_delay_secs, 5);
        assert_eq!(settings.letter_listening.allowed_letters, "ABCD");
        assert_eq!(settings.letter_listening.answer_pointer_delay_secs, 5);
    }

    #[test]
    fn hint_sentinel_disables_hints() {
        let mut settings = Settings::default();
        settings.counting.hint_first_delay_secs = HINT_NEVER;
        assert!(!settings.hints_enabled());
        assert_eq!(settings.difficulty(GameKind::Counting).hints, None);
    }

    #[test]
    fn defaults_map_to_difficulty() {
        let settings = Settings::default();

        let counting = settings.difficulty(GameKind::Counting);
        assert_eq!(counting.max_objects, 5);
        assert_eq!(
            counting.hints,
            Some(HintTiming {
                first_delay: Duration::from_secs(5),
                repeat_delay: Duration::from_secs(10),
            })
        );
        assert_eq!(counting.answer_pointer, None);

        let reverse = settings.difficulty(GameKind::ReverseCounting);
        assert_eq!(reverse.max_objects, 5);
        assert!(!reverse.dice_hint);
        assert_eq!(reverse.hints, None);

        let letters = settings.difficulty(GameKind::LetterListening);
        assert_eq!(letters.allowed_letters.len(), 26);
        assert!(letters.coloring_reward);
    }

    #[test]
    fn pointer_delay_maps_to_seconds() {
        let mut settings = Settings::default();
        settings.reverse_counting.answer_pointer_enabled = true;
        settings.reverse_counting.answer_pointer_delay_secs = 7;
        assert_eq!(
            settings.difficulty(GameKind::ReverseCounting).answer_pointer,
            Some(Duration::from_secs(7))
        );
    }
}
