//! French and English text tables, embedded from `src/lang/*.json`.

use std::collections::HashMap;

use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::round::ItemKind;

static LANG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/lang");

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    #[default]
    Fr,
    En,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Fr, Language::En];

    /// Parses `fr`/`en`; anything else yields `fallback`.
    pub fn parse_or(candidate: Option<&str>, fallback: Language) -> Language {
        match candidate.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("fr") => Language::Fr,
            Some(value) if value.eq_ignore_ascii_case("en") => Language::En,
            _ => fallback,
        }
    }

    /// BCP 47 tag handed to speech engines.
    pub fn speech_tag(self) -> &'static str {
        match self {
            Language::Fr => "fr-FR",
            Language::En => "en-US",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Language::Fr => "FR",
            Language::En => "EN",
        }
    }

    pub fn toggled(self) -> Language {
        match self {
            Language::Fr => Language::En,
            Language::En => Language::Fr,
        }
    }
}

#[derive(Debug, Error)]
pub enum TextError {
    #[error("text table not found: {0}")]
    Missing(String),

    #[error("text table is not valid UTF-8: {0}")]
    Encoding(String),

    #[error("text table {file} is malformed: {source}")]
    Json {
        file: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameNames {
    pub counting: String,
    pub reverse_counting: String,
    pub letter_listening: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountingText {
    pub answer_label: String,
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReverseCountingText {
    pub answer_label: String,
    pub speech_prefix: String,
    pub replay_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LetterListeningText {
    pub instruction_label: String,
    pub coloring_instruction_label: String,
    pub speech_prefix: String,
    pub replay_label: String,
    pub answer_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommonText {
    pub bravo: String,
    pub result_title: String,
    pub perfect_result_message: String,
    pub continue_result_message: String,
    pub play_again_label: String,
    pub back_home_label: String,
    pub score_label: String,
    pub round_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemLabel {
    pub singular: String,
    pub plural: String,
}

/// Every user-facing string for one language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Texts {
    pub language: Language,
    pub home_title: String,
    pub available_games: String,
    pub game_names: GameNames,
    pub counting: CountingText,
    pub reverse_counting: ReverseCountingText,
    pub letter_listening: LetterListeningText,
    pub common: CommonText,
    pub items: HashMap<ItemKind, ItemLabel>,
    pub numbers: Vec<String>,
}

impl Texts {
    pub fn load(language: Language) -> Result<Self, TextError> {
        let file_name = format!("{language}.json");
        let file = LANG_DIR
            .get_file(&file_name)
            .ok_or_else(|| TextError::Missing(file_name.clone()))?;
        let contents = file
            .contents_utf8()
            .ok_or_else(|| TextError::Encoding(file_name.clone()))?;
        serde_json::from_str(contents).map_err(|source| TextError::Json {
            file: file_name,
            source,
        })
    }

    /// Spoken form of `value`; digits past the table.
    pub fn number_word(&self, value: u32) -> String {
        value
            .checked_sub(1)
            .and_then(|index| self.numbers.get(index as usize))
            .cloned()
            .unwrap_or_else(|| value.to_string())
    }

    pub fn item_label(&self, item: ItemKind, count: u32) -> String {
        match self.items.get(&item) {
            Some(label) if count > 1 => label.plural.clone(),
            Some(label) => label.singular.clone(),
            None => item.to_string(),
        }
    }

    /// "How many fire trucks?"
    pub fn count_question(&self, item: ItemKind) -> String {
        self.counting
            .question
            .replace("{item}", &self.item_label(item, 2))
    }

    pub fn counting_answer_label(&self, max_objects: u32) -> String {
        self.counting
            .answer_label
            .replace("{max}", &max_objects.to_string())
    }

    /// "3 boats"
    pub fn quantity(&self, item: ItemKind, count: u32) -> String {
        format!("{count} {}", self.item_label(item, count))
    }

    pub fn score_label(&self, score: usize, total: usize) -> String {
        self.common
            .score_label
            .replace("{score}", &score.to_string())
            .replace("{total}", &total.to_string())
    }

    pub fn round_label(&self, round: usize, total: usize) -> String {
        self.common
            .round_label
            .replace("{round}", &round.to_string())
            .replace("{total}", &total.to_string())
    }
}

/// Both languages, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Catalog {
    fr: Texts,
    en: Texts,
}

impl Catalog {
    pub fn load() -> Result<Self, TextError> {
        Ok(Self {
            fr: Texts::load(Language::Fr)?,
            en: Texts::load(Language::En)?,
        })
    }

    pub fn texts(&self, language: Language) -> &Texts {
        match language {
            Language::Fr => &self.fr,
            Language::En => &self.en,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_tables_load() {
        let catalog = Catalog::load().unwrap();
        assert_eq!(catalog.texts(Language::Fr).language, Language::Fr);
        assert_eq!(catalog.texts(Language::En).language, Language::En);
    }

    #[test]
    fn every_item_has_labels() {
        for language in Language::ALL {
            let texts = Texts::load(language).unwrap();
            for item in ItemKind::ALL {
                assert!(texts.items.contains_key(&item), "{language}: {item}");
            }
            assert_eq!(texts.numbers.len(), 10);
        }
    }

    #[test]
    fn number_words() {
        let texts = Texts::load(Language::Fr).unwrap();
        assert_eq!(texts.number_word(1), "un");
        assert_eq!(texts.number_word(10), "dix");
        assert_eq!(texts.number_word(0), "0");
        assert_eq!(texts.number_word(11), "11");
    }

    #[test]
    fn quantities_pick_singular_or_plural() {
        let texts = Texts::load(Language::En).unwrap();
        assert_eq!(texts.quantity(ItemKind::Boat, 1), "1 boat");
        assert_eq!(texts.quantity(ItemKind::Boat, 3), "3 boats");
        assert_eq!(texts.count_question(ItemKind::FireTruck), "How many fire trucks?");
    }

    #[test]
    fn french_templates() {
        let texts = Texts::load(Language::Fr).unwrap();
        assert_eq!(texts.count_question(ItemKind::Plane), "Combien de avions ?");
        assert_eq!(texts.score_label(6, 8), "6 sur 8");
        assert_eq!(texts.counting_answer_label(5), "Choisis un chiffre de 1 à 5");
    }

    #[test]
    fn speech_tags() {
        assert_eq!(Language::Fr.speech_tag(), "fr-FR");
        assert_eq!(Language::En.speech_tag(), "en-US");
        assert_eq!(Language::En.toggled(), Language::Fr);
    }

    #[test]
    fn parse_language_falls_back() {
        assert_eq!(Language::parse_or(Some("en"), Language::Fr), Language::En);
        assert_eq!(Language::parse_or(Some(" FR "), Language::En), Language::Fr);
        assert_eq!(Language::parse_or(Some("de"), Language::En), Language::En);
        assert_eq!(Language::parse_or(None, Language::Fr), Language::Fr);
        assert_eq!(Language::En.to_string(), "en");
    }
}
