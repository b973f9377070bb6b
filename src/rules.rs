//! Per-game strategies plugged into [`GameSession`](crate::session::GameSession).
//!
//! The session owns the state machine; a [`GameRules`] implementation only
//! says how rounds are built and judged, what is spoken, and which optional
//! capabilities (hints, dice, colouring) the game supports.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cues::Cue;
use crate::i18n::Texts;
use crate::random::RandomSource;
use crate::round::{
    create_counting_round, create_letter_round, create_reverse_counting_round, Answer, ChoiceId,
    CountingRound, LetterRound, ReverseCountingRound, Round,
};
use crate::session::DifficultyConfig;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum GameKind {
    Counting,
    ReverseCounting,
    LetterListening,
}

impl GameKind {
    pub const ALL: [GameKind; 3] = [
        GameKind::Counting,
        GameKind::ReverseCounting,
        GameKind::LetterListening,
    ];

    pub fn title(self, texts: &Texts) -> &str {
        match self {
            GameKind::Counting => &texts.game_names.counting,
            GameKind::ReverseCounting => &texts.game_names.reverse_counting,
            GameKind::LetterListening => &texts.game_names.letter_listening,
        }
    }
}

pub trait GameRules {
    type Round: Clone + fmt::Debug + Into<Round>;
    type Answer: Copy + fmt::Debug + PartialEq + Into<Answer>;

    fn kind(&self) -> GameKind;

    /// `generation` is bumped on every restart and keys any answer ids the
    /// round hands out.
    fn create_round(
        &self,
        generation: u32,
        round_index: usize,
        config: &DifficultyConfig,
        rng: &mut dyn RandomSource,
    ) -> Self::Round;

    fn is_correct(&self, round: &Self::Round, answer: &Self::Answer) -> bool;

    /// The answer the pointer flags.
    fn correct_answer(&self, round: &Self::Round) -> Self::Answer;

    /// Narrows a generic answer to this game's answer type.
    fn answer_from(&self, answer: Answer) -> Option<Self::Answer>;

    /// Every answer the player can pick, in display order.
    fn answer_options(&self, round: &Self::Round, config: &DifficultyConfig) -> Vec<Self::Answer>;

    /// Item count of every group to lay out, in display order.
    fn layout_groups(&self, _round: &Self::Round) -> Vec<usize> {
        Vec::new()
    }

    /// Spoken once per round after [`GameRules::prompt_delay`], and on replay.
    fn prompt(&self, round: &Self::Round, texts: &Texts) -> Option<String>;

    fn prompt_delay(&self) -> Duration {
        Duration::from_millis(500)
    }

    /// Spoken right after any submitted answer.
    fn answer_echo(
        &self,
        _round: &Self::Round,
        _answer: &Self::Answer,
        _texts: &Texts,
    ) -> Option<String> {
        None
    }

    fn reward_cue(&self, round: &Self::Round) -> Cue;

    /// Wait between a correct answer and the reward cue.
    fn celebration_delay(&self) -> Duration {
        Duration::ZERO
    }

    /// Whether the reward cue comes with a spoken "bravo".
    fn speaks_bravo(&self) -> bool {
        false
    }

    /// Whether a correct answer waits for the presentation layer to report
    /// the reward interaction done before celebrating.
    fn awaits_reward(&self, _config: &DifficultyConfig) -> bool {
        false
    }

    fn supports_hints(&self) -> bool {
        false
    }

    /// How long the answer pointer stays up; `None` keeps it until the
    /// round ends.
    fn pointer_visible_for(&self) -> Option<Duration> {
        None
    }

    /// Target value shown as dice faces, when the config asks for it.
    fn dice_value(&self, _round: &Self::Round, _config: &DifficultyConfig) -> Option<u32> {
        None
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CountingGame;

impl GameRules for CountingGame {
    type Round = CountingRound;
    type Answer = u32;

    fn kind(&self) -> GameKind {
        GameKind::Counting
    }

    fn create_round(
        &self,
        _generation: u32,
        round_index: usize,
        config: &DifficultyConfig,
        rng: &mut dyn RandomSource,
    ) -> CountingRound {
        create_counting_round(round_index, config.max_objects, rng)
    }

    fn is_correct(&self, round: &CountingRound, answer: &u32) -> bool {
        round.is_correct(*answer)
    }

    fn correct_answer(&self, round: &CountingRound) -> u32 {
        round.count
    }

    fn answer_from(&self, answer: Answer) -> Option<u32> {
        match answer {
            Answer::Count(count) => Some(count),
            _ => None,
        }
    }

    fn answer_options(&self, _round: &CountingRound, config: &DifficultyConfig) -> Vec<u32> {
        (1..=config.max_objects.max(1)).collect()
    }

    fn layout_groups(&self, round: &CountingRound) -> Vec<usize> {
        vec![round.count as usize]
    }

    fn prompt(&self, round: &CountingRound, texts: &Texts) -> Option<String> {
        Some(texts.count_question(round.item))
    }

    fn reward_cue(&self, round: &CountingRound) -> Cue {
        Cue::Reward(round.item)
    }

    fn supports_hints(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReverseCountingGame;

impl GameRules for ReverseCountingGame {
    type Round = ReverseCountingRound;
    type Answer = ChoiceId;

    fn kind(&self) -> GameKind {
        GameKind::ReverseCounting
    }

    fn create_round(
        &self,
        generation: u32,
        round_index: usize,
        config: &DifficultyConfig,
        rng: &mut dyn RandomSource,
    ) -> ReverseCountingRound {
        create_reverse_counting_round(generation, round_index, config.max_objects, rng)
    }

    fn is_correct(&self, round: &ReverseCountingRound, answer: &ChoiceId) -> bool {
        round.is_correct(*answer)
    }

    fn correct_answer(&self, round: &ReverseCountingRound) -> ChoiceId {
        round.correct_choice_id
    }

    fn answer_from(&self, answer: Answer) -> Option<ChoiceId> {
        match answer {
            Answer::Choice(id) => Some(id),
            _ => None,
        }
    }

    fn answer_options(
        &self,
        round: &ReverseCountingRound,
        _config: &DifficultyConfig,
    ) -> Vec<ChoiceId> {
        round.choices.iter().map(|choice| choice.id).collect()
    }

    fn layout_groups(&self, round: &ReverseCountingRound) -> Vec<usize> {
        round
            .choices
            .iter()
            .map(|choice| choice.count as usize)
            .collect()
    }

    fn prompt(&self, round: &ReverseCountingRound, texts: &Texts) -> Option<String> {
        Some(format!(
            "{}{}",
            texts.reverse_counting.speech_prefix,
            texts.number_word(round.target_count)
        ))
    }

    fn prompt_delay(&self) -> Duration {
        Duration::from_millis(1000)
    }

    fn answer_echo(
        &self,
        round: &ReverseCountingRound,
        answer: &ChoiceId,
        texts: &Texts,
    ) -> Option<String> {
        round
            .choice(*answer)
            .map(|choice| texts.quantity(choice.item, choice.count))
    }

    fn reward_cue(&self, round: &ReverseCountingRound) -> Cue {
        let item = round
            .correct_choice()
            .map(|choice| choice.item)
            .unwrap_or(round.choices[0].item);
        Cue::Reward(item)
    }

    fn celebration_delay(&self) -> Duration {
        Duration::from_millis(900)
    }

    fn speaks_bravo(&self) -> bool {
        true
    }

    fn dice_value(&self, round: &ReverseCountingRound, config: &DifficultyConfig) -> Option<u32> {
        config.dice_hint.then_some(round.target_count)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LetterListeningGame;

impl GameRules for LetterListeningGame {
    type Round = LetterRound;
    type Answer = char;

    fn kind(&self) -> GameKind {
        GameKind::LetterListening
    }

    fn create_round(
        &self,
        _generation: u32,
        round_index: usize,
        config: &DifficultyConfig,
        rng: &mut dyn RandomSource,
    ) -> LetterRound {
        create_letter_round(round_index, &config.allowed_letters, rng)
    }

    fn is_correct(&self, round: &LetterRound, answer: &char) -> bool {
        round.is_correct(*answer)
    }

    fn correct_answer(&self, round: &LetterRound) -> char {
        round.target_letter
    }

    fn answer_from(&self, answer: Answer) -> Option<char> {
        match answer {
            Answer::Letter(letter) => Some(letter),
            _ => None,
        }
    }

    fn answer_options(&self, round: &LetterRound, _config: &DifficultyConfig) -> Vec<char> {
        round.options.to_vec()
    }

    fn prompt(&self, round: &LetterRound, texts: &Texts) -> Option<String> {
        Some(format!(
            "{}{}",
            texts.letter_listening.speech_prefix, round.target_letter
        ))
    }

    fn reward_cue(&self, _round: &LetterRound) -> Cue {
        Cue::SuccessJingle
    }

    fn awaits_reward(&self, config: &DifficultyConfig) -> bool {
        config.coloring_reward
    }

    fn pointer_visible_for(&self) -> Option<Duration> {
        Some(Duration::from_millis(4000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{Language, Texts};
    use crate::round::ItemKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config() -> DifficultyConfig {
        DifficultyConfig::default()
    }

    #[test]
    fn answers_narrow_to_their_game() {
        assert_eq!(CountingGame.answer_from(Answer::Count(3)), Some(3));
        assert_eq!(CountingGame.answer_from(Answer::Letter('A')), None);
        assert_eq!(LetterListeningGame.answer_from(Answer::Letter('b')), Some('b'));
        let id = ChoiceId {
            generation: 0,
            round_index: 0,
            slot: 1,
        };
        assert_eq!(ReverseCountingGame.answer_from(Answer::Choice(id)), Some(id));
        assert_eq!(ReverseCountingGame.answer_from(Answer::Count(1)), None);
    }

    #[test]
    fn counting_prompt_and_layout() {
        let texts = Texts::load(Language::En).unwrap();
        let round = CountingRound {
            round_index: 0,
            item: ItemKind::Boat,
            count: 4,
        };
        assert_eq!(CountingGame.layout_groups(&round), vec![4]);
        assert_eq!(
            CountingGame.answer_options(&round, &config()),
            vec![1, 2, 3, 4, 5]
        );
        assert_eq!(
            CountingGame.prompt(&round, &texts).as_deref(),
            Some("How many boats?")
        );
        assert_eq!(CountingGame.reward_cue(&round), Cue::Reward(ItemKind::Boat));
        assert!(CountingGame.supports_hints());
    }

    #[test]
    fn reverse_counting_echoes_choices() {
        let texts = Texts::load(Language::Fr).unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        let round = ReverseCountingGame.create_round(0, 2, &config(), &mut rng);
        let wrong = round
            .choices
            .iter()
            .find(|choice| choice.id != round.correct_choice_id)
            .unwrap();

        let echo = ReverseCountingGame
            .answer_echo(&round, &wrong.id, &texts)
            .unwrap();
        assert!(echo.starts_with(&wrong.count.to_string()));
        assert_eq!(
            ReverseCountingGame.prompt(&round, &texts).unwrap(),
            format!("Montre-moi {}", texts.number_word(round.target_count))
        );
        let correct_item = round.correct_choice().unwrap().item;
        assert_eq!(ReverseCountingGame.reward_cue(&round), Cue::Reward(correct_item));
        assert_eq!(ReverseCountingGame.layout_groups(&round).len(), 3);
    }

    #[test]
    fn dice_only_when_enabled() {
        let mut rng = StdRng::seed_from_u64(5);
        let round = ReverseCountingGame.create_round(0, 0, &config(), &mut rng);
        assert_eq!(ReverseCountingGame.dice_value(&round, &config()), None);
        let with_dice = DifficultyConfig {
            dice_hint: true,
            ..config()
        };
        assert_eq!(
            ReverseCountingGame.dice_value(&round, &with_dice),
            Some(round.target_count)
        );
    }

    #[test]
    fn letter_game_waits_for_colouring_only_when_enabled() {
        assert!(!LetterListeningGame.awaits_reward(&config()));
        let coloring = DifficultyConfig {
            coloring_reward: true,
            ..config()
        };
        assert!(LetterListeningGame.awaits_reward(&coloring));
        assert_eq!(
            LetterListeningGame.pointer_visible_for(),
            Some(Duration::from_millis(4000))
        );
    }

    #[test]
    fn game_kind_labels() {
        assert_eq!(GameKind::ReverseCounting.to_string(), "reverse-counting");
        let texts = Texts::load(Language::En).unwrap();
        assert_eq!(GameKind::Counting.title(&texts), "How many?");
    }
}
