//! Round generation for the three games.
//!
//! Every generator is a pure function of its arguments and the injected
//! [`RandomSource`]. Rounds are immutable once built; the session replaces
//! them wholesale when it advances.

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::random::{shuffle, shuffled, RandomSource};

/// Rounds per session, identical for every game.
pub const TOTAL_ROUNDS: usize = 8;
/// Letter options shown per letter round.
pub const LETTER_OPTIONS: usize = 5;
/// Choices shown per reverse-counting round.
pub const REVERSE_CHOICES: usize = 3;
/// Reverse counting needs at least this many candidate counts.
pub const REVERSE_MIN_OBJECTS: u32 = 3;

pub const ALPHABET: [char; 26] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Pictogram shown in the counting games.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ItemKind {
    FireTruck,
    PoliceCar,
    Ambulance,
    Boat,
    Plane,
}

impl ItemKind {
    pub const ALL: [ItemKind; 5] = [
        ItemKind::FireTruck,
        ItemKind::PoliceCar,
        ItemKind::Ambulance,
        ItemKind::Boat,
        ItemKind::Plane,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountingRound {
    pub round_index: usize,
    pub item: ItemKind,
    pub count: u32,
}

impl CountingRound {
    pub fn is_correct(&self, count: u32) -> bool {
        self.count == count
    }
}

/// Stable identifier of one displayed choice, unique within a session.
/// `generation` counts restarts, so ids from an earlier play-through never
/// match a later round with the same index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChoiceId {
    pub generation: u32,
    pub round_index: usize,
    pub slot: usize,
}

impl fmt::Display for ChoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "play-{}-round-{}-choice-{}",
            self.generation, self.round_index, self.slot
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: ChoiceId,
    pub item: ItemKind,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseCountingRound {
    pub round_index: usize,
    pub target_count: u32,
    pub choices: [Choice; REVERSE_CHOICES],
    pub correct_choice_id: ChoiceId,
}

impl ReverseCountingRound {
    pub fn is_correct(&self, choice_id: ChoiceId) -> bool {
        self.correct_choice_id == choice_id
    }

    pub fn choice(&self, choice_id: ChoiceId) -> Option<&Choice> {
        self.choices.iter().find(|choice| choice.id == choice_id)
    }

    pub fn correct_choice(&self) -> Option<&Choice> {
        self.choice(self.correct_choice_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterRound {
    pub round_index: usize,
    pub target_letter: char,
    pub options: [char; LETTER_OPTIONS],
}

impl LetterRound {
    /// Letters are compared case-insensitively.
    pub fn is_correct(&self, letter: char) -> bool {
        self.target_letter == letter.to_ascii_uppercase()
    }
}

/// A round of any game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Round {
    Counting(CountingRound),
    ReverseCounting(ReverseCountingRound),
    Letter(LetterRound),
}

impl Round {
    pub fn round_index(&self) -> usize {
        match self {
            Round::Counting(round) => round.round_index,
            Round::ReverseCounting(round) => round.round_index,
            Round::Letter(round) => round.round_index,
        }
    }
}

impl From<CountingRound> for Round {
    fn from(round: CountingRound) -> Self {
        Round::Counting(round)
    }
}

impl From<ReverseCountingRound> for Round {
    fn from(round: ReverseCountingRound) -> Self {
        Round::ReverseCounting(round)
    }
}

impl From<LetterRound> for Round {
    fn from(round: LetterRound) -> Self {
        Round::Letter(round)
    }
}

/// A player's candidate answer for any game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    Count(u32),
    Choice(ChoiceId),
    Letter(char),
}

impl From<u32> for Answer {
    fn from(count: u32) -> Self {
        Answer::Count(count)
    }
}

impl From<ChoiceId> for Answer {
    fn from(id: ChoiceId) -> Self {
        Answer::Choice(id)
    }
}

impl From<char> for Answer {
    fn from(letter: char) -> Self {
        Answer::Letter(letter)
    }
}

/// Structural check of `candidate` against the round's designated answer.
/// A candidate of the wrong kind is simply incorrect.
pub fn is_correct_answer(round: &Round, candidate: &Answer) -> bool {
    match (round, candidate) {
        (Round::Counting(round), Answer::Count(count)) => round.is_correct(*count),
        (Round::ReverseCounting(round), Answer::Choice(id)) => round.is_correct(*id),
        (Round::Letter(round), Answer::Letter(letter)) => round.is_correct(*letter),
        _ => false,
    }
}

pub fn create_counting_round<R: RandomSource + ?Sized>(
    round_index: usize,
    max_objects: u32,
    rng: &mut R,
) -> CountingRound {
    let max_objects = max_objects.max(1);
    let item = ItemKind::ALL[rng.index(ItemKind::ALL.len())];
    let count = rng.int_inclusive(1, max_objects);
    debug!(round_index, %item, count, "counting round");
    CountingRound {
        round_index,
        item,
        count,
    }
}

/// Two distractor counts, both `>= 1`, distinct from the target and from
/// each other.
fn distractor_counts<R: RandomSource + ?Sized>(
    target_count: u32,
    max_objects: u32,
    rng: &mut R,
) -> [u32; 2] {
    let available: Vec<u32> = (1..=max_objects)
        .filter(|value| *value != target_count)
        .collect();

    if available.len() >= 2 {
        let picked = shuffled(&available, rng);
        return [picked[0], picked[1]];
    }

    if target_count <= 1 {
        [target_count + 1, target_count + 2]
    } else if target_count == 2 {
        [1, 3]
    } else {
        [target_count - 1, target_count + 1]
    }
}

pub fn create_reverse_counting_round<R: RandomSource + ?Sized>(
    generation: u32,
    round_index: usize,
    max_objects: u32,
    rng: &mut R,
) -> ReverseCountingRound {
    let effective_max = max_objects.max(REVERSE_MIN_OBJECTS);
    let target_count = rng.int_inclusive(1, effective_max);
    let [distractor_a, distractor_b] = distractor_counts(target_count, effective_max, rng);
    let items = shuffled(&ItemKind::ALL, rng);

    let mut entries = [
        (items[0], target_count),
        (items[1], distractor_a),
        (items[2], distractor_b),
    ];
    shuffle(&mut entries, rng);

    let choices = [0, 1, 2].map(|slot| Choice {
        id: ChoiceId {
            generation,
            round_index,
            slot,
        },
        item: entries[slot].0,
        count: entries[slot].1,
    });
    let correct_slot = entries
        .iter()
        .position(|(_, count)| *count == target_count)
        .unwrap_or_default();

    debug!(
        generation,
        round_index,
        target_count,
        counts = ?choices.iter().map(|choice| choice.count).collect::<Vec<_>>(),
        "reverse counting round"
    );
    ReverseCountingRound {
        round_index,
        target_count,
        correct_choice_id: choices[correct_slot].id,
        choices,
    }
}

/// Upper-cases, keeps only `A-Z`, and removes duplicates (first occurrence
/// wins).
pub fn normalize_letters(letters: impl IntoIterator<Item = char>) -> Vec<char> {
    letters
        .into_iter()
        .map(|letter| letter.to_ascii_uppercase())
        .filter(char::is_ascii_uppercase)
        .unique()
        .collect()
}

/// The pool a letter round draws from: the normalised allowed letters, or
/// the full alphabet when fewer than [`LETTER_OPTIONS`] remain.
pub fn effective_letter_pool(allowed_letters: &[char]) -> Vec<char> {
    let pool = normalize_letters(allowed_letters.iter().copied());
    if pool.len() < LETTER_OPTIONS {
        ALPHABET.to_vec()
    } else {
        pool
    }
}

pub fn create_letter_round<R: RandomSource + ?Sized>(
    round_index: usize,
    allowed_letters: &[char],
    rng: &mut R,
) -> LetterRound {
    let pool = effective_letter_pool(allowed_letters);
    let target_letter = pool[rng.index(pool.len())];
    let remaining: Vec<char> = pool
        .iter()
        .copied()
        .filter(|letter| *letter != target_letter)
        .collect();
    let distractors = shuffled(&remaining, rng);

    let mut options = [target_letter; LETTER_OPTIONS];
    for (slot, letter) in options[1..].iter_mut().zip(distractors) {
        *slot = letter;
    }
    shuffle(&mut options, rng);

    debug!(round_index, %target_letter, ?options, "letter round");
    LetterRound {
        round_index,
        target_letter,
        options,
    }
}
