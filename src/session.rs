//! The per-round interaction state machine shared by every game.
//!
//! A [`GameSession`] owns its round, score, feedback and lock state, plus a
//! [`TimerRegistry`] holding every delayed transition (feedback clear,
//! celebration, round advance, hint steps, answer pointer, spoken prompt).
//! Time only moves through [`GameSession::tick`], so the whole machine is
//! deterministic under test.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cues::{AudioCuePlayer, Speaker};
use crate::dice::dice_faces;
use crate::i18n::Texts;
use crate::layout::{hint_order, place_items, ItemPlacement};
use crate::random::RandomSource;
use crate::round::{Answer, Round, TOTAL_ROUNDS};
use crate::rules::{GameKind, GameRules};
use crate::scheduler::TimerRegistry;

/// How long the reward cue plays before the next round.
pub const REWARD_DURATION: Duration = Duration::from_millis(5000);
/// How long a wrong answer stays flagged.
pub const WRONG_FEEDBACK_DURATION: Duration = Duration::from_millis(700);
/// Gap between two highlighted items in a hint sequence.
pub const HINT_STEP_INTERVAL: Duration = Duration::from_millis(1000);
/// Wait between a completed colouring and the celebration.
pub const REWARD_COMPLETE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintTiming {
    pub first_delay: Duration,
    pub repeat_delay: Duration,
}

impl Default for HintTiming {
    fn default() -> Self {
        Self {
            first_delay: Duration::from_secs(5),
            repeat_delay: Duration::from_secs(10),
        }
    }
}

/// Resolved per-game difficulty, snapshotted when a session starts.
/// Values are expected to be clamped already; the session only guards
/// against `max_objects == 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyConfig {
    pub max_objects: u32,
    /// Empty (or fewer than five letters) means the whole alphabet.
    pub allowed_letters: Vec<char>,
    /// `None` disables the hint sequence.
    pub hints: Option<HintTiming>,
    /// Idle time before the answer pointer shows; `None` disables it.
    pub answer_pointer: Option<Duration>,
    pub dice_hint: bool,
    pub coloring_reward: bool,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            max_objects: 5,
            allowed_letters: Vec::new(),
            hints: None,
            answer_pointer: None,
            dice_hint: false,
            coloring_reward: false,
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Feedback {
    #[default]
    Idle,
    Correct,
    Wrong,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState<R> {
    pub round_index: usize,
    pub round: R,
    pub score: usize,
    pub feedback: Feedback,
    pub is_locked: bool,
}

impl<R> SessionState<R> {
    pub fn is_finished(&self) -> bool {
        self.round_index >= TOTAL_ROUNDS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    ClearFeedback,
    Celebrate,
    AdvanceRound,
    HintStep(usize),
    HintRest,
    ShowPointer,
    HidePointer,
    SpeakPrompt,
}

impl TimerAction {
    pub fn is_hint(&self) -> bool {
        matches!(self, TimerAction::HintStep(_) | TimerAction::HintRest)
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, TimerAction::ShowPointer | TimerAction::HidePointer)
    }
}

/// Notifications for the presentation layer, drained after each call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    RoundStarted { round_index: usize },
    AnswerEvaluated { round_index: usize, correct: bool },
    FeedbackCleared { round_index: usize },
    PromptSpoken { round_index: usize },
    HintHighlighted { round_index: usize, step: usize, item: usize },
    HintCleared { round_index: usize },
    PointerShown { round_index: usize },
    PointerHidden { round_index: usize },
    RewardRequested { round_index: usize },
    Celebrated { round_index: usize },
    Finished { score: usize },
    Restarted,
}

impl SessionEvent {
    pub fn round_index(&self) -> Option<usize> {
        match self {
            SessionEvent::RoundStarted { round_index }
            | SessionEvent::AnswerEvaluated { round_index, .. }
            | SessionEvent::FeedbackCleared { round_index }
            | SessionEvent::PromptSpoken { round_index }
            | SessionEvent::HintHighlighted { round_index, .. }
            | SessionEvent::HintCleared { round_index }
            | SessionEvent::PointerShown { round_index }
            | SessionEvent::PointerHidden { round_index }
            | SessionEvent::RewardRequested { round_index }
            | SessionEvent::Celebrated { round_index } => Some(*round_index),
            SessionEvent::Finished { .. } | SessionEvent::Restarted => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Locked, finished, or an answer of the wrong kind.
    Ignored,
    Correct,
    Wrong,
}

/// Everything a renderer needs, independent of the game type.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub game: GameKind,
    pub round_index: usize,
    pub total_rounds: usize,
    pub round: Round,
    pub score: usize,
    pub feedback: Feedback,
    pub is_locked: bool,
    pub finished: bool,
    /// One placement list per group, in display order.
    pub placements: Vec<Vec<ItemPlacement>>,
    /// Index into `placements[0]` of the item the hint points at.
    pub hint_highlight: Option<usize>,
    /// Answers the player can pick, in display order.
    pub options: Vec<Answer>,
    /// The correct answer, while the pointer is visible.
    pub pointer: Option<Answer>,
    pub awaiting_reward: bool,
    pub dice: Option<Vec<u8>>,
}

impl SessionView {
    pub fn is_perfect(&self) -> bool {
        self.finished && self.score == self.total_rounds
    }
}

pub struct GameSession<G: GameRules> {
    rules: G,
    config: DifficultyConfig,
    texts: Texts,
    rng: Box<dyn RandomSource>,
    speaker: Box<dyn Speaker>,
    audio: Box<dyn AudioCuePlayer>,
    state: SessionState<G::Round>,
    generation: u32,
    placements: Vec<Vec<ItemPlacement>>,
    hint_order: Vec<usize>,
    hint_highlight: Option<usize>,
    pointer_visible: bool,
    awaiting_reward: bool,
    timers: TimerRegistry<TimerAction>,
    events: Vec<SessionEvent>,
}

impl<G: GameRules> GameSession<G> {
    pub fn new(
        rules: G,
        config: DifficultyConfig,
        texts: Texts,
        mut rng: Box<dyn RandomSource>,
        speaker: Box<dyn Speaker>,
        audio: Box<dyn AudioCuePlayer>,
    ) -> Self {
        let round = rules.create_round(0, 0, &config, rng.as_mut());
        info!(game = %rules.kind(), language = %texts.language, "session started");

        let mut session = Self {
            rules,
            config,
            texts,
            rng,
            speaker,
            audio,
            state: SessionState {
                round_index: 0,
                round,
                score: 0,
                feedback: Feedback::Idle,
                is_locked: false,
            },
            generation: 0,
            placements: Vec::new(),
            hint_order: Vec::new(),
            hint_highlight: None,
            pointer_visible: false,
            awaiting_reward: false,
            timers: TimerRegistry::new(),
            events: Vec::new(),
        };
        session.enter_round();
        session
    }

    pub fn rules(&self) -> &G {
        &self.rules
    }

    pub fn config(&self) -> &DifficultyConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState<G::Round> {
        &self.state
    }

    pub fn placements(&self) -> &[Vec<ItemPlacement>] {
        &self.placements
    }

    pub fn hint_highlight(&self) -> Option<usize> {
        self.hint_highlight
    }

    pub fn is_pointer_visible(&self) -> bool {
        self.pointer_visible
    }

    pub fn is_awaiting_reward(&self) -> bool {
        self.awaiting_reward
    }

    /// Elapsed time on the session clock.
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn has_pending(&self, predicate: impl FnMut(&TimerAction) -> bool) -> bool {
        self.timers.is_pending(predicate)
    }

    /// Round indices of every pending timer.
    pub fn pending_timer_rounds(&self) -> Vec<usize> {
        self.timers.rounds_pending().collect()
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn submit_answer(&mut self, answer: G::Answer) -> SubmitOutcome {
        let round_index = self.state.round_index;
        if self.state.is_locked || self.state.is_finished() {
            debug!(round_index, ?answer, "answer ignored");
            return SubmitOutcome::Ignored;
        }

        if let Some(echo) = self.rules.answer_echo(&self.state.round, &answer, &self.texts) {
            self.speak(&echo);
        }

        let correct = self.rules.is_correct(&self.state.round, &answer);
        debug!(round_index, ?answer, correct, "answer submitted");
        self.events.push(SessionEvent::AnswerEvaluated {
            round_index,
            correct,
        });

        if !correct {
            self.state.feedback = Feedback::Wrong;
            self.timers
                .cancel_where(|action| *action == TimerAction::ClearFeedback);
            self.schedule(WRONG_FEEDBACK_DURATION, TimerAction::ClearFeedback);
            self.arm_hints();
            self.arm_pointer();
            return SubmitOutcome::Wrong;
        }

        self.state.feedback = Feedback::Correct;
        self.state.score += 1;
        self.state.is_locked = true;
        self.hint_highlight = None;
        self.pointer_visible = false;
        self.timers.cancel_all();

        if self.rules.awaits_reward(&self.config) {
            self.awaiting_reward = true;
            self.events.push(SessionEvent::RewardRequested { round_index });
        } else {
            let delay = self.rules.celebration_delay();
            if delay.is_zero() {
                self.celebrate();
            } else {
                self.schedule(delay, TimerAction::Celebrate);
            }
        }
        SubmitOutcome::Correct
    }

    /// Reports the reward interaction (letter colouring) as done. Returns
    /// `false` if no reward was pending.
    pub fn complete_reward(&mut self) -> bool {
        if !self.awaiting_reward {
            return false;
        }
        self.awaiting_reward = false;
        self.schedule(REWARD_COMPLETE_DELAY, TimerAction::Celebrate);
        true
    }

    /// Speaks the round prompt again. Ignored while locked or finished.
    pub fn replay_prompt(&mut self) -> bool {
        if self.state.is_locked || self.state.is_finished() {
            return false;
        }
        self.timers
            .cancel_where(|action| *action == TimerAction::SpeakPrompt);
        self.speak_prompt();
        true
    }

    /// Back to round 0 with a zero score, from any state.
    pub fn restart(&mut self) {
        let cancelled = self.timers.cancel_all();
        self.speaker.stop();
        self.audio.stop_all();
        self.generation = self.generation.wrapping_add(1);
        info!(
            game = %self.rules.kind(),
            cancelled,
            generation = self.generation,
            "session restarted"
        );

        self.state.round_index = 0;
        self.state.round = self
            .rules
            .create_round(self.generation, 0, &self.config, self.rng.as_mut());
        self.state.score = 0;
        self.events.push(SessionEvent::Restarted);
        self.enter_round();
    }

    /// Moves the session clock forward, firing every timer that comes due,
    /// in deadline order. Timers scheduled by a firing timer fire within the
    /// same call if they fall inside the window.
    pub fn tick(&mut self, elapsed: Duration) {
        let horizon = self.timers.now() + elapsed;
        while let Some(expired) = self.timers.pop_due(horizon) {
            if expired.round_index != self.state.round_index {
                warn!(
                    timer_round = expired.round_index,
                    round_index = self.state.round_index,
                    action = ?expired.action,
                    "dropping stale timer"
                );
                continue;
            }
            debug!(round_index = expired.round_index, action = ?expired.action, "timer fired");
            self.fire(expired.action);
        }
        self.timers.advance_to(horizon);
    }

    pub fn view(&self) -> SessionView {
        let pointer = self
            .pointer_visible
            .then(|| self.rules.correct_answer(&self.state.round).into());
        SessionView {
            game: self.rules.kind(),
            round_index: self.state.round_index,
            total_rounds: TOTAL_ROUNDS,
            round: self.state.round.clone().into(),
            score: self.state.score,
            feedback: self.state.feedback,
            is_locked: self.state.is_locked,
            finished: self.state.is_finished(),
            placements: self.placements.clone(),
            hint_highlight: self.hint_highlight,
            options: self
                .rules
                .answer_options(&self.state.round, &self.config)
                .into_iter()
                .map(Into::into)
                .collect(),
            pointer,
            awaiting_reward: self.awaiting_reward,
            dice: self
                .rules
                .dice_value(&self.state.round, &self.config)
                .map(dice_faces),
        }
    }

    fn fire(&mut self, action: TimerAction) {
        let round_index = self.state.round_index;
        match action {
            TimerAction::ClearFeedback => {
                if self.state.feedback == Feedback::Wrong {
                    self.state.feedback = Feedback::Idle;
                    self.events.push(SessionEvent::FeedbackCleared { round_index });
                }
            }
            TimerAction::Celebrate => self.celebrate(),
            TimerAction::AdvanceRound => self.advance_round(),
            TimerAction::HintStep(step) => self.hint_step(step),
            TimerAction::HintRest => {
                self.hint_highlight = None;
                self.events.push(SessionEvent::HintCleared { round_index });
                if let Some(hints) = self.config.hints {
                    self.schedule(hints.repeat_delay, TimerAction::HintStep(0));
                }
            }
            TimerAction::ShowPointer => {
                self.pointer_visible = true;
                self.events.push(SessionEvent::PointerShown { round_index });
                if let Some(visible_for) = self.rules.pointer_visible_for() {
                    self.schedule(visible_for, TimerAction::HidePointer);
                }
            }
            TimerAction::HidePointer => {
                self.pointer_visible = false;
                self.events.push(SessionEvent::PointerHidden { round_index });
            }
            TimerAction::SpeakPrompt => self.speak_prompt(),
        }
    }

    fn celebrate(&mut self) {
        let round_index = self.state.round_index;
        let cue = self.rules.reward_cue(&self.state.round);
        self.audio.play(cue);
        if self.rules.speaks_bravo() {
            let bravo = self.texts.common.bravo.clone();
            self.speak(&bravo);
        }
        debug!(round_index, %cue, "celebrating");
        self.events.push(SessionEvent::Celebrated { round_index });
        self.schedule(REWARD_DURATION, TimerAction::AdvanceRound);
    }

    fn advance_round(&mut self) {
        self.state.round_index += 1;
        let round_index = self.state.round_index;
        self.timers.cancel_stale(round_index);

        if self.state.is_finished() {
            self.state.feedback = Feedback::Idle;
            self.state.is_locked = false;
            self.hint_highlight = None;
            self.pointer_visible = false;
            self.awaiting_reward = false;
            info!(game = %self.rules.kind(), score = self.state.score, "session finished");
            self.events.push(SessionEvent::Finished {
                score: self.state.score,
            });
            return;
        }

        self.state.round = self
            .rules
            .create_round(self.generation, round_index, &self.config, self.rng.as_mut());
        self.enter_round();
    }

    /// Resets per-round state for the current round and arms its timers.
    fn enter_round(&mut self) {
        let round_index = self.state.round_index;
        self.state.feedback = Feedback::Idle;
        self.state.is_locked = false;
        self.awaiting_reward = false;
        self.pointer_visible = false;
        self.hint_highlight = None;

        self.placements = self
            .rules
            .layout_groups(&self.state.round)
            .into_iter()
            .map(|count| place_items(count, self.rng.as_mut()))
            .collect();
        self.hint_order = self
            .placements
            .first()
            .map(|group| hint_order(group))
            .unwrap_or_default();

        self.events.push(SessionEvent::RoundStarted { round_index });
        if self.rules.prompt(&self.state.round, &self.texts).is_some() {
            self.schedule(self.rules.prompt_delay(), TimerAction::SpeakPrompt);
        }
        self.arm_hints();
        self.arm_pointer();
    }

    fn arm_hints(&mut self) {
        self.timers.cancel_where(TimerAction::is_hint);
        self.hint_highlight = None;
        if !self.rules.supports_hints() || self.hint_order.is_empty() {
            return;
        }
        if let Some(hints) = self.config.hints {
            self.schedule(hints.first_delay, TimerAction::HintStep(0));
        }
    }

    fn arm_pointer(&mut self) {
        self.timers.cancel_where(TimerAction::is_pointer);
        self.pointer_visible = false;
        if let Some(delay) = self.config.answer_pointer {
            self.schedule(delay, TimerAction::ShowPointer);
        }
    }

    fn hint_step(&mut self, step: usize) {
        let Some(item) = self.hint_order.get(step).copied() else {
            return;
        };
        let round_index = self.state.round_index;
        self.hint_highlight = Some(item);
        let word = self.texts.number_word(step as u32 + 1);
        self.speak(&word);
        self.events.push(SessionEvent::HintHighlighted {
            round_index,
            step,
            item,
        });

        let next = if step + 1 < self.hint_order.len() {
            TimerAction::HintStep(step + 1)
        } else {
            TimerAction::HintRest
        };
        self.schedule(HINT_STEP_INTERVAL, next);
    }

    fn speak_prompt(&mut self) {
        if let Some(prompt) = self.rules.prompt(&self.state.round, &self.texts) {
            self.speak(&prompt);
            self.events.push(SessionEvent::PromptSpoken {
                round_index: self.state.round_index,
            });
        }
    }

    fn speak(&mut self, text: &str) {
        self.speaker.speak(text, self.texts.language);
    }

    fn schedule(&mut self, delay: Duration, action: TimerAction) {
        self.timers
            .schedule(delay, self.state.round_index, action);
    }
}

impl<G: GameRules> Drop for GameSession<G> {
    fn drop(&mut self) {
        let cancelled = self.timers.cancel_all();
        self.speaker.stop();
        self.audio.stop_all();
        debug!(cancelled, "session torn down");
    }
}

/// Object-safe handle over any [`GameSession`], for front ends that switch
/// games at runtime.
pub trait SessionControl {
    fn kind(&self) -> GameKind;
    fn submit(&mut self, answer: Answer) -> SubmitOutcome;
    fn tick(&mut self, elapsed: Duration);
    fn restart(&mut self);
    fn replay_prompt(&mut self) -> bool;
    fn complete_reward(&mut self) -> bool;
    fn view(&self) -> SessionView;
    fn drain_events(&mut self) -> Vec<SessionEvent>;
}

impl<G: GameRules> SessionControl for GameSession<G> {
    fn kind(&self) -> GameKind {
        self.rules.kind()
    }

    fn submit(&mut self, answer: Answer) -> SubmitOutcome {
        match self.rules.answer_from(answer) {
            Some(answer) => self.submit_answer(answer),
            None => {
                warn!(game = %self.rules.kind(), ?answer, "answer of the wrong kind");
                SubmitOutcome::Ignored
            }
        }
    }

    fn tick(&mut self, elapsed: Duration) {
        GameSession::tick(self, elapsed)
    }

    fn restart(&mut self) {
        GameSession::restart(self)
    }

    fn replay_prompt(&mut self) -> bool {
        GameSession::replay_prompt(self)
    }

    fn complete_reward(&mut self) -> bool {
        GameSession::complete_reward(self)
    }

    fn view(&self) -> SessionView {
        GameSession::view(self)
    }

    fn drain_events(&mut self) -> Vec<SessionEvent> {
        GameSession::drain_events(self)
    }
}
