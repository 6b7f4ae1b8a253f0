//! Activity state machines and the resolution contract they share.
//!
//! Every activity resolves at most one [`HistoryEntry`] per round. Activities
//! are synchronous: callers load content beforehand, pass it in, and schedule
//! whatever [`Schedule`] a transition asks for.

pub mod body_explorer;
pub mod mini_game;
pub mod reaction_test;
pub mod scratch_card;
pub mod spin_wheel;
pub mod strip_game;
pub mod tap_battle;
pub mod tic_tac_toe;
pub mod would_you_rather;

use std::time::Duration;

use thiserror::Error;

use crate::state::{
    game::{ActivityKind, Difficulty, HistoryEntry, Seat},
    session::GameSession,
};

use self::{
    body_explorer::BodyExplorer,
    mini_game::{MiniGameError, MiniGames},
    scratch_card::ScratchCards,
    spin_wheel::SpinWheel,
    strip_game::{StripGame, StripGameError, StripTimings},
    would_you_rather::WouldYouRather,
};

/// Dependency key of turn-scoped selections; a change in either part invalidates them.
pub type TurnKey = (Difficulty, Seat);

/// Current dependency key of the session.
pub fn turn_key(session: &GameSession) -> TurnKey {
    (session.difficulty(), session.current_turn())
}

/// Tunables of the activities, sourced from the application config.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivitySettings {
    /// Segments drawn onto the wheel.
    pub wheel_segments: usize,
    /// Cards dealt per deck.
    pub card_deck_size: usize,
    /// Strip-game timings.
    pub strip: StripTimings,
    /// Seconds of tapping.
    pub tap_battle_seconds: u32,
    /// Seconds of countdown before tapping starts.
    pub tap_battle_countdown: u32,
    /// Shortest wait before the reaction signal.
    pub reaction_min_delay: Duration,
    /// Longest wait before the reaction signal.
    pub reaction_max_delay: Duration,
}

impl Default for ActivitySettings {
    fn default() -> Self {
        Self {
            wheel_segments: 16,
            card_deck_size: 10,
            strip: StripTimings::default(),
            tap_battle_seconds: 10,
            tap_battle_countdown: 3,
            reaction_min_delay: Duration::from_millis(2000),
            reaction_max_delay: Duration::from_millis(5000),
        }
    }
}

/// Timer work requested by a transition, tagged with the generation it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Deliver one tick per second, `seconds` times.
    Countdown { generation: u64, seconds: u32 },
    /// Deliver one wake-up after the delay.
    After { generation: u64, delay: Duration },
}

/// Outcome of a resolving operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Record bound to the affected player.
    pub entry: HistoryEntry,
    /// False when the round was already resolved and this is a redisplay.
    pub fresh: bool,
}

impl Resolution {
    pub(crate) fn fresh(entry: HistoryEntry) -> Self {
        Self { entry, fresh: true }
    }

    pub(crate) fn replay(entry: HistoryEntry) -> Self {
        Self {
            entry,
            fresh: false,
        }
    }
}

/// User acknowledgement of a presented record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acknowledgement {
    /// The task was performed.
    Complete,
    /// The round was passed on.
    Skip,
}

/// What the session must do after an acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AfterAck {
    /// Hand the turn to the other seat.
    pub switch_turn: bool,
    /// Leave the activity and return to the picker.
    pub leave: bool,
}

/// Rejected activity operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActivityError {
    #[error("no eligible content for {0}")]
    NoEligibleContent(ActivityKind),
    #[error("operation not supported by {actual}, expected {expected}")]
    WrongActivity {
        expected: ActivityKind,
        actual: ActivityKind,
    },
    #[error("{0} has no acknowledgement step")]
    NoAcknowledgement(ActivityKind),
    #[error("nothing has been resolved yet")]
    NothingToComplete,
    #[error("card {0} does not exist")]
    CardOutOfRange(usize),
    #[error("card {0} has already been scratched")]
    CardScratched(usize),
    #[error("card {0} is revealed and must be acknowledged first")]
    CardPending(usize),
    #[error(transparent)]
    MiniGame(#[from] MiniGameError),
    #[error(transparent)]
    Strip(#[from] StripGameError),
}

/// Live state of the activity currently on screen.
#[derive(Debug)]
pub enum ActivityInstance {
    /// See [`SpinWheel`].
    SpinWheel(SpinWheel),
    /// See [`ScratchCards`].
    ScratchCard(ScratchCards),
    /// See [`BodyExplorer`].
    BodyExplorer(BodyExplorer),
    /// See [`WouldYouRather`].
    WouldYouRather(WouldYouRather),
    /// See [`MiniGames`].
    MiniGame(MiniGames),
    /// See [`StripGame`].
    StripGame(StripGame),
}

impl ActivityInstance {
    /// Fresh activity state for `kind`.
    pub fn enter(kind: ActivityKind, session: &GameSession, settings: &ActivitySettings) -> Self {
        match kind {
            ActivityKind::SpinWheel => Self::SpinWheel(SpinWheel::new(settings.wheel_segments)),
            ActivityKind::ScratchCard => {
                Self::ScratchCard(ScratchCards::new(settings.card_deck_size))
            }
            ActivityKind::BodyExplorer => Self::BodyExplorer(BodyExplorer::new()),
            ActivityKind::WouldYouRather => Self::WouldYouRather(WouldYouRather::new()),
            ActivityKind::MiniGame => Self::MiniGame(MiniGames::new(settings.clone())),
            ActivityKind::StripGame => Self::StripGame(StripGame::new(
                [
                    session.players()[0].gender,
                    session.players()[1].gender,
                ],
                settings.strip.clone(),
            )),
        }
    }

    /// Activity tag.
    pub fn kind(&self) -> ActivityKind {
        match self {
            Self::SpinWheel(_) => ActivityKind::SpinWheel,
            Self::ScratchCard(_) => ActivityKind::ScratchCard,
            Self::BodyExplorer(_) => ActivityKind::BodyExplorer,
            Self::WouldYouRather(_) => ActivityKind::WouldYouRather,
            Self::MiniGame(_) => ActivityKind::MiniGame,
            Self::StripGame(_) => ActivityKind::StripGame,
        }
    }

    /// Acknowledge the presented record.
    pub fn acknowledge(
        &mut self,
        session: &GameSession,
        ack: Acknowledgement,
    ) -> Result<AfterAck, ActivityError> {
        let turn_based = self.kind().is_turn_based();
        let leave = match self {
            Self::SpinWheel(wheel) => wheel.acknowledge(session, ack)?,
            Self::ScratchCard(cards) => cards.acknowledge(session, ack)?,
            Self::BodyExplorer(explorer) => explorer.acknowledge(session, ack)?,
            Self::WouldYouRather(quiz) => quiz.acknowledge(session, ack)?,
            Self::MiniGame(games) => games.acknowledge(ack)?,
            Self::StripGame(_) => {
                return Err(ActivityError::NoAcknowledgement(ActivityKind::StripGame));
            }
        };
        Ok(AfterAck {
            switch_turn: turn_based,
            leave,
        })
    }

    /// Resolved record currently presented, if any.
    pub fn presented(&self, session: &GameSession) -> Option<&HistoryEntry> {
        match self {
            Self::SpinWheel(wheel) => wheel.landed(session),
            Self::ScratchCard(cards) => cards.revealed(session),
            Self::BodyExplorer(explorer) => explorer.current(session).map(|found| &found.entry),
            Self::WouldYouRather(quiz) => quiz.answered(session),
            Self::MiniGame(games) => games.resolved(),
            Self::StripGame(_) => None,
        }
    }
}
