use std::time::Instant;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::state::{
    activities::{
        Acknowledgement, ActivityError, ActivitySettings, Resolution, Schedule,
        reaction_test::ReactionTest, tap_battle::TapBattle, tic_tac_toe::TicTacToe,
    },
    game::{ActivityKind, HistoryEntry, Seat},
    selection::ContentPool,
    session::GameSession,
};

/// Rejected mini-game input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MiniGameError {
    #[error("no mini-game selected")]
    NoGameSelected,
    #[error("the selected mini-game is not {0}")]
    WrongGame(MiniGameKind),
    #[error("the game has already started")]
    AlreadyStarted,
    #[error("the game is not accepting input right now")]
    NotAcceptingInput,
    #[error("it is not seat {}'s turn", .0.index())]
    NotYourTurn(Seat),
    #[error("cell {0} does not exist")]
    CellOutOfRange(usize),
    #[error("cell {0} is already taken")]
    CellTaken(usize),
    #[error("the game has no loser yet")]
    NotFinished,
    #[error("the previous result must be acknowledged first")]
    ResultPending,
}

/// Games offered by the mini-game selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum MiniGameKind {
    /// See [`TapBattle`].
    TapBattle,
    /// See [`ReactionTest`].
    ReactionTest,
    /// See [`TicTacToe`].
    TicTacToe,
}

impl MiniGameKind {
    /// Wire identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            MiniGameKind::TapBattle => "tap-battle",
            MiniGameKind::ReactionTest => "reaction-test",
            MiniGameKind::TicTacToe => "tic-tac-toe",
        }
    }
}

impl std::fmt::Display for MiniGameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Game in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum MiniGame {
    /// See [`TapBattle`].
    TapBattle(TapBattle),
    /// See [`ReactionTest`].
    ReactionTest(ReactionTest),
    /// See [`TicTacToe`].
    TicTacToe(TicTacToe),
}

impl MiniGame {
    /// Selector entry of the game.
    pub fn kind(&self) -> MiniGameKind {
        match self {
            MiniGame::TapBattle(_) => MiniGameKind::TapBattle,
            MiniGame::ReactionTest(_) => MiniGameKind::ReactionTest,
            MiniGame::TicTacToe(_) => MiniGameKind::TicTacToe,
        }
    }
}

/// Mini-game selector and the game picked from it.
///
/// The loser of a finished game receives a record from their gender's pool.
/// Acknowledging returns to the selector without switching turns.
#[derive(Debug)]
pub struct MiniGames {
    settings: ActivitySettings,
    current: Option<MiniGame>,
    loser: Option<Seat>,
    resolved: Option<HistoryEntry>,
    generation: u64,
}

impl MiniGames {
    /// Selector with nothing picked.
    pub fn new(settings: ActivitySettings) -> Self {
        Self {
            settings,
            current: None,
            loser: None,
            resolved: None,
            generation: 0,
        }
    }

    /// Game in progress, if any.
    pub fn current(&self) -> Option<&MiniGame> {
        self.current.as_ref()
    }

    /// Loser of the finished game.
    pub fn loser(&self) -> Option<Seat> {
        self.loser
    }

    /// Record given to the loser.
    pub fn resolved(&self) -> Option<&HistoryEntry> {
        self.resolved.as_ref()
    }

    /// Generation stamped on scheduled timers.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Pick a game from the selector, replacing any unfinished one.
    pub fn select(&mut self, kind: MiniGameKind) -> Result<&MiniGame, MiniGameError> {
        if self.resolved.is_some() {
            return Err(MiniGameError::ResultPending);
        }
        let game = match kind {
            MiniGameKind::TapBattle => MiniGame::TapBattle(TapBattle::new(
                self.settings.tap_battle_countdown,
                self.settings.tap_battle_seconds,
            )),
            MiniGameKind::ReactionTest => MiniGame::ReactionTest(ReactionTest::new(
                self.settings.reaction_min_delay,
                self.settings.reaction_max_delay,
            )),
            MiniGameKind::TicTacToe => MiniGame::TicTacToe(TicTacToe::new()),
        };
        self.generation += 1;
        self.loser = None;
        Ok(&*self.current.insert(game))
    }

    /// Back to the selector, abandoning the current game.
    pub fn deselect(&mut self) -> Result<(), MiniGameError> {
        if self.resolved.is_some() {
            return Err(MiniGameError::ResultPending);
        }
        self.generation += 1;
        self.current = None;
        self.loser = None;
        Ok(())
    }

    /// Start the tap battle countdown.
    pub fn start_tap_battle(&mut self) -> Result<Schedule, MiniGameError> {
        let generation = self.generation;
        let seconds = self.tap_battle()?.start()?;
        Ok(Schedule::Countdown {
            generation,
            seconds,
        })
    }

    /// One-second tick of the tap battle. Stale ticks are ignored.
    pub fn tick(&mut self, generation: u64) -> Result<Option<Seat>, MiniGameError> {
        if generation != self.generation {
            return Ok(None);
        }
        let loser = self.tap_battle()?.tick();
        if loser.is_some() {
            self.finish(loser);
        }
        Ok(loser)
    }

    /// Count a tap for `seat`.
    pub fn tap(&mut self, seat: Seat) -> Result<u32, MiniGameError> {
        self.tap_battle()?.tap(seat)
    }

    /// Start the current reaction attempt; the signal is due after the returned schedule.
    pub fn start_reaction<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Schedule, MiniGameError> {
        let generation = self.generation;
        let delay = self.reaction_test()?.start(rng)?;
        Ok(Schedule::After { generation, delay })
    }

    /// Show the reaction signal. Returns false when the wake-up is stale.
    pub fn signal(&mut self, generation: u64, now: Instant) -> Result<bool, MiniGameError> {
        if generation != self.generation {
            return Ok(false);
        }
        self.reaction_test()?.signal(now)?;
        Ok(true)
    }

    /// Register a reaction click.
    pub fn click(&mut self, now: Instant) -> Result<Option<Seat>, MiniGameError> {
        let loser = self.reaction_test()?.click(now)?;
        // An early click leaves a pending signal behind.
        self.generation += 1;
        self.finish(loser);
        Ok(loser)
    }

    /// Place a tic-tac-toe mark.
    pub fn play<R: Rng + ?Sized>(
        &mut self,
        seat: Seat,
        cell: usize,
        rng: &mut R,
    ) -> Result<Option<Seat>, MiniGameError> {
        let loser = self.tic_tac_toe()?.play(seat, cell, rng)?;
        self.finish(loser);
        Ok(loser)
    }

    /// Draw the loser's record. Resolving again replays it.
    pub fn resolve<R: Rng + ?Sized>(
        &mut self,
        session: &GameSession,
        pool: &ContentPool,
        rng: &mut R,
    ) -> Result<Resolution, ActivityError> {
        if let Some(entry) = &self.resolved {
            return Ok(Resolution::replay(entry.clone()));
        }
        let loser = session.player(self.loser.ok_or(MiniGameError::NotFinished)?);
        let record = pool
            .pick_random(loser.gender, session.focus(), rng)
            .cloned()
            .ok_or(ActivityError::NoEligibleContent(ActivityKind::MiniGame))?;
        let entry = HistoryEntry::new(ActivityKind::MiniGame, loser, record);
        self.resolved = Some(entry.clone());
        Ok(Resolution::fresh(entry))
    }

    /// Return to the selector. Returns whether the activity is over (never).
    pub fn acknowledge(&mut self, ack: Acknowledgement) -> Result<bool, ActivityError> {
        if ack == Acknowledgement::Complete && self.resolved.is_none() {
            return Err(ActivityError::NothingToComplete);
        }
        self.resolved = None;
        self.deselect()?;
        Ok(false)
    }

    fn finish(&mut self, loser: Option<Seat>) {
        if loser.is_some() {
            self.loser = loser;
        }
    }

    fn tap_battle(&mut self) -> Result<&mut TapBattle, MiniGameError> {
        match self.current.as_mut() {
            Some(MiniGame::TapBattle(battle)) => Ok(battle),
            Some(_) => Err(MiniGameError::WrongGame(MiniGameKind::TapBattle)),
            None => Err(MiniGameError::NoGameSelected),
        }
    }

    fn reaction_test(&mut self) -> Result<&mut ReactionTest, MiniGameError> {
        match self.current.as_mut() {
            Some(MiniGame::ReactionTest(test)) => Ok(test),
            Some(_) => Err(MiniGameError::WrongGame(MiniGameKind::ReactionTest)),
            None => Err(MiniGameError::NoGameSelected),
        }
    }

    fn tic_tac_toe(&mut self) -> Result<&mut TicTacToe, MiniGameError> {
        match self.current.as_mut() {
            Some(MiniGame::TicTacToe(game)) => Ok(game),
            Some(_) => Err(MiniGameError::WrongGame(MiniGameKind::TicTacToe)),
            None => Err(MiniGameError::NoGameSelected),
        }
    }
}
