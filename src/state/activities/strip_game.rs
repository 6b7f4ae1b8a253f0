//! Strip game: timed rounds whose winner removes clothing from the loser.
//!
//! `setup → task → winner → reward → (gamble →) removal → task | gameover`.
//! The machine is synchronous. Countdowns and the winner banner delay are
//! requested through [`Schedule`] and delivered back as events stamped with
//! the generation they were issued for.

use std::time::Duration;

use rand::{Rng, seq::IndexedRandom};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::{
    dao::models::StripTask,
    state::{
        activities::Schedule,
        game::{Gender, Seat},
        rules::{TaskCategory, loser_on_timeout},
        wardrobe::{ClothingItem, Shift, Wardrobe, WardrobeError},
    },
};

/// Phases of the strip game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StripPhase {
    /// Wardrobes are being edited.
    Setup,
    /// A task countdown is running.
    Task,
    /// Winner banner, advances to the reward automatically.
    Winner,
    /// Winner picks take-it or double-or-nothing.
    Reward,
    /// Winner attempts a double task.
    Gamble,
    /// Confirmation of what was (or is about to be) removed.
    Removal,
    /// One wardrobe has nothing removable left.
    #[serde(rename = "gameover")]
    GameOver,
}

/// Inputs of the strip-game machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripEvent {
    /// Leave setup and play the first round.
    Start,
    /// A player declares the task done.
    PlayerFinished(Seat),
    /// One second of the running countdown elapsed.
    Tick {
        /// Generation the countdown was scheduled for.
        generation: u64,
    },
    /// The winner banner delay elapsed.
    RevealReward {
        /// Generation the delay was scheduled for.
        generation: u64,
    },
    /// Winner removes one item from the loser.
    TakeIt,
    /// Winner gambles on a double task.
    DoubleOrNothing,
    /// The gambler completed the double task.
    GambleSucceeded,
    /// The gambler gave up.
    GambleFailed,
    /// Leave the removal confirmation.
    Continue,
    /// Start over from setup.
    Replay,
}

/// Event not applicable in the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// Phase the machine was in.
    pub from: StripPhase,
    /// Rejected event.
    pub event: StripEvent,
}

/// Rejected strip-game operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StripGameError {
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    #[error("seat {} needs at least 2 items to start", .seat.index())]
    NotEnoughItems { seat: Seat },
    #[error("no double task available for {}", .0.as_str())]
    NoDoubleTask(Gender),
    #[error("the current task is not addressed to seat {}", .0.index())]
    WrongPlayer(Seat),
    #[error("wardrobes can only be edited during setup")]
    NotInSetup,
    #[error(transparent)]
    Wardrobe(#[from] WardrobeError),
}

/// Countdown defaults of the strip game.
#[derive(Debug, Clone, PartialEq)]
pub struct StripTimings {
    /// Seconds of a regular task without its own timer.
    pub task_seconds: u32,
    /// Seconds of a double task without its own timer.
    pub gamble_seconds: u32,
    /// How long the winner banner stays up.
    pub winner_delay: Duration,
}

impl Default for StripTimings {
    fn default() -> Self {
        Self {
            task_seconds: 60,
            gamble_seconds: 30,
            winner_delay: Duration::from_millis(1000),
        }
    }
}

/// The three task collections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StripDeck {
    /// Tasks for either player.
    pub common: Vec<StripTask>,
    /// Tasks for the male player.
    pub male: Vec<StripTask>,
    /// Tasks for the female player.
    pub female: Vec<StripTask>,
}

impl StripDeck {
    fn collection(&self, gender: Option<Gender>) -> &[StripTask] {
        match gender {
            None => &self.common,
            Some(Gender::Male) => &self.male,
            Some(Gender::Female) => &self.female,
        }
    }

    /// Regular tasks of a category.
    pub fn regular(&self, category: TaskCategory) -> Vec<&StripTask> {
        self.collection(category.gender())
            .iter()
            .filter(|task| task.is_regular())
            .collect()
    }

    /// Double tasks for a gambler of `gender`.
    pub fn doubles(&self, gender: Gender) -> Vec<&StripTask> {
        self.collection(Some(gender))
            .iter()
            .filter(|task| task.is_double())
            .collect()
    }
}

/// Strip-game state.
#[derive(Debug, Clone)]
pub struct StripGame {
    genders: [Gender; 2],
    phase: StripPhase,
    wardrobes: [Wardrobe; 2],
    task_category: TaskCategory,
    current_task: Option<StripTask>,
    remaining: u32,
    round_count: u32,
    winner: Option<Seat>,
    original_winner: Option<Seat>,
    gambling_player: Option<Seat>,
    is_gamble_fail: bool,
    removed_item_name: String,
    items_to_remove: usize,
    generation: u64,
    timings: StripTimings,
}

impl StripGame {
    /// Game in setup with preset wardrobes for the two seats.
    pub fn new(genders: [Gender; 2], timings: StripTimings) -> Self {
        Self {
            genders,
            phase: StripPhase::Setup,
            wardrobes: genders.map(Wardrobe::preset),
            task_category: TaskCategory::Both,
            current_task: None,
            remaining: 0,
            round_count: 0,
            winner: None,
            original_winner: None,
            gambling_player: None,
            is_gamble_fail: false,
            removed_item_name: String::new(),
            items_to_remove: 1,
            generation: 0,
            timings,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> StripPhase {
        self.phase
    }

    /// Wardrobe of a seat.
    pub fn wardrobe(&self, seat: Seat) -> &Wardrobe {
        &self.wardrobes[seat.index()]
    }

    /// Category of the running or last round.
    pub fn task_category(&self) -> TaskCategory {
        self.task_category
    }

    /// Task on screen.
    pub fn current_task(&self) -> Option<&StripTask> {
        self.current_task.as_ref()
    }

    /// Seconds left on the running countdown.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Rounds started since setup.
    pub fn round_count(&self) -> u32 {
        self.round_count
    }

    /// Seat entitled to remove items.
    pub fn winner(&self) -> Option<Seat> {
        self.winner
    }

    /// Seat that won the round before a gamble.
    pub fn original_winner(&self) -> Option<Seat> {
        self.original_winner
    }

    /// Seat attempting the double task.
    pub fn gambling_player(&self) -> Option<Seat> {
        self.gambling_player
    }

    /// Whether the gamble failed and roles are reversed.
    pub fn is_gamble_fail(&self) -> bool {
        self.is_gamble_fail
    }

    /// Names of the items removed this round, joined with ` & `.
    pub fn removed_item_name(&self) -> &str {
        &self.removed_item_name
    }

    /// Items the winner is entitled to remove.
    pub fn items_to_remove(&self) -> usize {
        self.items_to_remove
    }

    /// Generation stamped on scheduled timers.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Reorder an item during setup.
    pub fn shift_item(
        &mut self,
        seat: Seat,
        index: usize,
        direction: Shift,
    ) -> Result<(), StripGameError> {
        self.wardrobe_for_edit(seat)?.shift(index, direction)?;
        Ok(())
    }

    /// Delete a non-permanent item during setup.
    pub fn delete_item(&mut self, seat: Seat, index: usize) -> Result<ClothingItem, StripGameError> {
        Ok(self.wardrobe_for_edit(seat)?.delete(index)?)
    }

    /// Add a custom item during setup.
    pub fn add_item(&mut self, seat: Seat, name: &str) -> Result<ClothingItem, StripGameError> {
        Ok(self.wardrobe_for_edit(seat)?.add(name)?.clone())
    }

    /// Apply an event. Returns the timer work the new phase needs.
    ///
    /// Ticks and reward reveals carrying a stale generation are ignored.
    pub fn apply<R: Rng + ?Sized>(
        &mut self,
        event: StripEvent,
        deck: &StripDeck,
        rng: &mut R,
    ) -> Result<Option<Schedule>, StripGameError> {
        let invalid = |from| InvalidTransition { from, event };
        match (self.phase, event) {
            (_, StripEvent::Tick { generation } | StripEvent::RevealReward { generation })
                if generation != self.generation =>
            {
                Ok(None)
            }
            (StripPhase::Setup, StripEvent::Start) => {
                if let Some(seat) = Seat::ALL
                    .into_iter()
                    .find(|seat| self.wardrobe(*seat).len() < 2)
                {
                    return Err(StripGameError::NotEnoughItems { seat });
                }
                Ok(self.start_round(deck, rng))
            }
            (StripPhase::Task, StripEvent::PlayerFinished(seat)) => {
                let addressed = self.task_category.gender();
                if addressed.is_some_and(|gender| self.genders[seat.index()] != gender) {
                    return Err(StripGameError::WrongPlayer(seat));
                }
                Ok(Some(self.declare_winner(seat)))
            }
            (StripPhase::Task, StripEvent::Tick { .. }) => {
                if !self.count_down() {
                    return Ok(None);
                }
                let genders = self.genders;
                let loser = loser_on_timeout(
                    self.task_category,
                    |gender| Seat::ALL.into_iter().find(|seat| genders[seat.index()] == gender),
                    rng,
                );
                Ok(Some(self.declare_winner(loser.other())))
            }
            (StripPhase::Winner, StripEvent::RevealReward { .. }) => {
                self.enter(StripPhase::Reward);
                Ok(None)
            }
            (StripPhase::Reward, StripEvent::TakeIt) => {
                let loser = self.loser(event)?;
                let removed = self.wardrobes[loser.index()].strip(1);
                if removed.is_empty() {
                    self.enter(StripPhase::GameOver);
                } else {
                    self.removed_item_name = join_names(&removed);
                    self.enter(StripPhase::Removal);
                }
                Ok(None)
            }
            (StripPhase::Reward, StripEvent::DoubleOrNothing) => {
                let winner = self.winner.ok_or_else(|| invalid(self.phase))?;
                let gender = self.genders[winner.index()];
                let task = deck
                    .doubles(gender)
                    .choose(rng)
                    .map(|task| (*task).clone())
                    .ok_or(StripGameError::NoDoubleTask(gender))?;
                self.original_winner = Some(winner);
                self.gambling_player = Some(winner);
                self.remaining = task.seconds_or(self.timings.gamble_seconds);
                self.current_task = Some(task);
                self.enter(StripPhase::Gamble);
                Ok(Some(self.countdown()))
            }
            (StripPhase::Gamble, StripEvent::GambleSucceeded) => {
                let loser = self.loser(event)?;
                self.items_to_remove = 2;
                let removed = self.wardrobes[loser.index()].strip(2);
                self.removed_item_name = join_names(&removed);
                self.enter(StripPhase::Removal);
                Ok(None)
            }
            (StripPhase::Gamble, StripEvent::GambleFailed) => {
                self.fail_gamble(event)?;
                Ok(None)
            }
            (StripPhase::Gamble, StripEvent::Tick { .. }) => {
                if self.count_down() {
                    self.fail_gamble(event)?;
                }
                Ok(None)
            }
            (StripPhase::Removal, StripEvent::Continue) => {
                let loser = self.loser(event)?;
                if self.is_gamble_fail {
                    let removed = self.wardrobes[loser.index()].strip(1);
                    self.removed_item_name = join_names(&removed);
                }
                if self.wardrobe(loser).removable() == 0 {
                    self.enter(StripPhase::GameOver);
                    Ok(None)
                } else {
                    Ok(self.start_round(deck, rng))
                }
            }
            (StripPhase::GameOver, StripEvent::Replay) => {
                let generation = self.generation + 1;
                *self = Self::new(self.genders, self.timings.clone());
                self.generation = generation;
                Ok(None)
            }
            (from, _) => Err(invalid(from).into()),
        }
    }

    fn wardrobe_for_edit(&mut self, seat: Seat) -> Result<&mut Wardrobe, StripGameError> {
        if self.phase != StripPhase::Setup {
            return Err(StripGameError::NotInSetup);
        }
        Ok(&mut self.wardrobes[seat.index()])
    }

    fn enter(&mut self, phase: StripPhase) {
        self.phase = phase;
        self.generation += 1;
    }

    fn countdown(&self) -> Schedule {
        Schedule::Countdown {
            generation: self.generation,
            seconds: self.remaining,
        }
    }

    /// Returns true when the countdown just ran out.
    fn count_down(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining == 0
    }

    fn loser(&self, event: StripEvent) -> Result<Seat, InvalidTransition> {
        self.winner.map(Seat::other).ok_or(InvalidTransition {
            from: self.phase,
            event,
        })
    }

    fn start_round<R: Rng + ?Sized>(&mut self, deck: &StripDeck, rng: &mut R) -> Option<Schedule> {
        self.round_count += 1;
        self.winner = None;
        self.original_winner = None;
        self.gambling_player = None;
        self.items_to_remove = 1;
        self.removed_item_name.clear();
        self.is_gamble_fail = false;
        self.task_category = self.task_category.next();
        self.current_task = deck
            .regular(self.task_category)
            .choose(rng)
            .map(|task| (*task).clone());
        self.remaining = self
            .current_task
            .as_ref()
            .map_or(0, |task| task.seconds_or(self.timings.task_seconds));
        self.enter(StripPhase::Task);
        self.current_task.is_some().then(|| self.countdown())
    }

    fn declare_winner(&mut self, winner: Seat) -> Schedule {
        self.winner = Some(winner);
        self.remaining = 0;
        self.enter(StripPhase::Winner);
        Schedule::After {
            generation: self.generation,
            delay: self.timings.winner_delay,
        }
    }

    fn fail_gamble(&mut self, event: StripEvent) -> Result<(), InvalidTransition> {
        let original_winner = self.original_winner.ok_or(InvalidTransition {
            from: self.phase,
            event,
        })?;
        self.winner = Some(original_winner.other());
        self.items_to_remove = 1;
        self.is_gamble_fail = true;
        self.removed_item_name.clear();
        self.remaining = 0;
        self.enter(StripPhase::Removal);
        Ok(())
    }
}

fn join_names(items: &[ClothingItem]) -> String {
    items
        .iter()
        .map(|item| item.name.as_str())
        .collect::<Vec<_>>()
        .join(" & ")
}
