//! Tie-break and timeout policies shared by the mini-games and the strip game.

use rand::Rng;
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::game::{Gender, Seat};

/// Who a timed task is addressed to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    /// Task for the male player.
    Male,
    /// Task for the female player.
    Female,
    /// Either player may finish first.
    #[default]
    Both,
}

impl TaskCategory {
    /// Next category of the `male → female → both` rotation.
    pub fn next(self) -> Self {
        match self {
            TaskCategory::Male => TaskCategory::Female,
            TaskCategory::Female => TaskCategory::Both,
            TaskCategory::Both => TaskCategory::Male,
        }
    }

    /// Gender the task is addressed to, if only one.
    pub fn gender(self) -> Option<Gender> {
        match self {
            TaskCategory::Male => Some(Gender::Male),
            TaskCategory::Female => Some(Gender::Female),
            TaskCategory::Both => None,
        }
    }
}

/// Uniformly random seat.
pub fn coin_flip<R: Rng + ?Sized>(rng: &mut R) -> Seat {
    if rng.random_bool(0.5) {
        Seat::First
    } else {
        Seat::Second
    }
}

/// Loser when a task countdown reaches zero.
///
/// Gendered categories deterministically pick the player of that gender;
/// `both` (or a gender no seat holds) is a coin flip.
pub fn loser_on_timeout<R, F>(category: TaskCategory, seat_of: F, rng: &mut R) -> Seat
where
    R: Rng + ?Sized,
    F: Fn(Gender) -> Option<Seat>,
{
    category
        .gender()
        .and_then(seat_of)
        .unwrap_or_else(|| coin_flip(rng))
}
