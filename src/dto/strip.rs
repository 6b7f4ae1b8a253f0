use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::state::{
    activities::strip_game::{StripGame, StripPhase},
    game::Seat,
    rules::TaskCategory,
    wardrobe::{ClothingItem, Shift},
};

/// Public projection of the strip game.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StripView {
    pub phase: StripPhase,
    /// Wardrobes in seat order, front item removed first.
    pub wardrobes: Vec<Vec<ClothingItem>>,
    /// Non-permanent items left per seat.
    pub removable: Vec<usize>,
    pub task_category: TaskCategory,
    pub task: Option<StripTaskView>,
    /// Seconds left on the running countdown.
    pub remaining: u32,
    pub round_count: u32,
    pub winner: Option<u8>,
    pub original_winner: Option<u8>,
    pub gambling_player: Option<u8>,
    pub is_gamble_fail: bool,
    pub removed_item_name: String,
    pub items_to_remove: usize,
}

/// Challenge shown during a task or a gamble.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StripTaskView {
    pub text: String,
    pub double: bool,
}

impl From<&StripGame> for StripView {
    fn from(game: &StripGame) -> Self {
        Self {
            phase: game.phase(),
            wardrobes: Seat::ALL
                .iter()
                .map(|seat| game.wardrobe(*seat).items().to_vec())
                .collect(),
            removable: Seat::ALL
                .iter()
                .map(|seat| game.wardrobe(*seat).removable())
                .collect(),
            task_category: game.task_category(),
            task: game.current_task().map(|task| StripTaskView {
                text: task.text.clone(),
                double: task.is_double(),
            }),
            remaining: game.remaining(),
            round_count: game.round_count(),
            winner: game.winner().map(u8::from),
            original_winner: game.original_winner().map(u8::from),
            gambling_player: game.gambling_player().map(u8::from),
            is_gamble_fail: game.is_gamble_fail(),
            removed_item_name: game.removed_item_name().to_string(),
            items_to_remove: game.items_to_remove(),
        }
    }
}

/// Custom wardrobe entry appended during setup.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddItemRequest {
    pub name: String,
}

impl Validate for AddItemRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let len = self.name.trim().chars().count();
        if !(1..=30).contains(&len) {
            let mut err = ValidationError::new("item_name_length");
            err.message = Some("Item name must be between 1 and 30 characters".into());
            errors.add("name", err);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Move a wardrobe entry one position.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ShiftItemRequest {
    pub direction: Shift,
}

/// Outcome of the double task.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GambleRequest {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{activities::strip_game::StripTimings, game::Gender};

    #[test]
    fn view_lists_wardrobes_in_seat_order() {
        let game = StripGame::new([Gender::Male, Gender::Female], StripTimings::default());
        let view = StripView::from(&game);
        assert_eq!(view.phase, StripPhase::Setup);
        assert_eq!(view.wardrobes[0][0].name, "Watch");
        assert_eq!(view.wardrobes[1][0].name, "Earrings");
        assert_eq!(view.removable, vec![4, 4]);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["phase"], "setup");
        assert_eq!(json["wardrobes"][1][1]["isPermanent"], true);
    }

    #[test]
    fn blank_item_names_are_rejected() {
        assert!(AddItemRequest { name: "  ".into() }.validate().is_err());
        assert!(AddItemRequest { name: "Scarf".into() }.validate().is_ok());
    }
}
