//! DTO definitions of the setup screen and the session endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::{
    dto::validation::{validate_gender_pair, validate_player_name},
    state::{
        game::{ActivityKind, Difficulty, GameMode, Gender, HistoryEntry, Player},
        session::{GameSession, SessionPhase},
    },
};

/// Player as typed on the setup screen.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PlayerInput {
    pub name: String,
    pub gender: Gender,
}

impl Validate for PlayerInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_player_name(&self.name) {
            errors.add("name", e);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl PlayerInput {
    /// Player with a fresh identifier and the trimmed name.
    pub fn into_player(self) -> Player {
        Player::new(self.name.trim(), self.gender)
    }
}

/// Payload of the setup screen.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetupRequest {
    pub player1: PlayerInput,
    pub player2: PlayerInput,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl Validate for SetupRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(player_errors) = self.player1.validate() {
            errors.merge_self("player1", Err(player_errors));
        }
        if let Err(player_errors) = self.player2.validate() {
            errors.merge_self("player2", Err(player_errors));
        }
        if let Err(e) = validate_gender_pair(self.player1.gender, self.player2.gender) {
            errors.add("gender", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// One inline message of the setup screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    /// Dotted path of the offending field (`player1.name`, `gender`).
    pub field: String,
    /// Stable code (`invalid_name`, `duplicate_gender`).
    pub code: String,
    /// Text shown next to the field.
    pub message: String,
}

/// Validity result of a setup payload; failures are data, not errors.
#[derive(Debug, Serialize, ToSchema)]
pub struct SetupValidation {
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

impl SetupValidation {
    /// Run every check of the setup screen.
    pub fn check(request: &SetupRequest) -> Self {
        let errors = match request.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => flatten("", &errors),
        };
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

fn flatten(prefix: &str, errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                out.extend(list.iter().map(|err| FieldError {
                    field: path.clone(),
                    code: err.code.to_string(),
                    message: err
                        .message
                        .as_deref()
                        .unwrap_or(err.code.as_ref())
                        .to_string(),
                }));
            }
            ValidationErrorsKind::Struct(nested) => out.extend(flatten(&path, nested)),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    out.extend(flatten(&format!("{path}[{index}]"), nested));
                }
            }
        }
    }
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

/// Lifecycle of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhaseDto {
    Uninitialized,
    Active,
    Ended,
}

impl From<SessionPhase> for SessionPhaseDto {
    fn from(value: SessionPhase) -> Self {
        match value {
            SessionPhase::Uninitialized => SessionPhaseDto::Uninitialized,
            SessionPhase::Active => SessionPhaseDto::Active,
            SessionPhase::Ended => SessionPhaseDto::Ended,
        }
    }
}

/// Public projection of the game session.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub phase: SessionPhaseDto,
    pub is_active: bool,
    pub players: Vec<Player>,
    /// Seat index (0 or 1) whose turn it is.
    pub current_turn: u8,
    pub difficulty: Difficulty,
    pub current_activity: Option<ActivityKind>,
    pub game_mode: GameMode,
    pub focus_categories: Vec<String>,
    pub history: Vec<HistoryEntry>,
    /// Increases with every change.
    pub version: u64,
}

impl From<&GameSession> for SessionView {
    fn from(session: &GameSession) -> Self {
        Self {
            phase: session.phase().into(),
            is_active: session.is_active(),
            players: session.players().to_vec(),
            current_turn: session.current_turn().into(),
            difficulty: session.difficulty(),
            current_activity: session.current_activity(),
            game_mode: session.focus().mode,
            focus_categories: session.focus().categories.iter().cloned().collect(),
            history: session.history().to_vec(),
            version: session.version(),
        }
    }
}

/// Screen the client should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    Setup,
    Game,
}

/// Answer of the routing endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct RouteResponse {
    pub screen: Screen,
}

/// Request to change the difficulty mid-session.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DifficultyRequest {
    pub difficulty: Difficulty,
}

/// Request to switch between normal and focus selection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GameModeRequest {
    pub mode: GameMode,
}

/// Request to add or remove a focus category.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct FocusToggleRequest {
    #[validate(length(min = 1, max = 40))]
    pub category: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name1: &str, gender1: Gender, name2: &str, gender2: Gender) -> SetupRequest {
        SetupRequest {
            player1: PlayerInput {
                name: name1.into(),
                gender: gender1,
            },
            player2: PlayerInput {
                name: name2.into(),
                gender: gender2,
            },
            difficulty: Difficulty::Medium,
        }
    }

    #[test]
    fn valid_setup_has_no_errors() {
        let result =
            SetupValidation::check(&request("Alex", Gender::Male, "Sam", Gender::Female));
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn every_failure_is_reported_with_its_field() {
        let result = SetupValidation::check(&request("A", Gender::Male, "Sam!", Gender::Male));
        assert!(!result.valid);
        let fields: Vec<_> = result
            .errors
            .iter()
            .map(|e| (e.field.as_str(), e.code.as_str()))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("gender", "duplicate_gender"),
                ("player1.name", "invalid_name"),
                ("player2.name", "invalid_name"),
            ]
        );
    }

    #[test]
    fn names_are_trimmed_when_building_players() {
        let player = PlayerInput {
            name: "  Alex ".into(),
            gender: Gender::Male,
        }
        .into_player();
        assert_eq!(player.name, "Alex");
        assert!(!player.id.is_empty());
    }
}
