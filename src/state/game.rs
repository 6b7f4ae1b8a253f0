//! Domain vocabulary shared by the session, the content layer, and every activity.

use std::{
    fmt,
    time::{SystemTime, UNIX_EPOCH},
};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Gender of a player, also used to key gender-specific content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male player or male-targeted content.
    Male,
    /// Female player or female-targeted content.
    Female,
}

impl Gender {
    /// The other gender of the pair.
    pub fn opposite(self) -> Self {
        match self {
            Gender::Male => Gender::Female,
            Gender::Female => Gender::Male,
        }
    }

    /// Lowercase tag used in content paths.
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// Intensity selector that keys every content query.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Mild content.
    Easy,
    /// Default intensity.
    #[default]
    Medium,
    /// Strongest content.
    Hard,
}

impl Difficulty {
    /// Lowercase tag used in content paths.
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// Selectable game modes that resolve to a content record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityKind {
    /// Tap battle, reaction test, and tic-tac-toe.
    MiniGame,
    /// Deck of scratch cards.
    ScratchCard,
    /// Sixteen-segment wheel.
    SpinWheel,
    /// Body-part selector.
    BodyExplorer,
    /// Binary-choice quiz.
    WouldYouRather,
    /// Strip game with wardrobe tracking.
    StripGame,
}

impl ActivityKind {
    /// Kebab-case tag used in content paths and history records.
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityKind::MiniGame => "mini-game",
            ActivityKind::ScratchCard => "scratch-card",
            ActivityKind::SpinWheel => "spin-wheel",
            ActivityKind::BodyExplorer => "body-explorer",
            ActivityKind::WouldYouRather => "would-you-rather",
            ActivityKind::StripGame => "strip-game",
        }
    }

    /// Activities that never honour focus-mode narrowing.
    pub fn is_focus_exempt(self) -> bool {
        matches!(self, ActivityKind::BodyExplorer | ActivityKind::StripGame)
    }

    /// Activities whose acknowledgement hands the turn to the other player.
    pub fn is_turn_based(self) -> bool {
        matches!(
            self,
            ActivityKind::ScratchCard
                | ActivityKind::SpinWheel
                | ActivityKind::BodyExplorer
                | ActivityKind::WouldYouRather
        )
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a player in the session. Seat one plays `X` in tic-tac-toe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Seat {
    /// Index 0.
    #[default]
    First,
    /// Index 1.
    Second,
}

impl Seat {
    /// Both seats in index order.
    pub const ALL: [Seat; 2] = [Seat::First, Seat::Second];

    /// The opposing seat.
    pub fn other(self) -> Self {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }

    /// Array index of the seat.
    pub fn index(self) -> usize {
        match self {
            Seat::First => 0,
            Seat::Second => 1,
        }
    }
}

impl From<Seat> for u8 {
    fn from(value: Seat) -> Self {
        value.index() as u8
    }
}

impl TryFrom<u8> for Seat {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Seat::First),
            1 => Ok(Seat::Second),
            other => Err(format!("seat must be 0 or 1, got {other}")),
        }
    }
}

/// Participant identity, immutable for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Player {
    /// Opaque unique token.
    pub id: String,
    /// Display name (validated at the setup boundary).
    pub name: String,
    /// Gender used to select content.
    pub gender: Gender,
}

impl Player {
    /// Build a player with a freshly allocated identifier.
    pub fn new(name: impl Into<String>, gender: Gender) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            name: name.into(),
            gender,
        }
    }

    /// Placeholder used while no session is initialized.
    pub(crate) fn blank(gender: Gender) -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            gender,
        }
    }
}

/// Whether content selection is narrowed to chosen categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// No narrowing.
    #[default]
    Normal,
    /// Restrict to records tagged with one of the focus categories.
    Focus,
}

/// Focus-mode filtering parameters carried by the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusSettings {
    /// Current mode.
    pub mode: GameMode,
    /// Selected category tags, in selection order.
    pub categories: IndexSet<String>,
}

impl FocusSettings {
    /// True when selection must be narrowed for the given activity.
    pub fn narrows(&self, kind: ActivityKind) -> bool {
        self.mode == GameMode::Focus && !self.categories.is_empty() && !kind.is_focus_exempt()
    }

    /// Add the category when absent, remove it otherwise.
    pub fn toggle(&mut self, category: String) {
        if !self.categories.shift_remove(&category) {
            self.categories.insert(category);
        }
    }
}

/// Task record ("punishment") supplied by the content store.
///
/// Records are never created by the game except for the synthetic
/// would-you-rather answers. A record without `categories` matches no focus
/// filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ContentRecord {
    /// Identifier, unique within one content file.
    pub id: u64,
    /// Text shown to the players.
    pub description: String,
    /// Gender the record targets.
    pub gender: Gender,
    /// Difficulty tier the record belongs to.
    pub difficulty: Difficulty,
    /// Activity the record belongs to.
    pub activity: ActivityKind,
    /// Countdown in seconds; absent or zero means untimed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer: Option<u32>,
    /// Focus-mode tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
}

impl ContentRecord {
    /// Countdown to present with the record, if any.
    pub fn countdown(&self) -> Option<u32> {
        self.timer.filter(|seconds| *seconds > 0)
    }

    /// True when the record carries at least one of the given categories.
    ///
    /// A record without `categories` is untagged and matches no focus filter;
    /// it stays reachable through the fallback to the unfiltered pool.
    pub fn matches_any(&self, categories: &IndexSet<String>) -> bool {
        self.categories
            .as_ref()
            .is_some_and(|tags| tags.iter().any(|tag| categories.contains(tag)))
    }
}

/// One resolved activity round, appended to the session history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Activity that produced the record.
    pub activity: ActivityKind,
    /// Player bound to the record.
    pub player_id: String,
    /// Denormalised player name for display.
    pub player_name: String,
    /// Resolved record.
    #[serde(rename = "punishment")]
    pub record: ContentRecord,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl HistoryEntry {
    /// Bind a record to a player at the current time.
    pub fn new(activity: ActivityKind, player: &Player, record: ContentRecord) -> Self {
        Self {
            activity,
            player_id: player.id.clone(),
            player_name: player.name.clone(),
            record,
            timestamp: now_millis(),
        }
    }
}

/// Milliseconds elapsed since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_serializes_as_index() {
        assert_eq!(serde_json::to_string(&Seat::Second).unwrap(), "1");
        assert_eq!(serde_json::from_str::<Seat>("0").unwrap(), Seat::First);
        assert!(serde_json::from_str::<Seat>("2").is_err());
    }

    #[test]
    fn activity_kind_uses_kebab_case_tags() {
        assert_eq!(
            serde_json::to_string(&ActivityKind::WouldYouRather).unwrap(),
            "\"would-you-rather\""
        );
        assert!(ActivityKind::StripGame.is_focus_exempt());
        assert!(!ActivityKind::MiniGame.is_turn_based());
    }

    #[test]
    fn focus_toggle_adds_then_removes() {
        let mut focus = FocusSettings::default();
        focus.toggle("kissing".into());
        focus.toggle("massage".into());
        focus.toggle("kissing".into());
        assert_eq!(focus.categories.iter().collect::<Vec<_>>(), vec!["massage"]);
    }

    #[test]
    fn record_without_categories_matches_no_filter() {
        let record = ContentRecord {
            id: 1,
            description: "Tell a joke".into(),
            gender: Gender::Female,
            difficulty: Difficulty::Easy,
            activity: ActivityKind::SpinWheel,
            timer: Some(0),
            categories: None,
        };
        let wanted: IndexSet<String> = ["kissing".to_string()].into_iter().collect();
        assert!(!record.matches_any(&wanted));
        assert_eq!(record.countdown(), None);
    }
}
