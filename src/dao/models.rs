use serde::{Deserialize, Serialize};

use crate::state::game::{
    ActivityKind, ContentRecord, Difficulty, Gender, HistoryEntry, Player, Seat,
};

/// Snapshot written to the session slot after every mutation of an active session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredGameData {
    /// Both players in seat order.
    pub players: [Player; 2],
    /// Difficulty at the time of the snapshot.
    pub difficulty: Difficulty,
    /// Activity in progress, if any.
    pub current_activity: Option<ActivityKind>,
    /// Seat whose turn it was.
    pub current_turn: Seat,
    /// Resolved rounds in chronological order.
    pub history: Vec<HistoryEntry>,
    /// Milliseconds since the Unix epoch.
    pub last_updated: u64,
}

/// Record identifier as found in the content files (numeric or textual).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Numeric identifier.
    Number(u64),
    /// Free-form identifier.
    Text(String),
}

/// Whether a strip task is a regular round or a double-or-nothing gamble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StripTaskKind {
    /// Played by both players during a round.
    Regular,
    /// Played by the winner when gambling.
    Double,
}

/// One entry of the strip-game task collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripTask {
    /// Identifier within its collection.
    pub id: RecordId,
    /// Challenge text.
    pub text: String,
    /// Missing means regular.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<StripTaskKind>,
    /// Countdown in seconds; absent or zero means the phase default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer: Option<u32>,
}

impl StripTask {
    /// True for tasks usable in a regular round.
    pub fn is_regular(&self) -> bool {
        matches!(self.kind, None | Some(StripTaskKind::Regular))
    }

    /// True for tasks usable in a gamble.
    pub fn is_double(&self) -> bool {
        self.kind == Some(StripTaskKind::Double)
    }

    /// Task countdown, or `default` when unset.
    pub fn seconds_or(&self, default: u32) -> u32 {
        self.timer.filter(|seconds| *seconds > 0).unwrap_or(default)
    }
}

/// The three fixed strip-game task collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StripCollection {
    /// Tasks either player can finish first.
    Common,
    /// Tasks performed by the male player.
    Male,
    /// Tasks performed by the female player.
    Female,
}

impl StripCollection {
    /// Collection holding the tasks of the given gender.
    pub fn for_gender(gender: Gender) -> Self {
        match gender {
            Gender::Male => StripCollection::Male,
            Gender::Female => StripCollection::Female,
        }
    }

    /// File stem under `/data/strip/`.
    pub fn file_stem(self) -> &'static str {
        match self {
            StripCollection::Common => "strip-common-tasks",
            StripCollection::Male => "strip-male",
            StripCollection::Female => "strip-female",
        }
    }
}

/// Would-you-rather question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Identifier within the file.
    pub id: RecordId,
    /// Optional prompt shown above the options.
    #[serde(default)]
    pub description: Option<String>,
    /// First option.
    pub option_a: String,
    /// Second option.
    pub option_b: String,
    /// Questions without a gender apply to both players.
    #[serde(default)]
    pub gender: Option<Gender>,
    /// Countdown carried over to the synthetic record.
    #[serde(default)]
    pub timer: Option<u32>,
}

/// Body-explorer record, keyed by the body part it targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyPartRecord {
    /// Identifier within the file.
    pub id: u64,
    /// Body part identifier (`lips`, `neck`, ...).
    pub body_part: String,
    /// Task text.
    pub description: String,
    /// Countdown in seconds.
    #[serde(default)]
    pub timer: Option<u32>,
    /// Optional focus tags; body explorer ignores focus mode.
    #[serde(default)]
    pub categories: Option<Vec<String>>,
}

impl BodyPartRecord {
    /// Convert into the common record shape for history.
    pub fn into_record(self, gender: Gender, difficulty: Difficulty) -> ContentRecord {
        ContentRecord {
            id: self.id,
            description: self.description,
            gender,
            difficulty,
            activity: ActivityKind::BodyExplorer,
            timer: self.timer,
            categories: self.categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stored_game_data_uses_camel_case_keys() {
        let data = StoredGameData {
            players: [
                Player::new("Alex", Gender::Male),
                Player::new("Sam", Gender::Female),
            ],
            difficulty: Difficulty::Medium,
            current_activity: Some(ActivityKind::SpinWheel),
            current_turn: Seat::Second,
            history: Vec::new(),
            last_updated: 42,
        };
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["currentActivity"], json!("spin-wheel"));
        assert_eq!(value["currentTurn"], json!(1));
        assert_eq!(value["lastUpdated"], json!(42));
    }

    #[test]
    fn strip_task_without_type_is_regular() {
        let task: StripTask =
            serde_json::from_value(json!({"id": 3, "text": "Kiss", "timer": 0})).unwrap();
        assert!(task.is_regular());
        assert!(!task.is_double());
        assert_eq!(task.seconds_or(60), 60);

        let double: StripTask =
            serde_json::from_value(json!({"id": "d1", "text": "Dance", "type": "double", "timer": 20}))
                .unwrap();
        assert!(double.is_double());
        assert_eq!(double.seconds_or(30), 20);
    }

    #[test]
    fn question_accepts_textual_id_and_missing_gender() {
        let question: Question = serde_json::from_value(json!({
            "id": "q1",
            "optionA": "Sing",
            "optionB": "Dance",
            "difficulty": "easy",
        }))
        .unwrap();
        assert_eq!(question.id, RecordId::Text("q1".into()));
        assert_eq!(question.gender, None);
    }
}
