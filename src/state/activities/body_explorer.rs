use rand::{Rng, seq::IndexedRandom};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dao::models::BodyPartRecord,
    state::{
        activities::{Acknowledgement, ActivityError, Resolution},
        cache::SelectionCache,
        game::{ActivityKind, HistoryEntry, Seat},
        session::GameSession,
    },
};

/// Selectable body part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BodyPart {
    /// Identifier matched against `bodyPart` of the records.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
}

/// Fixed body-part catalogue.
pub const BODY_PARTS: [BodyPart; 13] = [
    BodyPart { id: "lips", name: "Lips" },
    BodyPart { id: "neck", name: "Neck" },
    BodyPart { id: "ears", name: "Ears" },
    BodyPart { id: "shoulders", name: "Shoulders" },
    BodyPart { id: "chest", name: "Chest" },
    BodyPart { id: "back", name: "Back" },
    BodyPart { id: "arms", name: "Arms" },
    BodyPart { id: "hands", name: "Hands" },
    BodyPart { id: "waist", name: "Waist" },
    BodyPart { id: "hips", name: "Hips" },
    BodyPart { id: "thighs", name: "Thighs" },
    BodyPart { id: "legs", name: "Legs" },
    BodyPart { id: "feet", name: "Feet" },
];

/// Side of the body diagram shown with the result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BodyView {
    /// Front diagram.
    #[default]
    Front,
    /// Back diagram.
    Back,
}

/// Result of one exploration.
#[derive(Debug, Clone, PartialEq)]
pub struct Exploration {
    /// Part the selector stopped on.
    pub part: BodyPart,
    /// Diagram side.
    pub view: BodyView,
    /// Entry bound to the current player.
    pub entry: HistoryEntry,
}

/// Random body-part selector drawing from the partner's collection.
///
/// Focus mode never applies here.
#[derive(Debug, Default)]
pub struct BodyExplorer {
    found: SelectionCache<Seat, Exploration>,
}

impl BodyExplorer {
    /// Nothing explored yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick a random part and view, then a record for that part.
    ///
    /// `records` is the collection of the current player's partner. Exploring
    /// again on the same turn replays the previous result.
    pub fn explore<R: Rng + ?Sized>(
        &mut self,
        session: &GameSession,
        records: &[BodyPartRecord],
        rng: &mut R,
    ) -> Result<(Exploration, bool), ActivityError> {
        let seat = session.current_turn();
        if let Some(found) = self.found.get(&seat) {
            return Ok((found.clone(), false));
        }

        let part = BODY_PARTS[rng.random_range(0..BODY_PARTS.len())];
        let view = if rng.random_bool(0.5) {
            BodyView::Front
        } else {
            BodyView::Back
        };
        let matching: Vec<_> = records
            .iter()
            .filter(|record| record.body_part == part.id)
            .collect();
        let record = matching
            .choose(rng)
            .map(|record| (*record).clone())
            .ok_or(ActivityError::NoEligibleContent(ActivityKind::BodyExplorer))?;

        let player = session.current_player();
        let exploration = Exploration {
            part,
            view,
            entry: HistoryEntry::new(
                ActivityKind::BodyExplorer,
                player,
                record.into_record(player.gender.opposite(), session.difficulty()),
            ),
        };
        self.found.refresh(&seat, || Some(exploration.clone()));
        Ok((exploration, true))
    }

    /// Resolve through the shared contract.
    pub fn resolve<R: Rng + ?Sized>(
        &mut self,
        session: &GameSession,
        records: &[BodyPartRecord],
        rng: &mut R,
    ) -> Result<Resolution, ActivityError> {
        let (exploration, fresh) = self.explore(session, records, rng)?;
        Ok(if fresh {
            Resolution::fresh(exploration.entry)
        } else {
            Resolution::replay(exploration.entry)
        })
    }

    /// Exploration of the current turn.
    pub fn current(&self, session: &GameSession) -> Option<&Exploration> {
        self.found.get(&session.current_turn())
    }

    /// Forget the exploration. Returns whether the activity is over (never).
    pub fn acknowledge(
        &mut self,
        session: &GameSession,
        ack: Acknowledgement,
    ) -> Result<bool, ActivityError> {
        if ack == Acknowledgement::Complete && self.current(session).is_none() {
            return Err(ActivityError::NothingToComplete);
        }
        self.found.invalidate();
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::game::{Difficulty, Gender, Player};
    use rand::{SeedableRng, rngs::StdRng};

    fn records() -> Vec<BodyPartRecord> {
        BODY_PARTS
            .iter()
            .enumerate()
            .map(|(index, part)| BodyPartRecord {
                id: index as u64,
                body_part: part.id.to_string(),
                description: format!("Kiss the {}", part.id),
                timer: Some(20),
                categories: None,
            })
            .collect()
    }

    fn session() -> GameSession {
        let mut session = GameSession::new();
        session.initialize_players(
            Player::new("Alex", Gender::Male),
            Player::new("Sam", Gender::Female),
            Difficulty::Hard,
        );
        session
    }

    #[test]
    fn record_matches_selected_part() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut explorer = BodyExplorer::new();
        let session = session();
        let (found, fresh) = explorer.explore(&session, &records(), &mut rng).unwrap();
        assert!(fresh);
        assert_eq!(found.entry.record.description, format!("Kiss the {}", found.part.id));
        assert_eq!(found.entry.record.gender, Gender::Female);
        assert_eq!(found.entry.record.difficulty, Difficulty::Hard);
        assert_eq!(found.entry.player_name, "Alex");
    }

    #[test]
    fn exploring_twice_replays() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut explorer = BodyExplorer::new();
        let session = session();
        let first = explorer.resolve(&session, &records(), &mut rng).unwrap();
        let second = explorer.resolve(&session, &records(), &mut rng).unwrap();
        assert!(first.fresh && !second.fresh);
        assert_eq!(first.entry, second.entry);

        explorer.acknowledge(&session, Acknowledgement::Complete).unwrap();
        assert!(explorer.current(&session).is_none());
    }

    #[test]
    fn missing_part_records_are_reported() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut explorer = BodyExplorer::new();
        assert_eq!(
            explorer.explore(&session(), &[], &mut rng).unwrap_err(),
            ActivityError::NoEligibleContent(ActivityKind::BodyExplorer)
        );
        assert_eq!(
            explorer.acknowledge(&session(), Acknowledgement::Complete),
            Err(ActivityError::NothingToComplete)
        );
    }
}
