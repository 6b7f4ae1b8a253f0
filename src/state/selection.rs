//! Content selection over one `(difficulty, activity)` collection.

use std::sync::Arc;

use rand::{Rng, seq::IndexedRandom};

use crate::state::game::{ActivityKind, ContentRecord, Difficulty, FocusSettings, Gender};

/// Eligible records for one `(difficulty, activity)` key.
///
/// Records are shared; cloning a pool is cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentPool {
    difficulty: Difficulty,
    kind: ActivityKind,
    records: Arc<Vec<ContentRecord>>,
}

impl ContentPool {
    /// Build a pool, keeping only the records whose own fields match the key.
    pub fn new(difficulty: Difficulty, kind: ActivityKind, records: Vec<ContentRecord>) -> Self {
        let records = records
            .into_iter()
            .filter(|record| record.difficulty == difficulty && record.activity == kind)
            .collect();
        Self {
            difficulty,
            kind,
            records: Arc::new(records),
        }
    }

    /// Difficulty the pool was loaded for.
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Activity the pool was loaded for.
    pub fn kind(&self) -> ActivityKind {
        self.kind
    }

    /// Every record of the pool, ignoring focus mode.
    pub fn records(&self) -> &[ContentRecord] {
        &self.records
    }

    /// True when nothing survived the client-side filter.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records selection draws from under the given focus settings.
    ///
    /// Narrowing that leaves nothing falls back to the whole pool.
    pub fn eligible(&self, focus: &FocusSettings) -> Vec<&ContentRecord> {
        if focus.narrows(self.kind) {
            let narrowed: Vec<_> = self
                .records
                .iter()
                .filter(|record| record.matches_any(&focus.categories))
                .collect();
            if !narrowed.is_empty() {
                return narrowed;
            }
        }
        self.records.iter().collect()
    }

    /// Eligible records of one gender, widening past focus mode when empty.
    pub fn eligible_for(&self, gender: Gender, focus: &FocusSettings) -> Vec<&ContentRecord> {
        let matching: Vec<_> = self
            .eligible(focus)
            .into_iter()
            .filter(|record| record.gender == gender)
            .collect();
        if !matching.is_empty() || !focus.narrows(self.kind) {
            return matching;
        }
        self.records
            .iter()
            .filter(|record| record.gender == gender)
            .collect()
    }

    /// Uniform pick among the eligible records of `gender`.
    pub fn pick_random<R: Rng + ?Sized>(
        &self,
        gender: Gender,
        focus: &FocusSettings,
        rng: &mut R,
    ) -> Option<&ContentRecord> {
        self.eligible_for(gender, focus).choose(rng).copied()
    }

    /// Exact lookup by identifier.
    pub fn pick_by_id(&self, id: u64) -> Option<&ContentRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Draw `count` records with replacement, optionally restricted to a gender.
    ///
    /// Returns an empty vector when nothing is eligible.
    pub fn draw<R: Rng + ?Sized>(
        &self,
        gender: Option<Gender>,
        count: usize,
        focus: &FocusSettings,
        rng: &mut R,
    ) -> Vec<ContentRecord> {
        let candidates = match gender {
            Some(gender) => self.eligible_for(gender, focus),
            None => self.eligible(focus),
        };
        if candidates.is_empty() {
            return Vec::new();
        }
        (0..count)
            .map(|_| candidates[rng.random_range(0..candidates.len())].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::game::GameMode;
    use rand::{SeedableRng, rngs::StdRng};

    fn record(id: u64, gender: Gender, categories: Option<&[&str]>) -> ContentRecord {
        ContentRecord {
            id,
            description: format!("record {id}"),
            gender,
            difficulty: Difficulty::Medium,
            activity: ActivityKind::SpinWheel,
            timer: None,
            categories: categories.map(|tags| tags.iter().map(|t| t.to_string()).collect()),
        }
    }

    fn focus(categories: &[&str]) -> FocusSettings {
        FocusSettings {
            mode: GameMode::Focus,
            categories: categories.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn pool() -> ContentPool {
        ContentPool::new(
            Difficulty::Medium,
            ActivityKind::SpinWheel,
            vec![
                record(1, Gender::Male, Some(&["kissing"])),
                record(2, Gender::Female, Some(&["massage"])),
                record(3, Gender::Male, None),
                record(4, Gender::Female, Some(&["kissing", "massage"])),
            ],
        )
    }

    #[test]
    fn records_with_foreign_keys_are_dropped() {
        let mut stray = record(9, Gender::Male, None);
        stray.difficulty = Difficulty::Hard;
        let mut other_activity = record(10, Gender::Male, None);
        other_activity.activity = ActivityKind::ScratchCard;

        let pool = ContentPool::new(
            Difficulty::Medium,
            ActivityKind::SpinWheel,
            vec![stray, other_activity, record(1, Gender::Male, None)],
        );
        assert_eq!(pool.records().len(), 1);
        assert_eq!(pool.pick_by_id(1).map(|r| r.id), Some(1));
        assert!(pool.pick_by_id(9).is_none());
    }

    #[test]
    fn focus_narrows_to_matching_categories() {
        let pool = pool();
        let ids: Vec<_> = pool
            .eligible(&focus(&["kissing"]))
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn empty_focus_intersection_falls_back_to_full_pool() {
        let pool = pool();
        let eligible: Vec<_> = pool.eligible(&focus(&["dancing"])).into_iter().cloned().collect();
        assert_eq!(eligible, pool.records().to_vec());
    }

    #[test]
    fn exempt_activity_ignores_focus() {
        let pool = ContentPool::new(
            Difficulty::Medium,
            ActivityKind::BodyExplorer,
            vec![ContentRecord {
                activity: ActivityKind::BodyExplorer,
                ..record(1, Gender::Male, None)
            }],
        );
        assert_eq!(pool.eligible(&focus(&["kissing"])).len(), 1);
    }

    #[test]
    fn gender_filter_widens_past_focus_when_empty() {
        let pool = pool();
        let focus = focus(&["massage"]);
        let ids: Vec<_> = pool
            .eligible_for(Gender::Male, &focus)
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn pick_random_respects_gender_and_reports_none() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool = pool();
        let normal = FocusSettings::default();
        for _ in 0..50 {
            let picked = pool.pick_random(Gender::Female, &normal, &mut rng).unwrap();
            assert_eq!(picked.gender, Gender::Female);
        }

        let males_only = ContentPool::new(
            Difficulty::Medium,
            ActivityKind::SpinWheel,
            vec![record(1, Gender::Male, None)],
        );
        assert!(
            males_only
                .pick_random(Gender::Female, &normal, &mut rng)
                .is_none()
        );
    }

    #[test]
    fn draw_allows_repeats_and_handles_empty() {
        let mut rng = StdRng::seed_from_u64(3);
        let pool = pool();
        let drawn = pool.draw(Some(Gender::Male), 16, &FocusSettings::default(), &mut rng);
        assert_eq!(drawn.len(), 16);
        assert!(drawn.iter().all(|r| r.gender == Gender::Male));

        let empty = ContentPool::new(Difficulty::Medium, ActivityKind::SpinWheel, Vec::new());
        assert!(empty.draw(None, 10, &FocusSettings::default(), &mut rng).is_empty());
    }
}
