use rand::Rng;

use crate::state::{
    activities::{Acknowledgement, ActivityError, Resolution, TurnKey, turn_key},
    cache::SelectionCache,
    game::{ActivityKind, ContentRecord, HistoryEntry},
    selection::ContentPool,
    session::GameSession,
};

/// Segments currently drawn on the wheel.
#[derive(Debug, Clone, PartialEq)]
pub struct Wheel {
    /// Records in segment order; repeats are allowed.
    pub segments: Vec<ContentRecord>,
    /// Segment the last spin stopped on, with the entry it produced.
    pub landed: Option<(usize, HistoryEntry)>,
}

/// Wheel of records drawn for the player whose turn it is.
#[derive(Debug)]
pub struct SpinWheel {
    segment_count: usize,
    wheel: SelectionCache<TurnKey, Wheel>,
}

impl SpinWheel {
    /// Empty wheel; segments are drawn on first use.
    pub fn new(segment_count: usize) -> Self {
        Self {
            segment_count,
            wheel: SelectionCache::new(),
        }
    }

    /// Wheel for the current turn, redrawn if the turn or difficulty changed.
    pub fn prepare<R: Rng + ?Sized>(
        &mut self,
        session: &GameSession,
        pool: &ContentPool,
        rng: &mut R,
    ) -> Result<&Wheel, ActivityError> {
        self.refresh(session, pool, rng).map(|wheel| &*wheel)
    }

    /// Spin once. Spinning a wheel that already landed replays the same result.
    pub fn spin<R: Rng + ?Sized>(
        &mut self,
        session: &GameSession,
        pool: &ContentPool,
        rng: &mut R,
    ) -> Result<(usize, Resolution), ActivityError> {
        let player = session.current_player().clone();
        let wheel = self.refresh(session, pool, rng)?;
        if let Some((index, entry)) = &wheel.landed {
            return Ok((*index, Resolution::replay(entry.clone())));
        }

        let index = rng.random_range(0..wheel.segments.len());
        let entry = HistoryEntry::new(
            ActivityKind::SpinWheel,
            &player,
            wheel.segments[index].clone(),
        );
        wheel.landed = Some((index, entry.clone()));
        Ok((index, Resolution::fresh(entry)))
    }

    /// Wheel for the current turn, if it has been drawn.
    pub fn wheel(&self, session: &GameSession) -> Option<&Wheel> {
        self.wheel.get(&turn_key(session))
    }

    /// Entry the wheel landed on this turn.
    pub fn landed(&self, session: &GameSession) -> Option<&HistoryEntry> {
        self.wheel(session)
            .and_then(|wheel| wheel.landed.as_ref())
            .map(|(_, entry)| entry)
    }

    /// Clear the landed segment. Returns whether the activity is over (never).
    pub fn acknowledge(
        &mut self,
        session: &GameSession,
        ack: Acknowledgement,
    ) -> Result<bool, ActivityError> {
        let wheel = self.wheel.get_mut(&turn_key(session));
        match (ack, wheel) {
            (Acknowledgement::Complete, Some(wheel)) if wheel.landed.is_some() => {
                wheel.landed = None;
            }
            (Acknowledgement::Complete, _) => return Err(ActivityError::NothingToComplete),
            (Acknowledgement::Skip, wheel) => {
                if let Some(wheel) = wheel {
                    wheel.landed = None;
                }
            }
        }
        Ok(false)
    }

    fn refresh<R: Rng + ?Sized>(
        &mut self,
        session: &GameSession,
        pool: &ContentPool,
        rng: &mut R,
    ) -> Result<&mut Wheel, ActivityError> {
        let gender = session.current_player().gender;
        let count = self.segment_count.max(1);
        self.wheel
            .refresh(&turn_key(session), || {
                let segments = pool.draw(Some(gender), count, session.focus(), rng);
                (!segments.is_empty()).then_some(Wheel {
                    segments,
                    landed: None,
                })
            })
            .ok_or(ActivityError::NoEligibleContent(ActivityKind::SpinWheel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        game::{Difficulty, Gender, Player},
        session::SessionAction,
    };
    use rand::{SeedableRng, rngs::StdRng};

    fn record(id: u64, gender: Gender, difficulty: Difficulty) -> ContentRecord {
        ContentRecord {
            id,
            description: format!("wheel {id}"),
            gender,
            difficulty,
            activity: ActivityKind::SpinWheel,
            timer: Some(30),
            categories: None,
        }
    }

    fn pool(difficulty: Difficulty) -> ContentPool {
        ContentPool::new(
            difficulty,
            ActivityKind::SpinWheel,
            (1..=6)
                .map(|id| {
                    let gender = if id % 2 == 0 { Gender::Female } else { Gender::Male };
                    record(id, gender, difficulty)
                })
                .collect(),
        )
    }

    fn session() -> GameSession {
        let mut session = GameSession::new();
        session.initialize_players(
            Player::new("Alex", Gender::Male),
            Player::new("Sam", Gender::Female),
            Difficulty::Medium,
        );
        session
    }

    #[test]
    fn wheel_holds_current_player_gender() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut wheel = SpinWheel::new(16);
        let session = session();
        let drawn = wheel.prepare(&session, &pool(Difficulty::Medium), &mut rng).unwrap();
        assert_eq!(drawn.segments.len(), 16);
        assert!(drawn.segments.iter().all(|r| r.gender == Gender::Male));
    }

    #[test]
    fn spin_resolves_once_per_turn() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut wheel = SpinWheel::new(16);
        let session = session();
        let pool = pool(Difficulty::Medium);

        let (index, first) = wheel.spin(&session, &pool, &mut rng).unwrap();
        assert!(first.fresh);
        assert_eq!(first.entry.player_name, "Alex");

        let (again, second) = wheel.spin(&session, &pool, &mut rng).unwrap();
        assert!(!second.fresh);
        assert_eq!(again, index);
        assert_eq!(second.entry, first.entry);
    }

    #[test]
    fn turn_or_difficulty_change_redraws_wheel() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut wheel = SpinWheel::new(16);
        let mut session = session();
        wheel.spin(&session, &pool(Difficulty::Medium), &mut rng).unwrap();

        session.switch_turn();
        assert!(wheel.landed(&session).is_none());
        let drawn = wheel.prepare(&session, &pool(Difficulty::Medium), &mut rng).unwrap();
        assert!(drawn.segments.iter().all(|r| r.gender == Gender::Female));

        session.dispatch(SessionAction::ChangeDifficulty(Difficulty::Hard));
        let drawn = wheel.prepare(&session, &pool(Difficulty::Hard), &mut rng).unwrap();
        assert!(drawn.segments.iter().all(|r| r.difficulty == Difficulty::Hard));
    }

    #[test]
    fn complete_requires_a_landed_segment() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut wheel = SpinWheel::new(16);
        let session = session();
        assert_eq!(
            wheel.acknowledge(&session, Acknowledgement::Complete),
            Err(ActivityError::NothingToComplete)
        );
        assert_eq!(wheel.acknowledge(&session, Acknowledgement::Skip), Ok(false));

        wheel.spin(&session, &pool(Difficulty::Medium), &mut rng).unwrap();
        assert_eq!(wheel.acknowledge(&session, Acknowledgement::Complete), Ok(false));
        assert!(wheel.landed(&session).is_none());
    }

    #[test]
    fn empty_gender_pool_is_reported() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut wheel = SpinWheel::new(16);
        let pool = ContentPool::new(
            Difficulty::Medium,
            ActivityKind::SpinWheel,
            vec![record(1, Gender::Female, Difficulty::Medium)],
        );
        assert_eq!(
            wheel.spin(&session(), &pool, &mut rng).unwrap_err(),
            ActivityError::NoEligibleContent(ActivityKind::SpinWheel)
        );
    }
}
