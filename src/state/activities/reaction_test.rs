use std::time::{Duration, Instant};

use rand::Rng;

use crate::state::{activities::mini_game::MiniGameError, game::Seat};

/// Result of one player's attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    /// Clicked before the signal.
    Early,
    /// Time between the signal and the click.
    Reacted(Duration),
}

/// Progress of the attempt in play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionStage {
    /// Waiting for the player to start their attempt.
    Idle,
    /// Signal pending; a click now is early.
    Waiting,
    /// Signal shown at the given instant.
    Signalled(Instant),
    /// Both players have played.
    Finished,
}

/// Players take turns reacting to a signal shown after a random wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionTest {
    stage: ReactionStage,
    current: Seat,
    attempts: [Option<Attempt>; 2],
    min_delay: Duration,
    max_delay: Duration,
}

impl ReactionTest {
    /// Seat one plays first.
    pub fn new(min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            stage: ReactionStage::Idle,
            current: Seat::First,
            attempts: [None; 2],
            min_delay,
            max_delay: max_delay.max(min_delay),
        }
    }

    /// Current stage.
    pub fn stage(&self) -> ReactionStage {
        self.stage
    }

    /// Seat whose attempt is in play.
    pub fn current(&self) -> Seat {
        self.current
    }

    /// Attempts recorded so far.
    pub fn attempts(&self) -> [Option<Attempt>; 2] {
        self.attempts
    }

    /// Start the current player's attempt. Returns the wait before the signal.
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Duration, MiniGameError> {
        if self.stage != ReactionStage::Idle {
            return Err(MiniGameError::NotAcceptingInput);
        }
        self.stage = ReactionStage::Waiting;
        let min = self.min_delay.as_millis() as u64;
        let max = self.max_delay.as_millis() as u64;
        Ok(Duration::from_millis(rng.random_range(min..=max)))
    }

    /// Show the signal.
    pub fn signal(&mut self, now: Instant) -> Result<(), MiniGameError> {
        if self.stage != ReactionStage::Waiting {
            return Err(MiniGameError::NotAcceptingInput);
        }
        self.stage = ReactionStage::Signalled(now);
        Ok(())
    }

    /// Register the current player's click. Returns the loser once both played.
    pub fn click(&mut self, now: Instant) -> Result<Option<Seat>, MiniGameError> {
        let attempt = match self.stage {
            ReactionStage::Waiting => Attempt::Early,
            ReactionStage::Signalled(shown) => {
                Attempt::Reacted(now.saturating_duration_since(shown))
            }
            ReactionStage::Idle | ReactionStage::Finished => {
                return Err(MiniGameError::NotAcceptingInput);
            }
        };
        self.attempts[self.current.index()] = Some(attempt);

        if self.current == Seat::First {
            self.current = Seat::Second;
            self.stage = ReactionStage::Idle;
            return Ok(None);
        }
        self.stage = ReactionStage::Finished;
        Ok(self.loser())
    }

    /// Loser once both played. An early click loses regardless of the other
    /// attempt; otherwise the slower player loses and a tie goes against seat two.
    pub fn loser(&self) -> Option<Seat> {
        if self.stage != ReactionStage::Finished {
            return None;
        }
        match self.attempts {
            [Some(Attempt::Early), _] => Some(Seat::First),
            [_, Some(Attempt::Early)] => Some(Seat::Second),
            [Some(Attempt::Reacted(first)), Some(Attempt::Reacted(second))] => {
                Some(if first > second {
                    Seat::First
                } else {
                    Seat::Second
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn test() -> ReactionTest {
        ReactionTest::new(Duration::from_millis(2000), Duration::from_millis(5000))
    }

    fn react(test: &mut ReactionTest, rng: &mut StdRng, after: Duration) -> Option<Seat> {
        test.start(rng).unwrap();
        let shown = Instant::now();
        test.signal(shown).unwrap();
        test.click(shown + after).unwrap()
    }

    #[test]
    fn delay_stays_within_bounds() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..100 {
            let mut test = test();
            let delay = test.start(&mut rng).unwrap();
            assert!(delay >= Duration::from_millis(2000) && delay <= Duration::from_millis(5000));
        }
    }

    #[test]
    fn slower_player_loses() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut test = test();
        assert_eq!(react(&mut test, &mut rng, Duration::from_millis(180)), None);
        assert_eq!(test.current(), Seat::Second);
        assert_eq!(
            react(&mut test, &mut rng, Duration::from_millis(240)),
            Some(Seat::Second)
        );

        let mut test = super::ReactionTest::new(Duration::ZERO, Duration::ZERO);
        react(&mut test, &mut rng, Duration::from_millis(300));
        assert_eq!(
            react(&mut test, &mut rng, Duration::from_millis(200)),
            Some(Seat::First)
        );
    }

    #[test]
    fn equal_times_go_against_second_seat() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut test = test();
        react(&mut test, &mut rng, Duration::from_millis(200));
        assert_eq!(
            react(&mut test, &mut rng, Duration::from_millis(200)),
            Some(Seat::Second)
        );
    }

    #[test]
    fn early_click_loses_whatever_the_other_does() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut test = test();
        test.start(&mut rng).unwrap();
        assert_eq!(test.click(Instant::now()), Ok(None));
        assert_eq!(test.attempts()[0], Some(Attempt::Early));
        assert_eq!(test.signal(Instant::now()), Err(MiniGameError::NotAcceptingInput));

        // The second player is much slower but still wins.
        assert_eq!(
            react(&mut test, &mut rng, Duration::from_secs(3)),
            Some(Seat::First)
        );
    }
}
