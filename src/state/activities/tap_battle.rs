use crate::state::{activities::mini_game::MiniGameError, game::Seat};

/// Progress of a tap battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapStage {
    /// Waiting for the start signal.
    Ready,
    /// Seconds left before tapping opens.
    Countdown(u32),
    /// Seconds of tapping left.
    Playing(u32),
    /// Time is up.
    Finished,
}

/// Both players tap as fast as they can for a fixed time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapBattle {
    stage: TapStage,
    scores: [u32; 2],
    countdown: u32,
    seconds: u32,
}

impl TapBattle {
    /// New battle with the given countdown and duration, in seconds.
    pub fn new(countdown: u32, seconds: u32) -> Self {
        Self {
            stage: TapStage::Ready,
            scores: [0; 2],
            countdown,
            seconds: seconds.max(1),
        }
    }

    /// Current stage.
    pub fn stage(&self) -> TapStage {
        self.stage
    }

    /// Taps per seat.
    pub fn scores(&self) -> [u32; 2] {
        self.scores
    }

    /// Begin the countdown. Returns the number of one-second ticks to deliver.
    pub fn start(&mut self) -> Result<u32, MiniGameError> {
        if self.stage != TapStage::Ready {
            return Err(MiniGameError::AlreadyStarted);
        }
        self.stage = if self.countdown == 0 {
            TapStage::Playing(self.seconds)
        } else {
            TapStage::Countdown(self.countdown)
        };
        Ok(self.countdown + self.seconds)
    }

    /// Advance one second. Returns the loser when time runs out.
    pub fn tick(&mut self) -> Option<Seat> {
        self.stage = match self.stage {
            TapStage::Countdown(1) => TapStage::Playing(self.seconds),
            TapStage::Countdown(left) => TapStage::Countdown(left.saturating_sub(1)),
            TapStage::Playing(1) => TapStage::Finished,
            TapStage::Playing(left) => TapStage::Playing(left.saturating_sub(1)),
            TapStage::Ready | TapStage::Finished => return None,
        };
        self.finished_loser(self.stage)
    }

    /// Count one tap; only taps while playing score.
    pub fn tap(&mut self, seat: Seat) -> Result<u32, MiniGameError> {
        if !matches!(self.stage, TapStage::Playing(_)) {
            return Err(MiniGameError::NotAcceptingInput);
        }
        let score = &mut self.scores[seat.index()];
        *score += 1;
        Ok(*score)
    }

    /// Loser once finished: seat one unless it tapped strictly more.
    pub fn loser(&self) -> Option<Seat> {
        self.finished_loser(self.stage)
    }

    fn finished_loser(&self, stage: TapStage) -> Option<Seat> {
        (stage == TapStage::Finished).then(|| {
            if self.scores[0] > self.scores[1] {
                Seat::Second
            } else {
                Seat::First
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(battle: &mut TapBattle, ticks: u32) -> Option<Seat> {
        (0..ticks).filter_map(|_| battle.tick()).last()
    }

    #[test]
    fn countdown_then_play_then_finish() {
        let mut battle = TapBattle::new(3, 10);
        assert_eq!(battle.tap(Seat::First), Err(MiniGameError::NotAcceptingInput));
        assert_eq!(battle.start(), Ok(13));
        assert_eq!(battle.start(), Err(MiniGameError::AlreadyStarted));

        assert_eq!(run(&mut battle, 3), None);
        assert_eq!(battle.stage(), TapStage::Playing(10));
        battle.tap(Seat::First).unwrap();
        battle.tap(Seat::First).unwrap();
        battle.tap(Seat::Second).unwrap();

        assert_eq!(run(&mut battle, 10), Some(Seat::Second));
        assert_eq!(battle.stage(), TapStage::Finished);
        assert_eq!(battle.tap(Seat::Second), Err(MiniGameError::NotAcceptingInput));
    }

    #[test]
    fn tie_goes_against_first_seat() {
        let mut battle = TapBattle::new(0, 1);
        battle.start().unwrap();
        battle.tap(Seat::First).unwrap();
        battle.tap(Seat::Second).unwrap();
        assert_eq!(battle.tick(), Some(Seat::First));
        assert_eq!(battle.loser(), Some(Seat::First));
    }
}
