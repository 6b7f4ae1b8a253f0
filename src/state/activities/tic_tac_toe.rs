use rand::Rng;
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::{activities::mini_game::MiniGameError, game::Seat, rules::coin_flip};

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Board mark. Seat one plays `X` and moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum Mark {
    /// Seat one.
    X,
    /// Seat two.
    O,
}

impl Mark {
    /// Seat playing this mark.
    pub fn seat(self) -> Seat {
        match self {
            Mark::X => Seat::First,
            Mark::O => Seat::Second,
        }
    }

    fn other(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// Final result of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Three in a row for the mark.
    Won(Mark),
    /// Full board without a line.
    Draw,
}

/// Classic three-by-three game; the loser receives the punishment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicTacToe {
    board: [Option<Mark>; 9],
    next: Mark,
    finished: Option<(Outcome, Seat)>,
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self {
            board: [None; 9],
            next: Mark::X,
            finished: None,
        }
    }
}

impl TicTacToe {
    /// Empty board, `X` to move.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cells in row-major order.
    pub fn board(&self) -> &[Option<Mark>; 9] {
        &self.board
    }

    /// Mark to move next.
    pub fn next(&self) -> Mark {
        self.next
    }

    /// Result and loser once the game is over.
    pub fn finished(&self) -> Option<(Outcome, Seat)> {
        self.finished
    }

    /// Place the mark of `seat` on `cell`. Returns the loser when the move ends the game.
    ///
    /// A draw picks the loser uniformly at random.
    pub fn play<R: Rng + ?Sized>(
        &mut self,
        seat: Seat,
        cell: usize,
        rng: &mut R,
    ) -> Result<Option<Seat>, MiniGameError> {
        if self.finished.is_some() {
            return Err(MiniGameError::NotAcceptingInput);
        }
        if seat != self.next.seat() {
            return Err(MiniGameError::NotYourTurn(seat));
        }
        let slot = self
            .board
            .get_mut(cell)
            .ok_or(MiniGameError::CellOutOfRange(cell))?;
        if slot.is_some() {
            return Err(MiniGameError::CellTaken(cell));
        }
        *slot = Some(self.next);

        let outcome = if self.has_line(self.next) {
            Some(Outcome::Won(self.next))
        } else if self.board.iter().all(Option::is_some) {
            Some(Outcome::Draw)
        } else {
            None
        };

        match outcome {
            Some(outcome) => {
                let loser = match outcome {
                    Outcome::Won(mark) => mark.other().seat(),
                    Outcome::Draw => coin_flip(rng),
                };
                self.finished = Some((outcome, loser));
                Ok(Some(loser))
            }
            None => {
                self.next = self.next.other();
                Ok(None)
            }
        }
    }

    fn has_line(&self, mark: Mark) -> bool {
        LINES
            .iter()
            .any(|line| line.iter().all(|cell| self.board[*cell] == Some(mark)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn play_all(game: &mut TicTacToe, cells: &[usize], rng: &mut StdRng) -> Option<Seat> {
        let mut loser = None;
        for (turn, cell) in cells.iter().enumerate() {
            let seat = if turn % 2 == 0 { Seat::First } else { Seat::Second };
            loser = game.play(seat, *cell, rng).unwrap();
        }
        loser
    }

    #[test]
    fn x_line_makes_o_lose() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut game = TicTacToe::new();
            // X: 0, 1, 2 ; O: 3, 4
            let loser = play_all(&mut game, &[0, 3, 1, 4, 2], &mut rng);
            assert_eq!(loser, Some(Seat::Second));
            assert_eq!(game.finished(), Some((Outcome::Won(Mark::X), Seat::Second)));
        }
    }

    #[test]
    fn o_line_makes_x_lose() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut game = TicTacToe::new();
        let loser = play_all(&mut game, &[0, 2, 1, 4, 8, 6], &mut rng);
        assert_eq!(loser, Some(Seat::First));
    }

    #[test]
    fn moves_are_validated() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut game = TicTacToe::new();
        assert_eq!(
            game.play(Seat::Second, 0, &mut rng),
            Err(MiniGameError::NotYourTurn(Seat::Second))
        );
        game.play(Seat::First, 4, &mut rng).unwrap();
        assert_eq!(
            game.play(Seat::Second, 4, &mut rng),
            Err(MiniGameError::CellTaken(4))
        );
        assert_eq!(
            game.play(Seat::Second, 9, &mut rng),
            Err(MiniGameError::CellOutOfRange(9))
        );
    }

    #[test]
    fn draw_loser_is_uniform() {
        // X O X / X O O / O X X
        const DRAW: [usize; 9] = [0, 1, 2, 4, 3, 5, 7, 6, 8];
        const TRIALS: u32 = 2000;

        let mut rng = StdRng::seed_from_u64(2024);
        let mut first = 0u32;
        for _ in 0..TRIALS {
            let mut game = TicTacToe::new();
            let loser = play_all(&mut game, &DRAW, &mut rng);
            assert_eq!(game.finished().map(|(outcome, _)| outcome), Some(Outcome::Draw));
            if loser == Some(Seat::First) {
                first += 1;
            }
        }

        let expected = f64::from(TRIALS) / 2.0;
        let second = TRIALS - first;
        let chi_square = (f64::from(first) - expected).powi(2) / expected
            + (f64::from(second) - expected).powi(2) / expected;
        // 99.9th percentile of chi-square with one degree of freedom.
        assert!(chi_square < 10.83, "chi-square {chi_square} ({first} vs {second})");
    }
}
