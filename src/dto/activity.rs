//! Wire projections of the live activity and the requests driving it.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    dto::strip::StripView,
    state::{
        activities::{
            ActivityInstance, Resolution,
            body_explorer::{BodyExplorer, BodyView},
            mini_game::{MiniGame, MiniGameKind, MiniGames},
            reaction_test::{Attempt, ReactionStage},
            scratch_card::ScratchCards,
            spin_wheel::SpinWheel,
            tap_battle::TapStage,
            tic_tac_toe::{Mark, Outcome},
            would_you_rather::{Choice, WouldYouRather},
        },
        game::{ActivityKind, ContentRecord, HistoryEntry, Seat},
        session::GameSession,
    },
};

/// Snapshot of the activity on screen; `kind` is absent while the picker is shown.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityView {
    pub kind: Option<ActivityKind>,
    /// Record awaiting acknowledgement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presented: Option<HistoryEntry>,
    /// Seconds to count down while the record is shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wheel: Option<WheelView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cards: Option<DeckView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exploration: Option<ExplorationView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mini_game: Option<MiniGameView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strip: Option<StripView>,
}

impl ActivityView {
    /// Project the live activity as seen by the current turn.
    pub fn build(instance: Option<&ActivityInstance>, session: &GameSession) -> Self {
        let Some(instance) = instance else {
            return Self::default();
        };
        let presented = instance.presented(session).cloned();
        let mut view = Self {
            kind: Some(instance.kind()),
            countdown: presented.as_ref().and_then(|entry| entry.record.countdown()),
            presented,
            ..Self::default()
        };
        match instance {
            ActivityInstance::SpinWheel(wheel) => view.wheel = WheelView::build(wheel, session),
            ActivityInstance::ScratchCard(cards) => view.cards = DeckView::build(cards, session),
            ActivityInstance::BodyExplorer(explorer) => {
                view.exploration = ExplorationView::build(explorer, session)
            }
            ActivityInstance::WouldYouRather(quiz) => {
                view.question = QuestionView::build(quiz, session)
            }
            ActivityInstance::MiniGame(games) => view.mini_game = Some(MiniGameView::build(games)),
            ActivityInstance::StripGame(game) => view.strip = Some(StripView::from(game)),
        }
        view
    }
}

/// Segments of the wheel drawn for the current turn.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WheelView {
    pub segments: Vec<ContentRecord>,
    /// Segment the wheel stopped on this turn.
    pub landed: Option<usize>,
}

impl WheelView {
    fn build(wheel: &SpinWheel, session: &GameSession) -> Option<Self> {
        wheel.wheel(session).map(|wheel| Self {
            segments: wheel.segments.clone(),
            landed: wheel.landed.as_ref().map(|(index, _)| *index),
        })
    }
}

/// Table of scratch cards; hidden cards do not expose their record.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeckView {
    pub cards: Vec<CardView>,
    pub remaining: usize,
}

/// One card of the table.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CardView {
    pub index: usize,
    pub scratched: bool,
    pub revealed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<ContentRecord>,
}

impl DeckView {
    fn build(cards: &ScratchCards, session: &GameSession) -> Option<Self> {
        let deck = cards.deck(session)?;
        let revealed = deck.revealed.as_ref().map(|(index, _)| *index);
        let cards: Vec<_> = deck
            .cards
            .iter()
            .enumerate()
            .map(|(index, card)| {
                let revealed = revealed == Some(index);
                CardView {
                    index,
                    scratched: card.scratched,
                    revealed,
                    record: (card.scratched || revealed).then(|| card.record.clone()),
                }
            })
            .collect();
        Some(Self {
            remaining: cards.iter().filter(|card| !card.scratched).count(),
            cards,
        })
    }
}

/// Body part picked for the current turn.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExplorationView {
    pub part_id: String,
    pub part_name: String,
    pub view: BodyView,
}

impl ExplorationView {
    fn build(explorer: &BodyExplorer, session: &GameSession) -> Option<Self> {
        explorer.current(session).map(|found| Self {
            part_id: found.part.id.to_string(),
            part_name: found.part.name.to_string(),
            view: found.view,
        })
    }
}

/// Question asked on the current turn.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub option_a: String,
    pub option_b: String,
    pub answer: Option<Choice>,
}

impl QuestionView {
    fn build(quiz: &WouldYouRather, session: &GameSession) -> Option<Self> {
        quiz.round(session).map(|round| Self {
            description: round.question.description.clone(),
            option_a: round.question.option_a.clone(),
            option_b: round.question.option_b.clone(),
            answer: round.answer.as_ref().map(|(choice, _)| *choice),
        })
    }
}

/// Mini-game selector and the game picked from it.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MiniGameView {
    pub game: Option<MiniGameKind>,
    /// Seat index of the loser once the game is over.
    pub loser: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tap_battle: Option<TapBattleView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reaction_test: Option<ReactionTestView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tic_tac_toe: Option<TicTacToeView>,
}

impl MiniGameView {
    fn build(games: &MiniGames) -> Self {
        let mut view = Self {
            game: games.current().map(MiniGame::kind),
            loser: games.loser().map(u8::from),
            tap_battle: None,
            reaction_test: None,
            tic_tac_toe: None,
        };
        match games.current() {
            Some(MiniGame::TapBattle(battle)) => {
                let (stage, seconds_left) = match battle.stage() {
                    TapStage::Ready => ("ready", 0),
                    TapStage::Countdown(left) => ("countdown", left),
                    TapStage::Playing(left) => ("playing", left),
                    TapStage::Finished => ("finished", 0),
                };
                view.tap_battle = Some(TapBattleView {
                    stage: stage.to_string(),
                    seconds_left,
                    scores: battle.scores().to_vec(),
                });
            }
            Some(MiniGame::ReactionTest(test)) => {
                let stage = match test.stage() {
                    ReactionStage::Idle => "idle",
                    ReactionStage::Waiting => "waiting",
                    ReactionStage::Signalled(_) => "signalled",
                    ReactionStage::Finished => "finished",
                };
                view.reaction_test = Some(ReactionTestView {
                    stage: stage.to_string(),
                    current: test.current().into(),
                    attempts: test
                        .attempts()
                        .iter()
                        .map(|attempt| attempt.map(AttemptView::from))
                        .collect(),
                });
            }
            Some(MiniGame::TicTacToe(game)) => {
                let (winner, draw) = match game.finished() {
                    Some((Outcome::Won(mark), _)) => (Some(mark), false),
                    Some((Outcome::Draw, _)) => (None, true),
                    None => (None, false),
                };
                view.tic_tac_toe = Some(TicTacToeView {
                    board: game.board().to_vec(),
                    next: game.next(),
                    winner,
                    draw,
                });
            }
            None => {}
        }
        view
    }
}

/// Tap battle progress.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TapBattleView {
    /// `ready`, `countdown`, `playing` or `finished`.
    pub stage: String,
    pub seconds_left: u32,
    /// Taps per seat.
    pub scores: Vec<u32>,
}

/// Reaction test progress.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReactionTestView {
    /// `idle`, `waiting`, `signalled` or `finished`.
    pub stage: String,
    /// Seat index whose attempt is in play.
    pub current: u8,
    pub attempts: Vec<Option<AttemptView>>,
}

/// Recorded reaction attempt.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttemptView {
    pub early: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reaction_ms: Option<u64>,
}

impl From<Attempt> for AttemptView {
    fn from(value: Attempt) -> Self {
        match value {
            Attempt::Early => Self {
                early: true,
                reaction_ms: None,
            },
            Attempt::Reacted(elapsed) => Self {
                early: false,
                reaction_ms: Some(elapsed.as_millis() as u64),
            },
        }
    }
}

/// Tic-tac-toe board in row-major order.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TicTacToeView {
    pub board: Vec<Option<Mark>>,
    pub next: Mark,
    pub winner: Option<Mark>,
    pub draw: bool,
}

/// Record resolved by an activity operation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResolutionView {
    pub entry: HistoryEntry,
    /// False when the round was already resolved and this is a redisplay.
    pub fresh: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown: Option<u32>,
    /// Wheel segment the spin stopped on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<usize>,
}

impl From<Resolution> for ResolutionView {
    fn from(value: Resolution) -> Self {
        Self {
            countdown: value.entry.record.countdown(),
            entry: value.entry,
            fresh: value.fresh,
            segment: None,
        }
    }
}

/// Answer to the would-you-rather question.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChoiceRequest {
    pub choice: Choice,
}

/// Pick a game from the mini-game selector.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectGameRequest {
    pub game: MiniGameKind,
}

/// Input attributed to one seat.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SeatRequest {
    /// Seat index, 0 or 1.
    pub seat: u8,
}

impl Validate for SeatRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        seat_errors(self.seat)
    }
}

impl SeatRequest {
    /// Seat addressed by the request.
    pub fn seat(&self) -> Seat {
        seat_of(self.seat)
    }
}

/// Tic-tac-toe move.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MoveRequest {
    /// Seat index, 0 or 1.
    pub seat: u8,
    /// Cell in row-major order, 0 to 8.
    pub cell: usize,
}

impl Validate for MoveRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        seat_errors(self.seat)
    }
}

impl MoveRequest {
    /// Seat addressed by the request.
    pub fn seat(&self) -> Seat {
        seat_of(self.seat)
    }
}

/// Tap count after a tap.
#[derive(Debug, Serialize, ToSchema)]
pub struct TapResponse {
    pub score: u32,
}

/// Validates that a seat index is 0 or 1.
pub fn validate_seat(seat: u8) -> Result<(), ValidationError> {
    if Seat::try_from(seat).is_err() {
        let mut err = ValidationError::new("seat_range");
        err.message = Some("Seat must be 0 or 1".into());
        return Err(err);
    }
    Ok(())
}

fn seat_errors(seat: u8) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if let Err(e) = validate_seat(seat) {
        errors.add("seat", e);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn seat_of(index: u8) -> Seat {
    Seat::try_from(index).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        activities::ActivitySettings,
        game::{Difficulty, Gender, Player},
        selection::ContentPool,
    };
    use rand::{SeedableRng, rngs::StdRng};

    fn session() -> GameSession {
        let mut session = GameSession::new();
        session.initialize_players(
            Player::new("Alex", Gender::Male),
            Player::new("Sam", Gender::Female),
            Difficulty::Easy,
        );
        session
    }

    fn pool() -> ContentPool {
        let records = (0..12)
            .map(|id| ContentRecord {
                id,
                description: format!("card {id}"),
                gender: if id % 2 == 0 { Gender::Male } else { Gender::Female },
                difficulty: Difficulty::Easy,
                activity: ActivityKind::ScratchCard,
                timer: Some(15),
                categories: None,
            })
            .collect();
        ContentPool::new(Difficulty::Easy, ActivityKind::ScratchCard, records)
    }

    #[test]
    fn hidden_cards_do_not_leak_their_record() {
        let session = session();
        let mut instance = ActivityInstance::enter(
            ActivityKind::ScratchCard,
            &session,
            &ActivitySettings::default(),
        );
        let ActivityInstance::ScratchCard(cards) = &mut instance else {
            unreachable!()
        };
        let mut rng = StdRng::seed_from_u64(3);
        cards.reveal(&session, &pool(), 4, &mut rng).unwrap();

        let view = ActivityView::build(Some(&instance), &session);
        let deck = view.cards.unwrap();
        assert_eq!(deck.cards.len(), 10);
        assert!(deck.cards[4].revealed && deck.cards[4].record.is_some());
        assert!(deck.cards.iter().filter(|c| c.record.is_some()).count() == 1);
        assert_eq!(view.countdown, Some(15));
        assert_eq!(view.presented.unwrap().player_name, "Alex");
    }

    #[test]
    fn picker_view_is_empty() {
        let view = ActivityView::build(None, &session());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": null }));
    }

    #[test]
    fn seat_validation_rejects_out_of_range_index() {
        assert!(SeatRequest { seat: 1 }.validate().is_ok());
        assert!(SeatRequest { seat: 2 }.validate().is_err());
    }
}
