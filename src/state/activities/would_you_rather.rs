use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dao::models::Question,
    state::{
        activities::{Acknowledgement, ActivityError, Resolution, TurnKey, turn_key},
        cache::SelectionCache,
        game::{ActivityKind, ContentRecord, HistoryEntry, Player, now_millis},
        session::GameSession,
    },
};

/// Option picked by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Choice {
    /// First option.
    A,
    /// Second option.
    B,
}

/// Question shown for the current turn and the answer, once given.
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    /// Question being asked.
    pub question: Question,
    /// Picked option with the synthetic entry it produced.
    pub answer: Option<(Choice, HistoryEntry)>,
}

/// Binary-choice quiz; the chosen option becomes the recorded task.
#[derive(Debug, Default)]
pub struct WouldYouRather {
    round: SelectionCache<TurnKey, Round>,
}

/// Questions addressed to `player`, or every question when none are.
pub fn questions_for<'a>(questions: &'a [Question], player: &Player) -> Vec<&'a Question> {
    let matching: Vec<_> = questions
        .iter()
        .filter(|question| question.gender.is_none_or(|gender| gender == player.gender))
        .collect();
    if matching.is_empty() {
        questions.iter().collect()
    } else {
        matching
    }
}

impl WouldYouRather {
    /// No question drawn yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Round for the current turn, drawing a question if the turn or difficulty changed.
    pub fn prepare<R: Rng + ?Sized>(
        &mut self,
        session: &GameSession,
        questions: &[Question],
        rng: &mut R,
    ) -> Result<&Round, ActivityError> {
        self.refresh(session, questions, rng).map(|round| &*round)
    }

    /// Record the chosen option. Answering again replays the first answer.
    pub fn choose<R: Rng + ?Sized>(
        &mut self,
        session: &GameSession,
        questions: &[Question],
        choice: Choice,
        rng: &mut R,
    ) -> Result<Resolution, ActivityError> {
        let player = session.current_player().clone();
        let difficulty = session.difficulty();
        let round = self.refresh(session, questions, rng)?;
        if let Some((_, entry)) = &round.answer {
            return Ok(Resolution::replay(entry.clone()));
        }

        let description = match choice {
            Choice::A => round.question.option_a.clone(),
            Choice::B => round.question.option_b.clone(),
        };
        let record = ContentRecord {
            id: now_millis(),
            description,
            gender: player.gender,
            difficulty,
            activity: ActivityKind::WouldYouRather,
            timer: round.question.timer,
            categories: None,
        };
        let entry = HistoryEntry::new(ActivityKind::WouldYouRather, &player, record);
        round.answer = Some((choice, entry.clone()));
        Ok(Resolution::fresh(entry))
    }

    /// Round of the current turn, if drawn.
    pub fn round(&self, session: &GameSession) -> Option<&Round> {
        self.round.get(&turn_key(session))
    }

    /// Entry produced by the answer of the current turn.
    pub fn answered(&self, session: &GameSession) -> Option<&HistoryEntry> {
        self.round(session)
            .and_then(|round| round.answer.as_ref())
            .map(|(_, entry)| entry)
    }

    /// Close the round. Returns whether the activity is over (never).
    pub fn acknowledge(
        &mut self,
        session: &GameSession,
        ack: Acknowledgement,
    ) -> Result<bool, ActivityError> {
        if ack == Acknowledgement::Complete && self.answered(session).is_none() {
            return Err(ActivityError::NothingToComplete);
        }
        self.round.invalidate();
        Ok(false)
    }

    fn refresh<R: Rng + ?Sized>(
        &mut self,
        session: &GameSession,
        questions: &[Question],
        rng: &mut R,
    ) -> Result<&mut Round, ActivityError> {
        let player = session.current_player();
        self.round
            .refresh(&turn_key(session), || {
                questions_for(questions, player)
                    .choose(rng)
                    .map(|question| Round {
                        question: (*question).clone(),
                        answer: None,
                    })
            })
            .ok_or(ActivityError::NoEligibleContent(ActivityKind::WouldYouRather))
    }
}
