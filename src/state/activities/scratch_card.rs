use rand::Rng;

use crate::state::{
    activities::{Acknowledgement, ActivityError, Resolution, TurnKey, turn_key},
    cache::SelectionCache,
    game::{ActivityKind, ContentRecord, HistoryEntry},
    selection::ContentPool,
    session::GameSession,
};

/// One card of the deck.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    /// Hidden record.
    pub record: ContentRecord,
    /// Whether the card was already played.
    pub scratched: bool,
}

/// Cards dealt for the current turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Deck {
    /// Cards in table order.
    pub cards: Vec<Card>,
    /// Card revealed this round and the entry it produced.
    pub revealed: Option<(usize, HistoryEntry)>,
}

impl Deck {
    fn remaining(&self) -> usize {
        self.cards.iter().filter(|card| !card.scratched).count()
    }
}

/// Deck of scratch cards. Cards are dealt without regard to gender.
#[derive(Debug)]
pub struct ScratchCards {
    deck_size: usize,
    deck: SelectionCache<TurnKey, Deck>,
}

impl ScratchCards {
    /// Empty table; cards are dealt on first use.
    pub fn new(deck_size: usize) -> Self {
        Self {
            deck_size,
            deck: SelectionCache::new(),
        }
    }

    /// Deck for the current turn, redealt if the turn or difficulty changed.
    pub fn prepare<R: Rng + ?Sized>(
        &mut self,
        session: &GameSession,
        pool: &ContentPool,
        rng: &mut R,
    ) -> Result<&Deck, ActivityError> {
        self.refresh(session, pool, rng).map(|deck| &*deck)
    }

    /// Reveal a card. Revealing the pending card again replays it.
    pub fn reveal<R: Rng + ?Sized>(
        &mut self,
        session: &GameSession,
        pool: &ContentPool,
        index: usize,
        rng: &mut R,
    ) -> Result<Resolution, ActivityError> {
        let player = session.current_player().clone();
        let deck = self.refresh(session, pool, rng)?;

        if let Some((pending, entry)) = &deck.revealed {
            return if *pending == index {
                Ok(Resolution::replay(entry.clone()))
            } else {
                Err(ActivityError::CardPending(*pending))
            };
        }

        let card = deck
            .cards
            .get(index)
            .ok_or(ActivityError::CardOutOfRange(index))?;
        if card.scratched {
            return Err(ActivityError::CardScratched(index));
        }

        let entry = HistoryEntry::new(ActivityKind::ScratchCard, &player, card.record.clone());
        deck.revealed = Some((index, entry.clone()));
        Ok(Resolution::fresh(entry))
    }

    /// Deck for the current turn, if dealt.
    pub fn deck(&self, session: &GameSession) -> Option<&Deck> {
        self.deck.get(&turn_key(session))
    }

    /// Entry of the revealed card.
    pub fn revealed(&self, session: &GameSession) -> Option<&HistoryEntry> {
        self.deck(session)
            .and_then(|deck| deck.revealed.as_ref())
            .map(|(_, entry)| entry)
    }

    /// Mark the revealed card as played. Returns true once the deck is used up.
    pub fn acknowledge(
        &mut self,
        session: &GameSession,
        ack: Acknowledgement,
    ) -> Result<bool, ActivityError> {
        let Some(deck) = self.deck.get_mut(&turn_key(session)) else {
            return match ack {
                Acknowledgement::Complete => Err(ActivityError::NothingToComplete),
                Acknowledgement::Skip => Ok(false),
            };
        };

        match (ack, deck.revealed.take()) {
            (Acknowledgement::Complete, Some((index, _))) => {
                deck.cards[index].scratched = true;
                Ok(deck.remaining() == 0)
            }
            (Acknowledgement::Complete, None) => Err(ActivityError::NothingToComplete),
            (Acknowledgement::Skip, _) => Ok(false),
        }
    }

    fn refresh<R: Rng + ?Sized>(
        &mut self,
        session: &GameSession,
        pool: &ContentPool,
        rng: &mut R,
    ) -> Result<&mut Deck, ActivityError> {
        let size = self.deck_size.max(1);
        self.deck
            .refresh(&turn_key(session), || {
                let cards: Vec<_> = pool
                    .draw(None, size, session.focus(), rng)
                    .into_iter()
                    .map(|record| Card {
                        record,
                        scratched: false,
                    })
                    .collect();
                (!cards.is_empty()).then_some(Deck {
                    cards,
                    revealed: None,
                })
            })
            .ok_or(ActivityError::NoEligibleContent(ActivityKind::ScratchCard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::game::{Difficulty, Gender, Player};
    use rand::{SeedableRng, rngs::StdRng};

    fn pool() -> ContentPool {
        ContentPool::new(
            Difficulty::Easy,
            ActivityKind::ScratchCard,
            vec![ContentRecord {
                id: 1,
                description: "Compliment your partner".into(),
                gender: Gender::Female,
                difficulty: Difficulty::Easy,
                activity: ActivityKind::ScratchCard,
                timer: None,
                categories: None,
            }],
        )
    }

    fn session() -> GameSession {
        let mut session = GameSession::new();
        session.initialize_players(
            Player::new("Alex", Gender::Male),
            Player::new("Sam", Gender::Female),
            Difficulty::Easy,
        );
        session
    }

    #[test]
    fn deck_is_dealt_regardless_of_gender() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut cards = ScratchCards::new(10);
        // Only female records exist, yet the male player still gets a full deck.
        let deck = cards.prepare(&session(), &pool(), &mut rng).unwrap();
        assert_eq!(deck.cards.len(), 10);
    }

    #[test]
    fn revealing_twice_does_not_resolve_again() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut cards = ScratchCards::new(10);
        let session = session();

        let first = cards.reveal(&session, &pool(), 3, &mut rng).unwrap();
        assert!(first.fresh);
        let again = cards.reveal(&session, &pool(), 3, &mut rng).unwrap();
        assert!(!again.fresh);
        assert_eq!(
            cards.reveal(&session, &pool(), 4, &mut rng),
            Err(ActivityError::CardPending(3))
        );
    }

    #[test]
    fn completed_card_cannot_be_replayed() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut cards = ScratchCards::new(2);
        let session = session();

        cards.reveal(&session, &pool(), 0, &mut rng).unwrap();
        assert_eq!(cards.acknowledge(&session, Acknowledgement::Complete), Ok(false));
        assert_eq!(
            cards.reveal(&session, &pool(), 0, &mut rng),
            Err(ActivityError::CardScratched(0))
        );
        assert_eq!(
            cards.reveal(&session, &pool(), 7, &mut rng),
            Err(ActivityError::CardOutOfRange(7))
        );

        cards.reveal(&session, &pool(), 1, &mut rng).unwrap();
        assert_eq!(cards.acknowledge(&session, Acknowledgement::Complete), Ok(true));
    }

    #[test]
    fn turn_change_redeals() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut cards = ScratchCards::new(3);
        let mut session = session();
        cards.reveal(&session, &pool(), 0, &mut rng).unwrap();

        session.switch_turn();
        assert!(cards.revealed(&session).is_none());
        let deck = cards.prepare(&session, &pool(), &mut rng).unwrap();
        assert!(deck.cards.iter().all(|card| !card.scratched));
        assert!(deck.revealed.is_none());
    }
}
