use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// A legislative card. Sabotage cards advance the Impostor team; Security
/// cards advance the Crewmate team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyCard {
    Sabotage,
    Security,
}

/// Failure modes for `Deck::draw`. Drawing more cards than the deck plus
/// discard pile can supply, even after a reshuffle, is the only error case;
/// everything else is an internal invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckError {
    /// Draw pile and discard pile were both empty (or insufficient) when a
    /// reshuffle was attempted.
    DeckExhausted { requested: usize, available: usize },
}

impl std::fmt::Display for DeckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeckError::DeckExhausted { requested, available } => write!(
                f,
                "deck exhausted: requested {requested} card(s), only {available} available",
            ),
        }
    }
}

impl std::error::Error for DeckError {}

/// A draw pile plus discard pile over `PolicyCard`s. Deterministic when
/// constructed `with_seed`; non-reproducible via `rand::rng()` otherwise.
/// Mirrors `cards::Deck`'s draw/reshuffle discipline: the deck has no
/// opinion about how many cards a game ought to deal, only about what it
/// was constructed with.
#[derive(Debug, Clone)]
pub struct Deck {
    draw_pile: Vec<PolicyCard>,
    discard_pile: Vec<PolicyCard>,
}

impl Deck {
    /// Builds a deck with `total_sabotage` sabotage cards and
    /// `total_security` security cards, shuffled with a seeded RNG for
    /// reproducible rollouts.
    pub fn with_seed(total_sabotage: usize, total_security: usize, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        Self::build(total_sabotage, total_security, &mut rng)
    }

    /// Builds a deck shuffled with a non-reproducible RNG, for opponents or
    /// demo play that should not be tied to a fixed seed.
    pub fn new(total_sabotage: usize, total_security: usize) -> Self {
        let mut rng = rand::rng();
        Self::build(total_sabotage, total_security, &mut rng)
    }

    fn build(total_sabotage: usize, total_security: usize, rng: &mut impl rand::Rng) -> Self {
        let mut draw_pile = Vec::with_capacity(total_sabotage + total_security);
        draw_pile.extend(std::iter::repeat(PolicyCard::Sabotage).take(total_sabotage));
        draw_pile.extend(std::iter::repeat(PolicyCard::Security).take(total_security));
        draw_pile.shuffle(rng);
        Self { draw_pile, discard_pile: Vec::new() }
    }

    /// Draws `count` cards off the top of the draw pile, reshuffling the
    /// discard pile back in if the draw pile runs short. Order among drawn
    /// cards is the draw order, not re-sorted.
    pub fn draw(&mut self, count: usize) -> Result<Vec<PolicyCard>, DeckError> {
        if self.draw_pile.len() < count {
            self.reshuffle_discard()?;
        }
        if self.draw_pile.len() < count {
            return Err(DeckError::DeckExhausted {
                requested: count,
                available: self.draw_pile.len() + self.discard_pile.len(),
            });
        }
        Ok(self.draw_pile.split_off(self.draw_pile.len() - count))
    }

    fn reshuffle_discard(&mut self) -> Result<(), DeckError> {
        if self.discard_pile.is_empty() {
            return Ok(());
        }
        let mut rng = rand::rng();
        self.discard_pile.shuffle(&mut rng);
        self.draw_pile.append(&mut self.discard_pile);
        Ok(())
    }

    pub fn add_to_discard(&mut self, card: PolicyCard) {
        self.discard_pile.push(card);
    }

    pub fn remaining(&self) -> usize {
        self.draw_pile.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reproducible_with_same_seed() {
        let mut a = Deck::with_seed(11, 6, 42);
        let mut b = Deck::with_seed(11, 6, 42);
        assert_eq!(a.draw(5).unwrap(), b.draw(5).unwrap());
    }

    #[test]
    fn reshuffles_discard_when_draw_pile_runs_short() {
        let mut deck = Deck::with_seed(2, 1, 7);
        let first = deck.draw(3).unwrap();
        assert_eq!(deck.remaining(), 0);
        for card in first {
            deck.add_to_discard(card);
        }
        let second = deck.draw(3).unwrap();
        assert_eq!(second.len(), 3);
    }

    #[test]
    fn exhausted_when_nothing_left_to_reshuffle() {
        let mut deck = Deck::with_seed(1, 1, 3);
        let err = deck.draw(5).unwrap_err();
        assert_eq!(err, DeckError::DeckExhausted { requested: 5, available: 2 });
    }
}
