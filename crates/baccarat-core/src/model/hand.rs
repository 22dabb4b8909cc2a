use crate::model::card::Card;
use crate::model::shoe::Shoe;
use serde::{Deserialize, Serialize};

/// A baccarat hand holds two or three cards in deal order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaccaratHand {
    cards: Vec<Card>,
}

impl BaccaratHand {
    pub fn new() -> Self {
        Self {
            cards: Vec::with_capacity(3),
        }
    }

    /// The opening two cards of a round.
    pub fn deal_two(shoe: &mut Shoe) -> Self {
        let mut hand = Self::new();
        hand.add(shoe.draw());
        hand.add(shoe.draw());
        hand
    }

    /// Appends a card. A hand never holds more than three cards; the
    /// third-card protocol draws at most once per side.
    pub fn add(&mut self, card: Card) {
        assert!(self.cards.len() < 3, "baccarat hand already holds 3 cards");
        self.cards.push(card);
    }

    /// Mod-10 sum of point values, always in `[0, 9]`.
    pub fn total(&self) -> u8 {
        let sum: u32 = self.cards.iter().map(|c| u32::from(c.point_value())).sum();
        (sum % 10) as u8
    }

    /// A natural is an 8 or 9 on exactly two cards and ends all drawing.
    pub fn is_natural(&self) -> bool {
        self.cards.len() == 2 && matches!(self.total(), 8 | 9)
    }

    /// First two cards share a rank; suits are irrelevant.
    pub fn is_pair(&self) -> bool {
        match self.cards.as_slice() {
            [first, second, ..] => first.rank == second.rank,
            _ => false,
        }
    }

    pub fn third_card(&self) -> Option<Card> {
        self.cards.get(2).copied()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }
}
