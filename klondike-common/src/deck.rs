use crate::board::{Board, TOTAL_TABLEAUS};
use crate::card::{Card, MAX_CARD};

use rand::Rng;

/// The 52 cards, face-down, suit-major (hearts, diamonds, clubs, spades), Ace to King.
pub fn build_deck() -> Vec<Card> {
    (0..MAX_CARD).map(Card::new_with_id).collect()
}

/// Fisher-Yates, walking from the last index down.
pub fn shuffle<R: Rng + ?Sized>(deck: &mut [Card], rng: &mut R) {
    for i in (1..deck.len()).rev() {
        let j = rng.random_range(0..=i);
        deck.swap(i, j);
    }
}

pub fn deal(deck: Vec<Card>) -> Board {
    let mut board = Board::new();
    Dealer::new(deck).finish(&mut board);
    board
}

/// Deals the tableau one card at a time so a front-end can pace the placement.
///
/// Pass `p` puts one card on each pile `p..7`, popping from the end of the deck.
/// The card landing on pile `p` during pass `p` is its last one and the only one
/// dealt face-up.
#[derive(Debug, Clone)]
pub struct Dealer {
    deck: Vec<Card>,
    pass: usize,
    pile: usize,
}

impl Dealer {
    pub fn new(deck: Vec<Card>) -> Self {
        Self {
            deck,
            pass: 0,
            pile: 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.pass >= TOTAL_TABLEAUS || self.deck.is_empty()
    }

    /// Cards not yet placed, including the ones destined for the stock.
    pub fn remaining(&self) -> usize {
        self.deck.len()
    }

    /// Places the next card and returns the tableau that received it.
    pub fn step(&mut self, board: &mut Board) -> Option<usize> {
        if self.pass >= TOTAL_TABLEAUS {
            return None;
        }
        let mut card = self.deck.pop()?;
        card.face_up = self.pile == self.pass;
        let pile = self.pile;
        board.tableaus[pile].push(card);

        self.pile += 1;
        if self.pile == TOTAL_TABLEAUS {
            self.pass += 1;
            self.pile = self.pass;
        }
        Some(pile)
    }

    /// Deals whatever is left of the tableau, then hands the rest to the stock.
    pub fn finish(mut self, board: &mut Board) {
        while self.step(board).is_some() {}
        board.stock.cards.extend(self.deck.into_iter().map(|mut card| {
            card.face_up = false;
            card
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::TALON_SIZE;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_build_deck_order() {
        let deck = build_deck();
        assert_eq!(deck.len(), 52);
        assert_eq!(deck[0].to_string(), "A♥");
        assert_eq!(deck[13].to_string(), "A♦");
        assert_eq!(deck[51].to_string(), "K♠");
        assert!(deck.iter().all(|card| !card.face_up));
    }

    #[test]
    fn test_shuffle_is_reproducible_permutation() {
        let mut a = build_deck();
        let mut b = build_deck();
        shuffle(&mut a, &mut StdRng::seed_from_u64(7));
        shuffle(&mut b, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert_ne!(a, build_deck());

        let mut ids: Vec<u8> = a.iter().map(Card::id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..52).collect::<Vec<u8>>());
    }

    #[test]
    fn test_deal_unshuffled() {
        let board = deal(build_deck());
        assert!(board.is_valid());
        assert_eq!(board.stock.len(), TALON_SIZE);
        assert!(board.waste.is_empty());
        for (k, tableau) in board.tableaus.iter().enumerate() {
            assert_eq!(tableau.len(), k + 1);
            assert_eq!(tableau.face_up_run().len(), 1);
            assert_eq!(tableau.first_face_up(), Some(k));
        }
        let last = &board.tableaus[6];
        assert_eq!(last.len(), 7);
        assert_eq!(last.face_down_count(), 6);

        // The first card popped is the deck's last one, face-up on pile 0.
        assert_eq!(board.tableaus[0].peek_top().unwrap().to_string(), "K♠");
        // The stock keeps the deck order.
        let stock: Vec<String> = board.stock.iter().map(|c| c.to_string()).collect();
        assert_eq!(stock.first().map(String::as_str), Some("A♥"));
        assert_eq!(stock.last().map(String::as_str), Some("J♦"));
    }

    #[test]
    fn test_dealer_steps() {
        let mut board = Board::new();
        let mut dealer = Dealer::new(build_deck());
        let piles: Vec<usize> = std::iter::from_fn(|| dealer.step(&mut board)).collect();
        assert_eq!(piles.len(), 28);
        assert_eq!(&piles[..8], &[0, 1, 2, 3, 4, 5, 6, 1]);
        assert!(dealer.is_finished());
        assert_eq!(dealer.remaining(), TALON_SIZE);
        dealer.finish(&mut board);
        assert!(board.is_valid());
    }
}
