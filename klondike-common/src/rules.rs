//! Move legality. Everything here is a pure function of the board.

use crate::board::{Board, PileId, TOTAL_FOUNDATIONS};
use crate::card::Card;

/// Whether `card` may be placed on a foundation whose top is `top`.
pub fn can_stack_foundation(top: Option<&Card>, card: &Card) -> bool {
    match top {
        None => card.is_ace(),
        Some(top) => top.suit() == card.suit() && card.rank() == top.rank() + 1,
    }
}

/// Whether `card` may be placed on a tableau whose top is `top`.
pub fn can_stack_tableau(top: Option<&Card>, card: &Card) -> bool {
    match top {
        None => card.is_king(),
        Some(top) => top.face_up && top.color() != card.color() && card.rank() + 1 == top.rank(),
    }
}

impl Board {
    /// Checks the foundation of the card's own suit only.
    pub fn can_move_to_foundation(&self, card: &Card) -> bool {
        can_stack_foundation(self.foundation(card.suit()).peek_top(), card)
    }

    /// For a run, pass the lead card.
    pub fn can_move_to_tableau(&self, card: &Card, target: usize) -> bool {
        self.tableaus
            .get(target)
            .is_some_and(|tableau| can_stack_tableau(tableau.peek_top(), card))
    }

    /// Drag-and-drop probe. `cards[0]` is the lead card of the dragged group.
    pub fn can_drop_cards(&self, cards: &[Card], target: PileId) -> bool {
        let Some(lead) = cards.first() else {
            return false;
        };
        match target {
            PileId::Foundation(idx) => {
                idx < TOTAL_FOUNDATIONS && cards.len() == 1 && self.can_move_to_foundation(lead)
            }
            PileId::Tableau(idx) => self.can_move_to_tableau(lead, idx),
            PileId::Stock | PileId::Waste => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Suit;

    fn card(s: &str) -> Card {
        let mut chars = s.chars();
        let (rank, suit) = (chars.next().unwrap(), chars.next().unwrap());
        Card::parse(rank, suit).unwrap().face_up()
    }

    #[test]
    fn test_foundation_requires_ace_first() {
        let board = Board::parse("Waste: 2♥A♥").unwrap();
        assert!(!board.can_move_to_foundation(&card("2♥")));
        assert!(board.can_move_to_foundation(&card("A♥")));

        let mut board = board;
        assert_eq!(board.move_waste_to_foundation(), Some(card("A♥")));
        assert_eq!(board.foundation(Suit::Hearts).len(), 1);
        assert!(board.can_move_to_foundation(&card("2♥")));
        assert!(!board.can_move_to_foundation(&card("A♥")));
        assert!(!board.can_move_to_foundation(&card("3♥")));
    }

    #[test]
    fn test_foundation_uses_matching_suit() {
        let board = Board::parse("Foundation1: 4♥\nFoundation3: 4♣").unwrap();
        assert!(board.can_move_to_foundation(&card("5♥")));
        assert!(board.can_move_to_foundation(&card("5♣")));
        assert!(!board.can_move_to_foundation(&card("5♦")));
        assert!(board.can_move_to_foundation(&card("A♦")));
    }

    #[test]
    fn test_tableau_alternating_descending() {
        let board = Board::parse("Tableau1: 9♣|5♥\nTableau2: 7♦").unwrap();
        assert!(board.can_move_to_tableau(&card("4♠"), 0));
        assert!(board.can_move_to_tableau(&card("4♣"), 0));
        assert!(!board.can_move_to_tableau(&card("4♥"), 0));
        assert!(!board.can_move_to_tableau(&card("3♠"), 0));
        assert!(!board.can_move_to_tableau(&card("6♠"), 0));
        // face-down top accepts nothing
        assert!(!board.can_move_to_tableau(&card("6♠"), 1));
        assert!(!board.can_move_to_tableau(&card("4♠"), 7));
    }

    #[test]
    fn test_empty_tableau_only_accepts_king() {
        let board = Board::new();
        assert!(board.can_move_to_tableau(&card("K♥"), 3));
        assert!(!board.can_move_to_tableau(&card("Q♠"), 3));
    }

    #[test]
    fn test_can_drop_cards() {
        let board = Board::parse("Tableau1: |6♦\nTableau2: |A♣").unwrap();
        let run = [card("5♠"), card("4♥")];
        assert!(board.can_drop_cards(&run, PileId::Tableau(0)));
        assert!(!board.can_drop_cards(&run, PileId::Tableau(1)));
        assert!(!board.can_drop_cards(&[], PileId::Tableau(0)));

        assert!(board.can_drop_cards(&[card("A♣")], PileId::Foundation(2)));
        assert!(!board.can_drop_cards(&[card("A♣"), card("K♥")], PileId::Foundation(2)));
        assert!(!board.can_drop_cards(&[card("A♣")], PileId::Waste));
        assert!(!board.can_drop_cards(&[card("A♣")], PileId::Foundation(4)));
    }
}
