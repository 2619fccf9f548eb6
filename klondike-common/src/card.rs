use anyhow::{Context, Result};
use std::fmt;

pub const MAX_RANK: u8 = 13;
pub const MAX_SUIT: u8 = 4;
pub const MAX_CARD: u8 = MAX_SUIT * MAX_RANK;

const SUITS: [char; MAX_SUIT as usize] = ['♥', '♦', '♣', '♠'];
const RANKS: [char; MAX_RANK as usize] = [
    'A', '2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    /// Deck-building order, also the order of the foundations.
    pub const ALL: [Suit; MAX_SUIT as usize] =
        [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn color(self) -> Color {
        match self {
            Suit::Hearts | Suit::Diamonds => Color::Red,
            Suit::Clubs | Suit::Spades => Color::Black,
        }
    }

    pub fn symbol(self) -> char {
        SUITS[self.index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

/// A playing card. The identity (`id`) never changes, only its visibility does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    id: u8,
    pub face_up: bool,
}

impl Card {
    pub fn new_with_id(id: u8) -> Self {
        debug_assert!(id < MAX_CARD, "card id out of range: {id}");
        Self { id, face_up: false }
    }

    /// `rank` is zero based: 0 is the Ace, 12 the King.
    pub fn new_with_rank_suit(rank: u8, suit: Suit) -> Self {
        Self::new_with_id(suit.index() as u8 * MAX_RANK + rank)
    }

    pub fn parse(rank: char, suit: char) -> Result<Self> {
        let rank_idx = RANKS
            .iter()
            .position(|&r| r == rank)
            .with_context(|| format!("Invalid rank at card {rank}{suit}"))?;
        let suit_idx = SUITS
            .iter()
            .position(|&s| s == suit)
            .with_context(|| format!("Invalid suit at card {rank}{suit}"))?;
        Ok(Card::new_with_rank_suit(rank_idx as u8, Suit::ALL[suit_idx]))
    }

    pub fn face_up(mut self) -> Self {
        self.face_up = true;
        self
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    /// Zero based rank, used for all rank arithmetic.
    pub fn rank(&self) -> u8 {
        self.id % MAX_RANK
    }

    /// Numeric rank as printed on the card, 1 (Ace) to 13 (King).
    pub fn value(&self) -> u8 {
        self.rank() + 1
    }

    pub fn suit(&self) -> Suit {
        Suit::ALL[(self.id / MAX_RANK) as usize]
    }

    pub fn color(&self) -> Color {
        self.suit().color()
    }

    pub fn is_ace(&self) -> bool {
        self.rank() == 0
    }

    pub fn is_king(&self) -> bool {
        self.rank() == MAX_RANK - 1
    }

    pub fn same_card(&self, other: &Card) -> bool {
        self.id == other.id
    }

    /// Two character form used by the board text format, e.g. `T♥`.
    pub fn pretty_print(&self) -> String {
        format!("{}{}", RANKS[self.rank() as usize], self.suit().symbol())
    }
}

/// Human readable form, e.g. `10♥`.
impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rank() {
            9 => write!(f, "10{}", self.suit().symbol()),
            rank => write!(f, "{}{}", RANKS[rank as usize], self.suit().symbol()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_identity() {
        let card = Card::parse('T', '♦').unwrap();
        assert_eq!(card.suit(), Suit::Diamonds);
        assert_eq!(card.value(), 10);
        assert_eq!(card.color(), Color::Red);
        assert!(!card.face_up);
        assert_eq!(card.pretty_print(), "T♦");
        assert_eq!(card.to_string(), "10♦");

        let king = Card::new_with_rank_suit(12, Suit::Spades);
        assert!(king.is_king());
        assert_eq!(king.color(), Color::Black);
        assert_eq!(king.id(), 51);
        assert!(king.same_card(&king.face_up()));
    }

    #[test]
    fn test_parse_invalid_card() {
        assert!(Card::parse('1', '♥').is_err());
        assert!(Card::parse('A', 'x').is_err());
    }
}
