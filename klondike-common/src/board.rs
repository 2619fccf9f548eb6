use crate::card::{Card, MAX_CARD, MAX_RANK, Suit};

use anyhow::{Context, Result};
use smallvec::SmallVec;

pub const TOTAL_FOUNDATIONS: usize = 4;
pub const TOTAL_TABLEAUS: usize = 7;
pub const TALON_SIZE: usize = 24;
pub const DRAW_COUNT: usize = 3;
const TABLEAU_SIZE: usize = 19;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PileId {
    Stock,
    Waste,
    Foundation(usize),
    Tableau(usize),
}

/// Result of [`Board::draw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    /// Cards moved from stock to waste.
    Drew(usize),
    /// The waste was turned over into a fresh stock.
    Redealt,
    Empty,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    pub stock: Stock,
    pub waste: WastePile,
    pub foundations: [Foundation; TOTAL_FOUNDATIONS],
    pub tableaus: [Tableau; TOTAL_TABLEAUS],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn foundation(&self, suit: Suit) -> &Foundation {
        &self.foundations[suit.index()]
    }

    pub fn foundation_score(&self) -> u8 {
        self.foundations.iter().map(|f| f.len() as u8).sum()
    }

    pub fn is_won(&self) -> bool {
        self.foundations.iter().all(Foundation::is_complete)
    }

    /// Every card exactly once and every foundation an ordered run of its suit.
    pub fn is_valid(&self) -> bool {
        let mut seen = [false; MAX_CARD as usize];
        let mut count = 0;
        let cards = self
            .stock
            .iter()
            .chain(self.waste.iter())
            .chain(self.foundations.iter().flat_map(|f| f.iter()))
            .chain(self.tableaus.iter().flat_map(|t| t.iter()));
        for card in cards {
            let id = card.id() as usize;
            if seen[id] {
                return false;
            }
            seen[id] = true;
            count += 1;
        }
        if count != MAX_CARD as usize {
            return false;
        }

        self.foundations
            .iter()
            .zip(Suit::ALL)
            .all(|(foundation, suit)| {
                foundation
                    .iter()
                    .enumerate()
                    .all(|(rank, card)| card.suit() == suit && card.rank() as usize == rank)
            })
    }

    /// Every adjacent pair of face-up tableau cards descends by one and alternates color.
    pub fn has_ordered_runs(&self) -> bool {
        self.tableaus.iter().all(|tableau| {
            tableau.face_up_run().windows(2).all(|pair| {
                let (lower, upper) = (pair[0], pair[1]);
                upper.rank() + 1 == lower.rank() && upper.color() != lower.color()
            })
        })
    }

    /// Draws up to three cards, or turns the waste over when the stock is empty.
    pub fn draw(&mut self) -> DrawOutcome {
        let stock_len = self.stock.len();
        if stock_len == 0 {
            if self.waste.is_empty() {
                return DrawOutcome::Empty;
            }
            let cards = self.waste.cards.drain(..).rev().map(|mut card| {
                card.face_up = false;
                card
            });
            self.stock.cards.extend(cards);
            DrawOutcome::Redealt
        } else {
            let num = DRAW_COUNT.min(stock_len);
            for _ in 0..num {
                if let Some(card) = self.stock.cards.pop() {
                    self.waste.cards.push(card.face_up());
                }
            }
            DrawOutcome::Drew(num)
        }
    }

    pub fn move_waste_to_foundation(&mut self) -> Option<Card> {
        let card = *self.waste.peek_top()?;
        if !self.can_move_to_foundation(&card) {
            return None;
        }
        self.waste.cards.pop();
        self.foundations[card.suit().index()].cards.push(card);
        Some(card)
    }

    pub fn move_tableau_to_foundation(&mut self, from: usize) -> Option<Card> {
        let card = *self.tableaus.get(from)?.peek_top()?;
        if !card.face_up || !self.can_move_to_foundation(&card) {
            return None;
        }
        self.tableaus[from].cards.pop();
        self.foundations[card.suit().index()].cards.push(card);
        self.flip_top_card(from);
        Some(card)
    }

    pub fn move_waste_to_tableau(&mut self, to: usize) -> Option<Card> {
        let card = *self.waste.peek_top()?;
        if !self.can_move_to_tableau(&card, to) {
            return None;
        }
        self.waste.cards.pop();
        self.tableaus[to].cards.push(card);
        Some(card)
    }

    /// Moves the run starting at `start` of tableau `from` onto tableau `to`.
    pub fn move_tableau_to_tableau(&mut self, from: usize, start: usize, to: usize) -> Option<Card> {
        if from == to {
            return None;
        }
        let card = *self.tableaus.get(from)?.card_at(start)?;
        if !self.can_move_to_tableau(&card, to) {
            return None;
        }
        let cards: SmallVec<[Card; TABLEAU_SIZE]> = self.tableaus[from].cards.drain(start..).collect();
        self.tableaus[to].cards.extend(cards);
        self.flip_top_card(from);
        Some(card)
    }

    /// Turns the top card of a tableau face-up; a no-op when it already is.
    pub fn flip_top_card(&mut self, pile: usize) -> bool {
        match self.tableaus.get_mut(pile).and_then(|t| t.cards.last_mut()) {
            Some(card) if !card.face_up => {
                card.face_up = true;
                true
            }
            _ => false,
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut board = Self::new();

        for line in content
            .split('\n')
            .map(|v| v.trim())
            .filter(|l| !l.is_empty())
        {
            let line_context = || format!("Failed to parse at '{line}'");
            if let Some(rest) = line.strip_prefix("Stock:") {
                let cards = Self::parse_cards(rest.trim()).with_context(line_context)?;
                board.stock.cards.extend(cards);
            } else if let Some(rest) = line.strip_prefix("Waste:") {
                let cards = Self::parse_cards(rest.trim()).with_context(line_context)?;
                board.waste.cards.extend(cards.into_iter().map(Card::face_up));
            } else if let Some(rest) = line.strip_prefix("Foundation") {
                let mut parts = rest.splitn(2, ':');
                let idx = Self::parse_index(parts.next(), TOTAL_FOUNDATIONS)
                    .context("Invalid foundation index")
                    .with_context(line_context)?;
                let cards = Self::parse_cards(parts.next().unwrap_or("").trim())
                    .with_context(line_context)?;
                if let Some(top_card) = cards.last() {
                    let foundation = &mut board.foundations[idx];
                    foundation.cards.clear();
                    for rank in 0..=top_card.rank() {
                        foundation
                            .cards
                            .push(Card::new_with_rank_suit(rank, top_card.suit()).face_up());
                    }
                }
            } else if let Some(rest) = line.strip_prefix("Tableau") {
                let mut parts = rest.splitn(2, ':');
                let idx = Self::parse_index(parts.next(), TOTAL_TABLEAUS)
                    .context("Invalid tableau index")
                    .with_context(line_context)?;
                let cards_str = parts.next().unwrap_or("").trim();
                let (before, after) = match cards_str.split_once('|') {
                    Some((b, a)) => (b, a),
                    None => (cards_str, ""),
                };
                let face_down_cards = Self::parse_cards(before.trim()).with_context(line_context)?;
                let face_up_cards = Self::parse_cards(after.trim()).with_context(line_context)?;
                let tableau = &mut board.tableaus[idx];
                tableau.cards.extend(face_down_cards);
                tableau
                    .cards
                    .extend(face_up_cards.into_iter().map(Card::face_up));
            }
        }

        Ok(board)
    }

    fn parse_index(s: Option<&str>, total: usize) -> Result<usize> {
        let idx = s.unwrap_or("").trim().parse::<usize>()?;
        anyhow::ensure!((1..=total).contains(&idx), "Index {idx} out of range");
        Ok(idx - 1)
    }

    fn parse_cards(s: &str) -> Result<Vec<Card>> {
        let mut cards = Vec::new();
        let mut chars = s.chars().peekable();
        while let Some(&c1) = chars.peek() {
            if c1.is_whitespace() || c1 == '|' {
                chars.next();
                continue;
            }
            let rank = c1;
            chars.next();
            let suit = match chars.next() {
                Some(s) => s,
                None => anyhow::bail!("Missing suit after rank {rank}"),
            };
            cards.push(Card::parse(rank, suit)?);
        }
        Ok(cards)
    }

    pub fn pretty_print(&self) -> String {
        let mut lines = Vec::new();

        if !self.stock.is_empty() {
            lines.push(format!("Stock: {}", join_cards(self.stock.iter())));
        }

        if !self.waste.is_empty() {
            lines.push(format!("Waste: {}", join_cards(self.waste.iter())));
        }

        for (i, foundation) in self.foundations.iter().enumerate() {
            if let Some(card) = foundation.peek_top() {
                lines.push(format!("Foundation{}: {}", i + 1, card.pretty_print()));
            }
        }

        for (i, tableau) in self.tableaus.iter().enumerate() {
            if tableau.is_empty() {
                continue;
            }
            let split = tableau.first_face_up().unwrap_or(tableau.len());
            let (face_down, face_up) = tableau.cards.split_at(split);
            lines.push(format!(
                "Tableau{}: {}|{}",
                i + 1,
                join_cards(face_down.iter()),
                join_cards(face_up.iter())
            ));
        }

        lines.join("\n")
    }
}

fn join_cards<'a>(cards: impl Iterator<Item = &'a Card>) -> String {
    cards.map(Card::pretty_print).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stock {
    pub(crate) cards: SmallVec<[Card; TALON_SIZE]>,
}

impl Stock {
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Bottom to top. Meant for rendering and validation, not for play decisions.
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WastePile {
    pub(crate) cards: SmallVec<[Card; TALON_SIZE]>,
}

impl WastePile {
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn peek_top(&self) -> Option<&Card> {
        self.cards.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Foundation {
    pub(crate) cards: SmallVec<[Card; MAX_RANK as usize]>,
}

impl Foundation {
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_complete(&self) -> bool {
        self.cards.len() == MAX_RANK as usize
    }

    pub fn peek_top(&self) -> Option<&Card> {
        self.cards.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tableau {
    pub(crate) cards: SmallVec<[Card; TABLEAU_SIZE]>,
}

impl Tableau {
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn peek_top(&self) -> Option<&Card> {
        self.cards.last()
    }

    /// Index of the lead card of the exposed run.
    pub fn first_face_up(&self) -> Option<usize> {
        self.cards.iter().position(|card| card.face_up)
    }

    pub fn face_up_run(&self) -> &[Card] {
        match self.first_face_up() {
            Some(start) => &self.cards[start..],
            None => &[],
        }
    }

    /// The card at `index`, only when it belongs to the exposed run.
    pub fn card_at(&self, index: usize) -> Option<&Card> {
        self.cards.get(index).filter(|card| card.face_up)
    }

    pub fn face_down_count(&self) -> usize {
        self.cards.iter().filter(|card| !card.face_up).count()
    }

    /// Bottom to top, face-down cards included. Meant for rendering and validation.
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub(crate) fn push(&mut self, card: Card) {
        self.cards.push(card);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARD_STR: &str = r#"Stock: 5♦2♥8♦K♣7♥J♣
Waste: 7♦Q♥K♥T♦6♣9♥K♦J♠T♣Q♣3♣2♦Q♦8♥6♥7♠8♠
Foundation2: A♦
Foundation3: 2♣
Foundation4: A♠
Tableau1: |5♣
Tableau2: J♥|6♠
Tableau3: T♠5♥|Q♠
Tableau4: 9♠T♥2♠|9♣
Tableau5: 7♣4♥3♠|A♥
Tableau6: 3♥3♦4♣5♠4♦|8♣
Tableau7: 6♦4♠9♦K♠|J♦"#;

    #[test]
    fn test_parse_board() {
        let board = Board::parse(BOARD_STR).unwrap();
        assert!(board.is_valid());
        assert_eq!(board.foundation_score(), 4);
        assert_eq!(BOARD_STR, board.pretty_print());
    }

    #[test]
    fn test_parse_invalid_index() {
        assert!(Board::parse("Tableau8: |K♠").is_err());
        assert!(Board::parse("Foundation0: A♠").is_err());
    }

    #[test]
    fn test_new_board() {
        let board = Board::new();
        assert_eq!(board.foundation_score(), 0);
        assert!(!board.is_valid());
        assert!(!board.is_won());
    }

    #[test]
    fn test_draw_single_card() {
        let mut board = Board::parse("Stock: 9♣").unwrap();
        assert_eq!(board.draw(), DrawOutcome::Drew(1));
        assert!(board.stock.is_empty());
        assert_eq!(board.waste.len(), 1);
        let top = board.waste.peek_top().unwrap();
        assert!(top.face_up);
        assert_eq!(top.pretty_print(), "9♣");
    }

    #[test]
    fn test_draw_three_and_redeal() {
        let mut board = Board::parse("Stock: A♥2♥3♥4♥").unwrap();
        assert_eq!(board.draw(), DrawOutcome::Drew(3));
        assert_eq!(join_cards(board.waste.iter()), "4♥3♥2♥");
        assert_eq!(board.draw(), DrawOutcome::Drew(1));
        assert_eq!(board.waste.peek_top().unwrap().pretty_print(), "A♥");

        assert_eq!(board.draw(), DrawOutcome::Redealt);
        assert!(board.waste.is_empty());
        assert_eq!(join_cards(board.stock.iter()), "A♥2♥3♥4♥");
        assert!(board.stock.iter().all(|card| !card.face_up));

        board.stock.cards.clear();
        assert_eq!(board.draw(), DrawOutcome::Empty);
    }

    #[test]
    fn test_tableau_move_flips_source() {
        let mut board = Board::parse("Tableau1: K♦|8♥7♣\nTableau2: 4♣|9♠").unwrap();
        assert_eq!(board.tableaus[0].face_up_run().len(), 2);
        assert!(board.tableaus[0].card_at(0).is_none());

        let moved = board.move_tableau_to_tableau(0, 1, 1).unwrap();
        assert_eq!(moved.pretty_print(), "8♥");
        assert_eq!(board.tableaus[1].face_up_run().len(), 3);
        assert!(board.tableaus[0].peek_top().unwrap().face_up);
        assert!(board.has_ordered_runs());

        assert!(!board.flip_top_card(0));
        assert!(board.move_tableau_to_tableau(1, 0, 0).is_none());
    }
}
