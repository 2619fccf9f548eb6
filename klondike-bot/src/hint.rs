use crate::planner::{foundation_move, tableau_run_move};

use klondike_common::action::{Action, describe_action};
use klondike_common::board::Board;

pub const FALLBACK_HINT: &str = "Try drawing from the stock pile or look for tableau moves";

/// The move a hint would suggest: foundation moves, then tableau-to-tableau runs.
pub fn hint_action(board: &Board) -> Option<Action> {
    foundation_move(board).or_else(|| tableau_run_move(board))
}

pub fn hint(board: &Board) -> String {
    match hint_action(board) {
        Some(action) => describe_action(board, &action),
        None => FALLBACK_HINT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_foundation() {
        let board = Board::parse("Waste: A♦\nTableau1: |A♠").unwrap();
        assert_eq!(hint(&board), "Move A♦ from waste to foundation");

        let board = Board::parse("Waste: 4♦\nTableau3: 7♣|A♠").unwrap();
        assert_eq!(hint(&board), "Move A♠ from tableau 3 to foundation");
    }

    #[test]
    fn test_hint_tableau_run() {
        let board = Board::parse("Tableau2: 6♣|J♦T♠\nTableau6: 2♥|Q♣").unwrap();
        assert_eq!(hint(&board), "Move J♦ from tableau 2 to tableau 6");
    }

    #[test]
    fn test_hint_fallback_ignores_waste_and_stock() {
        let board = Board::parse("Stock: 3♣\nWaste: Q♥\nTableau1: |K♠").unwrap();
        assert_eq!(hint_action(&board), None);
        assert_eq!(hint(&board), FALLBACK_HINT);
    }
}
