use klondike_common::action::Action;
use klondike_common::board::{Board, TOTAL_TABLEAUS};

/// Picks the next bot action: a greedy, single-ply scan in fixed priority order.
///
/// Returns `None` when nothing can be moved and both stock and waste are empty,
/// which means the bot is stuck.
pub fn next_action(board: &Board) -> Option<Action> {
    if let Some(action) = foundation_move(board) {
        return Some(action);
    }
    if let Some(action) = tableau_run_move(board) {
        return Some(action);
    }
    if let Some(action) = waste_to_tableau_move(board) {
        return Some(action);
    }
    if !board.stock.is_empty() {
        return Some(Action::Draw);
    }
    if !board.waste.is_empty() {
        return Some(Action::Redeal);
    }
    None
}

/// Waste top first, then the tableau tops from left to right.
pub(crate) fn foundation_move(board: &Board) -> Option<Action> {
    if let Some(card) = board.waste.peek_top()
        && board.can_move_to_foundation(card)
    {
        return Some(Action::WasteToFoundation);
    }
    board.tableaus.iter().enumerate().find_map(|(i, tableau)| {
        let card = tableau.peek_top()?;
        (card.face_up && board.can_move_to_foundation(card)).then_some(Action::TableauToFoundation(i))
    })
}

/// Moves a whole exposed run onto the first other tableau that takes its lead card.
pub(crate) fn tableau_run_move(board: &Board) -> Option<Action> {
    for (from, tableau) in board.tableaus.iter().enumerate() {
        let Some(start) = tableau.first_face_up() else {
            continue;
        };
        let run = tableau.face_up_run();
        let lead = &run[0];
        // a King already at the base has nowhere better to go
        if lead.is_king() && start == 0 {
            continue;
        }
        let target = (0..TOTAL_TABLEAUS).find(|&to| to != from && board.can_move_to_tableau(lead, to));
        if let Some(to) = target {
            return Some(Action::TableauToTableau(from, to, run.len()));
        }
    }
    None
}

fn waste_to_tableau_move(board: &Board) -> Option<Action> {
    let card = board.waste.peek_top()?;
    (0..TOTAL_TABLEAUS)
        .find(|&to| board.can_move_to_tableau(card, to))
        .map(Action::WasteToTableau)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(board_str: &str) -> Option<Action> {
        next_action(&Board::parse(board_str).unwrap())
    }

    #[test]
    fn test_waste_to_foundation_first() {
        let board = "Waste: A♣\nTableau1: |A♥\nTableau2: |2♦";
        assert_eq!(plan(board), Some(Action::WasteToFoundation));
    }

    #[test]
    fn test_tableau_to_foundation_in_order() {
        let board = "Waste: 9♣\nTableau2: 5♠|A♥\nTableau4: |A♦";
        assert_eq!(plan(board), Some(Action::TableauToFoundation(1)));
    }

    #[test]
    fn test_run_move_takes_first_target() {
        let board = "Tableau1: 3♣|9♥8♠\nTableau3: |T♣\nTableau5: |T♠";
        assert_eq!(plan(board), Some(Action::TableauToTableau(0, 2, 2)));
    }

    #[test]
    fn test_king_at_base_is_not_moved() {
        let board = "Tableau1: |K♥Q♣\nTableau2:\nWaste: 5♦";
        assert_eq!(plan(board), Some(Action::Redeal));
    }

    #[test]
    fn test_king_above_hidden_cards_moves_to_empty_pile() {
        let board = "Tableau1: 2♣|K♥Q♣\nStock: 3♦";
        assert_eq!(plan(board), Some(Action::TableauToTableau(0, 1, 2)));
    }

    #[test]
    fn test_waste_to_tableau_before_drawing() {
        let board = "Stock: 2♣\nWaste: 6♥\nTableau1: |K♠\nTableau4: |7♣";
        assert_eq!(plan(board), Some(Action::WasteToTableau(3)));
    }

    #[test]
    fn test_draw_then_redeal_then_stuck() {
        assert_eq!(plan("Stock: 2♣\nWaste: 9♥"), Some(Action::Draw));
        assert_eq!(plan("Waste: 9♥"), Some(Action::Redeal));
        assert_eq!(plan("Tableau1: 4♦|9♥"), None);
    }

    #[test]
    fn test_same_board_same_action() {
        let board = Board::parse("Stock: 2♣3♥\nWaste: 8♦\nTableau1: 5♠|9♣\nTableau2: |8♥").unwrap();
        let first = next_action(&board);
        for _ in 0..10 {
            assert_eq!(next_action(&board.clone()), first);
        }
    }
}
