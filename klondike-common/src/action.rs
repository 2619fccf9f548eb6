use crate::board::{Board, DRAW_COUNT};
use crate::card::Card;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    WasteToFoundation,
    WasteToTableau(usize),
    TableauToFoundation(usize),
    TableauToTableau(usize, usize, usize), // (from_index, to_index, count)
    Draw,
    Redeal,
}

pub fn format_actions(actions: &[Action]) -> String {
    let mut list = vec![];
    let mut i = 0;
    while i < actions.len() {
        match actions[i] {
            Action::Draw => {
                let mut count = 1;
                while i + count < actions.len() && matches!(actions[i + count], Action::Draw) {
                    count += 1;
                }
                let str = if count == 1 {
                    "D".into()
                } else {
                    format!("{count}D")
                };
                list.push(str);
                i += count;
                continue;
            }
            Action::WasteToFoundation => {
                list.push("W:F".into());
            }
            Action::WasteToTableau(idx) => {
                list.push(format!("W:T{}", idx + 1));
            }
            Action::TableauToFoundation(idx) => {
                list.push(format!("T{}:F", idx + 1));
            }
            Action::TableauToTableau(from_idx, to_idx, count) => {
                let mut str = format!("T{}:T{}", from_idx + 1, to_idx + 1);
                if count > 1 {
                    str.push_str(&format!("@{count}"));
                };
                list.push(str);
            }
            Action::Redeal => {
                list.push("R".into());
            }
        }
        i += 1;
    }

    let mut output = String::new();
    let max_width = list.iter().map(|s| s.len()).max().unwrap_or_default() + 1;
    for chunk in list.chunks(10) {
        for cmd in chunk {
            output.push_str(&format!("{cmd:<width$}", width = max_width));
        }
        output.push('\n');
    }

    output
}

/// Describes `action` as it would play out on `board`, before it is applied.
pub fn describe_action(board: &Board, action: &Action) -> String {
    let format_card =
        |card: Option<&Card>| -> String { card.map(|c| c.to_string()).unwrap_or_default() };

    match action {
        Action::WasteToFoundation => {
            format!(
                "Move {} from waste to foundation",
                format_card(board.waste.peek_top())
            )
        }
        Action::WasteToTableau(tableau_index) => {
            format!(
                "Move {} from waste to tableau {}",
                format_card(board.waste.peek_top()),
                tableau_index + 1
            )
        }
        Action::TableauToFoundation(tableau_index) => {
            format!(
                "Move {} from tableau {} to foundation",
                format_card(board.tableaus[*tableau_index].peek_top()),
                tableau_index + 1
            )
        }
        Action::TableauToTableau(from_index, to_index, count) => {
            let run = board.tableaus[*from_index].face_up_run();
            let lead = run.len().checked_sub(*count).and_then(|start| run.get(start));
            format!(
                "Move {} from tableau {} to tableau {}",
                format_card(lead),
                from_index + 1,
                to_index + 1
            )
        }
        Action::Draw => {
            let count = DRAW_COUNT.min(board.stock.len());
            format!("Draw {count} card{} from stock", if count > 1 { "s" } else { "" })
        }
        Action::Redeal => "Reset stock from waste".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_actions() {
        let actions = [
            Action::Draw,
            Action::Draw,
            Action::Draw,
            Action::WasteToFoundation,
            Action::TableauToTableau(2, 4, 3),
            Action::TableauToTableau(0, 1, 1),
            Action::Redeal,
            Action::Draw,
            Action::TableauToFoundation(6),
            Action::WasteToTableau(3),
        ];
        let output = format_actions(&actions);
        let codes: Vec<&str> = output.split_whitespace().collect();
        assert_eq!(
            codes,
            ["3D", "W:F", "T3:T5@3", "T1:T2", "R", "D", "T7:F", "W:T4"]
        );
    }

    #[test]
    fn test_describe_action() {
        let board = Board::parse("Stock: 2♣3♣\nWaste: T♥\nTableau1: 4♠|8♠7♥6♣\nTableau2: |9♦").unwrap();
        assert_eq!(
            describe_action(&board, &Action::WasteToTableau(1)),
            "Move 10♥ from waste to tableau 2"
        );
        assert_eq!(
            describe_action(&board, &Action::TableauToTableau(0, 1, 3)),
            "Move 8♠ from tableau 1 to tableau 2"
        );
        assert_eq!(
            describe_action(&board, &Action::Draw),
            "Draw 2 cards from stock"
        );
        assert_eq!(
            describe_action(&board, &Action::Redeal),
            "Reset stock from waste"
        );
    }
}
