//! Winning-line enumeration and win/draw checks
//!
//! A line is a run of `win_length` consecutive cells along a row, a column,
//! a down-right diagonal or a down-left diagonal. When `win_length` is smaller
//! than the edge length every such run anywhere on the board counts.

use crate::board::grid::Board;
use crate::types::Symbol;

/// Cell indices of one winning run
pub type Line = Vec<usize>;

/// Enumerate every run of `win_length` consecutive cells on a `size` board
///
/// Order: rows, columns, down-right diagonals, down-left diagonals.
pub fn enumerate_lines(size: usize, win_length: usize) -> Vec<Line> {
    if win_length == 0 || win_length > size {
        return Vec::new();
    }

    let span = size - win_length + 1;
    let mut lines = Vec::new();

    for row in 0..size {
        for col in 0..span {
            lines.push((0..win_length).map(|i| row * size + col + i).collect());
        }
    }

    for col in 0..size {
        for row in 0..span {
            lines.push((0..win_length).map(|i| (row + i) * size + col).collect());
        }
    }

    for row in 0..span {
        for col in 0..span {
            lines.push((0..win_length).map(|i| (row + i) * size + col + i).collect());
        }
    }

    for row in 0..span {
        for col in (win_length - 1)..size {
            lines.push((0..win_length).map(|i| (row + i) * size + col - i).collect());
        }
    }

    lines
}

/// Win/draw evaluator for one board geometry
#[derive(Debug, Clone)]
pub struct WinDetector {
    size: usize,
    win_length: usize,
    lines: Vec<Line>,
}

impl WinDetector {
    pub fn new(size: usize, win_length: usize) -> Self {
        Self {
            size,
            win_length,
            lines: enumerate_lines(size, win_length),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn win_length(&self) -> usize {
        self.win_length
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Whether `symbol` occupies every cell of at least one line
    pub fn is_winner(&self, board: &Board, symbol: Symbol) -> bool {
        self.lines
            .iter()
            .any(|line| board.all_marked(line, symbol))
    }

    /// Full board with no completed line for either symbol
    pub fn is_draw(&self, board: &Board) -> bool {
        board.is_full() && !self.is_winner(board, Symbol::X) && !self.is_winner(board, Symbol::O)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::grid::Cell;

    fn board_from(size: usize, layout: &str) -> Board {
        let cells = layout
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| match c {
                'X' => Cell::Mark(Symbol::X),
                'O' => Cell::Mark(Symbol::O),
                _ => Cell::Empty,
            })
            .collect();
        Board::from_cells(size, cells).unwrap()
    }

    #[test]
    fn test_classic_board_has_eight_lines() {
        let lines = enumerate_lines(3, 3);
        assert_eq!(lines.len(), 8);
        assert!(lines.contains(&vec![0, 1, 2]));
        assert!(lines.contains(&vec![0, 3, 6]));
        assert!(lines.contains(&vec![0, 4, 8]));
        assert!(lines.contains(&vec![2, 4, 6]));
    }

    #[test]
    fn test_four_by_four_with_three_in_a_row_has_twenty_four_lines() {
        let lines = enumerate_lines(4, 3);
        assert_eq!(lines.len(), 24);
        assert!(lines.contains(&vec![1, 2, 3]));
        assert!(lines.contains(&vec![4, 8, 12]));
        assert!(lines.contains(&vec![5, 10, 15]));
        assert!(lines.contains(&vec![3, 6, 9]));
        assert!(lines.contains(&vec![7, 10, 13]));
    }

    #[test]
    fn test_degenerate_geometry_has_no_lines() {
        assert!(enumerate_lines(3, 4).is_empty());
        assert!(enumerate_lines(3, 0).is_empty());
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        let detector = WinDetector::new(3, 3);
        let board = board_from(3, "XOX XOO OXX");
        assert!(!detector.is_winner(&board, Symbol::X));
        assert!(!detector.is_winner(&board, Symbol::O));
        assert!(detector.is_draw(&board));
    }

    #[test]
    fn test_full_board_with_line_is_not_draw() {
        let detector = WinDetector::new(3, 3);
        let board = board_from(3, "XXX OOX OXO");
        assert!(detector.is_winner(&board, Symbol::X));
        assert!(!detector.is_draw(&board));
    }

    #[test]
    fn test_off_corner_run_on_four_by_four_wins() {
        let detector = WinDetector::new(4, 3);
        let board = board_from(4, "..X. ...X .... ....");
        assert!(!detector.is_winner(&board, Symbol::X));

        let board = board_from(4, ".... .X.. ..X. ...X");
        assert!(detector.is_winner(&board, Symbol::X));
        assert!(!detector.is_winner(&board, Symbol::O));
    }

    #[test]
    fn test_broken_run_does_not_win() {
        let detector = WinDetector::new(4, 3);
        let board = board_from(4, "XX.X .... .... ....");
        assert!(!detector.is_winner(&board, Symbol::X));
    }
}
