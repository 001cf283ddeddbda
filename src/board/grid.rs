//! Row-major board storage

use crate::types::Symbol;
use serde::{Deserialize, Serialize};

/// Content of a single board cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Mark(Symbol),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// Square board of `size * size` cells in row-major order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Create an empty board with the given edge length
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Cell::Empty; size * size],
        }
    }

    /// Build a board from explicit cells; `None` if the length is not a square of `size`
    pub fn from_cells(size: usize, cells: Vec<Cell>) -> Option<Self> {
        (cells.len() == size * size).then_some(Self { size, cells })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of cells (`size * size`)
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell at `position`, `None` when out of range
    pub fn get(&self, position: usize) -> Option<Cell> {
        self.cells.get(position).copied()
    }

    /// Place a mark on an empty cell; returns false when occupied or out of range
    pub fn place(&mut self, position: usize, symbol: Symbol) -> bool {
        match self.cells.get_mut(position) {
            Some(cell) if cell.is_empty() => {
                *cell = Cell::Mark(symbol);
                true
            }
            _ => false,
        }
    }

    /// Copy of this board with one extra mark, used for look-ahead
    pub fn with_mark(&self, position: usize, symbol: Symbol) -> Board {
        let mut board = self.clone();
        board.place(position, symbol);
        board
    }

    /// Whether every cell in `positions` carries `symbol`
    pub fn all_marked(&self, positions: &[usize], symbol: Symbol) -> bool {
        positions
            .iter()
            .all(|&pos| self.cells.get(pos) == Some(&Cell::Mark(symbol)))
    }

    /// Indices of every empty cell, ascending
    pub fn empty_positions(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_empty())
    }

    /// Reset every cell to empty
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = Cell::Empty);
    }

    /// Center cell index when the edge length is odd
    pub fn center(&self) -> Option<usize> {
        (self.size % 2 == 1).then(|| (self.size * self.size) / 2)
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, cell) in self.cells.iter().enumerate() {
            let glyph = match cell {
                Cell::Empty => '.',
                Cell::Mark(Symbol::X) => 'X',
                Cell::Mark(Symbol::O) => 'O',
            };
            write!(f, "{}", glyph)?;
            if (i + 1) % self.size == 0 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(4);
        assert_eq!(board.len(), 16);
        assert_eq!(board.empty_positions().len(), 16);
        assert!(!board.is_full());
    }

    #[test]
    fn test_place_rejects_occupied_and_out_of_range() {
        let mut board = Board::new(3);
        assert!(board.place(4, Symbol::X));
        assert!(!board.place(4, Symbol::O));
        assert!(!board.place(9, Symbol::O));
        assert_eq!(board.get(4), Some(Cell::Mark(Symbol::X)));
    }

    #[test]
    fn test_from_cells_checks_length() {
        assert!(Board::from_cells(3, vec![Cell::Empty; 8]).is_none());
        assert!(Board::from_cells(3, vec![Cell::Empty; 9]).is_some());
    }

    #[test]
    fn test_center_only_for_odd_sizes() {
        assert_eq!(Board::new(3).center(), Some(4));
        assert_eq!(Board::new(4).center(), None);
    }

    #[test]
    fn test_display_renders_rows() {
        let mut board = Board::new(3);
        board.place(0, Symbol::X);
        board.place(4, Symbol::O);
        assert_eq!(board.to_string(), "X..\n.O.\n...\n");
    }
}
