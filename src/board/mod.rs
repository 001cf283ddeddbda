//! Board representation and win detection
//!
//! This module holds the pure geometry of the game: a row-major board of
//! `size * size` cells and the enumeration of every winning run on it.

pub mod detector;
pub mod grid;

// Re-export commonly used types
pub use detector::{enumerate_lines, Line, WinDetector};
pub use grid::{Board, Cell};
