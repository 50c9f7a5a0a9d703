//! This module defines the `Tape` struct, an unbounded two-directional sequence of symbol
//! cells. Only written cells are stored; every other cell reads as the blank symbol.

use crate::types::{MachineError, Symbol, BLANK_SYMBOL};
use std::collections::HashMap;
use std::fmt::Write;
use std::ops::RangeInclusive;

/// A bi-infinite tape with a single read/write head.
///
/// Besides the cells, the tape tracks the leftmost and rightmost positions ever reached by a
/// write or a head movement. That range, which always contains position 0, is what
/// [`Tape::visited_content`] reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tape {
    cells: HashMap<i64, Symbol>,
    head: i64,
    min_visited: i64,
    max_visited: i64,
}

impl Tape {
    /// Creates an empty tape with the head at position 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the head back to position 0. Cells and the visited range are untouched.
    pub fn reset_head(&mut self) {
        self.head = 0;
    }

    /// Returns the symbol under the head, or the blank symbol if the cell was never written.
    pub fn read(&self) -> Symbol {
        self.cells.get(&self.head).copied().unwrap_or(BLANK_SYMBOL)
    }

    /// Writes `symbol` under the head, replacing any previous value.
    pub fn write(&mut self, symbol: Symbol) {
        self.cells.insert(self.head, symbol);
        self.widen();
    }

    pub fn move_left(&mut self) {
        self.head -= 1;
        self.widen();
    }

    pub fn move_right(&mut self) {
        self.head += 1;
        self.widen();
    }

    /// Writes `symbols` left to right starting at position 0, then returns the head to 0.
    ///
    /// The head moves right after every symbol, so loading `n` symbols leaves the visited
    /// range covering at least `[0, n]`.
    pub fn load(&mut self, symbols: &[Symbol]) {
        self.reset_head();
        for &symbol in symbols {
            self.write(symbol);
            self.move_right();
        }
        self.reset_head();
    }

    /// Returns the current head position.
    pub fn head(&self) -> i64 {
        self.head
    }

    /// Returns the inclusive range of positions ever visited.
    pub fn visited_range(&self) -> RangeInclusive<i64> {
        self.min_visited..=self.max_visited
    }

    /// Returns the symbols of every visited position, left to right.
    pub fn visited_symbols(&self) -> Vec<Symbol> {
        self.visited_range()
            .map(|pos| self.cells.get(&pos).copied().unwrap_or(BLANK_SYMBOL))
            .collect()
    }

    /// Renders the visited range as a string of decimal symbols.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` with one digit per cell for single-digit alphabets.
    /// * `Err(MachineError::InternalConsistency)` if the visited range is empty.
    pub fn visited_content(&self) -> Result<String, MachineError> {
        if self.min_visited > self.max_visited {
            return Err(MachineError::InternalConsistency(format!(
                "visited range is empty: min {} > max {}",
                self.min_visited, self.max_visited
            )));
        }

        let mut content = String::with_capacity(self.visited_range().count());
        for symbol in self.visited_symbols() {
            // Writing into a String cannot fail.
            let _ = write!(content, "{symbol}");
        }

        Ok(content)
    }

    fn widen(&mut self) {
        self.min_visited = self.min_visited.min(self.head);
        self.max_visited = self.max_visited.max(self.head);
    }
}
