//! This module defines the core data structures and types shared by the tape, the machine,
//! and the description parser, including transitions, validation modes, and error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::Rule;

/// A tape symbol. Symbol `0` is the blank symbol.
pub type Symbol = u32;
/// A control state identifier in `[0, num_states)`.
pub type State = usize;

/// The blank symbol: the implicit content of every cell that was never written.
pub const BLANK_SYMBOL: Symbol = 0;
/// The fixed start state of every machine.
pub const START_STATE: State = 0;

/// Represents the possible directions the tape head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position. Only accepted in [`ValidationMode::Permissive`].
    Stay,
}

impl TryFrom<char> for Direction {
    type Error = char;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            'L' => Ok(Direction::Left),
            'R' => Ok(Direction::Right),
            'S' => Ok(Direction::Stay),
            other => Err(other),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Direction::Left => 'L',
            Direction::Right => 'R',
            Direction::Stay => 'S',
        };
        write!(f, "{c}")
    }
}

/// Controls how strictly the machine validates its transition table and input.
///
/// - `Strict` (default): state indices, directions and duplicate keys are checked, and
///   non-digit input characters are rejected.
/// - `Permissive`: accepts the `Stay` direction, tolerates duplicate keys (last write wins)
///   and coerces non-digit input characters to the blank symbol. State indices are still
///   range-checked so the machine can never enter a state outside `[0, num_states)`.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ValidationMode {
    /// Malformed tables and inputs are rejected.
    #[default]
    Strict,
    /// Malformed tables and inputs are tolerated where possible.
    Permissive,
}

/// A single entry of the transition table, keyed in the machine by `(state, symbol)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The state the machine moves to.
    pub next_state: State,
    /// The symbol written under the head.
    pub write: Symbol,
    /// The direction the head moves after writing.
    pub direction: Direction,
}

/// A parsed machine description: the validated tuple handed to the engine.
///
/// `rows` holds one transition per `(state, symbol)` pair in the fixed order
/// `state = 0..num_states - 1`, `symbol = 0..=num_symbols`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    /// The number of states, including the halting state.
    pub num_states: usize,
    /// The size of the input alphabet, excluding the blank symbol.
    pub num_symbols: Symbol,
    /// The transition table rows, in table order.
    pub rows: Vec<Transition>,
    /// The initial tape content as decimal digits.
    pub input: String,
}

impl Description {
    /// Returns the number of transition rows a complete table needs:
    /// `(num_states - 1) * (num_symbols + 1)`, or `None` on overflow.
    pub fn expected_rows(&self) -> Option<usize> {
        let symbols = usize::try_from(self.num_symbols).ok()?.checked_add(1)?;
        self.num_states.saturating_sub(1).checked_mul(symbols)
    }

    /// Checks that the description names at least one state and holds exactly one row per
    /// `(state, symbol)` pair.
    pub fn validate(&self) -> Result<(), MachineError> {
        if self.num_states == 0 {
            return Err(MachineError::ValidationError(
                "A machine needs at least one state".to_string(),
            ));
        }

        let expected = self.expected_rows().ok_or_else(|| {
            MachineError::ValidationError(format!(
                "Table for {} states and {} symbols is too large",
                self.num_states, self.num_symbols
            ))
        })?;

        if self.rows.len() != expected {
            return Err(MachineError::ValidationError(format!(
                "Expected {} transition lines for {} states and {} symbols, found {}",
                expected,
                self.num_states,
                self.num_symbols,
                self.rows.len()
            )));
        }

        Ok(())
    }

    /// Iterates over the `(state, symbol)` keys in table order.
    pub fn keys(&self) -> impl Iterator<Item = (State, Symbol)> {
        let num_symbols = self.num_symbols;
        (0..self.num_states.saturating_sub(1))
            .flat_map(move |state| (0..=num_symbols).map(move |symbol| (state, symbol)))
    }
}

/// Represents the outcome of a single execution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The machine performed a step and has not reached the halting state.
    Continue,
    /// The machine is in the halting state.
    Halt,
}

/// Names the part of a transition that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionField {
    FromState,
    OnSymbol,
    NextState,
    WriteSymbol,
    Direction,
    Key,
}

impl fmt::Display for TransitionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransitionField::FromState => "from state",
            TransitionField::OnSymbol => "read symbol",
            TransitionField::NextState => "next state",
            TransitionField::WriteSymbol => "write symbol",
            TransitionField::Direction => "direction",
            TransitionField::Key => "(state, symbol) key",
        };
        f.write_str(name)
    }
}

/// Represents the errors raised by the engine and by the description layer around it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MachineError {
    /// A transition was rejected while building the table.
    #[error("Invalid transition ({field}): {reason}")]
    InvalidTransition {
        field: TransitionField,
        reason: String,
    },
    /// The input string contains a character that is not a decimal digit.
    #[error("Invalid input character {character:?} at position {position}")]
    InvalidInput { position: usize, character: char },
    /// The table has no entry for the current state and symbol.
    #[error("No transition defined for state {state} and symbol {symbol}")]
    NoTransitionDefined { state: State, symbol: Symbol },
    /// The tape's bookkeeping is inconsistent. This is a bug, not a user error.
    #[error("Internal consistency error: {0}")]
    InternalConsistency(String),
    /// Indicates a syntax error in a machine description.
    #[error("Description parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates a structurally invalid machine or description.
    #[error("Description validation error: {0}")]
    ValidationError(String),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
}

impl MachineError {
    pub(crate) fn invalid_transition(field: TransitionField, reason: impl Into<String>) -> Self {
        MachineError::InvalidTransition {
            field,
            reason: reason.into(),
        }
    }
}
