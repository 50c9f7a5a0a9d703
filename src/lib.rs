//! This crate provides the core logic for a single-tape Turing Machine simulator on a
//! bi-infinite tape. It includes the tape and machine that execute a transition table,
//! a parser and loader for line-oriented machine descriptions, and a set of embedded
//! sample programs.

pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the `TuringMachine` struct from the machine module.
pub use machine::TuringMachine;
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `Program`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{Program, ProgramManager, PROGRAMS};
/// Re-exports the `Tape` struct from the tape module.
pub use tape::Tape;
/// Re-exports the types shared by the machine and the description layer.
pub use types::{
    Description, Direction, MachineError, State, Step, Symbol, Transition, TransitionField,
    ValidationMode, BLANK_SYMBOL, START_STATE,
};
