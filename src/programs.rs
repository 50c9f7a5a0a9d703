//! A registry of sample machine descriptions embedded in the crate.

use crate::parser::parse;
use crate::types::{Description, MachineError};
use tracing::warn;

/// Embedded sample descriptions, as `(name, text)` pairs.
const PROGRAM_TEXTS: [(&str, &str); 3] = [
    (
        "Unary increment",
        include_str!("../programs/unary-increment.tm"),
    ),
    ("Complement", include_str!("../programs/complement.tm")),
    (
        "Busy beaver (2 states)",
        include_str!("../programs/busy-beaver-2.tm"),
    ),
];

/// A named sample description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub name: String,
    pub description: Description,
    pub text: &'static str,
}

lazy_static::lazy_static! {
    /// The embedded samples that parsed successfully, in declaration order.
    pub static ref PROGRAMS: Vec<Program> = PROGRAM_TEXTS
        .iter()
        .filter_map(|&(name, text)| match parse(text) {
            Ok(description) => Some(Program {
                name: name.to_string(),
                description,
                text,
            }),
            Err(e) => {
                warn!(program = name, error = %e, "skipping embedded program");
                None
            }
        })
        .collect();
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_by_index(index: usize) -> Result<&'static Program, MachineError> {
        PROGRAMS.get(index).ok_or_else(|| {
            MachineError::ValidationError(format!("Program index {} out of range", index))
        })
    }

    /// Get a program by its name, ignoring case
    pub fn get_by_name(name: &str) -> Result<&'static Program, MachineError> {
        PROGRAMS
            .iter()
            .find(|program| program.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| MachineError::ValidationError(format!("Program '{}' not found", name)))
    }

    /// List all program names
    pub fn list_names() -> Vec<&'static str> {
        PROGRAMS.iter().map(|program| program.name.as_str()).collect()
    }

    /// Get the original text of a program by its index
    pub fn text_by_index(index: usize) -> Result<&'static str, MachineError> {
        Self::get_by_index(index).map(|program| program.text)
    }
}
