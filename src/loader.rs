//! This module provides the `ProgramLoader` struct, responsible for loading machine
//! descriptions from various sources, including files, strings and directories.

use crate::parser::parse;
use crate::types::{Description, MachineError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The file extension of machine description files.
pub const DESCRIPTION_EXTENSION: &str = "tm";

/// `ProgramLoader` is a utility struct for loading machine descriptions.
/// It provides methods to load descriptions from individual files, from string content,
/// and to discover and load all `.tm` files within a specified directory.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a single machine description from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Description)` if the file is successfully read and parsed.
    /// * `Err(MachineError::FileError)` if the file cannot be read.
    /// * Any error returned by [`parse`] if the content is not a valid description.
    pub fn load_program(path: &Path) -> Result<Description, MachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            MachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        let description = parse(&content)?;
        debug!(
            path = %path.display(),
            states = description.num_states,
            symbols = description.num_symbols,
            "loaded machine description"
        );

        Ok(description)
    }

    /// Loads a single machine description from the provided string content.
    ///
    /// This is useful for descriptions that are not stored in files, e.g. piped via stdin.
    pub fn load_program_from_string(content: &str) -> Result<Description, MachineError> {
        parse(content)
    }

    /// Loads all machine description files (`.tm` extension) from a given directory.
    ///
    /// Directories and files with other extensions are skipped. Every remaining file yields
    /// either its path and description or the error that occurred while loading it.
    pub fn load_programs(directory: &Path) -> Vec<Result<(PathBuf, Description), MachineError>> {
        if !directory.exists() {
            return vec![Err(MachineError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(MachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(MachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                let path = entry.path();

                if path.is_dir()
                    || path
                        .extension()
                        .is_none_or(|ext| ext != DESCRIPTION_EXTENSION)
                {
                    return None;
                }

                match Self::load_program(&path) {
                    Ok(description) => Some(Ok((path, description))),
                    Err(e) => Some(Err(MachineError::FileError(format!(
                        "Failed to load description from {}: {}",
                        path.display(),
                        e
                    )))),
                }
            })
            .collect()
    }
}
