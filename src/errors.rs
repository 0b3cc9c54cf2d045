/*!
 * Error types for the subbank editor.
 *
 * This module contains custom error types for the different parts of the
 * editor, using the thiserror crate for ergonomic error definitions.
 */

use std::fmt;

use thiserror::Error;

use crate::model::BankId;

/// What an editing operation failed to find
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFound {
    /// No bank with this id is loaded
    Bank(BankId),

    /// The bank exists but has no scene with this name
    Scene { bank: BankId, name: String },

    /// The scene exists but the line index is out of range
    Line { scene: String, index: usize },
}

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFound::Bank(id) => write!(f, "language bank {}", id),
            NotFound::Scene { bank, name } => write!(f, "scene '{}' in bank {}", name, bank),
            NotFound::Line { scene, index } => write!(f, "line {} of scene '{}'", index, scene),
        }
    }
}

/// Errors returned by the editing model.
///
/// Every variant is a recoverable condition: the operation that produced it
/// left the model untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    /// A scene with this name already exists in the bank
    #[error("Scene '{name}' already exists in bank {bank}")]
    DuplicateScene { bank: BankId, name: String },

    /// A bank, scene or line could not be located
    #[error("Not found: {0}")]
    NotFound(NotFound),

    /// Start or end frame is negative
    #[error("Invalid frame range: {start} - {end}")]
    InvalidRange { start: f32, end: f32 },

    /// Subtitle text is empty
    #[error("Subtitle text cannot be empty")]
    EmptyText,

    /// Removing the line would leave the scene empty
    #[error("Cannot delete the last line of scene '{scene}'")]
    LastLineProtected { scene: String },

    /// Scene names cannot be empty
    #[error("Scene name cannot be empty")]
    EmptySceneName,

    /// The operation works on the selected scene and none is selected
    #[error("No scene is selected")]
    NoSceneSelected,
}

impl From<NotFound> for EditError {
    fn from(missing: NotFound) -> Self {
        Self::NotFound(missing)
    }
}

/// Errors that can occur while loading or saving language banks
#[derive(Error, Debug)]
pub enum StoreError {
    /// The project directory does not exist
    #[error("Project directory not found: {0}")]
    MissingProject(String),

    /// Reading or writing a bank file failed
    #[error("Bank file error ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A bank's `file_path` does not name the file it was loaded from
    #[error("Bank file {path} declares file_path '{file_path}'")]
    PathMismatch { path: String, file_path: String },

    /// A bank's `file_path` points outside the project directory
    #[error("Bank file_path escapes the project directory: {0}")]
    OutsideProject(String),

    /// A bank file could not be (de)serialized
    #[error("Malformed bank file ({path}): {source}")]
    Format {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that can occur when talking to the game's REPL
#[derive(Error, Debug)]
pub enum ReplError {
    /// An evaluation was attempted without a connection
    #[error("REPL is not connected")]
    NotConnected,

    /// Establishing the connection failed
    #[error("Could not connect to REPL at {address}: {message}")]
    ConnectionFailed { address: String, message: String },

    /// The connection dropped while sending a form
    #[error("REPL I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The REPL did not answer in time
    #[error("REPL timed out after {0} seconds")]
    Timeout(u64),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from an editing operation
    #[error("Edit error: {0}")]
    Edit(#[from] EditError),

    /// Error from the bank store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Error from the REPL connection
    #[error("REPL error: {0}")]
    Repl(#[from] ReplError),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
