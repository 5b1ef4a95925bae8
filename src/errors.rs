//! Error types for the promptex application.
//!
//! This module defines the error type shared by the persistence layer, the
//! frontmatter codec and the command-line shell.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the promptex application.
#[derive(Error, Debug)]
pub enum PromptError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Prompt was not found when performing an operation.
    #[error("Prompt not found: {id}")]
    PromptNotFound { id: String },

    /// Prompt with the same ID already exists.
    #[error("Prompt already exists: {id}")]
    PromptAlreadyExists { id: String },

    /// The prompt itself violates a record invariant (empty title, changed creation time).
    #[error("Invalid prompt: {message}")]
    InvalidPrompt { message: String },

    /// A document could not be decoded.
    #[error("Invalid document format: {message}")]
    InvalidFormat { message: String },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("{message}")]
    EditorError { message: String },

    /// Generic application error with a custom message.
    #[error("{message}")]
    ApplicationError { message: String },
}
