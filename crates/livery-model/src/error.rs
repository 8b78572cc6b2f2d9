//! Error types for the customization model.

use std::path::PathBuf;

use crate::editor::MediaSlot;

/// Errors reading or writing state files.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Failed to read {path}: {message}")]
    ReadError { path: PathBuf, message: String },

    #[error("Failed to write {path}: {message}")]
    WriteError { path: PathBuf, message: String },

    #[error("Invalid state file {path}: {message}")]
    ParseError { path: PathBuf, message: String },
}

/// Field-level validation errors from editor controls.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("{field} must be a positive whole number, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("{field} is not a valid color: '{value}'")]
    InvalidColor { field: &'static str, value: String },

    #[error("Unknown font family: {0}")]
    UnknownFont(String),

    #[error("Value of type {found} cannot be assigned to {field}")]
    TypeMismatch { field: &'static str, found: &'static str },
}

/// Errors from the preset gallery.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GalleryError {
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
}

/// Operations the editor session refuses in its current state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditorError {
    #[error("A save is already in progress")]
    AlreadySaving,

    #[error("Wait for the {0} upload to finish before saving")]
    UploadPending(MediaSlot),

    #[error("Another upload ({0}) is still in progress")]
    UploadInProgress(MediaSlot),

    #[error("No upload in progress for {0}")]
    NoUploadInProgress(MediaSlot),

    #[error("No tenant to save the template under")]
    MissingTenant,

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Gallery(#[from] GalleryError),
}
