//! Adapter interface for editing surfaces.
//!
//! Drag-and-drop page builders keep their own document models. livery treats them as
//! opaque: a surface only has to hand out its document and accept one back.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Serialized document of an editing surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceDocument {
    /// Surface that produced the document (e.g., "form")
    pub format: String,

    /// Surface-specific payload
    pub body: Value,
}

/// Errors loading a document into a surface.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("Surface '{expected}' cannot load a '{found}' document")]
    WrongFormat { expected: &'static str, found: String },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

/// An editing surface that can hand out and accept its document.
pub trait EditorSurface: Send + Sync {
    /// Surface identifier
    fn name(&self) -> &'static str;

    /// Current document.
    fn serialize(&self) -> SurfaceDocument;

    /// Replace the surface's content with a document.
    fn load(&mut self, document: SurfaceDocument) -> Result<(), SurfaceError>;
}

/// The built-in form editor, whose document is the flat customization record.
#[derive(Debug, Clone, Default)]
pub struct FormSurface {
    state: crate::CustomizationState,
}

impl FormSurface {
    pub const NAME: &'static str = "form";

    pub fn new(state: crate::CustomizationState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &crate::CustomizationState {
        &self.state
    }

    pub fn into_state(self) -> crate::CustomizationState {
        self.state
    }
}

impl EditorSurface for FormSurface {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn serialize(&self) -> SurfaceDocument {
        SurfaceDocument {
            format: Self::NAME.to_string(),
            body: Value::Object(self.state.to_record()),
        }
    }

    fn load(&mut self, document: SurfaceDocument) -> Result<(), SurfaceError> {
        if document.format != Self::NAME {
            return Err(SurfaceError::WrongFormat {
                expected: Self::NAME,
                found: document.format,
            });
        }

        let state: crate::CustomizationState = serde_json::from_value(document.body)
            .map_err(|e| SurfaceError::InvalidDocument(e.to_string()))?;
        state
            .check_sizes()
            .map_err(|e| SurfaceError::InvalidDocument(e.to_string()))?;
        self.state = state;
        Ok(())
    }
}
