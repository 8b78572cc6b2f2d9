//! Customization model for livery templates.
//!
//! This crate holds the flat customization state that every other part of livery reads from,
//! the preset gallery, the editor panel's control catalogue, the editor session state machine
//! and the wire format used to persist templates.

pub mod color;
pub mod editor;
pub mod error;
pub mod field;
pub mod font;
pub mod gallery;
pub mod panel;
pub mod record;
pub mod state;
pub mod surface;

pub use editor::{EditorSession, MediaSlot, StatusKind, StatusMessage};
pub use error::{EditError, EditorError, GalleryError, ModelError};
pub use field::{Field, FieldEdit, FieldValue};
pub use font::FontFamily;
pub use gallery::{categories, filter_by_category, presets, select_preset, Preset};
pub use panel::{controls, Control, ControlKind, Tab};
pub use record::{TemplateRecord, TemplateSettings};
pub use state::{read_state_file, write_state_file, CustomizationState, PartialState};
pub use surface::{EditorSurface, FormSurface, SurfaceDocument, SurfaceError};
