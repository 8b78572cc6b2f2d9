//! Rendering for livery templates.
//!
//! Turns a customization snapshot into a live preview tree or a standalone HTML document.
//! Both paths resolve their values through [`style::PageStyle`].

pub mod error;
pub mod export;
pub mod preview;
pub mod style;

pub use error::ExportError;
pub use export::{
    export_filename, export_gallery, export_html, write_export, ExportConfig, GalleryResult,
    HtmlExporter,
};
pub use preview::{render, Element, Node, PreviewTree, Viewport};
pub use style::PageStyle;
