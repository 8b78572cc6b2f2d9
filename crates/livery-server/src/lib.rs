//! Live preview editor for livery templates.
//!
//! Serves the editor panel next to desktop and mobile previews, persists every edit to a
//! state file and pushes updates to open pages over a WebSocket.

pub mod live;
pub mod page;
pub mod server;
pub mod watcher;

pub use live::{LiveHub, LiveMessage};
pub use page::render_editor_page;
pub use server::{EditorServer, EditorServerConfig, EditorSnapshot, ServerError};
pub use watcher::StateWatcher;
