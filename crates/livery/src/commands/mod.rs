//! CLI command implementations.

pub mod edit;
pub mod export;
pub mod init;
pub mod presets;
pub mod remote;
pub mod serve;
pub mod state;
