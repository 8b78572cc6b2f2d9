//! Persistence client for livery.
//!
//! Talks to the template REST API with an explicit [`Session`] and uploads media to object
//! storage. The [`workflow`] module ties both to an editor session.

pub mod api;
pub mod error;
pub mod session;
pub mod storage;
pub mod workflow;

#[cfg(test)]
mod stub;

pub use api::{Tenant, TemplateApi, DEFAULT_BASE_URL};
pub use error::ClientError;
pub use session::{Session, User};
pub use storage::{MediaFile, MediaStore, SupabaseStorage, DEFAULT_BUCKET};
pub use workflow::{
    fallback_tenant, load_editor, save_editor, settle_save, settle_upload, template_name,
    upload_media,
};
