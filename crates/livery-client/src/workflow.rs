//! Load, save and upload flows driving an [`EditorSession`].
//!
//! Each flow is split into a synchronous start, the network call, and a synchronous settle
//! step, so a caller holding the session behind a lock can release it while the request is
//! in flight. The `*_editor` helpers run all three steps for callers that own the session.

use livery_model::{EditorSession, MediaSlot, TemplateRecord};

use crate::api::TemplateApi;
use crate::error::ClientError;
use crate::storage::{MediaFile, MediaStore};

/// Name a saved template after its author.
pub fn template_name(email: Option<&str>) -> String {
    match email.map(str::trim).filter(|e| !e.is_empty()) {
        Some(email) => format!("Customized Template by {}", email),
        None => "Customized Template".to_string(),
    }
}

/// Seed an editor from the first stored template.
///
/// Failures never abort the editor: it starts from defaults with an error status instead.
pub async fn load_editor(api: &TemplateApi) -> EditorSession {
    match api.list_templates().await {
        Ok(records) => EditorSession::seed(records),
        Err(e) => {
            let mut editor = EditorSession::new();
            if e.is_unauthorized() {
                editor.expire_session();
            } else {
                editor.fail_load(&e.to_string());
            }
            editor
        }
    }
}

/// Tenant for a save that has no stored record behind it.
///
/// The configured tenant wins; otherwise the user's first tenant is used.
pub async fn fallback_tenant(
    api: &TemplateApi,
    configured: Option<i64>,
) -> Result<Option<i64>, ClientError> {
    if configured.is_some() {
        return Ok(configured);
    }
    let tenants = api.list_tenants().await?;
    Ok(tenants.first().map(|t| t.id))
}

/// Record the outcome of a save started with [`EditorSession::begin_save`].
pub fn settle_save(
    editor: &mut EditorSession,
    result: Result<TemplateRecord, ClientError>,
) -> Result<TemplateRecord, ClientError> {
    match result {
        Ok(saved) => {
            editor.finish_save(Ok(saved.clone()));
            Ok(saved)
        }
        Err(e) if e.is_unauthorized() => {
            editor.expire_session();
            Err(e)
        }
        Err(e) => {
            editor.finish_save(Err(e.to_string()));
            Err(e)
        }
    }
}

/// Save the editor's current snapshot as a new template.
pub async fn save_editor(
    editor: &mut EditorSession,
    api: &TemplateApi,
    template_name: &str,
    tenant: Option<i64>,
) -> Result<TemplateRecord, ClientError> {
    let tenant = if editor.base().is_some() {
        tenant
    } else {
        match fallback_tenant(api, tenant).await {
            Ok(tenant) => tenant,
            Err(e) if e.is_unauthorized() => {
                editor.expire_session();
                return Err(e);
            }
            Err(e) => {
                tracing::warn!("Could not look up tenants: {}", e);
                None
            }
        }
    };

    let record = editor.begin_save(template_name, tenant)?;
    let result = api.create_template(&record).await;
    settle_save(editor, result)
}

/// Record the outcome of an upload started with [`EditorSession::begin_upload`].
pub fn settle_upload(
    editor: &mut EditorSession,
    slot: MediaSlot,
    result: Result<String, ClientError>,
) -> Result<String, ClientError> {
    match result {
        Ok(url) => {
            editor.finish_upload(slot, Ok(url.clone()))?;
            Ok(url)
        }
        Err(e) => {
            let message = match &e {
                ClientError::Upload(message) => message.clone(),
                other => other.to_string(),
            };
            editor.finish_upload(slot, Err(message))?;
            Err(e)
        }
    }
}

/// Upload a file and point the slot's field at it.
pub async fn upload_media(
    editor: &mut EditorSession,
    store: &dyn MediaStore,
    slot: MediaSlot,
    file: &MediaFile,
) -> Result<String, ClientError> {
    editor.begin_upload(slot)?;
    let result = store.upload(file).await;
    settle_upload(editor, slot, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::storage::SupabaseStorage;
    use crate::stub;
    use livery_model::{EditorError, StatusKind};
    use pretty_assertions::assert_eq;

    async fn api(token: &str) -> (stub::StubServer, TemplateApi) {
        let server = stub::spawn_api().await;
        let api = TemplateApi::new(&server.base_url, Session::new(token)).unwrap();
        (server, api)
    }

    #[test]
    fn names_template_after_email() {
        assert_eq!(
            template_name(Some("a@b.example")),
            "Customized Template by a@b.example"
        );
        assert_eq!(template_name(Some(" ")), "Customized Template");
        assert_eq!(template_name(None), "Customized Template");
    }

    #[tokio::test]
    async fn loads_first_template() {
        let (_server, api) = api(stub::TOKEN).await;

        let editor = load_editor(&api).await;

        assert_eq!(editor.state().header_text, "Stored Co");
        assert_eq!(editor.state().bg_color, "#101010");
        assert_eq!(editor.state().image, None);
        assert_eq!(editor.base().map(|b| b.tenant), Some(3));
        assert!(editor.status().is_none());
    }

    #[tokio::test]
    async fn expired_token_starts_from_defaults() {
        let (_server, api) = api("stale").await;

        let editor = load_editor(&api).await;

        assert_eq!(editor.state(), &Default::default());
        assert_eq!(editor.status().map(|s| s.kind), Some(StatusKind::Error));
        assert!(!api.session().is_authenticated());
    }

    #[tokio::test]
    async fn saves_under_seeded_tenant() {
        let (server, api) = api(stub::TOKEN).await;
        let mut editor = load_editor(&api).await;
        editor
            .set(livery_model::Field::MainHeading, "Hello World")
            .unwrap();

        let saved = save_editor(&mut editor, &api, &template_name(Some("o@x.example")), None)
            .await
            .unwrap();

        assert_eq!(saved.tenant, 3);
        assert!(!editor.is_saving());
        assert_eq!(editor.status().map(|s| s.kind), Some(StatusKind::Success));
        let created = server.created();
        assert_eq!(created[0]["template_name"], "Customized Template by o@x.example");
        assert_eq!(created[0]["settings"]["content"]["mainHeading"], "Hello World");
    }

    #[tokio::test]
    async fn fresh_editor_saves_under_first_tenant() {
        let (_server, api) = api(stub::TOKEN).await;
        let mut editor = EditorSession::new();

        let saved = save_editor(&mut editor, &api, "Mine", None).await.unwrap();

        assert_eq!(saved.tenant, 9);
    }

    #[tokio::test]
    async fn failed_save_keeps_state() {
        let (_server, api) = api(stub::TOKEN).await;
        let mut editor = EditorSession::new();
        editor.set(livery_model::Field::HeaderText, "Keep me").unwrap();

        let result = save_editor(&mut editor, &api, "Broken", Some(-1)).await;

        assert!(matches!(result, Err(ClientError::Status { status: 400, .. })));
        assert_eq!(editor.state().header_text, "Keep me");
        assert!(!editor.is_saving());
        assert_eq!(
            editor.status().map(|s| s.message.as_str()),
            Some("Failed to save template")
        );
    }

    #[tokio::test]
    async fn save_waits_for_upload() {
        let (_server, api) = api(stub::TOKEN).await;
        let mut editor = EditorSession::new();
        editor.begin_upload(MediaSlot::Logo).unwrap();

        let result = save_editor(&mut editor, &api, "Mine", Some(1)).await;

        assert!(matches!(
            result,
            Err(ClientError::Editor(EditorError::UploadPending(MediaSlot::Logo)))
        ));
    }

    #[tokio::test]
    async fn upload_sets_field() {
        let server = stub::spawn_api().await;
        let store =
            SupabaseStorage::new(&server.root_url, "template-building", stub::STORAGE_KEY).unwrap();
        let mut editor = EditorSession::new();
        let file = MediaFile::new("bg.jpg", vec![7; 8]).unwrap();

        let url = upload_media(&mut editor, &store, MediaSlot::Background, &file)
            .await
            .unwrap();

        assert_eq!(editor.state().image.as_deref(), Some(url.as_str()));
        assert!(url.contains("/storage/v1/object/public/template-building/"));
        assert_eq!(editor.uploading(), None);
    }

    #[tokio::test]
    async fn failed_upload_leaves_state() {
        let server = stub::spawn_api().await;
        let store = SupabaseStorage::new(&server.root_url, "template-building", "bad").unwrap();
        let mut editor = EditorSession::new();
        let file = MediaFile::new("logo.png", vec![7; 8]).unwrap();

        let result = upload_media(&mut editor, &store, MediaSlot::Logo, &file).await;

        assert!(result.is_err());
        assert_eq!(editor.state().logo_url, None);
        assert_eq!(editor.uploading(), None);
        assert_eq!(
            editor.status().map(|s| s.message.as_str()),
            Some("Upload failed: invalid signature")
        );
    }
}
