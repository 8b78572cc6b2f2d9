//! Commands that talk to the template API and media storage.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use livery_client::{load_editor, save_editor, template_name, upload_media, MediaFile, TemplateApi};
use livery_model::{read_state_file, write_state_file, EditorSession, MediaSlot, StatusKind};

use crate::config::ConfigFile;

/// Replace the state file with the first stored template.
pub async fn pull(config: &ConfigFile) -> Result<()> {
    let api = config.template_api()?;
    let editor = load_editor(&api).await;
    fail_on_error(&editor)?;

    write_state_file(&config.project.state_file, editor.state())?;
    match editor.base() {
        Some(base) => tracing::info!(
            "Pulled '{}' into {}",
            base.template_name,
            config.project.state_file.display()
        ),
        None => tracing::info!(
            "No stored templates, wrote defaults to {}",
            config.project.state_file.display()
        ),
    }
    Ok(())
}

/// Save the state file as a new template.
pub async fn push(config: &ConfigFile, name: Option<String>) -> Result<()> {
    let api = config.template_api()?;
    let name = match name {
        Some(name) => name,
        None => default_name(config, &api).await?,
    };

    let mut editor = EditorSession::with_state(read_state_file(&config.project.state_file)?);
    let saved = save_editor(&mut editor, &api, &name, config.api.tenant).await?;

    match saved.id {
        Some(id) => tracing::info!("Saved '{}' as template {}", saved.template_name, id),
        None => tracing::info!("Saved '{}'", saved.template_name),
    }
    Ok(())
}

/// Upload an image and point a slot at it.
pub async fn upload(config: &ConfigFile, slot: &str, file: &Path) -> Result<()> {
    let slot: MediaSlot = slot.parse().map_err(anyhow::Error::msg)?;
    let store = config
        .media_store()?
        .context("Media storage is not configured (set [storage] url and key)")?;

    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} is not a file", file.display()))?;
    let bytes = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let media = MediaFile::new(name, bytes)?;

    let mut editor = EditorSession::with_state(read_state_file(&config.project.state_file)?);
    let url = upload_media(&mut editor, &store, slot, &media).await?;

    write_state_file(&config.project.state_file, editor.state())?;
    tracing::info!("{} set to {}", slot.field().key(), url);
    Ok(())
}

/// Template name from the verified user, or the configured email.
async fn default_name(config: &ConfigFile, api: &TemplateApi) -> Result<String> {
    if !api.session().is_authenticated() {
        anyhow::bail!("No API token configured (set [api] token or LIVERY_TOKEN)");
    }

    let email = match api.session().refresh(api).await {
        Ok(user) => Some(user.email),
        Err(e) if e.is_unauthorized() => {
            anyhow::bail!("Your session has expired. Please log in again.")
        }
        Err(e) => {
            tracing::warn!("Could not verify token: {}", e);
            config.api.email.clone()
        }
    };
    Ok(template_name(email.as_deref()))
}

/// Surface an error banner from a flow that never fails outright.
fn fail_on_error(editor: &EditorSession) -> Result<()> {
    match editor.status() {
        Some(status) if status.kind == StatusKind::Error => anyhow::bail!("{}", status.message),
        _ => Ok(()),
    }
}
