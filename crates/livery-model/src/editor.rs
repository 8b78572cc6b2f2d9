//! Editor session state machine.
//!
//! Holds the current snapshot and the status banner, and gates the two long-running
//! operations (media upload and save). The session never performs I/O itself: callers start
//! an operation, run the request without holding the session, then report the outcome, so
//! the preview keeps rendering while a request is in flight.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EditError, EditorError};
use crate::field::{Field, FieldEdit, FieldValue};
use crate::gallery;
use crate::record::{TemplateRecord, TemplateSettings};
use crate::state::CustomizationState;

/// Which media field an upload fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaSlot {
    /// Main section background (`image`)
    Background,
    /// Header logo (`logoUrl`)
    Logo,
}

impl MediaSlot {
    pub fn field(&self) -> Field {
        match self {
            Self::Background => Field::Image,
            Self::Logo => Field::LogoUrl,
        }
    }
}

impl fmt::Display for MediaSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Background => f.write_str("background"),
            Self::Logo => f.write_str("logo"),
        }
    }
}

impl FromStr for MediaSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "background" | "image" | "bg" => Ok(Self::Background),
            "logo" | "logourl" | "logo_url" => Ok(Self::Logo),
            other => Err(format!("Unknown media slot: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Success,
    Error,
    Info,
}

/// Dismissible banner shown above the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub message: String,
}

impl StatusMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            message: message.into(),
        }
    }
}

/// One editing session over a template.
#[derive(Debug, Clone, Default)]
pub struct EditorSession {
    state: CustomizationState,
    base: Option<TemplateRecord>,
    status: Option<StatusMessage>,
    is_saving: bool,
    uploading: Option<MediaSlot>,
    revision: u64,
}

impl EditorSession {
    /// A session starting from defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session starting from an existing snapshot with no stored record behind it.
    pub fn with_state(state: CustomizationState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    /// Seed from the template list: the first record wins, none means defaults.
    pub fn seed(records: Vec<TemplateRecord>) -> Self {
        match records.into_iter().next() {
            Some(record) => {
                tracing::info!(
                    "Seeding editor from template '{}' (tenant {})",
                    record.template_name,
                    record.tenant
                );
                Self {
                    state: CustomizationState::from_record(&record),
                    base: Some(record),
                    ..Self::default()
                }
            }
            None => {
                tracing::info!("No stored templates, starting from defaults");
                Self::default()
            }
        }
    }

    pub fn state(&self) -> &CustomizationState {
        &self.state
    }

    /// The stored record this session was seeded from.
    pub fn base(&self) -> Option<&TemplateRecord> {
        self.base.as_ref()
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn is_saving(&self) -> bool {
        self.is_saving
    }

    pub fn uploading(&self) -> Option<MediaSlot> {
        self.uploading
    }

    /// Incremented on every state change; front ends use it to refresh previews.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_status(&mut self, status: StatusMessage) {
        self.status = Some(status);
    }

    pub fn dismiss_status(&mut self) {
        self.status = None;
    }

    fn replace_state(&mut self, state: CustomizationState) {
        if state != self.state {
            self.state = state;
            self.revision += 1;
        }
    }

    /// Replace the whole snapshot, e.g. after the state file changed on disk.
    pub fn reset_state(&mut self, state: CustomizationState) {
        self.replace_state(state);
    }

    /// Apply a single-field edit.
    pub fn apply(&mut self, edit: &FieldEdit) -> Result<&CustomizationState, EditError> {
        let next = self.state.with_edit(edit)?;
        tracing::debug!("Edited {}", edit.field);
        self.replace_state(next);
        Ok(&self.state)
    }

    /// Parse raw control input and apply it.
    pub fn set(&mut self, field: Field, raw: &str) -> Result<&CustomizationState, EditError> {
        let edit = FieldEdit::parse(field, raw)?;
        self.apply(&edit)
    }

    /// Merge a gallery preset over the current snapshot.
    pub fn apply_preset(&mut self, id: &str) -> Result<&CustomizationState, EditorError> {
        let partial = gallery::select_preset(id)?;
        let next = self.state.merge(partial);
        tracing::info!("Applied preset {}", id);
        self.replace_state(next);
        self.status = Some(StatusMessage::success("Template applied successfully!"));
        Ok(&self.state)
    }

    /// Mark an upload as in flight.
    pub fn begin_upload(&mut self, slot: MediaSlot) -> Result<(), EditorError> {
        if let Some(current) = self.uploading {
            return Err(EditorError::UploadInProgress(current));
        }
        self.uploading = Some(slot);
        Ok(())
    }

    /// Record the outcome of an upload.
    ///
    /// On success the public URL replaces the slot's field. On failure the state is left
    /// exactly as it was and the error is shown.
    pub fn finish_upload(
        &mut self,
        slot: MediaSlot,
        result: Result<String, String>,
    ) -> Result<&CustomizationState, EditorError> {
        if self.uploading != Some(slot) {
            return Err(EditorError::NoUploadInProgress(slot));
        }
        self.uploading = None;

        match result {
            Ok(url) => {
                let edit = FieldEdit {
                    field: slot.field(),
                    value: FieldValue::Url(Some(url)),
                };
                let next = self.state.with_edit(&edit)?;
                self.replace_state(next);
                self.status = Some(StatusMessage::success("File uploaded successfully!"));
            }
            Err(message) => {
                tracing::warn!("Upload of {} failed: {}", slot, message);
                self.status = Some(StatusMessage::error(format!("Upload failed: {}", message)));
            }
        }

        Ok(&self.state)
    }

    /// Start a save and return the record to submit.
    ///
    /// The record reuses the seeding record's tenant and unknown settings, or
    /// `fallback_tenant` when the session started from defaults.
    pub fn begin_save(
        &mut self,
        template_name: &str,
        fallback_tenant: Option<i64>,
    ) -> Result<TemplateRecord, EditorError> {
        if self.is_saving {
            return Err(EditorError::AlreadySaving);
        }
        if let Some(slot) = self.uploading {
            self.status = Some(StatusMessage::error(format!(
                "Wait for the {} upload to finish before saving",
                slot
            )));
            return Err(EditorError::UploadPending(slot));
        }

        let Some(tenant) = self.base.as_ref().map(|b| b.tenant).or(fallback_tenant) else {
            self.status = Some(StatusMessage::error("No tenant to save the template under"));
            return Err(EditorError::MissingTenant);
        };

        let settings =
            TemplateSettings::from_state(self.base.as_ref().map(|b| &b.settings), &self.state);

        self.is_saving = true;
        self.status = None;

        Ok(TemplateRecord::draft(tenant, template_name, settings))
    }

    /// Record the outcome of a save.
    pub fn finish_save(&mut self, result: Result<TemplateRecord, String>) {
        self.is_saving = false;
        match result {
            Ok(saved) => {
                tracing::info!("Saved template '{}'", saved.template_name);
                self.status = Some(StatusMessage::success("Template saved successfully!"));
            }
            Err(message) => {
                tracing::warn!("Save failed: {}", message);
                self.status = Some(StatusMessage::error("Failed to save template"));
            }
        }
    }

    /// Record a failed initial fetch. The session keeps its defaults.
    pub fn fail_load(&mut self, message: &str) {
        tracing::warn!("Failed to load template: {}", message);
        self.status = Some(StatusMessage::error("Failed to load template"));
    }

    /// Record an authentication failure.
    pub fn expire_session(&mut self) {
        self.is_saving = false;
        self.status = Some(StatusMessage::error(
            "Your session has expired. Please log in again.",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> TemplateRecord {
        let state = CustomizationState {
            header_text: "Acme".into(),
            ..Default::default()
        };
        TemplateRecord::draft(4, "Stored", TemplateSettings::from_state(None, &state))
    }

    #[test]
    fn seeds_from_first_record_or_defaults() {
        let other = TemplateRecord::draft(9, "Other", TemplateSettings::default());
        let seeded = EditorSession::seed(vec![stored(), other]);
        assert_eq!(seeded.state().header_text, "Acme");
        assert_eq!(seeded.base().map(|b| b.tenant), Some(4));

        let empty = EditorSession::seed(vec![]);
        assert_eq!(empty.state(), &CustomizationState::default());
        assert!(empty.base().is_none());
    }

    #[test]
    fn invalid_edit_leaves_state_untouched() {
        let mut session = EditorSession::new();
        assert!(session.set(Field::FontSize, "huge").is_err());
        assert_eq!(session.state(), &CustomizationState::default());
        assert_eq!(session.revision(), 0);

        session.set(Field::FontSize, "20").unwrap();
        assert_eq!(session.state().font_size, 20);
        assert_eq!(session.revision(), 1);
    }

    #[test]
    fn successful_upload_writes_url() {
        let mut session = EditorSession::new();
        session.begin_upload(MediaSlot::Logo).unwrap();
        session
            .finish_upload(MediaSlot::Logo, Ok("https://cdn.example/logo.png".into()))
            .unwrap();

        assert_eq!(session.state().logo_url(), Some("https://cdn.example/logo.png"));
        assert_eq!(session.uploading(), None);
        assert_eq!(session.status().map(|s| s.kind), Some(StatusKind::Success));
    }

    #[test]
    fn failed_upload_keeps_previous_value() {
        let mut session = EditorSession::with_state(CustomizationState {
            image: Some("https://cdn.example/old.jpg".into()),
            ..Default::default()
        });
        let before = session.state().clone();

        session.begin_upload(MediaSlot::Background).unwrap();
        session
            .finish_upload(MediaSlot::Background, Err("bucket not found".into()))
            .unwrap();

        assert_eq!(session.state(), &before);
        let status = session.status().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert!(status.message.contains("bucket not found"));
    }

    #[test]
    fn only_one_upload_at_a_time() {
        let mut session = EditorSession::new();
        session.begin_upload(MediaSlot::Logo).unwrap();

        assert_eq!(
            session.begin_upload(MediaSlot::Background),
            Err(EditorError::UploadInProgress(MediaSlot::Logo))
        );
        assert!(session
            .finish_upload(MediaSlot::Background, Ok("x".into()))
            .is_err());
    }

    #[test]
    fn save_is_gated() {
        let mut session = EditorSession::seed(vec![stored()]);

        let record = session.begin_save("Customized Template by a@b.co", None).unwrap();
        assert_eq!(record.tenant, 4);
        assert!(session.is_saving());
        assert_eq!(
            session.begin_save("again", None),
            Err(EditorError::AlreadySaving)
        );

        session.finish_save(Ok(record));
        assert!(!session.is_saving());
        assert_eq!(session.status().map(|s| s.kind), Some(StatusKind::Success));
    }

    #[test]
    fn save_waits_for_upload() {
        let mut session = EditorSession::seed(vec![stored()]);
        session.begin_upload(MediaSlot::Background).unwrap();

        assert_eq!(
            session.begin_save("name", None),
            Err(EditorError::UploadPending(MediaSlot::Background))
        );
        assert!(!session.is_saving());
    }

    #[test]
    fn save_needs_a_tenant() {
        let mut session = EditorSession::new();
        assert_eq!(session.begin_save("name", None), Err(EditorError::MissingTenant));

        let record = session.begin_save("name", Some(2)).unwrap();
        assert_eq!(record.tenant, 2);
    }

    #[test]
    fn failed_save_keeps_state() {
        let mut session = EditorSession::seed(vec![stored()]);
        let before = session.state().clone();

        session.begin_save("name", None).unwrap();
        session.finish_save(Err("connection refused".into()));

        assert_eq!(session.state(), &before);
        assert!(!session.is_saving());
        assert_eq!(session.status().map(|s| s.kind), Some(StatusKind::Error));
    }

    #[test]
    fn applying_preset_sets_status() {
        let mut session = EditorSession::new();
        session.apply_preset("food-restaurant").unwrap();

        assert_eq!(session.state().header_text, "Bella Vista");
        assert!(session.status().is_some());

        session.dismiss_status();
        assert!(session.status().is_none());
    }
}
