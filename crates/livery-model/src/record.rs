//! Template records as stored by the template API.
//!
//! A record nests the customization under `settings.{content, colors, images}`, plus optional
//! `typography` and `layout` sections. Keys this crate does not know about are kept so a
//! record written by another client survives a load/save cycle.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::field::Field;
use crate::font::FontFamily;
use crate::state::CustomizationState;

/// A stored template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Owning tenant id
    pub tenant: i64,

    pub template_name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub settings: TemplateSettings,

    /// Server-side metadata (`tenant_name`, `updated_at`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TemplateRecord {
    /// A new record ready to be created on the server.
    pub fn draft(tenant: i64, template_name: impl Into<String>, settings: TemplateSettings) -> Self {
        Self {
            id: None,
            tenant,
            template_name: template_name.into(),
            settings,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateSettings {
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: ContentSettings,

    #[serde(default, deserialize_with = "null_as_default")]
    pub colors: ColorSettings,

    #[serde(default, deserialize_with = "null_as_default")]
    pub images: ImageSettings,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typography: Option<TypographySettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutSettings>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSettings {
    #[serde(default, deserialize_with = "null_as_default")]
    pub header_text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub main_heading: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subheading: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub footer_text: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypographySettings {
    #[serde(default, deserialize_with = "null_as_default")]
    pub font_family: FontFamily,
    #[serde(default, deserialize_with = "null_as_default")]
    pub font_size: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub header_size: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub main_heading_size: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subheading_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSettings {
    #[serde(default, deserialize_with = "null_as_default")]
    pub header_height: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub footer_height: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub footer_bg: String,
}

/// Read a JSON `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

impl TemplateSettings {
    /// Build the settings to save, keeping unknown keys from the record being edited.
    pub fn from_state(base: Option<&TemplateSettings>, state: &CustomizationState) -> Self {
        let mut settings = base.cloned().unwrap_or_default();

        settings.content.header_text = state.header_text.clone();
        settings.content.main_heading = state.main_heading.clone();
        settings.content.subheading = state.subheading.clone();
        settings.content.footer_text = state.footer_text.clone();

        settings.colors.background = Some(state.bg_color.clone());
        settings.colors.text = Some(state.text_color.clone());

        settings.images.background_image_url = state.image.clone();
        settings.images.logo_url = state.logo_url.clone();

        settings.typography = Some(TypographySettings {
            font_family: state.font_family,
            font_size: state.font_size,
            header_size: state.header_size,
            main_heading_size: state.main_heading_size,
            subheading_size: state.subheading_size,
        });
        settings.layout = Some(LayoutSettings {
            header_height: state.header_height,
            footer_height: state.footer_height,
            footer_bg: state.footer_bg.clone(),
        });

        settings
    }
}

/// A stored size, or zero (the default) if it is outside the slider range.
fn stored_size(field: Field, px: u32) -> u32 {
    match field.check_pixels(px) {
        Ok(()) => px,
        Err(_) if px == 0 => 0,
        Err(e) => {
            tracing::warn!("Ignoring stored size: {}", e);
            0
        }
    }
}

impl CustomizationState {
    /// Seed a state from a stored record.
    ///
    /// Sections the record lacks leave the corresponding fields at their defaults.
    pub fn from_record(record: &TemplateRecord) -> Self {
        let settings = &record.settings;
        let mut state = Self {
            header_text: settings.content.header_text.clone(),
            main_heading: settings.content.main_heading.clone(),
            subheading: settings.content.subheading.clone(),
            footer_text: settings.content.footer_text.clone(),
            image: non_empty(&settings.images.background_image_url),
            logo_url: non_empty(&settings.images.logo_url),
            ..Self::default()
        };

        if let Some(bg) = non_empty(&settings.colors.background) {
            state.bg_color = bg;
        }
        if let Some(text) = non_empty(&settings.colors.text) {
            state.text_color = text;
        }

        if let Some(typography) = &settings.typography {
            state.font_family = typography.font_family;
            state.font_size = stored_size(Field::FontSize, typography.font_size);
            state.header_size = stored_size(Field::HeaderSize, typography.header_size);
            state.main_heading_size =
                stored_size(Field::MainHeadingSize, typography.main_heading_size);
            state.subheading_size = stored_size(Field::SubheadingSize, typography.subheading_size);
        }
        if let Some(layout) = &settings.layout {
            state.header_height = stored_size(Field::HeaderHeight, layout.header_height);
            state.footer_height = stored_size(Field::FooterHeight, layout.footer_height);
            if !layout.footer_bg.is_empty() {
                state.footer_bg = layout.footer_bg.clone();
            }
        }

        state
    }
}
