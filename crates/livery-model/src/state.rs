//! The customization state and its defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::color;
use crate::error::ModelError;
use crate::font::FontFamily;

pub const DEFAULT_HEADER_TEXT: &str = "Your Company";
pub const DEFAULT_MAIN_HEADING: &str = "Welcome to Our Website";
pub const DEFAULT_SUBHEADING: &str =
    "Discover amazing products and services that will transform your business.";
pub const DEFAULT_FOOTER_TEXT: &str = "© 2024 Your Company. All rights reserved.";

pub const DEFAULT_FONT_SIZE: u32 = 16;
pub const DEFAULT_HEADER_SIZE: u32 = 24;
pub const DEFAULT_MAIN_HEADING_SIZE: u32 = 32;
pub const DEFAULT_SUBHEADING_SIZE: u32 = 18;
pub const DEFAULT_HEADER_HEIGHT: u32 = 100;
pub const DEFAULT_FOOTER_HEIGHT: u32 = 50;

/// Every editable field of a template.
///
/// The raw fields hold exactly what was entered or loaded, including empty strings and
/// zero sizes. Renderers read through the accessor methods, which substitute the documented
/// default for anything absent or empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomizationState {
    pub header_text: String,
    pub main_heading: String,
    pub subheading: String,
    pub footer_text: String,

    pub bg_color: String,
    pub text_color: String,
    pub footer_bg: String,

    pub font_family: FontFamily,
    pub font_size: u32,
    pub header_size: u32,
    pub main_heading_size: u32,
    pub subheading_size: u32,

    pub header_height: u32,
    pub footer_height: u32,

    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl Default for CustomizationState {
    fn default() -> Self {
        Self {
            header_text: String::new(),
            main_heading: String::new(),
            subheading: String::new(),
            footer_text: String::new(),
            bg_color: color::DEFAULT_BACKGROUND.to_string(),
            text_color: color::DEFAULT_TEXT.to_string(),
            footer_bg: color::DEFAULT_FOOTER_BACKGROUND.to_string(),
            font_family: FontFamily::default(),
            font_size: DEFAULT_FONT_SIZE,
            header_size: DEFAULT_HEADER_SIZE,
            main_heading_size: DEFAULT_MAIN_HEADING_SIZE,
            subheading_size: DEFAULT_SUBHEADING_SIZE,
            header_height: DEFAULT_HEADER_HEIGHT,
            footer_height: DEFAULT_FOOTER_HEIGHT,
            image: None,
            logo_url: None,
        }
    }
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() {
        default
    } else {
        value
    }
}

fn px_or_default(value: u32, default: u32) -> u32 {
    if value == 0 {
        default
    } else {
        value
    }
}

impl CustomizationState {
    pub fn header_text(&self) -> &str {
        or_default(&self.header_text, DEFAULT_HEADER_TEXT)
    }

    pub fn main_heading(&self) -> &str {
        or_default(&self.main_heading, DEFAULT_MAIN_HEADING)
    }

    pub fn subheading(&self) -> &str {
        or_default(&self.subheading, DEFAULT_SUBHEADING)
    }

    pub fn footer_text(&self) -> &str {
        or_default(&self.footer_text, DEFAULT_FOOTER_TEXT)
    }

    pub fn bg_color(&self) -> &str {
        or_default(&self.bg_color, color::DEFAULT_BACKGROUND)
    }

    pub fn text_color(&self) -> &str {
        or_default(&self.text_color, color::DEFAULT_TEXT)
    }

    pub fn footer_bg(&self) -> &str {
        or_default(&self.footer_bg, color::DEFAULT_FOOTER_BACKGROUND)
    }

    pub fn font_family(&self) -> FontFamily {
        self.font_family
    }

    pub fn font_size(&self) -> u32 {
        px_or_default(self.font_size, DEFAULT_FONT_SIZE)
    }

    pub fn header_size(&self) -> u32 {
        px_or_default(self.header_size, DEFAULT_HEADER_SIZE)
    }

    pub fn main_heading_size(&self) -> u32 {
        px_or_default(self.main_heading_size, DEFAULT_MAIN_HEADING_SIZE)
    }

    pub fn subheading_size(&self) -> u32 {
        px_or_default(self.subheading_size, DEFAULT_SUBHEADING_SIZE)
    }

    pub fn header_height(&self) -> u32 {
        px_or_default(self.header_height, DEFAULT_HEADER_HEIGHT)
    }

    pub fn footer_height(&self) -> u32 {
        px_or_default(self.footer_height, DEFAULT_FOOTER_HEIGHT)
    }

    /// Background image URL, if one has been uploaded.
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref().filter(|url| !url.is_empty())
    }

    /// Logo URL, if one has been uploaded.
    pub fn logo_url(&self) -> Option<&str> {
        self.logo_url.as_deref().filter(|url| !url.is_empty())
    }

    /// Flatten into a plain key-value record for transport.
    ///
    /// Every field is present; absent media serialize as empty strings.
    pub fn to_record(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut record = match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        for key in ["image", "logoUrl"] {
            record
                .entry(key)
                .or_insert_with(|| serde_json::Value::String(String::new()));
        }
        record
    }

    /// Overlay a partial state, keeping every field the partial leaves unset.
    pub fn merge(&self, partial: &PartialState) -> Self {
        let mut next = self.clone();
        macro_rules! overlay {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = &partial.$field {
                    next.$field = value.clone();
                })*
            };
        }
        overlay!(
            header_text,
            main_heading,
            subheading,
            footer_text,
            bg_color,
            text_color,
            footer_bg,
            font_family,
            font_size,
            header_size,
            main_heading_size,
            subheading_size,
            header_height,
            footer_height,
        );
        if let Some(image) = &partial.image {
            next.image = Some(image.clone()).filter(|url| !url.is_empty());
        }
        if let Some(logo) = &partial.logo_url {
            next.logo_url = Some(logo.clone()).filter(|url| !url.is_empty());
        }
        next
    }
}

/// A customization state where every field is optional, as carried by presets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_heading: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subheading: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer_bg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<FontFamily>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_heading_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subheading_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|url| !url.trim().is_empty()))
}

/// Read a state file, falling back to defaults when it does not exist yet.
pub fn read_state_file(path: &Path) -> Result<CustomizationState, ModelError> {
    if !path.exists() {
        tracing::debug!("No state file at {}, using defaults", path.display());
        return Ok(CustomizationState::default());
    }

    let content = fs::read_to_string(path).map_err(|e| ModelError::ReadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let parse_error = |message: String| ModelError::ParseError {
        path: path.to_path_buf(),
        message,
    };
    let state: CustomizationState =
        serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))?;
    state.check_sizes().map_err(|e| parse_error(e.to_string()))?;
    Ok(state)
}

/// Write a state file as pretty-printed JSON.
pub fn write_state_file(path: &Path, state: &CustomizationState) -> Result<(), ModelError> {
    let write_error = |message: String| ModelError::WriteError {
        path: path.to_path_buf(),
        message,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| write_error(e.to_string()))?;
    }

    let json = serde_json::to_string_pretty(state).map_err(|e| write_error(e.to_string()))?;
    fs::write(path, json + "\n").map_err(|e| write_error(e.to_string()))
}
