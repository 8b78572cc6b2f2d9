//! Named fields and single-field edits.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color;
use crate::error::EditError;
use crate::font::FontFamily;
use crate::panel::Tab;
use crate::state::CustomizationState;

/// A single field of [`CustomizationState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    HeaderText,
    MainHeading,
    Subheading,
    FooterText,
    BgColor,
    TextColor,
    FooterBg,
    FontFamily,
    FontSize,
    HeaderSize,
    MainHeadingSize,
    SubheadingSize,
    HeaderHeight,
    FooterHeight,
    Image,
    LogoUrl,
}

impl Field {
    pub const ALL: [Field; 16] = [
        Self::HeaderText,
        Self::MainHeading,
        Self::Subheading,
        Self::FooterText,
        Self::BgColor,
        Self::TextColor,
        Self::FooterBg,
        Self::FontFamily,
        Self::FontSize,
        Self::HeaderSize,
        Self::MainHeadingSize,
        Self::SubheadingSize,
        Self::HeaderHeight,
        Self::FooterHeight,
        Self::Image,
        Self::LogoUrl,
    ];

    /// Key used in the flat record and the state file.
    pub fn key(&self) -> &'static str {
        match self {
            Self::HeaderText => "headerText",
            Self::MainHeading => "mainHeading",
            Self::Subheading => "subheading",
            Self::FooterText => "footerText",
            Self::BgColor => "bgColor",
            Self::TextColor => "textColor",
            Self::FooterBg => "footerBg",
            Self::FontFamily => "fontFamily",
            Self::FontSize => "fontSize",
            Self::HeaderSize => "headerSize",
            Self::MainHeadingSize => "mainHeadingSize",
            Self::SubheadingSize => "subheadingSize",
            Self::HeaderHeight => "headerHeight",
            Self::FooterHeight => "footerHeight",
            Self::Image => "image",
            Self::LogoUrl => "logoUrl",
        }
    }

    /// Human-readable label shown next to the control.
    pub fn label(&self) -> &'static str {
        match self {
            Self::HeaderText => "Header Text",
            Self::MainHeading => "Main Heading",
            Self::Subheading => "Subheading",
            Self::FooterText => "Footer Text",
            Self::BgColor => "Background Color",
            Self::TextColor => "Text Color",
            Self::FooterBg => "Footer Background",
            Self::FontFamily => "Font Family",
            Self::FontSize => "Base Font Size",
            Self::HeaderSize => "Header Size",
            Self::MainHeadingSize => "Main Heading Size",
            Self::SubheadingSize => "Subheading Size",
            Self::HeaderHeight => "Header Height",
            Self::FooterHeight => "Footer Height",
            Self::Image => "Background Image",
            Self::LogoUrl => "Logo",
        }
    }

    /// Editor tab the field's control lives on.
    pub fn tab(&self) -> Tab {
        match self {
            Self::HeaderText | Self::MainHeading | Self::Subheading | Self::FooterText => {
                Tab::Content
            }
            Self::Image | Self::LogoUrl => Tab::Media,
            _ => Tab::Design,
        }
    }

    /// Read the field's current raw value.
    pub fn get(&self, state: &CustomizationState) -> FieldValue {
        match self {
            Self::HeaderText => FieldValue::Text(state.header_text.clone()),
            Self::MainHeading => FieldValue::Text(state.main_heading.clone()),
            Self::Subheading => FieldValue::Text(state.subheading.clone()),
            Self::FooterText => FieldValue::Text(state.footer_text.clone()),
            Self::BgColor => FieldValue::Color(state.bg_color.clone()),
            Self::TextColor => FieldValue::Color(state.text_color.clone()),
            Self::FooterBg => FieldValue::Color(state.footer_bg.clone()),
            Self::FontFamily => FieldValue::Font(state.font_family),
            Self::FontSize => FieldValue::Pixels(state.font_size),
            Self::HeaderSize => FieldValue::Pixels(state.header_size),
            Self::MainHeadingSize => FieldValue::Pixels(state.main_heading_size),
            Self::SubheadingSize => FieldValue::Pixels(state.subheading_size),
            Self::HeaderHeight => FieldValue::Pixels(state.header_height),
            Self::FooterHeight => FieldValue::Pixels(state.footer_height),
            Self::Image => FieldValue::Url(state.image.clone()),
            Self::LogoUrl => FieldValue::Url(state.logo_url.clone()),
        }
    }

    fn is_color(&self) -> bool {
        matches!(self, Self::BgColor | Self::TextColor | Self::FooterBg)
    }

    /// Inclusive slider range of a size field, `None` for every other field.
    pub const fn pixel_range(&self) -> Option<(u32, u32)> {
        match self {
            Self::FontSize => Some((12, 24)),
            Self::HeaderSize => Some((16, 48)),
            Self::MainHeadingSize => Some((20, 64)),
            Self::SubheadingSize => Some((12, 32)),
            Self::HeaderHeight => Some((60, 200)),
            Self::FooterHeight => Some((40, 160)),
            _ => None,
        }
    }

    fn is_pixels(&self) -> bool {
        self.pixel_range().is_some()
    }

    pub(crate) fn check_pixels(&self, px: u32) -> Result<(), EditError> {
        match self.pixel_range() {
            Some((min, max)) if px < min || px > max => Err(EditError::OutOfRange {
                field: self.key(),
                value: px,
                min,
                max,
            }),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Field {
    type Err = EditError;

    /// Accepts `mainHeading`, `main_heading` or `main-heading`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        Self::ALL
            .into_iter()
            .find(|field| field.key().to_lowercase() == normalized)
            .ok_or_else(|| EditError::UnknownField(s.to_string()))
    }
}

/// A typed value for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Color(String),
    Font(FontFamily),
    Pixels(u32),
    Url(Option<String>),
}

/// The raw control value, as accepted by [`FieldEdit::parse`].
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(v) | Self::Color(v) => f.write_str(v),
            Self::Font(font) => f.write_str(font.name()),
            Self::Pixels(px) => write!(f, "{}", px),
            Self::Url(url) => f.write_str(url.as_deref().unwrap_or("")),
        }
    }
}

impl FieldValue {
    fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Color(_) => "color",
            Self::Font(_) => "font",
            Self::Pixels(_) => "pixels",
            Self::Url(_) => "url",
        }
    }
}

/// Replacement of exactly one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEdit {
    pub field: Field,
    pub value: FieldValue,
}

impl FieldEdit {
    /// Parse raw control input for a field.
    ///
    /// Sliders and size inputs parse to integers within the slider's range, color inputs
    /// must be a valid CSS color, and an empty media value clears the field.
    pub fn parse(field: Field, raw: &str) -> Result<Self, EditError> {
        let value = if field.is_pixels() {
            let trimmed = raw.trim();
            let px = trimmed.parse::<u32>().map_err(|_| EditError::InvalidNumber {
                field: field.key(),
                value: raw.to_string(),
            })?;
            field.check_pixels(px)?;
            FieldValue::Pixels(px)
        } else if field.is_color() {
            let trimmed = raw.trim();
            if !color::is_valid(trimmed) {
                return Err(EditError::InvalidColor {
                    field: field.key(),
                    value: raw.to_string(),
                });
            }
            FieldValue::Color(trimmed.to_string())
        } else {
            match field {
                Field::FontFamily => FieldValue::Font(raw.parse()?),
                Field::Image | Field::LogoUrl => {
                    let url = raw.trim();
                    FieldValue::Url((!url.is_empty()).then(|| url.to_string()))
                }
                _ => FieldValue::Text(raw.to_string()),
            }
        };

        Ok(Self { field, value })
    }

    /// Check that the value's type matches the field.
    pub fn validate(&self) -> Result<(), EditError> {
        let ok = match (&self.field, &self.value) {
            (f, FieldValue::Pixels(px)) if f.is_pixels() => {
                f.check_pixels(*px)?;
                true
            }
            (f, FieldValue::Color(c)) if f.is_color() => {
                if !color::is_valid(c) {
                    return Err(EditError::InvalidColor {
                        field: f.key(),
                        value: c.clone(),
                    });
                }
                true
            }
            (Field::FontFamily, FieldValue::Font(_)) => true,
            (Field::Image | Field::LogoUrl, FieldValue::Url(_)) => true,
            (
                Field::HeaderText | Field::MainHeading | Field::Subheading | Field::FooterText,
                FieldValue::Text(_),
            ) => true,
            _ => false,
        };

        if ok {
            Ok(())
        } else {
            Err(EditError::TypeMismatch {
                field: self.field.key(),
                found: self.value.kind(),
            })
        }
    }
}

impl CustomizationState {
    /// Check stored sizes against the slider ranges. Zero stands for the default.
    pub fn check_sizes(&self) -> Result<(), EditError> {
        for field in Field::ALL {
            if let FieldValue::Pixels(px) = field.get(self) {
                if px != 0 {
                    field.check_pixels(px)?;
                }
            }
        }
        Ok(())
    }

    /// Produce a new snapshot with one field replaced.
    pub fn with_edit(&self, edit: &FieldEdit) -> Result<Self, EditError> {
        edit.validate()?;

        let mut next = self.clone();
        match (edit.field, edit.value.clone()) {
            (Field::HeaderText, FieldValue::Text(v)) => next.header_text = v,
            (Field::MainHeading, FieldValue::Text(v)) => next.main_heading = v,
            (Field::Subheading, FieldValue::Text(v)) => next.subheading = v,
            (Field::FooterText, FieldValue::Text(v)) => next.footer_text = v,
            (Field::BgColor, FieldValue::Color(v)) => next.bg_color = v,
            (Field::TextColor, FieldValue::Color(v)) => next.text_color = v,
            (Field::FooterBg, FieldValue::Color(v)) => next.footer_bg = v,
            (Field::FontFamily, FieldValue::Font(v)) => next.font_family = v,
            (Field::FontSize, FieldValue::Pixels(v)) => next.font_size = v,
            (Field::HeaderSize, FieldValue::Pixels(v)) => next.header_size = v,
            (Field::MainHeadingSize, FieldValue::Pixels(v)) => next.main_heading_size = v,
            (Field::SubheadingSize, FieldValue::Pixels(v)) => next.subheading_size = v,
            (Field::HeaderHeight, FieldValue::Pixels(v)) => next.header_height = v,
            (Field::FooterHeight, FieldValue::Pixels(v)) => next.footer_height = v,
            (Field::Image, FieldValue::Url(v)) => next.image = v,
            (Field::LogoUrl, FieldValue::Url(v)) => next.logo_url = v,
            (field, value) => {
                return Err(EditError::TypeMismatch {
                    field: field.key(),
                    found: value.kind(),
                })
            }
        }

        Ok(next)
    }
}
