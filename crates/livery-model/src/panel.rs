//! Editor panel control catalogue.
//!
//! Each control is bound to exactly one field. Front ends render these however they like;
//! every change goes through [`FieldEdit::parse`](crate::FieldEdit::parse).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::field::Field;

/// Panel tab grouping related controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Content,
    Design,
    Media,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Content, Tab::Design, Tab::Media];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Content => "Content Settings",
            Self::Design => "Design Settings",
            Self::Media => "Media Settings",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Design => "design",
            Self::Media => "media",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tab| tab.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown tab: {}", s))
    }
}

/// The kind of input a control presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControlKind {
    Text,
    TextArea { rows: u8 },
    FontSelect,
    Slider { min: u32, max: u32 },
    Color,
    File { accept: &'static str },
}

/// One editor control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Control {
    pub field: Field,
    pub kind: ControlKind,
    pub placeholder: Option<&'static str>,
}

const fn control(field: Field, kind: ControlKind) -> Control {
    Control {
        field,
        kind,
        placeholder: None,
    }
}

const fn slider(field: Field) -> Control {
    let (min, max) = match field.pixel_range() {
        Some(range) => range,
        None => (0, 0),
    };
    control(field, ControlKind::Slider { min, max })
}

const fn text(field: Field, placeholder: &'static str) -> Control {
    Control {
        field,
        kind: ControlKind::Text,
        placeholder: Some(placeholder),
    }
}

static CONTENT: [Control; 4] = [
    text(Field::HeaderText, "Enter header text"),
    text(Field::MainHeading, "Enter main heading"),
    Control {
        field: Field::Subheading,
        kind: ControlKind::TextArea { rows: 3 },
        placeholder: Some("Enter subheading"),
    },
    text(Field::FooterText, "Enter footer text"),
];

static DESIGN: [Control; 10] = [
    control(Field::FontFamily, ControlKind::FontSelect),
    slider(Field::FontSize),
    control(Field::BgColor, ControlKind::Color),
    control(Field::TextColor, ControlKind::Color),
    control(Field::FooterBg, ControlKind::Color),
    slider(Field::HeaderSize),
    slider(Field::MainHeadingSize),
    slider(Field::SubheadingSize),
    slider(Field::HeaderHeight),
    slider(Field::FooterHeight),
];

static MEDIA: [Control; 2] = [
    control(Field::Image, ControlKind::File { accept: "image/*" }),
    control(Field::LogoUrl, ControlKind::File { accept: "image/*" }),
];

/// Controls shown on a tab, in display order.
pub fn controls(tab: Tab) -> &'static [Control] {
    match tab {
        Tab::Content => &CONTENT,
        Tab::Design => &DESIGN,
        Tab::Media => &MEDIA,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_field_has_exactly_one_control() {
        let bound: Vec<Field> = Tab::ALL
            .into_iter()
            .flat_map(|tab| controls(tab).iter().map(|c| c.field))
            .collect();
        let unique: HashSet<Field> = bound.iter().copied().collect();

        assert_eq!(bound.len(), Field::ALL.len());
        assert_eq!(unique.len(), Field::ALL.len());
    }

    #[test]
    fn controls_live_on_their_fields_tab() {
        for tab in Tab::ALL {
            for control in controls(tab) {
                assert_eq!(control.field.tab(), tab, "{}", control.field);
            }
        }
    }

    #[test]
    fn parses_tab_slugs() {
        assert_eq!("Media".parse::<Tab>().unwrap(), Tab::Media);
        assert!("layout".parse::<Tab>().is_err());
    }
}
