//! The fixed list of font families offered by the editor.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EditError;

/// Font family applied to the whole template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FontFamily {
    #[default]
    Inter,
    Roboto,
    OpenSans,
    Lato,
    Montserrat,
    Poppins,
    Arial,
    Helvetica,
}

impl FontFamily {
    /// Every font in the order the editor lists them.
    pub const ALL: [FontFamily; 8] = [
        Self::Inter,
        Self::Roboto,
        Self::OpenSans,
        Self::Lato,
        Self::Montserrat,
        Self::Poppins,
        Self::Arial,
        Self::Helvetica,
    ];

    /// Display name, also used as the CSS family name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Inter => "Inter",
            Self::Roboto => "Roboto",
            Self::OpenSans => "Open Sans",
            Self::Lato => "Lato",
            Self::Montserrat => "Montserrat",
            Self::Poppins => "Poppins",
            Self::Arial => "Arial",
            Self::Helvetica => "Helvetica",
        }
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FontFamily {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|font| font.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| EditError::UnknownFont(wanted.to_string()))
    }
}

// Stored records may carry fonts from older editors; those read as the default.
impl From<String> for FontFamily {
    fn from(value: String) -> Self {
        if value.is_empty() {
            return Self::default();
        }
        value.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown font family '{}', using {}", value, Self::default());
            Self::default()
        })
    }
}

impl From<FontFamily> for String {
    fn from(value: FontFamily) -> Self {
        value.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_display_names() {
        assert_eq!("Open Sans".parse::<FontFamily>().unwrap(), FontFamily::OpenSans);
        assert_eq!("poppins".parse::<FontFamily>().unwrap(), FontFamily::Poppins);
        assert!(matches!(
            "Comic Sans".parse::<FontFamily>(),
            Err(EditError::UnknownFont(_))
        ));
    }

    #[test]
    fn unknown_names_deserialize_to_default() {
        let font: FontFamily = serde_json::from_str("\"Papyrus\"").unwrap();
        assert_eq!(font, FontFamily::Inter);
    }

    #[test]
    fn serializes_as_display_name() {
        let json = serde_json::to_string(&FontFamily::OpenSans).unwrap();
        assert_eq!(json, "\"Open Sans\"");
    }
}
