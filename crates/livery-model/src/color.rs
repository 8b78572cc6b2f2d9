//! Color value validation.
//!
//! Colors are kept as the CSS strings the user entered (hex entry or a picker result), so
//! the exact value round-trips through the wire format. Validation only decides whether a
//! string is safe and meaningful as a CSS color.

use std::sync::LazyLock;

use regex::Regex;

/// Default page background.
pub const DEFAULT_BACKGROUND: &str = "#ffffff";

/// Default text color. The call-to-action fallback keys off this exact value.
pub const DEFAULT_TEXT: &str = "#000000";

/// Default footer background.
pub const DEFAULT_FOOTER_BACKGROUND: &str = "transparent";

/// Call-to-action background used when the text color is the default black.
pub const ACCENT: &str = "#3b82f6";

/// Hover shade of [`ACCENT`].
pub const ACCENT_HOVER: &str = "#2563eb";

/// Hover background for a call-to-action colored with a custom text color.
pub const CUSTOM_HOVER: &str = "rgba(0,0,0,0.8)";

static HEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")
        .expect("hex color pattern")
});

static KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]{3,20}$").expect("color keyword pattern"));

static FUNCTIONAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:rgb|rgba|hsl|hsla)\(\s*[0-9.%]+(?:\s*[,/ ]\s*[0-9.%]+){2,3}\s*\)$")
        .expect("functional color pattern")
});

/// Check whether a string is an acceptable CSS color.
pub fn is_valid(value: &str) -> bool {
    HEX.is_match(value) || KEYWORD.is_match(value) || FUNCTIONAL.is_match(value)
}

/// Whether a color is the default black that triggers the accent fallback.
///
/// The comparison is exact: `#000` or `#000000FF` are ordinary custom colors.
pub fn is_default_black(value: &str) -> bool {
    value == DEFAULT_TEXT
}

/// Tint a six-digit hex color with a low alpha, as used for header and footer borders.
///
/// Returns `None` for any color that is not six-digit hex.
pub fn border_tint(value: &str) -> Option<String> {
    (value.len() == 7 && HEX.is_match(value)).then(|| format!("{}20", value))
}

/// The `#rrggbb` form a native color picker can show, if the value has one.
///
/// Three-digit hex is expanded; alpha, keywords and functional colors have no picker form.
pub fn picker_value(value: &str) -> Option<String> {
    if !HEX.is_match(value) {
        return None;
    }
    match value.len() {
        7 => Some(value.to_ascii_lowercase()),
        4 => Some(value[1..].chars().fold(String::from("#"), |mut hex, c| {
            let c = c.to_ascii_lowercase();
            hex.push(c);
            hex.push(c);
            hex
        })),
        _ => None,
    }
}
