//! Style resolution shared by the preview and the exporter.
//!
//! Both outputs read every value and every conditional branch from [`PageStyle`], so they
//! cannot disagree on overlay presence, text shadows or the call-to-action color.

use serde::Serialize;

use livery_model::color::{self, ACCENT, ACCENT_HOVER, CUSTOM_HOVER};
use livery_model::CustomizationState;

/// Text shadow on the main heading over a background image.
pub const HEADING_SHADOW: &str = "0 2px 4px rgba(0,0,0,0.5)";

/// Text shadow on the subheading over a background image.
pub const SUBHEADING_SHADOW: &str = "0 1px 2px rgba(0,0,0,0.5)";

/// Overlay drawn between a background image and the text.
pub const OVERLAY_COLOR: &str = "rgba(0, 0, 0, 0.2)";

/// Border color when the text color cannot be tinted.
pub const NEUTRAL_BORDER: &str = "#e5e7eb";

/// Fully resolved presentation of a customization state.
///
/// Text fields are raw (escaping is the output format's job); CSS values are already safe to
/// interpolate into a stylesheet or a `style` attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageStyle {
    pub title: String,
    pub font_family: &'static str,
    pub font_size: u32,
    pub bg_color: String,
    pub text_color: String,
    pub border_color: String,

    pub header_text: String,
    pub header_size: u32,
    pub header_height: u32,
    pub logo_url: Option<String>,

    /// Escaped for use inside `url('...')`
    pub background_image: Option<String>,
    pub overlay: bool,
    pub main_heading: String,
    pub main_heading_size: u32,
    pub heading_shadow: Option<&'static str>,
    pub subheading: String,
    pub subheading_size: u32,
    pub subheading_shadow: Option<&'static str>,
    /// Mobile heading size, e.g. "25.6"
    pub mobile_heading_size: String,
    /// Mobile subheading size, e.g. "16.2"
    pub mobile_subheading_size: String,

    pub cta_label: &'static str,
    pub cta_background: String,
    pub cta_hover: &'static str,

    pub footer_text: String,
    pub footer_bg: String,
    pub footer_height: u32,
    pub footer_color: String,
}

/// Document title when the header text is empty.
pub const DEFAULT_TITLE: &str = "Your Website";

impl PageStyle {
    /// Resolve a state into its presentation.
    pub fn resolve(state: &CustomizationState) -> Self {
        let text_color = safe_color(state.text_color(), color::DEFAULT_TEXT);
        let has_image = state.image().is_some();

        let (cta_background, cta_hover) = if color::is_default_black(&text_color) {
            (ACCENT.to_string(), ACCENT_HOVER)
        } else {
            (text_color.clone(), CUSTOM_HOVER)
        };

        let title = if state.header_text.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            state.header_text.clone()
        };

        Self {
            title,
            font_family: state.font_family().name(),
            font_size: state.font_size(),
            bg_color: safe_color(state.bg_color(), color::DEFAULT_BACKGROUND),
            border_color: color::border_tint(&text_color)
                .unwrap_or_else(|| NEUTRAL_BORDER.to_string()),

            header_text: state.header_text().to_string(),
            header_size: state.header_size(),
            header_height: state.header_height(),
            logo_url: state.logo_url().map(str::to_string),

            background_image: state.image().map(css_url),
            overlay: has_image,
            main_heading: state.main_heading().to_string(),
            main_heading_size: state.main_heading_size(),
            heading_shadow: has_image.then_some(HEADING_SHADOW),
            subheading: state.subheading().to_string(),
            subheading_size: state.subheading_size(),
            subheading_shadow: has_image.then_some(SUBHEADING_SHADOW),
            mobile_heading_size: scale_px(state.main_heading_size(), 8),
            mobile_subheading_size: scale_px(state.subheading_size(), 9),

            cta_label: "Get Started",
            cta_background,
            cta_hover,

            footer_text: state.footer_text().to_string(),
            footer_bg: safe_color(state.footer_bg(), color::DEFAULT_FOOTER_BACKGROUND),
            footer_height: state.footer_height(),
            footer_color: text_color.clone(),

            text_color,
        }
    }
}

/// Keep a color only if it is safe to interpolate into CSS.
fn safe_color(value: &str, fallback: &str) -> String {
    if color::is_valid(value) {
        value.to_string()
    } else {
        tracing::warn!("Ignoring invalid color '{}', using {}", value, fallback);
        fallback.to_string()
    }
}

/// Escape a URL for a single-quoted CSS `url()`.
pub fn css_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '\'' => out.push_str("%27"),
            '"' => out.push_str("%22"),
            '(' => out.push_str("%28"),
            ')' => out.push_str("%29"),
            '\\' => out.push_str("%5C"),
            '<' => out.push_str("%3C"),
            '>' => out.push_str("%3E"),
            c if c.is_whitespace() || c.is_control() => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    out.push_str(&format!("%{:02X}", byte));
                }
            }
            c => out.push(c),
        }
    }
    out
}

/// Scale a pixel size by `tenths / 10`, printed without a trailing ".0".
fn scale_px(px: u32, tenths: u32) -> String {
    let scaled = u64::from(px) * u64::from(tenths);
    match scaled % 10 {
        0 => (scaled / 10).to_string(),
        rem => format!("{}.{}", scaled / 10, rem),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_black_text_gets_accent_button() {
        let style = PageStyle::resolve(&CustomizationState::default());

        assert_eq!(style.cta_background, "#3b82f6");
        assert_eq!(style.cta_hover, "#2563eb");
    }

    #[test]
    fn custom_text_color_is_used_verbatim() {
        for text in ["#1e40af", "#000", "#000000ff", "rebeccapurple"] {
            let state = CustomizationState {
                text_color: text.into(),
                ..Default::default()
            };
            assert_eq!(PageStyle::resolve(&state).cta_background, text);
        }
    }

    #[test]
    fn image_enables_overlay_and_shadows() {
        let plain = PageStyle::resolve(&CustomizationState::default());
        assert!(!plain.overlay);
        assert_eq!(plain.heading_shadow, None);
        assert_eq!(plain.subheading_shadow, None);

        let state = CustomizationState {
            image: Some("https://cdn.example/bg.jpg".into()),
            ..Default::default()
        };
        let with_image = PageStyle::resolve(&state);
        assert!(with_image.overlay);
        assert_eq!(with_image.heading_shadow, Some(HEADING_SHADOW));
        assert_eq!(with_image.subheading_shadow, Some(SUBHEADING_SHADOW));
    }

    #[test]
    fn unsafe_values_are_neutralized() {
        let state = CustomizationState {
            bg_color: "red;}</style><script>".into(),
            image: Some("https://x.example/a b'.jpg".into()),
            ..Default::default()
        };
        let style = PageStyle::resolve(&state);

        assert_eq!(style.bg_color, "#ffffff");
        assert_eq!(
            style.background_image.as_deref(),
            Some("https://x.example/a%20b%27.jpg")
        );
    }

    #[test]
    fn empty_header_falls_back() {
        let style = PageStyle::resolve(&CustomizationState::default());
        assert_eq!(style.header_text, "Your Company");
        assert_eq!(style.title, "Your Website");
    }

    #[test]
    fn scales_mobile_sizes() {
        assert_eq!(scale_px(32, 8), "25.6");
        assert_eq!(scale_px(40, 8), "32");
        assert_eq!(scale_px(18, 9), "16.2");
        assert_eq!(scale_px(u32::MAX, 8), "3435973836");
    }
}
