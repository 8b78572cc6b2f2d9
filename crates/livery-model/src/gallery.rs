//! Built-in template presets.

use std::sync::LazyLock;

use serde::Serialize;

use crate::error::GalleryError;
use crate::font::FontFamily;
use crate::state::PartialState;

/// Category name that matches every preset.
pub const ALL_CATEGORIES: &str = "All";

/// A named starting point offered by the gallery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preset {
    /// Stable identifier (e.g., "tech-dark")
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    /// Fields applied when the preset is selected
    pub preview: PartialState,
}

struct Look {
    bg: &'static str,
    text: &'static str,
    font: FontFamily,
    header: &'static str,
    heading: &'static str,
    subheading: &'static str,
    footer: &'static str,
}

fn preset(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: &'static str,
    look: Look,
) -> Preset {
    Preset {
        id,
        name,
        description,
        category,
        preview: PartialState {
            bg_color: Some(look.bg.to_string()),
            text_color: Some(look.text.to_string()),
            font_family: Some(look.font),
            header_text: Some(look.header.to_string()),
            main_heading: Some(look.heading.to_string()),
            subheading: Some(look.subheading.to_string()),
            footer_text: Some(look.footer.to_string()),
            ..Default::default()
        },
    }
}

static PRESETS: LazyLock<Vec<Preset>> = LazyLock::new(|| {
    vec![
        preset(
            "modern-minimal",
            "Modern Minimal",
            "Clean and simple design perfect for professional websites",
            "Business",
            Look {
                bg: "#ffffff",
                text: "#1f2937",
                font: FontFamily::Inter,
                header: "Your Company",
                heading: "Welcome to the Future",
                subheading: "Transform your business with cutting-edge solutions",
                footer: "© 2024 Your Company. All rights reserved.",
            },
        ),
        preset(
            "creative-bold",
            "Creative Bold",
            "Vibrant colors and bold typography for creative agencies",
            "Creative",
            Look {
                bg: "#f8fafc",
                text: "#1e40af",
                font: FontFamily::Poppins,
                header: "Creative Studio",
                heading: "Bringing Ideas to Life",
                subheading: "We create stunning digital experiences that captivate and inspire",
                footer: "Let's create something amazing together",
            },
        ),
        preset(
            "tech-dark",
            "Tech Dark",
            "Dark theme perfect for tech companies and startups",
            "Technology",
            Look {
                bg: "#0f172a",
                text: "#f1f5f9",
                font: FontFamily::Roboto,
                header: "TechCorp",
                heading: "Innovation at Scale",
                subheading: "Building the future with cutting-edge technology and AI",
                footer: "© 2024 TechCorp. Pushing boundaries.",
            },
        ),
        preset(
            "elegant-luxury",
            "Elegant Luxury",
            "Sophisticated design for luxury brands and high-end services",
            "Luxury",
            Look {
                bg: "#fefefe",
                text: "#374151",
                font: FontFamily::Montserrat,
                header: "Luxury Brand",
                heading: "Excellence Redefined",
                subheading: "Experience the pinnacle of luxury and sophistication",
                footer: "Crafting exceptional experiences since 2024",
            },
        ),
        preset(
            "health-wellness",
            "Health & Wellness",
            "Calming colors and clean design for health and wellness businesses",
            "Health",
            Look {
                bg: "#f0fdf4",
                text: "#166534",
                font: FontFamily::OpenSans,
                header: "Wellness Center",
                heading: "Your Health, Our Priority",
                subheading: "Comprehensive wellness solutions for a better tomorrow",
                footer: "Taking care of you, naturally",
            },
        ),
        preset(
            "food-restaurant",
            "Food & Restaurant",
            "Warm and inviting design perfect for restaurants and food businesses",
            "Food",
            Look {
                bg: "#fff7ed",
                text: "#9a3412",
                font: FontFamily::Lato,
                header: "Bella Vista",
                heading: "Taste the Difference",
                subheading: "Authentic flavors crafted with love and passion",
                footer: "Where every meal is a celebration",
            },
        ),
    ]
});

/// All presets in catalogue order.
pub fn presets() -> &'static [Preset] {
    &PRESETS
}

/// "All" followed by each distinct category in catalogue order.
pub fn categories() -> Vec<&'static str> {
    let mut categories = vec![ALL_CATEGORIES];
    for preset in presets() {
        if !categories.contains(&preset.category) {
            categories.push(preset.category);
        }
    }
    categories
}

/// Presets in a category; "All" returns the whole catalogue.
pub fn filter_by_category(category: &str) -> Vec<&'static Preset> {
    presets()
        .iter()
        .filter(|p| category == ALL_CATEGORIES || p.category.eq_ignore_ascii_case(category))
        .collect()
}

/// Look up a preset's partial state by id.
pub fn select_preset(id: &str) -> Result<&'static PartialState, GalleryError> {
    presets()
        .iter()
        .find(|p| p.id == id)
        .map(|p| &p.preview)
        .ok_or_else(|| GalleryError::UnknownPreset(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CustomizationState;

    #[test]
    fn lists_categories_in_catalogue_order() {
        assert_eq!(
            categories(),
            vec!["All", "Business", "Creative", "Technology", "Luxury", "Health", "Food"]
        );
    }

    #[test]
    fn filters_by_category() {
        assert_eq!(filter_by_category("All").len(), 6);

        let tech = filter_by_category("Technology");
        assert_eq!(tech.len(), 1);
        assert_eq!(tech[0].id, "tech-dark");

        assert!(filter_by_category("Sports").is_empty());
    }

    #[test]
    fn selecting_overwrites_only_preset_fields() {
        let current = CustomizationState {
            font_size: 22,
            header_height: 140,
            image: Some("https://cdn.example/bg.jpg".into()),
            ..Default::default()
        };

        let merged = current.merge(select_preset("tech-dark").unwrap());

        assert_eq!(merged.bg_color, "#0f172a");
        assert_eq!(merged.text_color, "#f1f5f9");
        assert_eq!(merged.font_family, FontFamily::Roboto);
        assert_eq!(merged.main_heading, "Innovation at Scale");
        assert_eq!(merged.font_size, 22);
        assert_eq!(merged.header_height, 140);
        assert_eq!(merged.image, current.image);
    }

    #[test]
    fn unknown_preset_is_an_error() {
        assert_eq!(
            select_preset("retro"),
            Err(GalleryError::UnknownPreset("retro".into()))
        );
    }
}
