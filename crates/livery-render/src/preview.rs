//! Live preview rendering.
//!
//! [`render`] is a pure function from a state snapshot to a small visual tree. Nothing is
//! cached between calls; the viewport only changes the container width.

use std::fmt::{self, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use livery_model::CustomizationState;

use crate::style::{PageStyle, OVERLAY_COLOR};

/// Simulated device width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    #[default]
    Desktop,
    Mobile,
}

impl Viewport {
    /// Container width declaration for this viewport.
    fn container_width(&self) -> (&'static str, &'static str) {
        match self {
            Self::Desktop => ("width", "100%"),
            Self::Mobile => ("max-width", "384px"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Desktop => "Desktop Preview",
            Self::Mobile => "Mobile Preview",
        }
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Desktop => f.write_str("desktop"),
            Self::Mobile => f.write_str("mobile"),
        }
    }
}

impl FromStr for Viewport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "desktop" => Ok(Self::Desktop),
            "mobile" => Ok(Self::Mobile),
            other => Err(format!("Unknown viewport: {}", other)),
        }
    }
}

/// A node of the preview tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with inline styles.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: &'static str,
    pub class: &'static str,
    pub attrs: Vec<(&'static str, String)>,
    pub style: Vec<(&'static str, String)>,
    pub children: Vec<Node>,
}

impl Element {
    fn new(tag: &'static str, class: &'static str) -> Self {
        Self {
            tag,
            class,
            attrs: Vec::new(),
            style: Vec::new(),
            children: Vec::new(),
        }
    }

    fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    fn css(mut self, property: &'static str, value: impl Into<String>) -> Self {
        self.style.push((property, value.into()));
        self
    }

    fn child(mut self, element: Element) -> Self {
        self.children.push(Node::Element(element));
        self
    }

    fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Value of an inline style property.
    pub fn style_value(&self, property: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Concatenated text of direct text children.
    pub fn text_content(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    fn walk<'a>(&'a self, out: &mut Vec<&'a Element>) {
        out.push(self);
        for child in &self.children {
            if let Node::Element(e) = child {
                e.walk(out);
            }
        }
    }

    fn write_html(&self, out: &mut String) {
        let _ = write!(out, "<{} class=\"{}\"", self.tag, self.class);
        for (name, value) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", name, escape_html(value));
        }
        if !self.style.is_empty() {
            let style: Vec<String> = self
                .style
                .iter()
                .map(|(p, v)| format!("{}: {}", p, v))
                .collect();
            let _ = write!(out, " style=\"{}\"", escape_html(&style.join("; ")));
        }
        out.push('>');

        if self.tag == "img" {
            return;
        }

        for child in &self.children {
            match child {
                Node::Element(e) => e.write_html(out),
                Node::Text(t) => out.push_str(&escape_html(t)),
            }
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

/// Result of rendering a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewTree {
    pub viewport: Viewport,
    pub root: Element,
}

impl PreviewTree {
    /// All elements in document order.
    pub fn elements(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        self.root.walk(&mut out);
        out
    }

    /// First element with the given class.
    pub fn find(&self, class: &str) -> Option<&Element> {
        self.elements().into_iter().find(|e| e.class == class)
    }

    /// Element classes in document order.
    pub fn classes(&self) -> Vec<&'static str> {
        self.elements().into_iter().map(|e| e.class).collect()
    }

    /// Serialize the tree to an HTML fragment.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.root.write_html(&mut out);
        out
    }

    /// Wrap the fragment in a standalone document for an iframe.
    pub fn to_document(&self, head_extra: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{}</title>
  <style>* {{ margin: 0; padding: 0; box-sizing: border-box; }} body {{ background: #f3f4f6; }}</style>
  {}
</head>
<body>
{}
</body>
</html>"#,
            self.viewport.label(),
            head_extra,
            self.to_html()
        )
    }
}

/// Render a snapshot for a viewport.
pub fn render(state: &CustomizationState, viewport: Viewport) -> PreviewTree {
    let style = PageStyle::resolve(state);
    let (width_prop, width) = viewport.container_width();

    let mut brand = Element::new("header", "header")
        .css("display", "flex")
        .css("align-items", "center")
        .css("justify-content", "space-between")
        .css("padding", "1.5rem")
        .css("border-bottom", format!("1px solid {}", style.border_color))
        .css("min-height", format!("{}px", style.header_height));
    if let Some(logo) = &style.logo_url {
        brand = brand.child(
            Element::new("img", "logo")
                .attr("src", logo.clone())
                .attr("alt", "Logo")
                .css("height", "3rem")
                .css("width", "auto")
                .css("object-fit", "contain"),
        );
    }
    let header = brand.child(
        Element::new("h1", "header-text")
            .css("font-weight", "bold")
            .css("font-size", format!("{}px", style.header_size))
            .text(style.header_text.clone()),
    );

    let mut main = Element::new("main", "main-content")
        .css("display", "flex")
        .css("flex-direction", "column")
        .css("align-items", "center")
        .css("justify-content", "center")
        .css("padding", "2rem")
        .css("text-align", "center")
        .css("min-height", "400px")
        .css("position", "relative")
        .css(
            "background-image",
            style
                .background_image
                .as_ref()
                .map(|url| format!("url('{}')", url))
                .unwrap_or_else(|| "none".to_string()),
        )
        .css("background-size", "cover")
        .css("background-position", "center")
        .css("background-repeat", "no-repeat");
    if style.overlay {
        main = main.child(
            Element::new("div", "overlay")
                .css("position", "absolute")
                .css("inset", "0")
                .css("background", OVERLAY_COLOR)
                .css("z-index", "1"),
        );
    }
    let main = main
        .child(
            Element::new("h2", "main-heading")
                .css("position", "relative")
                .css("z-index", "2")
                .css("font-weight", "bold")
                .css("margin-bottom", "1rem")
                .css("font-size", format!("{}px", style.main_heading_size))
                .css("text-shadow", style.heading_shadow.unwrap_or("none"))
                .text(style.main_heading.clone()),
        )
        .child(
            Element::new("p", "subheading")
                .css("position", "relative")
                .css("z-index", "2")
                .css("max-width", "600px")
                .css("font-size", format!("{}px", style.subheading_size))
                .css("text-shadow", style.subheading_shadow.unwrap_or("none"))
                .text(style.subheading.clone()),
        )
        .child(
            Element::new("a", "cta-button")
                .attr("href", "#")
                .css("position", "relative")
                .css("z-index", "2")
                .css("margin-top", "2rem")
                .css("padding", "0.75rem 2rem")
                .css("display", "inline-block")
                .css("background-color", style.cta_background.clone())
                .css("color", "white")
                .css("font-weight", "600")
                .css("border-radius", "0.5rem")
                .css("text-decoration", "none")
                .text(style.cta_label),
        );

    let footer = Element::new("footer", "footer")
        .css("width", "100%")
        .css("display", "flex")
        .css("align-items", "center")
        .css("justify-content", "center")
        .css("padding", "1.5rem")
        .css("border-top", format!("1px solid {}", style.border_color))
        .css("min-height", format!("{}px", style.footer_height))
        .css("background-color", style.footer_bg.clone())
        .css("color", style.footer_color.clone())
        .child(
            Element::new("p", "footer-text")
                .css("font-size", "0.875rem")
                .css("font-weight", "500")
                .css("letter-spacing", "0.025em")
                .text(style.footer_text.clone()),
        );

    let root = Element::new("div", "container")
        .css(width_prop, width)
        .css("margin", "0 auto")
        .css("font-family", format!("'{}', sans-serif", style.font_family))
        .css("font-size", format!("{}px", style.font_size))
        .css("background-color", style.bg_color.clone())
        .css("color", style.text_color.clone())
        .css("line-height", "1.6")
        .child(header)
        .child(main)
        .child(footer);

    PreviewTree { viewport, root }
}

/// Escape text for HTML content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn with_image() -> CustomizationState {
        CustomizationState {
            image: Some("https://cdn.example/bg.jpg".into()),
            ..Default::default()
        }
    }

    #[test]
    fn renders_defaults() {
        let tree = render(&CustomizationState::default(), Viewport::Desktop);

        assert_eq!(
            tree.classes(),
            vec![
                "container",
                "header",
                "header-text",
                "main-content",
                "main-heading",
                "subheading",
                "cta-button",
                "footer",
                "footer-text",
            ]
        );
        assert_eq!(tree.find("header-text").unwrap().text_content(), "Your Company");
        assert_eq!(
            tree.find("footer").unwrap().style_value("background-color"),
            Some("transparent")
        );
    }

    #[test]
    fn overlay_and_shadows_follow_image() {
        let plain = render(&CustomizationState::default(), Viewport::Desktop);
        assert!(plain.find("overlay").is_none());
        assert_eq!(
            plain.find("main-heading").unwrap().style_value("text-shadow"),
            Some("none")
        );

        let tree = render(&with_image(), Viewport::Desktop);
        assert!(tree.find("overlay").is_some());
        assert_eq!(
            tree.find("main-content").unwrap().style_value("background-image"),
            Some("url('https://cdn.example/bg.jpg')")
        );
        assert_ne!(
            tree.find("subheading").unwrap().style_value("text-shadow"),
            Some("none")
        );
    }

    #[test]
    fn logo_renders_before_header_text() {
        let state = CustomizationState {
            logo_url: Some("https://cdn.example/logo.png".into()),
            header_size: 30,
            header_height: 120,
            ..Default::default()
        };
        let tree = render(&state, Viewport::Desktop);

        let header = tree.find("header").unwrap();
        assert_eq!(header.style_value("min-height"), Some("120px"));
        assert!(matches!(&header.children[0], Node::Element(e) if e.class == "logo"));
        assert_eq!(
            tree.find("header-text").unwrap().style_value("font-size"),
            Some("30px")
        );
    }

    #[test]
    fn viewport_only_changes_container_width() {
        let state = with_image();
        let desktop = render(&state, Viewport::Desktop);
        let mobile = render(&state, Viewport::Mobile);

        assert_eq!(desktop.root.children, mobile.root.children);
        assert_eq!(mobile.root.style_value("max-width"), Some("384px"));
        assert_eq!(desktop.root.style_value("width"), Some("100%"));
    }

    #[test]
    fn rendering_is_repeatable() {
        let state = with_image();
        let first = render(&state, Viewport::Mobile);
        let _ = render(&CustomizationState::default(), Viewport::Desktop);
        assert_eq!(render(&state, Viewport::Mobile), first);
    }

    #[test]
    fn html_escapes_text() {
        let state = CustomizationState {
            main_heading: "<b>Fish & Chips</b>".into(),
            ..Default::default()
        };
        let html = render(&state, Viewport::Desktop).to_html();

        assert!(html.contains("&lt;b&gt;Fish &amp; Chips&lt;/b&gt;"));
        assert!(!html.contains("<b>"));
    }
}
