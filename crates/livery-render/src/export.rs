//! Standalone HTML export.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Instant;

use minijinja::{context, Environment};
use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;

use livery_model::{presets, CustomizationState, Preset};

use crate::error::ExportError;
use crate::style::{PageStyle, OVERLAY_COLOR};

/// Characters not allowed in an export filename.
static UNSAFE_FILENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("Invalid filename regex"));

/// Options for exporting a page.
#[derive(Debug, Clone, Default)]
pub struct ExportConfig {
    /// Minify the embedded stylesheet
    pub minify: bool,
}

/// Result of a gallery export.
#[derive(Debug)]
pub struct GalleryResult {
    /// Number of pages written
    pub pages: usize,

    /// Total export time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

#[derive(Debug, Serialize)]
struct GalleryEntry {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: &'static str,
    file: String,
}

/// HTML exporter backed by minijinja.
pub struct HtmlExporter {
    env: Environment<'static>,
    config: ExportConfig,
}

impl HtmlExporter {
    /// Create an exporter with the built-in templates.
    pub fn new(config: ExportConfig) -> Self {
        let mut env = Environment::new();

        // ".css" is not auto-escaped; ".html" is
        env.add_template_owned("style.css".to_string(), STYLE_TEMPLATE.to_string())
            .expect("Failed to add stylesheet template");
        env.add_template_owned("page.html".to_string(), PAGE_TEMPLATE.to_string())
            .expect("Failed to add page template");
        env.add_template_owned("gallery.html".to_string(), GALLERY_TEMPLATE.to_string())
            .expect("Failed to add gallery template");

        Self { env, config }
    }

    /// Render the stylesheet for a resolved style.
    pub fn stylesheet(&self, style: &PageStyle) -> Result<String, ExportError> {
        let css = self
            .env
            .get_template("style.css")?
            .render(context! { s => style, overlay_color => OVERLAY_COLOR })?;

        if self.config.minify {
            minify_css(&css)
        } else {
            Ok(css)
        }
    }

    /// Render a complete document for a snapshot.
    pub fn export(&self, state: &CustomizationState) -> Result<String, ExportError> {
        let style = PageStyle::resolve(state);
        let stylesheet = self.stylesheet(&style)?;

        let html = self.env.get_template("page.html")?.render(context! {
            s => &style,
            stylesheet => stylesheet,
        })?;
        Ok(html)
    }

    fn gallery_index(&self, entries: &[GalleryEntry]) -> Result<String, ExportError> {
        let html = self
            .env
            .get_template("gallery.html")?
            .render(context! { entries => entries })?;
        Ok(html)
    }
}

impl Default for HtmlExporter {
    fn default() -> Self {
        Self::new(ExportConfig::default())
    }
}

/// Export a snapshot with default options.
pub fn export_html(state: &CustomizationState) -> Result<String, ExportError> {
    HtmlExporter::default().export(state)
}

/// Download filename for a snapshot, e.g. "Acme-Corp-template.html".
pub fn export_filename(state: &CustomizationState) -> String {
    let name = UNSAFE_FILENAME.replace_all(state.header_text.trim(), "-");
    let name = name.trim_matches(|c| c == '-' || c == '.');

    if name.is_empty() {
        "website-template.html".to_string()
    } else {
        format!("{}-template.html", name)
    }
}

/// Export a snapshot into `dir`, returning the written path.
pub fn write_export(
    state: &CustomizationState,
    dir: &Path,
    exporter: &HtmlExporter,
) -> Result<PathBuf, ExportError> {
    let html = exporter.export(state)?;

    fs::create_dir_all(dir).map_err(|e| ExportError::WriteError(e.to_string()))?;
    let path = dir.join(export_filename(state));
    fs::write(&path, html)
        .map_err(|e| ExportError::WriteError(format!("{}: {}", path.display(), e)))?;

    tracing::info!("Exported {}", path.display());
    Ok(path)
}

/// Export every preset, merged over `base`, into `<id>.html` plus an index page.
pub fn export_gallery(
    base: &CustomizationState,
    dir: &Path,
    exporter: &HtmlExporter,
) -> Result<GalleryResult, ExportError> {
    let start = Instant::now();
    fs::create_dir_all(dir).map_err(|e| ExportError::WriteError(e.to_string()))?;

    let catalogue: &[Preset] = presets();
    let results: Vec<Result<(), ExportError>> = catalogue
        .par_iter()
        .map(|preset| {
            let html = exporter.export(&base.merge(&preset.preview))?;
            let path = dir.join(format!("{}.html", preset.id));
            fs::write(&path, html)
                .map_err(|e| ExportError::WriteError(format!("{}: {}", path.display(), e)))?;
            tracing::debug!("Exported preset {}", preset.id);
            Ok(())
        })
        .collect();

    for result in results {
        result?;
    }

    let entries: Vec<GalleryEntry> = catalogue
        .iter()
        .map(|p| GalleryEntry {
            id: p.id,
            name: p.name,
            description: p.description,
            category: p.category,
            file: format!("{}.html", p.id),
        })
        .collect();
    let index = exporter.gallery_index(&entries)?;
    fs::write(dir.join("index.html"), index)
        .map_err(|e| ExportError::WriteError(e.to_string()))?;

    let duration_ms = start.elapsed().as_millis() as u64;
    tracing::info!(
        "Exported {} presets to {} in {}ms",
        catalogue.len(),
        dir.display(),
        duration_ms
    );

    Ok(GalleryResult {
        pages: catalogue.len(),
        duration_ms,
        output_dir: dir.to_path_buf(),
    })
}

/// Minify a stylesheet with lightningcss.
pub fn minify_css(css: &str) -> Result<String, ExportError> {
    use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

    let stylesheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|e| ExportError::MinifyError(e.to_string()))?;

    let minified = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..Default::default()
        })
        .map_err(|e| ExportError::MinifyError(e.to_string()))?;

    Ok(minified.code)
}

const STYLE_TEMPLATE: &str = r#"* {
  margin: 0;
  padding: 0;
  box-sizing: border-box;
}

body {
  font-family: '{{ s.font_family }}', sans-serif;
  font-size: {{ s.font_size }}px;
  background-color: {{ s.bg_color }};
  color: {{ s.text_color }};
  line-height: 1.6;
}

.container {
  width: 100%;
  margin: 0 auto;
}

.header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  padding: 1.5rem;
  border-bottom: 1px solid {{ s.border_color }};
  min-height: {{ s.header_height }}px;
}

.logo {
  height: 3rem;
  width: auto;
  object-fit: contain;
}

.header-text {
  font-weight: bold;
  font-size: {{ s.header_size }}px;
}

.main-content {
  display: flex;
  flex-direction: column;
  align-items: center;
  justify-content: center;
  padding: 2rem;
  text-align: center;
  min-height: 400px;
  position: relative;
  background-image: {% if s.background_image %}url('{{ s.background_image }}'){% else %}none{% endif %};
  background-size: cover;
  background-position: center;
  background-repeat: no-repeat;
}
{% if s.overlay %}
.overlay {
  position: absolute;
  inset: 0;
  background: {{ overlay_color }};
  z-index: 1;
}
{% endif %}
.main-content > :not(.overlay) {
  position: relative;
  z-index: 2;
}

.main-heading {
  font-weight: bold;
  margin-bottom: 1rem;
  font-size: {{ s.main_heading_size }}px;
  text-shadow: {{ s.heading_shadow if s.heading_shadow else "none" }};
}

.subheading {
  max-width: 600px;
  font-size: {{ s.subheading_size }}px;
  text-shadow: {{ s.subheading_shadow if s.subheading_shadow else "none" }};
}

.cta-button {
  margin-top: 2rem;
  padding: 0.75rem 2rem;
  display: inline-block;
  background-color: {{ s.cta_background }};
  color: white;
  font-weight: 600;
  border-radius: 0.5rem;
  text-decoration: none;
  transition: background-color 0.3s ease;
}

.cta-button:hover {
  background-color: {{ s.cta_hover }};
}

.footer {
  width: 100%;
  display: flex;
  align-items: center;
  justify-content: center;
  padding: 1.5rem;
  border-top: 1px solid {{ s.border_color }};
  min-height: {{ s.footer_height }}px;
  background-color: {{ s.footer_bg }};
  color: {{ s.footer_color }};
}

.footer-text {
  font-size: 0.875rem;
  font-weight: 500;
  letter-spacing: 0.025em;
}

@media (max-width: 768px) {
  .header {
    flex-direction: column;
    gap: 1rem;
    text-align: center;
  }

  .main-content {
    padding: 1rem;
  }

  .main-heading {
    font-size: {{ s.mobile_heading_size }}px;
  }

  .subheading {
    font-size: {{ s.mobile_subheading_size }}px;
  }
}
"#;

const PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{{ s.title }}</title>
  <style>
{{ stylesheet | safe }}
  </style>
</head>
<body>
  <div class="container">
    <header class="header">
      {% if s.logo_url %}<img src="{{ s.logo_url }}" alt="Logo" class="logo">
      {% endif %}<h1 class="header-text">{{ s.header_text }}</h1>
    </header>

    <main class="main-content">
      {% if s.overlay %}<div class="overlay"></div>
      {% endif %}<h2 class="main-heading">{{ s.main_heading }}</h2>
      <p class="subheading">{{ s.subheading }}</p>
      <a href="#" class="cta-button">{{ s.cta_label }}</a>
    </main>

    <footer class="footer">
      <p class="footer-text">{{ s.footer_text }}</p>
    </footer>
  </div>
</body>
</html>
"##;

const GALLERY_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Template Gallery</title>
  <style>
    body { font-family: system-ui, sans-serif; margin: 2rem; color: #111827; }
    ul { list-style: none; padding: 0; display: grid; gap: 1rem; }
    li { border: 1px solid #e5e7eb; border-radius: 0.5rem; padding: 1rem; }
    .category { font-size: 0.75rem; color: #6b7280; text-transform: uppercase; }
  </style>
</head>
<body>
  <h1>Template Gallery</h1>
  <ul>
  {% for entry in entries %}
    <li>
      <span class="category">{{ entry.category }}</span>
      <h2><a href="{{ entry.file }}">{{ entry.name }}</a></h2>
      <p>{{ entry.description }}</p>
    </li>
  {% endfor %}
  </ul>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::{render, Viewport};
    use pretty_assertions::assert_eq;
    use regex::Regex;
    use tempfile::TempDir;

    /// Element classes in document order, read from `class="..."` attributes.
    fn body_classes(html: &str) -> Vec<String> {
        let body = &html[html.find("<body>").unwrap()..];
        Regex::new(r#"class="([^"]+)""#)
            .unwrap()
            .captures_iter(body)
            .map(|c| c[1].to_string())
            .collect()
    }

    #[test]
    fn exports_edited_values() {
        let state = CustomizationState {
            bg_color: "#112233".into(),
            main_heading: "Hello World".into(),
            ..Default::default()
        };
        let html = export_html(&state).unwrap();

        assert!(html.contains("background-color: #112233"));
        assert!(html.contains("Hello World"));
        assert!(html.contains("Your Company"));
        assert!(html.contains("<title>Your Website</title>"));
    }

    #[test]
    fn export_is_deterministic() {
        let state = CustomizationState {
            header_text: "Acme".into(),
            image: Some("https://cdn.example/bg.jpg".into()),
            ..Default::default()
        };
        assert_eq!(export_html(&state).unwrap(), export_html(&state).unwrap());
    }

    #[test]
    fn matches_preview_structure() {
        for state in [
            CustomizationState::default(),
            CustomizationState {
                image: Some("https://cdn.example/bg.jpg".into()),
                logo_url: Some("https://cdn.example/logo.png".into()),
                ..Default::default()
            },
        ] {
            let preview = render(&state, Viewport::Desktop);
            let html = export_html(&state).unwrap();

            let expected: Vec<String> = preview.classes().iter().map(|c| c.to_string()).collect();
            assert_eq!(body_classes(&html), expected);
        }
    }

    #[test]
    fn branches_agree_with_preview() {
        let state = CustomizationState {
            text_color: "#1e40af".into(),
            image: Some("https://cdn.example/bg.jpg".into()),
            ..Default::default()
        };
        let style = PageStyle::resolve(&state);
        let html = export_html(&state).unwrap();
        let preview = render(&state, Viewport::Desktop);

        let cta = preview.find("cta-button").unwrap();
        assert_eq!(cta.style_value("background-color"), Some("#1e40af"));
        assert!(html.contains("background-color: #1e40af;\n  color: white"));
        assert!(html.contains("background-color: rgba(0,0,0,0.8)"));
        assert!(html.contains(crate::style::HEADING_SHADOW));
        assert_eq!(
            preview.find("main-heading").unwrap().style_value("text-shadow"),
            style.heading_shadow
        );
    }

    #[test]
    fn renders_call_to_action_link() {
        let html = export_html(&CustomizationState::default()).unwrap();

        assert!(html.contains(r##"<a href="#" class="cta-button">Get Started</a>"##));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn default_text_color_uses_accent() {
        let html = export_html(&CustomizationState::default()).unwrap();

        assert!(html.contains("background-color: #3b82f6"));
        assert!(html.contains("background-color: #2563eb"));
        assert!(html.contains("text-shadow: none"));
        assert!(!html.contains("class=\"overlay\""));
    }

    #[test]
    fn mobile_sizes_are_scaled() {
        let state = CustomizationState {
            main_heading_size: 40,
            subheading_size: 20,
            ..Default::default()
        };
        let html = export_html(&state).unwrap();

        assert!(html.contains("font-size: 32px"));
        assert!(html.contains("font-size: 18px"));
    }

    #[test]
    fn escapes_text_content() {
        let state = CustomizationState {
            header_text: "<script>alert(1)</script>".into(),
            ..Default::default()
        };
        let html = export_html(&state).unwrap();

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn minified_stylesheet() {
        let exporter = HtmlExporter::new(ExportConfig { minify: true });
        let html = exporter.export(&CustomizationState::default()).unwrap();

        assert!(html.contains(".cta-button{"));
        assert!(!html.contains("  margin: 0;"));
    }

    #[test]
    fn filename_from_header_text() {
        let mut state = CustomizationState::default();
        assert_eq!(export_filename(&state), "website-template.html");

        state.header_text = "Acme Corp".into();
        assert_eq!(export_filename(&state), "Acme-Corp-template.html");

        state.header_text = "../../etc".into();
        assert_eq!(export_filename(&state), "etc-template.html");

        state.header_text = "???".into();
        assert_eq!(export_filename(&state), "website-template.html");
    }

    #[test]
    fn writes_export_file() {
        let dir = TempDir::new().unwrap();
        let state = CustomizationState {
            header_text: "Acme".into(),
            ..Default::default()
        };

        let path = write_export(&state, dir.path(), &HtmlExporter::default()).unwrap();

        assert_eq!(path, dir.path().join("Acme-template.html"));
        let html = std::fs::read_to_string(path).unwrap();
        assert!(html.contains("Acme"));
    }

    #[test]
    fn exports_gallery() {
        let dir = TempDir::new().unwrap();
        let result =
            export_gallery(&CustomizationState::default(), dir.path(), &HtmlExporter::default())
                .unwrap();

        assert_eq!(result.pages, 6);
        assert!(dir.path().join("index.html").exists());
        let tech = std::fs::read_to_string(dir.path().join("tech-dark.html")).unwrap();
        assert!(tech.contains("<!DOCTYPE html>"));
    }
}
