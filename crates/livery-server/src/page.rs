//! The editor page.

use minijinja::{context, Environment};
use serde::Serialize;

use livery_model::{
    categories, color, controls, presets, ControlKind, EditorSession, Field, FontFamily, MediaSlot,
    Tab,
};

/// A control with its current value, ready for the page template.
#[derive(Debug, Serialize)]
struct ControlView {
    key: &'static str,
    label: &'static str,
    kind: &'static str,
    value: String,
    placeholder: Option<&'static str>,
    rows: Option<u8>,
    min: Option<u32>,
    max: Option<u32>,
    accept: Option<&'static str>,
    slot: Option<MediaSlot>,
    swatch: Option<String>,
}

#[derive(Debug, Serialize)]
struct TabView {
    slug: &'static str,
    title: &'static str,
    controls: Vec<ControlView>,
}

#[derive(Debug, Serialize)]
struct PresetView {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: &'static str,
    bg: String,
    text: String,
}

fn tab_views(editor: &EditorSession) -> Vec<TabView> {
    Tab::ALL
        .into_iter()
        .map(|tab| TabView {
            slug: tab.slug(),
            title: tab.title(),
            controls: controls(tab)
                .iter()
                .map(|control| {
                    let (kind, rows, min, max, accept) = match control.kind {
                        ControlKind::Text => ("text", None, None, None, None),
                        ControlKind::TextArea { rows } => ("textarea", Some(rows), None, None, None),
                        ControlKind::FontSelect => ("font", None, None, None, None),
                        ControlKind::Slider { min, max } => ("slider", None, Some(min), Some(max), None),
                        ControlKind::Color => ("color", None, None, None, None),
                        ControlKind::File { accept } => ("file", None, None, None, Some(accept)),
                    };
                    let slot = match control.field {
                        Field::Image => Some(MediaSlot::Background),
                        Field::LogoUrl => Some(MediaSlot::Logo),
                        _ => None,
                    };

                    let value = control.field.get(editor.state()).to_string();
                    let swatch = matches!(control.kind, ControlKind::Color).then(|| {
                        color::picker_value(&value)
                            .unwrap_or_else(|| color::DEFAULT_TEXT.to_string())
                    });

                    ControlView {
                        key: control.field.key(),
                        label: control.field.label(),
                        kind,
                        value,
                        placeholder: control.placeholder,
                        rows,
                        min,
                        max,
                        accept,
                        slot,
                        swatch,
                    }
                })
                .collect(),
        })
        .collect()
}

fn preset_views() -> Vec<PresetView> {
    presets()
        .iter()
        .map(|p| PresetView {
            id: p.id,
            name: p.name,
            description: p.description,
            category: p.category,
            bg: p.preview.bg_color.clone().unwrap_or_default(),
            text: p.preview.text_color.clone().unwrap_or_default(),
        })
        .collect()
}

/// Render the editor page for the current session.
pub fn render_editor_page(editor: &EditorSession) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("editor.html", EDITOR_TEMPLATE)?;

    let fonts: Vec<&'static str> = FontFamily::ALL.iter().map(|f| f.name()).collect();

    env.get_template("editor.html")?.render(context! {
        tabs => tab_views(editor),
        presets => preset_views(),
        categories => categories(),
        fonts => fonts,
        status => editor.status(),
        revision => editor.revision(),
    })
}

const EDITOR_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>livery editor</title>
  <style>
    * { box-sizing: border-box; }
    body { margin: 0; font-family: system-ui, sans-serif; color: #111827; background: #f3f4f6; }
    .layout { display: grid; grid-template-columns: 360px 1fr; min-height: 100vh; }
    .panel { background: white; border-right: 1px solid #e5e7eb; padding: 1rem; overflow-y: auto; }
    .tabs { display: flex; gap: 0.25rem; margin-bottom: 1rem; }
    .tabs button { flex: 1; padding: 0.5rem; border: 1px solid #e5e7eb; background: #f9fafb; cursor: pointer; }
    .tabs button.active { background: #3b82f6; color: white; }
    .control { display: block; margin-bottom: 1rem; }
    .control span { display: block; font-size: 0.875rem; font-weight: 500; margin-bottom: 0.25rem; }
    .control input[type=text], .control textarea, .control select { width: 100%; padding: 0.5rem; }
    .control .error { color: #b91c1c; font-size: 0.75rem; }
    .control .color-pair { display: flex; gap: 0.5rem; margin: 0; font-weight: normal; }
    .control input[type=color] { width: 3rem; height: 2.25rem; padding: 0; }
    .actions { display: flex; gap: 0.5rem; margin: 1rem 0; }
    .actions a, .actions button { padding: 0.5rem 1rem; border-radius: 0.375rem; border: 0; background: #111827; color: white; text-decoration: none; cursor: pointer; }
    .gallery { display: grid; gap: 0.5rem; }
    .preset { border: 1px solid #e5e7eb; border-radius: 0.375rem; padding: 0.5rem; cursor: pointer; }
    .preset .swatch { height: 2rem; border-radius: 0.25rem; margin-bottom: 0.25rem; }
    .stage { padding: 1rem; }
    .viewports { margin-bottom: 0.5rem; }
    .stage iframe { width: 100%; height: calc(100vh - 6rem); border: 1px solid #e5e7eb; background: white; }
    .status { padding: 0.75rem 1rem; display: flex; justify-content: space-between; }
    .status-success { background: #dcfce7; color: #166534; }
    .status-error { background: #fee2e2; color: #991b1b; }
    .status-info { background: #dbeafe; color: #1e40af; }
  </style>
</head>
<body>
  <div id="status" class="status status-{{ status.kind if status else 'info' }}"{% if not status %} hidden{% endif %}>
    <span class="status-text">{{ status.message if status else '' }}</span>
    <button type="button" id="dismiss">&times;</button>
  </div>
  <div class="layout">
    <aside class="panel">
      <div class="tabs">
      {% for tab in tabs %}
        <button type="button" data-tab="{{ tab.slug }}"{% if loop.first %} class="active"{% endif %}>{{ tab.slug | capitalize }}</button>
      {% endfor %}
      </div>

      {% for tab in tabs %}
      <section data-tab-panel="{{ tab.slug }}"{% if not loop.first %} hidden{% endif %}>
        <h2>{{ tab.title }}</h2>
        {% for c in tab.controls %}
        <label class="control">
          <span>{{ c.label }}{% if c.kind == 'slider' %}: <output data-for="{{ c.key }}">{{ c.value }}</output>px{% endif %}</span>
          {% if c.kind == 'text' %}
          <input type="text" data-field="{{ c.key }}" value="{{ c.value }}" placeholder="{{ c.placeholder if c.placeholder else '' }}">
          {% elif c.kind == 'textarea' %}
          <textarea data-field="{{ c.key }}" rows="{{ c.rows }}">{{ c.value }}</textarea>
          {% elif c.kind == 'font' %}
          <select data-field="{{ c.key }}">
            {% for font in fonts %}<option value="{{ font }}"{% if font == c.value %} selected{% endif %}>{{ font }}</option>{% endfor %}
          </select>
          {% elif c.kind == 'slider' %}
          <input type="range" data-field="{{ c.key }}" min="{{ c.min }}" max="{{ c.max }}" value="{{ c.value }}">
          {% elif c.kind == 'color' %}
          <span class="color-pair">
            <input type="color" data-color-for="{{ c.key }}" value="{{ c.swatch }}">
            <input type="text" data-field="{{ c.key }}" value="{{ c.value }}">
          </span>
          {% elif c.kind == 'file' %}
          <input type="file" data-slot="{{ c.slot }}" accept="{{ c.accept }}">
          {% if c.value %}<small>{{ c.value }}</small>{% endif %}
          {% endif %}
          <small class="error" data-error="{{ c.key }}"></small>
        </label>
        {% endfor %}
      </section>
      {% endfor %}

      <div class="actions">
        <button type="button" id="save">Save</button>
        <a href="/export">Export HTML</a>
      </div>

      <h2>Templates</h2>
      <select id="category">
        {% for category in categories %}<option>{{ category }}</option>{% endfor %}
      </select>
      <div class="gallery">
      {% for p in presets %}
        <div class="preset" data-preset="{{ p.id }}" data-category="{{ p.category }}">
          <div class="swatch" style="background: {{ p.bg }}; border: 2px solid {{ p.text }}"></div>
          <strong>{{ p.name }}</strong>
          <p>{{ p.description }}</p>
        </div>
      {% endfor %}
      </div>
    </aside>

    <main class="stage">
      <div class="viewports">
        <button type="button" data-viewport="desktop">Desktop</button>
        <button type="button" data-viewport="mobile">Mobile</button>
      </div>
      <iframe data-preview src="/preview?viewport=desktop&rev={{ revision }}" title="Preview"></iframe>
    </main>
  </div>

  <script src="/__live.js"></script>
  <script>
  (function() {
    'use strict';

    async function send(method, url, body) {
      const response = await fetch(url, {
        method: method,
        headers: body instanceof FormData ? {} : { 'content-type': 'application/json' },
        body: body instanceof FormData ? body : JSON.stringify(body || {}),
      });
      const data = await response.json();
      if (!response.ok) throw data;
      return data;
    }

    document.querySelectorAll('[data-tab]').forEach(function(button) {
      button.addEventListener('click', function() {
        document.querySelectorAll('[data-tab]').forEach(function(b) { b.classList.toggle('active', b === button); });
        document.querySelectorAll('[data-tab-panel]').forEach(function(p) { p.hidden = p.dataset.tabPanel !== button.dataset.tab; });
      });
    });

    document.querySelectorAll('[data-field]').forEach(function(input) {
      const event = input.tagName === 'SELECT' || input.type === 'range' ? 'change' : 'input';
      input.addEventListener(event, async function() {
        const error = document.querySelector('[data-error="' + input.dataset.field + '"]');
        const output = document.querySelector('output[data-for="' + input.dataset.field + '"]');
        if (output) output.textContent = input.value;
        try {
          await send('POST', '/api/edit', { field: input.dataset.field, value: input.value });
          if (error) error.textContent = '';
        } catch (e) {
          if (error) error.textContent = e.error || 'Invalid value';
        }
      });
    });

    document.querySelectorAll('[data-color-for]').forEach(function(picker) {
      const text = document.querySelector('input[data-field="' + picker.dataset.colorFor + '"]');
      picker.addEventListener('input', function() {
        text.value = picker.value;
        text.dispatchEvent(new Event('input'));
      });
      text.addEventListener('input', function() {
        const hex = text.value.trim();
        if (/^#[0-9a-fA-F]{6}$/.test(hex)) picker.value = hex.toLowerCase();
        else if (/^#[0-9a-fA-F]{3}$/.test(hex)) picker.value = '#' + hex.slice(1).split('').map(function(c) { return c + c; }).join('').toLowerCase();
      });
    });

    document.querySelectorAll('[data-slot]').forEach(function(input) {
      input.addEventListener('change', async function() {
        if (!input.files.length) return;
        const form = new FormData();
        form.append('file', input.files[0]);
        try { await send('POST', '/api/upload/' + input.dataset.slot, form); } catch (e) {}
      });
    });

    document.querySelectorAll('[data-preset]').forEach(function(card) {
      card.addEventListener('click', async function() {
        try {
          await send('POST', '/api/presets/' + card.dataset.preset);
          location.reload();
        } catch (e) {}
      });
    });

    document.getElementById('category').addEventListener('change', function(e) {
      const category = e.target.value;
      document.querySelectorAll('[data-preset]').forEach(function(card) {
        card.hidden = category !== 'All' && card.dataset.category !== category;
      });
    });

    document.querySelectorAll('[data-viewport]').forEach(function(button) {
      button.addEventListener('click', function() {
        const frame = document.querySelector('iframe[data-preview]');
        const url = new URL(frame.src, location.href);
        url.searchParams.set('viewport', button.dataset.viewport);
        frame.src = url.toString();
      });
    });

    document.getElementById('save').addEventListener('click', async function() {
      try { await send('POST', '/api/save'); } catch (e) {}
    });

    document.getElementById('dismiss').addEventListener('click', function() {
      send('POST', '/api/status/dismiss').catch(function() {});
    });
  })();
  </script>
</body>
</html>"##;

#[cfg(test)]
mod tests {
    use super::*;
    use livery_model::{CustomizationState, StatusMessage};

    #[test]
    fn renders_every_control_with_its_value() {
        let editor = EditorSession::with_state(CustomizationState {
            header_text: "Acme & Co".into(),
            ..Default::default()
        });
        let html = render_editor_page(&editor).unwrap();

        for field in Field::ALL {
            let marker = match field {
                Field::Image => "data-slot=\"background\"".to_string(),
                Field::LogoUrl => "data-slot=\"logo\"".to_string(),
                f => format!("data-field=\"{}\"", f.key()),
            };
            assert!(html.contains(&marker), "missing control for {}", field);
        }
        assert!(html.contains("value=\"Acme &amp; Co\""));
        assert!(html.contains("min=\"12\" max=\"24\""));
    }

    #[test]
    fn colors_pair_picker_with_hex_entry() {
        let editor = EditorSession::with_state(CustomizationState {
            bg_color: "#1E293B".into(),
            text_color: "rgb(1, 2, 3)".into(),
            ..Default::default()
        });
        let html = render_editor_page(&editor).unwrap();

        assert!(html.contains(
            "<input type=\"color\" data-color-for=\"bgColor\" value=\"#1e293b\">"
        ));
        assert!(html.contains("<input type=\"text\" data-field=\"bgColor\" value=\"#1E293B\">"));
        assert!(html.contains(
            "<input type=\"color\" data-color-for=\"textColor\" value=\"#000000\">"
        ));
    }

    #[test]
    fn lists_presets_and_categories() {
        let html = render_editor_page(&EditorSession::new()).unwrap();

        assert!(html.contains("data-preset=\"tech-dark\""));
        assert!(html.contains("<option>All</option>"));
        assert!(html.contains("<option>Technology</option>"));
    }

    #[test]
    fn shows_status_banner() {
        let mut editor = EditorSession::new();
        assert!(render_editor_page(&editor)
            .unwrap()
            .contains("status status-info\" hidden>"));

        editor.set_status(StatusMessage::success("Template saved successfully!"));
        let html = render_editor_page(&editor).unwrap();

        assert!(html.contains("status status-success\">"));
        assert!(html.contains("Template saved successfully!"));
    }
}
