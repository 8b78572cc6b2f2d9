//! Editing the state file from the command line.

use anyhow::Result;
use livery_model::{read_state_file, write_state_file, EditorSession, Field};
use livery_render::{render, Viewport};

use crate::config::ConfigFile;

/// Set one field, validating it like the editor panel does.
pub fn set(config: &ConfigFile, field: &str, value: &str) -> Result<()> {
    let path = &config.project.state_file;
    let field: Field = field.parse()?;
    let mut editor = EditorSession::with_state(read_state_file(path)?);

    editor.set(field, value)?;
    write_state_file(path, editor.state())?;

    tracing::info!("{} = {}", field.key(), field.get(editor.state()));
    Ok(())
}

/// Print the state as JSON, or the preview markup for a viewport.
pub fn show(config: &ConfigFile, viewport: Option<Viewport>) -> Result<()> {
    let state = read_state_file(&config.project.state_file)?;

    match viewport {
        Some(viewport) => println!("{}", render(&state, viewport).to_html()),
        None => println!("{}", serde_json::to_string_pretty(&state)?),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn set_validates_and_persists() {
        let temp = tempdir().unwrap();
        let mut config = ConfigFile::default();
        config.project.state_file = temp.path().join("livery.json");

        set(&config, "mainHeading", "Hello World").unwrap();
        set(&config, "fontSize", "18").unwrap();
        assert!(set(&config, "textColor", "not a color").is_err());
        assert!(set(&config, "sparkles", "yes").is_err());

        let saved = read_state_file(&config.project.state_file).unwrap();
        assert_eq!(saved.main_heading, "Hello World");
        assert_eq!(saved.font_size, 18);
        assert_eq!(saved.text_color, "#000000");
    }
}
