//! Gallery commands.

use anyhow::Result;
use livery_model::gallery::ALL_CATEGORIES;
use livery_model::{filter_by_category, read_state_file, write_state_file, EditorSession};

use crate::config::ConfigFile;

/// Print the presets in a category.
pub fn list(category: Option<&str>) {
    let category = category.unwrap_or(ALL_CATEGORIES);
    let presets = filter_by_category(category);

    if presets.is_empty() {
        tracing::warn!("No presets in category '{}'", category);
        return;
    }

    for preset in presets {
        println!(
            "{:<20} {:<22} [{}] {}",
            preset.id, preset.name, preset.category, preset.description
        );
    }
}

/// Merge a preset into the state file.
pub fn apply(config: &ConfigFile, id: &str) -> Result<()> {
    let path = &config.project.state_file;
    let mut editor = EditorSession::with_state(read_state_file(path)?);

    editor.apply_preset(id)?;
    write_state_file(path, editor.state())?;

    tracing::info!("Applied preset '{}' to {}", id, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use livery_model::CustomizationState;
    use tempfile::tempdir;

    fn config_in(dir: &std::path::Path) -> ConfigFile {
        let mut config = ConfigFile::default();
        config.project.state_file = dir.join("livery.json");
        config
    }

    #[test]
    fn apply_keeps_fields_outside_the_preset() {
        let temp = tempdir().unwrap();
        let config = config_in(temp.path());
        let state = CustomizationState {
            footer_bg: "#123456".into(),
            ..Default::default()
        };
        write_state_file(&config.project.state_file, &state).unwrap();

        apply(&config, "tech-dark").unwrap();

        let saved = read_state_file(&config.project.state_file).unwrap();
        assert_eq!(saved.bg_color, "#0f172a");
        assert_eq!(saved.footer_bg, "#123456");
    }

    #[test]
    fn unknown_preset_leaves_file_alone() {
        let temp = tempdir().unwrap();
        let config = config_in(temp.path());

        assert!(apply(&config, "nope").is_err());
        assert!(!config.project.state_file.exists());
    }
}
