//! Initialize livery in a project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use livery_model::{write_state_file, CustomizationState};

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing livery...");

    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
        return Ok(());
    }

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create project directory")?;
    }
    fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    tracing::info!("Created {}", config_path.display());

    // The state file sits next to the config
    let state_path = config_path.with_file_name("livery.json");
    if !state_path.exists() || yes {
        write_state_file(&state_path, &CustomizationState::default())?;
        tracing::info!("Created {}", state_path.display());
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'livery edit' to start the editor.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# livery configuration

[project]
# Customization snapshot edited by every command
state_file = "livery.json"

# Output directory for exported pages
output = "dist"

[api]
# Template API (token may also come from LIVERY_TOKEN)
base_url = "http://127.0.0.1:8000/api/"
# token = ""
# tenant = 1
# email = "you@example.com"

[storage]
# Media storage for uploaded images (key may also come from LIVERY_STORAGE_KEY)
# url = "https://your-project.supabase.co"
bucket = "template-building"
# key = ""

[export]
minify = false

[server]
host = "127.0.0.1"
port = 7878
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFile;
    use livery_model::read_state_file;
    use tempfile::tempdir;

    #[tokio::test]
    async fn creates_config_and_state() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("livery.toml");

        run(&config_path, false).await.unwrap();

        let config = ConfigFile::parse(&fs::read_to_string(&config_path).unwrap()).unwrap();
        assert_eq!(config.storage.bucket, "template-building");
        assert_eq!(
            read_state_file(&temp.path().join("livery.json")).unwrap(),
            CustomizationState::default()
        );
    }

    #[tokio::test]
    async fn keeps_existing_config_without_yes() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("livery.toml");
        fs::write(&config_path, "[export]\nminify = true\n").unwrap();

        run(&config_path, false).await.unwrap();

        assert_eq!(
            fs::read_to_string(&config_path).unwrap(),
            "[export]\nminify = true\n"
        );
        assert!(!temp.path().join("livery.json").exists());
    }
}
