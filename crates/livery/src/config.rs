//! Project configuration (livery.toml).

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use livery_client::{Session, SupabaseStorage, TemplateApi, DEFAULT_BASE_URL, DEFAULT_BUCKET};

/// Overrides `[api] token`.
pub const TOKEN_ENV: &str = "LIVERY_TOKEN";

/// Overrides `[storage] key`.
pub const STORAGE_KEY_ENV: &str = "LIVERY_STORAGE_KEY";

/// Configuration file structure (livery.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub export: ExportSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            output: default_output(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub token: Option<String>,
    /// Tenant for templates not loaded from the server
    pub tenant: Option<i64>,
    /// Author email used in template names when the token has no user
    pub email: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            tenant: None,
            email: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    pub url: Option<String>,
    #[serde(default = "default_bucket")]
    pub bucket: String,
    pub key: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: None,
            bucket: default_bucket(),
            key: None,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct ExportSettings {
    #[serde(default)]
    pub minify: bool,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_state_file() -> PathBuf {
    PathBuf::from("livery.json")
}
fn default_output() -> PathBuf {
    PathBuf::from("dist")
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_bucket() -> String {
    DEFAULT_BUCKET.to_string()
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    7878
}

impl ConfigFile {
    /// Load configuration from `path` if it exists.
    /// Returns an error if the config file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let config = Self::parse(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            tracing::debug!("Loaded config from {}", path.display());
            config
        } else {
            Self::default()
        };

        config.apply_env(|name| env::var(name).ok());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Let secrets come from the environment instead of the file.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(token) = var(TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
            self.api.token = Some(token);
        }
        if let Some(key) = var(STORAGE_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.storage.key = Some(key);
        }
    }

    /// Template API client for the configured token.
    pub fn template_api(&self) -> Result<TemplateApi> {
        let session = match &self.api.token {
            Some(token) => Session::new(token.clone()),
            None => Session::anonymous(),
        };
        Ok(TemplateApi::new(self.api.base_url.clone(), session)?)
    }

    /// Media store, if both a project URL and key are configured.
    pub fn media_store(&self) -> Result<Option<SupabaseStorage>> {
        match (&self.storage.url, &self.storage.key) {
            (Some(url), Some(key)) => Ok(Some(SupabaseStorage::new(
                url.clone(),
                self.storage.bucket.clone(),
                key.clone(),
            )?)),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = ConfigFile::parse("").unwrap();

        assert_eq!(config.project.state_file, PathBuf::from("livery.json"));
        assert_eq!(config.project.output, PathBuf::from("dist"));
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.storage.bucket, DEFAULT_BUCKET);
        assert_eq!(config.server.port, 7878);
        assert!(!config.export.minify);
    }

    #[test]
    fn parses_sections() {
        let config = ConfigFile::parse(
            r#"
[project]
state_file = "site/state.json"

[api]
base_url = "https://templates.example/api/"
tenant = 4

[storage]
url = "https://xyz.supabase.co"
key = "anon"

[export]
minify = true
"#,
        )
        .unwrap();

        assert_eq!(config.project.state_file, PathBuf::from("site/state.json"));
        assert_eq!(config.api.tenant, Some(4));
        assert!(config.export.minify);
        assert!(config.media_store().unwrap().is_some());
    }

    #[test]
    fn rejects_malformed_config() {
        assert!(ConfigFile::parse("[api]\ntenant = \"four\"").is_err());
    }

    #[test]
    fn environment_overrides_secrets() {
        let mut config = ConfigFile::parse("[api]\ntoken = \"from-file\"").unwrap();

        config.apply_env(|name| match name {
            TOKEN_ENV => Some("from-env".to_string()),
            STORAGE_KEY_ENV => Some(" ".to_string()),
            _ => None,
        });

        assert_eq!(config.api.token.as_deref(), Some("from-env"));
        assert_eq!(config.storage.key, None);
    }

    #[test]
    fn storage_needs_url_and_key() {
        let config = ConfigFile::parse("[storage]\nkey = \"anon\"").unwrap();

        assert!(config.media_store().unwrap().is_none());
    }
}
