//! Preview server for exported pages.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::Router;
use tower_http::services::ServeDir;

/// Run the serve command.
pub async fn run(port: u16, dir: PathBuf) -> Result<()> {
    let page = landing_page(&dir)?;

    let addr: SocketAddr = format!("127.0.0.1:{}", port)
        .parse()
        .context("Invalid address")?;
    let url = format!("http://{}/{}", addr, page);

    tracing::info!("Serving {} at {}", dir.display(), url);

    let app = Router::new().fallback_service(ServeDir::new(&dir));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let _ = open::that(&url);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Page to open: the gallery index if there is one, else the first export.
fn landing_page(dir: &Path) -> Result<String> {
    if !dir.is_dir() {
        anyhow::bail!(
            "Directory not found: {}. Run 'livery export' first.",
            dir.display()
        );
    }
    if dir.join("index.html").exists() {
        return Ok(String::new());
    }

    let mut pages: Vec<String> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".html"))
        .collect();
    pages.sort();

    pages
        .into_iter()
        .next()
        .with_context(|| format!("No exported pages in {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn prefers_gallery_index() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a-template.html"), "").unwrap();
        fs::write(temp.path().join("index.html"), "").unwrap();

        assert_eq!(landing_page(temp.path()).unwrap(), "");
    }

    #[test]
    fn falls_back_to_first_export() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("b-template.html"), "").unwrap();
        fs::write(temp.path().join("Acme-template.html"), "").unwrap();
        fs::write(temp.path().join("notes.txt"), "").unwrap();

        assert_eq!(landing_page(temp.path()).unwrap(), "Acme-template.html");
    }

    #[test]
    fn missing_or_empty_directory_is_an_error() {
        let temp = tempdir().unwrap();

        assert!(landing_page(&temp.path().join("dist")).is_err());
        assert!(landing_page(temp.path()).is_err());
    }
}
