//! Static export commands.

use std::path::PathBuf;

use anyhow::Result;
use livery_model::read_state_file;
use livery_render::{export_gallery, write_export, ExportConfig, HtmlExporter};

use crate::config::ConfigFile;

/// Export the state file as one HTML page.
pub fn run(config: &ConfigFile, output: Option<PathBuf>, minify: bool) -> Result<PathBuf> {
    let state = read_state_file(&config.project.state_file)?;
    let output = output.unwrap_or_else(|| config.project.output.clone());

    let exporter = HtmlExporter::new(ExportConfig {
        minify: minify || config.export.minify,
    });
    let path = write_export(&state, &output, &exporter)?;

    tracing::info!("Output: {}", path.display());
    Ok(path)
}

/// Export every preset over the current state.
pub fn gallery(config: &ConfigFile, output: Option<PathBuf>) -> Result<()> {
    let state = read_state_file(&config.project.state_file)?;
    let output = output.unwrap_or_else(|| config.project.output.join("gallery"));

    let exporter = HtmlExporter::new(ExportConfig {
        minify: config.export.minify,
    });
    let result = export_gallery(&state, &output, &exporter)?;

    tracing::info!(
        "Built {} pages in {}ms",
        result.pages,
        result.duration_ms
    );
    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
