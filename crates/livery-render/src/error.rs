/// Errors that can occur while exporting a page.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to minify stylesheet: {0}")]
    MinifyError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

impl From<minijinja::Error> for ExportError {
    fn from(e: minijinja::Error) -> Self {
        Self::TemplateError(e.to_string())
    }
}
