//! Live preview editor command.

use std::sync::Arc;

use anyhow::Result;
use livery_client::load_editor;
use livery_model::{read_state_file, EditorSession};
use livery_server::{EditorServer, EditorServerConfig};

use crate::config::ConfigFile;

/// Run the editor server.
pub async fn run(config: &ConfigFile, port: Option<u16>, open: bool, pull: bool) -> Result<()> {
    let api = config.template_api()?;

    let mut email = config.api.email.clone();
    if api.session().is_authenticated() {
        match api.session().refresh(&api).await {
            Ok(user) => email = Some(user.email),
            Err(e) => tracing::warn!("Could not verify token: {}", e),
        }
    }

    let editor = if pull {
        let editor = load_editor(&api).await;
        if let Some(status) = editor.status() {
            tracing::warn!("{}", status.message);
        }
        editor
    } else {
        EditorSession::with_state(read_state_file(&config.project.state_file)?)
    };

    let server_config = EditorServerConfig {
        state_file: config.project.state_file.clone(),
        port: port.unwrap_or(config.server.port),
        host: config.server.host.clone(),
        open,
        minify: config.export.minify,
        tenant: config.api.tenant,
        email,
    };
    tracing::info!("Starting editor on port {}", server_config.port);

    let mut server = EditorServer::new(server_config, editor);
    if api.session().is_authenticated() {
        server = server.with_api(api);
    } else {
        tracing::info!("No API token configured, saving is disabled");
    }
    match config.media_store()? {
        Some(store) => server = server.with_store(Arc::new(store)),
        None => tracing::info!("No media storage configured, uploads are disabled"),
    }

    server.start().await?;

    Ok(())
}
