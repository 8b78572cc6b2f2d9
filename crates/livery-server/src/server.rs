//! Live preview editor server.

use std::net::SocketAddr;
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        DefaultBodyLimit, Multipart, Path, Query, State,
    },
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::RwLock;

use livery_client::{
    fallback_tenant, settle_save, settle_upload, template_name, ClientError, MediaFile,
    MediaStore, TemplateApi,
};
use livery_model::{
    categories, filter_by_category, read_state_file, write_state_file, CustomizationState,
    EditError, EditorError, EditorSession, EditorSurface, Field, FormSurface, MediaSlot,
    ModelError, StatusMessage, SurfaceDocument, SurfaceError, TemplateRecord,
};
use livery_render::{export_filename, render, ExportConfig, ExportError, HtmlExporter, Viewport};

use crate::live::{live_client_script, LiveHub, LiveMessage};
use crate::page::render_editor_page;
use crate::watcher::StateWatcher;

/// Largest accepted upload body.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Configuration for the editor server.
#[derive(Debug, Clone)]
pub struct EditorServerConfig {
    /// File the customization is persisted to
    pub state_file: PathBuf,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,

    /// Minify exported stylesheets
    pub minify: bool,

    /// Tenant for saves not backed by a stored template
    pub tenant: Option<i64>,

    /// Author email used to name saved templates
    pub email: Option<String>,
}

impl Default for EditorServerConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from("livery.json"),
            port: 7878,
            host: "127.0.0.1".to_string(),
            open: true,
            minify: false,
            tenant: None,
            email: None,
        }
    }
}

/// Errors that can occur with the server or one of its requests.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind to {0}: {1}")]
    BindError(String, String),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Persist(#[from] ModelError),

    #[error("Failed to render page: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Edit(_) | Self::Surface(_) => StatusCode::BAD_REQUEST,
            Self::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Editor(EditorError::Gallery(_)) => StatusCode::NOT_FOUND,
            Self::Editor(EditorError::Edit(_)) => StatusCode::BAD_REQUEST,
            Self::Editor(_) | Self::Client(ClientError::Editor(_)) => StatusCode::CONFLICT,
            Self::Client(ClientError::Unauthorized) => StatusCode::UNAUTHORIZED,
            Self::Client(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!("{}", self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Shared server state.
struct ServerState {
    config: EditorServerConfig,
    editor: EditorSession,
    live: LiveHub,
    exporter: HtmlExporter,
    api: Option<TemplateApi>,
    store: Option<Arc<dyn MediaStore>>,
}

type Shared = Arc<RwLock<ServerState>>;

impl ServerState {
    /// Announce and persist the snapshot if it changed since `before`.
    ///
    /// The preview always follows the in-memory state. A failed write
    /// replaces the status banner so the editor shows that the file on
    /// disk is behind.
    fn commit(&mut self, before: u64) -> Result<(), ServerError> {
        let revision = self.editor.revision();
        if revision == before {
            return Ok(());
        }
        self.live.send(LiveMessage::Preview { revision });
        if let Err(e) = write_state_file(&self.config.state_file, self.editor.state()) {
            self.editor.set_status(StatusMessage::error(format!(
                "Could not write {}: {}",
                self.config.state_file.display(),
                e
            )));
            self.announce_status();
            return Err(e.into());
        }
        Ok(())
    }

    fn announce_status(&self) {
        match self.editor.status() {
            Some(status) => self.live.send(LiveMessage::from(status)),
            None => self.live.send(LiveMessage::StatusCleared),
        }
    }
}

/// The editor as seen by API clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSnapshot {
    pub state: CustomizationState,
    pub revision: u64,
    pub status: Option<StatusMessage>,
    pub is_saving: bool,
    pub uploading: Option<MediaSlot>,
    /// Name of the stored template the session was seeded from
    pub base_template: Option<String>,
}

impl EditorSnapshot {
    fn of(editor: &EditorSession) -> Self {
        Self {
            state: editor.state().clone(),
            revision: editor.revision(),
            status: editor.status().cloned(),
            is_saving: editor.is_saving(),
            uploading: editor.uploading(),
            base_template: editor.base().map(|b| b.template_name.clone()),
        }
    }
}

/// Live preview editor server.
pub struct EditorServer {
    config: EditorServerConfig,
    editor: EditorSession,
    api: Option<TemplateApi>,
    store: Option<Arc<dyn MediaStore>>,
}

impl EditorServer {
    /// Create a server editing `editor`.
    pub fn new(config: EditorServerConfig, editor: EditorSession) -> Self {
        Self {
            config,
            editor,
            api: None,
            store: None,
        }
    }

    /// Enable saving through the template API.
    pub fn with_api(mut self, api: TemplateApi) -> Self {
        self.api = Some(api);
        self
    }

    /// Enable media uploads.
    pub fn with_store(mut self, store: Arc<dyn MediaStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Bind the configured address and serve until shut down.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::BindError(addr.clone(), e.to_string()))?;

        let url = format!("http://{}", addr);
        tracing::info!("Editor running at {}", url);
        if self.config.open {
            let _ = open::that(&url);
        }

        self.serve(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        let addr: Option<SocketAddr> = listener.local_addr().ok();

        let state = Arc::new(RwLock::new(ServerState {
            exporter: HtmlExporter::new(ExportConfig {
                minify: self.config.minify,
            }),
            config: self.config.clone(),
            editor: self.editor,
            live: LiveHub::new(),
            api: self.api,
            store: self.store,
        }));

        // Persist the starting snapshot so the watched file exists
        {
            let state = state.read().await;
            write_state_file(&state.config.state_file, state.editor.state())?;
        }

        let (watcher, mut rx) = StateWatcher::new(&self.config.state_file)
            .map_err(|e| ServerError::WatchError(e.to_string()))?;

        let state_clone = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(path) = rx.recv().await {
                handle_state_file_change(&state_clone, &path).await;
            }
            drop(watcher);
        });

        let app = router(state);

        if let Some(addr) = addr {
            tracing::debug!("Listening on {}", addr);
        }
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(format!("{:?}", addr), e.to_string()))
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/preview", get(preview_handler))
        .route("/export", get(export_handler))
        .route("/api/state", get(state_handler))
        .route("/api/edit", post(edit_handler))
        .route("/api/presets", get(presets_handler))
        .route("/api/presets/{id}", post(apply_preset_handler))
        .route("/api/save", post(save_handler))
        .route("/api/upload/{slot}", post(upload_handler))
        .route("/api/status/dismiss", post(dismiss_handler))
        .route("/api/document", get(get_document_handler).put(put_document_handler))
        .route("/__live", get(ws_handler))
        .route("/__live.js", get(live_script_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Reload the snapshot after the state file changed on disk.
async fn handle_state_file_change(state: &Shared, path: &FsPath) {
    // Let the writer finish
    tokio::time::sleep(Duration::from_millis(50)).await;

    let next = match read_state_file(path) {
        Ok(next) => next,
        Err(e) => {
            tracing::warn!("Ignoring unreadable state file: {}", e);
            return;
        }
    };

    let mut state = state.write().await;
    let before = state.editor.revision();
    state.editor.reset_state(next);
    if state.editor.revision() != before {
        tracing::info!("State file changed: {}", path.display());
        state.live.send(LiveMessage::Reload);
    }
}

async fn index_handler(State(state): State<Shared>) -> Result<Html<String>, ServerError> {
    let state = state.read().await;
    Ok(Html(render_editor_page(&state.editor)?))
}

#[derive(Debug, Deserialize)]
struct PreviewQuery {
    viewport: Option<String>,
}

async fn preview_handler(
    State(state): State<Shared>,
    Query(query): Query<PreviewQuery>,
) -> Result<Html<String>, ServerError> {
    let viewport = match query.viewport {
        Some(v) => v.parse::<Viewport>().map_err(ServerError::BadRequest)?,
        None => Viewport::Desktop,
    };

    let state = state.read().await;
    Ok(Html(render(state.editor.state(), viewport).to_document("")))
}

async fn export_handler(State(state): State<Shared>) -> Result<Response, ServerError> {
    let state = state.read().await;
    let html = state.exporter.export(state.editor.state())?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_filename(state.editor.state())
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        html,
    )
        .into_response())
}

async fn state_handler(State(state): State<Shared>) -> Json<EditorSnapshot> {
    let state = state.read().await;
    Json(EditorSnapshot::of(&state.editor))
}

#[derive(Debug, Deserialize)]
struct EditRequest {
    field: String,
    value: String,
}

async fn edit_handler(
    State(state): State<Shared>,
    Json(request): Json<EditRequest>,
) -> Result<Json<EditorSnapshot>, ServerError> {
    let field: Field = request.field.parse()?;

    let mut state = state.write().await;
    let before = state.editor.revision();
    state.editor.set(field, &request.value)?;
    state.commit(before)?;

    Ok(Json(EditorSnapshot::of(&state.editor)))
}

#[derive(Debug, Deserialize)]
struct PresetQuery {
    category: Option<String>,
}

#[derive(Debug, Serialize)]
struct PresetSummary {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: &'static str,
}

#[derive(Debug, Serialize)]
struct PresetList {
    categories: Vec<&'static str>,
    presets: Vec<PresetSummary>,
}

async fn presets_handler(Query(query): Query<PresetQuery>) -> Json<PresetList> {
    let category = query.category.as_deref().unwrap_or(livery_model::gallery::ALL_CATEGORIES);
    let presets = filter_by_category(category)
        .into_iter()
        .map(|p| PresetSummary {
            id: p.id,
            name: p.name,
            description: p.description,
            category: p.category,
        })
        .collect();

    Json(PresetList {
        categories: categories(),
        presets,
    })
}

async fn apply_preset_handler(
    State(state): State<Shared>,
    Path(id): Path<String>,
) -> Result<Json<EditorSnapshot>, ServerError> {
    let mut state = state.write().await;
    let before = state.editor.revision();
    state.editor.apply_preset(&id)?;
    state.commit(before)?;
    state.announce_status();

    Ok(Json(EditorSnapshot::of(&state.editor)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SaveRequest {
    name: Option<String>,
}

async fn save_handler(
    State(shared): State<Shared>,
    Json(request): Json<SaveRequest>,
) -> Result<Json<TemplateRecord>, ServerError> {
    let (api, configured, has_base, email) = {
        let state = shared.read().await;
        let api = state
            .api
            .clone()
            .ok_or(ServerError::NotConfigured("Template API"))?;
        (
            api,
            state.config.tenant,
            state.editor.base().is_some(),
            state.config.email.clone(),
        )
    };

    let tenant = if has_base {
        configured
    } else {
        match fallback_tenant(&api, configured).await {
            Ok(tenant) => tenant,
            Err(e) if e.is_unauthorized() => {
                let mut state = shared.write().await;
                state.editor.expire_session();
                state.announce_status();
                return Err(e.into());
            }
            Err(e) => {
                tracing::warn!("Could not look up tenants: {}", e);
                None
            }
        }
    };

    let name = request.name.filter(|n| !n.trim().is_empty()).unwrap_or_else(|| {
        let user_email = api.session().user().map(|u| u.email);
        template_name(user_email.as_deref().or(email.as_deref()))
    });

    let record = {
        let mut state = shared.write().await;
        let result = state.editor.begin_save(&name, tenant);
        state.announce_status();
        result?
    };

    // Runs detached so a dropped request still clears the saving flag
    let outcome = tokio::spawn(async move {
        let result = api.create_template(&record).await;

        let mut state = shared.write().await;
        let outcome = settle_save(&mut state.editor, result);
        state.announce_status();
        outcome
    })
    .await?;
    Ok(Json(outcome?))
}

async fn upload_handler(
    State(shared): State<Shared>,
    Path(slot): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<EditorSnapshot>, ServerError> {
    let slot: MediaSlot = slot.parse().map_err(ServerError::BadRequest)?;
    let store = shared
        .read()
        .await
        .store
        .clone()
        .ok_or(ServerError::NotConfigured("Media storage"))?;

    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServerError::BadRequest(e.to_string()))?;
        file = Some(
            MediaFile::new(name, bytes.to_vec())
                .map_err(|e| ServerError::BadRequest(e.to_string()))?,
        );
        break;
    }
    let file = file.ok_or_else(|| ServerError::BadRequest("Missing 'file' field".to_string()))?;

    shared.write().await.editor.begin_upload(slot)?;

    // Runs detached so a dropped request still clears the uploading flag
    let snapshot = tokio::spawn(async move {
        let result = store.upload(&file).await;

        let mut state = shared.write().await;
        let before = state.editor.revision();
        let outcome = settle_upload(&mut state.editor, slot, result);
        let persisted = state.commit(before);
        state.announce_status();
        outcome?;
        persisted?;
        Ok::<_, ServerError>(EditorSnapshot::of(&state.editor))
    })
    .await??;

    Ok(Json(snapshot))
}

async fn dismiss_handler(State(state): State<Shared>) -> Json<EditorSnapshot> {
    let mut state = state.write().await;
    state.editor.dismiss_status();
    state.announce_status();
    Json(EditorSnapshot::of(&state.editor))
}

async fn get_document_handler(State(state): State<Shared>) -> Json<SurfaceDocument> {
    let state = state.read().await;
    Json(FormSurface::new(state.editor.state().clone()).serialize())
}

async fn put_document_handler(
    State(state): State<Shared>,
    Json(document): Json<SurfaceDocument>,
) -> Result<Json<EditorSnapshot>, ServerError> {
    let mut surface = FormSurface::default();
    surface.load(document)?;

    let mut state = state.write().await;
    let before = state.editor.revision();
    state.editor.reset_state(surface.into_state());
    state.commit(before)?;

    Ok(Json(EditorSnapshot::of(&state.editor)))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Shared>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn handle_ws(mut socket: WebSocket, state: Shared) {
    let mut rx = {
        let state = state.read().await;
        state.live.subscribe()
    };

    let Ok(hello) = serde_json::to_string(&LiveMessage::Connected) else {
        return;
    };
    if socket.send(Message::Text(hello.into())).await.is_err() {
        return;
    }

    while let Ok(msg) = rx.recv().await {
        let Ok(json) = serde_json::to_string(&msg) else {
            continue;
        };
        if socket.send(Message::Text(json.into())).await.is_err() {
            break;
        }
    }
}

async fn live_script_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        live_client_script("/__live"),
    )
}
