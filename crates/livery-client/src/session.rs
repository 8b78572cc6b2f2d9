//! Explicit authentication session.
//!
//! A [`Session`] is created once and handed to whatever needs to talk to the API. Clones share
//! the same token, so clearing it after a rejected request signs out every holder.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::TemplateApi;
use crate::error::ClientError;

/// The signed-in user, as reported by the token check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub full_name: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    user: Option<User>,
}

/// Token holder with a read/refresh/clear lifecycle.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<RwLock<SessionState>>,
}

impl Session {
    /// A session for an existing API token.
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        let token = (!token.trim().is_empty()).then(|| token.trim().to_string());
        Self {
            inner: Arc::new(RwLock::new(SessionState { token, user: None })),
        }
    }

    /// A session without credentials.
    pub fn anonymous() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    /// Value of the `Authorization` header, e.g. "Token abc123".
    pub fn authorization(&self) -> Option<String> {
        self.read().token.as_ref().map(|t| format!("Token {}", t))
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().token.is_some()
    }

    /// User loaded by the last successful [`refresh`](Self::refresh).
    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    /// Re-check the token and store the user it belongs to.
    ///
    /// A rejected token clears the session.
    pub async fn refresh(&self, api: &TemplateApi) -> Result<User, ClientError> {
        if !self.is_authenticated() {
            return Err(ClientError::Unauthorized);
        }

        let user = api.verify_token().await?;
        tracing::debug!("Signed in as {}", user.email);
        self.write().user = Some(user.clone());
        Ok(user)
    }

    /// Drop the token and user.
    pub fn clear(&self) {
        let mut state = self.write();
        if state.token.is_some() {
            tracing::info!("Session cleared");
        }
        state.token = None;
        state.user = None;
    }
}
