//! Template API client.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use livery_model::TemplateRecord;

use crate::error::ClientError;
use crate::session::{Session, User};

/// API root used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/";

/// Longest error body kept in a [`ClientError::Status`].
const MAX_ERROR_BODY: usize = 200;

/// A tenant (organization) owned by the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: i64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    user: User,
}

/// Client for the template REST API.
///
/// Every request carries the session's token. A 401 or 403 clears the session and fails
/// with [`ClientError::Unauthorized`]. Failed requests are never retried.
#[derive(Debug, Clone)]
pub struct TemplateApi {
    client: Client,
    base_url: String,
    session: Session,
}

impl TemplateApi {
    /// Create a client for an API root such as "http://127.0.0.1:8000/api/".
    pub fn new(base_url: impl Into<String>, session: Session) -> Result<Self, ClientError> {
        let client = Client::builder()
            .user_agent(concat!("livery/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let request = match self.session.authorization() {
            Some(auth) => request.header(reqwest::header::AUTHORIZATION, auth),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                ClientError::Connection(format!("Cannot connect to {}", self.base_url))
            } else {
                ClientError::Http(e)
            }
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::warn!("API rejected the token ({}), signing out", status.as_u16());
            self.session.clear();
            return Err(ClientError::Unauthorized);
        }
        if !status.is_success() {
            let mut message = response.text().await.unwrap_or_default();
            if message.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| message.is_char_boundary(*i))
                    .unwrap_or(0);
                message.truncate(cut);
            }
            tracing::warn!("API request failed with {}: {}", status.as_u16(), message);
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }

    /// All templates visible to the user.
    pub async fn list_templates(&self) -> Result<Vec<TemplateRecord>, ClientError> {
        self.send(self.client.get(self.url("templates/"))).await
    }

    /// Templates created by the user.
    pub async fn list_own_templates(&self) -> Result<Vec<TemplateRecord>, ClientError> {
        self.send(self.client.get(self.url("templates/my_templates/")))
            .await
    }

    /// Store a new template and return it as saved.
    pub async fn create_template(
        &self,
        record: &TemplateRecord,
    ) -> Result<TemplateRecord, ClientError> {
        tracing::debug!(
            "Creating template '{}' for tenant {}",
            record.template_name,
            record.tenant
        );
        self.send(self.client.post(self.url("templates/")).json(record))
            .await
    }

    /// Tenants owned by the user.
    pub async fn list_tenants(&self) -> Result<Vec<Tenant>, ClientError> {
        self.send(self.client.get(self.url("tenants/"))).await
    }

    /// Check the session's token and return its user.
    pub async fn verify_token(&self) -> Result<User, ClientError> {
        let response: VerifyResponse = self
            .send(self.client.get(self.url("auth/verify-token/")))
            .await?;
        Ok(response.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub;
    use livery_model::{CustomizationState, TemplateSettings};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn lists_templates_with_token() {
        let server = stub::spawn_api().await;
        let api = TemplateApi::new(&server.base_url, Session::new(stub::TOKEN)).unwrap();

        let templates = api.list_templates().await.unwrap();

        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].settings.content.header_text, "Stored Co");
        assert_eq!(templates[0].extra["tenant_name"], "Acme");
    }

    #[tokio::test]
    async fn rejected_token_clears_session() {
        let server = stub::spawn_api().await;
        let session = Session::new("expired");
        let api = TemplateApi::new(&server.base_url, session.clone()).unwrap();

        let result = api.list_own_templates().await;

        assert!(matches!(result, Err(ClientError::Unauthorized)));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn creates_template() {
        let server = stub::spawn_api().await;
        let api = TemplateApi::new(&server.base_url, Session::new(stub::TOKEN)).unwrap();
        let state = CustomizationState {
            header_text: "New Co".into(),
            ..Default::default()
        };
        let record =
            TemplateRecord::draft(7, "Mine", TemplateSettings::from_state(None, &state));

        let saved = api.create_template(&record).await.unwrap();

        assert_eq!(saved.id, Some(2));
        assert_eq!(saved.template_name, "Mine");
        assert_eq!(server.created().len(), 1);
        assert_eq!(server.created()[0]["settings"]["content"]["headerText"], "New Co");
    }

    #[tokio::test]
    async fn server_errors_keep_the_session() {
        let server = stub::spawn_api().await;
        let session = Session::new(stub::TOKEN);
        let api = TemplateApi::new(&server.base_url, session.clone()).unwrap();
        let record = TemplateRecord::draft(-1, "Broken", TemplateSettings::default());

        let result = api.create_template(&record).await;

        assert!(matches!(result, Err(ClientError::Status { status: 400, .. })));
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn refresh_stores_user() {
        let server = stub::spawn_api().await;
        let session = Session::new(stub::TOKEN);
        let api = TemplateApi::new(&server.base_url, session.clone()).unwrap();

        let user = session.refresh(&api).await.unwrap();

        assert_eq!(user.email, "owner@example.com");
        assert_eq!(session.user().map(|u| u.id), Some(1));
    }

    #[tokio::test]
    async fn connection_errors_are_reported() {
        let api = TemplateApi::new("http://127.0.0.1:9/api", Session::new(stub::TOKEN)).unwrap();

        let result = api.list_tenants().await;

        assert!(matches!(
            result,
            Err(ClientError::Connection(_)) | Err(ClientError::Http(_))
        ));
    }
}
