//! Contact backend client.
//!
//! The engine needs two calls from the contact backend: the full contact
//! list (to build the directory) and the conversation append. Both are
//! network calls that may fail independently.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use devsync_types::{
    ContactId, ConversationAppendRequest, ConversationMetadata, ConversationType, Direction,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// A contact record as served by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(rename = "_id")]
    pub id: ContactId,
    #[serde(default)]
    pub name: String,
    /// Primary phone number, in whatever format the user typed it.
    #[serde(default)]
    pub phone: String,
    #[serde(default, rename = "alternatePhones", skip_serializing_if = "Vec::is_empty")]
    pub alternate_phones: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl Contact {
    /// Every non-empty phone field on the record, primary first.
    pub fn phones(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.phone.as_str())
            .chain(self.alternate_phones.iter().map(String::as_str))
            .filter(|p| !p.trim().is_empty())
    }
}

/// The contact backend, as seen by the engine.
#[async_trait]
pub trait ContactService: Send + Sync {
    /// Fetches the full contact set.
    async fn get_contacts(&self) -> SyncResult<Vec<Contact>>;

    /// Appends one entry to a contact's conversation timeline.
    async fn add_conversation(&self, request: &ConversationAppendRequest) -> SyncResult<()>;
}

/// Connection settings for [`HttpContactService`].
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactServiceConfig {
    /// Base URL of the backend (e.g. `https://api.example.com`).
    pub api_base_url: String,
    /// Bearer token for the signed-in user.
    pub auth_token: Option<String>,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for ContactServiceConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            auth_token: None,
            timeout_secs: 30,
        }
    }
}

impl fmt::Debug for ContactServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContactServiceConfig")
            .field("api_base_url", &self.api_base_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ContactsResponse {
    success: bool,
    #[serde(default)]
    contacts: Vec<Contact>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AckResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct ConversationBody<'a> {
    #[serde(rename = "type")]
    kind: ConversationType,
    direction: Direction,
    content: &'a str,
    metadata: &'a ConversationMetadata,
}

/// Contact backend over its mobile REST API.
pub struct HttpContactService {
    config: ContactServiceConfig,
    client: Client,
}

impl HttpContactService {
    pub fn new(config: ContactServiceConfig) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SyncError::Network(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base_url.trim_end_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check_status(response: reqwest::Response) -> SyncResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(SyncError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ContactService for HttpContactService {
    async fn get_contacts(&self) -> SyncResult<Vec<Contact>> {
        let response = self
            .authorize(self.client.get(self.url("/api/mobile/contacts")))
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("contact list request failed: {e}")))?;
        let status = response.status().as_u16();
        let body: ContactsResponse = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| SyncError::Network(format!("invalid contact list response: {e}")))?;

        if !body.success {
            return Err(SyncError::Api {
                status,
                message: body
                    .message
                    .unwrap_or_else(|| "failed to fetch contacts".to_string()),
            });
        }
        debug!("Fetched {} contacts", body.contacts.len());
        Ok(body.contacts)
    }

    async fn add_conversation(&self, request: &ConversationAppendRequest) -> SyncResult<()> {
        let path = format!(
            "/api/mobile/contacts/{}/conversation",
            urlencoding::encode(request.contact_id.as_str())
        );
        let body = ConversationBody {
            kind: request.kind,
            direction: request.direction,
            content: &request.preview_content,
            metadata: &request.metadata,
        };
        let response = self
            .authorize(self.client.post(self.url(&path)))
            .json(&body)
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("conversation append failed: {e}")))?;
        let status = response.status().as_u16();
        let ack: AckResponse = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| SyncError::Network(format!("invalid conversation response: {e}")))?;

        if !ack.success {
            return Err(SyncError::Api {
                status,
                message: ack
                    .message
                    .unwrap_or_else(|| "conversation append rejected".to_string()),
            });
        }
        Ok(())
    }
}
