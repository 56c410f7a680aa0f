//! IPFS-backed storage for message payloads.
//!
//! Message bodies never touch the chain; the contract stores an `ipfs://`
//! pointer and this module owns both sides of that boundary: uploading
//! metadata documents (and file attachments) through the IPFS HTTP API, and
//! resolving pointers back into displayable content through a gateway.
//!
//! Resolved documents are written through to the `resolved_content` table.
//! Pointers are content addressed, so a successful resolution never expires.

use alloy_primitives::Address;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::friendfi::conversation::ContentState;
use crate::friendfi::database::resolved_content::ResolvedContent;
use crate::friendfi::database::{Database, DatabaseError};

#[derive(Error, Debug)]
pub enum ContentStoreError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upload rejected with status {status}: {body}")]
    UploadRejected { status: u16, body: String },

    #[error("Gateway returned status {status} for {cid}")]
    GatewayStatus { status: u16, cid: String },

    #[error("Invalid content pointer: {0}")]
    InvalidPointer(String),

    #[error("Malformed metadata document: {0}")]
    MalformedMetadata(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

pub type Result<T> = std::result::Result<T, ContentStoreError>;

/// The JSON document a message pointer resolves to.
///
/// Exactly one of `content` and `file` is expected to be present; documents
/// carrying neither classify as unresolvable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageMetadata {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip_amount: Option<String>,
    pub timestamp: i64,
    pub is_encrypted: bool,
}

impl MessageMetadata {
    /// Metadata for a plain text message.
    pub fn text_message(
        sender: Address,
        receiver: Address,
        content: &str,
        tip_amount: Option<&str>,
        is_encrypted: bool,
    ) -> Self {
        Self {
            name: format!("Message from {sender:#x} to {receiver:#x}"),
            description: Self::description(tip_amount.is_some()),
            content: Some(content.to_string()),
            file: None,
            tip_amount: tip_amount.map(str::to_string),
            timestamp: Utc::now().timestamp_millis(),
            is_encrypted,
        }
    }

    /// Metadata for a message whose body is an uploaded file.
    pub fn file_message(
        sender: Address,
        receiver: Address,
        file_pointer: &str,
        tip_amount: Option<&str>,
        is_encrypted: bool,
    ) -> Self {
        Self {
            name: format!("Message from {sender:#x} to {receiver:#x}"),
            description: Self::description(tip_amount.is_some()),
            content: None,
            file: Some(file_pointer.to_string()),
            tip_amount: tip_amount.map(str::to_string),
            timestamp: Utc::now().timestamp_millis(),
            is_encrypted,
        }
    }

    fn description(tipped: bool) -> String {
        if tipped {
            "Chat message with tip".to_string()
        } else {
            "Chat message".to_string()
        }
    }
}

#[derive(Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

/// Client for the IPFS HTTP API and gateway, plus the persistent
/// resolved-content cache.
#[derive(Debug, Clone)]
pub struct ContentStore {
    http: reqwest::Client,
    api_url: String,
    gateway_url: String,
    database: Database,
}

impl ContentStore {
    pub(crate) fn new(api_url: &str, gateway_url: &str, database: Database) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            gateway_url: gateway_url.trim_end_matches('/').to_string(),
            database,
        }
    }

    /// Uploads a metadata document and returns its `ipfs://` pointer.
    pub(crate) async fn store_metadata(&self, metadata: &MessageMetadata) -> Result<String> {
        let body = serde_json::to_string(metadata)?;
        let file_name = format!("message-{}.json", Uuid::new_v4());
        self.add_bytes(&file_name, body.into_bytes(), Some("application/json"))
            .await
    }

    /// Uploads a raw file payload and returns its `ipfs://` pointer. The
    /// MIME type is sniffed from the leading bytes when recognizable.
    pub(crate) async fn store_file(&self, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        let mime = infer::get(&bytes).map(|kind| kind.mime_type());
        self.add_bytes(file_name, bytes, mime).await
    }

    /// Resolves a pointer to its metadata document, consulting the
    /// persistent cache first and writing through on a gateway fetch.
    pub(crate) async fn resolve(&self, pointer: &str) -> Result<MessageMetadata> {
        let normalized = normalize_pointer(pointer)?;
        if let Some(record) = ResolvedContent::find_by_pointer(&self.database, &normalized).await? {
            return Ok(serde_json::from_str(&record.metadata)?);
        }

        let cid = cid_of(&normalized);
        let response = self
            .http
            .get(format!("{}/ipfs/{}", self.gateway_url, cid))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ContentStoreError::GatewayStatus {
                status: status.as_u16(),
                cid: cid.to_string(),
            });
        }

        let body = response.text().await?;
        let metadata: MessageMetadata = serde_json::from_str(&body)?;
        ResolvedContent::save(&self.database, &normalized, &body).await?;
        Ok(metadata)
    }

    /// Resolution for display: failures degrade to `ContentState::Unknown`
    /// for the affected message instead of propagating.
    pub(crate) async fn resolve_to_state(&self, pointer: &str) -> ContentState {
        match self.resolve(pointer).await {
            Ok(metadata) => self.state_for(&metadata),
            Err(e) => {
                tracing::warn!("Failed to resolve content {}: {}", pointer, e);
                ContentState::Unknown
            }
        }
    }

    /// Classifies a metadata document into its display state.
    pub(crate) fn state_for(&self, metadata: &MessageMetadata) -> ContentState {
        if let Some(text) = &metadata.content {
            ContentState::Text { text: text.clone() }
        } else if let Some(file) = &metadata.file {
            match self.gateway_url_for(file) {
                Ok(url) => ContentState::File {
                    url,
                    mime_type: None,
                },
                Err(e) => {
                    tracing::warn!("Metadata carries unusable file pointer: {}", e);
                    ContentState::Unknown
                }
            }
        } else {
            ContentState::Unknown
        }
    }

    /// Maps a pointer to a fetchable gateway URL.
    pub(crate) fn gateway_url_for(&self, pointer: &str) -> Result<String> {
        let normalized = normalize_pointer(pointer)?;
        Ok(format!("{}/ipfs/{}", self.gateway_url, cid_of(&normalized)))
    }

    /// Downloads a file payload, returning its bytes and the MIME type
    /// sniffed from them.
    pub(crate) async fn fetch_file(&self, pointer: &str) -> Result<(Vec<u8>, Option<String>)> {
        let normalized = normalize_pointer(pointer)?;
        let cid = cid_of(&normalized);
        let response = self
            .http
            .get(format!("{}/ipfs/{}", self.gateway_url, cid))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ContentStoreError::GatewayStatus {
                status: status.as_u16(),
                cid: cid.to_string(),
            });
        }
        let bytes = response.bytes().await?.to_vec();
        let mime = infer::get(&bytes).map(|kind| kind.mime_type().to_string());
        Ok((bytes, mime))
    }

    async fn add_bytes(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        mime: Option<&str>,
    ) -> Result<String> {
        let mut part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        if let Some(mime) = mime {
            part = part.mime_str(mime)?;
        }
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}/api/v0/add", self.api_url))
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ContentStoreError::UploadRejected {
                status: status.as_u16(),
                body,
            });
        }

        let added: AddResponse = response.json().await?;
        Ok(format!("ipfs://{}", added.hash))
    }
}

/// Normalizes `ipfs://{cid}`, bare CIDs and gateway URLs to the canonical
/// `ipfs://{cid}` form.
pub(crate) fn normalize_pointer(input: &str) -> Result<String> {
    let trimmed = input.trim();
    let cid = if let Some(rest) = trimmed.strip_prefix("ipfs://") {
        rest
    } else if let Some(idx) = trimmed.find("/ipfs/") {
        &trimmed[idx + "/ipfs/".len()..]
    } else {
        trimmed
    };
    let cid = cid.trim_matches('/');
    if cid.is_empty() || !cid.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ContentStoreError::InvalidPointer(input.to_string()));
    }
    Ok(format!("ipfs://{cid}"))
}

fn cid_of(normalized: &str) -> &str {
    normalized.trim_start_matches("ipfs://")
}
