//! # Composer API Client
//!
//! Trait-shaped access to the page-composition service, with an HTTP
//! implementation over `reqwest`. The engine only ever sees the trait,
//! so tests drive it with an in-memory fake.

use crate::wire::{BlockDoc, LayoutDoc, LayoutSummary, SaveRequest, SaveResponse};
use async_trait::async_trait;
use mosaic_editor::EditError;
use mosaic_model::{BlockPlugin, CollectionError};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered but the request could not be honored.
    #[error("service error: {0}")]
    Service(String),

    /// Another save/cancel request already owns the tab's loading guard.
    #[error("a request is already in flight for this tab")]
    Busy,

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Collection(#[from] CollectionError),
}

/// Connection settings, typically deserialized from the host page's
/// settings blob.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub base_url: String,
    pub page_id: String,
    pub variant_id: String,
    /// Per-request timeout, seconds.
    pub timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            page_id: String::new(),
            variant_id: String::new(),
            timeout_secs: 30,
        }
    }
}

impl SyncConfig {
    /// Root of the variant-scoped endpoints.
    pub fn root(&self) -> String {
        format!(
            "{}/page/{}/variant/{}",
            self.base_url.trim_end_matches('/'),
            self.page_id,
            self.variant_id
        )
    }
}

/// The service endpoints the engine needs.
#[async_trait]
pub trait ComposerApi: Send + Sync {
    /// List the layouts available to this variant.
    async fn layouts(&self) -> Result<Vec<LayoutSummary>, SyncError>;

    /// Fetch one layout document.
    async fn layout(&self, id: &str) -> Result<LayoutDoc, SyncError>;

    /// Fetch one rendered block.
    async fn block(&self, uuid: &str) -> Result<BlockDoc, SyncError>;

    /// Fetch the block catalog.
    async fn block_plugins(&self) -> Result<Vec<BlockPlugin>, SyncError>;

    /// Push the full tree; the response maps client-temporary uuids to
    /// server-assigned ones.
    async fn save_layout(&self, request: &SaveRequest) -> Result<SaveResponse, SyncError>;

    /// Discard the server-side draft.
    async fn cancel(&self) -> Result<(), SyncError>;
}

/// HTTP client over the composition service.
pub struct HttpComposerApi {
    client: reqwest::Client,
    root: String,
}

impl HttpComposerApi {
    pub fn new(config: &SyncConfig) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            root: config.root(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.root, path)
    }
}

#[async_trait]
impl ComposerApi for HttpComposerApi {
    async fn layouts(&self) -> Result<Vec<LayoutSummary>, SyncError> {
        let response = self
            .client
            .get(self.url("layouts"))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn layout(&self, id: &str) -> Result<LayoutDoc, SyncError> {
        let response = self
            .client
            .get(self.url(&format!("layouts/{id}")))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn block(&self, uuid: &str) -> Result<BlockDoc, SyncError> {
        let response = self
            .client
            .get(self.url(&format!("blocks/{uuid}")))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn block_plugins(&self) -> Result<Vec<BlockPlugin>, SyncError> {
        let response = self
            .client
            .get(self.url("block_plugins"))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn save_layout(&self, request: &SaveRequest) -> Result<SaveResponse, SyncError> {
        let response = self
            .client
            .put(self.url(&format!("layouts/{}", request.id)))
            .json(request)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn cancel(&self) -> Result<(), SyncError> {
        self.client
            .delete(self.url("draft"))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
