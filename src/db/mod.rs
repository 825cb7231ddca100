//! Document store gateway.
//!
//! `DocumentStore` owns a lazily established connection to the document
//! database and exposes the four operations the HTTP layer needs: connect,
//! disconnect, create a document and list documents. Documents are schemaless
//! BSON maps; shape validation happens before they reach this module.
//!
//! Storage keeps its identifier in `_id`. Callers only ever see `id`, the hex
//! string form of it, on every document returned from here.

#[cfg(test)]
pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use bson::{doc, Bson, Document};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Identifier field used by the storage engine.
pub const INTERNAL_ID: &str = "_id";
/// Identifier field exposed to callers.
pub const EXTERNAL_ID: &str = "id";

pub const CREATED_AT: &str = "created_at";
pub const UPDATED_AT: &str = "updated_at";

/// Result count used when a caller does not ask for one.
pub const DEFAULT_LIST_LIMIT: u32 = 50;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Collection name must not be empty")]
    InvalidCollection,

    #[error("Database error: {0}")]
    Driver(mongodb::error::Error),
}

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub url: String,
    pub database: String,
}

impl StoreConfig {
    pub fn validate(&self) -> StoreResult<()> {
        if self.url.trim().is_empty() {
            return Err(StoreError::Configuration(
                "DATABASE_URL must not be empty".to_string(),
            ));
        }
        if self.database.trim().is_empty() {
            return Err(StoreError::Configuration(
                "DATABASE_NAME must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// An open connection bound to one database.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Insert a document and return the identifier storage assigned to it.
    async fn insert_one(&self, collection: &str, document: Document) -> StoreResult<Bson>;

    async fn find_one(&self, collection: &str, filter: Document) -> StoreResult<Option<Document>>;

    /// Equality-filtered read of at most `limit` documents, in storage order.
    /// `limit` is always positive here.
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        limit: u32,
    ) -> StoreResult<Vec<Document>>;

    async fn close(&self);
}

/// Opens `Backend`s from configuration.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, config: &StoreConfig) -> StoreResult<Arc<dyn Backend>>;
}

pub struct DocumentStore {
    config: StoreConfig,
    connector: Arc<dyn Connector>,
    // Held across the connect round trip so concurrent first users on the
    // multi-threaded runtime open exactly one connection.
    backend: Mutex<Option<Arc<dyn Backend>>>,
}

impl DocumentStore {
    pub fn new(config: StoreConfig, connector: Arc<dyn Connector>) -> Self {
        Self {
            config,
            connector,
            backend: Mutex::new(None),
        }
    }

    pub fn mongo(config: StoreConfig) -> Self {
        Self::new(config, Arc::new(mongo::MongoConnector))
    }

    pub async fn is_connected(&self) -> bool {
        self.backend.lock().await.is_some()
    }

    /// Connect if not already connected. Redundant calls are no-ops.
    pub async fn connect(&self) -> StoreResult<()> {
        self.backend().await.map(|_| ())
    }

    /// Release the connection, if any. The next operation reconnects.
    pub async fn disconnect(&self) {
        let backend = self.backend.lock().await.take();
        if let Some(backend) = backend {
            backend.close().await;
            tracing::info!("Disconnected from document store");
        }
    }

    /// Insert `fields` into `collection` stamped with `created_at` and
    /// `updated_at`, then return the stored document as re-read from storage.
    ///
    /// Caller-supplied values for the two timestamp keys are overwritten. If
    /// the re-read comes back empty the result is an empty document rather
    /// than an error.
    pub async fn create_document(
        &self,
        collection: &str,
        fields: Document,
    ) -> StoreResult<Document> {
        check_collection(collection)?;
        let backend = self.backend().await?;

        let now = bson::DateTime::from_chrono(chrono::Utc::now());
        let mut document = fields;
        document.insert(CREATED_AT, now);
        document.insert(UPDATED_AT, now);

        let inserted_id = backend.insert_one(collection, document).await?;
        tracing::debug!("Inserted document {} into {}", inserted_id, collection);

        let stored = backend
            .find_one(collection, doc! { INTERNAL_ID: inserted_id.clone() })
            .await?;

        match stored {
            Some(stored) => Ok(to_external(stored)),
            None => {
                tracing::warn!(
                    "Document {} vanished from {} right after insert",
                    inserted_id,
                    collection
                );
                Ok(Document::new())
            }
        }
    }

    /// Read up to `limit` documents of `collection` matching every field of
    /// `filter` exactly. `None` or an empty filter matches everything. Order
    /// is whatever storage returns.
    pub async fn list_documents(
        &self,
        collection: &str,
        filter: Option<Document>,
        limit: u32,
    ) -> StoreResult<Vec<Document>> {
        check_collection(collection)?;
        let backend = self.backend().await?;

        if limit == 0 {
            return Ok(Vec::new());
        }

        let documents = backend
            .find(collection, filter.unwrap_or_default(), limit)
            .await?;
        tracing::debug!("Listed {} documents from {}", documents.len(), collection);

        Ok(documents.into_iter().map(to_external).collect())
    }

    async fn backend(&self) -> StoreResult<Arc<dyn Backend>> {
        let mut guard = self.backend.lock().await;
        if let Some(backend) = guard.as_ref() {
            return Ok(backend.clone());
        }

        self.config.validate()?;
        let backend = self.connector.connect(&self.config).await?;
        tracing::info!(
            "Connected to document store, database {}",
            self.config.database
        );
        *guard = Some(backend.clone());
        Ok(backend)
    }
}

fn check_collection(collection: &str) -> StoreResult<()> {
    if collection.is_empty() {
        return Err(StoreError::InvalidCollection);
    }
    Ok(())
}

/// Replace the internal `_id` field with its string form under `id`.
pub fn to_external(mut document: Document) -> Document {
    let Some(internal) = document.remove(INTERNAL_ID) else {
        return document;
    };

    let external = match internal {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s,
        other => other.to_string(),
    };

    let mut out = Document::new();
    out.insert(EXTERNAL_ID, external);
    for (key, value) in document {
        if key != EXTERNAL_ID {
            out.insert(key, value);
        }
    }
    out
}
