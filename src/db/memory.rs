//! In-memory backend for tests. Collections outlive individual connections so
//! a disconnect followed by a reconnect sees earlier writes.

use super::{Backend, Connector, StoreConfig, StoreError, StoreResult, INTERNAL_ID};
use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{Bson, Document};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type Collections = Arc<Mutex<HashMap<String, Vec<Document>>>>;

#[derive(Default)]
pub struct MemoryConnector {
    collections: Collections,
    connects: AtomicUsize,
    closes: Arc<AtomicUsize>,
    refuse: AtomicBool,
    drop_reads: Arc<AtomicBool>,
}

impl MemoryConnector {
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Make every connect attempt fail as if the server were down.
    pub fn refuse_connections(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    /// Make `find_one` miss, simulating a write that is not readable back.
    pub fn drop_reads(&self, drop: bool) {
        self.drop_reads.store(drop, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, _config: &StoreConfig) -> StoreResult<Arc<dyn Backend>> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        // Widen the window in which concurrent callers could race.
        tokio::task::yield_now().await;
        self.connects.fetch_add(1, Ordering::SeqCst);

        Ok(Arc::new(MemoryBackend {
            collections: self.collections.clone(),
            closes: self.closes.clone(),
            drop_reads: self.drop_reads.clone(),
        }))
    }
}

pub struct MemoryBackend {
    collections: Collections,
    closes: Arc<AtomicUsize>,
    drop_reads: Arc<AtomicBool>,
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, value)| document.get(key) == Some(value))
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn insert_one(&self, collection: &str, mut document: Document) -> StoreResult<Bson> {
        let id = match document.get(INTERNAL_ID) {
            Some(id) => id.clone(),
            None => {
                let id = Bson::ObjectId(ObjectId::new());
                document.insert(INTERNAL_ID, id.clone());
                id
            }
        };

        let mut collections = self.collections.lock().unwrap();
        collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(id)
    }

    async fn find_one(&self, collection: &str, filter: Document) -> StoreResult<Option<Document>> {
        if self.drop_reads.load(Ordering::SeqCst) {
            return Ok(None);
        }

        let collections = self.collections.lock().unwrap();
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| matches(d, &filter)).cloned()))
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        limit: u32,
    ) -> StoreResult<Vec<Document>> {
        let collections = self.collections.lock().unwrap();
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| matches(d, &filter))
                    .take(limit as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}
