use super::{Backend, Connector, StoreConfig, StoreError, StoreResult};
use async_trait::async_trait;
use bson::{Bson, Document};
use futures_util::TryStreamExt;
use mongodb::error::ErrorKind;
use mongodb::options::FindOptions;
use mongodb::{Client, Collection, Database};
use std::sync::Arc;

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        let unavailable = matches!(
            *err.kind,
            ErrorKind::ServerSelection { .. }
                | ErrorKind::Io(_)
                | ErrorKind::ConnectionPoolCleared { .. }
                | ErrorKind::DnsResolve { .. }
        );
        if unavailable {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Driver(err)
        }
    }
}

pub struct MongoConnector;

#[async_trait]
impl Connector for MongoConnector {
    async fn connect(&self, config: &StoreConfig) -> StoreResult<Arc<dyn Backend>> {
        // The driver connects lazily, so only URL parsing and SRV lookups can
        // fail here. Both mean the server cannot be reached.
        let client = Client::with_uri_str(&config.url)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let db = client.database(&config.database);

        Ok(Arc::new(MongoBackend { client, db }))
    }
}

pub struct MongoBackend {
    client: Client,
    db: Database,
}

impl MongoBackend {
    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection::<Document>(name)
    }
}

#[async_trait]
impl Backend for MongoBackend {
    async fn insert_one(&self, collection: &str, document: Document) -> StoreResult<Bson> {
        let result = self.collection(collection).insert_one(document, None).await?;
        Ok(result.inserted_id)
    }

    async fn find_one(&self, collection: &str, filter: Document) -> StoreResult<Option<Document>> {
        Ok(self.collection(collection).find_one(filter, None).await?)
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        limit: u32,
    ) -> StoreResult<Vec<Document>> {
        let options = FindOptions::builder().limit(i64::from(limit)).build();
        let cursor = self.collection(collection).find(filter, options).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
    }
}
