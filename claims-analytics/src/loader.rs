use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::{
    error::{AnalyticsError, Result},
    record::Collection,
};

/// Trait for reading one record collection as an ordered list of raw records
#[async_trait]
pub trait RecordLoader: Send + Sync {
    async fn load(&self, collection: Collection) -> Result<Vec<Value>>;
}

/// Reads each collection from a JSON array file inside a data directory
pub struct JsonDirLoader {
    dir: PathBuf,
}

impl JsonDirLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, collection: Collection) -> PathBuf {
        self.dir.join(collection.file_name())
    }
}

#[async_trait]
impl RecordLoader for JsonDirLoader {
    async fn load(&self, collection: Collection) -> Result<Vec<Value>> {
        let path = self.path_for(collection);
        debug!(path = %path.display(), %collection, "reading collection");

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| AnalyticsError::Io { collection, source })?;

        serde_json::from_slice(&bytes)
            .map_err(|source| AnalyticsError::Deserialize { collection, source })
    }
}

/// In-memory implementation of RecordLoader
#[derive(Default)]
pub struct InMemoryLoader {
    records: Arc<DashMap<Collection, Vec<Value>>>,
}

impl InMemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, collection: Collection, records: Vec<Value>) {
        self.records.insert(collection, records);
    }

    pub fn with(self, collection: Collection, records: Vec<Value>) -> Self {
        self.insert(collection, records);
        self
    }
}

#[async_trait]
impl RecordLoader for InMemoryLoader {
    async fn load(&self, collection: Collection) -> Result<Vec<Value>> {
        self.records
            .get(&collection)
            .map(|entry| entry.clone())
            .ok_or(AnalyticsError::MissingCollection(collection))
    }
}
