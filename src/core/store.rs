//! Document store: the persisted, ordered document collection
//!
//! The whole collection lives under a single key as one JSON array. Every
//! read parses the blob and every write re-serializes the full collection.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::document::{seed_documents, Document};
use super::error::StoreError;
use super::storage::KeyValueStore;

/// Key holding the serialized collection
pub const COLLECTION_KEY: &str = "docflow_documents";

/// Key receiving an unreadable collection before it is replaced
pub const CORRUPT_BACKUP_KEY: &str = "docflow_documents.corrupt";

/// What to do when the stored collection cannot be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptBlobPolicy {
    /// Back up the blob, then reseed with the default documents
    #[default]
    Reseed,
    /// Report `StoreError::Corrupted` and leave the blob alone
    Fail,
}

/// Handle to the document collection
pub struct DocumentStore {
    backend: Box<dyn KeyValueStore>,
    on_corrupt: CorruptBlobPolicy,
    last_minted: i64,
}

impl DocumentStore {
    pub fn new(backend: Box<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            on_corrupt: CorruptBlobPolicy::default(),
            last_minted: 0,
        }
    }

    pub fn with_policy(mut self, policy: CorruptBlobPolicy) -> Self {
        self.on_corrupt = policy;
        self
    }

    /// Full collection in persisted order, seeding it on first access
    pub fn list_all(&mut self) -> Result<Vec<Document>, StoreError> {
        let Some(blob) = self.backend.get(COLLECTION_KEY)? else {
            return self.seed();
        };

        match serde_json::from_str::<Vec<Document>>(&blob) {
            Ok(docs) => Ok(docs),
            Err(e) => match self.on_corrupt {
                CorruptBlobPolicy::Fail => Err(StoreError::Corrupted(e)),
                CorruptBlobPolicy::Reseed => {
                    tracing::warn!(
                        "Document collection is unreadable ({}); backing it up to `{}` and reseeding",
                        e,
                        CORRUPT_BACKUP_KEY
                    );
                    if let Err(backup_err) = self.backend.set(CORRUPT_BACKUP_KEY, &blob) {
                        tracing::warn!("Could not back up corrupted collection: {}", backup_err);
                    }
                    self.seed()
                }
            },
        }
    }

    /// Look a document up by id; absence is `Ok(None)`
    pub fn get_by_id(&mut self, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.list_all()?.into_iter().find(|d| d.id == id))
    }

    /// Replace the record with the same id in place, or insert it first.
    /// `last_modified` is always stamped with the current time.
    pub fn save(&mut self, mut doc: Document) -> Result<(), StoreError> {
        let mut docs = self.list_all()?;
        doc.last_modified = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        match docs.iter().position(|d| d.id == doc.id) {
            Some(index) => docs[index] = doc,
            None => docs.insert(0, doc),
        }

        self.persist(&docs)?;
        tracing::info!("Saved document collection ({} documents)", docs.len());
        Ok(())
    }

    /// Mint a fresh document id from the current time in milliseconds
    pub fn new_id(&mut self) -> String {
        let now = Utc::now().timestamp_millis();
        self.last_minted = now.max(self.last_minted + 1);
        self.last_minted.to_string()
    }

    fn seed(&mut self) -> Result<Vec<Document>, StoreError> {
        let docs = seed_documents();
        self.persist(&docs)?;
        tracing::info!("Seeded document collection with {} documents", docs.len());
        Ok(docs)
    }

    fn persist(&mut self, docs: &[Document]) -> Result<(), StoreError> {
        let blob = serde_json::to_string(docs).map_err(StoreError::Serialize)?;
        self.backend.set(COLLECTION_KEY, &blob)?;
        Ok(())
    }
}
