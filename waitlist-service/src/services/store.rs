//! Waitlist record store.
//!
//! The store is consumed as an opaque create/list interface; MongoDB backs
//! it in production and an in-memory implementation backs the tests. The
//! unique index on `payment_id` is what guarantees at most one entry per
//! captured payment.

use crate::models::{PaymentStatus, WaitlistEntry};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::{bson::doc, Collection, Database, IndexModel};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("an entry already exists for this payment")]
    DuplicatePayment,

    #[error("store error: {0}")]
    Backend(#[from] anyhow::Error),
}

#[async_trait]
pub trait WaitlistStore: Send + Sync {
    /// Persist a new entry. Fails with `DuplicatePayment` if an entry with
    /// the same `payment_id` already exists.
    async fn insert(&self, entry: WaitlistEntry) -> Result<WaitlistEntry, StoreError>;

    /// Completed entries in insertion order.
    async fn list_completed(&self) -> Result<Vec<WaitlistEntry>, StoreError>;
}

#[derive(Clone)]
pub struct MongoWaitlistStore {
    collection: Collection<WaitlistEntry>,
}

impl MongoWaitlistStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("waitlist"),
        }
    }

    /// Create the unique payment index and the listing index.
    pub async fn init_indexes(&self) -> anyhow::Result<()> {
        let payment_index = IndexModel::builder()
            .keys(doc! { "payment_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("unique_payment_idx".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        let listing_index = IndexModel::builder()
            .keys(doc! { "payment_status": 1, "created_at": 1 })
            .options(
                IndexOptions::builder()
                    .name("completed_listing_idx".to_string())
                    .build(),
            )
            .build();

        self.collection
            .create_indexes([payment_index, listing_index], None)
            .await?;

        tracing::info!("Waitlist indexes initialized");
        Ok(())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref write_error)) if write_error.code == 11000
    )
}

#[async_trait]
impl WaitlistStore for MongoWaitlistStore {
    async fn insert(&self, entry: WaitlistEntry) -> Result<WaitlistEntry, StoreError> {
        match self.collection.insert_one(&entry, None).await {
            Ok(_) => Ok(entry),
            Err(err) if is_duplicate_key(&err) => Err(StoreError::DuplicatePayment),
            Err(err) => Err(StoreError::Backend(err.into())),
        }
    }

    async fn list_completed(&self) -> Result<Vec<WaitlistEntry>, StoreError> {
        let filter = doc! { "payment_status": "COMPLETED" };
        let options = FindOptions::builder()
            .sort(doc! { "created_at": 1 })
            .build();

        let cursor = self
            .collection
            .find(filter, Some(options))
            .await
            .map_err(|err| StoreError::Backend(err.into()))?;

        let entries: Vec<WaitlistEntry> = cursor
            .try_collect()
            .await
            .map_err(|err| StoreError::Backend(err.into()))?;

        Ok(entries)
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryWaitlistStore {
    entries: Mutex<Vec<WaitlistEntry>>,
}

impl MemoryWaitlistStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WaitlistStore for MemoryWaitlistStore {
    async fn insert(&self, entry: WaitlistEntry) -> Result<WaitlistEntry, StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Backend(anyhow::anyhow!("store lock poisoned")))?;

        if entries.iter().any(|e| e.payment_id == entry.payment_id) {
            return Err(StoreError::DuplicatePayment);
        }

        entries.push(entry.clone());
        Ok(entry)
    }

    async fn list_completed(&self) -> Result<Vec<WaitlistEntry>, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Backend(anyhow::anyhow!("store lock poisoned")))?;

        Ok(entries
            .iter()
            .filter(|e| e.payment_status == PaymentStatus::Completed)
            .cloned()
            .collect())
    }
}
