//! The document-store seam used by the order service.
//!
//! [`OrderStore`] mirrors the handful of driver calls the service needs. The
//! MongoDB backend forwards them to the official driver; the in-memory backend
//! evaluates the same filters, updates and pipelines over a local collection.

use async_trait::async_trait;
use futures::stream::BoxStream;
use mongodb::bson::Document;
use thiserror::Error;

pub mod memory;
pub mod mongo;

pub use memory::InMemoryOrderStore;
pub use mongo::MongoOrderStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("mongodb: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("bson encoding: {0}")]
    Encode(#[from] mongodb::bson::ser::Error),

    #[error("unsupported query: {0}")]
    Unsupported(String),

    #[error("in-memory collection lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

pub type DocumentStream = BoxStream<'static, StoreResult<Document>>;

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert_one(&self, document: Document) -> StoreResult<()>;

    /// Applies `update` to the first document matching `filter`.
    /// Returns the modified count.
    async fn update_one(&self, filter: Document, update: Document) -> StoreResult<u64>;

    /// Removes the first document matching `filter`. Returns the deleted count.
    async fn delete_one(&self, filter: Document) -> StoreResult<u64>;

    async fn find(&self, filter: Document) -> StoreResult<DocumentStream>;

    /// Runs `pipeline` and returns its first output document, if any.
    async fn aggregate_first(&self, pipeline: Vec<Document>) -> StoreResult<Option<Document>>;
}
