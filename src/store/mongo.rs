use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use mongodb::bson::Document;
use mongodb::{Collection, Database};

use super::{DocumentStream, OrderStore, StoreError, StoreResult};

#[derive(Clone, Debug)]
pub struct MongoOrderStore {
    collection: Collection<Document>,
}

impl MongoOrderStore {
    pub fn new(database: &Database, collection_name: &str) -> Self {
        Self {
            collection: database.collection(collection_name),
        }
    }

    pub fn collection(&self) -> &Collection<Document> {
        &self.collection
    }
}

#[async_trait]
impl OrderStore for MongoOrderStore {
    async fn insert_one(&self, document: Document) -> StoreResult<()> {
        self.collection.insert_one(document).await?;
        Ok(())
    }

    async fn update_one(&self, filter: Document, update: Document) -> StoreResult<u64> {
        let result = self.collection.update_one(filter, update).await?;
        Ok(result.modified_count)
    }

    async fn delete_one(&self, filter: Document) -> StoreResult<u64> {
        let result = self.collection.delete_one(filter).await?;
        Ok(result.deleted_count)
    }

    async fn find(&self, filter: Document) -> StoreResult<DocumentStream> {
        let cursor = self.collection.find(filter).await?;
        Ok(cursor.map_err(StoreError::from).boxed())
    }

    async fn aggregate_first(&self, pipeline: Vec<Document>) -> StoreResult<Option<Document>> {
        let mut cursor = self.collection.aggregate(pipeline).await?;
        Ok(cursor.try_next().await?)
    }
}
