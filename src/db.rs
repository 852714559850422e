use std::sync::Arc;

use anyhow::Result;
use mongodb::bson::doc;
use mongodb::{Client, Database};

use crate::{
    config::{AppConfig, StoreKind},
    store::{InMemoryOrderStore, MongoOrderStore, OrderStore},
};

/// Connect to MongoDB and make sure the server answers before handing out the database.
pub async fn connect(config: &AppConfig) -> Result<Database> {
    let client = Client::with_uri_str(&config.mongodb_uri).await?;
    let database = client.database(&config.database_name);
    database.run_command(doc! { "ping": 1 }).await?;
    tracing::info!(database = %config.database_name, "connected to mongodb");
    Ok(database)
}

/// Open the order store selected by the configuration.
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn OrderStore>> {
    match config.store {
        StoreKind::Mongo => {
            let database = connect(config).await?;
            Ok(Arc::new(MongoOrderStore::new(&database, &config.collection_name)))
        }
        StoreKind::Memory => {
            tracing::warn!("using the in-memory order store, orders are lost on exit");
            Ok(Arc::new(InMemoryOrderStore::new()))
        }
    }
}
