use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Mongo,
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mongodb_uri: String,
    pub database_name: String,
    pub collection_name: String,
    pub store: StoreKind,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let mongodb_uri =
            env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let database_name = env::var("MONGODB_DATABASE").unwrap_or_else(|_| "eShop".to_string());
        let collection_name =
            env::var("ORDER_COLLECTION").unwrap_or_else(|_| "OrderCollection".to_string());
        let store = match env::var("ORDER_STORE") {
            Ok(kind) => parse_store_kind(&kind)?,
            Err(_) => StoreKind::Mongo,
        };
        Ok(Self {
            mongodb_uri,
            database_name,
            collection_name,
            store,
        })
    }
}

fn parse_store_kind(value: &str) -> anyhow::Result<StoreKind> {
    match value.trim().to_ascii_lowercase().as_str() {
        "mongo" | "mongodb" => Ok(StoreKind::Mongo),
        "memory" | "in-memory" => Ok(StoreKind::Memory),
        other => Err(anyhow::anyhow!("unknown ORDER_STORE value: {other}")),
    }
}
