pub mod config;
pub mod db;
pub mod dto;
pub mod error;
pub mod menu;
pub mod models;
pub mod query;
pub mod services;
pub mod state;
pub mod store;
