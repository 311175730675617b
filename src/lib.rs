pub mod api;
pub mod chat;
pub mod config;
pub mod database;
pub mod errors;
pub mod geo;
pub mod llm;
pub mod logging;
pub mod models;
pub mod store;

pub use config::AppConfig;
pub use errors::*;
