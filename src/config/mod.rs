//! Application configuration

mod app_config;

pub use app_config::{AccountConfig, AppConfig, LogFormat, LoggingConfig, StorageSettings};
