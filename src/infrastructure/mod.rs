//! Infrastructure layer - Store, codec, hashing and notification implementations

pub mod account;
pub mod logging;
pub mod notification;
pub mod repository;
pub mod storage;
pub mod token;
pub mod user;
