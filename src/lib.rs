//! CosmoLab Matrix Dashboard Library
//!
//! Level purchase checking and confirmation for the matrix referral
//! dashboard, backed by PostgreSQL with an in-memory store for tests.

#![allow(dead_code)]

pub mod api;
pub mod client;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod wallet;

// Re-export commonly used types
pub use config::MatrixConfig;
pub use database::Database;
pub use error::{ApiError, ApiResult};
pub use models::*;
