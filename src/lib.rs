//! Credit score pipeline
//!
//! Batch ingestion of customer records, offline training of a credit
//! classifier and an HTTP service that scores single customers.
//!
//! # Modules
//!
//! ## Data
//! - [`storage`] - Relational customer table (PostgreSQL or SQLite)
//! - [`ingestion`] - CSV import into the customer table
//! - [`preprocessing`] - Imputation and label encoding
//!
//! ## Models
//! - [`training`] - Random forest and KNN training with best-model selection
//! - [`export`] - Versioned artifact persistence
//! - [`inference`] - Record encoding and prediction
//!
//! ## Services
//! - [`server`] - HTTP prediction API
//! - [`cli`] - Command-line interface

// Core error handling and configuration
pub mod error;
pub mod config;

// Data
pub mod storage;
pub mod ingestion;
pub mod preprocessing;

// Models
pub mod training;
pub mod export;
pub mod inference;

// Services
pub mod server;
pub mod cli;

pub use error::{CreditScoreError, Result};
