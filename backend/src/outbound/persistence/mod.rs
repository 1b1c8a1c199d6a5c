//! PostgreSQL persistence adapter using Diesel ORM.
//!
//! [`DieselDirectoryStore`] implements the transactional store port with
//! `diesel-async` connections drawn from a `bb8` pool. Diesel row structs
//! (`models.rs`) and table definitions (`schema.rs`) never leave this module.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use mockable::DefaultClock;
//! use venue_directory::outbound::persistence::{DbPool, DieselDirectoryStore, PoolConfig};
//! use venue_directory::{DirectoryRepository, RetrySettings};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/directory")).await?;
//! let store = Arc::new(DieselDirectoryStore::new(pool));
//! let retry = RetrySettings::load()?.retry_config();
//! let directory = DirectoryRepository::new(store, Arc::new(DefaultClock), retry);
//! ```

pub(crate) mod diesel_helpers;
mod diesel_directory_store;
mod models;
mod pool;
mod schema;

pub use diesel_directory_store::DieselDirectoryStore;
pub use pool::{DbPool, PoolConfig, PoolError};
