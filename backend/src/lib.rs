//! Venue directory: transactional data access for venues, menus, users,
//! favorites, and venue lists.

pub mod config;
pub mod domain;
pub mod outbound;
pub mod telemetry;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::RetrySettings;
pub use domain::ports::Directory;
pub use domain::{DirectoryRepository, RepositoryError};
