//! Domain primitives, the transaction executor, and the directory repository.
//!
//! Purpose: define the directory entities and the rules for running every
//! repository operation inside a retried, all-or-nothing transaction. The
//! domain never touches a database driver; adapters implement the
//! [`ports::TransactionalStore`] port.
//!
//! Public surface:
//! - `DirectoryRepository` implements the `Directory` port, one method per
//!   operation.
//! - `TransactionExecutor` runs a unit of work with retries.
//! - `BackoffPolicy` and `classify` decide when and whether to retry.
//! - `RepositoryError` is the error every operation returns.

pub mod backoff;
pub mod directory_service;
pub mod error;
pub mod failure;
pub mod favorite;
pub mod menu;
pub mod ports;
pub mod transaction;
pub mod user;
pub mod venue;

pub use self::backoff::{BackoffJitter, BackoffPolicy, JITTER_SPREAD, RandomJitter};
pub use self::directory_service::DirectoryRepository;
pub use self::error::{Reference, RepositoryError};
pub use self::failure::{FailureClass, classify};
pub use self::favorite::{FavoriteQuery, FavoriteVenue, NewUserFavorite, UserFavoritesQuery};
pub use self::menu::{
    Menu, MenuItem, MenuQuery, NewMenu, NewMenuItem, Price, PriceValidationError,
};
pub use self::transaction::{
    RetryConfig, RetryRuntime, RetrySleeper, TokioSleeper, TransactionExecutor, UnitFuture,
};
pub use self::user::{NewUser, PasswordHash, User, UserQuery};
pub use self::venue::{
    LookupKey, NewVenue, NewVenueList, Venue, VenueList, VenueListAddition, VenueListLookup,
    VenueLookup,
};
