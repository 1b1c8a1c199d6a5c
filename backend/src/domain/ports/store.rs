//! Port abstraction for the transactional relational store.
//!
//! The transaction executor is the only consumer. It opens a
//! [`StoreTransaction`] through [`TransactionalStore::begin`], hands it to a
//! unit of work, and then either commits or rolls back. Statements report
//! raw [`StoreError`] values; classifying them is the executor's job.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    FavoriteVenue, LookupKey, MenuItem, NewMenu, NewMenuItem, NewUser, NewUserFavorite, NewVenue,
    NewVenueList, User, Venue, VenueList,
};

use super::define_port_error;

define_port_error! {
    /// Raw failures reported by store adapters.
    pub enum StoreError {
        /// The connection could not be obtained or was lost mid-statement.
        Connection { message: String } => "store connection failed: {message}",
        /// A uniqueness constraint rejected the write.
        UniqueViolation { message: String } => "unique constraint violated: {message}",
        /// A statement that requires exactly one row matched none.
        NotFound { message: String } => "no rows matched: {message}",
        /// A foreign key referenced a row that does not exist.
        MissingReference { message: String } => "referenced row missing: {message}",
        /// Any other statement failure, including serialization conflicts.
        Query { message: String } => "store query failed: {message}",
    }
}

/// Opens transactions against the store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionalStore: Send + Sync {
    /// Start a transaction holding its own connection until it ends.
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError>;
}

/// Statements available inside one open transaction.
///
/// Every insert receives `created_at` from the caller so the timestamp comes
/// from the injected clock rather than the database.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Insert a user and return its generated id.
    async fn insert_user(
        &mut self,
        user: &NewUser,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError>;

    /// Fetch a user by username; `None` when no row matches.
    async fn find_user_by_username(&mut self, username: &str)
    -> Result<Option<User>, StoreError>;

    /// Insert a venue and return its generated id.
    async fn insert_venue(
        &mut self,
        venue: &NewVenue,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError>;

    /// Fetch exactly one venue; [`StoreError::NotFound`] when none matches.
    async fn find_venue(&mut self, key: &LookupKey) -> Result<Venue, StoreError>;

    /// Insert a venue list and return its generated id.
    async fn insert_venue_list(
        &mut self,
        list: &NewVenueList,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError>;

    /// Fetch exactly one venue list; [`StoreError::NotFound`] when none matches.
    async fn find_venue_list(&mut self, key: &LookupKey) -> Result<VenueList, StoreError>;

    /// Place a venue on a list and return the membership id.
    async fn insert_venue_list_entry(
        &mut self,
        venue_id: i64,
        venue_list_id: i64,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError>;

    /// Venues on a list, ordered by membership id.
    async fn venues_by_list(&mut self, venue_list_id: i64) -> Result<Vec<Venue>, StoreError>;

    /// Insert a menu and return its generated id.
    async fn insert_menu(
        &mut self,
        menu: &NewMenu,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError>;

    /// Insert a menu item and return its generated id.
    async fn insert_menu_item(
        &mut self,
        item: &NewMenuItem,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError>;

    /// Items on the venue's menu, ordered by item id.
    async fn menu_items_for_venue(&mut self, venue_id: i64) -> Result<Vec<MenuItem>, StoreError>;

    /// Insert a favorite and return its generated id.
    async fn insert_user_favorite(
        &mut self,
        favorite: &NewUserFavorite,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError>;

    /// A user's favorited venues, ordered by favorite id.
    async fn favorites_for_user(&mut self, user_id: i64)
    -> Result<Vec<FavoriteVenue>, StoreError>;

    /// Fetch exactly one favorite; [`StoreError::NotFound`] when none matches.
    async fn favorite_for(
        &mut self,
        user_id: i64,
        venue_id: i64,
    ) -> Result<FavoriteVenue, StoreError>;

    /// Delete a favorite by id and return the number of affected rows.
    async fn delete_user_favorite(&mut self, favorite_id: i64) -> Result<u64, StoreError>;

    /// Make every statement in this transaction durable.
    async fn commit(&mut self) -> Result<(), StoreError>;

    /// Discard every statement in this transaction.
    async fn rollback(&mut self) -> Result<(), StoreError>;
}
