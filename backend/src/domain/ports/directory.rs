//! Driving port for the venue directory.
//!
//! Inbound adapters (an HTTP layer, a CLI) depend on this trait rather than
//! on the concrete repository. Every method runs its own retried
//! transaction; see [`crate::domain::DirectoryRepository`].

use async_trait::async_trait;

use crate::domain::{
    FavoriteQuery, FavoriteVenue, MenuItem, MenuQuery, NewMenu, NewMenuItem, NewUser,
    NewUserFavorite, NewVenue, NewVenueList, RepositoryError, User, UserFavoritesQuery, UserQuery,
    Venue, VenueList, VenueListAddition, VenueListLookup, VenueLookup,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Directory: Send + Sync {
    /// Create a user after checking its required fields.
    async fn create_user(&self, user: NewUser) -> Result<i64, RepositoryError>;

    /// Fetch a user by username; `Ok(None)` when no user matches.
    async fn get_user(&self, query: UserQuery) -> Result<Option<User>, RepositoryError>;

    async fn create_venue(&self, venue: NewVenue) -> Result<i64, RepositoryError>;

    async fn create_venue_list(&self, list: NewVenueList) -> Result<i64, RepositoryError>;

    /// Create the venue's menu. A venue owns at most one.
    async fn create_menu(&self, menu: NewMenu) -> Result<i64, RepositoryError>;

    /// Add an item to an existing menu.
    async fn add_to_menu(&self, item: NewMenuItem) -> Result<i64, RepositoryError>;

    async fn create_user_favorite(
        &self,
        favorite: NewUserFavorite,
    ) -> Result<i64, RepositoryError>;

    /// Delete a favorite by id. Deleting an absent favorite succeeds.
    async fn user_favorites_delete(&self, favorite_id: i64) -> Result<(), RepositoryError>;

    /// Fetch one venue by id or name.
    async fn venue_get(&self, lookup: VenueLookup) -> Result<Venue, RepositoryError>;

    /// Fetch one venue list by id or name.
    async fn venue_list_get(&self, lookup: VenueListLookup) -> Result<VenueList, RepositoryError>;

    /// Venues on a list; empty when the list has none or does not exist.
    async fn venues_by_list(&self, venue_list_id: i64) -> Result<Vec<Venue>, RepositoryError>;

    async fn user_favorites_list(
        &self,
        query: UserFavoritesQuery,
    ) -> Result<Vec<FavoriteVenue>, RepositoryError>;

    /// Fetch the favorite linking one user to one venue.
    async fn user_favorites_get(
        &self,
        query: FavoriteQuery,
    ) -> Result<FavoriteVenue, RepositoryError>;

    async fn menu_items_get(&self, query: MenuQuery) -> Result<Vec<MenuItem>, RepositoryError>;

    /// Resolve the list, then the venue, then record the membership.
    ///
    /// Each step runs only after the previous one succeeded. A list or venue
    /// with no matching row is reported as
    /// [`RepositoryError::ReferenceUnresolved`]; any other resolution
    /// failure is returned as is.
    async fn venue_list_add(&self, addition: VenueListAddition) -> Result<i64, RepositoryError>;
}
