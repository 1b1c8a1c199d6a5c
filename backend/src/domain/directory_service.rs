//! Directory repository: one retried transaction per operation.
//!
//! Every method validates its input first, then runs exactly one
//! [`TransactionExecutor::run`] call, except [`Directory::venue_list_add`],
//! which resolves the list and the venue in their own transactions before it
//! writes the membership row. Creation timestamps come from the injected
//! clock.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use super::error::{Reference, RepositoryError};
use super::ports::{Directory, TransactionalStore};
use super::venue::LookupKey;
use super::transaction::{RetryConfig, TransactionExecutor};
use super::{
    FavoriteQuery, FavoriteVenue, MenuItem, MenuQuery, NewMenu, NewMenuItem, NewUser,
    NewUserFavorite, NewVenue, NewVenueList, User, UserFavoritesQuery, UserQuery, Venue,
    VenueList, VenueListAddition, VenueListLookup, VenueLookup,
};

/// Transactional implementation of the [`Directory`] port.
#[derive(Clone)]
pub struct DirectoryRepository {
    executor: TransactionExecutor,
    clock: Arc<dyn Clock>,
}

impl DirectoryRepository {
    /// Build a repository over `store` with the default retry runtime.
    pub fn new(
        store: Arc<dyn TransactionalStore>,
        clock: Arc<dyn Clock>,
        config: RetryConfig,
    ) -> Self {
        Self::with_executor(TransactionExecutor::new(store, config), clock)
    }

    /// Build a repository around a preconfigured executor.
    pub fn with_executor(executor: TransactionExecutor, clock: Arc<dyn Clock>) -> Self {
        Self { executor, clock }
    }
}

#[async_trait]
impl Directory for DirectoryRepository {
    async fn create_user(&self, user: NewUser) -> Result<i64, RepositoryError> {
        user.validate()?;
        let created_at = self.clock.utc();
        self.executor
            .run("create_user", move |tx| {
                let user = user.clone();
                Box::pin(async move { tx.insert_user(&user, created_at).await })
            })
            .await
    }

    async fn get_user(&self, query: UserQuery) -> Result<Option<User>, RepositoryError> {
        self.executor
            .run("get_user", move |tx| {
                let username = query.username.clone();
                Box::pin(async move { tx.find_user_by_username(&username).await })
            })
            .await
    }

    async fn create_venue(&self, venue: NewVenue) -> Result<i64, RepositoryError> {
        let created_at = self.clock.utc();
        self.executor
            .run("create_venue", move |tx| {
                let venue = venue.clone();
                Box::pin(async move { tx.insert_venue(&venue, created_at).await })
            })
            .await
    }

    async fn create_venue_list(&self, list: NewVenueList) -> Result<i64, RepositoryError> {
        let created_at = self.clock.utc();
        self.executor
            .run("create_venue_list", move |tx| {
                let list = list.clone();
                Box::pin(async move { tx.insert_venue_list(&list, created_at).await })
            })
            .await
    }

    async fn create_menu(&self, menu: NewMenu) -> Result<i64, RepositoryError> {
        let created_at = self.clock.utc();
        self.executor
            .run("create_menu", move |tx| {
                Box::pin(async move { tx.insert_menu(&menu, created_at).await })
            })
            .await
    }

    async fn add_to_menu(&self, item: NewMenuItem) -> Result<i64, RepositoryError> {
        let created_at = self.clock.utc();
        self.executor
            .run("add_to_menu", move |tx| {
                let item = item.clone();
                Box::pin(async move { tx.insert_menu_item(&item, created_at).await })
            })
            .await
    }

    async fn create_user_favorite(
        &self,
        favorite: NewUserFavorite,
    ) -> Result<i64, RepositoryError> {
        let created_at = self.clock.utc();
        self.executor
            .run("create_user_favorite", move |tx| {
                Box::pin(async move { tx.insert_user_favorite(&favorite, created_at).await })
            })
            .await
    }

    async fn user_favorites_delete(&self, favorite_id: i64) -> Result<(), RepositoryError> {
        let deleted = self
            .executor
            .run("user_favorites_delete", move |tx| {
                Box::pin(async move { tx.delete_user_favorite(favorite_id).await })
            })
            .await?;
        debug!(favorite_id, deleted, "deleted user favorite");
        Ok(())
    }

    async fn venue_get(&self, lookup: VenueLookup) -> Result<Venue, RepositoryError> {
        let key = lookup.key()?;
        self.executor
            .run("venue_get", move |tx| {
                let key = key.clone();
                Box::pin(async move { tx.find_venue(&key).await })
            })
            .await
    }

    async fn venue_list_get(&self, lookup: VenueListLookup) -> Result<VenueList, RepositoryError> {
        let key = lookup.key()?;
        self.executor
            .run("venue_list_get", move |tx| {
                let key = key.clone();
                Box::pin(async move { tx.find_venue_list(&key).await })
            })
            .await
    }

    async fn venues_by_list(&self, venue_list_id: i64) -> Result<Vec<Venue>, RepositoryError> {
        self.executor
            .run("venues_by_list", move |tx| {
                Box::pin(async move { tx.venues_by_list(venue_list_id).await })
            })
            .await
    }

    async fn user_favorites_list(
        &self,
        query: UserFavoritesQuery,
    ) -> Result<Vec<FavoriteVenue>, RepositoryError> {
        self.executor
            .run("user_favorites_list", move |tx| {
                Box::pin(async move { tx.favorites_for_user(query.user_id).await })
            })
            .await
    }

    async fn user_favorites_get(
        &self,
        query: FavoriteQuery,
    ) -> Result<FavoriteVenue, RepositoryError> {
        self.executor
            .run("user_favorites_get", move |tx| {
                Box::pin(async move { tx.favorite_for(query.user_id, query.venue_id).await })
            })
            .await
    }

    async fn menu_items_get(&self, query: MenuQuery) -> Result<Vec<MenuItem>, RepositoryError> {
        self.executor
            .run("menu_items_get", move |tx| {
                Box::pin(async move { tx.menu_items_for_venue(query.venue_id).await })
            })
            .await
    }

    async fn venue_list_add(&self, addition: VenueListAddition) -> Result<i64, RepositoryError> {
        let list_lookup = addition.venue_list_lookup();
        let venue_lookup = addition.venue_lookup();
        let list_key = list_lookup.key()?;
        let venue_key = venue_lookup.key()?;

        let list = self
            .venue_list_get(list_lookup)
            .await
            .map_err(unresolved(Reference::VenueList, list_key))?;
        let venue = self
            .venue_get(venue_lookup)
            .await
            .map_err(unresolved(Reference::Venue, venue_key))?;

        let (venue_id, venue_list_id) = (venue.id, list.id);
        let created_at = self.clock.utc();
        self.executor
            .run("venue_list_add", move |tx| {
                Box::pin(async move {
                    tx.insert_venue_list_entry(venue_id, venue_list_id, created_at)
                        .await
                })
            })
            .await
    }
}

/// Name the missing reference when a lookup found no row.
///
/// Any other failure, exhausted retries included, passes through unchanged
/// so a store outage is never reported as a missing venue or list.
fn unresolved(
    reference: Reference,
    key: LookupKey,
) -> impl FnOnce(RepositoryError) -> RepositoryError {
    move |err| match err {
        RepositoryError::NotFound { .. } => {
            RepositoryError::reference_unresolved(reference, key, err)
        }
        other => other,
    }
}
