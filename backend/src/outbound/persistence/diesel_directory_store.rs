//! PostgreSQL-backed transactional store for the venue directory.
//!
//! `begin` checks a connection out of the pool and issues `BEGIN` through
//! Diesel's ANSI transaction manager; the connection stays with the
//! transaction until `commit` or `rollback`. A transaction dropped while
//! still open leaves the manager in a non-idle state, and the pool discards
//! such connections instead of reusing them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, RunQueryDsl, TransactionManager};

use crate::domain::ports::{StoreError, StoreTransaction, TransactionalStore};
use crate::domain::{
    FavoriteVenue, LookupKey, MenuItem, NewMenu, NewMenuItem, NewUser, NewUserFavorite, NewVenue,
    NewVenueList, User, Venue, VenueList,
};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{
    MenuItemRow, NewMenuItemRow, NewMenuRow, NewUserFavoriteRow, NewUserRow,
    NewVenueListEntryRow, NewVenueListRow, NewVenueRow, UserRow, VenueListRow, VenueRow,
};
use super::pool::DbPool;
use super::schema::{menu, menu_item, user, user_favorites, venue, venue_list, venue_lists};

/// Diesel-backed implementation of the transactional store port.
#[derive(Clone)]
pub struct DieselDirectoryStore {
    pool: DbPool,
}

impl DieselDirectoryStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionalStore for DieselDirectoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError> {
        let mut conn = self.pool.get_owned().await.map_err(map_pool_error)?;
        AnsiTransactionManager::begin_transaction(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Box::new(DieselTransaction { conn }))
    }
}

struct DieselTransaction {
    conn: PooledConnection<'static, AsyncPgConnection>,
}

impl DieselTransaction {
    fn conn(&mut self) -> &mut AsyncPgConnection {
        &mut self.conn
    }
}

type FavoriteRow = (i64, VenueRow);

fn favorite_venue((favorite_id, row): FavoriteRow) -> FavoriteVenue {
    FavoriteVenue {
        favorite_id,
        venue: row.into(),
    }
}

#[async_trait]
impl StoreTransaction for DieselTransaction {
    async fn insert_user(
        &mut self,
        new_user: &NewUser,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let row = NewUserRow {
            username: &new_user.username,
            password: new_user.password.expose(),
            email: &new_user.email,
            first_name: new_user.first_name.as_deref(),
            last_name: new_user.last_name.as_deref(),
            created_at,
        };
        diesel::insert_into(user::table)
            .values(&row)
            .returning(user::id)
            .get_result(self.conn())
            .await
            .map_err(map_diesel_error)
    }

    async fn find_user_by_username(
        &mut self,
        username: &str,
    ) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = user::table
            .filter(user::username.eq(username))
            .select(UserRow::as_select())
            .first(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(User::from))
    }

    async fn insert_venue(
        &mut self,
        new_venue: &NewVenue,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let row = NewVenueRow {
            name: &new_venue.name,
            address: &new_venue.address,
            address2: new_venue.address2.as_deref(),
            city: &new_venue.city,
            state: &new_venue.state,
            zip: &new_venue.zip,
            country: &new_venue.country,
            image: new_venue.image.as_deref(),
            created_at,
        };
        diesel::insert_into(venue::table)
            .values(&row)
            .returning(venue::id)
            .get_result(self.conn())
            .await
            .map_err(map_diesel_error)
    }

    async fn find_venue(&mut self, key: &LookupKey) -> Result<Venue, StoreError> {
        let conn = self.conn();
        let row: VenueRow = match key {
            LookupKey::Id(id) => {
                venue::table
                    .find(*id)
                    .select(VenueRow::as_select())
                    .first(conn)
                    .await
            }
            LookupKey::Name(name) => {
                venue::table
                    .filter(venue::name.eq(name.as_str()))
                    .select(VenueRow::as_select())
                    .first(conn)
                    .await
            }
        }
        .map_err(map_diesel_error)?;
        Ok(row.into())
    }

    async fn insert_venue_list(
        &mut self,
        list: &NewVenueList,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let row = NewVenueListRow {
            name: &list.name,
            created_at,
        };
        diesel::insert_into(venue_list::table)
            .values(&row)
            .returning(venue_list::id)
            .get_result(self.conn())
            .await
            .map_err(map_diesel_error)
    }

    async fn find_venue_list(&mut self, key: &LookupKey) -> Result<VenueList, StoreError> {
        let conn = self.conn();
        let row: VenueListRow = match key {
            LookupKey::Id(id) => {
                venue_list::table
                    .find(*id)
                    .select(VenueListRow::as_select())
                    .first(conn)
                    .await
            }
            LookupKey::Name(name) => {
                venue_list::table
                    .filter(venue_list::name.eq(name.as_str()))
                    .select(VenueListRow::as_select())
                    .first(conn)
                    .await
            }
        }
        .map_err(map_diesel_error)?;
        Ok(row.into())
    }

    async fn insert_venue_list_entry(
        &mut self,
        venue_id: i64,
        venue_list_id: i64,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let row = NewVenueListEntryRow {
            venue_id,
            venue_list_id,
            created_at,
        };
        diesel::insert_into(venue_lists::table)
            .values(&row)
            .returning(venue_lists::id)
            .get_result(self.conn())
            .await
            .map_err(map_diesel_error)
    }

    async fn venues_by_list(&mut self, venue_list_id: i64) -> Result<Vec<Venue>, StoreError> {
        let rows: Vec<VenueRow> = venue_lists::table
            .inner_join(venue::table)
            .filter(venue_lists::venue_list_id.eq(venue_list_id))
            .order_by(venue_lists::id)
            .select(VenueRow::as_select())
            .load(self.conn())
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Venue::from).collect())
    }

    async fn insert_menu(
        &mut self,
        new_menu: &NewMenu,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let row = NewMenuRow {
            venue_id: new_menu.venue_id,
            created_at,
        };
        diesel::insert_into(menu::table)
            .values(&row)
            .returning(menu::id)
            .get_result(self.conn())
            .await
            .map_err(map_diesel_error)
    }

    async fn insert_menu_item(
        &mut self,
        item: &NewMenuItem,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let row = NewMenuItemRow {
            menu_id: item.menu_id,
            category: &item.category,
            price_cents: item.price.cents(),
            description: &item.description,
            created_at,
        };
        diesel::insert_into(menu_item::table)
            .values(&row)
            .returning(menu_item::id)
            .get_result(self.conn())
            .await
            .map_err(map_diesel_error)
    }

    async fn menu_items_for_venue(&mut self, venue_id: i64) -> Result<Vec<MenuItem>, StoreError> {
        let rows: Vec<MenuItemRow> = menu_item::table
            .inner_join(menu::table)
            .filter(menu::venue_id.eq(venue_id))
            .order_by(menu_item::id)
            .select(MenuItemRow::as_select())
            .load(self.conn())
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(MenuItemRow::into_menu_item)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::query)
    }

    async fn insert_user_favorite(
        &mut self,
        favorite: &NewUserFavorite,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let row = NewUserFavoriteRow {
            user_id: favorite.user_id,
            venue_id: favorite.venue_id,
            created_at,
        };
        diesel::insert_into(user_favorites::table)
            .values(&row)
            .returning(user_favorites::id)
            .get_result(self.conn())
            .await
            .map_err(map_diesel_error)
    }

    async fn favorites_for_user(
        &mut self,
        user_id: i64,
    ) -> Result<Vec<FavoriteVenue>, StoreError> {
        let rows: Vec<FavoriteRow> = user_favorites::table
            .inner_join(venue::table)
            .filter(user_favorites::user_id.eq(user_id))
            .order_by(user_favorites::id)
            .select((user_favorites::id, VenueRow::as_select()))
            .load(self.conn())
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(favorite_venue).collect())
    }

    async fn favorite_for(
        &mut self,
        user_id: i64,
        venue_id: i64,
    ) -> Result<FavoriteVenue, StoreError> {
        let row: FavoriteRow = user_favorites::table
            .inner_join(venue::table)
            .filter(user_favorites::user_id.eq(user_id))
            .filter(user_favorites::venue_id.eq(venue_id))
            .select((user_favorites::id, VenueRow::as_select()))
            .first(self.conn())
            .await
            .map_err(map_diesel_error)?;
        Ok(favorite_venue(row))
    }

    async fn delete_user_favorite(&mut self, favorite_id: i64) -> Result<u64, StoreError> {
        let deleted = diesel::delete(user_favorites::table.find(favorite_id))
            .execute(self.conn())
            .await
            .map_err(map_diesel_error)?;
        Ok(u64::try_from(deleted).unwrap_or(u64::MAX))
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        AnsiTransactionManager::commit_transaction(self.conn())
            .await
            .map_err(map_diesel_error)
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        AnsiTransactionManager::rollback_transaction(self.conn())
            .await
            .map_err(map_diesel_error)
    }
}
