//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types live here
//! so the store only moves rows around.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{MenuItem, PasswordHash, Price, User, Venue, VenueList};

use super::schema::{menu, menu_item, user, user_favorites, venue, venue_list, venue_lists};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = user)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            password: PasswordHash::new(row.password),
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub email: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = venue)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VenueRow {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub image: Option<String>,
}

impl From<VenueRow> for Venue {
    fn from(row: VenueRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            address: row.address,
            address2: row.address2,
            city: row.city,
            state: row.state,
            zip: row.zip,
            country: row.country,
            image: row.image,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = venue)]
pub(crate) struct NewVenueRow<'a> {
    pub name: &'a str,
    pub address: &'a str,
    pub address2: Option<&'a str>,
    pub city: &'a str,
    pub state: &'a str,
    pub zip: &'a str,
    pub country: &'a str,
    pub image: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = venue_list)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VenueListRow {
    pub id: i64,
    pub name: String,
}

impl From<VenueListRow> for VenueList {
    fn from(row: VenueListRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = venue_list)]
pub(crate) struct NewVenueListRow<'a> {
    pub name: &'a str,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = venue_lists)]
pub(crate) struct NewVenueListEntryRow {
    pub venue_id: i64,
    pub venue_list_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = menu)]
pub(crate) struct NewMenuRow {
    pub venue_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = menu_item)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MenuItemRow {
    pub id: i64,
    pub menu_id: i64,
    pub category: String,
    pub price_cents: i64,
    pub description: String,
}

impl MenuItemRow {
    /// Convert into the domain item, rejecting a stored negative price.
    pub fn into_menu_item(self) -> Result<MenuItem, String> {
        let price = Price::from_cents(self.price_cents)
            .map_err(|err| format!("menu item {}: {err}", self.id))?;
        Ok(MenuItem {
            id: self.id,
            menu_id: self.menu_id,
            category: self.category,
            price,
            description: self.description,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = menu_item)]
pub(crate) struct NewMenuItemRow<'a> {
    pub menu_id: i64,
    pub category: &'a str,
    pub price_cents: i64,
    pub description: &'a str,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_favorites)]
pub(crate) struct NewUserFavoriteRow {
    pub user_id: i64,
    pub venue_id: i64,
    pub created_at: DateTime<Utc>,
}
