//! Transactional in-memory store with fault injection and call counting.
//!
//! Each transaction works on a private snapshot of the committed tables and
//! publishes it on commit. A transaction that wrote while another one
//! committed fails its commit with a serialization conflict, the way an
//! optimistic store would. Id sequences are shared and never roll back, so
//! the first row of every table gets id 1.
//!
//! Faults are queued per hook (`begin`, a statement name, `commit`,
//! `rollback`) and consumed one per call, which lets tests script "fail
//! twice, then succeed".

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{StoreError, StoreTransaction, TransactionalStore};
use crate::domain::{
    FavoriteVenue, LookupKey, Menu, MenuItem, NewMenu, NewMenuItem, NewUser, NewUserFavorite,
    NewVenue, NewVenueList, User, Venue, VenueList,
};

/// Tables held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    User,
    Venue,
    VenueList,
    VenueListEntry,
    Menu,
    MenuItem,
    UserFavorite,
}

#[derive(Debug, Clone)]
struct Row<T> {
    value: T,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
struct ListEntry {
    venue_id: i64,
    venue_list_id: i64,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    users: BTreeMap<i64, Row<User>>,
    venues: BTreeMap<i64, Row<Venue>>,
    venue_lists: BTreeMap<i64, Row<VenueList>>,
    venue_list_entries: BTreeMap<i64, Row<ListEntry>>,
    menus: BTreeMap<i64, Row<Menu>>,
    menu_items: BTreeMap<i64, Row<MenuItem>>,
    favorites: BTreeMap<i64, Row<NewUserFavorite>>,
}

impl Tables {
    fn created_at(&self, table: Table, id: i64) -> Option<DateTime<Utc>> {
        match table {
            Table::User => self.users.get(&id).map(|row| row.created_at),
            Table::Venue => self.venues.get(&id).map(|row| row.created_at),
            Table::VenueList => self.venue_lists.get(&id).map(|row| row.created_at),
            Table::VenueListEntry => self.venue_list_entries.get(&id).map(|row| row.created_at),
            Table::Menu => self.menus.get(&id).map(|row| row.created_at),
            Table::MenuItem => self.menu_items.get(&id).map(|row| row.created_at),
            Table::UserFavorite => self.favorites.get(&id).map(|row| row.created_at),
        }
    }

    fn row_count(&self, table: Table) -> usize {
        match table {
            Table::User => self.users.len(),
            Table::Venue => self.venues.len(),
            Table::VenueList => self.venue_lists.len(),
            Table::VenueListEntry => self.venue_list_entries.len(),
            Table::Menu => self.menus.len(),
            Table::MenuItem => self.menu_items.len(),
            Table::UserFavorite => self.favorites.len(),
        }
    }

    fn venue(&self, key: &LookupKey) -> Option<&Venue> {
        match key {
            LookupKey::Id(id) => self.venues.get(id).map(|row| &row.value),
            LookupKey::Name(name) => self
                .venues
                .values()
                .map(|row| &row.value)
                .find(|venue| &venue.name == name),
        }
    }

    fn venue_list(&self, key: &LookupKey) -> Option<&VenueList> {
        match key {
            LookupKey::Id(id) => self.venue_lists.get(id).map(|row| &row.value),
            LookupKey::Name(name) => self
                .venue_lists
                .values()
                .map(|row| &row.value)
                .find(|list| &list.name == name),
        }
    }

    fn favorite_venue(&self, favorite_id: i64, favorite: &NewUserFavorite) -> Option<FavoriteVenue> {
        self.venues.get(&favorite.venue_id).map(|row| FavoriteVenue {
            favorite_id,
            venue: row.value.clone(),
        })
    }
}

#[derive(Debug, Default)]
struct Faults {
    begin: VecDeque<StoreError>,
    statements: HashMap<&'static str, VecDeque<StoreError>>,
    commit: VecDeque<StoreError>,
    rollback: VecDeque<StoreError>,
}

#[derive(Debug, Default)]
struct Calls {
    begins: u32,
    commits: u32,
    rollbacks: u32,
    statements: HashMap<&'static str, u32>,
}

#[derive(Debug, Default)]
struct Shared {
    committed: Tables,
    version: u64,
    sequences: HashMap<Table, i64>,
    faults: Faults,
    calls: Calls,
}

impl Shared {
    fn next_id(&mut self, table: Table) -> i64 {
        let next = self.sequences.entry(table).or_insert(0);
        *next += 1;
        *next
    }
}

/// In-memory [`TransactionalStore`]; clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    shared: Arc<Mutex<Shared>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fail the next `times` calls to `begin` with `error`.
    pub fn fail_begin(&self, error: StoreError, times: usize) {
        self.lock().faults.begin.extend(std::iter::repeat_n(error, times));
    }

    /// Fail the next `times` executions of `statement` with `error`.
    ///
    /// Statement names match the [`StoreTransaction`] method names.
    pub fn fail_statement(&self, statement: &'static str, error: StoreError, times: usize) {
        self.lock()
            .faults
            .statements
            .entry(statement)
            .or_default()
            .extend(std::iter::repeat_n(error, times));
    }

    /// Fail the next `times` commits with `error`.
    pub fn fail_commit(&self, error: StoreError, times: usize) {
        self.lock().faults.commit.extend(std::iter::repeat_n(error, times));
    }

    /// Fail the next `times` rollbacks with `error`. The snapshot is still discarded.
    pub fn fail_rollback(&self, error: StoreError, times: usize) {
        self.lock()
            .faults
            .rollback
            .extend(std::iter::repeat_n(error, times));
    }

    /// Transactions opened, including failed `begin` calls.
    pub fn begin_count(&self) -> u32 {
        self.lock().calls.begins
    }

    /// Transactions that committed.
    pub fn commit_count(&self) -> u32 {
        self.lock().calls.commits
    }

    pub fn rollback_count(&self) -> u32 {
        self.lock().calls.rollbacks
    }

    /// Executions of `statement`, including failed ones.
    pub fn statement_count(&self, statement: &str) -> u32 {
        self.lock()
            .calls
            .statements
            .get(statement)
            .copied()
            .unwrap_or(0)
    }

    /// Committed rows in `table`.
    pub fn row_count(&self, table: Table) -> usize {
        self.lock().committed.row_count(table)
    }

    /// Creation timestamp of a committed row.
    pub fn created_at(&self, table: Table, id: i64) -> Option<DateTime<Utc>> {
        self.lock().committed.created_at(table, id)
    }
}

#[async_trait]
impl TransactionalStore for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError> {
        let mut shared = self.lock();
        shared.calls.begins += 1;
        if let Some(error) = shared.faults.begin.pop_front() {
            return Err(error);
        }
        Ok(Box::new(InMemoryTransaction {
            shared: Arc::clone(&self.shared),
            snapshot: shared.committed.clone(),
            base_version: shared.version,
            dirty: false,
        }))
    }
}

struct InMemoryTransaction {
    shared: Arc<Mutex<Shared>>,
    snapshot: Tables,
    base_version: u64,
    dirty: bool,
}

impl InMemoryTransaction {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the call and surface any queued fault for it.
    fn enter(&self, statement: &'static str) -> Result<(), StoreError> {
        let mut shared = self.lock();
        *shared.calls.statements.entry(statement).or_insert(0) += 1;
        match shared
            .faults
            .statements
            .get_mut(statement)
            .and_then(VecDeque::pop_front)
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn next_id(&mut self, table: Table) -> i64 {
        self.dirty = true;
        self.lock().next_id(table)
    }

    fn require_venue(&self, venue_id: i64, constraint: &str) -> Result<(), StoreError> {
        if self.snapshot.venues.contains_key(&venue_id) {
            Ok(())
        } else {
            Err(StoreError::missing_reference(format!(
                "{constraint}: venue {venue_id} does not exist"
            )))
        }
    }
}

#[async_trait]
impl StoreTransaction for InMemoryTransaction {
    async fn insert_user(
        &mut self,
        user: &NewUser,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        self.enter("insert_user")?;
        if self
            .snapshot
            .users
            .values()
            .any(|row| row.value.username == user.username)
        {
            return Err(StoreError::unique_violation("user_username_key"));
        }
        let id = self.next_id(Table::User);
        let value = user.clone().into_user(id);
        self.snapshot.users.insert(id, Row { value, created_at });
        Ok(id)
    }

    async fn find_user_by_username(
        &mut self,
        username: &str,
    ) -> Result<Option<User>, StoreError> {
        self.enter("find_user_by_username")?;
        Ok(self
            .snapshot
            .users
            .values()
            .map(|row| &row.value)
            .find(|user| user.username == username)
            .cloned())
    }

    async fn insert_venue(
        &mut self,
        venue: &NewVenue,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        self.enter("insert_venue")?;
        if self
            .snapshot
            .venue(&LookupKey::Name(venue.name.clone()))
            .is_some()
        {
            return Err(StoreError::unique_violation("venue_name_key"));
        }
        let id = self.next_id(Table::Venue);
        let value = venue.clone().into_venue(id);
        self.snapshot.venues.insert(id, Row { value, created_at });
        Ok(id)
    }

    async fn find_venue(&mut self, key: &LookupKey) -> Result<Venue, StoreError> {
        self.enter("find_venue")?;
        self.snapshot
            .venue(key)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("venue {key}")))
    }

    async fn insert_venue_list(
        &mut self,
        list: &NewVenueList,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        self.enter("insert_venue_list")?;
        if self
            .snapshot
            .venue_list(&LookupKey::Name(list.name.clone()))
            .is_some()
        {
            return Err(StoreError::unique_violation("venue_list_name_key"));
        }
        let id = self.next_id(Table::VenueList);
        let value = VenueList {
            id,
            name: list.name.clone(),
        };
        self.snapshot.venue_lists.insert(id, Row { value, created_at });
        Ok(id)
    }

    async fn find_venue_list(&mut self, key: &LookupKey) -> Result<VenueList, StoreError> {
        self.enter("find_venue_list")?;
        self.snapshot
            .venue_list(key)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("venue list {key}")))
    }

    async fn insert_venue_list_entry(
        &mut self,
        venue_id: i64,
        venue_list_id: i64,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        self.enter("insert_venue_list_entry")?;
        self.require_venue(venue_id, "venue_lists_venue_id_fkey")?;
        if !self.snapshot.venue_lists.contains_key(&venue_list_id) {
            return Err(StoreError::missing_reference(format!(
                "venue_lists_venue_list_id_fkey: venue list {venue_list_id} does not exist"
            )));
        }
        if self.snapshot.venue_list_entries.values().any(|row| {
            row.value.venue_id == venue_id && row.value.venue_list_id == venue_list_id
        }) {
            return Err(StoreError::unique_violation(
                "venue_lists_venue_id_venue_list_id_key",
            ));
        }
        let id = self.next_id(Table::VenueListEntry);
        let value = ListEntry {
            venue_id,
            venue_list_id,
        };
        self.snapshot
            .venue_list_entries
            .insert(id, Row { value, created_at });
        Ok(id)
    }

    async fn venues_by_list(&mut self, venue_list_id: i64) -> Result<Vec<Venue>, StoreError> {
        self.enter("venues_by_list")?;
        Ok(self
            .snapshot
            .venue_list_entries
            .values()
            .filter(|row| row.value.venue_list_id == venue_list_id)
            .filter_map(|row| self.snapshot.venues.get(&row.value.venue_id))
            .map(|row| row.value.clone())
            .collect())
    }

    async fn insert_menu(
        &mut self,
        menu: &NewMenu,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        self.enter("insert_menu")?;
        self.require_venue(menu.venue_id, "menu_venue_id_fkey")?;
        if self
            .snapshot
            .menus
            .values()
            .any(|row| row.value.venue_id == menu.venue_id)
        {
            return Err(StoreError::unique_violation("menu_venue_id_key"));
        }
        let id = self.next_id(Table::Menu);
        let value = Menu {
            id,
            venue_id: menu.venue_id,
        };
        self.snapshot.menus.insert(id, Row { value, created_at });
        Ok(id)
    }

    async fn insert_menu_item(
        &mut self,
        item: &NewMenuItem,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        self.enter("insert_menu_item")?;
        if !self.snapshot.menus.contains_key(&item.menu_id) {
            return Err(StoreError::missing_reference(format!(
                "menu_item_menu_id_fkey: menu {} does not exist",
                item.menu_id
            )));
        }
        let id = self.next_id(Table::MenuItem);
        let value = item.clone().into_menu_item(id);
        self.snapshot.menu_items.insert(id, Row { value, created_at });
        Ok(id)
    }

    async fn menu_items_for_venue(&mut self, venue_id: i64) -> Result<Vec<MenuItem>, StoreError> {
        self.enter("menu_items_for_venue")?;
        let menus = &self.snapshot.menus;
        Ok(self
            .snapshot
            .menu_items
            .values()
            .filter(|row| {
                menus
                    .get(&row.value.menu_id)
                    .is_some_and(|menu| menu.value.venue_id == venue_id)
            })
            .map(|row| row.value.clone())
            .collect())
    }

    async fn insert_user_favorite(
        &mut self,
        favorite: &NewUserFavorite,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        self.enter("insert_user_favorite")?;
        if !self.snapshot.users.contains_key(&favorite.user_id) {
            return Err(StoreError::missing_reference(format!(
                "user_favorites_user_id_fkey: user {} does not exist",
                favorite.user_id
            )));
        }
        self.require_venue(favorite.venue_id, "user_favorites_venue_id_fkey")?;
        if self.snapshot.favorites.values().any(|row| {
            row.value.user_id == favorite.user_id && row.value.venue_id == favorite.venue_id
        }) {
            return Err(StoreError::unique_violation(
                "user_favorites_user_id_venue_id_key",
            ));
        }
        let id = self.next_id(Table::UserFavorite);
        self.snapshot.favorites.insert(
            id,
            Row {
                value: *favorite,
                created_at,
            },
        );
        Ok(id)
    }

    async fn favorites_for_user(
        &mut self,
        user_id: i64,
    ) -> Result<Vec<FavoriteVenue>, StoreError> {
        self.enter("favorites_for_user")?;
        Ok(self
            .snapshot
            .favorites
            .iter()
            .filter(|(_, row)| row.value.user_id == user_id)
            .filter_map(|(id, row)| self.snapshot.favorite_venue(*id, &row.value))
            .collect())
    }

    async fn favorite_for(
        &mut self,
        user_id: i64,
        venue_id: i64,
    ) -> Result<FavoriteVenue, StoreError> {
        self.enter("favorite_for")?;
        self.snapshot
            .favorites
            .iter()
            .filter(|(_, row)| row.value.user_id == user_id && row.value.venue_id == venue_id)
            .find_map(|(id, row)| self.snapshot.favorite_venue(*id, &row.value))
            .ok_or_else(|| {
                StoreError::not_found(format!("favorite of venue {venue_id} by user {user_id}"))
            })
    }

    async fn delete_user_favorite(&mut self, favorite_id: i64) -> Result<u64, StoreError> {
        self.enter("delete_user_favorite")?;
        match self.snapshot.favorites.remove(&favorite_id) {
            Some(_) => {
                self.dirty = true;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        let mut shared = self.shared.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(error) = shared.faults.commit.pop_front() {
            return Err(error);
        }
        if self.dirty {
            if shared.version != self.base_version {
                return Err(StoreError::query(
                    "could not serialize access due to concurrent update",
                ));
            }
            shared.committed = std::mem::take(&mut self.snapshot);
            shared.version += 1;
        }
        shared.calls.commits += 1;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        self.snapshot = Tables::default();
        self.dirty = false;
        let mut shared = self.lock();
        shared.calls.rollbacks += 1;
        shared.faults.rollback.pop_front().map_or(Ok(()), Err)
    }
}
