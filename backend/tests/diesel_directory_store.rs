//! Integration tests for `DieselDirectoryStore` against embedded PostgreSQL.
//!
//! Each test starts its own cluster, creates a database, and applies the
//! crate's migrations. Set `SKIP_TEST_CLUSTER=1` where no cluster can start.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use pg_embedded_setup_unpriv::TestCluster;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;
use venue_directory::domain::ports::{StoreError, StoreTransaction, TransactionalStore};
use venue_directory::domain::{
    LookupKey, MenuQuery, NewMenu, NewMenuItem, NewUser, NewUserFavorite, NewVenue, NewVenueList,
    PasswordHash, RetryConfig, UserFavoritesQuery, UserQuery, VenueListAddition, VenueLookup,
};
use venue_directory::outbound::persistence::{DbPool, DieselDirectoryStore, PoolConfig};
use venue_directory::test_support::FixedClock;
use venue_directory::{Directory, DirectoryRepository, RepositoryError};

#[path = "support/pg_embed.rs"]
mod pg_embed;

mod support;

use pg_embed::test_cluster;
use support::{handle_cluster_setup_failure, migrate_schema, reset_database};

const TEST_DB: &str = "diesel_directory_store_test";

struct TestContext {
    runtime: Runtime,
    _cluster: TestCluster,
    store: DieselDirectoryStore,
}

impl TestContext {
    fn directory(&self) -> DirectoryRepository {
        DirectoryRepository::new(
            Arc::new(self.store.clone()),
            Arc::new(FixedClock::noon()),
            RetryConfig::default(),
        )
    }

    fn begin(&self) -> Box<dyn StoreTransaction> {
        self.runtime
            .block_on(self.store.begin())
            .expect("transaction begins")
    }
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = test_cluster()?;
    let connection = cluster.connection();
    reset_database(&connection.database_url("postgres"), TEST_DB)
        .map_err(|err| err.to_string())?;
    let database_url = connection.database_url(TEST_DB);
    migrate_schema(&database_url).map_err(|err| err.to_string())?;

    let config = PoolConfig::new(&database_url)
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(async { DbPool::new(config).await })
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        _cluster: cluster,
        store: DieselDirectoryStore::new(pool),
    })
}

#[fixture]
fn store_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn now() -> DateTime<Utc> {
    FixedClock::noon().0
}

fn venue(name: &str) -> NewVenue {
    NewVenue {
        name: name.to_owned(),
        address: "909 17th St".to_owned(),
        city: "Denver".to_owned(),
        state: "CO".to_owned(),
        zip: "80202".to_owned(),
        country: "US".to_owned(),
        ..NewVenue::default()
    }
}

#[rstest]
fn panzano_scenario_round_trips_through_postgres(store_context: Option<TestContext>) {
    let Some(context) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: panzano_scenario_round_trips_through_postgres skipped");
        return;
    };
    let directory = context.directory();

    let (user_id, venue_id, menu_id, item_id, items) = context.runtime.block_on(async {
        let user_id = directory
            .create_user(NewUser {
                username: "ada".to_owned(),
                password: PasswordHash::new("$argon2id$v=19$stub"),
                email: "ada@example.com".to_owned(),
                ..NewUser::default()
            })
            .await
            .expect("user created");
        let venue_id = directory
            .create_venue(venue("Panzano"))
            .await
            .expect("venue created");
        let menu_id = directory
            .create_menu(NewMenu { venue_id })
            .await
            .expect("menu created");
        let item_id = directory
            .add_to_menu(NewMenuItem {
                menu_id,
                category: "Drink".to_owned(),
                price: "5.00".parse().expect("valid price"),
                description: "LOCAL DRAFT BEERS".to_owned(),
            })
            .await
            .expect("item added");
        let items = directory
            .menu_items_get(MenuQuery { venue_id })
            .await
            .expect("items listed");
        (user_id, venue_id, menu_id, item_id, items)
    });

    assert_eq!((user_id, venue_id, menu_id, item_id), (1, 1, 1, 1));
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].menu_id, menu_id);
    assert_eq!(items[0].price.cents(), 500);
    assert_eq!(items[0].description, "LOCAL DRAFT BEERS");
}

#[rstest]
fn quoted_user_table_round_trips(store_context: Option<TestContext>) {
    let Some(context) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: quoted_user_table_round_trips skipped");
        return;
    };
    let directory = context.directory();

    let (id, found, missing) = context.runtime.block_on(async {
        let id = directory
            .create_user(NewUser {
                username: "grace".to_owned(),
                password: PasswordHash::new("$argon2id$v=19$other"),
                email: "grace@example.com".to_owned(),
                last_name: Some("Hopper".to_owned()),
                ..NewUser::default()
            })
            .await
            .expect("user created");
        let found = directory
            .get_user(UserQuery {
                username: "grace".to_owned(),
            })
            .await
            .expect("lookup succeeds");
        let missing = directory
            .get_user(UserQuery {
                username: "nobody".to_owned(),
            })
            .await
            .expect("lookup succeeds");
        (id, found, missing)
    });

    let found = found.expect("user exists");
    assert_eq!(found.id, id);
    assert_eq!(found.password.expose(), "$argon2id$v=19$other");
    assert_eq!(found.first_name, None);
    assert_eq!(found.last_name.as_deref(), Some("Hopper"));
    assert!(missing.is_none());
}

#[rstest]
fn duplicate_name_is_a_unique_violation(store_context: Option<TestContext>) {
    let Some(context) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: duplicate_name_is_a_unique_violation skipped");
        return;
    };

    let mut tx = context.begin();
    let second = context.runtime.block_on(async {
        tx.insert_venue(&venue("Panzano"), now())
            .await
            .expect("first insert");
        let second = tx.insert_venue(&venue("Panzano"), now()).await;
        tx.rollback().await.expect("rollback");
        second
    });
    assert!(matches!(second, Err(StoreError::UniqueViolation { .. })));

    let directory = context.directory();
    let repeated = context.runtime.block_on(async {
        directory
            .create_venue(venue("Panzano"))
            .await
            .expect("venue created");
        directory.create_venue(venue("Panzano")).await
    });
    assert!(matches!(repeated, Err(RepositoryError::Duplicate { .. })));
}

#[rstest]
fn missing_parent_row_is_a_missing_reference(store_context: Option<TestContext>) {
    let Some(context) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: missing_parent_row_is_a_missing_reference skipped");
        return;
    };

    let mut tx = context.begin();
    let menu = context.runtime.block_on(async {
        let menu = tx.insert_menu(&NewMenu { venue_id: 999 }, now()).await;
        tx.rollback().await.expect("rollback");
        menu
    });
    assert!(matches!(menu, Err(StoreError::MissingReference { .. })));

    let directory = context.directory();
    let favorite = context.runtime.block_on(async {
        directory
            .create_user_favorite(NewUserFavorite {
                user_id: 7,
                venue_id: 8,
            })
            .await
    });
    assert!(matches!(favorite, Err(RepositoryError::NotFound { .. })));
}

#[rstest]
fn absent_rows_map_to_not_found_or_empty_reads(store_context: Option<TestContext>) {
    let Some(context) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: absent_rows_map_to_not_found_or_empty_reads skipped");
        return;
    };

    let mut tx = context.begin();
    let (venue, list, favorite, venues, items, favorites) = context.runtime.block_on(async {
        let venue = tx.find_venue(&LookupKey::Name("Nowhere".to_owned())).await;
        let list = tx.find_venue_list(&LookupKey::Id(42)).await;
        let favorite = tx.favorite_for(1, 1).await;
        let venues = tx.venues_by_list(42).await.expect("empty join");
        let items = tx.menu_items_for_venue(42).await.expect("empty join");
        let favorites = tx.favorites_for_user(42).await.expect("empty join");
        tx.commit().await.expect("commit");
        (venue, list, favorite, venues, items, favorites)
    });

    assert!(matches!(venue, Err(StoreError::NotFound { .. })));
    assert!(matches!(list, Err(StoreError::NotFound { .. })));
    assert!(matches!(favorite, Err(StoreError::NotFound { .. })));
    assert!(venues.is_empty());
    assert!(items.is_empty());
    assert!(favorites.is_empty());
}

#[rstest]
fn rolled_back_insert_is_not_visible(store_context: Option<TestContext>) {
    let Some(context) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: rolled_back_insert_is_not_visible skipped");
        return;
    };

    let mut writer = context.begin();
    context.runtime.block_on(async {
        writer
            .insert_venue(&venue("Linger"), now())
            .await
            .expect("insert");
        writer.rollback().await.expect("rollback");
    });

    let found = context.runtime.block_on(
        context
            .directory()
            .venue_get(VenueLookup::by_name("Linger")),
    );
    assert!(matches!(found, Err(RepositoryError::NotFound { .. })));
}

#[rstest]
fn list_membership_and_favorites_follow_insertion_order(store_context: Option<TestContext>) {
    let Some(context) = store_context else {
        eprintln!(
            "SKIP-TEST-CLUSTER: list_membership_and_favorites_follow_insertion_order skipped"
        );
        return;
    };
    let directory = context.directory();

    let (names, favorites, deleted_again) = context.runtime.block_on(async {
        let list_id = directory
            .create_venue_list(NewVenueList {
                name: "Date night".to_owned(),
            })
            .await
            .expect("list created");
        let user_id = directory
            .create_user(NewUser {
                username: "ada".to_owned(),
                password: PasswordHash::new("$argon2id$v=19$stub"),
                email: "ada@example.com".to_owned(),
                ..NewUser::default()
            })
            .await
            .expect("user created");
        for name in ["Panzano", "Tavernetta", "Guard and Grace"] {
            directory.create_venue(venue(name)).await.expect("venue");
        }
        for name in ["Guard and Grace", "Panzano"] {
            directory
                .venue_list_add(VenueListAddition {
                    venue_name: Some(name.to_owned()),
                    venue_list_id: Some(list_id),
                    ..VenueListAddition::default()
                })
                .await
                .expect("venue added");
        }
        for venue_id in [3, 1] {
            directory
                .create_user_favorite(NewUserFavorite { user_id, venue_id })
                .await
                .expect("favorite created");
        }

        let names: Vec<String> = directory
            .venues_by_list(list_id)
            .await
            .expect("venues listed")
            .into_iter()
            .map(|venue| venue.name)
            .collect();
        let favorites = directory
            .user_favorites_list(UserFavoritesQuery { user_id })
            .await
            .expect("favorites listed");

        let first = favorites.first().map(|favorite| favorite.favorite_id);
        if let Some(favorite_id) = first {
            directory
                .user_favorites_delete(favorite_id)
                .await
                .expect("deleted");
        }
        let mut tx = context.store.begin().await.expect("begin");
        let deleted_again = tx
            .delete_user_favorite(first.unwrap_or_default())
            .await
            .expect("delete runs");
        tx.commit().await.expect("commit");
        (names, favorites, deleted_again)
    });

    assert_eq!(names, ["Guard and Grace", "Panzano"]);
    let favorite_names: Vec<&str> = favorites
        .iter()
        .map(|favorite| favorite.venue.name.as_str())
        .collect();
    assert_eq!(favorite_names, ["Guard and Grace", "Panzano"]);
    assert_eq!(deleted_again, 0);
}
