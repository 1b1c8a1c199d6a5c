//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered users. `user` is a reserved word, so Diesel quotes it.
    user (id) {
        id -> Int8,
        username -> Varchar,
        /// Opaque password hash supplied by the caller.
        password -> Varchar,
        email -> Varchar,
        first_name -> Nullable<Varchar>,
        last_name -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    venue (id) {
        id -> Int8,
        name -> Varchar,
        address -> Varchar,
        address2 -> Nullable<Varchar>,
        city -> Varchar,
        state -> Varchar,
        zip -> Varchar,
        country -> Varchar,
        image -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    venue_list (id) {
        id -> Int8,
        name -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Venue list membership; `(venue_id, venue_list_id)` is unique.
    venue_lists (id) {
        id -> Int8,
        venue_id -> Int8,
        venue_list_id -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One menu per venue; `venue_id` is unique.
    menu (id) {
        id -> Int8,
        venue_id -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    menu_item (id) {
        id -> Int8,
        menu_id -> Int8,
        category -> Varchar,
        /// Price in whole cents; never negative.
        price_cents -> Int8,
        description -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Favorited venues; `(user_id, venue_id)` is unique.
    user_favorites (id) {
        id -> Int8,
        user_id -> Int8,
        venue_id -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(venue_lists -> venue (venue_id));
diesel::joinable!(venue_lists -> venue_list (venue_list_id));
diesel::joinable!(menu -> venue (venue_id));
diesel::joinable!(menu_item -> menu (menu_id));
diesel::joinable!(user_favorites -> user (user_id));
diesel::joinable!(user_favorites -> venue (venue_id));

diesel::allow_tables_to_appear_in_same_query!(
    user,
    venue,
    venue_list,
    venue_lists,
    menu,
    menu_item,
    user_favorites,
);
