//! User favorites: a user's bookmarked venues.

use serde::{Deserialize, Serialize};

use super::venue::Venue;

/// Values required to favorite a venue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUserFavorite {
    /// Owning user.
    pub user_id: i64,
    /// Favorited venue.
    pub venue_id: i64,
}

/// Lookup of every venue a user has favorited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFavoritesQuery {
    /// Owning user.
    pub user_id: i64,
}

/// Lookup of one favorite by its (user, venue) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteQuery {
    /// Owning user.
    pub user_id: i64,
    /// Favorited venue.
    pub venue_id: i64,
}

/// A favorited venue together with the favorite's own id.
///
/// The favorite id is what [`user_favorites_delete`] expects.
///
/// [`user_favorites_delete`]: crate::domain::ports::Directory::user_favorites_delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteVenue {
    /// Identifier of the favorite association.
    pub favorite_id: i64,
    /// The favorited venue.
    #[serde(flatten)]
    pub venue: Venue,
}
