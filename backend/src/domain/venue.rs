//! Venues and the named lists that group them.
//!
//! Lookups accept either a numeric id or a name. The id wins when both are
//! supplied; a zero id or an empty name counts as absent, matching the zero
//! values an inbound JSON decoder produces for omitted fields.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::RepositoryError;

/// A venue as persisted in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    /// Store-generated identifier.
    pub id: i64,
    /// Unique venue name.
    pub name: String,
    /// First address line.
    pub address: String,
    /// Optional second address line.
    pub address2: Option<String>,
    /// City.
    pub city: String,
    /// State or region.
    pub state: String,
    /// Postal code.
    pub zip: String,
    /// Country.
    pub country: String,
    /// Optional image reference.
    pub image: Option<String>,
}

/// Values required to create a venue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVenue {
    /// Unique venue name.
    pub name: String,
    /// First address line.
    pub address: String,
    /// Optional second address line.
    pub address2: Option<String>,
    /// City.
    pub city: String,
    /// State or region.
    pub state: String,
    /// Postal code.
    pub zip: String,
    /// Country.
    pub country: String,
    /// Optional image reference.
    pub image: Option<String>,
}

impl NewVenue {
    /// Attach the store-assigned id, producing the persisted form.
    pub fn into_venue(self, id: i64) -> Venue {
        let Self {
            name,
            address,
            address2,
            city,
            state,
            zip,
            country,
            image,
        } = self;
        Venue {
            id,
            name,
            address,
            address2,
            city,
            state,
            zip,
            country,
            image,
        }
    }
}

/// A named collection of venues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueList {
    /// Store-generated identifier.
    pub id: i64,
    /// Unique list name.
    pub name: String,
}

/// Values required to create a venue list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVenueList {
    /// Unique list name.
    pub name: String,
}

/// Resolved identifying field for a single-row lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LookupKey {
    /// Look the row up by its numeric id.
    Id(i64),
    /// Look the row up by its unique name.
    Name(String),
}

impl LookupKey {
    fn resolve(id: Option<i64>, name: Option<&str>, what: &str) -> Result<Self, RepositoryError> {
        match (id, name) {
            (Some(id), _) if id != 0 => Ok(Self::Id(id)),
            (_, Some(name)) if !name.is_empty() => Ok(Self::Name(name.to_owned())),
            _ => Err(RepositoryError::input_invalid(format!(
                "no {what} id or name provided"
            ))),
        }
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "with id {id}"),
            Self::Name(name) => write!(f, "'{name}'"),
        }
    }
}

/// Caller-supplied identification of a venue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueLookup {
    /// Venue id; preferred when non-zero.
    pub id: Option<i64>,
    /// Venue name; used when no id is supplied.
    pub name: Option<String>,
}

impl VenueLookup {
    /// Look a venue up by id.
    pub fn by_id(id: i64) -> Self {
        Self {
            id: Some(id),
            name: None,
        }
    }

    /// Look a venue up by name.
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }

    /// Pick the identifying field, rejecting lookups that carry neither.
    ///
    /// # Examples
    /// ```
    /// use venue_directory::domain::{LookupKey, VenueLookup};
    ///
    /// let key = VenueLookup::by_name("Panzano").key().expect("name is present");
    /// assert_eq!(key, LookupKey::Name("Panzano".to_owned()));
    /// assert!(VenueLookup::default().key().is_err());
    /// ```
    pub fn key(&self) -> Result<LookupKey, RepositoryError> {
        LookupKey::resolve(self.id, self.name.as_deref(), "venue")
    }
}

/// Caller-supplied identification of a venue list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueListLookup {
    /// List id; preferred when non-zero.
    pub id: Option<i64>,
    /// List name; used when no id is supplied.
    pub name: Option<String>,
}

impl VenueListLookup {
    /// Look a list up by id.
    pub fn by_id(id: i64) -> Self {
        Self {
            id: Some(id),
            name: None,
        }
    }

    /// Look a list up by name.
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }

    /// Pick the identifying field, rejecting lookups that carry neither.
    pub fn key(&self) -> Result<LookupKey, RepositoryError> {
        LookupKey::resolve(self.id, self.name.as_deref(), "venue list")
    }
}

/// Request to place a venue on a list; each side is identified by id or name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueListAddition {
    /// Venue id.
    pub venue_id: Option<i64>,
    /// Venue name.
    pub venue_name: Option<String>,
    /// Venue list id.
    pub venue_list_id: Option<i64>,
    /// Venue list name.
    pub venue_list_name: Option<String>,
}

impl VenueListAddition {
    /// The venue half of the addition.
    pub fn venue_lookup(&self) -> VenueLookup {
        VenueLookup {
            id: self.venue_id,
            name: self.venue_name.clone(),
        }
    }

    /// The list half of the addition.
    pub fn venue_list_lookup(&self) -> VenueListLookup {
        VenueListLookup {
            id: self.venue_list_id,
            name: self.venue_list_name.clone(),
        }
    }
}
