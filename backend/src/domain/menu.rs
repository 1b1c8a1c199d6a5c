//! Venue menus and their priced items.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Validation errors returned when constructing a [`Price`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceValidationError {
    Negative,
    Empty,
    Malformed,
    TooManyFractionDigits,
    TooLarge,
}

impl fmt::Display for PriceValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Negative => write!(f, "price must not be negative"),
            Self::Empty => write!(f, "price must not be empty"),
            Self::Malformed => write!(f, "price must be a decimal number such as 5.00"),
            Self::TooManyFractionDigits => write!(f, "price allows at most two fraction digits"),
            Self::TooLarge => write!(f, "price is too large"),
        }
    }
}

impl std::error::Error for PriceValidationError {}

/// Non-negative price with two fraction digits, held as whole cents.
///
/// Serialises as a decimal string (`"5.00"`).
///
/// # Examples
/// ```
/// use venue_directory::domain::Price;
///
/// let price: Price = "5".parse().expect("valid price");
/// assert_eq!(price.cents(), 500);
/// assert_eq!(price.to_string(), "5.00");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Price(i64);

impl Price {
    /// Validate and construct a price from whole cents.
    pub fn from_cents(cents: i64) -> Result<Self, PriceValidationError> {
        if cents < 0 {
            return Err(PriceValidationError::Negative);
        }
        Ok(Self(cents))
    }

    /// Price in whole cents.
    pub fn cents(self) -> i64 {
        self.0
    }
}

impl FromStr for Price {
    type Err = PriceValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(PriceValidationError::Empty);
        }
        if raw.starts_with('-') {
            return Err(PriceValidationError::Negative);
        }

        let (whole, fraction) = raw.split_once('.').unwrap_or((raw, ""));
        let is_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if whole.is_empty() || !is_digits(whole) || !is_digits(fraction) {
            return Err(PriceValidationError::Malformed);
        }
        if fraction.len() > 2 {
            return Err(PriceValidationError::TooManyFractionDigits);
        }

        let whole: i64 = whole.parse().map_err(|_| PriceValidationError::TooLarge)?;
        let fraction_cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| PriceValidationError::Malformed)? * 10,
            _ => fraction.parse().map_err(|_| PriceValidationError::Malformed)?,
        };
        let cents = whole
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(fraction_cents))
            .ok_or(PriceValidationError::TooLarge)?;
        Self::from_cents(cents)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl From<Price> for String {
    fn from(value: Price) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Price {
    type Error = PriceValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A venue's menu. Each venue owns at most one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    /// Store-generated identifier.
    pub id: i64,
    /// Owning venue.
    pub venue_id: i64,
}

/// Values required to create a menu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMenu {
    /// Owning venue.
    pub venue_id: i64,
}

/// One priced entry on a menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Store-generated identifier.
    pub id: i64,
    /// Owning menu.
    pub menu_id: i64,
    /// Grouping such as "Drink" or "Food".
    pub category: String,
    /// Item price.
    pub price: Price,
    /// Free-form description.
    pub description: String,
}

/// Values required to add an item to a menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMenuItem {
    /// Owning menu.
    pub menu_id: i64,
    /// Grouping such as "Drink" or "Food".
    pub category: String,
    /// Item price.
    pub price: Price,
    /// Free-form description.
    pub description: String,
}

impl NewMenuItem {
    /// Attach the store-assigned id, producing the persisted form.
    pub fn into_menu_item(self, id: i64) -> MenuItem {
        let Self {
            menu_id,
            category,
            price,
            description,
        } = self;
        MenuItem {
            id,
            menu_id,
            category,
            price,
            description,
        }
    }
}

/// Lookup of every menu item offered by a venue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuQuery {
    /// Venue whose menu items are listed.
    pub venue_id: i64,
}
