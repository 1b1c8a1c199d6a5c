//! User accounts.
//!
//! Password credentials arrive already hashed; the hashing scheme belongs to
//! the caller. The directory only stores and returns the opaque hash.

use std::fmt;

use zeroize::Zeroizing;

use super::error::RepositoryError;

/// Opaque hashed password credential.
///
/// The buffer is wiped on drop and never printed by `Debug`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PasswordHash(Zeroizing<String>);

impl PasswordHash {
    /// Wrap an already-hashed credential.
    pub fn new(hash: impl Into<String>) -> Self {
        Self(Zeroizing::new(hash.into()))
    }

    /// Borrow the hash for persistence or verification.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Whether no credential was supplied.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// A persisted user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Store-generated identifier.
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// Hashed password credential.
    pub password: PasswordHash,
    /// Contact email.
    pub email: String,
    /// Optional given name.
    pub first_name: Option<String>,
    /// Optional family name.
    pub last_name: Option<String>,
}

/// Values required to register a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    /// Unique login name.
    pub username: String,
    /// Hashed password credential.
    pub password: PasswordHash,
    /// Contact email.
    pub email: String,
    /// Optional given name.
    pub first_name: Option<String>,
    /// Optional family name.
    pub last_name: Option<String>,
}

impl NewUser {
    /// Reject registrations that omit a required field.
    ///
    /// Every missing field is reported, in `username`, `password`, `email`
    /// order.
    ///
    /// # Examples
    /// ```
    /// use venue_directory::domain::{NewUser, PasswordHash};
    ///
    /// let user = NewUser {
    ///     username: "kern".to_owned(),
    ///     password: PasswordHash::new("$2b$10$abc"),
    ///     email: String::new(),
    ///     ..NewUser::default()
    /// };
    /// let err = user.validate().expect_err("email is missing");
    /// assert!(err.to_string().contains("email is a required field"));
    /// ```
    pub fn validate(&self) -> Result<(), RepositoryError> {
        let missing: Vec<&str> = [
            ("username", self.username.is_empty()),
            ("password", self.password.is_empty()),
            ("email", self.email.is_empty()),
        ]
        .into_iter()
        .filter_map(|(field, is_missing)| is_missing.then_some(field))
        .collect();

        if missing.is_empty() {
            return Ok(());
        }
        let message = missing
            .iter()
            .map(|field| format!("{field} is a required field."))
            .collect::<Vec<_>>()
            .join(" ");
        Err(RepositoryError::input_invalid(message))
    }

    /// Attach the store-assigned id, producing the persisted form.
    pub fn into_user(self, id: i64) -> User {
        let Self {
            username,
            password,
            email,
            first_name,
            last_name,
        } = self;
        User {
            id,
            username,
            password,
            email,
            first_name,
            last_name,
        }
    }
}

/// Lookup of a user by login name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    /// Login name to match exactly.
    pub username: String,
}

impl UserQuery {
    /// Build a query for `username`.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Registration validation and credential redaction.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn complete_user() -> NewUser {
        NewUser {
            username: "kernkw".to_owned(),
            password: PasswordHash::new("$2b$10$hash"),
            email: "kern@example.com".to_owned(),
            first_name: Some("Kern".to_owned()),
            last_name: None,
        }
    }

    #[rstest]
    fn complete_user_passes_validation(complete_user: NewUser) {
        assert!(complete_user.validate().is_ok());
    }

    #[rstest]
    fn validation_lists_every_missing_field() {
        let err = NewUser::default()
            .validate()
            .expect_err("empty registration is invalid");
        assert_eq!(
            err,
            RepositoryError::input_invalid(
                "username is a required field. password is a required field. \
                 email is a required field."
            )
        );
    }

    #[rstest]
    fn password_hash_is_redacted_in_debug(complete_user: NewUser) {
        let rendered = format!("{complete_user:?}");
        assert!(!rendered.contains("$2b$10$hash"));
        assert!(rendered.contains("<redacted>"));
    }

    #[rstest]
    fn into_user_keeps_every_field(complete_user: NewUser) {
        let user = complete_user.clone().into_user(9);
        assert_eq!(user.id, 9);
        assert_eq!(user.username, complete_user.username);
        assert_eq!(user.password.expose(), "$2b$10$hash");
        assert_eq!(user.first_name.as_deref(), Some("Kern"));
    }
}
