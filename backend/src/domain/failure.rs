//! Retry eligibility of raw store failures.
//!
//! [`classify`] is the only place that decides whether a failed attempt may
//! be retried. Adapters are expected to report structured variants; the
//! message fallback for [`StoreError::Query`] exists for drivers that flatten
//! constraint errors into text, and matches English server messages only.

use super::ports::StoreError;

/// Outcome of classifying one failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    /// A uniqueness constraint rejected the write. Never retried.
    PermanentDuplicate,
    /// The targeted or referenced row does not exist. Never retried.
    PermanentNotFound,
    /// Anything else; retried while the budget allows.
    Transient,
}

impl FailureClass {
    /// Whether a retry could change the outcome.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Transient)
    }
}

const DUPLICATE_MARKERS: [&str; 3] = ["duplicate key", "duplicate entry", "unique constraint"];
const NOT_FOUND_MARKERS: [&str; 1] = ["no rows"];

/// Label a store failure.
///
/// ```rust
/// use venue_directory::domain::failure::{classify, FailureClass};
/// use venue_directory::domain::ports::StoreError;
///
/// let err = StoreError::query("Duplicate entry 'Panzano' for key 'name'");
/// assert_eq!(classify(&err), FailureClass::PermanentDuplicate);
/// assert_eq!(classify(&StoreError::connection("reset")), FailureClass::Transient);
/// ```
pub fn classify(error: &StoreError) -> FailureClass {
    match error {
        StoreError::UniqueViolation { .. } => FailureClass::PermanentDuplicate,
        StoreError::NotFound { .. } | StoreError::MissingReference { .. } => {
            FailureClass::PermanentNotFound
        }
        StoreError::Connection { .. } => FailureClass::Transient,
        StoreError::Query { message } => classify_message(message),
    }
}

fn classify_message(message: &str) -> FailureClass {
    let message = message.to_ascii_lowercase();
    if DUPLICATE_MARKERS.iter().any(|marker| message.contains(marker)) {
        FailureClass::PermanentDuplicate
    } else if NOT_FOUND_MARKERS.iter().any(|marker| message.contains(marker)) {
        FailureClass::PermanentNotFound
    } else {
        FailureClass::Transient
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StoreError::unique_violation("user_username_key"), FailureClass::PermanentDuplicate)]
    #[case(StoreError::not_found("record not found"), FailureClass::PermanentNotFound)]
    #[case(StoreError::missing_reference("menu_venue_id_fkey"), FailureClass::PermanentNotFound)]
    #[case(StoreError::connection("connection reset by peer"), FailureClass::Transient)]
    fn structured_variants(#[case] error: StoreError, #[case] expected: FailureClass) {
        assert_eq!(classify(&error), expected);
    }

    #[rstest]
    #[case("duplicate key value violates unique constraint \"venue_name_key\"")]
    #[case("Error 1062: Duplicate entry 'Panzano' for key 'name'")]
    #[case("UNIQUE constraint failed: venue.name")]
    fn duplicate_messages(#[case] message: &str) {
        assert_eq!(
            classify(&StoreError::query(message)),
            FailureClass::PermanentDuplicate
        );
    }

    #[rstest]
    fn no_rows_message_is_not_found() {
        assert_eq!(
            classify(&StoreError::query("sql: no rows in result set")),
            FailureClass::PermanentNotFound
        );
    }

    #[rstest]
    #[case("could not serialize access due to concurrent update")]
    #[case("deadlock detected")]
    #[case("")]
    fn other_messages_are_transient(#[case] message: &str) {
        let class = classify(&StoreError::query(message));
        assert_eq!(class, FailureClass::Transient);
        assert!(class.is_retryable());
    }
}
