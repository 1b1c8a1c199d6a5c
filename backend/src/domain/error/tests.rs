//! Tests for repository error formatting and source chaining.

use std::error::Error as _;

use super::*;
use rstest::{fixture, rstest};

#[fixture]
fn unique_violation() -> StoreError {
    StoreError::unique_violation("venue_name_key")
}

#[rstest]
fn duplicate_keeps_store_error_as_source(unique_violation: StoreError) {
    let err = RepositoryError::duplicate("create_venue", unique_violation.clone());

    assert_eq!(err.to_string(), "create_venue: duplicate entry");
    let source = err.source().expect("duplicate carries a source");
    assert_eq!(source.to_string(), unique_violation.to_string());
}

#[rstest]
fn retries_exhausted_names_the_budget_marker() {
    let err = RepositoryError::retries_exhausted(
        "venue_get",
        4,
        StoreError::connection("connection reset by peer"),
    );

    let message = err.to_string();
    assert!(message.contains("maximum number of retries exceeded"));
    assert!(message.contains("4 attempts"));
    assert!(message.contains("connection reset by peer"));
}

#[rstest]
#[case(Reference::VenueList, LookupKey::Name("Downtown".to_owned()), "venue list 'Downtown' not found")]
#[case(Reference::Venue, LookupKey::Id(12), "venue with id 12 not found")]
fn reference_unresolved_identifies_the_reference(
    #[case] reference: Reference,
    #[case] key: LookupKey,
    #[case] expected: &str,
) {
    let inner = RepositoryError::not_found("venue_get", StoreError::not_found("record not found"));
    let err = RepositoryError::reference_unresolved(reference, key, inner.clone());

    assert_eq!(err.to_string(), expected);
    let source = err.source().expect("resolution failure is chained");
    assert_eq!(source.to_string(), inner.to_string());
}

#[rstest]
fn only_exhausted_retries_are_not_permanent(unique_violation: StoreError) {
    assert!(RepositoryError::input_invalid("missing").is_permanent());
    assert!(RepositoryError::duplicate("create_user", unique_violation).is_permanent());
    assert!(
        !RepositoryError::retries_exhausted("create_user", 4, StoreError::connection("down"))
            .is_permanent()
    );
}
