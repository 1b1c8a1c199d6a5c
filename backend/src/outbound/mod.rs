//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! Adapters are thin translators between domain types and storage
//! representations. Retry, classification, and reference resolution live in
//! the domain; nothing here decides whether a failure is worth repeating.

pub mod persistence;
