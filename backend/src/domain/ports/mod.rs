//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod directory;
mod store;

#[cfg(test)]
pub use directory::MockDirectory;
pub use directory::Directory;
#[cfg(test)]
pub use store::MockTransactionalStore;
pub use store::{StoreError, StoreTransaction, TransactionalStore};
