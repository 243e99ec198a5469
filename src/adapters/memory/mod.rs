//! In-memory store adapter.
//!
//! Backs every repository port and the unit of work with process-local
//! maps. Used by the binary and by tests.

mod store;

pub use store::InMemoryCadenceStore;
