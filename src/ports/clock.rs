//! Clock port - the single source of "now".
//!
//! Every component that needs the current instant receives a `Clock` at
//! construction so tests can pin time with a fixed implementation.

use crate::domain::foundation::Timestamp;

/// Port for reading the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}
