//! User repository port.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::user::User;

/// Repository port for the local player.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find the local player.
    ///
    /// Returns `None` before the first objective is ever completed.
    async fn find_current(&self) -> Result<Option<User>, DomainError>;
}
