use async_trait::async_trait;
use entity::users;
#[cfg(feature = "mock")]
use mockall::automock;

use super::error::Error;

/// Identity collaborator used to resolve invitees.
#[cfg_attr(feature = "mock", automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn search_user_by_email(&self, email: &str) -> Result<Option<users::Model>, Error>;
}
