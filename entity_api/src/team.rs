//! Persistence contract for team documents.

use async_trait::async_trait;
use entity::{teams, Id};
#[cfg(feature = "mock")]
use mockall::automock;

use super::error::Error;

/// Team persistence collaborator. Members are embedded in the team document,
/// so member operations rewrite a single document.
#[cfg_attr(feature = "mock", automock)]
#[async_trait]
pub trait TeamStore: Send + Sync {
    /// Persists a new team and returns its id.
    async fn create_team(&self, team: teams::Model) -> Result<Id, Error>;

    async fn get_team_by_id(&self, team_id: Id) -> Result<Option<teams::Model>, Error>;

    /// Replaces the stored team document. Returns `false` when the team does not exist.
    async fn update_team(&self, team: &teams::Model) -> Result<bool, Error>;

    async fn add_team_member(&self, team_id: Id, member: teams::Member) -> Result<bool, Error>;

    /// Replaces the member keyed by `user_id`, which may re-key the record.
    async fn update_team_member(
        &self,
        team_id: Id,
        user_id: Id,
        member: teams::Member,
    ) -> Result<bool, Error>;

    async fn remove_team_member(&self, team_id: Id, user_id: Id) -> Result<bool, Error>;
}
