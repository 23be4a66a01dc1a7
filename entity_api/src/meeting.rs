//! Persistence contract for meeting documents.

use async_trait::async_trait;
use entity::{meetings, Id};
#[cfg(feature = "mock")]
use mockall::automock;

use super::error::Error;

/// Meeting persistence collaborator. Meetings live under their owner's scope,
/// so reads and writes are keyed by `owner_id` as well as the meeting id.
#[cfg_attr(feature = "mock", automock)]
#[async_trait]
pub trait MeetingStore: Send + Sync {
    async fn create_meeting(&self, meeting: meetings::Model) -> Result<Id, Error>;

    async fn get_meeting_by_id(
        &self,
        owner_id: Id,
        meeting_id: Id,
    ) -> Result<Option<meetings::Model>, Error>;

    /// Meetings the user owns plus meetings shared with teams they actively belong to,
    /// optionally restricted to one team.
    async fn get_user_meetings(
        &self,
        user_id: Id,
        team_id: Option<Id>,
    ) -> Result<Vec<meetings::Model>, Error>;

    /// Atomically replaces the meeting document in the owner's scope.
    async fn update_meeting(&self, owner_id: Id, meeting: &meetings::Model)
        -> Result<bool, Error>;
}
