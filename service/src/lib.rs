use config::Config;
use entity_api::{IdentityProvider, MeetingStore, NotificationStore, TeamStore};
use std::sync::Arc;

pub mod config;
pub mod logging;

// Service-level state: configuration plus the external collaborators.
// Each collaborator is held separately so tests can swap in a failing one.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    teams: Arc<dyn TeamStore>,
    meetings: Arc<dyn MeetingStore>,
    notifications: Arc<dyn NotificationStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(
        app_config: Config,
        teams: Arc<dyn TeamStore>,
        meetings: Arc<dyn MeetingStore>,
        notifications: Arc<dyn NotificationStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            config: app_config,
            teams,
            meetings,
            notifications,
            identity,
        }
    }

    /// Uses one backend for every collaborator.
    pub fn with_store<S>(app_config: Config, store: Arc<S>) -> Self
    where
        S: TeamStore + MeetingStore + NotificationStore + IdentityProvider + 'static,
    {
        Self::new(
            app_config,
            store.clone(),
            store.clone(),
            store.clone(),
            store,
        )
    }

    pub fn teams(&self) -> &dyn TeamStore {
        self.teams.as_ref()
    }

    pub fn meetings(&self) -> &dyn MeetingStore {
        self.meetings.as_ref()
    }

    pub fn notifications(&self) -> &dyn NotificationStore {
        self.notifications.as_ref()
    }

    pub fn identity(&self) -> &dyn IdentityProvider {
        self.identity.as_ref()
    }

    pub fn notifications_handle(&self) -> Arc<dyn NotificationStore> {
        Arc::clone(&self.notifications)
    }

    pub fn set_team_store(&mut self, teams: Arc<dyn TeamStore>) {
        self.teams = teams;
    }

    pub fn set_meeting_store(&mut self, meetings: Arc<dyn MeetingStore>) {
        self.meetings = meetings;
    }

    pub fn set_notification_store(&mut self, notifications: Arc<dyn NotificationStore>) {
        self.notifications = notifications;
    }

    pub fn set_identity_provider(&mut self, identity: Arc<dyn IdentityProvider>) {
        self.identity = identity;
    }
}
