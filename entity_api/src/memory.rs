//! In-memory implementation of every collaborator contract.
//!
//! Backs the seed binary and the domain tests. Documents are held in `DashMap`s keyed by id;
//! notification subscriptions use a dual index (subscription id and recipient id) so that
//! both unsubscribe and per-recipient pushes are O(1) lookups.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use entity::{meetings, notifications, teams, users, Id};
use log::*;
use std::collections::HashSet;
use std::sync::Arc;

use super::error::{EntityApiErrorKind, Error};
use super::meeting::MeetingStore;
use super::notification::{NotificationCallback, NotificationStore, Subscription};
use super::team::TeamStore;
use super::user::IdentityProvider;

#[derive(Default)]
struct SubscriptionRegistry {
    /// Primary storage: lookup by subscription id for cleanup
    subscriptions: DashMap<Id, (Id, NotificationCallback)>,
    /// Secondary index: subscription ids per recipient for pushes
    user_index: DashMap<Id, HashSet<Id>>,
}

impl SubscriptionRegistry {
    fn register(&self, user_id: Id, callback: NotificationCallback) -> Id {
        let subscription_id = Id::new_v4();
        self.subscriptions
            .insert(subscription_id, (user_id, callback));
        self.user_index
            .entry(user_id)
            .or_default()
            .insert(subscription_id);
        subscription_id
    }

    fn unregister(&self, subscription_id: &Id) {
        if let Some((_, (user_id, _))) = self.subscriptions.remove(subscription_id) {
            if let Some(mut entry) = self.user_index.get_mut(&user_id) {
                entry.remove(subscription_id);

                if entry.is_empty() {
                    drop(entry); // Release lock before removal
                    self.user_index.remove(&user_id);
                }
            }
        }
    }

    /// Clones the callbacks out so none of them run while a map shard is locked.
    fn callbacks_for(&self, user_id: &Id) -> Vec<NotificationCallback> {
        self.user_index
            .get(user_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.subscriptions.get(id).map(|s| Arc::clone(&s.1)))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn len(&self) -> usize {
        self.subscriptions.len()
    }
}

#[derive(Default)]
pub struct MemoryStore {
    teams: DashMap<Id, teams::Model>,
    meetings: DashMap<Id, meetings::Model>,
    notifications: DashMap<Id, notifications::Model>,
    /// Keyed by lowercased email
    users: DashMap<String, users::Model>,
    subscriptions: Arc<SubscriptionRegistry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user with the identity side of the store.
    pub fn insert_user(&self, user: users::Model) {
        self.users.insert(user.email.to_lowercase(), user);
    }

    pub fn active_subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    fn notifications_for(&self, user_id: Id) -> Vec<notifications::Model> {
        let mut list: Vec<notifications::Model> = self
            .notifications
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        list
    }

    fn push_to_subscribers(&self, user_id: Id) {
        let callbacks = self.subscriptions.callbacks_for(&user_id);
        if callbacks.is_empty() {
            return;
        }

        let snapshot = self.notifications_for(user_id);
        for callback in callbacks {
            callback(snapshot.clone());
        }
        debug!("Pushed notification snapshot to subscribers of user {user_id}");
    }

    fn is_active_member(&self, team_id: Id, user_id: Id) -> bool {
        self.teams
            .get(&team_id)
            .is_some_and(|team| team.active_member(user_id).is_some())
    }
}

#[async_trait]
impl TeamStore for MemoryStore {
    async fn create_team(&self, team: teams::Model) -> Result<Id, Error> {
        debug!("Creating team {} ({})", team.name, team.id);
        let id = team.id;
        self.teams.insert(id, team);
        Ok(id)
    }

    async fn get_team_by_id(&self, team_id: Id) -> Result<Option<teams::Model>, Error> {
        Ok(self.teams.get(&team_id).map(|team| team.value().clone()))
    }

    async fn update_team(&self, team: &teams::Model) -> Result<bool, Error> {
        match self.teams.get_mut(&team.id) {
            Some(mut existing) => {
                let mut updated = team.clone();
                updated.updated_at = Utc::now();
                *existing = updated;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn add_team_member(&self, team_id: Id, member: teams::Member) -> Result<bool, Error> {
        let Some(mut team) = self.teams.get_mut(&team_id) else {
            return Ok(false);
        };

        if team.member(member.user_id).is_some() {
            warn!("User {} is already a member of team {team_id}", member.user_id);
            return Ok(false);
        }

        team.members.push(member);
        team.updated_at = Utc::now();
        Ok(true)
    }

    async fn update_team_member(
        &self,
        team_id: Id,
        user_id: Id,
        member: teams::Member,
    ) -> Result<bool, Error> {
        let Some(mut team) = self.teams.get_mut(&team_id) else {
            return Ok(false);
        };

        match team.members.iter().position(|m| m.user_id == user_id) {
            Some(index) => {
                team.members[index] = member;
                team.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_team_member(&self, team_id: Id, user_id: Id) -> Result<bool, Error> {
        let Some(mut team) = self.teams.get_mut(&team_id) else {
            return Ok(false);
        };

        let before = team.members.len();
        team.members.retain(|m| m.user_id != user_id);
        let removed = team.members.len() != before;
        if removed {
            team.updated_at = Utc::now();
        }
        Ok(removed)
    }
}

#[async_trait]
impl MeetingStore for MemoryStore {
    async fn create_meeting(&self, meeting: meetings::Model) -> Result<Id, Error> {
        debug!("Creating meeting {} for owner {}", meeting.id, meeting.owner_id);
        let id = meeting.id;
        self.meetings.insert(id, meeting);
        Ok(id)
    }

    async fn get_meeting_by_id(
        &self,
        owner_id: Id,
        meeting_id: Id,
    ) -> Result<Option<meetings::Model>, Error> {
        Ok(self
            .meetings
            .get(&meeting_id)
            .filter(|meeting| meeting.owner_id == owner_id)
            .map(|meeting| meeting.value().clone()))
    }

    async fn get_user_meetings(
        &self,
        user_id: Id,
        team_id: Option<Id>,
    ) -> Result<Vec<meetings::Model>, Error> {
        let mut meetings: Vec<meetings::Model> = self
            .meetings
            .iter()
            .filter(|meeting| match team_id {
                Some(team_id) => {
                    meeting.team_id == Some(team_id)
                        && (meeting.owner_id == user_id || self.is_active_member(team_id, user_id))
                }
                None => {
                    meeting.owner_id == user_id
                        || meeting
                            .team_id
                            .is_some_and(|team_id| self.is_active_member(team_id, user_id))
                }
            })
            .map(|meeting| meeting.value().clone())
            .collect();
        meetings.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(meetings)
    }

    async fn update_meeting(
        &self,
        owner_id: Id,
        meeting: &meetings::Model,
    ) -> Result<bool, Error> {
        match self.meetings.get_mut(&meeting.id) {
            Some(mut existing) if existing.owner_id == owner_id => {
                let mut updated = meeting.clone();
                updated.updated_at = Utc::now();
                *existing = updated;
                Ok(true)
            }
            Some(_) => Err(Error::new(
                EntityApiErrorKind::PermissionDenied,
                "Meeting belongs to another owner",
            )),
            None => Ok(false),
        }
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn create_notification(
        &self,
        notification: notifications::NewNotification,
    ) -> Result<Id, Error> {
        let id = Id::new_v4();
        let user_id = notification.user_id;
        self.notifications
            .insert(id, notification.into_model(id, Utc::now()));
        self.push_to_subscribers(user_id);
        Ok(id)
    }

    async fn get_user_notifications(
        &self,
        user_id: Id,
    ) -> Result<Vec<notifications::Model>, Error> {
        Ok(self.notifications_for(user_id))
    }

    async fn mark_notification_as_read(
        &self,
        user_id: Id,
        notification_id: Id,
    ) -> Result<bool, Error> {
        let updated = match self.notifications.get_mut(&notification_id) {
            Some(mut notification) if notification.user_id == user_id => {
                notification.read = true;
                true
            }
            _ => false,
        };
        if updated {
            self.push_to_subscribers(user_id);
        }
        Ok(updated)
    }

    async fn delete_notification(&self, user_id: Id, notification_id: Id) -> Result<bool, Error> {
        let removed = self
            .notifications
            .remove_if(&notification_id, |_, n| n.user_id == user_id)
            .is_some();
        if removed {
            self.push_to_subscribers(user_id);
        }
        Ok(removed)
    }

    fn subscribe_to_notifications(
        &self,
        user_id: Id,
        callback: NotificationCallback,
    ) -> Result<Subscription, Error> {
        let subscription_id = self
            .subscriptions
            .register(user_id, Arc::clone(&callback));
        info!("Registered notification subscription for user {user_id}");

        callback(self.notifications_for(user_id));

        let registry = Arc::clone(&self.subscriptions);
        Ok(Subscription::new(move || {
            registry.unregister(&subscription_id);
        }))
    }
}

#[async_trait]
impl IdentityProvider for MemoryStore {
    async fn search_user_by_email(&self, email: &str) -> Result<Option<users::Model>, Error> {
        Ok(self
            .users
            .get(&email.trim().to_lowercase())
            .map(|user| user.value().clone()))
    }
}
