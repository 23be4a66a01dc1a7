//! Shared fixtures for the domain tests, backed by the in-memory store.

use crate::notifications::{self, NewNotification, Payload, TaskCompleted, TeamInvitation};
use crate::{action_items, meetings, member_status::MemberStatus, roles::Role, teams, users, Id};
use chrono::Utc;
use entity_api::{MeetingStore, MemoryStore, NotificationStore, TeamStore};
use service::config::Config;
use service::AppState;
use std::sync::Arc;

pub(crate) fn member(display_name: &str, email: &str, role: Role, status: MemberStatus) -> teams::Member {
    teams::Member {
        user_id: Id::new_v4(),
        email: email.to_string(),
        display_name: display_name.to_string(),
        role,
        status,
        joined_at: Utc::now(),
    }
}

/// Three active members (the first is the admin) followed by one invited placeholder.
pub(crate) fn sample_members() -> Vec<teams::Member> {
    vec![
        member("John Doe", "john.doe@example.com", Role::Admin, MemberStatus::Active),
        member("Jane Smith", "jane.smith@example.com", Role::Member, MemberStatus::Active),
        member("Alex Kim", "akim@example.com", Role::Member, MemberStatus::Active),
        member("Pat Lee", "pat.lee@example.com", Role::Member, MemberStatus::Invited),
    ]
}

pub(crate) fn task_completed_for(user_id: Id) -> NewNotification {
    NewNotification {
        user_id,
        title: "Task completed".to_string(),
        message: "Send recap was completed".to_string(),
        payload: Payload::TaskCompleted(TaskCompleted {
            meeting_id: Id::new_v4(),
            owner_id: Id::new_v4(),
            task_id: Id::new_v4(),
            task_description: "Send recap".to_string(),
            completed_by: Id::new_v4(),
        }),
    }
}

pub(crate) fn invitation_for(
    team: &teams::Model,
    email: &str,
    inviter: &teams::Member,
) -> TeamInvitation {
    TeamInvitation {
        team_id: Some(team.id),
        team_name: team.name.clone(),
        invitee_email: email.to_string(),
        invited_by: inviter.user_id,
        invited_by_name: inviter.display_name.clone(),
        role: Role::Member,
    }
}

pub(crate) struct Fixture {
    pub store: Arc<MemoryStore>,
    pub app_state: AppState,
    /// The team as it was created
    pub team: teams::Model,
    pub members: Vec<teams::Member>,
    /// Registered user behind the invited placeholder
    pub invitee: users::Model,
    /// Registered user with no relation to the team
    pub outsider: users::Model,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        let members = sample_members();

        for m in &members[..3] {
            store.insert_user(users::Model {
                id: m.user_id,
                email: m.email.clone(),
                display_name: m.display_name.clone(),
            });
        }
        // The placeholder id is random; the real account has its own id
        let invitee = users::Model {
            id: Id::new_v4(),
            email: members[3].email.clone(),
            display_name: "Patricia Lee".to_string(),
        };
        let outsider = users::Model {
            id: Id::new_v4(),
            email: "sam.ortiz@example.com".to_string(),
            display_name: "Sam Ortiz".to_string(),
        };
        store.insert_user(invitee.clone());
        store.insert_user(outsider.clone());

        let now = Utc::now();
        let team = teams::Model {
            id: Id::new_v4(),
            name: "Platform".to_string(),
            description: None,
            created_by: members[0].user_id,
            members: members.clone(),
            created_at: now,
            updated_at: now,
        };
        store.create_team(team.clone()).await.unwrap();

        let app_state = AppState::with_store(config, Arc::clone(&store));

        Self {
            store,
            app_state,
            team,
            members,
            invitee,
            outsider,
        }
    }

    pub async fn team(&self) -> teams::Model {
        self.store.get_team_by_id(self.team.id).await.unwrap().unwrap()
    }

    pub async fn notifications_of(&self, user_id: Id) -> Vec<notifications::Model> {
        self.store.get_user_notifications(user_id).await.unwrap()
    }

    pub async fn meeting(&self, owner_id: Id, meeting_id: Id) -> meetings::Model {
        self.store
            .get_meeting_by_id(owner_id, meeting_id)
            .await
            .unwrap()
            .unwrap()
    }

    async fn insert_meeting(
        &self,
        owner_id: Id,
        team_id: Option<Id>,
        action_items: Vec<action_items::Model>,
    ) -> meetings::Model {
        let now = Utc::now();
        let meeting = meetings::Model {
            id: Id::new_v4(),
            owner_id,
            title: "Weekly sync".to_string(),
            date: now,
            summary: "Status round".to_string(),
            action_items,
            raw_transcript: String::new(),
            team_id,
            created_at: now,
            updated_at: now,
        };
        self.store.create_meeting(meeting.clone()).await.unwrap();
        meeting
    }

    /// A meeting owned by the team admin and shared with the team.
    pub async fn team_meeting(&self, action_items: Vec<action_items::Model>) -> meetings::Model {
        self.insert_meeting(self.members[0].user_id, Some(self.team.id), action_items)
            .await
    }

    pub async fn personal_meeting(
        &self,
        owner_id: Id,
        action_items: Vec<action_items::Model>,
    ) -> meetings::Model {
        self.insert_meeting(owner_id, None, action_items).await
    }
}
