//! Per-user notification records and their typed payloads.

use crate::{roles::Role, Id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discriminant of a notification, mirrored by the `type` tag of [`Payload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    TeamInvitation,
    TaskAssignment,
    MeetingAssignment,
    MeetingUpdate,
    TaskCompleted,
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationType::TeamInvitation => write!(fmt, "team_invitation"),
            NotificationType::TaskAssignment => write!(fmt, "task_assignment"),
            NotificationType::MeetingAssignment => write!(fmt, "meeting_assignment"),
            NotificationType::MeetingUpdate => write!(fmt, "meeting_update"),
            NotificationType::TaskCompleted => write!(fmt, "task_completed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamInvitation {
    /// Older invitation documents may lack the team reference.
    #[serde(default)]
    pub team_id: Option<Id>,
    pub team_name: String,
    pub invitee_email: String,
    pub invited_by: Id,
    pub invited_by_name: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAssignment {
    pub meeting_id: Id,
    /// Owner scope needed to load the meeting document
    pub owner_id: Id,
    pub meeting_title: String,
    pub task_id: Id,
    pub task_description: String,
    pub assignee_id: Id,
    pub assigned_by: Id,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingAssignment {
    pub meeting_id: Id,
    pub owner_id: Id,
    pub meeting_title: String,
    pub team_id: Id,
    pub assigned_by: Id,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingUpdate {
    pub meeting_id: Id,
    pub owner_id: Id,
    pub meeting_title: String,
    pub team_id: Id,
    pub updated_by: Id,
    pub changes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCompleted {
    pub meeting_id: Id,
    pub owner_id: Id,
    pub task_id: Id,
    pub task_description: String,
    pub completed_by: Id,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Payload {
    #[serde(rename = "team_invitation")]
    TeamInvitation(TeamInvitation),
    #[serde(rename = "task_assignment")]
    TaskAssignment(TaskAssignment),
    #[serde(rename = "meeting_assignment")]
    MeetingAssignment(MeetingAssignment),
    #[serde(rename = "meeting_update")]
    MeetingUpdate(MeetingUpdate),
    #[serde(rename = "task_completed")]
    TaskCompleted(TaskCompleted),
}

impl Payload {
    pub fn notification_type(&self) -> NotificationType {
        match self {
            Payload::TeamInvitation(_) => NotificationType::TeamInvitation,
            Payload::TaskAssignment(_) => NotificationType::TaskAssignment,
            Payload::MeetingAssignment(_) => NotificationType::MeetingAssignment,
            Payload::MeetingUpdate(_) => NotificationType::MeetingUpdate,
            Payload::TaskCompleted(_) => NotificationType::TaskCompleted,
        }
    }
}

/// A notification as stored, owned by its recipient (`user_id`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: Id,
    pub user_id: Id,
    pub title: String,
    pub message: String,
    pub payload: Payload,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Model {
    pub fn notification_type(&self) -> NotificationType {
        self.payload.notification_type()
    }
}

/// Data required to create a notification; the store assigns id, read state and timestamp.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: Id,
    pub title: String,
    pub message: String,
    pub payload: Payload,
}

impl NewNotification {
    pub fn into_model(self, id: Id, created_at: DateTime<Utc>) -> Model {
        Model {
            id,
            user_id: self.user_id,
            title: self.title,
            message: self.message,
            payload: self.payload,
            read: false,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_serializes_with_type_discriminator() {
        let payload = Payload::TaskCompleted(TaskCompleted {
            meeting_id: Id::nil(),
            owner_id: Id::nil(),
            task_id: Id::nil(),
            task_description: "Send recap".to_string(),
            completed_by: Id::nil(),
        });

        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["type"], "task_completed");
        assert_eq!(json["data"]["task_description"], "Send recap");
        assert_eq!(
            payload.notification_type().to_string(),
            json["type"].as_str().unwrap()
        );
    }

    #[test]
    fn invitation_without_team_id_still_deserializes() {
        let json = serde_json::json!({
            "type": "team_invitation",
            "data": {
                "team_name": "Platform",
                "invitee_email": "jane@x.com",
                "invited_by": Id::nil(),
                "invited_by_name": "John"
            }
        });

        let payload: Payload = serde_json::from_value(json).unwrap();

        match payload {
            Payload::TeamInvitation(invitation) => {
                assert_eq!(invitation.team_id, None);
                assert_eq!(invitation.role, Role::Member);
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }
}
