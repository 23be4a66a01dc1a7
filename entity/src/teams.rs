//! Team entity and its embedded member records.

use crate::{member_status::MemberStatus, roles::Role, Id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A membership record within a team. `user_id` is unique per team.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: Id,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub status: MemberStatus,
    pub joined_at: DateTime<Utc>,
}

impl Member {
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: Id,
    pub name: String,
    pub description: Option<String>,
    pub created_by: Id,
    /// Ordered by join time
    pub members: Vec<Member>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn member(&self, user_id: Id) -> Option<&Member> {
        self.members.iter().find(|m| m.user_id == user_id)
    }

    pub fn is_admin(&self, user_id: Id) -> bool {
        self.member(user_id)
            .is_some_and(|m| m.is_admin() && m.is_active())
    }

    /// Members that are bound to a real user; invited placeholders are excluded.
    pub fn active_members(&self) -> Vec<Member> {
        self.members.iter().filter(|m| m.is_active()).cloned().collect()
    }

    pub fn active_member(&self, user_id: Id) -> Option<&Member> {
        self.members
            .iter()
            .find(|m| m.user_id == user_id && m.is_active())
    }

    /// The invited placeholder for an email address, if one is pending.
    pub fn invited_placeholder(&self, email: &str) -> Option<&Member> {
        self.members.iter().find(|m| {
            m.status == MemberStatus::Invited && m.email.eq_ignore_ascii_case(email)
        })
    }
}
