//! Action items (tasks) embedded in a meeting document.

use crate::{priority::Priority, status::Status, teams::Member, Id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: Id,
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
    /// Free-text speaker hint produced by transcript analysis
    pub owner: Option<String>,
    pub assignee_id: Option<Id>,
    pub assignee_name: Option<String>,
    pub assigned_by: Option<Id>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
}

impl Model {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: Id::new_v4(),
            description: description.into(),
            priority: Priority::default(),
            status: Status::default(),
            owner: None,
            assignee_id: None,
            assignee_name: None,
            assigned_by: None,
            assigned_at: None,
            deadline: None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.assignee_id.is_some()
    }

    /// Sets the assignee fields together so they are never partially populated.
    pub fn assign_to(&mut self, member: &Member, assigned_by: Id, assigned_at: DateTime<Utc>) {
        self.assignee_id = Some(member.user_id);
        self.assignee_name = Some(member.display_name.clone());
        self.assigned_by = Some(assigned_by);
        self.assigned_at = Some(assigned_at);
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status != Status::Completed && self.deadline.is_some_and(|deadline| deadline < now)
    }
}
