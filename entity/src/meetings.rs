use crate::{action_items, Id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A processed meeting. Stored under its owner's scope; `team_id` is `None` for personal meetings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: Id,
    pub owner_id: Id,
    pub title: String,
    pub date: DateTime<Utc>,
    pub summary: String,
    pub action_items: Vec<action_items::Model>,
    pub raw_transcript: String,
    pub team_id: Option<Id>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn action_item(&self, task_id: Id) -> Option<&action_items::Model> {
        self.action_items.iter().find(|item| item.id == task_id)
    }

    pub fn action_item_mut(&mut self, task_id: Id) -> Option<&mut action_items::Model> {
        self.action_items.iter_mut().find(|item| item.id == task_id)
    }
}
