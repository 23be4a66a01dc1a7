//! Team-aware task assignment and notification orchestration.
//!
//! Operations take the [`service::AppState`] holding the store collaborators, and thread
//! `owner_id` and `team_id` explicitly; nothing here remembers a "current" team or meeting.

// Re-exports from `entity` crate via `entity_api`
pub use entity_api::{
    action_items, meetings, member_status, notifications, priority, roles, status, teams, users,
    Id,
};

pub mod error;
pub mod meeting;
pub mod member_matcher;
pub mod notification;
pub mod retry;
pub mod speaker;
pub mod task_assignment;
pub mod team;

#[cfg(test)]
mod test_support;
