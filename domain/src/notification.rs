//! Notification orchestration: validation, invitations, team fan-out and unread counts.
//!
//! Every store call goes through the [`RetryExecutor`]. Team fan-out spawns one task per
//! recipient into a `JoinSet` and waits for all of them; a failed recipient is logged and
//! left out of the returned ids without affecting the others.

use crate::error::Error;
use crate::notifications::{
    MeetingAssignment, MeetingUpdate, Model, NewNotification, Payload, TaskAssignment,
    TaskCompleted, TeamInvitation,
};
use crate::retry::RetryExecutor;
use crate::{member_status::MemberStatus, teams, Id};
use chrono::Utc;
use entity_api::{NotificationCallback, NotificationStore, Subscription};
use log::*;
use service::AppState;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Outcome of a team fan-out.
#[derive(Debug, Default)]
pub struct FanOut {
    /// Ids of the notifications that were created
    pub delivered: Vec<Id>,
    /// Recipients whose notification could not be created
    pub failed: Vec<Id>,
}

fn validate(notification: &NewNotification) -> Result<(), Error> {
    if notification.user_id.is_nil() {
        return Err(Error::validation("Notification recipient is required"));
    }
    if notification.title.trim().is_empty() {
        return Err(Error::validation("Notification title is required"));
    }

    match &notification.payload {
        Payload::TeamInvitation(invitation) => {
            if !invitation.invitee_email.contains('@') {
                return Err(Error::validation("Invitee email is invalid"));
            }
        }
        Payload::TaskAssignment(assignment) => {
            if assignment.assignee_id.is_nil() {
                return Err(Error::validation("Task assignment requires an assignee"));
            }
        }
        Payload::MeetingAssignment(MeetingAssignment { meeting_id, .. })
        | Payload::MeetingUpdate(MeetingUpdate { meeting_id, .. })
        | Payload::TaskCompleted(TaskCompleted { meeting_id, .. }) => {
            if meeting_id.is_nil() {
                return Err(Error::validation("Notification requires a meeting"));
            }
        }
    }

    Ok(())
}

async fn create_with(
    store: &dyn NotificationStore,
    retry: &RetryExecutor,
    notification: NewNotification,
) -> Result<Id, Error> {
    validate(&notification)?;

    let notification = &notification;
    let id = retry
        .execute("create_notification", move || async move {
            Ok(store.create_notification(notification.clone()).await?)
        })
        .await?;

    debug!(
        "Created {} notification {id} for user {}",
        notification.payload.notification_type(),
        notification.user_id
    );
    Ok(id)
}

/// Validates and persists a single notification.
pub async fn create(app_state: &AppState, notification: NewNotification) -> Result<Id, Error> {
    let retry = RetryExecutor::from_config(&app_state.config);
    create_with(app_state.notifications(), &retry, notification).await
}

async fn fan_out(app_state: &AppState, notifications: Vec<NewNotification>) -> FanOut {
    let retry = RetryExecutor::from_config(&app_state.config);
    let mut tasks = JoinSet::new();

    for notification in notifications {
        let store: Arc<dyn NotificationStore> = app_state.notifications_handle();
        let retry = retry.clone();
        tasks.spawn(async move {
            let recipient = notification.user_id;
            let result = create_with(store.as_ref(), &retry, notification).await;
            (recipient, result)
        });
    }

    let mut outcome = FanOut::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(id))) => outcome.delivered.push(id),
            Ok((recipient, Err(err))) => {
                warn!("Failed to notify user {recipient}: {err}");
                outcome.failed.push(recipient);
            }
            Err(join_err) => warn!("Notification task did not complete: {join_err}"),
        }
    }

    info!(
        "Fan-out delivered {} notifications, {} failed",
        outcome.delivered.len(),
        outcome.failed.len()
    );
    outcome
}

/// Active team members other than the acting user.
async fn recipients(
    app_state: &AppState,
    team_id: Id,
    acting_user_id: Id,
) -> Result<Vec<teams::Member>, Error> {
    let retry = RetryExecutor::from_config(&app_state.config);
    let store = app_state.teams();
    let team = retry
        .execute("get_team_by_id", move || async move {
            Ok(store.get_team_by_id(team_id).await?)
        })
        .await?
        .ok_or_else(|| Error::not_found("Team not found"))?;

    Ok(team
        .active_members()
        .into_iter()
        .filter(|member| member.user_id != acting_user_id)
        .collect())
}

pub async fn send_team_invitation(
    app_state: &AppState,
    invitation: TeamInvitation,
) -> Result<Id, Error> {
    let retry = RetryExecutor::from_config(&app_state.config);
    let identity = app_state.identity();
    let email = invitation.invitee_email.as_str();

    let invitee = retry
        .execute("search_user_by_email", move || async move {
            Ok(identity.search_user_by_email(email).await?)
        })
        .await?
        .ok_or_else(|| Error::not_found("User not found"))?;

    create(
        app_state,
        NewNotification {
            user_id: invitee.id,
            title: "Team invitation".to_string(),
            message: format!(
                "{} invited you to join {}",
                invitation.invited_by_name, invitation.team_name
            ),
            payload: Payload::TeamInvitation(invitation),
        },
    )
    .await
}

/// Loads the invitee's notification and extracts the team invitation it carries.
async fn find_invitation(
    app_state: &AppState,
    retry: &RetryExecutor,
    user_id: Id,
    notification_id: Id,
) -> Result<(Id, TeamInvitation), Error> {
    let store = app_state.notifications();
    let notification = retry
        .execute("get_user_notifications", move || async move {
            Ok(store.get_user_notifications(user_id).await?)
        })
        .await?
        .into_iter()
        .find(|notification| notification.id == notification_id)
        .ok_or_else(|| Error::not_found("Notification not found"))?;

    let Payload::TeamInvitation(invitation) = notification.payload else {
        return Err(Error::validation("This is not a team invitation"));
    };
    let team_id = invitation
        .team_id
        .ok_or_else(|| Error::validation("Missing team information in invitation"))?;

    Ok((team_id, invitation))
}

async fn load_team(
    app_state: &AppState,
    retry: &RetryExecutor,
    team_id: Id,
) -> Result<Option<teams::Model>, Error> {
    let store = app_state.teams();
    retry
        .execute("get_team_by_id", move || async move {
            Ok(store.get_team_by_id(team_id).await?)
        })
        .await
}

async fn save_team(
    app_state: &AppState,
    retry: &RetryExecutor,
    team: &teams::Model,
) -> Result<bool, Error> {
    let store = app_state.teams();
    retry
        .execute("update_team", move || async move {
            Ok(store.update_team(team).await?)
        })
        .await
}

async fn delete_with_retry(
    app_state: &AppState,
    retry: &RetryExecutor,
    user_id: Id,
    notification_id: Id,
) -> Result<bool, Error> {
    let store = app_state.notifications();
    retry
        .execute("delete_notification", move || async move {
            Ok(store.delete_notification(user_id, notification_id).await?)
        })
        .await
}

/// Deletes the answered invitation. When that fails, `original` is saved back so the
/// membership change does not outlive the invitation.
async fn close_invitation(
    app_state: &AppState,
    retry: &RetryExecutor,
    user_id: Id,
    notification_id: Id,
    original: Option<&teams::Model>,
) -> Result<(), Error> {
    let Err(err) = delete_with_retry(app_state, retry, user_id, notification_id).await else {
        return Ok(());
    };

    if let Some(original) = original {
        match save_team(app_state, retry, original).await {
            Ok(_) => debug!("Restored team {} after failed invitation cleanup", original.id),
            Err(restore) => error!(
                "Could not restore team {} after failed invitation cleanup: {restore}",
                original.id
            ),
        }
    }
    Err(err)
}

/// Binds the invited placeholder to the accepting user and removes the invitation.
pub async fn accept_team_invitation(
    app_state: &AppState,
    user_id: Id,
    notification_id: Id,
) -> Result<(), Error> {
    let retry = RetryExecutor::from_config(&app_state.config);
    let (team_id, invitation) = find_invitation(app_state, &retry, user_id, notification_id).await?;

    let original = load_team(app_state, &retry, team_id)
        .await?
        .ok_or_else(|| Error::not_found("Team not found"))?;
    let mut team = original.clone();

    let identity = app_state.identity();
    let email = invitation.invitee_email.as_str();
    let user = retry
        .execute("search_user_by_email", move || async move {
            Ok(identity.search_user_by_email(email).await?)
        })
        .await?;

    let placeholder = team.invited_placeholder(&invitation.invitee_email).cloned();
    let display_name = user
        .map(|user| user.display_name)
        .or_else(|| placeholder.as_ref().map(|p| p.display_name.clone()))
        .unwrap_or_else(|| invitation.invitee_email.clone());

    let member = teams::Member {
        user_id,
        email: invitation.invitee_email.clone(),
        display_name,
        role: placeholder.as_ref().map_or(invitation.role, |p| p.role),
        status: MemberStatus::Active,
        joined_at: Utc::now(),
    };

    match placeholder {
        Some(placeholder) => {
            for existing in team.members.iter_mut() {
                if existing.user_id == placeholder.user_id {
                    *existing = member.clone();
                }
            }
        }
        None if team.member(user_id).is_none() => team.members.push(member),
        None => debug!("User {user_id} is already on team {team_id}"),
    }

    if !save_team(app_state, &retry, &team).await? {
        return Err(Error::not_found("Team not found"));
    }
    close_invitation(app_state, &retry, user_id, notification_id, Some(&original)).await?;

    info!("User {user_id} joined team {team_id}");
    Ok(())
}

/// Removes the invited placeholder and the invitation.
pub async fn decline_team_invitation(
    app_state: &AppState,
    user_id: Id,
    notification_id: Id,
) -> Result<(), Error> {
    let retry = RetryExecutor::from_config(&app_state.config);
    let (team_id, invitation) = find_invitation(app_state, &retry, user_id, notification_id).await?;

    let mut original = None;
    match load_team(app_state, &retry, team_id).await? {
        Some(team) => {
            let mut updated = team.clone();
            updated.members.retain(|m| {
                !(m.status == MemberStatus::Invited
                    && m.email.eq_ignore_ascii_case(&invitation.invitee_email))
            });
            if updated.members.len() != team.members.len() {
                save_team(app_state, &retry, &updated).await?;
                original = Some(team);
            }
        }
        None => warn!("Declined invitation refers to missing team {team_id}"),
    }

    close_invitation(app_state, &retry, user_id, notification_id, original.as_ref()).await?;

    info!("User {user_id} declined the invitation to team {team_id}");
    Ok(())
}

/// Tells every other active team member that a meeting was shared with the team.
pub async fn send_meeting_assignment(
    app_state: &AppState,
    assignment: MeetingAssignment,
) -> Result<Vec<Id>, Error> {
    let recipients = recipients(app_state, assignment.team_id, assignment.assigned_by).await?;

    let notifications = recipients
        .into_iter()
        .map(|member| NewNotification {
            user_id: member.user_id,
            title: "New team meeting".to_string(),
            message: format!("\"{}\" was shared with your team", assignment.meeting_title),
            payload: Payload::MeetingAssignment(assignment.clone()),
        })
        .collect();

    Ok(fan_out(app_state, notifications).await.delivered)
}

pub async fn send_meeting_update(
    app_state: &AppState,
    update: MeetingUpdate,
) -> Result<Vec<Id>, Error> {
    let recipients = recipients(app_state, update.team_id, update.updated_by).await?;

    let notifications = recipients
        .into_iter()
        .map(|member| NewNotification {
            user_id: member.user_id,
            title: "Meeting updated".to_string(),
            message: format!("\"{}\" was updated: {}", update.meeting_title, update.changes),
            payload: Payload::MeetingUpdate(update.clone()),
        })
        .collect();

    Ok(fan_out(app_state, notifications).await.delivered)
}

pub async fn send_task_assignment(
    app_state: &AppState,
    assignment: TaskAssignment,
) -> Result<Id, Error> {
    create(
        app_state,
        NewNotification {
            user_id: assignment.assignee_id,
            title: "New task assigned".to_string(),
            message: format!(
                "You were assigned \"{}\" in {}",
                assignment.task_description, assignment.meeting_title
            ),
            payload: Payload::TaskAssignment(assignment),
        },
    )
    .await
}

/// Tells the assigner that a task they handed out was completed.
pub async fn send_task_completed(
    app_state: &AppState,
    recipient: Id,
    completed: TaskCompleted,
) -> Result<Id, Error> {
    create(
        app_state,
        NewNotification {
            user_id: recipient,
            title: "Task completed".to_string(),
            message: format!("\"{}\" was marked as completed", completed.task_description),
            payload: Payload::TaskCompleted(completed),
        },
    )
    .await
}

/// Newest first.
pub async fn get_user_notifications(app_state: &AppState, user_id: Id) -> Result<Vec<Model>, Error> {
    let retry = RetryExecutor::from_config(&app_state.config);
    let store = app_state.notifications();
    let mut notifications = retry
        .execute("get_user_notifications", move || async move {
            Ok(store.get_user_notifications(user_id).await?)
        })
        .await?;

    notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(notifications)
}

/// Unread notifications for the user. Auth-class failures read as zero.
pub async fn get_unread_count(app_state: &AppState, user_id: Id) -> Result<usize, Error> {
    match get_user_notifications(app_state, user_id).await {
        Ok(notifications) => Ok(notifications.iter().filter(|n| !n.read).count()),
        Err(err) if err.code().is_auth() => {
            debug!("Unread count for user {user_id} suppressed: {err}");
            Ok(0)
        }
        Err(err) => Err(err),
    }
}

pub async fn mark_as_read(
    app_state: &AppState,
    user_id: Id,
    notification_id: Id,
) -> Result<bool, Error> {
    let retry = RetryExecutor::from_config(&app_state.config);
    let store = app_state.notifications();
    retry
        .execute("mark_notification_as_read", move || async move {
            Ok(store
                .mark_notification_as_read(user_id, notification_id)
                .await?)
        })
        .await
}

/// Returns how many notifications changed state.
pub async fn mark_all_as_read(app_state: &AppState, user_id: Id) -> Result<usize, Error> {
    let unread: Vec<Id> = get_user_notifications(app_state, user_id)
        .await?
        .into_iter()
        .filter(|n| !n.read)
        .map(|n| n.id)
        .collect();

    let mut marked = 0;
    for notification_id in unread {
        if mark_as_read(app_state, user_id, notification_id).await? {
            marked += 1;
        }
    }
    Ok(marked)
}

pub async fn delete(app_state: &AppState, user_id: Id, notification_id: Id) -> Result<bool, Error> {
    let retry = RetryExecutor::from_config(&app_state.config);
    delete_with_retry(app_state, &retry, user_id, notification_id).await
}

/// Pushes the user's notification list to `callback` until the returned handle is dropped.
pub fn subscribe_to_notifications(
    app_state: &AppState,
    user_id: Id,
    callback: NotificationCallback,
) -> Result<Subscription, Error> {
    Ok(app_state
        .notifications()
        .subscribe_to_notifications(user_id, callback)?)
}
