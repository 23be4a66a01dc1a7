use crate::error::Error;
use crate::notification;
use crate::notifications::TeamInvitation;
use crate::retry::RetryExecutor;
use crate::{member_status::MemberStatus, roles::Role, teams, users, Id};
use chrono::Utc;
use log::*;
use service::AppState;

async fn load(app_state: &AppState, retry: &RetryExecutor, team_id: Id) -> Result<teams::Model, Error> {
    let store = app_state.teams();
    retry
        .execute("get_team_by_id", move || async move {
            Ok(store.get_team_by_id(team_id).await?)
        })
        .await?
        .ok_or_else(|| Error::not_found("Team not found"))
}

fn require_admin(team: &teams::Model, user_id: Id) -> Result<(), Error> {
    if team.is_admin(user_id) {
        Ok(())
    } else {
        Err(Error::permission_denied("Only team admins can manage the team"))
    }
}

/// Creates a team with `creator` as its only, active, admin.
pub async fn create(
    app_state: &AppState,
    name: &str,
    description: Option<String>,
    creator: &users::Model,
) -> Result<teams::Model, Error> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("Team name is required"));
    }

    let now = Utc::now();
    let team = teams::Model {
        id: Id::new_v4(),
        name: name.to_string(),
        description,
        created_by: creator.id,
        members: vec![teams::Member {
            user_id: creator.id,
            email: creator.email.clone(),
            display_name: creator.display_name.clone(),
            role: Role::Admin,
            status: MemberStatus::Active,
            joined_at: now,
        }],
        created_at: now,
        updated_at: now,
    };

    let retry = RetryExecutor::from_config(&app_state.config);
    let store = app_state.teams();
    let new_team = &team;
    retry
        .execute("create_team", move || async move {
            Ok(store.create_team(new_team.clone()).await?)
        })
        .await?;

    info!("Created team {} ({})", team.name, team.id);
    Ok(team)
}

pub async fn find_by_id(app_state: &AppState, team_id: Id) -> Result<teams::Model, Error> {
    let retry = RetryExecutor::from_config(&app_state.config);
    load(app_state, &retry, team_id).await
}

/// Adds an invited placeholder for `email` and sends the invitation.
///
/// The placeholder is removed again if the invitation cannot be delivered.
pub async fn invite_member(
    app_state: &AppState,
    team_id: Id,
    acting_user_id: Id,
    email: &str,
    role: Role,
) -> Result<Id, Error> {
    let retry = RetryExecutor::from_config(&app_state.config);
    let team = load(app_state, &retry, team_id).await?;
    require_admin(&team, acting_user_id)?;

    let email = email.trim();
    if !email.contains('@') {
        return Err(Error::validation("Invalid email address"));
    }
    if team
        .members
        .iter()
        .any(|m| m.is_active() && m.email.eq_ignore_ascii_case(email))
    {
        return Err(Error::validation("User is already a team member"));
    }

    let store = app_state.teams();
    let placeholder = match team.invited_placeholder(email) {
        Some(existing) => {
            debug!("Re-sending invitation to {email} for team {team_id}");
            existing.clone()
        }
        None => {
            let placeholder = teams::Member {
                user_id: Id::new_v4(),
                email: email.to_string(),
                display_name: email.split('@').next().unwrap_or(email).to_string(),
                role,
                status: MemberStatus::Invited,
                joined_at: Utc::now(),
            };
            let new_member = &placeholder;
            retry
                .execute("add_team_member", move || async move {
                    Ok(store.add_team_member(team_id, new_member.clone()).await?)
                })
                .await?;
            placeholder
        }
    };

    let inviter_name = team
        .member(acting_user_id)
        .map(|m| m.display_name.clone())
        .unwrap_or_default();
    let invitation = TeamInvitation {
        team_id: Some(team_id),
        team_name: team.name.clone(),
        invitee_email: email.to_string(),
        invited_by: acting_user_id,
        invited_by_name: inviter_name,
        role: placeholder.role,
    };

    match notification::send_team_invitation(app_state, invitation).await {
        Ok(id) => {
            info!("Invited {email} to team {team_id}");
            Ok(id)
        }
        Err(err) => {
            let placeholder_id = placeholder.user_id;
            if let Err(cleanup) = retry
                .execute("remove_team_member", move || async move {
                    Ok(store.remove_team_member(team_id, placeholder_id).await?)
                })
                .await
            {
                warn!("Could not remove placeholder for {email}: {cleanup}");
            }
            Err(err)
        }
    }
}

/// Admins may remove anyone and members may remove themselves, but a team always keeps
/// at least one active admin.
pub async fn remove_member(
    app_state: &AppState,
    team_id: Id,
    acting_user_id: Id,
    user_id: Id,
) -> Result<bool, Error> {
    let retry = RetryExecutor::from_config(&app_state.config);
    let team = load(app_state, &retry, team_id).await?;
    if acting_user_id != user_id {
        require_admin(&team, acting_user_id)?;
    }

    let target = team
        .member(user_id)
        .ok_or_else(|| Error::not_found("Member not found"))?;
    let admins = team
        .members
        .iter()
        .filter(|m| m.is_admin() && m.is_active())
        .count();
    if target.is_admin() && target.is_active() && admins <= 1 {
        return Err(Error::validation("Cannot remove the last admin of a team"));
    }

    let store = app_state.teams();
    let removed = retry
        .execute("remove_team_member", move || async move {
            Ok(store.remove_team_member(team_id, user_id).await?)
        })
        .await?;

    if removed {
        info!("Removed user {user_id} from team {team_id}");
    }
    Ok(removed)
}

pub async fn update_details(
    app_state: &AppState,
    team_id: Id,
    acting_user_id: Id,
    name: Option<String>,
    description: Option<String>,
) -> Result<teams::Model, Error> {
    let retry = RetryExecutor::from_config(&app_state.config);
    let mut team = load(app_state, &retry, team_id).await?;
    require_admin(&team, acting_user_id)?;

    if let Some(name) = name {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("Team name is required"));
        }
        team.name = name.to_string();
    }
    if description.is_some() {
        team.description = description;
    }
    team.updated_at = Utc::now();

    let store = app_state.teams();
    let updated = &team;
    if !retry
        .execute("update_team", move || async move {
            Ok(store.update_team(updated).await?)
        })
        .await?
    {
        return Err(Error::not_found("Team not found"));
    }

    Ok(team)
}
