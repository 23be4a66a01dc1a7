//! Assigning meeting action items to team members.
//!
//! Meetings are addressed by `(owner_id, meeting_id)` because they live in their owner's scope;
//! the roster a task may be assigned from is the active membership of the meeting's team.

use crate::error::Error;
use crate::member_matcher::MemberMatcher;
use crate::notification;
use crate::notifications::{TaskAssignment, TaskCompleted};
use crate::retry::RetryExecutor;
use crate::speaker::extract_speakers;
use crate::{action_items, meetings, status::Status, teams, Id};
use chrono::Utc;
use log::*;
use serde::{Deserialize, Serialize};
use service::AppState;
use std::cmp::Ordering;

/// One `(task, assignee)` pair of a bulk assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRequest {
    pub task_id: Id,
    pub assignee_id: Id,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct BulkAssignment {
    pub assigned: Vec<Id>,
    pub skipped: Vec<Id>,
}

/// An action item together with the meeting it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AssignedTask {
    pub meeting_id: Id,
    pub owner_id: Id,
    pub meeting_title: String,
    pub team_id: Option<Id>,
    pub task: action_items::Model,
}

/// Assigns every unassigned item whose owner hint resolves to an active roster member.
///
/// Already-assigned items are returned untouched, so running this twice is the same as
/// running it once.
pub fn auto_assign(
    action_items: Vec<action_items::Model>,
    roster: &[teams::Member],
    acting_user_id: Id,
    matcher: &MemberMatcher,
) -> Vec<action_items::Model> {
    let active: Vec<teams::Member> = roster.iter().filter(|m| m.is_active()).cloned().collect();
    let now = Utc::now();

    action_items
        .into_iter()
        .map(|mut item| {
            if item.is_assigned() {
                return item;
            }
            let Some(hint) = item.owner.as_deref().map(str::trim).filter(|h| !h.is_empty())
            else {
                return item;
            };

            let candidate = extract_speakers(hint)
                .into_iter()
                .next()
                .unwrap_or_else(|| hint.to_string());

            match matcher.find_match(&candidate, &active) {
                Some(member) => {
                    debug!("Auto-assigned \"{}\" to {}", item.description, member.display_name);
                    item.assign_to(member, acting_user_id, now);
                }
                None => debug!("No team member matches owner hint {hint:?}"),
            }
            item
        })
        .collect()
}

async fn load_meeting(
    app_state: &AppState,
    retry: &RetryExecutor,
    owner_id: Id,
    meeting_id: Id,
) -> Result<meetings::Model, Error> {
    let store = app_state.meetings();
    retry
        .execute("get_meeting_by_id", move || async move {
            Ok(store.get_meeting_by_id(owner_id, meeting_id).await?)
        })
        .await?
        .ok_or_else(|| Error::not_found("Meeting not found"))
}

/// Active members of the meeting's team. Personal meetings have nobody to assign to.
async fn load_roster(
    app_state: &AppState,
    retry: &RetryExecutor,
    team_id: Option<Id>,
) -> Result<Vec<teams::Member>, Error> {
    let Some(team_id) = team_id else {
        return Ok(Vec::new());
    };

    let store = app_state.teams();
    let team = retry
        .execute("get_team_by_id", move || async move {
            Ok(store.get_team_by_id(team_id).await?)
        })
        .await?;

    Ok(team.map(|team| team.active_members()).unwrap_or_default())
}

async fn save_meeting(
    app_state: &AppState,
    retry: &RetryExecutor,
    owner_id: Id,
    meeting: &meetings::Model,
) -> Result<bool, Error> {
    let store = app_state.meetings();
    retry
        .execute("update_meeting", move || async move {
            Ok(store.update_meeting(owner_id, meeting).await?)
        })
        .await
}

/// A failed notification never undoes an assignment that was already persisted.
async fn notify_assignee(
    app_state: &AppState,
    meeting: &meetings::Model,
    task: &action_items::Model,
    assigned_by: Id,
) {
    let Some(assignee_id) = task.assignee_id else {
        return;
    };

    let assignment = TaskAssignment {
        meeting_id: meeting.id,
        owner_id: meeting.owner_id,
        meeting_title: meeting.title.clone(),
        task_id: task.id,
        task_description: task.description.clone(),
        assignee_id,
        assigned_by,
    };

    if let Err(err) = notification::send_task_assignment(app_state, assignment).await {
        warn!("Task {} assigned but user {assignee_id} was not notified: {err}", task.id);
    }
}

pub async fn assign_manually(
    app_state: &AppState,
    meeting_id: Id,
    task_id: Id,
    assignee_id: Id,
    assigned_by: Id,
    owner_id: Id,
) -> Result<bool, Error> {
    let retry = RetryExecutor::from_config(&app_state.config);
    let mut meeting = load_meeting(app_state, &retry, owner_id, meeting_id).await?;

    if meeting.action_item(task_id).is_none() {
        return Err(Error::not_found("Task not found"));
    }

    let roster = load_roster(app_state, &retry, meeting.team_id).await?;
    let assignee = roster
        .iter()
        .find(|m| m.user_id == assignee_id)
        .ok_or_else(|| Error::not_found("Assignee not found"))?;

    let task = meeting
        .action_item_mut(task_id)
        .ok_or_else(|| Error::not_found("Task not found"))?;
    task.assign_to(assignee, assigned_by, Utc::now());
    let task = task.clone();

    let updated = save_meeting(app_state, &retry, owner_id, &meeting).await?;
    if updated {
        info!("Assigned task {task_id} to user {assignee_id}");
        notify_assignee(app_state, &meeting, &task, assigned_by).await;
    }
    Ok(updated)
}

/// Applies every valid pair in one meeting update. Unknown tasks and assignees are skipped,
/// and when a task appears more than once the last pair wins.
pub async fn bulk_assign(
    app_state: &AppState,
    meeting_id: Id,
    assignments: &[AssignmentRequest],
    assigned_by: Id,
    owner_id: Id,
) -> Result<BulkAssignment, Error> {
    let retry = RetryExecutor::from_config(&app_state.config);
    let mut meeting = load_meeting(app_state, &retry, owner_id, meeting_id).await?;
    let roster = load_roster(app_state, &retry, meeting.team_id).await?;
    let now = Utc::now();

    let mut outcome = BulkAssignment::default();
    for request in assignments {
        let Some(assignee) = roster.iter().find(|m| m.user_id == request.assignee_id) else {
            warn!("Skipping task {}: assignee {} not found", request.task_id, request.assignee_id);
            outcome.skipped.push(request.task_id);
            continue;
        };
        let Some(task) = meeting.action_item_mut(request.task_id) else {
            warn!("Skipping unknown task {}", request.task_id);
            outcome.skipped.push(request.task_id);
            continue;
        };

        task.assign_to(assignee, assigned_by, now);
        // A task listed twice keeps the last pair and is recorded once
        if outcome.assigned.contains(&request.task_id) {
            debug!("Task {} reassigned within the same batch", request.task_id);
            outcome.assigned.retain(|id| *id != request.task_id);
        }
        outcome.assigned.push(request.task_id);
    }

    if outcome.assigned.is_empty() {
        return Ok(outcome);
    }

    if !save_meeting(app_state, &retry, owner_id, &meeting).await? {
        return Err(Error::not_found("Meeting not found"));
    }

    for task_id in &outcome.assigned {
        if let Some(task) = meeting.action_item(*task_id) {
            notify_assignee(app_state, &meeting, task, assigned_by).await;
        }
    }

    info!(
        "Bulk assignment on meeting {meeting_id}: {} assigned, {} skipped",
        outcome.assigned.len(),
        outcome.skipped.len()
    );
    Ok(outcome)
}

/// Sets a task's status. Moving into `completed` notifies whoever assigned the task.
pub async fn update_status(
    app_state: &AppState,
    meeting_id: Id,
    task_id: Id,
    new_status: &str,
    acting_user_id: Id,
    owner_id: Id,
) -> Result<action_items::Model, Error> {
    let status: Status = new_status
        .parse()
        .map_err(|_| Error::validation("Invalid status"))?;

    let retry = RetryExecutor::from_config(&app_state.config);
    let mut meeting = load_meeting(app_state, &retry, owner_id, meeting_id).await?;

    let task = meeting
        .action_item_mut(task_id)
        .ok_or_else(|| Error::not_found("Task not found"))?;
    let previous = task.status;
    task.status = status;
    let task = task.clone();

    if !save_meeting(app_state, &retry, owner_id, &meeting).await? {
        return Err(Error::not_found("Meeting not found"));
    }
    debug!("Task {task_id} moved from {previous} to {status}");

    if status == Status::Completed && previous != Status::Completed {
        if let Some(assigned_by) = task.assigned_by {
            let completed = TaskCompleted {
                meeting_id: meeting.id,
                owner_id: meeting.owner_id,
                task_id,
                task_description: task.description.clone(),
                completed_by: acting_user_id,
            };
            if let Err(err) =
                notification::send_task_completed(app_state, assigned_by, completed).await
            {
                warn!("Task {task_id} completed but user {assigned_by} was not notified: {err}");
            }
        }
    }

    Ok(task)
}

fn by_priority_then_deadline(a: &AssignedTask, b: &AssignedTask) -> Ordering {
    a.task
        .priority
        .rank()
        .cmp(&b.task.priority.rank())
        .then_with(|| match (a.task.deadline, b.task.deadline) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

/// Tasks assigned to the user across their accessible meetings, most urgent first.
pub async fn get_tasks_for_user(
    app_state: &AppState,
    user_id: Id,
    team_id: Option<Id>,
) -> Result<Vec<AssignedTask>, Error> {
    let retry = RetryExecutor::from_config(&app_state.config);
    let store = app_state.meetings();
    let meetings = retry
        .execute("get_user_meetings", move || async move {
            Ok(store.get_user_meetings(user_id, team_id).await?)
        })
        .await?;

    let mut tasks: Vec<AssignedTask> = meetings
        .into_iter()
        .flat_map(|meeting| {
            let meetings::Model {
                id,
                owner_id,
                title,
                team_id,
                action_items,
                ..
            } = meeting;
            action_items
                .into_iter()
                .filter(move |task| task.assignee_id == Some(user_id))
                .map(move |task| AssignedTask {
                    meeting_id: id,
                    owner_id,
                    meeting_title: title.clone(),
                    team_id,
                    task,
                })
        })
        .collect();

    tasks.sort_by(by_priority_then_deadline);
    Ok(tasks)
}

pub async fn get_overdue_tasks(app_state: &AppState, user_id: Id) -> Result<Vec<AssignedTask>, Error> {
    let now = Utc::now();
    Ok(get_tasks_for_user(app_state, user_id, None)
        .await?
        .into_iter()
        .filter(|assigned| assigned.task.is_overdue(now))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::notifications::{NotificationType, Payload};
    use crate::priority::Priority;
    use crate::test_support::*;
    use chrono::Duration;
    use entity_api::error::Error as EntityApiError;
    use entity_api::meeting::MockMeetingStore;
    use entity_api::notification::MockNotificationStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn item(description: &str, owner: Option<&str>) -> action_items::Model {
        let mut item = action_items::Model::new(description);
        item.owner = owner.map(str::to_string);
        item
    }

    #[test]
    fn auto_assign_resolves_owner_hints() {
        let members = sample_members();
        let acting = Id::new_v4();
        let items = vec![
            item("Review the draft", Some("Jane Smith: I'll review it")),
            item("Book the room", Some("alex")),
            item("Update the roadmap", Some("Zed")),
            item("Write notes", None),
        ];

        let assigned = auto_assign(items, &members, acting, &MemberMatcher::default());

        assert_eq!(assigned[0].assignee_id, Some(members[1].user_id));
        assert_eq!(assigned[0].assigned_by, Some(acting));
        assert_eq!(assigned[1].assignee_name.as_deref(), Some("Alex Kim"));
        assert!(!assigned[2].is_assigned());
        assert!(!assigned[3].is_assigned());
    }

    #[test]
    fn auto_assign_is_idempotent() {
        let members = sample_members();
        let acting = Id::new_v4();
        let items = vec![
            item("Review the draft", Some("Jane")),
            item("Update the roadmap", Some("Zed")),
        ];

        let once = auto_assign(items, &members, acting, &MemberMatcher::default());
        let twice = auto_assign(once.clone(), &members, Id::new_v4(), &MemberMatcher::default());

        assert_eq!(once, twice);
    }

    #[test]
    fn auto_assign_never_overwrites_or_picks_invited_members() {
        let members = sample_members();
        let invited = members[3].clone();
        let mut already = item("Ship it", Some("Jane Smith"));
        already.assign_to(&members[0], members[0].user_id, Utc::now());
        let items = vec![already.clone(), item("Say hi", Some(&invited.display_name))];

        let assigned = auto_assign(items, &members, Id::new_v4(), &MemberMatcher::default());

        assert_eq!(assigned[0], already);
        assert!(!assigned[1].is_assigned());
    }

    #[test]
    fn lenient_matching_assigns_unmatched_hints_to_first_member() {
        let members = sample_members();
        let assigned = auto_assign(
            vec![item("Update the roadmap", Some("Zed"))],
            &members,
            Id::new_v4(),
            &MemberMatcher::new(false),
        );

        assert_eq!(assigned[0].assignee_id, Some(members[0].user_id));
    }

    #[tokio::test]
    async fn assign_manually_persists_and_notifies() {
        let fixture = Fixture::new().await;
        let owner = fixture.members[0].user_id;
        let assignee = fixture.members[2].user_id;
        let meeting = fixture
            .team_meeting(vec![item("Review the draft", None)])
            .await;
        let task_id = meeting.action_items[0].id;

        let updated = assign_manually(
            &fixture.app_state,
            meeting.id,
            task_id,
            assignee,
            owner,
            owner,
        )
        .await
        .unwrap();

        assert!(updated);
        let stored = fixture.meeting(owner, meeting.id).await;
        let task = stored.action_item(task_id).unwrap();
        assert_eq!(task.assignee_id, Some(assignee));
        assert_eq!(task.assignee_name.as_deref(), Some("Alex Kim"));
        assert_eq!(task.assigned_by, Some(owner));
        assert!(task.assigned_at.is_some());

        let received = fixture.notifications_of(assignee).await;
        assert_eq!(received.len(), 1);
        match &received[0].payload {
            Payload::TaskAssignment(data) => {
                assert_eq!(data.task_id, task_id);
                assert_eq!(data.assignee_id, assignee);
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[tokio::test]
    async fn assign_manually_reports_what_is_missing() {
        let fixture = Fixture::new().await;
        let owner = fixture.members[0].user_id;
        let assignee = fixture.members[1].user_id;
        let meeting = fixture.team_meeting(vec![item("Review", None)]).await;
        let task_id = meeting.action_items[0].id;

        let err = assign_manually(&fixture.app_state, Id::new_v4(), task_id, assignee, owner, owner)
            .await
            .unwrap_err();
        assert_eq!(err.message, "Meeting not found");

        let err = assign_manually(
            &fixture.app_state,
            meeting.id,
            Id::new_v4(),
            assignee,
            owner,
            owner,
        )
        .await
        .unwrap_err();
        assert_eq!(err.message, "Task not found");

        let invited = fixture.members[3].user_id;
        let err = assign_manually(&fixture.app_state, meeting.id, task_id, invited, owner, owner)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message, "Assignee not found");

        // Another owner's scope cannot see the meeting
        let err = assign_manually(
            &fixture.app_state,
            meeting.id,
            task_id,
            assignee,
            assignee,
            assignee,
        )
        .await
        .unwrap_err();
        assert_eq!(err.message, "Meeting not found");
    }

    #[tokio::test]
    async fn personal_meetings_have_no_assignable_members() {
        let fixture = Fixture::new().await;
        let owner = fixture.members[0].user_id;
        let meeting = fixture
            .personal_meeting(owner, vec![item("Review", None)])
            .await;

        let err = assign_manually(
            &fixture.app_state,
            meeting.id,
            meeting.action_items[0].id,
            owner,
            owner,
            owner,
        )
        .await
        .unwrap_err();
        assert_eq!(err.message, "Assignee not found");
    }

    #[tokio::test]
    async fn failed_notification_keeps_the_assignment() {
        let fixture = Fixture::new().await;
        let owner = fixture.members[0].user_id;
        let assignee = fixture.members[1].user_id;
        let meeting = fixture.team_meeting(vec![item("Review", None)]).await;
        let task_id = meeting.action_items[0].id;

        let mut store = MockNotificationStore::new();
        store
            .expect_create_notification()
            .times(1)
            .returning(|_| Err(EntityApiError::from_code("permission-denied", "rules")));
        let mut app_state = fixture.app_state.clone();
        app_state.set_notification_store(Arc::new(store));

        let updated = assign_manually(&app_state, meeting.id, task_id, assignee, owner, owner)
            .await
            .unwrap();

        assert!(updated);
        let stored = fixture.meeting(owner, meeting.id).await;
        assert_eq!(stored.action_item(task_id).unwrap().assignee_id, Some(assignee));
    }

    #[tokio::test]
    async fn bulk_assign_skips_unknown_tasks() {
        let fixture = Fixture::new().await;
        let owner = fixture.members[0].user_id;
        let assignee = fixture.members[1].user_id;
        let meeting = fixture
            .team_meeting(vec![item("Review", None), item("Book room", None)])
            .await;
        let valid = meeting.action_items[0].id;
        let bogus = Id::new_v4();

        let outcome = bulk_assign(
            &fixture.app_state,
            meeting.id,
            &[
                AssignmentRequest {
                    task_id: valid,
                    assignee_id: assignee,
                },
                AssignmentRequest {
                    task_id: bogus,
                    assignee_id: assignee,
                },
            ],
            owner,
            owner,
        )
        .await
        .unwrap();

        assert_eq!(outcome.assigned, vec![valid]);
        assert_eq!(outcome.skipped, vec![bogus]);

        let stored = fixture.meeting(owner, meeting.id).await;
        assert_eq!(stored.action_items[0].assignee_id, Some(assignee));
        assert!(!stored.action_items[1].is_assigned());
        assert_eq!(fixture.notifications_of(assignee).await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn assign_manually_retries_a_transient_store_failure() {
        let fixture = Fixture::new().await;
        let owner = fixture.members[0].user_id;
        let assignee = fixture.members[1].user_id;
        let meeting = fixture.team_meeting(vec![item("Review", None)]).await;
        let task_id = meeting.action_items[0].id;

        let saves = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&saves);
        let loaded = meeting.clone();
        let mut store = MockMeetingStore::new();
        store
            .expect_get_meeting_by_id()
            .times(1)
            .returning(move |_, _| Ok(Some(loaded.clone())));
        store.expect_update_meeting().returning(move |_, _| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(EntityApiError::from_code("unavailable", "store offline"))
            } else {
                Ok(true)
            }
        });
        let mut app_state = fixture.app_state.clone();
        app_state.set_meeting_store(Arc::new(store));

        let started = tokio::time::Instant::now();
        let updated = assign_manually(&app_state, meeting.id, task_id, assignee, owner, owner)
            .await
            .unwrap();

        assert!(updated);
        assert_eq!(saves.load(Ordering::SeqCst), 2);
        assert!(started.elapsed() >= std::time::Duration::from_millis(1000));
        assert_eq!(fixture.notifications_of(assignee).await.len(), 1);
    }

    #[tokio::test]
    async fn bulk_assign_keeps_the_last_pair_for_a_repeated_task() {
        let fixture = Fixture::new().await;
        let owner = fixture.members[0].user_id;
        let jane = fixture.members[1].user_id;
        let alex = fixture.members[2].user_id;
        let meeting = fixture.team_meeting(vec![item("Review", None)]).await;
        let task_id = meeting.action_items[0].id;

        let outcome = bulk_assign(
            &fixture.app_state,
            meeting.id,
            &[
                AssignmentRequest {
                    task_id,
                    assignee_id: jane,
                },
                AssignmentRequest {
                    task_id,
                    assignee_id: alex,
                },
            ],
            owner,
            owner,
        )
        .await
        .unwrap();

        assert_eq!(outcome.assigned, vec![task_id]);
        assert!(outcome.skipped.is_empty());
        let stored = fixture.meeting(owner, meeting.id).await;
        assert_eq!(stored.action_items[0].assignee_id, Some(alex));
        assert!(fixture.notifications_of(jane).await.is_empty());
        assert_eq!(fixture.notifications_of(alex).await.len(), 1);
    }

    #[tokio::test]
    async fn bulk_assign_skips_unknown_assignees() {
        let fixture = Fixture::new().await;
        let owner = fixture.members[0].user_id;
        let meeting = fixture.team_meeting(vec![item("Review", None)]).await;
        let task_id = meeting.action_items[0].id;

        let outcome = bulk_assign(
            &fixture.app_state,
            meeting.id,
            &[AssignmentRequest {
                task_id,
                assignee_id: fixture.outsider.id,
            }],
            owner,
            owner,
        )
        .await
        .unwrap();

        assert!(outcome.assigned.is_empty());
        assert_eq!(outcome.skipped, vec![task_id]);
        assert!(!fixture.meeting(owner, meeting.id).await.action_items[0].is_assigned());
    }

    #[tokio::test]
    async fn completing_an_assigned_task_notifies_the_assigner_once() {
        let fixture = Fixture::new().await;
        let owner = fixture.members[0].user_id;
        let assignee = &fixture.members[1];
        let mut assigned = item("Review", None);
        assigned.assign_to(assignee, owner, Utc::now());
        let unassigned = item("Book room", None);
        let meeting = fixture
            .team_meeting(vec![assigned.clone(), unassigned.clone()])
            .await;

        let task = update_status(
            &fixture.app_state,
            meeting.id,
            assigned.id,
            "completed",
            assignee.user_id,
            owner,
        )
        .await
        .unwrap();
        assert_eq!(task.status, Status::Completed);

        // Already completed: no second notification
        update_status(
            &fixture.app_state,
            meeting.id,
            assigned.id,
            "completed",
            assignee.user_id,
            owner,
        )
        .await
        .unwrap();
        update_status(
            &fixture.app_state,
            meeting.id,
            unassigned.id,
            "completed",
            owner,
            owner,
        )
        .await
        .unwrap();

        let received = fixture.notifications_of(owner).await;
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].notification_type(), NotificationType::TaskCompleted);
        match &received[0].payload {
            Payload::TaskCompleted(data) => {
                assert_eq!(data.task_id, assigned.id);
                assert_eq!(data.completed_by, assignee.user_id);
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_status_is_a_validation_error() {
        let fixture = Fixture::new().await;
        let owner = fixture.members[0].user_id;
        let meeting = fixture.team_meeting(vec![item("Review", None)]).await;

        let err = update_status(
            &fixture.app_state,
            meeting.id,
            meeting.action_items[0].id,
            "done",
            owner,
            owner,
        )
        .await
        .unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert_eq!(err.message, "Invalid status");
    }

    #[tokio::test]
    async fn tasks_for_user_sort_by_priority_then_deadline() {
        let fixture = Fixture::new().await;
        let owner = fixture.members[0].user_id;
        let user = &fixture.members[1];
        let now = Utc::now();

        let mut tasks = Vec::new();
        for (description, priority, deadline) in [
            ("low soon", Priority::Low, Some(now + Duration::days(1))),
            ("high none", Priority::High, None),
            ("high later", Priority::High, Some(now + Duration::days(5))),
            ("high sooner", Priority::High, Some(now + Duration::days(2))),
            ("medium none", Priority::Medium, None),
        ] {
            let mut task = item(description, None);
            task.priority = priority;
            task.deadline = deadline;
            task.assign_to(user, owner, now);
            tasks.push(task);
        }
        tasks.push(item("not mine", None));
        fixture.team_meeting(tasks).await;

        let found = get_tasks_for_user(&fixture.app_state, user.user_id, None)
            .await
            .unwrap();
        let order: Vec<&str> = found.iter().map(|t| t.task.description.as_str()).collect();

        assert_eq!(
            order,
            vec!["high sooner", "high later", "high none", "medium none", "low soon"]
        );

        let elsewhere = get_tasks_for_user(&fixture.app_state, user.user_id, Some(Id::new_v4()))
            .await
            .unwrap();
        assert!(elsewhere.is_empty());
    }

    #[tokio::test]
    async fn overdue_tasks_exclude_completed_and_future_work() {
        let fixture = Fixture::new().await;
        let owner = fixture.members[0].user_id;
        let user = &fixture.members[1];
        let now = Utc::now();

        let mut late = item("late", None);
        late.deadline = Some(now - Duration::days(1));
        late.assign_to(user, owner, now);
        let mut done = late.clone();
        done.id = Id::new_v4();
        done.description = "done".to_string();
        done.status = Status::Completed;
        let mut upcoming = late.clone();
        upcoming.id = Id::new_v4();
        upcoming.description = "upcoming".to_string();
        upcoming.deadline = Some(now + Duration::days(1));
        fixture.team_meeting(vec![late, done, upcoming]).await;

        let overdue = get_overdue_tasks(&fixture.app_state, user.user_id)
            .await
            .unwrap();

        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].task.description, "late");
    }
}
