//! Meeting pipeline: transcript analysis, auto-assignment and team sharing.

use crate::error::Error;
use crate::member_matcher::MemberMatcher;
use crate::notification;
use crate::notifications::{MeetingAssignment, MeetingUpdate, TaskAssignment};
use crate::retry::RetryExecutor;
use crate::speaker::extract_speakers;
use crate::task_assignment::auto_assign;
use crate::{action_items, meetings, priority::Priority, teams, Id};
use chrono::Utc;
use log::*;
use meeting_ai::traits::analysis::Provider;
use meeting_ai::RosterEntry;
use service::AppState;

async fn load_team(
    app_state: &AppState,
    retry: &RetryExecutor,
    team_id: Id,
) -> Result<teams::Model, Error> {
    let store = app_state.teams();
    retry
        .execute("get_team_by_id", move || async move {
            Ok(store.get_team_by_id(team_id).await?)
        })
        .await?
        .ok_or_else(|| Error::not_found("Team not found"))
}

/// Active roster of `team_id`, which `user_id` must belong to.
async fn team_roster(
    app_state: &AppState,
    retry: &RetryExecutor,
    team_id: Id,
    user_id: Id,
) -> Result<Vec<teams::Member>, Error> {
    let team = load_team(app_state, retry, team_id).await?;
    if team.active_member(user_id).is_none() {
        return Err(Error::permission_denied(
            "Only team members can share meetings with the team",
        ));
    }
    Ok(team.active_members())
}

async fn save(
    app_state: &AppState,
    retry: &RetryExecutor,
    meeting: &meetings::Model,
) -> Result<(), Error> {
    let store = app_state.meetings();
    let owner_id = meeting.owner_id;
    let updated = retry
        .execute("update_meeting", move || async move {
            Ok(store.update_meeting(owner_id, meeting).await?)
        })
        .await?;

    if updated {
        Ok(())
    } else {
        Err(Error::not_found("Meeting not found"))
    }
}

async fn announce_to_team(app_state: &AppState, meeting: &meetings::Model, team_id: Id, by: Id) {
    let assignment = MeetingAssignment {
        meeting_id: meeting.id,
        owner_id: meeting.owner_id,
        meeting_title: meeting.title.clone(),
        team_id,
        assigned_by: by,
    };
    match notification::send_meeting_assignment(app_state, assignment).await {
        Ok(ids) => debug!("Announced meeting {} to {} members", meeting.id, ids.len()),
        Err(err) => warn!("Could not announce meeting {} to team {team_id}: {err}", meeting.id),
    }
}

fn to_action_item(extracted: meeting_ai::ExtractedActionItem) -> action_items::Model {
    let mut item = action_items::Model::new(extracted.description.trim());
    item.priority = Priority::from_hint(extracted.priority.as_deref());
    item.owner = extracted.owner;
    item.deadline = extracted.deadline;
    item
}

/// Roster handed to the provider: members heard in the transcript first, in speaking order,
/// then everyone else.
fn provider_roster(
    roster: &[teams::Member],
    speakers: &[String],
    matcher: &MemberMatcher,
) -> Vec<RosterEntry> {
    let matches = matcher.match_multiple(speakers, roster);
    let mut ordered: Vec<&teams::Member> = Vec::with_capacity(roster.len());
    for speaker in speakers {
        if let Some(Some(member)) = matches.get(speaker) {
            if !ordered.iter().any(|m| m.user_id == member.user_id) {
                ordered.push(*member);
            }
        }
    }
    info!(
        "Transcript has {} speakers, {} matched to team members",
        speakers.len(),
        ordered.len()
    );

    for member in roster {
        if !ordered.iter().any(|m| m.user_id == member.user_id) {
            ordered.push(member);
        }
    }

    ordered
        .into_iter()
        .map(|m| RosterEntry {
            display_name: m.display_name.clone(),
            email: m.email.clone(),
        })
        .collect()
}

/// Analyzes a transcript and stores the resulting meeting in the owner's scope.
///
/// For team meetings the extracted action items are auto-assigned against the active roster,
/// the team is told about the meeting, and every auto-assigned member is notified. Those
/// notifications are best effort; the meeting is already stored when they go out.
pub async fn create_from_transcript(
    app_state: &AppState,
    provider: &dyn Provider,
    owner_id: Id,
    title: &str,
    transcript: &str,
    team_id: Option<Id>,
) -> Result<meetings::Model, Error> {
    if transcript.trim().is_empty() {
        return Err(Error::validation("Transcript is empty"));
    }

    let retry = RetryExecutor::from_config(&app_state.config);
    let matcher = MemberMatcher::from_config(&app_state.config);

    let roster = match team_id {
        Some(team_id) => team_roster(app_state, &retry, team_id, owner_id).await?,
        None => Vec::new(),
    };

    let speakers = extract_speakers(transcript);
    let entries = provider_roster(&roster, &speakers, &matcher);
    let entries = entries.as_slice();
    let analysis = retry
        .execute("process_transcript", move || async move {
            Ok(provider.process_transcript(transcript, entries).await?)
        })
        .await?;
    debug!(
        "{} returned {} action items (confidence {:.2})",
        provider.provider_id(),
        analysis.action_items.len(),
        analysis.confidence
    );

    let items = analysis
        .action_items
        .into_iter()
        .map(to_action_item)
        .collect();
    let action_items = auto_assign(items, &roster, owner_id, &matcher);

    let now = Utc::now();
    let title = title.trim();
    let meeting = meetings::Model {
        id: Id::new_v4(),
        owner_id,
        title: if title.is_empty() {
            "Untitled meeting".to_string()
        } else {
            title.to_string()
        },
        date: now,
        summary: analysis.summary,
        action_items,
        raw_transcript: transcript.to_string(),
        team_id,
        created_at: now,
        updated_at: now,
    };

    let store = app_state.meetings();
    let new_meeting = &meeting;
    retry
        .execute("create_meeting", move || async move {
            Ok(store.create_meeting(new_meeting.clone()).await?)
        })
        .await?;
    info!("Created meeting {} for owner {owner_id}", meeting.id);

    if let Some(team_id) = team_id {
        announce_to_team(app_state, &meeting, team_id, owner_id).await;

        for item in meeting.action_items.iter().filter(|item| item.is_assigned()) {
            let Some(assignee_id) = item.assignee_id else {
                continue;
            };
            let assignment = TaskAssignment {
                meeting_id: meeting.id,
                owner_id,
                meeting_title: meeting.title.clone(),
                task_id: item.id,
                task_description: item.description.clone(),
                assignee_id,
                assigned_by: owner_id,
            };
            if let Err(err) = notification::send_task_assignment(app_state, assignment).await {
                warn!("User {assignee_id} was not told about task {}: {err}", item.id);
            }
        }
    }

    Ok(meeting)
}

pub async fn find_by_id(
    app_state: &AppState,
    owner_id: Id,
    meeting_id: Id,
) -> Result<meetings::Model, Error> {
    let retry = RetryExecutor::from_config(&app_state.config);
    let store = app_state.meetings();
    retry
        .execute("get_meeting_by_id", move || async move {
            Ok(store.get_meeting_by_id(owner_id, meeting_id).await?)
        })
        .await?
        .ok_or_else(|| Error::not_found("Meeting not found"))
}

pub async fn get_user_meetings(
    app_state: &AppState,
    user_id: Id,
    team_id: Option<Id>,
) -> Result<Vec<meetings::Model>, Error> {
    let retry = RetryExecutor::from_config(&app_state.config);
    let store = app_state.meetings();
    retry
        .execute("get_user_meetings", move || async move {
            Ok(store.get_user_meetings(user_id, team_id).await?)
        })
        .await
}

/// Shares a personal meeting with a team the owner belongs to.
pub async fn share_with_team(
    app_state: &AppState,
    owner_id: Id,
    meeting_id: Id,
    team_id: Id,
) -> Result<meetings::Model, Error> {
    let retry = RetryExecutor::from_config(&app_state.config);
    let mut meeting = find_by_id(app_state, owner_id, meeting_id).await?;

    match meeting.team_id {
        Some(current) if current == team_id => return Ok(meeting),
        Some(_) => {
            return Err(Error::validation(
                "Meeting is already assigned to a different team",
            ))
        }
        None => {}
    }

    team_roster(app_state, &retry, team_id, owner_id).await?;

    meeting.team_id = Some(team_id);
    meeting.updated_at = Utc::now();
    save(app_state, &retry, &meeting).await?;
    info!("Shared meeting {meeting_id} with team {team_id}");

    announce_to_team(app_state, &meeting, team_id, owner_id).await;
    Ok(meeting)
}

/// Renames or re-summarizes a meeting. Team meetings tell the other members what changed.
pub async fn update_details(
    app_state: &AppState,
    owner_id: Id,
    meeting_id: Id,
    acting_user_id: Id,
    title: Option<String>,
    summary: Option<String>,
) -> Result<meetings::Model, Error> {
    let retry = RetryExecutor::from_config(&app_state.config);
    let mut meeting = find_by_id(app_state, owner_id, meeting_id).await?;

    let mut changes = Vec::new();
    if let Some(title) = title.map(|t| t.trim().to_string()) {
        if title.is_empty() {
            return Err(Error::validation("Meeting title is required"));
        }
        if title != meeting.title {
            meeting.title = title;
            changes.push("title");
        }
    }
    if let Some(summary) = summary {
        if summary != meeting.summary {
            meeting.summary = summary;
            changes.push("summary");
        }
    }

    if changes.is_empty() {
        return Ok(meeting);
    }

    meeting.updated_at = Utc::now();
    save(app_state, &retry, &meeting).await?;

    if let Some(team_id) = meeting.team_id {
        let update = MeetingUpdate {
            meeting_id,
            owner_id,
            meeting_title: meeting.title.clone(),
            team_id,
            updated_by: acting_user_id,
            changes: changes.join(", "),
        };
        if let Err(err) = notification::send_meeting_update(app_state, update).await {
            warn!("Could not announce update of meeting {meeting_id}: {err}");
        }
    }

    Ok(meeting)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::notifications::NotificationType;
    use crate::test_support::*;
    use meeting_ai::traits::analysis::MockProvider;
    use meeting_ai::{ExtractedActionItem, TranscriptAnalysis};

    const TRANSCRIPT: &str = "\
[00:00:05] John Doe: Let's get started.
[00:00:12] Jane Smith: I'll review the draft.
[00:00:30] Alex Kim: I can book the room.";

    fn extracted(description: &str, owner: Option<&str>, priority: Option<&str>) -> ExtractedActionItem {
        ExtractedActionItem {
            description: description.to_string(),
            owner: owner.map(str::to_string),
            priority: priority.map(str::to_string),
            deadline: None,
        }
    }

    fn provider_returning(items: Vec<ExtractedActionItem>, roster_len: usize) -> MockProvider {
        let mut provider = MockProvider::new();
        provider
            .expect_process_transcript()
            .withf(move |_, roster| roster.len() == roster_len)
            .times(1)
            .returning(move |_, _| {
                Ok(TranscriptAnalysis {
                    summary: "Draft review and logistics".to_string(),
                    action_items: items.clone(),
                    confidence: 0.8,
                })
            });
        provider.expect_provider_id().return_const("mock".to_string());
        provider
    }

    #[test]
    fn provider_roster_lists_speakers_first() {
        let members = sample_members();
        let active = &members[..3];
        let speakers = vec![
            "Alex Kim".to_string(),
            "Zed".to_string(),
            "Jane".to_string(),
            "alex kim".to_string(),
        ];

        let entries = provider_roster(active, &speakers, &MemberMatcher::default());

        let names: Vec<&str> = entries.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, vec!["Alex Kim", "Jane Smith", "John Doe"]);
        assert_eq!(entries[0].email, "akim@example.com");
    }

    #[tokio::test]
    async fn team_transcript_is_assigned_and_announced() {
        let fixture = Fixture::new().await;
        let owner = fixture.members[0].user_id;
        let jane = fixture.members[1].user_id;
        let alex = fixture.members[2].user_id;
        let provider = provider_returning(
            vec![
                extracted("Review the draft", Some("Jane Smith"), Some("high")),
                extracted("Book the room", Some("Alex"), None),
                extracted("Update the roadmap", Some("Zed"), Some("low")),
            ],
            3,
        );

        let meeting = create_from_transcript(
            &fixture.app_state,
            &provider,
            owner,
            "Weekly sync",
            TRANSCRIPT,
            Some(fixture.team.id),
        )
        .await
        .unwrap();

        let stored = fixture.meeting(owner, meeting.id).await;
        assert_eq!(stored, meeting);
        assert_eq!(stored.action_items[0].assignee_id, Some(jane));
        assert_eq!(stored.action_items[0].priority, Priority::High);
        assert_eq!(stored.action_items[1].assignee_id, Some(alex));
        assert_eq!(stored.action_items[1].priority, Priority::Medium);
        assert!(!stored.action_items[2].is_assigned());

        for user in [jane, alex] {
            let mut kinds: Vec<NotificationType> = fixture
                .notifications_of(user)
                .await
                .iter()
                .map(|n| n.notification_type())
                .collect();
            kinds.sort_by_key(|kind| kind.to_string());
            assert_eq!(
                kinds,
                vec![
                    NotificationType::MeetingAssignment,
                    NotificationType::TaskAssignment
                ]
            );
        }
        assert!(fixture.notifications_of(owner).await.is_empty());
    }

    #[tokio::test]
    async fn personal_transcript_stays_unassigned() {
        let fixture = Fixture::new().await;
        let owner = fixture.outsider.id;
        let provider = provider_returning(vec![extracted("Review", Some("Jane Smith"), None)], 0);

        let meeting =
            create_from_transcript(&fixture.app_state, &provider, owner, " ", TRANSCRIPT, None)
                .await
                .unwrap();

        assert_eq!(meeting.title, "Untitled meeting");
        assert!(!meeting.action_items[0].is_assigned());
        assert_eq!(meeting.team_id, None);
    }

    #[tokio::test]
    async fn non_members_cannot_file_team_meetings() {
        let fixture = Fixture::new().await;
        let provider = MockProvider::new();

        let err = create_from_transcript(
            &fixture.app_state,
            &provider,
            fixture.outsider.id,
            "Sync",
            TRANSCRIPT,
            Some(fixture.team.id),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code(), ErrorCode::PermissionDenied);
    }

    #[tokio::test]
    async fn analysis_failures_are_surfaced_without_retry() {
        let fixture = Fixture::new().await;
        let owner = fixture.members[0].user_id;
        let mut provider = MockProvider::new();
        provider
            .expect_process_transcript()
            .times(1)
            .returning(|_, _| Err(meeting_ai::Error::Authentication("bad key".to_string())));

        let err = create_from_transcript(
            &fixture.app_state,
            &provider,
            owner,
            "Sync",
            TRANSCRIPT,
            Some(fixture.team.id),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code(), ErrorCode::AuthError);
        assert!(get_user_meetings(&fixture.app_state, owner, None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn empty_transcripts_are_rejected() {
        let fixture = Fixture::new().await;

        let err = create_from_transcript(
            &fixture.app_state,
            &MockProvider::new(),
            fixture.members[0].user_id,
            "Sync",
            "   ",
            None,
        )
        .await
        .unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn sharing_announces_to_the_team_once() {
        let fixture = Fixture::new().await;
        let owner = fixture.members[0].user_id;
        let meeting = fixture.personal_meeting(owner, vec![]).await;

        let shared = share_with_team(&fixture.app_state, owner, meeting.id, fixture.team.id)
            .await
            .unwrap();
        assert_eq!(shared.team_id, Some(fixture.team.id));

        // Sharing again with the same team is a no-op
        share_with_team(&fixture.app_state, owner, meeting.id, fixture.team.id)
            .await
            .unwrap();

        assert_eq!(
            fixture.notifications_of(fixture.members[1].user_id).await.len(),
            1
        );
        let jane_meetings =
            get_user_meetings(&fixture.app_state, fixture.members[1].user_id, None)
                .await
                .unwrap();
        assert_eq!(jane_meetings.len(), 1);

        let err = share_with_team(&fixture.app_state, owner, meeting.id, Id::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn detail_updates_reach_other_members() {
        let fixture = Fixture::new().await;
        let owner = fixture.members[0].user_id;
        let meeting = fixture.team_meeting(vec![]).await;

        let updated = update_details(
            &fixture.app_state,
            owner,
            meeting.id,
            owner,
            Some("Planning".to_string()),
            None,
        )
        .await
        .unwrap();
        assert_eq!(updated.title, "Planning");

        let received = fixture.notifications_of(fixture.members[2].user_id).await;
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].notification_type(), NotificationType::MeetingUpdate);
        assert!(fixture.notifications_of(owner).await.is_empty());

        // Nothing changed, nothing sent
        update_details(
            &fixture.app_state,
            owner,
            meeting.id,
            owner,
            Some("Planning".to_string()),
            None,
        )
        .await
        .unwrap();
        assert_eq!(
            fixture.notifications_of(fixture.members[2].user_id).await.len(),
            1
        );
    }
}
