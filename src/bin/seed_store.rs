use domain::{action_items, meetings, member_matcher::MemberMatcher, task_assignment, Id};
use entity_api::{MeetingStore, MemoryStore};
use log::{error, info};
use service::{config::Config, logging::Logger, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to start logger: {e}");
        std::process::exit(1);
    }

    info!("Seeding in-memory store [{}]...", config.runtime_env());

    let store = Arc::new(MemoryStore::new());
    let seed = match entity_api::seed_store(&store).await {
        Ok(seed) => seed,
        Err(e) => {
            error!("Failed to seed store: {e}");
            std::process::exit(1);
        }
    };

    let app_state = AppState::with_store(config, Arc::clone(&store));
    let matcher = MemberMatcher::from_config(&app_state.config);

    let items = [
        ("Review the launch checklist", "Jane Smith: I'll take the checklist"),
        ("Book the retro room", "akim"),
        ("Draft the release notes", "Someone"),
    ]
    .into_iter()
    .map(|(description, owner)| {
        let mut item = action_items::Model::new(description);
        item.owner = Some(owner.to_string());
        item
    })
    .collect();
    let action_items = task_assignment::auto_assign(
        items,
        &seed.team.members,
        seed.owner.id,
        &matcher,
    );

    let now = chrono::Utc::now();
    let meeting = meetings::Model {
        id: Id::new_v4(),
        owner_id: seed.owner.id,
        title: "Launch readiness".to_owned(),
        date: now,
        summary: "Walked through the launch checklist and retro logistics.".to_owned(),
        action_items,
        raw_transcript: String::new(),
        team_id: Some(seed.team.id),
        created_at: now,
        updated_at: now,
    };

    if let Err(e) = store.create_meeting(meeting).await {
        error!("Failed to store demo meeting: {e}");
        std::process::exit(1);
    }

    for member in seed.team.active_members() {
        match task_assignment::get_tasks_for_user(&app_state, member.user_id, Some(seed.team.id))
            .await
        {
            Ok(tasks) => info!("{} has {} assigned tasks", member.display_name, tasks.len()),
            Err(e) => error!("Failed to load tasks for {}: {e}", member.display_name),
        }
    }
}
