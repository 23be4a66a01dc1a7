use chrono::Utc;
use log::*;

pub use entity::{
    action_items, meetings, member_status, notifications, priority, roles, status, teams, users,
    Id,
};

pub mod error;
pub mod meeting;
pub mod memory;
pub mod notification;
pub mod team;
pub mod user;

pub use meeting::MeetingStore;
pub use memory::MemoryStore;
pub use notification::{NotificationCallback, NotificationStore, Subscription};
pub use team::TeamStore;
pub use user::IdentityProvider;

/// Records created by [`seed_store`].
pub struct SeedData {
    pub owner: users::Model,
    pub team: teams::Model,
}

/// Seeds an in-memory store with a small team for local development.
pub async fn seed_store(store: &MemoryStore) -> Result<SeedData, error::Error> {
    let now = Utc::now();

    let people = [
        ("John Doe", "john.doe@example.com", roles::Role::Admin),
        ("Jane Smith", "jane.smith@example.com", roles::Role::Member),
        ("Alex Kim", "akim@example.com", roles::Role::Member),
    ];

    let users: Vec<users::Model> = people
        .iter()
        .map(|(name, email, _)| users::Model {
            id: Id::new_v4(),
            email: email.to_string(),
            display_name: name.to_string(),
        })
        .collect();

    for user in &users {
        store.insert_user(user.clone());
    }

    let members = users
        .iter()
        .zip(people.iter())
        .map(|(user, (_, _, role))| teams::Member {
            user_id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            role: *role,
            status: member_status::MemberStatus::Active,
            joined_at: now,
        })
        .collect();

    let owner = users[0].clone();
    let team = teams::Model {
        id: Id::new_v4(),
        name: "Platform".to_owned(),
        description: Some("Weekly platform sync".to_owned()),
        created_by: owner.id,
        members,
        created_at: now,
        updated_at: now,
    };

    store.create_team(team.clone()).await?;
    info!(
        "Seeded team {} with {} members",
        team.name,
        team.members.len()
    );

    Ok(SeedData { owner, team })
}
