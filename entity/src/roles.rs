use serde::{Deserialize, Serialize};

/// Role a member holds within a team. Only admins may mutate the team.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Member,
}

impl std::fmt::Display for Role {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(fmt, "admin"),
            Role::Member => write!(fmt, "member"),
        }
    }
}
