use serde::{Deserialize, Serialize};

/// Membership state of a team member.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    /// Placeholder created when an invitation is sent; replaced on acceptance
    #[default]
    Invited,
    /// Bound to a real user id
    Active,
}

impl std::fmt::Display for MemberStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberStatus::Invited => write!(fmt, "invited"),
            MemberStatus::Active => write!(fmt, "active"),
        }
    }
}
