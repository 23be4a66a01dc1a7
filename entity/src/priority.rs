use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Deserialize, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Sort key where lower values come first (high before medium before low).
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    /// Lenient parse used for AI-produced values; unknown or missing values become `Medium`.
    pub fn from_hint(hint: Option<&str>) -> Self {
        hint.and_then(|h| h.trim().to_lowercase().parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for Priority {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(fmt, "high"),
            Priority::Medium => write!(fmt, "medium"),
            Priority::Low => write!(fmt, "low"),
        }
    }
}
