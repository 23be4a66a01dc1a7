use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Progress of an action item. Any status may be set directly.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Deserialize, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, PartialEq, Eq)]
pub struct StatusParseError(pub String);

impl std::fmt::Display for StatusParseError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(fmt, "invalid status: {}", self.0)
    }
}

impl std::error::Error for StatusParseError {}

impl FromStr for Status {
    type Err = StatusParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Status::Pending),
            "in_progress" => Ok(Status::InProgress),
            "completed" => Ok(Status::Completed),
            other => Err(StatusParseError(other.to_string())),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Pending => write!(fmt, "pending"),
            Status::InProgress => write!(fmt, "in_progress"),
            Status::Completed => write!(fmt, "completed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_three_known_statuses() {
        assert_eq!("pending".parse::<Status>(), Ok(Status::Pending));
        assert_eq!("in_progress".parse::<Status>(), Ok(Status::InProgress));
        assert_eq!("completed".parse::<Status>(), Ok(Status::Completed));
    }

    #[test]
    fn rejects_unknown_status_strings() {
        assert!("done".parse::<Status>().is_err());
        assert!("Completed".parse::<Status>().is_err());
    }
}
