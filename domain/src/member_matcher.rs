//! Maps free-text speaker names onto team roster entries.
//!
//! Matching is case-insensitive and tries, in order, across the whole roster:
//! 1. the full display name,
//! 2. the first word of the display name,
//! 3. the email local part, ignoring `.`, `_`, `-` and whitespace on both sides.
//!
//! What happens when nothing matches is a policy choice: with `strict_matching` the result is
//! `None`, otherwise the first roster member is returned. An empty roster is always `None`.

use crate::teams::Member;
use log::*;
use service::config::Config;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemberMatcher {
    strict_matching: bool,
}

impl Default for MemberMatcher {
    fn default() -> Self {
        Self::new(true)
    }
}

impl MemberMatcher {
    pub fn new(strict_matching: bool) -> Self {
        Self { strict_matching }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.strict_matching())
    }

    pub fn strict_matching(&self) -> bool {
        self.strict_matching
    }

    pub fn find_match<'a>(&self, candidate: &str, roster: &'a [Member]) -> Option<&'a Member> {
        if roster.is_empty() {
            return None;
        }

        let found = heuristic_match(candidate, roster);
        if found.is_none() && !self.strict_matching {
            debug!("No roster match for {candidate:?}, falling back to first member");
            return roster.first();
        }
        found
    }

    /// Matches each name independently.
    pub fn match_multiple<'a, S: AsRef<str>>(
        &self,
        names: &[S],
        roster: &'a [Member],
    ) -> HashMap<String, Option<&'a Member>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                (name.to_string(), self.find_match(name, roster))
            })
            .collect()
    }
}

fn heuristic_match<'a>(candidate: &str, roster: &'a [Member]) -> Option<&'a Member> {
    let candidate = collapse_whitespace(candidate).to_lowercase();
    if candidate.is_empty() {
        return None;
    }

    if let Some(member) = roster
        .iter()
        .find(|m| collapse_whitespace(&m.display_name).to_lowercase() == candidate)
    {
        return Some(member);
    }

    if let Some(member) = roster.iter().find(|m| {
        m.display_name
            .split_whitespace()
            .next()
            .is_some_and(|first| first.to_lowercase() == candidate)
    }) {
        return Some(member);
    }

    let normalized = normalize_handle(&candidate);
    if normalized.is_empty() {
        return None;
    }
    roster.iter().find(|m| {
        m.email
            .split_once('@')
            .is_some_and(|(local, _)| normalize_handle(local) == normalized)
    })
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_handle(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '.' | '_' | '-') && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
