//! Pulls candidate speaker names out of free-form transcript text.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// `[00:01:23]`, `(00:01)`, `00:01:23 -` and friends at the start of a line.
static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\[\d{1,2}:\d{2}(?::\d{2})?\]|\(\d{1,2}:\d{2}(?::\d{2})?\)|\d{1,2}:\d{2}(?::\d{2})?)\s*-?\s*")
        .unwrap()
});

/// A leading name followed by one of the supported separators.
static SPEAKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:\[(?P<bracket>[^\]]+)\]|\((?P<paren>[^)]+)\)|(?P<plain>[^:|>\[\]()]+?)(?:\s*:|\s+-\s|\s*\||\s*>))",
    )
    .unwrap()
});

const MIN_NAME_LEN: usize = 2;
const MAX_NAME_LEN: usize = 40;
const MAX_NAME_WORDS: usize = 4;

/// Words that label transcript structure or sound cues rather than people.
const NON_NAME_KEYWORDS: &[&str] = &[
    "a",
    "action",
    "action item",
    "action items",
    "agenda",
    "an",
    "applause",
    "attendees",
    "audio",
    "background",
    "coughs",
    "crosstalk",
    "date",
    "decision",
    "decisions",
    "inaudible",
    "laughs",
    "laughter",
    "location",
    "meeting",
    "music",
    "next steps",
    "noise",
    "note",
    "notes",
    "participants",
    "pause",
    "question",
    "recording",
    "silence",
    "speaker",
    "subject",
    "summary",
    "the",
    "time",
    "todo",
    "topic",
    "transcript",
    "unintelligible",
    "unknown",
];

/// Distinct candidate names in order of first appearance.
///
/// Names are compared case-insensitively for de-duplication; the first spelling seen is kept.
/// Lines without a recognizable speaker are skipped, so this never fails.
pub fn extract_speakers(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut speakers = Vec::new();

    for line in text.lines() {
        let Some(name) = speaker_of(line) else {
            continue;
        };
        if seen.insert(name.to_lowercase()) {
            speakers.push(name);
        }
    }

    speakers
}

fn speaker_of(line: &str) -> Option<String> {
    let rest = match TIMESTAMP.find(line) {
        Some(timestamp) => &line[timestamp.end()..],
        None => line,
    };

    let captures = SPEAKER.captures(rest)?;
    let token = captures
        .name("bracket")
        .or_else(|| captures.name("paren"))
        .or_else(|| captures.name("plain"))?
        .as_str();

    // Collapse inner whitespace so "Jane   Smith" and "Jane Smith" agree
    let name = token.split_whitespace().collect::<Vec<_>>().join(" ");
    is_plausible_name(&name).then_some(name)
}

fn is_plausible_name(name: &str) -> bool {
    let len = name.chars().count();
    if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len) {
        return false;
    }
    // Letters plus the punctuation found in real names: "O'Neil", "Mary-Jane", "Dr. Lee"
    if !name
        .chars()
        .all(|c| c.is_alphabetic() || matches!(c, ' ' | '\'' | '-' | '.'))
    {
        return false;
    }

    let words: Vec<&str> = name.split(' ').collect();
    if words.len() > MAX_NAME_WORDS {
        return false;
    }

    let lower = name.to_lowercase();
    let first_word = words[0].to_lowercase();
    if NON_NAME_KEYWORDS.contains(&lower.as_str())
        || NON_NAME_KEYWORDS.contains(&first_word.as_str())
    {
        return false;
    }

    words.len() > 1 || name.chars().next().is_some_and(char::is_uppercase)
}
