use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 10;

// Server-assigned poll identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PollId(pub i64);

impl fmt::Display for PollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PollId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(PollId)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poll {
    pub id: PollId,
    pub question: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub votes: Vec<u64>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Poll {
    #[cfg(test)]
    pub fn new(id: PollId, question: &str, options: &[&str], votes: &[u64]) -> Self {
        Self {
            id,
            question: question.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            votes: votes.to_vec(),
            created_at: None,
            updated_at: None,
        }
    }

    // Pads or truncates `votes` so every option has exactly one count
    pub fn aligned(mut self) -> Self {
        if self.votes.len() != self.options.len() {
            log::debug!(
                "Poll {} has {} options but {} vote counts, aligning",
                self.id,
                self.options.len(),
                self.votes.len()
            );
            self.votes.resize(self.options.len(), 0);
        }
        self
    }

    pub fn total_votes(&self) -> u64 {
        self.votes.iter().sum()
    }
}

// Body of POST /polls
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPoll {
    pub question: String,
    pub options: Vec<String>,
}

impl NewPoll {
    // Blank option rows are dropped and the rest trimmed before validation
    pub fn from_form(question: &str, options: &[String]) -> Result<Self, ValidationError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ValidationError::EmptyQuestion);
        }

        let options: Vec<String> = options
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        if options.len() < MIN_OPTIONS {
            return Err(ValidationError::TooFewOptions {
                min: MIN_OPTIONS,
                found: options.len(),
            });
        }
        if options.len() > MAX_OPTIONS {
            return Err(ValidationError::TooManyOptions {
                max: MAX_OPTIONS,
                found: options.len(),
            });
        }

        let mut seen = HashSet::new();
        for option in &options {
            if !seen.insert(option.as_str()) {
                return Err(ValidationError::DuplicateOption(option.clone()));
            }
        }

        Ok(Self {
            question: question.to_string(),
            options,
        })
    }
}

// Body of POST /polls/{id}/vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteRequest {
    pub option_index: usize,
}

// GET /polls/{id}/stats
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PollStats {
    pub poll_id: PollId,
    pub question: String,
    pub total_votes: u64,
    pub results: Vec<OptionStats>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OptionStats {
    pub option: String,
    pub votes: u64,
    pub percentage: f64,
}

// Generic status body returned by GET /, DELETE /polls/{id} and POST /init-data
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerStatus {
    pub status: String,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

// Messages the server pushes over the live channel
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushMessage {
    VoteUpdate {
        poll: Poll,
        #[serde(default)]
        total_votes: Option<u64>,
    },
    #[serde(other)]
    Unknown,
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

// The server emits ISO-8601 with or without an offset; naive values are taken as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => Some(Utc.from_utc_datetime(&naive)),
        Err(e) => {
            log::debug!("Ignoring unparseable timestamp {:?}: {}", raw, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn duplicate_options_are_rejected() {
        let err = NewPoll::from_form("Lunch?", &strings(&["A", "A"])).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateOption("A".into()));
    }

    #[test]
    fn duplicates_are_case_sensitive_and_trimmed() {
        let poll = NewPoll::from_form("Lunch?", &strings(&["a", "A"])).unwrap();
        assert_eq!(poll.options, strings(&["a", "A"]));

        let err = NewPoll::from_form("Lunch?", &strings(&[" A", "A "])).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateOption("A".into()));
    }

    #[test]
    fn blank_rows_do_not_count_as_options() {
        let err = NewPoll::from_form("Lunch?", &strings(&["A", "   "])).unwrap_err();
        assert_eq!(err, ValidationError::TooFewOptions { min: 2, found: 1 });

        let poll = NewPoll::from_form("  Lunch?  ", &strings(&["A", "", "B"])).unwrap();
        assert_eq!(poll.question, "Lunch?");
        assert_eq!(poll.options, strings(&["A", "B"]));
    }

    #[test]
    fn question_and_option_limits() {
        assert_eq!(
            NewPoll::from_form("  ", &strings(&["A", "B"])).unwrap_err(),
            ValidationError::EmptyQuestion
        );
        let eleven: Vec<String> = (0..11).map(|i| format!("opt {}", i)).collect();
        assert_eq!(
            NewPoll::from_form("Q", &eleven).unwrap_err(),
            ValidationError::TooManyOptions { max: 10, found: 11 }
        );
    }

    #[test]
    fn aligned_pads_and_truncates_votes() {
        let padded = Poll::new(PollId(1), "Q", &["A", "B", "C"], &[4]).aligned();
        assert_eq!(padded.votes, vec![4, 0, 0]);

        let truncated = Poll::new(PollId(1), "Q", &["A"], &[1, 2]).aligned();
        assert_eq!(truncated.votes, vec![1]);
        assert_eq!(truncated.total_votes(), 1);
    }

    #[test]
    fn decodes_server_poll_payload() {
        let poll: Poll = serde_json::from_str(
            r#"{"id": 7, "question": "Editor?", "options": ["Vim", "VS Code"],
                "votes": [3, 5], "created_at": "2025-03-01T12:30:00",
                "updated_at": "2025-03-01T12:31:00+00:00"}"#,
        )
        .unwrap();
        assert_eq!(poll.id, PollId(7));
        assert_eq!(poll.total_votes(), 8);
        assert_eq!(
            poll.created_at.map(|t| t.to_rfc3339()),
            Some("2025-03-01T12:30:00+00:00".to_string())
        );
        assert!(poll.updated_at.is_some());
    }

    #[test]
    fn decodes_push_messages() {
        let msg: PushMessage = serde_json::from_str(
            r#"{"type": "vote_update", "total_votes": 1,
                "poll": {"id": 2, "question": "Q", "options": ["A", "B"], "votes": [1, 0]}}"#,
        )
        .unwrap();
        match msg {
            PushMessage::VoteUpdate { poll, total_votes } => {
                assert_eq!(poll.id, PollId(2));
                assert_eq!(total_votes, Some(1));
            }
            other => panic!("unexpected message: {:?}", other),
        }

        let other: PushMessage = serde_json::from_str(r#"{"type": "heartbeat"}"#).unwrap();
        assert_eq!(other, PushMessage::Unknown);
    }
}
