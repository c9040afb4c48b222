pub mod update;

pub use update::{Command, Msg, update};

use crate::models::{MAX_OPTIONS, MIN_OPTIONS, Poll, PollId, PollStats};
use crate::notify::Notifier;
use std::time::Duration;

// Everything the client knows, owned by the event loop and passed to `update`/`render`
#[derive(Debug, Clone)]
pub struct ClientState {
    pub view: View,
    pub polls: PollList,
    // Poll awaiting delete confirmation (list view only)
    pub pending_delete: Option<PollId>,
    pub notifier: Notifier,
    pub push: PushStatus,
}

impl ClientState {
    pub fn new(notification_ttl: Duration) -> Self {
        Self {
            view: View::List,
            polls: PollList::Loading,
            pending_delete: None,
            notifier: Notifier::new(notification_ttl),
            push: PushStatus::Connecting,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.view, View::List)
    }

    pub fn detail_mut(&mut self) -> Option<&mut DetailState> {
        match &mut self.view {
            View::Detail(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut CreateForm> {
        match &mut self.view {
            View::Create(form) => Some(form),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    List,
    Create(CreateForm),
    Detail(DetailState),
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::List => "list",
            View::Create(_) => "create",
            View::Detail(_) => "detail",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollList {
    Loading,
    Loaded(Vec<Poll>),
    // Last fetch failed; shown as the empty state
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushStatus {
    Connecting,
    Open,
    Closed,
}

impl PushStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PushStatus::Connecting => "connecting",
            PushStatus::Open => "live",
            PushStatus::Closed => "reconnecting",
        }
    }
}

// Draft of a new poll; always holds between MIN_OPTIONS and MAX_OPTIONS rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateForm {
    pub question: String,
    pub options: Vec<String>,
    pub submitting: bool,
}

impl CreateForm {
    pub fn new() -> Self {
        Self {
            question: String::new(),
            options: vec![String::new(); MIN_OPTIONS],
            submitting: false,
        }
    }

    pub fn can_add_option(&self) -> bool {
        self.options.len() < MAX_OPTIONS
    }

    pub fn can_remove_option(&self) -> bool {
        self.options.len() > MIN_OPTIONS
    }
}

impl Default for CreateForm {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailState {
    pub poll: Poll,
    pub selected: Option<usize>,
    // A vote request is in flight; the submit control stays disabled
    pub submitting: bool,
    pub stats: Option<PollStats>,
}

impl DetailState {
    pub fn new(poll: Poll) -> Self {
        Self {
            poll,
            selected: None,
            submitting: false,
            stats: None,
        }
    }

    pub fn can_submit(&self) -> bool {
        self.selected.is_some() && !self.submitting
    }
}
