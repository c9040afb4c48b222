use log::{debug, error, info, warn};
use std::time::Duration;

use super::{ClientState, CreateForm, DetailState, PollList, PushStatus, View};
use crate::error::{RequestError, ValidationError};
use crate::models::{NewPoll, Poll, PollId, PollStats, PushMessage, ServerStatus};
use crate::notify::Level;

// Everything that can happen to the client: user intents, request
// completions and push-channel events
#[derive(Debug)]
pub enum Msg {
    Start,
    ShowList,
    Refresh,
    NewPoll,
    SetQuestion(String),
    SetOption(usize, String),
    AddOption,
    RemoveOption(usize),
    SubmitPoll,
    OpenPoll(PollId),
    SelectOption(usize),
    SubmitVote,
    ShowStats,
    RequestDelete(PollId),
    ConfirmDelete,
    CancelDelete,
    SeedSamples,
    Quit,

    PollsLoaded(Result<Vec<Poll>, RequestError>),
    PollOpened(PollId, Result<Poll, RequestError>),
    PollCreated(Result<Option<Poll>, RequestError>),
    PollDeleted(PollId, Result<(), RequestError>),
    VoteSettled(PollId, Result<(), RequestError>),
    StatsLoaded(PollId, Result<PollStats, RequestError>),
    SamplesSeeded(Result<ServerStatus, RequestError>),

    Push(PushMessage),
    PushStatus(PushStatus),
    DismissNotification(u64),
}

// Side effects requested by `update`, executed by the event loop
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Render,
    LoadPolls,
    FetchPoll(PollId),
    CreatePoll(NewPoll),
    DeletePoll(PollId),
    Vote { poll_id: PollId, option_index: usize },
    FetchStats(PollId),
    SeedSamples,
    DismissNotification { id: u64, after: Duration },
    Shutdown,
}

// The view controller: applies one message and returns the effects to run
pub fn update(state: &mut ClientState, msg: Msg) -> Vec<Command> {
    let mut commands = Vec::new();

    match msg {
        Msg::Start => {
            info!("Starting in list view");
            show_list(state, &mut commands);
        }
        Msg::ShowList => {
            show_list(state, &mut commands);
        }
        Msg::Refresh => {
            if state.is_list() {
                state.polls = PollList::Loading;
                commands.push(Command::LoadPolls);
                commands.push(Command::Render);
            }
        }
        Msg::NewPoll => {
            if state.is_list() {
                state.view = View::Create(CreateForm::new());
                state.pending_delete = None;
                commands.push(Command::Render);
            } else {
                debug!("Ignoring new poll action outside the list view");
            }
        }
        Msg::SetQuestion(text) => {
            if let Some(form) = state.form_mut() {
                form.question = text;
                commands.push(Command::Render);
            }
        }
        Msg::SetOption(index, text) => {
            if let Some(form) = state.form_mut() {
                if let Some(slot) = form.options.get_mut(index) {
                    *slot = text;
                    commands.push(Command::Render);
                } else {
                    let len = form.options.len();
                    notify_validation(state, ValidationError::OptionOutOfRange { index, len }, &mut commands);
                }
            }
        }
        Msg::AddOption => {
            if let Some(form) = state.form_mut() {
                if form.can_add_option() {
                    form.options.push(String::new());
                    commands.push(Command::Render);
                } else {
                    let found = form.options.len() + 1;
                    notify_validation(
                        state,
                        ValidationError::TooManyOptions { max: crate::models::MAX_OPTIONS, found },
                        &mut commands,
                    );
                }
            }
        }
        Msg::RemoveOption(index) => {
            if let Some(form) = state.form_mut() {
                if form.can_remove_option() && index < form.options.len() {
                    form.options.remove(index);
                    commands.push(Command::Render);
                }
            }
        }
        Msg::SubmitPoll => {
            if let Some(form) = state.form_mut() {
                if form.submitting {
                    return commands;
                }
                match NewPoll::from_form(&form.question, &form.options) {
                    Ok(new_poll) => {
                        form.submitting = true;
                        commands.push(Command::CreatePoll(new_poll));
                        commands.push(Command::Render);
                    }
                    Err(e) => notify_validation(state, e, &mut commands),
                }
            }
        }
        Msg::OpenPoll(id) => {
            if state.is_list() {
                commands.push(Command::FetchPoll(id));
            }
        }
        Msg::SelectOption(index) => {
            if let Some(detail) = state.detail_mut() {
                if detail.submitting {
                    return commands;
                }
                let len = detail.poll.options.len();
                if index < len {
                    detail.selected = Some(index);
                    commands.push(Command::Render);
                } else {
                    notify_validation(state, ValidationError::OptionOutOfRange { index, len }, &mut commands);
                }
            }
        }
        Msg::SubmitVote => {
            if let Some(detail) = state.detail_mut() {
                if detail.submitting {
                    return commands;
                }
                let selected = detail.selected;
                match selected {
                    Some(option_index) => {
                        detail.submitting = true;
                        commands.push(Command::Vote {
                            poll_id: detail.poll.id,
                            option_index,
                        });
                        commands.push(Command::Render);
                    }
                    None => notify_validation(state, ValidationError::NoOptionSelected, &mut commands),
                }
            }
        }
        Msg::ShowStats => {
            if let Some(detail) = state.detail_mut() {
                commands.push(Command::FetchStats(detail.poll.id));
            }
        }
        Msg::RequestDelete(id) => {
            if state.is_list() {
                state.pending_delete = Some(id);
                commands.push(Command::Render);
            }
        }
        Msg::ConfirmDelete => {
            if let Some(id) = state.pending_delete.take() {
                commands.push(Command::DeletePoll(id));
                commands.push(Command::Render);
            }
        }
        Msg::CancelDelete => {
            if state.pending_delete.take().is_some() {
                commands.push(Command::Render);
            }
        }
        Msg::SeedSamples => {
            commands.push(Command::SeedSamples);
        }
        Msg::Quit => {
            commands.push(Command::Shutdown);
        }

        Msg::PollsLoaded(Ok(polls)) => {
            state.polls = PollList::Loaded(polls);
            if state.is_list() {
                commands.push(Command::Render);
            }
        }
        Msg::PollsLoaded(Err(e)) => {
            error!("Error loading polls: {}", e);
            state.polls = PollList::Failed;
            notify(state, Level::Error, "Failed to load polls.", &mut commands);
        }
        Msg::PollOpened(id, Ok(poll)) => {
            // Detail is only entered from the list; a late fetch never yanks the user out of the form
            if state.is_list() {
                info!("Opening poll {}", id);
                state.pending_delete = None;
                state.view = View::Detail(DetailState::new(poll));
                commands.push(Command::Render);
            } else {
                debug!("Dropping poll {} fetched after leaving the list view", id);
            }
        }
        Msg::PollOpened(id, Err(e)) => {
            error!("Error loading poll {}: {}", id, e);
            notify(state, Level::Error, "Failed to load the poll.", &mut commands);
        }
        Msg::PollCreated(Ok(_)) => {
            if let Some(form) = state.form_mut() {
                form.submitting = false;
            }
            if matches!(state.view, View::Create(_)) {
                show_list(state, &mut commands);
            } else if state.is_list() {
                commands.push(Command::LoadPolls);
            }
            notify(state, Level::Success, "Poll created!", &mut commands);
        }
        Msg::PollCreated(Err(e)) => {
            error!("Error creating poll: {}", e);
            if let Some(form) = state.form_mut() {
                form.submitting = false;
            }
            notify(state, Level::Error, "Failed to create the poll.", &mut commands);
        }
        Msg::PollDeleted(id, Ok(())) => {
            info!("Poll {} deleted", id);
            if state.is_list() {
                commands.push(Command::LoadPolls);
            }
            notify(state, Level::Success, "Poll deleted.", &mut commands);
        }
        Msg::PollDeleted(id, Err(e)) => {
            error!("Error deleting poll {}: {}", id, e);
            notify(state, Level::Error, "Failed to delete the poll.", &mut commands);
        }
        Msg::VoteSettled(id, result) => {
            if let Some(detail) = state.detail_mut() {
                if detail.poll.id == id {
                    detail.submitting = false;
                    // a recorded vote needs a fresh pick before the next submit
                    if result.is_ok() {
                        detail.selected = None;
                    }
                }
            }
            match result {
                Ok(()) => notify(state, Level::Success, "Vote recorded!", &mut commands),
                Err(e) => {
                    error!("Error submitting vote for poll {}: {}", id, e);
                    notify(state, Level::Error, "Failed to submit the vote.", &mut commands);
                }
            }
        }
        Msg::StatsLoaded(id, Ok(stats)) => {
            if let Some(detail) = state.detail_mut() {
                if detail.poll.id == id {
                    detail.stats = Some(stats);
                    commands.push(Command::Render);
                }
            }
        }
        Msg::StatsLoaded(id, Err(e)) => {
            error!("Error loading stats for poll {}: {}", id, e);
            notify(state, Level::Error, "Failed to load poll statistics.", &mut commands);
        }
        Msg::SamplesSeeded(Ok(status)) => {
            info!("Seed request answered: {} ({})", status.message, status.status);
            if state.is_list() {
                commands.push(Command::LoadPolls);
            }
            notify(state, Level::Success, status.message, &mut commands);
        }
        Msg::SamplesSeeded(Err(e)) => {
            error!("Error seeding sample polls: {}", e);
            notify(state, Level::Error, "Failed to create sample polls.", &mut commands);
        }

        Msg::Push(PushMessage::VoteUpdate { poll, .. }) => {
            apply_vote_update(state, poll.aligned(), &mut commands);
        }
        Msg::Push(PushMessage::Unknown) => {
            debug!("Ignoring push message of unknown type");
        }
        Msg::PushStatus(status) => {
            if state.push != status {
                state.push = status;
                commands.push(Command::Render);
            }
        }
        Msg::DismissNotification(id) => {
            if state.notifier.dismiss(id) {
                commands.push(Command::Render);
            }
        }
    }

    commands
}

fn show_list(state: &mut ClientState, commands: &mut Vec<Command>) {
    state.view = View::List;
    state.pending_delete = None;
    state.polls = PollList::Loading;
    commands.push(Command::LoadPolls);
    commands.push(Command::Render);
}

fn apply_vote_update(state: &mut ClientState, poll: Poll, commands: &mut Vec<Command>) {
    match &mut state.view {
        View::Detail(detail) if detail.poll.id == poll.id => {
            debug!("Live update for open poll {}", poll.id);
            detail.selected = None;
            detail.stats = None;
            detail.poll = poll;
            commands.push(Command::Render);
        }
        // A single snapshot cannot patch the aggregate list, so refetch it
        View::List => {
            debug!("Live update for poll {}, refreshing list", poll.id);
            commands.push(Command::LoadPolls);
        }
        view => {
            debug!("Discarding update for poll {} while in {} view", poll.id, view.name());
        }
    }
}

fn notify(state: &mut ClientState, level: Level, message: impl Into<String>, commands: &mut Vec<Command>) {
    let id = state.notifier.show(level, message);
    commands.push(Command::Render);
    commands.push(Command::DismissNotification {
        id,
        after: state.notifier.ttl(),
    });
}

fn notify_validation(state: &mut ClientState, e: ValidationError, commands: &mut Vec<Command>) {
    warn!("Validation failed: {}", e);
    let message = match &e {
        ValidationError::EmptyQuestion => "Please enter a question.".to_string(),
        ValidationError::TooFewOptions { min, .. } => format!("A poll needs at least {} options.", min),
        ValidationError::TooManyOptions { max, .. } => format!("A poll can have at most {} options.", max),
        ValidationError::DuplicateOption(option) => format!("Duplicate option: {}", option),
        ValidationError::NoOptionSelected => "Please choose an option.".to_string(),
        ValidationError::OptionOutOfRange { .. } => "That option does not exist.".to_string(),
    };
    notify(state, Level::Error, message, commands);
}
