use std::fmt::Write;

use super::escape_html;
use crate::app::PollList;
use crate::models::{Poll, PollId};

pub fn render_list_view(out: &mut String, polls: &PollList, pending_delete: Option<PollId>) {
    let _ = writeln!(out, r#"<section id="list-view">"#);
    let _ = writeln!(
        out,
        r#"<button id="create-poll-btn" class="btn btn-primary" data-action="new">+ New poll</button>"#
    );

    if let Some(id) = pending_delete {
        let _ = writeln!(
            out,
            r#"<div class="confirm" data-poll-id="{id}">Delete poll {id}? This cannot be undone. <button data-action="confirm-delete">Delete</button> <button data-action="cancel-delete">Cancel</button></div>"#
        );
    }

    match polls {
        PollList::Loading => {
            let _ = writeln!(out, r#"<div id="loading">Loading polls...</div>"#);
        }
        PollList::Loaded(polls) if !polls.is_empty() => {
            let _ = writeln!(out, r#"<div id="polls-container">"#);
            for poll in polls {
                render_card(out, poll);
            }
            let _ = writeln!(out, "</div>");
        }
        PollList::Loaded(_) | PollList::Failed => {
            let _ = writeln!(
                out,
                r#"<div id="empty-state">No polls yet. Create the first one!</div>"#
            );
        }
    }

    let _ = writeln!(out, "</section>");
}

fn render_card(out: &mut String, poll: &Poll) {
    let _ = writeln!(out, r#"<div class="poll-card" data-poll-id="{}">"#, poll.id);
    let _ = writeln!(out, "  <h3>{}</h3>", escape_html(&poll.question));
    let _ = writeln!(out, r#"  <div class="poll-meta"><div class="poll-stats">"#);
    let _ = writeln!(out, "    <span>📝 {} options</span>", poll.options.len());
    let _ = writeln!(out, "    <span>🗳️ {} votes</span>", poll.total_votes());
    if let Some(created) = poll.created_at {
        let _ = writeln!(out, "    <span>📅 {}</span>", created.format("%Y-%m-%d"));
    }
    let _ = writeln!(out, "  </div>");
    let _ = writeln!(
        out,
        r#"  <div class="poll-actions"><button class="icon-btn delete-btn" data-action="delete" data-poll-id="{}" title="Delete">🗑️</button></div>"#,
        poll.id
    );
    let _ = writeln!(out, "  </div>\n</div>");
}
