mod create;
mod detail;
mod list;

use std::fmt::Write;

use crate::app::{ClientState, View};

// Full page markup for the current state; every user-supplied string goes through `escape_html`
pub fn render(state: &ClientState) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        r#"<header class="app-header"><h1>Polls</h1><span class="push-status {status}">{status}</span></header>"#,
        status = state.push.as_str()
    );

    if let Some(note) = state.notifier.current() {
        let _ = writeln!(
            out,
            r#"<div id="toast" class="toast {} show">{}</div>"#,
            note.level.as_str(),
            escape_html(&note.message)
        );
    }

    match &state.view {
        View::List => list::render_list_view(&mut out, &state.polls, state.pending_delete),
        View::Create(form) => create::render_create_view(&mut out, form),
        View::Detail(detail) => detail::render_detail_view(&mut out, detail),
    }

    out
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
