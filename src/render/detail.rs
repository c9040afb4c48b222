use std::fmt::Write;

use super::escape_html;
use crate::app::DetailState;
use crate::models::{Poll, PollStats};
use crate::voting::calculate_results;

pub fn render_detail_view(out: &mut String, detail: &DetailState) {
    let poll = &detail.poll;

    let _ = writeln!(out, r#"<section id="detail-view">"#);
    let _ = writeln!(
        out,
        r#"<button id="back-from-detail-btn" class="btn" data-action="back">← Back</button>"#
    );
    let _ = writeln!(out, r#"<div class="poll-detail" data-poll-id="{}">"#, poll.id);
    let _ = writeln!(out, "<h2>{}</h2>", escape_html(&poll.question));

    let _ = writeln!(out, r#"<div class="voting-section"><h3>Vote</h3><div class="voting-options">"#);
    for (i, option) in poll.options.iter().enumerate() {
        let selected = if detail.selected == Some(i) { " selected" } else { "" };
        let _ = writeln!(
            out,
            r#"  <div class="vote-option{}" data-index="{}"><span>{}</span><span>→</span></div>"#,
            selected,
            i,
            escape_html(option)
        );
    }
    let _ = writeln!(out, "</div>");

    let disabled = if detail.can_submit() { "" } else { " disabled" };
    let label = if detail.submitting { "Voting..." } else { "Vote" };
    let _ = writeln!(
        out,
        r#"<button id="submit-vote-btn" class="btn btn-primary btn-large"{}>{}</button>"#,
        disabled, label
    );
    let _ = writeln!(out, "</div>");

    render_results(out, poll);
    if let Some(stats) = &detail.stats {
        render_stats(out, stats);
    }

    let _ = writeln!(out, "</div>\n</section>");
}

// One bar per option; the inline label is dropped on narrow bars
pub fn render_results(out: &mut String, poll: &Poll) {
    let _ = writeln!(out, r#"<div class="results-container"><h3>Results</h3>"#);
    for result in calculate_results(poll) {
        let percentage = result.percentage;
        let bar_label = if percentage.shows_bar_label() {
            format!("{}%", percentage)
        } else {
            String::new()
        };
        let _ = writeln!(out, r#"  <div class="result-item">"#);
        let _ = writeln!(
            out,
            r#"    <div class="result-header"><span>{}</span><span>{} votes ({}%)</span></div>"#,
            escape_html(result.label),
            result.votes,
            percentage
        );
        let _ = writeln!(
            out,
            r#"    <div class="result-bar-container"><div class="result-bar" style="width: {}%">{}</div></div>"#,
            percentage, bar_label
        );
        let _ = writeln!(out, "  </div>");
    }
    let _ = writeln!(
        out,
        r#"  <div class="total-votes"><strong>{}</strong> votes in total</div>"#,
        poll.total_votes()
    );
    let _ = writeln!(out, "</div>");
}

fn render_stats(out: &mut String, stats: &PollStats) {
    let _ = writeln!(out, r#"<table class="poll-stats"><caption>Server statistics</caption>"#);
    for row in &stats.results {
        let _ = writeln!(
            out,
            "  <tr><td>{}</td><td>{}</td><td>{:.2}%</td></tr>",
            escape_html(&row.option),
            row.votes,
            row.percentage
        );
    }
    let _ = writeln!(
        out,
        "  <tr><th>Total</th><th>{}</th><th></th></tr>\n</table>",
        stats.total_votes
    );
}
