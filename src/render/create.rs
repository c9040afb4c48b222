use std::fmt::Write;

use super::escape_html;
use crate::app::CreateForm;

pub fn render_create_view(out: &mut String, form: &CreateForm) {
    let _ = writeln!(out, r#"<section id="create-view">"#);
    let _ = writeln!(
        out,
        r#"<button id="back-to-list-btn" class="btn" data-action="cancel">← Back</button>"#
    );
    let _ = writeln!(out, r#"<form id="create-poll-form">"#);
    let _ = writeln!(
        out,
        r#"  <input type="text" id="poll-question" placeholder="Question" value="{}" required>"#,
        escape_html(&form.question)
    );

    let _ = writeln!(out, r#"  <div id="options-container">"#);
    let remove_disabled = if form.can_remove_option() { "" } else { " disabled" };
    for (i, option) in form.options.iter().enumerate() {
        let _ = writeln!(
            out,
            r#"    <div class="option-input"><input type="text" class="poll-option" placeholder="Option {}" value="{}" required><button type="button" class="btn-remove" data-index="{}"{}>❌</button></div>"#,
            i + 1,
            escape_html(option),
            i,
            remove_disabled
        );
    }
    let _ = writeln!(out, "  </div>");

    let add_disabled = if form.can_add_option() { "" } else { " disabled" };
    let _ = writeln!(
        out,
        r#"  <button type="button" id="add-option-btn" class="btn"{}>+ Add option</button>"#,
        add_disabled
    );
    let (submit_disabled, submit_label) = if form.submitting {
        (" disabled", "Creating...")
    } else {
        ("", "Create poll")
    };
    let _ = writeln!(
        out,
        r#"  <button type="submit" class="btn btn-primary"{}>{}</button>"#,
        submit_disabled, submit_label
    );
    let _ = writeln!(out, "</form>\n</section>");
}
