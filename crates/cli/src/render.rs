//! Plain-text rendering of snapshots and the dashboard view.

use intake_core::{ObserverView, PatientField, PatientSnapshot};

/// One `name: value` line per non-empty field, followed by the status.
pub fn render_snapshot(snapshot: &PatientSnapshot) -> String {
    let mut lines: Vec<String> = PatientField::ALL
        .into_iter()
        .filter(|field| !snapshot.get(*field).is_empty())
        .map(|field| format!("  {field}: {}", snapshot.get(field)))
        .collect();

    if lines.is_empty() {
        lines.push("  (no fields filled)".to_string());
    }
    lines.push(format!("  status: {}", snapshot.status));
    lines.join("\n")
}

pub fn render_view(view: &ObserverView) -> String {
    format!(
        "[{}] connection: {} | last update: {}\n{}",
        view.snapshot().status,
        view.connection(),
        view.last_update_text(),
        render_snapshot(view.snapshot())
    )
}
