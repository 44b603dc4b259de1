use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use caseboard_core::record::TaskRecord;
use serde::Deserialize;
use tracing::debug;

use crate::html;
use crate::state::{AppState, error_response};

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    pub client: Option<String>,
}

/// Read-only screen: pick a client, see that client's tasks as cards.
pub async fn clients(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Response {
    let table = match state.table().await {
        Ok(table) => table,
        Err(err) => return error_response(&state, &err),
    };

    let names = client_names(&table);
    let selected = query
        .client
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    let mut body = String::from("<h2>View Client Details</h2>");
    body.push_str(&client_picker(&names, selected));

    if let Some(name) = selected {
        debug!(client = %name, "rendering client cards");
        body.push_str(&format!("<h3>Tasks for {}</h3>", html::escape(name)));
        let mut any = false;
        for record in table.iter().filter(|r| r.client_name == name) {
            body.push_str(&task_card(record));
            any = true;
        }
        if !any {
            body.push_str("<p>No tasks for this client.</p>");
        }
    }

    html::page("View Clients", &body, state.has_logo).into_response()
}

/// Distinct non-blank client names, sorted.
pub fn client_names(table: &[TaskRecord]) -> Vec<String> {
    let mut names: Vec<String> = table
        .iter()
        .map(|record| record.client_name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    names.sort();
    names.dedup();
    names
}

fn client_picker(names: &[String], selected: Option<&str>) -> String {
    let options: Vec<&str> = names.iter().map(String::as_str).collect();
    format!(
        "<form method=\"get\" action=\"/clients\">{}<button type=\"submit\">Show</button></form>",
        html::select_field("Select Client", "client", &options, selected.unwrap_or(""))
    )
}

fn task_card(record: &TaskRecord) -> String {
    let mut card = format!(
        "<div class=\"card\"><h4>Task: {} (Status: {})</h4>",
        html::escape(&record.task_name),
        record.status.as_str()
    );

    card.push_str(&html::detail("Phase", record.phase.as_str(), "N/A"));
    card.push_str(&html::detail("Priority", record.priority.as_str(), "N/A"));
    card.push_str(&html::detail(
        "Start Date",
        &record
            .start_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        "N/A",
    ));
    card.push_str(&html::detail(
        "Due Date",
        &record
            .due_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        "N/A",
    ));
    card.push_str(&html::detail(
        "Follow-Up",
        &record
            .follow_up_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        "N/A",
    ));
    card.push_str(&html::detail("Email", &record.email, "N/A"));
    card.push_str(&html::detail("Phone", &record.phone, "N/A"));
    card.push_str(&html::detail(
        "Days to Due",
        &record.days_to_due.to_string(),
        "N/A",
    ));
    card.push_str(&html::detail(
        "Overdue?",
        if record.overdue { "Yes" } else { "No" },
        "No",
    ));
    card.push_str(&html::detail(
        "Payment",
        record.payment_status.as_str(),
        "Pending",
    ));
    card.push_str(&html::detail("Notes", &record.notes, "—"));

    if !record.drive_link.trim().is_empty() {
        card.push_str(&format!(
            "<p><strong>Drive</strong>: <a href=\"{0}\">{0}</a></p>",
            html::escape(&record.drive_link)
        ));
    }
    card.push_str(&html::detail("Last Updated", &record.last_updated, "—"));
    card.push_str("</div>");
    card
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(client: &str, task: &str) -> TaskRecord {
        TaskRecord {
            client_name: client.to_string(),
            task_name: task.to_string(),
            ..TaskRecord::default()
        }
    }

    #[test]
    fn client_names_are_sorted_distinct_and_non_blank() {
        let table = vec![
            record("Grace", "a"),
            record("Ada", "b"),
            record("  ", "c"),
            record("Ada", "d"),
            record("", "e"),
        ];
        assert_eq!(client_names(&table), vec!["Ada", "Grace"]);
    }

    #[test]
    fn cards_render_placeholders_for_absent_fields() {
        let card = task_card(&record("Ada", "Resume review"));
        assert!(card.contains("Task: Resume review (Status: Not Started)"));
        assert!(card.contains("<strong>Email</strong>: N/A"));
        assert!(card.contains("<strong>Start Date</strong>: N/A"));
        assert!(card.contains("<strong>Notes</strong>: —"));
        assert!(!card.contains("<strong>Drive</strong>"));
    }

    #[test]
    fn cards_link_the_drive_url_when_present() {
        let mut rec = record("Ada", "Resume review");
        rec.drive_link = "https://drive.example/doc".to_string();
        let card = task_card(&rec);
        assert!(card.contains("<a href=\"https://drive.example/doc\">"));
    }
}
