use axum::extract::{Form, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use caseboard_core::datetime::{
    business_today, format_timestamp, parse_sheet_date, recompute_derived,
};
use caseboard_core::error::TrackerError;
use caseboard_core::record::{
    next_record_id, PaymentStatus, Phase, Priority, Status, TaskRecord,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;

use crate::html;
use crate::state::{AppState, error_response};
use crate::view::client_names;

#[derive(Debug, Deserialize)]
pub struct ManageQuery {
    pub client: Option<String>,
    pub row: Option<usize>,
}

/// Shared field set for the edit and add forms. `row` is present only
/// on edit; `client_name` is trusted only on add (edits keep the
/// stored client, and the record id is never client-supplied).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskForm {
    #[serde(default)]
    pub row: Option<usize>,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub task_name: String,
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub follow_up_date: String,
    #[serde(default)]
    pub payment_status: String,
    #[serde(default)]
    pub drive_link: String,
    #[serde(default)]
    pub notes: String,
}

/// Manage screen: edit picker chain plus the add form.
pub async fn manage(State(state): State<AppState>, Query(query): Query<ManageQuery>) -> Response {
    let table = match state.table().await {
        Ok(table) => table,
        Err(err) => return error_response(&state, &err),
    };

    let names = client_names(&table);
    let today = business_today(Utc::now());
    let selected = query
        .client
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    let mut body = String::from("<h2>Manage Client Tasks</h2><h3>Edit Existing Task</h3>");
    body.push_str(&edit_client_picker(&names, selected));

    if let Some(client) = selected {
        let client_rows: Vec<(usize, &TaskRecord)> = table
            .iter()
            .enumerate()
            .filter(|(_, record)| record.client_name == client)
            .collect();

        if client_rows.is_empty() {
            body.push_str("<p>No tasks for this client.</p>");
        } else {
            body.push_str(&task_picker(client, &client_rows, query.row));

            if let Some(row) = query.row {
                let Some(record) = table.get(row).filter(|r| r.client_name == client) else {
                    return error_response(
                        &state,
                        &TrackerError::not_found(format!("task row {row} for client {client}")),
                    );
                };
                body.push_str(&edit_form(row, record, today));
            }
        }
    }

    body.push_str("<h3>Add New Task</h3>");
    body.push_str(&add_form(&names, None, today));

    html::page("Manage Tasks", &body, state.has_logo).into_response()
}

/// Full-row rewrite of the selected task. The record id and client
/// name are taken from the stored row; derived fields and the stamp
/// are recomputed at this moment.
pub async fn update(State(state): State<AppState>, Form(form): Form<TaskForm>) -> Response {
    let Some(row) = form.row else {
        return error_response(&state, &TrackerError::not_found("no task selected for edit"));
    };

    let table = match state.table().await {
        Ok(table) => table,
        Err(err) => return error_response(&state, &err),
    };
    let Some(stored) = table.get(row) else {
        return error_response(&state, &TrackerError::not_found(format!("task row {row}")));
    };

    let now = Utc::now();
    let mut record = assemble(&stored.record_id, &stored.client_name, &form, business_today(now));
    recompute_derived(&mut record, now);

    if let Err(err) = state
        .backend
        .update_row(row, &record, &format_timestamp(now))
        .await
    {
        return error_response(&state, &err);
    }
    state.invalidate().await;

    info!(record_id = %record.record_id, row, "task updated");
    confirmation(&state, &format!("Task {} updated.", record.record_id))
}

/// Append a new task. Required fields are checked before any backend
/// write; a failure re-renders the form with a field-specific error.
pub async fn add(State(state): State<AppState>, Form(form): Form<TaskForm>) -> Response {
    let now = Utc::now();
    let today = business_today(now);

    if let Err(err) = validate_new(&form) {
        let names = match state.table().await {
            Ok(table) => client_names(&table),
            Err(_) => Vec::new(),
        };
        let mut body = String::from("<h2>Manage Client Tasks</h2><h3>Add New Task</h3>");
        body.push_str(&format!(
            "<p class=\"error\">{}</p>",
            html::escape(&err.to_string())
        ));
        body.push_str(&add_form(&names, Some(&form), today));
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            html::page("Manage Tasks", &body, state.has_logo),
        )
            .into_response();
    }

    let table = match state.table().await {
        Ok(table) => table,
        Err(err) => return error_response(&state, &err),
    };

    let record_id = next_record_id(table.len());
    let mut record = assemble(&record_id, form.client_name.trim(), &form, today);
    recompute_derived(&mut record, now);

    if let Err(err) = state
        .backend
        .append_row(&record, &format_timestamp(now))
        .await
    {
        return error_response(&state, &err);
    }
    state.invalidate().await;

    info!(record_id = %record.record_id, "task added");
    confirmation(&state, &format!("Task {} added.", record.record_id))
}

/// Missing required fields on create abort before any write.
pub fn validate_new(form: &TaskForm) -> Result<(), TrackerError> {
    if form.task_name.trim().is_empty() {
        return Err(TrackerError::validation("Task/Project"));
    }
    if form.client_name.trim().is_empty() {
        return Err(TrackerError::validation("Client Name"));
    }
    Ok(())
}

/// Build the full record from form text. Stored enum strings are
/// constrained by the selects; anything else falls back to the first
/// variant. Unparseable or missing dates become today (lenient by
/// design). Derived fields are recomputed by the caller.
pub fn assemble(
    record_id: &str,
    client_name: &str,
    form: &TaskForm,
    today: NaiveDate,
) -> TaskRecord {
    TaskRecord {
        record_id: record_id.to_string(),
        client_name: client_name.to_string(),
        email: form.email.trim().to_string(),
        phone: form.phone.trim().to_string(),
        task_name: form.task_name.trim().to_string(),
        phase: Phase::parse(&form.phase).unwrap_or_default(),
        status: Status::parse(&form.status).unwrap_or_default(),
        priority: Priority::parse(&form.priority).unwrap_or_default(),
        start_date: Some(form_date(&form.start_date, today)),
        due_date: Some(form_date(&form.due_date, today)),
        follow_up_date: Some(form_date(&form.follow_up_date, today)),
        days_to_due: 0,
        overdue: false,
        notes: form.notes.clone(),
        last_updated: String::new(),
        drive_link: form.drive_link.trim().to_string(),
        payment_status: PaymentStatus::parse(&form.payment_status).unwrap_or_default(),
    }
}

pub fn form_date(raw: &str, today: NaiveDate) -> NaiveDate {
    parse_sheet_date(raw).unwrap_or(today)
}

fn phase_options() -> Vec<&'static str> {
    Phase::ALL.iter().map(|p| p.as_str()).collect()
}

fn status_options() -> Vec<&'static str> {
    Status::ALL.iter().map(|s| s.as_str()).collect()
}

fn priority_options() -> Vec<&'static str> {
    Priority::ALL.iter().map(|p| p.as_str()).collect()
}

fn payment_options() -> Vec<&'static str> {
    PaymentStatus::ALL.iter().map(|p| p.as_str()).collect()
}

fn hidden(name: &str, value: &str) -> String {
    format!(
        "<input type=\"hidden\" name=\"{}\" value=\"{}\">",
        html::escape(name),
        html::escape(value)
    )
}

fn edit_client_picker(names: &[String], selected: Option<&str>) -> String {
    let options: Vec<&str> = names.iter().map(String::as_str).collect();
    format!(
        "<form method=\"get\" action=\"/manage\">{}<button type=\"submit\">Choose</button></form>",
        html::select_field("Client", "client", &options, selected.unwrap_or(""))
    )
}

fn task_picker(client: &str, rows: &[(usize, &TaskRecord)], selected: Option<usize>) -> String {
    let mut out = format!(
        "<form method=\"get\" action=\"/manage\">{}<label>Task<select name=\"row\">",
        hidden("client", client)
    );
    for (index, record) in rows {
        let marker = if selected == Some(*index) {
            " selected"
        } else {
            ""
        };
        out.push_str(&format!(
            "<option value=\"{index}\"{marker}>{} (Status: {})</option>",
            html::escape(&record.task_name),
            record.status.as_str()
        ));
    }
    out.push_str("</select></label><button type=\"submit\">Choose</button></form>");
    out
}

fn edit_form(row: usize, record: &TaskRecord, today: NaiveDate) -> String {
    let mut out = String::from("<form method=\"post\" action=\"/manage/update\">");
    out.push_str(&hidden("row", &row.to_string()));
    out.push_str(&html::text_field(
        "Client Name",
        "client_name",
        &record.client_name,
        true,
    ));
    out.push_str(&html::text_field("Email", "email", &record.email, false));
    out.push_str(&html::text_field("Phone", "phone", &record.phone, false));
    out.push_str(&html::text_field(
        "Task/Project",
        "task_name",
        &record.task_name,
        false,
    ));
    out.push_str(&html::select_field(
        "Phase",
        "phase",
        &phase_options(),
        record.phase.as_str(),
    ));
    out.push_str(&html::select_field(
        "Status",
        "status",
        &status_options(),
        record.status.as_str(),
    ));
    out.push_str(&html::select_field(
        "Priority",
        "priority",
        &priority_options(),
        record.priority.as_str(),
    ));
    out.push_str(&html::date_field(
        "Start",
        "start_date",
        record.start_date.unwrap_or(today),
    ));
    out.push_str(&html::date_field(
        "Due",
        "due_date",
        record.due_date.unwrap_or(today),
    ));
    out.push_str(&html::date_field(
        "Follow-Up",
        "follow_up_date",
        record.follow_up_date.unwrap_or(today),
    ));
    out.push_str(&html::select_field(
        "Payment",
        "payment_status",
        &payment_options(),
        record.payment_status.as_str(),
    ));
    out.push_str(&html::text_field(
        "Drive Link",
        "drive_link",
        &record.drive_link,
        false,
    ));
    out.push_str(&html::textarea_field("Notes/Call Log", "notes", &record.notes));
    out.push_str("<button type=\"submit\">Update</button></form>");
    out
}

fn add_form(names: &[String], prefill: Option<&TaskForm>, today: NaiveDate) -> String {
    let blank = TaskForm::default();
    let form = prefill.unwrap_or(&blank);

    let mut out = String::from("<form method=\"post\" action=\"/manage/add\">");
    out.push_str(&format!(
        "<label>Client Name<input type=\"text\" name=\"client_name\" value=\"{}\" list=\"known-clients\"></label>",
        html::escape(&form.client_name)
    ));
    out.push_str("<datalist id=\"known-clients\">");
    for name in names {
        out.push_str(&format!("<option value=\"{}\">", html::escape(name)));
    }
    out.push_str("</datalist>");
    out.push_str(&html::text_field("Email", "email", &form.email, false));
    out.push_str(&html::text_field("Phone", "phone", &form.phone, false));
    out.push_str(&html::text_field(
        "Task/Project",
        "task_name",
        &form.task_name,
        false,
    ));
    out.push_str(&html::select_field(
        "Phase",
        "phase",
        &phase_options(),
        &form.phase,
    ));
    out.push_str(&html::select_field(
        "Status",
        "status",
        &status_options(),
        &form.status,
    ));
    out.push_str(&html::select_field(
        "Priority",
        "priority",
        &priority_options(),
        &form.priority,
    ));
    out.push_str(&html::date_field(
        "Start",
        "start_date",
        form_date(&form.start_date, today),
    ));
    out.push_str(&html::date_field(
        "Due",
        "due_date",
        form_date(&form.due_date, today),
    ));
    out.push_str(&html::date_field(
        "Follow-Up",
        "follow_up_date",
        form_date(&form.follow_up_date, today),
    ));
    out.push_str(&html::select_field(
        "Payment",
        "payment_status",
        &payment_options(),
        &form.payment_status,
    ));
    out.push_str(&html::text_field(
        "Drive Link",
        "drive_link",
        &form.drive_link,
        false,
    ));
    out.push_str(&html::textarea_field("Notes/Call Log", "notes", &form.notes));
    out.push_str("<button type=\"submit\">Add</button></form>");
    out
}

fn confirmation(state: &AppState, message: &str) -> Response {
    let body = format!(
        "<p class=\"ok\">{}</p><p><a href=\"/manage\">Back to manage</a> · \
         <a href=\"/clients\">View clients</a></p>",
        html::escape(message)
    );
    html::page("Done", &body, state.has_logo).into_response()
}
