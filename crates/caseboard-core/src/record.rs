use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::datetime::{format_sheet_date, parse_sheet_date};

/// Fixed A-Q column span, header in row 1.
pub const COLUMN_COUNT: usize = 17;
pub const HEADER_ROWS: usize = 1;
/// Zero-based offset of the Last Updated cell (column O).
pub const LAST_UPDATED_COLUMN: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    ProfileDiscovery,
    Applications,
    InitialDiscovery,
}

impl Phase {
    pub const ALL: [Phase; 3] = [
        Phase::ProfileDiscovery,
        Phase::Applications,
        Phase::InitialDiscovery,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::ProfileDiscovery => "Profile Discovery",
            Phase::Applications => "Applications",
            Phase::InitialDiscovery => "Initial Discovery",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == raw.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    WaitingOnClient,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::NotStarted,
        Status::InProgress,
        Status::Completed,
        Status::WaitingOnClient,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::NotStarted => "Not Started",
            Status::InProgress => "In Progress",
            Status::Completed => "Completed",
            Status::WaitingOnClient => "Waiting on Client",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == raw.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    #[default]
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == raw.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 3] = [
        PaymentStatus::Pending,
        PaymentStatus::Paid,
        PaymentStatus::Overdue,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Overdue => "Overdue",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == raw.trim())
    }
}

/// One spreadsheet row. Field order matches the sheet's A-Q layout.
///
/// `days_to_due` and `overdue` are derived at write time and stored; a
/// record reflects the state at its last save, not the moment it is
/// viewed. `last_updated` is always server-set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskRecord {
    pub record_id: String,
    pub client_name: String,
    pub email: String,
    pub phone: String,
    pub task_name: String,
    pub phase: Phase,
    pub status: Status,
    pub priority: Priority,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub follow_up_date: Option<NaiveDate>,
    pub days_to_due: i64,
    pub overdue: bool,
    pub notes: String,
    pub last_updated: String,
    pub drive_link: String,
    pub payment_status: PaymentStatus,
}

impl TaskRecord {
    /// All seventeen cells in column order, with the Last Updated cell
    /// taken from the supplied stamp rather than the record.
    pub fn to_cells(&self, stamp: &str) -> Vec<String> {
        vec![
            self.record_id.clone(),
            self.client_name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.task_name.clone(),
            self.phase.as_str().to_string(),
            self.status.as_str().to_string(),
            self.priority.as_str().to_string(),
            self.start_date.map(format_sheet_date).unwrap_or_default(),
            self.due_date.map(format_sheet_date).unwrap_or_default(),
            self.follow_up_date
                .map(format_sheet_date)
                .unwrap_or_default(),
            self.days_to_due.to_string(),
            if self.overdue { "Yes" } else { "No" }.to_string(),
            self.notes.clone(),
            stamp.to_string(),
            self.drive_link.clone(),
            self.payment_status.as_str().to_string(),
        ]
    }

    /// Lenient parse of a stored row. The values API omits trailing
    /// empty cells, so short rows are padded with empty strings; enum
    /// text nothing recognizes falls back to the first variant, and
    /// unparseable dates become `None`.
    pub fn from_cells(cells: &[String]) -> Self {
        let cell = |idx: usize| -> &str { cells.get(idx).map(String::as_str).unwrap_or("") };

        Self {
            record_id: cell(0).trim().to_string(),
            client_name: cell(1).trim().to_string(),
            email: cell(2).trim().to_string(),
            phone: cell(3).trim().to_string(),
            task_name: cell(4).trim().to_string(),
            phase: Phase::parse(cell(5)).unwrap_or_default(),
            status: Status::parse(cell(6)).unwrap_or_default(),
            priority: Priority::parse(cell(7)).unwrap_or_default(),
            start_date: parse_sheet_date(cell(8)),
            due_date: parse_sheet_date(cell(9)),
            follow_up_date: parse_sheet_date(cell(10)),
            days_to_due: cell(11).trim().parse().unwrap_or(0),
            overdue: cell(12).trim().eq_ignore_ascii_case("yes"),
            notes: cell(13).to_string(),
            last_updated: cell(14).trim().to_string(),
            drive_link: cell(15).trim().to_string(),
            payment_status: PaymentStatus::parse(cell(16)).unwrap_or_default(),
        }
    }
}

/// Identifier for the next appended record: `REC_` plus the 1-based row
/// count, zero-padded to four digits. Sequential by current table size,
/// documented as not collision-safe.
pub fn next_record_id(current_rows: usize) -> String {
    format!("REC_{:04}", current_rows + 1)
}

pub fn is_record_id(raw: &str) -> bool {
    static RECORD_ID_RE: OnceLock<Regex> = OnceLock::new();
    let re = RECORD_ID_RE
        .get_or_init(|| Regex::new(r"^REC_\d{4,}$").expect("record id pattern is valid"));
    re.is_match(raw.trim())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn enum_text_round_trips() {
        for phase in Phase::ALL {
            assert_eq!(Phase::parse(phase.as_str()), Some(phase));
        }
        for status in Status::ALL {
            assert_eq!(Status::parse(status.as_str()), Some(status));
        }
        for priority in Priority::ALL {
            assert_eq!(Priority::parse(priority.as_str()), Some(priority));
        }
        for payment in PaymentStatus::ALL {
            assert_eq!(PaymentStatus::parse(payment.as_str()), Some(payment));
        }
    }

    #[test]
    fn unknown_enum_text_falls_back_to_first_variant() {
        let mut cells = vec![String::new(); COLUMN_COUNT];
        cells[6] = "Blocked".to_string();
        cells[16] = "Invoiced".to_string();

        let record = TaskRecord::from_cells(&cells);
        assert_eq!(record.status, Status::NotStarted);
        assert_eq!(record.payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn cells_are_seventeen_wide_with_stamp_in_column_o() {
        let record = TaskRecord {
            record_id: "REC_0007".to_string(),
            client_name: "Ada".to_string(),
            task_name: "Resume review".to_string(),
            status: Status::InProgress,
            due_date: Some(date(2026, 9, 1)),
            overdue: true,
            days_to_due: -3,
            ..TaskRecord::default()
        };

        let cells = record.to_cells("2026-08-26 10:00:00");
        assert_eq!(cells.len(), COLUMN_COUNT);
        assert_eq!(cells[0], "REC_0007");
        assert_eq!(cells[6], "In Progress");
        assert_eq!(cells[9], "2026-09-01");
        assert_eq!(cells[11], "-3");
        assert_eq!(cells[12], "Yes");
        assert_eq!(cells[LAST_UPDATED_COLUMN], "2026-08-26 10:00:00");
    }

    #[test]
    fn short_rows_parse_with_empty_tail() {
        let cells = vec![
            "REC_0001".to_string(),
            "Ada".to_string(),
            String::new(),
            String::new(),
            "Mock interview".to_string(),
        ];

        let record = TaskRecord::from_cells(&cells);
        assert_eq!(record.record_id, "REC_0001");
        assert_eq!(record.task_name, "Mock interview");
        assert_eq!(record.notes, "");
        assert_eq!(record.due_date, None);
        assert!(!record.overdue);
    }

    #[test]
    fn cell_round_trip_preserves_fields() {
        let record = TaskRecord {
            record_id: "REC_0012".to_string(),
            client_name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            task_name: "MBA essays".to_string(),
            phase: Phase::Applications,
            status: Status::WaitingOnClient,
            priority: Priority::Low,
            start_date: Some(date(2026, 8, 1)),
            due_date: Some(date(2026, 8, 20)),
            follow_up_date: Some(date(2026, 8, 28)),
            days_to_due: -6,
            overdue: true,
            notes: "Draft two pending".to_string(),
            drive_link: "https://drive.example/abc".to_string(),
            payment_status: PaymentStatus::Paid,
            ..TaskRecord::default()
        };

        let parsed = TaskRecord::from_cells(&record.to_cells("2026-08-26 09:30:00"));
        assert_eq!(parsed.last_updated, "2026-08-26 09:30:00");
        assert_eq!(
            TaskRecord {
                last_updated: String::new(),
                ..parsed
            },
            record
        );
    }

    #[test]
    fn nth_append_gets_padded_sequential_id() {
        assert_eq!(next_record_id(0), "REC_0001");
        assert_eq!(next_record_id(3), "REC_0004");
        assert_eq!(next_record_id(9999), "REC_10000");
    }

    #[test]
    fn record_id_format() {
        assert!(is_record_id("REC_0001"));
        assert!(is_record_id("REC_10000"));
        assert!(!is_record_id("REC_1"));
        assert!(!is_record_id("rec_0001"));
        assert!(!is_record_id(""));
    }
}
