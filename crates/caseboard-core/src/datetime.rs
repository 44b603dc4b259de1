use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::record::{Status, TaskRecord};

const TIMEZONE_ENV_VAR: &str = "CASEBOARD_TIMEZONE";

/// The operation's business timezone. Calendar-day arithmetic ("today",
/// overdue checks) runs in this zone, not in UTC, so a coach in the
/// evening does not see tomorrow's dates flip early.
pub fn business_timezone() -> &'static Tz {
    static BUSINESS_TZ: OnceLock<Tz> = OnceLock::new();
    BUSINESS_TZ.get_or_init(resolve_business_timezone)
}

fn resolve_business_timezone() -> Tz {
    if let Ok(raw) = std::env::var(TIMEZONE_ENV_VAR) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            match trimmed.parse::<Tz>() {
                Ok(tz) => {
                    tracing::info!(timezone = %trimmed, "using business timezone from env");
                    return tz;
                }
                Err(err) => {
                    tracing::warn!(
                        timezone = %trimmed,
                        error = %err,
                        "invalid CASEBOARD_TIMEZONE; falling back to UTC"
                    );
                }
            }
        }
    }
    chrono_tz::UTC
}

#[must_use]
pub fn business_today(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(business_timezone()).date_naive()
}

/// Signed whole-day civil difference: negative exactly when the due
/// date is past, zero on the same day.
#[must_use]
pub fn days_to_due(due: NaiveDate, today: NaiveDate) -> i64 {
    due.signed_duration_since(today).num_days()
}

/// A task is overdue when it is not completed and its due date is
/// strictly before today. Evaluated once per write, never at read time.
#[must_use]
pub fn is_overdue(status: Status, due: NaiveDate, today: NaiveDate) -> bool {
    status != Status::Completed && due < today
}

/// Recompute the stored derived fields at the moment of a write.
pub fn recompute_derived(record: &mut TaskRecord, now: DateTime<Utc>) {
    let today = business_today(now);
    match record.due_date {
        Some(due) => {
            record.days_to_due = days_to_due(due, today);
            record.overdue = is_overdue(record.status, due, today);
        }
        None => {
            record.days_to_due = 0;
            record.overdue = false;
        }
    }
}

const SHEET_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y"];

/// Lenient parse of a stored date cell. Unparseable text yields `None`
/// and callers substitute today; a bad cell is never a hard error.
#[must_use]
pub fn parse_sheet_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    SHEET_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

#[must_use]
pub fn format_sheet_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Last Updated stamp, rendered in the business timezone.
#[must_use]
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.with_timezone(business_timezone())
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn days_to_due_sign_matches_calendar_distance() {
        let today = date(2026, 8, 26);
        assert_eq!(days_to_due(date(2026, 8, 25), today), -1);
        assert_eq!(days_to_due(today, today), 0);
        assert_eq!(days_to_due(date(2026, 8, 29), today), 3);
    }

    #[test]
    fn overdue_requires_open_status_and_past_due_date() {
        let today = date(2026, 8, 26);
        let yesterday = date(2026, 8, 25);
        let tomorrow = date(2026, 8, 27);

        assert!(is_overdue(Status::InProgress, yesterday, today));
        assert!(is_overdue(Status::NotStarted, yesterday, today));
        assert!(is_overdue(Status::WaitingOnClient, yesterday, today));
        assert!(!is_overdue(Status::Completed, yesterday, today));
        assert!(!is_overdue(Status::InProgress, today, today));
        assert!(!is_overdue(Status::InProgress, tomorrow, today));
    }

    #[test]
    fn overdue_agrees_with_days_to_due_sign() {
        let today = date(2026, 8, 26);
        for offset in -4_i64..4 {
            let due = today + Duration::days(offset);
            assert_eq!(
                is_overdue(Status::InProgress, due, today),
                days_to_due(due, today) < 0,
            );
        }
    }

    #[test]
    fn recompute_overwrites_stale_derived_fields() {
        let now = Utc
            .with_ymd_and_hms(2026, 8, 26, 12, 0, 0)
            .single()
            .expect("valid instant");

        let mut record = TaskRecord {
            status: Status::InProgress,
            due_date: Some(date(2026, 8, 20)),
            days_to_due: 99,
            overdue: false,
            ..TaskRecord::default()
        };
        recompute_derived(&mut record, now);
        assert_eq!(record.days_to_due, -6);
        assert!(record.overdue);

        record.status = Status::Completed;
        recompute_derived(&mut record, now);
        assert!(!record.overdue);
        assert_eq!(record.days_to_due, -6);
    }

    #[test]
    fn recompute_without_due_date_is_neutral() {
        let now = Utc
            .with_ymd_and_hms(2026, 8, 26, 12, 0, 0)
            .single()
            .expect("valid instant");
        let mut record = TaskRecord {
            days_to_due: -12,
            overdue: true,
            ..TaskRecord::default()
        };
        recompute_derived(&mut record, now);
        assert_eq!(record.days_to_due, 0);
        assert!(!record.overdue);
    }

    #[test]
    fn stored_dates_parse_leniently() {
        assert_eq!(parse_sheet_date("2026-08-26"), Some(date(2026, 8, 26)));
        assert_eq!(parse_sheet_date(" 2026-08-26 "), Some(date(2026, 8, 26)));
        assert_eq!(parse_sheet_date("08/26/2026"), Some(date(2026, 8, 26)));
        assert_eq!(parse_sheet_date("26-08-2026"), Some(date(2026, 8, 26)));
        assert_eq!(parse_sheet_date(""), None);
        assert_eq!(parse_sheet_date("next Tuesday"), None);
    }

    #[test]
    fn timestamp_uses_sheet_format() {
        let now = Utc
            .with_ymd_and_hms(2026, 8, 26, 9, 5, 3)
            .single()
            .expect("valid instant");
        let stamp = format_timestamp(now);
        assert_eq!(stamp.len(), 19);
        assert!(stamp.starts_with("2026-08-26"));
    }
}
