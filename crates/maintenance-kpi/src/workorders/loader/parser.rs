use super::normalizer::clean_label;
use crate::workorders::domain::{hours_between, normalize_priority, WorkOrder, WorkStatus};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use serde::{Deserialize, Deserializer};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// One source row keyed by normalized header names. Every column is optional.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct WorkOrderRow {
    #[serde(rename = "orderdate", default, deserialize_with = "empty_string_as_none")]
    order_date: Option<String>,
    #[serde(rename = "reporteddate", default, deserialize_with = "empty_string_as_none")]
    reported_date: Option<String>,
    #[serde(
        rename = "actualstartdatetime",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    actual_start: Option<String>,
    #[serde(
        rename = "actualenddatetime",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    actual_end: Option<String>,
    #[serde(
        rename = "requiredbydate",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    required_by: Option<String>,
    #[serde(rename = "workstatus", default, deserialize_with = "empty_string_as_none")]
    work_status: Option<String>,
    #[serde(rename = "worktype", default, deserialize_with = "empty_string_as_none")]
    work_type: Option<String>,
    #[serde(rename = "workpriority", default, deserialize_with = "empty_string_as_none")]
    work_priority: Option<String>,
    #[serde(
        rename = "parentlocation",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    location: Option<String>,
    #[serde(rename = "duration", default, deserialize_with = "empty_string_as_none")]
    duration: Option<String>,
    #[serde(
        rename = "planneddurationhrs",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    planned_duration: Option<String>,
}

/// Counts of cells that were present but could not be parsed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ParseIssues {
    pub(crate) timestamps: usize,
    pub(crate) numbers: usize,
}

impl WorkOrderRow {
    pub(crate) fn from_record(
        record: &StringRecord,
        headers: &StringRecord,
    ) -> Result<Self, csv::Error> {
        record.deserialize(Some(headers))
    }

    pub(crate) fn into_work_order(self, row: usize, issues: &mut ParseIssues) -> WorkOrder {
        let mut timestamp = |value: Option<String>| -> Option<NaiveDateTime> {
            let raw = value?;
            let parsed = parse_datetime(&raw);
            if parsed.is_none() {
                issues.timestamps += 1;
            }
            parsed
        };

        let order_date = timestamp(self.order_date);
        let reported_date = timestamp(self.reported_date);
        let actual_start = timestamp(self.actual_start);
        let actual_end = timestamp(self.actual_end);
        let required_by = timestamp(self.required_by);

        let mut number = |value: Option<String>| -> Option<f64> {
            let raw = value?;
            let parsed = parse_number(&raw);
            if parsed.is_none() {
                issues.numbers += 1;
            }
            parsed
        };

        let duration_hours = number(self.duration);
        let planned_duration_hours = number(self.planned_duration);

        WorkOrder {
            row,
            order_date,
            reported_date,
            actual_start,
            actual_end,
            required_by,
            work_status: WorkStatus::parse(self.work_status.as_deref().unwrap_or_default()),
            work_type: self.work_type.as_deref().and_then(clean_label),
            work_priority: self.work_priority.as_deref().and_then(normalize_priority),
            location: self.location.as_deref().and_then(clean_label),
            duration_hours,
            planned_duration_hours,
        }
    }
}

/// Fills `duration_hours` from actual start/end when the supplied column carried
/// no usable value in any row.
pub(crate) fn derive_missing_durations(orders: &mut [WorkOrder]) -> bool {
    if orders.iter().any(|order| order.duration_hours.is_some()) {
        return false;
    }

    for order in orders.iter_mut() {
        order.duration_hours = match (order.actual_start, order.actual_end) {
            (Some(start), Some(end)) => Some(hours_between(start, end)),
            _ => None,
        };
    }
    true
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

pub(crate) fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Offsets are dropped so zoned values line up with the naive wall-clock columns.
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local());
    }

    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
    {
        return Some(dt);
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, 0))
            .expect("valid timestamp")
    }

    #[test]
    fn parse_datetime_accepts_common_export_formats() {
        assert_eq!(
            parse_datetime("2024-05-01T10:15:00Z"),
            Some(at(2024, 5, 1, 10, 15))
        );
        assert_eq!(
            parse_datetime("2024-05-01 10:15:00"),
            Some(at(2024, 5, 1, 10, 15))
        );
        assert_eq!(parse_datetime("5/1/2024 10:15"), Some(at(2024, 5, 1, 10, 15)));
        assert_eq!(
            parse_datetime("05/01/2024 10:15:00 PM"),
            Some(at(2024, 5, 1, 22, 15))
        );
        assert_eq!(parse_datetime("2024-05-01"), Some(at(2024, 5, 1, 0, 0)));
        assert!(parse_datetime("  ").is_none());
        assert!(parse_datetime("yesterday").is_none());
    }

    #[test]
    fn parse_datetime_accepts_fractional_seconds() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|date| date.and_hms_milli_opt(8, 0, 0, 250))
            .expect("valid timestamp");
        assert_eq!(parse_datetime("2024-03-01 08:00:00.250"), Some(expected));
        assert_eq!(parse_datetime("2024-03-01T08:00:00.250"), Some(expected));
        assert_eq!(parse_datetime("03/01/2024 08:00:00.250"), Some(expected));
        assert_eq!(
            parse_datetime("2024-03-01 08:00:00.000"),
            Some(at(2024, 3, 1, 8, 0))
        );
    }

    #[test]
    fn zoned_timestamps_keep_their_wall_clock_time() {
        assert_eq!(
            parse_datetime("2024-05-01T10:15:00+02:00"),
            Some(at(2024, 5, 1, 10, 15))
        );
        assert_eq!(
            parse_datetime("2024-05-01T10:15:00-05:00"),
            parse_datetime("2024-05-01 10:15:00")
        );
    }

    #[test]
    fn parse_number_rejects_non_finite_values() {
        assert_eq!(parse_number(" 2.5 "), Some(2.5));
        assert!(parse_number("NaN").is_none());
        assert!(parse_number("n/a").is_none());
    }

    #[test]
    fn unparseable_cells_are_counted_not_fatal() {
        let row = WorkOrderRow {
            order_date: Some("not a date".to_string()),
            actual_end: Some("2024-05-02".to_string()),
            duration: Some("three".to_string()),
            work_status: Some("Closed".to_string()),
            ..WorkOrderRow::default()
        };

        let mut issues = ParseIssues::default();
        let order = row.into_work_order(4, &mut issues);

        assert_eq!(order.row, 4);
        assert!(order.order_date.is_none());
        assert_eq!(order.actual_end, Some(at(2024, 5, 2, 0, 0)));
        assert!(order.duration_hours.is_none());
        assert_eq!(order.work_status, WorkStatus::Closed);
        assert_eq!(
            issues,
            ParseIssues {
                timestamps: 1,
                numbers: 1
            }
        );
    }

    #[test]
    fn durations_are_derived_only_when_column_is_unusable() {
        let mut derived = WorkOrder::new(0, WorkStatus::Closed);
        derived.actual_start = Some(at(2024, 1, 1, 8, 0));
        derived.actual_end = Some(at(2024, 1, 1, 11, 30));
        let mut orders = vec![derived, WorkOrder::new(1, WorkStatus::Open)];

        assert!(derive_missing_durations(&mut orders));
        assert_eq!(orders[0].duration_hours, Some(3.5));
        assert!(orders[1].duration_hours.is_none());

        let mut supplied = WorkOrder::new(0, WorkStatus::Closed);
        supplied.duration_hours = Some(1.0);
        let mut unsupplied = WorkOrder::new(1, WorkStatus::Closed);
        unsupplied.actual_start = Some(at(2024, 1, 1, 8, 0));
        unsupplied.actual_end = Some(at(2024, 1, 1, 9, 0));
        let mut orders = vec![supplied, unsupplied];

        assert!(!derive_missing_durations(&mut orders));
        assert!(orders[1].duration_hours.is_none());
    }
}
