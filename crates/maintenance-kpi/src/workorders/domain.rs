use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Lifecycle bucket a status label belongs to. Every status maps to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleBucket {
    Open,
    Closed,
    Completed,
    Cancelled,
}

impl LifecycleBucket {
    pub const fn ordered() -> [Self; 4] {
        [Self::Open, Self::Closed, Self::Completed, Self::Cancelled]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Closed => "Closed",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Closed-like or completed work.
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Closed | Self::Completed)
    }
}

/// Source status label. Serializes as the label operators filter on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WorkStatus {
    Open,
    Backlog,
    InProgress,
    Postponed,
    WaitingForParts,
    WaitingForApproval,
    Cancelled,
    Completed,
    CompletedWasBacklog,
    Closed,
    ClosedWasBacklog,
    Other(String),
}

impl WorkStatus {
    const KNOWN: [Self; 11] = [
        Self::Open,
        Self::Backlog,
        Self::InProgress,
        Self::Postponed,
        Self::WaitingForParts,
        Self::WaitingForApproval,
        Self::Cancelled,
        Self::Completed,
        Self::CompletedWasBacklog,
        Self::Closed,
        Self::ClosedWasBacklog,
    ];

    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        Self::KNOWN
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(trimmed))
            .unwrap_or_else(|| Self::Other(trimmed.to_string()))
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Open => "Open",
            Self::Backlog => "Backlog",
            Self::InProgress => "In Progress",
            Self::Postponed => "Postponed",
            Self::WaitingForParts => "Waiting for Parts",
            Self::WaitingForApproval => "Waiting for Approval",
            Self::Cancelled => "Cancelled",
            Self::Completed => "Completed",
            Self::CompletedWasBacklog => "Completed - Was Backlog",
            Self::Closed => "Closed",
            Self::ClosedWasBacklog => "Closed - Was Backlog",
            Self::Other(label) => label,
        }
    }

    pub fn bucket(&self) -> LifecycleBucket {
        match self {
            Self::Closed | Self::ClosedWasBacklog => LifecycleBucket::Closed,
            Self::Completed | Self::CompletedWasBacklog => LifecycleBucket::Completed,
            Self::Cancelled => LifecycleBucket::Cancelled,
            _ => LifecycleBucket::Open,
        }
    }
}

impl Serialize for WorkStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for WorkStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse grouping of work types used for the planned/reactive mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceClass {
    Planned,
    Reactive,
    Other,
}

impl MaintenanceClass {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Planned => "Planned",
            Self::Reactive => "Reactive/Corrective",
            Self::Other => "Other",
        }
    }
}

const PRIORITY_LABELS: &[(&str, &str)] = &[
    ("P1", "P1 - High"),
    ("P2", "P2 - Medium"),
    ("P3", "P3 - Low"),
    ("P4", "P4 - Very Low"),
];

/// Maps priority codes such as `P1` to their display label. Labels that are
/// already in display form, or codes outside the table, pass through trimmed.
pub fn normalize_priority(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let label = PRIORITY_LABELS
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(trimmed))
        .map(|(_, label)| (*label).to_string())
        .unwrap_or_else(|| trimmed.to_string());
    Some(label)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkOrder {
    /// Zero-based position of the source row.
    pub row: usize,
    pub order_date: Option<NaiveDateTime>,
    pub reported_date: Option<NaiveDateTime>,
    pub actual_start: Option<NaiveDateTime>,
    pub actual_end: Option<NaiveDateTime>,
    pub required_by: Option<NaiveDateTime>,
    pub work_status: WorkStatus,
    pub work_type: Option<String>,
    pub work_priority: Option<String>,
    pub location: Option<String>,
    pub duration_hours: Option<f64>,
    pub planned_duration_hours: Option<f64>,
}

impl WorkOrder {
    /// A row with only a status set; the loader and tests fill in the rest.
    pub fn new(row: usize, work_status: WorkStatus) -> Self {
        Self {
            row,
            order_date: None,
            reported_date: None,
            actual_start: None,
            actual_end: None,
            required_by: None,
            work_status,
            work_type: None,
            work_priority: None,
            location: None,
            duration_hours: None,
            planned_duration_hours: None,
        }
    }

    pub fn bucket(&self) -> LifecycleBucket {
        self.work_status.bucket()
    }

    pub fn month_name(&self) -> Option<String> {
        self.order_date.map(|date| date.format("%B").to_string())
    }

    pub fn year(&self) -> Option<i32> {
        self.order_date.map(|date| date.year())
    }

    /// Elapsed hours between actual start and end, when both are known.
    pub fn repair_hours(&self) -> Option<f64> {
        match (self.actual_start, self.actual_end) {
            (Some(start), Some(end)) => Some(hours_between(start, end)),
            _ => None,
        }
    }

    /// Days from order raised to actual completion.
    pub fn cycle_time_days(&self) -> Option<f64> {
        match (self.order_date, self.actual_end) {
            (Some(ordered), Some(ended)) => Some(days_between(ordered, ended)),
            _ => None,
        }
    }
}

pub(crate) fn hours_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_seconds() as f64 / 3_600.0
}

pub(crate) fn days_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_seconds() as f64 / 86_400.0
}
