use super::engine::{compute_metrics, MetricsContext};
use super::views::GroupedMetricsTable;
use crate::workorders::domain::WorkOrder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Partition label for rows without a value for the grouping dimension.
/// Source values are trimmed labels, so the parentheses keep it distinct from a
/// location or type literally named `Unassigned`.
pub const UNASSIGNED_GROUP: &str = "(Unassigned)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Location,
    WorkType,
    WorkStatus,
    Priority,
    Year,
    Month,
}

impl GroupKey {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Location,
            Self::WorkType,
            Self::WorkStatus,
            Self::Priority,
            Self::Year,
            Self::Month,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Location => "Location",
            Self::WorkType => "Work Type",
            Self::WorkStatus => "Work Status",
            Self::Priority => "Priority",
            Self::Year => "Year",
            Self::Month => "Month",
        }
    }

    const fn slug(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::WorkType => "work-type",
            Self::WorkStatus => "status",
            Self::Priority => "priority",
            Self::Year => "year",
            Self::Month => "month",
        }
    }

    pub fn value_for(self, order: &WorkOrder) -> Option<String> {
        match self {
            Self::Location => order.location.clone(),
            Self::WorkType => order.work_type.clone(),
            Self::WorkStatus => {
                Some(order.work_status.label().to_string()).filter(|label| !label.is_empty())
            }
            Self::Priority => order.work_priority.clone(),
            Self::Year => order.year().map(|year| year.to_string()),
            Self::Month => order.month_name(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownGroupKey(pub String);

impl fmt::Display for UnknownGroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown grouping '{}' (expected location, work-type, status, priority, year or month)",
            self.0
        )
    }
}

impl std::error::Error for UnknownGroupKey {}

impl FromStr for GroupKey {
    type Err = UnknownGroupKey;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        let wanted = match wanted.as_str() {
            "work-status" => "status",
            other => other,
        };
        Self::ordered()
            .into_iter()
            .find(|key| key.slug() == wanted)
            .ok_or_else(|| UnknownGroupKey(value.to_string()))
    }
}

/// Runs the metrics engine once per distinct value of `key`.
///
/// Rows missing the key are grouped under [`UNASSIGNED_GROUP`], so the
/// partitions always cover the whole input. Values differing only in case share
/// a partition. Only non-empty partitions appear.
pub fn group_metrics<'o, I>(
    orders: I,
    key: GroupKey,
    context: &MetricsContext<'_>,
) -> GroupedMetricsTable
where
    I: IntoIterator<Item = &'o WorkOrder>,
{
    // Keyed case-insensitively, like filtering; the first spelling seen labels the group.
    let mut partitions: BTreeMap<String, (String, Vec<&WorkOrder>)> = BTreeMap::new();
    for order in orders {
        let label = key
            .value_for(order)
            .unwrap_or_else(|| UNASSIGNED_GROUP.to_string());
        partitions
            .entry(label.to_lowercase())
            .or_insert_with(|| (label, Vec::new()))
            .1
            .push(order);
    }

    let groups = partitions
        .into_values()
        .map(|(label, members)| {
            let bundle = compute_metrics(members.iter().copied(), context);
            (label, bundle)
        })
        .collect();

    GroupedMetricsTable { groups }
}
