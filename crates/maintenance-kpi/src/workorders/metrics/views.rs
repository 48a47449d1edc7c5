use crate::workorders::domain::LifecycleBucket;
use serde::Serialize;
use std::collections::BTreeMap;

/// A metric that may not be computable from the data at hand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MetricReading {
    Available { value: f64 },
    Unavailable { reason: &'static str },
}

impl MetricReading {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Available { value } => Some(*value),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MaintenanceClassMix {
    pub planned_count: usize,
    pub reactive_count: usize,
    pub other_count: usize,
    /// Share of planned work among planned + reactive; `Other` is excluded.
    pub planned_pct: f64,
    pub reactive_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsBundle {
    pub total_count: usize,
    pub open_count: usize,
    pub closed_count: usize,
    pub completed_count: usize,
    pub cancelled_count: usize,
    pub avg_aging_days: f64,
    pub avg_cycle_time_days: f64,
    pub backlog_count: usize,
    pub backlog_hours: f64,
    pub backlog_weeks: f64,
    pub maintenance_class_mix: MaintenanceClassMix,
    pub pm_compliance_pct: f64,
    pub overall_compliance_pct: f64,
    pub mttr_hours: MetricReading,
    pub mtbf_hours: MetricReading,
}

impl MetricsBundle {
    pub fn bucket_count(&self, bucket: LifecycleBucket) -> usize {
        match bucket {
            LifecycleBucket::Open => self.open_count,
            LifecycleBucket::Closed => self.closed_count,
            LifecycleBucket::Completed => self.completed_count,
            LifecycleBucket::Cancelled => self.cancelled_count,
        }
    }
}

/// Compact projection used for side-by-side group comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupComparisonRow {
    pub group: String,
    pub total_count: usize,
    pub open_count: usize,
    pub avg_aging_days: f64,
    pub mttr_hours: MetricReading,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GroupedMetricsTable {
    pub groups: BTreeMap<String, MetricsBundle>,
}

impl GroupedMetricsTable {
    pub fn get(&self, group: &str) -> Option<&MetricsBundle> {
        self.groups.get(group)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn compact(&self) -> Vec<GroupComparisonRow> {
        self.groups
            .iter()
            .map(|(group, bundle)| GroupComparisonRow {
                group: group.clone(),
                total_count: bundle.total_count,
                open_count: bundle.open_count,
                avg_aging_days: bundle.avg_aging_days,
                mttr_hours: bundle.mttr_hours,
            })
            .collect()
    }
}
