mod engine;
mod grouping;
pub mod views;

pub use engine::{compute_metrics, MetricsContext, DEFAULT_WEEKLY_CAPACITY_HOURS};
pub use grouping::{group_metrics, GroupKey, UnknownGroupKey, UNASSIGNED_GROUP};
pub use views::{
    GroupComparisonRow, GroupedMetricsTable, MaintenanceClassMix, MetricReading, MetricsBundle,
};
