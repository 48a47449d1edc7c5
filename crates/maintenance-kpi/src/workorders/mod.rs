pub mod breakdown;
pub mod classification;
pub mod domain;
pub mod export;
pub mod filter;
pub mod loader;
pub mod metrics;

pub use breakdown::DashboardBreakdown;
pub use classification::ClassificationTable;
pub use domain::{LifecycleBucket, MaintenanceClass, WorkOrder, WorkStatus};
pub use filter::{FilterSelections, Selection};
pub use loader::{LoadError, WorkOrderLoader, WorkOrderLog};
pub use metrics::{compute_metrics, group_metrics, GroupKey, MetricsBundle, MetricsContext};
