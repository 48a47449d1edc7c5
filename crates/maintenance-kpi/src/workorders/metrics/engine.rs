use super::views::{MaintenanceClassMix, MetricReading, MetricsBundle};
use crate::workorders::classification::ClassificationTable;
use crate::workorders::domain::{days_between, LifecycleBucket, MaintenanceClass, WorkOrder};
use chrono::NaiveDateTime;

pub const DEFAULT_WEEKLY_CAPACITY_HOURS: f64 = 40.0;

const MTTR_UNAVAILABLE: &str = "no completed corrective work orders with start and end times";
const MTBF_UNAVAILABLE: &str = "operating hours and failure counts are not recorded";

/// Inputs the engine needs besides the orders themselves.
#[derive(Debug, Clone, Copy)]
pub struct MetricsContext<'a> {
    /// "Now" for aging calculations.
    pub reference: NaiveDateTime,
    pub weekly_capacity_hours: f64,
    pub classification: &'a ClassificationTable,
}

impl MetricsContext<'static> {
    pub fn new(reference: NaiveDateTime) -> Self {
        Self {
            reference,
            weekly_capacity_hours: DEFAULT_WEEKLY_CAPACITY_HOURS,
            classification: ClassificationTable::standard(),
        }
    }
}

impl<'a> MetricsContext<'a> {
    pub fn with_weekly_capacity(mut self, hours: f64) -> Self {
        self.weekly_capacity_hours = hours;
        self
    }

    pub fn with_classification<'b>(
        self,
        classification: &'b ClassificationTable,
    ) -> MetricsContext<'b> {
        MetricsContext {
            reference: self.reference,
            weekly_capacity_hours: self.weekly_capacity_hours,
            classification,
        }
    }
}

/// Computes the KPI bundle for one collection of work orders.
///
/// Total over its input: empty collections and rows with missing timestamps
/// produce the documented defaults rather than errors or NaN.
pub fn compute_metrics<'o, I>(orders: I, context: &MetricsContext<'_>) -> MetricsBundle
where
    I: IntoIterator<Item = &'o WorkOrder>,
{
    let orders: Vec<&WorkOrder> = orders.into_iter().collect();
    let count_in = |bucket: LifecycleBucket| {
        orders
            .iter()
            .filter(|order| order.bucket() == bucket)
            .count()
    };

    let open_count = count_in(LifecycleBucket::Open);
    let closed_count = count_in(LifecycleBucket::Closed);
    let completed_count = count_in(LifecycleBucket::Completed);
    let cancelled_count = count_in(LifecycleBucket::Cancelled);

    let open_orders = || {
        orders
            .iter()
            .copied()
            .filter(|order| order.bucket() == LifecycleBucket::Open)
    };
    let finished_orders = || {
        orders
            .iter()
            .copied()
            .filter(|order| order.bucket().is_finished())
    };

    // Orders raised after the reference time have no age yet and are left out.
    let avg_aging_days = mean(open_orders().filter_map(|order| {
        order
            .order_date
            .filter(|ordered| *ordered <= context.reference)
            .map(|ordered| days_between(ordered, context.reference))
    }));

    let avg_cycle_time_days = mean(finished_orders().filter_map(WorkOrder::cycle_time_days));

    let backlog_hours: f64 = open_orders()
        .filter_map(|order| order.planned_duration_hours.or(order.duration_hours))
        .sum();
    let capacity = context.weekly_capacity_hours;
    let backlog_weeks = if capacity.is_finite() && capacity > 0.0 {
        backlog_hours / capacity
    } else {
        0.0
    };

    let maintenance_class_mix = class_mix(finished_orders(), context.classification);

    let pm_compliance_pct = compliance_pct(orders.iter().copied().filter(|order| {
        context.classification.classify(order.work_type.as_deref()) == MaintenanceClass::Planned
    }));
    let overall_compliance_pct = compliance_pct(orders.iter().copied());

    let repair_hours: Vec<f64> = finished_orders()
        .filter(|order| context.classification.is_corrective(order.work_type.as_deref()))
        .filter_map(WorkOrder::repair_hours)
        .collect();
    let mttr_hours = if repair_hours.is_empty() {
        MetricReading::Unavailable {
            reason: MTTR_UNAVAILABLE,
        }
    } else {
        MetricReading::Available {
            value: mean(repair_hours.into_iter()),
        }
    };

    MetricsBundle {
        total_count: orders.len(),
        open_count,
        closed_count,
        completed_count,
        cancelled_count,
        avg_aging_days,
        avg_cycle_time_days,
        backlog_count: open_count,
        backlog_hours,
        backlog_weeks,
        maintenance_class_mix,
        pm_compliance_pct,
        overall_compliance_pct,
        mttr_hours,
        mtbf_hours: MetricReading::Unavailable {
            reason: MTBF_UNAVAILABLE,
        },
    }
}

fn class_mix<'o>(
    finished: impl Iterator<Item = &'o WorkOrder>,
    classification: &ClassificationTable,
) -> MaintenanceClassMix {
    let mut mix = MaintenanceClassMix::default();
    for order in finished {
        match classification.classify(order.work_type.as_deref()) {
            MaintenanceClass::Planned => mix.planned_count += 1,
            MaintenanceClass::Reactive => mix.reactive_count += 1,
            MaintenanceClass::Other => mix.other_count += 1,
        }
    }

    let classified = mix.planned_count + mix.reactive_count;
    mix.planned_pct = percentage(mix.planned_count, classified);
    mix.reactive_pct = percentage(mix.reactive_count, classified);
    mix
}

// Share of orders with a required-by date that finished on or before it.
fn compliance_pct<'o>(orders: impl Iterator<Item = &'o WorkOrder>) -> f64 {
    let mut scheduled = 0;
    let mut met = 0;
    for order in orders {
        let Some(required_by) = order.required_by else {
            continue;
        };
        scheduled += 1;
        let on_time = order.actual_end.is_some_and(|ended| ended <= required_by);
        if order.bucket().is_finished() && on_time {
            met += 1;
        }
    }
    percentage(met, scheduled)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .filter(|value| value.is_finite())
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64 * 100.0).clamp(0.0, 100.0)
    }
}
