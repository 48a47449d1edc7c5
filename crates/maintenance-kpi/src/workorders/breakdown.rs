use super::domain::WorkOrder;
use super::metrics::UNASSIGNED_GROUP;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountEntry {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleTimePoint {
    /// Completion month as `YYYY-MM`.
    pub month: String,
    pub avg_cycle_time_days: f64,
    pub orders: usize,
}

/// Chart-ready series for the status, location, and cycle-time views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardBreakdown {
    pub by_status: Vec<CountEntry>,
    pub by_location: Vec<CountEntry>,
    pub monthly_cycle_time: Vec<CycleTimePoint>,
}

impl DashboardBreakdown {
    pub fn from_orders<'o, I>(orders: I) -> Self
    where
        I: IntoIterator<Item = &'o WorkOrder>,
    {
        let orders: Vec<&WorkOrder> = orders.into_iter().collect();

        let by_status =
            ranked_counts(orders.iter().map(|order| order.work_status.label().to_string()));
        let by_location = ranked_counts(orders.iter().map(|order| {
            order
                .location
                .clone()
                .unwrap_or_else(|| UNASSIGNED_GROUP.to_string())
        }));

        let mut monthly: BTreeMap<String, (f64, usize)> = BTreeMap::new();
        for order in orders.iter().filter(|order| order.bucket().is_finished()) {
            let (Some(ended), Some(days)) = (order.actual_end, order.cycle_time_days()) else {
                continue;
            };
            let entry = monthly
                .entry(ended.format("%Y-%m").to_string())
                .or_insert((0.0, 0));
            entry.0 += days;
            entry.1 += 1;
        }

        let monthly_cycle_time = monthly
            .into_iter()
            .map(|(month, (total_days, count))| CycleTimePoint {
                month,
                avg_cycle_time_days: total_days / count as f64,
                orders: count,
            })
            .collect();

        Self {
            by_status,
            by_location,
            monthly_cycle_time,
        }
    }
}

// Most frequent first; ties broken by label so output is stable. Labels that
// differ only in case are counted together under the first spelling seen.
fn ranked_counts(labels: impl Iterator<Item = String>) -> Vec<CountEntry> {
    let mut counts: HashMap<String, CountEntry> = HashMap::new();
    for label in labels {
        counts
            .entry(label.to_lowercase())
            .or_insert_with(|| CountEntry { label, count: 0 })
            .count += 1;
    }

    let mut entries: Vec<CountEntry> = counts.into_values().collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    entries
}
