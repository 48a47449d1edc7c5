use crate::infra::Dataset;
use chrono::NaiveDate;
use maintenance_kpi::workorders::metrics::{GroupComparisonRow, GroupedMetricsTable};
use maintenance_kpi::workorders::{
    compute_metrics, group_metrics, DashboardBreakdown, FilterSelections, GroupKey,
    MetricsBundle, Selection, WorkOrder,
};
use serde::{Deserialize, Serialize};

/// Filter dimensions as they arrive from clients. An absent list means `All`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct FilterInput {
    #[serde(default)]
    pub(crate) months: Option<Vec<String>>,
    #[serde(default)]
    pub(crate) years: Option<Vec<String>>,
    #[serde(default)]
    pub(crate) work_types: Option<Vec<String>>,
    #[serde(default)]
    pub(crate) statuses: Option<Vec<String>>,
    #[serde(default)]
    pub(crate) priorities: Option<Vec<String>>,
    #[serde(default)]
    pub(crate) locations: Option<Vec<String>>,
}

impl FilterInput {
    pub(crate) fn into_selections(self) -> FilterSelections {
        fn labels(values: Option<Vec<String>>) -> Selection<String> {
            values.map(Selection::<String>::from_values).unwrap_or_default()
        }

        FilterSelections {
            months: labels(self.months),
            years: self
                .years
                .map(Selection::<i32>::years_from_values)
                .unwrap_or_default(),
            work_types: labels(self.work_types),
            work_statuses: labels(self.statuses),
            priorities: labels(self.priorities),
            locations: labels(self.locations),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct DashboardQuery {
    pub(crate) selections: FilterSelections,
    pub(crate) as_of: NaiveDate,
    pub(crate) group_by: Option<GroupKey>,
    pub(crate) include_records: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct GroupedView {
    pub(crate) group_by: GroupKey,
    pub(crate) groups: GroupedMetricsTable,
    pub(crate) comparison: Vec<GroupComparisonRow>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DashboardView {
    pub(crate) as_of: NaiveDate,
    pub(crate) matched: usize,
    pub(crate) metrics: MetricsBundle,
    pub(crate) breakdown: DashboardBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) grouped: Option<GroupedView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) records: Option<Vec<WorkOrder>>,
}

pub(crate) fn build_dashboard(dataset: &Dataset, query: &DashboardQuery) -> DashboardView {
    let context = dataset.context(query.as_of);
    let selected = query.selections.apply(dataset.log.orders());

    let metrics = compute_metrics(selected.iter().copied(), &context);
    let breakdown = DashboardBreakdown::from_orders(selected.iter().copied());
    let grouped = query.group_by.map(|key| {
        let groups = group_metrics(selected.iter().copied(), key, &context);
        let comparison = groups.compact();
        GroupedView {
            group_by: key,
            groups,
            comparison,
        }
    });
    let records = query
        .include_records
        .then(|| selected.iter().map(|order| (*order).clone()).collect());

    DashboardView {
        as_of: query.as_of,
        matched: selected.len(),
        metrics,
        breakdown,
        grouped,
        records,
    }
}
