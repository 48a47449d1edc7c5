use chrono::{NaiveDate, NaiveDateTime};
use maintenance_kpi::workorders::metrics::{MetricReading, UNASSIGNED_GROUP};
use maintenance_kpi::workorders::{
    compute_metrics, group_metrics, DashboardBreakdown, FilterSelections, GroupKey,
    MetricsContext, Selection, WorkOrderLoader, WorkOrderLog,
};

const FIXTURE: &[u8] = include_bytes!("fixtures/asset_work_history.csv");

fn fixture() -> WorkOrderLog {
    WorkOrderLoader::from_reader(FIXTURE).expect("fixture loads")
}

fn context() -> MetricsContext<'static> {
    let reference: NaiveDateTime = NaiveDate::from_ymd_opt(2024, 4, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .expect("valid reference");
    MetricsContext::new(reference)
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn full_history_produces_expected_tiles() {
    let log = fixture();
    let metrics = compute_metrics(log.orders(), &context());

    assert_eq!(metrics.total_count, 9);
    assert_eq!(metrics.open_count, 4);
    assert_eq!(metrics.closed_count, 2);
    assert_eq!(metrics.completed_count, 2);
    assert_eq!(metrics.cancelled_count, 1);
    assert_eq!(
        metrics.open_count
            + metrics.closed_count
            + metrics.completed_count
            + metrics.cancelled_count,
        metrics.total_count
    );

    assert_close(metrics.avg_aging_days, (31.0 + 21.0 + 12.0) / 3.0);
    assert_close(
        metrics.avg_cycle_time_days,
        (35.0 + 58.0 + 132.0 + 176.0) / 24.0 / 4.0,
    );

    assert_eq!(metrics.backlog_count, metrics.open_count);
    assert_close(metrics.backlog_hours, 24.0);
    assert_close(metrics.backlog_weeks, 0.6);

    let mix = metrics.maintenance_class_mix;
    assert_eq!((mix.planned_count, mix.reactive_count), (2, 2));
    assert_close(mix.planned_pct + mix.reactive_pct, 100.0);

    assert_close(metrics.pm_compliance_pct, 50.0);
    assert_close(metrics.overall_compliance_pct, 50.0);
    assert_eq!(metrics.mttr_hours, MetricReading::Available { value: 2.0 });
    assert!(!metrics.mtbf_hours.is_available());
}

#[test]
fn filtered_selection_with_no_repairs_reports_unavailable_mttr() {
    let log = fixture();
    let march = FilterSelections {
        months: Selection::from_values(["March"]),
        ..FilterSelections::default()
    };
    let selected = march.apply(log.orders());
    let metrics = compute_metrics(selected.iter().copied(), &context());

    assert_eq!(metrics.total_count, 3);
    assert_eq!(metrics.open_count, 3);
    assert_eq!(metrics.avg_cycle_time_days, 0.0);
    assert!(!metrics.mttr_hours.is_available());
    assert_eq!(metrics.maintenance_class_mix.planned_pct, 0.0);
    assert_eq!(metrics.maintenance_class_mix.reactive_pct, 0.0);
}

#[test]
fn capacity_override_rescales_backlog_weeks() {
    let log = fixture();
    let context = context().with_weekly_capacity(48.0);
    let metrics = compute_metrics(log.orders(), &context);

    assert_close(metrics.backlog_weeks, 0.5);
}

#[test]
fn location_groups_partition_the_history() {
    let log = fixture();
    let context = context();
    let table = group_metrics(log.orders(), GroupKey::Location, &context);
    let whole = compute_metrics(log.orders(), &context);

    let labels: Vec<&str> = table.groups.keys().map(String::as_str).collect();
    assert_eq!(
        labels,
        vec![UNASSIGNED_GROUP, "Boiler Room", "Cooling Tower", "Pump House"]
    );

    let open: usize = table.groups.values().map(|bundle| bundle.open_count).sum();
    assert_eq!(open, whole.open_count);
    let total: usize = table.groups.values().map(|bundle| bundle.total_count).sum();
    assert_eq!(total, whole.total_count);

    let pumps = table.get("Pump House").expect("pump house group");
    assert_eq!(pumps.open_count, 2);
    assert_eq!(pumps.mttr_hours.value(), Some(3.0));
}

#[test]
fn metrics_are_repeatable() {
    let log = fixture();
    let context = context();

    assert_eq!(
        compute_metrics(log.orders(), &context),
        compute_metrics(log.orders(), &context)
    );
}

#[test]
fn breakdown_series_follow_the_history() {
    let log = fixture();
    let breakdown = DashboardBreakdown::from_orders(log.orders());

    assert_eq!(breakdown.by_status.len(), 9);
    assert!(breakdown.by_status.iter().all(|entry| entry.count == 1));

    let top_location = breakdown.by_location.first().expect("locations counted");
    assert_eq!(top_location.count, 3);

    let months: Vec<&str> = breakdown
        .monthly_cycle_time
        .iter()
        .map(|point| point.month.as_str())
        .collect();
    assert_eq!(months, vec!["2024-01", "2024-02"]);
    assert_close(
        breakdown.monthly_cycle_time[1].avg_cycle_time_days,
        (35.0 + 58.0) / 24.0 / 2.0,
    );
}
