use crate::dashboard::{build_dashboard, DashboardQuery, DashboardView, FilterInput};
use crate::infra::{parse_date, Dataset};
use chrono::{Local, NaiveDate};
use clap::Args;
use maintenance_kpi::config::AppConfig;
use maintenance_kpi::error::AppError;
use maintenance_kpi::telemetry;
use maintenance_kpi::workorders::export::export_csv;
use maintenance_kpi::workorders::metrics::MetricReading;
use maintenance_kpi::workorders::{GroupKey, LifecycleBucket, MaintenanceClass, MetricsBundle};
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Default)]
pub(crate) struct ReportArgs {
    /// Work-order CSV export (defaults to APP_DATA_PATH)
    #[arg(long)]
    pub(crate) data: Option<PathBuf>,
    /// Restrict to a month name, e.g. "March" (repeatable; "All" disables)
    #[arg(long = "month")]
    pub(crate) months: Vec<String>,
    /// Restrict to an order year (repeatable)
    #[arg(long = "year")]
    pub(crate) years: Vec<String>,
    /// Restrict to a work type (repeatable)
    #[arg(long = "work-type")]
    pub(crate) work_types: Vec<String>,
    /// Restrict to a work status (repeatable)
    #[arg(long = "status")]
    pub(crate) statuses: Vec<String>,
    /// Restrict to a priority code or label, e.g. P1 (repeatable)
    #[arg(long = "priority")]
    pub(crate) priorities: Vec<String>,
    /// Restrict to a parent location (repeatable)
    #[arg(long = "location")]
    pub(crate) locations: Vec<String>,
    /// Reference date for aging (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Compare metrics across location, work-type, status, priority, year or month
    #[arg(long)]
    pub(crate) group_by: Option<GroupKey>,
    /// Write the filtered rows to this CSV file
    #[arg(long)]
    pub(crate) export: Option<PathBuf>,
}

impl ReportArgs {
    fn filters(&mut self) -> FilterInput {
        fn listed(values: &mut Vec<String>) -> Option<Vec<String>> {
            (!values.is_empty()).then(|| std::mem::take(values))
        }

        FilterInput {
            months: listed(&mut self.months),
            years: listed(&mut self.years),
            work_types: listed(&mut self.work_types),
            statuses: listed(&mut self.statuses),
            priorities: listed(&mut self.priorities),
            locations: listed(&mut self.locations),
        }
    }
}

pub(crate) fn run_report(mut args: ReportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let data_path = args
        .data
        .take()
        .unwrap_or_else(|| config.dashboard.data_path.clone());
    let dataset = Dataset::load(&data_path, config.dashboard.weekly_capacity_hours)?;

    let query = DashboardQuery {
        selections: args.filters().into_selections(),
        as_of: args.as_of.unwrap_or_else(|| Local::now().date_naive()),
        group_by: args.group_by,
        include_records: false,
    };
    let view = build_dashboard(&dataset, &query);
    render_dashboard(&view, &data_path, dataset.log.len(), dataset.weekly_capacity_hours);

    if let Some(path) = args.export {
        let selected = query.selections.apply(dataset.log.orders());
        let file = File::create(&path)?;
        let written = export_csv(&dataset.log, selected, file)?;
        println!("\nExported {} work orders to {}", written, path.display());
    }

    Ok(())
}

fn render_dashboard(view: &DashboardView, source: &Path, loaded: usize, capacity: f64) {
    let metrics = &view.metrics;
    let mix = &metrics.maintenance_class_mix;

    println!("Maintenance KPI dashboard (as of {})", view.as_of);
    println!(
        "- Source: {} | {} of {} work orders match the current filters",
        source.display(),
        view.matched,
        loaded
    );

    println!("\nWork order status");
    println!("- {}", bucket_tiles(metrics));
    println!(
        "- Avg aging (open): {:.1} days | Avg cycle time: {:.1} days",
        metrics.avg_aging_days, metrics.avg_cycle_time_days
    );
    println!(
        "- Backlog: {} orders | {:.1} h | {:.1} weeks at {:.0} h/week",
        metrics.backlog_count, metrics.backlog_hours, metrics.backlog_weeks, capacity
    );

    println!("\nMaintenance performance");
    println!(
        "- {} vs {}: {:.0}% / {:.0}% ({} / {} / {} {})",
        MaintenanceClass::Planned.label(),
        MaintenanceClass::Reactive.label(),
        mix.planned_pct,
        mix.reactive_pct,
        mix.planned_count,
        mix.reactive_count,
        mix.other_count,
        MaintenanceClass::Other.label().to_lowercase()
    );
    println!(
        "- PM compliance: {:.1}% | Overall compliance: {:.1}%",
        metrics.pm_compliance_pct, metrics.overall_compliance_pct
    );
    println!(
        "- MTTR: {} | MTBF: {}",
        describe_hours(&metrics.mttr_hours),
        describe_hours(&metrics.mtbf_hours)
    );

    if !view.breakdown.by_status.is_empty() {
        println!("\nWork orders by status");
        for entry in &view.breakdown.by_status {
            println!("  - {}: {}", entry.label, entry.count);
        }
    }

    if !view.breakdown.by_location.is_empty() {
        println!("\nWork orders by location");
        for entry in &view.breakdown.by_location {
            println!("  - {}: {}", entry.label, entry.count);
        }
    }

    if !view.breakdown.monthly_cycle_time.is_empty() {
        println!("\nCycle time trend");
        for point in &view.breakdown.monthly_cycle_time {
            println!(
                "  - {}: {:.1} days across {} orders",
                point.month, point.avg_cycle_time_days, point.orders
            );
        }
    }

    if let Some(grouped) = &view.grouped {
        println!("\nComparison by {}", grouped.group_by.label());
        if grouped.comparison.is_empty() {
            println!("  (no matching work orders)");
        }
        for row in &grouped.comparison {
            println!(
                "  - {}: {} orders | {} open | {:.1} days aging | MTTR {}",
                row.group,
                row.total_count,
                row.open_count,
                row.avg_aging_days,
                describe_hours(&row.mttr_hours)
            );
        }
    }
}

fn bucket_tiles(metrics: &MetricsBundle) -> String {
    LifecycleBucket::ordered()
        .into_iter()
        .map(|bucket| format!("{} {}", bucket.label(), metrics.bucket_count(bucket)))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn describe_hours(reading: &MetricReading) -> String {
    match reading {
        MetricReading::Available { value } => format!("{value:.1} h"),
        MetricReading::Unavailable { reason } => format!("n/a ({reason})"),
    }
}
