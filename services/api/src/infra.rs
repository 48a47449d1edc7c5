use chrono::{NaiveDate, NaiveDateTime};
use maintenance_kpi::error::AppError;
use maintenance_kpi::workorders::{MetricsContext, WorkOrderLoader, WorkOrderLog};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) dataset: Arc<Dataset>,
}

/// The loaded work-order snapshot shared read-only across requests.
#[derive(Debug)]
pub(crate) struct Dataset {
    pub(crate) log: WorkOrderLog,
    pub(crate) weekly_capacity_hours: f64,
}

impl Dataset {
    pub(crate) fn new(log: WorkOrderLog, weekly_capacity_hours: f64) -> Self {
        Self {
            log,
            weekly_capacity_hours,
        }
    }

    pub(crate) fn load(path: &Path, weekly_capacity_hours: f64) -> Result<Self, AppError> {
        let log = WorkOrderLoader::from_path(path)?;
        Ok(Self::new(log, weekly_capacity_hours))
    }

    pub(crate) fn context(&self, as_of: NaiveDate) -> MetricsContext<'static> {
        MetricsContext::new(start_of_day(as_of)).with_weekly_capacity(self.weekly_capacity_hours)
    }
}

pub(crate) fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
