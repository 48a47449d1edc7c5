mod normalizer;
mod parser;

use super::domain::WorkOrder;
use csv::StringRecord;
use parser::{ParseIssues, WorkOrderRow};
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read work-order export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid work-order CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Immutable snapshot of a loaded work-order table.
///
/// Keeps the source header and raw rows next to the parsed orders so filtered
/// selections can be exported with the input's column shape.
#[derive(Debug, Clone)]
pub struct WorkOrderLog {
    headers: StringRecord,
    records: Vec<StringRecord>,
    orders: Vec<WorkOrder>,
}

impl WorkOrderLog {
    pub fn orders(&self) -> &[WorkOrder] {
        &self.orders
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    /// The raw source row an order was parsed from.
    pub fn record(&self, order: &WorkOrder) -> Option<&StringRecord> {
        self.records.get(order.row)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

pub struct WorkOrderLoader;

impl WorkOrderLoader {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<WorkOrderLog, LoadError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        info!(path = %path.display(), "loading work-order export");
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<WorkOrderLog, LoadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let lookup_headers = normalizer::normalize_headers(&headers);

        let mut records = Vec::new();
        let mut orders = Vec::new();
        let mut issues = ParseIssues::default();

        for (row, record) in csv_reader.records().enumerate() {
            let record = record?;
            let parsed = WorkOrderRow::from_record(&record, &lookup_headers)?;
            orders.push(parsed.into_work_order(row, &mut issues));
            records.push(record);
        }

        if parser::derive_missing_durations(&mut orders) {
            debug!("duration column absent or empty; derived from actual start/end");
        }

        if issues.timestamps > 0 || issues.numbers > 0 {
            warn!(
                timestamps = issues.timestamps,
                numbers = issues.numbers,
                "unparseable cells treated as missing"
            );
        }

        info!(rows = orders.len(), "work-order export loaded");

        Ok(WorkOrderLog {
            headers,
            records,
            orders,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workorders::domain::WorkStatus;
    use std::io::Cursor;

    #[test]
    fn loader_accepts_spaced_and_compact_headers() {
        let csv = "OrderDate,Work Status,Work Type,WorkPriority,Parent Location\n\
2024-03-01,Closed - Was Backlog,Breakdown,P2,Pump House\n";
        let log = WorkOrderLoader::from_reader(Cursor::new(csv)).expect("loads");

        let order = &log.orders()[0];
        assert_eq!(order.work_status, WorkStatus::ClosedWasBacklog);
        assert_eq!(order.work_type.as_deref(), Some("Breakdown"));
        assert_eq!(order.work_priority.as_deref(), Some("P2 - Medium"));
        assert_eq!(order.location.as_deref(), Some("Pump House"));
        assert_eq!(order.month_name().as_deref(), Some("March"));
    }

    #[test]
    fn loader_tolerates_the_same_column_spelled_twice() {
        let csv = "OrderDate,Work Status,WorkStatus
2024-03-01,Closed,Open
";
        let log = WorkOrderLoader::from_reader(Cursor::new(csv)).expect("loads");

        assert_eq!(log.len(), 1);
        assert_eq!(log.orders()[0].work_status, WorkStatus::Closed);
        assert_eq!(log.headers().len(), 3);
    }

    #[test]
    fn loader_keeps_raw_rows_for_export() {
        let csv = "WorkStatus,Notes\nOpen,  keep me \nClosed,\n";
        let log = WorkOrderLoader::from_reader(Cursor::new(csv)).expect("loads");

        assert_eq!(log.len(), 2);
        assert_eq!(
            log.headers().iter().collect::<Vec<_>>(),
            vec!["WorkStatus", "Notes"]
        );
        let record = log.record(&log.orders()[0]).expect("raw row");
        assert_eq!(record.get(1), Some("keep me"));
    }

    #[test]
    fn loader_rejects_ragged_rows() {
        let csv = "WorkStatus,WorkType\nOpen,Breakdown,extra\n";
        let error = WorkOrderLoader::from_reader(Cursor::new(csv)).expect_err("ragged row");
        assert!(matches!(error, LoadError::Csv(_)));
    }

    #[test]
    fn loader_from_path_propagates_io_errors() {
        let error = WorkOrderLoader::from_path("./does-not-exist.csv").expect_err("io error");
        match error {
            LoadError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
