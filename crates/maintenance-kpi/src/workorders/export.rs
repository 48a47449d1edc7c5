use super::domain::WorkOrder;
use super::loader::WorkOrderLog;
use std::io::Write;

pub const EXPORT_FILE_NAME: &str = "maintenance_report.csv";

/// Writes the log's header followed by the source row of every selected order.
pub fn export_csv<'o, I, W>(
    log: &WorkOrderLog,
    orders: I,
    writer: W,
) -> Result<usize, csv::Error>
where
    I: IntoIterator<Item = &'o WorkOrder>,
    W: Write,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(log.headers())?;

    let mut written = 0;
    for order in orders {
        if let Some(record) = log.record(order) {
            csv_writer.write_record(record)?;
            written += 1;
        }
    }

    csv_writer.flush()?;
    Ok(written)
}

pub fn export_csv_string<'o, I>(log: &WorkOrderLog, orders: I) -> Result<String, csv::Error>
where
    I: IntoIterator<Item = &'o WorkOrder>,
{
    let mut buffer = Vec::new();
    export_csv(log, orders, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
