//! The enriched output table and its export as a polars DataFrame

use crate::data::{EngagementRecord, Metric};
use crate::error::{Error, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Column holding the numeric cluster id
pub const CLUSTER_COLUMN: &str = "Cluster";
/// Column holding the segment name
pub const SEGMENT_COLUMN: &str = "Customer Segment";

/// An engagement record enriched with its cluster and segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedRecord {
    pub record: EngagementRecord,
    pub cluster: usize,
    pub segment: String,
}

/// Join records with their cluster ids and segment names
pub fn enrich_records(
    records: Vec<EngagementRecord>,
    labels: &[usize],
    segments: Vec<String>,
) -> Result<Vec<SegmentedRecord>> {
    if records.len() != labels.len() || records.len() != segments.len() {
        return Err(Error::invalid_data(format!(
            "cannot enrich {} records with {} labels and {} segments",
            records.len(),
            labels.len(),
            segments.len()
        )));
    }

    Ok(records
        .into_iter()
        .zip(labels)
        .zip(segments)
        .map(|((record, &cluster), segment)| SegmentedRecord {
            record,
            cluster,
            segment,
        })
        .collect())
}

/// Build the output table: `user_id`, the seven metrics, `Cluster`, `Customer Segment`
pub fn to_dataframe(rows: &[SegmentedRecord]) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(Metric::ALL.len() + 3);

    let user_ids: Vec<i64> = rows.iter().map(|r| i64::from(r.record.user_id)).collect();
    columns.push(Series::new("user_id", user_ids));

    for metric in Metric::ALL {
        let values: Vec<i64> = rows
            .iter()
            .map(|r| i64::from(r.record.metric(metric)))
            .collect();
        columns.push(Series::new(metric.column_name(), values));
    }

    let clusters: Vec<i64> = rows.iter().map(|r| r.cluster as i64).collect();
    columns.push(Series::new(CLUSTER_COLUMN, clusters));

    let segments: Vec<&str> = rows.iter().map(|r| r.segment.as_str()).collect();
    columns.push(Series::new(SEGMENT_COLUMN, segments));

    Ok(DataFrame::new(columns)?)
}

/// Write the output table as CSV with a header row
pub fn write_csv(rows: &[SegmentedRecord], path: impl AsRef<Path>) -> Result<()> {
    let mut df = to_dataframe(rows)?;
    let mut file = File::create(path.as_ref())?;
    CsvWriter::new(&mut file).include_header(true).finish(&mut df)?;
    log::info!("Wrote {} rows to {}", df.height(), path.as_ref().display());
    Ok(())
}
