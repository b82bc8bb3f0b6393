// Series / table documents for the front end. Pure conversions plus compact encoding;
// whether an existing output is kept is decided by the caller (see report::emit).

use std::path::Path;

use serde::Serialize;
use tracing::warn;

use crate::error::Result;
use crate::models::{
    ColumnSpec, SECS_PER_HOUR, SeriesDocument, SeriesEntry, TableCell, TableDocument, TimeSeries,
};
use crate::steps::{StepLabel, StepTable};

const MILLIS_PER_SECOND: i64 = 1000;
const TOTAL_LABEL: &str = "sum";

/// One entry per value column; absent cells become `null`.
pub fn series_document(series: &TimeSeries) -> SeriesDocument {
    if series.len() % SECS_PER_HOUR as usize != 0 {
        warn!(rows = series.len(), "series is not a whole number of hours");
    }
    let epoch_start = series.first_epoch().unwrap_or_default();
    let entries = series
        .columns()
        .iter()
        .enumerate()
        .map(|(i, name)| SeriesEntry {
            name: name.clone(),
            data: series.column_at(i).to_vec(),
            point_start: epoch_start * MILLIS_PER_SECOND,
            point_interval: MILLIS_PER_SECOND,
        })
        .collect();
    SeriesDocument {
        epoch_start,
        length: series.len(),
        series: entries,
    }
}

/// Columns `step`, `time`, then metrics; the totals row is labelled `sum`.
pub fn table_document(table: &StepTable) -> TableDocument {
    let columns = ["step", "time"]
        .into_iter()
        .map(String::from)
        .chain(table.metrics.iter().cloned())
        .map(|title| ColumnSpec {
            title,
            kind: "numeric".into(),
        })
        .collect();
    let rows = table
        .rows
        .iter()
        .map(|row| {
            let label = match row.label {
                StepLabel::Index(i) => TableCell::Int(i as i64),
                StepLabel::Total => TableCell::Label(TOTAL_LABEL.into()),
            };
            [label, TableCell::Int(row.elapsed)]
                .into_iter()
                .chain(row.values.iter().map(|&v| TableCell::Fixed(v)))
                .collect()
        })
        .collect();
    TableDocument { rows, columns }
}

/// Compact JSON, no whitespace between tokens.
pub fn encode<T: Serialize>(doc: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(doc)?)
}

pub fn write_document<T: Serialize>(path: &Path, doc: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, encode(doc)?)?;
    Ok(())
}
