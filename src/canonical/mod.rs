// Sample canonicalizer: one host-hour of raw samples -> exactly 3600 aligned rows.
//
// Rows are consecutive seconds from the top of the hour. Seconds with no accepted
// sample become sentinel rows (every value cell absent). Anomalies that can be
// recovered from are logged and returned next to the series; row parse failures
// are fatal for the file.

pub mod class;
pub mod schema;
pub mod transform;
pub mod tsv;

use std::io::BufRead;
use std::path::Path;

use tracing::{instrument, warn};

use crate::error::{PipelineError, Result, SampleError};
use crate::models::{Cell, RawSample, SECS_PER_HOUR, TimeSeries};

pub use class::overall_class;
pub use schema::{AggregateMeasure, CanonicalOptions, Combine, RowSchema};
pub use transform::{ColumnTransform, TrailingMean, TransformSet};

pub const ROWS_PER_HOUR: usize = SECS_PER_HOUR as usize;

/// Recoverable irregularity seen while canonicalizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// Sample epoch not after the previous accepted one; sample skipped.
    OutOfOrder { line: usize, epoch: i64, previous: i64 },
    /// First accepted epoch not on the hour; earlier seconds backfilled with sentinels.
    Misaligned { first_epoch: i64, hour_start: i64 },
    /// End-of-hour padding outside `0..=row_tolerance`; output clamped to 3600 rows.
    RowCount { padding: i64 },
}

#[derive(Debug, Clone)]
pub struct Canonicalized {
    pub series: TimeSeries,
    pub hour_start: i64,
    pub anomalies: Vec<Anomaly>,
}

struct Hour {
    schema: RowSchema,
    series: TimeSeries,
    hour_start: i64,
    /// Last accepted epoch, possibly past the hour end.
    prev_epoch: i64,
    /// Untransformed raw values of the previous accepted sample, ordered as the schema.
    prev_raw: Option<Vec<f64>>,
}

/// Feeds samples one at a time; `finish` pads and clamps the hour.
pub struct HourBuilder<'a> {
    options: &'a CanonicalOptions,
    source_name: &'a str,
    hour: Option<Hour>,
    anomalies: Vec<Anomaly>,
}

impl<'a> HourBuilder<'a> {
    pub fn new(options: &'a CanonicalOptions, source_name: &'a str) -> Self {
        Self {
            options,
            source_name,
            hour: None,
            anomalies: Vec::new(),
        }
    }

    fn start_hour(&mut self, line: usize, first: &RawSample) -> Result<Hour> {
        let schema = RowSchema::derive(self.options, first)
            .map_err(|source| schema_error(self.source_name, line, source))?;
        let hour_start = first.epoch.div_euclid(SECS_PER_HOUR) * SECS_PER_HOUR;
        if first.epoch != hour_start {
            warn!(
                file = self.source_name,
                first_epoch = first.epoch,
                hour_start,
                "first sample not aligned to the hour; backfilling"
            );
            self.anomalies.push(Anomaly::Misaligned {
                first_epoch: first.epoch,
                hour_start,
            });
        }
        let series = TimeSeries::with_capacity(schema.column_names(), ROWS_PER_HOUR);
        Ok(Hour {
            schema,
            series,
            hour_start,
            prev_epoch: hour_start - 1,
            prev_raw: None,
        })
    }

    /// Accept one sample read from input line `line` (1-based).
    pub fn push(&mut self, line: usize, sample: RawSample) -> Result<()> {
        if let Some(h) = &self.hour
            && sample.epoch <= h.prev_epoch
        {
            warn!(
                file = self.source_name,
                line,
                epoch = sample.epoch,
                previous = h.prev_epoch,
                "duplicate or out-of-order sample skipped"
            );
            self.anomalies.push(Anomaly::OutOfOrder {
                line,
                epoch: sample.epoch,
                previous: h.prev_epoch,
            });
            return Ok(());
        }

        let hour = match self.hour.take() {
            Some(h) => h,
            None => self.start_hour(line, &sample)?,
        };
        let source_name = self.source_name;
        let options = self.options;
        let transforms = &options.transforms;
        let h = self.hour.insert(hour);

        // Past the hour only the overrun is tracked; no rows are added.
        let hour_end = h.hour_start.saturating_add(SECS_PER_HOUR);
        if sample.epoch >= hour_end {
            h.prev_epoch = sample.epoch;
            return Ok(());
        }

        let raw = h
            .schema
            .raw_names()
            .iter()
            .map(|name| sample.require(name))
            .collect::<std::result::Result<Vec<f64>, _>>()
            .map_err(|source| schema_error(source_name, line, source))?;

        for epoch in h.prev_epoch + 1..sample.epoch {
            h.series.push_absent(epoch);
        }

        let values: Vec<f64> = h
            .schema
            .raw_names()
            .iter()
            .zip(&raw)
            .enumerate()
            .map(|(i, (name, &v))| match transforms.get(name) {
                Some(t) => t.apply(v, h.prev_raw.as_ref().map(|p| p[i])),
                None => v,
            })
            .collect();

        let aggs = h.schema.aggregates(&values);
        let class = overall_class(&aggs);
        let max = aggs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = aggs.iter().sum::<f64>() / aggs.len() as f64;

        let mut cells: Vec<Cell> = Vec::with_capacity(h.schema.width());
        cells.extend([Some(f64::from(class)), Some(max), Some(mean)]);
        cells.extend(aggs.into_iter().map(Some));
        cells.extend(values.into_iter().map(Some));
        h.series.push_row(sample.epoch, &cells);

        h.prev_epoch = sample.epoch;
        h.prev_raw = Some(raw);
        Ok(())
    }

    pub fn finish(self) -> Result<Canonicalized> {
        let Some(mut h) = self.hour else {
            return Err(PipelineError::EmptyInput(self.source_name.to_string()));
        };
        let mut anomalies = self.anomalies;

        // Rows are contiguous from the hour start, so the overrun is measured by epoch.
        let hour_end = h.hour_start.saturating_add(SECS_PER_HOUR);
        let padding = (hour_end - 1).saturating_sub(h.prev_epoch);
        if padding < 0 || padding > self.options.row_tolerance as i64 {
            warn!(
                file = self.source_name,
                padding,
                last_epoch = h.prev_epoch,
                "unexpected end-of-hour padding; clamping to {} rows",
                ROWS_PER_HOUR
            );
            anomalies.push(Anomaly::RowCount { padding });
        }
        let filled = h.series.len() as i64;
        for epoch in h.hour_start + filled..hour_end {
            h.series.push_absent(epoch);
        }

        Ok(Canonicalized {
            series: h.series,
            hour_start: h.hour_start,
            anomalies,
        })
    }
}

fn schema_error(source_name: &str, line: usize, source: SampleError) -> PipelineError {
    PipelineError::Schema {
        source_name: source_name.to_string(),
        line,
        source,
    }
}

/// Canonicalize already-parsed samples; line numbers are positions in `samples`.
pub fn canonicalize_samples<I>(
    options: &CanonicalOptions,
    source_name: &str,
    samples: I,
) -> Result<Canonicalized>
where
    I: IntoIterator<Item = RawSample>,
{
    let mut builder = HourBuilder::new(options, source_name);
    for (i, sample) in samples.into_iter().enumerate() {
        builder.push(i + 1, sample)?;
    }
    builder.finish()
}

/// Canonicalize `epoch<TAB>json` lines. Blank lines are ignored; any other malformed line is fatal.
pub fn canonicalize_reader<R: BufRead>(
    options: &CanonicalOptions,
    source_name: &str,
    reader: R,
) -> Result<Canonicalized> {
    let mut builder = HourBuilder::new(options, source_name);
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let sample = RawSample::parse_line(&line)
            .map_err(|source| schema_error(source_name, i + 1, source))?;
        builder.push(i + 1, sample)?;
    }
    builder.finish()
}

/// Read one raw hour file and write its canonical TSV.
#[instrument(skip(options), fields(raw = %raw_path.display()))]
pub fn canonicalize_file(
    options: &CanonicalOptions,
    raw_path: &Path,
    tsv_path: &Path,
) -> Result<Canonicalized> {
    let source_name = raw_path.display().to_string();
    let file = std::fs::File::open(raw_path)?;
    let out = canonicalize_reader(options, &source_name, std::io::BufReader::new(file))?;
    tsv::write_file(tsv_path, &out.series)?;
    Ok(out)
}
