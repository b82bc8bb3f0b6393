// Step tables: bucket a fleet series into caller-defined reporting steps.
// Same bucketing idea as the minute/five-minute rollups: half-open [start, end) windows,
// one summary row per window, but windows come from the run's step boundaries.

use tracing::warn;

use crate::error::{PipelineError, Result};
use crate::models::TimeSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepLabel {
    Index(usize),
    Total,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepRow {
    pub label: StepLabel,
    /// Seconds covered by the row (total elapsed for the totals row).
    pub elapsed: i64,
    pub values: Vec<f64>,
}

/// Step rows followed by one totals row.
#[derive(Debug, Clone, PartialEq)]
pub struct StepTable {
    pub metrics: Vec<String>,
    pub rows: Vec<StepRow>,
}

impl StepTable {
    pub fn steps(&self) -> &[StepRow] {
        &self.rows[..self.rows.len().saturating_sub(1)]
    }

    pub fn totals(&self) -> Option<&StepRow> {
        self.rows.last().filter(|r| r.label == StepLabel::Total)
    }

    /// Per-host-per-second table: each row (totals included) divided by `elapsed * host_count`.
    pub fn averaged(&self, host_count: usize) -> StepTable {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let den = row.elapsed as f64 * host_count as f64;
                StepRow {
                    label: row.label,
                    elapsed: row.elapsed,
                    values: row.values.iter().map(|v| v / den).collect(),
                }
            })
            .collect();
        StepTable {
            metrics: self.metrics.clone(),
            rows,
        }
    }
}

/// Boundaries must hold at least two strictly increasing timestamps.
pub fn validate_boundaries(boundaries: &[i64]) -> Result<()> {
    if boundaries.len() < 2 {
        return Err(PipelineError::InvalidSteps(format!(
            "need at least 2 boundaries, got {}",
            boundaries.len()
        )));
    }
    if let Some(w) = boundaries.windows(2).find(|w| w[1] <= w[0]) {
        return Err(PipelineError::InvalidSteps(format!(
            "boundaries not increasing: {} then {}",
            w[0], w[1]
        )));
    }
    // Window lengths sum to this span, so every elapsed value fits too.
    let (first, last) = (boundaries[0], boundaries[boundaries.len() - 1]);
    if last.checked_sub(first).is_none() {
        return Err(PipelineError::InvalidSteps(format!(
            "span {first}..{last} out of range"
        )));
    }
    Ok(())
}

/// Sum each metric over `[t[i-1], t[i])` for every boundary pair, then append totals.
///
/// Windows are located by offset from the series' first epoch and clamped to the series;
/// absent cells contribute nothing.
pub fn build_step_table(
    series: &TimeSeries,
    boundaries: &[i64],
    metrics: &[String],
) -> Result<StepTable> {
    validate_boundaries(boundaries)?;
    let first = series
        .first_epoch()
        .ok_or_else(|| PipelineError::InvalidSteps("series is empty".into()))?;
    let indices = metrics
        .iter()
        .map(|m| {
            series
                .column_index(m)
                .ok_or_else(|| PipelineError::UnknownColumn(m.clone()))
        })
        .collect::<Result<Vec<_>>>()?;

    let len = series.len() as i64;
    let mut rows = Vec::with_capacity(boundaries.len());
    for (step, w) in boundaries.windows(2).enumerate() {
        let offset = |t: i64| {
            t.checked_sub(first).ok_or_else(|| {
                PipelineError::InvalidSteps(format!("boundary {t} too far from series start"))
            })
        };
        let (start, end) = (offset(w[0])?, offset(w[1])?);
        let (lo, hi) = (start.clamp(0, len), end.clamp(0, len));
        if (lo, hi) != (start, end) {
            warn!(
                step,
                start = w[0],
                end = w[1],
                series_start = first,
                rows = len,
                "step window outside series; clamped"
            );
        }
        let values = indices
            .iter()
            .map(|&c| {
                series.column_at(c)[lo as usize..hi as usize]
                    .iter()
                    .flatten()
                    .sum::<f64>()
            })
            .collect();
        rows.push(StepRow {
            label: StepLabel::Index(step),
            elapsed: w[1] - w[0],
            values,
        });
    }

    let mut total = StepRow {
        label: StepLabel::Total,
        elapsed: 0,
        values: vec![0.0; metrics.len()],
    };
    for row in &rows {
        total.elapsed += row.elapsed;
        for (t, v) in total.values.iter_mut().zip(&row.values) {
            *t += v;
        }
    }
    rows.push(total);

    Ok(StepTable {
        metrics: metrics.to_vec(),
        rows,
    })
}

/// Sum table and its per-host-per-second average.
pub fn build_tables(
    series: &TimeSeries,
    boundaries: &[i64],
    metrics: &[String],
    host_count: usize,
) -> Result<(StepTable, StepTable)> {
    let sum = build_step_table(series, boundaries, metrics)?;
    let avg = sum.averaged(host_count);
    Ok((sum, avg))
}
