// Fleet aggregation: per-host series with identical epoch grids -> sum / avg / max series.
// Hosts whose grid or columns disagree with the first host are excluded, not fatal.

use tracing::{error, info, instrument};

use crate::error::PipelineError;
use crate::models::{Cell, TimeSeries};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateKind {
    Sum,
    Avg,
    Max,
}

impl AggregateKind {
    pub const ALL: [AggregateKind; 3] = [
        AggregateKind::Sum,
        AggregateKind::Avg,
        AggregateKind::Max,
    ];

    /// Output file stem, e.g. `avg` for `avg.gr.json`.
    pub fn stem(self) -> &'static str {
        match self {
            AggregateKind::Sum => "sum",
            AggregateKind::Avg => "avg",
            AggregateKind::Max => "max",
        }
    }
}

/// One host's multi-hour series.
#[derive(Debug, Clone)]
pub struct HostSeries {
    pub id: String,
    pub series: TimeSeries,
}

#[derive(Debug)]
pub struct FleetSeries {
    pub sum: TimeSeries,
    pub avg: TimeSeries,
    pub max: TimeSeries,
    /// Hosts that contributed, in input order.
    pub included: Vec<String>,
    pub excluded: Vec<PipelineError>,
}

impl FleetSeries {
    pub fn host_count(&self) -> usize {
        self.included.len()
    }

    pub fn get(&self, kind: AggregateKind) -> &TimeSeries {
        match kind {
            AggregateKind::Sum => &self.sum,
            AggregateKind::Avg => &self.avg,
            AggregateKind::Max => &self.max,
        }
    }
}

/// Host epochs must equal the reference exactly; every reference column must be present.
pub fn check_grid(reference: &TimeSeries, host: &HostSeries) -> Result<(), PipelineError> {
    let mismatch = |reason: String| PipelineError::EpochMismatch {
        host: host.id.clone(),
        reason,
    };
    if host.series.epochs() != reference.epochs() {
        let first_diff = reference
            .epochs()
            .iter()
            .zip(host.series.epochs())
            .position(|(a, b)| a != b);
        return Err(mismatch(match first_diff {
            Some(i) => format!("first difference at row {i}"),
            None => format!(
                "{} rows, reference has {}",
                host.series.len(),
                reference.len()
            ),
        }));
    }
    if let Some(missing) = reference
        .columns()
        .iter()
        .find(|c| host.series.column_index(c).is_none())
    {
        return Err(mismatch(format!("missing column {missing}")));
    }
    Ok(())
}

/// Elementwise combine; absent in either operand stays absent.
fn combine_into(acc: &mut [Cell], other: &[Cell], f: impl Fn(f64, f64) -> f64) {
    for (a, b) in acc.iter_mut().zip(other) {
        *a = match (*a, *b) {
            (Some(x), Some(y)) => Some(f(x, y)),
            _ => None,
        };
    }
}

/// Aggregate hosts against the first host's grid. Returns `None` when `hosts` is empty.
///
/// Works on private copies; host series are never modified.
#[instrument(skip(hosts), fields(hosts = hosts.len()))]
pub fn aggregate(hosts: &[HostSeries]) -> Option<FleetSeries> {
    let (first, rest) = hosts.split_first()?;
    let reference = &first.series;
    let columns = reference.columns().to_vec();

    let mut sum: Vec<Vec<Cell>> = (0..columns.len())
        .map(|i| reference.column_at(i).to_vec())
        .collect();
    let mut max = sum.clone();
    let mut included = vec![first.id.clone()];
    let mut excluded = Vec::new();

    for host in rest {
        if let Err(e) = check_grid(reference, host) {
            error!(host = %host.id, error = %e, "host excluded from fleet aggregation");
            excluded.push(e);
            continue;
        }
        for (i, name) in columns.iter().enumerate() {
            let Some(cells) = host.series.column(name) else {
                continue;
            };
            combine_into(&mut sum[i], cells, |a, b| a + b);
            combine_into(&mut max[i], cells, f64::max);
        }
        included.push(host.id.clone());
    }

    let n = included.len() as f64;
    let avg: Vec<Vec<Cell>> = sum
        .iter()
        .map(|col| col.iter().map(|c| c.map(|v| v / n)).collect())
        .collect();

    let build = |data: Vec<Vec<Cell>>| {
        TimeSeries::from_columns(
            reference.epochs().to_vec(),
            columns.iter().cloned().zip(data).collect(),
        )
    };
    info!(
        included = included.len(),
        excluded = excluded.len(),
        "fleet aggregation complete"
    );
    Some(FleetSeries {
        sum: build(sum),
        avg: build(avg),
        max: build(max),
        included,
        excluded,
    })
}
