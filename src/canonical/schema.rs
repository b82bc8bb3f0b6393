// Row schema for one host-hour: raw counter columns plus derived aggregate columns.

use crate::error::SampleError;
use crate::models::RawSample;

use super::transform::TransformSet;

pub const EPOCH_COLUMN: &str = "epoch";
pub const CLASS_COLUMN: &str = "class";
pub const MAX_COLUMN: &str = "max";
pub const MEAN_COLUMN: &str = "mean";

/// Counters every host-hour schema starts with, in column order.
pub const BASELINE_COUNTERS: [&str; 9] = ["nr", "nw", "dr", "dw", "cu", "cs", "ci", "cn", "cw"];

pub const DEFAULT_NETWORK_CAPACITY: f64 = 100.0e6;
pub const DEFAULT_DISK_CAPACITY: f64 = 150.0e6;
pub const DEFAULT_CPU_CAPACITY: f64 = 3200.0;

/// How the inputs of an aggregate are combined before normalizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combine {
    Max,
    Sum,
}

impl Combine {
    fn apply(self, values: impl Iterator<Item = f64>) -> f64 {
        match self {
            Combine::Max => values.fold(f64::NEG_INFINITY, f64::max),
            Combine::Sum => values.sum(),
        }
    }
}

/// Derived column: `combine(inputs) / capacity`, the fraction of theoretical capacity in use.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateMeasure {
    pub name: String,
    pub inputs: Vec<String>,
    pub combine: Combine,
    pub capacity: f64,
}

impl AggregateMeasure {
    pub fn new(name: &str, inputs: &[&str], combine: Combine, capacity: f64) -> Self {
        Self {
            name: name.to_string(),
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            combine,
            capacity,
        }
    }
}

/// network = max(nr, nw), disk = dr + dw, cpu = cu + cs; each over its capacity.
pub fn standard_measures(network: f64, disk: f64, cpu: f64) -> Vec<AggregateMeasure> {
    vec![
        AggregateMeasure::new("network", &["nr", "nw"], Combine::Max, network),
        AggregateMeasure::new("disk", &["dr", "dw"], Combine::Sum, disk),
        AggregateMeasure::new("cpu", &["cu", "cs"], Combine::Sum, cpu),
    ]
}

/// Deployment-wide template from which each host-hour schema is derived.
#[derive(Debug, Clone)]
pub struct CanonicalOptions {
    pub baseline: Vec<String>,
    pub measures: Vec<AggregateMeasure>,
    pub transforms: TransformSet,
    /// Allowed end-of-hour padding before a row-count anomaly is reported.
    pub row_tolerance: usize,
}

impl Default for CanonicalOptions {
    fn default() -> Self {
        Self {
            baseline: BASELINE_COUNTERS.iter().map(|s| s.to_string()).collect(),
            measures: standard_measures(
                DEFAULT_NETWORK_CAPACITY,
                DEFAULT_DISK_CAPACITY,
                DEFAULT_CPU_CAPACITY,
            ),
            transforms: TransformSet::trailing_mean(["nr", "nw"]),
            row_tolerance: 100,
        }
    }
}

#[derive(Debug, Clone)]
struct ResolvedMeasure {
    inputs: Vec<usize>,
    combine: Combine,
    capacity: f64,
}

/// Column layout fixed by the first accepted sample of a host-hour.
#[derive(Debug, Clone)]
pub struct RowSchema {
    raw_names: Vec<String>,
    measure_names: Vec<String>,
    measures: Vec<ResolvedMeasure>,
}

impl RowSchema {
    /// Baseline counters followed by any new names in `first`, in payload order.
    pub fn derive(options: &CanonicalOptions, first: &RawSample) -> Result<Self, SampleError> {
        let mut raw_names = options.baseline.clone();
        for name in first.names() {
            if !raw_names.iter().any(|n| n == name) {
                raw_names.push(name.to_string());
            }
        }
        let mut measures = Vec::with_capacity(options.measures.len());
        for m in &options.measures {
            let inputs = m
                .inputs
                .iter()
                .map(|input| {
                    raw_names
                        .iter()
                        .position(|n| n == input)
                        .ok_or_else(|| SampleError::MissingCounter(input.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            measures.push(ResolvedMeasure {
                inputs,
                combine: m.combine,
                capacity: m.capacity,
            });
        }
        Ok(Self {
            raw_names,
            measure_names: options.measures.iter().map(|m| m.name.clone()).collect(),
            measures,
        })
    }

    pub fn raw_names(&self) -> &[String] {
        &self.raw_names
    }

    /// Value columns (epoch excluded): class, max, mean, aggregates, raw counters.
    pub fn column_names(&self) -> Vec<String> {
        let mut cols = Vec::with_capacity(self.width());
        cols.extend([CLASS_COLUMN, MAX_COLUMN, MEAN_COLUMN].map(String::from));
        cols.extend(self.measure_names.iter().cloned());
        cols.extend(self.raw_names.iter().cloned());
        cols
    }

    pub fn width(&self) -> usize {
        3 + self.measure_names.len() + self.raw_names.len()
    }

    /// Aggregates for one row of (already transformed) raw values ordered as `raw_names`.
    pub fn aggregates(&self, raw: &[f64]) -> Vec<f64> {
        self.measures
            .iter()
            .map(|m| m.combine.apply(m.inputs.iter().map(|&i| raw[i])) / m.capacity)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(counters: &[(&str, f64)]) -> RawSample {
        RawSample::new(
            0,
            counters.iter().map(|(n, v)| (n.to_string(), *v)).collect(),
        )
    }

    #[test]
    fn derive_appends_unseen_names_after_baseline() {
        let s = sample(&[("cw", 0.0), ("extra", 1.0), ("nr", 2.0), ("alpha", 3.0)]);
        let schema = RowSchema::derive(&CanonicalOptions::default(), &s).unwrap();
        let raw = schema.raw_names();
        assert_eq!(raw.len(), 11);
        assert_eq!(&raw[..9], BASELINE_COUNTERS.map(String::from).as_slice());
        assert_eq!(&raw[9..], &["extra".to_string(), "alpha".to_string()]);
        let cols = schema.column_names();
        assert_eq!(&cols[..6], &["class", "max", "mean", "network", "disk", "cpu"]);
        assert_eq!(cols.len(), schema.width());
    }

    #[test]
    fn aggregates_normalize_by_capacity() {
        let schema = RowSchema::derive(&CanonicalOptions::default(), &sample(&[])).unwrap();
        // nr nw dr dw cu cs ci cn cw
        let raw = [50.0e6, 20.0e6, 30.0e6, 45.0e6, 800.0, 800.0, 0.0, 0.0, 0.0];
        let aggs = schema.aggregates(&raw);
        assert_eq!(aggs, vec![0.5, 0.5, 0.5]);
    }

    #[test]
    fn derive_fails_when_measure_input_unknown() {
        let options = CanonicalOptions {
            baseline: vec!["nr".into()],
            ..CanonicalOptions::default()
        };
        let err = RowSchema::derive(&options, &sample(&[("nr", 1.0)])).unwrap_err();
        assert!(matches!(err, SampleError::MissingCounter(ref n) if n == "nw"));
    }
}
