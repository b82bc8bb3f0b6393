// Pipeline error taxonomy. Recoverable anomalies (ordering, alignment, row count)
// are not errors; see canonical::Anomaly.

use std::path::PathBuf;

/// Why a raw sample line could not be turned into a row.
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("missing tab between epoch and counters")]
    MissingSeparator,
    #[error("invalid epoch {0:?}")]
    BadEpoch(String),
    #[error("invalid counter payload: {0}")]
    BadJson(#[from] serde_json::Error),
    #[error("counter payload is not a JSON object")]
    NotAnObject,
    #[error("counter {0:?} is not numeric")]
    NonNumeric(String),
    #[error("counter {0:?} missing from sample")]
    MissingCounter(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Row schema could not be established or a row broke it. Fatal for the host-hour.
    #[error("schema error in {source_name} line {line}: {source}")]
    Schema {
        source_name: String,
        line: usize,
        #[source]
        source: SampleError,
    },

    #[error("no accepted samples in {0}")]
    EmptyInput(String),

    #[error("malformed canonical file {path}: {reason}")]
    MalformedCanonical { path: PathBuf, reason: String },

    /// Host epoch grid or column set disagrees with the reference host.
    #[error("epochs for host {host} do not match the reference grid: {reason}")]
    EpochMismatch { host: String, reason: String },

    #[error("no canonical data for host {host}: {reason}")]
    MissingHostData { host: String, reason: String },

    #[error("invalid step boundaries: {0}")]
    InvalidSteps(String),

    #[error("series has no column {0:?}")]
    UnknownColumn(String),

    #[error("no host produced usable data for run {0}")]
    EmptyFleet(String),

    #[error("canonicalization task for {0} did not complete: {1}")]
    TaskFailed(String, String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
