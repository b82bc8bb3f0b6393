// Bounded pool for per-file canonicalization.
// Each task owns one raw input and one TSV output; tasks share nothing, run in any order,
// and a failing task never affects the others.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, instrument, warn};

use crate::canonical::{self, Anomaly, CanonicalOptions};
use crate::error::PipelineError;

#[derive(Debug, Clone)]
pub struct CanonicalizeJob {
    pub host_id: String,
    pub stem: String,
    pub raw_path: PathBuf,
    pub tsv_path: PathBuf,
}

#[derive(Debug)]
pub struct FileOutcome {
    pub job: CanonicalizeJob,
    pub result: Result<Vec<Anomaly>, PipelineError>,
}

impl FileOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

fn run_job(
    options: &CanonicalOptions,
    job: &CanonicalizeJob,
) -> Result<Vec<Anomaly>, PipelineError> {
    let out = canonical::canonicalize_file(options, &job.raw_path, &job.tsv_path)?;
    info!(
        host = %job.host_id,
        file = %job.stem,
        anomalies = out.anomalies.len(),
        "canonical hour written"
    );
    Ok(out.anomalies)
}

/// Run every job with at most `workers` running at once. Outcomes come back in job order.
#[instrument(skip(jobs, options), fields(jobs = jobs.len(), workers))]
pub async fn canonicalize_files(
    jobs: Vec<CanonicalizeJob>,
    workers: usize,
    options: Arc<CanonicalOptions>,
) -> Vec<FileOutcome> {
    if jobs.is_empty() {
        return Vec::new();
    }
    let permits = Arc::new(Semaphore::new(workers.max(1)));
    let mut set = JoinSet::new();
    let mut task_index = HashMap::with_capacity(jobs.len());
    let mut results: Vec<Option<Result<Vec<Anomaly>, PipelineError>>> =
        (0..jobs.len()).map(|_| None).collect();

    for (index, job) in jobs.iter().enumerate() {
        let permit = match permits.clone().acquire_owned().await {
            Ok(p) => p,
            Err(e) => {
                results[index] = Some(Err(PipelineError::TaskFailed(
                    job.stem.clone(),
                    e.to_string(),
                )));
                continue;
            }
        };
        let options = options.clone();
        let job = job.clone();
        let handle = set.spawn_blocking(move || {
            let _permit = permit;
            (index, run_job(&options, &job))
        });
        task_index.insert(handle.id(), index);
    }

    while let Some(joined) = set.join_next_with_id().await {
        match joined {
            Ok((_, (index, result))) => results[index] = Some(result),
            Err(e) => {
                if let Some(&index) = task_index.get(&e.id()) {
                    results[index] = Some(Err(PipelineError::TaskFailed(
                        jobs[index].stem.clone(),
                        e.to_string(),
                    )));
                }
            }
        }
    }

    jobs.into_iter()
        .zip(results)
        .map(|(job, result)| {
            let result = result.unwrap_or_else(|| {
                Err(PipelineError::TaskFailed(job.stem.clone(), "no result".into()))
            });
            if let Err(e) = &result {
                warn!(
                    host = %job.host_id,
                    file = %job.stem,
                    error = %e,
                    "canonicalization failed"
                );
            }
            FileOutcome { job, result }
        })
        .collect()
}
