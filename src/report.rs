// Report generation for one run:
//   1. canonicalize new raw hour files of every host (bounded pool)
//   2. barrier, then per host: concatenate the run's hours, redistribute gaps, emit graph
//   3. fleet sum/avg/max graphs, step tables, index
// Per-host failures are logged and skipped; only an unusable run is an error.

use std::path::Path;
use std::sync::Arc;

use chrono::TimeZone;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::canonical::tsv;
use crate::config::AppConfig;
use crate::error::{PipelineError, Result};
use crate::fleet::{self, AggregateKind, HostSeries};
use crate::gap;
use crate::layout::{self, RunLayout};
use crate::models::{IndexDocument, RunDescriptor, TimeSeries, View};
use crate::serializer;
use crate::steps;
use crate::version;
use crate::worker::{self, CanonicalizeJob};

pub const SUM_TABLE_FILE: &str = "sum.tb.json";
pub const AVG_TABLE_FILE: &str = "avg.tb.json";
pub const INDEX_FILE: &str = "index.json";

/// Whether an output that already exists is rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputPolicy {
    Recompute,
    KeepExisting,
}

impl OutputPolicy {
    pub fn from_reset(reset: bool) -> Self {
        if reset {
            OutputPolicy::Recompute
        } else {
            OutputPolicy::KeepExisting
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emitted {
    Written,
    Kept,
}

/// Write the document produced by `build`, unless `policy` keeps an existing file,
/// in which case `build` is not called at all.
pub fn emit<T, F>(path: &Path, policy: OutputPolicy, build: F) -> Result<Emitted>
where
    T: Serialize,
    F: FnOnce() -> Result<T>,
{
    if policy == OutputPolicy::KeepExisting && path.is_file() {
        return Ok(Emitted::Kept);
    }
    serializer::write_document(path, &build()?)?;
    Ok(Emitted::Written)
}

pub fn graph_file(stem: &str) -> String {
    format!("{stem}.gr.json")
}

#[derive(Debug, Default)]
pub struct ReportSummary {
    pub run_name: String,
    pub files_canonicalized: usize,
    pub files_failed: usize,
    pub hosts_included: Vec<String>,
    /// (host id, reason) for hosts left out of the fleet.
    pub hosts_skipped: Vec<(String, String)>,
    pub documents_written: usize,
    pub documents_kept: usize,
}

impl ReportSummary {
    fn record(&mut self, emitted: Emitted) {
        match emitted {
            Emitted::Written => self.documents_written += 1,
            Emitted::Kept => self.documents_kept += 1,
        }
    }
}

/// Concatenate a host's canonical hours in order. Any missing or unreadable hour,
/// or hours with differing columns, makes the host unusable.
pub fn load_host_series(
    layout: &RunLayout,
    host_id: &str,
    hours: &[String],
) -> Result<TimeSeries> {
    let missing = |reason: String| PipelineError::MissingHostData {
        host: host_id.to_string(),
        reason,
    };
    let mut combined: Option<TimeSeries> = None;
    for stem in hours {
        let path = layout.tsv_file(host_id, stem);
        let hour =
            tsv::read_file(&path).map_err(|e| missing(format!("{}: {}", path.display(), e)))?;
        combined = Some(match combined.take() {
            None => hour,
            Some(mut acc) => {
                if acc.columns() != hour.columns() {
                    return Err(missing(format!("{stem}: columns differ from earlier hours")));
                }
                acc.append(hour);
                acc
            }
        });
    }
    combined.ok_or_else(|| missing("run covers no hour files".into()))
}

fn index_views(hosts: &[(String, String)]) -> Vec<View> {
    let view = |title: String, file: String, kind: &str, load: bool| View {
        title,
        file,
        kind: kind.to_string(),
        load,
    };
    let mut views = vec![
        view("Average Table".into(), AVG_TABLE_FILE.into(), "table", true),
        view("Sums Table".into(), SUM_TABLE_FILE.into(), "table", true),
        view("Mean Graph".into(), graph_file("avg"), "graph", true),
        view("Max Graph".into(), graph_file("max"), "graph", false),
        view("Sum Graph".into(), graph_file("sum"), "graph", false),
    ];
    for (id, host) in hosts {
        views.push(view(
            format!("Supervisor {id} Graph (IP: {host})"),
            graph_file(id),
            "graph",
            false,
        ));
    }
    views
}

/// Generate every document of `run`. Hour files are named in `tz`.
#[instrument(skip_all, fields(run = %run.run_name))]
pub async fn generate<Tz>(
    config: &AppConfig,
    run: &RunDescriptor,
    reset: bool,
    tz: &Tz,
) -> Result<ReportSummary>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let policy = OutputPolicy::from_reset(reset);
    let step_epochs = run.step_epochs();
    steps::validate_boundaries(&step_epochs)?;
    let hours = layout::hour_file_names(&step_epochs, tz)?;
    let layout = RunLayout::new(&config.paths.reports_dir, &run.run_name);
    layout.create_dirs(run.hosts().iter().map(|h| h.id.as_str()))?;

    let mut summary = ReportSummary {
        run_name: run.run_name.clone(),
        ..Default::default()
    };

    let mut jobs = Vec::new();
    for host in run.hosts() {
        match layout::pending_raw_stems(&layout, &host.id, reset) {
            Ok(stems) => jobs.extend(stems.into_iter().map(|stem| CanonicalizeJob {
                raw_path: layout.raw_file(&host.id, &stem),
                tsv_path: layout.tsv_file(&host.id, &stem),
                host_id: host.id.clone(),
                stem,
            })),
            Err(e) => warn!(host = %host.id, error = %e, "could not list raw hour files"),
        }
    }
    if jobs.is_empty() {
        warn!("no new raw hour files to canonicalize");
    }
    let options = Arc::new(config.canonical_options());
    let outcomes = worker::canonicalize_files(jobs, config.processing.workers, options).await;
    summary.files_canonicalized = outcomes.iter().filter(|o| o.is_ok()).count();
    summary.files_failed = outcomes.len() - summary.files_canonicalized;

    // Every canonicalization task has finished; the rest runs over materialized hours.
    let mut hosts = Vec::with_capacity(run.hosts().len());
    let mut host_views = Vec::new();
    for host in run.hosts() {
        let mut series = match load_host_series(&layout, &host.id, &hours) {
            Ok(s) => s,
            Err(e) => {
                warn!(host = %host.id, ip = %host.host, error = %e, "skipping host");
                summary.hosts_skipped.push((host.id.clone(), e.to_string()));
                continue;
            }
        };
        gap::redistribute(&mut series);
        let graph_path = layout.json_file(&graph_file(&host.id));
        match emit(&graph_path, policy, || Ok(serializer::series_document(&series))) {
            Ok(emitted) => summary.record(emitted),
            Err(e) => {
                warn!(
                    host = %host.id,
                    path = %graph_path.display(),
                    error = %e,
                    "could not write host graph; skipping host"
                );
                summary.hosts_skipped.push((host.id.clone(), e.to_string()));
                continue;
            }
        }
        host_views.push((host.id.clone(), host.host.clone()));
        hosts.push(HostSeries {
            id: host.id.clone(),
            series,
        });
    }

    let fleet = fleet::aggregate(&hosts)
        .ok_or_else(|| PipelineError::EmptyFleet(run.run_name.clone()))?;
    for e in &fleet.excluded {
        if let PipelineError::EpochMismatch { host, .. } = e {
            summary.hosts_skipped.push((host.clone(), e.to_string()));
        }
    }
    summary.hosts_included = fleet.included.clone();

    for kind in AggregateKind::ALL {
        let emitted = emit(&layout.json_file(&graph_file(kind.stem())), policy, || {
            Ok(serializer::series_document(fleet.get(kind)))
        })?;
        summary.record(emitted);
    }

    let sum_path = layout.json_file(SUM_TABLE_FILE);
    let avg_path = layout.json_file(AVG_TABLE_FILE);
    if policy == OutputPolicy::KeepExisting && sum_path.is_file() && avg_path.is_file() {
        warn!("step tables already exist; keeping them");
        summary.documents_kept += 2;
    } else {
        let metrics = fleet.sum.columns().to_vec();
        let (sum_table, avg_table) =
            steps::build_tables(&fleet.sum, &step_epochs, &metrics, fleet.host_count())?;
        serializer::write_document(&sum_path, &serializer::table_document(&sum_table))?;
        serializer::write_document(&avg_path, &serializer::table_document(&avg_table))?;
        summary.documents_written += 2;
    }

    let index = IndexDocument {
        generator: version::generator(),
        step_times: step_epochs,
        run_info: run.meta_data.clone(),
        views: index_views(&host_views),
    };
    serializer::write_document(&layout.json_file(INDEX_FILE), &index)?;
    summary.documents_written += 1;

    info!(
        hosts = summary.hosts_included.len(),
        skipped = summary.hosts_skipped.len(),
        written = summary.documents_written,
        kept = summary.documents_kept,
        "report generated"
    );
    Ok(summary)
}
