use std::io::Read;

use anyhow::Result;
use fleetperf::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

/// Run descriptor from the first non-flag argument, or stdin when absent.
fn read_run_descriptor(path: Option<&str>) -> Result<models::RunDescriptor> {
    let text = match path {
        Some(p) => std::fs::read_to_string(p)
            .map_err(|e| anyhow::anyhow!("read run descriptor {}: {}", p, e))?,
        None => {
            let mut s = String::new();
            std::io::stdin().read_to_string(&mut s)?;
            s
        }
    };
    Ok(models::RunDescriptor::from_json(&text)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    // Usage: fleetperf [RUN_JSON] [--reset]
    let args: Vec<String> = std::env::args().skip(1).collect();
    let reset_flag = args.iter().any(|a| a == "-r" || a == "--reset");
    let run_path = args.iter().find(|a| !a.starts_with('-')).map(String::as_str);

    let app_config = config::AppConfig::load()?;
    let run = read_run_descriptor(run_path)?;
    let reset = reset_flag || app_config.processing.reset;
    tracing::info!(
        generator = %version::generator(),
        run = %run.run_name,
        hosts = run.hosts().len(),
        reset,
        "generating report"
    );

    let summary = report::generate(&app_config, &run, reset, &chrono::Local).await?;
    for (host, reason) in &summary.hosts_skipped {
        tracing::warn!(%host, %reason, "host not in fleet report");
    }
    tracing::info!(
        run = %summary.run_name,
        canonicalized = summary.files_canonicalized,
        failed = summary.files_failed,
        hosts = summary.hosts_included.len(),
        "done; documents under {}",
        layout::RunLayout::new(&app_config.paths.reports_dir, &run.run_name)
            .json_dir()
            .display()
    );
    Ok(())
}
