// On-disk layout of one run's report and hour-file discovery.
//
// <reports_dir>/<run_name>/
//   data/<host_id>/raw/<hour>.txt   raw samples
//   data/<host_id>/tsv/<hour>.tsv   canonical hours
//   deploy/json/*.json              documents for the front end

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

use crate::error::{PipelineError, Result};
use crate::models::SECS_PER_HOUR;

pub const RAW_EXT: &str = "txt";
pub const TSV_EXT: &str = "tsv";
const HOUR_FILE_FORMAT: &str = "yperf-%Y%m%d-%H";

#[derive(Debug, Clone)]
pub struct RunLayout {
    root: PathBuf,
}

impl RunLayout {
    pub fn new(reports_dir: impl AsRef<Path>, run_name: &str) -> Self {
        Self {
            root: reports_dir.as_ref().join(run_name),
        }
    }

    pub fn host_dir(&self, host_id: &str) -> PathBuf {
        self.root.join("data").join(host_id)
    }

    pub fn raw_dir(&self, host_id: &str) -> PathBuf {
        self.host_dir(host_id).join("raw")
    }

    pub fn tsv_dir(&self, host_id: &str) -> PathBuf {
        self.host_dir(host_id).join("tsv")
    }

    pub fn raw_file(&self, host_id: &str, stem: &str) -> PathBuf {
        self.raw_dir(host_id).join(format!("{stem}.{RAW_EXT}"))
    }

    pub fn tsv_file(&self, host_id: &str, stem: &str) -> PathBuf {
        self.tsv_dir(host_id).join(format!("{stem}.{TSV_EXT}"))
    }

    pub fn json_dir(&self) -> PathBuf {
        self.root.join("deploy").join("json")
    }

    pub fn json_file(&self, name: &str) -> PathBuf {
        self.json_dir().join(name)
    }

    /// Create raw/tsv dirs for each host and the json dir.
    pub fn create_dirs<'a>(&self, host_ids: impl IntoIterator<Item = &'a str>) -> Result<()> {
        for id in host_ids {
            std::fs::create_dir_all(self.raw_dir(id))?;
            std::fs::create_dir_all(self.tsv_dir(id))?;
        }
        std::fs::create_dir_all(self.json_dir())?;
        Ok(())
    }
}

/// Hour-file stem for the hour containing `epoch`, in `tz`.
pub fn hour_file_name<Tz: TimeZone>(epoch: i64, tz: &Tz) -> Result<String>
where
    Tz::Offset: std::fmt::Display,
{
    let utc = DateTime::from_timestamp(epoch, 0)
        .ok_or_else(|| PipelineError::InvalidSteps(format!("epoch {epoch} out of range")))?;
    Ok(utc.with_timezone(tz).format(HOUR_FILE_FORMAT).to_string())
}

/// Hour files covering `[first step, last step]`, one per hour, always ending with the
/// hour of the last step.
pub fn hour_file_names<Tz: TimeZone>(step_epochs: &[i64], tz: &Tz) -> Result<Vec<String>>
where
    Tz::Offset: std::fmt::Display,
{
    let (Some(&first), Some(&last)) = (step_epochs.first(), step_epochs.last()) else {
        return Err(PipelineError::InvalidSteps("no step times".into()));
    };
    let mut names = Vec::new();
    let mut curr = first;
    while curr < last {
        names.push(hour_file_name(curr, tz)?);
        curr += SECS_PER_HOUR;
    }
    let last_name = hour_file_name(last, tz)?;
    if names.last() != Some(&last_name) {
        names.push(last_name);
    }
    Ok(names)
}

/// File stems in `dir` with extension `ext`. Missing dir yields an empty set.
pub fn file_stems(dir: &Path, ext: &str) -> Result<BTreeSet<String>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
        Err(e) => return Err(e.into()),
    };
    let mut stems = BTreeSet::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some(ext)
            && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
        {
            stems.insert(stem.to_string());
        }
    }
    Ok(stems)
}

/// Raw hour files of a host still needing canonicalization (all of them when `reset`).
pub fn pending_raw_stems(layout: &RunLayout, host_id: &str, reset: bool) -> Result<Vec<String>> {
    let raw = file_stems(&layout.raw_dir(host_id), RAW_EXT)?;
    if reset {
        return Ok(raw.into_iter().collect());
    }
    let done = file_stems(&layout.tsv_dir(host_id), TSV_EXT)?;
    Ok(raw.into_iter().filter(|s| !done.contains(s)).collect())
}
