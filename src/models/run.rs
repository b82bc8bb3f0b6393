// Run descriptor: run name, step boundaries and host roster. Produced elsewhere, read here.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostEntry {
    pub id: String,
    pub host: String,
}

/// `meta_data` block. Keys other than `hosts` are carried through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub hosts: Vec<HostEntry>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunDescriptor {
    pub run_name: String,
    /// Step boundaries in unix seconds; fractional seconds are dropped.
    pub step_times: Vec<f64>,
    pub meta_data: RunMeta,
}

impl RunDescriptor {
    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    pub fn step_epochs(&self) -> Vec<i64> {
        self.step_times.iter().map(|t| t.trunc() as i64).collect()
    }

    pub fn hosts(&self) -> &[HostEntry] {
        &self.meta_data.hosts
    }
}
