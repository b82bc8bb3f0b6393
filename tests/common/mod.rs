// Shared test helpers
#![allow(dead_code)]

use fleetperf::models::{RawSample, TimeSeries};

/// 2024-03-01T10:00:00Z, on an hour boundary.
pub const HOUR: i64 = 1_709_287_200;

/// Values for nr, nw, dr, dw, cu, cs; ci, cn, cw are zero.
pub type Counters = [f64; 6];

pub const IDLE: Counters = [0.0; 6];

const NAMES: [&str; 6] = ["nr", "nw", "dr", "dw", "cu", "cs"];

pub fn sample(epoch: i64, values: Counters) -> RawSample {
    let mut counters: Vec<(String, f64)> = NAMES
        .iter()
        .zip(values)
        .map(|(n, v)| (n.to_string(), v))
        .collect();
    for n in ["ci", "cn", "cw"] {
        counters.push((n.to_string(), 0.0));
    }
    RawSample::new(epoch, counters)
}

pub fn raw_line(epoch: i64, values: Counters) -> String {
    let [nr, nw, dr, dw, cu, cs] = values;
    format!(
        "{epoch}\t{{\"nr\": {nr}, \"nw\": {nw}, \"dr\": {dr}, \"dw\": {dw}, \"cu\": {cu}, \"cs\": {cs}, \"ci\": 0, \"cn\": 0, \"cw\": 0}}\n"
    )
}

/// Raw hour file text: one line per second from `start` for `count` seconds.
pub fn raw_hour(start: i64, count: i64, values: Counters) -> String {
    (start..start + count).map(|e| raw_line(e, values)).collect()
}

pub fn series(epochs: Vec<i64>, columns: &[(&str, Vec<Option<f64>>)]) -> TimeSeries {
    TimeSeries::from_columns(
        epochs,
        columns
            .iter()
            .map(|(n, c)| (n.to_string(), c.clone()))
            .collect(),
    )
}

pub fn values(v: &[f64]) -> Vec<Option<f64>> {
    v.iter().copied().map(Some).collect()
}
