// Gap redistribution: a value recorded right after missing seconds is spread evenly
// over itself and the missing run, so per-column sums stay equal to what was recorded.

use tracing::debug;

use crate::models::{Cell, TimeSeries};

/// Resolve every absent run that is followed by a real value `v`: the run and `v`'s own
/// cell all become `v / (run_len + 1)`. Runs reaching the end of a column stay absent.
///
/// Returns the number of cells left absent.
pub fn redistribute_column(column: &mut [Cell]) -> usize {
    let mut run_start: Option<usize> = None;
    for i in 0..column.len() {
        match (run_start, column[i]) {
            (None, None) => run_start = Some(i),
            (Some(j), Some(v)) => {
                let share = v / (i - j + 1) as f64;
                for cell in &mut column[j..=i] {
                    *cell = Some(share);
                }
                run_start = None;
            }
            _ => {}
        }
    }
    run_start.map_or(0, |j| column.len() - j)
}

/// Apply [`redistribute_column`] to every value column. Returns unresolved trailing cells.
pub fn redistribute(series: &mut TimeSeries) -> usize {
    let mut unresolved = 0;
    for index in 0..series.columns().len() {
        unresolved += redistribute_column(series.column_at_mut(index));
    }
    if unresolved > 0 {
        debug!(unresolved, "trailing gaps left absent");
    }
    unresolved
}
