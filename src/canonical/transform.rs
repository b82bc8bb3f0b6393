// Per-column transforms applied to raw counters before aggregates are derived.

use std::sync::Arc;

/// Transform one raw counter given the previous accepted raw (untransformed) value.
pub trait ColumnTransform: Send + Sync + std::fmt::Debug {
    fn apply(&self, current: f64, previous: Option<f64>) -> f64;
}

/// 2-point trailing mean. Some collectors only refresh network counters every
/// other second, so the raw series alternates between a value and a repeat.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrailingMean;

impl ColumnTransform for TrailingMean {
    fn apply(&self, current: f64, previous: Option<f64>) -> f64 {
        match previous {
            Some(prev) => (current + prev) / 2.0,
            None => current,
        }
    }
}

/// Transforms keyed by raw column name.
#[derive(Debug, Clone, Default)]
pub struct TransformSet {
    entries: Vec<(String, Arc<dyn ColumnTransform>)>,
}

impl TransformSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trailing mean on each named column.
    pub fn trailing_mean<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for c in columns {
            set = set.with(c, TrailingMean);
        }
        set
    }

    pub fn with(
        mut self,
        column: impl Into<String>,
        transform: impl ColumnTransform + 'static,
    ) -> Self {
        let column = column.into();
        self.entries.retain(|(c, _)| *c != column);
        self.entries.push((column, Arc::new(transform)));
        self
    }

    pub fn get(&self, column: &str) -> Option<&dyn ColumnTransform> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, t)| t.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
