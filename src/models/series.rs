// Column-major per-second series. Absent cells are `None`, never NaN.

/// One value of a series; `None` marks a second with no data (distinct from a zero reading).
pub type Cell = Option<f64>;

pub const SECS_PER_HOUR: i64 = 3600;

/// Epoch column plus named value columns, all the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    columns: Vec<String>,
    epochs: Vec<i64>,
    data: Vec<Vec<Cell>>,
}

impl TimeSeries {
    pub fn new(columns: Vec<String>) -> Self {
        Self::with_capacity(columns, 0)
    }

    pub fn with_capacity(columns: Vec<String>, rows: usize) -> Self {
        let data = columns.iter().map(|_| Vec::with_capacity(rows)).collect();
        Self {
            columns,
            epochs: Vec::with_capacity(rows),
            data,
        }
    }

    /// Build from whole columns. Panics if a column length differs from `epochs`.
    pub fn from_columns(epochs: Vec<i64>, columns: Vec<(String, Vec<Cell>)>) -> Self {
        let mut names = Vec::with_capacity(columns.len());
        let mut data = Vec::with_capacity(columns.len());
        for (name, cells) in columns {
            assert_eq!(cells.len(), epochs.len(), "column {name} length");
            names.push(name);
            data.push(cells);
        }
        Self {
            columns: names,
            epochs,
            data,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn epochs(&self) -> &[i64] {
        &self.epochs
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn first_epoch(&self) -> Option<i64> {
        self.epochs.first().copied()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.column_index(name).map(|i| self.data[i].as_slice())
    }

    pub fn column_at(&self, index: usize) -> &[Cell] {
        &self.data[index]
    }

    pub(crate) fn column_at_mut(&mut self, index: usize) -> &mut [Cell] {
        &mut self.data[index]
    }

    /// Cells of row `index`, in column order.
    pub fn row(&self, index: usize) -> impl Iterator<Item = Cell> + '_ {
        self.data.iter().map(move |col| col[index])
    }

    pub fn push_row(&mut self, epoch: i64, cells: &[Cell]) {
        assert_eq!(cells.len(), self.columns.len(), "row width");
        self.epochs.push(epoch);
        for (col, cell) in self.data.iter_mut().zip(cells) {
            col.push(*cell);
        }
    }

    /// Push a sentinel row: every value cell absent.
    pub fn push_absent(&mut self, epoch: i64) {
        self.epochs.push(epoch);
        for col in &mut self.data {
            col.push(None);
        }
    }

    /// Append `other` below `self`. Panics if column names differ; check `columns()` first.
    pub fn append(&mut self, other: TimeSeries) {
        assert_eq!(self.columns, other.columns, "appended series columns");
        self.epochs.extend(other.epochs);
        for (col, more) in self.data.iter_mut().zip(other.data) {
            col.extend(more);
        }
    }

    /// Number of absent cells across all value columns.
    pub fn absent_cells(&self) -> usize {
        self.data
            .iter()
            .map(|col| col.iter().filter(|c| c.is_none()).count())
            .sum()
    }
}
