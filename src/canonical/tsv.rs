// Canonical TSV: header `epoch<TAB>col...`, one row per second, `nan` for absent cells.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::models::{Cell, TimeSeries};

use super::schema::EPOCH_COLUMN;

pub const ABSENT_TOKEN: &str = "nan";

pub fn write_series<W: Write>(mut w: W, series: &TimeSeries) -> std::io::Result<()> {
    write!(w, "{EPOCH_COLUMN}")?;
    for name in series.columns() {
        write!(w, "\t{name}")?;
    }
    writeln!(w)?;
    for (i, epoch) in series.epochs().iter().enumerate() {
        write!(w, "{epoch}")?;
        for cell in series.row(i) {
            match cell {
                Some(v) => write!(w, "\t{v}")?,
                None => write!(w, "\t{ABSENT_TOKEN}")?,
            }
        }
        writeln!(w)?;
    }
    w.flush()
}

/// Write via a temporary sibling then rename, so a failed task never leaves a partial TSV.
pub fn write_file(path: &Path, series: &TimeSeries) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tsv.partial");
    let written = File::create(&tmp)
        .and_then(|f| write_series(BufWriter::new(f), series))
        .and_then(|()| std::fs::rename(&tmp, path));
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

fn parse_cell(token: &str) -> Option<Cell> {
    if token.eq_ignore_ascii_case(ABSENT_TOKEN) {
        return Some(None);
    }
    token.parse::<f64>().ok().map(Some)
}

pub fn read_series<R: BufRead>(reader: R, path: &Path) -> Result<TimeSeries> {
    let malformed = |reason: String| PipelineError::MalformedCanonical {
        path: path.to_path_buf(),
        reason,
    };
    let mut lines = reader.lines();
    let header = lines
        .next()
        .transpose()?
        .ok_or_else(|| malformed("empty file".into()))?;
    let mut names = header.split('\t');
    if names.next() != Some(EPOCH_COLUMN) {
        return Err(malformed(format!("header must start with {EPOCH_COLUMN}")));
    }
    let columns: Vec<String> = names.map(String::from).collect();
    let mut series = TimeSeries::new(columns);
    let width = series.columns().len();

    let mut cells: Vec<Cell> = Vec::with_capacity(width);
    for (i, line) in lines.enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let mut tokens = line.split('\t');
        let epoch_token = tokens.next().unwrap_or_default();
        let epoch = epoch_token
            .parse::<i64>()
            .or_else(|_| epoch_token.parse::<f64>().map(|e| e as i64))
            .map_err(|_| malformed(format!("row {}: bad epoch {epoch_token:?}", i + 2)))?;
        cells.clear();
        for token in tokens {
            let cell = parse_cell(token)
                .ok_or_else(|| malformed(format!("row {}: bad value {token:?}", i + 2)))?;
            cells.push(cell);
        }
        if cells.len() != width {
            return Err(malformed(format!(
                "row {}: {} values, header has {}",
                i + 2,
                cells.len(),
                width
            )));
        }
        series.push_row(epoch, &cells);
    }
    Ok(series)
}

pub fn read_file(path: &Path) -> Result<TimeSeries> {
    let file = File::open(path)?;
    read_series(BufReader::new(file), path)
}
