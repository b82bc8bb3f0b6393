// Domain models: raw samples, aligned series, run descriptor, output documents

mod document;
mod run;
mod sample;
mod series;

pub use document::{
    ColumnSpec, IndexDocument, SeriesDocument, SeriesEntry, TableCell, TableDocument, View,
};
pub use run::{HostEntry, RunDescriptor, RunMeta};
pub use sample::RawSample;
pub use series::{Cell, SECS_PER_HOUR, TimeSeries};
