// Documents consumed by the visualization front end (compact JSON).

use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::value::RawValue;

use super::RunMeta;

/// Point series for one metric; `data[i]` is the value at `pointStart + i * pointInterval`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesEntry {
    pub name: String,
    pub data: Vec<Option<f64>>,
    pub point_start: i64,
    pub point_interval: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesDocument {
    pub epoch_start: i64,
    pub length: usize,
    pub series: Vec<SeriesEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    #[serde(rename = "sTitle")]
    pub title: String,
    #[serde(rename = "sType")]
    pub kind: String,
}

/// One table value. Metric values render with two decimals.
#[derive(Debug, Clone, PartialEq)]
pub enum TableCell {
    Int(i64),
    Label(String),
    Fixed(f64),
}

impl Serialize for TableCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TableCell::Int(v) => serializer.serialize_i64(*v),
            TableCell::Label(s) => serializer.serialize_str(s),
            TableCell::Fixed(v) if !v.is_finite() => serializer.serialize_none(),
            TableCell::Fixed(v) => RawValue::from_string(format!("{v:.2}"))
                .map_err(S::Error::custom)?
                .serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDocument {
    #[serde(rename = "aaData")]
    pub rows: Vec<Vec<TableCell>>,
    #[serde(rename = "aoColumns")]
    pub columns: Vec<ColumnSpec>,
}

/// Entry in the front end's view menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub title: String,
    pub file: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub load: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexDocument {
    pub generator: String,
    pub step_times: Vec<i64>,
    pub run_info: RunMeta,
    pub views: Vec<View>,
}
