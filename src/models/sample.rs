// Raw per-second sample: `epoch<TAB>{"nr": .., "nw": .., ...}`

use serde_json::Value;

use crate::error::SampleError;

/// One raw sample. Counters keep the key order of the JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    pub epoch: i64,
    pub counters: Vec<(String, f64)>,
}

impl RawSample {
    pub fn new(epoch: i64, counters: Vec<(String, f64)>) -> Self {
        Self { epoch, counters }
    }

    /// Parse one input line. Trailing newline / carriage return is ignored.
    pub fn parse_line(line: &str) -> Result<Self, SampleError> {
        let line = line.trim_end_matches(['\n', '\r']);
        let (epoch, payload) = line.split_once('\t').ok_or(SampleError::MissingSeparator)?;
        let epoch = epoch
            .trim()
            .parse::<i64>()
            .map_err(|_| SampleError::BadEpoch(epoch.to_string()))?;
        let Value::Object(map) = serde_json::from_str::<Value>(payload)? else {
            return Err(SampleError::NotAnObject);
        };
        let mut counters = Vec::with_capacity(map.len());
        for (name, v) in map {
            let v = v.as_f64().ok_or_else(|| SampleError::NonNumeric(name.clone()))?;
            counters.push((name, v));
        }
        Ok(Self { epoch, counters })
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.counters
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Counter value required by the row schema.
    pub fn require(&self, name: &str) -> Result<f64, SampleError> {
        self.get(name)
            .ok_or_else(|| SampleError::MissingCounter(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.counters.iter().map(|(n, _)| n.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_line_keeps_payload_order() {
        let s = RawSample::parse_line("3600\t{\"zz\": 1, \"nr\": 2.5, \"aa\": 0}\n").unwrap();
        assert_eq!(s.epoch, 3600);
        let names: Vec<&str> = s.names().collect();
        assert_eq!(names, vec!["zz", "nr", "aa"]);
        assert_eq!(s.get("nr"), Some(2.5));
    }

    #[test]
    fn parse_line_rejects_missing_tab() {
        let err = RawSample::parse_line("3600 {}").unwrap_err();
        assert!(matches!(err, SampleError::MissingSeparator));
    }

    #[test]
    fn parse_line_rejects_bad_epoch() {
        let err = RawSample::parse_line("abc\t{}").unwrap_err();
        assert!(matches!(err, SampleError::BadEpoch(_)));
    }

    #[test]
    fn parse_line_rejects_non_numeric_counter() {
        let err = RawSample::parse_line("1\t{\"nr\": \"x\"}").unwrap_err();
        assert!(matches!(err, SampleError::NonNumeric(ref n) if n == "nr"));
    }

    #[test]
    fn parse_line_rejects_array_payload() {
        let err = RawSample::parse_line("1\t[1, 2]").unwrap_err();
        assert!(matches!(err, SampleError::NotAnObject));
    }
}
