// Run descriptor and raw sample parsing tests

use fleetperf::models::{RawSample, RunDescriptor};

#[test]
fn test_run_descriptor_parses_fractional_steps() {
    let run = RunDescriptor::from_json(
        r#"{"run_name": "r1", "step_times": [100.9, 200.0, 300.25],
            "meta_data": {"hosts": [{"id": "1", "host": "a"}], "zone": "west", "n": 3}}"#,
    )
    .unwrap();
    assert_eq!(run.run_name, "r1");
    assert_eq!(run.step_epochs(), vec![100, 200, 300]);
    assert_eq!(run.hosts().len(), 1);
    assert_eq!(run.hosts()[0].host, "a");
    let keys: Vec<&String> = run.meta_data.extra.keys().collect();
    assert_eq!(keys, vec!["zone", "n"]);
}

#[test]
fn test_run_meta_round_trips_extra_keys() {
    let run = RunDescriptor::from_json(
        r#"{"run_name": "r1", "step_times": [1, 2],
            "meta_data": {"hosts": [], "owner": {"team": "perf"}}}"#,
    )
    .unwrap();
    let json = serde_json::to_string(&run.meta_data).unwrap();
    assert_eq!(json, r#"{"hosts":[],"owner":{"team":"perf"}}"#);
}

#[test]
fn test_run_descriptor_requires_hosts() {
    let json = r#"{"run_name": "r", "step_times": [], "meta_data": {}}"#;
    assert!(RunDescriptor::from_json(json).is_err());
}

#[test]
fn test_raw_sample_keeps_payload_order() {
    let s = RawSample::parse_line("1700000000\t{\"cu\": 1.5, \"nr\": 2, \"zz\": 0}").unwrap();
    assert_eq!(s.epoch, 1_700_000_000);
    let names: Vec<&str> = s.names().collect();
    assert_eq!(names, vec!["cu", "nr", "zz"]);
    assert_eq!(s.get("nr"), Some(2.0));
}

#[test]
fn test_raw_sample_rejects_non_numeric_value() {
    assert!(RawSample::parse_line("1\t{\"cu\": \"high\"}").is_err());
    assert!(RawSample::parse_line("1 {\"cu\": 1}").is_err());
}
