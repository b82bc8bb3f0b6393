// Config loading and validation tests

use fleetperf::config::AppConfig;

const VALID_CONFIG: &str = r#"
[paths]
reports_dir = "reports"

[processing]
workers = 4
reset = false

[normalizers]
network = 100.0e6
disk = 150.0e6
cpu = 3200.0

[canonical]
row_tolerance = 100
smooth_columns = ["nr", "nw"]
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.paths.reports_dir, "reports");
    assert_eq!(config.processing.workers, 4);
    assert!(!config.processing.reset);
    assert_eq!(config.normalizers.disk, 150.0e6);
    assert_eq!(config.canonical.smooth_columns, vec!["nr", "nw"]);
}

#[test]
fn test_config_optional_sections_default() {
    let minimal = r#"
[paths]
reports_dir = "out"

[processing]
workers = 2
"#;
    let config = AppConfig::load_from_str(minimal).expect("load_from_str");
    assert!(!config.processing.reset);
    assert_eq!(config.normalizers.network, 100.0e6);
    assert_eq!(config.normalizers.cpu, 3200.0);
    assert_eq!(config.canonical.row_tolerance, 100);
    assert_eq!(config.canonical.smooth_columns, vec!["nr", "nw"]);
}

#[test]
fn test_config_validation_rejects_empty_reports_dir() {
    let bad = VALID_CONFIG.replace("reports_dir = \"reports\"", "reports_dir = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("paths.reports_dir"));
}

#[test]
fn test_config_validation_rejects_zero_workers() {
    let bad = VALID_CONFIG.replace("workers = 4", "workers = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("processing.workers"));
}

#[test]
fn test_config_validation_rejects_zero_normalizer() {
    let bad = VALID_CONFIG.replace("cpu = 3200.0", "cpu = 0.0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("normalizers.cpu"));
}

#[test]
fn test_config_validation_rejects_negative_normalizer() {
    let bad = VALID_CONFIG.replace("network = 100.0e6", "network = -1.0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("normalizers.network"));
}

#[test]
fn test_config_validation_rejects_empty_smooth_column() {
    let bad = VALID_CONFIG.replace("[\"nr\", \"nw\"]", "[\"nr\", \"\"]");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("smooth_columns"));
}

#[test]
fn test_config_missing_section_fails() {
    let bad = VALID_CONFIG.replace("[processing]\nworkers = 4\nreset = false\n", "");
    assert!(AppConfig::load_from_str(&bad).is_err());
}

#[test]
fn test_canonical_options_follow_config() {
    let custom = VALID_CONFIG
        .replace("disk = 150.0e6", "disk = 75.0e6")
        .replace("smooth_columns = [\"nr\", \"nw\"]", "smooth_columns = []");
    let config = AppConfig::load_from_str(&custom).unwrap();
    let options = config.canonical_options();
    let disk = options.measures.iter().find(|m| m.name == "disk").unwrap();
    assert_eq!(disk.capacity, 75.0e6);
    assert!(options.transforms.is_empty());
    assert_eq!(options.baseline.len(), 9);
}
