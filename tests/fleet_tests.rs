// Fleet aggregation tests: sum / avg / max across hosts, grid checks, exclusion

mod common;

use common::{series, values};
use fleetperf::error::PipelineError;
use fleetperf::fleet::{AggregateKind, HostSeries, aggregate, check_grid};

fn host(id: &str, epochs: Vec<i64>, m: &[f64]) -> HostSeries {
    HostSeries {
        id: id.into(),
        series: series(epochs, &[("m", values(m))]),
    }
}

#[test]
fn two_hosts_sum_avg_max() {
    let hosts = vec![
        host("a", vec![10, 11, 12], &[1.0, 2.0, 3.0]),
        host("b", vec![10, 11, 12], &[4.0, 5.0, 6.0]),
    ];
    let fleet = aggregate(&hosts).unwrap();
    assert_eq!(fleet.host_count(), 2);
    assert_eq!(fleet.sum.column("m").unwrap(), values(&[5.0, 7.0, 9.0]).as_slice());
    assert_eq!(fleet.avg.column("m").unwrap(), values(&[2.5, 3.5, 4.5]).as_slice());
    assert_eq!(fleet.max.column("m").unwrap(), values(&[4.0, 5.0, 6.0]).as_slice());
    assert_eq!(fleet.sum.epochs(), &[10, 11, 12]);
    assert_eq!(fleet.get(AggregateKind::Avg), &fleet.avg);
}

#[test]
fn inputs_are_not_modified() {
    let hosts = vec![
        host("a", vec![0, 1], &[1.0, 2.0]),
        host("b", vec![0, 1], &[3.0, 4.0]),
    ];
    let before = hosts[0].series.clone();
    let _ = aggregate(&hosts).unwrap();
    assert_eq!(hosts[0].series, before);
}

#[test]
fn host_with_different_epochs_is_excluded() {
    let hosts = vec![
        host("a", vec![0, 1, 2], &[1.0, 1.0, 1.0]),
        host("b", vec![0, 1, 3], &[5.0, 5.0, 5.0]),
        host("c", vec![0, 1, 2], &[2.0, 2.0, 2.0]),
    ];
    let fleet = aggregate(&hosts).unwrap();
    assert_eq!(fleet.included, vec!["a".to_string(), "c".to_string()]);
    assert_eq!(fleet.excluded.len(), 1);
    assert!(matches!(
        &fleet.excluded[0],
        PipelineError::EpochMismatch { host, .. } if host == "b"
    ));
    assert_eq!(fleet.sum.column("m").unwrap(), values(&[3.0, 3.0, 3.0]).as_slice());
    assert_eq!(fleet.avg.column("m").unwrap(), values(&[1.5, 1.5, 1.5]).as_slice());
}

#[test]
fn host_with_fewer_rows_is_excluded() {
    let reference = host("a", vec![0, 1, 2], &[1.0, 1.0, 1.0]);
    let short = host("b", vec![0, 1], &[1.0, 1.0]);
    let err = check_grid(&reference.series, &short).unwrap_err();
    assert!(err.to_string().contains("rows"));
}

#[test]
fn host_missing_a_column_is_excluded() {
    let reference = HostSeries {
        id: "a".into(),
        series: series(vec![0], &[("m", values(&[1.0])), ("n", values(&[1.0]))]),
    };
    let other = host("b", vec![0], &[1.0]);
    let fleet = aggregate(&[reference, other]).unwrap();
    assert_eq!(fleet.included, vec!["a".to_string()]);
    assert!(fleet.excluded[0].to_string().contains("missing column n"));
}

#[test]
fn absent_cell_in_any_host_stays_absent() {
    let hosts = vec![
        HostSeries {
            id: "a".into(),
            series: series(vec![0, 1], &[("m", vec![Some(1.0), None])]),
        },
        host("b", vec![0, 1], &[2.0, 2.0]),
    ];
    let fleet = aggregate(&hosts).unwrap();
    assert_eq!(fleet.sum.column("m").unwrap(), &[Some(3.0), None]);
    assert_eq!(fleet.max.column("m").unwrap(), &[Some(2.0), None]);
    assert_eq!(fleet.avg.column("m").unwrap(), &[Some(1.5), None]);
}

#[test]
fn no_hosts_yields_none() {
    assert!(aggregate(&[]).is_none());
}
