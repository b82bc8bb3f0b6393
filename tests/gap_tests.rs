// Gap redistribution tests: conservation of recorded totals across missing seconds

mod common;

use common::{series, values};
use fleetperf::gap::{redistribute, redistribute_column};

#[test]
fn two_missing_then_value_spreads_evenly() {
    let mut col = vec![None, None, Some(9.0)];
    assert_eq!(redistribute_column(&mut col), 0);
    assert_eq!(col, vec![Some(3.0), Some(3.0), Some(3.0)]);
}

#[test]
fn resolved_runs_conserve_the_recorded_value() {
    for run_len in 1..=12usize {
        let recorded = 2.5 * (run_len + 1) as f64;
        let mut col = vec![Some(1.0)];
        col.extend(std::iter::repeat_n(None, run_len));
        col.push(Some(recorded));
        let before: f64 = col.iter().flatten().sum();

        redistribute_column(&mut col);

        assert!(col.iter().all(Option::is_some), "run_len {run_len}");
        let after: f64 = col.iter().flatten().sum();
        assert_eq!(after, before, "run_len {run_len}");
        assert_eq!(col[1], Some(2.5));
    }
}

#[test]
fn conservation_holds_for_awkward_values() {
    let mut col = vec![None; 6];
    col.push(Some(1.0));
    redistribute_column(&mut col);
    let after: f64 = col.iter().flatten().sum();
    assert!((after - 1.0).abs() < 1e-12);
}

#[test]
fn multiple_runs_resolve_independently() {
    let mut col = vec![None, Some(4.0), Some(1.0), None, None, Some(6.0)];
    redistribute_column(&mut col);
    assert_eq!(col, values(&[2.0, 2.0, 1.0, 2.0, 2.0, 2.0]));
}

#[test]
fn columns_are_resolved_independently_and_tails_reported() {
    let mut s = series(
        vec![0, 1, 2, 3],
        &[
            ("a", vec![Some(1.0), None, Some(4.0), Some(1.0)]),
            ("b", vec![Some(1.0), Some(1.0), None, None]),
        ],
    );
    let unresolved = redistribute(&mut s);
    assert_eq!(unresolved, 2);
    assert_eq!(s.column("a").unwrap(), values(&[1.0, 2.0, 2.0, 1.0]).as_slice());
    assert_eq!(s.column("b").unwrap(), &[Some(1.0), Some(1.0), None, None]);
    assert_eq!(s.epochs(), &[0, 1, 2, 3]);
}
