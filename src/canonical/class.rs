// Overall load class from normalized resource usage.

/// Load class for one second, 0 (idle) to 5 (every resource saturated).
///
/// - 0: every resource at or below 10%
/// - 1: at least one resource above 10%
/// - 2: at least one resource above 50%
/// - 3: at least one resource above 80%
/// - 4: every resource above 50%
/// - 5: every resource above 80%
///
/// The "every" checks win over "at least one" at the same threshold.
pub fn overall_class(resources: &[f64]) -> u8 {
    let all = |t: f64| resources.iter().all(|&r| r > t);
    let any = |t: f64| resources.iter().any(|&r| r > t);
    if all(0.8) {
        5
    } else if all(0.5) {
        4
    } else if any(0.8) {
        3
    } else if any(0.5) {
        2
    } else if any(0.1) {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::overall_class;

    #[test]
    fn thresholds_are_strict() {
        assert_eq!(overall_class(&[0.1, 0.1]), 0);
        assert_eq!(overall_class(&[0.5, 0.5]), 1);
        assert_eq!(overall_class(&[0.8, 0.8]), 4);
    }

    #[test]
    fn one_saturated_resource_is_class_three() {
        assert_eq!(overall_class(&[0.0, 0.0, 0.95]), 3);
    }
}
