use std::time::Duration;

pub fn to_millis(duration: Duration) -> u64 {
    (duration.as_secs() * 1_000) + (duration.subsec_nanos() / 1_000_000) as u64
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation, no degrees-of-freedom correction.
pub fn std_dev(values: &[f64], mean: f64) -> f64 {
    let squared_deviations: f64 = values.iter()
        .map(|value| (value - mean) * (value - mean))
        .sum();

    (squared_deviations / values.len() as f64).sqrt()
}


#[cfg(test)]
mod tests {

    use std::time::Duration;

    use crate::utils;

    #[test]
    fn millis() {
        assert_eq!(utils::to_millis(Duration::from_micros(2_345_678)), 2_345);
    }

    #[test]
    fn population_statistics() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let mean = utils::mean(&values);

        assert!((mean - 5.0).abs() < 1e-12);
        assert!((utils::std_dev(&values, mean) - 2.0).abs() < 1e-12);
        assert_eq!(utils::std_dev(&[3.0, 3.0], 3.0), 0.0);
    }
}
