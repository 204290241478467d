pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }

    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Population standard deviation (divides by `n`, not `n - 1`).
pub fn std_dev(samples: &[f64]) -> Option<f64> {
    let sample_mean = mean(samples)?;

    let variance = samples
        .iter()
        .map(|value| {
            let diff = *value - sample_mean;

            diff * diff
        })
        .sum::<f64>()
        / samples.len() as f64;

    Some(variance.sqrt())
}

/// Round half away from zero to one decimal place.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
