use crate::value::{Sample, Series};

/// `y[0] = x[0]`, `y[i] = alpha * x[i] + (1 - alpha) * y[i-1]`.
pub(crate) fn exponential_moving_average(series: &Series, alpha: f64) -> Series {
    let mut prev: Option<f64> = None;
    let samples = series
        .samples
        .iter()
        .map(|sample| {
            let value = match prev {
                Some(prev) => alpha * sample.value + (1.0 - alpha) * prev,
                None => sample.value,
            };
            prev = Some(value);
            Sample {
                timestamp: sample.timestamp,
                value,
            }
        })
        .collect();
    Series::new(samples)
}
