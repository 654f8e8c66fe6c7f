use crate::value::Series;

pub(crate) fn rolling_mean(series: &Series, window_size: usize) -> Series {
    super::eval_running_sum(series, window_size, exec)
}

fn exec(sum: f64, count: usize) -> f64 {
    sum / count as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(series: &Series) -> Vec<f64> {
        series.values().collect()
    }

    #[test]
    fn test_rolling_mean() {
        let series = Series::from_iter((1..=5).map(|i| (i * 1000, i as f64)));
        let out = rolling_mean(&series, 3);
        assert_eq!(values(&out), vec![1.0, 1.5, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_rolling_mean_window_clamp() {
        let series = Series::from_iter([(1, 4.0), (2, -2.0), (3, 7.5)]);
        assert_eq!(rolling_mean(&series, 0), series);
        assert_eq!(rolling_mean(&series, 1), series);
    }

    #[test]
    fn test_rolling_mean_wide_window() {
        let series = Series::from_iter([(1, 2.0), (2, 4.0), (3, 9.0)]);
        assert_eq!(values(&rolling_mean(&series, 100)), vec![2.0, 3.0, 5.0]);
        assert!(rolling_mean(&Series::default(), 3).is_empty());
    }
}
