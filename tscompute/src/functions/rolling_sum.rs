use crate::value::Series;

pub(crate) fn rolling_sum(series: &Series, window_size: usize) -> Series {
    super::eval_running_sum(series, window_size, |sum, _| sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_sum() {
        let series = Series::from_iter([(1, 1.0), (2, 2.0), (3, 3.0), (4, 4.0)]);
        let out = rolling_sum(&series, 2);
        assert_eq!(out.values().collect::<Vec<_>>(), vec![1.0, 3.0, 5.0, 7.0]);
    }

    #[test]
    fn test_rolling_sum_overflow_is_infinite() {
        let series = Series::from_iter([(1, f64::MAX), (2, f64::MAX)]);
        let out = rolling_sum(&series, 2);
        assert!(out.samples[1].value.is_infinite());
    }
}
