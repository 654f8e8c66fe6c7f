use crate::value::Series;

pub(crate) fn rolling_max(series: &Series, window_size: usize) -> Series {
    super::eval_extremum(series, window_size, |a, b| a >= b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_max() {
        let series = Series::from_iter([(1, 3.0), (2, 1.0), (3, 4.0), (4, -5.0), (5, -6.0)]);
        let out = rolling_max(&series, 3);
        assert_eq!(
            out.values().collect::<Vec<_>>(),
            vec![3.0, 3.0, 4.0, 4.0, 4.0]
        );
    }
}
