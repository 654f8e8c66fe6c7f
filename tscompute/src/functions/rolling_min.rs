use crate::value::Series;

pub(crate) fn rolling_min(series: &Series, window_size: usize) -> Series {
    super::eval_extremum(series, window_size, |a, b| a <= b)
}
