// Point-selection downsampling for oversized historical series

/// Reduce `series` to exactly `target` points by nearest-index selection.
///
/// Returns the selected points and the interval between them. Series that
/// already fit (or a zero target) come back unchanged. The last point is
/// always the newest input sample.
pub fn reduce<T: Clone>(series: Vec<T>, target: usize, interval: f64) -> (Vec<T>, f64) {
    let len = series.len();
    if target == 0 || len <= target {
        return (series, interval);
    }

    let ratio = len as f64 / target as f64;
    let last = len - 1;
    let reduced = (0..target)
        .map(|i| {
            let index = if i + 1 == target {
                last
            } else {
                ((i as f64 * ratio).round() as usize).min(last)
            };
            series[index].clone()
        })
        .collect();

    (reduced, interval * ratio)
}
