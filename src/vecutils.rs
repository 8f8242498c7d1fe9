//! Vector utility functions for tabulated curves

/// Checks if the values are strictly increasing.
pub fn is_strictly_ascending(vec: &[f64]) -> bool {
    vec.windows(2).all(|w| w[0] < w[1])
}

/// Linear interpolation of the table (xs, ys) at `x`.
///
/// `xs` must be strictly ascending and have the same length as `ys`.
/// Values outside the table are clamped to the end points.
/// Returns None for an empty table.
pub fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> Option<f64> {
    let last = xs.len().checked_sub(1)?;
    if x <= xs[0] {
        return Some(ys[0]);
    }
    if x >= xs[last] {
        return Some(ys[last]);
    }
    // First index with xs[i] > x
    let i = xs.partition_point(|&v| v <= x);
    let (x0, x1) = (xs[i - 1], xs[i]);
    let (y0, y1) = (ys[i - 1], ys[i]);
    Some(y0 + (y1 - y0) * (x - x0) / (x1 - x0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_strictly_ascending() {
        assert!(is_strictly_ascending(&[1.0, 2.0, 3.0]));
        assert!(is_strictly_ascending(&[42.0]));
        assert!(!is_strictly_ascending(&[1.0, 1.0, 3.0]));
        assert!(!is_strictly_ascending(&[3.0, 2.0]));
    }

    #[test]
    fn test_interpolate() {
        let xs = [1.0, 2.0, 4.0];
        let ys = [10.0, 20.0, 0.0];
        assert_eq!(interpolate(&xs, &ys, 1.5), Some(15.0));
        assert_eq!(interpolate(&xs, &ys, 3.0), Some(10.0));
        assert_eq!(interpolate(&xs, &ys, 2.0), Some(20.0));
        // Clamped outside the table
        assert_eq!(interpolate(&xs, &ys, 0.0), Some(10.0));
        assert_eq!(interpolate(&xs, &ys, 9.0), Some(0.0));
        assert_eq!(interpolate(&[], &[], 1.0), None);
    }
}
