//! Linear and rank correlation.

use std::cmp::Ordering;

use ndarray::{Array1, ArrayView1};

/// True if the series holds at least two distinct values.
#[must_use]
pub fn has_variation(x: ArrayView1<'_, f64>) -> bool {
    x.first().is_some_and(|first| x.iter().any(|v| v != first))
}

/// Pearson correlation.
///
/// `None` when the lengths differ, either series has fewer than two distinct
/// values, or a value is non-finite. A constant series has no defined linear
/// correlation; it is never reported as zero.
#[must_use]
pub fn pearson(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> Option<f64> {
    if x.len() != y.len() || !has_variation(x) || !has_variation(y) {
        return None;
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return None;
    }

    let mx = x.mean()?;
    let my = y.mean()?;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y.iter()) {
        let (dx, dy) = (a - mx, b - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    let denom = (sxx * syy).sqrt();
    (denom > 0.0).then(|| (sxy / denom).clamp(-1.0, 1.0))
}

/// Ranks starting at 1, ties sharing their average rank.
#[must_use]
pub fn average_ranks(x: ArrayView1<'_, f64>) -> Array1<f64> {
    let mut order: Vec<usize> = (0..x.len()).collect();
    order.sort_by(|&a, &b| x[a].partial_cmp(&x[b]).unwrap_or(Ordering::Equal));

    let mut ranks = Array1::zeros(x.len());
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && x[order[end]] == x[order[start]] {
            end += 1;
        }
        // positions start..end share ranks start+1..=end
        let rank = (start + end + 1) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = rank;
        }
        start = end;
    }
    ranks
}

/// Rank (Spearman) correlation, used as the information coefficient.
///
/// Same guard as [`pearson`]: `None` for a constant series.
#[must_use]
pub fn spearman(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> Option<f64> {
    if x.len() != y.len() || !has_variation(x) || !has_variation(y) {
        return None;
    }
    pearson(average_ranks(x).view(), average_ranks(y).view())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;
    use rstest::rstest;

    use super::*;

    #[test]
    fn perfect_correlation() {
        let x = array![1.0, 2.0, 3.0, 4.0];
        let y = array![2.0, 4.0, 6.0, 8.0];
        assert_relative_eq!(pearson(x.view(), y.view()).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(pearson(x.view(), (-&y).view()).unwrap(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn constant_series_is_undefined() {
        let x = array![0.01, 0.01, 0.01];
        let y = array![0.01, 0.02, 0.03];
        assert_eq!(pearson(x.view(), y.view()), None);
        assert_eq!(spearman(x.view(), y.view()), None);
        assert_eq!(pearson(x.view(), x.view()), None);
    }

    #[test]
    fn single_observation_is_undefined() {
        let x = array![0.5];
        assert_eq!(pearson(x.view(), x.view()), None);
    }

    #[rstest]
    #[case(array![3.0, 1.0, 2.0], array![3.0, 1.0, 2.0])]
    #[case(array![1.0, 2.0, 2.0, 4.0], array![1.0, 2.5, 2.5, 4.0])]
    #[case(array![5.0, 5.0, 5.0], array![2.0, 2.0, 2.0])]
    fn ranks_average_ties(#[case] data: Array1<f64>, #[case] expected: Array1<f64>) {
        assert_eq!(average_ranks(data.view()), expected);
    }

    #[test]
    fn spearman_is_monotone_invariant() {
        let x = array![0.1, 0.2, 0.3, 0.4, 0.5];
        let y = x.mapv(|v: f64| v.powi(3) + 7.0);
        assert_relative_eq!(spearman(x.view(), y.view()).unwrap(), 1.0, epsilon = 1e-12);
        let pearson_r = pearson(x.view(), y.view()).unwrap();
        assert!(pearson_r < 1.0 && pearson_r > 0.9);
    }

    #[test]
    fn known_pearson_value() {
        let x = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = array![2.0, 1.0, 4.0, 3.0, 5.0];
        assert_relative_eq!(pearson(x.view(), y.view()).unwrap(), 0.8, epsilon = 1e-12);
    }
}
