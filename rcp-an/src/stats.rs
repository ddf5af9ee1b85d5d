//! Descriptive statistics
//!
//! Every function returns `None` when the statistic is undefined (no data,
//! fewer than two points, zero variance) instead of NaN.

use serde::{Deserialize, Serialize};

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median; the mean of the two middle values for even lengths
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Pearson correlation over pairwise-complete observations.
///
/// Positions where either side is `None` are dropped before computing.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    // A constant side is undefined even when its mean carries rounding error
    let (x0, y0) = pairs[0];
    if pairs.iter().all(|p| p.0 == x0) || pairs.iter().all(|p| p.1 == y0) {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    let r = cov / (var_x.sqrt() * var_y.sqrt());
    // Rounding can push |r| a hair past 1
    Some(r.clamp(-1.0, 1.0))
}

/// Symmetric matrix of pairwise Pearson correlations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major, `values[i][j]` correlates `columns[i]` with `columns[j]`
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn compute(series: &[(&str, Vec<Option<f64>>)]) -> Self {
        let columns = series.iter().map(|(name, _)| name.to_string()).collect();
        let values = series
            .iter()
            .map(|(_, xs)| series.iter().map(|(_, ys)| pearson(xs, ys)).collect())
            .collect();
        Self { columns, values }
    }

    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == row)?;
        let j = self.columns.iter().position(|c| c == column)?;
        self.values[i][j]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_mean_and_median() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn test_pearson_perfect_correlation() {
        let r = pearson(&some(&[1.0, 2.0, 3.0]), &some(&[2.0, 4.0, 6.0])).unwrap();
        assert!((r - 1.0).abs() < 1e-12);

        let r = pearson(&some(&[1.0, 2.0, 3.0]), &some(&[3.0, 2.0, 1.0])).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_undefined_cases() {
        // Single point
        assert_eq!(pearson(&some(&[1.0]), &some(&[2.0])), None);
        // Zero variance
        assert_eq!(pearson(&some(&[5.0, 5.0, 5.0]), &some(&[1.0, 2.0, 3.0])), None);
        // Only one complete pair
        assert_eq!(
            pearson(&[Some(1.0), None, Some(3.0)], &[Some(1.0), Some(2.0), None]),
            None
        );
    }

    #[test]
    fn test_pearson_constant_fraction_is_undefined() {
        // 0.1 is not exact in binary, so the mean drifts off the values
        let constant = [Some(0.1); 3];
        let varying = some(&[1.0, 2.0, 4.0]);
        assert_eq!(pearson(&constant, &varying), None);
        assert_eq!(pearson(&varying, &constant), None);

        let thirds = [Some(1.0 / 3.0); 5];
        assert_eq!(pearson(&thirds, &some(&[1.0, 5.0, 2.0, 8.0, 3.0])), None);
    }

    #[test]
    fn test_pearson_drops_incomplete_pairs() {
        let xs = [Some(1.0), None, Some(2.0), Some(3.0)];
        let ys = [Some(10.0), Some(99.0), Some(20.0), Some(30.0)];
        let r = pearson(&xs, &ys).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_correlation_matrix() {
        let matrix = CorrelationMatrix::compute(&[
            ("a", some(&[1.0, 2.0, 3.0])),
            ("b", some(&[1.0, 0.0, -1.0])),
            ("c", some(&[7.0, 7.0, 7.0])),
        ]);
        assert_eq!(matrix.columns, vec!["a", "b", "c"]);
        assert!((matrix.get("a", "a").unwrap() - 1.0).abs() < 1e-12);
        assert!((matrix.get("a", "b").unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(matrix.get("a", "b"), matrix.get("b", "a"));
        assert_eq!(matrix.get("c", "c"), None);
        assert_eq!(matrix.get("a", "missing"), None);
    }
}
