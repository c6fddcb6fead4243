//! Pairwise distance matrices used by the niching schemes.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Generalized p-norm distance `(sum |a_i - b_i|^p)^(1/p)`.
///
/// `p == 1` is Manhattan, `p == 2` Euclidean. Slices of unequal length are
/// compared over their common prefix; callers validate lengths upstream.
pub fn pnorm_distance(a: &[f64], b: &[f64], p: f64) -> f64 {
    if p == 1.0 {
        return a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum();
    }
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs().powf(p))
        .sum::<f64>()
        .powf(1.0 / p)
}

/// Symmetric N×N matrix of p-norm distances between `rows`.
pub fn distance_matrix(rows: &[Vec<f64>], p: f64) -> Vec<Vec<f64>> {
    let row_distances = |i: usize| -> Vec<f64> {
        rows.iter()
            .enumerate()
            .map(|(j, other)| if i == j { 0.0 } else { pnorm_distance(&rows[i], other, p) })
            .collect()
    };

    #[cfg(feature = "parallel")]
    let matrix = (0..rows.len()).into_par_iter().map(row_distances).collect();
    #[cfg(not(feature = "parallel"))]
    let matrix = (0..rows.len()).map(row_distances).collect();

    matrix
}

/// Symmetric N×N matrix of `|a - b|` between scalar values.
pub fn scalar_distance_matrix(values: &[f64]) -> Vec<Vec<f64>> {
    values
        .iter()
        .map(|a| values.iter().map(|b| (a - b).abs()).collect())
        .collect()
}
