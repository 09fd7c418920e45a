//! Generic dynamic time warping over sequences of frame vectors.
//!
//! Classic full-matrix dynamic programming: no banding, monotonic
//! three-way steps, backtracked path length. The primitive knows nothing
//! about any particular feature; callers bring their own frame matrices
//! and, if needed, their own local distance.

use anyhow::{ensure, Result};
use ndarray::ArrayView2;

/// Alignment outcome: cumulative cost of the optimal monotonic path and
/// the number of cells on that path.
#[derive(Debug, Clone, Copy)]
pub struct Alignment {
    pub distance: f64,
    pub path_len: usize,
}

impl Alignment {
    /// Cumulative distance divided by path length.
    pub fn normalized(&self) -> f64 {
        self.distance / self.path_len.max(1) as f64
    }
}

/// Euclidean distance between two equal-length frame vectors.
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum::<f64>()
        .sqrt()
}

/// Align two frame sequences (rows = frames) under a local distance.
pub fn align_with<D>(a: ArrayView2<'_, f64>, b: ArrayView2<'_, f64>, distance: D) -> Result<Alignment>
where
    D: Fn(&[f64], &[f64]) -> f64,
{
    let (n, dim_a) = (a.nrows(), a.ncols());
    let (m, dim_b) = (b.nrows(), b.ncols());
    ensure!(n > 0 && m > 0, "cannot align empty sequences");
    ensure!(
        dim_a == dim_b,
        "frame dimensionality mismatch: {dim_a} vs {dim_b}"
    );

    let local = |i: usize, j: usize| -> f64 {
        distance(
            a.row(i).to_slice().expect("contiguous frame row"),
            b.row(j).to_slice().expect("contiguous frame row"),
        )
    };

    let mut cost = vec![vec![f64::INFINITY; m]; n];
    cost[0][0] = local(0, 0);
    for j in 1..m {
        cost[0][j] = cost[0][j - 1] + local(0, j);
    }
    for i in 1..n {
        cost[i][0] = cost[i - 1][0] + local(i, 0);
        for j in 1..m {
            let best = cost[i - 1][j - 1].min(cost[i - 1][j]).min(cost[i][j - 1]);
            cost[i][j] = best + local(i, j);
        }
    }

    let distance_total = cost[n - 1][m - 1];
    ensure!(
        distance_total.is_finite(),
        "alignment produced a non-finite cumulative distance"
    );

    Ok(Alignment {
        distance: distance_total,
        path_len: backtrack_path_len(&cost),
    })
}

/// Align two frame sequences under Euclidean local distance.
pub fn align(a: ArrayView2<'_, f64>, b: ArrayView2<'_, f64>) -> Result<Alignment> {
    align_with(a, b, euclidean)
}

/// Convenience for scalar series: treats each value as a 1-D frame.
pub fn align_series(a: &[f64], b: &[f64]) -> Result<Alignment> {
    ensure!(!a.is_empty() && !b.is_empty(), "cannot align empty series");
    let a_view = ArrayView2::from_shape((a.len(), 1), a)?;
    let b_view = ArrayView2::from_shape((b.len(), 1), b)?;
    align(a_view, b_view)
}

/// Walk the cost matrix back from the terminal cell, always taking the
/// cheapest predecessor, and count the cells visited.
fn backtrack_path_len(cost: &[Vec<f64>]) -> usize {
    let mut i = cost.len() - 1;
    let mut j = cost[0].len() - 1;
    let mut len = 1;
    while i > 0 || j > 0 {
        if i == 0 {
            j -= 1;
        } else if j == 0 {
            i -= 1;
        } else {
            let diagonal = cost[i - 1][j - 1];
            let up = cost[i - 1][j];
            let left = cost[i][j - 1];
            if diagonal <= up && diagonal <= left {
                i -= 1;
                j -= 1;
            } else if up <= left {
                i -= 1;
            } else {
                j -= 1;
            }
        }
        len += 1;
    }
    len
}
