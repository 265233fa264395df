//! `O(n log n)` distance covariance for univariate samples under the
//! Euclidean metric.
//!
//! With `a_i = sum_j |x_i - x_j|` (and `b_i` likewise for `y`) and
//! `T = sum_ij |x_i - x_j| |y_i - y_j|`:
//!
//! ```text
//! biased:    T / n^2 - 2 sum(a b) / n^3 + sum(a) sum(b) / n^4
//! unbiased:  [T - 2 sum(a b) / (n-2) + sum(a) sum(b) / ((n-1)(n-2))] / (n (n-3))
//! ```
//!
//! Row sums come from prefix sums over the sorted sample; `T` from a single
//! sweep in `x` order with a Fenwick tree keyed on the rank of `y`.

use std::cmp::Ordering;

/// Distance covariance of two univariate samples of equal length.
pub fn fast_dcov(x: &[f64], y: &[f64], bias: bool) -> f64 {
    let n = x.len() as f64;
    let a = abs_row_sums(x);
    let b = abs_row_sums(y);
    let t = 2.0 * cross_sum(x, y);
    let sa: f64 = a.iter().sum();
    let sb: f64 = b.iter().sum();
    let ab: f64 = a.iter().zip(&b).map(|(u, v)| u * v).sum();

    if bias {
        t / n.powi(2) - 2.0 * ab / n.powi(3) + sa * sb / n.powi(4)
    } else {
        let d0 = n * (n - 3.0);
        let d1 = d0 * (n - 2.0);
        let d2 = d1 * (n - 1.0);
        t / d0 - 2.0 * ab / d1 + sa * sb / d2
    }
}

/// Distance correlation of two univariate samples.
pub fn fast_dcorr(x: &[f64], y: &[f64], bias: bool) -> f64 {
    let covar = fast_dcov(x, y, bias);
    let varx = fast_dcov(x, x, bias);
    let vary = fast_dcov(y, y, bias);
    if varx <= 0.0 || vary <= 0.0 {
        return 0.0;
    }
    covar / (varx * vary).sqrt()
}

fn argsort(v: &[f64]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..v.len()).collect();
    idx.sort_by(|&i, &j| v[i].partial_cmp(&v[j]).unwrap_or(Ordering::Equal));
    idx
}

/// `a_i = sum_j |v_i - v_j|` for every `i`.
fn abs_row_sums(v: &[f64]) -> Vec<f64> {
    let n = v.len();
    let order = argsort(v);
    let total: f64 = v.iter().sum();
    let mut sums = vec![0.0; n];
    let mut below = 0.0;
    for (k, &i) in order.iter().enumerate() {
        let above = total - below - v[i];
        sums[i] = (k as f64) * v[i] - below + above - ((n - 1 - k) as f64) * v[i];
        below += v[i];
    }
    sums
}

/// Fenwick tree over `[count, sum x, sum y, sum xy]`.
struct Fenwick {
    tree: Vec<[f64; 4]>,
}

impl Fenwick {
    fn new(n: usize) -> Self {
        Self {
            tree: vec![[0.0; 4]; n + 1],
        }
    }

    fn add(&mut self, pos: usize, v: [f64; 4]) {
        let mut i = pos + 1;
        while i < self.tree.len() {
            for (t, x) in self.tree[i].iter_mut().zip(v) {
                *t += x;
            }
            i += i & i.wrapping_neg();
        }
    }

    /// Sums over positions `0..=pos`.
    fn prefix(&self, pos: usize) -> [f64; 4] {
        let mut acc = [0.0; 4];
        let mut i = pos + 1;
        while i > 0 {
            for (a, t) in acc.iter_mut().zip(self.tree[i]) {
                *a += t;
            }
            i -= i & i.wrapping_neg();
        }
        acc
    }
}

/// `sum_{i<j} |x_i - x_j| |y_i - y_j|`.
fn cross_sum(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    let mut rank = vec![0; n];
    for (r, i) in argsort(y).into_iter().enumerate() {
        rank[i] = r;
    }

    let mut fw = Fenwick::new(n);
    let mut totals = [0.0; 4];
    let mut s = 0.0;
    for j in argsort(x) {
        let (xj, yj) = (x[j], y[j]);
        // earlier points have x_i <= x_j; split them on y_i <= y_j
        let [c, sx, sy, sxy] = fw.prefix(rank[j]);
        let (cg, sxg, syg, sxyg) = (
            totals[0] - c,
            totals[1] - sx,
            totals[2] - sy,
            totals[3] - sxy,
        );
        s += c * xj * yj - xj * sy - yj * sx + sxy;
        s += xj * syg - cg * xj * yj - sxyg + yj * sxg;

        let entry = [1.0, xj, yj, xj * yj];
        fw.add(rank[j], entry);
        for (t, e) in totals.iter_mut().zip(entry) {
            *t += e;
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_cross(x: &[f64], y: &[f64]) -> f64 {
        let mut s = 0.0;
        for i in 0..x.len() {
            for j in i + 1..x.len() {
                s += (x[i] - x[j]).abs() * (y[i] - y[j]).abs();
            }
        }
        s
    }

    #[test]
    fn cross_sum_matches_brute_force() {
        let x = [0.3, -1.2, 2.5, 0.3, 4.0, -0.7, 1.1];
        let y = [1.0, 0.5, -2.0, 3.5, 0.5, 0.0, -1.5];
        assert!((cross_sum(&x, &y) - brute_cross(&x, &y)).abs() < 1e-9);
    }

    #[test]
    fn row_sums_match_brute_force() {
        let v = [3.0, -1.0, 2.0, 2.0, 7.5];
        let sums = abs_row_sums(&v);
        for (i, s) in sums.iter().enumerate() {
            let expect: f64 = v.iter().map(|w| (v[i] - w).abs()).sum();
            assert!((s - expect).abs() < 1e-12);
        }
    }
}
