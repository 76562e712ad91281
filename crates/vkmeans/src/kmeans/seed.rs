//! Roulette-wheel center seeding.
//!
//! Center 0 is always a copy of row 0. Each later slot is drawn by
//! inverse-CDF sampling over a prefix sum of every row's summed distance to
//! the centers chosen so far, scanning rows in dataset order and taking the
//! first row whose cumulative share reaches the draw. Rows far from the
//! existing centers carry more of the cumulative mass, approximating
//! k-means++ without excluding already-chosen rows.

use crate::metric::Metric;
use crate::VectorSet;
use rand::Rng;

/// Seed `k` centers from `set`, returned as a flat row-major buffer.
///
/// The caller guarantees `1 <= k <= set.len()`.
pub fn init_centers(rng: &mut impl Rng, set: &VectorSet, k: usize, metric: Metric) -> Vec<f64> {
    let n = set.len();
    let dim = set.dim();

    let mut centers = Vec::with_capacity(k * dim);
    centers.extend_from_slice(set.row(0));

    let mut prefix = vec![0.0f64; n];
    for _ in 1..k {
        let mut total = 0.0;
        for row in 0..n {
            let v = set.row(row);
            let mut dis_sum = 0.0;
            for center in centers.chunks_exact(dim) {
                dis_sum += metric.distance(center, v);
            }
            total += dis_sum;
            prefix[row] = total;
        }

        let pick = if total <= 0.0 {
            // Every row coincides with an already-chosen center; any row is
            // as good as any other.
            rng.random_range(0..n)
        } else {
            for p in prefix.iter_mut() {
                *p /= total;
            }
            first_reaching(&prefix, draw_nonzero(rng))
        };

        centers.extend_from_slice(set.row(pick));
    }

    centers
}

fn draw_nonzero(rng: &mut impl Rng) -> f64 {
    loop {
        let r = rng.random::<f64>();
        if r != 0.0 {
            return r;
        }
    }
}

fn first_reaching(prefix: &[f64], r: f64) -> usize {
    for (row, &p) in prefix.iter().enumerate() {
        if p >= r {
            return row;
        }
    }
    // Accumulation error can leave the final prefix just below 1.0.
    prefix.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng;
    use pretty_assertions::assert_eq;

    fn set() -> VectorSet {
        VectorSet::from_rows(&[
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![10.0, 10.0],
            vec![11.0, 9.0],
        ])
        .unwrap()
    }

    #[test]
    fn first_center_is_row_zero() {
        let mut rng = rng::new();
        for k in 1..=5 {
            let centers = init_centers(&mut rng, &set(), k, Metric::Euclidean);
            assert_eq!(&centers[..2], set().row(0));
        }
    }

    #[test]
    fn produces_exactly_k_centers_copied_from_rows() {
        let set = set();
        let mut rng = rng::new();
        for k in 1..=5 {
            let centers = init_centers(&mut rng, &set, k, Metric::Euclidean);
            assert_eq!(centers.len(), k * set.dim());
            for center in centers.chunks_exact(set.dim()) {
                assert!(
                    set.rows().any(|row| row == center),
                    "center {center:?} is not a copy of any input row",
                );
            }
        }
    }

    #[test]
    fn two_rows_pick_both() {
        // With one chosen center, row 0 carries zero cumulative mass and the
        // draw is strictly positive, so row 1 is always the second center.
        let set = VectorSet::from_rows(&[vec![0.0], vec![3.0]]).unwrap();
        let mut rng = rng::new();
        let centers = init_centers(&mut rng, &set, 2, Metric::Euclidean);
        assert_eq!(centers, vec![0.0, 3.0]);
    }

    #[test]
    fn identical_rows_fall_back_to_a_copy() {
        // Grand total distance is zero for every extra slot
        let set = VectorSet::from_rows(&vec![vec![5.0, 5.0]; 3]).unwrap();
        let mut rng = rng::new();
        let centers = init_centers(&mut rng, &set, 3, Metric::Euclidean);
        assert_eq!(centers, vec![5.0, 5.0, 5.0, 5.0, 5.0, 5.0]);
    }

    #[test]
    fn deterministic_for_a_given_rng_state() {
        let set = set();
        let mut rng_a = rng::from_seed(42);
        let mut rng_b = rng::from_seed(42);
        let a = init_centers(&mut rng_a, &set, 4, Metric::Euclidean);
        let b = init_centers(&mut rng_b, &set, 4, Metric::Euclidean);
        assert_eq!(a, b);
    }

    #[test]
    fn first_reaching_takes_the_earliest_row() {
        let prefix = [0.0, 0.2, 0.2, 0.7, 1.0];
        assert_eq!(first_reaching(&prefix, 0.2), 1);
        assert_eq!(first_reaching(&prefix, 0.5), 3);
        assert_eq!(first_reaching(&prefix, 1.0), 4);
    }

    #[test]
    fn first_reaching_falls_back_to_the_last_row() {
        // Accumulation left the tail short of the draw
        let prefix = [0.3, 0.6, 0.999_999];
        assert_eq!(first_reaching(&prefix, 0.999_999_9), 2);
    }
}
