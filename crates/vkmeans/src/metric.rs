//! Distance functions between equal-dimension vectors.

/// Distance metric driving both seeding and assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    #[default]
    Euclidean,
    Cosine,
}

impl Metric {
    #[inline]
    pub fn distance(self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            Metric::Euclidean => euclidean(a, b),
            Metric::Cosine => cosine(a, b),
        }
    }
}

/// `sqrt(Σ (a[i] - b[i])²)`.
#[inline]
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());

    let mut sum = 0.0;
    for (x, y) in a.iter().zip(b) {
        let d = x - y;
        sum = d.mul_add(d, sum);
    }
    sum.sqrt()
}

/// `1 - dot(a, b) / (‖a‖ · ‖b‖)`. A zero-norm input yields NaN.
#[inline]
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        dot = x.mul_add(*y, dot);
        norm_a = x.mul_add(*x, norm_a);
        norm_b = y.mul_add(*y, norm_b);
    }

    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean_of_identical_vectors_is_zero() {
        let v = [1.5, -2.0, 0.25];
        assert_eq!(euclidean(&v, &v), 0.0);
    }

    #[test]
    fn euclidean_is_symmetric() {
        let a = [1.0, 2.0, 3.0];
        let b = [-4.0, 0.5, 9.0];
        assert_eq!(euclidean(&a, &b), euclidean(&b, &a));
    }

    #[test]
    fn euclidean_known_value() {
        // 3-4-5 triangle
        assert!((euclidean(&[0.0, 0.0], &[3.0, 4.0]) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn cosine_of_parallel_vectors_is_zero() {
        let d = cosine(&[1.0, 2.0], &[2.0, 4.0]);
        assert!(d.abs() < 1e-12);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_one() {
        let d = cosine(&[1.0, 0.0], &[0.0, 1.0]);
        assert!((d - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cosine_of_opposite_vectors_is_two() {
        let d = cosine(&[1.0, 0.0], &[-1.0, 0.0]);
        assert!((d - 2.0).abs() < 1e-12);
    }

    #[test]
    fn cosine_is_symmetric() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, -1.0, 0.5];
        assert_eq!(cosine(&a, &b), cosine(&b, &a));
    }

    #[test]
    fn metric_dispatch() {
        let a = [0.0, 0.0];
        let b = [3.0, 4.0];
        assert_eq!(Metric::Euclidean.distance(&a, &b), euclidean(&a, &b));

        let c = [1.0, 0.0];
        let d = [0.0, 1.0];
        assert_eq!(Metric::Cosine.distance(&c, &d), cosine(&c, &d));
    }

    #[test]
    fn metric_defaults_to_euclidean() {
        assert_eq!(Metric::default(), Metric::Euclidean);
    }
}
