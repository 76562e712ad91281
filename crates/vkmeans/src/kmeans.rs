//! The clustering engine: a seeded center set refined by Lloyd's
//! assign-then-average iteration until the centers stop moving or the round
//! budget runs out.

use crate::metric::Metric;
use crate::{rng, VectorSet};
use log::debug;
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;
use snafu::prelude::*;

pub mod seed;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ConfigError {
    #[snafu(display("cluster count must be positive"))]
    ZeroClusters,

    #[snafu(display("cluster count {k} exceeds dataset size {n}"))]
    TooManyClusters { k: usize, n: usize },
}

/// What to do when a cluster ends an iteration with no members.
///
/// Without a policy the mean of an empty cluster is a division by zero; the
/// resulting NaN center would then lose every distance comparison and stay
/// dead forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyClusterPolicy {
    /// Copy a uniformly random input row over the dead center.
    #[default]
    Reseed,
    /// Leave the previous center untouched.
    Keep,
}

#[derive(Debug, Clone)]
pub struct KMeansConfig {
    pub metric: Metric,
    /// `None` demands exact coordinate equality between rounds to declare
    /// convergence; `Some(tol)` treats a coordinate as unchanged when it moved
    /// by at most `tol`.
    pub tolerance: Option<f64>,
    /// RNG seed; runs with the same seed and input are identical.
    pub seed: u64,
    pub empty_clusters: EmptyClusterPolicy,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            metric: Metric::Euclidean,
            tolerance: None,
            seed: rng::DEFAULT_SEED,
            empty_clusters: EmptyClusterPolicy::Reseed,
        }
    }
}

impl KMeansConfig {
    pub fn metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn empty_clusters(mut self, policy: EmptyClusterPolicy) -> Self {
        self.empty_clusters = policy;
        self
    }
}

/// Outcome of a bounded [`KMeans::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Iterations actually performed, at most the requested round budget.
    pub rounds: usize,
    /// Whether the last iteration left every center unchanged.
    pub converged: bool,
}

/// The engine owns the dataset, the centers, the labels and the per-cluster
/// scratch buffers. Centers are seeded at construction; every call to
/// [`step`](KMeans::step) recomputes all labels and overwrites all centers.
#[derive(Debug)]
pub struct KMeans {
    set: VectorSet,
    k: usize,
    config: KMeansConfig,
    rng: Xoshiro256PlusPlus,
    /// `k` rows of dimension `set.dim()`, row-major.
    centers: Vec<f64>,
    /// One label per input row, each in `0..k`. All zero until the first step.
    labels: Vec<usize>,
    // Per-cluster scratch, zeroed at the start of every iteration.
    counts: Vec<usize>,
    sums: Vec<f64>,
}

impl KMeans {
    pub fn new(set: VectorSet, k: usize, config: KMeansConfig) -> Result<Self, ConfigError> {
        let n = set.len();
        ensure!(k > 0, ZeroClustersSnafu);
        ensure!(k <= n, TooManyClustersSnafu { k, n });

        let dim = set.dim();
        let mut rng = rng::from_seed(config.seed);
        let centers = seed::init_centers(&mut rng, &set, k, config.metric);

        Ok(KMeans {
            labels: vec![0; n],
            counts: vec![0; k],
            sums: vec![0.0; k * dim],
            set,
            k,
            config,
            rng,
            centers,
        })
    }

    /// One Lloyd iteration: relabel every row, then overwrite every center
    /// with its cluster mean. Returns `true` when no center coordinate
    /// changed, i.e. the centers are a fixed point and a further call would
    /// return `true` again.
    pub fn step(&mut self) -> bool {
        let dim = self.set.dim();
        let n = self.set.len();

        self.counts.fill(0);
        self.sums.fill(0.0);

        for row in 0..n {
            let v = self.set.row(row);
            let label = nearest_center(v, &self.centers, dim, self.config.metric);
            self.labels[row] = label;
            self.counts[label] += 1;
            let sum = &mut self.sums[label * dim..(label + 1) * dim];
            for (s, x) in sum.iter_mut().zip(v) {
                *s += x;
            }
        }

        let mut changed = false;
        for i in 0..self.k {
            let center = &mut self.centers[i * dim..(i + 1) * dim];

            if self.counts[i] == 0 {
                let replacement = match self.config.empty_clusters {
                    EmptyClusterPolicy::Keep => None,
                    EmptyClusterPolicy::Reseed => {
                        let row = self.rng.random_range(0..n);
                        debug!("cluster {i} has no members, reseeding from row {row}");
                        Some(self.set.row(row))
                    }
                };
                if let Some(v) = replacement {
                    for (c, x) in center.iter_mut().zip(v) {
                        if differs(*c, *x, self.config.tolerance) {
                            changed = true;
                        }
                        *c = *x;
                    }
                }
                continue;
            }

            let count = self.counts[i] as f64;
            let sums = &self.sums[i * dim..(i + 1) * dim];
            for (c, s) in center.iter_mut().zip(sums) {
                let new = s / count;
                if differs(*c, new, self.config.tolerance) {
                    changed = true;
                }
                *c = new;
            }
        }

        !changed
    }

    /// Iterate up to `max_rounds` times, stopping early on convergence.
    /// A zero budget is a no-op.
    pub fn run(&mut self, max_rounds: usize) -> RunSummary {
        let mut rounds = 0;
        let mut converged = false;

        while rounds < max_rounds {
            rounds += 1;
            if self.step() {
                converged = true;
                break;
            }
        }

        if converged {
            debug!("converged after {rounds} rounds");
        }

        RunSummary { rounds, converged }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn vectors(&self) -> &VectorSet {
        &self.set
    }

    /// Cluster id per input row, index-aligned with the input order.
    /// Meaningful only after at least one step.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn center(&self, i: usize) -> &[f64] {
        let dim = self.set.dim();
        &self.centers[i * dim..(i + 1) * dim]
    }

    /// The `k` centers in label order.
    pub fn centers(&self) -> impl Iterator<Item = &[f64]> {
        self.centers.chunks_exact(self.set.dim())
    }

    /// Number of rows currently carrying each label.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }
}

#[inline]
fn nearest_center(v: &[f64], centers: &[f64], dim: usize, metric: Metric) -> usize {
    let mut min = f64::MAX;
    let mut min_idx = 0;
    for (i, center) in centers.chunks_exact(dim).enumerate() {
        let d = metric.distance(center, v);
        // Strict comparison: on a tie the earliest center keeps the row.
        if d < min {
            min = d;
            min_idx = i;
        }
    }
    min_idx
}

#[inline]
fn differs(old: f64, new: f64, tolerance: Option<f64>) -> bool {
    match tolerance {
        None => new != old,
        Some(tol) => (new - old).abs() > tol,
    }
}
