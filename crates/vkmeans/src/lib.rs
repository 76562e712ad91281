//! Offline k-means clustering of fixed-dimension `f64` vectors.
//!
//! The caller builds a [`VectorSet`], hands it to the engine together with the
//! cluster count `k`, and drives a bounded number of Lloyd iterations. Labels
//! and centers are read back afterwards; there is no I/O, no persistence and
//! no threading.
//!
//! ```
//! use vkmeans::VectorSet;
//!
//! let set = VectorSet::from_rows(&[
//!     vec![1.0, 2.0],
//!     vec![1.0, 1.2],
//!     vec![4.0, 1.0],
//!     vec![100.0, 101.0],
//!     vec![99.0, 98.0],
//!     vec![97.0, 87.0],
//! ])
//! .unwrap();
//!
//! let result = vkmeans::cluster(set, 2, 10).unwrap();
//!
//! assert!(result.converged);
//! assert_eq!(result.centers.len(), 2);
//! assert_eq!(result.labels[0], result.labels[1]);
//! assert_ne!(result.labels[0], result.labels[3]);
//! ```

pub mod kmeans;
pub mod metric;
pub mod rng;

use snafu::prelude::*;

pub use kmeans::{ConfigError, EmptyClusterPolicy, KMeans, KMeansConfig, RunSummary};
pub use metric::Metric;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum VectorSetError {
    #[snafu(display("dataset is empty"))]
    EmptyDataset,

    #[snafu(display("vector dimension must be positive"))]
    ZeroDimension,

    #[snafu(display("vector {index} has dimension {got}, expected {expected}"))]
    DimensionMismatch {
        index: usize,
        expected: usize,
        got: usize,
    },

    #[snafu(display("buffer length {len} is not a multiple of dimension {dim}"))]
    InvalidBufferLength { len: usize, dim: usize },
}

/// A façade over the vectors to cluster: `N` rows of equal dimension, stored
/// row-major in one flat buffer. Construction validates the shape once, so the
/// engine never has to.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorSet {
    dim: usize,
    data: Vec<f64>,
}

impl VectorSet {
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, VectorSetError> {
        ensure!(!rows.is_empty(), EmptyDatasetSnafu);
        let dim = rows[0].len();
        ensure!(dim > 0, ZeroDimensionSnafu);

        let mut data = Vec::with_capacity(rows.len() * dim);
        for (index, row) in rows.iter().enumerate() {
            ensure!(
                row.len() == dim,
                DimensionMismatchSnafu {
                    index,
                    expected: dim,
                    got: row.len(),
                }
            );
            data.extend_from_slice(row);
        }

        Ok(VectorSet { dim, data })
    }

    /// Build from an already-flat row-major buffer of `len / dim` rows.
    pub fn from_flat(dim: usize, data: Vec<f64>) -> Result<Self, VectorSetError> {
        ensure!(dim > 0, ZeroDimensionSnafu);
        ensure!(!data.is_empty(), EmptyDatasetSnafu);
        ensure!(
            data.len() % dim == 0,
            InvalidBufferLengthSnafu {
                len: data.len(),
                dim,
            }
        );

        Ok(VectorSet { dim, data })
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.dim)
    }
}

/// Owned result of the [`cluster`] convenience entry point.
#[derive(Debug, Clone)]
pub struct Clustering {
    /// Cluster id per input row, index-aligned with the input order.
    pub labels: Vec<usize>,
    /// One center per cluster id.
    pub centers: Vec<Vec<f64>>,
    /// Iterations actually performed.
    pub rounds: usize,
    pub converged: bool,
}

/// Cluster `set` into `k` groups with the default configuration, iterating at
/// most `max_rounds` times.
///
/// See [`KMeans`] for the stateful engine with metric, tolerance and seeding
/// control.
pub fn cluster(set: VectorSet, k: usize, max_rounds: usize) -> Result<Clustering, ConfigError> {
    let mut engine = KMeans::new(set, k, KMeansConfig::default())?;
    let summary = engine.run(max_rounds);

    Ok(Clustering {
        labels: engine.labels().to_vec(),
        centers: engine.centers().map(<[f64]>::to_vec).collect(),
        rounds: summary.rounds,
        converged: summary.converged,
    })
}
