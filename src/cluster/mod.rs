//! Clustering estimators.
//!
//! Visualizers talk to estimators through [`ClusterEstimator`]. Two
//! implementations ship with the crate:
//!
//! | Estimator | Clusters in | `preprocess_input` |
//! |-----------|-------------|--------------------|
//! | [`Kmeans`] | input space | identity |
//! | [`SphericalKmeans`] | unit sphere of the PCA projection | project + normalize |
//!
//! ### Spherical k-means
//!
//! Clusters by direction instead of position: rows are projected onto their
//! principal components, scaled to unit length, and grouped by cosine
//! similarity. Distances in the raw input are meaningless for judging such a
//! clustering, which is why scores must be computed on the projection.
//!
//! ## Usage
//!
//! ```rust
//! use kselect::cluster::{ClusterEstimator, SphericalKmeans};
//! use ndarray::array;
//!
//! let x = array![[0.0, 0.0], [0.1, 0.1], [10.0, 10.0], [10.1, 10.1]];
//!
//! let mut model = SphericalKmeans::new(2).with_seed(42);
//! model.fit(&x).unwrap();
//! let labels = model.labels().unwrap();
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[0], labels[2]);
//! ```

mod kmeans;
mod pca;
mod spherical;
mod traits;

pub use kmeans::Kmeans;
pub use pca::Pca;
pub use spherical::SphericalKmeans;
pub use traits::ClusterEstimator;
