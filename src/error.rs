use thiserror::Error;

/// Result alias for `kselect`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by estimators, metrics and visualizers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Input was empty.
    #[error("empty input provided")]
    EmptyInput,

    /// Matrix dimension mismatch.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// Invalid number of clusters requested.
    #[error("cannot create {requested} clusters from {n_items} items")]
    InvalidClusterCount {
        /// Requested count.
        requested: usize,
        /// Number of items.
        n_items: usize,
    },

    /// A label-based score needs at least two and at most `n_samples - 1`
    /// distinct labels.
    #[error("number of labels is {n_labels}; valid values are 2 to n_samples - 1 ({n_samples} samples)")]
    InvalidLabelCount {
        /// Distinct labels found.
        n_labels: usize,
        /// Number of samples.
        n_samples: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },

    /// The estimator was used before `fit`.
    #[error("estimator is not fitted yet; call fit first")]
    NotFitted,

    /// Every input row is identical, so there is no direction to project on.
    #[error("input has zero variance")]
    ZeroVariance,

    /// Failure reported by an external estimator.
    #[error("{0}")]
    Other(String),
}
