#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the lower bound is not less than the upper bound.
    #[error("invalid bounds: low ({low}) must be less than high ({high})")]
    InvalidBounds {
        /// The lower bound value.
        low: f64,
        /// The upper bound value.
        high: f64,
    },

    /// Returned when log scale is used with non-positive bounds.
    #[error("invalid log bounds: low must be positive for log scale")]
    InvalidLogBounds,

    /// Returned when a step size is not positive or does not evenly subdivide
    /// the `[low, high]` interval.
    #[error("invalid step: {step} must be positive and evenly subdivide [low, high]")]
    InvalidStep {
        /// The offending step size.
        step: f64,
    },

    /// Returned when categorical choices are empty.
    #[error("categorical choices cannot be empty")]
    EmptyChoices,

    /// Returned when an estimator is constructed over an empty search space.
    #[error("search space cannot be empty")]
    EmptySearchSpace,

    /// Returned when the weight strategy produces a negative weight.
    #[error(
        "the weight strategy returned a negative value ({value}) for {n_observations} observations"
    )]
    NegativeWeight {
        /// The offending weight value.
        value: f64,
        /// The observation count the strategy was called with.
        n_observations: usize,
    },

    /// Returned when the weight strategy produces all-zero weights.
    #[error("the weight strategy returned all-zero values for {n_observations} observations")]
    ZeroWeightSum {
        /// The observation count the strategy was called with.
        n_observations: usize,
    },

    /// Returned when the weight strategy produces an infinite or NaN weight.
    #[error(
        "the weight strategy returned a non-finite value ({value}) for {n_observations} observations"
    )]
    NonFiniteWeight {
        /// The offending weight value.
        value: f64,
        /// The observation count the strategy was called with.
        n_observations: usize,
    },

    /// Returned when the weight strategy returns fewer weights than there are
    /// observations, or a mixture is paired with a wrong-length weight vector.
    #[error("weight count mismatch: expected {expected} weights but got {got}")]
    WeightCountMismatch {
        /// The expected number of weights.
        expected: usize,
        /// The actual number of weights.
        got: usize,
    },

    /// Returned when a prior component or categorical smoothing is requested
    /// without a prior weight.
    #[error("prior weight is required when the prior component is considered")]
    MissingPriorWeight,

    /// Returned when observations or query samples lack a search-space parameter.
    #[error("missing values for parameter '{name}'")]
    MissingParameter {
        /// The name of the missing parameter.
        name: String,
    },

    /// Returned when observation arrays disagree on length.
    #[error("observation length mismatch for '{param}': expected {expected} values, got {got}")]
    ObservationLengthMismatch {
        /// The name of the offending parameter.
        param: String,
        /// The expected array length.
        expected: usize,
        /// The actual array length.
        got: usize,
    },

    /// Returned when predetermined weights disagree with the observation count.
    #[error("predetermined weights length mismatch: expected {expected}, got {got}")]
    PredeterminedWeightLengthMismatch {
        /// The expected number of weights (the observation count).
        expected: usize,
        /// The actual number of predetermined weights.
        got: usize,
    },

    /// Returned when per-parameter marginals disagree on the component count.
    #[error("component count mismatch for '{param}': expected {expected} components, got {got}")]
    ComponentCountMismatch {
        /// The name of the offending parameter.
        param: String,
        /// The expected number of mixture components.
        expected: usize,
        /// The actual number of mixture components.
        got: usize,
    },

    /// Returned when a categorical observation indexes past the choice count.
    #[error("categorical choice index {index} out of range for {n_choices} choices")]
    ChoiceIndexOutOfRange {
        /// The offending choice index.
        index: usize,
        /// The number of declared choices.
        n_choices: usize,
    },

    /// Returned when a kernel bandwidth is not positive.
    #[error("invalid bandwidth: {0} must be positive")]
    InvalidBandwidth(f64),

    /// Returned when an internal invariant is violated.
    #[error("internal error: {0}")]
    Internal(&'static str),
}

pub type Result<T> = core::result::Result<T, Error>;
