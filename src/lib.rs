#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]

//! Mixed-domain Parzen estimator — the density core of a Tree-Parzen-Estimator
//! (TPE) style optimizer.
//!
//! Given observations over a mixed search space (continuous, stepped,
//! log-scaled, categorical), [`ParzenEstimator`] builds a weighted mixture of
//! per-observation kernels (bounded normals for numerical parameters, smoothed
//! probability tables for categorical ones) and exposes two operations:
//! drawing candidate parameter vectors from the mixture, and evaluating its
//! log-density at arbitrary points. A TPE optimizer fits one estimator on its
//! "good" trials and one on its "bad" trials and compares their densities; the
//! trial bookkeeping and search loop live in that outer optimizer, not here.
//!
//! # Getting Started
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! use parzen::{Distribution, NumericalDistribution, ParzenEstimator, ParzenEstimatorParameters};
//!
//! let mut search_space = BTreeMap::new();
//! search_space.insert(
//!     "x".to_string(),
//!     Distribution::Numerical(NumericalDistribution::new(-5.0, 5.0).unwrap()),
//! );
//!
//! let mut observations = BTreeMap::new();
//! observations.insert("x".to_string(), vec![-1.0, 0.5, 2.0]);
//!
//! let parameters = ParzenEstimatorParameters::default();
//! let estimator =
//!     ParzenEstimator::new(&observations, &search_space, &parameters, None).unwrap();
//!
//! let mut rng = fastrand::Rng::with_seed(42);
//! let draws = estimator.sample(&mut rng, 16);
//! assert_eq!(draws["x"].len(), 16);
//!
//! let densities = estimator.log_pdf(&observations).unwrap();
//! assert!(densities.iter().all(|d| d.is_finite()));
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`Distribution`] | A search-space entry: numerical (bounded, optionally stepped or log-scaled) or categorical. |
//! | [`ParzenEstimatorParameters`] | Configuration: prior component, magic clip, endpoint handling, weight strategy, multivariate bandwidths. |
//! | [`ParzenEstimator`] | The fitted model. Immutable after construction; `sample` and `log_pdf` are read-only. |
//! | [`mixture::MixtureDistribution`] | The underlying weighted mixture of per-observation joint kernels. |
//!
//! The estimator works in a common continuous "uniform" domain: log-scaled
//! parameters are mapped through `ln` on the way in and `exp` on the way out,
//! stepped parameters are snapped back onto their grid, and categorical values
//! travel as choice indices. Bandwidths are chosen per observation from
//! nearest-neighbor spacing (or shared via a Scott's-rule formula in
//! multivariate mode) and clipped away from zero by the "magic clip".
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `serde` | `Serialize`/`Deserialize` on the search-space types | off |
//! | `tracing` | Debug-level traces during model construction | off |

#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

mod distribution;
mod error;
pub mod estimator;
pub mod mixture;
mod rng_util;

pub use distribution::{CategoricalDistribution, Distribution, NumericalDistribution};
pub use error::{Error, Result};
pub use estimator::{
    ParzenEstimator, ParzenEstimatorParameters, ParzenEstimatorParametersBuilder, UniformWeights,
    WeightStrategy,
};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use parzen::prelude::*;
/// ```
pub mod prelude {
    pub use crate::distribution::{CategoricalDistribution, Distribution, NumericalDistribution};
    pub use crate::error::{Error, Result};
    pub use crate::estimator::{
        ParzenEstimator, ParzenEstimatorParameters, ParzenEstimatorParametersBuilder,
        UniformWeights, WeightStrategy,
    };
    pub use crate::mixture::MixtureDistribution;
}
