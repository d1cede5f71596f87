//! The Parzen estimator facade and its configuration.
//!
//! Construction does all the work eagerly: compute mixture weights, map
//! observations into the working domain, build per-parameter marginals with
//! bandwidth selection, and assemble the weighted mixture. After that the
//! estimator is an immutable value; [`ParzenEstimator::sample`] and
//! [`ParzenEstimator::log_pdf`] only consult the stored mixture, so sharing
//! it across threads for read-only use is safe as long as each caller owns
//! its own RNG.

mod build;
mod transform;
mod weights;

use std::collections::BTreeMap;
use std::sync::Arc;

pub use weights::{UniformWeights, WeightStrategy};

use crate::distribution::Distribution;
use crate::error::{Error, Result};
use crate::mixture::{MixtureDistribution, ParamMarginals, ProductDistribution};

/// Configuration for [`ParzenEstimator`] construction.
///
/// Defaults mirror the usual TPE setup: prior component on with weight 1.0,
/// magic clip on, endpoint gaps ignored, uniform observation weights, and
/// independent per-observation bandwidths.
///
/// # Examples
///
/// ```
/// use parzen::ParzenEstimatorParameters;
///
/// let parameters = ParzenEstimatorParameters::builder()
///     .prior_weight(0.5)
///     .consider_endpoints(true)
///     .multivariate(true)
///     .build()
///     .unwrap();
/// assert_eq!(parameters.prior_weight(), Some(0.5));
/// ```
#[derive(Clone)]
pub struct ParzenEstimatorParameters {
    /// Whether to append a regularizing prior component to the mixture.
    pub(crate) consider_prior: bool,
    /// Mixture weight of the prior component; also the categorical smoothing
    /// scale. Required whenever the prior is considered (or forced).
    pub(crate) prior_weight: Option<f64>,
    /// Whether to clip bandwidths away from zero ("magic clip").
    pub(crate) consider_magic_clip: bool,
    /// Whether edge components may take their bandwidth from the boundary gap.
    pub(crate) consider_endpoints: bool,
    /// Strategy producing per-observation weights.
    pub(crate) weights: Arc<dyn WeightStrategy>,
    /// Whether all components share one Scott's-rule bandwidth per parameter.
    pub(crate) multivariate: bool,
}

impl ParzenEstimatorParameters {
    /// Creates a builder for configuring estimator parameters.
    #[must_use]
    pub fn builder() -> ParzenEstimatorParametersBuilder {
        ParzenEstimatorParametersBuilder::new()
    }

    /// Returns whether the prior component is considered.
    #[must_use]
    pub fn consider_prior(&self) -> bool {
        self.consider_prior
    }

    /// Returns the prior component's weight, if configured.
    #[must_use]
    pub fn prior_weight(&self) -> Option<f64> {
        self.prior_weight
    }

    /// Returns whether the magic clip is applied to bandwidths.
    #[must_use]
    pub fn consider_magic_clip(&self) -> bool {
        self.consider_magic_clip
    }

    /// Returns whether boundary gaps feed edge bandwidths.
    #[must_use]
    pub fn consider_endpoints(&self) -> bool {
        self.consider_endpoints
    }

    /// Returns whether multivariate (shared) bandwidths are used.
    #[must_use]
    pub fn multivariate(&self) -> bool {
        self.multivariate
    }
}

impl Default for ParzenEstimatorParameters {
    fn default() -> Self {
        Self {
            consider_prior: true,
            prior_weight: Some(1.0),
            consider_magic_clip: true,
            consider_endpoints: false,
            weights: Arc::new(UniformWeights),
            multivariate: false,
        }
    }
}

impl core::fmt::Debug for ParzenEstimatorParameters {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ParzenEstimatorParameters")
            .field("consider_prior", &self.consider_prior)
            .field("prior_weight", &self.prior_weight)
            .field("consider_magic_clip", &self.consider_magic_clip)
            .field("consider_endpoints", &self.consider_endpoints)
            .field("multivariate", &self.multivariate)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ParzenEstimatorParameters`].
#[derive(Clone)]
pub struct ParzenEstimatorParametersBuilder {
    parameters: ParzenEstimatorParameters,
}

impl ParzenEstimatorParametersBuilder {
    fn new() -> Self {
        Self {
            parameters: ParzenEstimatorParameters::default(),
        }
    }

    /// Sets whether a prior component is appended to the mixture.
    #[must_use]
    pub fn consider_prior(mut self, consider_prior: bool) -> Self {
        self.parameters.consider_prior = consider_prior;
        self
    }

    /// Sets the prior component's weight.
    #[must_use]
    pub fn prior_weight(mut self, prior_weight: f64) -> Self {
        self.parameters.prior_weight = Some(prior_weight);
        self
    }

    /// Clears the prior weight entirely.
    ///
    /// Construction will then fail wherever a prior weight is required (a
    /// considered or forced prior, or any categorical parameter).
    #[must_use]
    pub fn clear_prior_weight(mut self) -> Self {
        self.parameters.prior_weight = None;
        self
    }

    /// Sets whether bandwidths are clipped away from zero.
    #[must_use]
    pub fn consider_magic_clip(mut self, consider_magic_clip: bool) -> Self {
        self.parameters.consider_magic_clip = consider_magic_clip;
        self
    }

    /// Sets whether boundary gaps feed edge bandwidths.
    #[must_use]
    pub fn consider_endpoints(mut self, consider_endpoints: bool) -> Self {
        self.parameters.consider_endpoints = consider_endpoints;
        self
    }

    /// Sets the per-observation weight strategy.
    #[must_use]
    pub fn weights(mut self, weights: impl WeightStrategy + 'static) -> Self {
        self.parameters.weights = Arc::new(weights);
        self
    }

    /// Sets whether one Scott's-rule bandwidth is shared across components.
    #[must_use]
    pub fn multivariate(mut self, multivariate: bool) -> Self {
        self.parameters.multivariate = multivariate;
        self
    }

    /// Finalizes the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingPriorWeight`] if the prior is considered but
    /// no prior weight is set.
    pub fn build(self) -> Result<ParzenEstimatorParameters> {
        if self.parameters.consider_prior && self.parameters.prior_weight.is_none() {
            return Err(Error::MissingPriorWeight);
        }
        Ok(self.parameters)
    }
}

/// A fitted Parzen estimator over a mixed search space.
///
/// The model is a weighted mixture with one component per observation (plus
/// an optional prior component); within a component, parameters are
/// independent and each carries its own kernel. See the crate docs for the
/// full pipeline.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
///
/// use parzen::prelude::*;
///
/// let mut search_space = BTreeMap::new();
/// search_space.insert(
///     "depth".to_string(),
///     Distribution::Numerical(
///         NumericalDistribution::new(1.0, 16.0).unwrap().step(1.0).unwrap(),
///     ),
/// );
/// search_space.insert(
///     "kind".to_string(),
///     Distribution::Categorical(CategoricalDistribution::new(3).unwrap()),
/// );
///
/// let mut observations = BTreeMap::new();
/// observations.insert("depth".to_string(), vec![4.0, 7.0, 4.0]);
/// observations.insert("kind".to_string(), vec![0.0, 2.0, 0.0]);
///
/// let parameters = ParzenEstimatorParameters::default();
/// let estimator =
///     ParzenEstimator::new(&observations, &search_space, &parameters, None).unwrap();
/// assert_eq!(estimator.n_components(), 4); // 3 observations + prior
///
/// let mut rng = fastrand::Rng::with_seed(1);
/// let draws = estimator.sample(&mut rng, 8);
/// assert!(draws["depth"].iter().all(|&d| (1.0..=16.0).contains(&d)));
/// ```
#[derive(Clone, Debug)]
pub struct ParzenEstimator {
    search_space: BTreeMap<String, Distribution>,
    mixture: MixtureDistribution,
}

impl ParzenEstimator {
    /// Fits an estimator to `observations` over `search_space`.
    ///
    /// `predetermined_weights`, when given, replaces the configured weight
    /// strategy verbatim (no validation); its length must equal the
    /// observation count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySearchSpace`] for an empty search space,
    /// [`Error::MissingParameter`] / [`Error::ObservationLengthMismatch`] for
    /// inconsistent observation columns,
    /// [`Error::PredeterminedWeightLengthMismatch`] for a wrong-length weight
    /// vector, and the weight-validation or prior-weight errors of the
    /// underlying builders.
    pub fn new(
        observations: &BTreeMap<String, Vec<f64>>,
        search_space: &BTreeMap<String, Distribution>,
        parameters: &ParzenEstimatorParameters,
        predetermined_weights: Option<&[f64]>,
    ) -> Result<Self> {
        if search_space.is_empty() {
            return Err(Error::EmptySearchSpace);
        }

        let n_observations = Self::common_observation_count(observations, search_space)?;
        if let Some(predetermined) = predetermined_weights {
            if predetermined.len() != n_observations {
                return Err(Error::PredeterminedWeightLengthMismatch {
                    expected: n_observations,
                    got: predetermined.len(),
                });
            }
        }

        let mixture_weights =
            weights::compute_weights(predetermined_weights, n_observations, parameters)?;
        let transformed = transform::to_uniform(observations, search_space)?;

        let mut marginals: BTreeMap<String, ParamMarginals> = BTreeMap::new();
        for (name, distribution) in search_space {
            let column = transformed
                .get(name)
                .ok_or(Error::Internal("transformed observations out of sync"))?;
            let built = build::build_distributions(
                column,
                distribution,
                search_space.len(),
                parameters,
            )?;
            marginals.insert(name.clone(), built);
        }

        let product = ProductDistribution::new(marginals)?;
        let mixture = MixtureDistribution::new(product, mixture_weights)?;
        trace_debug!(
            n_observations,
            n_components = mixture.n_components(),
            n_params = search_space.len(),
            "fitted parzen estimator"
        );

        Ok(Self {
            search_space: search_space.clone(),
            mixture,
        })
    }

    /// Draws `size` parameter vectors in each parameter's native domain.
    ///
    /// Values are clipped and quantized per entry: stepped parameters land on
    /// their grid, log-scaled parameters come back through `exp`.
    /// Deterministic given the RNG state.
    #[must_use]
    pub fn sample(&self, rng: &mut fastrand::Rng, size: usize) -> BTreeMap<String, Vec<f64>> {
        let drawn = self.mixture.sample(rng, size);
        transform::from_uniform(&drawn, &self.search_space)
    }

    /// Evaluates the mixture's log-density at each query row.
    ///
    /// Queries are given in native domains and pass through the same
    /// transform as the observations did. Results may be `-inf` outside the
    /// support but are never NaN for well-formed input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingParameter`] or
    /// [`Error::ObservationLengthMismatch`] for malformed query columns.
    pub fn log_pdf(&self, samples: &BTreeMap<String, Vec<f64>>) -> Result<Vec<f64>> {
        let transformed = transform::to_uniform(samples, &self.search_space)?;
        self.mixture.log_pdf(&transformed)
    }

    /// Number of mixture components (observations, plus one with a prior).
    #[must_use]
    pub fn n_components(&self) -> usize {
        self.mixture.n_components()
    }

    /// The normalized mixture weights.
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        self.mixture.weights()
    }

    /// The search space the estimator was fitted over.
    #[must_use]
    pub fn search_space(&self) -> &BTreeMap<String, Distribution> {
        &self.search_space
    }

    /// Validates that every search-space parameter has an observation column
    /// and that all columns agree on length.
    fn common_observation_count(
        observations: &BTreeMap<String, Vec<f64>>,
        search_space: &BTreeMap<String, Distribution>,
    ) -> Result<usize> {
        let mut count: Option<usize> = None;
        for name in search_space.keys() {
            let column = observations
                .get(name)
                .ok_or_else(|| Error::MissingParameter { name: name.clone() })?;
            match count {
                None => count = Some(column.len()),
                Some(expected) if column.len() != expected => {
                    return Err(Error::ObservationLengthMismatch {
                        param: name.clone(),
                        expected,
                        got: column.len(),
                    });
                }
                Some(_) => {}
            }
        }
        Ok(count.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_parameters_keep_the_prior() {
        let parameters = ParzenEstimatorParameters::default();
        assert!(parameters.consider_prior());
        assert_eq!(parameters.prior_weight(), Some(1.0));
        assert!(parameters.consider_magic_clip());
        assert!(!parameters.consider_endpoints());
        assert!(!parameters.multivariate());
    }

    #[test]
    fn builder_rejects_considered_prior_without_weight() {
        let result = ParzenEstimatorParameters::builder()
            .clear_prior_weight()
            .build();
        assert!(matches!(result, Err(Error::MissingPriorWeight)));
    }

    #[test]
    fn builder_accepts_cleared_weight_when_prior_is_off() {
        let parameters = ParzenEstimatorParameters::builder()
            .consider_prior(false)
            .clear_prior_weight()
            .build()
            .unwrap();
        assert_eq!(parameters.prior_weight(), None);
    }

    #[test]
    fn builder_overrides_apply() {
        let parameters = ParzenEstimatorParameters::builder()
            .prior_weight(0.25)
            .consider_magic_clip(false)
            .consider_endpoints(true)
            .multivariate(true)
            .build()
            .unwrap();
        assert_eq!(parameters.prior_weight(), Some(0.25));
        assert!(!parameters.consider_magic_clip());
        assert!(parameters.consider_endpoints());
        assert!(parameters.multivariate());
    }
}
