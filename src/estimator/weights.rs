//! Mixture weight computation.
//!
//! Turns an observation count into a normalized weight vector, optionally
//! appending the prior component's weight. Strategy-supplied weights are
//! validated here; predetermined weights (handed down by the outer optimizer,
//! e.g. from a gamma split) are taken verbatim.

use super::ParzenEstimatorParameters;
use crate::error::{Error, Result};

/// Strategy for weighting observations by recency or rank.
///
/// Implemented for any `Fn(usize) -> Vec<f64>` closure, so a custom scheme is
/// one lambda away:
///
/// ```
/// use parzen::WeightStrategy;
///
/// // Linearly up-weight recent observations.
/// let ramp = |n: usize| (1..=n).map(|i| i as f64).collect::<Vec<_>>();
/// assert_eq!(ramp.weights(3), vec![1.0, 2.0, 3.0]);
/// ```
pub trait WeightStrategy: Send + Sync {
    /// Returns one non-negative, finite weight per observation.
    ///
    /// Must return at least `n_observations` entries; extras are truncated.
    fn weights(&self, n_observations: usize) -> Vec<f64>;
}

impl<F> WeightStrategy for F
where
    F: Fn(usize) -> Vec<f64> + Send + Sync,
{
    fn weights(&self, n_observations: usize) -> Vec<f64> {
        self(n_observations)
    }
}

/// The default strategy: every observation weighs the same.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformWeights;

impl WeightStrategy for UniformWeights {
    fn weights(&self, n_observations: usize) -> Vec<f64> {
        vec![1.0; n_observations]
    }
}

/// Computes the normalized mixture weight vector.
///
/// With `n_observations == 0` the prior component is forced on regardless of
/// configuration, since a mixture needs at least one component. The result
/// has length `n_observations` (+1 with prior), is non-negative, and sums
/// to 1.
pub(crate) fn compute_weights(
    predetermined: Option<&[f64]>,
    n_observations: usize,
    parameters: &ParzenEstimatorParameters,
) -> Result<Vec<f64>> {
    let consider_prior = parameters.consider_prior || n_observations == 0;

    let mut weights = match predetermined {
        Some(values) => values[..n_observations].to_vec(),
        None => {
            let mut weights = parameters.weights.weights(n_observations);
            weights.truncate(n_observations);
            if weights.len() < n_observations {
                return Err(Error::WeightCountMismatch {
                    expected: n_observations,
                    got: weights.len(),
                });
            }
            for &value in &weights {
                if value < 0.0 {
                    return Err(Error::NegativeWeight {
                        value,
                        n_observations,
                    });
                }
            }
            if !weights.is_empty() && weights.iter().sum::<f64>() <= 0.0 {
                return Err(Error::ZeroWeightSum { n_observations });
            }
            for &value in &weights {
                if !value.is_finite() {
                    return Err(Error::NonFiniteWeight {
                        value,
                        n_observations,
                    });
                }
            }
            weights
        }
    };

    if consider_prior {
        let prior_weight = parameters.prior_weight.ok_or(Error::MissingPriorWeight)?;
        weights.push(prior_weight);
    }

    let total: f64 = weights.iter().sum();
    for value in &mut weights {
        *value /= total;
    }
    Ok(weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::ParzenEstimatorParameters;

    fn params_with(weights: impl WeightStrategy + 'static) -> ParzenEstimatorParameters {
        ParzenEstimatorParameters::builder()
            .weights(weights)
            .build()
            .unwrap()
    }

    #[test]
    fn weights_are_normalized_with_prior() {
        let parameters = ParzenEstimatorParameters::default();
        let weights = compute_weights(None, 4, &parameters).unwrap();
        assert_eq!(weights.len(), 5);
        assert!(weights.iter().all(|&w| w >= 0.0));
        assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn weights_are_normalized_without_prior() {
        let parameters = ParzenEstimatorParameters::builder()
            .consider_prior(false)
            .build()
            .unwrap();
        let weights = compute_weights(None, 3, &parameters).unwrap();
        assert_eq!(weights.len(), 3);
        assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_observations_force_prior_component() {
        let parameters = ParzenEstimatorParameters::builder()
            .consider_prior(false)
            .prior_weight(1.0)
            .build()
            .unwrap();
        let weights = compute_weights(None, 0, &parameters).unwrap();
        assert_eq!(weights, vec![1.0]);
    }

    #[test]
    fn negative_weight_is_rejected() {
        let parameters = params_with(|_n: usize| vec![-1.0]);
        assert!(matches!(
            compute_weights(None, 1, &parameters),
            Err(Error::NegativeWeight { .. })
        ));
    }

    #[test]
    fn all_zero_weights_are_rejected() {
        let parameters = params_with(|_n: usize| vec![0.0]);
        assert!(matches!(
            compute_weights(None, 1, &parameters),
            Err(Error::ZeroWeightSum { .. })
        ));
    }

    #[test]
    fn non_finite_weights_are_rejected() {
        let nan = params_with(|_n: usize| vec![f64::NAN, 1.0]);
        assert!(matches!(
            compute_weights(None, 2, &nan),
            Err(Error::NonFiniteWeight { .. })
        ));

        let inf = params_with(|_n: usize| vec![f64::INFINITY, 1.0]);
        assert!(matches!(
            compute_weights(None, 2, &inf),
            Err(Error::NonFiniteWeight { .. })
        ));
    }

    #[test]
    fn short_weight_vector_is_rejected() {
        let parameters = params_with(|_n: usize| vec![1.0]);
        assert!(matches!(
            compute_weights(None, 3, &parameters),
            Err(Error::WeightCountMismatch { .. })
        ));
    }

    #[test]
    fn surplus_weights_are_truncated() {
        let parameters = params_with(|_n: usize| vec![1.0, 2.0, 3.0, 4.0]);
        let weights = compute_weights(None, 2, &parameters).unwrap();
        // 2 observations + prior.
        assert_eq!(weights.len(), 3);
        assert!((weights[1] / weights[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn predetermined_weights_skip_validation() {
        // A zero predetermined weight would fail strategy validation but is
        // taken verbatim; the prior keeps the total positive.
        let parameters = ParzenEstimatorParameters::default();
        let weights = compute_weights(Some(&[0.0]), 1, &parameters).unwrap();
        assert_eq!(weights.len(), 2);
        assert_eq!(weights[0], 0.0);
        assert!((weights[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn missing_prior_weight_is_rejected_when_prior_is_forced() {
        let parameters = ParzenEstimatorParameters::builder()
            .consider_prior(false)
            .clear_prior_weight()
            .build()
            .unwrap();
        assert!(matches!(
            compute_weights(None, 0, &parameters),
            Err(Error::MissingPriorWeight)
        ));
    }
}
