//! Per-parameter marginal distribution construction.
//!
//! For each search-space entry this module turns the transformed observation
//! column into one marginal distribution per mixture component: a smoothed
//! probability table row per observation for categoricals, or a bounded
//! normal per observation for numericals, with per-observation bandwidths
//! picked from nearest-neighbor spacing (or a shared Scott's-rule value in
//! multivariate mode) and clipped by the "magic clip".

use crate::distribution::{Distribution, NumericalDistribution};
use crate::error::{Error, Result};
use crate::mixture::{
    DiscreteTruncatedNormals, ParamMarginals, SmoothedCategorical, TruncatedNormals,
};

use super::ParzenEstimatorParameters;

/// Lower sigma bound when the magic clip is disabled.
const EPS: f64 = 1e-12;
/// Leading coefficient of the shared multivariate bandwidth.
const SIGMA0_MAGNITUDE: f64 = 0.2;
/// Divisor cap in the magic-clip lower sigma bound.
const MAGIC_CLIP_DIVISOR_CAP: f64 = 100.0;

/// Builds the marginal distribution set for one parameter.
///
/// `n_params` is the total number of search-space parameters; it feeds the
/// dimensionality term of the shared multivariate bandwidth.
pub(crate) fn build_distributions(
    observations: &[f64],
    distribution: &Distribution,
    n_params: usize,
    parameters: &ParzenEstimatorParameters,
) -> Result<ParamMarginals> {
    match distribution {
        Distribution::Categorical(d) => {
            build_categorical(observations, d.n_choices, parameters)
        }
        Distribution::Numerical(d) => {
            build_numerical(observations, d, n_params, parameters)
        }
    }
}

/// Builds smoothed categorical rows: a flat `prior_weight`-scaled floor plus
/// one count for each observed choice, row-normalized.
fn build_categorical(
    observations: &[f64],
    n_choices: usize,
    parameters: &ParzenEstimatorParameters,
) -> Result<ParamMarginals> {
    let n_observations = observations.len();
    let consider_prior = parameters.consider_prior || n_observations == 0;
    // The smoothing floor is prior-weight-derived even without a prior row.
    let prior_weight = parameters.prior_weight.ok_or(Error::MissingPriorWeight)?;

    let n_rows = if consider_prior {
        n_observations + 1
    } else {
        n_observations
    };
    #[allow(clippy::cast_precision_loss)]
    let fill = prior_weight / n_rows as f64;
    let mut rows = vec![vec![fill; n_choices]; n_rows];

    for (row, &observation) in observations.iter().enumerate() {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = observation.round() as usize;
        if observation < 0.0 || index >= n_choices {
            return Err(Error::ChoiceIndexOutOfRange { index, n_choices });
        }
        rows[row][index] += 1.0;
    }
    for row in &mut rows {
        let total: f64 = row.iter().sum();
        for value in row {
            *value /= total;
        }
    }
    Ok(ParamMarginals::Categorical(SmoothedCategorical::new(rows)?))
}

/// Effective working-domain bounds and step for a numerical entry.
///
/// Log-scaled grids are modeled unstepped: the bounds widen by half a step
/// before logging so the grid's outermost cells keep their full mass, and the
/// step is dropped (a log transform would make grid cells unevenly wide).
fn working_bounds(d: &NumericalDistribution) -> (f64, f64, Option<f64>) {
    if d.log_scale {
        match d.step {
            Some(step) => ((d.low - step / 2.0).ln(), (d.high + step / 2.0).ln(), None),
            None => (d.low.ln(), d.high.ln(), None),
        }
    } else {
        (d.low, d.high, d.step)
    }
}

/// Builds bounded-normal rows with per-component bandwidth selection.
#[allow(clippy::cast_precision_loss)]
fn build_numerical(
    observations: &[f64],
    d: &NumericalDistribution,
    n_params: usize,
    parameters: &ParzenEstimatorParameters,
) -> Result<ParamMarginals> {
    let (low, high, step) = working_bounds(d);
    let step_or_zero = step.unwrap_or(0.0);

    let n_observations = observations.len();
    let consider_prior = parameters.consider_prior || n_observations == 0;

    let prior_mu = 0.5 * (low + high);
    let prior_sigma = high - low + step_or_zero;

    let mut mus = observations.to_vec();
    if consider_prior {
        mus.push(prior_mu);
    }

    let mut sigmas = if parameters.multivariate {
        let shared = SIGMA0_MAGNITUDE
            * (n_observations.max(1) as f64).powf(-1.0 / (n_params as f64 + 4.0))
            * (high - low + step_or_zero);
        vec![shared; mus.len()]
    } else {
        neighbor_gap_sigmas(
            &mus,
            low - step_or_zero / 2.0,
            high + step_or_zero / 2.0,
            parameters.consider_endpoints,
        )
    };

    let maxsigma = high - low + step_or_zero;
    let minsigma = if parameters.consider_magic_clip {
        maxsigma / MAGIC_CLIP_DIVISOR_CAP.min(1.0 + mus.len() as f64)
    } else {
        EPS
    };
    for sigma in &mut sigmas {
        *sigma = sigma.max(minsigma).min(maxsigma);
    }

    // The prior's spread is the full working range, bypassing the clip.
    if consider_prior {
        sigmas[n_observations] = prior_sigma;
    }

    match step {
        None => Ok(ParamMarginals::Continuous(TruncatedNormals::new(
            mus, sigmas, low, high,
        )?)),
        Some(step) => Ok(ParamMarginals::Discrete(DiscreteTruncatedNormals::new(
            mus, sigmas, low, high, step,
        )?)),
    }
}

/// Nearest-neighbor spread heuristic: each component's sigma is the larger of
/// the gaps to its sorted neighbors, with the working bounds as sentinels.
///
/// Without `consider_endpoints` (and at least two interior points), the first
/// and last sigma use only the adjacent interior gap, so bandwidths do not
/// balloon near the domain edges.
fn neighbor_gap_sigmas(
    mus: &[f64],
    low_sentinel: f64,
    high_sentinel: f64,
    consider_endpoints: bool,
) -> Vec<f64> {
    let n = mus.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| mus[a].total_cmp(&mus[b]));

    let mut extended = Vec::with_capacity(n + 2);
    extended.push(low_sentinel);
    extended.extend(order.iter().map(|&i| mus[i]));
    extended.push(high_sentinel);

    let mut sorted_sigmas: Vec<f64> = (0..n)
        .map(|i| {
            let left = extended[i + 1] - extended[i];
            let right = extended[i + 2] - extended[i + 1];
            left.max(right)
        })
        .collect();

    if !consider_endpoints && extended.len() >= 4 {
        sorted_sigmas[0] = extended[2] - extended[1];
        sorted_sigmas[n - 1] = extended[n] - extended[n - 1];
    }

    // Un-sort back to original observation order.
    let mut sigmas = vec![0.0; n];
    for (rank, &original) in order.iter().enumerate() {
        sigmas[original] = sorted_sigmas[rank];
    }
    sigmas
}
