//! Distribution-math primitives consumed by the estimator facade.
//!
//! Four operations, per the estimator's collaborator contract: combine
//! per-parameter marginals into per-component joints ([`ProductDistribution`]),
//! combine the joints into a weighted mixture ([`MixtureDistribution`]), draw
//! from the mixture ([`MixtureDistribution::sample`]), and evaluate its
//! log-density ([`MixtureDistribution::log_pdf`]). Everything is batched: a
//! [`ParamMarginals`] value holds one marginal row per mixture component, so
//! the product over parameters is implicit in how rows line up.

mod categorical;
mod truncnorm;

use std::collections::BTreeMap;

pub use categorical::SmoothedCategorical;
pub use truncnorm::{DiscreteTruncatedNormals, TruncatedNormals};

use crate::error::{Error, Result};
use crate::rng_util;

/// Per-parameter marginal distributions, one row per mixture component.
#[derive(Clone, Debug)]
pub enum ParamMarginals {
    /// Smoothed probability tables for a categorical parameter.
    Categorical(SmoothedCategorical),
    /// Truncated normals for a continuous numerical parameter.
    Continuous(TruncatedNormals),
    /// Grid-discretized truncated normals for a stepped numerical parameter.
    Discrete(DiscreteTruncatedNormals),
}

impl ParamMarginals {
    /// Number of mixture components this marginal set covers.
    #[must_use]
    pub fn n_components(&self) -> usize {
        match self {
            Self::Categorical(c) => c.n_components(),
            Self::Continuous(t) => t.n_components(),
            Self::Discrete(d) => d.n_components(),
        }
    }

    fn sample(&self, component: usize, rng: &mut fastrand::Rng) -> f64 {
        match self {
            Self::Categorical(c) => c.sample(component, rng),
            Self::Continuous(t) => t.sample(component, rng),
            Self::Discrete(d) => d.sample(component, rng),
        }
    }

    fn log_pdf(&self, component: usize, x: f64) -> f64 {
        match self {
            Self::Categorical(c) => c.log_pdf(component, x),
            Self::Continuous(t) => t.log_pdf(component, x),
            Self::Discrete(d) => d.log_pdf(component, x),
        }
    }
}

/// Joint distribution over parameters, assuming independence within each
/// mixture component.
#[derive(Clone, Debug)]
pub struct ProductDistribution {
    marginals: BTreeMap<String, ParamMarginals>,
    n_components: usize,
}

impl ProductDistribution {
    /// Combines per-parameter marginals into per-component joints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySearchSpace`] for an empty marginal map and
    /// [`Error::ComponentCountMismatch`] when parameters disagree on the
    /// component count.
    pub fn new(marginals: BTreeMap<String, ParamMarginals>) -> Result<Self> {
        let Some(n_components) = marginals.values().next().map(ParamMarginals::n_components)
        else {
            return Err(Error::EmptySearchSpace);
        };
        for (name, marginal) in &marginals {
            if marginal.n_components() != n_components {
                return Err(Error::ComponentCountMismatch {
                    param: name.clone(),
                    expected: n_components,
                    got: marginal.n_components(),
                });
            }
        }
        Ok(Self {
            marginals,
            n_components,
        })
    }

    /// Number of mixture components (rows) in every marginal.
    #[must_use]
    pub fn n_components(&self) -> usize {
        self.n_components
    }
}

/// A weighted mixture of per-component joint distributions.
///
/// The last stage of estimator construction: pairs a [`ProductDistribution`]
/// with a normalized weight vector and serves the two read-only operations
/// the facade delegates to. Immutable once built.
#[derive(Clone, Debug)]
pub struct MixtureDistribution {
    weights: Vec<f64>,
    product: ProductDistribution,
}

impl MixtureDistribution {
    /// Pairs per-component joints with mixture weights.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WeightCountMismatch`] unless
    /// `weights.len() == product.n_components()`.
    pub fn new(product: ProductDistribution, weights: Vec<f64>) -> Result<Self> {
        if weights.len() != product.n_components() {
            return Err(Error::WeightCountMismatch {
                expected: product.n_components(),
                got: weights.len(),
            });
        }
        Ok(Self { weights, product })
    }

    /// The normalized mixture weights, one per component.
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Number of mixture components.
    #[must_use]
    pub fn n_components(&self) -> usize {
        self.weights.len()
    }

    /// Draws `size` joint samples in the working domain.
    ///
    /// Each draw picks one component according to the mixture weights, then
    /// samples every parameter's marginal for that component independently.
    /// Deterministic given the RNG state.
    #[must_use]
    pub fn sample(&self, rng: &mut fastrand::Rng, size: usize) -> BTreeMap<String, Vec<f64>> {
        let mut out: BTreeMap<String, Vec<f64>> = self
            .product
            .marginals
            .keys()
            .map(|name| (name.clone(), Vec::with_capacity(size)))
            .collect();
        for _ in 0..size {
            let component = rng_util::weighted_index(rng, &self.weights);
            for (name, marginal) in &self.product.marginals {
                let value = marginal.sample(component, rng);
                if let Some(column) = out.get_mut(name) {
                    column.push(value);
                }
            }
        }
        out
    }

    /// Evaluates `log(sum_i w_i * pdf_i(x))` for each query row, in the
    /// working domain.
    ///
    /// Accumulates in log space (log-sum-exp) so that small per-parameter
    /// densities never underflow to a spurious zero. Points outside a
    /// parameter's support yield `-inf`, never NaN.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingParameter`] if a query column is absent and
    /// [`Error::ObservationLengthMismatch`] if query columns disagree on
    /// length.
    pub fn log_pdf(&self, samples: &BTreeMap<String, Vec<f64>>) -> Result<Vec<f64>> {
        let n_rows = self.query_len(samples)?;
        let mut log_terms = vec![0.0; self.weights.len()];
        let mut out = Vec::with_capacity(n_rows);
        for row in 0..n_rows {
            for (component, term) in log_terms.iter_mut().enumerate() {
                let mut acc = self.weights[component].ln();
                for (name, marginal) in &self.product.marginals {
                    if acc == f64::NEG_INFINITY {
                        break;
                    }
                    acc += marginal.log_pdf(component, samples[name][row]);
                }
                *term = acc;
            }
            out.push(logsumexp(&log_terms));
        }
        Ok(out)
    }

    /// Validates query columns against the marginal set and returns the
    /// common row count.
    fn query_len(&self, samples: &BTreeMap<String, Vec<f64>>) -> Result<usize> {
        let mut n_rows: Option<usize> = None;
        for name in self.product.marginals.keys() {
            let column = samples.get(name).ok_or_else(|| Error::MissingParameter {
                name: name.clone(),
            })?;
            match n_rows {
                None => n_rows = Some(column.len()),
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
        Ok(n_rows.unwrap_or(0))
    }
}

/// Numerically stable `log(sum(exp(values)))`.
fn logsumexp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max.is_infinite() && max < 0.0 {
        return f64::NEG_INFINITY;
    }
    let sum: f64 = values.iter().map(|&v| (v - max).exp()).sum();
    max + sum.ln()
}
