//! Smoothed categorical probability tables, one row per mixture component.

use crate::error::{Error, Result};
use crate::rng_util;

/// A batch of categorical distributions over a shared choice set.
///
/// Each row is one mixture component's probability table; rows are already
/// smoothed and normalized by the estimator's categorical builder. Values
/// travel as choice indices encoded as `f64`, matching the numeric array
/// representation used for every other parameter kind.
#[derive(Clone, Debug)]
pub struct SmoothedCategorical {
    probabilities: Vec<Vec<f64>>,
    n_choices: usize,
}

impl SmoothedCategorical {
    /// Creates a categorical batch from normalized probability rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyChoices`] for an empty table or empty rows, and
    /// [`Error::Internal`] for ragged rows.
    pub fn new(probabilities: Vec<Vec<f64>>) -> Result<Self> {
        let n_choices = probabilities.first().map_or(0, Vec::len);
        if n_choices == 0 {
            return Err(Error::EmptyChoices);
        }
        if probabilities.iter().any(|row| row.len() != n_choices) {
            return Err(Error::Internal("ragged categorical probability table"));
        }
        Ok(Self {
            probabilities,
            n_choices,
        })
    }

    pub(crate) fn n_components(&self) -> usize {
        self.probabilities.len()
    }

    /// Log-probability of choice `x` (a rounded index) under `component`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub(crate) fn log_pdf(&self, component: usize, x: f64) -> f64 {
        let index = x.round();
        if !(0.0..self.n_choices as f64).contains(&index) {
            return f64::NEG_INFINITY;
        }
        let p = self.probabilities[component][index as usize];
        if p > 0.0 {
            p.ln()
        } else {
            f64::NEG_INFINITY
        }
    }

    /// Draws a choice index from `component`'s probability row.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn sample(&self, component: usize, rng: &mut fastrand::Rng) -> f64 {
        rng_util::weighted_index(rng, &self.probabilities[component]) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_pdf_matches_table() {
        let sc = SmoothedCategorical::new(vec![vec![0.5, 0.25, 0.25]]).unwrap();
        assert!((sc.log_pdf(0, 0.0) - 0.5_f64.ln()).abs() < 1e-12);
        assert!((sc.log_pdf(0, 1.0) - 0.25_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_index_has_no_mass() {
        let sc = SmoothedCategorical::new(vec![vec![0.5, 0.5]]).unwrap();
        assert_eq!(sc.log_pdf(0, -1.0), f64::NEG_INFINITY);
        assert_eq!(sc.log_pdf(0, 2.0), f64::NEG_INFINITY);
    }

    #[test]
    fn sample_returns_valid_indices() {
        let sc = SmoothedCategorical::new(vec![vec![0.1, 0.2, 0.7]]).unwrap();
        let mut rng = fastrand::Rng::with_seed(21);
        for _ in 0..200 {
            let x = sc.sample(0, &mut rng);
            assert!(x == 0.0 || x == 1.0 || x == 2.0);
        }
    }

    #[test]
    fn rejects_empty_and_ragged_tables() {
        assert!(matches!(
            SmoothedCategorical::new(vec![]),
            Err(Error::EmptyChoices)
        ));
        assert!(matches!(
            SmoothedCategorical::new(vec![vec![1.0], vec![0.5, 0.5]]),
            Err(Error::Internal(_))
        ));
    }
}
