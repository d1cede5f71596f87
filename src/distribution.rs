//! Search-space entry types.
//!
//! A search space maps parameter names to [`Distribution`] entries. Numerical
//! entries carry bounds, an optional discretization step, and a log-scale
//! flag; categorical entries carry the number of choices. The estimator
//! dispatches on the [`Distribution`] sum type exhaustively, so adding a new
//! kind of entry is a compile-visible change.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tolerance for checking that a step evenly subdivides `[low, high]`.
const STEP_FIT_TOLERANCE: f64 = 1e-9;

/// A bounded numerical search-space entry.
///
/// Covers both continuous and integer-like parameters: an integer parameter is
/// expressed as a stepped numerical entry (`step = 1.0`). With `log_scale`
/// the estimator works on `ln(x)` internally and maps samples back through
/// `exp`.
///
/// # Examples
///
/// ```
/// use parzen::NumericalDistribution;
///
/// // A continuous parameter on [-5, 5].
/// let x = NumericalDistribution::new(-5.0, 5.0).unwrap();
///
/// // An integer-like parameter on {1, 2, ..., 10}.
/// let n = NumericalDistribution::new(1.0, 10.0).unwrap().step(1.0).unwrap();
///
/// // A learning-rate style parameter sampled in log space.
/// let lr = NumericalDistribution::new(1e-5, 1e-1).unwrap().log_scale().unwrap();
/// assert!(lr.log_scale);
/// assert!(n.step.is_some());
/// assert!(x.step.is_none());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NumericalDistribution {
    /// Lower bound (inclusive).
    pub low: f64,
    /// Upper bound (inclusive).
    pub high: f64,
    /// Optional step size; when set it must evenly subdivide `[low, high]`.
    pub step: Option<f64>,
    /// Whether the parameter is modeled in log space.
    pub log_scale: bool,
}

impl NumericalDistribution {
    /// Creates a continuous numerical entry on `[low, high]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBounds`] unless `low < high` and both bounds
    /// are finite.
    pub fn new(low: f64, high: f64) -> Result<Self> {
        if !(low.is_finite() && high.is_finite() && low < high) {
            return Err(Error::InvalidBounds { low, high });
        }
        Ok(Self {
            low,
            high,
            step: None,
            log_scale: false,
        })
    }

    /// Discretizes the entry onto the grid `low, low + step, ..., high`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStep`] if `step` is not positive or does not
    /// evenly subdivide `[low, high]`.
    pub fn step(mut self, step: f64) -> Result<Self> {
        if !(step.is_finite() && step > 0.0) {
            return Err(Error::InvalidStep { step });
        }
        let spans = (self.high - self.low) / step;
        if (spans - spans.round()).abs() > STEP_FIT_TOLERANCE * spans.max(1.0) {
            return Err(Error::InvalidStep { step });
        }
        self.step = Some(step);
        Ok(self)
    }

    /// Switches the entry to log-space modeling.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLogBounds`] if `low` is not positive.
    pub fn log_scale(mut self) -> Result<Self> {
        if self.low <= 0.0 {
            return Err(Error::InvalidLogBounds);
        }
        self.log_scale = true;
        Ok(self)
    }
}

/// A categorical search-space entry.
///
/// Observations and samples for a categorical parameter are choice indices in
/// `0..n_choices`, stored as floats so that all parameters share one numeric
/// array representation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CategoricalDistribution {
    /// Number of choices available.
    pub n_choices: usize,
}

impl CategoricalDistribution {
    /// Creates a categorical entry with `n_choices` choices.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyChoices`] if `n_choices` is zero.
    pub fn new(n_choices: usize) -> Result<Self> {
        if n_choices == 0 {
            return Err(Error::EmptyChoices);
        }
        Ok(Self { n_choices })
    }
}

/// Enum wrapping all search-space entry types.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Distribution {
    /// A bounded numerical entry.
    Numerical(NumericalDistribution),
    /// A categorical entry.
    Categorical(CategoricalDistribution),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted_bounds() {
        assert!(matches!(
            NumericalDistribution::new(1.0, 1.0),
            Err(Error::InvalidBounds { .. })
        ));
        assert!(matches!(
            NumericalDistribution::new(2.0, -2.0),
            Err(Error::InvalidBounds { .. })
        ));
    }

    #[test]
    fn rejects_non_finite_bounds() {
        assert!(NumericalDistribution::new(f64::NEG_INFINITY, 0.0).is_err());
        assert!(NumericalDistribution::new(0.0, f64::NAN).is_err());
    }

    #[test]
    fn rejects_step_that_does_not_fit() {
        let base = NumericalDistribution::new(0.0, 1.0).unwrap();
        assert!(matches!(
            base.clone().step(0.3),
            Err(Error::InvalidStep { .. })
        ));
        assert!(matches!(
            base.clone().step(-0.5),
            Err(Error::InvalidStep { .. })
        ));
        assert!(base.step(0.25).is_ok());
    }

    #[test]
    fn rejects_log_scale_with_non_positive_low() {
        let base = NumericalDistribution::new(-1.0, 1.0).unwrap();
        assert!(matches!(base.log_scale(), Err(Error::InvalidLogBounds)));

        let ok = NumericalDistribution::new(1e-3, 1e3).unwrap().log_scale();
        assert!(ok.is_ok());
    }

    #[test]
    fn rejects_empty_choices() {
        assert!(matches!(
            CategoricalDistribution::new(0),
            Err(Error::EmptyChoices)
        ));
        assert_eq!(CategoricalDistribution::new(3).unwrap().n_choices, 3);
    }
}
