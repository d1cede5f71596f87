//! Bidirectional mapping between native parameter domains and the working
//! domain.
//!
//! The estimator fits and evaluates in one common continuous representation:
//! log-scaled numericals travel as `ln(x)`, everything else passes through
//! unchanged (categorical values are already choice indices). The inverse
//! direction restores native values, snapping stepped parameters back onto
//! their grid. Both construction and `log_pdf` queries go through
//! [`to_uniform`], so model and queries always live in the same domain.

use std::collections::BTreeMap;

use crate::distribution::Distribution;
use crate::error::{Error, Result};

/// Maps native-domain samples into the working domain, keyed by parameter.
///
/// # Errors
///
/// Returns [`Error::MissingParameter`] if `samples` lacks a column for any
/// search-space parameter.
pub(crate) fn to_uniform(
    samples: &BTreeMap<String, Vec<f64>>,
    search_space: &BTreeMap<String, Distribution>,
) -> Result<BTreeMap<String, Vec<f64>>> {
    let mut transformed = BTreeMap::new();
    for (name, distribution) in search_space {
        let values = samples.get(name).ok_or_else(|| Error::MissingParameter {
            name: name.clone(),
        })?;
        let column = match distribution {
            Distribution::Numerical(d) if d.log_scale => {
                values.iter().map(|&x| x.ln()).collect()
            }
            Distribution::Numerical(_) | Distribution::Categorical(_) => values.clone(),
        };
        transformed.insert(name.clone(), column);
    }
    Ok(transformed)
}

/// Maps working-domain samples back into each parameter's native domain.
///
/// Log-scaled values are exponentiated; stepped values are snapped onto
/// `low + k * step` and clipped into `[low, high]`. Input columns are the
/// estimator's own draws, so every key is a search-space parameter.
pub(crate) fn from_uniform(
    samples: &BTreeMap<String, Vec<f64>>,
    search_space: &BTreeMap<String, Distribution>,
) -> BTreeMap<String, Vec<f64>> {
    let mut restored = BTreeMap::new();
    for (name, distribution) in search_space {
        let Some(values) = samples.get(name) else {
            continue;
        };
        let column = match distribution {
            Distribution::Categorical(_) => values.clone(),
            Distribution::Numerical(d) if d.log_scale => values
                .iter()
                .map(|&x| {
                    let value = x.exp();
                    match d.step {
                        // Log-scaled grids (integer-like log parameters) are
                        // modeled unstepped; draws snap back here.
                        Some(step) => snap_to_grid(value, d.low, d.high, step),
                        None => value,
                    }
                })
                .collect(),
            Distribution::Numerical(d) => match d.step {
                Some(step) => values
                    .iter()
                    .map(|&x| snap_to_grid(x, d.low, d.high, step))
                    .collect(),
                None => values.clone(),
            },
        };
        restored.insert(name.clone(), column);
    }
    restored
}

/// Rounds `x` onto the nearest grid point and clips into `[low, high]`.
fn snap_to_grid(x: f64, low: f64, high: f64, step: f64) -> f64 {
    (((x - low) / step).round() * step + low).clamp(low, high)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::{CategoricalDistribution, NumericalDistribution};

    fn space(entries: Vec<(&str, Distribution)>) -> BTreeMap<String, Distribution> {
        entries
            .into_iter()
            .map(|(name, dist)| (name.to_string(), dist))
            .collect()
    }

    fn columns(entries: Vec<(&str, Vec<f64>)>) -> BTreeMap<String, Vec<f64>> {
        entries
            .into_iter()
            .map(|(name, values)| (name.to_string(), values))
            .collect()
    }

    #[test]
    fn plain_numerical_round_trips_exactly() {
        let search_space = space(vec![(
            "x",
            Distribution::Numerical(NumericalDistribution::new(-5.0, 5.0).unwrap()),
        )]);
        let samples = columns(vec![("x", vec![-4.2, 0.0, 3.7])]);
        let forward = to_uniform(&samples, &search_space).unwrap();
        assert_eq!(forward["x"], samples["x"]);
        let back = from_uniform(&forward, &search_space);
        assert_eq!(back["x"], samples["x"]);
    }

    #[test]
    fn log_numerical_round_trips_within_tolerance() {
        let search_space = space(vec![(
            "lr",
            Distribution::Numerical(
                NumericalDistribution::new(1e-5, 1e-1).unwrap().log_scale().unwrap(),
            ),
        )]);
        let samples = columns(vec![("lr", vec![1e-4, 3e-3, 5e-2])]);
        let forward = to_uniform(&samples, &search_space).unwrap();
        assert!((forward["lr"][0] - (1e-4_f64).ln()).abs() < 1e-12);
        let back = from_uniform(&forward, &search_space);
        for (original, restored) in samples["lr"].iter().zip(&back["lr"]) {
            assert!((original - restored).abs() / original < 1e-12);
        }
    }

    #[test]
    fn stepped_numerical_snaps_to_grid_and_clips() {
        let search_space = space(vec![(
            "n",
            Distribution::Numerical(
                NumericalDistribution::new(0.0, 10.0).unwrap().step(2.0).unwrap(),
            ),
        )]);
        let samples = columns(vec![("n", vec![0.9, 5.1, 11.4, -3.0])]);
        let back = from_uniform(&samples, &search_space);
        assert_eq!(back["n"], vec![0.0, 6.0, 10.0, 0.0]);
    }

    #[test]
    fn log_stepped_numerical_lands_on_grid() {
        let search_space = space(vec![(
            "k",
            Distribution::Numerical(
                NumericalDistribution::new(1.0, 64.0)
                    .unwrap()
                    .step(1.0)
                    .unwrap()
                    .log_scale()
                    .unwrap(),
            ),
        )]);
        let samples = columns(vec![("k", vec![2.5_f64.ln(), 63.9_f64.ln(), 100.0_f64.ln()])]);
        let back = from_uniform(&samples, &search_space);
        for &v in &back["k"] {
            assert!((1.0..=64.0).contains(&v));
            assert!((v - v.round()).abs() < 1e-12, "{v} not on the unit grid");
        }
    }

    #[test]
    fn categorical_passes_through_unchanged() {
        let search_space = space(vec![(
            "c",
            Distribution::Categorical(CategoricalDistribution::new(3).unwrap()),
        )]);
        let samples = columns(vec![("c", vec![0.0, 2.0, 1.0])]);
        let forward = to_uniform(&samples, &search_space).unwrap();
        assert_eq!(forward["c"], samples["c"]);
        let back = from_uniform(&forward, &search_space);
        assert_eq!(back["c"], samples["c"]);
    }

    #[test]
    fn missing_column_is_reported() {
        let search_space = space(vec![(
            "x",
            Distribution::Numerical(NumericalDistribution::new(0.0, 1.0).unwrap()),
        )]);
        let samples = columns(vec![("y", vec![0.5])]);
        assert!(matches!(
            to_uniform(&samples, &search_space),
            Err(Error::MissingParameter { .. })
        ));
    }
}
