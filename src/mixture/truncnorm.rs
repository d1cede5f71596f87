//! Bounded (truncated) normal kernels, one per mixture component.
//!
//! Each numerical parameter contributes one kernel per observation: a normal
//! distribution restricted to the parameter's working-domain bounds. The
//! discretized variant additionally integrates the normal over half-step
//! cells so that probability mass lands exactly on the declared grid.
//!
//! Sampling uses inverse-CDF restriction: draw `u` uniformly between
//! `Phi(a)` and `Phi(b)` and map it back through the normal quantile, which
//! never rejects and stays exact for narrow truncation windows.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::{Error, Result};
use crate::rng_util;

/// Clamp applied to truncation CDF endpoints before inverting, keeping the
/// quantile finite.
const CDF_EPS: f64 = 1e-15;

fn standard_normal() -> Result<Normal> {
    Normal::new(0.0, 1.0).map_err(|_| Error::Internal("standard normal construction"))
}

fn validate_rows(mus: &[f64], sigmas: &[f64], low: f64, high: f64) -> Result<()> {
    if mus.len() != sigmas.len() {
        return Err(Error::ComponentCountMismatch {
            param: String::new(),
            expected: mus.len(),
            got: sigmas.len(),
        });
    }
    if !(low.is_finite() && high.is_finite() && low < high) {
        return Err(Error::InvalidBounds { low, high });
    }
    for &sigma in sigmas {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(Error::InvalidBandwidth(sigma));
        }
    }
    Ok(())
}

/// A batch of truncated normal distributions sharing one support `[low, high]`.
#[derive(Clone, Debug)]
pub struct TruncatedNormals {
    mus: Vec<f64>,
    sigmas: Vec<f64>,
    low: f64,
    high: f64,
    normal: Normal,
}

impl TruncatedNormals {
    /// Creates one truncated normal per `(mu, sigma)` row on `[low, high]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ComponentCountMismatch`] if `mus` and `sigmas` differ
    /// in length, [`Error::InvalidBounds`] unless `low < high`, and
    /// [`Error::InvalidBandwidth`] for any non-positive sigma.
    pub fn new(mus: Vec<f64>, sigmas: Vec<f64>, low: f64, high: f64) -> Result<Self> {
        validate_rows(&mus, &sigmas, low, high)?;
        Ok(Self {
            mus,
            sigmas,
            low,
            high,
            normal: standard_normal()?,
        })
    }

    pub(crate) fn n_components(&self) -> usize {
        self.mus.len()
    }

    /// Log-density of component `component` at `x`; `-inf` outside `[low, high]`.
    pub(crate) fn log_pdf(&self, component: usize, x: f64) -> f64 {
        if x < self.low || x > self.high {
            return f64::NEG_INFINITY;
        }
        let mu = self.mus[component];
        let sigma = self.sigmas[component];
        let z = (x - mu) / sigma;
        let a = (self.low - mu) / sigma;
        let b = (self.high - mu) / sigma;
        let log_2pi = (2.0 * core::f64::consts::PI).ln();
        // Truncation mass; floored so a degenerate window yields -inf, not NaN.
        let mass = (self.normal.cdf(b) - self.normal.cdf(a)).max(f64::MIN_POSITIVE);
        -0.5 * z * z - 0.5 * log_2pi - sigma.ln() - mass.ln()
    }

    /// Draws from component `component` by inverting the CDF on the
    /// truncated interval.
    pub(crate) fn sample(&self, component: usize, rng: &mut fastrand::Rng) -> f64 {
        let mu = self.mus[component];
        let sigma = self.sigmas[component];
        sample_truncated(&self.normal, mu, sigma, self.low, self.high, rng)
    }

    #[cfg(test)]
    pub(crate) fn sigmas(&self) -> &[f64] {
        &self.sigmas
    }

    #[cfg(test)]
    pub(crate) fn mus(&self) -> &[f64] {
        &self.mus
    }
}

/// A batch of truncated normals discretized onto the grid
/// `low, low + step, ..., high`.
///
/// The probability of a grid point is the normal mass of its half-step cell,
/// normalized by the mass of the half-step-widened support.
#[derive(Clone, Debug)]
pub struct DiscreteTruncatedNormals {
    mus: Vec<f64>,
    sigmas: Vec<f64>,
    low: f64,
    high: f64,
    step: f64,
    normal: Normal,
}

impl DiscreteTruncatedNormals {
    /// Creates one discretized truncated normal per `(mu, sigma)` row.
    ///
    /// # Errors
    ///
    /// As [`TruncatedNormals::new`], plus [`Error::InvalidStep`] for a
    /// non-positive step.
    pub fn new(mus: Vec<f64>, sigmas: Vec<f64>, low: f64, high: f64, step: f64) -> Result<Self> {
        validate_rows(&mus, &sigmas, low, high)?;
        if !(step.is_finite() && step > 0.0) {
            return Err(Error::InvalidStep { step });
        }
        Ok(Self {
            mus,
            sigmas,
            low,
            high,
            step,
            normal: standard_normal()?,
        })
    }

    pub(crate) fn n_components(&self) -> usize {
        self.mus.len()
    }

    /// Log-mass of the grid cell containing `x`; `-inf` outside the widened
    /// support.
    pub(crate) fn log_pdf(&self, component: usize, x: f64) -> f64 {
        let half = 0.5 * self.step;
        if x < self.low - half || x > self.high + half {
            return f64::NEG_INFINITY;
        }
        let mu = self.mus[component];
        let sigma = self.sigmas[component];
        let cell = self.normal.cdf((x + half - mu) / sigma) - self.normal.cdf((x - half - mu) / sigma);
        let total = self.normal.cdf((self.high + half - mu) / sigma)
            - self.normal.cdf((self.low - half - mu) / sigma);
        cell.max(f64::MIN_POSITIVE).ln() - total.max(f64::MIN_POSITIVE).ln()
    }

    /// Draws from component `component` on the half-step-widened interval and
    /// snaps the draw onto the grid.
    pub(crate) fn sample(&self, component: usize, rng: &mut fastrand::Rng) -> f64 {
        let mu = self.mus[component];
        let sigma = self.sigmas[component];
        let half = 0.5 * self.step;
        let raw = sample_truncated(
            &self.normal,
            mu,
            sigma,
            self.low - half,
            self.high + half,
            rng,
        );
        let snapped = ((raw - self.low) / self.step).round() * self.step + self.low;
        snapped.clamp(self.low, self.high)
    }
}

/// Inverse-CDF draw from `Normal(mu, sigma)` restricted to `[low, high]`.
fn sample_truncated(
    normal: &Normal,
    mu: f64,
    sigma: f64,
    low: f64,
    high: f64,
    rng: &mut fastrand::Rng,
) -> f64 {
    let u_lo = normal.cdf((low - mu) / sigma).clamp(CDF_EPS, 1.0 - CDF_EPS);
    let u_hi = normal.cdf((high - mu) / sigma).clamp(CDF_EPS, 1.0 - CDF_EPS);
    if u_lo >= u_hi {
        // The truncation window carries no resolvable mass; collapse to the
        // nearest in-range point.
        return mu.clamp(low, high);
    }
    let u = rng_util::f64_range(rng, u_lo, u_hi);
    (mu + sigma * normal.inverse_cdf(u)).clamp(low, high)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_pdf_is_neg_infinity_outside_support() {
        let tn = TruncatedNormals::new(vec![0.5], vec![0.3], 0.0, 1.0).unwrap();
        assert_eq!(tn.log_pdf(0, -0.1), f64::NEG_INFINITY);
        assert_eq!(tn.log_pdf(0, 1.1), f64::NEG_INFINITY);
        assert!(tn.log_pdf(0, 0.5).is_finite());
        assert!(tn.log_pdf(0, 0.0).is_finite());
        assert!(tn.log_pdf(0, 1.0).is_finite());
    }

    #[test]
    fn pdf_integrates_to_one_over_support() {
        let tn = TruncatedNormals::new(vec![0.3], vec![0.4], 0.0, 1.0).unwrap();

        // Numerical integration over the support.
        let n_points = 20_000;
        let dx = 1.0 / f64::from(n_points);
        let integral: f64 = (0..n_points)
            .map(|i| {
                let x = (f64::from(i) + 0.5) * dx;
                tn.log_pdf(0, x).exp() * dx
            })
            .sum();

        assert!(
            (integral - 1.0).abs() < 1e-3,
            "Integral = {integral}, expected ~1.0"
        );
    }

    #[test]
    fn truncation_raises_density_relative_to_untruncated_normal() {
        // With the same mu/sigma, the truncated density must exceed the plain
        // normal density inside the support because the lost tail mass is
        // renormalized in.
        let tn = TruncatedNormals::new(vec![0.5], vec![1.0], 0.0, 1.0).unwrap();
        let log_2pi = (2.0 * core::f64::consts::PI).ln();
        let plain = -0.5 * log_2pi; // N(0.5, 1) at x = 0.5
        assert!(tn.log_pdf(0, 0.5) > plain);
    }

    #[test]
    fn samples_stay_in_bounds() {
        let tn = TruncatedNormals::new(vec![0.0, 5.0], vec![2.0, 2.0], -1.0, 1.0).unwrap();
        let mut rng = fastrand::Rng::with_seed(42);
        for _ in 0..500 {
            for component in 0..2 {
                let x = tn.sample(component, &mut rng);
                assert!((-1.0..=1.0).contains(&x), "sample {x} out of bounds");
            }
        }
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn sampling_is_deterministic_for_equal_seeds() {
        let tn = TruncatedNormals::new(vec![0.5], vec![0.2], 0.0, 1.0).unwrap();
        let mut a = fastrand::Rng::with_seed(7);
        let mut b = fastrand::Rng::with_seed(7);
        for _ in 0..50 {
            assert_eq!(tn.sample(0, &mut a), tn.sample(0, &mut b));
        }
    }

    #[test]
    fn rejects_invalid_rows() {
        assert!(matches!(
            TruncatedNormals::new(vec![0.0], vec![0.1, 0.2], 0.0, 1.0),
            Err(Error::ComponentCountMismatch { .. })
        ));
        assert!(matches!(
            TruncatedNormals::new(vec![0.0], vec![0.0], 0.0, 1.0),
            Err(Error::InvalidBandwidth(_))
        ));
        assert!(matches!(
            TruncatedNormals::new(vec![0.0], vec![0.1], 1.0, 0.0),
            Err(Error::InvalidBounds { .. })
        ));
    }

    #[test]
    fn discrete_samples_land_on_grid() {
        let dtn =
            DiscreteTruncatedNormals::new(vec![2.0], vec![1.5], 0.0, 10.0, 1.0).unwrap();
        let mut rng = fastrand::Rng::with_seed(3);
        for _ in 0..500 {
            let x = dtn.sample(0, &mut rng);
            assert!((0.0..=10.0).contains(&x));
            assert!(
                (x - x.round()).abs() < 1e-12,
                "sample {x} not on the unit grid"
            );
        }
    }

    #[test]
    fn discrete_masses_sum_to_one() {
        let dtn = DiscreteTruncatedNormals::new(vec![3.0], vec![2.0], 0.0, 10.0, 1.0).unwrap();
        let total: f64 = (0..=10).map(|k| dtn.log_pdf(0, f64::from(k)).exp()).sum();
        assert!((total - 1.0).abs() < 1e-9, "total mass = {total}");
    }

    #[test]
    fn discrete_log_pdf_is_neg_infinity_outside_widened_support() {
        let dtn = DiscreteTruncatedNormals::new(vec![3.0], vec![2.0], 0.0, 10.0, 1.0).unwrap();
        assert_eq!(dtn.log_pdf(0, -1.0), f64::NEG_INFINITY);
        assert_eq!(dtn.log_pdf(0, 11.0), f64::NEG_INFINITY);
        assert!(dtn.log_pdf(0, 0.0).is_finite());
        assert!(dtn.log_pdf(0, 10.0).is_finite());
    }

    #[test]
    fn discrete_rejects_bad_step() {
        assert!(matches!(
            DiscreteTruncatedNormals::new(vec![0.0], vec![1.0], 0.0, 1.0, 0.0),
            Err(Error::InvalidStep { .. })
        ));
    }
}
