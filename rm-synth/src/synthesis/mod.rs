//! RM-synthesis: the RMSF and the λ² → Faraday-depth transform.
//!
//! The discrete RM-synthesis sum reconstructs the complex polarization at a
//! probed Faraday depth φ from weighted λ²-domain samples:
//!
//! `P(φ) = (Σ wᵢ)⁻¹ · Σ wᵢ · Pᵢ · exp(-2i·φ·λ²ᵢ)`
//!
//! The RM Spread Function (RMSF) is the same sum with unit intensities; it is
//! a function of the sampling geometry alone and characterizes the
//! instrumental response in Faraday-depth space. Both kernels are immutable
//! once constructed, so one kernel serves every pixel sharing an observation
//! geometry; per-pixel parallel callers may share them freely as long as each
//! worker writes only its own output spectrum.

use crate::kernel::{ConfigError, KernelLifecycle, SynthesisError};
use crate::spectral;
use nalgebra::Complex;

use alloc::vec;
use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use num_traits::Float;

mod kernels;
mod traits;

pub use kernels::*;
pub use traits::*;

/// Constructor config for [`SamplingSet`].
///
/// `lambda_sq` is mandatory; all other vectors are optional but must match
/// its length when present.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SamplingConfig {
    /// Wavelengths squared per channel (m²).
    pub lambda_sq: Vec<f64>,
    /// λ²-space bin widths (m²).
    pub delta_lambda_sq: Option<Vec<f64>>,
    /// Per-channel weights; defaults to 1.0 everywhere when unset.
    pub weights: Option<Vec<f64>>,
    /// Channel frequencies (Hz), retained for callers that need them.
    pub frequency: Option<Vec<f64>>,
    /// Channel frequency widths (Hz).
    pub delta_frequency: Option<Vec<f64>>,
}

/// The λ² sampling pattern of one observation.
///
/// Built once by a loader, read-only thereafter; replacing any vector means
/// constructing a new set. Invariants, enforced at construction:
///
/// - `lambda_sq` is non-empty and every populated vector matches its length,
/// - weights are non-negative,
/// - Δλ² values are positive, except possibly the final boundary element.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingSet {
    lambda_sq: Vec<f64>,
    delta_lambda_sq: Option<Vec<f64>>,
    weights: Option<Vec<f64>>,
    frequency: Option<Vec<f64>>,
    delta_frequency: Option<Vec<f64>>,
}

impl KernelLifecycle for SamplingSet {
    type Config = SamplingConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        let n = config.lambda_sq.len();
        if n == 0 {
            return Err(ConfigError::EmptyInput { arg: "lambda_sq" });
        }

        let check_len = |arg: &'static str, v: &Option<Vec<f64>>| -> Result<(), ConfigError> {
            match v {
                Some(v) if v.len() != n => Err(ConfigError::SizeMismatch {
                    arg,
                    expected: n,
                    got: v.len(),
                }),
                _ => Ok(()),
            }
        };
        check_len("delta_lambda_sq", &config.delta_lambda_sq)?;
        check_len("weights", &config.weights)?;
        check_len("frequency", &config.frequency)?;
        check_len("delta_frequency", &config.delta_frequency)?;

        if let Some(weights) = &config.weights {
            if weights.iter().any(|w| *w < 0.0) {
                return Err(ConfigError::InvalidConfiguration {
                    arg: "weights",
                    reason: "weights must be non-negative",
                });
            }
        }
        if let Some(deltas) = &config.delta_lambda_sq {
            // The final boundary bin may be degenerate; all others must be
            // strictly positive.
            if deltas[..n - 1].iter().any(|d| *d <= 0.0) {
                return Err(ConfigError::InvalidConfiguration {
                    arg: "delta_lambda_sq",
                    reason: "bin widths must be positive",
                });
            }
        }

        Ok(Self {
            lambda_sq: config.lambda_sq,
            delta_lambda_sq: config.delta_lambda_sq,
            weights: config.weights,
            frequency: config.frequency,
            delta_frequency: config.delta_frequency,
        })
    }
}

impl SamplingSet {
    /// Build a sampling set from λ² values alone, with unit weights.
    pub fn from_lambda_sq(lambda_sq: Vec<f64>) -> Result<Self, ConfigError> {
        Self::try_new(SamplingConfig {
            lambda_sq,
            ..SamplingConfig::default()
        })
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.lambda_sq.len()
    }

    /// Whether the set holds no channels. Always false for a constructed set.
    pub fn is_empty(&self) -> bool {
        self.lambda_sq.is_empty()
    }

    /// Wavelengths squared per channel (m²).
    pub fn lambda_sq(&self) -> &[f64] {
        &self.lambda_sq
    }

    /// λ²-space bin widths, when attached.
    pub fn delta_lambda_sq(&self) -> Option<&[f64]> {
        self.delta_lambda_sq.as_deref()
    }

    /// Per-channel weights, when attached.
    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    /// Channel frequencies (Hz), when attached.
    pub fn frequency(&self) -> Option<&[f64]> {
        self.frequency.as_deref()
    }

    /// Channel frequency widths (Hz), when attached.
    pub fn delta_frequency(&self) -> Option<&[f64]> {
        self.delta_frequency.as_deref()
    }

    /// Effective weight of channel `i`: the attached weight, or 1.0.
    pub fn weight_at(&self, i: usize) -> f64 {
        self.weights.as_ref().map_or(1.0, |w| w[i])
    }

    /// Sum of effective weights.
    pub fn weight_sum(&self) -> f64 {
        match &self.weights {
            Some(w) => w.iter().sum(),
            None => self.lambda_sq.len() as f64,
        }
    }

    /// A copy of this set with the weight vector replaced.
    ///
    /// `None` restores the implicit unit weighting. The original set is left
    /// untouched on validation failure.
    pub fn with_weights(&self, weights: Option<Vec<f64>>) -> Result<Self, ConfigError> {
        Self::try_new(SamplingConfig {
            lambda_sq: self.lambda_sq.clone(),
            delta_lambda_sq: self.delta_lambda_sq.clone(),
            weights,
            frequency: self.frequency.clone(),
            delta_frequency: self.delta_frequency.clone(),
        })
    }
}

/// The ordered axis of probed Faraday depths (rad/m²).
#[derive(Debug, Clone, PartialEq)]
pub struct FaradayAxis {
    depths: Vec<f64>,
}

impl FaradayAxis {
    /// Build a regular axis `low + k·step` for `k = 0..M-1`.
    ///
    /// `high - low` must be an exact multiple of `step` (modulo test);
    /// a fractional remainder fails with
    /// [`ConfigError::InvalidConfiguration`].
    pub fn from_range(low: f64, high: f64, step: f64) -> Result<Self, ConfigError> {
        if step <= 0.0 {
            return Err(ConfigError::InvalidConfiguration {
                arg: "step",
                reason: "step must be positive",
            });
        }
        let extent = high - low;
        if extent <= 0.0 {
            return Err(ConfigError::InvalidConfiguration {
                arg: "high",
                reason: "high must exceed low",
            });
        }
        if extent % step != 0.0 {
            return Err(ConfigError::InvalidConfiguration {
                arg: "step",
                reason: "extent must be an integral multiple of step",
            });
        }
        let steps = (extent / step) as usize;
        let depths = (0..steps).map(|k| low + k as f64 * step).collect();
        Ok(Self { depths })
    }

    /// Build an axis from explicitly supplied depths.
    pub fn from_depths(depths: Vec<f64>) -> Result<Self, ConfigError> {
        if depths.is_empty() {
            return Err(ConfigError::EmptyInput { arg: "depths" });
        }
        Ok(Self { depths })
    }

    /// Number of probed depths.
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    /// Whether the axis is empty. Always false for a constructed axis.
    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    /// The probed depths (rad/m²).
    pub fn depths(&self) -> &[f64] {
        &self.depths
    }
}

/// Compute the RMSF of `sampling` over the probed `axis`.
///
/// One RMSF per observation geometry suffices; reuse it for every pixel
/// sharing that geometry.
pub fn compute_rmsf(
    axis: &FaradayAxis,
    sampling: &SamplingSet,
) -> Result<Vec<Complex<f64>>, SynthesisError> {
    let kernel = RmsfKernel::try_new(RmsfConfig {
        sampling: sampling.clone(),
    })?;
    kernel.run_alloc(axis.depths())
}

/// Run the forward RM-synthesis transform over the probed `axis`.
///
/// `intensity` holds complex polarized intensities in λ² order; its length
/// must match the sampling set.
pub fn synthesize(
    axis: &FaradayAxis,
    intensity: &[Complex<f64>],
    sampling: &SamplingSet,
) -> Result<Vec<Complex<f64>>, SynthesisError> {
    let kernel = SynthesisKernel::try_new(SynthesisConfig {
        sampling: sampling.clone(),
    })?;
    kernel.run_alloc(axis.depths(), intensity)
}

/// Run RM-synthesis on frequency-domain samples.
///
/// Converts `frequency` (Hz) through [`spectral::frequency_to_lambda_sq`]
/// before synthesis; the transform itself always operates in λ² space.
pub fn synthesize_from_frequencies(
    axis: &FaradayAxis,
    intensity: &[Complex<f64>],
    frequency: &[f64],
    weights: Option<Vec<f64>>,
) -> Result<Vec<Complex<f64>>, SynthesisError> {
    let lambda_sq = spectral::frequency_to_lambda_sq(frequency)?;
    let sampling = SamplingSet::try_new(SamplingConfig {
        lambda_sq,
        weights,
        ..SamplingConfig::default()
    })?;
    synthesize(axis, intensity, &sampling)
}

/// Named per-depth uncertainty estimators.
///
/// A closed extension point: callers select the statistical method by name,
/// the transform core fixes only the interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorEstimator {
    /// Linear propagation of per-channel noise through the weighted sum.
    LeastSquares,
}

impl ErrorEstimator {
    /// Estimate the 1σ uncertainty of the synthesized polarization at each
    /// probed depth, given per-channel noise levels `channel_sigma`.
    ///
    /// The synthesis sum is linear in the intensities, so least-squares
    /// propagation gives `σ(φ) = sqrt(Σ (wᵢ·σᵢ)²) / Σ wᵢ`, independent of φ;
    /// the estimate is returned per depth for interface stability.
    pub fn estimate(
        &self,
        axis: &FaradayAxis,
        sampling: &SamplingSet,
        channel_sigma: &[f64],
    ) -> Result<Vec<f64>, SynthesisError> {
        if channel_sigma.len() != sampling.len() {
            return Err(SynthesisError::SizeMismatch {
                arg: "channel_sigma",
                expected: sampling.len(),
                got: channel_sigma.len(),
            });
        }
        let weight_sum = sampling.weight_sum();
        if weight_sum <= 0.0 {
            return Err(SynthesisError::InvalidState {
                reason: "total weight must be positive",
            });
        }
        match self {
            ErrorEstimator::LeastSquares => {
                let var: f64 = channel_sigma
                    .iter()
                    .enumerate()
                    .map(|(i, sigma)| {
                        let ws = sampling.weight_at(i) * sigma;
                        ws * ws
                    })
                    .sum();
                let sigma_phi = var.sqrt() / weight_sum;
                Ok(vec![sigma_phi; axis.len()])
            }
        }
    }
}
