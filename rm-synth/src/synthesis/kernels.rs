//! Trait-first kernels for RMSF evaluation and forward synthesis.

use super::traits::{Rmsf1D, Synthesis1D};
use super::SamplingSet;
use crate::kernel::{ConfigError, KernelLifecycle, Read1D, SynthesisError, Write1D};
use nalgebra::Complex;

use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use num_traits::Float;

/// Constructor config for [`RmsfKernel`].
#[derive(Debug, Clone, PartialEq)]
pub struct RmsfConfig {
    /// The λ² sampling pattern to characterize.
    pub sampling: SamplingSet,
}

/// RMSF kernel: the instrumental response in Faraday-depth space.
///
/// `RMSF(φ) = (Σ wᵢ)⁻¹ · Σ wᵢ · exp(-2i·φ·λ²ᵢ)`
#[derive(Debug, Clone, PartialEq)]
pub struct RmsfKernel {
    sampling: SamplingSet,
    norm: f64,
}

impl RmsfKernel {
    /// The sampling pattern this kernel characterizes.
    pub fn sampling(&self) -> &SamplingSet {
        &self.sampling
    }

    /// Evaluate the RMSF at one probed depth.
    pub fn response_at(&self, phi: f64) -> Complex<f64> {
        let mut re = 0.0;
        let mut im = 0.0;
        for (i, lambda_sq) in self.sampling.lambda_sq().iter().enumerate() {
            let w = self.sampling.weight_at(i);
            let angle = -2.0 * phi * lambda_sq;
            re += w * angle.cos();
            im += w * angle.sin();
        }
        Complex::new(re * self.norm, im * self.norm)
    }
}

impl KernelLifecycle for RmsfKernel {
    type Config = RmsfConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        let weight_sum = config.sampling.weight_sum();
        if weight_sum <= 0.0 {
            return Err(ConfigError::InvalidConfiguration {
                arg: "weights",
                reason: "total weight must be positive",
            });
        }
        Ok(Self {
            sampling: config.sampling,
            norm: 1.0 / weight_sum,
        })
    }
}

impl Rmsf1D for RmsfKernel {
    fn run_into<I, O>(&self, phi: &I, out: &mut O) -> Result<(), SynthesisError>
    where
        I: Read1D<f64> + ?Sized,
        O: Write1D<Complex<f64>> + ?Sized,
    {
        let phi = phi.read_slice().map_err(SynthesisError::from)?;
        let out = out.write_slice_mut().map_err(SynthesisError::from)?;
        if out.len() != phi.len() {
            return Err(SynthesisError::SizeMismatch {
                arg: "out",
                expected: phi.len(),
                got: out.len(),
            });
        }
        for (slot, depth) in out.iter_mut().zip(phi.iter()) {
            *slot = self.response_at(*depth);
        }
        Ok(())
    }

    fn run_alloc<I>(&self, phi: &I) -> Result<Vec<Complex<f64>>, SynthesisError>
    where
        I: Read1D<f64> + ?Sized,
    {
        let phi = phi.read_slice().map_err(SynthesisError::from)?;
        Ok(phi.iter().map(|depth| self.response_at(*depth)).collect())
    }
}

/// Constructor config for [`SynthesisKernel`].
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisConfig {
    /// The λ² sampling pattern of the observed intensities.
    pub sampling: SamplingSet,
}

/// Forward RM-synthesis kernel.
///
/// `P(φ) = (Σ wᵢ)⁻¹ · Σ wᵢ · Pᵢ · exp(-2i·φ·λ²ᵢ)`
///
/// Operates only in λ² space; frequency-domain callers convert through
/// [`crate::spectral`] first.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisKernel {
    sampling: SamplingSet,
    norm: f64,
}

impl SynthesisKernel {
    /// The sampling pattern of the observed intensities.
    pub fn sampling(&self) -> &SamplingSet {
        &self.sampling
    }

    fn spectrum_at(&self, phi: f64, intensity: &[Complex<f64>]) -> Complex<f64> {
        let mut re = 0.0;
        let mut im = 0.0;
        for (i, lambda_sq) in self.sampling.lambda_sq().iter().enumerate() {
            let w = self.sampling.weight_at(i);
            let angle = -2.0 * phi * lambda_sq;
            let (c, s) = (angle.cos(), angle.sin());
            let p = intensity[i];
            re += w * (p.re * c - p.im * s);
            im += w * (p.re * s + p.im * c);
        }
        Complex::new(re * self.norm, im * self.norm)
    }

    fn check_intensity(&self, intensity: &[Complex<f64>]) -> Result<(), SynthesisError> {
        if intensity.len() != self.sampling.len() {
            return Err(SynthesisError::SizeMismatch {
                arg: "intensity",
                expected: self.sampling.len(),
                got: intensity.len(),
            });
        }
        Ok(())
    }
}

impl KernelLifecycle for SynthesisKernel {
    type Config = SynthesisConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        let weight_sum = config.sampling.weight_sum();
        if weight_sum <= 0.0 {
            return Err(ConfigError::InvalidConfiguration {
                arg: "weights",
                reason: "total weight must be positive",
            });
        }
        Ok(Self {
            sampling: config.sampling,
            norm: 1.0 / weight_sum,
        })
    }
}

impl Synthesis1D for SynthesisKernel {
    fn run_into<I1, I2, O>(
        &self,
        phi: &I1,
        intensity: &I2,
        out: &mut O,
    ) -> Result<(), SynthesisError>
    where
        I1: Read1D<f64> + ?Sized,
        I2: Read1D<Complex<f64>> + ?Sized,
        O: Write1D<Complex<f64>> + ?Sized,
    {
        let phi = phi.read_slice().map_err(SynthesisError::from)?;
        let intensity = intensity.read_slice().map_err(SynthesisError::from)?;
        self.check_intensity(intensity)?;
        let out = out.write_slice_mut().map_err(SynthesisError::from)?;
        if out.len() != phi.len() {
            return Err(SynthesisError::SizeMismatch {
                arg: "out",
                expected: phi.len(),
                got: out.len(),
            });
        }
        for (slot, depth) in out.iter_mut().zip(phi.iter()) {
            *slot = self.spectrum_at(*depth, intensity);
        }
        Ok(())
    }

    fn run_alloc<I1, I2>(
        &self,
        phi: &I1,
        intensity: &I2,
    ) -> Result<Vec<Complex<f64>>, SynthesisError>
    where
        I1: Read1D<f64> + ?Sized,
        I2: Read1D<Complex<f64>> + ?Sized,
    {
        let phi = phi.read_slice().map_err(SynthesisError::from)?;
        let intensity = intensity.read_slice().map_err(SynthesisError::from)?;
        self.check_intensity(intensity)?;
        Ok(phi
            .iter()
            .map(|depth| self.spectrum_at(*depth, intensity))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesis::SamplingConfig;
    use approx::assert_abs_diff_eq;

    fn sampling(lambda_sq: &[f64], weights: Option<Vec<f64>>) -> SamplingSet {
        SamplingSet::try_new(SamplingConfig {
            lambda_sq: lambda_sq.to_vec(),
            weights,
            ..SamplingConfig::default()
        })
        .expect("valid sampling")
    }

    #[test]
    fn rmsf_is_unity_at_zero_depth() {
        let kernel = RmsfKernel::try_new(RmsfConfig {
            sampling: sampling(&[0.04, 0.05, 0.06, 0.07], None),
        })
        .expect("kernel");
        let response = kernel.response_at(0.0);
        assert_abs_diff_eq!(response.re, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(response.im, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn rmsf_magnitude_is_symmetric_for_symmetric_sampling() {
        // Sampling symmetric about its mean: |RMSF(phi)| = |RMSF(-phi)|.
        let kernel = RmsfKernel::try_new(RmsfConfig {
            sampling: sampling(&[0.03, 0.04, 0.05, 0.06, 0.07], None),
        })
        .expect("kernel");
        for phi in [1.0, 7.5, 42.0, 113.0] {
            let pos = kernel.response_at(phi).norm();
            let neg = kernel.response_at(-phi).norm();
            assert_abs_diff_eq!(pos, neg, epsilon = 1e-12);
        }
    }

    #[test]
    fn rmsf_weighting_downweights_channels() {
        // A fully flagged channel must not contribute: the weighted RMSF over
        // {l0, l1} with w = {1, 0} equals the unweighted RMSF over {l0}.
        let weighted = RmsfKernel::try_new(RmsfConfig {
            sampling: sampling(&[0.04, 0.09], Some(vec![1.0, 0.0])),
        })
        .expect("kernel");
        let reference = RmsfKernel::try_new(RmsfConfig {
            sampling: sampling(&[0.04], None),
        })
        .expect("kernel");
        let a = weighted.response_at(25.0);
        let b = reference.response_at(25.0);
        assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-12);
        assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-12);
    }

    #[test]
    fn zero_total_weight_is_rejected() {
        let err = RmsfKernel::try_new(RmsfConfig {
            sampling: sampling(&[0.04, 0.09], Some(vec![0.0, 0.0])),
        })
        .expect_err("zero weight sum");
        assert!(matches!(err, ConfigError::InvalidConfiguration { arg: "weights", .. }));
    }

    #[test]
    fn rmsf_run_into_checks_output_length() {
        let kernel = RmsfKernel::try_new(RmsfConfig {
            sampling: sampling(&[0.04, 0.05], None),
        })
        .expect("kernel");
        let phi = [0.0, 10.0, 20.0];
        let mut out = vec![Complex::new(0.0, 0.0); 2];
        let err = kernel
            .run_into(&phi, &mut out)
            .expect_err("short output buffer");
        assert!(matches!(err, SynthesisError::SizeMismatch { arg: "out", .. }));
    }

    #[test]
    fn synthesis_rejects_mismatched_intensity() {
        let kernel = SynthesisKernel::try_new(SynthesisConfig {
            sampling: sampling(&[1.0, 2.0, 3.0, 4.0], None),
        })
        .expect("kernel");
        let phi = [0.0];
        let intensity = vec![Complex::new(1.0, 0.0); 3];
        let err = kernel
            .run_alloc(&phi, &intensity)
            .expect_err("intensity shorter than sampling");
        assert_eq!(
            err,
            SynthesisError::SizeMismatch {
                arg: "intensity",
                expected: 4,
                got: 3,
            }
        );
    }

    #[test]
    fn synthesis_recovers_faraday_screen_phase() {
        // A thin Faraday screen at depth phi0 produces P_i = exp(2i*phi0*l_i);
        // the synthesized spectrum must peak with unit amplitude at phi0.
        let lambda_sq = [0.04, 0.045, 0.05, 0.055, 0.06];
        let phi0 = 30.0;
        let intensity: Vec<Complex<f64>> = lambda_sq
            .iter()
            .map(|l| {
                let angle: f64 = 2.0 * phi0 * l;
                Complex::new(angle.cos(), angle.sin())
            })
            .collect();
        let kernel = SynthesisKernel::try_new(SynthesisConfig {
            sampling: sampling(&lambda_sq, None),
        })
        .expect("kernel");
        let spectrum = kernel.run_alloc(&[phi0], &intensity).expect("synthesis");
        assert_abs_diff_eq!(spectrum[0].re, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(spectrum[0].im, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn synthesis_run_into_writes_caller_buffer() {
        let kernel = SynthesisKernel::try_new(SynthesisConfig {
            sampling: sampling(&[1.0, 2.0], None),
        })
        .expect("kernel");
        let phi = [0.0, 1.0];
        let intensity = [Complex::new(1.0, 0.0), Complex::new(1.0, 0.0)];
        let mut out = vec![Complex::new(0.0, 0.0); 2];
        kernel
            .run_into(&phi, &intensity, &mut out)
            .expect("synthesis into buffer");
        assert_abs_diff_eq!(out[0].re, 1.0, epsilon = 1e-12);
    }
}
