//! Trait interfaces for the depth-domain transform capabilities.

use crate::kernel::{Read1D, SynthesisError, Write1D};
use nalgebra::Complex;

use alloc::vec::Vec;

/// RMSF evaluation over a probed Faraday-depth axis.
pub trait Rmsf1D {
    /// Evaluate the RMSF at each depth in `phi` into a caller-provided buffer.
    fn run_into<I, O>(&self, phi: &I, out: &mut O) -> Result<(), SynthesisError>
    where
        I: Read1D<f64> + ?Sized,
        O: Write1D<Complex<f64>> + ?Sized;

    /// Evaluate the RMSF at each depth in `phi` and allocate the output.
    fn run_alloc<I>(&self, phi: &I) -> Result<Vec<Complex<f64>>, SynthesisError>
    where
        I: Read1D<f64> + ?Sized;
}

/// Forward RM-synthesis over a probed Faraday-depth axis.
pub trait Synthesis1D {
    /// Synthesize the depth spectrum of `intensity` into a caller-provided
    /// buffer.
    fn run_into<I1, I2, O>(
        &self,
        phi: &I1,
        intensity: &I2,
        out: &mut O,
    ) -> Result<(), SynthesisError>
    where
        I1: Read1D<f64> + ?Sized,
        I2: Read1D<Complex<f64>> + ?Sized,
        O: Write1D<Complex<f64>> + ?Sized;

    /// Synthesize the depth spectrum of `intensity` and allocate the output.
    fn run_alloc<I1, I2>(
        &self,
        phi: &I1,
        intensity: &I2,
    ) -> Result<Vec<Complex<f64>>, SynthesisError>
    where
        I1: Read1D<f64> + ?Sized,
        I2: Read1D<Complex<f64>> + ?Sized;
}
