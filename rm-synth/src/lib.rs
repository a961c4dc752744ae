//! RM-synthesis: reconstruction of the Faraday rotation measure distribution
//! along a line of sight from polarized radio observations.
//!
//! Polarized intensity sampled at a set of wavelengths-squared (λ²) is related
//! to the polarization as a function of Faraday depth (φ, rad/m²) by an
//! inverse-Fourier-type transform. This crate provides:
//!
//! - [`spectral`]: frequency ↔ λ² conversion and channel-width propagation,
//! - [`synthesis`]: the RM Spread Function (RMSF) and the RM-synthesis
//!   transform over a probed Faraday-depth axis,
//! - [`cube`]: the RM-cube container holding per-pixel Faraday spectra and
//!   their calibration vectors,
//! - [`noise`]: a deterministic xorshift noise generator for synthetic test
//!   signals and error estimation,
//! - [`io`]: plain-text adapters for calibration vectors and result spectra
//!   (`std` only).
//!
//! All quantities are SI: λ² in m², Faraday depth in rad/m², frequency in Hz.
//! The phase convention is `exp(-2i·φ·λ²)` throughout.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod kernel;

#[cfg(feature = "alloc")]
pub mod spectral;

#[cfg(feature = "alloc")]
pub mod synthesis;

#[cfg(feature = "alloc")]
pub mod cube;

#[cfg(feature = "alloc")]
pub mod noise;

#[cfg(feature = "std")]
pub mod io;
