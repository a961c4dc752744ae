//! Frequency ↔ wavelength-squared conversion.
//!
//! Faraday-depth synthesis operates in λ² space, while observations are
//! usually recorded per frequency channel. These helpers map channel
//! frequencies and channel widths into λ² and Δλ² vectors satisfying the
//! [`SamplingSet`](crate::synthesis::SamplingSet) invariants.

use crate::kernel::ConfigError;

use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use num_traits::Float;

/// Squared speed of light, SI (m²/s²).
pub const SPEED_OF_LIGHT_SQ: f64 = 89875517873681764.0;

/// Convert channel frequencies (Hz) to wavelengths squared (m²).
///
/// `lambda_sq[i] = c² / freq[i]²`.
pub fn frequency_to_lambda_sq(frequency: &[f64]) -> Result<Vec<f64>, ConfigError> {
    if frequency.is_empty() {
        return Err(ConfigError::EmptyInput { arg: "frequency" });
    }
    Ok(frequency
        .iter()
        .map(|f| SPEED_OF_LIGHT_SQ / (f * f))
        .collect())
}

/// Convert wavelengths squared (m²) back to channel frequencies (Hz).
///
/// `freq[i] = sqrt(c² / lambda_sq[i])`.
pub fn lambda_sq_to_frequency(lambda_sq: &[f64]) -> Result<Vec<f64>, ConfigError> {
    if lambda_sq.is_empty() {
        return Err(ConfigError::EmptyInput { arg: "lambda_sq" });
    }
    Ok(lambda_sq
        .iter()
        .map(|l| (SPEED_OF_LIGHT_SQ / l).sqrt())
        .collect())
}

/// Propagate per-channel bounds into λ²-space bin widths Δλ².
///
/// With `as_frequency` set, `low` and `high` are the lower and upper frequency
/// bounds of each channel. λ² is inversely related to frequency, so the lower
/// frequency bound maps to the numerically larger λ²; the returned width is
/// `lambda_sq(low[i]) - lambda_sq(high[i])`, which is positive whenever
/// `high[i] > low[i] > 0`.
///
/// With `as_frequency` unset, `low` and `high` are already λ² bounds and the
/// width is `high[i] - low[i]`.
pub fn channel_width_to_lambda_sq(
    low: &[f64],
    high: &[f64],
    as_frequency: bool,
) -> Result<Vec<f64>, ConfigError> {
    if low.is_empty() {
        return Err(ConfigError::EmptyInput { arg: "low" });
    }
    if high.is_empty() {
        return Err(ConfigError::EmptyInput { arg: "high" });
    }
    if low.len() != high.len() {
        return Err(ConfigError::SizeMismatch {
            arg: "high",
            expected: low.len(),
            got: high.len(),
        });
    }

    if as_frequency {
        let lambda_upper = frequency_to_lambda_sq(low)?;
        let lambda_lower = frequency_to_lambda_sq(high)?;
        Ok(lambda_upper
            .iter()
            .zip(lambda_lower.iter())
            .map(|(u, l)| u - l)
            .collect())
    } else {
        Ok(high.iter().zip(low.iter()).map(|(h, l)| h - l).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn frequency_round_trip() {
        let freqs = [120.0e6, 610.0e6, 1.4e9, 8.4e9];
        let lambda_sq = frequency_to_lambda_sq(&freqs).expect("conversion");
        let back = lambda_sq_to_frequency(&lambda_sq).expect("inverse conversion");
        for (f, b) in freqs.iter().zip(back.iter()) {
            assert_relative_eq!(*f, *b, max_relative = 1e-12);
        }
    }

    #[test]
    fn lambda_sq_at_reference_frequency() {
        // 21 cm line: lambda^2 = (c / 1.420 GHz)^2
        let lambda_sq = frequency_to_lambda_sq(&[1.420e9]).expect("conversion");
        let lambda = lambda_sq[0].sqrt();
        assert_relative_eq!(lambda, 0.2111, max_relative = 1e-3);
    }

    #[test]
    fn empty_inputs_are_rejected() {
        assert_eq!(
            frequency_to_lambda_sq(&[]),
            Err(ConfigError::EmptyInput { arg: "frequency" })
        );
        assert_eq!(
            lambda_sq_to_frequency(&[]),
            Err(ConfigError::EmptyInput { arg: "lambda_sq" })
        );
        assert_eq!(
            channel_width_to_lambda_sq(&[], &[1.0], true),
            Err(ConfigError::EmptyInput { arg: "low" })
        );
        assert_eq!(
            channel_width_to_lambda_sq(&[1.0], &[], true),
            Err(ConfigError::EmptyInput { arg: "high" })
        );
    }

    #[test]
    fn bound_length_mismatch_is_rejected() {
        let err = channel_width_to_lambda_sq(&[1.0e9, 1.1e9], &[1.05e9], true)
            .expect_err("mismatched bounds");
        assert_eq!(
            err,
            ConfigError::SizeMismatch {
                arg: "high",
                expected: 2,
                got: 1,
            }
        );
    }

    #[test]
    fn frequency_channel_widths_are_positive() {
        let low = [1.40e9, 1.41e9, 1.42e9];
        let high = [1.41e9, 1.42e9, 1.43e9];
        let widths = channel_width_to_lambda_sq(&low, &high, true).expect("widths");
        for w in &widths {
            assert!(*w > 0.0, "width {w} should be positive");
        }
        // Consistent with direct conversion of the bounds.
        let upper = frequency_to_lambda_sq(&low).expect("upper");
        let lower = frequency_to_lambda_sq(&high).expect("lower");
        for ((w, u), l) in widths.iter().zip(upper.iter()).zip(lower.iter()) {
            assert_relative_eq!(*w, u - l, max_relative = 1e-12);
        }
    }

    #[test]
    fn lambda_sq_bounds_pass_through() {
        let low = [1.0, 2.0];
        let high = [1.5, 2.25];
        let widths = channel_width_to_lambda_sq(&low, &high, false).expect("widths");
        assert_eq!(widths, vec![0.5, 0.25]);
    }
}
