//! The RM-cube data container.
//!
//! An [`RmCube`] owns one buffer of per-pixel Faraday-depth spectra together
//! with the probed-depth axis, the λ² calibration vectors of the observation,
//! field-of-view bounds, and the named weighting/algorithm policies. The cube
//! holds no transform logic; it delegates to [`crate::synthesis`] for the
//! RMSF and per-pixel spectra.
//!
//! Buffer lifecycle is explicit: dimensions are fixed at construction, the
//! buffer is allocated at most once per instance (plane or full cube), and
//! released exactly once. Double allocation and double release are contract
//! violations reported as errors. The buffer is dropped with the cube, so a
//! final `release` is optional.

use crate::kernel::{ConfigError, KernelLifecycle, SynthesisError};
use crate::synthesis::{
    FaradayAxis, Rmsf1D, RmsfConfig, RmsfKernel, SamplingSet, Synthesis1D, SynthesisConfig,
    SynthesisKernel,
};
use core::fmt;
use nalgebra::Complex;

use alloc::vec::Vec;

/// Buffer lifecycle and addressing failures of an [`RmCube`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CubeError {
    /// `allocate` was called while a buffer already exists.
    AlreadyAllocated,
    /// `release` or a pixel access was attempted without a live buffer.
    NotAllocated,
    /// The requested buffer could not be obtained.
    AllocationFailed {
        /// Number of spectrum slots requested.
        requested: usize,
    },
    /// A cursor or pixel index fell outside the cube dimensions.
    OutOfRange {
        /// Name of the offending coordinate.
        arg: &'static str,
        /// Received value.
        value: usize,
        /// Exclusive upper bound.
        bound: usize,
    },
    /// An operation required a Faraday axis but none is attached.
    MissingAxis,
    /// An operation required calibration vectors but none are attached.
    MissingCalibration,
    /// A constituent vector failed validation.
    Config(ConfigError),
    /// The delegated transform failed.
    Synthesis(SynthesisError),
}

impl From<ConfigError> for CubeError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<SynthesisError> for CubeError {
    fn from(value: SynthesisError) -> Self {
        Self::Synthesis(value)
    }
}

impl fmt::Display for CubeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CubeError::AlreadyAllocated => write!(f, "Cube buffer is already allocated."),
            CubeError::NotAllocated => write!(f, "Cube buffer is not allocated."),
            CubeError::AllocationFailed { requested } => {
                write!(f, "Cube buffer allocation of {requested} slots failed.")
            }
            CubeError::OutOfRange { arg, value, bound } => {
                write!(f, "`{arg}` = {value} out of range (bound {bound}).")
            }
            CubeError::MissingAxis => write!(f, "No Faraday axis attached."),
            CubeError::MissingCalibration => write!(f, "No calibration vectors attached."),
            CubeError::Config(err) => write!(f, "{err}"),
            CubeError::Synthesis(err) => write!(f, "{err}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CubeError {}

/// Buffer allocation granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    /// One Faraday plane: `x_size · y_size` slots.
    Plane,
    /// The full cube: `x_size · y_size · depth` slots.
    Cube,
}

/// Named channel-weighting policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Weighting {
    /// Ignore attached weights; every channel counts equally.
    Uniform,
    /// Use the weights attached to the sampling set.
    #[default]
    Natural,
}

impl Weighting {
    /// The sampling set to hand to the transform under this policy.
    fn resolve(&self, sampling: &SamplingSet) -> Result<SamplingSet, ConfigError> {
        match self {
            Weighting::Uniform => sampling.with_weights(None),
            Weighting::Natural => Ok(sampling.clone()),
        }
    }
}

/// Named RM reconstruction algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RmAlgorithm {
    /// The inverse-Fourier RM-synthesis sum.
    #[default]
    InverseFourier,
}

/// A 3D container of complex Faraday-depth spectra.
#[derive(Debug, Clone, PartialEq)]
pub struct RmCube {
    x_size: usize,
    y_size: usize,
    faraday_axis: Option<FaradayAxis>,
    sampling: Option<SamplingSet>,
    rmsf: Option<Vec<Complex<f64>>>,
    buffer: Option<Vec<Complex<f64>>>,
    current_x: usize,
    current_y: usize,
    ra: f64,
    dec: f64,
    ra_low: f64,
    ra_high: f64,
    dec_low: f64,
    dec_high: f64,
    weighting: Weighting,
    algorithm: RmAlgorithm,
}

impl RmCube {
    /// Create a cube of `x_size · y_size` pixels probing Faraday depths
    /// `0, step, …, faraday_extent - step`.
    ///
    /// `faraday_extent` must be an exact multiple of `step`.
    pub fn new(
        x_size: usize,
        y_size: usize,
        faraday_extent: f64,
        step: f64,
    ) -> Result<Self, CubeError> {
        let axis = FaradayAxis::from_range(0.0, faraday_extent, step)?;
        let mut cube = Self::with_dimensions(x_size, y_size)?;
        cube.faraday_axis = Some(axis);
        Ok(cube)
    }

    /// Create a cube with an explicitly supplied depth axis.
    pub fn with_depths(x_size: usize, y_size: usize, depths: Vec<f64>) -> Result<Self, CubeError> {
        let axis = FaradayAxis::from_depths(depths)?;
        let mut cube = Self::with_dimensions(x_size, y_size)?;
        cube.faraday_axis = Some(axis);
        Ok(cube)
    }

    /// Create a cube without a depth axis; one must be attached before any
    /// transform runs.
    pub fn with_dimensions(x_size: usize, y_size: usize) -> Result<Self, CubeError> {
        if x_size == 0 {
            return Err(ConfigError::InvalidConfiguration {
                arg: "x_size",
                reason: "pixel dimensions must be positive",
            }
            .into());
        }
        if y_size == 0 {
            return Err(ConfigError::InvalidConfiguration {
                arg: "y_size",
                reason: "pixel dimensions must be positive",
            }
            .into());
        }
        Ok(Self {
            x_size,
            y_size,
            faraday_axis: None,
            sampling: None,
            rmsf: None,
            buffer: None,
            current_x: 0,
            current_y: 0,
            ra: 0.0,
            dec: 0.0,
            ra_low: 0.0,
            ra_high: 0.0,
            dec_low: 0.0,
            dec_high: 0.0,
            weighting: Weighting::default(),
            algorithm: RmAlgorithm::default(),
        })
    }

    /// Horizontal dimension in pixels.
    pub fn x_size(&self) -> usize {
        self.x_size
    }

    /// Vertical dimension in pixels.
    pub fn y_size(&self) -> usize {
        self.y_size
    }

    /// Number of probed Faraday depths, 0 when no axis is attached.
    pub fn faraday_size(&self) -> usize {
        self.faraday_axis.as_ref().map_or(0, FaradayAxis::len)
    }

    /// The attached depth axis.
    pub fn faraday_axis(&self) -> Option<&FaradayAxis> {
        self.faraday_axis.as_ref()
    }

    /// The attached calibration vectors.
    pub fn sampling(&self) -> Option<&SamplingSet> {
        self.sampling.as_ref()
    }

    /// The cached RMSF, once [`RmCube::compute_rmsf`] has run.
    pub fn rmsf(&self) -> Option<&[Complex<f64>]> {
        self.rmsf.as_deref()
    }

    /// Current pixel cursor.
    pub fn current_pixel(&self) -> (usize, usize) {
        (self.current_x, self.current_y)
    }

    /// Move the cursor column; `x` must be below `x_size`.
    pub fn set_current_x(&mut self, x: usize) -> Result<(), CubeError> {
        if x >= self.x_size {
            return Err(CubeError::OutOfRange {
                arg: "current_x",
                value: x,
                bound: self.x_size,
            });
        }
        self.current_x = x;
        Ok(())
    }

    /// Move the cursor row; `y` must be below `y_size`.
    pub fn set_current_y(&mut self, y: usize) -> Result<(), CubeError> {
        if y >= self.y_size {
            return Err(CubeError::OutOfRange {
                arg: "current_y",
                value: y,
                bound: self.y_size,
            });
        }
        self.current_y = y;
        Ok(())
    }

    /// Pointing right ascension (degrees).
    pub fn ra(&self) -> f64 {
        self.ra
    }

    /// Pointing declination (degrees).
    pub fn dec(&self) -> f64 {
        self.dec
    }

    /// Set the pointing right ascension; must be non-negative.
    pub fn set_ra(&mut self, ra: f64) -> Result<(), CubeError> {
        if ra < 0.0 {
            return Err(ConfigError::InvalidConfiguration {
                arg: "ra",
                reason: "right ascension must be non-negative",
            }
            .into());
        }
        self.ra = ra;
        Ok(())
    }

    /// Set the pointing declination; must be non-negative.
    pub fn set_dec(&mut self, dec: f64) -> Result<(), CubeError> {
        if dec < 0.0 {
            return Err(ConfigError::InvalidConfiguration {
                arg: "dec",
                reason: "declination must be non-negative",
            }
            .into());
        }
        self.dec = dec;
        Ok(())
    }

    /// Field-of-view bounds `(ra_low, ra_high, dec_low, dec_high)`.
    pub fn field_bounds(&self) -> (f64, f64, f64, f64) {
        (self.ra_low, self.ra_high, self.dec_low, self.dec_high)
    }

    /// Set the field-of-view bounds.
    pub fn set_field_bounds(&mut self, ra_low: f64, ra_high: f64, dec_low: f64, dec_high: f64) {
        self.ra_low = ra_low;
        self.ra_high = ra_high;
        self.dec_low = dec_low;
        self.dec_high = dec_high;
    }

    /// The active weighting policy.
    pub fn weighting(&self) -> Weighting {
        self.weighting
    }

    /// Select the weighting policy for subsequent transforms.
    pub fn set_weighting(&mut self, weighting: Weighting) {
        self.weighting = weighting;
    }

    /// The active reconstruction algorithm.
    pub fn algorithm(&self) -> RmAlgorithm {
        self.algorithm
    }

    /// Select the reconstruction algorithm for subsequent transforms.
    pub fn set_algorithm(&mut self, algorithm: RmAlgorithm) {
        self.algorithm = algorithm;
    }

    /// Slots in one Faraday plane.
    pub fn plane_len(&self) -> usize {
        self.x_size * self.y_size
    }

    /// Slots in the full cube; 0 when no axis is attached.
    pub fn cube_len(&self) -> usize {
        self.plane_len() * self.faraday_size()
    }

    /// Allocate the pixel buffer, zero-initialized.
    ///
    /// Allowed exactly once per instance; a second call fails with
    /// [`CubeError::AlreadyAllocated`]. A full-cube request requires an
    /// attached depth axis.
    pub fn allocate(&mut self, kind: BufferKind) -> Result<(), CubeError> {
        if self.buffer.is_some() {
            return Err(CubeError::AlreadyAllocated);
        }
        let len = match kind {
            BufferKind::Plane => self.plane_len(),
            BufferKind::Cube => {
                if self.faraday_axis.is_none() {
                    return Err(CubeError::MissingAxis);
                }
                self.cube_len()
            }
        };
        if len == 0 {
            return Err(CubeError::AllocationFailed { requested: len });
        }
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(len)
            .map_err(|_| CubeError::AllocationFailed { requested: len })?;
        buffer.resize(len, Complex::new(0.0, 0.0));
        #[cfg(feature = "std")]
        log::debug!("allocated cube buffer of {len} spectrum slots");
        self.buffer = Some(buffer);
        Ok(())
    }

    /// Release the pixel buffer.
    ///
    /// Fails with [`CubeError::NotAllocated`] when no buffer exists.
    pub fn release(&mut self) -> Result<(), CubeError> {
        match self.buffer.take() {
            Some(_) => Ok(()),
            None => Err(CubeError::NotAllocated),
        }
    }

    /// Whether a buffer is currently allocated.
    pub fn is_allocated(&self) -> bool {
        self.buffer.is_some()
    }

    /// Attach calibration vectors, replacing any previous set.
    ///
    /// Validation failures leave the previous set intact.
    pub fn attach_calibration(&mut self, config: crate::synthesis::SamplingConfig) -> Result<(), CubeError> {
        let sampling = SamplingSet::try_new(config)?;
        self.sampling = Some(sampling);
        self.rmsf = None;
        Ok(())
    }

    /// Attach a depth axis from explicit depths, replacing any previous axis.
    ///
    /// Validation failures leave the previous axis intact.
    pub fn attach_faraday_depths(&mut self, depths: Vec<f64>) -> Result<(), CubeError> {
        let axis = FaradayAxis::from_depths(depths)?;
        self.set_faraday_axis(axis);
        Ok(())
    }

    /// Attach a constructed depth axis, replacing any previous axis.
    pub fn set_faraday_axis(&mut self, axis: FaradayAxis) {
        self.faraday_axis = Some(axis);
        self.rmsf = None;
    }

    /// Compute and cache the RMSF from the cube's own axis and calibration.
    ///
    /// Hard failures, not no-ops: [`CubeError::MissingAxis`] without a depth
    /// axis, [`CubeError::MissingCalibration`] without calibration vectors.
    pub fn compute_rmsf(&mut self) -> Result<&[Complex<f64>], CubeError> {
        let axis = self.faraday_axis.as_ref().ok_or(CubeError::MissingAxis)?;
        let sampling = self.sampling.as_ref().ok_or(CubeError::MissingCalibration)?;
        let effective = self.weighting.resolve(sampling)?;
        let kernel = RmsfKernel::try_new(RmsfConfig { sampling: effective })?;
        let rmsf = kernel.run_alloc(axis.depths())?;
        self.rmsf = Some(rmsf);
        Ok(self.rmsf.as_deref().unwrap_or_default())
    }

    /// Synthesize the depth spectrum for one line of sight using the cube's
    /// axis, calibration, and policies.
    pub fn synthesize_pixel(
        &self,
        intensity: &[Complex<f64>],
    ) -> Result<Vec<Complex<f64>>, CubeError> {
        let axis = self.faraday_axis.as_ref().ok_or(CubeError::MissingAxis)?;
        let sampling = self.sampling.as_ref().ok_or(CubeError::MissingCalibration)?;
        let effective = self.weighting.resolve(sampling)?;
        match self.algorithm {
            RmAlgorithm::InverseFourier => {
                let kernel = SynthesisKernel::try_new(SynthesisConfig { sampling: effective })?;
                Ok(kernel.run_alloc(axis.depths(), intensity)?)
            }
        }
    }

    /// Read the stored depth spectrum of pixel `(x, y)`.
    ///
    /// Requires a full-cube buffer.
    pub fn pixel_spectrum(&self, x: usize, y: usize) -> Result<&[Complex<f64>], CubeError> {
        let (offset, depth) = self.spectrum_slot(x, y)?;
        let buffer = self.buffer.as_ref().ok_or(CubeError::NotAllocated)?;
        Ok(&buffer[offset..offset + depth])
    }

    /// Store a depth spectrum into pixel `(x, y)` of a full-cube buffer.
    pub fn write_pixel_spectrum(
        &mut self,
        x: usize,
        y: usize,
        spectrum: &[Complex<f64>],
    ) -> Result<(), CubeError> {
        let (offset, depth) = self.spectrum_slot(x, y)?;
        if spectrum.len() != depth {
            return Err(ConfigError::SizeMismatch {
                arg: "spectrum",
                expected: depth,
                got: spectrum.len(),
            }
            .into());
        }
        let buffer = self.buffer.as_mut().ok_or(CubeError::NotAllocated)?;
        buffer[offset..offset + depth].copy_from_slice(spectrum);
        Ok(())
    }

    /// Spectra are stored depth-contiguous, pixel-major:
    /// offset `(y * x_size + x) * depth`.
    fn spectrum_slot(&self, x: usize, y: usize) -> Result<(usize, usize), CubeError> {
        if x >= self.x_size {
            return Err(CubeError::OutOfRange {
                arg: "x",
                value: x,
                bound: self.x_size,
            });
        }
        if y >= self.y_size {
            return Err(CubeError::OutOfRange {
                arg: "y",
                value: y,
                bound: self.y_size,
            });
        }
        let depth = self.faraday_size();
        if depth == 0 {
            return Err(CubeError::MissingAxis);
        }
        let buffer_len = self.buffer.as_ref().map_or(0, Vec::len);
        if buffer_len != self.cube_len() {
            return Err(CubeError::NotAllocated);
        }
        Ok(((y * self.x_size + x) * depth, depth))
    }
}
