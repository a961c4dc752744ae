//! Shared kernel substrate.
//!
//! Defines the constructor-validation lifecycle, the structured error types
//! used at configuration and execution time, and contiguous 1D input/output
//! adapters shared by the spectral and synthesis kernels.

mod errors;
mod io;
mod lifecycle;

pub use errors::*;
pub use io::*;
pub use lifecycle::*;
