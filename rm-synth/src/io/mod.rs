//! Plain-text adapters for calibration vectors and result spectra.
//!
//! These are thin collaborators around the core: whitespace-separated columns
//! in, tab-separated columns out. Only `.txt` and `.dat` files are handled;
//! structured image/table formats (FITS, HDF5) are intentionally out of
//! scope. The adapters guarantee nothing beyond the
//! [`SamplingSet`](crate::synthesis::SamplingSet) invariants on what they
//! return; validation happens when the vectors are attached.

use core::fmt;
use nalgebra::Complex;
use std::fs;
use std::path::Path;

/// Failures raised by the text adapters.
#[derive(Debug)]
pub enum IoError {
    /// The file extension is not one of the handled text formats.
    UnrecognizedFormat {
        /// The offending extension, empty when the path has none.
        extension: String,
    },
    /// The file contained no usable rows, or an input vector was empty.
    EmptyInput {
        /// Name of the argument or file that is empty.
        arg: &'static str,
    },
    /// Axis and value vectors did not agree in length.
    SizeMismatch {
        /// Name of the argument.
        arg: &'static str,
        /// Required length.
        expected: usize,
        /// Received length.
        got: usize,
    },
    /// A row did not parse into the expected numeric columns.
    Parse {
        /// 1-based line number of the malformed row.
        line: usize,
    },
    /// The underlying filesystem operation failed.
    Io(std::io::Error),
}

impl From<std::io::Error> for IoError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoError::UnrecognizedFormat { extension } => {
                write!(f, "Unrecognized file extension `{extension}`.")
            }
            IoError::EmptyInput { arg } => write!(f, "Input `{arg}` was empty."),
            IoError::SizeMismatch { arg, expected, got } => {
                write!(f, "Size mismatch on `{arg}`. Expected {expected}, got {got}.")
            }
            IoError::Parse { line } => write!(f, "Malformed numeric row at line {line}."),
            IoError::Io(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IoError::Io(err) => Some(err),
            _ => None,
        }
    }
}

fn ensure_text_extension(path: &Path) -> Result<(), IoError> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();
    if extension.eq_ignore_ascii_case("txt") || extension.eq_ignore_ascii_case("dat") {
        Ok(())
    } else {
        Err(IoError::UnrecognizedFormat { extension })
    }
}

/// Parse `COLUMNS` numeric fields per non-empty row.
fn read_columns<const COLUMNS: usize>(path: &Path) -> Result<Vec<[f64; COLUMNS]>, IoError> {
    ensure_text_extension(path)?;
    let contents = fs::read_to_string(path)?;
    let mut rows = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        let mut fields = line.split_whitespace();
        let first = match fields.next() {
            Some(first) => first,
            None => continue, // blank line
        };
        let mut row = [0.0; COLUMNS];
        row[0] = first.parse().map_err(|_| IoError::Parse { line: idx + 1 })?;
        for slot in row.iter_mut().skip(1) {
            let field = fields.next().ok_or(IoError::Parse { line: idx + 1 })?;
            *slot = field.parse().map_err(|_| IoError::Parse { line: idx + 1 })?;
        }
        rows.push(row);
    }
    if rows.is_empty() {
        return Err(IoError::EmptyInput { arg: "file" });
    }
    log::debug!("read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Read a one-column list of channel frequencies (Hz).
pub fn read_frequencies(path: impl AsRef<Path>) -> Result<Vec<f64>, IoError> {
    let rows = read_columns::<1>(path.as_ref())?;
    Ok(rows.iter().map(|r| r[0]).collect())
}

/// Read two columns of channel frequencies and frequency widths (Hz).
pub fn read_frequencies_and_deltas(
    path: impl AsRef<Path>,
) -> Result<(Vec<f64>, Vec<f64>), IoError> {
    let rows = read_columns::<2>(path.as_ref())?;
    Ok(rows.iter().map(|r| (r[0], r[1])).unzip())
}

/// Read two columns of λ² values and λ² bin widths (m²).
pub fn read_lambda_squareds_and_deltas(
    path: impl AsRef<Path>,
) -> Result<(Vec<f64>, Vec<f64>), IoError> {
    let rows = read_columns::<2>(path.as_ref())?;
    Ok(rows.iter().map(|r| (r[0], r[1])).unzip())
}

/// Read simulated line-of-sight data: four columns
/// `λ²  Δλ²  Re(P)  Im(P)`.
#[allow(clippy::type_complexity)]
pub fn read_sim_data(
    path: impl AsRef<Path>,
) -> Result<(Vec<f64>, Vec<f64>, Vec<Complex<f64>>), IoError> {
    let rows = read_columns::<4>(path.as_ref())?;
    let mut lambda_sq = Vec::with_capacity(rows.len());
    let mut delta_lambda_sq = Vec::with_capacity(rows.len());
    let mut intensity = Vec::with_capacity(rows.len());
    for row in &rows {
        lambda_sq.push(row[0]);
        delta_lambda_sq.push(row[1]);
        intensity.push(Complex::new(row[2], row[3]));
    }
    Ok((lambda_sq, delta_lambda_sq, intensity))
}

/// Write a depth spectrum as tab-separated rows `φ  Re(P)  Im(P)`.
pub fn write_rm_to_file(
    depths: &[f64],
    spectrum: &[Complex<f64>],
    path: impl AsRef<Path>,
) -> Result<(), IoError> {
    let path = path.as_ref();
    ensure_text_extension(path)?;
    if depths.is_empty() {
        return Err(IoError::EmptyInput { arg: "depths" });
    }
    if depths.len() != spectrum.len() {
        return Err(IoError::SizeMismatch {
            arg: "spectrum",
            expected: depths.len(),
            got: spectrum.len(),
        });
    }
    let mut out = String::new();
    for (phi, value) in depths.iter().zip(spectrum.iter()) {
        out.push_str(&format!("{phi}\t{}\t{}\n", value.re, value.im));
    }
    fs::write(path, out)?;
    log::debug!("wrote {} depth rows to {}", depths.len(), path.display());
    Ok(())
}

/// Write an RMSF as tab-separated rows `Re  Im`.
pub fn write_rmsf_to_file(rmsf: &[Complex<f64>], path: impl AsRef<Path>) -> Result<(), IoError> {
    let path = path.as_ref();
    ensure_text_extension(path)?;
    if rmsf.is_empty() {
        return Err(IoError::EmptyInput { arg: "rmsf" });
    }
    let mut out = String::new();
    for value in rmsf {
        out.push_str(&format!("{}\t{}\n", value.re, value.im));
    }
    fs::write(path, out)?;
    Ok(())
}
