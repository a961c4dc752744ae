use super::ConfigError;

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

#[cfg(feature = "alloc")]
use ndarray::{Array1, ArrayView1, ArrayViewMut1};

/// Adapter trait for reading a contiguous 1D axis or spectrum.
pub trait Read1D<T> {
    /// Borrow the underlying input as a contiguous slice.
    fn read_slice(&self) -> Result<&[T], ConfigError>;
}

/// Adapter trait for writing a contiguous 1D spectrum.
pub trait Write1D<T> {
    /// Borrow the underlying output as a mutable contiguous slice.
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError>;
}

impl<T> Read1D<T> for [T] {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        Ok(self)
    }
}

impl<T> Write1D<T> for [T] {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        Ok(self)
    }
}

impl<T, const N: usize> Read1D<T> for [T; N] {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        Ok(self)
    }
}

impl<T, const N: usize> Write1D<T> for [T; N] {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        Ok(self)
    }
}

#[cfg(feature = "alloc")]
impl<T> Read1D<T> for Vec<T> {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        Ok(self.as_slice())
    }
}

#[cfg(feature = "alloc")]
impl<T> Write1D<T> for Vec<T> {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        Ok(self.as_mut_slice())
    }
}

#[cfg(feature = "alloc")]
impl<T> Read1D<T> for Array1<T> {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        self.as_slice()
            .ok_or(ConfigError::NonContiguous { arg: "array" })
    }
}

#[cfg(feature = "alloc")]
impl<T> Write1D<T> for Array1<T> {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        self.as_slice_mut()
            .ok_or(ConfigError::NonContiguous { arg: "array" })
    }
}

#[cfg(feature = "alloc")]
impl<'a, T> Read1D<T> for ArrayView1<'a, T> {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        self.as_slice()
            .ok_or(ConfigError::NonContiguous { arg: "array_view" })
    }
}

#[cfg(feature = "alloc")]
impl<'a, T> Write1D<T> for ArrayViewMut1<'a, T> {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        self.as_slice_mut().ok_or(ConfigError::NonContiguous {
            arg: "array_view_mut",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Read1D, Write1D};

    #[test]
    fn slice_and_array_adapters() {
        let phi = [-1.0f64, 0.0, 1.0];
        assert_eq!(phi.read_slice().expect("array adapter").len(), 3);

        let s: &[f64] = &phi;
        assert_eq!(s.read_slice().expect("slice adapter")[2], 1.0);
    }

    #[test]
    fn vec_write_adapter() {
        let mut out = vec![0.0f64; 3];
        let slice = out.write_slice_mut().expect("vec write adapter");
        slice.copy_from_slice(&[0.5, 0.25, 0.125]);
        assert_eq!(out, vec![0.5, 0.25, 0.125]);
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn ndarray_adapters() {
        use ndarray::Array1;

        let depths = Array1::from(vec![0.0f64, 5.0, 10.0]);
        assert_eq!(depths.read_slice().expect("array1 read")[1], 5.0);

        let mut out = Array1::from(vec![0.0f64; 3]);
        out.write_slice_mut()
            .expect("array1 write")
            .copy_from_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(out.as_slice().expect("slice"), &[1.0, 2.0, 3.0]);
    }
}
