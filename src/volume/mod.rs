//! This module defines the voxel volume API, as well as the in-memory
//! implementation which decodes the raw data block declared by a
//! header. An integration with `ndarray` exposes the volume as a
//! column-major N-dimensional array (feature `ndarray_volumes`).

pub mod inmem;
pub use self::inmem::InMemNiftiVolume;

#[cfg(feature = "ndarray_volumes")]
pub mod ndarray;
#[cfg(feature = "ndarray_volumes")]
pub use self::ndarray::IntoNdArray;

mod util;

use crate::error::Result;
use crate::typedef::NiftiType;

/// Public API for NIfTI volume data, exposed as a multi-dimensional
/// voxel array.
pub trait NiftiVolume {
    /// Get the dimensions of the volume. Unlike how NIfTI-1
    /// stores dimensions, the returned slice does not include
    /// `dim[0]` and is clipped to the effective number of dimensions.
    fn dim(&self) -> &[u16];

    /// Get the volume's number of dimensions. In a fully compliant file,
    /// this is equivalent to the corresponding header's `dim[0]` field
    /// (with byte swapping already applied).
    fn dimensionality(&self) -> usize {
        self.dim().len()
    }

    /// Get this volume's data type.
    fn data_type(&self) -> NiftiType;

    /// Fetch a single voxel's value in the given voxel index coordinates
    /// as a double precision floating point value.
    /// All necessary conversions and transformations are made
    /// when reading the voxel, including scaling. Note that using this
    /// function continuously to traverse the volume is inefficient.
    /// Prefer fetching the whole buffer or using the `ndarray` API for
    /// volume traversal.
    ///
    /// # Errors
    ///
    /// - `NiftiError::OutOfBounds` if the given coordinates surpass this
    /// volume's boundaries.
    fn get_f64(&self, coords: &[u16]) -> Result<f64>;

    /// Fetch a single voxel's value in the given voxel index coordinates
    /// as a single precision floating point value.
    ///
    /// # Errors
    ///
    /// - `NiftiError::OutOfBounds` if the given coordinates surpass this
    /// volume's boundaries.
    fn get_f32(&self, coords: &[u16]) -> Result<f32> {
        let v = self.get_f64(coords)?;
        Ok(v as f32)
    }
}
