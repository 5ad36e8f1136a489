//! Interfaces and implementations specific to integration with `ndarray`.
//!
//! The raw data block is a flat, column-major sequence; this module
//! exposes it as an `ndarray` array with the shape declared in the
//! header, keeping the Fortran memory order (reshaping is a view
//! concern, the data is not permuted).

use super::inmem::InMemNiftiVolume;
use super::NiftiVolume;
use crate::error::{NiftiError, Result};
use ndarray::{Array, IxDyn, ShapeBuilder};

/// Trait for volumes which can be converted to an `ndarray`.
pub trait IntoNdArray {
    /// Consume the volume into an N-dimensional array of calibrated
    /// values, in column-major order.
    fn into_ndarray(self) -> Result<Array<f64, IxDyn>>;
}

impl IntoNdArray for InMemNiftiVolume {
    fn into_ndarray(self) -> Result<Array<f64, IxDyn>> {
        let dim: Vec<usize> = self.dim().iter().map(|&d| usize::from(d)).collect();
        let count: usize = dim.iter().product();
        let values = self.to_f64_vec()?;
        let got = values.len();
        Array::from_shape_vec(IxDyn(&dim).f(), values)
            .map_err(|_| NiftiError::IncompatibleLength(got, count))
    }
}

impl<'a> IntoNdArray for &'a InMemNiftiVolume {
    fn into_ndarray(self) -> Result<Array<f64, IxDyn>> {
        self.clone().into_ndarray()
    }
}

#[cfg(test)]
mod tests {
    use super::IntoNdArray;
    use crate::header::NiftiHeader;
    use crate::typedef::NiftiType;
    use crate::volume::inmem::InMemNiftiVolume;

    #[test]
    fn rank_3_f_order_view() {
        let header = NiftiHeader {
            dim: [3, 2, 2, 1, 0, 0, 0, 0],
            datatype: NiftiType::Uint8 as i16,
            bitpix: 8,
            ..NiftiHeader::default()
        };
        let vol = InMemNiftiVolume::from_raw_data(&header, vec![1, 2, 3, 4]).unwrap();
        let arr = vol.into_ndarray().unwrap();
        assert_eq!(arr.shape(), &[2, 2, 1]);
        assert_eq!(arr[[0, 0, 0]], 1.);
        assert_eq!(arr[[1, 0, 0]], 2.);
        assert_eq!(arr[[0, 1, 0]], 3.);
        assert_eq!(arr[[1, 1, 0]], 4.);
    }
}
