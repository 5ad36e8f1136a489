//! Module holding an in-memory implementation of a NIfTI volume.

use super::util::coords_to_index;
use super::NiftiVolume;
use crate::error::{NiftiError, Result};
use crate::header::NiftiHeader;
use crate::stream::{ByteStream, Value};
use crate::typedef::NiftiType;
use crate::util::{raw_to_value, value_to_raw};
use byteordered::Endianness;
use std::convert::TryFrom;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A data type for a NIfTI-1 volume contained in memory. Objects of
/// this type keep the raw data block exactly as stored in the file;
/// scale slope and intercept are applied when values are read out.
#[derive(Debug, PartialEq, Clone)]
pub struct InMemNiftiVolume {
    dim: [u16; 8],
    datatype: NiftiType,
    scl_slope: f32,
    scl_inter: f32,
    raw_data: Vec<u8>,
    endianness: Endianness,
}

impl InMemNiftiVolume {
    /// Build a volume from the raw data block of a file whose header
    /// is already known. The buffer must hold exactly the number of
    /// bytes the header declares (`bitpix / 8` bytes per voxel).
    pub fn from_raw_data(header: &NiftiHeader, raw_data: Vec<u8>) -> Result<Self> {
        let datatype = header.data_type()?;
        let nbytes = declared_bytes(header)?;
        if raw_data.len() != nbytes {
            return Err(NiftiError::IncompatibleLength(raw_data.len(), nbytes));
        }
        Ok(InMemNiftiVolume {
            dim: header.dim,
            datatype,
            scl_slope: header.scl_slope,
            scl_inter: header.scl_inter,
            raw_data,
            endianness: header.endianness,
        })
    }

    /// Decode a volume from a buffer positioned at the first voxel
    /// (that is, already past `vox_offset`). Trailing bytes beyond the
    /// declared block are ignored.
    pub fn from_bytes(header: &NiftiHeader, bytes: &[u8]) -> Result<Self> {
        let nbytes = declared_bytes(header)?;
        if bytes.len() < nbytes {
            return Err(NiftiError::UnexpectedEndOfData);
        }
        Self::from_raw_data(header, bytes[..nbytes].to_vec())
    }

    /// Read a NIfTI volume from an image file (extension ".img").
    /// The file is read whole before decoding.
    pub fn from_file<P: AsRef<Path>>(path: P, header: &NiftiHeader) -> Result<Self> {
        let mut bytes = Vec::new();
        let _ = File::open(path)?.read_to_end(&mut bytes)?;
        Self::from_bytes(header, &bytes)
    }

    /// Assemble a volume from calibrated sample values, inverting the
    /// header's scaling: when `scl_slope` is nonzero each raw stored
    /// value is `(value - scl_inter) / scl_slope`, rounded for integral
    /// data types. Samples are taken in column-major order.
    pub fn from_samples(header: &NiftiHeader, samples: &[f64]) -> Result<Self> {
        let datatype = header.data_type()?;
        let count = header.element_count();
        if samples.len() != count {
            return Err(NiftiError::IncompatibleLength(samples.len(), count));
        }
        let code = match datatype {
            NiftiType::Int8 => "BY",
            _ => datatype.value_type()?.code(),
        };
        let integral = !matches!(datatype, NiftiType::Float32 | NiftiType::Float64);
        let slope = f64::from(header.scl_slope);
        let inter = f64::from(header.scl_inter);

        let mut s = ByteStream::empty(header.endianness);
        for &value in samples {
            let raw = if integral {
                value_to_raw(value, slope, inter)
            } else if slope != 0. {
                (value - inter) / slope
            } else {
                value
            };
            s.write(&Value::F64(raw), code);
        }
        Ok(InMemNiftiVolume {
            dim: header.dim,
            datatype,
            scl_slope: header.scl_slope,
            scl_inter: header.scl_inter,
            raw_data: s.into_bytes(),
            endianness: header.endianness,
        })
    }

    /// Retrieve a reference to the raw data, as stored in the file.
    pub fn raw_data(&self) -> &[u8] {
        &self.raw_data
    }

    /// Retrieve the raw data, consuming the volume.
    pub fn into_raw_data(self) -> Vec<u8> {
        self.raw_data
    }

    /// The byte order of the raw data block.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Decode the whole data block into calibrated values, in
    /// column-major order.
    pub fn to_f64_vec(&self) -> Result<Vec<f64>> {
        let slope = f64::from(self.scl_slope);
        let inter = f64::from(self.scl_inter);
        match self.datatype {
            NiftiType::Uint8 => Ok(self
                .raw_data
                .iter()
                .map(|&b| raw_to_value(f64::from(b), slope, inter))
                .collect()),
            NiftiType::Int8 => Ok(self
                .raw_data
                .iter()
                .map(|&b| raw_to_value(f64::from(b as i8), slope, inter))
                .collect()),
            _ => {
                let vt = self.datatype.value_type()?;
                let mut s = ByteStream::new(self.raw_data.clone(), self.endianness);
                let decoded = s
                    .decode(self.raw_data.len(), vt.code())
                    .ok_or(NiftiError::UnexpectedEndOfData)?;
                let elements = match decoded {
                    Value::List(elements) => elements,
                    single => vec![single],
                };
                elements
                    .iter()
                    .map(|v| {
                        v.to_f64()
                            .map(|raw| raw_to_value(raw, slope, inter))
                            .ok_or(NiftiError::UnexpectedEndOfData)
                    })
                    .collect()
            }
        }
    }

    fn raw_value(&self, index: usize) -> Result<f64> {
        match self.datatype {
            NiftiType::Uint8 => Ok(f64::from(self.raw_data[index])),
            NiftiType::Int8 => Ok(f64::from(self.raw_data[index] as i8)),
            _ => {
                let vt = self.datatype.value_type()?;
                let width = self.datatype.size_of();
                let offset = index * width;
                let chunk = self.raw_data[offset..offset + width].to_vec();
                let mut s = ByteStream::new(chunk, self.endianness);
                s.decode(width, vt.code())
                    .and_then(|v| v.to_f64())
                    .ok_or(NiftiError::UnexpectedEndOfData)
            }
        }
    }
}

fn declared_bytes(header: &NiftiHeader) -> Result<usize> {
    let width = header.data_type()?.size_of();
    // voxel access strides by the datatype's width, so the two
    // declarations must agree
    if i16::try_from(width * 8) != Ok(header.bitpix) {
        return Err(NiftiError::MalformedHeader);
    }
    Ok(header.element_count() * width)
}

impl NiftiVolume for InMemNiftiVolume {
    fn dim(&self) -> &[u16] {
        &self.dim[1..=usize::from(self.dim[0])]
    }

    fn dimensionality(&self) -> usize {
        usize::from(self.dim[0])
    }

    fn data_type(&self) -> NiftiType {
        self.datatype
    }

    fn get_f64(&self, coords: &[u16]) -> Result<f64> {
        let index = coords_to_index(coords, self.dim())?;
        let raw = self.raw_value(index)?;
        Ok(raw_to_value(
            raw,
            f64::from(self.scl_slope),
            f64::from(self.scl_inter),
        ))
    }
}

impl<'a> NiftiVolume for &'a InMemNiftiVolume {
    fn dim(&self) -> &[u16] {
        (**self).dim()
    }

    fn dimensionality(&self) -> usize {
        (**self).dimensionality()
    }

    fn data_type(&self) -> NiftiType {
        (**self).data_type()
    }

    fn get_f64(&self, coords: &[u16]) -> Result<f64> {
        (**self).get_f64(coords)
    }
}
