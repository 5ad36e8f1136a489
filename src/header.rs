//! This module defines the `NiftiHeader` struct and its fixed-layout
//! binary codec: 348 bytes of contiguous fields, parsed and written
//! through the endian-aware byte stream.
//!
//! The byte order of a file is never trusted from the outside; it is
//! sniffed from the known constant `sizeof_hdr` field (see
//! [`NiftiHeader::from_bytes`]).

use crate::error::{NiftiError, Result};
use crate::stream::{ByteStream, Value};
use crate::typedef::{NiftiType, XForm};
use crate::util::opposite;
use byteordered::Endianness;
use num_traits::FromPrimitive;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Magic code for NIfTI-1 header files (extension ".hdr"),
/// with the trailing NUL already stripped.
pub const MAGIC_CODE_NI1: &str = "ni1";
/// Magic code for full NIfTI-1 files (extension ".nii"),
/// with the trailing NUL already stripped.
pub const MAGIC_CODE_NIP1: &str = "n+1";

/// The total byte length of the header on the wire, in either byte
/// order. Also the constant against which the byte order is sniffed.
pub const HEADER_SIZE: usize = 348;

/// The NIfTI-1 header data type.
/// All fields are public and named after the specification's header
/// file. Text fields are kept as trimmed strings and padded back with
/// NULs when written.
///
/// # Examples
///
/// ```no_run
/// use nifti1_codec::NiftiHeader;
/// # use nifti1_codec::Result;
///
/// # fn run() -> Result<()> {
/// let hdr1 = NiftiHeader::from_file("0000.hdr")?;
/// let hdr2 = NiftiHeader::from_file("4321.nii")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NiftiHeader {
    /// Header size, must be 348
    pub sizeof_hdr: i32,
    /// Unused in NIFTI-1
    pub data_type: String,
    /// Unused in NIFTI-1
    pub db_name: String,
    /// Unused in NIFTI-1
    pub extents: i32,
    /// Unused in NIFTI-1
    pub session_error: i16,
    /// Unused in NIFTI-1
    pub regular: u8,
    /// MRI slice ordering
    pub dim_info: u8,
    /// Data array dimensions; `dim[0]` is the rank
    pub dim: [u16; 8],
    /// 1st intent parameter
    pub intent_p1: f32,
    /// 2nd intent parameter
    pub intent_p2: f32,
    /// 3rd intent parameter
    pub intent_p3: f32,
    /// NIFTI_INTENT_* code
    pub intent_code: i16,
    /// Defines the data type!
    pub datatype: i16,
    /// Number of bits per voxel
    pub bitpix: i16,
    /// First slice index
    pub slice_start: i16,
    /// Grid spacings
    pub pixdim: [f32; 8],
    /// Offset into .nii file to reach the volume
    pub vox_offset: f32,
    /// Data scaling: slope
    pub scl_slope: f32,
    /// Data scaling: offset
    pub scl_inter: f32,
    /// Last slice index
    pub slice_end: i16,
    /// Slice timing order
    pub slice_code: u8,
    /// Units of pixdim[1..4]
    pub xyzt_units: u8,
    /// Max display intensity
    pub cal_max: f32,
    /// Min display intensity
    pub cal_min: f32,
    /// Time for 1 slice
    pub slice_duration: f32,
    /// Time axis shift
    pub toffset: f32,
    /// Unused in NIFTI-1
    pub glmax: i32,
    /// Unused in NIFTI-1
    pub glmin: i32,

    /// Any text you like (at most 80 bytes)
    pub descrip: String,
    /// Auxiliary filename (at most 24 bytes)
    pub aux_file: String,
    /// NIFTI_XFORM_* code
    pub qform_code: i16,
    /// NIFTI_XFORM_* code
    pub sform_code: i16,
    /// Quaternion b param
    pub quatern_b: f32,
    /// Quaternion c param
    pub quatern_c: f32,
    /// Quaternion d param
    pub quatern_d: f32,
    /// Quaternion x shift
    pub quatern_x: f32,
    /// Quaternion y shift
    pub quatern_y: f32,
    /// Quaternion z shift
    pub quatern_z: f32,

    /// 1st row affine transform
    pub srow_x: [f32; 4],
    /// 2nd row affine transform
    pub srow_y: [f32; 4],
    /// 3rd row affine transform
    pub srow_z: [f32; 4],

    /// 'name' or meaning of data (at most 16 bytes)
    pub intent_name: String,

    /// Magic code. Must be `"ni1"` or `"n+1"` after NUL stripping.
    pub magic: String,

    /// Original data Endianness
    pub endianness: Endianness,
}

impl Default for NiftiHeader {
    fn default() -> NiftiHeader {
        NiftiHeader {
            sizeof_hdr: HEADER_SIZE as i32,
            data_type: String::new(),
            db_name: String::new(),
            extents: 0,
            session_error: 0,
            regular: 0,
            dim_info: 0,
            dim: [1, 0, 0, 0, 0, 0, 0, 0],
            intent_p1: 0.,
            intent_p2: 0.,
            intent_p3: 0.,
            intent_code: 0,
            datatype: 0,
            bitpix: 0,
            slice_start: 0,
            pixdim: [0.; 8],
            vox_offset: 352.,
            scl_slope: 0.,
            scl_inter: 0.,
            slice_end: 0,
            slice_code: 0,
            xyzt_units: 0,
            cal_max: 0.,
            cal_min: 0.,
            slice_duration: 0.,
            toffset: 0.,
            glmax: 0,
            glmin: 0,

            descrip: String::new(),
            aux_file: String::new(),
            qform_code: 0,
            sform_code: 0,
            quatern_b: 0.,
            quatern_c: 0.,
            quatern_d: 0.,
            quatern_x: 0.,
            quatern_y: 0.,
            quatern_z: 0.,

            srow_x: [0.; 4],
            srow_y: [0.; 4],
            srow_z: [0.; 4],

            intent_name: String::new(),

            magic: MAGIC_CODE_NI1.to_owned(),

            endianness: Endianness::Little,
        }
    }
}

impl NiftiHeader {
    /// Retrieve a NIfTI header, along with its byte order, from a file
    /// in the file system. The file is read whole before decoding.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<NiftiHeader> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        let _ = File::open(path)?.read_to_end(&mut bytes)?;
        NiftiHeader::from_bytes(&bytes)
    }

    /// Decode a NIfTI-1 header from the start of the given buffer,
    /// sniffing its byte order from the `sizeof_hdr` field.
    pub fn from_bytes(bytes: &[u8]) -> Result<NiftiHeader> {
        let (header, _) = parse_header(bytes)?;
        Ok(header)
    }

    /// Serialize this header into its exact 348-byte representation,
    /// in the header's current byte order. `sizeof_hdr` is always
    /// written as the literal 348.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut s = ByteStream::empty(self.endianness);
        s.write(&Value::I32(HEADER_SIZE as i32), "SL");
        write_str(&mut s, &self.data_type, 10);
        write_str(&mut s, &self.db_name, 18);
        s.write(&Value::I32(self.extents), "SL");
        s.write(&Value::I16(self.session_error), "SS");
        s.write(&Value::U8(self.regular), "BY");
        s.write(&Value::U8(self.dim_info), "BY");
        write_u16s(&mut s, &self.dim);
        s.write(&Value::F32(self.intent_p1), "FL");
        s.write(&Value::F32(self.intent_p2), "FL");
        s.write(&Value::F32(self.intent_p3), "FL");
        s.write(&Value::I16(self.intent_code), "SS");
        s.write(&Value::I16(self.datatype), "SS");
        s.write(&Value::I16(self.bitpix), "SS");
        s.write(&Value::I16(self.slice_start), "SS");
        write_f32s(&mut s, &self.pixdim);
        s.write(&Value::F32(self.vox_offset), "FL");
        s.write(&Value::F32(self.scl_slope), "FL");
        s.write(&Value::F32(self.scl_inter), "FL");
        s.write(&Value::I16(self.slice_end), "SS");
        s.write(&Value::U8(self.slice_code), "BY");
        s.write(&Value::U8(self.xyzt_units), "BY");
        s.write(&Value::F32(self.cal_max), "FL");
        s.write(&Value::F32(self.cal_min), "FL");
        s.write(&Value::F32(self.slice_duration), "FL");
        s.write(&Value::F32(self.toffset), "FL");
        s.write(&Value::I32(self.glmax), "SL");
        s.write(&Value::I32(self.glmin), "SL");
        write_str(&mut s, &self.descrip, 80);
        write_str(&mut s, &self.aux_file, 24);
        s.write(&Value::I16(self.qform_code), "SS");
        s.write(&Value::I16(self.sform_code), "SS");
        for f in &[
            self.quatern_b,
            self.quatern_c,
            self.quatern_d,
            self.quatern_x,
            self.quatern_y,
            self.quatern_z,
        ] {
            s.write(&Value::F32(*f), "FL");
        }
        write_f32s(&mut s, &self.srow_x);
        write_f32s(&mut s, &self.srow_y);
        write_f32s(&mut s, &self.srow_z);
        write_str(&mut s, &self.intent_name, 16);
        write_str(&mut s, &self.magic, 4);

        let out = s.into_bytes();
        debug_assert_eq!(out.len(), HEADER_SIZE);
        out
    }

    /// Get the data type as a validated enum.
    pub fn data_type(&self) -> Result<NiftiType> {
        FromPrimitive::from_i16(self.datatype)
            .ok_or(NiftiError::InvalidCode("datatype", self.datatype))
    }

    /// Get the qform coordinate mapping method as a validated enum.
    pub fn qform(&self) -> Result<XForm> {
        FromPrimitive::from_i16(self.qform_code)
            .ok_or(NiftiError::InvalidCode("qform", self.qform_code))
    }

    /// Get the sform coordinate mapping method as a validated enum.
    pub fn sform(&self) -> Result<XForm> {
        FromPrimitive::from_i16(self.sform_code)
            .ok_or(NiftiError::InvalidCode("sform", self.sform_code))
    }

    /// The volume's rank, as declared in `dim[0]`.
    pub fn dimensionality(&self) -> usize {
        usize::from(self.dim[0])
    }

    /// The effective dimension extents, `dim[1..=dim[0]]`.
    pub fn shape(&self) -> &[u16] {
        &self.dim[1..=self.dimensionality()]
    }

    /// The number of voxels the header declares.
    pub fn element_count(&self) -> usize {
        self.shape().iter().map(|&d| usize::from(d)).product()
    }

    /// Safely set the `descrip` field.
    pub fn set_description<T>(&mut self, description: T) -> Result<()>
    where
        T: Into<String>,
    {
        let description = description.into();
        let len = description.len();
        if len > 80 {
            return Err(NiftiError::IncorrectDescriptionLength(len));
        }
        self.descrip = description;
        Ok(())
    }
}

fn write_str(s: &mut ByteStream, text: &str, width: usize) {
    let bytes = text.as_bytes();
    let taken = bytes.len().min(width);
    s.append(&bytes[..taken]);
    s.append(&vec![0u8; width - taken]);
}

fn write_u16s(s: &mut ByteStream, values: &[u16]) {
    let list = Value::List(values.iter().map(|&v| Value::U16(v)).collect());
    s.write(&list, "US");
}

fn write_f32s(s: &mut ByteStream, values: &[f32]) {
    let list = Value::List(values.iter().map(|&v| Value::F32(v)).collect());
    s.write(&list, "FL");
}

fn next_u8(s: &mut ByteStream) -> Result<u8> {
    s.decode(1, "BY")
        .and_then(|v| v.as_u8())
        .ok_or(NiftiError::UnexpectedEndOfData)
}

fn next_i16(s: &mut ByteStream) -> Result<i16> {
    s.decode(2, "SS")
        .and_then(|v| v.as_i16())
        .ok_or(NiftiError::UnexpectedEndOfData)
}

fn next_i32(s: &mut ByteStream) -> Result<i32> {
    s.decode(4, "SL")
        .and_then(|v| v.as_i32())
        .ok_or(NiftiError::UnexpectedEndOfData)
}

fn next_f32(s: &mut ByteStream) -> Result<f32> {
    s.decode(4, "FL")
        .and_then(|v| v.as_f32())
        .ok_or(NiftiError::UnexpectedEndOfData)
}

fn next_str(s: &mut ByteStream, len: usize) -> Result<String> {
    match s.decode(len, "STR") {
        Some(Value::Str(text)) => Ok(text),
        _ => Err(NiftiError::UnexpectedEndOfData),
    }
}

fn next_u16s<const N: usize>(s: &mut ByteStream) -> Result<[u16; N]> {
    let mut out = [0u16; N];
    match s.decode(2 * N, "US") {
        Some(Value::List(elements)) if elements.len() == N => {
            for (slot, v) in out.iter_mut().zip(elements) {
                *slot = v.as_u16().ok_or(NiftiError::UnexpectedEndOfData)?;
            }
            Ok(out)
        }
        _ => Err(NiftiError::UnexpectedEndOfData),
    }
}

fn next_f32s<const N: usize>(s: &mut ByteStream) -> Result<[f32; N]> {
    let mut out = [0f32; N];
    match s.decode(4 * N, "FL") {
        Some(Value::List(elements)) if elements.len() == N => {
            for (slot, v) in out.iter_mut().zip(elements) {
                *slot = v.as_f32().ok_or(NiftiError::UnexpectedEndOfData)?;
            }
            Ok(out)
        }
        _ => Err(NiftiError::UnexpectedEndOfData),
    }
}

/// Decode a header from the start of the buffer, returning it together
/// with the diagnostics accumulated by the stream during the pass.
pub(crate) fn parse_header(bytes: &[u8]) -> Result<(NiftiHeader, Vec<String>)> {
    // try little-endian first, then flip once if sizeof_hdr disagrees
    let mut stream = ByteStream::new(bytes.to_vec(), Endianness::Little);
    let sniff = stream.decode(4, "SL").and_then(|v| v.as_i32());
    let mut stream = if sniff == Some(HEADER_SIZE as i32) {
        stream
    } else {
        let e = opposite(stream.endianness());
        let mut stream = stream.into_endianness(e);
        let retry = stream.decode(4, "SL").and_then(|v| v.as_i32());
        if retry != Some(HEADER_SIZE as i32) {
            return Err(NiftiError::MalformedHeader);
        }
        stream
    };

    let mut h = NiftiHeader {
        endianness: stream.endianness(),
        ..NiftiHeader::default()
    };
    let s = &mut stream;

    h.sizeof_hdr = HEADER_SIZE as i32;
    h.data_type = next_str(s, 10)?;
    h.db_name = next_str(s, 18)?;
    h.extents = next_i32(s)?;
    h.session_error = next_i16(s)?;
    h.regular = next_u8(s)?;
    h.dim_info = next_u8(s)?;
    h.dim = next_u16s::<8>(s)?;
    h.intent_p1 = next_f32(s)?;
    h.intent_p2 = next_f32(s)?;
    h.intent_p3 = next_f32(s)?;
    h.intent_code = next_i16(s)?;
    h.datatype = next_i16(s)?;
    h.bitpix = next_i16(s)?;
    h.slice_start = next_i16(s)?;
    h.pixdim = next_f32s::<8>(s)?;
    h.vox_offset = next_f32(s)?;
    h.scl_slope = next_f32(s)?;
    h.scl_inter = next_f32(s)?;
    h.slice_end = next_i16(s)?;
    h.slice_code = next_u8(s)?;
    h.xyzt_units = next_u8(s)?;
    h.cal_max = next_f32(s)?;
    h.cal_min = next_f32(s)?;
    h.slice_duration = next_f32(s)?;
    h.toffset = next_f32(s)?;
    h.glmax = next_i32(s)?;
    h.glmin = next_i32(s)?;
    h.descrip = next_str(s, 80)?;
    h.aux_file = next_str(s, 24)?;
    h.qform_code = next_i16(s)?;
    h.sform_code = next_i16(s)?;
    h.quatern_b = next_f32(s)?;
    h.quatern_c = next_f32(s)?;
    h.quatern_d = next_f32(s)?;
    h.quatern_x = next_f32(s)?;
    h.quatern_y = next_f32(s)?;
    h.quatern_z = next_f32(s)?;
    h.srow_x = next_f32s::<4>(s)?;
    h.srow_y = next_f32s::<4>(s)?;
    h.srow_z = next_f32s::<4>(s)?;
    h.intent_name = next_str(s, 16)?;
    h.magic = next_str(s, 4)?;

    debug_assert_eq!(s.position(), HEADER_SIZE);

    if h.magic != MAGIC_CODE_NI1 && h.magic != MAGIC_CODE_NIP1 {
        return Err(NiftiError::MalformedHeader);
    }
    // the declared rank indexes into `dim` itself
    if !(1..=7).contains(&h.dim[0]) {
        return Err(NiftiError::MalformedHeader);
    }
    Ok((h, stream.take_diagnostics()))
}

#[cfg(test)]
mod tests {
    use super::{NiftiHeader, HEADER_SIZE, MAGIC_CODE_NIP1};
    use byteordered::Endianness;

    #[test]
    fn default_is_exactly_348_bytes() {
        let h = NiftiHeader::default();
        assert_eq!(h.to_bytes().len(), HEADER_SIZE);

        let h = NiftiHeader {
            endianness: Endianness::Big,
            descrip: "with text".to_owned(),
            magic: MAGIC_CODE_NIP1.to_owned(),
            ..NiftiHeader::default()
        };
        assert_eq!(h.to_bytes().len(), HEADER_SIZE);
    }

    #[test]
    fn shape_and_element_count() {
        let h = NiftiHeader {
            dim: [3, 2, 2, 1, 0, 0, 0, 0],
            ..NiftiHeader::default()
        };
        assert_eq!(h.dimensionality(), 3);
        assert_eq!(h.shape(), &[2, 2, 1]);
        assert_eq!(h.element_count(), 4);
    }

    #[test]
    fn description_length_is_validated() {
        let mut h = NiftiHeader::default();
        h.set_description("scanner A, session 2").unwrap();
        assert_eq!(h.descrip, "scanner A, session 2");
        assert!(h.set_description("x".repeat(81)).is_err());
    }
}
