//! Types defined by the standard: the value representation table used
//! by the byte stream codec, the volume data type codes, and the
//! spatial transform codes.

use crate::error::{NiftiError, Result};
use num_derive::FromPrimitive;

/// A value representation: how a run of bytes in a NIfTI-1 source
/// should be (un)packed.
///
/// This is a closed enumeration; textual type codes are resolved
/// through [`from_code`](ValueType::from_code), with aliases collapsed
/// onto the same representation (`OB` is `BY`, `OW` is `US`, `OF` is
/// `FL`, and the ASCII code set is `Str`). Codes outside the table are
/// handled by the stream via its hex fallback, not here.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ValueType {
    /// unsigned byte (codes `BY`, `OB`)
    By,
    /// unsigned short (codes `US`, `OW`)
    Us,
    /// signed short (code `SS`)
    Ss,
    /// unsigned long, 4 bytes (code `UL`)
    Ul,
    /// signed long, 4 bytes (code `SL`)
    Sl,
    /// 32 bit float (codes `FL`, `OF`)
    Fl,
    /// 64 bit float (code `FD`)
    Fd,
    /// raw hexadecimal dump (codes `AT`, `UN`, `HEX`)
    Hex,
    /// ASCII string, trailing whitespace and NULs stripped
    Str,
}

impl ValueType {
    /// Resolve a textual type code to its value representation.
    pub fn from_code(code: &str) -> Option<ValueType> {
        use ValueType::*;
        match code {
            "BY" | "OB" => Some(By),
            "US" | "OW" => Some(Us),
            "SS" => Some(Ss),
            "UL" => Some(Ul),
            "SL" => Some(Sl),
            "FL" | "OF" => Some(Fl),
            "FD" => Some(Fd),
            "AT" | "UN" | "HEX" => Some(Hex),
            "AE" | "AS" | "CS" | "DA" | "DS" | "DT" | "IS" | "LO" | "LT" | "PN" | "SH"
            | "ST" | "TM" | "UI" | "UT" | "STR" => Some(Str),
            _ => None,
        }
    }

    /// The canonical textual code for this value representation.
    pub fn code(&self) -> &'static str {
        use ValueType::*;
        match *self {
            By => "BY",
            Us => "US",
            Ss => "SS",
            Ul => "UL",
            Sl => "SL",
            Fl => "FL",
            Fd => "FD",
            Hex => "HEX",
            Str => "STR",
        }
    }

    /// The fixed element width in bytes, or `None` for the
    /// variable-length representations.
    pub fn width(&self) -> Option<usize> {
        use ValueType::*;
        match *self {
            By => Some(1),
            Us | Ss => Some(2),
            Ul | Sl | Fl => Some(4),
            Fd => Some(8),
            Hex | Str => None,
        }
    }

    /// Whether the unpacking of this representation depends on the
    /// stream's byte order.
    pub fn endian_sensitive(&self) -> bool {
        use ValueType::*;
        match *self {
            Us | Ss | Ul | Sl | Fl | Fd => true,
            By | Hex | Str => false,
        }
    }
}

/// Data type for representing a NIfTI value type in a volume
/// (the header's `datatype` field).
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, FromPrimitive)]
pub enum NiftiType {
    /// unsigned char.
    // NIFTI_TYPE_UINT8           2
    Uint8 = 2,
    /// signed short.
    // NIFTI_TYPE_INT16           4
    Int16 = 4,
    /// signed int.
    // NIFTI_TYPE_INT32           8
    Int32 = 8,
    /// 32 bit float.
    // NIFTI_TYPE_FLOAT32        16
    Float32 = 16,
    /// 64 bit float = double.
    // NIFTI_TYPE_FLOAT64        64
    Float64 = 64,
    /// signed char.
    // NIFTI_TYPE_INT8          256
    Int8 = 256,
    /// unsigned short.
    // NIFTI_TYPE_UINT16        512
    Uint16 = 512,
    /// unsigned int.
    // NIFTI_TYPE_UINT32        768
    Uint32 = 768,
    /// signed long long.
    // NIFTI_TYPE_INT64        1024
    Int64 = 1024,
    /// unsigned long long.
    // NIFTI_TYPE_UINT64       1280
    Uint64 = 1280,
}

impl NiftiType {
    /// Retrieve the size of an element of this data type, in bytes.
    pub fn size_of(&self) -> usize {
        use NiftiType::*;
        match *self {
            Int8 | Uint8 => 1,
            Int16 | Uint16 => 2,
            Int32 | Uint32 | Float32 => 4,
            Int64 | Uint64 | Float64 => 8,
        }
    }

    /// The value representation through which elements of this data
    /// type are decoded and encoded.
    ///
    /// `Int8`, `Int64` and `Uint64` have no representation in the value
    /// type table and are rejected here; the volume API handles `Int8`
    /// separately at the access level.
    pub fn value_type(&self) -> Result<ValueType> {
        use NiftiType::*;
        match *self {
            Uint8 => Ok(ValueType::By),
            Uint16 => Ok(ValueType::Us),
            Int16 => Ok(ValueType::Ss),
            Uint32 => Ok(ValueType::Ul),
            Int32 => Ok(ValueType::Sl),
            Float32 => Ok(ValueType::Fl),
            Float64 => Ok(ValueType::Fd),
            _ => Err(NiftiError::UnsupportedDataType(*self)),
        }
    }
}

/// An enum type for representing a NIfTI XForm.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, FromPrimitive)]
pub enum XForm {
    /// Arbitrary coordinates (Method 1).
    Unknown = 0,
    /// Scanner-based anatomical coordinates
    ScannerAnat = 1,
    /// Coordinates aligned to another file's,
    /// or to anatomical "truth".
    AlignedAnat = 2,
    /// Coordinates aligned to Talairach-Tournoux
    /// Atlas; (0,0,0)=AC, etc.
    Talairach = 3,
    /// MNI 152 normalized coordinates.
    Mni152 = 4,
}

#[cfg(test)]
mod tests {
    use super::{NiftiType, ValueType};

    #[test]
    fn code_aliases() {
        assert_eq!(ValueType::from_code("BY"), Some(ValueType::By));
        assert_eq!(ValueType::from_code("OB"), Some(ValueType::By));
        assert_eq!(ValueType::from_code("OW"), Some(ValueType::Us));
        assert_eq!(ValueType::from_code("OF"), Some(ValueType::Fl));
        assert_eq!(ValueType::from_code("UN"), Some(ValueType::Hex));
        assert_eq!(ValueType::from_code("PN"), Some(ValueType::Str));
        assert_eq!(ValueType::from_code("ZZ"), None);
    }

    #[test]
    fn widths() {
        assert_eq!(ValueType::By.width(), Some(1));
        assert_eq!(ValueType::Ss.width(), Some(2));
        assert_eq!(ValueType::Ul.width(), Some(4));
        assert_eq!(ValueType::Fd.width(), Some(8));
        assert_eq!(ValueType::Str.width(), None);
    }

    #[test]
    fn datatype_mapping() {
        assert_eq!(NiftiType::Int16.value_type().unwrap(), ValueType::Ss);
        assert_eq!(NiftiType::Float32.value_type().unwrap(), ValueType::Fl);
        assert_eq!(NiftiType::Float64.size_of(), 8);
        assert!(NiftiType::Int64.value_type().is_err());
    }
}
