//! Private utility module
use byteordered::Endianness;
use std::path::PathBuf;

/// The byte order opposite to the given one.
pub fn opposite(e: Endianness) -> Endianness {
    if e == Endianness::Little {
        Endianness::Big
    } else {
        Endianness::Little
    }
}

/// Apply a two's-complement sign correction to a value unpacked through
/// an unsigned format, for the given bit width.
///
/// Signed integers read in non-native byte order are unpacked as
/// unsigned first; if the sign bit is set, the signed value is the
/// unsigned interpretation minus 2^width.
pub fn sign_correct(raw: u64, bits: u32) -> i64 {
    debug_assert!(bits < 64);
    if raw & (1u64 << (bits - 1)) != 0 {
        raw as i64 - (1i64 << bits)
    } else {
        raw as i64
    }
}

/// Convert a raw volume value to the scale defined
/// by the given scale slope and intercept parameters.
/// A slope of 0 leaves the value unscaled.
pub fn raw_to_value(value: f64, slope: f64, intercept: f64) -> f64 {
    if slope != 0. {
        value * slope + intercept
    } else {
        value
    }
}

/// Inverse of `raw_to_value`: recover the raw stored value from a
/// calibrated one, rounding to the nearest representable raw sample.
pub fn value_to_raw(value: f64, slope: f64, intercept: f64) -> f64 {
    if slope != 0. {
        ((value - intercept) / slope).round()
    } else {
        value
    }
}

/// Path to the volume file paired with the given header file path,
/// by the `.hdr`/`.img` convention.
pub fn to_img_file(path: PathBuf) -> PathBuf {
    let mut path = path;
    path.set_extension("img");
    path
}

/// Path to the header file paired with the given volume file path.
pub fn to_hdr_file(path: PathBuf) -> PathBuf {
    let mut path = path;
    path.set_extension("hdr");
    path
}
