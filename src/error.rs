//! Crate-wide error types and result alias.
use crate::typedef::NiftiType;
use quick_error::quick_error;
use std::io::Error as IOError;

quick_error! {
    /// Error type for all routines in this crate.
    #[derive(Debug)]
    pub enum NiftiError {
        /// The header is structurally invalid: `sizeof_hdr` is not 348
        /// under either byte order, or the magic code is unrecognized.
        MalformedHeader {
            display("Malformed NIfTI-1 header")
        }
        /// Header declares more data than the source provides.
        UnexpectedEndOfData {
            display("Unexpected end of data")
        }
        /// Attempted to read volume outside boundaries.
        OutOfBounds(coords: Vec<u16>) {
            display("Out of bounds access to volume: {:?}", coords)
        }
        /// Could not retrieve a volume through the file pairing convention.
        MissingVolumeFile(err: IOError) {
            display("Volume file not found: {}", err)
            source(err)
        }
        /// An attempt to read voxel data was made while the object
        /// holds none.
        NoVolumeData {
            display("No volume data available")
        }
        /// Voxel data cannot be interpreted under this data type.
        UnsupportedDataType(t: NiftiType) {
            display("Unsupported data type {:?}", t)
        }
        /// A header field holds a code which is not in the standard.
        InvalidCode(fname: &'static str, code: i16) {
            display("invalid code `{}` for field {}", code, fname)
        }
        /// The `descrip` field does not fit in 80 bytes.
        IncorrectDescriptionLength(len: usize) {
            display("description length {} exceeds 80 bytes", len)
        }
        /// Voxel coordinates do not match the volume's rank.
        IncorrectVolumeDimensionality(expected: u16, got: u16) {
            display("expected rank {}, got coordinates of rank {}", expected, got)
        }
        /// The volume's raw data length is inconsistent with the
        /// header's dimensions and bit depth.
        IncompatibleLength(got: usize, expected: usize) {
            display("got {} bytes of volume data, expected {}", got, expected)
        }
        /// I/O error
        Io(err: IOError) {
            from()
            display("{}", err)
            source(err)
        }
    }
}

/// Alias type for results originated from this crate.
pub type Result<T> = ::std::result::Result<T, NiftiError>;
