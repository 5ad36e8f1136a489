//! Rust implementation of the NIfTI-1 file format.
//!
//! The crate is organized around an endian-aware positional byte
//! stream ([`ByteStream`]) which can decode and encode every value
//! representation used by the format. The fixed 348-byte header codec
//! ([`NiftiHeader`]) sniffs the file's byte order from the
//! `sizeof_hdr` constant, the volume codec ([`InMemNiftiVolume`])
//! decodes the voxel block with scaling and column-major indexing,
//! and [`InMemNiftiObject`] ties the lifecycle together, including
//! the `.hdr`/`.img` file pairing convention and the spatial affine.
//!
//! Compressed containers are out of scope; sources are read whole
//! into memory before decoding.
#![deny(missing_debug_implementations)]
#![warn(missing_docs, unused_extern_crates, trivial_casts)]

pub mod affine;
pub mod error;
pub mod header;
pub mod object;
pub mod stream;
pub mod typedef;
mod util;
pub mod volume;

pub use crate::affine::{affine_from_header, Affine3, Affine4};
pub use crate::error::{NiftiError, Result};
pub use crate::header::{NiftiHeader, MAGIC_CODE_NI1, MAGIC_CODE_NIP1};
pub use crate::object::{InMemNiftiObject, NiftiObject};
pub use crate::stream::{ByteStream, Value};
pub use crate::typedef::{NiftiType, ValueType, XForm};
pub use crate::volume::{InMemNiftiVolume, NiftiVolume};

#[cfg(feature = "ndarray_volumes")]
pub use crate::volume::ndarray::IntoNdArray;

pub use byteordered::Endianness;
