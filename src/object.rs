//! Module for handling and retrieving complete NIFTI-1 objects.
//!
//! An object drives the whole lifecycle: open a file, parse the
//! header, decode the voxel block (from the same buffer or from the
//! paired `.img` file, per the magic code), optionally mutate, and
//! serialize everything back out.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::affine::{affine_from_header, Affine4};
use crate::error::{NiftiError, Result};
use crate::header::{parse_header, NiftiHeader, HEADER_SIZE, MAGIC_CODE_NI1, MAGIC_CODE_NIP1};
use crate::util::{to_hdr_file, to_img_file};
use crate::volume::{InMemNiftiVolume, NiftiVolume};

/// Minimum voxel data offset for the single-file layout: the 348-byte
/// header plus the 4-byte extender frame.
const MIN_VOX_OFFSET: usize = 352;

/// Trait type for all possible implementations of
/// owning NIFTI-1 objects. Objects contain a NIFTI header and
/// possibly a volume.
pub trait NiftiObject {
    /// The concrete type of the volume.
    type Volume: NiftiVolume;

    /// Obtain a reference to the NIFTI header.
    fn header(&self) -> &NiftiHeader;

    /// Obtain a mutable reference to the NIFTI header.
    fn header_mut(&mut self) -> &mut NiftiHeader;

    /// Obtain a reference to the object's volume.
    ///
    /// # Errors
    ///
    /// - `NiftiError::NoVolumeData` if no voxel data was decoded or
    /// attached yet.
    fn volume(&self) -> Result<&Self::Volume>;

    /// Move the volume out of the object, discarding the header.
    fn into_volume(self) -> Result<Self::Volume>;
}

/// Data type for a NIFTI object that is fully contained in memory.
#[derive(Debug, PartialEq, Clone)]
pub struct InMemNiftiObject {
    header: NiftiHeader,
    volume: Option<InMemNiftiVolume>,
    diagnostics: Vec<String>,
}

impl InMemNiftiObject {
    /// Retrieve the full contents of a NIFTI object.
    /// The given file system path is used as reference.
    /// If the file only contains the header (magic `"ni1"`), this
    /// method will look for the corresponding file with the extension
    /// ".img" next to it.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use nifti1_codec::InMemNiftiObject;
    /// # use nifti1_codec::Result;
    ///
    /// # fn run() -> Result<()> {
    /// let obj = InMemNiftiObject::from_file("minimal.nii")?;
    /// # Ok(())
    /// # }
    /// # run().unwrap()
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<InMemNiftiObject> {
        let bytes = fs::read(&path)?;
        let (header, diagnostics) = parse_header(&bytes)?;

        let volume = if header.magic == MAGIC_CODE_NI1 {
            // voxel data lives in the paired .img file
            let img_path = to_img_file(path.as_ref().to_path_buf());
            let img_bytes = fs::read(&img_path).map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    NiftiError::MissingVolumeFile(e)
                } else {
                    NiftiError::from(e)
                }
            })?;
            InMemNiftiVolume::from_bytes(&header, &img_bytes)?
        } else {
            // a single-file offset below 352 would overlap the header
            let offset = header.vox_offset as usize;
            if offset < MIN_VOX_OFFSET {
                return Err(NiftiError::MalformedHeader);
            }
            if bytes.len() < offset {
                return Err(NiftiError::UnexpectedEndOfData);
            }
            InMemNiftiVolume::from_bytes(&header, &bytes[offset..])?
        };

        Ok(InMemNiftiObject {
            header,
            volume: Some(volume),
            diagnostics,
        })
    }

    /// Retrieve a NIFTI object as separate header and volume files.
    /// This method is useful when file names are not conventional for a
    /// NIFTI file pair.
    pub fn from_file_pair<P, Q>(hdr_path: P, vol_path: Q) -> Result<InMemNiftiObject>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let bytes = fs::read(hdr_path)?;
        let (header, diagnostics) = parse_header(&bytes)?;
        let volume = InMemNiftiVolume::from_file(vol_path, &header)?;
        Ok(InMemNiftiObject {
            header,
            volume: Some(volume),
            diagnostics,
        })
    }

    /// Construct an object from a header alone, with no voxel data
    /// attached yet.
    pub fn from_header(header: NiftiHeader) -> InMemNiftiObject {
        InMemNiftiObject {
            header,
            volume: None,
            diagnostics: Vec::new(),
        }
    }

    /// Attach (or replace) the voxel data. The volume's shape must
    /// agree with the header's declared dimensions; the header's
    /// `datatype` and `bitpix` are synchronized with the volume.
    pub fn set_volume(&mut self, volume: InMemNiftiVolume) -> Result<()> {
        if volume.dim() != self.header.shape() {
            return Err(NiftiError::IncorrectVolumeDimensionality(
                self.header.dim[0],
                volume.dimensionality() as u16,
            ));
        }
        self.header.datatype = volume.data_type() as i16;
        self.header.bitpix = (volume.data_type().size_of() * 8) as i16;
        self.volume = Some(volume);
        Ok(())
    }

    /// The ordered diagnostics accumulated while decoding this object.
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    /// The voxel-to-space affine declared by this object's header:
    /// from the `srow_*` fields if `sform_code` is set, else from the
    /// quaternion fields if `qform_code` is set. `None` when neither
    /// code is set.
    pub fn affine(&self) -> Option<Affine4> {
        affine_from_header(&self.header)
    }

    /// Serialize the object to the file system. A path ending in
    /// ".nii" produces a single file with the voxel data appended at
    /// `vox_offset`; any other extension produces a `.hdr`/`.img`
    /// pair. The magic code and `vox_offset` written are made
    /// consistent with the chosen layout.
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let volume = self.volume()?;
        let single = path
            .as_ref()
            .extension()
            .map(|e| e.to_string_lossy() == "nii")
            .unwrap_or(false);

        if single {
            let mut header = self.header.clone();
            header.magic = MAGIC_CODE_NIP1.to_owned();
            if (header.vox_offset as usize) < MIN_VOX_OFFSET {
                header.vox_offset = MIN_VOX_OFFSET as f32;
            }
            let mut writer = BufWriter::new(File::create(path)?);
            write_header(&mut writer, &header)?;
            writer.write_all(volume.raw_data())?;
            writer.flush()?;
        } else {
            let mut header = self.header.clone();
            header.magic = MAGIC_CODE_NI1.to_owned();
            header.vox_offset = 0.;
            let hdr_path = to_hdr_file(path.as_ref().to_path_buf());
            let img_path = to_img_file(path.as_ref().to_path_buf());
            let mut writer = BufWriter::new(File::create(hdr_path)?);
            write_header(&mut writer, &header)?;
            writer.flush()?;
            let mut writer = BufWriter::new(File::create(img_path)?);
            writer.write_all(volume.raw_data())?;
            writer.flush()?;
        }
        Ok(())
    }
}

/// Write the 348 header bytes plus the zero padding up to the voxel
/// data offset (at least the 4-byte extender frame).
fn write_header<W: Write>(writer: &mut W, header: &NiftiHeader) -> Result<()> {
    writer.write_all(&header.to_bytes())?;
    let end = (header.vox_offset as usize).max(HEADER_SIZE + 4);
    writer.write_all(&vec![0u8; end - HEADER_SIZE])?;
    Ok(())
}

impl NiftiObject for InMemNiftiObject {
    type Volume = InMemNiftiVolume;

    fn header(&self) -> &NiftiHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut NiftiHeader {
        &mut self.header
    }

    fn volume(&self) -> Result<&Self::Volume> {
        self.volume.as_ref().ok_or(NiftiError::NoVolumeData)
    }

    fn into_volume(self) -> Result<Self::Volume> {
        self.volume.ok_or(NiftiError::NoVolumeData)
    }
}
