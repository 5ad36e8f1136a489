use nifti1_codec::{Endianness, NiftiHeader, NiftiType};

/// Known meta-data for a minimal single-file volume.
#[allow(dead_code)]
pub fn minimal_header_nii_gt() -> NiftiHeader {
    NiftiHeader {
        vox_offset: 352.,
        magic: "n+1".to_owned(),
        ..minimal_header_hdr_gt()
    }
}

/// Known meta-data for a minimal header/image pair.
#[allow(dead_code)]
pub fn minimal_header_hdr_gt() -> NiftiHeader {
    NiftiHeader {
        sizeof_hdr: 348,
        dim: [3, 64, 64, 10, 0, 0, 0, 0],
        datatype: NiftiType::Uint8 as i16,
        bitpix: 8,
        pixdim: [0., 3., 3., 3., 0., 0., 0., 0.],
        vox_offset: 0.,
        scl_slope: 0.,
        scl_inter: 0.,
        magic: "ni1".to_owned(),
        endianness: Endianness::Big,
        ..NiftiHeader::default()
    }
}

/// A minimal voxel block matching the headers above: every voxel in
/// column `j` holds the value `j`.
#[allow(dead_code)]
pub fn minimal_raw_data() -> Vec<u8> {
    let mut data = vec![0u8; 64 * 64 * 10];
    for (index, v) in data.iter_mut().enumerate() {
        *v = ((index / 64) % 64) as u8;
    }
    data
}
