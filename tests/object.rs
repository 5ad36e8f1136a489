use pretty_assertions::assert_eq;
use tempfile::tempdir;

use nifti1_codec::{
    InMemNiftiObject, InMemNiftiVolume, NiftiError, NiftiHeader, NiftiObject, NiftiVolume,
};

mod util;

use util::{minimal_header_nii_gt, minimal_raw_data};

#[test]
fn single_file_write_and_read_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("minimal.nii");

    let header = minimal_header_nii_gt();
    let volume = InMemNiftiVolume::from_bytes(&header, &minimal_raw_data()).unwrap();
    let mut object = InMemNiftiObject::from_header(header);
    object.set_volume(volume).unwrap();
    object.write_file(&path).unwrap();

    let read_back = InMemNiftiObject::from_file(&path).unwrap();
    assert_eq!(read_back.header().magic, "n+1");
    assert_eq!(read_back.header().vox_offset, 352.);
    assert_eq!(read_back.header().dim, [3, 64, 64, 10, 0, 0, 0, 0]);
    assert!(read_back.diagnostics().is_empty());

    let volume = read_back.into_volume().unwrap();
    assert_eq!(volume.dim(), [64, 64, 10].as_ref());
    assert_eq!(volume.get_f64(&[0, 42, 3]).unwrap(), 42.);
    assert_eq!(volume.raw_data(), &minimal_raw_data()[..]);
}

#[test]
fn file_pair_write_and_read_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("minimal.hdr");

    let header = minimal_header_nii_gt();
    let volume = InMemNiftiVolume::from_bytes(&header, &minimal_raw_data()).unwrap();
    let mut object = InMemNiftiObject::from_header(header);
    object.set_volume(volume).unwrap();
    object.write_file(&path).unwrap();

    assert!(dir.path().join("minimal.img").exists());

    // the pair is found through the .hdr path alone
    let read_back = InMemNiftiObject::from_file(&path).unwrap();
    assert_eq!(read_back.header().magic, "ni1");
    assert_eq!(read_back.volume().unwrap().get_f64(&[0, 7, 0]).unwrap(), 7.);

    // and explicitly as a pair
    let explicit =
        InMemNiftiObject::from_file_pair(&path, dir.path().join("minimal.img")).unwrap();
    assert_eq!(explicit.header(), read_back.header());
}

#[test]
fn missing_img_file_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("orphan.hdr");

    let header = minimal_header_nii_gt();
    let volume = InMemNiftiVolume::from_bytes(&header, &minimal_raw_data()).unwrap();
    let mut object = InMemNiftiObject::from_header(header);
    object.set_volume(volume).unwrap();
    object.write_file(&path).unwrap();
    std::fs::remove_file(dir.path().join("orphan.img")).unwrap();

    let e = InMemNiftiObject::from_file(&path).unwrap_err();
    assert!(matches!(e, NiftiError::MissingVolumeFile(_)), "got {:?}", e);
}

#[test]
fn single_file_with_bad_rank_is_malformed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("badrank.nii");

    let header = NiftiHeader {
        dim: [20, 2, 2, 1, 0, 0, 0, 0],
        ..minimal_header_nii_gt()
    };
    let mut bytes = header.to_bytes();
    bytes.resize(352, 0);
    bytes.extend_from_slice(&[1, 2, 3, 4]);
    std::fs::write(&path, &bytes).unwrap();

    let e = InMemNiftiObject::from_file(&path).unwrap_err();
    assert!(matches!(e, NiftiError::MalformedHeader), "got {:?}", e);
}

#[test]
fn single_file_with_low_vox_offset_is_malformed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("overlap.nii");

    let header = NiftiHeader {
        dim: [1, 4, 0, 0, 0, 0, 0, 0],
        vox_offset: 10.,
        ..minimal_header_nii_gt()
    };
    let mut bytes = header.to_bytes();
    bytes.extend_from_slice(&[0; 8]);
    std::fs::write(&path, &bytes).unwrap();

    let e = InMemNiftiObject::from_file(&path).unwrap_err();
    assert!(matches!(e, NiftiError::MalformedHeader), "got {:?}", e);
}

#[test]
fn constructed_object_has_no_volume_until_set() {
    let object = InMemNiftiObject::from_header(minimal_header_nii_gt());
    assert!(matches!(
        object.volume().unwrap_err(),
        NiftiError::NoVolumeData
    ));

    let dir = tempdir().unwrap();
    let e = object.write_file(dir.path().join("empty.nii")).unwrap_err();
    assert!(matches!(e, NiftiError::NoVolumeData));
}

#[test]
fn set_volume_checks_shape_and_syncs_datatype() {
    let mut object = InMemNiftiObject::from_header(minimal_header_nii_gt());

    let other_header = NiftiHeader {
        dim: [2, 4, 4, 0, 0, 0, 0, 0],
        ..minimal_header_nii_gt()
    };
    let mismatched = InMemNiftiVolume::from_bytes(&other_header, &[0; 16]).unwrap();
    assert!(object.set_volume(mismatched).is_err());

    let volume = InMemNiftiVolume::from_bytes(&minimal_header_nii_gt(), &minimal_raw_data())
        .unwrap();
    object.set_volume(volume).unwrap();
    assert_eq!(object.header().datatype, 2);
    assert_eq!(object.header().bitpix, 8);
}

#[test]
fn header_mutation_before_write() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("described.nii");

    let header = minimal_header_nii_gt();
    let volume = InMemNiftiVolume::from_bytes(&header, &minimal_raw_data()).unwrap();
    let mut object = InMemNiftiObject::from_header(header);
    object.set_volume(volume).unwrap();
    object.header_mut().set_description("resampled").unwrap();
    object.write_file(&path).unwrap();

    let read_back = InMemNiftiObject::from_file(&path).unwrap();
    assert_eq!(read_back.header().descrip, "resampled");
}
