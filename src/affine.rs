//! Derivation of the spatial affine transform from header fields.
//!
//! The affine maps voxel indices to spatial coordinates. It comes from
//! the `srow_*` rows when `sform_code` is set, else from the quaternion
//! fields when `qform_code` is set. When neither code is set there is
//! no orientation information and callers get an explicit `None`,
//! never a fabricated identity.

use crate::header::NiftiHeader;
use nalgebra::{Matrix3, Matrix4, Quaternion};

/// 3x3 affine (rotation/zoom) matrix type.
pub type Affine3 = Matrix3<f32>;
/// 4x4 homogeneous affine matrix type.
pub type Affine4 = Matrix4<f32>;

/// Derive the voxel-to-space affine declared by the given header,
/// if any orientation is declared at all.
pub fn affine_from_header(h: &NiftiHeader) -> Option<Affine4> {
    if h.sform_code != 0 {
        Some(sform_affine(h))
    } else if h.qform_code != 0 {
        Some(qform_affine(h))
    } else {
        None
    }
}

#[rustfmt::skip]
fn sform_affine(h: &NiftiHeader) -> Affine4 {
    let x = &h.srow_x;
    let y = &h.srow_y;
    let z = &h.srow_z;
    Affine4::new(
        x[0], x[1], x[2], x[3],
        y[0], y[1], y[2], y[3],
        z[0], z[1], z[2], z[3],
        0.0, 0.0, 0.0, 1.0,
    )
}

/// NIfTI-1 method 2: reconstruct the rotation from the stored unit
/// quaternion (`a` recovered from `b`, `c`, `d`), scale the columns by
/// the grid spacings, with the third column flipped when `pixdim[0]`
/// carries a negative qfac, and translate by the `q{x,y,z}` shifts.
fn qform_affine(h: &NiftiHeader) -> Affine4 {
    let r = quaternion_to_affine(fill_positive(h.quatern_b, h.quatern_c, h.quatern_d));
    let qfac = if h.pixdim[0] < 0.0 { -1.0 } else { 1.0 };
    let zooms = [h.pixdim[1], h.pixdim[2], h.pixdim[3] * qfac];

    let mut m = Affine4::identity();
    for i in 0..3 {
        for j in 0..3 {
            m[(i, j)] = r[(i, j)] * zooms[j];
        }
    }
    m[(0, 3)] = h.quatern_x;
    m[(1, 3)] = h.quatern_y;
    m[(2, 3)] = h.quatern_z;
    m
}

/// Compute the full unit quaternion from its last 3 values, taking the
/// real part as positive: `a = sqrt(1 - (b^2 + c^2 + d^2))`.
/// The radicand may dip slightly below zero through storage rounding;
/// it is clamped, which corresponds to a 180 degree rotation.
fn fill_positive(b: f32, c: f32, d: f32) -> Quaternion<f32> {
    let w2 = 1.0 - (f64::from(b) * f64::from(b)
        + f64::from(c) * f64::from(c)
        + f64::from(d) * f64::from(d));
    let w = if w2 > 0.0 { w2.sqrt() } else { 0.0 };
    Quaternion::new(w as f32, b, c, d)
}

/// Calculate rotation matrix corresponding to quaternion.
///
/// Rotation matrix applies to column vectors, and is applied to the
/// left of coordinate vectors. The algorithm here allows non-unit
/// quaternions.
///
/// Algorithm from https://en.wikipedia.org/wiki/Rotation_matrix#Quaternion
#[rustfmt::skip]
fn quaternion_to_affine(q: Quaternion<f32>) -> Affine3 {
    let nq = q.w * q.w + q.i * q.i + q.j * q.j + q.k * q.k;
    if nq < f32::EPSILON {
        return Affine3::identity();
    }
    let s = 2.0 / nq;
    let x = q.i * s;
    let y = q.j * s;
    let z = q.k * s;
    let wx = q.w * x;
    let wy = q.w * y;
    let wz = q.w * z;
    let xx = q.i * x;
    let xy = q.i * y;
    let xz = q.i * z;
    let yy = q.j * y;
    let yz = q.j * z;
    let zz = q.k * z;
    Affine3::new(
        1.0 - (yy + zz), xy - wz, xz + wy,
        xy + wz, 1.0 - (xx + zz), yz - wx,
        xz - wy, yz + wx, 1.0 - (xx + yy),
    )
}
