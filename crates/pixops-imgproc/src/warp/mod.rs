//! Geometric image transformations using projective warps.
//!
//! This module provides functions for applying 2D homographies to images:
//!
//! - Projective transformations with configurable interpolation and fill modes
//! - Matrix helpers to build, compose and invert homographies
//! - Rotation and translation shortcuts
//!
//! All matrices follow the inverse-mapping convention: they map output pixel
//! coordinates to source pixel coordinates. Use [`Homography::inverse`] to
//! convert a forward transform.
//!
//! # Examples
//!
//! Rotating an image by 30 degrees:
//!
//! ```no_run
//! use pixops_image::Image;
//! use pixops_imgproc::warp::{rotate, ProjectiveTransformOptions};
//!
//! let src = Image::<f32, 3>::from_size_val([64, 48].into(), 0.5).unwrap();
//! let mut dst = Image::<f32, 3>::from_size_val(src.size(), 0.0).unwrap();
//! rotate(&src, &mut dst, 30f32.to_radians(), &ProjectiveTransformOptions::default()).unwrap();
//! ```

mod homography;
mod projective;

pub use homography::Homography;
pub(crate) use projective::{check_output_size, warp_projective_slice};
pub use projective::{
    rotate, translate, warp_projective, warp_projective_with, ProjectiveTransformOptions,
};
