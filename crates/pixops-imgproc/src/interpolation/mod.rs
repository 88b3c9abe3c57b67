//! Pixel interpolation methods for image transformations.
//!
//! This module provides the sampling rules used when resampling images during
//! geometric transformations, together with the policies that resolve samples
//! falling outside the source image.
//!
//! # Interpolation Modes
//!
//! - **Nearest**: Fastest, copies the pixel that contains the sample point
//! - **Bilinear**: Smooth linear interpolation between the four surrounding pixel centers
//!
//! # Fill Modes
//!
//! - **Constant**: a single fill value
//! - **Reflect**: mirror including the edge pixel
//! - **Wrap**: periodic continuation
//! - **NearestEdge**: repeat the border pixel

mod bilinear;
mod border;
pub(crate) mod interpolate;
mod nearest;

pub use border::FillMode;
pub use interpolate::{interpolate_pixel, InterpolationMode};
