//! Image kernels for color adjustment, projective warping and distance transforms.
//!
//! This crate re-exports the pixops workspace crates under short module names.
//!
//! ```rust
//! use pixops::imgproc::{ops, parallel::ExecutionStrategy};
//! use pixops::tensor::Tensor4;
//!
//! let masks = Tensor4::<u8>::from_shape_val([1, 3, 3, 1], 0).unwrap();
//! let distances = ops::euclidean_distance_transform(&masks, ExecutionStrategy::Serial).unwrap();
//! assert!(distances.as_slice().iter().all(|&d| d == 0.0));
//! ```

#[doc(inline)]
pub use pixops_tensor as tensor;

#[doc(inline)]
pub use pixops_image as image;

#[doc(inline)]
pub use pixops_imgproc as imgproc;
