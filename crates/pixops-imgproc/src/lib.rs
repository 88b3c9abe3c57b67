#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color adjustment module.
pub mod color;

/// exact euclidean distance transform module.
pub mod distance_transform;

/// error types for the image kernels.
pub mod error;

/// utilities for interpolation.
pub mod interpolation;

/// batched operations over image tensors.
pub mod ops;

/// module containing parallization utilities.
pub mod parallel;

/// image geometric transformations module.
pub mod warp;

pub use error::{ErrorKind, KernelError};
