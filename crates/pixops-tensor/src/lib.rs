#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! `pixops-tensor` provides the dense, row-major buffer that the image kernels read from
//! and write to. A [`Tensor`] owns its elements and carries a compile-time number of
//! dimensions together with its shape and strides.
//!
//! Batches of images are represented as [`Tensor4`] with shape `[batch, rows, cols, channels]`
//! and per-image transform matrices as [`Tensor3`] with shape `[batch, 3, 3]`.
//!
//! ```rust
//! use pixops_tensor::Tensor4;
//!
//! let batch = Tensor4::<u8>::from_shape_val([2, 4, 5, 3], 0).unwrap();
//! assert_eq!(batch.numel(), 2 * 4 * 5 * 3);
//! assert_eq!(batch.outer_slice(1).map(|s| s.len()), Some(4 * 5 * 3));
//! ```

/// Tensor module containing the main tensor implementation and error types.
pub mod tensor;

pub use crate::tensor::{get_strides_from_shape, Tensor, TensorError};

/// Type alias for a 1-dimensional tensor.
pub type Tensor1<T> = Tensor<T, 1>;

/// Type alias for a 2-dimensional tensor.
pub type Tensor2<T> = Tensor<T, 2>;

/// Type alias for a 3-dimensional tensor.
pub type Tensor3<T> = Tensor<T, 3>;

/// Type alias for a 4-dimensional tensor.
pub type Tensor4<T> = Tensor<T, 4>;
