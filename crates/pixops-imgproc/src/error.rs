use pixops_image::ImageError;
use pixops_tensor::TensorError;
use thiserror::Error;

use crate::parallel::ParallelError;

/// Broad classification of a [`KernelError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong rank, wrong channel count or mismatched batch size.
    InvalidShape,
    /// Malformed matrix, unknown mode name, non-finite parameter or empty output size.
    InvalidArgument,
    /// A combination of options that is not implemented for the sample type.
    Unsupported,
}

/// An error type for the image kernels.
///
/// Every error is reported before the output buffer is handed back, so a failed call
/// never produces a partially written result.
#[derive(Error, Debug, PartialEq)]
pub enum KernelError {
    /// The buffer does not have the number of channels required by the operation.
    #[error("Invalid number of channels: expected {expected}, got {actual}")]
    InvalidChannels {
        /// Channels required by the operation
        expected: usize,
        /// Channels found in the buffer
        actual: usize,
    },

    /// Per-image parameters do not match the batch size.
    #[error("Batch size mismatch: {images} images but {params} parameter sets")]
    BatchSizeMismatch {
        /// Number of images in the batch
        images: usize,
        /// Number of per-image parameter sets
        params: usize,
    },

    /// The transform matrices are not 3x3.
    #[error("Invalid transform matrix shape {0:?}, expected [batch, 3, 3]")]
    InvalidMatrixShape([usize; 3]),

    /// The transform matrix contains NaN or infinite entries.
    #[error("Transform matrix contains non-finite values: {0:?}")]
    NonFiniteMatrix([f32; 9]),

    /// The transform matrix cannot be inverted.
    #[error("Transform matrix is singular (determinant is zero)")]
    SingularMatrix,

    /// A scalar parameter is NaN or infinite.
    #[error("Parameter `{name}` must be finite, got {value}")]
    NonFiniteParameter {
        /// Name of the parameter
        name: &'static str,
        /// Offending value
        value: f32,
    },

    /// A scalar parameter is outside its valid range.
    #[error("Parameter `{name}` is out of range: {reason}")]
    ParameterOutOfRange {
        /// Name of the parameter
        name: &'static str,
        /// Description of the constraint that failed
        reason: String,
    },

    /// A mode name could not be parsed.
    #[error("Unknown {kind} mode `{name}`")]
    UnknownMode {
        /// The kind of mode, e.g. `interpolation`
        kind: &'static str,
        /// The name that failed to parse
        name: String,
    },

    /// The requested output has no pixels.
    #[error("Output size must be positive, got {width}x{height}")]
    InvalidOutputSize {
        /// Requested width
        width: usize,
        /// Requested height
        height: usize,
    },

    /// The operation is not implemented for the sample type.
    #[error("{operation} is not supported for {dtype} samples")]
    Unsupported {
        /// The operation, including the option that triggered the error
        operation: &'static str,
        /// Name of the sample type
        dtype: &'static str,
    },

    /// Error from the image layer.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error from the tensor layer.
    #[error(transparent)]
    Tensor(#[from] TensorError),

    /// Error from the parallel execution layer.
    #[error(transparent)]
    Parallel(#[from] ParallelError),
}

impl KernelError {
    /// Returns the broad category of the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidChannels { .. }
            | Self::BatchSizeMismatch { .. }
            | Self::Image(_)
            | Self::Tensor(_) => ErrorKind::InvalidShape,
            Self::InvalidMatrixShape(_)
            | Self::NonFiniteMatrix(_)
            | Self::SingularMatrix
            | Self::NonFiniteParameter { .. }
            | Self::ParameterOutOfRange { .. }
            | Self::UnknownMode { .. }
            | Self::InvalidOutputSize { .. }
            | Self::Parallel(_) => ErrorKind::InvalidArgument,
            Self::Unsupported { .. } => ErrorKind::Unsupported,
        }
    }
}

/// Check that a scalar parameter is finite.
pub(crate) fn ensure_finite(name: &'static str, value: f32) -> Result<(), KernelError> {
    if !value.is_finite() {
        return Err(KernelError::NonFiniteParameter { name, value });
    }
    Ok(())
}
