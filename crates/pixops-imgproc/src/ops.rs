//! Batched entry points over `[batch, rows, cols, channels]` tensors.
//!
//! Every image of the batch is processed independently. Per-image parameters are given
//! either once per image or once for the whole batch. All arguments are validated before
//! the output is allocated, and a failing call returns no output. A `Fixed` execution
//! strategy builds one thread pool per call, shared by every image of the batch.

use pixops_image::{ImageDtype, ImageSize};
use pixops_tensor::{Tensor3, Tensor4, TensorError};

use crate::{
    color::{self, HsvDelta},
    distance_transform::distance_transform_slice,
    error::KernelError,
    interpolation::interpolate::SourceView,
    parallel::ExecutionStrategy,
    warp::{self, Homography, ProjectiveTransformOptions},
};

/// Number of per-image parameter sets must be the batch size, or one to broadcast.
fn check_batch(images: usize, params: usize) -> Result<(), KernelError> {
    if params != images && params != 1 {
        return Err(KernelError::BatchSizeMismatch { images, params });
    }
    Ok(())
}

#[inline]
fn param_index(image: usize, params: usize) -> usize {
    if params == 1 {
        0
    } else {
        image
    }
}

fn check_channels(expected: usize, actual: usize) -> Result<(), KernelError> {
    if expected != actual {
        return Err(KernelError::InvalidChannels { expected, actual });
    }
    Ok(())
}

fn image_slice<T>(tensor: &Tensor4<T>, index: usize) -> Result<&[T], TensorError> {
    tensor
        .outer_slice(index)
        .ok_or_else(|| TensorError::index_out_of_bounds(index, tensor.shape[0]))
}

fn image_slice_mut<T>(tensor: &mut Tensor4<T>, index: usize) -> Result<&mut [T], TensorError> {
    let len = tensor.shape[0];
    tensor
        .outer_slice_mut(index)
        .ok_or_else(|| TensorError::index_out_of_bounds(index, len))
}

/// Adjust hue, saturation and value of a batch of RGB images.
///
/// # Arguments
///
/// * `images` - The input batch with shape `[B, H, W, 3]`.
/// * `deltas` - One adjustment per image, or a single adjustment for the whole batch.
/// * `strategy` - The execution strategy used for each image.
///
/// # Returns
///
/// A batch with the shape of `images`.
///
/// # Errors
///
/// * `InvalidShape` if the channel count is not 3 or `deltas` does not match the batch.
/// * `InvalidArgument` if an adjustment is not finite or has a negative saturation.
/// * `Unsupported` for `bool` images.
///
/// # Example
///
/// ```
/// use pixops_imgproc::{color::HsvDelta, ops, parallel::ExecutionStrategy};
/// use pixops_tensor::Tensor4;
///
/// let images = Tensor4::<u8>::from_shape_val([2, 4, 4, 3], 128).unwrap();
/// let out = ops::adjust_hsv(&images, &[HsvDelta::default()], ExecutionStrategy::Serial).unwrap();
/// assert_eq!(out, images);
/// ```
pub fn adjust_hsv<T: ImageDtype>(
    images: &Tensor4<T>,
    deltas: &[HsvDelta],
    strategy: ExecutionStrategy,
) -> Result<Tensor4<T>, KernelError> {
    let [batch, rows, cols, channels] = images.shape;
    check_channels(3, channels)?;
    check_batch(batch, deltas.len())?;
    color::ensure_supported::<T>()?;

    let transforms = deltas
        .iter()
        .map(HsvDelta::transform)
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!(
        "adjust_hsv: {batch} images of {cols}x{rows}, {} adjustments, {strategy:?}",
        deltas.len()
    );

    let mut output = Tensor4::from_shape_val(images.shape, T::default())?;
    strategy.install(|strategy| -> Result<(), KernelError> {
        for i in 0..batch {
            let transform = &transforms[param_index(i, transforms.len())];
            log::trace!("adjust_hsv: image {i} {transform:?}");
            color::adjust_hsv_slice(
                image_slice(images, i)?,
                image_slice_mut(&mut output, i)?,
                cols,
                transform,
                strategy,
            )?;
        }
        Ok(())
    })??;

    Ok(output)
}

/// Warp a batch of images with projective transforms.
///
/// # Arguments
///
/// * `images` - The input batch with shape `[B, H, W, C]`, `C >= 1`.
/// * `matrices` - The output -> source matrices with shape `[B, 3, 3]` or `[1, 3, 3]`.
/// * `output_size` - The size of each output image.
/// * `options` - Interpolation and fill options shared by the batch.
/// * `strategy` - The execution strategy used for each image.
///
/// # Returns
///
/// A batch with shape `[B, output_height, output_width, C]`.
///
/// # Errors
///
/// * `InvalidShape` if `C` is zero or `matrices` does not match the batch.
/// * `InvalidArgument` if the matrices are not 3x3 or not finite, or the output size is
///   empty.
/// * `Unsupported` for bilinear interpolation of `bool` images.
pub fn projective_transform<T: ImageDtype>(
    images: &Tensor4<T>,
    matrices: &Tensor3<f32>,
    output_size: ImageSize,
    options: &ProjectiveTransformOptions,
    strategy: ExecutionStrategy,
) -> Result<Tensor4<T>, KernelError> {
    let [batch, rows, cols, channels] = images.shape;
    if channels == 0 {
        return Err(KernelError::InvalidChannels {
            expected: 1,
            actual: 0,
        });
    }
    warp::check_output_size(output_size)?;
    if matrices.shape[1] != 3 || matrices.shape[2] != 3 {
        return Err(KernelError::InvalidMatrixShape(matrices.shape));
    }
    check_batch(batch, matrices.shape[0])?;
    options.validate::<T>()?;

    let homographies = matrices
        .as_slice()
        .chunks_exact(9)
        .map(|m| {
            let mut h = Homography::identity();
            h.0.copy_from_slice(m);
            h.validate().map(|_| h)
        })
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!(
        "projective_transform: {batch} images of {cols}x{rows}x{channels} -> {output_size}, \
         {} matrices, {options:?}, {strategy:?}",
        homographies.len()
    );

    let mut output = Tensor4::from_shape_val(
        [batch, output_size.height, output_size.width, channels],
        T::default(),
    )?;
    strategy.install(|strategy| -> Result<(), KernelError> {
        for i in 0..batch {
            let m = &homographies[param_index(i, homographies.len())];
            log::trace!("projective_transform: image {i} {m:?}");
            let src = SourceView {
                data: image_slice(images, i)?,
                rows,
                cols,
                channels,
            };
            warp::warp_projective_slice(
                &src,
                image_slice_mut(&mut output, i)?,
                output_size.width,
                m,
                options,
                strategy,
            )?;
        }
        Ok(())
    })??;

    Ok(output)
}

/// Exact Euclidean distance transform of a batch of binary masks.
///
/// # Arguments
///
/// * `images` - The input masks with shape `[B, H, W, 1]`. A pixel is foreground when its
///   value is greater than zero.
/// * `strategy` - The execution strategy used for each pass.
///
/// # Returns
///
/// The distances with shape `[B, H, W, 1]`. Masks without background pixels produce
/// `f32::INFINITY` everywhere.
///
/// # Errors
///
/// `InvalidShape` if the channel count is not 1.
pub fn euclidean_distance_transform<T: ImageDtype>(
    images: &Tensor4<T>,
    strategy: ExecutionStrategy,
) -> Result<Tensor4<f32>, KernelError> {
    let [batch, rows, cols, channels] = images.shape;
    check_channels(1, channels)?;

    log::debug!("euclidean_distance_transform: {batch} images of {cols}x{rows}, {strategy:?}");

    let size = ImageSize {
        width: cols,
        height: rows,
    };
    let mut columns = Vec::new();
    let mut output = Tensor4::from_shape_val(images.shape, 0.0f32)?;
    strategy.install(|strategy| -> Result<(), KernelError> {
        for i in 0..batch {
            distance_transform_slice(
                image_slice(images, i)?,
                image_slice_mut(&mut output, i)?,
                size,
                &mut columns,
                strategy,
            )?;
        }
        Ok(())
    })??;

    Ok(output)
}
