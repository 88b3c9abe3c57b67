use pixops_image::{Image, ImageDtype, ImageError, ImageSize};

use super::homography::Homography;
use crate::{
    error::{ensure_finite, KernelError},
    interpolation::{
        interpolate::{sample_into, SourceView},
        FillMode, InterpolationMode,
    },
    parallel::{self, ExecutionStrategy},
};

/// Sampling options for the projective warp.
///
/// The default is bilinear interpolation with a constant fill of `0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProjectiveTransformOptions {
    /// How to sample between pixel centers.
    pub interpolation: InterpolationMode,
    /// How to resolve samples outside the source image.
    pub fill_mode: FillMode,
    /// The value written for [`FillMode::Constant`], in the units of the sample type.
    pub fill_value: f32,
}

impl ProjectiveTransformOptions {
    /// Create options with the given interpolation and fill mode and a zero fill value.
    pub fn new(interpolation: InterpolationMode, fill_mode: FillMode) -> Self {
        Self {
            interpolation,
            fill_mode,
            fill_value: 0.0,
        }
    }

    /// Set the constant fill value.
    pub fn with_fill_value(mut self, fill_value: f32) -> Self {
        self.fill_value = fill_value;
        self
    }

    /// Check the options against the sample type.
    pub(crate) fn validate<T: ImageDtype>(&self) -> Result<(), KernelError> {
        ensure_finite("fill_value", self.fill_value)?;
        if !T::CONTINUOUS && self.interpolation == InterpolationMode::Bilinear {
            return Err(KernelError::Unsupported {
                operation: "bilinear interpolation",
                dtype: T::NAME,
            });
        }
        Ok(())
    }
}

/// Warp one interleaved image buffer. Arguments are validated by the caller.
pub(crate) fn warp_projective_slice<T: ImageDtype>(
    src: &SourceView<'_, T>,
    dst: &mut [T],
    dst_cols: usize,
    m: &Homography,
    options: &ProjectiveTransformOptions,
    strategy: ExecutionStrategy,
) -> Result<(), KernelError> {
    let channels = src.channels;
    let row_len = dst_cols * channels;

    parallel::for_each_row_mut(strategy, dst, row_len, |y, dst_row| {
        let yc = y as f32 + 0.5;
        for (x, dst_pixel) in dst_row.chunks_exact_mut(channels).enumerate() {
            match m.transform_point(x as f32 + 0.5, yc) {
                Some((u, v)) => sample_into(
                    src,
                    u,
                    v,
                    options.interpolation,
                    options.fill_mode,
                    options.fill_value,
                    dst_pixel,
                ),
                None => dst_pixel.fill(T::from_f32(options.fill_value)),
            }
        }
    })?;

    Ok(())
}

pub(crate) fn check_output_size(size: ImageSize) -> Result<(), KernelError> {
    if size.is_empty() {
        return Err(KernelError::InvalidOutputSize {
            width: size.width,
            height: size.height,
        });
    }
    Ok(())
}

/// Applies a projective transformation to an image.
///
/// Each output pixel center `(x + 0.5, y + 0.5)` is mapped through `m` into the source
/// image, where it is sampled with the chosen interpolation. Samples outside the source
/// are resolved with the fill mode.
///
/// * `src` - The input image with shape (height, width, channels).
/// * `dst` - The output image with shape (new_height, new_width, channels).
/// * `m` - The 3x3 matrix mapping output coordinates to source coordinates.
/// * `options` - The interpolation and fill options.
///
/// # Errors
///
/// * `InvalidArgument` if `dst` has no pixels or `m` has non-finite entries.
/// * `Unsupported` for bilinear interpolation of `bool` images.
///
/// # Example
///
/// ```
/// use pixops_image::{Image, ImageSize};
/// use pixops_imgproc::warp::{warp_projective, Homography, ProjectiveTransformOptions};
///
/// let src = Image::<f32, 1>::new(
///   ImageSize {
///     width: 4,
///     height: 5,
///   },
///   vec![0.0f32; 4 * 5]
/// ).unwrap();
///
/// let m = Homography::translation(1.0, -1.0);
///
/// let mut dst = Image::<f32, 1>::from_size_val(
///   ImageSize {
///     width: 2,
///     height: 3,
///   },
///   0.0
/// ).unwrap();
///
/// warp_projective(&src, &mut dst, &m, &ProjectiveTransformOptions::default()).unwrap();
///
/// assert_eq!(dst.size().width, 2);
/// assert_eq!(dst.size().height, 3);
/// ```
pub fn warp_projective<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    m: &Homography,
    options: &ProjectiveTransformOptions,
) -> Result<(), KernelError> {
    warp_projective_with(src, dst, m, options, ExecutionStrategy::default())
}

/// Same as [`warp_projective`] with an explicit execution strategy.
pub fn warp_projective_with<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    m: &Homography,
    options: &ProjectiveTransformOptions,
    strategy: ExecutionStrategy,
) -> Result<(), KernelError> {
    check_output_size(dst.size())?;
    m.validate()?;
    options.validate::<T>()?;

    log::trace!(
        "warp_projective {} -> {} {:?} {:?}",
        src.size(),
        dst.size(),
        m,
        options
    );

    let dst_cols = dst.cols();
    warp_projective_slice(
        &SourceView::from_image(src),
        dst.as_slice_mut(),
        dst_cols,
        m,
        options,
        strategy,
    )
}

fn check_same_size(src: ImageSize, dst: ImageSize) -> Result<(), KernelError> {
    if src != dst {
        return Err(
            ImageError::InvalidImageSize(src.width, src.height, dst.width, dst.height).into(),
        );
    }
    Ok(())
}

/// Rotate an image by `angle` radians about its center.
///
/// The output has the size of the input. Positive angles turn the content
/// counter-clockwise on screen.
pub fn rotate<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    angle: f32,
    options: &ProjectiveTransformOptions,
) -> Result<(), KernelError> {
    ensure_finite("angle", angle)?;
    check_same_size(src.size(), dst.size())?;
    let m = Homography::rotation(angle, src.width(), src.height());
    warp_projective(src, dst, &m, options)
}

/// Shift an image by `(dx, dy)` pixels.
///
/// The output has the size of the input.
pub fn translate<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    dx: f32,
    dy: f32,
    options: &ProjectiveTransformOptions,
) -> Result<(), KernelError> {
    ensure_finite("dx", dx)?;
    ensure_finite("dy", dy)?;
    check_same_size(src.size(), dst.size())?;
    warp_projective(src, dst, &Homography::translation(dx, dy), options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn ramp_4x4() -> Result<Image<f32, 1>, ImageError> {
        Image::new([4, 4].into(), (0..16).map(|v| v as f32).collect())
    }

    #[test]
    fn identity_is_exact() -> Result<(), KernelError> {
        let image = ramp_4x4()?;
        for interpolation in [InterpolationMode::Nearest, InterpolationMode::Bilinear] {
            for fill_mode in [FillMode::Constant, FillMode::Reflect] {
                let mut out = Image::from_size_val(image.size(), -1.0)?;
                let options = ProjectiveTransformOptions::new(interpolation, fill_mode);
                warp_projective(&image, &mut out, &Homography::identity(), &options)?;
                assert_eq!(out.as_slice(), image.as_slice());
            }
        }
        Ok(())
    }

    #[test]
    fn identity_u8_multichannel() -> Result<(), KernelError> {
        let image = Image::<u8, 3>::new([3, 2].into(), (0..18).map(|v| v * 13).collect())?;
        let mut out = Image::from_size_val(image.size(), 0u8)?;
        warp_projective(
            &image,
            &mut out,
            &Homography::identity(),
            &ProjectiveTransformOptions::default(),
        )?;
        assert_eq!(out, image);
        Ok(())
    }

    #[test]
    fn hflip() -> Result<(), KernelError> {
        let image = Image::<f32, 1>::new([2, 3].into(), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0])?;
        let m = Homography([-1.0, 0.0, 2.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        let mut out = Image::from_size_val(image.size(), 0.0)?;
        warp_projective(&image, &mut out, &m, &ProjectiveTransformOptions::default())?;
        assert_eq!(out.as_slice(), vec![1.0, 0.0, 3.0, 2.0, 5.0, 4.0]);
        Ok(())
    }

    #[test]
    fn constant_fill_is_exact() -> Result<(), KernelError> {
        let image = ramp_4x4()?;
        let mut out = Image::from_size_val(image.size(), 0.0)?;
        let options = ProjectiveTransformOptions::default().with_fill_value(0.3);
        translate(&image, &mut out, 2.0, 0.0, &options)?;

        let expected = [
            0.3, 0.3, 0.0, 1.0, //
            0.3, 0.3, 4.0, 5.0, //
            0.3, 0.3, 8.0, 9.0, //
            0.3, 0.3, 12.0, 13.0,
        ];
        assert_eq!(out.as_slice(), expected);
        Ok(())
    }

    #[test]
    fn fill_modes_nearest() -> Result<(), KernelError> {
        let image = Image::<f32, 1>::new([3, 1].into(), vec![1.0, 2.0, 3.0])?;
        let mut out = Image::from_size_val([7, 1].into(), 0.0)?;
        // output x samples source x - 2
        let m = Homography::translation(2.0, 0.0);

        let cases = [
            (FillMode::Constant, [9.0, 9.0, 1.0, 2.0, 3.0, 9.0, 9.0]),
            (FillMode::Reflect, [2.0, 1.0, 1.0, 2.0, 3.0, 3.0, 2.0]),
            (FillMode::Wrap, [2.0, 3.0, 1.0, 2.0, 3.0, 1.0, 2.0]),
            (FillMode::NearestEdge, [1.0, 1.0, 1.0, 2.0, 3.0, 3.0, 3.0]),
        ];
        for (fill_mode, expected) in cases {
            let options = ProjectiveTransformOptions::new(InterpolationMode::Nearest, fill_mode)
                .with_fill_value(9.0);
            warp_projective(&image, &mut out, &m, &options)?;
            assert_eq!(out.as_slice(), expected, "{fill_mode}");
        }
        Ok(())
    }

    #[test]
    fn fill_modes_bilinear() -> Result<(), KernelError> {
        let image = Image::<f32, 1>::new([3, 1].into(), vec![1.0, 2.0, 3.0])?;
        let mut out = Image::from_size_val([7, 1].into(), 0.0)?;
        // output x blends source columns x - 2 and x - 1 with equal weights
        let m = Homography::translation(1.5, 0.0);

        let cases = [
            (FillMode::Constant, [9.0, 5.0, 1.5, 2.5, 9.0, 9.0, 9.0]),
            (FillMode::Reflect, [1.5, 1.0, 1.5, 2.5, 3.0, 2.5, 1.5]),
            (FillMode::Wrap, [2.5, 2.0, 1.5, 2.5, 2.0, 1.5, 2.5]),
            (FillMode::NearestEdge, [1.0, 1.0, 1.5, 2.5, 3.0, 3.0, 3.0]),
        ];
        for (fill_mode, expected) in cases {
            let options = ProjectiveTransformOptions::new(InterpolationMode::Bilinear, fill_mode)
                .with_fill_value(9.0);
            warp_projective(&image, &mut out, &m, &options)?;
            assert_eq!(out.as_slice(), expected, "{fill_mode}");
        }
        Ok(())
    }

    #[test]
    fn bilinear_half_pixel_shift() -> Result<(), KernelError> {
        let image = Image::<f32, 1>::new([4, 1].into(), vec![0.0, 2.0, 4.0, 6.0])?;
        let mut out = Image::from_size_val(image.size(), 0.0)?;
        let options =
            ProjectiveTransformOptions::new(InterpolationMode::Bilinear, FillMode::NearestEdge);
        translate(&image, &mut out, -0.5, 0.0, &options)?;
        assert_eq!(out.as_slice(), vec![1.0, 3.0, 5.0, 6.0]);
        Ok(())
    }

    #[test]
    fn rotate_half_turn() -> Result<(), KernelError> {
        let image = ramp_4x4()?;
        let mut out = Image::from_size_val(image.size(), 0.0)?;
        let options = ProjectiveTransformOptions::new(InterpolationMode::Nearest, FillMode::Constant);
        rotate(&image, &mut out, std::f32::consts::PI, &options)?;
        let expected: Vec<f32> = (0..16).rev().map(|v| v as f32).collect();
        assert_eq!(out.as_slice(), expected);
        Ok(())
    }

    #[test]
    fn degenerate_w_gives_fill() -> Result<(), KernelError> {
        let image = ramp_4x4()?;
        let mut out = Image::from_size_val([2, 1].into(), 0.0)?;
        // w = x - 0.5 vanishes at the first pixel center
        let m = Homography([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, -0.5]);
        let options = ProjectiveTransformOptions::new(InterpolationMode::Nearest, FillMode::Wrap)
            .with_fill_value(-4.0);
        warp_projective(&image, &mut out, &m, &options)?;
        assert_eq!(out.as_slice()[0], -4.0);
        Ok(())
    }

    #[test]
    fn bool_masks() -> Result<(), KernelError> {
        let image = Image::<bool, 1>::new([2, 1].into(), vec![true, false])?;
        let mut out = Image::from_size_val(image.size(), false)?;
        let m = Homography([-1.0, 0.0, 2.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);

        let nearest = ProjectiveTransformOptions::new(InterpolationMode::Nearest, FillMode::Constant);
        warp_projective(&image, &mut out, &m, &nearest)?;
        assert_eq!(out.as_slice(), vec![false, true]);

        let res = warp_projective(&image, &mut out, &m, &ProjectiveTransformOptions::default());
        assert_eq!(res.map_err(|e| e.kind()), Err(ErrorKind::Unsupported));
        Ok(())
    }

    #[test]
    fn invalid_arguments() -> Result<(), KernelError> {
        let image = ramp_4x4()?;
        let options = ProjectiveTransformOptions::default();

        let mut empty = Image::<f32, 1>::new([0, 3].into(), vec![])?;
        let res = warp_projective(&image, &mut empty, &Homography::identity(), &options);
        assert_eq!(
            res,
            Err(KernelError::InvalidOutputSize {
                width: 0,
                height: 3
            })
        );

        let mut out = Image::from_size_val(image.size(), 0.0)?;
        let m = Homography([1.0, 0.0, f32::INFINITY, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        let res = warp_projective(&image, &mut out, &m, &options);
        assert_eq!(res.map_err(|e| e.kind()), Err(ErrorKind::InvalidArgument));

        let mut small = Image::from_size_val([2, 2].into(), 0.0)?;
        let res = rotate(&image, &mut small, 0.5, &options);
        assert_eq!(res.map_err(|e| e.kind()), Err(ErrorKind::InvalidShape));
        Ok(())
    }

    #[cfg(feature = "serde")]
    #[test]
    fn options_from_json() -> Result<(), serde_json::Error> {
        let options: ProjectiveTransformOptions =
            serde_json::from_str(r#"{"interpolation": "nearest", "fill_mode": "nearest_edge"}"#)?;
        assert_eq!(
            options,
            ProjectiveTransformOptions::new(InterpolationMode::Nearest, FillMode::NearestEdge)
        );
        Ok(())
    }

    #[test]
    fn serial_matches_parallel() -> Result<(), KernelError> {
        let mut rng = StdRng::seed_from_u64(5);
        let size = ImageSize {
            width: 31,
            height: 23,
        };
        let data = (0..size.width * size.height * 3)
            .map(|_| rng.random_range(0.0..1.0))
            .collect();
        let image = Image::<f32, 3>::new(size, data)?;
        let m = Homography([0.9, 0.2, -3.0, -0.1, 1.1, 2.0, 0.001, -0.002, 1.0]);

        for fill_mode in [FillMode::Constant, FillMode::Reflect, FillMode::Wrap] {
            let options = ProjectiveTransformOptions::new(InterpolationMode::Bilinear, fill_mode);
            let mut serial = Image::from_size_val([40, 20].into(), 0.0)?;
            let mut par = serial.clone();
            warp_projective_with(&image, &mut serial, &m, &options, ExecutionStrategy::Serial)?;
            warp_projective_with(&image, &mut par, &m, &options, ExecutionStrategy::Parallel)?;
            assert_eq!(serial, par);
        }
        Ok(())
    }
}
