use crate::{
    error::KernelError,
    parallel::{self, ExecutionStrategy},
};
use pixops_image::{Image, ImageError};

/// NTSC RGB to YIQ transform, row-major.
#[rustfmt::skip]
pub(crate) const RGB_TO_YIQ: [f64; 9] = [
    0.299,  0.587,  0.114,
    0.596, -0.274, -0.322,
    0.211, -0.523,  0.312,
];

/// Exact inverse of [`RGB_TO_YIQ`]. The luma rows sum to one and the chroma rows to zero,
/// so the first column is exactly one.
#[rustfmt::skip]
pub(crate) const YIQ_TO_RGB: [f64; 9] = [
    1.0,  0.956_170_685_404_145_1,  0.621_432_566_346_585_6,
    1.0, -0.272_688_602_330_106_3, -0.646_813_237_020_173_8,
    1.0, -1.103_744_082_176_026_3,  1.700_623_094_677_306_2,
];

#[inline]
fn apply3(m: &[f32; 9], p: [f32; 3]) -> [f32; 3] {
    [
        m[0] * p[0] + m[1] * p[1] + m[2] * p[2],
        m[3] * p[0] + m[4] * p[1] + m[5] * p[2],
        m[6] * p[0] + m[7] * p[1] + m[8] * p[2],
    ]
}

fn to_f32_matrix(m: &[f64; 9]) -> [f32; 9] {
    m.map(|v| v as f32)
}

fn convert(
    src: &Image<f32, 3>,
    dst: &mut Image<f32, 3>,
    m: &[f32; 9],
) -> Result<(), KernelError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        )
        .into());
    }

    let row_len = src.cols() * 3;
    parallel::for_each_row_zip(
        ExecutionStrategy::default(),
        src.as_slice(),
        row_len,
        dst.as_slice_mut(),
        row_len,
        |src_row, dst_row| {
            src_row
                .chunks_exact(3)
                .zip(dst_row.chunks_exact_mut(3))
                .for_each(|(s, d)| d.copy_from_slice(&apply3(m, [s[0], s[1], s[2]])));
        },
    )?;

    Ok(())
}

/// Convert an RGB image to a YIQ image.
///
/// The input image is assumed to have 3 channels in the order R, G, B in the range [0, 1].
///
/// # Returns
///
/// The YIQ image with the following channels:
///
/// * Y: The luma channel in the range [0, 1].
/// * I: The orange-blue chroma channel in the range [-0.596, 0.596].
/// * Q: The purple-green chroma channel in the range [-0.523, 0.523].
///
/// Precondition: the input and output images must have the same size.
///
/// # Example
///
/// ```
/// use pixops_image::{Image, ImageSize};
/// use pixops_imgproc::color::yiq_from_rgb;
///
/// let image = Image::<f32, 3>::new(
///     ImageSize {
///         width: 1,
///         height: 1,
///     },
///     vec![1.0, 1.0, 1.0],
/// )
/// .unwrap();
///
/// let mut yiq = Image::<f32, 3>::from_size_val(image.size(), 0.0).unwrap();
/// yiq_from_rgb(&image, &mut yiq).unwrap();
///
/// assert!((yiq.as_slice()[0] - 1.0).abs() < 1e-6);
/// assert!(yiq.as_slice()[1].abs() < 1e-6);
/// ```
pub fn yiq_from_rgb(src: &Image<f32, 3>, dst: &mut Image<f32, 3>) -> Result<(), KernelError> {
    convert(src, dst, &to_f32_matrix(&RGB_TO_YIQ))
}

/// Convert a YIQ image to an RGB image.
///
/// The inverse of [`yiq_from_rgb`]. The output is not clamped.
pub fn rgb_from_yiq(src: &Image<f32, 3>, dst: &mut Image<f32, 3>) -> Result<(), KernelError> {
    convert(src, dst, &to_f32_matrix(&YIQ_TO_RGB))
}

#[cfg(test)]
mod tests {
    use super::{RGB_TO_YIQ, YIQ_TO_RGB};
    use crate::error::KernelError;
    use approx::assert_abs_diff_eq;
    use pixops_image::{Image, ImageError, ImageSize};

    const RGB_TEST_DATA: [f32; 12] = [
        0.0, 0.5, 1.0, 1.0, 0.5, 0.0, 0.5, 1.0, 0.0, 1.0, 0.0, 0.5,
    ];

    #[test]
    fn inverse_matrix() {
        for r in 0..3 {
            for c in 0..3 {
                let v: f64 = (0..3).map(|k| YIQ_TO_RGB[r * 3 + k] * RGB_TO_YIQ[k * 3 + c]).sum();
                let expected = if r == c { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(v, expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn yiq_from_rgb() -> Result<(), KernelError> {
        let image = Image::<f32, 3>::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            RGB_TEST_DATA.to_vec(),
        )?;
        let mut yiq = Image::from_size_val(image.size(), 0.0)?;
        super::yiq_from_rgb(&image, &mut yiq)?;

        // pure orange-ish pixel (1.0, 0.5, 0.0)
        let p = &yiq.as_slice()[3..6];
        assert_abs_diff_eq!(p[0], 0.299 + 0.2935, epsilon = 1e-6);
        assert_abs_diff_eq!(p[1], 0.596 - 0.137, epsilon = 1e-6);
        assert_abs_diff_eq!(p[2], 0.211 - 0.2615, epsilon = 1e-6);
        Ok(())
    }

    #[test]
    fn yiq_roundtrip() -> Result<(), KernelError> {
        let image = Image::<f32, 3>::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            RGB_TEST_DATA.to_vec(),
        )?;
        let mut yiq = Image::from_size_val(image.size(), 0.0)?;
        let mut rgb = Image::from_size_val(image.size(), 0.0)?;
        super::yiq_from_rgb(&image, &mut yiq)?;
        super::rgb_from_yiq(&yiq, &mut rgb)?;

        for (a, b) in rgb.as_slice().iter().zip(image.as_slice()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-6);
        }
        Ok(())
    }

    #[test]
    fn yiq_size_mismatch() -> Result<(), KernelError> {
        let image = Image::<f32, 3>::from_size_val([2, 2].into(), 0.0)?;
        let mut yiq = Image::<f32, 3>::from_size_val([1, 2].into(), 0.0)?;
        let res = super::yiq_from_rgb(&image, &mut yiq);
        assert_eq!(
            res,
            Err(KernelError::Image(ImageError::InvalidImageSize(2, 2, 1, 2)))
        );
        Ok(())
    }
}
