use pixops_image::{Image, ImageDtype, ImageError};
use rand::Rng;

use super::yiq::{RGB_TO_YIQ, YIQ_TO_RGB};
use crate::{
    error::{ensure_finite, KernelError},
    parallel::{self, ExecutionStrategy},
};

/// Hue, saturation and value adjustment applied in YIQ space.
///
/// * `hue` - rotation of the chroma plane in radians, taken modulo a full turn.
/// * `saturation` - scale factor of the chroma plane, non-negative. `0` gives grayscale.
/// * `value` - additive shift of the luma channel, in unit range.
///
/// The default is the identity adjustment `(0, 1, 0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HsvDelta {
    /// Hue rotation in radians.
    pub hue: f32,
    /// Chroma scale factor.
    pub saturation: f32,
    /// Luma shift.
    pub value: f32,
}

impl Default for HsvDelta {
    fn default() -> Self {
        Self {
            hue: 0.0,
            saturation: 1.0,
            value: 0.0,
        }
    }
}

impl HsvDelta {
    /// Create a new adjustment.
    pub fn new(hue: f32, saturation: f32, value: f32) -> Self {
        Self {
            hue,
            saturation,
            value,
        }
    }

    /// Check that every field is finite and the saturation is non-negative.
    pub fn validate(&self) -> Result<(), KernelError> {
        ensure_finite("hue", self.hue)?;
        ensure_finite("saturation", self.saturation)?;
        ensure_finite("value", self.value)?;
        if self.saturation < 0.0 {
            return Err(KernelError::ParameterOutOfRange {
                name: "saturation",
                reason: format!("must be non-negative, got {}", self.saturation),
            });
        }
        Ok(())
    }

    /// Fold RGB -> YIQ, the adjustment and YIQ -> RGB into a luma row and a chroma matrix.
    pub(crate) fn transform(&self) -> Result<HsvTransform, KernelError> {
        self.validate()?;

        let hue = (self.hue as f64).rem_euclid(std::f64::consts::TAU);
        let (sin, cos) = hue.sin_cos();
        let s = self.saturation as f64;

        // luma is carried separately, the chroma map only sees I and Q
        #[rustfmt::skip]
        let adjust = [
            0.0, 0.0,      0.0,
            0.0, s * cos, -s * sin,
            0.0, s * sin,  s * cos,
        ];
        let c = matmul3(&YIQ_TO_RGB, &matmul3(&adjust, &RGB_TO_YIQ));

        // both maps act on (g - r, b - r): the luma row sums to one and the chroma rows to zero
        Ok(HsvTransform {
            luma: [RGB_TO_YIQ[1], RGB_TO_YIQ[2]],
            chroma: [c[1], c[2], c[4], c[5], c[7], c[8]],
            offset: self.value as f64,
        })
    }
}

/// Ranges to draw a random [`HsvDelta`] from.
///
/// The hue is drawn from `[-max_delta_hue, max_delta_hue]`, the saturation from
/// `[lower_saturation, upper_saturation]` and the value from `[lower_value, upper_value]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RandomHsvRange {
    /// Largest absolute hue rotation in radians.
    pub max_delta_hue: f32,
    /// Lower bound of the saturation factor.
    pub lower_saturation: f32,
    /// Upper bound of the saturation factor.
    pub upper_saturation: f32,
    /// Lower bound of the luma shift.
    pub lower_value: f32,
    /// Upper bound of the luma shift.
    pub upper_value: f32,
}

impl Default for RandomHsvRange {
    fn default() -> Self {
        Self {
            max_delta_hue: 0.0,
            lower_saturation: 1.0,
            upper_saturation: 1.0,
            lower_value: 0.0,
            upper_value: 0.0,
        }
    }
}

impl RandomHsvRange {
    /// Check that the bounds are finite and ordered.
    pub fn validate(&self) -> Result<(), KernelError> {
        ensure_finite("max_delta_hue", self.max_delta_hue)?;
        ensure_finite("lower_saturation", self.lower_saturation)?;
        ensure_finite("upper_saturation", self.upper_saturation)?;
        ensure_finite("lower_value", self.lower_value)?;
        ensure_finite("upper_value", self.upper_value)?;

        if self.max_delta_hue < 0.0 {
            return Err(KernelError::ParameterOutOfRange {
                name: "max_delta_hue",
                reason: format!("must be non-negative, got {}", self.max_delta_hue),
            });
        }
        if self.lower_saturation < 0.0 {
            return Err(KernelError::ParameterOutOfRange {
                name: "lower_saturation",
                reason: format!("must be non-negative, got {}", self.lower_saturation),
            });
        }
        if self.lower_saturation > self.upper_saturation {
            return Err(KernelError::ParameterOutOfRange {
                name: "upper_saturation",
                reason: format!(
                    "must not be below lower_saturation ({} < {})",
                    self.upper_saturation, self.lower_saturation
                ),
            });
        }
        if self.lower_value > self.upper_value {
            return Err(KernelError::ParameterOutOfRange {
                name: "upper_value",
                reason: format!(
                    "must not be below lower_value ({} < {})",
                    self.upper_value, self.lower_value
                ),
            });
        }
        Ok(())
    }

    /// Draw an adjustment uniformly from the ranges.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<HsvDelta, KernelError> {
        self.validate()?;
        Ok(HsvDelta {
            hue: rng.random_range(-self.max_delta_hue..=self.max_delta_hue),
            saturation: rng.random_range(self.lower_saturation..=self.upper_saturation),
            value: rng.random_range(self.lower_value..=self.upper_value),
        })
    }
}

/// Affine color map in unit range, expressed on the channel differences of a pixel:
///
/// `y = r + luma . (g - r, b - r) + offset` and `rgb' = y + chroma * (g - r, b - r)`.
///
/// Gray pixels have no differences, so they map to `r + offset` for any saturation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct HsvTransform {
    pub luma: [f64; 2],
    pub chroma: [f64; 6],
    pub offset: f64,
}

impl HsvTransform {
    #[inline]
    fn apply(&self, [r, g, b]: [f64; 3]) -> [f64; 3] {
        let (dg, db) = (g - r, b - r);
        let y = r + self.luma[0] * dg + self.luma[1] * db + self.offset;
        let c = &self.chroma;
        [
            y + c[0] * dg + c[1] * db,
            y + c[2] * dg + c[3] * db,
            y + c[4] * dg + c[5] * db,
        ]
    }
}

fn matmul3(a: &[f64; 9], b: &[f64; 9]) -> [f64; 9] {
    let mut out = [0.0; 9];
    for r in 0..3 {
        for c in 0..3 {
            out[r * 3 + c] = a[r * 3] * b[c]
                + a[r * 3 + 1] * b[3 + c]
                + a[r * 3 + 2] * b[6 + c];
        }
    }
    out
}

/// Color adjustment is only defined for intensity samples.
pub(crate) fn ensure_supported<T: ImageDtype>() -> Result<(), KernelError> {
    if !T::CONTINUOUS {
        return Err(KernelError::Unsupported {
            operation: "hsv adjustment",
            dtype: T::NAME,
        });
    }
    Ok(())
}

/// Apply a folded transform to a buffer of interleaved RGB pixels, `cols` pixels per row.
pub(crate) fn adjust_hsv_slice<T: ImageDtype>(
    src: &[T],
    dst: &mut [T],
    cols: usize,
    transform: &HsvTransform,
    strategy: ExecutionStrategy,
) -> Result<(), KernelError> {
    ensure_supported::<T>()?;

    let row_len = cols * 3;
    let scale = 1.0 / T::MAX_VALUE as f64;
    parallel::for_each_row_zip(strategy, src, row_len, dst, row_len, |src_row, dst_row| {
        src_row
            .chunks_exact(3)
            .zip(dst_row.chunks_exact_mut(3))
            .for_each(|(s, d)| {
                let rgb = [
                    s[0].to_f32() as f64 * scale,
                    s[1].to_f32() as f64 * scale,
                    s[2].to_f32() as f64 * scale,
                ];
                for (d, v) in d.iter_mut().zip(transform.apply(rgb)) {
                    *d = T::from_f32(v.clamp(0.0, 1.0) as f32 * T::MAX_VALUE);
                }
            });
    })?;

    Ok(())
}

/// Adjust hue, saturation and value of an RGB image.
///
/// The image is converted to YIQ, the luma is shifted by `delta.value`, the chroma plane
/// is scaled by `delta.saturation` and rotated by `delta.hue` radians, and the result is
/// converted back to RGB and clamped to the valid range of the sample type.
///
/// # Arguments
///
/// * `src` - The input RGB image assumed to have 3 channels.
/// * `dst` - The output RGB image.
/// * `delta` - The adjustment to apply.
///
/// Precondition: the input and output images must have the same size.
///
/// # Errors
///
/// * `InvalidShape` if the images have different sizes.
/// * `InvalidArgument` if a parameter is not finite or the saturation is negative.
/// * `Unsupported` for `bool` images.
///
/// # Example
///
/// ```
/// use pixops_image::{Image, ImageSize};
/// use pixops_imgproc::color::{adjust_hsv, HsvDelta};
///
/// let image = Image::<u8, 3>::new(
///     ImageSize {
///         width: 1,
///         height: 1,
///     },
///     vec![200, 100, 50],
/// )
/// .unwrap();
///
/// let mut gray = Image::<u8, 3>::from_size_val(image.size(), 0).unwrap();
/// adjust_hsv(&image, &mut gray, &HsvDelta::new(0.0, 0.0, 0.0)).unwrap();
///
/// let px = gray.as_slice();
/// assert_eq!(px[0], px[1]);
/// assert_eq!(px[1], px[2]);
/// ```
pub fn adjust_hsv<T: ImageDtype>(
    src: &Image<T, 3>,
    dst: &mut Image<T, 3>,
    delta: &HsvDelta,
) -> Result<(), KernelError> {
    adjust_hsv_with(src, dst, delta, ExecutionStrategy::default())
}

/// Same as [`adjust_hsv`] with an explicit execution strategy.
pub fn adjust_hsv_with<T: ImageDtype>(
    src: &Image<T, 3>,
    dst: &mut Image<T, 3>,
    delta: &HsvDelta,
    strategy: ExecutionStrategy,
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

    let transform = delta.transform()?;
    log::trace!("adjust_hsv {} {:?} -> {:?}", src.size(), delta, transform);

    adjust_hsv_slice(
        src.as_slice(),
        dst.as_slice_mut(),
        src.cols(),
        &transform,
        strategy,
    )
}
