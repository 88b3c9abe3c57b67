use std::{fmt, str::FromStr};

use pixops_image::{Image, ImageDtype};

use super::bilinear::bilinear_interpolation;
use super::border::FillMode;
use super::nearest::nearest_neighbor_interpolation;
use crate::error::KernelError;

/// Interpolation mode for the warp operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InterpolationMode {
    /// Bilinear interpolation
    #[default]
    Bilinear,
    /// Nearest neighbor interpolation
    Nearest,
}

impl InterpolationMode {
    /// The canonical name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            InterpolationMode::Bilinear => "bilinear",
            InterpolationMode::Nearest => "nearest",
        }
    }
}

impl fmt::Display for InterpolationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterpolationMode {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bilinear" => Ok(InterpolationMode::Bilinear),
            "nearest" => Ok(InterpolationMode::Nearest),
            _ => Err(KernelError::UnknownMode {
                kind: "interpolation",
                name: s.to_string(),
            }),
        }
    }
}

/// Borrowed view of one interleaved `[rows, cols, channels]` image.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SourceView<'a, T> {
    pub data: &'a [T],
    pub rows: usize,
    pub cols: usize,
    pub channels: usize,
}

impl<'a, T: Copy> SourceView<'a, T> {
    pub fn from_image<const C: usize>(image: &'a Image<T, C>) -> Self {
        Self {
            data: image.as_slice(),
            rows: image.rows(),
            cols: image.cols(),
            channels: C,
        }
    }

    /// The channels of the pixel at `(row, col)`, both already in range.
    #[inline]
    pub fn pixel(&self, row: usize, col: usize) -> &'a [T] {
        let base = (row * self.cols + col) * self.channels;
        &self.data[base..base + self.channels]
    }
}

/// Sample a source view at the continuous coordinate `(u, v)`.
///
/// Pixel `i` covers `[i, i + 1)`, so the center of pixel `(0, 0)` is at `(0.5, 0.5)`.
/// `pixel` must hold `src.channels` elements.
#[inline]
pub(crate) fn sample_into<T: ImageDtype>(
    src: &SourceView<'_, T>,
    u: f32,
    v: f32,
    interpolation: InterpolationMode,
    fill_mode: FillMode,
    fill_value: f32,
    pixel: &mut [T],
) {
    let inside = u >= 0.0 && u < src.cols as f32 && v >= 0.0 && v < src.rows as f32;
    if !u.is_finite() || !v.is_finite() || (!inside && fill_mode == FillMode::Constant) {
        pixel.fill(T::from_f32(fill_value));
        return;
    }

    match interpolation {
        InterpolationMode::Nearest => {
            nearest_neighbor_interpolation(src, u, v, fill_mode, fill_value, pixel)
        }
        InterpolationMode::Bilinear => {
            bilinear_interpolation(src, u, v, fill_mode, fill_value, pixel)
        }
    }
}

/// Kernel for interpolating a pixel value
///
/// # Arguments
///
/// * `image` - The input image container with shape (height, width, C).
/// * `u` - The continuous x coordinate of the pixel to interpolate.
/// * `v` - The continuous y coordinate of the pixel to interpolate.
/// * `interpolation` - The interpolation mode to use.
/// * `fill_mode` - How to resolve samples outside the image.
/// * `fill_value` - The value used by [`FillMode::Constant`].
///
/// # Returns
///
/// The interpolated pixel value.
///
/// Bilinear interpolation of `bool` images mixes class labels; the warp kernels reject
/// that combination before sampling.
pub fn interpolate_pixel<T: ImageDtype, const C: usize>(
    image: &Image<T, C>,
    u: f32,
    v: f32,
    interpolation: InterpolationMode,
    fill_mode: FillMode,
    fill_value: f32,
) -> [T; C] {
    let mut pixel = [T::default(); C];
    sample_into(
        &SourceView::from_image(image),
        u,
        v,
        interpolation,
        fill_mode,
        fill_value,
        &mut pixel,
    );
    pixel
}
