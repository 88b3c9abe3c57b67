use pixops_image::ImageDtype;

use super::border::FillMode;
use super::interpolate::SourceView;

/// Kernel for nearest neighbor interpolation
///
/// Takes pixel `(floor(u), floor(v))`, resolving out-of-range indices with the fill mode.
/// Samples are copied without conversion.
pub(crate) fn nearest_neighbor_interpolation<T: ImageDtype>(
    src: &SourceView<'_, T>,
    u: f32,
    v: f32,
    fill_mode: FillMode,
    fill_value: f32,
    pixel: &mut [T],
) {
    let col = fill_mode.map_index(u.floor() as i64, src.cols);
    let row = fill_mode.map_index(v.floor() as i64, src.rows);

    match (row, col) {
        (Some(row), Some(col)) => pixel.copy_from_slice(src.pixel(row, col)),
        _ => pixel.fill(T::from_f32(fill_value)),
    }
}
