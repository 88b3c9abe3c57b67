use pixops_image::ImageDtype;

use super::border::FillMode;
use super::interpolate::SourceView;

/// Kernel for bilinear interpolation
///
/// Blends the four pixels whose centers surround `(u, v)`. Each tap is resolved on its own
/// with the fill mode, so a constant fill only contributes through the taps that fall
/// outside the image.
pub(crate) fn bilinear_interpolation<T: ImageDtype>(
    src: &SourceView<'_, T>,
    u: f32,
    v: f32,
    fill_mode: FillMode,
    fill_value: f32,
    pixel: &mut [T],
) {
    let x = u - 0.5;
    let y = v - 0.5;
    let x0f = x.floor();
    let y0f = y.floor();

    let frac_u = x - x0f;
    let frac_v = y - y0f;
    let frac_uu = 1.0 - frac_u;
    let frac_vv = 1.0 - frac_v;

    let w00 = frac_uu * frac_vv;
    let w01 = frac_u * frac_vv;
    let w10 = frac_uu * frac_v;
    let w11 = frac_u * frac_v;

    let x0 = x0f as i64;
    let y0 = y0f as i64;
    let ix0 = fill_mode.map_index(x0, src.cols);
    let ix1 = fill_mode.map_index(x0.saturating_add(1), src.cols);
    let iy0 = fill_mode.map_index(y0, src.rows);
    let iy1 = fill_mode.map_index(y0.saturating_add(1), src.rows);

    let tap = |row: Option<usize>, col: Option<usize>, k: usize| -> f32 {
        match (row, col) {
            (Some(row), Some(col)) => src.pixel(row, col)[k].to_f32(),
            _ => fill_value,
        }
    };

    for (k, out) in pixel.iter_mut().enumerate() {
        let value = tap(iy0, ix0, k) * w00
            + tap(iy0, ix1, k) * w01
            + tap(iy1, ix0, k) * w10
            + tap(iy1, ix1, k) * w11;
        *out = T::from_f32(value);
    }
}
