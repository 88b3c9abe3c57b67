mod hsv;
mod yiq;

pub(crate) use hsv::{adjust_hsv_slice, ensure_supported};
pub use hsv::{adjust_hsv, adjust_hsv_with, HsvDelta, RandomHsvRange};
pub use yiq::{rgb_from_yiq, yiq_from_rgb};
