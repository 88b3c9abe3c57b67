use std::{fmt, str::FromStr};

use crate::error::KernelError;

/// How samples that fall outside the source image are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FillMode {
    /// Use the constant fill value.
    ///
    /// Example: ...d c b a | k k k k...
    #[default]
    Constant,

    /// Mirror the image including the edge pixel, with period `2 * len`.
    ///
    /// Example: ...d c b a | a b c d...
    Reflect,

    /// Wrap around to the opposite side of the image.
    ///
    /// Example: ...d c b a | w x y z...
    Wrap,

    /// Repeat the outermost pixel.
    ///
    /// Example: ...d c b a | a a a a...
    NearestEdge,
}

impl FillMode {
    #[inline]
    fn reflect(i: i64, len: i64) -> i64 {
        let m = i.rem_euclid(2 * len);
        if m >= len {
            2 * len - 1 - m
        } else {
            m
        }
    }

    /// Maps index `i` to a valid index i.e. within `[0, len)` according to the fill mode.
    ///
    /// - `Constant`: `None` when `i` is out of range
    /// - `Reflect`: mirror including edge, `-1 -> 0` and `len -> len - 1`
    /// - `Wrap`: circular wrap
    /// - `NearestEdge`: clamp to edge
    ///
    /// Always `None` when `len` is zero.
    #[inline]
    pub fn map_index(&self, i: i64, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let n = len as i64;
        if (0..n).contains(&i) {
            return Some(i as usize);
        }
        let mapped = match self {
            FillMode::Constant => return None,
            FillMode::Reflect => Self::reflect(i, n),
            FillMode::Wrap => i.rem_euclid(n),
            FillMode::NearestEdge => i.clamp(0, n - 1),
        };
        Some(mapped as usize)
    }

    /// The canonical name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            FillMode::Constant => "constant",
            FillMode::Reflect => "reflect",
            FillMode::Wrap => "wrap",
            FillMode::NearestEdge => "nearest_edge",
        }
    }
}

impl fmt::Display for FillMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FillMode {
    type Err = KernelError;

    /// Parses a fill mode name, case-insensitive. `nearest` is accepted as an alias of
    /// `nearest_edge`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "constant" => Ok(FillMode::Constant),
            "reflect" => Ok(FillMode::Reflect),
            "wrap" => Ok(FillMode::Wrap),
            "nearest" | "nearest_edge" => Ok(FillMode::NearestEdge),
            _ => Err(KernelError::UnknownMode {
                kind: "fill",
                name: s.to_string(),
            }),
        }
    }
}
