use crate::error::KernelError;

#[rustfmt::skip]
fn determinant3x3(m: &[f32; 9]) -> f32 {
    m[0] * (m[4] * m[8] - m[5] * m[7]) -
    m[1] * (m[3] * m[8] - m[5] * m[6]) +
    m[2] * (m[3] * m[7] - m[4] * m[6])
}

#[rustfmt::skip]
fn adjugate3x3(m: &[f32; 9]) -> [f32; 9] {
    [
        m[4] * m[8] - m[5] * m[7],  // [0, 0]
        m[2] * m[7] - m[1] * m[8],  // [0, 1]
        m[1] * m[5] - m[2] * m[4],  // [0, 2]
        m[5] * m[6] - m[3] * m[8],  // [1, 0]
        m[0] * m[8] - m[2] * m[6],  // [1, 1]
        m[2] * m[3] - m[0] * m[5],  // [1, 2]
        m[3] * m[7] - m[4] * m[6],  // [2, 0]
        m[1] * m[6] - m[0] * m[7],  // [2, 1]
        m[0] * m[4] - m[1] * m[3],  // [2, 2]
    ]
}

/// A 3x3 homogeneous transform, row-major.
///
/// The warp kernels use the inverse-mapping convention: the matrix maps *output* pixel
/// coordinates to *source* pixel coordinates. Coordinates are continuous, pixel `i`
/// covering `[i, i + 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Homography(pub [f32; 9]);

impl Default for Homography {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[f32; 9]> for Homography {
    fn from(m: [f32; 9]) -> Self {
        Self(m)
    }
}

impl Homography {
    /// The identity transform.
    #[rustfmt::skip]
    pub fn identity() -> Self {
        Self([
            1.0, 0.0, 0.0,
            0.0, 1.0, 0.0,
            0.0, 0.0, 1.0,
        ])
    }

    /// Build a transform from its eight free parameters `[a0, a1, a2, b0, b1, b2, c0, c1]`.
    ///
    /// The last entry is the implicit 1.
    pub fn from_flat(p: [f32; 8]) -> Self {
        Self([p[0], p[1], p[2], p[3], p[4], p[5], p[6], p[7], 1.0])
    }

    /// The eight free parameters, normalized so that the last entry is 1.
    pub fn to_flat(&self) -> Result<[f32; 8], KernelError> {
        let m = &self.0;
        if m[8] == 0.0 || !m[8].is_finite() {
            return Err(KernelError::ParameterOutOfRange {
                name: "matrix",
                reason: format!("last entry must be finite and non-zero, got {}", m[8]),
            });
        }
        let s = 1.0 / m[8];
        Ok([
            m[0] * s,
            m[1] * s,
            m[2] * s,
            m[3] * s,
            m[4] * s,
            m[5] * s,
            m[6] * s,
            m[7] * s,
        ])
    }

    /// Shift the image content by `(dx, dy)` pixels.
    ///
    /// Output pixel `(x, y)` samples the source at `(x - dx, y - dy)`.
    #[rustfmt::skip]
    pub fn translation(dx: f32, dy: f32) -> Self {
        Self([
            1.0, 0.0, -dx,
            0.0, 1.0, -dy,
            0.0, 0.0, 1.0,
        ])
    }

    /// Rotate the image content by `angle` radians about the center of a
    /// `width x height` image.
    ///
    /// Output pixel `p` samples the source at `R(angle) * (p - c) + c` where `c` is the
    /// image center, so positive angles turn the content counter-clockwise on screen.
    pub fn rotation(angle: f32, width: usize, height: usize) -> Self {
        let (sin, cos) = angle.sin_cos();
        let cx = width as f32 * 0.5;
        let cy = height as f32 * 0.5;
        let x_offset = cx - (cos * cx - sin * cy);
        let y_offset = cy - (sin * cx + cos * cy);
        Self([cos, -sin, x_offset, sin, cos, y_offset, 0.0, 0.0, 1.0])
    }

    /// The matrix product `self * other`.
    ///
    /// When mapping output to source coordinates, `other` is applied first.
    pub fn compose(&self, other: &Homography) -> Homography {
        let (a, b) = (&self.0, &other.0);
        let mut out = [0.0; 9];
        for r in 0..3 {
            for c in 0..3 {
                out[r * 3 + c] =
                    a[r * 3] * b[c] + a[r * 3 + 1] * b[3 + c] + a[r * 3 + 2] * b[6 + c];
            }
        }
        Homography(out)
    }

    /// The inverse transform, computed from the adjugate and the determinant.
    ///
    /// Converts a forward (source -> output) matrix into the inverse-mapping convention
    /// expected by the warp kernels, and back.
    pub fn inverse(&self) -> Result<Homography, KernelError> {
        self.validate()?;

        let det = determinant3x3(&self.0);
        if det == 0.0 || !det.is_finite() {
            return Err(KernelError::SingularMatrix);
        }

        let inv_det = 1.0 / det;
        Ok(Homography(adjugate3x3(&self.0).map(|v| v * inv_det)))
    }

    /// Check that every entry is finite.
    pub fn validate(&self) -> Result<(), KernelError> {
        if self.0.iter().any(|v| !v.is_finite()) {
            return Err(KernelError::NonFiniteMatrix(self.0));
        }
        Ok(())
    }

    /// Map a point, returning `None` when the homogeneous coordinate vanishes or the
    /// result is not finite.
    #[inline]
    pub fn transform_point(&self, x: f32, y: f32) -> Option<(f32, f32)> {
        let m = &self.0;
        let w = m[6] * x + m[7] * y + m[8];
        if w.abs() < f32::EPSILON {
            return None;
        }
        let u = (m[0] * x + m[1] * y + m[2]) / w;
        let v = (m[3] * x + m[4] * y + m[5]) / w;
        if !u.is_finite() || !v.is_finite() {
            return None;
        }
        Some((u, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn inverse_translation() -> Result<(), KernelError> {
        let m = Homography([1.0, 0.0, -1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0]);
        let expected = Homography([1.0, 0.0, 1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0]);
        assert_eq!(m.inverse()?, expected);
        Ok(())
    }

    #[test]
    fn inverse_composes_to_identity() -> Result<(), KernelError> {
        let m = Homography([0.9, 0.1, 3.0, -0.2, 1.1, -2.0, 0.001, 0.002, 1.0]);
        let id = m.compose(&m.inverse()?);
        for (a, b) in id.0.iter().zip(Homography::identity().0) {
            assert_abs_diff_eq!(*a, b, epsilon = 1e-5);
        }
        Ok(())
    }

    #[test]
    fn singular_and_non_finite() {
        let singular = Homography([1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 0.0, 0.0, 1.0]);
        assert_eq!(singular.inverse(), Err(KernelError::SingularMatrix));

        let mut m = Homography::identity();
        m.0[4] = f32::NAN;
        assert!(matches!(
            m.inverse(),
            Err(KernelError::NonFiniteMatrix(_))
        ));
    }

    #[test]
    fn flat_roundtrip_normalizes() -> Result<(), KernelError> {
        let flat = [1.0, 0.5, 2.0, 0.0, 1.0, -3.0, 0.0, 0.0];
        assert_eq!(Homography::from_flat(flat).to_flat()?, flat);

        let scaled = Homography([2.0, 1.0, 4.0, 0.0, 2.0, -6.0, 0.0, 0.0, 2.0]);
        assert_eq!(scaled.to_flat()?, flat);

        let mut bad = Homography::identity();
        bad.0[8] = 0.0;
        assert!(bad.to_flat().is_err());
        Ok(())
    }

    #[test]
    fn rotation_about_center() {
        let m = Homography::rotation(std::f32::consts::FRAC_PI_2, 4, 2);
        let (cx, cy) = m.transform_point(2.0, 1.0).unwrap_or_default();
        assert_abs_diff_eq!(cx, 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(cy, 1.0, epsilon = 1e-6);

        // one unit right of the center comes from one unit below it
        let (x, y) = m.transform_point(3.0, 1.0).unwrap_or_default();
        assert_abs_diff_eq!(x, 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(y, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn compose_applies_right_first() {
        let shift = Homography::translation(-2.0, 0.0);
        let scale = Homography([2.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 1.0]);
        // scale(shift(p)): (1, 1) -> (3, 1) -> (6, 2)
        let (x, y) = scale.compose(&shift).transform_point(1.0, 1.0).unwrap_or_default();
        assert_eq!((x, y), (6.0, 2.0));
    }

    #[test]
    fn degenerate_w() {
        let m = Homography([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, -1.0]);
        assert_eq!(m.transform_point(1.0, 5.0), None);
        assert!(m.transform_point(2.0, 5.0).is_some());
    }
}
