//! DOMMatrix type for 2D transformation matrices.

use std::f64::consts::PI;

const RAD_PER_DEG: f64 = PI / 180.0;

/// DOMMatrix represents a 2D transformation matrix.
///
/// The matrix is represented as:
/// ```text
/// | a c e |
/// | b d f |
/// | 0 0 1 |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DOMMatrix {
    /// Scale X component.
    pub a: f64,
    /// Skew Y component.
    pub b: f64,
    /// Skew X component.
    pub c: f64,
    /// Scale Y component.
    pub d: f64,
    /// Translate X component.
    pub e: f64,
    /// Translate Y component.
    pub f: f64,
    /// Whether the matrix still describes a 2D transform.
    ///
    /// Starts `true`; inverting a singular matrix flips this to `false`
    /// (and fills the components with NaN) instead of failing.
    is_2d: bool,
}

impl Default for DOMMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl DOMMatrix {
    /// Create a new DOMMatrix with the specified components.
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self {
            a,
            b,
            c,
            d,
            e,
            f,
            is_2d: true,
        }
    }

    /// Create an identity matrix.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// Whether the matrix still describes a 2D transform.
    pub fn is_2d(&self) -> bool {
        self.is_2d
    }

    /// Whether the matrix is the identity.
    pub fn is_identity(&self) -> bool {
        self.a == 1.0
            && self.b == 0.0
            && self.c == 0.0
            && self.d == 1.0
            && self.e == 0.0
            && self.f == 0.0
    }

    /// Multiply: `self x other` (apply `other` first, then `self`).
    pub fn multiply(&self, other: &DOMMatrix) -> DOMMatrix {
        let mut out = DOMMatrix::new(
            self.a * other.a + self.c * other.b,
            self.b * other.a + self.d * other.b,
            self.a * other.c + self.c * other.d,
            self.b * other.c + self.d * other.d,
            self.a * other.e + self.c * other.f + self.e,
            self.b * other.e + self.d * other.f + self.f,
        );
        out.is_2d = self.is_2d && other.is_2d;
        out
    }

    /// Multiply in place: `self = self x other`.
    pub fn multiply_self(&mut self, other: &DOMMatrix) -> &mut Self {
        *self = self.multiply(other);
        self
    }

    /// Pre-multiply in place: `self = other x self`.
    pub fn pre_multiply_self(&mut self, other: &DOMMatrix) -> &mut Self {
        *self = other.multiply(self);
        self
    }

    /// Return a translated copy.
    pub fn translate(&self, tx: f64, ty: f64) -> DOMMatrix {
        self.multiply(&DOMMatrix::new(1.0, 0.0, 0.0, 1.0, tx, ty))
    }

    /// Translate in place.
    pub fn translate_self(&mut self, tx: f64, ty: f64) -> &mut Self {
        *self = self.translate(tx, ty);
        self
    }

    /// Return a scaled copy. A missing `sy` defaults to `sx`.
    pub fn scale(&self, sx: f64, sy: Option<f64>) -> DOMMatrix {
        let sy = sy.unwrap_or(sx);
        self.multiply(&DOMMatrix::new(sx, 0.0, 0.0, sy, 0.0, 0.0))
    }

    /// Scale in place.
    pub fn scale_self(&mut self, sx: f64, sy: Option<f64>) -> &mut Self {
        *self = self.scale(sx, sy);
        self
    }

    /// Return a copy rotated by `angle` degrees.
    pub fn rotate(&self, angle: f64) -> DOMMatrix {
        let rad = angle * RAD_PER_DEG;
        let (sin, cos) = rad.sin_cos();
        self.multiply(&DOMMatrix::new(cos, sin, -sin, cos, 0.0, 0.0))
    }

    /// Rotate in place by `angle` degrees.
    pub fn rotate_self(&mut self, angle: f64) -> &mut Self {
        *self = self.rotate(angle);
        self
    }

    /// Return a copy skewed along the X axis by `angle` degrees.
    pub fn skew_x(&self, angle: f64) -> DOMMatrix {
        let t = (angle * RAD_PER_DEG).tan();
        self.multiply(&DOMMatrix::new(1.0, 0.0, t, 1.0, 0.0, 0.0))
    }

    /// Skew along the X axis in place.
    pub fn skew_x_self(&mut self, angle: f64) -> &mut Self {
        *self = self.skew_x(angle);
        self
    }

    /// Return a copy skewed along the Y axis by `angle` degrees.
    pub fn skew_y(&self, angle: f64) -> DOMMatrix {
        let t = (angle * RAD_PER_DEG).tan();
        self.multiply(&DOMMatrix::new(1.0, t, 0.0, 1.0, 0.0, 0.0))
    }

    /// Skew along the Y axis in place.
    pub fn skew_y_self(&mut self, angle: f64) -> &mut Self {
        *self = self.skew_y(angle);
        self
    }

    /// Return a copy flipped around the vertical axis.
    pub fn flip_x(&self) -> DOMMatrix {
        self.multiply(&DOMMatrix::new(-1.0, 0.0, 0.0, 1.0, 0.0, 0.0))
    }

    /// Return a copy flipped around the horizontal axis.
    pub fn flip_y(&self) -> DOMMatrix {
        self.multiply(&DOMMatrix::new(1.0, 0.0, 0.0, -1.0, 0.0, 0.0))
    }

    /// Return the inverse of this matrix.
    ///
    /// A singular matrix yields a result whose components are all NaN and
    /// whose `is_2d` flag is `false`; callers check those rather than
    /// handling a failure variant.
    pub fn inverse(&self) -> DOMMatrix {
        let mut out = *self;
        out.invert_self();
        out
    }

    /// Invert in place.
    ///
    /// When the determinant is zero the components become NaN and `is_2d`
    /// flips to `false`; the same instance is always returned.
    pub fn invert_self(&mut self) -> &mut Self {
        let det = self.a * self.d - self.b * self.c;
        if det == 0.0 {
            self.a = f64::NAN;
            self.b = f64::NAN;
            self.c = f64::NAN;
            self.d = f64::NAN;
            self.e = f64::NAN;
            self.f = f64::NAN;
            self.is_2d = false;
            return self;
        }

        let new_a = self.d / det;
        let new_b = -self.b / det;
        let new_c = -self.c / det;
        let new_d = self.a / det;
        let new_e = (self.c * self.f - self.d * self.e) / det;
        let new_f = (self.b * self.e - self.a * self.f) / det;
        self.a = new_a;
        self.b = new_b;
        self.c = new_c;
        self.d = new_d;
        self.e = new_e;
        self.f = new_f;
        self
    }

    /// Map a point through the matrix.
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }
}

impl From<tiny_skia::Transform> for DOMMatrix {
    fn from(t: tiny_skia::Transform) -> Self {
        DOMMatrix::new(
            t.sx as f64,
            t.ky as f64,
            t.kx as f64,
            t.sy as f64,
            t.tx as f64,
            t.ty as f64,
        )
    }
}

impl From<DOMMatrix> for tiny_skia::Transform {
    fn from(m: DOMMatrix) -> Self {
        tiny_skia::Transform::from_row(
            m.a as f32,
            m.b as f32,
            m.c as f32,
            m.d as f32,
            m.e as f32,
            m.f as f32,
        )
    }
}
