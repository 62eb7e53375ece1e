//! 2D affine transforms.
//!
//! Matrices use the canvas convention `[a b c d e f]`:
//!
//! ```text
//! x' = a·x + c·y + e
//! y' = b·x + d·y + f
//! ```
//!
//! Angles are in degrees. With a y-down world a positive angle turns
//! clockwise on screen.

use crate::geometry::Point;

/// Affine transform matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn scaling(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    pub fn rotation(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Rotation by `degrees` around `center`.
    pub fn rotation_about(degrees: f64, center: Point) -> Self {
        Self::translation(center.x, center.y)
            .multiply(&Self::rotation(degrees))
            .multiply(&Self::translation(-center.x, -center.y))
    }

    /// Matrix product `self · other`: `other` is applied first.
    pub fn multiply(&self, other: &Affine) -> Affine {
        Affine {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    /// Apply `self`, then `next`.
    pub fn then(&self, next: &Affine) -> Affine {
        next.multiply(self)
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Inverse matrix, `None` when the matrix is singular.
    pub fn invert(&self) -> Option<Affine> {
        let det = self.determinant();
        if det.abs() < 1e-12 {
            return None;
        }
        Some(Affine {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
            e: (self.c * self.f - self.d * self.e) / det,
            f: (self.b * self.e - self.a * self.f) / det,
        })
    }

    pub fn transform_point(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// QR-style decomposition into translation, rotation, scale and skew.
    ///
    /// Scale on x comes from the first column norm; the y scale is signed
    /// and carries any reflection.
    pub fn decompose(&self) -> Decomposed {
        let denom = self.a * self.a + self.b * self.b;
        let scale_x = denom.sqrt();
        let (scale_y, skew_x) = if scale_x == 0.0 {
            ((self.c * self.c + self.d * self.d).sqrt(), 0.0)
        } else {
            (
                self.determinant() / scale_x,
                (self.a * self.c + self.b * self.d).atan2(denom).to_degrees(),
            )
        };

        Decomposed {
            translate_x: self.e,
            translate_y: self.f,
            angle: self.b.atan2(self.a).to_degrees(),
            scale_x,
            scale_y,
            skew_x,
        }
    }

    pub fn approx_eq(&self, other: &Affine, epsilon: f64) -> bool {
        [
            self.a - other.a,
            self.b - other.b,
            self.c - other.c,
            self.d - other.d,
            self.e - other.e,
            self.f - other.f,
        ]
        .iter()
        .all(|delta| delta.abs() <= epsilon)
    }
}

/// Result of [`Affine::decompose`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decomposed {
    pub translate_x: f64,
    pub translate_y: f64,
    /// Degrees
    pub angle: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Degrees
    pub skew_x: f64,
}

/// Where a primitive sits in the world: origin, rotation, scale and flips.
///
/// The matrix is `T(left, top) · R(angle) · S(±scale_x, ±scale_y)`, so
/// scaling and rotation pivot on the primitive's local origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub left: f64,
    pub top: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Degrees
    pub angle: f64,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            flip_x: false,
            flip_y: false,
        }
    }
}

impl Placement {
    /// Untransformed placement with its origin at `(left, top)`.
    pub fn at(left: f64, top: f64) -> Self {
        Self {
            left,
            top,
            ..Default::default()
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn matrix(&self) -> Affine {
        let sx = if self.flip_x { -self.scale_x } else { self.scale_x };
        let sy = if self.flip_y { -self.scale_y } else { self.scale_y };
        Affine::translation(self.left, self.top)
            .multiply(&Affine::rotation(self.angle))
            .multiply(&Affine::scaling(sx, sy))
    }

    /// Rebuild a placement from a decomposition. Skew is dropped and
    /// reflections stay in the signed scale, so both flips are cleared.
    pub fn from_decomposed(d: &Decomposed) -> Self {
        Self {
            left: d.translate_x,
            top: d.translate_y,
            scale_x: d.scale_x,
            scale_y: d.scale_y,
            angle: d.angle,
            flip_x: false,
            flip_y: false,
        }
    }

    pub fn from_matrix(matrix: &Affine) -> Self {
        Self::from_decomposed(&matrix.decompose())
    }
}
