use std::ops::{ Add, Sub, Neg, Mul };

use crate::feq;
use crate::consts::ZERO_EPSILON;
use crate::error::{ Result, TracerError };

/// A point or a vector in homogeneous coordinates.
///
/// A `w` of `1.0` marks a point, a `w` of `0.0` marks a vector. Equality is
/// approximate; each component is compared with `feq`.
#[derive(Debug, Default, Copy, Clone, PartialOrd)]
pub struct Tuple4D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64
}

impl PartialEq for Tuple4D {
    fn eq(&self, other: &Tuple4D) -> bool {
        feq(self.x, other.x) &&
            feq(self.y, other.y) &&
            feq(self.z, other.z) &&
            feq(self.w, other.w)
    }
}

impl Tuple4D {
    pub fn tuple(x: f64, y: f64, z: f64, w: f64) -> Tuple4D {
        Tuple4D { x, y, z, w }
    }

    pub fn point(x: f64, y: f64, z: f64) -> Tuple4D {
        Tuple4D { x, y, z, w: 1.0 }
    }

    pub fn vector(x: f64, y: f64, z: f64) -> Tuple4D {
        Tuple4D { x, y, z, w: 0.0 }
    }

    pub fn origin() -> Tuple4D {
        Tuple4D::point(0.0, 0.0, 0.0)
    }

    pub fn is_point(&self) -> bool {
        feq(self.w, 1.0)
    }

    pub fn is_vector(&self) -> bool {
        feq(self.w, 0.0)
    }

    pub fn magnitude(&self) -> f64 {
        f64::sqrt(
            self.x.powi(2)
            + self.y.powi(2)
            + self.z.powi(2)
            + self.w.powi(2)
        )
    }

    /// Scales a tuple to unit length.
    ///
    /// Fails with `DegenerateVector` on a zero-length tuple.
    ///
    /// ```
    /// # use sphere_tracer::tuple::Tuple4D;
    /// let v = Tuple4D::vector(4.0, 0.0, 0.0);
    /// assert_eq!(v.normalize().unwrap(), Tuple4D::vector(1.0, 0.0, 0.0));
    /// assert!(Tuple4D::vector(0.0, 0.0, 0.0).normalize().is_err());
    /// ```
    pub fn normalize(&self) -> Result<Tuple4D> {
        let mag = self.magnitude();
        if mag < ZERO_EPSILON {
            return Err(TracerError::DegenerateVector);
        }

        Ok(*self * (1.0 / mag))
    }

    pub fn dot(&self, other: &Tuple4D) -> f64 {
        self.x * other.x
            + self.y * other.y
            + self.z * other.z
            + self.w * other.w
    }

    /// Cross product of two vectors.
    ///
    /// Only defined on vectors; a point on either side yields
    /// `InvalidOperand`.
    pub fn cross(&self, other: &Tuple4D) -> Result<Tuple4D> {
        if !self.is_vector() || !other.is_vector() {
            return Err(TracerError::InvalidOperand);
        }

        Ok(Tuple4D {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
            w: 0.0
        })
    }

    /// Reflects a vector across a normal.
    pub fn reflect(&self, normal: &Tuple4D) -> Tuple4D {
        *self - (*normal * 2.0 * self.dot(normal))
    }
}

impl Add for Tuple4D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
            w: self.w + other.w
        }
    }
}

impl Sub for Tuple4D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
            w: self.w - other.w
        }
    }
}

impl Neg for Tuple4D {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: -self.w
        }
    }
}

/// Scalar right-multiplication.
///
/// ```
/// use sphere_tracer::tuple::Tuple4D;
///
/// let t = Tuple4D::tuple(1.0, 2.0, 3.0, 4.0);
/// assert_eq!(t * 5.0, Tuple4D::tuple(5.0, 10.0, 15.0, 20.0));
/// ```
impl Mul<f64> for Tuple4D {
    type Output = Self;

    fn mul(self, other: f64) -> Self {
        Self {
            x: self.x * other,
            y: self.y * other,
            z: self.z * other,
            w: self.w * other
        }
    }
}

/// Scalar left-multiplication.
///
/// ```
/// use sphere_tracer::tuple::Tuple4D;
///
/// let t = Tuple4D::tuple(1.0, 2.0, 3.0, 4.0);
/// assert_eq!(5.0 * t, Tuple4D::tuple(5.0, 10.0, 15.0, 20.0));
/// ```
impl Mul<Tuple4D> for f64 {
    type Output = Tuple4D;

    fn mul(self, other: Tuple4D) -> Tuple4D {
        other * self
    }
}

/* Tests */

#[test]
fn point_and_vector_kinds() {
    let p = Tuple4D::point(4.3, -4.2, 3.1);
    let v = Tuple4D::vector(4.3, -4.2, 3.1);

    assert!(p.is_point() && !p.is_vector());
    assert!(v.is_vector() && !v.is_point());
}

#[test]
fn add_tuples() {
    let a1 = Tuple4D::tuple(3.0, -2.0, 5.0, 1.0);
    let a2 = Tuple4D::tuple(-2.0, 3.0, 1.0, 0.0);

    assert_eq!(a1 + a2, Tuple4D::tuple(1.0, 1.0, 6.0, 1.0));
}

#[test]
fn sub_points() {
    let p1 = Tuple4D::point(3.0, 2.0, 1.0);
    let p2 = Tuple4D::point(5.0, 6.0, 7.0);

    assert_eq!(p1 - p2, Tuple4D::vector(-2.0, -4.0, -6.0));
}

#[test]
fn sub_vector_from_point() {
    let p = Tuple4D::point(3.0, 2.0, 1.0);
    let v = Tuple4D::vector(5.0, 6.0, 7.0);

    assert_eq!(p - v, Tuple4D::point(-2.0, -4.0, -6.0));
}

#[test]
fn neg_tuple() {
    let a = Tuple4D::tuple(1.0, -2.0, 3.0, -4.0);

    assert_eq!(-a, Tuple4D::tuple(-1.0, 2.0, -3.0, 4.0));
}

#[test]
fn mul_fraction() {
    let a = Tuple4D::tuple(1.0, -2.0, 3.0, -4.0);

    assert_eq!(a * 0.5, Tuple4D::tuple(0.5, -1.0, 1.5, -2.0));
}

#[test]
fn magnitude_neg() {
    let v = Tuple4D::vector(-1.0, -2.0, -3.0);

    assert_eq!(v.magnitude(), f64::sqrt(14.0));
}

#[test]
fn normalize_dirty() {
    let v = Tuple4D::vector(1.0, 2.0, 3.0);
    let e = Tuple4D::vector(
        1.0 / f64::sqrt(14.0),
        2.0 / f64::sqrt(14.0),
        3.0 / f64::sqrt(14.0)
    );

    assert_eq!(v.normalize().unwrap(), e);
}

#[test]
fn normalized_vectors_have_unit_magnitude() {
    let vs = [
        Tuple4D::vector(1.0, 2.0, 3.0),
        Tuple4D::vector(-0.001, 0.0, 0.002),
        Tuple4D::vector(1e6, -3e5, 42.0),
        Tuple4D::vector(0.0, 0.0, -7.5),
    ];

    for v in vs.iter() {
        assert!(crate::feq(v.normalize().unwrap().magnitude(), 1.0));
    }
}

#[test]
fn normalize_zero_vector_fails() {
    let v = Tuple4D::vector(0.0, 0.0, 0.0);

    assert!(matches!(v.normalize(), Err(TracerError::DegenerateVector)));
}

#[test]
fn dot_vectors() {
    let a = Tuple4D::vector(1.0, 2.0, 3.0);
    let b = Tuple4D::vector(2.0, 3.0, 4.0);

    assert_eq!(a.dot(&b), 20.0);
}

#[test]
fn cross_vectors() {
    let a = Tuple4D::vector(1.0, 2.0, 3.0);
    let b = Tuple4D::vector(2.0, 3.0, 4.0);

    assert_eq!(a.cross(&b).unwrap(), Tuple4D::vector(-1.0, 2.0, -1.0));
    assert_eq!(b.cross(&a).unwrap(), Tuple4D::vector(1.0, -2.0, 1.0));
}

#[test]
fn cross_with_point_fails() {
    let p = Tuple4D::point(1.0, 2.0, 3.0);
    let v = Tuple4D::vector(2.0, 3.0, 4.0);

    assert!(matches!(p.cross(&v), Err(TracerError::InvalidOperand)));
    assert!(matches!(v.cross(&p), Err(TracerError::InvalidOperand)));
}

#[test]
fn reflect_45() {
    let v = Tuple4D::vector(1.0, -1.0, 0.0);
    let n = Tuple4D::vector(0.0, 1.0, 0.0);

    assert_eq!(v.reflect(&n), Tuple4D::vector(1.0, 1.0, 0.0));
}

#[test]
fn reflect_slanted() {
    let v = Tuple4D::vector(0.0, -1.0, 0.0);
    let n = Tuple4D::vector(2.0f64.sqrt() / 2.0, 2.0f64.sqrt() / 2.0, 0.0);

    assert_eq!(v.reflect(&n), Tuple4D::vector(1.0, 0.0, 0.0));
}
