use std::fmt;
use std::ops::{ Index, Mul };
use std::convert::From;

use crate::feq;
use crate::consts::ZERO_EPSILON;
use crate::error::{ Result, TracerError };
use crate::tuple::Tuple4D;

/// A square matrix of size `N`, stored row-major.
///
/// Only the 4x4 variant is public. The 3x3 and 2x2 variants exist to compute
/// minors and cofactors while inverting a `Matrix4D`.
#[derive(Copy, Clone, Debug)]
struct Minor<const N: usize> {
    data: [[f64; N]; N],
}

impl Minor<2> {
    fn determinant(&self) -> f64 {
        self.data[0][0] * self.data[1][1] - self.data[0][1] * self.data[1][0]
    }
}

impl Minor<3> {
    /// Drops `row` and `col`, leaving a 2x2 matrix.
    fn submatrix(&self, row: usize, col: usize) -> Minor<2> {
        let mut data = [[0.0; 2]; 2];

        for (dr, r) in (0..3).filter(|&r| r != row).enumerate() {
            for (dc, c) in (0..3).filter(|&c| c != col).enumerate() {
                data[dr][dc] = self.data[r][c];
            }
        }

        Minor { data }
    }

    fn cofactor(&self, row: usize, col: usize) -> f64 {
        let m = self.submatrix(row, col).determinant();
        m * if (row + col) % 2 == 0 { 1.0 } else { -1.0 }
    }

    fn determinant(&self) -> f64 {
        (0..3).map(|c| self.data[0][c] * self.cofactor(0, c)).sum()
    }
}

/// A 4x4 matrix.
///
/// These matrices encode transformations in 3D space, acting on both points
/// and vectors (`w` components of `1.0` and `0.0`, respectively).
///
/// A `Matrix4D` is immutable once built. Transformations compose by
/// multiplication and apply right-to-left: in `a * b * p`, `b` moves the
/// point `p` first.
///
/// # Examples
///
/// ```
/// # use sphere_tracer::tuple::Tuple4D;
/// # use sphere_tracer::matrix::Matrix4D;
/// let p = Tuple4D::point(1.0, 0.0, 1.0);
/// let m = Matrix4D::translation(10.0, 5.0, 7.0)
///     * Matrix4D::scaling(5.0, 5.0, 5.0)
///     * Matrix4D::rotation_x(std::f64::consts::PI / 2.0);
/// assert_eq!(m * p, Tuple4D::point(15.0, 0.0, 7.0));
/// ```
#[derive(Copy, Clone, Debug, PartialOrd)]
pub struct Matrix4D {
    data: [f64; 16],
}

/// Element-wise approximate equality.
impl PartialEq for Matrix4D {
    fn eq(&self, other: &Matrix4D) -> bool {
        self.data.iter().zip(other.data.iter()).all(|(x, y)| feq(*x, *y))
    }
}

impl Default for Matrix4D {
    fn default() -> Matrix4D {
        Matrix4D::identity()
    }
}

impl Matrix4D {
    /// Creates a `Matrix4D` with all elements set to `0.0`.
    pub fn zero() -> Matrix4D {
        Matrix4D { data: [0.0; 16] }
    }

    pub fn identity() -> Matrix4D {
        let mut m = Matrix4D::zero();
        for i in 0..4 {
            m.set(i, i, 1.0);
        }

        m
    }

    fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[(row * 4) + col] = value;
    }

    /// Offsets points by `x`, `y` and `z`. Vectors are left untouched.
    pub fn translation(x: f64, y: f64, z: f64) -> Matrix4D {
        let mut trans = Self::identity();
        trans.set(0, 3, x);
        trans.set(1, 3, y);
        trans.set(2, 3, z);

        trans
    }

    pub fn scaling(x: f64, y: f64, z: f64) -> Matrix4D {
        let mut scale = Self::identity();
        scale.set(0, 0, x);
        scale.set(1, 1, y);
        scale.set(2, 2, z);

        scale
    }

    /// Rotates `r` radians about the X axis.
    ///
    /// ```
    /// # use sphere_tracer::tuple::Tuple4D;
    /// # use sphere_tracer::matrix::Matrix4D;
    /// let point = Tuple4D::point(0.0, 1.0, 0.0);
    /// let m = Matrix4D::rotation_x(std::f64::consts::PI / 2.0);
    /// assert_eq!(m * point, Tuple4D::point(0.0, 0.0, 1.0));
    /// ```
    pub fn rotation_x(r: f64) -> Matrix4D {
        let mut rotate = Self::identity();
        rotate.set(1, 1,  r.cos());
        rotate.set(1, 2, -r.sin());
        rotate.set(2, 1,  r.sin());
        rotate.set(2, 2,  r.cos());

        rotate
    }

    /// Rotates `r` radians about the Y axis.
    pub fn rotation_y(r: f64) -> Matrix4D {
        let mut rotate = Self::identity();
        rotate.set(0, 0,  r.cos());
        rotate.set(0, 2,  r.sin());
        rotate.set(2, 0, -r.sin());
        rotate.set(2, 2,  r.cos());

        rotate
    }

    /// Rotates `r` radians about the Z axis.
    pub fn rotation_z(r: f64) -> Matrix4D {
        let mut rotate = Self::identity();
        rotate.set(0, 0,  r.cos());
        rotate.set(0, 1, -r.sin());
        rotate.set(1, 0,  r.sin());
        rotate.set(1, 1,  r.cos());

        rotate
    }

    /// Moves each component in proportion to the other two.
    ///
    /// `xy` is how much `x` changes with respect to `y`, and so on.
    ///
    /// ```
    /// # use sphere_tracer::tuple::Tuple4D;
    /// # use sphere_tracer::matrix::Matrix4D;
    /// let point = Tuple4D::point(2.0, 3.0, 4.0);
    /// let m = Matrix4D::shearing(1.0, 0.0, 0.0, 0.0, 0.0, 0.0);
    /// assert_eq!(m * point, Tuple4D::point(5.0, 3.0, 4.0));
    /// ```
    pub fn shearing(xy: f64, xz: f64, yx: f64, yz: f64, zx: f64, zy: f64)
        -> Matrix4D {
        let mut shear = Self::identity();
        shear.set(0, 1, xy);
        shear.set(0, 2, xz);
        shear.set(1, 0, yx);
        shear.set(1, 2, yz);
        shear.set(2, 0, zx);
        shear.set(2, 1, zy);

        shear
    }

    /// Generates a view transformation.
    ///
    /// The eye sits at `from`, looks at `to`, and `up` roughly points up.
    /// The result moves the *world* relative to the eye. Fails with
    /// `DegenerateVector` if `from == to` or if `up` is parallel to the
    /// viewing direction.
    pub fn view_transform(from: Tuple4D, to: Tuple4D, up: Tuple4D)
        -> Result<Matrix4D> {
        let forward = (to - from).normalize()?;
        let left = forward.cross(&up.normalize()?)?;
        if left.magnitude() < ZERO_EPSILON {
            return Err(TracerError::DegenerateVector);
        }
        let true_up = left.cross(&forward)?;

        let orientation: Matrix4D = [
             left.x,     left.y,     left.z,    0.0,
             true_up.x,  true_up.y,  true_up.z, 0.0,
            -forward.x, -forward.y, -forward.z, 0.0,
             0.0,        0.0,        0.0,       1.0,
        ].into();

        Ok(orientation * Matrix4D::translation(-from.x, -from.y, -from.z))
    }

    /// Returns the transpose of this matrix.
    pub fn transposition(&self) -> Matrix4D {
        let mut buf = Matrix4D::zero();

        for r in 0..4 {
            for c in 0..4 {
                buf.set(c, r, self[(r, c)]);
            }
        }

        buf
    }

    fn submatrix(&self, row: usize, col: usize) -> Minor<3> {
        let mut data = [[0.0; 3]; 3];

        for (dr, r) in (0..4).filter(|&r| r != row).enumerate() {
            for (dc, c) in (0..4).filter(|&c| c != col).enumerate() {
                data[dr][dc] = self[(r, c)];
            }
        }

        Minor { data }
    }

    /// The determinant of the submatrix without `row` and `col`.
    pub fn minor(&self, row: usize, col: usize) -> f64 {
        self.submatrix(row, col).determinant()
    }

    /// The minor at `row` and `col`, negated when `row + col` is odd.
    pub fn cofactor(&self, row: usize, col: usize) -> f64 {
        let m = self.minor(row, col);
        m * if (row + col) % 2 == 0 { 1.0 } else { -1.0 }
    }

    pub fn determinant(&self) -> f64 {
        (0..4).map(|c| self[(0, c)] * self.cofactor(0, c)).sum()
    }

    /// Inverts a matrix by cofactor expansion.
    ///
    /// Returns `NotInvertible` when the determinant is approximately zero.
    pub fn inverse(&self) -> Result<Matrix4D> {
        let det = self.determinant();
        if det.abs() < ZERO_EPSILON {
            return Err(TracerError::NotInvertible);
        }

        let mut inv = Matrix4D::zero();
        for r in 0..4 {
            for c in 0..4 {
                inv.set(c, r, self.cofactor(r, c) / det);
            }
        }

        Ok(inv)
    }
}

impl From<[f64; 16]> for Matrix4D {
    fn from(data: [f64; 16]) -> Matrix4D {
        Matrix4D { data }
    }
}

impl Index<(usize, usize)> for Matrix4D {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &f64 {
        &self.data[(index.0 * 4) + index.1]
    }
}

/// Matrix product. Not commutative.
///
/// ```
/// # use sphere_tracer::matrix::Matrix4D;
/// let m1 = Matrix4D::scaling(2.0, 3.0, 4.0);
/// let m2 = Matrix4D::scaling(4.0, 3.0, 2.0);
/// assert_eq!(m1 * m2, Matrix4D::scaling(8.0, 9.0, 8.0));
/// ```
impl Mul<Matrix4D> for Matrix4D {
    type Output = Matrix4D;

    fn mul(self, other: Matrix4D) -> Matrix4D {
        let mut res = Matrix4D::zero();

        for r in 0..4 {
            for c in 0..4 {
                res.set(r, c, self[(r, 0)] * other[(0, c)]
                    + self[(r, 1)] * other[(1, c)]
                    + self[(r, 2)] * other[(2, c)]
                    + self[(r, 3)] * other[(3, c)]);
            }
        }

        res
    }
}

/// Applies a matrix to a `Tuple4D` (the tuple is a 4x1 column).
///
/// ```
/// # use sphere_tracer::tuple::Tuple4D;
/// # use sphere_tracer::matrix::Matrix4D;
/// let v = Tuple4D::vector(1.0, 4.0, 5.0);
/// let m = Matrix4D::scaling(2.0, 2.0, 2.0);
/// assert_eq!(m * v, Tuple4D::vector(2.0, 8.0, 10.0));
/// ```
impl Mul<Tuple4D> for Matrix4D {
    type Output = Tuple4D;

    fn mul(self, other: Tuple4D) -> Tuple4D {
        let mut buf = [0.0; 4];

        for (r, out) in buf.iter_mut().enumerate() {
            *out = self[(r, 0)] * other.x
                + self[(r, 1)] * other.y
                + self[(r, 2)] * other.z
                + self[(r, 3)] * other.w;
        }

        Tuple4D { x: buf[0], y: buf[1], z: buf[2], w: buf[3] }
    }
}

impl fmt::Display for Matrix4D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..4 {
            write!(f, "|")?;
            for c in 0..4 {
                write!(f, " {} |", self[(r, c)])?;
            }

            // Leave the final newline to the caller
            if r != 3 {
                writeln!(f)?;
            }
        }

        Ok(())
    }
}

#[test]
fn identity() {
    let i = Matrix4D::identity();
    let a: Matrix4D = [ 0.0, 1.0,  2.0,  4.0,
                        1.0, 2.0,  4.0,  8.0,
                        2.0, 4.0,  8.0, 16.0,
                        4.0, 8.0, 16.0, 32.0, ].into();

    assert_eq!(a * i, a);
    assert_eq!(i * Tuple4D::tuple(1.0, 2.0, 3.0, 4.0),
        Tuple4D::tuple(1.0, 2.0, 3.0, 4.0));
}

#[test]
fn multiply() {
    let a: Matrix4D = [ 1.0, 2.0, 3.0, 4.0,
                        5.0, 6.0, 7.0, 8.0,
                        9.0, 8.0, 7.0, 6.0,
                        5.0, 4.0, 3.0, 2.0, ].into();

    let b: Matrix4D = [ -2.0, 1.0, 2.0,  3.0,
                         3.0, 2.0, 1.0, -1.0,
                         4.0, 3.0, 6.0,  5.0,
                         1.0, 2.0, 7.0,  8.0, ].into();

    let c: Matrix4D = [ 20.0, 22.0,  50.0,  48.0,
                        44.0, 54.0, 114.0, 108.0,
                        40.0, 58.0, 110.0, 102.0,
                        16.0, 26.0,  46.0,  42.0, ].into();

    assert_eq!(a * b, c);
}

#[test]
fn transpose() {
    let a: Matrix4D = [ 0.0, 9.0, 3.0, 0.0,
                        9.0, 8.0, 0.0, 8.0,
                        1.0, 8.0, 5.0, 3.0,
                        0.0, 0.0, 5.0, 8.0, ].into();

    let t: Matrix4D = [ 0.0, 9.0, 1.0, 0.0,
                        9.0, 8.0, 8.0, 0.0,
                        3.0, 0.0, 5.0, 5.0,
                        0.0, 8.0, 3.0, 8.0, ].into();

    assert_eq!(a.transposition(), t);
    assert_eq!(Matrix4D::identity().transposition(), Matrix4D::identity());
}

#[test]
fn mat3_cofactor() {
    let a = Minor { data: [ [  3.0,  5.0,  0.0 ],
                            [  2.0, -1.0, -7.0 ],
                            [  6.0, -1.0,  5.0 ] ] };

    assert_eq!(a.submatrix(1, 0).determinant(), 25.0);
    assert_eq!(a.cofactor(0, 0), -12.0);
    assert_eq!(a.cofactor(1, 0), -25.0);
}

#[test]
fn mat4_determinant() {
    let a: Matrix4D = [ -2.0, -8.0,  3.0,  5.0,
                        -3.0,  1.0,  7.0,  3.0,
                         1.0,  2.0, -9.0,  6.0,
                        -6.0,  7.0,  7.0, -9.0, ].into();

    assert_eq!(a.cofactor(0, 0), 690.0);
    assert_eq!(a.cofactor(0, 1), 447.0);
    assert_eq!(a.cofactor(0, 2), 210.0);
    assert_eq!(a.cofactor(0, 3), 51.0);
    assert_eq!(a.determinant(), -4071.0);
}

#[test]
fn mat4_inverse() {
    let a: Matrix4D = [  8.0, -5.0,  9.0,  2.0,
                         7.0,  5.0,  6.0,  1.0,
                        -6.0,  0.0,  9.0,  6.0,
                        -3.0,  0.0, -9.0, -4.0, ].into();

    let i: Matrix4D = [ -0.15385, -0.15385, -0.28205, -0.53846,
                        -0.07692,  0.12308,  0.02564,  0.03077,
                         0.35897,  0.35897,  0.43590,  0.92308,
                        -0.69231, -0.69231, -0.76923, -1.92308, ].into();

    assert_eq!(a.inverse().unwrap(), i);
}

#[test]
fn mat4_times_inverse_is_identity() {
    let ms: [Matrix4D; 3] = [
        [  3.0, -9.0,  7.0,  3.0,
           3.0,  8.0,  2.0, -9.0,
          -4.0,  4.0,  4.0,  1.0,
          -6.0,  5.0, -1.0,  1.0, ].into(),
        Matrix4D::translation(1.0, -2.0, 3.0)
            * Matrix4D::rotation_y(0.3)
            * Matrix4D::scaling(0.5, 2.0, 4.0),
        Matrix4D::shearing(1.0, 0.0, 0.5, 0.0, 0.0, 0.25),
    ];

    for m in ms.iter() {
        assert_eq!(*m * m.inverse().unwrap(), Matrix4D::identity());
    }
}

#[test]
fn mat4_inverse_mult() {
    let a: Matrix4D = [  3.0, -9.0,  7.0,  3.0,
                         3.0,  8.0,  2.0, -9.0,
                        -4.0,  4.0,  4.0,  1.0,
                        -6.0,  5.0, -1.0,  1.0, ].into();

    let b: Matrix4D = [ 8.0,  2.0, 2.0, 2.0,
                        3.0, -1.0, 7.0, 0.0,
                        7.0,  0.0, 5.0, 4.0,
                        6.0, -2.0, 0.0, 5.0  ].into();

    let c = a * b;
    assert_eq!(a, c * b.inverse().unwrap());
}

#[test]
fn singular_matrix_is_not_invertible() {
    let a: Matrix4D = [ -4.0,  2.0, -2.0, -3.0,
                         9.0,  6.0,  2.0,  6.0,
                         0.0, -5.0,  1.0, -5.0,
                         0.0,  0.0,  0.0,  0.0, ].into();

    assert_eq!(a.determinant(), 0.0);
    assert!(matches!(a.inverse(), Err(TracerError::NotInvertible)));
    assert!(Matrix4D::scaling(1.0, 0.0, 1.0).inverse().is_err());
}

#[test]
fn mat4_translation_inverse() {
    let transform = Matrix4D::translation(5.0, -3.0, 2.0).inverse().unwrap();
    let point = Tuple4D::point(-3.0, 4.0, 5.0);

    assert_eq!(transform * point, Tuple4D::point(-8.0, 7.0, 3.0));
}

#[test]
fn mat4_translation_vector() {
    let transform = Matrix4D::translation(5.0, -3.0, 2.0);
    let v = Tuple4D::vector(-3.0, 4.0, 5.0);

    assert_eq!(transform * v, v);
}

#[test]
fn mat4_scaling_reflection() {
    let transform = Matrix4D::scaling(-1.0, 1.0, 1.0);
    let point = Tuple4D::point(2.0, 3.0, 4.0);

    assert_eq!(transform * point, Tuple4D::point(-2.0, 3.0, 4.0));
}

#[test]
fn mat4_rotate_y() {
    let p = Tuple4D::point(0.0, 0.0, 1.0);
    let half_quarter = Matrix4D::rotation_y(std::f64::consts::PI / 4.0);
    let full_quarter = Matrix4D::rotation_y(std::f64::consts::PI / 2.0);

    assert_eq!(half_quarter * p,
        Tuple4D::point(2.0f64.sqrt() / 2.0, 0.0, 2.0f64.sqrt() / 2.0));
    assert_eq!(full_quarter * p, Tuple4D::point(1.0, 0.0, 0.0));
}

#[test]
fn mat4_rotate_z() {
    let p = Tuple4D::point(0.0, 1.0, 0.0);
    let full_quarter = Matrix4D::rotation_z(std::f64::consts::PI / 2.0);

    assert_eq!(full_quarter * p, Tuple4D::point(-1.0, 0.0, 0.0));
}

#[test]
fn mat4_shear_zy() {
    let transform = Matrix4D::shearing(0.0, 0.0, 0.0, 0.0, 0.0, 1.0);
    let p = Tuple4D::point(2.0, 3.0, 4.0);

    assert_eq!(transform * p, Tuple4D::point(2.0, 3.0, 7.0));
}

#[test]
fn chained_transforms_apply_right_to_left() {
    let p = Tuple4D::point(1.0, 0.0, 1.0);
    let a = Matrix4D::rotation_x(std::f64::consts::PI / 2.0);
    let b = Matrix4D::scaling(5.0, 5.0, 5.0);
    let c = Matrix4D::translation(10.0, 5.0, 7.0);

    let stepwise = c * (b * (a * p));
    assert_eq!(stepwise, Tuple4D::point(15.0, 0.0, 7.0));
    assert_eq!((c * b * a) * p, stepwise);
}

#[test]
fn default_view() {
    let from = Tuple4D::point(0.0, 0.0, 0.0);
    let to = Tuple4D::point(0.0, 0.0, -1.0);
    let up = Tuple4D::vector(0.0, 1.0, 0.0);

    assert_eq!(Matrix4D::view_transform(from, to, up).unwrap(),
        Matrix4D::identity());
}

#[test]
fn positive_z_view() {
    let from = Tuple4D::point(0.0, 0.0, 0.0);
    let to = Tuple4D::point(0.0, 0.0, 1.0);
    let up = Tuple4D::vector(0.0, 1.0, 0.0);

    assert_eq!(Matrix4D::view_transform(from, to, up).unwrap(),
        Matrix4D::scaling(-1.0, 1.0, -1.0));
}

#[test]
fn view_moves_world() {
    let from = Tuple4D::point(0.0, 0.0, 8.0);
    let to = Tuple4D::point(0.0, 0.0, 0.0);
    let up = Tuple4D::vector(0.0, 1.0, 0.0);

    assert_eq!(Matrix4D::view_transform(from, to, up).unwrap(),
        Matrix4D::translation(0.0, 0.0, -8.0));
}

#[test]
fn arbitrary_view() {
    let from = Tuple4D::point(1.0, 3.0, 2.0);
    let to = Tuple4D::point(4.0, -2.0, 8.0);
    let up = Tuple4D::vector(1.0, 1.0, 0.0);

    let m: Matrix4D = [ -0.50709, 0.50709,  0.67612, -2.36643,
                         0.76772, 0.60609,  0.12122, -2.82843,
                        -0.35857, 0.59761, -0.71714,  0.00000,
                         0.00000, 0.00000,  0.00000,  1.00000, ].into();

    assert_eq!(Matrix4D::view_transform(from, to, up).unwrap(), m);
}

#[test]
fn degenerate_views_fail() {
    let eye = Tuple4D::point(0.0, 0.0, 0.0);
    let up = Tuple4D::vector(0.0, 1.0, 0.0);

    assert!(Matrix4D::view_transform(eye, eye, up).is_err());
    assert!(Matrix4D::view_transform(eye, Tuple4D::point(0.0, 5.0, 0.0), up)
        .is_err());
}
