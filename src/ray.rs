use crate::tuple::Tuple4D;
use crate::matrix::Matrix4D;

/// A ray with an origin point and a direction vector.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Ray4D {
    pub origin: Tuple4D,
    pub direction: Tuple4D,
}

impl Ray4D {
    /// Creates a ray, forcing `origin` to be a point and `direction` to be a
    /// vector.
    pub fn new(mut origin: Tuple4D, mut direction: Tuple4D) -> Ray4D {
        origin.w = 1.0;
        direction.w = 0.0;

        Ray4D { origin, direction }
    }

    /// The point `t` units along the ray, `origin + direction * t`.
    pub fn position(&self, t: f64) -> Tuple4D {
        self.origin + (t * self.direction)
    }

    /// Moves the ray into the space `m` maps to.
    pub fn transform(&self, m: &Matrix4D) -> Ray4D {
        Ray4D {
            origin: *m * self.origin,
            direction: *m * self.direction,
        }
    }
}

#[test]
fn points_along_a_ray() {
    let r = Ray4D::new(
        Tuple4D::point(2.0, 3.0, 4.0),
        Tuple4D::vector(1.0, 0.0, 0.0),
    );

    for &(t, x) in [(0.0, 2.0), (1.0, 3.0), (-1.0, 1.0), (2.5, 4.5)].iter() {
        assert_eq!(r.position(t), Tuple4D::point(x, 3.0, 4.0));
    }
}

#[test]
fn new_fixes_w_components() {
    let r = Ray4D::new(
        Tuple4D::tuple(0.0, 0.0, 0.0, 7.0),
        Tuple4D::tuple(0.0, 0.0, 1.0, 7.0),
    );

    assert!(r.origin.is_point());
    assert!(r.direction.is_vector());
}

#[test]
fn transforms_move_origin_but_not_direction() {
    let r = Ray4D::new(
        Tuple4D::point(1.0, 2.0, 3.0),
        Tuple4D::vector(0.0, 1.0, 0.0),
    );

    let moved = r.transform(&Matrix4D::translation(3.0, 4.0, 5.0));
    assert_eq!(moved.origin, Tuple4D::point(4.0, 6.0, 8.0));
    assert_eq!(moved.direction, r.direction);

    let scaled = r.transform(&Matrix4D::scaling(2.0, 3.0, 4.0));
    assert_eq!(scaled.origin, Tuple4D::point(2.0, 6.0, 12.0));
    assert_eq!(scaled.direction, Tuple4D::vector(0.0, 3.0, 0.0));
}
