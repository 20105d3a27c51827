use crate::consts::FEQ_EPSILON;
use crate::error::Result;
use crate::tuple::Tuple4D;
use crate::ray::Ray4D;
use crate::shape::Shape;

/// An intersection.
///
/// Parameter `t` is the offset along the ray where the intersection occurs,
/// and `what` is the shape that was struck.
#[derive(Copy, Clone, Debug)]
pub struct Intersection<'a> {
    pub t: f64,
    pub what: &'a Shape,
}

/// Two intersections are equal if their offsets are equal and they refer to
/// the same shape.
impl<'a> PartialEq for Intersection<'a> {
    fn eq(&self, other: &Intersection<'a>) -> bool {
        self.t == other.t && self.what.id() == other.what.id()
    }
}

impl<'a> Intersection<'a> {
    pub fn new(t: f64, what: &'a Shape) -> Intersection<'a> {
        Intersection { t, what }
    }
}

/// A collection of intersections, in no particular order.
#[derive(Clone, Debug, Default)]
pub struct Intersections<'a> {
    pub intersections: Vec<Intersection<'a>>,
}

impl<'a> Intersections<'a> {
    pub fn new() -> Intersections<'a> {
        Intersections { intersections: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.intersections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intersections.is_empty()
    }

    pub fn append(&mut self, other: &mut Intersections<'a>) {
        self.intersections.append(&mut other.intersections);
    }

    /// Finds the visible intersection, if any.
    ///
    /// The hit is the intersection with the smallest non-negative `t`.
    /// Non-finite offsets are ignored. Ties go to whichever entry comes
    /// first, so a tangent ray's doubled root behaves like a single one.
    ///
    /// ```
    /// # use sphere_tracer::shape::Shape;
    /// # use sphere_tracer::intersect::{ Intersection, Intersections };
    /// let s = Shape::sphere();
    /// let xs = Intersections {
    ///     intersections: [5.0, 7.0, -3.0, 2.0].iter()
    ///         .map(|&t| Intersection::new(t, &s))
    ///         .collect(),
    /// };
    /// assert_eq!(xs.hit().unwrap().t, 2.0);
    /// ```
    pub fn hit(&self) -> Option<Intersection<'a>> {
        self.intersections.iter()
            .filter(|i| i.t.is_finite() && i.t >= 0.0)
            .fold(None, |best: Option<Intersection<'a>>, i| match best {
                Some(b) if b.t <= i.t => Some(b),
                _ => Some(*i),
            })
    }

    /// Sorts the intersections by `t`, ignoring `f64` semantics.
    pub fn sort(&mut self) {
        self.intersections.sort_by(|a, b|
            a.t.partial_cmp(&b.t).unwrap_or(std::cmp::Ordering::Equal)
        );
    }
}

/// Everything shading needs to know about a hit.
#[derive(Clone, Debug)]
pub struct IntersectionComputation<'a> {
    /// The offset of the hit along the ray.
    pub t: f64,

    /// The object being intersected.
    pub obj: &'a Shape,

    /// The point where the intersection occurs.
    pub point: Tuple4D,

    /// A point slightly above the surface. Shadow rays start here so an
    /// object does not shadow itself ("acne").
    pub over_point: Tuple4D,

    /// The vector pointing back toward the eye.
    pub eyev: Tuple4D,

    /// The surface normal, flipped to face the eye.
    pub normalv: Tuple4D,

    /// Whether the ray started inside the object.
    pub inside: bool,
}

impl<'a> IntersectionComputation<'a> {
    pub fn new(r: &Ray4D, hit: &Intersection<'a>)
        -> Result<IntersectionComputation<'a>> {
        let t = hit.t;
        let obj = hit.what;
        let point = r.position(t);
        let eyev = -r.direction;
        let mut normalv = obj.normal_at(point)?;

        let inside = if normalv.dot(&eyev) < 0.0 {
            normalv = -normalv;
            true
        } else {
            false
        };

        let over_point = point + normalv * FEQ_EPSILON;

        Ok(IntersectionComputation {
            t, obj,
            point, over_point,
            eyev, normalv,
            inside,
        })
    }
}

#[cfg(test)]
fn intersections_at<'a>(s: &'a Shape, ts: &[f64]) -> Intersections<'a> {
    Intersections {
        intersections: ts.iter().map(|&t| Intersection::new(t, s)).collect()
    }
}

#[test]
fn hit_with_all_positive() {
    let s = Shape::sphere();
    let is = intersections_at(&s, &[1.0, 2.0]);

    assert_eq!(is.hit().unwrap(), Intersection::new(1.0, &s));
}

#[test]
fn hit_with_some_negative() {
    let s = Shape::sphere();
    let is = intersections_at(&s, &[-1.0, 1.0]);

    assert_eq!(is.hit().unwrap(), Intersection::new(1.0, &s));
}

#[test]
fn hit_with_all_negative() {
    let s = Shape::sphere();
    let is = intersections_at(&s, &[-2.0, -1.0]);

    assert_eq!(is.hit(), None);
}

#[test]
fn hit_multiple() {
    let s = Shape::sphere();
    let is = intersections_at(&s, &[5.0, 7.0, -3.0, 2.0]);

    assert_eq!(is.hit().unwrap(), Intersection::new(2.0, &s));
}

#[test]
fn hit_ignores_order() {
    let s = Shape::sphere();
    let forward = intersections_at(&s, &[2.0, 5.0, 7.0, -3.0]);
    let backward = intersections_at(&s, &[-3.0, 7.0, 5.0, 2.0]);

    assert_eq!(forward.hit(), backward.hit());
}

#[test]
fn hit_accepts_zero_and_skips_nan() {
    let s = Shape::sphere();
    let is = intersections_at(&s, &[f64::NAN, 3.0, 0.0]);

    assert_eq!(is.hit().unwrap().t, 0.0);
}

#[test]
fn hit_of_tangent_double_root() {
    let s = Shape::sphere();
    let doubled = intersections_at(&s, &[5.0, 5.0]);
    let single = intersections_at(&s, &[5.0]);

    assert_eq!(doubled.hit(), single.hit());
}

#[test]
fn sort_orders_by_t() {
    let s = Shape::sphere();
    let mut is = intersections_at(&s, &[5.0, -1.0, 3.0]);
    is.sort();

    let ts: Vec<f64> = is.intersections.iter().map(|i| i.t).collect();
    assert_eq!(ts, vec![-1.0, 3.0, 5.0]);
}

#[test]
fn precompute_outside_intersection() {
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    let shape = Shape::sphere();
    let i = Intersection::new(4.0, &shape);
    let comps = IntersectionComputation::new(&r, &i).unwrap();

    assert_eq!(comps.obj.id(), shape.id());
    assert_eq!(comps.t, i.t);
    assert_eq!(comps.point, Tuple4D::point(0.0, 0.0, -1.0));
    assert_eq!(comps.eyev, Tuple4D::vector(0.0, 0.0, -1.0));
    assert_eq!(comps.normalv, Tuple4D::vector(0.0, 0.0, -1.0));
    assert!(!comps.inside);
}

#[test]
fn precompute_inside_intersection() {
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    let shape = Shape::sphere();
    let i = Intersection::new(1.0, &shape);
    let comps = IntersectionComputation::new(&r, &i).unwrap();

    assert!(comps.inside);
    assert_eq!(comps.point, Tuple4D::point(0.0, 0.0, 1.0));
    assert_eq!(comps.eyev, Tuple4D::vector(0.0, 0.0, -1.0));
    assert_eq!(comps.normalv, Tuple4D::vector(0.0, 0.0, -1.0));
}

#[test]
fn hit_should_offset_point() {
    use crate::matrix::Matrix4D;

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    let shape = Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, 1.0)).unwrap();
    let i = Intersection::new(5.0, &shape);
    let comps = IntersectionComputation::new(&r, &i).unwrap();

    assert!(comps.over_point.z < -FEQ_EPSILON / 2.0);
    assert!(comps.point.z > comps.over_point.z);
}
