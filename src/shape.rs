use std::fmt::Debug;
use std::sync::atomic::{ AtomicUsize, Ordering };

use crate::consts::FEQ_EPSILON;
use crate::error::Result;
use crate::tuple::Tuple4D;
use crate::ray::Ray4D;
use crate::light::Material;
use crate::matrix::Matrix4D;
use crate::intersect::{ Intersection, Intersections };

/// The local-space behavior of a shape.
///
/// Implementors only ever see rays and points in their own coordinate frame;
/// `Shape` handles the transform into and out of world space. Anything that
/// can report where a ray crosses it and which way its surface faces can be
/// rendered.
pub trait Geometry: Debug + Send + Sync {
    /// Returns the `t` of every point where `ray` crosses the surface, in
    /// any order.
    fn local_intersect(&self, ray: &Ray4D) -> Vec<f64>;

    /// Returns the (not necessarily normalized) surface normal at `at`.
    fn local_normal_at(&self, at: &Tuple4D) -> Tuple4D;
}

/// A unit sphere with its center at the object-space origin.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Sphere;

impl Geometry for Sphere {
    /// Solves `|O + tD|^2 = 1` for `t`.
    ///
    /// A miss yields no roots. A tangent ray yields the same root twice.
    fn local_intersect(&self, ray: &Ray4D) -> Vec<f64> {
        // Subtracting the origin point drops the `w` part of the ray origin.
        let sphere_to_ray = ray.origin - Tuple4D::origin();

        let a = ray.direction.dot(&ray.direction);
        let b = 2.0 * ray.direction.dot(&sphere_to_ray);
        let c = sphere_to_ray.dot(&sphere_to_ray) - 1.0;

        let discriminant = b.powi(2) - (4.0 * a * c);
        if discriminant < 0.0 {
            return Vec::new();
        }

        let t1 = (-b - discriminant.sqrt()) / (2.0 * a);
        let t2 = (-b + discriminant.sqrt()) / (2.0 * a);
        vec![t1, t2]
    }

    fn local_normal_at(&self, at: &Tuple4D) -> Tuple4D {
        *at - Tuple4D::origin()
    }
}

/// An infinite plane spanning X and Z through the object-space origin.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Plane;

impl Geometry for Plane {
    fn local_intersect(&self, ray: &Ray4D) -> Vec<f64> {
        // Parallel (or coplanar) rays never cross the plane.
        if ray.direction.y.abs() < FEQ_EPSILON {
            return Vec::new();
        }

        vec![-ray.origin.y / ray.direction.y]
    }

    fn local_normal_at(&self, _at: &Tuple4D) -> Tuple4D {
        Tuple4D::vector(0.0, 1.0, 0.0)
    }
}

static NEXT_SHAPE_ID: AtomicUsize = AtomicUsize::new(0);

/// An object placed in a world.
///
/// A shape pairs some `Geometry` with a model-to-world transform and a
/// material. The transform's inverse is computed once, when the transform is
/// set, so a shape that exists is always invertible.
///
/// Every shape gets a unique id at construction. Shapes are deliberately not
/// `Clone`, so ids stay unique.
#[derive(Debug)]
pub struct Shape {
    id: usize,
    geometry: Box<dyn Geometry>,
    transform: Matrix4D,
    inverse: Matrix4D,
    pub material: Material,
}

impl Shape {
    /// Wraps any geometry with an identity transform and default material.
    pub fn new(geometry: Box<dyn Geometry>) -> Shape {
        Shape {
            id: NEXT_SHAPE_ID.fetch_add(1, Ordering::Relaxed),
            geometry,
            transform: Matrix4D::identity(),
            inverse: Matrix4D::identity(),
            material: Default::default(),
        }
    }

    pub fn sphere() -> Shape {
        Shape::new(Box::new(Sphere))
    }

    pub fn plane() -> Shape {
        Shape::new(Box::new(Plane))
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn transform(&self) -> &Matrix4D {
        &self.transform
    }

    /// Sets the model-to-world transform.
    ///
    /// A singular transform is rejected with `NotInvertible` and the shape
    /// keeps its previous transform.
    pub fn set_transform(&mut self, transform: Matrix4D) -> Result<()> {
        self.inverse = transform.inverse()?;
        self.transform = transform;

        Ok(())
    }

    /// Builder form of `set_transform`.
    pub fn with_transform(mut self, transform: Matrix4D) -> Result<Shape> {
        self.set_transform(transform)?;
        Ok(self)
    }

    pub fn with_material(mut self, material: Material) -> Shape {
        self.material = material;
        self
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Intersects a world-space ray with this shape.
    ///
    /// The ray is moved into object space with the inverse transform, then
    /// handed to the geometry.
    pub fn intersect(&self, ray: &Ray4D) -> Intersections {
        let local_ray = ray.transform(&self.inverse);

        let intersections = self.geometry.local_intersect(&local_ray)
            .into_iter()
            .map(|t| Intersection::new(t, self))
            .collect();

        Intersections { intersections }
    }

    /// Computes the world-space surface normal at a world-space point.
    ///
    /// The normal comes back from object space through the inverse
    /// transpose, with `w` forced to zero before normalizing.
    pub fn normal_at(&self, world_point: Tuple4D) -> Result<Tuple4D> {
        let local_point = self.inverse * world_point;
        let local_normal = self.geometry.local_normal_at(&local_point);

        let mut world_normal = self.inverse.transposition() * local_normal;
        world_normal.w = 0.0;
        world_normal.normalize()
    }
}

#[test]
fn shapes_get_unique_ids() {
    let a = Shape::sphere();
    let b = Shape::sphere();
    let c = Shape::plane();

    assert_ne!(a.id(), b.id());
    assert_ne!(b.id(), c.id());
}

#[test]
fn default_transform_is_identity() {
    let s = Shape::sphere();

    assert_eq!(*s.transform(), Matrix4D::identity());
}

#[test]
fn singular_transform_is_rejected() {
    use crate::error::TracerError;

    let mut s = Shape::sphere();
    s.set_transform(Matrix4D::translation(2.0, 3.0, 4.0)).unwrap();

    let err = s.set_transform(Matrix4D::scaling(0.0, 1.0, 1.0));
    assert!(matches!(err, Err(TracerError::NotInvertible)));
    assert_eq!(*s.transform(), Matrix4D::translation(2.0, 3.0, 4.0));
}

#[test]
fn ray_pierces_sphere() {
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
                       Tuple4D::vector(0.0, 0.0, 1.0));
    let s = Shape::sphere();
    let xs = s.intersect(&r);

    assert_eq!(xs.intersections.len(), 2);
    assert_eq!(xs.intersections[0].t, 4.0);
    assert_eq!(xs.intersections[1].t, 6.0);
}

#[test]
fn ray_is_tangent_to_sphere() {
    let r = Ray4D::new(Tuple4D::point(0.0, 1.0, -5.0),
                       Tuple4D::vector(0.0, 0.0, 1.0));
    let s = Shape::sphere();
    let xs = s.intersect(&r);

    assert_eq!(xs.intersections.len(), 2);
    assert_eq!(xs.intersections[0].t, 5.0);
    assert_eq!(xs.intersections[1].t, 5.0);
}

#[test]
fn ray_misses_sphere() {
    let r = Ray4D::new(Tuple4D::point(0.0, 2.0, -5.0),
                       Tuple4D::vector(0.0, 0.0, 1.0));

    assert!(Shape::sphere().intersect(&r).intersections.is_empty());
}

#[test]
fn ray_is_inside_sphere() {
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, 0.0),
                       Tuple4D::vector(0.0, 0.0, 1.0));
    let s = Shape::sphere();
    let xs = s.intersect(&r);

    assert_eq!(xs.intersections.len(), 2);
    assert_eq!(xs.intersections[0].t, -1.0);
    assert_eq!(xs.intersections[1].t, 1.0);
}

#[test]
fn sphere_is_behind_ray() {
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, 5.0),
                       Tuple4D::vector(0.0, 0.0, 1.0));
    let s = Shape::sphere();
    let xs = s.intersect(&r);

    assert_eq!(xs.intersections[0].t, -6.0);
    assert_eq!(xs.intersections[1].t, -4.0);
}

#[test]
fn intersect_sets_the_object() {
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
                       Tuple4D::vector(0.0, 0.0, 1.0));
    let s = Shape::sphere();
    let xs = s.intersect(&r);

    assert!(xs.intersections.iter().all(|i| i.what.id() == s.id()));
}

#[test]
fn ray_hits_scaled_sphere() {
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
                       Tuple4D::vector(0.0, 0.0, 1.0));
    let s = Shape::sphere()
        .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap();
    let xs = s.intersect(&r);

    assert_eq!(xs.intersections.len(), 2);
    assert_eq!(xs.intersections[0].t, 3.0);
    assert_eq!(xs.intersections[1].t, 7.0);
}

#[test]
fn ray_misses_translated_sphere() {
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
                       Tuple4D::vector(0.0, 0.0, 1.0));
    let s = Shape::sphere()
        .with_transform(Matrix4D::translation(5.0, 0.0, 0.0)).unwrap();

    assert_eq!(s.intersect(&r).intersections.len(), 0);
}

#[test]
fn normal_on_sphere_axes() {
    let s = Shape::sphere();

    assert_eq!(s.normal_at(Tuple4D::point(1.0, 0.0, 0.0)).unwrap(),
        Tuple4D::vector(1.0, 0.0, 0.0));
    assert_eq!(s.normal_at(Tuple4D::point(0.0, 1.0, 0.0)).unwrap(),
        Tuple4D::vector(0.0, 1.0, 0.0));
    assert_eq!(s.normal_at(Tuple4D::point(0.0, 0.0, 1.0)).unwrap(),
        Tuple4D::vector(0.0, 0.0, 1.0));
}

#[test]
fn normal_on_sphere_nonaxial() {
    let k = 3.0f64.sqrt() / 3.0;
    let n = Shape::sphere().normal_at(Tuple4D::point(k, k, k)).unwrap();

    assert_eq!(n, Tuple4D::vector(k, k, k));
    assert_eq!(n, n.normalize().unwrap());
}

#[test]
fn normal_on_sphere_translated() {
    let s = Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 1.0, 0.0)).unwrap();
    let n = s.normal_at(Tuple4D::point(0.0, 1.70711, -0.70711)).unwrap();

    assert_eq!(n, Tuple4D::vector(0.0, 0.70711, -0.70711));
}

#[test]
fn normal_on_sphere_transformed() {
    let s = Shape::sphere()
        .with_transform(Matrix4D::scaling(1.0, 0.5, 1.0)
            * Matrix4D::rotation_z(std::f64::consts::PI / 5.0)).unwrap();
    let n = s.normal_at(
        Tuple4D::point(0.0, 2.0f64.sqrt() / 2.0, -(2.0f64.sqrt() / 2.0))
    ).unwrap();

    assert_eq!(n, Tuple4D::vector(0.0, 0.97014, -0.24254));
    assert!(n.is_vector());
}

#[test]
fn normal_on_plane_is_constant() {
    let p = Plane;

    assert_eq!(p.local_normal_at(&Tuple4D::point(0.0, 0.0, 0.0)),
        Tuple4D::vector(0.0, 1.0, 0.0));
    assert_eq!(p.local_normal_at(&Tuple4D::point(10.0, 0.0, -10.0)),
        Tuple4D::vector(0.0, 1.0, 0.0));
}

#[test]
fn ray_parallel_to_plane() {
    let p = Plane;
    let above = Ray4D::new(Tuple4D::point(0.0, 10.0, 0.0),
                           Tuple4D::vector(0.0, 0.0, 1.0));
    let coplanar = Ray4D::new(Tuple4D::point(0.0, 0.0, 0.0),
                              Tuple4D::vector(0.0, 0.0, 1.0));

    assert!(p.local_intersect(&above).is_empty());
    assert!(p.local_intersect(&coplanar).is_empty());
}

#[test]
fn ray_intersecting_plane_from_above_and_below() {
    let p = Plane;
    let above = Ray4D::new(Tuple4D::point(0.0, 1.0, 0.0),
                           Tuple4D::vector(0.0, -1.0, 0.0));
    let below = Ray4D::new(Tuple4D::point(0.0, -1.0, 0.0),
                           Tuple4D::vector(0.0, 1.0, 0.0));

    assert_eq!(p.local_intersect(&above), vec![1.0]);
    assert_eq!(p.local_intersect(&below), vec![1.0]);
}
