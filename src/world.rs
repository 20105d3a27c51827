use crate::ray::Ray4D;
use crate::tuple::Tuple4D;
use crate::color::Color;
use crate::error::Result;
use crate::matrix::Matrix4D;
use crate::light::{ PointLight, Material, lighting };
use crate::shape::Shape;
use crate::intersect::{ Intersections, IntersectionComputation };

/// A world with objects and lights.
///
/// Worlds collect all objects as well as lights for rendering. A world is
/// built once and then only read while rendering, which is what lets many
/// workers share one world without locking.
#[derive(Debug, Default)]
pub struct World {
    pub objects: Vec<Shape>,
    pub lights: Vec<PointLight>,
}

impl World {
    /// Creates an empty world with no objects and no lights.
    pub fn empty() -> World {
        World { objects: Vec::new(), lights: Vec::new() }
    }

    /// Creates the reference world: two concentric spheres lit by a white
    /// light at (-10, 10, -10).
    pub fn default_world() -> Result<World> {
        let light = PointLight::new(
            Color::white(),
            Tuple4D::point(-10.0, 10.0, -10.0)
        );

        let outer = Shape::sphere().with_material(Material {
            color: Color::rgb(0.8, 1.0, 0.6),
            diffuse: 0.7,
            specular: 0.2,
            ..Default::default()
        });

        let inner = Shape::sphere()
            .with_transform(Matrix4D::scaling(0.5, 0.5, 0.5))?;

        Ok(World {
            objects: vec![outer, inner],
            lights: vec![light],
        })
    }

    /// Intersects a ray against every object in the world.
    ///
    /// No acceleration structure is used; each ray is tested against each
    /// object. The result is sorted by `t`.
    pub fn intersect(&self, r: &Ray4D) -> Intersections {
        let mut intersections = Intersections::new();
        for obj in self.objects.iter() {
            intersections.append(&mut obj.intersect(r));
        }

        intersections.sort();
        intersections
    }

    /// Determines whether `light` is blocked from `p`.
    ///
    /// A ray is cast from `p` toward the light; the point is shadowed if any
    /// object is struck strictly between `p` and the light. Callers should
    /// pass a point already nudged off the surface (see `over_point`).
    pub fn is_shadowed(&self, p: Tuple4D, light: &PointLight) -> Result<bool> {
        let v = light.position - p;
        let distance = v.magnitude();
        let direction = v.normalize()?;

        let r = Ray4D::new(p, direction);
        let shadowed = self.intersect(&r).intersections.iter()
            .any(|i| i.t > 0.0 && i.t < distance);

        Ok(shadowed)
    }

    /// Calculates the color for a hit, summed over every light.
    pub fn shade_hit(&self, comps: &IntersectionComputation) -> Result<Color> {
        let mut color = Color::black();

        for light in self.lights.iter() {
            let in_shadow = self.is_shadowed(comps.over_point, light)?;
            color = color + lighting(comps.obj.material(), light,
                comps.point, comps.eyev, comps.normalv, in_shadow)?;
        }

        Ok(color)
    }

    /// Determines the color seen along a ray.
    ///
    /// A ray that hits nothing sees black.
    pub fn color_at(&self, r: &Ray4D) -> Result<Color> {
        let xs = self.intersect(r);

        match xs.hit() {
            None => Ok(Color::black()),
            Some(i) => {
                let comps = IntersectionComputation::new(r, &i)?;
                self.shade_hit(&comps)
            },
        }
    }
}

#[test]
fn default_world_contents() {
    let w = World::default_world().unwrap();

    assert_eq!(w.objects.len(), 2);
    assert_eq!(w.lights, vec![PointLight::new(Color::white(),
        Tuple4D::point(-10.0, 10.0, -10.0))]);
    assert_eq!(w.objects[0].material.color, Color::rgb(0.8, 1.0, 0.6));
    assert_eq!(*w.objects[1].transform(), Matrix4D::scaling(0.5, 0.5, 0.5));
}

#[test]
fn intersect_default_world_with_ray() {
    let w = World::default_world().unwrap();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    let is = w.intersect(&r);

    assert_eq!(is.len(), 4);
    assert_eq!(is.intersections[0].t, 4.0);
    assert_eq!(is.intersections[1].t, 4.5);
    assert_eq!(is.intersections[2].t, 5.5);
    assert_eq!(is.intersections[3].t, 6.0);
}

#[test]
fn shade_intersection_from_outside() {
    use crate::intersect::Intersection;

    let w = World::default_world().unwrap();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );

    let i = Intersection::new(4.0, &w.objects[0]);
    let comps = IntersectionComputation::new(&r, &i).unwrap();

    assert_eq!(w.shade_hit(&comps).unwrap(),
        Color::rgb(0.38066, 0.47583, 0.2855));
}

#[test]
fn shade_intersection_from_inside() {
    use crate::intersect::Intersection;

    let mut w = World::default_world().unwrap();
    w.lights = vec![PointLight::new(
        Color::white(),
        Tuple4D::point(0.0, 0.25, 0.0),
    )];

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    let i = Intersection::new(0.5, &w.objects[1]);
    let comps = IntersectionComputation::new(&r, &i).unwrap();

    assert_eq!(w.shade_hit(&comps).unwrap(),
        Color::rgb(0.90498, 0.90498, 0.90498));
}

#[test]
fn shade_intersection_in_shadow() {
    use crate::intersect::Intersection;

    let mut w = World::empty();
    w.lights.push(PointLight::new(
        Color::white(),
        Tuple4D::point(0.0, 0.0, -10.0),
    ));
    w.objects.push(Shape::sphere());
    w.objects.push(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, 10.0)).unwrap());

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    let i = Intersection::new(4.0, &w.objects[1]);
    let comps = IntersectionComputation::new(&r, &i).unwrap();

    assert_eq!(w.shade_hit(&comps).unwrap(), Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn two_lights_sum_their_contributions() {
    use crate::intersect::Intersection;

    let mut w = World::default_world().unwrap();
    let light = w.lights[0];
    w.lights.push(light);

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );

    let i = Intersection::new(4.0, &w.objects[0]);
    let comps = IntersectionComputation::new(&r, &i).unwrap();

    assert_eq!(w.shade_hit(&comps).unwrap(),
        Color::rgb(0.38066, 0.47583, 0.2855) * 2.0);
}

#[test]
fn world_without_lights_is_dark() {
    let mut w = World::default_world().unwrap();
    w.lights.clear();

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    assert_eq!(w.color_at(&r).unwrap(), Color::black());
}

#[test]
fn color_ray_miss() {
    let w = World::default_world().unwrap();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 1.0, 0.0),
    );

    assert_eq!(w.color_at(&r).unwrap(), Color::black());
}

#[test]
fn color_in_empty_world_is_background() {
    let mut w = World::empty();
    w.lights.push(PointLight::new(Color::white(),
        Tuple4D::point(-10.0, 10.0, -10.0)));

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    assert_eq!(w.color_at(&r).unwrap(), Color::black());
}

#[test]
fn color_ray_hit() {
    let w = World::default_world().unwrap();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    assert_eq!(w.color_at(&r).unwrap(), Color::rgb(0.38066, 0.47583, 0.2855));
}

#[test]
fn color_behind_ray() {
    let mut w = World::default_world().unwrap();
    w.objects[0].material.ambient = 1.0;
    w.objects[1].material.ambient = 1.0;

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.75),
        Tuple4D::vector(0.0, 0.0, -1.0)
    );

    let inner_color = w.objects[1].material.color;
    assert_eq!(w.color_at(&r).unwrap(), inner_color);
}

#[test]
fn shadow_collinear_point_and_light() {
    let w = World::default_world().unwrap();
    let p = Tuple4D::point(0.0, 10.0, 0.0);

    assert!(!w.is_shadowed(p, &w.lights[0]).unwrap());
}

#[test]
fn shadow_object_between_point_and_light() {
    let w = World::default_world().unwrap();
    let p = Tuple4D::point(10.0, -10.0, 10.0);

    assert!(w.is_shadowed(p, &w.lights[0]).unwrap());
}

#[test]
fn shadow_object_behind_light() {
    let w = World::default_world().unwrap();
    let p = Tuple4D::point(-20.0, 20.0, -20.0);

    assert!(!w.is_shadowed(p, &w.lights[0]).unwrap());
}

#[test]
fn shadow_object_behind_point() {
    let w = World::default_world().unwrap();
    let p = Tuple4D::point(-2.0, 2.0, -2.0);

    assert!(!w.is_shadowed(p, &w.lights[0]).unwrap());
}

#[test]
fn lit_surface_does_not_shadow_itself() {
    let mut w = World::empty();
    w.lights.push(PointLight::new(Color::white(),
        Tuple4D::point(0.0, 0.0, -10.0)));
    w.objects.push(Shape::sphere());

    // Straight on, the facing point of the sphere is fully lit.
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    assert_eq!(w.color_at(&r).unwrap(), Color::rgb(1.9, 1.9, 1.9));
}
