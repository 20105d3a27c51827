use crate::color::Color;
use crate::error::Result;
use crate::tuple::Tuple4D;

/// A light source with no size: a position and the color it emits.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PointLight {
    pub intensity: Color,
    pub position: Tuple4D,
}

impl PointLight {
    /// The `w` of `position` is forced to 1.
    pub fn new(intensity: Color, mut position: Tuple4D) -> PointLight {
        position.w = 1.0;

        PointLight { intensity, position }
    }
}

/// Surface color plus the Phong reflection coefficients.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub color: Color,

    pub ambient: f64,
    pub diffuse: f64,
    pub specular: f64,
    pub shininess: f64,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            color: Color::white(),

            ambient: 0.1,
            diffuse: 0.9,
            specular: 0.9,
            shininess: 200.0,
        }
    }
}

/// Calculates the color of a point lit by a single light.
///
/// This is the Phong model: an ambient term that is always present, a
/// diffuse term proportional to the cosine between the light and the normal,
/// and a specular term from the light reflected toward the eye. A point
/// `in_shadow` only receives ambient light.
///
/// The result is not clamped; contributions may sum past 1.0.
///
/// Fails with `DegenerateVector` if the light sits exactly on `point`.
pub fn lighting(m: &Material, light: &PointLight, point: Tuple4D,
    eyev: Tuple4D, normalv: Tuple4D, in_shadow: bool) -> Result<Color> {
    let effective_color = m.color * light.intensity;
    let ambient = effective_color * m.ambient;

    if in_shadow {
        return Ok(ambient);
    }

    let lightv = (light.position - point).normalize()?;

    // A negative cosine means the light is behind the surface
    let light_dot_normal = lightv.dot(&normalv);
    if light_dot_normal < 0.0 {
        return Ok(ambient);
    }

    let diffuse = effective_color * m.diffuse * light_dot_normal;

    let reflectv = (-lightv).reflect(&normalv);
    let reflect_dot_eye = reflectv.dot(&eyev);

    // Light reflecting away from the eye contributes no highlight
    let specular = if reflect_dot_eye <= 0.0 {
        Color::black()
    } else {
        let factor = reflect_dot_eye.powf(m.shininess);
        light.intensity * m.specular * factor
    };

    Ok(ambient + diffuse + specular)
}

#[cfg(test)]
const SQRT_2_2: f64 = std::f64::consts::SQRT_2 / 2.0;

/// Lights the origin of a surface facing -z, seen along `eyev`.
#[cfg(test)]
fn light_origin(eyev: Tuple4D, light_at: Tuple4D, in_shadow: bool)
    -> Result<Color> {
    let light = PointLight::new(Color::white(), light_at);

    lighting(&Material::default(), &light, Tuple4D::origin(), eyev,
        Tuple4D::vector(0.0, 0.0, -1.0), in_shadow)
}

#[test]
fn point_light_forces_point() {
    let light = PointLight::new(Color::white(), Tuple4D::vector(1.0, 2.0, 3.0));

    assert!(light.position.is_point());
}

#[test]
fn phong_reference_values() {
    let head_on = Tuple4D::vector(0.0, 0.0, -1.0);
    let cases = [
        // eye, light, expected
        (head_on, Tuple4D::point(0.0, 0.0, -10.0), 1.9),
        (Tuple4D::vector(0.0, SQRT_2_2, -SQRT_2_2),
            Tuple4D::point(0.0, 0.0, -10.0), 1.0),
        (head_on, Tuple4D::point(0.0, 10.0, -10.0), 0.7364),
        (Tuple4D::vector(0.0, -SQRT_2_2, -SQRT_2_2),
            Tuple4D::point(0.0, 10.0, -10.0), 1.6364),
        (head_on, Tuple4D::point(0.0, 0.0, 10.0), 0.1),
    ];

    for &(eyev, light_at, expected) in cases.iter() {
        assert_eq!(light_origin(eyev, light_at, false).unwrap(),
            Color::rgb(expected, expected, expected));
    }
}

#[test]
fn shadow_leaves_only_ambient() {
    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let lit = light_origin(eyev, Tuple4D::point(0.0, 0.0, -10.0), true);

    assert_eq!(lit.unwrap(), Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn colored_material_and_light_multiply() {
    let m = Material { color: Color::rgb(1.0, 0.5, 0.0), ..Default::default() };
    let light = PointLight::new(Color::rgb(0.5, 1.0, 1.0),
        Tuple4D::point(0.0, 0.0, 10.0));
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);

    // Light behind the surface: ambient only, tinted by both colors.
    let res = lighting(&m, &light, Tuple4D::origin(), normalv, normalv, false);
    assert_eq!(res.unwrap(), Color::rgb(0.05, 0.05, 0.0));
}

#[test]
fn light_on_the_surface_point_fails() {
    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);

    assert!(light_origin(eyev, Tuple4D::origin(), false).is_err());
}
