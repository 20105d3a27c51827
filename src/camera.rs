use crate::ray::Ray4D;
use crate::tuple::Tuple4D;
use crate::matrix::Matrix4D;
use crate::world::World;
use crate::canvas::Canvas;
use crate::error::{ Result, TracerError };

/// A camera record for generating a canvas.
///
/// This record gives a "frame" of the world. The camera sits at the origin of
/// its own space, looking down -Z at a canvas one unit away; `transform`
/// (typically a view transformation) orients the world relative to it.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    /// The horizontal size of the resultant canvas.
    hsize: usize,

    /// The vertical size of the resultant canvas.
    vsize: usize,

    half_width: f64,
    half_height: f64,
    pixel_size: f64,

    /// The angle describing "how much" the camera can see.
    field_of_view: f64,

    transform: Matrix4D,
    inverse: Matrix4D,
}

impl Camera {
    /// Creates a camera.
    ///
    /// Fails with `InvalidCamera` if either dimension is zero or the field of
    /// view is not strictly between 0 and pi, and with `NotInvertible` if
    /// `transform` is singular.
    pub fn new(hsize: usize, vsize: usize, field_of_view: f64,
        transform: Matrix4D) -> Result<Camera> {
        if hsize == 0 || vsize == 0 {
            return Err(TracerError::InvalidCamera(
                format!("canvas must be non-empty, got {}x{}", hsize, vsize)
            ));
        }

        if !(field_of_view > 0.0 && field_of_view < std::f64::consts::PI) {
            return Err(TracerError::InvalidCamera(
                format!("field of view {} is outside (0, pi)", field_of_view)
            ));
        }

        let inverse = transform.inverse()?;

        let half_view = (field_of_view / 2.0).tan();
        let aspect = (hsize as f64) / (vsize as f64);

        let (half_width, half_height) = if aspect >= 1.0 {
            (half_view, half_view / aspect)
        } else {
            (half_view * aspect, half_view)
        };

        let pixel_size = half_width * 2.0 / (hsize as f64);
        Ok(Camera {
            hsize,
            vsize,
            half_width,
            half_height,
            pixel_size,
            field_of_view,
            transform,
            inverse,
        })
    }

    pub fn hsize(&self) -> usize {
        self.hsize
    }

    pub fn vsize(&self) -> usize {
        self.vsize
    }

    pub fn pixel_size(&self) -> f64 {
        self.pixel_size
    }

    pub fn field_of_view(&self) -> f64 {
        self.field_of_view
    }

    pub fn transform(&self) -> &Matrix4D {
        &self.transform
    }

    /// The ray from the camera through the center of pixel (`px`, `py`).
    pub fn ray_for_pixel(&self, px: usize, py: usize) -> Result<Ray4D> {
        self.ray_through(px, py, 0.5, 0.5)
    }

    /// The ray through a point inside pixel (`px`, `py`).
    ///
    /// `fx` and `fy` are fractions of the pixel, measured from its top-left
    /// corner; `(0.5, 0.5)` is the pixel center.
    pub fn ray_through(&self, px: usize, py: usize, fx: f64, fy: f64)
        -> Result<Ray4D> {
        // Offsets from the edge of the canvas
        let xoffset = (px as f64 + fx) * self.pixel_size;
        let yoffset = (py as f64 + fy) * self.pixel_size;

        // The camera looks toward -Z, so +X is to the *left*
        let world_x = self.half_width - xoffset;
        let world_y = self.half_height - yoffset;

        let pixel = self.inverse * Tuple4D::point(world_x, world_y, -1.0);
        let origin = self.inverse * Tuple4D::origin();
        let direction = (pixel - origin).normalize()?;

        Ok(Ray4D::new(origin, direction))
    }

    /// Renders a world one pixel at a time, in row-major order.
    ///
    /// This is the single-threaded reference render. Any failure aborts the
    /// whole render; see `Scene` for the per-pixel tolerant variant.
    pub fn render(&self, w: &World) -> Result<Canvas> {
        if w.lights.is_empty() {
            return Err(TracerError::NoLights);
        }

        let mut image = Canvas::new(self.hsize, self.vsize);

        for y in 0..self.vsize {
            for x in 0..self.hsize {
                let ray = self.ray_for_pixel(x, y)?;
                let color = w.color_at(&ray)?;
                image.write_pixel(x, y, &color);
            }
        }

        Ok(image)
    }
}

#[test]
fn pixel_size_horizontal_canvas() {
    let c = Camera::new(200, 125, std::f64::consts::PI / 2.0,
        Matrix4D::identity()).unwrap();

    assert!(crate::feq(c.pixel_size(), 0.01));
}

#[test]
fn pixel_size_vertical_canvas() {
    let c = Camera::new(125, 200, std::f64::consts::PI / 2.0,
        Matrix4D::identity()).unwrap();

    assert!(crate::feq(c.pixel_size(), 0.01));
}

#[test]
fn invalid_cameras_are_rejected() {
    let pi = std::f64::consts::PI;

    assert!(Camera::new(0, 10, pi / 2.0, Matrix4D::identity()).is_err());
    assert!(Camera::new(10, 0, pi / 2.0, Matrix4D::identity()).is_err());
    assert!(Camera::new(10, 10, 0.0, Matrix4D::identity()).is_err());
    assert!(Camera::new(10, 10, pi, Matrix4D::identity()).is_err());
    assert!(matches!(
        Camera::new(10, 10, pi / 2.0, Matrix4D::scaling(0.0, 1.0, 1.0)),
        Err(TracerError::NotInvertible)
    ));
}

#[test]
fn ray_through_center() {
    let c = Camera::new(201, 101, std::f64::consts::PI / 2.0,
        Matrix4D::identity()).unwrap();
    let r = c.ray_for_pixel(100, 50).unwrap();

    assert_eq!(r.origin, Tuple4D::point(0.0, 0.0, 0.0));
    assert_eq!(r.direction, Tuple4D::vector(0.0, 0.0, -1.0));
}

#[test]
fn ray_through_corner() {
    let c = Camera::new(201, 101, std::f64::consts::PI / 2.0,
        Matrix4D::identity()).unwrap();
    let r = c.ray_for_pixel(0, 0).unwrap();

    assert_eq!(r.origin, Tuple4D::point(0.0, 0.0, 0.0));
    assert_eq!(r.direction, Tuple4D::vector(0.66519, 0.33259, -0.66851));
}

#[test]
fn ray_when_camera_transformed() {
    let c = Camera::new(201, 101, std::f64::consts::PI / 2.0,
        Matrix4D::rotation_y(std::f64::consts::PI / 4.0)
            * Matrix4D::translation(0.0, -2.0, 5.0)).unwrap();
    let r = c.ray_for_pixel(100, 50).unwrap();

    assert_eq!(r.origin, Tuple4D::point(0.0, 2.0, -5.0));
    assert_eq!(r.direction,
        Tuple4D::vector(2.0f64.sqrt() / 2.0, 0.0, -(2.0f64.sqrt() / 2.0)));
}

#[test]
fn render_world_with_camera() {
    use crate::color::Color;

    let w = World::default_world().unwrap();

    let from = Tuple4D::point(0.0, 0.0, -5.0);
    let to = Tuple4D::point(0.0, 0.0, 0.0);
    let up = Tuple4D::vector(0.0, 1.0, 0.0);

    let c = Camera::new(11, 11, std::f64::consts::PI / 2.0,
        Matrix4D::view_transform(from, to, up).unwrap()).unwrap();

    let image = c.render(&w).unwrap();
    let center_ray = c.ray_for_pixel(5, 5).unwrap();

    assert_eq!(image.read_pixel(5, 5).unwrap(),
        Color::rgb(0.38066, 0.47583, 0.2855));
    assert_eq!(image.read_pixel(5, 5).unwrap(),
        w.color_at(&center_ray).unwrap());
}

#[test]
fn render_without_lights_fails() {
    let mut w = World::default_world().unwrap();
    w.lights.clear();
    let c = Camera::new(4, 4, std::f64::consts::PI / 2.0,
        Matrix4D::identity()).unwrap();

    assert!(matches!(c.render(&w), Err(TracerError::NoLights)));
}
