use std::f64::consts::PI;

use log::{ info, warn };

use crate::color::Color;
use crate::tuple::Tuple4D;
use crate::matrix::Matrix4D;
use crate::light::{ PointLight, Material };
use crate::shape::Shape;
use crate::world::World;
use crate::camera::Camera;
use crate::error::{ Result, TracerError };
use crate::protocol::{ PixelResponse, pixel_requests };
use crate::sink::DisplaySink;
use crate::consts::DEFAULT_SAMPLES;

/// Everything needed to render an image.
///
/// A scene is built once and never changes afterwards. Workers share it
/// through an `Arc` and only ever read from it.
#[derive(Debug)]
pub struct Scene {
    world: World,
    camera: Camera,
    samples: usize,
}

impl Scene {
    /// Bundles a world and a camera into a renderable scene.
    ///
    /// Fails with `NoLights` if the world has no light source.
    pub fn new(world: World, camera: Camera) -> Result<Scene> {
        if world.lights.is_empty() {
            return Err(TracerError::NoLights);
        }

        Ok(Scene { world, camera, samples: DEFAULT_SAMPLES })
    }

    /// Sets the anti-aliasing grid: each pixel averages `samples` x
    /// `samples` evenly spaced rays. One sample shoots the pixel center.
    pub fn with_samples(mut self, samples: usize) -> Result<Scene> {
        if samples == 0 {
            return Err(TracerError::InvalidConfig(
                "samples per pixel axis must be at least 1".into()
            ));
        }

        self.samples = samples;
        Ok(self)
    }

    /// Builds the demo scene: three spheres resting on a floor.
    pub fn demo(width: usize, height: usize) -> Result<Scene> {
        let floor = Shape::plane();

        let middle = Shape::sphere()
            .with_transform(Matrix4D::translation(-0.5, 1.0, 0.5))?
            .with_material(Material {
                color: Color::rgb(0.1, 1.0, 0.5),
                diffuse: 0.7,
                specular: 0.3,
                ..Default::default()
            });

        let right = Shape::sphere()
            .with_transform(Matrix4D::translation(1.5, 0.5, -0.5)
                * Matrix4D::scaling(0.5, 0.5, 0.5))?
            .with_material(Material {
                color: Color::rgb(0.5, 1.0, 0.1),
                diffuse: 0.7,
                specular: 0.3,
                ..Default::default()
            });

        let left = Shape::sphere()
            .with_transform(Matrix4D::translation(-1.5, 0.33, -0.75)
                * Matrix4D::scaling(0.33, 0.33, 0.33))?
            .with_material(Material {
                color: Color::rgb(1.0, 0.8, 0.1),
                diffuse: 0.7,
                specular: 0.3,
                ..Default::default()
            });

        let world = World {
            objects: vec![floor, middle, right, left],
            lights: vec![PointLight::new(
                Color::white(),
                Tuple4D::point(-10.0, 10.0, -10.0),
            )],
        };

        let view = Matrix4D::view_transform(
            Tuple4D::point(0.0, 1.5, -5.0),
            Tuple4D::point(0.0, 1.0, 0.0),
            Tuple4D::vector(0.0, 1.0, 0.0),
        )?;
        let camera = Camera::new(width, height, PI / 3.0, view)?;

        Scene::new(world, camera)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn width(&self) -> usize {
        self.camera.hsize()
    }

    pub fn height(&self) -> usize {
        self.camera.vsize()
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    fn try_pixel_color(&self, x: usize, y: usize) -> Result<Color> {
        if self.samples == 1 {
            let ray = self.camera.ray_for_pixel(x, y)?;
            return self.world.color_at(&ray);
        }

        let n = self.samples;
        let step = 1.0 / n as f64;
        let mut sum = Color::black();

        for sy in 0..n {
            for sx in 0..n {
                let fx = (sx as f64 + 0.5) * step;
                let fy = (sy as f64 + 0.5) * step;
                let ray = self.camera.ray_through(x, y, fx, fy)?;
                sum = sum + self.world.color_at(&ray)?;
            }
        }

        Ok(sum / (n * n) as f64)
    }

    /// The color of pixel (`x`, `y`).
    ///
    /// A pixel that fails to shade is logged and comes back black, so one
    /// bad pixel never aborts a render.
    pub fn pixel_color(&self, x: usize, y: usize) -> Color {
        self.try_pixel_color(x, y).unwrap_or_else(|e| {
            warn!("pixel ({}, {}) failed, painting background: {}", x, y, e);
            Color::black()
        })
    }

    /// Shades one pixel and packages it for a display sink.
    pub fn color_at_pixel(&self, x: usize, y: usize) -> PixelResponse {
        PixelResponse::new(x, y, self.pixel_color(x, y).to_rgb8())
    }

    /// Renders every pixel on the calling thread, painting as it goes.
    pub fn render_sequential(&self, sink: &mut dyn DisplaySink) -> Result<()> {
        info!("Rendering {}x{} on one thread...", self.width(), self.height());

        for req in pixel_requests(self.width(), self.height()) {
            sink.paint(&self.color_at_pixel(req.x, req.y))?;
        }

        sink.finish()?;
        info!("...done.");
        Ok(())
    }
}

#[cfg(test)]
#[derive(Debug)]
struct Degenerate;

#[cfg(test)]
impl crate::shape::Geometry for Degenerate {
    fn local_intersect(&self, _ray: &crate::ray::Ray4D) -> Vec<f64> {
        vec![1.0]
    }

    fn local_normal_at(&self, _at: &Tuple4D) -> Tuple4D {
        Tuple4D::vector(0.0, 0.0, 0.0)
    }
}

#[cfg(test)]
fn default_scene(size: usize) -> Scene {
    let view = Matrix4D::view_transform(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 1.0, 0.0),
    ).unwrap();
    let camera = Camera::new(size, size, PI / 2.0, view).unwrap();

    Scene::new(World::default_world().unwrap(), camera).unwrap()
}

#[test]
fn scene_needs_a_light() {
    let camera = Camera::new(4, 4, PI / 2.0, Matrix4D::identity()).unwrap();

    assert!(matches!(Scene::new(World::empty(), camera),
        Err(TracerError::NoLights)));
}

#[test]
fn zero_samples_rejected() {
    assert!(default_scene(3).with_samples(0).is_err());
}

#[test]
fn single_sample_matches_camera_render() {
    let scene = default_scene(11);
    let reference = scene.camera().render(scene.world()).unwrap();

    for y in 0..11 {
        for x in 0..11 {
            assert_eq!(scene.pixel_color(x, y), reference.read_pixel(x, y)
                .unwrap());
        }
    }
}

#[test]
fn center_pixel_of_default_scene() {
    let scene = default_scene(11);
    let resp = scene.color_at_pixel(5, 5);

    assert_eq!(resp.color(), Color::rgb(0.38066, 0.47583, 0.2855).to_rgb8());
    assert_eq!((resp.x, resp.y), (5, 5));
}

#[test]
fn multi_sample_averages_stratified_rays() {
    let scene = default_scene(11).with_samples(2).unwrap();

    let mut expected = Color::black();
    for &(fx, fy) in [(0.25, 0.25), (0.75, 0.25), (0.25, 0.75), (0.75, 0.75)]
        .iter() {
        let ray = scene.camera().ray_through(3, 7, fx, fy).unwrap();
        expected = expected + scene.world().color_at(&ray).unwrap();
    }

    assert_eq!(scene.pixel_color(3, 7), expected / 4.0);
}

#[test]
fn failing_pixel_is_painted_black() {
    let mut world = World::default_world().unwrap();
    world.objects = vec![Shape::new(Box::new(Degenerate))];
    let camera = Camera::new(3, 3, PI / 2.0, Matrix4D::identity()).unwrap();
    let scene = Scene::new(world, camera).unwrap();

    assert_eq!(scene.pixel_color(1, 1), Color::black());
    assert_eq!(scene.color_at_pixel(1, 1),
        PixelResponse { x: 1, y: 1, r: 0, g: 0, b: 0 });
}

#[test]
fn sequential_render_paints_every_pixel() {
    use crate::canvas::Canvas;

    let scene = default_scene(5);
    let mut canvas = Canvas::new(5, 5);
    scene.render_sequential(&mut canvas).unwrap();

    let reference = scene.camera().render(scene.world()).unwrap();
    for y in 0..5 {
        for x in 0..5 {
            assert_eq!(canvas.read_pixel(x, y).unwrap().to_rgb8(),
                reference.read_pixel(x, y).unwrap().to_rgb8());
        }
    }
}

#[test]
fn demo_scene_builds() {
    let scene = Scene::demo(40, 20).unwrap();

    assert_eq!(scene.width(), 40);
    assert_eq!(scene.height(), 20);
    assert_eq!(scene.world().objects.len(), 4);
    assert!(Scene::demo(0, 20).is_err());
}
