//! Entry points for a host that owns the window, the canvas and the workers.
//!
//! Every function here renders the demo scene. None of them keep state
//! between calls, so the same arguments always produce the same pixels.

use crate::color::Rgb8;
use crate::scene::Scene;
use crate::sink::DisplaySink;
use crate::error::{ Result, TracerError };
use crate::protocol::{ PixelRequest, PixelResponse };

/// Renders the whole demo scene on the calling thread into `target`.
///
/// Every pixel has been painted by the time this returns.
pub fn draw(target: &mut dyn DisplaySink, width: usize, height: usize)
    -> Result<()> {
    Scene::demo(width, height)?.render_sequential(target)
}

/// The color of one pixel of a `width` x `height` demo render.
///
/// Fails with `InvalidConfig` if (`x`, `y`) lies outside the image.
///
/// ```
/// # use sphere_tracer::host::color_at_pixel;
/// let a = color_at_pixel(32, 24, 16, 20).unwrap();
/// let b = color_at_pixel(32, 24, 16, 20).unwrap();
/// assert_eq!(a, b);
/// ```
pub fn color_at_pixel(width: usize, height: usize, x: usize, y: usize)
    -> Result<Rgb8> {
    if x >= width || y >= height {
        return Err(TracerError::InvalidConfig(format!(
            "pixel ({}, {}) is outside a {}x{} image", x, y, width, height
        )));
    }

    Ok(Scene::demo(width, height)?.color_at_pixel(x, y).color())
}

/// Answers a worker request.
pub fn handle_request(req: &PixelRequest) -> Result<PixelResponse> {
    let rgb = color_at_pixel(req.width, req.height, req.x, req.y)?;
    Ok(PixelResponse::new(req.x, req.y, rgb))
}

#[test]
fn draw_matches_per_pixel_entry_point() {
    use crate::canvas::Canvas;
    use crate::color::Color;

    let mut canvas = Canvas::new(12, 9);
    draw(&mut canvas, 12, 9).unwrap();

    for &(x, y) in [(0, 0), (6, 4), (11, 8), (3, 7)].iter() {
        let rgb = color_at_pixel(12, 9, x, y).unwrap();
        assert_eq!(canvas.read_pixel(x, y).unwrap(), Color::from(rgb));
    }
}

#[test]
fn demo_floor_and_sky() {
    // The camera looks slightly down, so the bottom row is floor and the
    // top row misses everything.
    let sky = color_at_pixel(20, 16, 0, 0).unwrap();
    let floor = color_at_pixel(20, 16, 10, 15).unwrap();

    assert_eq!(sky, Rgb8 { r: 0, g: 0, b: 0 });
    assert_ne!(floor, sky);
}

#[test]
fn request_is_answered_in_place() {
    let req = PixelRequest { x: 7, y: 5, width: 16, height: 12 };
    let resp = handle_request(&req).unwrap();

    assert_eq!((resp.x, resp.y), (7, 5));
    assert_eq!(resp.color(), color_at_pixel(16, 12, 7, 5).unwrap());
}

#[test]
fn zero_sized_request_fails() {
    let req = PixelRequest { x: 0, y: 0, width: 0, height: 10 };

    assert!(handle_request(&req).is_err());
}

#[test]
fn pixels_outside_the_image_are_rejected() {
    assert!(matches!(color_at_pixel(10, 10, 500, 3),
        Err(TracerError::InvalidConfig(_))));
    assert!(color_at_pixel(10, 10, 3, 10).is_err());
    assert!(color_at_pixel(10, 10, 9, 9).is_ok());

    let req = PixelRequest { x: 16, y: 0, width: 16, height: 12 };
    assert!(matches!(handle_request(&req),
        Err(TracerError::InvalidConfig(_))));
}
