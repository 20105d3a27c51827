use serde::{ Serialize, Deserialize };

use crate::color::Rgb8;

/// A request for one pixel of a `width` x `height` image.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRequest {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// The answer to a `PixelRequest`: where to paint, and what.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelResponse {
    pub x: usize,
    pub y: usize,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl PixelResponse {
    pub fn new(x: usize, y: usize, color: Rgb8) -> PixelResponse {
        PixelResponse { x, y, r: color.r, g: color.g, b: color.b }
    }

    pub fn color(&self) -> Rgb8 {
        Rgb8 { r: self.r, g: self.g, b: self.b }
    }
}

/// Lists every pixel of a `width` x `height` image in row-major order.
///
/// ```
/// # use sphere_tracer::protocol::pixel_requests;
/// let order: Vec<(usize, usize)> = pixel_requests(2, 2)
///     .map(|r| (r.x, r.y))
///     .collect();
/// assert_eq!(order, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
/// ```
pub fn pixel_requests(width: usize, height: usize)
    -> impl Iterator<Item = PixelRequest> {
    (0..height).flat_map(move |y| {
        (0..width).map(move |x| PixelRequest { x, y, width, height })
    })
}

#[test]
fn response_json_shape() {
    let resp = PixelResponse::new(3, 4, Rgb8 { r: 1, g: 2, b: 255 });
    let json = serde_json::to_string(&resp).unwrap();

    assert_eq!(json, r#"{"x":3,"y":4,"r":1,"g":2,"b":255}"#);
}

#[test]
fn request_from_json() {
    let req: PixelRequest = serde_json::from_str(
        r#"{"x":1,"y":2,"width":640,"height":480}"#
    ).unwrap();

    assert_eq!(req, PixelRequest { x: 1, y: 2, width: 640, height: 480 });
}

#[test]
fn requests_cover_the_grid_once() {
    use std::collections::HashSet;

    let reqs: Vec<PixelRequest> = pixel_requests(7, 3).collect();
    let unique: HashSet<(usize, usize)> =
        reqs.iter().map(|r| (r.x, r.y)).collect();

    assert_eq!(reqs.len(), 21);
    assert_eq!(unique.len(), 21);
    assert_eq!(pixel_requests(0, 5).count(), 0);
}
