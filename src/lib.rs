pub mod consts;
pub mod error;

pub mod tuple;
pub mod matrix;
pub mod ray;
pub mod intersect;

pub mod shape;
pub mod light;
pub mod world;
pub mod camera;

pub mod color;
pub mod canvas;

pub mod scene;
pub mod protocol;
pub mod sink;
pub mod parallel;
pub mod host;
pub mod config;

pub use error::{ Result, TracerError };

use consts::FEQ_EPSILON;

/// Approximate float equality, used by every `PartialEq` in the crate.
pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < FEQ_EPSILON
}
