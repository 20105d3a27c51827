use std::ops::{ Add, Sub, Mul, Div };

use serde::{ Serialize, Deserialize };

use crate::feq;

/// A color.
///
/// Represented with red-green-blue (RGB) values. Displayable values range
/// from 0.0 to 1.0 inclusive, but intermediate results (summed light
/// contributions, for instance) may exceed 1.0; clamping happens when a
/// color is converted to bytes.
///
/// # Examples
///
/// ```
/// # use sphere_tracer::color::Color;
/// let yellow = Color::rgb(1.0, 1.0, 0.0);
/// let purple = Color::rgb(1.0, 0.0, 1.0);
/// assert_eq!(yellow * purple, Color::red());
/// ```
#[derive(Copy, Clone, Debug, Default, PartialOrd)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Approximate, component-wise equality.
impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        feq(self.r, other.r) &&
            feq(self.g, other.g) &&
            feq(self.b, other.b)
    }
}

/// A color as displayed: one byte per channel.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash,
    Serialize, Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Clamps a channel to [0, 1], scales it to [0, 255] and rounds.
fn channel_to_byte(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl Color {
    pub fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b }
    }

    pub fn black() -> Color {
        Color::rgb(0.0, 0.0, 0.0)
    }

    pub fn white() -> Color {
        Color::rgb(1.0, 1.0, 1.0)
    }

    pub fn red() -> Color {
        Color::rgb(1.0, 0.0, 0.0)
    }

    /// Computes the Hadamard (component-wise) product of two colors.
    pub fn hadamard(c1: &Color, c2: &Color) -> Color {
        Color {
            r: c1.r * c2.r,
            g: c1.g * c2.g,
            b: c1.b * c2.b,
        }
    }

    /// Converts to display bytes.
    ///
    /// ```
    /// # use sphere_tracer::color::{ Color, Rgb8 };
    /// let c = Color::rgb(1.5, 0.5, -0.2);
    /// assert_eq!(c.to_rgb8(), Rgb8 { r: 255, g: 128, b: 0 });
    /// ```
    pub fn to_rgb8(&self) -> Rgb8 {
        Rgb8 {
            r: channel_to_byte(self.r),
            g: channel_to_byte(self.g),
            b: channel_to_byte(self.b),
        }
    }
}

impl From<Rgb8> for Color {
    fn from(c: Rgb8) -> Color {
        Color {
            r: c.r as f64 / 255.0,
            g: c.g as f64 / 255.0,
            b: c.b as f64 / 255.0,
        }
    }
}

impl Add<Color> for Color {
    type Output = Color;

    fn add(self, other: Color) -> Self::Output {
        Color {
            r: self.r + other.r,
            g: self.g + other.g,
            b: self.b + other.b,
        }
    }
}

impl Sub<Color> for Color {
    type Output = Color;

    fn sub(self, other: Color) -> Self::Output {
        Color {
            r: self.r - other.r,
            g: self.g - other.g,
            b: self.b - other.b,
        }
    }
}

impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, other: f64) -> Self::Output {
        Color {
            r: self.r * other,
            g: self.g * other,
            b: self.b * other,
        }
    }
}

impl Mul<Color> for f64 {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        other * self
    }
}

/// Shorthand for `Color::hadamard(&c1, &c2)`.
impl Mul<Color> for Color {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        Color::hadamard(&self, &other)
    }
}

impl Div<f64> for Color {
    type Output = Color;

    fn div(self, other: f64) -> Self::Output {
        self * (1.0 / other)
    }
}

#[test]
fn add_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);

    assert_eq!(c1 + c2, Color::rgb(1.6, 0.7, 1.0));
}

#[test]
fn subtract_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);

    assert_eq!(c1 - c2, Color::rgb(0.2, 0.5, 0.5));
}

#[test]
fn multiply_colors() {
    let c1 = Color::rgb(1.0, 0.2, 0.4);
    let c2 = Color::rgb(0.9, 1.0, 0.1);

    assert_eq!(c1 * c2, Color::rgb(0.9, 0.2, 0.04));
    assert_eq!(c1 * 2.0, Color::rgb(2.0, 0.4, 0.8));
    assert_eq!(c1 / 2.0, Color::rgb(0.5, 0.1, 0.2));
}

#[test]
fn byte_conversion_clamps_then_rounds() {
    assert_eq!(channel_to_byte(1.0), 255);
    assert_eq!(channel_to_byte(1.5), 255);
    assert_eq!(channel_to_byte(0.0), 0);
    assert_eq!(channel_to_byte(-0.5), 0);
    assert_eq!(channel_to_byte(0.5), 128);
    assert_eq!(channel_to_byte(0.2), 51);
}

#[test]
fn bytes_survive_conversion_to_color() {
    let bytes = Rgb8 { r: 12, g: 200, b: 255 };

    assert_eq!(Color::from(bytes).to_rgb8(), bytes);
}
