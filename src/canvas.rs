use std::io::{ self, BufWriter, Write };
use std::fs::File;
use std::path::Path;

use clap::ArgEnum;
use serde::Serialize;

use crate::color::Color;
use crate::error::Result;

/// Image formats a `Canvas` can be saved as.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ArgEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Plain text PPM (P3).
    Ppm,

    /// 8-bit RGB PNG.
    Png,
}

impl ImageFormat {
    /// Guesses the format from a file extension, ignoring case.
    ///
    /// ```
    /// # use std::path::Path;
    /// # use sphere_tracer::canvas::ImageFormat;
    /// assert_eq!(ImageFormat::from_path(Path::new("a/b.PPM")),
    ///     Some(ImageFormat::Ppm));
    /// assert_eq!(ImageFormat::from_path(Path::new("out")), None);
    /// ```
    pub fn from_path(path: &Path) -> Option<ImageFormat> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();

        match ext.as_str() {
            "ppm" => Some(ImageFormat::Ppm),
            "png" => Some(ImageFormat::Png),
            _ => None,
        }
    }
}

/// A canvas for drawing pixels.
///
/// The canvas stores the resultant colors for each pixel ray. Once rendering
/// finishes, the `Canvas` can be used to save the pixels to an image file.
///
/// Images can be written as PPM or PNG.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Canvas {
    /// The width of the canvas, in pixels.
    pub width: usize,

    /// The height of the canvas, in pixels.
    pub height: usize,

    /// The pixels of the canvas, stored as a flattened row-major vector.
    pixels: Vec<Color>,
}

impl Canvas {
    /// Creates a black canvas with specified width and height.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![Color::black(); width * height]
        }
    }

    /// Saves a canvas to an image file.
    pub fn save(&self, path: &Path, format: ImageFormat) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);

        match format {
            ImageFormat::Ppm => self.write_ppm(&mut out)?,
            ImageFormat::Png => self.write_png(&mut out)?,
        }
        out.flush()?;

        Ok(())
    }

    /// Writes the canvas as an 8-bit RGB PNG image.
    pub fn write_png<W: Write>(&self, out: W) -> Result<()> {
        let mut encoder = png::Encoder::new(out,
            self.width as u32, self.height as u32);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);

        let data: Vec<u8> = self.pixels.iter()
            .flat_map(|p| {
                let rgb = p.to_rgb8();
                vec![rgb.r, rgb.g, rgb.b]
            })
            .collect();

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&data)?;
        writer.finish()?;

        Ok(())
    }

    /// Writes the canvas as a plain (P3) PPM image.
    ///
    /// Lines in the PPM file are clamped to 70 columns. If some value would
    /// pass the 70 column mark on a line, it is moved to the next line.
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> io::Result<()> {
        // Header: magic number, dimensions, maximum color value
        writeln!(out, "P3")?;
        writeln!(out, "{} {}", self.width, self.height)?;
        writeln!(out, "255")?;

        for row in self.pixels.chunks(self.width.max(1)) {
            let mut col = 0;

            for pixel in row.iter() {
                let rgb = pixel.to_rgb8();

                for value in [rgb.r, rgb.g, rgb.b].iter() {
                    let s = value.to_string();

                    if col == 0 {
                        write!(out, "{}", s)?;
                        col = s.len();
                    } else if col + 1 + s.len() > 70 {
                        write!(out, "\n{}", s)?;
                        col = s.len();
                    } else {
                        write!(out, " {}", s)?;
                        col += 1 + s.len();
                    }
                }
            }

            writeln!(out)?;
        }

        Ok(())
    }

    /// Writes a color to a location on the `Canvas`.
    ///
    /// Out-of-bounds pixels are ignored. `y` is the row of the pixel and `x`
    /// is the column; both are zero-indexed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sphere_tracer::color::Color;
    /// # use sphere_tracer::canvas::Canvas;
    /// let purple = Color::rgb(1.0, 0.0, 1.0);
    /// let mut canvas = Canvas::new(8, 8);
    /// canvas.write_pixel(4, 2, &purple);
    /// assert_eq!(canvas.read_pixel(4, 2).unwrap(), purple);
    /// ```
    pub fn write_pixel(&mut self, x: usize, y: usize, pixel: &Color) {
        if x >= self.width || y >= self.height {
            return;
        }

        self.pixels[(y * self.width) + x] = *pixel;
    }

    /// Reads a color from a location on the `Canvas`.
    ///
    /// Returns `None` if the location is out-of-bounds.
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None
        }

        Some(self.pixels[(y * self.width) + x])
    }
}

#[test]
fn new_canvas_is_black() {
    let c = Canvas::new(10, 20);

    assert_eq!(c.width, 10);
    assert_eq!(c.height, 20);
    assert!(c.pixels.iter().all(|p| *p == Color::black()));
}

#[test]
fn out_of_bounds_access() {
    let mut c = Canvas::new(2, 2);
    c.write_pixel(2, 0, &Color::red());

    assert_eq!(c, Canvas::new(2, 2));
    assert_eq!(c.read_pixel(0, 2), None);
}

#[test]
fn ppm_header_and_pixels() {
    let mut c = Canvas::new(5, 3);
    c.write_pixel(0, 0, &Color::rgb(1.5, 0.0, 0.0));
    c.write_pixel(2, 1, &Color::rgb(0.0, 0.5, 0.0));
    c.write_pixel(4, 2, &Color::rgb(-0.5, 0.0, 1.0));

    let mut out = Vec::new();
    c.write_ppm(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    let expected = "P3\n5 3\n255\n\
        255 0 0 0 0 0 0 0 0 0 0 0 0 0 0\n\
        0 0 0 0 0 0 0 128 0 0 0 0 0 0 0\n\
        0 0 0 0 0 0 0 0 0 0 0 0 0 0 255\n";
    assert_eq!(text, expected);
}

#[test]
fn ppm_lines_wrap_at_70_columns() {
    let mut c = Canvas::new(10, 2);
    for y in 0..2 {
        for x in 0..10 {
            c.write_pixel(x, y, &Color::rgb(1.0, 0.8, 0.6));
        }
    }

    let mut out = Vec::new();
    c.write_ppm(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().skip(3).collect();

    assert_eq!(lines[0],
        "255 204 153 255 204 153 255 204 153 255 204 153 255 204 153 255 204");
    assert_eq!(lines[1],
        "153 255 204 153 255 204 153 255 204 153 255 204 153");
    assert_eq!(lines.len(), 4);
    assert!(lines.iter().all(|l| l.len() <= 70));
    assert!(text.ends_with('\n'));
}

#[test]
fn png_header_and_pixels() {
    let mut c = Canvas::new(5, 3);
    c.write_pixel(0, 0, &Color::rgb(1.5, 0.0, 0.0));
    c.write_pixel(4, 2, &Color::rgb(0.0, 0.5, 1.0));

    let mut out = Vec::new();
    c.write_png(&mut out).unwrap();

    // Signature, then the IHDR chunk with big-endian width and height.
    assert_eq!(&out[..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    assert_eq!(&out[12..16], b"IHDR");
    assert_eq!(&out[16..20], &5u32.to_be_bytes());
    assert_eq!(&out[20..24], &3u32.to_be_bytes());

    let decoder = png::Decoder::new(&out[..]);
    let mut reader = decoder.read_info().unwrap();
    let mut buf = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf).unwrap();

    assert_eq!((frame.width, frame.height), (5, 3));
    assert_eq!(frame.color_type, png::ColorType::Rgb);
    assert_eq!(&buf[..3], &[255, 0, 0]);
    assert_eq!(&buf[42..45], &[0, 128, 255]);
}

#[test]
fn save_writes_the_requested_format() {
    let dir = std::env::temp_dir();
    let png_path = dir.join(format!("sphere-tracer-{}.png", std::process::id()));
    let ppm_path = dir.join(format!("sphere-tracer-{}.ppm", std::process::id()));
    let c = Canvas::new(2, 2);

    c.save(&png_path, ImageFormat::Png).unwrap();
    c.save(&ppm_path, ImageFormat::Ppm).unwrap();
    let png_bytes = std::fs::read(&png_path).unwrap();
    let ppm_text = std::fs::read_to_string(&ppm_path).unwrap();
    std::fs::remove_file(&png_path).unwrap();
    std::fs::remove_file(&ppm_path).unwrap();

    assert_eq!(&png_bytes[1..4], b"PNG");
    assert!(ppm_text.starts_with("P3\n2 2\n255\n"));
}

#[test]
fn format_from_extension() {
    assert_eq!(ImageFormat::from_path(Path::new("out.png")),
        Some(ImageFormat::Png));
    assert_eq!(ImageFormat::from_path(Path::new("./render.ppm")),
        Some(ImageFormat::Ppm));
    assert_eq!(ImageFormat::from_path(Path::new("image.jpg")), None);
}
