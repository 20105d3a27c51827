use std::io::{ BufWriter, Write };

use crate::canvas::Canvas;
use crate::color::Color;
use crate::error::Result;
use crate::protocol::PixelResponse;

/// Something that can display rendered pixels.
///
/// A sink paints each response it receives at `(x, y)`. Responses arrive in
/// no particular order and each targets a distinct pixel, so a sink never
/// needs to know about any pixel other than the one it is painting.
pub trait DisplaySink {
    fn paint(&mut self, pixel: &PixelResponse) -> Result<()>;

    /// Called once after the last pixel of a render.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl DisplaySink for Canvas {
    fn paint(&mut self, pixel: &PixelResponse) -> Result<()> {
        self.write_pixel(pixel.x, pixel.y, &Color::from(pixel.color()));
        Ok(())
    }
}

/// Streams every response as one line of JSON.
///
/// Writes go through a buffer, so pixels are flushed in batches rather than
/// one write per pixel.
pub struct JsonLinesSink<W: Write> {
    out: BufWriter<W>,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> JsonLinesSink<W> {
        JsonLinesSink { out: BufWriter::new(out) }
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.out.into_inner().map_err(|e| e.into_error().into())
    }
}

impl<W: Write> DisplaySink for JsonLinesSink<W> {
    fn paint(&mut self, pixel: &PixelResponse) -> Result<()> {
        serde_json::to_writer(&mut self.out, pixel)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[test]
fn canvas_paints_bytes() {
    use crate::color::Rgb8;

    let mut c = Canvas::new(3, 3);
    let rgb = Rgb8 { r: 255, g: 51, b: 0 };
    c.paint(&PixelResponse::new(1, 2, rgb)).unwrap();

    assert_eq!(c.read_pixel(1, 2).unwrap(), Color::rgb(1.0, 0.2, 0.0));
    assert_eq!(c.read_pixel(2, 1).unwrap(), Color::black());
}

#[test]
fn json_lines_sink_writes_one_line_per_pixel() {
    use crate::color::Rgb8;

    let mut sink = JsonLinesSink::new(Vec::new());
    sink.paint(&PixelResponse::new(0, 0, Rgb8 { r: 1, g: 2, b: 3 })).unwrap();
    sink.paint(&PixelResponse::new(1, 0, Rgb8 { r: 4, g: 5, b: 6 })).unwrap();
    sink.finish().unwrap();

    let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();
    let parsed: Vec<PixelResponse> = text.lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[1], PixelResponse::new(1, 0, Rgb8 { r: 4, g: 5, b: 6 }));
}
