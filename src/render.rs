//! Rendering the scale bar overlay.

pub use self::canvas::Canvas;
pub use self::layout::{Block, Layout};

pub mod canvas;
pub mod layout;
mod bar;

use kurbo::{Rect, Size};
use log::trace;
use crate::config::Options;
use crate::scale::ScaleResult;
use crate::surface::{Platform, RenderError, SurfaceFormat};


//------------ Renderer ------------------------------------------------------

/// Paints scales onto surfaces.
///
/// Every render creates a fresh surface, so nothing of an earlier render
/// survives into the next one.
#[derive(Clone, Copy, Debug)]
pub struct Renderer<'a> {
    options: &'a Options,
}

impl<'a> Renderer<'a> {
    pub fn new(options: &'a Options) -> Self {
        Renderer { options }
    }

    pub fn layout(&self, result: &ScaleResult) -> Layout {
        Layout::new(result, self.options)
    }

    /// Renders the scales into a new surface provided by `platform`.
    pub fn render(
        &self, result: &ScaleResult, platform: &dyn Platform
    ) -> Result<Frame, RenderError> {
        let layout = self.layout(result);
        let pixel_ratio = platform.pixel_ratio();
        let (width, height) = layout.physical_size(pixel_ratio)?;
        let surface = platform.create_surface(width, height)?;
        self.render_surface(&layout, &surface, pixel_ratio)?;
        let format = surface.format();
        let data = surface.finish()?;
        trace!(
            "rendered {}x{} {} scale bar ({} bytes)",
            width, height, format, data.len()
        );
        Ok(Frame {
            data,
            format,
            size: layout.size(),
            physical_size: (width, height),
        })
    }

    /// Renders a layout onto an existing surface.
    ///
    /// The surface should be at least the layout’s physical size.
    pub fn render_surface(
        &self, layout: &Layout, surface: &cairo::Surface, pixel_ratio: f64
    ) -> Result<(), RenderError> {
        let canvas = Canvas::new(surface, pixel_ratio)?;
        self.draw(&canvas, layout)?;
        surface.flush();
        Ok(())
    }

    /// Draws a layout onto a canvas.
    pub fn draw(
        &self, canvas: &Canvas, layout: &Layout
    ) -> Result<(), cairo::Error> {
        canvas.save()?;
        canvas.set_operator(cairo::Operator::Clear);
        canvas.paint()?;
        canvas.restore()?;

        if self.options.show_frame {
            self.draw_frame(canvas, layout.rect())?;
        }

        canvas.apply_font(
            self.options.primary_font_family(), self.options.font_size
        )?;
        for block in layout.blocks() {
            bar::draw(canvas, block, self.options)?;
        }
        Ok(())
    }

    fn draw_frame(
        &self, canvas: &Canvas, rect: Rect
    ) -> Result<(), cairo::Error> {
        self.options.background_color.fade(
            self.options.transparency
        ).apply(canvas);
        canvas.rect(rect);
        canvas.fill()?;

        self.options.frame_color.apply(canvas);
        canvas.set_line_width(self.options.frame_width);
        canvas.rect(rect.inset(-0.5));
        canvas.stroke()
    }
}


//------------ Frame ---------------------------------------------------------

/// A rendered overlay.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// The encoded image.
    pub data: Vec<u8>,

    /// The format of the image.
    pub format: SurfaceFormat,

    /// The size in logical pixels.
    pub size: Size,

    /// The size of the image in physical pixels.
    pub physical_size: (i32, i32),
}

impl Frame {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}


//------------ Helper Functions ----------------------------------------------

/// Renders the scales for `options` into an image of `format`.
pub fn render_image(
    result: &ScaleResult, options: &Options,
    pixel_ratio: f64, format: SurfaceFormat,
) -> Result<Frame, RenderError> {
    Renderer::new(options).render(
        result, &crate::surface::StaticPlatform::new(pixel_ratio, format)
    )
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use std::ops;
    use crate::config::{BarStyle, Units};
    use crate::color::Color;

    /// Returns alpha, red, green, and blue of a pixel.
    fn pixel(surface: &mut cairo::ImageSurface, x: i32, y: i32) -> [u8; 4] {
        let stride = surface.stride() as usize;
        let data = surface.data().unwrap();
        let offset = y as usize * stride + x as usize * 4;
        let argb = u32::from_ne_bytes([
            data[offset], data[offset + 1], data[offset + 2], data[offset + 3]
        ]);
        [
            (argb >> 24) as u8, (argb >> 16) as u8,
            (argb >> 8) as u8, argb as u8
        ]
    }

    fn draw_image(
        options: &Options, result: &ScaleResult
    ) -> (cairo::ImageSurface, Layout) {
        let renderer = Renderer::new(options);
        let layout = renderer.layout(result);
        let (width, height) = layout.physical_size(1.).unwrap();
        let surface = cairo::ImageSurface::create(
            cairo::Format::ARgb32, width, height
        ).unwrap();
        renderer.render_surface(&layout, &surface, 1.).unwrap();
        (surface, layout)
    }

    fn result(options: &Options) -> ScaleResult {
        ScaleResult::from_distance(10_000., options).unwrap()
    }

    #[test]
    fn render_is_idempotent() {
        for style in [BarStyle::Line, BarStyle::Checkered] {
            let options = Options {
                units: Units::Both, style, .. Default::default()
            };
            let res = result(&options);
            let one = render_image(&res, &options, 2., SurfaceFormat::Png);
            let two = render_image(&res, &options, 2., SurfaceFormat::Png);
            assert_eq!(one.unwrap(), two.unwrap());
        }
    }

    #[test]
    fn frame_sizes() {
        let options = Options::default();
        let frame = render_image(
            &result(&options), &options, 2., SurfaceFormat::Png
        ).unwrap();
        assert_eq!(frame.size, Size::new(180., 47.));
        assert_eq!(frame.physical_size, (360, 94));
        assert_eq!(frame.content_type(), "image/png");
        assert!(frame.data.starts_with(b"\x89PNG"));
    }

    #[test]
    fn render_svg() {
        let options = Options::default();
        let frame = render_image(
            &result(&options), &options, 1., SurfaceFormat::Svg
        ).unwrap();
        assert_eq!(frame.content_type(), "image/svg+xml");
        let text = String::from_utf8(frame.data).unwrap();
        assert!(text.contains("<svg"));
    }

    #[test]
    fn checkered_segments_alternate() {
        let options = Options {
            style: BarStyle::Checkered,
            show_frame: false,
            .. Default::default()
        };
        let (mut surface, layout) = draw_image(&options, &result(&options));
        let block = layout.blocks()[0];
        let bar = block.checkered_bar(&options);
        let y = ((bar.y0 + bar.y1) / 2.) as i32;
        let segments: Vec<_> = block.segments(&options).collect();

        for (i, segment) in segments.iter().enumerate() {
            let x = ((segment.x0 + segment.x1) / 2.) as i32;
            let [alpha, red, green, blue] = pixel(&mut surface, x, y);
            assert_eq!(alpha, 255, "segment {}", i);
            let expected = if i % 2 == 0 { 255 } else { 0 };
            assert_eq!([red, green, blue], [expected; 3], "segment {}", i);
        }

        // Without frame, the corners stay transparent.
        assert_eq!(pixel(&mut surface, 1, 1)[0], 0);
    }

    #[test]
    fn checkered_outline_dividers_and_ticks() {
        let options = Options {
            style: BarStyle::Checkered,
            show_frame: false,
            .. Default::default()
        };
        let (mut surface, layout) = draw_image(&options, &result(&options));
        let block = layout.blocks()[0];
        let bar = block.checkered_bar(&options);
        let middle = ((bar.y0 + bar.y1) / 2.) as i32;

        // The outline extends half the stroke width beyond the bar.
        for (x, y) in [
            (bar.x0 as i32 - 1, middle),
            (bar.x1 as i32, middle),
            (60, bar.y0 as i32 - 1),
            (60, bar.y1 as i32),
        ] {
            let [alpha, red, _, _] = pixel(&mut surface, x, y);
            assert_eq!((alpha, red), (255, 0), "outline at {},{}", x, y);
        }

        // Interior boundaries are stroked even where a white segment
        // starts.
        let boundaries: Vec<f64> = block.segments(&options)
            .skip(1).map(|segment| segment.x0).collect();
        assert_eq!(boundaries.len(), 3);
        for &x in &boundaries {
            let [alpha, red, _, _] = pixel(&mut surface, x as i32, middle);
            assert_eq!((alpha, red), (255, 0), "divider at {}", x);
        }

        // Ticks below the bar at both ends and every boundary, nothing
        // in between.
        let tick_y = bar.y1 as i32 + 2;
        let ticks = [bar.x0].into_iter()
            .chain(boundaries.iter().copied())
            .chain([bar.x1]);
        for x in ticks {
            let alpha = pixel(&mut surface, x as i32, tick_y)[0];
            assert!(alpha > 100, "tick at {}: alpha {}", x, alpha);
        }
        assert_eq!(pixel(&mut surface, 30, tick_y)[0], 0);
        assert_eq!(pixel(&mut surface, 100, tick_y)[0], 0);
        assert_eq!(pixel(&mut surface, 30, bar.y1 as i32 + 5)[0], 0);
    }

    /// Returns whether anything was drawn into the given pixel rows.
    fn rows_touched(
        surface: &mut cairo::ImageSurface, xs: ops::Range<i32>,
        ys: ops::Range<i32>,
    ) -> bool {
        ys.into_iter().any(|y| {
            xs.clone().any(|x| pixel(surface, x, y)[0] != 0)
        })
    }

    #[test]
    fn labels_are_drawn() {
        let options = Options {
            show_frame: false,
            .. Default::default()
        };
        let (mut surface, layout) = draw_image(&options, &result(&options));
        let block = layout.blocks()[0];
        let line_y = block.line_y(&options) as i32;
        // Between the ticks and above the line, only the label.
        assert!(rows_touched(&mut surface, 30..150, 0..line_y - 3));

        let options = Options {
            style: BarStyle::Checkered,
            show_frame: false,
            .. Default::default()
        };
        let (mut surface, layout) = draw_image(&options, &result(&options));
        let block = layout.blocks()[0];
        let bar = block.checkered_bar(&options);
        assert!(rows_touched(&mut surface, 10..160, 0..bar.y0 as i32 - 2));

        // With the text fully transparent, the label rows stay empty.
        let options = Options {
            text_color: Color::rgba(0., 0., 0., 0.),
            .. options
        };
        let (mut surface, _) = draw_image(&options, &result(&options));
        assert!(!rows_touched(&mut surface, 10..160, 0..bar.y0 as i32 - 2));
    }

    #[test]
    fn frame_background_uses_transparency() {
        let options = Options {
            background_color: Color::WHITE,
            transparency: 0.5,
            .. Default::default()
        };
        let (mut surface, _) = draw_image(&options, &result(&options));

        // Inside the frame padding, away from border and bar.
        let [alpha, red, _, _] = pixel(&mut surface, 3, 3);
        assert!((126..=129).contains(&alpha), "alpha {}", alpha);
        assert_eq!(red, alpha);

        // The border itself is opaque black.
        let [alpha, red, _, _] = pixel(&mut surface, 0, 20);
        assert!(alpha > 200);
        assert!(red < 60);
    }

    #[test]
    fn line_is_stroked() {
        let options = Options {
            show_frame: false,
            .. Default::default()
        };
        let (mut surface, layout) = draw_image(&options, &result(&options));
        let block = layout.blocks()[0];
        let x = block.center_x() as i32;
        let y = block.line_y(&options) as i32;
        let [alpha, red, _, _] = pixel(&mut surface, x, y);
        assert_eq!(alpha, 255);
        assert_eq!(red, 0);
    }
}
