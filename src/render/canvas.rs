//! What we are drawing on.

use std::ops;
use std::cell::RefCell;
use std::collections::HashMap;
use kurbo::{Line, Point, Rect};


//------------ Canvas --------------------------------------------------------

/// The virtual surface to draw the scale bar on.
///
/// Drawing is done directly via deref-ing to a cairo context. The canvas
/// adds a few helpers that take kurbo geometry and a cache for font faces.
///
/// All coordinates are logical pixels. The context is scaled to the
/// surface’s pixel ratio upon creation.
#[derive(Debug)]
pub struct Canvas {
    /// The Cairo context for actual rendering.
    context: cairo::Context,

    /// The font table.
    fonts: RefCell<FontTable>,
}

impl Canvas {
    /// Creates a new canvas.
    ///
    /// One logical pixel will be `pixel_ratio` pixels on the surface.
    pub fn new(
        surface: &cairo::Surface, pixel_ratio: f64
    ) -> Result<Self, cairo::Error> {
        let context = cairo::Context::new(surface)?;
        context.scale(pixel_ratio, pixel_ratio);
        Ok(Canvas {
            context,
            fonts: RefCell::new(FontTable::new()),
        })
    }

    /// Returns a reference to the Cairo rendering context.
    pub fn context(&self) -> &cairo::Context {
        &self.context
    }

    pub fn apply_font(
        &self, family: &str, size: f64
    ) -> Result<(), cairo::Error> {
        self.context.set_font_face(self.fonts.borrow_mut().get(family)?);
        self.set_font_size(size);
        Ok(())
    }

    /// Adds a rectangle to the current path.
    pub fn rect(&self, rect: Rect) {
        self.context.rectangle(rect.x0, rect.y0, rect.width(), rect.height());
    }

    /// Adds a line to the current path.
    pub fn line(&self, line: Line) {
        self.context.move_to(line.p0.x, line.p0.y);
        self.context.line_to(line.p1.x, line.p1.y);
    }

    /// Shows text horizontally centered on `anchor`.
    ///
    /// The vertical middle of the font’s em box is placed on the anchor.
    pub fn show_centered(
        &self, text: &str, anchor: Point
    ) -> Result<(), cairo::Error> {
        let extents = self.text_extents(text)?;
        let font = self.font_extents()?;
        self.context.move_to(
            anchor.x - extents.x_advance() / 2.,
            anchor.y + (font.ascent() - font.descent()) / 2.
        );
        self.context.show_text(text)
    }
}


//--- Deref

impl ops::Deref for Canvas {
    type Target = cairo::Context;

    fn deref(&self) -> &Self::Target {
        self.context()
    }
}


//------------ FontTable -----------------------------------------------------

/// The font faces already created for a canvas.
#[derive(Clone, Debug, Default)]
pub struct FontTable {
    font_faces: HashMap<String, cairo::FontFace>,
}

impl FontTable {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get(
        &mut self, family: &str
    ) -> Result<&cairo::FontFace, cairo::Error> {
        if !self.font_faces.contains_key(family) {
            let face = cairo::FontFace::toy_create(
                family, cairo::FontSlant::Normal, cairo::FontWeight::Normal
            )?;
            self.font_faces.insert(family.into(), face);
        }
        self.font_faces.get(family).ok_or(cairo::Error::InvalidString)
    }
}
