//! The geometry of the scale bar overlay.
//!
//! Everything here is in logical pixels. The overlay consists of an
//! optional frame, the padding, and one block per scale stacked from top
//! to bottom.

use kurbo::{Point, Rect, Size};
use crate::config::{BarStyle, Options};
use crate::scale::{Scale, ScaleResult};
use crate::surface::RenderError;


/// The vertical space after each block.
pub const SPACING: f64 = 5.;

/// The length of the ticks at the bar ends and segment boundaries.
pub const TICK: f64 = 3.;

/// The gap between a line style label and the line.
pub const LABEL_GAP: f64 = 2.;

/// The largest surface we agree to create in physical pixels.
const MAX_SURFACE: f64 = 32767.;


//------------ Layout --------------------------------------------------------

/// The layout of a complete overlay.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    /// The size of the overlay.
    size: Size,

    /// The blocks for the scales in drawing order.
    blocks: Vec<Block>,
}

impl Layout {
    pub fn new(result: &ScaleResult, options: &Options) -> Self {
        let inset = options.padding + options.effective_frame_padding();
        let block_height = block_height(options);

        let width = result.iter().fold(0., |width: f64, scale| {
            width.max(scale.width())
        });
        let total_width = width + 2. * inset;
        let center = total_width / 2.;

        let mut y = inset;
        let mut blocks = Vec::with_capacity(2);
        for scale in result.iter() {
            blocks.push(Block {
                scale: *scale,
                top: y,
                height: block_height,
                left: center - scale.width() / 2.,
                right: center + scale.width() / 2.,
            });
            y += block_height + SPACING;
        }

        Layout { size: Size::new(total_width, y + inset), blocks }
    }

    /// Returns the logical size of the overlay.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns the rectangle covering the whole overlay.
    pub fn rect(&self) -> Rect {
        self.size.to_rect()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Returns the size of the backing surface in physical pixels.
    pub fn physical_size(
        &self, pixel_ratio: f64
    ) -> Result<(i32, i32), RenderError> {
        let width = (self.size.width * pixel_ratio).ceil();
        let height = (self.size.height * pixel_ratio).ceil();
        if !(
            width.is_finite() && height.is_finite()
            && width >= 1. && height >= 1.
            && width <= MAX_SURFACE && height <= MAX_SURFACE
        ) {
            return Err(RenderError::Size(width, height))
        }
        Ok((width as i32, height as i32))
    }
}


//------------ Block ---------------------------------------------------------

/// The space occupied by a single scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Block {
    scale: Scale,
    top: f64,
    height: f64,
    left: f64,
    right: f64,
}

impl Block {
    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    pub fn top(&self) -> f64 {
        self.top
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn left(&self) -> f64 {
        self.left
    }

    pub fn right(&self) -> f64 {
        self.right
    }

    pub fn center_x(&self) -> f64 {
        (self.left + self.right) / 2.
    }

    /// Returns the y coordinate of the line in the line style.
    pub fn line_y(&self, options: &Options) -> f64 {
        self.top + options.font_size / 2.
    }

    /// Returns the anchor for the label in the line style.
    pub fn line_label(&self, options: &Options) -> Point {
        Point::new(
            self.center_x(),
            self.line_y(options) - options.font_size / 2. - LABEL_GAP
        )
    }

    /// Returns the anchor for the label in the checkered style.
    pub fn checkered_label(&self, options: &Options) -> Point {
        Point::new(self.center_x(), self.top + options.font_size / 2.)
    }

    /// Returns the rectangle of the checkered bar.
    pub fn checkered_bar(&self, options: &Options) -> Rect {
        let top = self.top + options.font_size;
        Rect::new(self.left, top, self.right, top + options.checkered_height)
    }

    /// Returns the rectangles of the checkered segments.
    pub fn segments(
        &self, options: &Options
    ) -> impl Iterator<Item = Rect> + '_ {
        let bar = self.checkered_bar(options);
        let count = options.checkered_segments.max(1);
        let width = bar.width() / f64::from(count);
        (0..count).map(move |i| {
            let left = bar.x0 + f64::from(i) * width;
            Rect::new(left, bar.y0, left + width, bar.y1)
        })
    }
}


//------------ Helper Functions ----------------------------------------------

/// Returns the height of a single block.
pub fn block_height(options: &Options) -> f64 {
    match options.style {
        BarStyle::Line => options.font_size,
        BarStyle::Checkered => {
            options.font_size + options.checkered_height + TICK
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Units;

    fn result(units: Units) -> ScaleResult {
        // 10 km over the maximum width gives 10 km for metric and 5 mi
        // for imperial.
        ScaleResult::from_distance(10_000., &Options {
            units, .. Default::default()
        }).unwrap()
    }

    #[test]
    fn line_layout() {
        let options = Options::default();
        let layout = Layout::new(&result(Units::Metric), &options);
        // 150 + 2 * 10 + 2 * 5
        assert_eq!(layout.size().width, 180.);
        // 12 + 5 + 2 * 10 + 2 * 5
        assert_eq!(layout.size().height, 47.);
        assert_eq!(layout.blocks().len(), 1);

        let block = layout.blocks()[0];
        assert_eq!(block.top(), 15.);
        assert_eq!(block.left(), 15.);
        assert_eq!(block.right(), 165.);
        assert_eq!(block.line_y(&options), 21.);
        assert_eq!(block.line_label(&options), Point::new(90., 13.));
    }

    #[test]
    fn checkered_layout_without_frame() {
        let options = Options {
            units: Units::Both,
            style: BarStyle::Checkered,
            show_frame: false,
            .. Default::default()
        };
        let res = result(Units::Both);
        let layout = Layout::new(&res, &options);
        let imperial = res.imperial.unwrap().width();

        assert_eq!(layout.size().width, 150. + 20.);
        // 2 * (12 + 8 + 3 + 5) + 2 * 10
        assert_eq!(layout.size().height, 76.);

        let blocks = layout.blocks();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].top(), 10.);
        assert_eq!(blocks[1].top(), 38.);
        assert!((blocks[1].right() - blocks[1].left() - imperial).abs() < 1e-9);
        assert!((blocks[1].center_x() - 85.).abs() < 1e-9);

        let bar = blocks[0].checkered_bar(&options);
        assert_eq!(bar, Rect::new(10., 22., 160., 30.));
        let segments: Vec<_> = blocks[0].segments(&options).collect();
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[0], Rect::new(10., 22., 47.5, 30.));
        assert_eq!(segments[3].x1, 160.);
    }

    #[test]
    fn physical_size_rounds_up() {
        let options = Options::default();
        let res = ScaleResult::from_distance(
            166_792.39, &options
        ).unwrap();
        let layout = Layout::new(&res, &options);
        let (width, height) = layout.physical_size(2.).unwrap();
        assert_eq!(f64::from(width), (layout.size().width * 2.).ceil());
        assert_eq!(height, 94);
        assert!(layout.physical_size(f64::NAN).is_err());
        assert!(layout.physical_size(1000.).is_err());
    }
}
