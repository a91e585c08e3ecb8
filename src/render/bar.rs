//! Drawing the bar of a single scale.

use kurbo::{Line, Point};
use crate::config::{BarStyle, Options};
use super::canvas::Canvas;
use super::layout::{Block, TICK};


/// Draws the scale of `block` in the configured style.
pub fn draw(
    canvas: &Canvas, block: &Block, options: &Options
) -> Result<(), cairo::Error> {
    let label = block.scale().to_string();
    match options.style {
        BarStyle::Line => draw_line(canvas, block, &label, options),
        BarStyle::Checkered => draw_checkered(canvas, block, &label, options),
    }
}

/// Draws a line with ticks at both ends and the label above it.
fn draw_line(
    canvas: &Canvas, block: &Block, label: &str, options: &Options
) -> Result<(), cairo::Error> {
    let y = block.line_y(options);
    let (left, right) = (block.left(), block.right());

    options.stroke_color.apply(canvas);
    canvas.set_line_width(options.stroke_width);
    canvas.line(Line::new((left, y), (right, y)));
    canvas.line(Line::new((left, y - TICK), (left, y + TICK)));
    canvas.line(Line::new((right, y - TICK), (right, y + TICK)));
    canvas.stroke()?;

    options.text_color.apply(canvas);
    canvas.show_centered(label, block.line_label(options))
}

/// Draws the label and below it a bar of alternating segments.
fn draw_checkered(
    canvas: &Canvas, block: &Block, label: &str, options: &Options
) -> Result<(), cairo::Error> {
    options.text_color.apply(canvas);
    canvas.show_centered(label, block.checkered_label(options))?;
    canvas.new_path();

    for (i, segment) in block.segments(options).enumerate() {
        if i % 2 == 0 {
            options.checkered_color1.apply(canvas);
        }
        else {
            options.checkered_color2.apply(canvas);
        }
        canvas.rect(segment);
        canvas.fill()?;
    }

    let bar = block.checkered_bar(options);
    options.stroke_color.apply(canvas);
    canvas.set_line_width(options.stroke_width);
    canvas.rect(bar);
    canvas.stroke()?;

    // Interior boundaries. The outer edges are part of the outline.
    let boundaries: Vec<f64> = block.segments(options)
        .skip(1).map(|segment| segment.x0).collect();
    for &x in &boundaries {
        canvas.line(Line::new((x, bar.y0), (x, bar.y1)));
    }
    canvas.stroke()?;

    canvas.set_line_width((options.stroke_width - 1.).max(1.));
    let ticks = [bar.x0].into_iter()
        .chain(boundaries.iter().copied())
        .chain([bar.x1]);
    for x in ticks {
        canvas.line(Line::new(
            Point::new(x, bar.y1), Point::new(x, bar.y1 + TICK)
        ));
    }
    canvas.stroke()
}
