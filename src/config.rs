//! Configuration of the scale bar.

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::color::Color;


//------------ Options -------------------------------------------------------

/// The scale bar options.
///
/// A value of this type is never changed in place by the control. Updates
/// go through [`Options::merge`] which produces a new, validated value.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Which unit systems to show.
    pub units: Units,

    /// The maximum width of a bar in logical pixels.
    pub max_width: f64,

    /// The color used for the bar lines and outlines.
    pub stroke_color: Color,

    /// The line width of the bar lines and outlines.
    pub stroke_width: f64,

    /// The color of the labels.
    pub text_color: Color,

    /// The color of the frame background.
    pub background_color: Color,

    /// The font size of the labels in logical pixels.
    pub font_size: f64,

    /// A CSS-style list of font families.
    ///
    /// Only the first family is used.
    pub font_family: String,

    /// The opacity of the frame background.
    pub transparency: f64,

    /// The space between the frame and the bars.
    pub padding: f64,

    /// The corner of the map the host should place the overlay in.
    pub position: Position,

    /// Whether to draw the frame.
    pub show_frame: bool,

    /// The color of the frame border.
    pub frame_color: Color,

    /// The line width of the frame border.
    pub frame_width: f64,

    /// Extra space around the padding if the frame is shown.
    pub frame_padding: f64,

    /// How to draw the bars.
    pub style: BarStyle,

    /// The height of the checkered bar.
    pub checkered_height: f64,

    /// The number of segments of the checkered bar.
    pub checkered_segments: u32,

    /// The color of the even segments of the checkered bar.
    pub checkered_color1: Color,

    /// The color of the odd segments of the checkered bar.
    pub checkered_color2: Color,
}

impl Options {
    /// Checks that the options can be used for drawing.
    pub fn validate(&self) -> Result<(), InvalidOptions> {
        fn non_negative(
            value: f64, field: &'static str
        ) -> Result<(), InvalidOptions> {
            if value.is_finite() && value >= 0. {
                Ok(())
            }
            else {
                Err(InvalidOptions::new(field, "must be a non-negative number"))
            }
        }

        if !(self.max_width.is_finite() && self.max_width > 0.) {
            return Err(InvalidOptions::new(
                "max_width", "must be a positive number"
            ))
        }
        if !(self.font_size.is_finite() && self.font_size > 0.) {
            return Err(InvalidOptions::new(
                "font_size", "must be a positive number"
            ))
        }
        if !(0. ..=1.).contains(&self.transparency) {
            return Err(InvalidOptions::new(
                "transparency", "must be between 0 and 1"
            ))
        }
        if self.checkered_segments == 0 {
            return Err(InvalidOptions::new(
                "checkered_segments", "must be at least 1"
            ))
        }
        non_negative(self.stroke_width, "stroke_width")?;
        non_negative(self.padding, "padding")?;
        non_negative(self.frame_width, "frame_width")?;
        non_negative(self.frame_padding, "frame_padding")?;
        non_negative(self.checkered_height, "checkered_height")?;
        Ok(())
    }

    /// Returns new options with the fields given in `update` replaced.
    ///
    /// Fields not present in `update` keep their current value. The result
    /// is validated. `self` remains untouched either way.
    pub fn merge(&self, update: OptionsUpdate) -> Result<Self, InvalidOptions> {
        let mut res = self.clone();
        update.apply(&mut res);
        res.validate()?;
        Ok(res)
    }

    /// Returns the frame padding if the frame is shown or zero otherwise.
    pub fn effective_frame_padding(&self) -> f64 {
        if self.show_frame { self.frame_padding } else { 0. }
    }

    /// Returns the font family to select for the labels.
    pub fn primary_font_family(&self) -> &str {
        self.font_family.split(',')
            .map(|family| {
                family.trim().trim_matches(|c: char| c == '"' || c == '\'')
            })
            .find(|family| !family.is_empty())
            .unwrap_or("sans-serif")
    }
}

impl Default for Options {
    fn default() -> Self {
        Options {
            units: Units::Metric,
            max_width: 150.,
            stroke_color: Color::BLACK,
            stroke_width: 2.,
            text_color: Color::BLACK,
            background_color: Color::rgba(1., 1., 1., 0.8),
            font_size: 12.,
            font_family: String::from("Arial, sans-serif"),
            transparency: 0.8,
            padding: 10.,
            position: Position::BottomLeft,
            show_frame: true,
            frame_color: Color::BLACK,
            frame_width: 1.,
            frame_padding: 5.,
            style: BarStyle::Line,
            checkered_height: 8.,
            checkered_segments: 4,
            checkered_color1: Color::WHITE,
            checkered_color2: Color::BLACK,
        }
    }
}


//------------ OptionsUpdate -------------------------------------------------

/// A partial set of options.
///
/// Every field that is `Some(_)` replaces the corresponding field when the
/// update is merged into [`Options`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionsUpdate {
    pub units: Option<Units>,
    pub max_width: Option<f64>,
    pub stroke_color: Option<Color>,
    pub stroke_width: Option<f64>,
    pub text_color: Option<Color>,
    pub background_color: Option<Color>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub transparency: Option<f64>,
    pub padding: Option<f64>,
    pub position: Option<Position>,
    pub show_frame: Option<bool>,
    pub frame_color: Option<Color>,
    pub frame_width: Option<f64>,
    pub frame_padding: Option<f64>,
    pub style: Option<BarStyle>,
    pub checkered_height: Option<f64>,
    pub checkered_segments: Option<u32>,
    pub checkered_color1: Option<Color>,
    pub checkered_color2: Option<Color>,
}

impl OptionsUpdate {
    fn apply(self, target: &mut Options) {
        macro_rules! replace {
            ( $( $field:ident ),* ) => {
                $(
                    if let Some(value) = self.$field {
                        target.$field = value;
                    }
                )*
            }
        }

        replace!(
            units, max_width, stroke_color, stroke_width, text_color,
            background_color, font_size, font_family, transparency, padding,
            position, show_frame, frame_color, frame_width, frame_padding,
            style, checkered_height, checkered_segments, checkered_color1,
            checkered_color2
        );
    }
}


//------------ Units ---------------------------------------------------------

/// The unit systems to show.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Both,
}

impl Units {
    pub fn metric(self) -> bool {
        matches!(self, Units::Metric | Units::Both)
    }

    pub fn imperial(self) -> bool {
        matches!(self, Units::Imperial | Units::Both)
    }
}

impl FromStr for Units {
    type Err = InvalidOptions;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            "both" => Ok(Units::Both),
            _ => Err(InvalidOptions::new(
                "units", "expected 'metric', 'imperial', or 'both'"
            ))
        }
    }
}


//------------ BarStyle ------------------------------------------------------

/// How the bar is drawn.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BarStyle {
    /// A horizontal line with ticks at both ends.
    #[default]
    Line,

    /// A bar of alternating colored segments.
    Checkered,
}

impl FromStr for BarStyle {
    type Err = InvalidOptions;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line" => Ok(BarStyle::Line),
            "checkered" => Ok(BarStyle::Checkered),
            _ => Err(InvalidOptions::new(
                "style", "expected 'line' or 'checkered'"
            ))
        }
    }
}


//------------ Position ------------------------------------------------------

/// The corner of the map the overlay is placed in.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    TopLeft,
    TopRight,
    #[default]
    BottomLeft,
    BottomRight,
}


//------------ InvalidOptions ------------------------------------------------

/// An option has a value that cannot be used.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InvalidOptions {
    field: &'static str,
    reason: &'static str,
}

impl InvalidOptions {
    fn new(field: &'static str, reason: &'static str) -> Self {
        InvalidOptions { field, reason }
    }

    /// Returns the name of the offending field.
    pub fn field(&self) -> &'static str {
        self.field
    }
}

impl fmt::Display for InvalidOptions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid option '{}': {}", self.field, self.reason)
    }
}

impl std::error::Error for InvalidOptions { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Options::default().validate().is_ok());
        assert_eq!(Options::default().primary_font_family(), "Arial");
    }

    #[test]
    fn merge_replaces_only_given_fields() {
        let options = Options::default();
        let copy = options.clone();
        let merged = options.merge(OptionsUpdate {
            units: Some(Units::Both),
            max_width: Some(200.),
            ..Default::default()
        }).unwrap();

        assert_eq!(merged.units, Units::Both);
        assert_eq!(merged.max_width, 200.);
        assert_eq!(merged.style, options.style);
        assert_eq!(merged.font_size, options.font_size);
        assert_eq!(options, copy);
    }

    #[test]
    fn merge_rejects_invalid() {
        let options = Options::default();
        let err = options.merge(OptionsUpdate {
            max_width: Some(0.),
            ..Default::default()
        }).unwrap_err();
        assert_eq!(err.field(), "max_width");

        let err = options.merge(OptionsUpdate {
            checkered_segments: Some(0),
            ..Default::default()
        }).unwrap_err();
        assert_eq!(err.field(), "checkered_segments");

        let err = options.merge(OptionsUpdate {
            transparency: Some(1.5),
            ..Default::default()
        }).unwrap_err();
        assert_eq!(err.field(), "transparency");
    }

    #[test]
    fn frame_padding_follows_frame() {
        let mut options = Options::default();
        assert_eq!(options.effective_frame_padding(), 5.);
        options.show_frame = false;
        assert_eq!(options.effective_frame_padding(), 0.);
    }

    #[test]
    fn from_toml() {
        let options: Options = toml::from_str(
            "units = \"both\"\n\
             style = \"checkered\"\n\
             position = \"top-right\"\n\
             background_color = \"rgba(0, 0, 0, 0.5)\"\n\
             font_family = \"'DejaVu Sans', sans-serif\"\n"
        ).unwrap();
        assert_eq!(options.units, Units::Both);
        assert_eq!(options.style, BarStyle::Checkered);
        assert_eq!(options.position, Position::TopRight);
        assert_eq!(options.background_color, Color::rgba(0., 0., 0., 0.5));
        assert_eq!(options.primary_font_family(), "DejaVu Sans");
        assert_eq!(options.max_width, 150.);

        assert!(toml::from_str::<Options>("colour = \"#fff\"").is_err());
    }

    #[test]
    fn units_selection() {
        assert!(Units::Metric.metric() && !Units::Metric.imperial());
        assert!(!Units::Imperial.metric() && Units::Imperial.imperial());
        assert!(Units::Both.metric() && Units::Both.imperial());
        assert_eq!(Units::from_str("both"), Ok(Units::Both));
        assert!(BarStyle::from_str("dotted").is_err());
    }
}
