//! Calculating the scales to show.
//!
//! The scale bar shows a distance that is both legible – a value of one,
//! two, or five times a power of ten – and short enough to fit into the
//! configured maximum width. This module translates a viewport into such
//! distances and the pixel width they correspond to.

use std::fmt;
use crate::config::Options;
use crate::viewport::Viewport;


/// The number of feet in a meter.
pub const FEET_PER_METER: f64 = 3.28084;

/// The number of feet in a mile.
pub const FEET_PER_MILE: f64 = 5280.;


//------------ ScaleResult ---------------------------------------------------

/// The scales to draw for a viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScaleResult {
    pub metric: Option<Scale>,
    pub imperial: Option<Scale>,
}

impl ScaleResult {
    /// Calculates the scales for the given viewport.
    ///
    /// Returns `None` if the viewport isn’t valid or results in a distance
    /// that can’t be rounded. The caller should skip the update then.
    pub fn calculate(viewport: &Viewport, options: &Options) -> Option<Self> {
        if !viewport.is_valid() {
            return None
        }
        Self::from_distance(
            viewport.ground_distance(options.max_width), options
        )
    }

    /// Creates the scales for `meters` spanning the maximum width.
    pub fn from_distance(meters: f64, options: &Options) -> Option<Self> {
        if !(meters.is_finite() && meters > 0.) {
            return None
        }
        let metric = if options.units.metric() {
            Some(System::Metric.scale(meters, options.max_width)?)
        }
        else {
            None
        };
        let imperial = if options.units.imperial() {
            Some(System::Imperial.scale(meters, options.max_width)?)
        }
        else {
            None
        };
        Some(ScaleResult { metric, imperial })
    }

    /// Returns an iterator over the present scales.
    ///
    /// The metric scale always comes first.
    pub fn iter(&self) -> impl Iterator<Item = &Scale> + '_ {
        self.metric.iter().chain(self.imperial.iter())
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.metric.is_none() && self.imperial.is_none()
    }
}


//------------ Scale ---------------------------------------------------------

/// A single scale: a legible distance and its width on the map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scale {
    /// The rounded distance in `unit`.
    magnitude: f64,

    /// The power of ten of the magnitude.
    exponent: i32,

    /// The unit of the magnitude.
    unit: Unit,

    /// The width in logical pixels.
    width: f64,
}

impl Scale {
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn width(&self) -> f64 {
        self.width
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let precision = if self.exponent < 0 {
            self.exponent.unsigned_abs() as usize
        }
        else {
            0
        };
        write!(f, "{:.*} {}", precision, self.magnitude, self.unit)
    }
}


//------------ System --------------------------------------------------------

/// A system of units.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum System {
    Metric,
    Imperial,
}

impl System {
    /// Converts meters into the system’s base unit.
    pub fn from_meters(self, meters: f64) -> f64 {
        match self {
            System::Metric => meters,
            System::Imperial => meters * FEET_PER_METER,
        }
    }

    /// Returns the scale for `meters` spanning `max_width` pixels.
    pub fn scale(self, meters: f64, max_width: f64) -> Option<Scale> {
        self.scale_base(self.from_meters(meters), max_width)
    }

    /// Returns the scale for `raw` base units spanning `max_width` pixels.
    ///
    /// Distances of at least one large unit are rounded in the large unit.
    pub fn scale_base(self, raw: f64, max_width: f64) -> Option<Scale> {
        let (small, large) = match self {
            System::Metric => (Unit::Meter, Unit::Kilometer),
            System::Imperial => (Unit::Foot, Unit::Mile),
        };
        let unit = if raw >= large.base_factor() { large } else { small };
        let (magnitude, exponent) = round_distance(raw / unit.base_factor())?;

        // Both sides of the ratio need to be in the base unit.
        let width = magnitude * unit.base_factor() / raw * max_width;

        Some(Scale { magnitude, exponent, unit, width })
    }
}


//------------ Unit ----------------------------------------------------------

/// A unit of distance.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Unit {
    Meter,
    Kilometer,
    Foot,
    Mile,
}

impl Unit {
    /// Returns the label shown after the distance.
    pub fn label(self) -> &'static str {
        match self {
            Unit::Meter => "m",
            Unit::Kilometer => "km",
            Unit::Foot => "ft",
            Unit::Mile => "mi",
        }
    }

    /// Returns how many base units of its system the unit is.
    pub fn base_factor(self) -> f64 {
        match self {
            Unit::Meter | Unit::Foot => 1.,
            Unit::Kilometer => 1000.,
            Unit::Mile => FEET_PER_MILE,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}


//------------ Rounding ------------------------------------------------------

/// Rounds a distance down to one, two, or five times a power of ten.
///
/// Returns the rounded value and the power of ten. Returns `None` if the
/// distance isn’t a positive, finite number.
pub fn round_distance(raw: f64) -> Option<(f64, i32)> {
    if !(raw.is_finite() && raw > 0.) {
        return None
    }
    let exponent = raw.log10().floor() as i32;
    let base = 10f64.powi(exponent);
    let normalized = raw / base;

    let value = if normalized >= 5. {
        5. * base
    }
    else if normalized >= 2. {
        2. * base
    }
    else {
        base
    };
    Some((value, exponent))
}


//============ Tests =========================================================
