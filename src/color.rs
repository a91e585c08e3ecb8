//! Colors.

use std::fmt;
use std::num::{ParseFloatError, ParseIntError};
use std::str::FromStr;
use serde::{Deserialize, Serialize};


//------------ Color ---------------------------------------------------------

/// A color.
///
/// Components are kept as fractions between 0 and 1. The value is parsed
/// from and serialized into the CSS-like notations `#rgb`, `#rrggbb`,
/// `#rrggbbaa`, `rgb(r, g, b)`, and `rgba(r, g, b, a)`.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    red: f64,
    green: f64,
    blue: f64,
    alpha: f64
}

impl Color {
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Color { red, green, blue, alpha: 1. }
    }

    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Color { red, green, blue, alpha }
    }

    pub fn hex(mut hex: &str) -> Result<Self, InvalidColor> {
        if hex.starts_with('#') {
            hex = &hex[1..];
        }
        if !hex.bytes().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(InvalidColor)
        }
        let (r, g, b, a) = if hex.len() == 3 {
            (
                u8::from_str_radix(&hex[0..1], 16)? * 0x11,
                u8::from_str_radix(&hex[1..2], 16)? * 0x11,
                u8::from_str_radix(&hex[2..3], 16)? * 0x11,
                0xFF,
            )
        }
        else if hex.len() == 6 {
            (
                u8::from_str_radix(&hex[0..2], 16)?,
                u8::from_str_radix(&hex[2..4], 16)?,
                u8::from_str_radix(&hex[4..6], 16)?,
                0xFF,
            )
        }
        else if hex.len() == 8 {
            (
                u8::from_str_radix(&hex[0..2], 16)?,
                u8::from_str_radix(&hex[2..4], 16)?,
                u8::from_str_radix(&hex[4..6], 16)?,
                u8::from_str_radix(&hex[6..8], 16)?,
            )
        }
        else {
            return Err(InvalidColor)
        };
        Ok(Color::rgba(
            r as f64 / 255.,
            g as f64 / 255.,
            b as f64 / 255.,
            a as f64 / 255.,
        ))
    }

    /// Parses the functional notation `rgb(r, g, b)` or `rgba(r, g, b, a)`.
    ///
    /// The color components are in the range 0 to 255, alpha is a fraction.
    pub fn functional(src: &str) -> Result<Self, InvalidColor> {
        let (args, with_alpha) = if let Some(args) = src.strip_prefix("rgba") {
            (args, true)
        }
        else if let Some(args) = src.strip_prefix("rgb") {
            (args, false)
        }
        else {
            return Err(InvalidColor)
        };
        let args = args.trim()
            .strip_prefix('(').ok_or(InvalidColor)?
            .strip_suffix(')').ok_or(InvalidColor)?;

        let mut args = args.split(',').map(str::trim);
        let mut component = || -> Result<f64, InvalidColor> {
            let value = f64::from_str(args.next().ok_or(InvalidColor)?)?;
            if !(0. ..=255.).contains(&value) {
                return Err(InvalidColor)
            }
            Ok(value / 255.)
        };
        let red = component()?;
        let green = component()?;
        let blue = component()?;
        let alpha = if with_alpha {
            let alpha = f64::from_str(args.next().ok_or(InvalidColor)?)?;
            if !(0. ..=1.).contains(&alpha) {
                return Err(InvalidColor)
            }
            alpha
        }
        else {
            1.
        };
        if args.next().is_some() {
            return Err(InvalidColor)
        }
        Ok(Color::rgba(red, green, blue, alpha))
    }

    pub fn alpha(self) -> f64 {
        self.alpha
    }

    pub fn with_alpha(self, alpha: f64) -> Self {
        Color { red: self.red, green: self.green, blue: self.blue, alpha }
    }

    /// Returns the color with its alpha multiplied by `opacity`.
    pub fn fade(self, opacity: f64) -> Self {
        self.with_alpha(self.alpha * opacity)
    }

    /// Makes the color the current source of the context.
    pub fn apply(self, context: &cairo::Context) {
        context.set_source_rgba(self.red, self.green, self.blue, self.alpha)
    }
}

impl Color {
    pub const WHITE: Color = Color::rgb(1., 1., 1.);
    pub const BLACK: Color = Color::rgb(0., 0., 0.);
}


//--- FromStr, TryFrom, From

impl FromStr for Color {
    type Err = InvalidColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('#') {
            Self::hex(s)
        }
        else {
            Self::functional(s)
        }
    }
}

impl TryFrom<String> for Color {
    type Error = InvalidColor;

    fn try_from(src: String) -> Result<Self, Self::Error> {
        Self::from_str(&src)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}


//--- Display

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fn component(x: f64) -> u8 {
            (x * 255.).round().clamp(0., 255.) as u8
        }

        let (r, g, b) = (
            component(self.red), component(self.green), component(self.blue)
        );
        if self.alpha >= 1. {
            write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
        }
        else {
            write!(f, "rgba({}, {}, {}, {})", r, g, b, self.alpha)
        }
    }
}


//------------ InvalidColor --------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InvalidColor;

impl From<ParseIntError> for InvalidColor {
    fn from(_: ParseIntError) -> Self {
        InvalidColor
    }
}

impl From<ParseFloatError> for InvalidColor {
    fn from(_: ParseFloatError) -> Self {
        InvalidColor
    }
}

impl fmt::Display for InvalidColor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid color")
    }
}

impl std::error::Error for InvalidColor { }


//============ Tests =========================================================
