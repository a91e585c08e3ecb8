//! The surfaces we draw onto.

use std::{fmt, ops};
use std::str::FromStr;


//------------ SurfaceFormat -------------------------------------------------

/// The output format of a surface.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SurfaceFormat {
    #[default]
    Png,
    Svg,
}

impl SurfaceFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            SurfaceFormat::Png => "image/png",
            SurfaceFormat::Svg => "image/svg+xml",
        }
    }
}

impl FromStr for SurfaceFormat {
    type Err = InvalidFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "png" => Ok(SurfaceFormat::Png),
            "svg" => Ok(SurfaceFormat::Svg),
            _ => Err(InvalidFormat),
        }
    }
}

impl fmt::Display for SurfaceFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            SurfaceFormat::Png => "png",
            SurfaceFormat::Svg => "svg",
        })
    }
}


//------------ Surface -------------------------------------------------------

/// A surface of a given format.
///
/// The size is in physical pixels. For SVG, one pixel is one point.
pub enum Surface {
    Png(cairo::ImageSurface),
    Svg(cairo::SvgSurface)
}

impl Surface {
    pub fn new(
        format: SurfaceFormat, width: i32, height: i32
    ) -> Result<Self, RenderError> {
        match format {
            SurfaceFormat::Png => {
                Ok(Surface::Png(cairo::ImageSurface::create(
                    cairo::Format::ARgb32, width, height
                )?))
            }
            SurfaceFormat::Svg => {
                Ok(Surface::Svg(cairo::SvgSurface::for_stream(
                    f64::from(width), f64::from(height), Vec::new()
                )?))
            }
        }
    }

    pub fn format(&self) -> SurfaceFormat {
        match *self {
            Surface::Png(_) => SurfaceFormat::Png,
            Surface::Svg(_) => SurfaceFormat::Svg,
        }
    }

    /// Finishes drawing and returns the encoded image.
    pub fn finish(self) -> Result<Vec<u8>, RenderError> {
        match self {
            Surface::Png(surface) => {
                let mut data = Vec::new();
                surface.write_to_png(&mut data).map_err(|err| {
                    RenderError::Encode(err.to_string())
                })?;
                Ok(data)
            }
            Surface::Svg(surface) => {
                let stream = surface.finish_output_stream().map_err(|_| {
                    RenderError::Encode("failed to finish SVG stream".into())
                })?;
                stream.downcast::<Vec<u8>>().map(|stream| *stream).map_err(|_| {
                    RenderError::Encode("unexpected SVG stream".into())
                })
            }
        }
    }
}

impl ops::Deref for Surface {
    type Target = cairo::Surface;

    fn deref(&self) -> &Self::Target {
        match *self {
            Surface::Png(ref surface) => surface,
            Surface::Svg(ref surface) => surface
        }
    }
}


//------------ Platform ------------------------------------------------------

/// The capabilities of the environment the scale bar is shown in.
pub trait Platform {
    /// Returns the number of physical pixels per logical pixel.
    fn pixel_ratio(&self) -> f64;

    /// Creates a new surface of the given physical size.
    fn create_surface(
        &self, width: i32, height: i32
    ) -> Result<Surface, RenderError>;
}


//------------ StaticPlatform ------------------------------------------------

/// A platform with a fixed pixel ratio and output format.
#[derive(Clone, Copy, Debug)]
pub struct StaticPlatform {
    pixel_ratio: f64,
    format: SurfaceFormat,
}

impl StaticPlatform {
    pub fn new(pixel_ratio: f64, format: SurfaceFormat) -> Self {
        StaticPlatform { pixel_ratio, format }
    }
}

impl Default for StaticPlatform {
    fn default() -> Self {
        Self::new(1., SurfaceFormat::Png)
    }
}

impl Platform for StaticPlatform {
    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn create_surface(
        &self, width: i32, height: i32
    ) -> Result<Surface, RenderError> {
        Surface::new(self.format, width, height)
    }
}


//------------ InvalidFormat -------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InvalidFormat;

impl fmt::Display for InvalidFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("unknown image format")
    }
}

impl std::error::Error for InvalidFormat { }


//------------ RenderError ---------------------------------------------------

/// Drawing the scale bar failed.
#[derive(Debug)]
pub enum RenderError {
    /// Cairo refused an operation.
    Cairo(cairo::Error),

    /// The surface is too large.
    Size(f64, f64),

    /// The finished surface couldn’t be encoded.
    Encode(String),
}

impl From<cairo::Error> for RenderError {
    fn from(err: cairo::Error) -> Self {
        RenderError::Cairo(err)
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RenderError::Cairo(ref err) => write!(f, "cairo: {}", err),
            RenderError::Size(width, height) => {
                write!(f, "invalid surface size {}x{}", width, height)
            }
            RenderError::Encode(ref err) => {
                write!(f, "failed to encode image: {}", err)
            }
        }
    }
}

impl std::error::Error for RenderError { }


//============ Tests =========================================================
