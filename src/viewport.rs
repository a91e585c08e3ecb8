//! The part of the map currently visible.

use std::fmt;


/// The mean radius of the Earth in meters.
pub const EARTH_RADIUS: f64 = 6_371_000.;


//------------ LonLat --------------------------------------------------------

/// A geographic position in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        LonLat { lon, lat }
    }

    /// Returns the great-circle distance to `other` in meters.
    ///
    /// This uses the haversine formula on a sphere of [`EARTH_RADIUS`].
    pub fn haversine(self, other: LonLat) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlon = (other.lon - self.lon).to_radians();

        let a = (dlat / 2.).sin().powi(2)
            + lat1.cos() * lat2.cos() * (dlon / 2.).sin().powi(2);
        let c = 2. * a.sqrt().atan2((1. - a).sqrt());
        EARTH_RADIUS * c
    }

    fn is_finite(self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

impl fmt::Display for LonLat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{}", self.lon, self.lat)
    }
}


//------------ Bounds --------------------------------------------------------

/// The geographic bounds of the visible area.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    pub west: f64,
    pub east: f64,
    pub north: f64,
    pub south: f64,
}

impl Bounds {
    pub fn new(west: f64, east: f64, north: f64, south: f64) -> Self {
        Bounds { west, east, north, south }
    }

    /// Returns the longitude span of the bounds in degrees.
    pub fn lon_span(&self) -> f64 {
        self.east - self.west
    }

    fn is_finite(&self) -> bool {
        self.west.is_finite() && self.east.is_finite()
            && self.north.is_finite() && self.south.is_finite()
    }
}


//------------ Viewport ------------------------------------------------------

/// A snapshot of the map’s viewport.
///
/// The snapshot is taken anew for every update and never kept around.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// The center of the map.
    pub center: LonLat,

    /// The zoom level.
    ///
    /// This is for information only. Scales are calculated from the bounds.
    pub zoom: f64,

    /// The visible bounds.
    pub bounds: Bounds,

    /// The width of the map canvas in physical pixels.
    pub canvas_width: f64,

    /// The height of the map canvas in physical pixels.
    pub canvas_height: f64,

    /// The number of physical pixels per logical pixel.
    pub pixel_ratio: f64,
}

impl Viewport {
    /// Returns whether the viewport describes an actual, laid out map.
    ///
    /// A host that hasn’t finished its layout will report a zero-sized
    /// canvas or empty bounds. Nothing useful can be calculated from
    /// those.
    pub fn is_valid(&self) -> bool {
        self.center.is_finite()
            && self.zoom.is_finite()
            && self.bounds.is_finite()
            && self.bounds.lon_span() > 0.
            && self.canvas_width.is_finite() && self.canvas_width > 0.
            && self.canvas_height.is_finite() && self.canvas_height >= 0.
            && self.pixel_ratio.is_finite() && self.pixel_ratio > 0.
    }

    /// Returns the canvas width in logical pixels.
    pub fn logical_width(&self) -> f64 {
        self.canvas_width / self.pixel_ratio
    }

    /// Returns the degrees of longitude covered by one logical pixel.
    pub fn lon_per_pixel(&self) -> f64 {
        self.bounds.lon_span() / self.logical_width()
    }

    /// Returns the ground distance in meters covered by `width` pixels.
    ///
    /// The distance is measured along the center latitude, centered on the
    /// center longitude.
    pub fn ground_distance(&self, width: f64) -> f64 {
        let half = width * self.lon_per_pixel() / 2.;
        LonLat::new(self.center.lon - half, self.center.lat).haversine(
            LonLat::new(self.center.lon + half, self.center.lat)
        )
    }
}


//============ Tests =========================================================
