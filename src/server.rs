//! Serving scale bar images over HTTP.

use std::fmt;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use hyper::{Body, Request, Response, StatusCode};
use hyper::service::{make_service_fn, service_fn};
use log::{debug, error, info, warn};
use crate::config::{BarStyle, Options, OptionsUpdate, Units};
use crate::render::render_image;
use crate::scale::ScaleResult;
use crate::surface::{RenderError, SurfaceFormat};
use crate::viewport::{Bounds, LonLat, Viewport};


//------------ Server --------------------------------------------------------

#[derive(Clone)]
pub struct Server {
    options: Arc<Options>,
}


impl Server {
    pub fn new(options: Options) -> Server {
        Server { options: Arc::new(options) }
    }

    pub async fn run(&self, addr: SocketAddr) {
        let make_svc = make_service_fn(move |_conn| {
            let this = self.clone();
            async move {
                Ok::<_, Infallible>(service_fn(move |r| {
                    let this = this.clone();
                    async move { this.process(r).await }
                }))
            }
        });

        let server = match hyper::Server::try_bind(&addr) {
            Ok(server) => server.serve(make_svc),
            Err(err) => {
                error!("failed to bind to {}: {}", addr, err);
                return
            }
        };
        info!("listening on {}", addr);

        // Run this server for... forever!
        if let Err(err) = server.await {
            error!("server error: {}", err);
        }
    }
}

impl Server {
    async fn process(
        &self, request: Request<Body>
    ) -> Result<Response<Body>, Infallible> {
        Ok(self.respond(request.uri().path(), request.uri().query()))
    }

    fn respond(&self, path: &str, query: Option<&str>) -> Response<Body> {
        let format = match path.strip_prefix("/scalebar.").map(
            SurfaceFormat::from_str
        ) {
            Some(Ok(format)) => format,
            _ => {
                return text_response(StatusCode::NOT_FOUND, "not found")
            }
        };
        let query = match ScaleQuery::from_query(query.unwrap_or("")) {
            Ok(query) => query,
            Err(err) => {
                debug!("bad query for {}: {}", path, err);
                return text_response(StatusCode::BAD_REQUEST, &err.to_string())
            }
        };
        let options = match self.options.merge(query.update) {
            Ok(options) => options,
            Err(err) => {
                return text_response(StatusCode::BAD_REQUEST, &err.to_string())
            }
        };
        let result = match ScaleResult::calculate(&query.viewport, &options) {
            Some(result) => result,
            None => {
                return empty_response(StatusCode::NO_CONTENT)
            }
        };
        match render_image(&result, &options, query.viewport.pixel_ratio, format) {
            Ok(frame) => {
                response_builder(StatusCode::OK)
                    .header("Content-Type", frame.content_type())
                    .body(Body::from(frame.data))
                    .unwrap_or_else(|_| {
                        empty_response(StatusCode::INTERNAL_SERVER_ERROR)
                    })
            }
            Err(RenderError::Size(width, height)) => {
                debug!(
                    "refusing {}x{} px scale bar for {}", width, height, path
                );
                text_response(StatusCode::BAD_REQUEST, "image too large")
            }
            Err(err) => {
                warn!("failed to render scale bar: {}", err);
                empty_response(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}


//------------ ScaleQuery ----------------------------------------------------

/// The parameters of a scale bar request.
///
/// The query string is expected to look like this:
///
/// ```text
/// lat={lat}&lng={lng}&west={west}&east={east}&width={px}[&ratio={ratio}]
///     [&zoom={zoom}][&units={units}][&style={style}]
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleQuery {
    pub viewport: Viewport,
    pub update: OptionsUpdate,
}

impl ScaleQuery {
    pub fn from_query(query: &str) -> Result<Self, QueryError> {
        let mut lat = None;
        let mut lng = None;
        let mut west = None;
        let mut east = None;
        let mut width = None;
        let mut ratio = None;
        let mut zoom = None;
        let mut update = OptionsUpdate::default();

        for item in query.split('&').filter(|item| !item.is_empty()) {
            let (key, value) = item.split_once('=').ok_or(
                QueryError::Malformed
            )?;
            match key {
                "lat" => lat = Some(number("lat", value)?),
                "lng" => lng = Some(number("lng", value)?),
                "lon" => lng = Some(number("lon", value)?),
                "west" => west = Some(number("west", value)?),
                "east" => east = Some(number("east", value)?),
                "width" => width = Some(number("width", value)?),
                "ratio" => ratio = Some(number("ratio", value)?),
                "zoom" => zoom = Some(number("zoom", value)?),
                "units" => {
                    update.units = Some(Units::from_str(value).map_err(|_| {
                        QueryError::Invalid("units")
                    })?)
                }
                "style" => {
                    update.style = Some(BarStyle::from_str(value).map_err(|_| {
                        QueryError::Invalid("style")
                    })?)
                }
                _ => return Err(QueryError::Unknown(key.into()))
            }
        }

        let lat = lat.ok_or(QueryError::Missing("lat"))?;
        let lng = lng.ok_or(QueryError::Missing("lng"))?;
        let west = west.ok_or(QueryError::Missing("west"))?;
        let east = east.ok_or(QueryError::Missing("east"))?;
        let width = width.ok_or(QueryError::Missing("width"))?;

        Ok(ScaleQuery {
            viewport: Viewport {
                center: LonLat::new(lng, lat),
                zoom: zoom.unwrap_or(0.),
                bounds: Bounds::new(west, east, lat, lat),
                canvas_width: width,
                canvas_height: 0.,
                pixel_ratio: ratio.unwrap_or(1.),
            },
            update,
        })
    }
}

fn number(key: &'static str, value: &str) -> Result<f64, QueryError> {
    f64::from_str(value).map_err(|_| QueryError::Invalid(key))
}


//------------ QueryError ----------------------------------------------------

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum QueryError {
    Malformed,
    Missing(&'static str),
    Invalid(&'static str),
    Unknown(String),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            QueryError::Malformed => f.write_str("malformed query"),
            QueryError::Missing(key) => {
                write!(f, "missing parameter '{}'", key)
            }
            QueryError::Invalid(key) => {
                write!(f, "invalid value for parameter '{}'", key)
            }
            QueryError::Unknown(ref key) => {
                write!(f, "unknown parameter '{}'", key)
            }
        }
    }
}


//------------ Helper Functions ----------------------------------------------

fn response_builder(status: StatusCode) -> hyper::http::response::Builder {
    Response::builder().status(status)
}

fn text_response(status: StatusCode, text: &str) -> Response<Body> {
    let mut res = Response::new(Body::from(text.to_string()));
    *res.status_mut() = status;
    if let Ok(value) = "text/plain;charset=utf-8".parse() {
        res.headers_mut().insert("Content-Type", value);
    }
    res
}

fn empty_response(status: StatusCode) -> Response<Body> {
    let mut res = Response::new(Body::empty());
    *res.status_mut() = status;
    res
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    const QUERY: &str = "lat=0&lng=0&west=-5&east=5&width=1000";

    #[test]
    fn parse_query() {
        let query = ScaleQuery::from_query(
            &format!("{}&ratio=2&units=both&style=checkered", QUERY)
        ).unwrap();
        assert_eq!(query.viewport.center, LonLat::new(0., 0.));
        assert_eq!(query.viewport.bounds.lon_span(), 10.);
        assert_eq!(query.viewport.canvas_width, 1000.);
        assert_eq!(query.viewport.pixel_ratio, 2.);
        assert_eq!(query.update.units, Some(Units::Both));
        assert_eq!(query.update.style, Some(BarStyle::Checkered));
        assert!(query.viewport.is_valid());
    }

    #[test]
    fn parse_query_errors() {
        assert_eq!(
            ScaleQuery::from_query("lat=0&lng=0&west=-5&east=5"),
            Err(QueryError::Missing("width"))
        );
        assert_eq!(
            ScaleQuery::from_query(&format!("{}&ratio=x", QUERY)),
            Err(QueryError::Invalid("ratio"))
        );
        assert_eq!(
            ScaleQuery::from_query(&format!("{}&units=furlong", QUERY)),
            Err(QueryError::Invalid("units"))
        );
        assert_eq!(
            ScaleQuery::from_query(&format!("{}&foo=1", QUERY)),
            Err(QueryError::Unknown("foo".into()))
        );
        assert_eq!(
            ScaleQuery::from_query(&format!("{}&ratio", QUERY)),
            Err(QueryError::Malformed)
        );
    }

    #[test]
    fn respond() {
        let server = Server::new(Options::default());
        assert_eq!(
            server.respond("/tiles/1/2/3.png", Some(QUERY)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            server.respond("/scalebar.png", None).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            server.respond(
                "/scalebar.png", Some("lat=0&lng=0&west=5&east=5&width=1000")
            ).status(),
            StatusCode::NO_CONTENT
        );

        assert_eq!(
            server.respond("/scalebar.gif", Some(QUERY)).status(),
            StatusCode::NOT_FOUND
        );

        let res = server.respond("/scalebar.svg", Some(QUERY));
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()["Content-Type"], "image/svg+xml");
    }

    #[test]
    fn respond_oversized() {
        let server = Server::new(Options::default());
        let res = server.respond(
            "/scalebar.png", Some(&format!("{}&ratio=1000", QUERY))
        );
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
