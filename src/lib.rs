pub use self::config::{Options, OptionsUpdate};
pub use self::control::{Host, MapEvent, Overlay, ScaleControl};
pub use self::render::Renderer;
pub use self::scale::ScaleResult;
pub use self::server::Server;
pub use self::viewport::Viewport;

pub mod color;
pub mod config;
pub mod control;
pub mod render;
pub mod scale;
pub mod server;
pub mod surface;
pub mod viewport;
