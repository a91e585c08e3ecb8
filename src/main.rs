use std::{fs, io};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use clap::{
    Arg, ArgAction, ArgMatches, Command, crate_version, crate_authors,
    value_parser,
};
use log::{error, info};
use scalebar::{Options, OptionsUpdate, ScaleResult, Server, Viewport};
use scalebar::config::{BarStyle, Units};
use scalebar::render::render_image;
use scalebar::surface::SurfaceFormat;
use scalebar::viewport::{Bounds, LonLat};

const DEFAULT_CONFIG_PATH: &str = "/etc/scalebar.conf";


struct Failed;

struct Config {
    options: Options,
    listen: SocketAddr,
    mode: Mode,
}

enum Mode {
    Serve,
    Render(RenderArgs),
}

struct RenderArgs {
    viewport: Viewport,
    update: OptionsUpdate,
    output: PathBuf,
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    listen: Option<SocketAddr>,
    scalebar: Option<Options>,
}

impl Config {
    pub fn get() -> Result<Self, Failed> {
        let mut matches = Self::get_matches();

        let (config_path, insist) = match matches.remove_one::<PathBuf>(
            "config"
        ) {
            Some(path) => (path, true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        let mut config = Config {
            options: Options::default(),
            listen: SocketAddr::from(([127, 0, 0, 1], 8080)),
            mode: Mode::Serve,
        };

        match fs::read_to_string(&config_path) {
            Ok(content) => {
                let value = match toml::from_str(&content) {
                    Ok(value) => value,
                    Err(err) => {
                        error!(
                            "Failed to parse config file: {}: {}",
                            config_path.display(), err
                        );
                        return Err(Failed)
                    }
                };
                config.apply_toml(value);
            }
            Err(err) => {
                if
                    !matches!(err.kind(), io::ErrorKind::NotFound)
                    || insist
                {
                    error!(
                        "Failed to read config file {}: {}",
                        config_path.display(), err
                    );
                    return Err(Failed)
                }
            }
        }

        if let Err(err) = config.options.validate() {
            error!("{}: {}", config_path.display(), err);
            return Err(Failed)
        }

        config.apply_matches(matches)?;
        Ok(config)
    }

    fn get_matches() -> ArgMatches {
        Command::new("scalebar")
            .version(crate_version!())
            .author(crate_authors!())
            .about("renders map scale bars")
            .subcommand_required(true)
            .arg(Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("the configuration file")
                .action(ArgAction::Set)
                .global(true)
            )
            .subcommand(Command::new("serve")
                .about("serves scale bar images over HTTP")
                .arg(Arg::new("listen")
                    .short('l')
                    .long("listen")
                    .value_name("ADDR")
                    .value_parser(value_parser!(SocketAddr))
                    .help("the addr to listen on")
                    .action(ArgAction::Set)
                )
            )
            .subcommand(Command::new("render")
                .about("renders a single scale bar image")
                .arg(coordinate("lat", "the latitude of the map center"))
                .arg(coordinate("lng", "the longitude of the map center"))
                .arg(coordinate("west", "the western edge of the map"))
                .arg(coordinate("east", "the eastern edge of the map"))
                .arg(Arg::new("width")
                    .long("width")
                    .value_name("PX")
                    .value_parser(value_parser!(f64))
                    .help("the width of the map in physical pixels")
                    .required(true)
                    .action(ArgAction::Set)
                )
                .arg(Arg::new("ratio")
                    .long("ratio")
                    .value_name("RATIO")
                    .value_parser(value_parser!(f64))
                    .help("the device pixel ratio")
                    .default_value("1")
                    .action(ArgAction::Set)
                )
                .arg(Arg::new("units")
                    .long("units")
                    .value_name("UNITS")
                    .value_parser(["metric", "imperial", "both"])
                    .help("the unit systems to show")
                    .action(ArgAction::Set)
                )
                .arg(Arg::new("style")
                    .long("style")
                    .value_name("STYLE")
                    .value_parser(["line", "checkered"])
                    .help("the style of the bars")
                    .action(ArgAction::Set)
                )
                .arg(Arg::new("output")
                    .short('o')
                    .long("output")
                    .value_name("FILE")
                    .value_parser(value_parser!(PathBuf))
                    .help("the image file to write")
                    .required(true)
                    .action(ArgAction::Set)
                )
            )
            .get_matches()
    }

    fn apply_matches(&mut self, mut matches: ArgMatches) -> Result<(), Failed> {
        match matches.remove_subcommand() {
            Some((name, mut matches)) if name == "serve" => {
                if let Some(addr) = matches.remove_one("listen") {
                    self.listen = addr;
                }
                self.mode = Mode::Serve;
            }
            Some((name, matches)) if name == "render" => {
                self.mode = Mode::Render(RenderArgs::from_matches(matches)?);
            }
            _ => {
                error!("No command given.");
                return Err(Failed)
            }
        }
        Ok(())
    }

    fn apply_toml(&mut self, toml: ConfigFile) {
        if let Some(listen) = toml.listen {
            self.listen = listen;
        }
        if let Some(options) = toml.scalebar {
            self.options = options;
        }
    }

    pub async fn run(self) -> Result<(), Failed> {
        match self.mode {
            Mode::Serve => {
                Server::new(self.options).run(self.listen).await;
                Ok(())
            }
            Mode::Render(args) => args.run(&self.options),
        }
    }
}

impl RenderArgs {
    fn from_matches(mut matches: ArgMatches) -> Result<Self, Failed> {
        let mut take = |name: &str| -> f64 {
            matches.remove_one::<f64>(name).unwrap_or(f64::NAN)
        };
        let lat = take("lat");
        let lng = take("lng");
        let west = take("west");
        let east = take("east");
        let width = take("width");
        let ratio = take("ratio");

        let mut update = OptionsUpdate::default();
        if let Some(units) = matches.remove_one::<String>("units") {
            update.units = Units::from_str(&units).ok();
        }
        if let Some(style) = matches.remove_one::<String>("style") {
            update.style = BarStyle::from_str(&style).ok();
        }
        let output = match matches.remove_one::<PathBuf>("output") {
            Some(output) => output,
            None => {
                error!("No output file given.");
                return Err(Failed)
            }
        };

        Ok(RenderArgs {
            viewport: Viewport {
                center: LonLat::new(lng, lat),
                zoom: 0.,
                bounds: Bounds::new(west, east, lat, lat),
                canvas_width: width,
                canvas_height: 0.,
                pixel_ratio: ratio,
            },
            update,
            output,
        })
    }

    fn run(self, options: &Options) -> Result<(), Failed> {
        let options = options.merge(self.update).map_err(|err| {
            error!("{}", err);
            Failed
        })?;
        let result = match ScaleResult::calculate(&self.viewport, &options) {
            Some(result) => result,
            None => {
                error!("The viewport doesn’t produce a scale.");
                return Err(Failed)
            }
        };
        let format = self.output.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| SurfaceFormat::from_str(ext).ok())
            .unwrap_or_default();
        let frame = render_image(
            &result, &options, self.viewport.pixel_ratio, format
        ).map_err(|err| {
            error!("{}", err);
            Failed
        })?;
        if let Err(err) = fs::write(&self.output, &frame.data) {
            error!(
                "Failed to write {}: {}", self.output.display(), err
            );
            return Err(Failed)
        }
        info!(
            "Wrote {} ({}x{} px).",
            self.output.display(), frame.physical_size.0,
            frame.physical_size.1
        );
        Ok(())
    }
}

fn coordinate(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("DEG")
        .value_parser(value_parser!(f64))
        .allow_negative_numbers(true)
        .help(help)
        .required(true)
        .action(ArgAction::Set)
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let config = match Config::get() {
        Ok(config) => config,
        Err(_) => std::process::exit(1),
    };

    if config.run().await.is_err() {
        std::process::exit(1)
    }
}
