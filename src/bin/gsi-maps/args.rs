use clap::{
    app_from_crate, crate_authors, crate_description, crate_name, crate_version, value_t,
    AppSettings, Arg, ArgMatches, SubCommand,
};
use std::{path::PathBuf, str::FromStr, time::Duration};

use crate::validators::*;
use gsi_maps::{
    BoundingBox, Colormap, Fixture, IconSize, KmzConfig, MapType, MosaicConfig, Scale,
    UrlFormat, GSI_HOST, GSI_URL_FORMAT,
};

const MOSAIC_CMD: &str = "mosaic";
const KMZ_CMD: &str = "kmz";

const LON1_ARG: &str = "lon1";
const LAT1_ARG: &str = "lat1";
const LON2_ARG: &str = "lon2";
const LAT2_ARG: &str = "lat2";
const BBOX_FIXTURE_ARG: &str = "fixture";
const ZOOM_ARG: &str = "zoom";
const MAP_TYPE_ARG: &str = "map_type";
const URL_ARG: &str = "url";
const HOST_ARG: &str = "host";
const TIMEOUT_ARG: &str = "timeout";
const MAX_TILES_ARG: &str = "max_tiles";
const OUTPUT_ARG: &str = "output";
const DRY_RUN_ARG: &str = "dry_run";

const INPUT_ARG: &str = "input";
const NAME_ARG: &str = "name";
const COLORMAP_ARG: &str = "colormap";
const COLORS_ARG: &str = "colors";
const VMIN_ARG: &str = "vmin";
const VMAX_ARG: &str = "vmax";
const LOG_SCALE_ARG: &str = "log_scale";
const ICON_SIZE_ARG: &str = "icon_size";
const NO_ICON_EDGE_ARG: &str = "no_icon_edge";

pub enum Args {
    Mosaic(MosaicArgs),
    Kmz(KmzArgs),
}

pub struct MosaicArgs {
    pub bounding_box: BoundingBox,
    pub zoom: Option<u8>,
    pub map_type: String,
    pub url: String,
    pub host: String,
    pub timeout: Duration,
    pub max_tiles: usize,
    pub output: PathBuf,
    pub dry_run: bool,
}

pub struct KmzArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub name: String,
    pub colormap: Colormap,
    pub n_colors: usize,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    pub log_scale: bool,
    pub icon_size: f64,
    pub icon_edge: bool,
}

impl std::convert::From<MosaicArgs> for MosaicConfig {
    fn from(args: MosaicArgs) -> Self {
        Self {
            bounding_box: args.bounding_box,
            zoom: args.zoom,
            map_type: MapType::new(args.map_type),
            url: UrlFormat::new(args.url, args.host),
            timeout: args.timeout,
            max_tiles: args.max_tiles,
            output: args.output,
        }
    }
}

impl KmzArgs {
    /// Builds the overlay configuration. `icon_size` comes from the input
    /// file when it carries per-point sizes.
    pub fn into_config(self, icon_size: IconSize) -> KmzConfig {
        KmzConfig {
            name: self.name,
            colormap: self.colormap,
            n_colors: self.n_colors,
            vmin: self.vmin,
            vmax: self.vmax,
            scale: if self.log_scale {
                Scale::Log
            } else {
                Scale::Linear
            },
            icon_size,
            icon_edge: self.icon_edge,
            ..KmzConfig::new(self.output)
        }
    }
}

impl Args {
    pub fn parse() -> Self {
        let matches = get_matches();

        match matches.subcommand() {
            (KMZ_CMD, Some(m)) => Args::Kmz(parse_kmz(m)),
            (_, Some(m)) => Args::Mosaic(parse_mosaic(m)),
            // clap requires a subcommand
            (_, None) => unreachable!(),
        }
    }
}

fn parse_mosaic(m: &ArgMatches<'static>) -> MosaicArgs {
    let bounding_box = match m.value_of(BBOX_FIXTURE_ARG) {
        // if a fixture is specified, construct the bounding box from that
        Some(_) => value::<Fixture>(m, BBOX_FIXTURE_ARG).into(),
        // otherwise, parse the 4 coords separately
        None => BoundingBox::new(
            value(m, LON1_ARG),
            value(m, LAT1_ARG),
            value(m, LON2_ARG),
            value(m, LAT2_ARG),
        ),
    };

    MosaicArgs {
        bounding_box,
        zoom: optional(m, ZOOM_ARG),
        map_type: value(m, MAP_TYPE_ARG),
        url: value(m, URL_ARG),
        host: value(m, HOST_ARG),
        timeout: Duration::from_secs(value(m, TIMEOUT_ARG)),
        max_tiles: value(m, MAX_TILES_ARG),
        output: value(m, OUTPUT_ARG),
        dry_run: m.is_present(DRY_RUN_ARG),
    }
}

fn parse_kmz(m: &ArgMatches<'static>) -> KmzArgs {
    KmzArgs {
        input: value(m, INPUT_ARG),
        output: value(m, OUTPUT_ARG),
        name: value(m, NAME_ARG),
        colormap: value(m, COLORMAP_ARG),
        n_colors: value(m, COLORS_ARG),
        vmin: optional(m, VMIN_ARG),
        vmax: optional(m, VMAX_ARG),
        log_scale: m.is_present(LOG_SCALE_ARG),
        icon_size: value(m, ICON_SIZE_ARG),
        icon_edge: !m.is_present(NO_ICON_EDGE_ARG),
    }
}

fn value<T: FromStr>(m: &ArgMatches<'static>, name: &str) -> T {
    value_t!(m, name, T).unwrap_or_else(|e| e.exit())
}

fn optional<T: FromStr>(m: &ArgMatches<'static>, name: &str) -> Option<T> {
    if m.is_present(name) {
        Some(value(m, name))
    } else {
        None
    }
}

fn get_matches() -> ArgMatches<'static> {
    app_from_crate!()
        .setting(AppSettings::GlobalVersion)
        .setting(AppSettings::VersionlessSubcommands)
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(mosaic_command())
        .subcommand(kmz_command())
        .get_matches()
}

fn mosaic_command() -> clap::App<'static, 'static> {
    SubCommand::with_name(MOSAIC_CMD)
        .about("Download the tiles covering a region and stitch them into one image")
        .arg(
            Arg::with_name(LON1_ARG)
                .help("Longitude of the bottom left corner of the region (in degrees)")
                .required_unless(BBOX_FIXTURE_ARG)
                .validator(is_longitude)
                .takes_value(true)
                .allow_hyphen_values(true)
                .long("lon1"),
        )
        .arg(
            Arg::with_name(LAT1_ARG)
                .help("Latitude of the bottom left corner of the region (in degrees)")
                .required_unless(BBOX_FIXTURE_ARG)
                .validator(is_latitude)
                .takes_value(true)
                .allow_hyphen_values(true)
                .long("lat1"),
        )
        .arg(
            Arg::with_name(LON2_ARG)
                .help("Longitude of the top right corner of the region (in degrees)")
                .required_unless(BBOX_FIXTURE_ARG)
                .validator(is_longitude)
                .takes_value(true)
                .allow_hyphen_values(true)
                .long("lon2"),
        )
        .arg(
            Arg::with_name(LAT2_ARG)
                .help("Latitude of the top right corner of the region (in degrees)")
                .required_unless(BBOX_FIXTURE_ARG)
                .validator(is_latitude)
                .takes_value(true)
                .allow_hyphen_values(true)
                .long("lat2"),
        )
        .arg(
            Arg::with_name(BBOX_FIXTURE_ARG)
                .help("Use a known, named region (Japan, Kumamoto or Tokyo)")
                .validator(is_bb_fixture)
                .conflicts_with_all(&[LON1_ARG, LAT1_ARG, LON2_ARG, LAT2_ARG])
                .takes_value(true)
                .short("f")
                .long("fixture"),
        )
        .arg(
            Arg::with_name(ZOOM_ARG)
                .help("Zoom level of the tiles, 1 (global) to 18 (local). Derived from the region if omitted.")
                .validator(is_zoom)
                .takes_value(true)
                .short("z")
                .long("zoom"),
        )
        .arg(
            Arg::with_name(MAP_TYPE_ARG)
                .help("Tile id of the map type, e.g. `std`, `pale`, `english` or `seamlessphoto`")
                .default_value("std")
                .takes_value(true)
                .short("m")
                .long("map-type"),
        )
        .arg(
            Arg::with_name(URL_ARG)
                .help("The URL with format specifiers `{host}`, `{map_type}`, `{z}`, `{x}`, `{y}` and `{ext}` to fetch the tiles from.")
                .default_value(GSI_URL_FORMAT)
                .takes_value(true)
                .short("u")
                .long("url"),
        )
        .arg(
            Arg::with_name(HOST_ARG)
                .help("The tile server substituted for `{host}`")
                .default_value(GSI_HOST)
                .takes_value(true)
                .long("host"),
        )
        .arg(
            Arg::with_name(TIMEOUT_ARG)
                .help("The timeout (in seconds) for fetching a single tile. Pass 0 for no timeout.")
                .validator(is_numeric_min(0))
                .default_value("10")
                .takes_value(true)
                .short("t")
                .long("timeout"),
        )
        .arg(
            Arg::with_name(MAX_TILES_ARG)
                .help("Refuse to build mosaics consisting of more tiles than this")
                .validator(is_numeric_min(1))
                .default_value("500")
                .takes_value(true)
                .long("max-tiles"),
        )
        .arg(
            Arg::with_name(OUTPUT_ARG)
                .help("The image file to write. The format follows the extension.")
                .default_value("gsimap.png")
                .takes_value(true)
                .short("o")
                .long("output"),
        )
        .arg(
            Arg::with_name(DRY_RUN_ARG)
                .help("Don't actually fetch anything, just determine how many tiles would be fetched.")
                .required(false)
                .takes_value(false)
                .long("dry-run"),
        )
}

fn kmz_command() -> clap::App<'static, 'static> {
    SubCommand::with_name(KMZ_CMD)
        .about("Plot points from a CSV file (lon,lat,value,label[,size]) as a colored KMZ overlay")
        .arg(
            Arg::with_name(INPUT_ARG)
                .help("CSV file with the columns lon, lat, value, label and optionally size")
                .required(true)
                .takes_value(true)
                .short("i")
                .long("input"),
        )
        .arg(
            Arg::with_name(OUTPUT_ARG)
                .help("The KMZ file to write")
                .default_value("points.kmz")
                .takes_value(true)
                .short("o")
                .long("output"),
        )
        .arg(
            Arg::with_name(NAME_ARG)
                .help("Name of the KML document")
                .default_value("untitled")
                .takes_value(true)
                .long("name"),
        )
        .arg(
            Arg::with_name(COLORMAP_ARG)
                .help("Colormap to color the points with (jet, viridis, gray, hot, cool, rainbow, seismic)")
                .validator(is_colormap)
                .default_value("jet")
                .takes_value(true)
                .short("c")
                .long("colormap"),
        )
        .arg(
            Arg::with_name(COLORS_ARG)
                .help("Number of discrete colors")
                .validator(is_numeric_min(1))
                .default_value("10")
                .takes_value(true)
                .short("n")
                .long("colors"),
        )
        .arg(
            Arg::with_name(VMIN_ARG)
                .help("Lower end of the color scale. Defaults to the smallest value.")
                .validator(is_number)
                .takes_value(true)
                .allow_hyphen_values(true)
                .long("vmin"),
        )
        .arg(
            Arg::with_name(VMAX_ARG)
                .help("Upper end of the color scale. Defaults to the largest value.")
                .validator(is_number)
                .takes_value(true)
                .allow_hyphen_values(true)
                .long("vmax"),
        )
        .arg(
            Arg::with_name(LOG_SCALE_ARG)
                .help("Spread the colors logarithmically")
                .takes_value(false)
                .long("log-scale"),
        )
        .arg(
            Arg::with_name(ICON_SIZE_ARG)
                .help("Icon size, used when the input has no size column")
                .validator(is_positive_number)
                .default_value("0.5")
                .takes_value(true)
                .long("icon-size"),
        )
        .arg(
            Arg::with_name(NO_ICON_EDGE_ARG)
                .help("Don't draw a black edge around the icons")
                .takes_value(false)
                .long("no-icon-edge"),
        )
}
