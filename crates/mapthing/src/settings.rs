use clap::{Parser, ValueEnum};
use mapthing_lib::{CollectionKind, FieldSelection, GeographicExtent, TransformOptions};
use std::path::PathBuf;

/// Geometry to draw the inputs as
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Points,
    Lines,
}

impl From<Kind> for CollectionKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Points => CollectionKind::Points,
            Kind::Lines => CollectionKind::Lines,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// MapThing - Project GPS tracks and coordinate files onto a pixel viewport
pub struct Settings {
    /// GPX files, or delimited text files with coordinate columns
    #[clap(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Draw samples as points or consecutive pairs as lines
    #[clap(short, long, value_enum, default_value = "lines")]
    pub kind: Kind,

    /// Cell delimiter of text inputs (a single ASCII character)
    #[clap(long, default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// Viewport width in pixels
    #[clap(long, default_value = "1024")]
    pub width: u32,

    /// Viewport height in pixels (default: keep the extent's aspect ratio)
    #[clap(long)]
    pub height: Option<u32>,

    /// Douglas-Peucker tolerance per chain, in source units (0 = off)
    #[clap(long, default_value = "0.0")]
    pub local_tolerance: f64,

    /// Topology-preserving tolerance per feature, in squared source units (0 = off)
    #[clap(long, default_value = "0.0")]
    pub global_tolerance: f64,

    /// Attribute holding the label
    #[clap(long, default_value = "name")]
    pub label_field: String,

    /// 1-based attribute position holding the label (overrides the name)
    #[clap(long, default_value = "0")]
    pub label_position: usize,

    /// Attribute holding the value
    #[clap(long, default_value = "value")]
    pub value_field: String,

    /// 1-based attribute position holding the value (overrides the name)
    #[clap(long, default_value = "0")]
    pub value_position: usize,

    /// North edge of the extent (default: data bounds)
    #[clap(long, allow_hyphen_values = true)]
    pub north: Option<f64>,

    /// East edge of the extent (default: data bounds)
    #[clap(long, allow_hyphen_values = true)]
    pub east: Option<f64>,

    /// South edge of the extent (default: data bounds)
    #[clap(long, allow_hyphen_values = true)]
    pub south: Option<f64>,

    /// West edge of the extent (default: data bounds)
    #[clap(long, allow_hyphen_values = true)]
    pub west: Option<f64>,

    /// Print every screen-space node
    #[clap(long, default_value = "false")]
    pub print_nodes: bool,

    /// Verbose diagnostics (per-vertex mapping, dropped holes)
    #[clap(short, long, default_value = "false")]
    pub debug: bool,
}

impl Settings {
    /// Transform pipeline configuration from the command line
    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            local_tolerance: self.local_tolerance,
            global_tolerance: self.global_tolerance,
            label: FieldSelection::by_name(&self.label_field).at_position(self.label_position),
            value: FieldSelection::by_name(&self.value_field).at_position(self.value_position),
            debug: self.debug,
        }
    }

    /// The extent given on the command line, if all four edges are set
    pub fn extent(&self) -> Option<GeographicExtent> {
        Some(GeographicExtent::new(
            self.north?,
            self.east?,
            self.south?,
            self.west?,
        ))
    }
}

fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ if value == "\\t" => Ok(b'\t'),
        _ => Err(format!("expected one ASCII character, got {value:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::parse_from(["mapthing", "ride.gpx"]);
        assert_eq!(settings.kind, Kind::Lines);
        assert_eq!(settings.width, 1024);
        assert_eq!(settings.height, None);
        assert_eq!(settings.delimiter, b',');
        assert_eq!(settings.extent(), None);
        assert_eq!(settings.transform_options(), TransformOptions::default());
    }

    #[test]
    fn test_extent_and_positions() {
        let settings = Settings::parse_from([
            "mapthing",
            "towns.csv",
            "--kind",
            "points",
            "--north",
            "52",
            "--east",
            "0.5",
            "--south",
            "51",
            "--west",
            "-0.5",
            "--label-position",
            "2",
        ]);
        assert_eq!(settings.extent(), Some(GeographicExtent::new(52.0, 0.5, 51.0, -0.5)));
        assert_eq!(settings.transform_options().label.position, 2);
        assert_eq!(CollectionKind::from(settings.kind), CollectionKind::Points);
    }

    #[test]
    fn test_files_are_required() {
        assert!(Settings::try_parse_from(["mapthing"]).is_err());
    }

    #[test]
    fn test_delimiter() {
        let settings = Settings::parse_from(["mapthing", "a.tsv", "--delimiter", "\\t"]);
        assert_eq!(settings.delimiter, b'\t');
        let settings = Settings::parse_from(["mapthing", "a.txt", "--delimiter", ";"]);
        assert_eq!(settings.delimiter, b';');
        assert!(Settings::try_parse_from(["mapthing", "a.txt", "--delimiter", "ab"]).is_err());
    }
}
