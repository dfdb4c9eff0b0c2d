mod settings;

use clap::Parser;
use mapthing_lib::{
    CollectionKind, DataError, FeatureCollection, FeatureRecord, GeographicExtent, Result,
    Viewport, columns::read_delimited, read_gpx_file, track_records,
};
use settings::Settings;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, prelude::*};

fn main() -> ExitCode {
    let settings = Settings::parse();
    init_logging(settings.debug);

    match run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr, honouring `RUST_LOG` when set
fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();
}

fn run(settings: &Settings) -> Result<()> {
    let kind = CollectionKind::from(settings.kind);

    let mut records = Vec::new();
    for path in &settings.files {
        records.extend(load(path, kind, settings.delimiter)?);
    }
    tracing::info!("Loaded {} records from {} files", records.len(), settings.files.len());

    // Placeholder extent until the data bounds are known
    let mut collection = FeatureCollection::new(kind, GeographicExtent::new(1.0, 1.0, 0.0, 0.0))
        .with_options(settings.transform_options());
    collection.extend(records);

    let extent = match settings.extent() {
        Some(extent) => extent,
        None => {
            let bounds = collection
                .bounds()
                .ok_or_else(|| DataError::InvalidGeometry("no coordinates to frame".to_string()))?;
            GeographicExtent::framing(bounds, collection.projection())
        }
    };
    collection.set_extent(extent);

    let viewport = viewport_for(&extent, settings.width, settings.height);

    let geometry = collection.screen_geometry(viewport);
    println!(
        "Extent N {} E {} S {} W {} ({}) onto {}x{} pixels",
        extent.north(),
        extent.east(),
        extent.south(),
        extent.west(),
        extent.projection(),
        viewport.width,
        viewport.height
    );
    println!(
        "{} parts, {} nodes, {} links",
        geometry.len(),
        geometry.node_count(),
        geometry.links().len()
    );

    if settings.print_nodes {
        for (index, part) in geometry.parts().iter().enumerate() {
            for node in part {
                println!(
                    "{index}\t{:.2}\t{:.2}\t{}\t{}",
                    node.x,
                    node.y,
                    node.value(),
                    node.label()
                );
            }
        }
    }
    Ok(())
}

/// The requested viewport, deriving a missing height from the extent's aspect ratio
fn viewport_for(extent: &GeographicExtent, width: u32, height: Option<u32>) -> Viewport {
    let height = height.unwrap_or_else(|| extent.height_from_width(width).max(1));
    Viewport::new(width, height)
}

/// Records of one input file; GPX tracks also print their summary
fn load(path: &Path, kind: CollectionKind, delimiter: u8) -> Result<Vec<FeatureRecord>> {
    let is_gpx = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gpx"));

    if is_gpx {
        let tracks = read_gpx_file(path)?;
        let mut records = Vec::new();
        for track in &tracks {
            println!("{}", track.summary());
            records.extend(track_records(track, kind));
        }
        Ok(records)
    } else {
        let file = std::fs::File::open(path)?;
        read_delimited(file, delimiter, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapthing_lib::{Geometry, ProjectionId};

    #[test]
    fn test_single_point_is_framed() {
        let mut collection = FeatureCollection::new(
            CollectionKind::Points,
            GeographicExtent::new(1.0, 1.0, 0.0, 0.0),
        );
        collection.push(FeatureRecord::new(Geometry::Point((5.0, 5.0).into())));
        let bounds = collection.bounds().unwrap();
        let extent = GeographicExtent::framing(bounds, ProjectionId::WGS84);
        collection.set_extent(extent);

        let viewport = viewport_for(&extent, 1024, None);
        assert_eq!(viewport, Viewport::new(1024, 1024));
        assert_eq!(collection.screen_geometry(viewport).node_count(), 1);
    }

    #[test]
    fn test_derived_height_is_never_zero() {
        // Very wide and flat
        let extent = GeographicExtent::new(0.0001, 100.0, 0.0, 0.0);
        assert_eq!(viewport_for(&extent, 100, None), Viewport::new(100, 1));
        assert_eq!(viewport_for(&extent, 100, Some(40)), Viewport::new(100, 40));
    }
}
