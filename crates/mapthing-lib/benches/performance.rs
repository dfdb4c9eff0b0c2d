//! Performance benchmarks for mapthing-lib
//!
//! Run with: cargo bench --package mapthing-lib

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use geo::{Coord, LineString, Polygon};
use mapthing_lib::{
    CollectionKind, FeatureCollection, FeatureRecord, GeographicExtent, TransformOptions,
    Viewport, simplify::simplify_local,
};

/// Generate a wiggly line with the specified number of vertices
fn generate_line(num_points: usize, base_lat: f64, base_lon: f64) -> LineString<f64> {
    (0..num_points)
        .map(|i| {
            let t = i as f64 / num_points as f64;
            Coord {
                x: base_lon + t * 0.1 + (t * 30.0).cos() * 0.001,
                y: base_lat + t * 0.1 + (t * 50.0).sin() * 0.001,
            }
        })
        .collect()
}

/// Generate a noisy circular polygon around the given centre
fn generate_polygon(num_points: usize, lat: f64, lon: f64) -> Polygon<f64> {
    let ring: LineString<f64> = (0..num_points)
        .map(|i| {
            let angle = i as f64 / num_points as f64 * std::f64::consts::TAU;
            let radius = 0.01 * (1.0 + (angle * 17.0).sin() * 0.05);
            Coord {
                x: lon + radius * angle.cos(),
                y: lat + radius * angle.sin(),
            }
        })
        .collect();
    Polygon::new(ring, Vec::new())
}

fn london_extent() -> GeographicExtent {
    GeographicExtent::new(52.0, 0.5, 51.0, -0.5)
}

// ============================================================================
// Core Benchmarks
// ============================================================================

fn bench_simplify(c: &mut Criterion) {
    let mut group = c.benchmark_group("simplify");

    let line = generate_line(50_000, 51.5, -0.1);
    group.throughput(Throughput::Elements(line.0.len() as u64));
    for epsilon in [0.0, 0.00001, 0.0001, 0.001] {
        group.bench_with_input(
            BenchmarkId::new("local_50k", epsilon),
            &epsilon,
            |b, &epsilon| b.iter(|| simplify_local(&line, epsilon)),
        );
    }

    group.finish();
}

fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");
    group.sample_size(20);

    let mut lines = FeatureCollection::new(CollectionKind::Lines, london_extent());
    lines.extend((0..100).map(|i| {
        let offset = (i % 10) as f64 * 0.05;
        FeatureRecord::new(generate_line(1_000, 51.2 + offset, -0.4 + offset))
            .attribute("name", format!("line {i}"))
            .attribute("value", i)
    }));

    group.throughput(Throughput::Elements(100 * 1_000));
    group.bench_function("lines_100x1k_uncached", |b| {
        let mut width = 1024;
        b.iter(|| {
            // A new viewport every iteration defeats the cache
            width = if width == 1024 { 1025 } else { 1024 };
            lines.screen_geometry(Viewport::new(width, 768))
        });
    });

    group.bench_function("lines_100x1k_cached", |b| {
        let viewport = Viewport::new(1024, 768);
        lines.screen_geometry(viewport);
        b.iter(|| lines.screen_geometry(viewport));
    });

    let mut polygons = FeatureCollection::new(CollectionKind::Polygons, london_extent())
        .with_options(TransformOptions {
            local_tolerance: 0.0001,
            global_tolerance: 0.0000001,
            ..Default::default()
        });
    polygons.extend((0..50).map(|i| {
        let offset = (i % 10) as f64 * 0.08;
        FeatureRecord::new(generate_polygon(2_000, 51.1 + offset, -0.4 + offset))
    }));

    group.throughput(Throughput::Elements(50 * 2_000));
    group.bench_function("polygons_50x2k_simplified", |b| {
        let mut width = 1024;
        b.iter(|| {
            width = if width == 1024 { 1025 } else { 1024 };
            polygons.screen_geometry(Viewport::new(width, 768))
        });
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(benches, bench_simplify, bench_transform);

criterion_main!(benches);
