//! Benchmarks for the classification pipeline - sampling, matching and clustering.
//!
//! Run with: cargo bench --package raster-analysis -- classify
//! Or: cargo bench --package raster-analysis --bench classify_benchmarks

use agro_common::Palette;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use raster_analysis::{
    analyze_raster, AnalysisConfig, AnalysisMode, Classifier, ColorClusterer, DecodedRaster,
};

/// Random opaque pixels with roughly 10% fully transparent.
fn generate_noise_raster(width: u32, height: u32) -> DecodedRaster {
    let mut rng = rand::thread_rng();
    let mut data = vec![0u8; (width * height * 4) as usize];
    for chunk in data.chunks_mut(4) {
        chunk[0] = rng.gen();
        chunk[1] = rng.gen();
        chunk[2] = rng.gen();
        chunk[3] = if rng.gen_range(0..10) == 0 { 0 } else { 255 };
    }
    DecodedRaster::new(width, height, data).unwrap()
}

/// Rendered NDVI-style tile: the legend colors with a little jitter.
fn generate_ndvi_raster(width: u32, height: u32) -> DecodedRaster {
    let mut rng = rand::thread_rng();
    let colors: Vec<[u8; 3]> = Palette::ndvi()
        .definitions()
        .unwrap()
        .iter()
        .map(|d| d.rgb.to_array())
        .collect();

    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for _y in 0..height {
        for x in 0..width {
            let base = colors[(x as usize * colors.len()) / width as usize];
            for channel in base {
                let jitter: i16 = rng.gen_range(-20..=20);
                data.push((channel as i16 + jitter).clamp(0, 255) as u8);
            }
            data.push(255);
        }
    }
    DecodedRaster::new(width, height, data).unwrap()
}

fn bench_classifier(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    let definitions = Palette::ndvi().definitions().unwrap();

    for size in [256u32, 512, 1024] {
        let raster = generate_ndvi_raster(size, size);
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::new("ndvi_palette", size), &raster, |b, raster| {
            let classifier = Classifier::new(&definitions);
            b.iter(|| classifier.run(black_box(raster.samples(128))))
        });
    }

    group.finish();
}

fn bench_clusterer(c: &mut Criterion) {
    let mut group = c.benchmark_group("cluster");
    let clusterer = ColorClusterer::default();

    for size in [256u32, 512, 1024] {
        let raster = generate_noise_raster(size, size);
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::new("noise", size), &raster, |b, raster| {
            b.iter(|| clusterer.cluster(black_box(raster.samples(128))))
        });
    }

    group.finish();
}

fn bench_full_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");
    let config = AnalysisConfig::default();
    let definitions = Palette::ndvi().definitions().unwrap();

    let matched = generate_ndvi_raster(512, 512);
    group.bench_function("predefined_512", |b| {
        b.iter(|| {
            analyze_raster(
                black_box(&matched),
                &definitions,
                AnalysisMode::Advanced,
                &config,
            )
        })
    });

    // Noise matches the legend poorly, so this exercises the fallback path
    let noise = generate_noise_raster(512, 512);
    group.bench_function("fallback_512", |b| {
        b.iter(|| {
            analyze_raster(
                black_box(&noise),
                &definitions,
                AnalysisMode::Advanced,
                &config,
            )
        })
    });

    group.finish();
}

criterion_group!(benches, bench_classifier, bench_clusterer, bench_full_analysis);
criterion_main!(benches);
