use core_map::{HeightGenerator, Map, MapGenConfig};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    group.sample_size(20);

    for size in [3u32, 4, 5, 6] {
        for generator in [HeightGenerator::Midpoints, HeightGenerator::DiamondSquare] {
            let mut config = MapGenConfig::new(size, 0o1234567012345670);
            config.height_generator = generator;
            group.bench_with_input(
                BenchmarkId::new(format!("{generator:?}"), size),
                &config,
                |b, config| {
                    b.iter(|| Map::generate(config).expect("generate"));
                },
            );
        }
    }

    group.finish();
}

fn bench_stats(c: &mut Criterion) {
    let map = Map::generate(&MapGenConfig::new(6, 42)).expect("generate");
    c.bench_function("stats/size6", |b| b.iter(|| map.stats()));
}

criterion_group!(mapgen_benches, bench_generate, bench_stats);
criterion_main!(mapgen_benches);
