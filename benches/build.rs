use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pitchzones::build;
use rand::Rng;

fn random_sites(count: usize) -> Vec<[f64; 2]> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| [rng.gen_range(0.0..105.0), rng.gen_range(0.0..68.0)])
        .collect()
}

fn benchmark_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for count in [22, 1_000, 10_000] {
        let sites = random_sites(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &sites, |b, sites| {
            b.iter(|| black_box(build(sites).unwrap()))
        });
    }
    group.finish();
}

fn benchmark_build_collinear(c: &mut Criterion) {
    let sites: Vec<[f64; 2]> = (0..1_000).map(|i| [i as f64 * 0.1, 34.0]).collect();
    c.bench_function("build_collinear_1000", |b| {
        b.iter(|| black_box(build(&sites).unwrap()))
    });
}

criterion_group!(benches, benchmark_build, benchmark_build_collinear);
criterion_main!(benches);
