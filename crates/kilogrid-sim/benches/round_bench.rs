//! Benchmarks for the round driver
//!
//! Measures:
//! - A single send/resolve round during neighbor discovery
//! - A complete run of the phase schedule on a small grid

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kilogrid_protocol::Phase;
use kilogrid_sim::{Simulation, SimulationConfig};

/// One round while every robot broadcasts presence
fn bench_discovery_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("discovery_round");

    for &side in &[5u32, 10, 20] {
        let config = SimulationConfig::default().with_grid(side, side);
        let start = config.schedule.start_of(Phase::NeighborList);
        let mut sim = Simulation::new(config).expect("valid config");
        sim.run_until(start + 1);

        group.throughput(Throughput::Elements(u64::from(side * side)));
        group.bench_with_input(BenchmarkId::new("side", side), &side, |b, _| {
            b.iter_batched(
                || sim.clone(),
                |mut s| s.step(),
                criterion::BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

/// The whole schedule on a 5x5 grid
fn bench_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_run");
    group.sample_size(10);

    group.bench_function("5x5", |b| {
        b.iter(|| {
            Simulation::new(SimulationConfig::default().with_grid(5, 5))
                .expect("valid config")
                .run()
        })
    });
    group.finish();
}

criterion_group!(benches, bench_discovery_round, bench_full_run);
criterion_main!(benches);
