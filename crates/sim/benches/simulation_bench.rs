use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use evographs_sim::simulation::{Simulation, SimulationBuilder};

fn build(nodes: usize, generations: usize, seed: u64) -> Simulation {
    SimulationBuilder::new()
        .node_count(nodes)
        .edge_probability(0.2)
        .genotypes(4)
        .generations(generations)
        .stop_at_fixation(false)
        .seed(seed)
        .build()
        .unwrap()
}

fn bench_simulation_init(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_init");

    for nodes in [50usize, 200] {
        group.bench_with_input(BenchmarkId::new("build", nodes), &nodes, |b, &nodes| {
            b.iter(|| black_box(build(black_box(nodes), 10, 1)))
        });
    }

    group.finish();
}

fn bench_simulation_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_step");

    for nodes in [25usize, 100, 250] {
        group.throughput(Throughput::Elements(nodes as u64));
        group.bench_with_input(BenchmarkId::new("step", nodes), &nodes, |b, &nodes| {
            b.iter_batched(
                || build(nodes, 1_000, 42),
                |mut sim| {
                    sim.step().unwrap();
                    black_box(sim)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_simulation_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_run");
    let generations = 1_000;

    group.throughput(Throughput::Elements(generations as u64));
    group.bench_with_input(
        BenchmarkId::new("run_full", generations),
        &generations,
        |b, &generations| {
            b.iter_batched(
                || build(50, generations, 7),
                |mut sim| {
                    sim.run().unwrap();
                    black_box(sim.finish())
                },
                BatchSize::SmallInput,
            )
        },
    );

    group.finish();
}

criterion_group!(
    benches,
    bench_simulation_init,
    bench_simulation_step,
    bench_simulation_run
);
criterion_main!(benches);
