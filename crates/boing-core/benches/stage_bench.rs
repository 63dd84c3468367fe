use boing_core::{Motion, PopulationConfig, Stage, StageConfig};
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;

fn crowded_config(size: usize, populations: usize, max_population: usize) -> StageConfig {
    let motions = [Motion::Up, Motion::Right, Motion::Down, Motion::Left];
    StageConfig {
        size,
        rng_seed: Some(0xBEEF),
        history_capacity: 0,
        populations: (0..populations)
            .map(|idx| PopulationConfig {
                name: format!("pop{idx}"),
                max_population,
                first_birth_delay: 0,
                birth_rate: 1,
                motion: motions[idx % motions.len()],
                color: None,
                scale: None,
            })
            .collect(),
        ..StageConfig::default()
    }
}

fn bench_stage_steps(c: &mut Criterion) {
    let mut group = c.benchmark_group("stage_step");
    // Allow env overrides for quick local runs
    let steps: usize = std::env::var("BOING_BENCH_STEPS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(256);
    group.measurement_time(Duration::from_secs(5));

    for &(size, populations, max_population) in &[(8, 2, 6), (16, 4, 20), (32, 8, 64)] {
        group.bench_function(
            format!("steps{steps}_size{size}_pops{populations}_max{max_population}"),
            |b| {
                b.iter_batched(
                    || {
                        let mut stage =
                            Stage::new(crowded_config(size, populations, max_population))
                                .expect("stage");
                        // Fill the lattice before measuring.
                        for _ in 0..(size * max_population) {
                            stage.step().expect("warm-up step");
                        }
                        stage
                    },
                    |mut stage| {
                        for _ in 0..steps {
                            black_box(stage.step().expect("step"));
                        }
                    },
                    BatchSize::LargeInput,
                );
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_stage_steps);
criterion_main!(benches);
