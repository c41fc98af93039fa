#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use life_inc_rules::{EngineConfig, LifeField};
use rand::RngCore;
use rand::SeedableRng;
use std::time::Instant;

const LIVE_DENSITY: f64 = 0.42;

fn seed_random_field(field: &mut LifeField, seed: u64) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let threshold = (u64::MAX as f64 * LIVE_DENSITY) as u64;
    let size = field.size();

    for y in 0..size {
        for x in 0..size {
            if rng.next_u64() <= threshold {
                field
                    .toggle_cell(x, y)
                    .expect("seeding stays inside the field");
            }
        }
    }
}

fn bench_field(size_log: u32, threads: usize, iterations: u64) -> (f64, usize) {
    let config = EngineConfig::default()
        .field_size_log(size_log)
        .thread_count(threads)
        .seed(0x5EED_1234_ABCD_EF01);
    let mut field = LifeField::with_config(config).expect("valid bench config");
    seed_random_field(&mut field, 0x5EED_1234_ABCD_EF01);

    let start = Instant::now();
    field.step_n(iterations);
    let duration = start.elapsed();

    (duration.as_secs_f64() * 1000.0, field.alive_count())
}

fn main() {
    let threads = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let scales: &[(u32, u64)] = &[(6, 2000), (8, 500), (10, 100), (12, 20)];

    println!(
        "{:<12} {:>8} {:>8} {:>12} {:>10} {:>10}",
        "Grid", "Threads", "Iters", "Total(ms)", "Avg(ms)", "Alive"
    );
    println!("{}", "-".repeat(66));

    for &(size_log, iters) in scales {
        for t in [1, threads] {
            let (total_ms, alive) = bench_field(size_log, t, iters);
            let side = 1usize << size_log;
            println!(
                "{:<12} {:>8} {:>8} {:>12.1} {:>10.4} {:>10}",
                format!("{side}x{side}"),
                t,
                iters,
                total_ms,
                total_ms / iters as f64,
                alive
            );
        }
    }
}
