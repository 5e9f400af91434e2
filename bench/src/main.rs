use std::time::Instant;

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;

use ppg::{GuidingCache, GuidingConfig};

const SAMPLES: usize = 1_000_000;
const ITERATIONS: usize = 8;

fn bench_record(cache: &mut GuidingCache, samples: &[(Vec3, Vec3, f32)]) {
    let start = Instant::now();
    for &(position, direction, radiance) in samples {
        cache.record(position, direction, radiance);
    }
    let elapsed_ns = start.elapsed().as_nanos();
    let elapsed_ms = (elapsed_ns as f64) * 1e-6;
    let ns_per_record = (elapsed_ns as f64) / (samples.len() as f64);
    println!(
        "Record took {:6.1} ms total, {:0.1} ns per sample",
        elapsed_ms, ns_per_record
    );
}

fn bench_refine(cache: &mut GuidingCache, threshold: u32) {
    let start = Instant::now();
    cache.refine(threshold);
    let elapsed_ms = (start.elapsed().as_nanos() as f64) * 1e-6;
    println!(
        "Refine took {:6.1} ms, {} cells, {} spatial nodes",
        elapsed_ms,
        cache.spatial_leaf_count(),
        cache.spatial_node_count()
    );
}

fn bench_serialize(cache: &GuidingCache) {
    let start = Instant::now();
    let layout = cache.gpu_layout();
    let elapsed_ms = (start.elapsed().as_nanos() as f64) * 1e-6;
    let total_bytes = layout.spatial_node_bytes().len()
        + layout.spatial_flux_bytes().len()
        + layout.directional_node_bytes().len()
        + layout.directional_flux_bytes().len();
    println!(
        "Serialize took {:6.1} ms for {:.1} MB",
        elapsed_ms,
        total_bytes as f64 * 1e-6
    );
}

fn main() {
    let mut cache = GuidingCache::new(GuidingConfig::default());
    let mut rng = Pcg32::new(0xB0A710AD, 0);

    for iteration in 0..ITERATIONS {
        let samples: Vec<_> = (0..SAMPLES)
            .map(|_| {
                let position = Vec3::new(rng.gen(), rng.gen(), rng.gen());
                let direction = Vec3::new(
                    rng.gen::<f32>() * 2.0 - 1.0,
                    rng.gen::<f32>() * 2.0 - 1.0,
                    rng.gen::<f32>(),
                )
                .normalize();
                (position, direction, 1.0)
            })
            .collect();

        println!("Iteration {}", iteration);
        cache.begin_iteration();
        bench_record(&mut cache, &samples);
        bench_refine(&mut cache, (40.0 * (SAMPLES as f32).sqrt()) as u32);
    }
    bench_serialize(&cache);
}
