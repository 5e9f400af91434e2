use std::{env, path::Path, time::Instant};

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;

use ppg::{
    expect, ppg_debug, ppg_info,
    settings::{try_load_settings, TrainerSettings},
    GuidingCache,
};

fn setup_logger() -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}:{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.level(),
                record.target(),
                record.line().unwrap_or(0),
                message
            ))
        })
        .level(log::LevelFilter::Info)
        .chain(std::io::stdout())
        .chain(std::fs::File::create("ppg.log")?)
        .apply()?;
    Ok(())
}

/// Stand-in for the renderer's path tracer: two directional emitters whose
/// visibility depends on which half of the cube a vertex sits in.
struct VirtualScene {
    rng: Pcg32,
    emitters: [Vec3; 2],
}

impl VirtualScene {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::new(seed, 0),
            emitters: [
                Vec3::new(1.0, 1.0, 1.0).normalize(),
                Vec3::new(-1.0, 0.5, 0.2).normalize(),
            ],
        }
    }

    /// One traced path vertex: position, incident direction and the
    /// radiance estimate carried along it.
    fn sample(&mut self) -> (Vec3, Vec3, f32) {
        let position = Vec3::new(self.rng.gen(), self.rng.gen(), self.rng.gen());
        let emitter = self.emitters[usize::from(position.x >= 0.5)];
        let jitter = Vec3::new(
            self.rng.gen::<f32>() - 0.5,
            self.rng.gen::<f32>() - 0.5,
            self.rng.gen::<f32>() - 0.5,
        ) * 0.4;
        let direction = (emitter + jitter).normalize();
        let radiance = 0.5 + self.rng.gen::<f32>();
        (position, direction, radiance)
    }
}

fn main() {
    expect!(setup_logger(), "Failed to set up logging");

    let settings = match env::args().nth(1) {
        Some(path) => expect!(
            try_load_settings(Path::new(&path)),
            "Loading trainer settings failed"
        ),
        None => TrainerSettings::default(),
    };

    ppg_info!(
        "Training {} iterations of {} samples, split threshold {}",
        settings.iterations,
        settings.samples_per_iteration,
        settings.split_threshold()
    );

    let mut cache = GuidingCache::new(settings.cache);
    let mut scene = VirtualScene::new(0x73B9_642E_74AC_471C);

    for iteration in 0..settings.iterations {
        let start = Instant::now();
        cache.begin_iteration();
        for _ in 0..settings.samples_per_iteration {
            let (position, direction, radiance) = scene.sample();
            cache.record(position, direction, radiance);
        }
        cache.refine(settings.split_threshold());
        ppg_info!(
            "Iteration {}: {} cells, {} spatial nodes, {} directional nodes, {:.1}ms",
            iteration,
            cache.spatial_leaf_count(),
            cache.spatial_node_count(),
            cache.directional_node_count(),
            start.elapsed().as_secs_f32() * 1e3
        );
    }

    // Peaked density towards the visible emitter is the whole point
    let probe = Vec3::new(0.75, 0.5, 0.5);
    ppg_debug!(
        "Probe at {:?}: density {:.3} towards emitter, {:.3} away",
        probe,
        cache.pdf(probe, scene.emitters[1]),
        cache.pdf(probe, -scene.emitters[1])
    );
    if log::log_enabled!(log::Level::Trace) {
        cache.stree().log_tree();
        cache.distribution_at(probe).log_tree();
    }

    let layout = cache.gpu_layout();
    ppg_info!(
        "Serialized layout: {} B spatial nodes, {} B spatial flux, {} B directional nodes, {} B directional flux",
        layout.spatial_node_bytes().len(),
        layout.spatial_flux_bytes().len(),
        layout.directional_node_bytes().len(),
        layout.directional_flux_bytes().len()
    );
}
