use std::{fs::File, path::Path};

use serde::{Deserialize, Serialize};

use crate::guiding::GuidingConfig;

/// Knobs for one training run of the standalone driver.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TrainerSettings {
    pub iterations: u32,
    pub samples_per_iteration: u32,
    /// Per-iteration spatial split threshold is
    /// `split_threshold_scale * sqrt(samples_per_iteration)`, rounded down.
    pub split_threshold_scale: f32,
    pub cache: GuidingConfig,
}

impl Default for TrainerSettings {
    fn default() -> Self {
        Self {
            iterations: 8,
            samples_per_iteration: 100_000,
            split_threshold_scale: 40.0,
            cache: GuidingConfig::default(),
        }
    }
}

impl TrainerSettings {
    pub fn split_threshold(&self) -> u32 {
        (self.split_threshold_scale * (self.samples_per_iteration as f32).sqrt()) as u32
    }
}

pub fn try_load_settings(path: &Path) -> Result<TrainerSettings, String> {
    if !path.exists() {
        return Err(format!(
            "Settings file does not exist '{}'",
            path.to_string_lossy()
        ));
    }
    match File::open(path) {
        Ok(file) => match serde_yaml::from_reader(file) {
            Ok(settings) => Ok(settings),
            Err(why) => Err(format!("Parsing settings failed: {}", why)),
        },
        Err(why) => Err(format!(
            "Error opening '{}': {:?}",
            path.to_string_lossy(),
            why
        )),
    }
}
