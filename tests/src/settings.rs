#[cfg(test)]
mod tests {
    use ppg::settings::{try_load_settings, TrainerSettings};
    use std::path::Path;

    #[test]
    fn defaults_are_sane() {
        let settings = TrainerSettings::default();
        assert!(settings.iterations > 0);
        assert!(settings.samples_per_iteration > 0);
        assert!(settings.cache.spatial_capacity > 0);
    }

    #[test]
    fn threshold_scales_with_batch_size() {
        let mut settings = TrainerSettings::default();
        settings.samples_per_iteration = 100_000;
        settings.split_threshold_scale = 40.0;
        // 40 * sqrt(100000), rounded down
        assert_eq!(settings.split_threshold(), 12_649);

        settings.samples_per_iteration = 400_000;
        assert_eq!(settings.split_threshold(), 25_298);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(try_load_settings(Path::new("no/such/settings.yaml")).is_err());
    }

    #[test]
    fn yaml_round_trip() {
        let settings = TrainerSettings::default();
        let yaml = serde_yaml::to_string(&settings).unwrap();
        let back: TrainerSettings = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.iterations, settings.iterations);
        assert_eq!(back.samples_per_iteration, settings.samples_per_iteration);
        assert_eq!(
            back.cache.spatial_capacity,
            settings.cache.spatial_capacity
        );
        assert_eq!(
            back.cache.directional_initial_depth,
            settings.cache.directional_initial_depth
        );
    }
}
