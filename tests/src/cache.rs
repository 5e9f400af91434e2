#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::Vec3;
    use rand::Rng;
    use rand_pcg::Pcg32;

    use ppg::{GuidingCache, GuidingConfig};

    fn small_config() -> GuidingConfig {
        GuidingConfig {
            spatial_capacity: 256,
            spatial_initial_depth: 1,
            directional_initial_depth: 1,
        }
    }

    fn random_unit(rng: &mut Pcg32) -> Vec3 {
        loop {
            let v = Vec3::new(
                rng.gen::<f32>() * 2.0 - 1.0,
                rng.gen::<f32>() * 2.0 - 1.0,
                rng.gen::<f32>() * 2.0 - 1.0,
            );
            let len = v.length();
            if len > 1e-3 && len <= 1.0 {
                return v / len;
            }
        }
    }

    #[test]
    fn construction_honors_initial_depths() {
        let cache = GuidingCache::new(small_config());
        assert_eq!(cache.spatial_leaf_count(), 2);
        assert_eq!(cache.spatial_node_count(), 3);
        // Each of the two leaves owns a root plus one quartet
        assert_eq!(cache.directional_node_count(), 10);
    }

    #[test]
    fn record_deposits_in_both_trees() {
        let mut cache = GuidingCache::new(small_config());
        let position = Vec3::new(0.2, 0.6, 0.7);
        let direction = Vec3::new(0.0, 0.7, 0.7).normalize();

        let leaf = cache.record(position, direction, 2.5);
        assert_eq!(cache.stree().arena().flux(leaf), 1);
        assert_eq!(cache.sample_count(), 1);
        assert_relative_eq!(cache.distribution_at(position).total_flux(), 2.5);
    }

    #[test]
    fn trained_cache_peaks_towards_the_light() {
        let mut cache = GuidingCache::new(small_config());
        let light = Vec3::new(1.0, 1.0, 1.0).normalize();
        let mut rng = Pcg32::new(0x11CE, 0);
        for _ in 0..2000 {
            let position = Vec3::new(rng.gen(), rng.gen(), rng.gen());
            cache.record(position, light, 1.0);
        }
        cache.refine(500);

        let probe = Vec3::new(0.3, 0.3, 0.3);
        assert!(cache.pdf(probe, light) > cache.pdf(probe, -light));
        assert!(cache.pdf(probe, light) > 1.0);
    }

    #[test]
    fn begin_iteration_clears_flux_keeps_topology() {
        let mut cache = GuidingCache::new(small_config());
        let mut rng = Pcg32::new(0xBEE, 0);
        for _ in 0..1000 {
            let position = Vec3::new(rng.gen(), rng.gen(), rng.gen());
            cache.record(position, random_unit(&mut rng), 1.0);
        }
        cache.refine(100);

        let nodes = cache.spatial_node_count();
        let leaves = cache.spatial_leaf_count();
        let dir_nodes = cache.directional_node_count();
        assert!(leaves > 2);

        cache.begin_iteration();

        assert_eq!(cache.spatial_node_count(), nodes);
        assert_eq!(cache.spatial_leaf_count(), leaves);
        assert_eq!(cache.directional_node_count(), dir_nodes);
        assert_eq!(cache.sample_count(), 0);
        assert_relative_eq!(
            cache.distribution_at(Vec3::splat(0.4)).total_flux(),
            0.0
        );
    }

    #[test]
    fn reset_restores_the_fresh_state() {
        let mut cache = GuidingCache::new(small_config());
        let mut rng = Pcg32::new(0xFADE, 0);
        for _ in 0..1000 {
            let position = Vec3::new(rng.gen(), rng.gen(), rng.gen());
            cache.record(position, random_unit(&mut rng), 1.0);
        }
        cache.refine(50);
        assert!(cache.spatial_leaf_count() > 2);

        cache.reset();

        let fresh = GuidingCache::new(small_config());
        assert_eq!(cache.spatial_leaf_count(), fresh.spatial_leaf_count());
        assert_eq!(cache.spatial_node_count(), fresh.spatial_node_count());
        assert_eq!(cache.directional_node_count(), fresh.directional_node_count());
        assert_eq!(cache.sample_count(), 0);
    }

    #[test]
    fn growth_is_monotonic_across_iterations() {
        let mut cache = GuidingCache::new(small_config());
        let mut rng = Pcg32::new(0x9090, 0);
        let mut previous_nodes = cache.spatial_node_count();
        let mut previous_leaves = cache.spatial_leaf_count();
        for _ in 0..4 {
            cache.begin_iteration();
            for _ in 0..2000 {
                let position = Vec3::new(rng.gen::<f32>().powi(2), rng.gen(), rng.gen());
                cache.record(position, random_unit(&mut rng), 0.5 + rng.gen::<f32>());
            }
            cache.refine(200);

            assert!(cache.spatial_node_count() >= previous_nodes);
            assert!(cache.spatial_leaf_count() >= previous_leaves);
            previous_nodes = cache.spatial_node_count();
            previous_leaves = cache.spatial_leaf_count();
        }
    }

    #[test]
    fn refinement_stops_at_capacity_without_damage() {
        let config = GuidingConfig {
            spatial_capacity: 9,
            spatial_initial_depth: 1,
            directional_initial_depth: 0,
        };
        let mut cache = GuidingCache::new(config);
        let mut rng = Pcg32::new(0x7777, 0);
        for round in 0..5 {
            cache.begin_iteration();
            for _ in 0..1000 {
                let position = Vec3::new(rng.gen(), rng.gen(), rng.gen());
                cache.record(position, random_unit(&mut rng), 1.0);
            }
            cache.refine(10);
            assert!(cache.spatial_node_count() <= 9);

            let mut volume = 0.0;
            cache
                .stree()
                .for_each_leaf(&mut |_, bounds, _| volume += bounds.volume());
            assert_relative_eq!(volume, 1.0, epsilon = 1e-4);

            if round > 0 {
                // Saturated: the node count can no longer move
                assert_eq!(cache.spatial_node_count(), 9);
            }
        }
    }

    // Initial depths deeper than the arenas can hold stop where capacity
    // runs out instead of failing construction
    #[test]
    fn construction_with_excess_initial_depth_stops_early() {
        let config = GuidingConfig {
            spatial_capacity: 5,
            spatial_initial_depth: 8,
            directional_initial_depth: 6,
        };
        let mut cache = GuidingCache::new(config);

        assert_eq!(cache.spatial_node_count(), 5);
        assert_eq!(cache.spatial_leaf_count(), 3);
        // Each leaf segment filled up to the last whole quartet
        assert_eq!(cache.directional_node_count(), 3 * 509);

        let mut volume = 0.0;
        cache
            .stree()
            .for_each_leaf(&mut |_, bounds, _| volume += bounds.volume());
        assert_relative_eq!(volume, 1.0, epsilon = 1e-4);

        // The truncated cache still trains
        cache.record(Vec3::splat(0.3), Vec3::Z, 1.0);
        assert_eq!(cache.sample_count(), 1);
        cache.refine(10);
        assert_eq!(cache.spatial_node_count(), 5);
    }

    #[test]
    fn log_tree_walks_the_whole_structure() {
        let mut cache = GuidingCache::new(small_config());
        let mut rng = Pcg32::new(0x106, 0);
        for _ in 0..500 {
            let position = Vec3::new(rng.gen(), rng.gen(), rng.gen());
            cache.record(position, random_unit(&mut rng), 1.0);
        }
        cache.refine(50);

        // No logger is installed, the walk itself must hold up
        cache.stree().log_tree();
        cache.distribution_at(Vec3::splat(0.4)).log_tree();
    }
}
