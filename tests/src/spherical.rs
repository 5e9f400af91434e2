#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::Vec3;

    use ppg::math::{canonical_to_direction, direction_to_canonical, Bounds2};

    fn probe_directions() -> Vec<Vec3> {
        vec![
            Vec3::new(1.0, 2.0, 3.0).normalize(),
            Vec3::new(-1.0, 0.5, 0.2).normalize(),
            Vec3::new(0.3, -0.8, -0.4).normalize(),
            Vec3::new(-0.2, -0.9, 0.1).normalize(),
        ]
    }

    #[test]
    fn canonical_lands_in_unit_square() {
        for direction in probe_directions() {
            assert!(Bounds2::unit_square().contains(direction_to_canonical(direction)));
        }
        // Poles clamp cleanly
        assert!(Bounds2::unit_square().contains(direction_to_canonical(Vec3::Z)));
        assert!(Bounds2::unit_square().contains(direction_to_canonical(-Vec3::Z)));
    }

    #[test]
    fn round_trip() {
        for direction in probe_directions() {
            let back = canonical_to_direction(direction_to_canonical(direction));
            assert_relative_eq!(back.x, direction.x, epsilon = 1e-5);
            assert_relative_eq!(back.y, direction.y, epsilon = 1e-5);
            assert_relative_eq!(back.z, direction.z, epsilon = 1e-5);
        }
    }

    #[test]
    fn theta_maps_to_x() {
        // Straight up is theta 0, straight down theta 1
        assert_relative_eq!(direction_to_canonical(Vec3::Z).x, 0.0);
        assert_relative_eq!(direction_to_canonical(-Vec3::Z).x, 1.0);
        assert_relative_eq!(direction_to_canonical(Vec3::X).x, 0.5);
    }
}
