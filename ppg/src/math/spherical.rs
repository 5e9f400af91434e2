use std::f32::consts::PI;

use glam::{Vec2, Vec3};

// Directional distributions are parameterized over the normalized
// (theta, phi) square instead of raw angles so that quadtree midpoints stay
// exact in floating point.

/// Maps a unit `direction` to normalized spherical coordinates in `[0,1]^2`,
/// `x` being theta over `[0,pi]` and `y` phi over `[-pi,pi]`.
pub fn direction_to_canonical(direction: Vec3) -> Vec2 {
    let theta = direction.z.clamp(-1.0, 1.0).acos();
    let phi = direction.y.atan2(direction.x);
    Vec2::new(theta / PI, (phi + PI) / (2.0 * PI)).clamp(Vec2::ZERO, Vec2::ONE)
}

/// Maps normalized spherical coordinates back to a unit direction.
pub fn canonical_to_direction(p: Vec2) -> Vec3 {
    let theta = p.x * PI;
    let phi = p.y * 2.0 * PI - PI;
    let sin_theta = theta.sin();
    Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), theta.cos())
}
