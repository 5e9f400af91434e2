mod bounds;
mod spherical;

pub use bounds::{Bounds2, Bounds3};
pub use spherical::{canonical_to_direction, direction_to_canonical};
