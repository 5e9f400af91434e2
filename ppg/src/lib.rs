mod macros;

pub mod guiding;
pub mod math;
pub mod settings;

pub use guiding::{GuidingCache, GuidingConfig};
