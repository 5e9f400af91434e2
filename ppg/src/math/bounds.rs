use glam::{Vec2, Vec3};

/// Axis-aligned rectangle over the normalized (theta, phi) square.
///
/// The root domain of a directional distribution is `[0,1]x[0,1]`; every
/// subdivision quarters the rectangle into four equal children.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds2 {
    /// The minimum extent of the bounds.
    pub p_min: Vec2,
    /// The maximum extent of the bounds.
    pub p_max: Vec2,
}

/// Axis-aligned interval inside the unit cube.
///
/// Spatial nodes don't store their bounds; they are reconstructed with
/// [`Bounds3::half`] while descending from the root domain.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds3 {
    /// The minimum extent of the bounds.
    pub p_min: Vec3,
    /// The maximum extent of the bounds.
    pub p_max: Vec3,
}

impl Bounds2 {
    pub fn new(p_min: Vec2, p_max: Vec2) -> Self {
        debug_assert!(p_min.x < p_max.x && p_min.y < p_max.y);
        Self { p_min, p_max }
    }

    /// The full normalized angular domain.
    pub fn unit_square() -> Self {
        Self {
            p_min: Vec2::ZERO,
            p_max: Vec2::ONE,
        }
    }

    #[inline]
    pub fn diagonal(&self) -> Vec2 {
        self.p_max - self.p_min
    }

    /// Calculates the area of this `Bounds2`.
    #[inline]
    pub fn area(&self) -> f32 {
        let d = self.diagonal();
        d.x * d.y
    }

    #[inline]
    pub fn midpoint(&self) -> Vec2 {
        (self.p_min + self.p_max) * 0.5
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.p_min.x && p.x <= self.p_max.x && p.y >= self.p_min.y && p.y <= self.p_max.y
    }

    /// Returns the index and bounds of the quadrant containing `p`.
    ///
    /// Quadrants are ordered low-theta-first, low-phi-first:
    /// `0: (lo x, lo y)  1: (lo x, hi y)  2: (hi x, lo y)  3: (hi x, hi y)`.
    /// A coordinate exactly on the midpoint resolves to the upper half.
    pub fn quadrant(&self, p: Vec2) -> (usize, Self) {
        let mid = self.midpoint();
        let lo_x = p.x < mid.x;
        let lo_y = p.y < mid.y;
        let index = usize::from(!lo_y) + 2 * usize::from(!lo_x);
        let bounds = Self {
            p_min: Vec2::new(
                if lo_x { self.p_min.x } else { mid.x },
                if lo_y { self.p_min.y } else { mid.y },
            ),
            p_max: Vec2::new(
                if lo_x { mid.x } else { self.p_max.x },
                if lo_y { mid.y } else { self.p_max.y },
            ),
        };
        (index, bounds)
    }

    /// Returns the bounds of quadrant `index`, with the same ordering as
    /// [`Bounds2::quadrant`].
    pub fn quadrant_bounds(&self, index: usize) -> Self {
        debug_assert!(index < 4);
        let mid = self.midpoint();
        let lo_x = index < 2;
        let lo_y = index % 2 == 0;
        Self {
            p_min: Vec2::new(
                if lo_x { self.p_min.x } else { mid.x },
                if lo_y { self.p_min.y } else { mid.y },
            ),
            p_max: Vec2::new(
                if lo_x { mid.x } else { self.p_max.x },
                if lo_y { mid.y } else { self.p_max.y },
            ),
        }
    }
}

impl Bounds3 {
    pub fn new(p_min: Vec3, p_max: Vec3) -> Self {
        debug_assert!(p_min.x < p_max.x && p_min.y < p_max.y && p_min.z < p_max.z);
        Self { p_min, p_max }
    }

    /// The full spatial domain `[0,1]^3`.
    pub fn unit_cube() -> Self {
        Self {
            p_min: Vec3::ZERO,
            p_max: Vec3::ONE,
        }
    }

    #[inline]
    pub fn diagonal(&self) -> Vec3 {
        self.p_max - self.p_min
    }

    /// Calculates the volume of this `Bounds3`.
    #[inline]
    pub fn volume(&self) -> f32 {
        let d = self.diagonal();
        d.x * d.y * d.z
    }

    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        (0..3).all(|i| p[i] >= self.p_min[i] && p[i] <= self.p_max[i])
    }

    /// Returns which half of the split along `axis` contains `p`, and that
    /// half's bounds. `0` is the lower half, `1` the upper.
    /// A coordinate exactly on the midpoint resolves to the upper half.
    pub fn half(&self, axis: usize, p: Vec3) -> (usize, Self) {
        debug_assert!(axis < 3);
        let mid = (self.p_min[axis] + self.p_max[axis]) * 0.5;
        let index = usize::from(p[axis] >= mid);
        (index, self.half_bounds(axis, index))
    }

    /// Returns the bounds of half `index` of the split along `axis`.
    pub fn half_bounds(&self, axis: usize, index: usize) -> Self {
        debug_assert!(axis < 3);
        debug_assert!(index < 2);
        let mid = (self.p_min[axis] + self.p_max[axis]) * 0.5;
        let mut ret = *self;
        if index == 0 {
            ret.p_max[axis] = mid;
        } else {
            ret.p_min[axis] = mid;
        }
        ret
    }
}
