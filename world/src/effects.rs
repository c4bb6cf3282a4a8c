//! Short-lived visual effects spawned by combat.

use glam::Vec2;

const PARTICLE_SPEED: f32 = 3.0;
const PARTICLE_DRAG: f32 = 0.1;
const PARTICLE_SHRINK: f32 = 0.15;
const SHOCKWAVE_GROWTH: f32 = 3.0;
const SHOCKWAVE_THINNING: f32 = 0.4;
const SHOCKWAVE_WIDTH: f32 = 8.0;

/// Spark flying away from an impact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    position: Vec2,
    angle: f32,
    speed: f32,
    radius: f32,
}

impl Particle {
    /// Creates a spark at `position` travelling along `angle` radians.
    #[must_use]
    pub fn new(position: Vec2, angle: f32, tile_size: f32) -> Self {
        Self {
            position,
            angle,
            speed: PARTICLE_SPEED,
            radius: tile_size / 4.0,
        }
    }

    /// Centre in world pixels.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Current radius in pixels.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Heading in radians.
    #[must_use]
    pub const fn angle(&self) -> f32 {
        self.angle
    }

    /// Advances the spark; returns `false` once it has burnt out.
    pub(crate) fn advance(&mut self, dt: f32) -> bool {
        self.position += Vec2::from_angle(self.angle) * self.speed * dt;
        self.speed = (self.speed - PARTICLE_DRAG * dt).max(0.0);
        self.radius -= PARTICLE_SHRINK * dt;
        self.radius > 0.0
    }
}

/// Expanding ring left behind by a death.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shockwave {
    center: Vec2,
    radius: f32,
    width: f32,
}

impl Shockwave {
    /// Creates a ring at `center` starting at half a tile.
    #[must_use]
    pub fn new(center: Vec2, tile_size: f32) -> Self {
        Self {
            center,
            radius: tile_size / 2.0,
            width: SHOCKWAVE_WIDTH,
        }
    }

    /// Centre in world pixels.
    #[must_use]
    pub const fn center(&self) -> Vec2 {
        self.center
    }

    /// Current radius in pixels.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Stroke width in pixels.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Advances the ring; returns `false` once its stroke vanished.
    pub(crate) fn advance(&mut self, dt: f32) -> bool {
        self.radius += SHOCKWAVE_GROWTH * dt;
        self.width -= SHOCKWAVE_THINNING * dt;
        self.width > 0.0
    }
}
