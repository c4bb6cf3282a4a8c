//! Scrolling camera with mouse look-ahead and screen shake.

use abyss_core::CameraConfig;
use glam::Vec2;
use rand::Rng;

/// Tracks the scroll offset subtracted from world positions when drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    config: CameraConfig,
    screen: Vec2,
    scroll: Vec2,
    shake: f32,
    jitter: Vec2,
}

impl Camera {
    /// Creates a camera for a screen of the provided size.
    #[must_use]
    pub fn new(config: &CameraConfig, screen: Vec2) -> Self {
        Self {
            config: config.clone(),
            screen,
            scroll: Vec2::ZERO,
            shake: 0.0,
            jitter: Vec2::ZERO,
        }
    }

    /// Centres the camera on `focus` immediately and stops any shake.
    pub fn snap_to(&mut self, focus: Vec2) {
        self.scroll = focus - self.screen * 0.5;
        self.shake = 0.0;
        self.jitter = Vec2::ZERO;
    }

    /// Starts a shake, keeping the stronger of the running and new intensity.
    pub fn start_shake(&mut self, intensity: f32) {
        self.shake = self.shake.max(intensity);
    }

    /// Moves toward `focus`, leaning toward the cursor, and advances the shake.
    pub fn update<R: Rng>(&mut self, focus: Vec2, cursor: Vec2, dt: f32, rng: &mut R) {
        let centre = self.screen * 0.5;
        let target = focus - centre + (cursor - centre) * self.config.look_ahead;
        let step = (self.config.follow * dt).clamp(0.0, 1.0);
        self.scroll += (target - self.scroll) * step;

        if self.shake > 0.0 {
            let reach = self.shake;
            self.jitter = Vec2::new(rng.gen_range(-reach..=reach), rng.gen_range(-reach..=reach));
            self.shake = (self.shake - self.config.shake_decay * dt).max(0.0);
        } else {
            self.jitter = Vec2::ZERO;
        }
    }

    /// Offset subtracted from world coordinates, shake included.
    #[must_use]
    pub fn offset(&self) -> Vec2 {
        self.scroll + self.jitter
    }

    /// Remaining shake intensity in pixels.
    #[must_use]
    pub const fn shake(&self) -> f32 {
        self.shake
    }

    /// Converts a screen-space point to world space.
    #[must_use]
    pub fn to_world(&self, screen_point: Vec2) -> Vec2 {
        screen_point + self.offset()
    }
}
