#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Escape From The Abyss adapters.
//!
//! A [`Scene`] is a screen-space description of one frame. Layers are drawn in
//! a fixed order: backdrop, terrain chunks, enemies, player, bullets,
//! effects, then the overlay (health pips, minimap, vignette, text).

use abyss_core::{ChunkCoord, Key, MouseButtons, Rgba, Surface};
use anyhow::Result as AnyResult;
use glam::Vec2;
use std::{fmt, sync::Arc, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the color with its alpha multiplied by `factor`.
    #[must_use]
    pub fn faded(self, factor: f32) -> Self {
        Self {
            alpha: self.alpha * factor.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

impl From<Rgba> for Color {
    fn from(rgba: Rgba) -> Self {
        Self::new(
            f32::from(rgba.red) / 255.0,
            f32::from(rgba.green) / 255.0,
            f32::from(rgba.blue) / 255.0,
            f32::from(rgba.alpha) / 255.0,
        )
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Keys that went down this frame.
    pub pressed: Vec<Key>,
    /// Keys that were released this frame.
    pub released: Vec<Key>,
    /// Cursor position in logical screen pixels.
    pub cursor: Vec2,
    /// Mouse buttons currently held.
    pub buttons: MouseButtons,
}

/// Composited terrain chunk placed on screen.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneChunk {
    /// Chunk identifier, stable across frames.
    pub coord: ChunkCoord,
    /// Top-left corner in screen pixels.
    pub origin: Vec2,
    /// Pixels of the chunk.
    pub surface: Arc<Surface>,
}

/// Axis-aligned filled rectangle in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneRect {
    /// Top-left corner.
    pub origin: Vec2,
    /// Width and height.
    pub size: Vec2,
    /// Fill color.
    pub color: Color,
}

impl SceneRect {
    /// Creates a rectangle descriptor.
    #[must_use]
    pub const fn new(origin: Vec2, size: Vec2, color: Color) -> Self {
        Self {
            origin,
            size,
            color,
        }
    }
}

/// Enemy body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneEnemy {
    /// Body rectangle.
    pub body: SceneRect,
    /// Whether the enemy is still recovering from a hit.
    pub flashing: bool,
}

/// Player body, squashed around its centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScenePlayer {
    /// Centre in screen pixels.
    pub center: Vec2,
    /// Unscaled width and height.
    pub size: Vec2,
    /// Squash factors applied to `size`.
    pub scale: Vec2,
    /// Fill color.
    pub color: Color,
    /// Whether the player is invulnerable after a hit.
    pub flashing: bool,
}

impl ScenePlayer {
    /// Rectangle covered once the squash is applied.
    #[must_use]
    pub fn scaled_rect(&self) -> SceneRect {
        let size = self.size * self.scale;
        SceneRect::new(self.center - size * 0.5, size, self.color)
    }
}

/// Bullet drawn as a rectangle rotated along its heading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneBullet {
    /// Centre in screen pixels.
    pub center: Vec2,
    /// Length along the heading and thickness across it.
    pub size: Vec2,
    /// Heading in radians.
    pub angle: f32,
    /// Fill color.
    pub color: Color,
}

/// Filled circle, used for particles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneCircle {
    /// Centre in screen pixels.
    pub center: Vec2,
    /// Radius in pixels.
    pub radius: f32,
    /// Fill color.
    pub color: Color,
}

/// Expanding ring left by a death.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneRing {
    /// Centre in screen pixels.
    pub center: Vec2,
    /// Radius in pixels.
    pub radius: f32,
    /// Stroke width in pixels.
    pub thickness: f32,
    /// Stroke color.
    pub color: Color,
}

/// Overview of the whole world in the screen's top-right corner.
///
/// One world tile maps to one minimap pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct Minimap {
    /// Outline of the minimap.
    pub frame: SceneRect,
    /// Enemy markers as screen-space top-left corners.
    pub enemies: Vec<Vec2>,
    /// Player marker as a screen-space top-left corner.
    pub player: Vec2,
    /// Edge length of every marker.
    pub marker_size: f32,
    /// Enemy marker color.
    pub enemy_color: Color,
    /// Player marker color.
    pub player_color: Color,
}

impl Default for Minimap {
    fn default() -> Self {
        Self {
            frame: SceneRect::new(Vec2::ZERO, Vec2::ZERO, Color::from_rgb_u8(0, 0, 0)),
            enemies: Vec::new(),
            player: Vec2::ZERO,
            marker_size: 2.0,
            enemy_color: Color::from_rgb_u8(255, 255, 255),
            player_color: Color::from_rgb_u8(0, 0, 255),
        }
    }
}

/// Row of health squares in the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HealthBar {
    /// Number of whole health points shown.
    pub pips: u32,
    /// Top-left corner of the first pip.
    pub origin: Vec2,
    /// Horizontal distance between pips.
    pub spacing: f32,
    /// Edge length of a pip.
    pub pip_size: f32,
    /// Pip fill.
    pub fill: Color,
    /// Pip outline.
    pub outline: Color,
}

impl Default for HealthBar {
    fn default() -> Self {
        Self {
            pips: 0,
            origin: Vec2::splat(10.0),
            spacing: 16.0,
            pip_size: 16.0 / 1.5,
            fill: Color::from_rgb_u8(255, 0, 0),
            outline: Color::from_rgb_u8(255, 255, 255),
        }
    }
}

/// Screen covered in a flat color except for a clear circle in the middle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vignette {
    /// Centre of the clear circle.
    pub center: Vec2,
    /// Radius of the clear circle.
    pub radius: f32,
    /// Color outside the circle.
    pub color: Color,
}

/// Relative font size of a [`SceneText`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextScale {
    /// Headline text.
    Large,
    /// Footnote text.
    Small,
}

/// Line of text centred on a screen position.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneText {
    /// Text to draw.
    pub text: String,
    /// Centre in screen pixels.
    pub center: Vec2,
    /// Font size.
    pub scale: TextScale,
    /// Text color.
    pub color: Color,
}

/// Describes the full contents of a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Logical screen size in pixels.
    pub screen_size: Vec2,
    /// Color filling the whole screen behind the terrain.
    pub ocean: Color,
    /// Flat rectangle drawn between the ocean and the terrain.
    pub terrain_backdrop: Option<SceneRect>,
    /// Bumped whenever chunk pixels change, invalidating uploaded textures.
    pub chunk_generation: u64,
    /// Terrain chunks around the player.
    pub chunks: Vec<SceneChunk>,
    /// Live enemies.
    pub enemies: Vec<SceneEnemy>,
    /// The player, absent until the first world is loaded.
    pub player: Option<ScenePlayer>,
    /// Bullets in flight.
    pub bullets: Vec<SceneBullet>,
    /// Particles.
    pub particles: Vec<SceneCircle>,
    /// Shockwaves.
    pub shockwaves: Vec<SceneRing>,
    /// Health pips.
    pub health: HealthBar,
    /// World overview.
    pub minimap: Minimap,
    /// Reveal vignette, present while gameplay is paused.
    pub vignette: Option<Vignette>,
    /// On-screen announcements.
    pub texts: Vec<SceneText>,
}

impl Scene {
    /// Creates an empty scene for a screen of the provided logical size.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderingError> {
        if width == 0 || height == 0 {
            return Err(RenderingError::InvalidScreenSize { width, height });
        }
        Ok(Self {
            screen_size: Vec2::new(width as f32, height as f32),
            ocean: Color::from_rgb_u8(0, 150, 150),
            terrain_backdrop: None,
            chunk_generation: 0,
            chunks: Vec::new(),
            enemies: Vec::new(),
            player: None,
            bullets: Vec::new(),
            particles: Vec::new(),
            shockwaves: Vec::new(),
            health: HealthBar::default(),
            minimap: Minimap::default(),
            vignette: None,
            texts: Vec::new(),
        })
    }

    /// Empties every per-frame collection, keeping the backdrop settings.
    pub fn clear_entities(&mut self) {
        self.chunks.clear();
        self.enemies.clear();
        self.player = None;
        self.bullets.clear();
        self.particles.clear();
        self.shockwaves.clear();
        self.minimap.enemies.clear();
        self.vignette = None;
        self.texts.clear();
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Escape From The Abyss scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the elapsed frame time,
    /// per-frame input captured by the adapter, and rewrites the scene before
    /// it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// The logical screen must have a positive area.
    InvalidScreenSize {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidScreenSize { width, height } => {
                write!(f, "screen size must be positive (received {width}x{height})")
            }
        }
    }
}

impl std::error::Error for RenderingError {}
