//! On-screen text queue.

use abyss_core::{EnemyBuff, PlayerBuff};
use glam::Vec2;

const WAVE_FRAMES: f32 = 120.0;
const BUFF_FRAMES: f32 = 180.0;

/// Font size used to draw an announcement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextSize {
    /// Headline text.
    Big,
    /// Footnote text.
    Small,
}

/// A line of text centred on a screen position.
#[derive(Clone, Debug, PartialEq)]
pub struct Announcement {
    text: String,
    size: TextSize,
    center: Vec2,
    remaining: Option<f32>,
}

impl Announcement {
    /// Text to draw.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Font size.
    #[must_use]
    pub const fn size(&self) -> TextSize {
        self.size
    }

    /// Screen position the text is centred on.
    #[must_use]
    pub const fn center(&self) -> Vec2 {
        self.center
    }

    /// Frames left on screen; `None` stays until cleared.
    #[must_use]
    pub const fn remaining(&self) -> Option<f32> {
        self.remaining
    }

    /// Opacity in `0.0..=1.0`, fading over the last 30 frames.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.remaining
            .map_or(1.0, |frames| (frames / 30.0).clamp(0.0, 1.0))
    }
}

/// Queue of announcements positioned relative to the screen.
#[derive(Clone, Debug, PartialEq)]
pub struct Announcements {
    screen: Vec2,
    tile_size: f32,
    queue: Vec<Announcement>,
}

impl Announcements {
    /// Creates an empty queue for a screen of the provided size.
    #[must_use]
    pub fn new(screen: Vec2, tile_size: f32) -> Self {
        Self {
            screen,
            tile_size,
            queue: Vec::new(),
        }
    }

    /// Queues `text` centred on `center`.
    pub fn push<T: Into<String>>(
        &mut self,
        text: T,
        size: TextSize,
        center: Vec2,
        frames: Option<f32>,
    ) {
        self.queue.push(Announcement {
            text: text.into(),
            size,
            center,
            remaining: frames,
        });
    }

    /// Announces the start of `wave`.
    pub fn wave(&mut self, wave: u32) {
        let center = self.screen * 0.5;
        self.push(format!("Wave {wave}"), TextSize::Big, center, Some(WAVE_FRAMES));
    }

    /// Announces a player upgrade just below the screen centre.
    pub fn player_buff(&mut self, buff: PlayerBuff) {
        let center = self.screen * 0.5 + Vec2::new(0.0, self.tile_size * 0.5);
        self.push(buff.announcement(), TextSize::Big, center, Some(BUFF_FRAMES));
    }

    /// Announces an enemy upgrade just above the screen centre.
    pub fn enemy_buff(&mut self, buff: EnemyBuff) {
        let center = self.screen * 0.5 - Vec2::new(0.0, self.tile_size * 0.5);
        self.push(buff.announcement(), TextSize::Big, center, Some(BUFF_FRAMES));
    }

    /// Shows the persistent death screen.
    pub fn death(&mut self) {
        let middle = self.screen * 0.5;
        let tile = self.tile_size;
        self.push(
            "You Died",
            TextSize::Big,
            middle - Vec2::new(0.0, tile),
            None,
        );
        self.push(
            "Press R to restart",
            TextSize::Big,
            middle + Vec2::new(0.0, tile),
            None,
        );
        self.push(
            "Thank you for playing!",
            TextSize::Small,
            Vec2::new(middle.x, self.screen.y - tile),
            None,
        );
    }

    /// Counts down timed entries and drops the expired ones.
    pub fn advance(&mut self, dt: f32) {
        self.queue.retain_mut(|announcement| match &mut announcement.remaining {
            Some(frames) => {
                *frames -= dt;
                *frames > 0.0
            }
            None => true,
        });
    }

    /// Removes every entry, persistent ones included.
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Entries in the order they were queued.
    #[must_use]
    pub fn as_slice(&self) -> &[Announcement] {
        &self.queue
    }

    /// Whether a persistent entry is waiting for input.
    #[must_use]
    pub fn needs_input(&self) -> bool {
        self.queue
            .iter()
            .any(|announcement| announcement.remaining.is_none())
    }
}
