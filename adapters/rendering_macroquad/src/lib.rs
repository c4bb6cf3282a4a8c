#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Escape From The Abyss.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! Scenes are described in logical pixels. The backend scales them uniformly
//! into the window and letterboxes whatever is left over.

mod textures;

use self::textures::ChunkTextures;
use abyss_core::{Direction, Key, MouseButtons};
use abyss_rendering::{
    Color, FrameInput, HealthBar, Minimap, Presentation, RenderingBackend, Scene, SceneBullet,
    SceneChunk, SceneCircle, SceneEnemy, ScenePlayer, SceneRect, SceneRing, SceneText, TextScale,
    Vignette,
};
use anyhow::Result;
use glam::Vec2;
use macroquad::input::{
    is_key_down, is_key_pressed, is_key_released, is_mouse_button_down, mouse_position, KeyCode,
    MouseButton,
};
use macroquad::math::Vec2 as MacroquadVec2;
use std::{
    collections::VecDeque,
    f32::consts::TAU,
    time::{Duration, Instant},
};

const VIGNETTE_SEGMENTS: u32 = 64;
const LARGE_FONT: f32 = 32.0;
const SMALL_FONT: f32 = 16.0;

/// Maps physical keys to game keys.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyBindings {
    bindings: Vec<(KeyCode, Key)>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            bindings: vec![
                (KeyCode::W, Key::Move(Direction::Up)),
                (KeyCode::Up, Key::Move(Direction::Up)),
                (KeyCode::D, Key::Move(Direction::Right)),
                (KeyCode::Right, Key::Move(Direction::Right)),
                (KeyCode::S, Key::Move(Direction::Down)),
                (KeyCode::Down, Key::Move(Direction::Down)),
                (KeyCode::A, Key::Move(Direction::Left)),
                (KeyCode::Left, Key::Move(Direction::Left)),
                (KeyCode::R, Key::Restart),
            ],
        }
    }
}

impl KeyBindings {
    /// Game key bound to `code`, if any.
    #[must_use]
    pub fn translate(&self, code: KeyCode) -> Option<Key> {
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == code)
            .map(|(_, key)| *key)
    }

    /// Every bound physical key.
    pub fn codes(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.bindings.iter().map(|(code, _)| *code)
    }

    /// Builds the frame input from edge-triggered key observations.
    ///
    /// A game key is reported once per frame even when several physical keys
    /// bound to it changed together.
    #[must_use]
    pub fn frame_input<P, R>(
        &self,
        pressed: P,
        released: R,
        cursor: Vec2,
        buttons: MouseButtons,
    ) -> FrameInput
    where
        P: IntoIterator<Item = KeyCode>,
        R: IntoIterator<Item = KeyCode>,
    {
        let mut input = FrameInput {
            cursor,
            buttons,
            ..FrameInput::default()
        };
        for key in pressed.into_iter().filter_map(|code| self.translate(code)) {
            if !input.pressed.contains(&key) {
                input.pressed.push(key);
            }
        }
        for key in released.into_iter().filter_map(|code| self.translate(code)) {
            if !input.released.contains(&key) {
                input.released.push(key);
            }
        }
        input
    }
}

/// Uniform scale and letterbox offset between logical and window pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenMetrics {
    /// Window pixels per logical pixel.
    pub scale: f32,
    /// Window position of the logical origin.
    pub offset: Vec2,
}

impl ScreenMetrics {
    /// Fits a `logical` screen into a `window`, preserving the aspect ratio.
    #[must_use]
    pub fn fit(logical: Vec2, window: Vec2) -> Self {
        if logical.x <= f32::EPSILON || logical.y <= f32::EPSILON {
            return Self {
                scale: 1.0,
                offset: Vec2::ZERO,
            };
        }
        let scale = (window.x / logical.x).min(window.y / logical.y).max(0.0);
        let offset = (window - logical * scale) * 0.5;
        Self { scale, offset }
    }

    /// Converts a logical point to window pixels.
    #[must_use]
    pub fn to_window(&self, point: Vec2) -> Vec2 {
        self.offset + point * self.scale
    }

    /// Converts a window point to logical pixels.
    #[must_use]
    pub fn to_logical(&self, point: Vec2) -> Vec2 {
        if self.scale <= f32::EPSILON {
            return point;
        }
        (point - self.offset) / self.scale
    }

    fn rect(&self, origin: Vec2, size: Vec2) -> (Vec2, Vec2) {
        (self.to_window(origin), size * self.scale)
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    window_scale: u32,
    bindings: KeyBindings,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            window_scale: 2,
            bindings: KeyBindings::default(),
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend prints frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Sets the initial window size as a multiple of the logical screen.
    #[must_use]
    pub fn with_window_scale(mut self, scale: u32) -> Self {
        self.window_scale = scale.max(1);
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            window_scale,
            bindings,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let window_size = scene.screen_size * window_scale as f32;
        let mut config = macroquad::window::Conf {
            window_title,
            window_width: window_size.x as i32,
            window_height: window_size.y as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let mut textures = ChunkTextures::new();
            let mut fps_counter = FpsCounter::default();
            let background = to_macroquad_color(clear_color);

            loop {
                if is_key_pressed(KeyCode::Escape) {
                    break;
                }

                macroquad::window::clear_background(background);
                let window = Vec2::new(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                let metrics = ScreenMetrics::fit(scene.screen_size, window);

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = gather_frame_input(&bindings, &metrics);
                update_scene(frame_dt, frame_input, &mut scene);

                let render_start = Instant::now();
                draw_backdrop(&scene, &metrics);
                draw_chunks(&scene.chunks, scene.chunk_generation, &metrics, &mut textures);
                draw_enemies(&scene.enemies, &metrics);
                if let Some(player) = &scene.player {
                    draw_player(player, &metrics);
                }
                draw_bullets(&scene.bullets, &metrics);
                draw_particles(&scene.particles, &metrics);
                draw_shockwaves(&scene.shockwaves, &metrics);
                draw_health(&scene.health, &metrics);
                draw_minimap(&scene.minimap, &metrics);
                if let Some(vignette) = &scene.vignette {
                    draw_vignette(vignette, scene.screen_size, &metrics);
                }
                draw_texts(&scene.texts, &metrics);
                let render_duration = render_start.elapsed();

                let fps_metrics = fps_counter.record_frame(frame_dt, render_duration);
                if show_fps {
                    if let Some(FpsMetrics {
                        per_second,
                        trailing_ten_seconds,
                        avg_render,
                    }) = fps_metrics
                    {
                        println!(
                            "FPS: {:.2} (10s avg: {:.2}) | render: {:>6.2}ms",
                            per_second,
                            trailing_ten_seconds,
                            avg_render.as_secs_f64() * 1_000.0,
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn gather_frame_input(bindings: &KeyBindings, metrics: &ScreenMetrics) -> FrameInput {
    let (cursor_x, cursor_y) = mouse_position();
    let buttons = MouseButtons {
        left: is_mouse_button_down(MouseButton::Left),
        middle: is_mouse_button_down(MouseButton::Middle),
        right: is_mouse_button_down(MouseButton::Right),
    };
    let pressed: Vec<KeyCode> = bindings.codes().filter(|code| is_key_pressed(*code)).collect();
    let released: Vec<KeyCode> = bindings
        .codes()
        .filter(|code| is_key_released(*code) && !is_key_down(*code))
        .collect();
    bindings.frame_input(
        pressed,
        released,
        metrics.to_logical(Vec2::new(cursor_x, cursor_y)),
        buttons,
    )
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, frame: Duration, render: Duration) -> Option<FpsMetrics> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        self.render_accum += render;

        self.frame_times.push_back(frame);
        self.window_duration += frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            if let Some(removed) = self.frame_times.pop_front() {
                self.window_duration = self.window_duration.saturating_sub(removed);
            } else {
                break;
            }
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let per_second = self.frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        let avg_render = self.render_accum / self.frames.max(1);

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.render_accum = Duration::ZERO;

        Some(FpsMetrics {
            per_second,
            trailing_ten_seconds,
            avg_render,
        })
    }
}

fn draw_backdrop(scene: &Scene, metrics: &ScreenMetrics) {
    fill_rect(
        &SceneRect::new(Vec2::ZERO, scene.screen_size, scene.ocean),
        metrics,
    );
    if let Some(backdrop) = &scene.terrain_backdrop {
        fill_rect(backdrop, metrics);
    }
}

fn draw_chunks(
    chunks: &[SceneChunk],
    generation: u64,
    metrics: &ScreenMetrics,
    textures: &mut ChunkTextures,
) {
    for chunk in chunks {
        let Some(texture) = textures.texture(generation, chunk.coord, &chunk.surface) else {
            continue;
        };
        let size = Vec2::new(chunk.surface.width() as f32, chunk.surface.height() as f32);
        let (position, dest) = metrics.rect(chunk.origin, size);
        macroquad::texture::draw_texture_ex(
            texture,
            position.x,
            position.y,
            macroquad::color::WHITE,
            macroquad::texture::DrawTextureParams {
                dest_size: Some(MacroquadVec2::new(dest.x, dest.y)),
                ..macroquad::texture::DrawTextureParams::default()
            },
        );
    }
}

fn draw_enemies(enemies: &[SceneEnemy], metrics: &ScreenMetrics) {
    for enemy in enemies {
        let mut body = enemy.body;
        if enemy.flashing {
            body.color = body.color.lighten(0.6);
        }
        fill_rect(&body, metrics);
    }
}

fn draw_player(player: &ScenePlayer, metrics: &ScreenMetrics) {
    let mut body = player.scaled_rect();
    if player.flashing {
        body.color = body.color.faded(0.5);
    }
    fill_rect(&body, metrics);
}

fn draw_bullets(bullets: &[SceneBullet], metrics: &ScreenMetrics) {
    for bullet in bullets {
        let corners = bullet_corners(bullet).map(|corner| to_macroquad_vec(metrics.to_window(corner)));
        let color = to_macroquad_color(bullet.color);
        macroquad::shapes::draw_triangle(corners[0], corners[1], corners[2], color);
        macroquad::shapes::draw_triangle(corners[0], corners[2], corners[3], color);
    }
}

/// Corners of a bullet's rotated rectangle, in winding order.
fn bullet_corners(bullet: &SceneBullet) -> [Vec2; 4] {
    let along = Vec2::from_angle(bullet.angle) * bullet.size.x * 0.5;
    let across = Vec2::from_angle(bullet.angle).perp() * bullet.size.y * 0.5;
    [
        bullet.center - along - across,
        bullet.center + along - across,
        bullet.center + along + across,
        bullet.center - along + across,
    ]
}

fn draw_particles(particles: &[SceneCircle], metrics: &ScreenMetrics) {
    for particle in particles {
        let center = metrics.to_window(particle.center);
        macroquad::shapes::draw_circle(
            center.x,
            center.y,
            particle.radius * metrics.scale,
            to_macroquad_color(particle.color),
        );
    }
}

fn draw_shockwaves(shockwaves: &[SceneRing], metrics: &ScreenMetrics) {
    for ring in shockwaves {
        if ring.thickness <= 0.0 {
            continue;
        }
        let center = metrics.to_window(ring.center);
        macroquad::shapes::draw_circle_lines(
            center.x,
            center.y,
            ring.radius * metrics.scale,
            ring.thickness * metrics.scale,
            to_macroquad_color(ring.color),
        );
    }
}

fn draw_health(health: &HealthBar, metrics: &ScreenMetrics) {
    for pip in 0..health.pips {
        let origin = health.origin + Vec2::new(pip as f32 * health.spacing, 0.0);
        let size = Vec2::splat(health.pip_size);
        fill_rect(&SceneRect::new(origin, size, health.fill), metrics);
        outline_rect(&SceneRect::new(origin, size, health.outline), 1.0, metrics);
    }
}

fn draw_minimap(minimap: &Minimap, metrics: &ScreenMetrics) {
    outline_rect(&minimap.frame, 1.0, metrics);
    let marker = Vec2::splat(minimap.marker_size);
    for enemy in &minimap.enemies {
        fill_rect(&SceneRect::new(*enemy, marker, minimap.enemy_color), metrics);
    }
    fill_rect(
        &SceneRect::new(minimap.player, marker, minimap.player_color),
        metrics,
    );
}

fn draw_vignette(vignette: &Vignette, screen: Vec2, metrics: &ScreenMetrics) {
    let color = to_macroquad_color(vignette.color);
    let reach = screen.length();
    for [a, b, c] in vignette_triangles(vignette.center, vignette.radius, reach, VIGNETTE_SEGMENTS) {
        macroquad::shapes::draw_triangle(
            to_macroquad_vec(metrics.to_window(a)),
            to_macroquad_vec(metrics.to_window(b)),
            to_macroquad_vec(metrics.to_window(c)),
            color,
        );
    }
}

/// Triangles covering the annulus between `radius` and `reach` around `center`.
fn vignette_triangles(center: Vec2, radius: f32, reach: f32, segments: u32) -> Vec<[Vec2; 3]> {
    let radius = radius.clamp(0.0, reach);
    let segments = segments.max(3);
    let mut triangles = Vec::with_capacity(segments as usize * 2);
    for segment in 0..segments {
        let start = Vec2::from_angle(TAU * segment as f32 / segments as f32);
        let end = Vec2::from_angle(TAU * (segment + 1) as f32 / segments as f32);
        let inner_start = center + start * radius;
        let inner_end = center + end * radius;
        let outer_start = center + start * reach;
        let outer_end = center + end * reach;
        triangles.push([inner_start, outer_start, outer_end]);
        triangles.push([inner_start, outer_end, inner_end]);
    }
    triangles
}

fn draw_texts(texts: &[SceneText], metrics: &ScreenMetrics) {
    for line in texts {
        let logical_size = match line.scale {
            TextScale::Large => LARGE_FONT,
            TextScale::Small => SMALL_FONT,
        };
        let font_size = (logical_size * metrics.scale).max(1.0);
        let dimensions = macroquad::text::measure_text(&line.text, None, font_size as u16, 1.0);
        let center = metrics.to_window(line.center);
        macroquad::text::draw_text(
            &line.text,
            center.x - dimensions.width * 0.5,
            center.y + dimensions.offset_y * 0.5,
            font_size,
            to_macroquad_color(line.color),
        );
    }
}

fn fill_rect(rect: &SceneRect, metrics: &ScreenMetrics) {
    let (position, size) = metrics.rect(rect.origin, rect.size);
    macroquad::shapes::draw_rectangle(
        position.x,
        position.y,
        size.x,
        size.y,
        to_macroquad_color(rect.color),
    );
}

fn outline_rect(rect: &SceneRect, thickness: f32, metrics: &ScreenMetrics) {
    let (position, size) = metrics.rect(rect.origin, rect.size);
    macroquad::shapes::draw_rectangle_lines(
        position.x,
        position.y,
        size.x,
        size.y,
        thickness * metrics.scale,
        to_macroquad_color(rect.color),
    );
}

fn to_macroquad_vec(point: Vec2) -> MacroquadVec2 {
    MacroquadVec2::new(point.x, point.y)
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
