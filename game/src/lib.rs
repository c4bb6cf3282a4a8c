#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Owning context for a running game of Escape From The Abyss.
//!
//! [`Game`] wires the one-time load pipeline (terrain generation, distance
//! shading, autotiling, chunk compositing) to the per-frame loop: input,
//! player movement, enemy pursuit, bullets, collisions and wave logic, in
//! that order. Adapters feed it input and read back the state they draw.

mod announcements;
mod camera;

pub use announcements::{Announcement, Announcements, TextSize};
pub use camera::Camera;

use abyss_core::{
    Command, ConfigError, Event, GameConfig, GamePhase, Key, LayerKind, MouseButtons, TileLayer,
    WorldLayout,
};
use abyss_system_autotile::AutoTiler;
use abyss_system_chunking::{ChunkCache, ChunkDimensions, VisibleChunk};
use abyss_system_combat::{Arena, CollisionResolver};
use abyss_system_pursuit::Pursuit;
use abyss_system_shading::{DistanceColorizer, DistanceField};
use abyss_system_terrain::WorldGenerator;
use abyss_system_waves::{WaveController, WaveState};
use abyss_world::{self as world, query, World};
use glam::Vec2;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Largest frame step accepted by [`Game::update`], in 60 Hz frame units.
pub const MAX_FRAME_STEP: f32 = 3.0;

/// Terrain seeds are drawn from this range.
const TERRAIN_SEEDS: std::ops::RangeInclusive<u32> = 0..=256;

/// Seeds tried before loading gives up.
const GENERATION_ATTEMPTS: u32 = 8;

/// Reasons a game cannot be created or restarted.
#[derive(Debug, Error, PartialEq)]
pub enum GameError {
    /// The configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// No generated world offered a place for the player to start.
    #[error("no usable spawn area after {attempts} terrain seeds (last seed {last_seed})")]
    EmptySpawnArea {
        /// Number of seeds tried.
        attempts: u32,
        /// Final seed that was rejected.
        last_seed: u32,
    },
}

/// A running game: world, systems, terrain caches and presentation state.
#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    world: World,
    waves: WaveController,
    pursuit: Pursuit,
    collisions: CollisionResolver,
    chunks: ChunkCache,
    camera: Camera,
    announcements: Announcements,
    rng: ChaCha8Rng,
    terrain_seed: u32,
    cursor: Vec2,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl Game {
    /// Validates `config`, generates the first world and opens wave one.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, GameError> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let world_seed = rng.gen();
        let wave_seed = rng.gen();

        let settings = &config.world;
        let screen = Vec2::new(settings.screen_width as f32, settings.screen_height as f32);
        let tile_size = settings.tile_size as f32;
        let reveal_limit = screen.x * 0.5 + tile_size * 5.0;
        let dimensions =
            ChunkDimensions::new(settings.chunk_columns, settings.chunk_rows, settings.tile_size);

        let mut game = Self {
            world: World::new(&config, world_seed),
            waves: WaveController::new(&config.waves, reveal_limit, wave_seed),
            pursuit: Pursuit,
            collisions: CollisionResolver::default(),
            chunks: ChunkCache::empty(dimensions),
            camera: Camera::new(&config.camera, screen),
            announcements: Announcements::new(screen, tile_size),
            rng,
            terrain_seed: 0,
            cursor: screen * 0.5,
            commands: Vec::new(),
            events: Vec::new(),
            config,
        };
        game.start_run()?;
        Ok(game)
    }

    /// Handles a key press. The restart key regenerates the world once the
    /// death screen is up and is ignored otherwise.
    pub fn on_key_down(&mut self, key: Key) -> Result<(), GameError> {
        match key {
            Key::Move(direction) => {
                self.apply(Command::SetMovementKey {
                    direction,
                    held: true,
                });
                Ok(())
            }
            Key::Restart => {
                if !self.waves.request_restart() {
                    return Ok(());
                }
                if let Err(error) = self.start_run() {
                    let _ = self.waves.abort_restart();
                    self.announcements.death();
                    return Err(error);
                }
                Ok(())
            }
        }
    }

    /// Handles a key release.
    pub fn on_key_up(&mut self, key: Key) {
        if let Key::Move(direction) = key {
            self.apply(Command::SetMovementKey {
                direction,
                held: false,
            });
        }
    }

    /// Advances the game by `dt` frame units with the cursor at the provided
    /// screen position. `dt` is clamped to [`MAX_FRAME_STEP`]; a non-finite
    /// step counts as zero.
    pub fn update(&mut self, dt: f32, mouse_x: f32, mouse_y: f32, buttons: MouseButtons) {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_STEP)
        } else {
            0.0
        };
        self.cursor = Vec2::new(mouse_x, mouse_y);
        self.events.clear();

        let focus = query::player(&self.world).bounds.center();
        self.camera.update(focus, self.cursor, dt, &mut self.rng);

        if self.waves.phase().simulates() {
            self.simulate(dt, buttons);
        }

        let phase = self.waves.phase();
        let wave = self.waves.state().wave;
        let mut commands = std::mem::take(&mut self.commands);
        self.waves.handle(
            dt,
            &self.events,
            query::enemy_count(&self.world),
            &mut commands,
        );
        for command in commands.drain(..) {
            self.apply(command);
        }
        self.commands = commands;

        if self.waves.state().wave != wave {
            self.announcements.wave(self.waves.state().wave);
        }
        if phase != GamePhase::LostFadeOut && self.waves.phase() == GamePhase::LostFadeOut {
            self.announcements.death();
        }

        self.react();
        self.apply(Command::AdvanceEffects { dt });
        self.announcements.advance(dt);
    }

    fn simulate(&mut self, dt: f32, buttons: MouseButtons) {
        let mut commands = std::mem::take(&mut self.commands);
        if buttons.left {
            commands.push(Command::Fire {
                aim: self.camera.to_world(self.cursor),
            });
        }
        commands.push(Command::MovePlayer { dt });
        self.flush(&mut commands);

        self.pursuit.handle(
            &query::player(&self.world),
            &query::enemy_view(&self.world),
            &mut commands,
        );
        commands.extend([
            Command::AdvanceEnemies { dt },
            Command::AdvanceWeapon { dt },
            Command::AdvanceBullets { dt },
        ]);
        self.flush(&mut commands);

        self.collisions.handle(
            &query::player(&self.world),
            &query::enemy_view(&self.world),
            &query::bullet_view(&self.world),
            Arena {
                obstacles: query::obstacles(&self.world),
                tile_size: query::tile_size(&self.world),
                bounds: query::world_bounds(&self.world),
            },
            &mut commands,
        );
        self.flush(&mut commands);
        self.commands = commands;
    }

    fn flush(&mut self, commands: &mut Vec<Command>) {
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }

    fn apply(&mut self, command: Command) {
        world::apply(&mut self.world, command, &mut self.events);
    }

    fn react(&mut self) {
        let camera = &self.config.camera;
        for event in &self.events {
            match event {
                Event::EnemyDamaged { .. } => self.camera.start_shake(camera.enemy_hit_shake),
                Event::PlayerDamaged { .. } => self.camera.start_shake(camera.player_hit_shake),
                Event::PlayerBuffApplied { buff } => self.announcements.player_buff(*buff),
                Event::EnemyBuffApplied { buff } => self.announcements.enemy_buff(*buff),
                _ => {}
            }
        }
    }

    /// Regenerates the world and opens wave one.
    fn start_run(&mut self) -> Result<(), GameError> {
        self.announcements.clear();
        self.events.clear();
        self.load()?;

        let mut commands = std::mem::take(&mut self.commands);
        self.waves.reset(&mut commands);
        self.flush(&mut commands);
        self.commands = commands;

        self.camera
            .snap_to(query::player(&self.world).bounds.center());
        self.announcements.wave(self.waves.state().wave);
        Ok(())
    }

    fn load(&mut self) -> Result<(), GameError> {
        let settings = &self.config.world;
        let tile_size = settings.tile_size;
        let generator = WorldGenerator::new(
            settings.columns(),
            settings.rows(),
            &settings.ground_thresholds,
            &settings.object_thresholds,
        );

        let mut seed = self.rng.gen_range(TERRAIN_SEEDS);
        for attempt in 1..=GENERATION_ATTEMPTS {
            let terrain = generator.generate(seed);
            let candidates = terrain.player_spawn_candidates();
            let Some(player_spawn) = candidates.choose(&mut self.rng).copied() else {
                log::warn!(
                    "terrain seed {seed} has no player spawn (attempt {attempt} of {GENERATION_ATTEMPTS})"
                );
                seed = seed.wrapping_add(1);
                continue;
            };

            let spawn_area = terrain.spawn_area();
            let (ground, objects) = terrain.into_maps();
            let mut ground_layer = TileLayer::from_type_map(LayerKind::Ground, &ground, tile_size);
            let mut object_layer =
                TileLayer::from_type_map(LayerKind::Objects, &objects, tile_size);

            let field = DistanceField::compute(&ground);
            DistanceColorizer::default().colorize(&field, &mut ground_layer, &mut object_layer);

            let tiler = AutoTiler::new(tile_size);
            let ground_tiled = tiler.apply(&mut ground_layer);
            let objects_tiled = tiler.apply(&mut object_layer);
            self.chunks.rebuild(&[&ground_layer, &object_layer]);

            log::info!(
                "generated world from seed {seed}: {} chunks, {} spawn cells",
                self.chunks.len(),
                spawn_area.len()
            );
            log::debug!(
                "autotiled {ground_tiled} ground and {objects_tiled} object tiles, max outline distance {}",
                field.max_distance()
            );

            self.terrain_seed = seed;
            let layout = WorldLayout {
                ground,
                objects,
                spawn_area,
                player_spawn,
            };
            world::apply(
                &mut self.world,
                Command::ResetWorld { layout },
                &mut self.events,
            );
            return Ok(());
        }

        Err(GameError::EmptySpawnArea {
            attempts: GENERATION_ATTEMPTS,
            last_seed: seed.wrapping_sub(1),
        })
    }

    /// Configuration the game runs with.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Authoritative world state.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> GamePhase {
        self.waves.phase()
    }

    /// Current wave counters.
    #[must_use]
    pub const fn wave(&self) -> WaveState {
        self.waves.state()
    }

    /// Radius of the vignette's clear circle in screen pixels.
    #[must_use]
    pub const fn reveal_radius(&self) -> f32 {
        self.waves.reveal_radius()
    }

    /// Whether the vignette is drawn this frame.
    #[must_use]
    pub fn vignette_active(&self) -> bool {
        !self.waves.phase().simulates()
    }

    /// Terrain seed of the current world.
    #[must_use]
    pub const fn terrain_seed(&self) -> u32 {
        self.terrain_seed
    }

    /// Composited terrain chunks.
    #[must_use]
    pub const fn chunks(&self) -> &ChunkCache {
        &self.chunks
    }

    /// Chunks around the player with their screen origins.
    #[must_use]
    pub fn visible_chunks(&self) -> Vec<VisibleChunk> {
        self.chunks.visible(
            query::player(&self.world).bounds.center(),
            self.camera.offset(),
        )
    }

    /// Camera state.
    #[must_use]
    pub const fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Text currently on screen.
    #[must_use]
    pub fn announcements(&self) -> &[Announcement] {
        self.announcements.as_slice()
    }

    /// Cursor position in screen pixels.
    #[must_use]
    pub const fn cursor(&self) -> Vec2 {
        self.cursor
    }

    /// Events produced by the most recent call to [`Game::update`].
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abyss_core::{Direction, ThresholdBand, ThresholdTable, TileType};

    fn small_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.world.world_scale = 2;
        config
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = GameConfig::default();
        config.world.chunk_rows = 0;

        let error = Game::new(config, 1).err();
        assert_eq!(
            error,
            Some(GameError::Config(ConfigError::ZeroDimension {
                field: "chunk_rows"
            }))
        );
    }

    #[test]
    fn new_game_opens_with_the_reveal() {
        let game = Game::new(small_config(), 4).expect("world generates");

        assert_eq!(game.phase(), GamePhase::Intro);
        assert_eq!(game.wave().wave, 1);
        assert_eq!(query::enemy_count(game.world()), 10);
        assert!(!game.chunks().is_empty());
        assert_eq!(game.chunks().generation(), 1);
        assert!(game.vignette_active());
        assert_eq!(game.announcements()[0].text(), "Wave 1");
        assert!((0..=256 + GENERATION_ATTEMPTS).contains(&game.terrain_seed()));
    }

    #[test]
    fn player_is_frozen_during_the_reveal() {
        let mut game = Game::new(small_config(), 4).expect("world generates");
        let start = query::player(game.world()).bounds;

        game.on_key_down(Key::Move(Direction::Right))
            .expect("movement never fails");
        game.update(1.0, 320.0, 180.0, MouseButtons::default());

        assert_eq!(query::player(game.world()).bounds, start);
        assert_eq!(game.phase(), GamePhase::Intro);
    }

    #[test]
    fn frame_step_is_clamped() {
        let mut game = Game::new(small_config(), 4).expect("world generates");
        game.update(100.0, 320.0, 180.0, MouseButtons::default());

        assert_eq!(game.reveal_radius(), 30.0);
    }

    #[test]
    fn non_finite_frame_step_is_ignored() {
        let mut game = Game::new(small_config(), 4).expect("world generates");
        game.update(f32::NAN, 320.0, 180.0, MouseButtons::default());
        game.update(f32::INFINITY, 320.0, 180.0, MouseButtons::default());

        assert_eq!(game.reveal_radius(), 0.0);
        game.update(1.0, 320.0, 180.0, MouseButtons::default());
        assert_eq!(game.reveal_radius(), 10.0);
    }

    #[test]
    fn failed_restart_keeps_the_death_screen() {
        let mut game = Game::new(small_config(), 4).expect("world generates");
        while game.phase() == GamePhase::Intro {
            game.update(1.0, 320.0, 180.0, MouseButtons::default());
        }
        let died = [Event::PlayerDied {
            position: Vec2::ZERO,
        }];
        let mut commands = Vec::new();
        game.waves.handle(1.0, &died, 0, &mut commands);
        while game.phase() != GamePhase::LostFadeOut {
            game.update(1.0, 320.0, 180.0, MouseButtons::default());
        }
        assert!(commands.is_empty());
        let generation = game.chunks().generation();

        let thresholds = game.config.world.ground_thresholds.clone();
        game.config.world.ground_thresholds =
            ThresholdTable::new(vec![ThresholdBand::new(-10.0, 10.0, TileType::Air)]);
        let error = game.on_key_down(Key::Restart).err();

        assert!(matches!(error, Some(GameError::EmptySpawnArea { .. })));
        assert_eq!(game.phase(), GamePhase::LostFadeOut);
        assert_eq!(game.chunks().generation(), generation);
        assert!(game
            .announcements()
            .iter()
            .any(|announcement| announcement.text() == "Press R to restart"));

        game.config.world.ground_thresholds = thresholds;
        game.on_key_down(Key::Restart).expect("restart succeeds");

        assert_eq!(game.phase(), GamePhase::Intro);
        assert_eq!(game.chunks().generation(), generation + 1);
    }

    #[test]
    fn visible_chunks_surround_the_player() {
        let game = Game::new(small_config(), 9).expect("world generates");
        let visible = game.visible_chunks();

        assert!(!visible.is_empty());
        assert!(visible.len() <= 9);
    }

    #[test]
    fn restart_is_ignored_while_alive() {
        let mut game = Game::new(small_config(), 4).expect("world generates");
        let generation = game.chunks().generation();

        game.on_key_down(Key::Restart).expect("restart is a no-op");

        assert_eq!(game.chunks().generation(), generation);
        assert_eq!(game.phase(), GamePhase::Intro);
    }
}
