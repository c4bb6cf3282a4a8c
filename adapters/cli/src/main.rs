#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots Escape From The Abyss.

mod config;
mod scene;

use std::path::PathBuf;

use abyss_game::Game;
use abyss_rendering::{Color, Presentation, RenderingBackend, Scene};
use abyss_rendering_macroquad::MacroquadBackend;
use anyhow::{Context, Result};
use clap::Parser;

/// Simulation steps are expressed in 60 Hz frame units.
const FRAMES_PER_SECOND: f32 = 60.0;

/// Command-line arguments accepted by the game.
#[derive(Debug, Parser)]
#[command(name = "abyss", about = "Survive the waves rising from the abyss.")]
struct Args {
    /// Seed for world generation and gameplay randomness; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// TOML file overriding the default gameplay configuration.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Synchronise presentation with the display refresh rate.
    #[arg(long, overrides_with = "no_vsync")]
    vsync: bool,
    /// Render as fast as possible.
    #[arg(long = "no-vsync", overrides_with = "vsync")]
    no_vsync: bool,
    /// Print frame timing once per second.
    #[arg(long)]
    show_fps: bool,
}

impl Args {
    fn vsync(&self) -> Option<bool> {
        match (self.vsync, self.no_vsync) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

/// Entry point for the Escape From The Abyss command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = config::load(args.config.as_deref())?;
    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("starting with seed {seed}");

    let screen = (config.world.screen_width, config.world.screen_height);
    let mut game = Game::new(config, seed).context("failed to start the game")?;
    let scene = Scene::new(screen.0, screen.1).context("failed to create the scene")?;

    let mut backend = MacroquadBackend::new().with_show_fps(args.show_fps);
    if let Some(enabled) = args.vsync() {
        backend = backend.with_vsync(enabled);
    }

    let presentation = Presentation::new(
        "Escape From The Abyss",
        Color::from_rgb_u8(0, 0, 0),
        scene,
    );
    backend.run(presentation, move |dt, input, scene| {
        for key in input.pressed {
            if let Err(error) = game.on_key_down(key) {
                log::error!("{error}");
            }
        }
        for key in input.released {
            game.on_key_up(key);
        }
        game.update(
            dt.as_secs_f32() * FRAMES_PER_SECOND,
            input.cursor.x,
            input.cursor.y,
            input.buttons,
        );
        scene::populate(&game, scene);
    })
}
