//! Translates game state into a screen-space [`Scene`].

use abyss_game::{Game, TextSize};
use abyss_rendering::{
    Color, Scene, SceneBullet, SceneChunk, SceneCircle, SceneEnemy, ScenePlayer, SceneRect,
    SceneRing, SceneText, TextScale, Vignette,
};
use abyss_world::query;
use glam::Vec2;

const WATER: Color = Color::from_rgb_u8(0, 180, 180);
const TERRAIN_BACKDROP: Color = Color::from_rgb_u8(120, 80, 180);
const PLAYER: Color = Color::from_rgb_u8(255, 255, 255);
const ENEMY: Color = Color::from_rgb_u8(220, 60, 90);
const BULLET: Color = Color::from_rgb_u8(255, 230, 120);
const SPARK: Color = Color::from_rgb_u8(255, 255, 255);
const TEXT: Color = Color::from_rgb_u8(255, 255, 255);

/// Rewrites `scene` to show the current frame of `game`.
pub(crate) fn populate(game: &Game, scene: &mut Scene) {
    scene.clear_entities();

    let world = game.world();
    let camera = game.camera().offset();
    let tile_size = query::tile_size(world);

    scene.terrain_backdrop = Some(SceneRect::new(
        Vec2::new(100.0, 100.0) - camera,
        Vec2::new(400.0, 200.0),
        TERRAIN_BACKDROP,
    ));

    scene.chunk_generation = game.chunks().generation();
    scene
        .chunks
        .extend(game.visible_chunks().into_iter().map(|chunk| SceneChunk {
            coord: chunk.coord,
            origin: chunk.screen_origin,
            surface: chunk.surface,
        }));

    let enemies = query::enemy_view(world);
    scene.enemies.extend(enemies.iter().map(|enemy| SceneEnemy {
        body: SceneRect::new(enemy.bounds.origin() - camera, enemy.bounds.size(), ENEMY),
        flashing: !enemy.hit_ready,
    }));

    let player = query::player(world);
    scene.player = Some(ScenePlayer {
        center: player.bounds.center() - camera,
        size: player.bounds.size(),
        scale: player.scale,
        color: PLAYER,
        flashing: !player.hit_ready,
    });

    scene
        .bullets
        .extend(query::bullet_view(world).iter().map(|bullet| {
            let size = bullet.bounds.size();
            SceneBullet {
                center: bullet.bounds.center() - camera,
                size: Vec2::new(size.x * 2.0, size.y),
                angle: bullet.angle,
                color: BULLET,
            }
        }));

    scene
        .particles
        .extend(query::particles(world).iter().map(|particle| SceneCircle {
            center: particle.position() - camera,
            radius: particle.radius(),
            color: SPARK,
        }));
    scene
        .shockwaves
        .extend(query::shockwaves(world).iter().map(|shockwave| SceneRing {
            center: shockwave.center() - camera,
            radius: shockwave.radius(),
            thickness: shockwave.width(),
            color: SPARK,
        }));

    scene.health.pips = player.health.max(0.0).floor() as u32;
    scene.health.spacing = tile_size;
    scene.health.pip_size = tile_size / 1.5;

    let ground = query::ground(world);
    let map_size = Vec2::new(ground.columns() as f32, ground.rows() as f32);
    let map_origin = Vec2::new(scene.screen_size.x - map_size.x, 0.0);
    scene.minimap.frame.origin = map_origin;
    scene.minimap.frame.size = map_size;
    let to_minimap = |point: Vec2| map_origin + (point / tile_size).floor();
    scene
        .minimap
        .enemies
        .extend(enemies.iter().map(|enemy| to_minimap(enemy.bounds.origin())));
    scene.minimap.player = to_minimap(player.bounds.origin());

    if game.vignette_active() {
        scene.vignette = Some(Vignette {
            center: scene.screen_size * 0.5,
            radius: game.reveal_radius(),
            color: WATER,
        });
    }

    scene
        .texts
        .extend(game.announcements().iter().map(|announcement| SceneText {
            text: announcement.text().to_owned(),
            center: announcement.center(),
            scale: match announcement.size() {
                TextSize::Big => TextScale::Large,
                TextSize::Small => TextScale::Small,
            },
            color: TEXT.faded(announcement.opacity()),
        }));
}
