#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave pacing and the gameplay phase machine.
//!
//! The controller owns the [`GamePhase`] and the wave counters. It opens each
//! run with a reveal, waits for the field to clear, hands out buffs on the
//! configured cadence, spawns ever larger waves, and closes the vignette once
//! the player dies.

use abyss_core::{Command, EnemyBuff, Event, GamePhase, PlayerBuff, WaveConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Counters describing the current wave.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveState {
    /// One-based wave number.
    pub wave: u32,
    /// Enemies spawned by the most recent wave.
    pub enemy_spawn_rate: u32,
    /// Frames the field must stay clear before the next spawn.
    pub spawn_cooldown_timer: f32,
    /// Whether this wave's buffs were already handed out.
    pub upgraded: bool,
}

impl WaveState {
    fn initial(config: &WaveConfig) -> Self {
        Self {
            wave: 1,
            enemy_spawn_rate: config.initial_spawn_rate,
            spawn_cooldown_timer: config.spawn_cooldown,
            upgraded: false,
        }
    }
}

/// Drives phases, buffs and enemy waves.
#[derive(Debug)]
pub struct WaveController {
    config: WaveConfig,
    reveal_limit: f32,
    phase: GamePhase,
    state: WaveState,
    reveal_radius: f32,
    rng: ChaCha8Rng,
}

impl WaveController {
    /// Creates a controller in the intro phase.
    ///
    /// `reveal_limit` is the vignette radius at which the intro hands over to
    /// gameplay, normally half the screen width plus five tiles.
    #[must_use]
    pub fn new(config: &WaveConfig, reveal_limit: f32, seed: u64) -> Self {
        Self {
            state: WaveState::initial(config),
            config: config.clone(),
            reveal_limit,
            phase: GamePhase::Intro,
            reveal_radius: 0.0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Restarts the run at wave one and requests the opening spawn.
    pub fn reset(&mut self, out: &mut Vec<Command>) {
        self.phase = GamePhase::Intro;
        self.state = WaveState::initial(&self.config);
        self.reveal_radius = 0.0;
        out.push(Command::SpawnEnemies {
            count: self.state.enemy_spawn_rate,
        });
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Current wave counters.
    #[must_use]
    pub const fn state(&self) -> WaveState {
        self.state
    }

    /// Radius of the vignette's clear circle in screen pixels.
    #[must_use]
    pub const fn reveal_radius(&self) -> f32 {
        self.reveal_radius
    }

    /// Radius at which the reveal is complete.
    #[must_use]
    pub const fn reveal_limit(&self) -> f32 {
        self.reveal_limit
    }

    /// Whether the controller waits for the restart key.
    #[must_use]
    pub fn awaiting_restart(&self) -> bool {
        self.phase == GamePhase::LostFadeOut
    }

    /// Moves from the death screen to [`GamePhase::Restarting`]. Returns
    /// `false` when no restart is pending.
    pub fn request_restart(&mut self) -> bool {
        if !self.awaiting_restart() {
            return false;
        }
        log::info!("restart requested after wave {}", self.state.wave);
        self.phase = GamePhase::Restarting;
        true
    }

    /// Returns to the death screen after a restart could not be completed.
    /// Returns `false` when no restart was in progress.
    pub fn abort_restart(&mut self) -> bool {
        if self.phase != GamePhase::Restarting {
            return false;
        }
        log::warn!("restart abandoned, back to the death screen");
        self.phase = GamePhase::LostFadeOut;
        true
    }

    /// Advances the phase machine by `dt` frames.
    ///
    /// `events` are the world events produced this frame and `enemy_count` the
    /// number of live enemies after collisions were applied.
    pub fn handle(&mut self, dt: f32, events: &[Event], enemy_count: usize, out: &mut Vec<Command>) {
        if self.phase.simulates()
            && events
                .iter()
                .any(|event| matches!(event, Event::PlayerDied { .. }))
        {
            log::info!("player died during wave {}", self.state.wave);
            self.phase = GamePhase::LostFadeIn;
        }

        match self.phase {
            GamePhase::Intro => {
                self.reveal_radius += self.config.reveal_speed * dt;
                if self.reveal_radius >= self.reveal_limit {
                    self.reveal_radius = self.reveal_limit;
                    self.phase = GamePhase::Active;
                }
            }
            GamePhase::Active => {
                if enemy_count > 0 {
                    return;
                }
                self.state.spawn_cooldown_timer -= dt;
                if self.state.spawn_cooldown_timer <= 0.0 {
                    self.upgrade(out);
                    self.phase = GamePhase::Upgrading;
                }
            }
            GamePhase::Upgrading => self.spawn_wave(out),
            GamePhase::LostFadeIn => {
                self.reveal_radius -= self.config.reveal_speed * dt;
                if self.reveal_radius <= 0.0 {
                    self.reveal_radius = 0.0;
                    self.phase = GamePhase::LostFadeOut;
                }
            }
            GamePhase::LostFadeOut | GamePhase::Restarting => {}
        }
    }

    fn upgrade(&mut self, out: &mut Vec<Command>) {
        let chance = self.rng.gen_range(0..=2_u8);
        let wave = self.state.wave;
        if self.state.upgraded {
            return;
        }

        if wave % self.config.player_buff_every == 0 {
            let buff = match chance {
                1 => PlayerBuff::BulletDamage,
                2 => PlayerBuff::WeaponCooldown,
                _ => PlayerBuff::PlayerHealth,
            };
            out.push(Command::ApplyPlayerBuff { buff });
            self.state.upgraded = true;
        }

        if wave % self.config.enemy_buff_every == 0 {
            let buff = match chance {
                1 => EnemyBuff::Damage,
                2 => EnemyBuff::Speed,
                _ => EnemyBuff::Health,
            };
            out.push(Command::ApplyEnemyBuff { buff });
            self.state.upgraded = true;
        }
    }

    fn spawn_wave(&mut self, out: &mut Vec<Command>) {
        let increment = self
            .rng
            .gen_range(self.config.spawn_increment_min..=self.config.spawn_increment_max);
        self.state.enemy_spawn_rate = self.state.enemy_spawn_rate.saturating_add(increment);
        self.state.spawn_cooldown_timer = self.config.spawn_cooldown;
        self.state.wave = self.state.wave.saturating_add(1);
        self.state.upgraded = false;
        self.phase = GamePhase::Active;

        log::info!(
            "wave {} begins with {} enemies",
            self.state.wave,
            self.state.enemy_spawn_rate
        );
        out.push(Command::SpawnEnemies {
            count: self.state.enemy_spawn_rate,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn controller() -> WaveController {
        WaveController::new(&WaveConfig::default(), 400.0, 17)
    }

    fn active() -> WaveController {
        let mut waves = controller();
        let mut out = Vec::new();
        while waves.phase() == GamePhase::Intro {
            waves.handle(1.0, &[], 10, &mut out);
        }
        assert!(out.is_empty());
        waves
    }

    #[test]
    fn reset_requests_the_opening_wave() {
        let mut waves = controller();
        let mut out = Vec::new();
        waves.reset(&mut out);

        assert_eq!(out, vec![Command::SpawnEnemies { count: 10 }]);
        assert_eq!(waves.phase(), GamePhase::Intro);
        assert_eq!(waves.state().wave, 1);
    }

    #[test]
    fn intro_ends_once_reveal_passes_limit() {
        let mut waves = controller();
        let mut out = Vec::new();
        for _ in 0..39 {
            waves.handle(1.0, &[], 10, &mut out);
        }
        assert_eq!(waves.phase(), GamePhase::Intro);
        waves.handle(1.0, &[], 10, &mut out);
        assert_eq!(waves.phase(), GamePhase::Active);
        assert_eq!(waves.reveal_radius(), 400.0);
    }

    #[test]
    fn live_enemies_hold_the_cooldown() {
        let mut waves = active();
        let mut out = Vec::new();
        for _ in 0..500 {
            waves.handle(1.0, &[], 3, &mut out);
        }
        assert!(out.is_empty());
        assert_eq!(waves.state().spawn_cooldown_timer, 120.0);
    }

    #[test]
    fn cleared_field_spawns_a_larger_wave_after_cooldown() {
        let mut waves = active();
        let mut out = Vec::new();
        for _ in 0..119 {
            waves.handle(1.0, &[], 0, &mut out);
        }
        assert_eq!(waves.phase(), GamePhase::Active);

        waves.handle(1.0, &[], 0, &mut out);
        assert_eq!(waves.phase(), GamePhase::Upgrading);
        assert!(out.is_empty(), "wave one earns no buffs");

        waves.handle(1.0, &[], 0, &mut out);
        let [Command::SpawnEnemies { count }] = out.as_slice() else {
            panic!("expected a spawn, got {out:?}");
        };
        assert!((15..=20).contains(count));
        assert_eq!(waves.state().wave, 2);
        assert_eq!(waves.state().enemy_spawn_rate, *count);
        assert!(!waves.state().upgraded);
        assert_eq!(waves.phase(), GamePhase::Active);
    }

    #[test]
    fn buffs_follow_wave_cadence() {
        let mut waves = active();
        let mut per_wave = Vec::new();
        for _ in 0..4 {
            let mut out = Vec::new();
            while waves.phase() != GamePhase::Upgrading {
                waves.handle(1.0, &[], 0, &mut out);
            }
            per_wave.push(out);
            let mut spawned = Vec::new();
            waves.handle(1.0, &[], 0, &mut spawned);
        }

        let player = |out: &Vec<Command>| {
            out.iter()
                .filter(|command| matches!(command, Command::ApplyPlayerBuff { .. }))
                .count()
        };
        let enemy = |out: &Vec<Command>| {
            out.iter()
                .filter(|command| matches!(command, Command::ApplyEnemyBuff { .. }))
                .count()
        };
        assert_eq!(per_wave.iter().map(player).collect::<Vec<_>>(), [0, 0, 0, 1]);
        assert_eq!(per_wave.iter().map(enemy).collect::<Vec<_>>(), [0, 1, 0, 1]);
    }

    #[test]
    fn player_and_enemy_buffs_share_one_draw() {
        let mut waves = active();
        let mut wave_four = Vec::new();
        while waves.state().wave < 4 || waves.phase() != GamePhase::Upgrading {
            wave_four.clear();
            waves.handle(1.0, &[], 0, &mut wave_four);
        }

        let pairs = [
            (PlayerBuff::BulletDamage, EnemyBuff::Damage),
            (PlayerBuff::WeaponCooldown, EnemyBuff::Speed),
            (PlayerBuff::PlayerHealth, EnemyBuff::Health),
        ];
        let [Command::ApplyPlayerBuff { buff: player }, Command::ApplyEnemyBuff { buff: enemy }] =
            wave_four.as_slice()
        else {
            panic!("expected both buffs, got {wave_four:?}");
        };
        assert!(pairs.contains(&(*player, *enemy)));
    }

    #[test]
    fn player_buff_alone_marks_the_wave_upgraded() {
        let config = WaveConfig {
            player_buff_every: 3,
            enemy_buff_every: 2,
            ..WaveConfig::default()
        };
        let mut waves = WaveController::new(&config, 400.0, 17);
        let mut out = Vec::new();
        while waves.state().wave < 3 || waves.phase() != GamePhase::Upgrading {
            out.clear();
            waves.handle(1.0, &[], 0, &mut out);
        }

        assert!(matches!(
            out.as_slice(),
            [Command::ApplyPlayerBuff { .. }]
        ));
        assert!(waves.state().upgraded);
    }

    #[test]
    fn abandoned_restart_returns_to_the_death_screen() {
        let mut waves = active();
        let mut out = Vec::new();
        waves.handle(
            1.0,
            &[Event::PlayerDied {
                position: Vec2::ZERO,
            }],
            0,
            &mut out,
        );
        while waves.phase() != GamePhase::LostFadeOut {
            waves.handle(1.0, &[], 0, &mut out);
        }

        assert!(!waves.abort_restart());
        assert!(waves.request_restart());
        assert!(waves.abort_restart());
        assert_eq!(waves.phase(), GamePhase::LostFadeOut);
        assert!(waves.request_restart());
    }

    #[test]
    fn death_closes_the_vignette_and_waits_for_restart() {
        let mut waves = active();
        let mut out = Vec::new();
        let died = [Event::PlayerDied {
            position: Vec2::ZERO,
        }];

        assert!(!waves.request_restart());
        waves.handle(1.0, &died, 5, &mut out);
        assert_eq!(waves.phase(), GamePhase::LostFadeIn);
        assert_eq!(waves.reveal_radius(), 390.0);

        while waves.phase() == GamePhase::LostFadeIn {
            waves.handle(1.0, &[], 0, &mut out);
        }
        assert_eq!(waves.phase(), GamePhase::LostFadeOut);
        assert_eq!(waves.reveal_radius(), 0.0);
        assert!(out.is_empty());

        assert!(waves.request_restart());
        assert_eq!(waves.phase(), GamePhase::Restarting);
        waves.reset(&mut out);
        assert_eq!(waves.phase(), GamePhase::Intro);
        assert_eq!(waves.state().enemy_spawn_rate, 10);
    }
}
