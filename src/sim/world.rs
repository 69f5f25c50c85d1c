/// GameState: the complete snapshot of a running game.
///
/// ## Round lifecycle
///
/// A *round* is one life's worth of play. `reset()` rebuilds every entity
/// wholesale from the current screen size (player, platform field, boss),
/// and drops the game into `AwaitingStart`. Lives and level survive a reset;
/// score and the clock do not.
///
/// ## Phases
///
///   AwaitingStart ─any key─▶ Playing ─death─▶ LifeLost ─any key─▶ AwaitingStart
///                               │                  (lives left)
///                               └─death, no lives─▶ GameOver ─q─▶ Exiting
///                                                       └─other─▶ AwaitingStart
///
/// Only `Playing` ticks the simulation. The other phases hold a prompt in
/// `message` and wait for a key.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::config::{GameConfig, SpeedConfig};
use crate::domain::boss::Boss;
use crate::domain::framebuffer::ScreenSize;
use crate::domain::physics::Level;
use crate::domain::platform::PlatformField;
use crate::domain::player::Player;
use crate::domain::sprite::SpriteError;

pub const MSG_BEGIN: &str = "Please press any key to begin";
pub const MSG_GAME_OVER: &str = "Game over! Press 'q' to quit, or any other key to restart.";
pub const MSG_EXIT: &str = "Press any key to exit...";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    AwaitingStart,
    Playing,
    LifeLost,
    GameOver,
    Exiting,
}

pub struct GameState {
    pub screen: ScreenSize,

    // ── Entities ──
    pub player: Player,
    pub platforms: PlatformField,
    pub boss: Boss,

    // ── Meta ──
    pub phase: Phase,
    pub level: Level,
    pub start_level: Level,
    pub lives: u32,
    pub max_lives: u32,
    pub tick: u64,

    // ── Platform speed (level 3) ──
    pub speed: i32,
    pub desired_speed: i32,
    pub speed_presets: SpeedConfig,

    // ── UI ──
    pub message: String,
    started_at: Option<Instant>,

    pub seed: u64,
    pub rng: Pcg32,
}

impl GameState {
    /// New game at the configured start level, waiting for the first key.
    pub fn new(screen: ScreenSize, config: &GameConfig) -> Result<Self, SpriteError> {
        let seed = config.game.seed.unwrap_or_else(seed_from_clock);
        let mut rng = Pcg32::seed_from_u64(seed);
        let level = config.game.start_level;

        let state = GameState {
            screen,
            player: Player::setup(screen)?,
            platforms: PlatformField::new(screen, &mut rng),
            boss: Boss::setup(screen, level, &mut rng)?,
            phase: Phase::AwaitingStart,
            level,
            start_level: level,
            lives: config.game.lives,
            max_lives: config.game.lives,
            tick: 0,
            speed: config.speed.initial,
            desired_speed: config.speed.initial,
            speed_presets: config.speed,
            message: MSG_BEGIN.to_string(),
            started_at: None,
            seed,
            rng,
        };
        log::info!("new game: seed={seed} level={} screen={}x{}", level.number(), screen.width, screen.height);
        Ok(state)
    }

    /// Rebuild every entity for a fresh round and wait for a key.
    pub fn reset(&mut self) -> Result<(), SpriteError> {
        self.player = Player::setup(self.screen)?;
        self.platforms.initialize(self.screen, &mut self.rng);
        self.boss = Boss::setup(self.screen, self.level, &mut self.rng)?;
        self.tick = 0;
        self.started_at = None;
        self.set_phase(Phase::AwaitingStart, MSG_BEGIN);
        log::info!("round reset: level={} lives={}", self.level.number(), self.lives);
        Ok(())
    }

    /// The display size may change between rounds; takes effect on the next reset.
    pub fn set_screen(&mut self, screen: ScreenSize) {
        if screen != self.screen {
            log::debug!("screen resized to {}x{}", screen.width, screen.height);
            self.screen = screen;
        }
    }

    pub fn start_playing(&mut self) {
        self.started_at = Some(Instant::now());
        self.set_phase(Phase::Playing, "");
    }

    pub fn set_phase(&mut self, phase: Phase, message: &str) {
        self.phase = phase;
        self.message.clear();
        self.message.push_str(message);
    }

    /// Time since the current round started; zero before the first key.
    pub fn elapsed(&self) -> Duration {
        self.started_at.map(|t| t.elapsed()).unwrap_or_default()
    }

    pub fn speed_changing(&self) -> bool {
        self.speed != self.desired_speed
    }

    /// HUD speed label. Only exact preset speeds get a name.
    pub fn speed_label(&self) -> &'static str {
        let p = &self.speed_presets;
        if self.speed == p.slow {
            "Speed: SLOW"
        } else if self.speed == p.normal {
            "Speed: NORM"
        } else if self.speed == p.fast {
            "Speed: FAST"
        } else {
            "Changing..."
        }
    }
}

fn seed_from_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
