/// The player: a 1×3 sprite steered by the arrow keys.
///
/// ## Per-tick update
///
///   1. Steering, per the level's player mode.
///   2. Vertical physics (constant descent, or gravity integration).
///   3. Playfield band check: leaving the band is fatal.
///   4. Landing: a safe platform's top band snaps the player onto it and
///      may score; a hazardous one is fatal.
///   5. Boss contact is fatal.
///
/// A dead player is simply an invisible sprite. It is not updated again
/// until the next reset rebuilds it.

use super::boss::Boss;
use super::framebuffer::{Framebuffer, ScreenSize};
use super::key::MoveDir;
use super::physics::{
    hit_side_platform, hit_top_platform, hits_boss, nudge_down_to, nudge_up_to, Level, PhysicsMode,
    PLAYER_ACCEL, PLAYER_BASE_DX, PLAYER_BASE_DY, PLAYER_JUMP_DY, PLAYER_JUMP_LIFT,
    PLAYER_REST_HEIGHT, PLAYER_TIMESTEP, PLAYFIELD_BOTTOM_MARGIN, PLAYFIELD_TOP,
};
use super::platform::Platform;
use super::sprite::{Sprite, SpriteError};

pub const PLAYER_IMAGE: &str = "0|M";
pub const PLAYER_WIDTH: i32 = 1;
pub const PLAYER_HEIGHT: i32 = 3;
/// Spawn row offset from the bottom of the screen.
const SPAWN_ROWS_FROM_BOTTOM: i32 = 7;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DeathCause {
    LeftPlayfield,
    HazardPlatform(usize),
    Boss,
}

/// What one tick did to the player.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct PlayerUpdate {
    /// Rounded position changed.
    pub moved: bool,
    /// Index of the safe platform the player is standing on after this tick.
    pub landed: Option<usize>,
    /// Score went up this tick.
    pub scored: bool,
    pub death: Option<DeathCause>,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub sprite: Sprite,
    pub on_platform: bool,
    pub last_platform_hit: Option<usize>,
    pub score: u32,
}

impl Player {
    /// Fresh player standing on the starting platform. That platform counts
    /// as already visited, so it never scores.
    pub fn setup(screen: ScreenSize) -> Result<Self, SpriteError> {
        let x = ((screen.width - 1) / 2) as f64;
        let y = (screen.height - SPAWN_ROWS_FROM_BOTTOM) as f64;
        let mut player = Player::at(x, y)?;
        player.on_platform = true;
        player.last_platform_hit = Some(0);
        Ok(player)
    }

    /// Airborne player at (x, y) with no history.
    pub fn at(x: f64, y: f64) -> Result<Self, SpriteError> {
        Ok(Player {
            sprite: Sprite::new(x, y, PLAYER_WIDTH, PLAYER_HEIGHT, PLAYER_IMAGE)?,
            on_platform: false,
            last_platform_hit: None,
            score: 0,
        })
    }

    pub fn is_alive(&self) -> bool {
        self.sprite.is_visible()
    }

    pub fn step(
        &mut self,
        key: Option<MoveDir>,
        level: Level,
        screen: ScreenSize,
        platforms: &[Platform],
        boss: &Boss,
    ) -> PlayerUpdate {
        let mut update = PlayerUpdate::default();
        if !self.is_alive() {
            return update;
        }
        let before = self.sprite.rounded();

        match level.player_mode() {
            PhysicsMode::NoGravity => self.steer_discrete(key, screen, platforms),
            PhysicsMode::Gravity => self.steer_velocity(key, screen, platforms),
        }
        self.fall(level.player_mode());

        if let Some(cause) = self.resolve_collisions(screen, platforms, boss, &mut update) {
            self.sprite.hide();
            log::debug!("player died: {cause:?}");
            update.death = Some(cause);
        }

        update.moved = self.sprite.rounded() != before;
        update
    }

    // ── Steering ──

    /// One whole cell sideways, only from a platform and not into a side.
    fn steer_discrete(&mut self, key: Option<MoveDir>, screen: ScreenSize, platforms: &[Platform]) {
        let dx = match key {
            Some(MoveDir::Left) => -1.0,
            Some(MoveDir::Right) => 1.0,
            _ => 0.0,
        };
        if dx != 0.0 && self.on_platform && !hit_side_platform(platforms, self.sprite.x, self.sprite.y) {
            self.sprite.x += dx;
        }
        self.clamp(screen);
    }

    fn steer_velocity(&mut self, key: Option<MoveDir>, screen: ScreenSize, platforms: &[Platform]) {
        if self.on_platform {
            match key {
                Some(MoveDir::Up) => {
                    self.sprite.y -= PLAYER_JUMP_LIFT;
                    self.sprite.dy = -PLAYER_JUMP_DY;
                }
                Some(MoveDir::Down) => self.sprite.dx = 0.0,
                Some(MoveDir::Left) => self.sprite.dx = -PLAYER_BASE_DX,
                Some(MoveDir::Right) => self.sprite.dx = PLAYER_BASE_DX,
                None => {}
            }
        }
        if hit_side_platform(platforms, self.sprite.x, self.sprite.y) {
            self.sprite.dx = 0.0;
        }
        self.sprite.step();
        if self.clamp(screen) {
            self.sprite.dx = 0.0;
        }
    }

    /// Keep the player on screen horizontally and below row 0.
    /// Returns true if a horizontal clamp fired.
    fn clamp(&mut self, screen: ScreenSize) -> bool {
        nudge_up_to(&mut self.sprite.y, 0.0);
        let left = nudge_up_to(&mut self.sprite.x, 0.0);
        let right = nudge_down_to(&mut self.sprite.x, screen.max_x() as f64);
        left || right
    }

    // ── Vertical physics ──

    fn fall(&mut self, mode: PhysicsMode) {
        match mode {
            PhysicsMode::NoGravity => {
                self.sprite.dy = PLAYER_BASE_DY;
                self.sprite.step();
            }
            PhysicsMode::Gravity => {
                self.sprite.y += self.sprite.dy * PLAYER_TIMESTEP;
                self.sprite.dy += PLAYER_ACCEL * PLAYER_TIMESTEP;
            }
        }
    }

    // ── Collisions ──

    fn resolve_collisions(
        &mut self,
        screen: ScreenSize,
        platforms: &[Platform],
        boss: &Boss,
        update: &mut PlayerUpdate,
    ) -> Option<DeathCause> {
        let y = self.sprite.y;
        if y >= (screen.height - PLAYFIELD_BOTTOM_MARGIN) as f64 || y < PLAYFIELD_TOP {
            return Some(DeathCause::LeftPlayfield);
        }

        match hit_top_platform(platforms, self.sprite.x, self.sprite.y) {
            Some(i) if platforms[i].safe => {
                self.sprite.y = platforms[i].y - PLAYER_REST_HEIGHT;
                self.sprite.dy = 0.0;
                self.on_platform = true;
                update.landed = Some(i);
                if self.last_platform_hit != Some(i) {
                    self.score += 1;
                    self.last_platform_hit = Some(i);
                    update.scored = true;
                }
            }
            Some(i) => return Some(DeathCause::HazardPlatform(i)),
            None => self.on_platform = false,
        }

        if hits_boss(boss, self.sprite.x, self.sprite.y) {
            return Some(DeathCause::Boss);
        }
        None
    }

    pub fn draw(&self, fb: &mut Framebuffer) {
        self.sprite.draw(fb);
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
