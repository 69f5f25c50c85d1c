/// Physics modes, level rules, and collision geometry.
///
/// ## Physics modes
///
/// Two modes, consulted separately by the player and the platform field:
///   - `NoGravity`: constant-rate motion, discrete one-cell steering
///   - `Gravity`: velocity steering, acceleration-integrated falls
///
/// The displayed level number only selects modes (and the boss):
///
/// | level | player    | platforms | boss |
/// |-------|-----------|-----------|------|
/// | 1     | NoGravity | NoGravity | no   |
/// | 2     | Gravity   | NoGravity | no   |
/// | 3     | Gravity   | Gravity   | yes  |
///
/// ## Collision bands
///
/// All tests use the player's raw (unrounded) position against platform
/// rectangles expressed in open/closed bands:
///   - Top:  `plat.y - 3 < y < plat.y + 1`, `plat.x <= x <= plat.x + w`
///   - Side: `plat.y - 2 < y < plat.y + 1`, `plat.x - 1 <= x <= plat.x + w + 1`
///   - Boss: distance to the boss bounding box's far corner `<= radius`

use super::boss::Boss;
use super::platform::Platform;

// ── Platform constants ──

/// Per-tick platform drift on levels 1–2 (negative = rises on screen).
pub const PLATFORM_BASE_DY: f64 = -0.07;
/// Scales `speed * velocity_y` on level 3.
pub const SPEED_MULTIPLIER: f64 = 0.01;
/// A platform is gone once it rises above this row.
pub const PLATFORM_EXIT_Y: f64 = -3.0;

// ── Player constants ──

/// Constant descent per tick without gravity.
pub const PLAYER_BASE_DY: f64 = 0.07;
/// Horizontal walking velocity under gravity.
pub const PLAYER_BASE_DX: f64 = 0.2;
/// Upward velocity given by a jump.
pub const PLAYER_JUMP_DY: f64 = 0.15;
/// Lift applied the instant a jump starts, clearing the platform band.
pub const PLAYER_JUMP_LIFT: f64 = 0.5;
pub const PLAYER_ACCEL: f64 = 2.0;
pub const PLAYER_TIMESTEP: f64 = 0.001;
/// Rows between a resting player's origin and the platform's top row.
pub const PLAYER_REST_HEIGHT: f64 = 3.0;
/// Dying when `y >= screen_height - PLAYFIELD_BOTTOM_MARGIN`.
pub const PLAYFIELD_BOTTOM_MARGIN: i32 = 5;
/// Dying when `y < PLAYFIELD_TOP`.
pub const PLAYFIELD_TOP: f64 = 2.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PhysicsMode {
    NoGravity,
    Gravity,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Level {
    One,
    Two,
    Three,
}

impl Level {
    pub const MAX: u8 = 3;

    pub fn from_number(n: u8) -> Option<Level> {
        match n {
            1 => Some(Level::One),
            2 => Some(Level::Two),
            3 => Some(Level::Three),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Level::One => 1,
            Level::Two => 2,
            Level::Three => 3,
        }
    }

    /// Next level, wrapping 3 → 1.
    pub fn next(self) -> Level {
        match self {
            Level::One => Level::Two,
            Level::Two => Level::Three,
            Level::Three => Level::One,
        }
    }

    pub fn player_mode(self) -> PhysicsMode {
        match self {
            Level::One => PhysicsMode::NoGravity,
            Level::Two | Level::Three => PhysicsMode::Gravity,
        }
    }

    pub fn platform_mode(self) -> PhysicsMode {
        match self {
            Level::One | Level::Two => PhysicsMode::NoGravity,
            Level::Three => PhysicsMode::Gravity,
        }
    }

    /// Is the boss awake on this level?
    pub fn has_boss(self) -> bool {
        self == Level::Three
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::One
    }
}

// ══════════════════════════════════════════════════════════════
// Collision tests
// ══════════════════════════════════════════════════════════════

/// Index of the first visible platform whose top surface the point overlaps.
pub fn hit_top_platform(platforms: &[Platform], x: f64, y: f64) -> Option<usize> {
    platforms.iter().position(|p| {
        p.visible
            && y > p.y - 3.0 && y < p.y + 1.0
            && x >= p.x && x <= p.x + p.width as f64
    })
}

/// Is the point against the side of any visible platform?
/// Used only to block horizontal motion.
pub fn hit_side_platform(platforms: &[Platform], x: f64, y: f64) -> bool {
    platforms.iter().any(|p| {
        p.visible
            && y > p.y - 2.0 && y < p.y + 1.0
            && x >= p.x - 1.0 && x <= p.x + p.width as f64 + 1.0
    })
}

/// Distance from (x, y) to the boss bounding box's bottom-right corner,
/// `(bx + radius, by + radius)`.
///
/// Known approximation: this is not the disk centre. Kept as-is because
/// it defines the game's difficulty.
pub fn dist_from_boss(bx: f64, by: f64, radius: f64, x: f64, y: f64) -> f64 {
    let dx = bx + radius - x;
    let dy = by + radius - y;
    (dx * dx + dy * dy).sqrt()
}

/// Does a point at (x, y) touch the boss? A hidden (dormant) boss never does.
pub fn hits_boss(boss: &Boss, x: f64, y: f64) -> bool {
    if !boss.sprite.is_visible() { return false; }
    let r = boss.radius() as f64;
    dist_from_boss(boss.sprite.x, boss.sprite.y, r, x, y) <= r
}

// ══════════════════════════════════════════════════════════════
// Clamping
// ══════════════════════════════════════════════════════════════

/// Push `v` up into `[lo, ..)` in whole-cell steps, keeping its fraction.
/// Returns true if it moved.
pub fn nudge_up_to(v: &mut f64, lo: f64) -> bool {
    if *v < lo {
        *v += (lo - *v).ceil();
        true
    } else {
        false
    }
}

/// Push `v` down into `(.., hi]` in whole-cell steps, keeping its fraction.
/// Returns true if it moved.
pub fn nudge_down_to(v: &mut f64, hi: f64) -> bool {
    if *v > hi {
        *v -= (*v - hi).ceil();
        true
    } else {
        false
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn plat(x: f64, y: f64, width: i32) -> Platform {
        Platform::new(x, y, width, true)
    }

    // ── level table ──

    #[test]
    fn level_modes() {
        assert_eq!(Level::One.player_mode(), PhysicsMode::NoGravity);
        assert_eq!(Level::Two.player_mode(), PhysicsMode::Gravity);
        assert_eq!(Level::Three.player_mode(), PhysicsMode::Gravity);
        assert_eq!(Level::Two.platform_mode(), PhysicsMode::NoGravity);
        assert_eq!(Level::Three.platform_mode(), PhysicsMode::Gravity);
        assert!(!Level::Two.has_boss());
        assert!(Level::Three.has_boss());
    }

    #[test]
    fn level_cycles() {
        assert_eq!(Level::One.next(), Level::Two);
        assert_eq!(Level::Three.next(), Level::One);
        assert_eq!(Level::from_number(2), Some(Level::Two));
        assert_eq!(Level::from_number(4), None);
        assert_eq!(Level::Three.number(), Level::MAX);
    }

    // ── top band ──

    #[test]
    fn top_hit_inside_band() {
        let ps = [plat(35.0, 17.0, 8)];
        assert_eq!(hit_top_platform(&ps, 38.0, 16.0), Some(0));
        assert_eq!(hit_top_platform(&ps, 35.0, 14.5), Some(0));
        assert_eq!(hit_top_platform(&ps, 43.0, 17.9), Some(0));
    }

    #[test]
    fn top_band_is_open_vertically() {
        let ps = [plat(35.0, 17.0, 8)];
        assert_eq!(hit_top_platform(&ps, 38.0, 14.0), None);
        assert_eq!(hit_top_platform(&ps, 38.0, 18.0), None);
    }

    #[test]
    fn top_band_is_closed_horizontally() {
        let ps = [plat(35.0, 17.0, 8)];
        assert_eq!(hit_top_platform(&ps, 34.99, 16.0), None);
        assert_eq!(hit_top_platform(&ps, 43.01, 16.0), None);
    }

    #[test]
    fn top_hit_returns_first_match() {
        let ps = [plat(0.0, 10.0, 5), plat(30.0, 17.0, 8), plat(32.0, 16.5, 8)];
        assert_eq!(hit_top_platform(&ps, 33.0, 15.0), Some(1));
    }

    #[test]
    fn invisible_platforms_never_collide() {
        let mut p = plat(35.0, 17.0, 8);
        p.visible = false;
        let ps = [p];
        assert_eq!(hit_top_platform(&ps, 38.0, 16.0), None);
        assert!(!hit_side_platform(&ps, 38.0, 16.0));
    }

    // ── side band ──

    #[test]
    fn side_band_is_wider_but_shallower() {
        let ps = [plat(35.0, 17.0, 8)];
        assert!(hit_side_platform(&ps, 34.0, 16.0));
        assert!(hit_side_platform(&ps, 44.0, 16.0));
        assert!(!hit_side_platform(&ps, 44.5, 16.0));
        // inside the top band, outside the side band
        assert!(!hit_side_platform(&ps, 38.0, 14.5));
        assert_eq!(hit_top_platform(&ps, 38.0, 14.5), Some(0));
    }

    // ── boss distance ──

    #[test]
    fn boss_distance_uses_far_corner() {
        let d = dist_from_boss(10.0, 10.0, 8.0, 15.0, 15.0);
        assert!((d - 18.0f64.sqrt()).abs() < 1e-9);
        assert_eq!(dist_from_boss(10.0, 10.0, 8.0, 18.0, 18.0), 0.0);
    }

    // ── clamping ──

    #[test]
    fn nudges_keep_fraction() {
        let mut v = -0.5;
        assert!(nudge_up_to(&mut v, 0.0));
        assert_eq!(v, 0.5);

        let mut v = -1.0;
        nudge_up_to(&mut v, 0.0);
        assert_eq!(v, 0.0);

        let mut v = 80.5;
        assert!(nudge_down_to(&mut v, 79.0));
        assert_eq!(v, 78.5);

        let mut v = 12.25;
        assert!(!nudge_down_to(&mut v, 79.0));
        assert!(!nudge_up_to(&mut v, 0.0));
        assert_eq!(v, 12.25);
    }
}
