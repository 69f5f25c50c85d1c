/// The boss: a disk-shaped enemy that drifts in from the bottom-left.
///
/// ## Timeline (level 3 only)
///
///   1. **Waiting**: motionless off-screen for `appear_delay` ticks.
///   2. **Drifting**: steps its velocity every tick while `turn_delay_count`
///      counts up to `turn_delay`.
///   3. **Sweeping**: turns 2° per tick (boss convention) until it has
///      turned a full 360°, still stepping every tick.
///   4. **Drifting** again, on whatever heading the sweep ended with.
///
/// The sprite image follows the heading: one of four disks stamped with
/// `^ v < >`.

use rand::Rng;

use super::framebuffer::{Framebuffer, ScreenSize};
use super::physics::Level;
use super::platform::rand_between;
use super::sprite::{Sprite, SpriteError};

pub const MIN_RADIUS: i32 = 5;
pub const MAX_RADIUS: i32 = 15;
/// Degrees turned per sweeping tick.
pub const TURN_STEP_DEGREES: u32 = 2;
pub const FULL_TURN_DEGREES: u32 = 360;
/// Constant rightward drift.
pub const BASE_DX: f64 = 0.1;
/// Upward drift is `-k * UPWARD_DRIFT_UNIT` with `k` in `[1, 20)`.
const UPWARD_DRIFT_UNIT: f64 = 0.005;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Heading {
    Up,
    Down,
    Left,
    Right,
}

impl Heading {
    pub fn glyph(self) -> char {
        match self {
            Heading::Up => '^',
            Heading::Down => 'v',
            Heading::Left => '<',
            Heading::Right => '>',
        }
    }

    /// Heading for a velocity, or `None` on the `|dx| == |dy|` boundary,
    /// where the current image is kept.
    pub fn from_velocity(dx: f64, dy: f64) -> Option<Heading> {
        let (adx, ady) = (dx.abs(), dy.abs());
        if adx > ady {
            Some(if dx >= 0.0 { Heading::Right } else { Heading::Left })
        } else if adx < ady {
            Some(if dx >= 0.0 { Heading::Up } else { Heading::Down })
        } else {
            None
        }
    }
}

/// Rasterize a disk of side `2 * radius`, filled with `glyph`.
///
/// Each cell's offset from the centre cell `(r, r)` is integral; the
/// Euclidean distance is truncated to an integer before comparing against the
/// radius, which slightly fattens the edge compared to a float test.
pub fn disk_bitmap(radius: i32, glyph: char) -> String {
    let diameter = (2 * radius).max(0);
    let mut out = String::with_capacity((diameter * diameter) as usize);
    for row in 0..diameter {
        for col in 0..diameter {
            let dx = radius - col;
            let dy = radius - row;
            let distance = ((dx * dx + dy * dy) as f64).sqrt() as i32;
            out.push(if distance < radius { glyph } else { ' ' });
        }
    }
    out
}

/// The four directional images, owned by the boss and rebuilt with it.
#[derive(Clone, Debug)]
struct DirectionalImages {
    up: String,
    down: String,
    left: String,
    right: String,
}

impl DirectionalImages {
    fn new(radius: i32) -> Self {
        DirectionalImages {
            up: disk_bitmap(radius, Heading::Up.glyph()),
            down: disk_bitmap(radius, Heading::Down.glyph()),
            left: disk_bitmap(radius, Heading::Left.glyph()),
            right: disk_bitmap(radius, Heading::Right.glyph()),
        }
    }

    fn get(&self, heading: Heading) -> &str {
        match heading {
            Heading::Up => &self.up,
            Heading::Down => &self.down,
            Heading::Left => &self.left,
            Heading::Right => &self.right,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Boss {
    pub sprite: Sprite,
    radius: i32,
    images: DirectionalImages,
    heading: Heading,
    pub appear_delay: u32,
    pub appear_delay_count: u32,
    pub turn_delay: u32,
    pub turn_delay_count: u32,
    /// Degrees turned so far in the sweep, capped at 360.
    pub turn_total: u32,
}

impl Boss {
    /// Build a boss with the given geometry and velocity, already appeared
    /// and with no sweep pending.
    pub fn new(x: f64, y: f64, radius: i32, dx: f64, dy: f64) -> Result<Self, SpriteError> {
        let images = DirectionalImages::new(radius);
        let mut sprite = Sprite::new(x, y, 2 * radius, 2 * radius, images.get(Heading::Right))?;
        sprite.dx = dx;
        sprite.dy = dy;
        Ok(Boss {
            sprite,
            radius,
            images,
            heading: Heading::Right,
            appear_delay: 0,
            appear_delay_count: 0,
            turn_delay: 0,
            turn_delay_count: 0,
            turn_total: FULL_TURN_DEGREES,
        })
    }

    /// Fresh boss for a new round: random radius and delays, parked just off
    /// the bottom-left of the screen. Hidden on levels without a boss.
    pub fn setup<R: Rng + ?Sized>(screen: ScreenSize, level: Level, rng: &mut R) -> Result<Self, SpriteError> {
        let radius = rng.random_range(MIN_RADIUS..=MAX_RADIUS);
        let dy = -(rand_between(rng, 1, 20) as f64) * UPWARD_DRIFT_UNIT;
        let mut boss = Boss::new(
            (-2 * radius) as f64,
            screen.height as f64,
            radius,
            BASE_DX,
            dy,
        )?;

        boss.appear_delay = rand_between(rng, 130, 200) as u32;
        boss.turn_delay = boss.appear_delay + rand_between(rng, 140, 300) as u32;
        boss.turn_total = 0;

        if !level.has_boss() {
            boss.sprite.hide();
        }
        Ok(boss)
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn has_appeared(&self) -> bool {
        self.appear_delay_count >= self.appear_delay
    }

    pub fn is_turning(&self) -> bool {
        self.has_appeared()
            && self.turn_delay_count >= self.turn_delay
            && self.turn_total < FULL_TURN_DEGREES
    }

    /// Advance one tick. Returns true if the rounded position changed.
    pub fn step(&mut self, level: Level) -> bool {
        if !self.sprite.is_visible() || !level.has_boss() {
            return false;
        }
        let before = self.sprite.rounded();

        if self.has_appeared() {
            if self.is_turning() {
                self.sprite.turn_boss(TURN_STEP_DEGREES as f64);
                self.turn_total += TURN_STEP_DEGREES;
            } else {
                self.turn_delay_count += 1;
            }
            self.sprite.step();
        } else {
            self.appear_delay_count += 1;
        }

        self.update_image();
        self.sprite.rounded() != before
    }

    fn update_image(&mut self) {
        if let Some(heading) = Heading::from_velocity(self.sprite.dx, self.sprite.dy) {
            self.heading = heading;
            // Same size by construction; the images are 2r × 2r like the sprite.
            if let Err(e) = self.sprite.set_image(self.images.get(heading)) {
                log::error!("boss image mismatch: {e}");
            }
        }
    }

    pub fn draw(&self, fb: &mut Framebuffer) {
        self.sprite.draw(fb);
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
