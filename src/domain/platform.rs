/// Platforms and the platform field.
///
/// ## Chained layout
///
/// The field is a fixed array of `CAPACITY` platforms. Slot 0 sits centered
/// near the bottom of the screen; every later slot is spawned relative to the
/// slot before it:
///   - odd index  → `spawn_under` (somewhere 5–9 rows lower, any column)
///   - even index → `spawn_next`  (to the right, wrapping at the screen edge)
///
/// Slots 1.. are safe with probability 13/20. Slot 0 is always safe.
///
/// ## Lifecycle
///
/// Platforms drift upwards every tick and become invisible for good once they
/// pass `PLATFORM_EXIT_Y`. Nothing respawns until the next full `initialize`.

use rand::Rng;

use super::framebuffer::{Framebuffer, ScreenSize};
use super::physics::{Level, PhysicsMode, PLATFORM_BASE_DY, PLATFORM_EXIT_Y, SPEED_MULTIPLIER};

pub const MIN_WIDTH: i32 = 5;
pub const MAX_WIDTH: i32 = 10;

/// Out of `SAFE_ROLL_RANGE`, rolls below `SAFE_ROLL_THRESHOLD` are safe.
const SAFE_ROLL_THRESHOLD: i32 = 13;
const SAFE_ROLL_RANGE: i32 = 20;

/// Uniform integer in `[first, last)`. An empty range yields `first`.
pub fn rand_between<R: Rng + ?Sized>(rng: &mut R, first: i32, last: i32) -> i32 {
    if last <= first {
        first
    } else {
        rng.random_range(first..last)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Platform {
    pub x: f64,
    pub y: f64,
    /// Per-tick vertical velocity, used on gravity levels.
    pub dy: f64,
    pub width: i32,
    pub safe: bool,
    pub visible: bool,
}

impl Platform {
    pub fn new(x: f64, y: f64, width: i32, safe: bool) -> Self {
        Platform {
            x, y,
            dy: PLATFORM_BASE_DY,
            width,
            safe,
            visible: true,
        }
    }

    /// Fresh slot: random width, centered horizontally, four rows from the bottom.
    pub fn centered<R: Rng + ?Sized>(screen: ScreenSize, rng: &mut R) -> Self {
        let width = rng.random_range(MIN_WIDTH..=MAX_WIDTH);
        let x = (screen.width - 1) / 2 - width / 2;
        let y = screen.height - 4;
        Platform::new(x as f64, y as f64, width, true)
    }

    pub fn rounded(&self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }

    pub fn glyph(&self) -> char {
        if self.safe { '=' } else { 'x' }
    }

    fn fall(&mut self, mode: PhysicsMode, speed: i32) {
        match mode {
            PhysicsMode::NoGravity => self.y += PLATFORM_BASE_DY,
            PhysicsMode::Gravity => self.y += self.dy * speed as f64 * SPEED_MULTIPLIER,
        }
    }

    /// Two stacked rows spanning `x ..= x + width`.
    pub fn draw(&self, fb: &mut Framebuffer) {
        let ch = self.glyph();
        let (x, y) = (self.x as i32, self.y as i32);
        let right = (self.x + self.width as f64) as i32;
        fb.draw_line(x, y, right, y, ch);
        fb.draw_line(x, y + 1, right, y + 1, ch);
    }
}

/// Place `out` 5–9 rows below `prev`, anywhere that keeps it on screen.
pub fn spawn_under<R: Rng + ?Sized>(prev: &Platform, out: &mut Platform, screen: ScreenSize, rng: &mut R) {
    let y0 = prev.y.round() as i32;
    out.x = rand_between(rng, 0, screen.width - out.width) as f64;
    out.y = rand_between(rng, y0 + 5, y0 + 10) as f64;
}

/// Place `out` at least four columns right of `prev`, wrapping past the
/// right edge, and 0–5 rows lower.
pub fn spawn_next<R: Rng + ?Sized>(prev: &Platform, out: &mut Platform, screen: ScreenSize, rng: &mut R) {
    let threshold = screen.width - (prev.width + out.width);
    let offset = rand_between(rng, 4, threshold);
    let wrap = screen.width - 1;
    let raw = (prev.x + prev.width as f64 + offset as f64) as i32;
    out.x = if wrap > 0 { raw.rem_euclid(wrap) } else { 0 } as f64;
    out.y = prev.y + rand_between(rng, 0, 6) as f64;
}

#[derive(Clone, Debug)]
pub struct PlatformField {
    platforms: Vec<Platform>,
}

impl PlatformField {
    pub const CAPACITY: usize = 25;

    pub fn new<R: Rng + ?Sized>(screen: ScreenSize, rng: &mut R) -> Self {
        let mut field = PlatformField { platforms: Vec::with_capacity(Self::CAPACITY) };
        field.initialize(screen, rng);
        field
    }

    /// Build a field from explicit platforms (tests, scripted scenarios).
    pub fn from_platforms(platforms: Vec<Platform>) -> Self {
        PlatformField { platforms }
    }

    /// Reset every slot, then lay out the spawn chain.
    pub fn initialize<R: Rng + ?Sized>(&mut self, screen: ScreenSize, rng: &mut R) {
        self.platforms.clear();
        for _ in 0..Self::CAPACITY {
            self.platforms.push(Platform::centered(screen, rng));
        }

        for i in 1..self.platforms.len() {
            let (done, rest) = self.platforms.split_at_mut(i);
            let prev = &done[i - 1];
            let out = &mut rest[0];
            if i % 2 == 0 {
                spawn_next(prev, out, screen, rng);
            } else {
                spawn_under(prev, out, screen, rng);
            }
            out.safe = rand_between(rng, 0, SAFE_ROLL_RANGE) < SAFE_ROLL_THRESHOLD;
        }
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn get(&self, index: usize) -> Option<&Platform> {
        self.platforms.get(index)
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    pub fn visible_count(&self) -> usize {
        self.platforms.iter().filter(|p| p.visible).count()
    }

    /// Advance every visible platform one tick. Returns true if any
    /// platform's rounded position changed.
    pub fn step(&mut self, level: Level, speed: i32) -> bool {
        let mode = level.platform_mode();
        let mut moved = false;
        for p in self.platforms.iter_mut().filter(|p| p.visible) {
            let before = p.rounded();
            p.fall(mode, speed);
            if p.y < PLATFORM_EXIT_Y {
                p.visible = false;
            }
            moved |= p.rounded() != before;
        }
        moved
    }

    pub fn draw(&self, fb: &mut Framebuffer) {
        for p in self.platforms.iter().filter(|p| p.visible) {
            p.draw(fb);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const SCREEN: ScreenSize = ScreenSize { width: 80, height: 24 };

    fn rng(seed: u64) -> Pcg32 {
        Pcg32::seed_from_u64(seed)
    }

    // ── initialize ──

    #[test]
    fn initialize_fills_capacity_and_keeps_first_slot_centered() {
        let field = PlatformField::new(SCREEN, &mut rng(1));
        assert_eq!(field.len(), PlatformField::CAPACITY);
        let first = &field.platforms()[0];
        assert!(first.safe);
        assert!(first.visible);
        assert_eq!(first.y, 20.0);
        assert_eq!(first.x, (39 - first.width / 2) as f64);
        assert_eq!(first.dy, PLATFORM_BASE_DY);
    }

    #[test]
    fn initialize_widths_in_range() {
        let field = PlatformField::new(SCREEN, &mut rng(7));
        for p in field.platforms() {
            assert!((MIN_WIDTH..=MAX_WIDTH).contains(&p.width), "width {}", p.width);
        }
    }

    #[test]
    fn initialize_is_deterministic_for_a_seed() {
        let a = PlatformField::new(SCREEN, &mut rng(42));
        let b = PlatformField::new(SCREEN, &mut rng(42));
        assert_eq!(a.platforms(), b.platforms());
    }

    #[test]
    fn chain_alternates_under_and_next() {
        let field = PlatformField::new(SCREEN, &mut rng(3));
        let ps = field.platforms();
        for i in 1..ps.len() {
            let prev_y = ps[i - 1].y.round();
            if i % 2 == 1 {
                assert!(ps[i].y >= prev_y + 5.0 && ps[i].y < prev_y + 10.0, "slot {i}");
            } else {
                assert!(ps[i].y >= ps[i - 1].y && ps[i].y < ps[i - 1].y + 6.0, "slot {i}");
            }
        }
    }

    #[test]
    fn hazards_appear_over_many_seeds() {
        let mut safe = 0;
        let mut total = 0;
        for seed in 0..40 {
            let field = PlatformField::new(SCREEN, &mut rng(seed));
            for p in &field.platforms()[1..] {
                total += 1;
                if p.safe { safe += 1; }
            }
        }
        let ratio = safe as f64 / total as f64;
        assert!(ratio > 0.5 && ratio < 0.8, "safe ratio {ratio}");
    }

    // ── step ──

    #[test]
    fn constant_rise_on_early_levels() {
        let mut field = PlatformField::from_platforms(vec![Platform::new(10.0, 10.0, 6, true)]);
        field.step(Level::Two, 400);
        assert!((field.platforms()[0].y - (10.0 + PLATFORM_BASE_DY)).abs() < 1e-12);
    }

    #[test]
    fn speed_scales_rise_on_level_three() {
        let mut slow = PlatformField::from_platforms(vec![Platform::new(10.0, 10.0, 6, true)]);
        let mut fast = slow.clone();
        slow.step(Level::Three, 25);
        fast.step(Level::Three, 400);
        let slow_dy = slow.platforms()[0].y - 10.0;
        let fast_dy = fast.platforms()[0].y - 10.0;
        assert!((slow_dy - (-0.07 * 0.25)).abs() < 1e-12);
        assert!((fast_dy - (-0.07 * 4.0)).abs() < 1e-12);
    }

    #[test]
    fn step_reports_rounded_movement_only() {
        let mut field = PlatformField::from_platforms(vec![Platform::new(10.0, 10.0, 6, true)]);
        // 10.0 → 9.93: still rounds to 10
        assert!(!field.step(Level::One, 100));
        let mut field = PlatformField::from_platforms(vec![Platform::new(10.0, 10.52, 6, true)]);
        // 10.52 → 10.45: 11 → 10
        assert!(field.step(Level::One, 100));
    }

    #[test]
    fn platform_vanishes_above_top_and_stays_gone() {
        let mut field = PlatformField::from_platforms(vec![Platform::new(10.0, -2.95, 6, true)]);
        field.step(Level::One, 100);
        assert!(!field.platforms()[0].visible);
        let y = field.platforms()[0].y;
        field.step(Level::One, 100);
        assert_eq!(field.platforms()[0].y, y);
        assert_eq!(field.visible_count(), 0);
    }

    // ── draw ──

    #[test]
    fn draw_two_rows_with_safety_glyph() {
        let mut fb = Framebuffer::new(12, 4);
        let field = PlatformField::from_platforms(vec![
            Platform::new(1.0, 0.0, 3, true),
            Platform::new(6.0, 2.0, 2, false),
        ]);
        field.draw(&mut fb);
        assert_eq!(fb.to_text(), " ====       \n ====       \n      xxx   \n      xxx   ");
    }

    #[test]
    fn hidden_platforms_are_not_drawn() {
        let mut fb = Framebuffer::new(8, 2);
        let mut p = Platform::new(0.0, 0.0, 5, true);
        p.visible = false;
        PlatformField::from_platforms(vec![p]).draw(&mut fb);
        assert_eq!(fb, Framebuffer::new(8, 2));
    }

    // ── spawn bounds ──

    proptest! {
        #[test]
        fn spawn_under_bounds(seed in any::<u64>(), px in 0i32..70, py in -3.0f64..30.0, w in 5i32..=10) {
            let mut r = rng(seed);
            let prev = Platform::new(px as f64, py, 8, true);
            let mut out = Platform::new(0.0, 0.0, w, true);
            spawn_under(&prev, &mut out, SCREEN, &mut r);
            let y0 = py.round();
            prop_assert!(out.y >= y0 + 5.0 && out.y < y0 + 10.0);
            prop_assert!(out.x >= 0.0 && out.x < (SCREEN.width - w) as f64);
        }

        #[test]
        fn spawn_next_wraps_on_screen(seed in any::<u64>(), px in 0i32..79, pw in 5i32..=10, w in 5i32..=10) {
            let mut r = rng(seed);
            let prev = Platform::new(px as f64, 12.0, pw, true);
            let mut out = Platform::new(0.0, 0.0, w, true);
            spawn_next(&prev, &mut out, SCREEN, &mut r);
            prop_assert!(out.x >= 0.0 && out.x <= (SCREEN.width - 1) as f64);
            prop_assert!(out.y >= 12.0 && out.y < 18.0);
        }

        #[test]
        fn spawn_is_reproducible(seed in any::<u64>()) {
            let prev = Platform::new(30.0, 10.0, 7, true);
            let mut a = Platform::new(0.0, 0.0, 6, true);
            let mut b = a.clone();
            spawn_next(&prev, &mut a, SCREEN, &mut rng(seed));
            spawn_next(&prev, &mut b, SCREEN, &mut rng(seed));
            prop_assert_eq!(a, b);
        }
    }

    #[test]
    fn tiny_screen_does_not_panic() {
        let tiny = ScreenSize::new(6, 5);
        let field = PlatformField::new(tiny, &mut rng(9));
        assert_eq!(field.len(), PlatformField::CAPACITY);
        for p in &field.platforms()[1..] {
            assert!(p.x >= 0.0);
        }
    }
}
