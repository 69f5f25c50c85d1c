/// Sprites: positioned bitmaps with their own velocity.
///
/// Position and velocity are continuous (f64). Motion accumulates sub-cell
/// fractions; the sprite only appears to move once its *rounded* position
/// changes, which is what every entity's "moved" check compares.
///
/// The bitmap is row-major and always exactly `width * height` cells. Spaces
/// are transparent when composited.

use thiserror::Error;

use super::framebuffer::{Framebuffer, BLANK};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpriteError {
    #[error("sprite dimensions must be positive, got {width}x{height}")]
    InvalidDimension { width: i32, height: i32 },
    #[error("bitmap holds {actual} cells but a {width}x{height} sprite needs {expected}")]
    InvalidBitmap { width: usize, height: usize, expected: usize, actual: usize },
}

/// Velocity vector, in cells per tick.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Velocity {
    pub dx: f64,
    pub dy: f64,
}

impl Velocity {
    pub fn new(dx: f64, dy: f64) -> Self {
        Velocity { dx, dy }
    }

    /// Forward turn: `[c -s; s c]`, counter-clockwise in maths axes.
    pub fn rotate_ccw_standard(self, degrees: f64) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Velocity {
            dx: c * self.dx - s * self.dy,
            dy: s * self.dx + c * self.dy,
        }
    }

    /// Boss turn: `[c s; -s c]`, the mirror image of the forward turn.
    ///
    /// With y growing downwards this sweeps the boss round a conventional
    /// on-screen circle. Kept separate from `rotate_ccw_standard` on purpose;
    /// the two must not be unified.
    pub fn rotate_boss_convention(self, degrees: f64) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Velocity {
            dx: c * self.dx + s * self.dy,
            dy: -s * self.dx + c * self.dy,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Sprite {
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    width: usize,
    height: usize,
    visible: bool,
    bitmap: Vec<char>,
}

impl Sprite {
    pub fn new(x: f64, y: f64, width: i32, height: i32, bitmap: &str) -> Result<Self, SpriteError> {
        if width <= 0 || height <= 0 {
            return Err(SpriteError::InvalidDimension { width, height });
        }
        let (width, height) = (width as usize, height as usize);
        let bitmap = check_bitmap(width, height, bitmap)?;
        Ok(Sprite {
            x, y,
            dx: 0.0,
            dy: 0.0,
            width,
            height,
            visible: true,
            bitmap,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bitmap(&self) -> &[char] {
        &self.bitmap
    }

    /// Replace the image. The new bitmap must keep the sprite's size.
    pub fn set_image(&mut self, bitmap: &str) -> Result<(), SpriteError> {
        self.bitmap = check_bitmap(self.width, self.height, bitmap)?;
        Ok(())
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub fn velocity(&self) -> Velocity {
        Velocity::new(self.dx, self.dy)
    }

    pub fn turn_to(&mut self, v: Velocity) {
        self.dx = v.dx;
        self.dy = v.dy;
    }

    /// Generic sprite turn (forward convention).
    pub fn turn(&mut self, degrees: f64) {
        let v = self.velocity().rotate_ccw_standard(degrees);
        self.turn_to(v);
    }

    /// Boss turn (mirrored convention).
    pub fn turn_boss(&mut self, degrees: f64) {
        let v = self.velocity().rotate_boss_convention(degrees);
        self.turn_to(v);
    }

    /// Advance by one velocity step. No rounding.
    pub fn step(&mut self) {
        self.x += self.dx;
        self.y += self.dy;
    }

    /// Nearest cell to the continuous position.
    #[inline]
    pub fn rounded(&self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }

    pub fn draw(&self, fb: &mut Framebuffer) {
        if !self.visible { return; }
        let (x, y) = self.rounded();
        for (row, line) in self.bitmap.chunks(self.width).enumerate() {
            for (col, &ch) in line.iter().enumerate() {
                if ch != BLANK {
                    fb.plot(x + col as i32, y + row as i32, ch);
                }
            }
        }
    }
}

fn check_bitmap(width: usize, height: usize, bitmap: &str) -> Result<Vec<char>, SpriteError> {
    let cells: Vec<char> = bitmap.chars().collect();
    let expected = width * height;
    if cells.len() != expected {
        return Err(SpriteError::InvalidBitmap { width, height, expected, actual: cells.len() });
    }
    Ok(cells)
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn close(a: Velocity, b: Velocity) -> bool {
        (a.dx - b.dx).abs() < 1e-6 && (a.dy - b.dy).abs() < 1e-6
    }

    // ── construction ──

    #[test]
    fn create_rejects_non_positive_dimensions() {
        assert_eq!(
            Sprite::new(0.0, 0.0, 0, 3, "").unwrap_err(),
            SpriteError::InvalidDimension { width: 0, height: 3 },
        );
        assert!(matches!(
            Sprite::new(0.0, 0.0, 2, -1, ""),
            Err(SpriteError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn create_rejects_wrong_bitmap_length() {
        let err = Sprite::new(0.0, 0.0, 2, 2, "abc").unwrap_err();
        assert_eq!(err, SpriteError::InvalidBitmap { width: 2, height: 2, expected: 4, actual: 3 });
    }

    #[test]
    fn create_defaults() {
        let s = Sprite::new(1.5, 2.5, 1, 3, "0|M").unwrap();
        assert!(s.is_visible());
        assert_eq!(s.velocity(), Velocity::default());
        assert_eq!(s.bitmap(), &['0', '|', 'M']);
    }

    #[test]
    fn set_image_keeps_size_invariant() {
        let mut s = Sprite::new(0.0, 0.0, 2, 1, "ab").unwrap();
        assert!(s.set_image("abc").is_err());
        assert_eq!(s.bitmap(), &['a', 'b']);
        s.set_image("cd").unwrap();
        assert_eq!(s.bitmap(), &['c', 'd']);
    }

    // ── drawing ──

    #[test]
    fn draw_rounds_position_and_skips_transparent_cells() {
        let mut fb = Framebuffer::new(6, 4);
        fb.plot(2, 1, '.');
        let s = Sprite::new(1.6, 0.5, 2, 2, "a  b").unwrap();
        s.draw(&mut fb);
        // (1.6, 0.5) rounds to (2, 1)
        assert_eq!(fb.get(2, 1), Some('a'));
        assert_eq!(fb.get(3, 1), Some(BLANK));
        assert_eq!(fb.get(2, 2), Some(BLANK));
        assert_eq!(fb.get(3, 2), Some('b'));
    }

    #[test]
    fn transparent_cell_keeps_underlying_char() {
        let mut fb = Framebuffer::new(3, 1);
        fb.draw_str(0, 0, "xyz");
        let s = Sprite::new(0.0, 0.0, 3, 1, "a c").unwrap();
        s.draw(&mut fb);
        assert_eq!(fb.to_text(), "ayc");
    }

    #[test]
    fn hidden_sprite_draws_nothing() {
        let mut fb = Framebuffer::new(3, 3);
        let mut s = Sprite::new(0.0, 0.0, 1, 1, "@").unwrap();
        s.hide();
        s.draw(&mut fb);
        assert_eq!(fb, Framebuffer::new(3, 3));
        s.show();
        s.draw(&mut fb);
        assert_eq!(fb.get(0, 0), Some('@'));
    }

    #[test]
    fn draw_clips_at_edges() {
        let mut fb = Framebuffer::new(2, 2);
        let s = Sprite::new(-1.0, 1.0, 2, 2, "abcd").unwrap();
        s.draw(&mut fb);
        assert_eq!(fb.to_text(), "  \nb ");
    }

    // ── motion ──

    #[test]
    fn step_accumulates_fractions() {
        let mut s = Sprite::new(0.0, 0.0, 1, 1, "@").unwrap();
        s.turn_to(Velocity::new(0.3, -0.2));
        s.step();
        assert_eq!(s.rounded(), (0, 0));
        s.step();
        assert_eq!(s.rounded(), (1, 0));
        assert!((s.x - 0.6).abs() < EPS);
        assert!((s.y + 0.4).abs() < EPS);
    }

    #[test]
    fn quarter_turns_go_opposite_ways() {
        let v = Velocity::new(1.0, 0.0);
        assert!(close(v.rotate_ccw_standard(90.0), Velocity::new(0.0, 1.0)));
        assert!(close(v.rotate_boss_convention(90.0), Velocity::new(0.0, -1.0)));
    }

    #[test]
    fn zero_velocity_stays_zero() {
        let mut s = Sprite::new(0.0, 0.0, 1, 1, "@").unwrap();
        s.turn(37.0);
        s.turn_boss(123.0);
        assert_eq!(s.velocity(), Velocity::default());
    }

    proptest! {
        #[test]
        fn zero_degree_turn_is_identity(dx in -5.0f64..5.0, dy in -5.0f64..5.0) {
            let v = Velocity::new(dx, dy);
            prop_assert!(close(v.rotate_ccw_standard(0.0), v));
            prop_assert!(close(v.rotate_boss_convention(0.0), v));
        }

        #[test]
        fn full_circle_in_two_degree_steps_returns_home(dx in -5.0f64..5.0, dy in -5.0f64..5.0) {
            let start = Velocity::new(dx, dy);
            let mut fwd = start;
            let mut boss = start;
            for _ in 0..180 {
                fwd = fwd.rotate_ccw_standard(2.0);
                boss = boss.rotate_boss_convention(2.0);
            }
            prop_assert!(close(fwd, start));
            prop_assert!(close(boss, start));
        }
    }
}
