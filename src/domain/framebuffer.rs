/// Character framebuffer: the virtual screen every entity is composited onto.
///
/// One `char` per cell, row-major. `BLANK` is the empty sentinel and is also
/// the transparent colour for sprite bitmaps.
///
/// ## Clipping
///
/// Every write goes through `plot()`, which silently drops coordinates outside
/// the grid. Entities may therefore sit partly (or entirely) off-screen (the
/// boss spawns left of column 0) without any caller-side bounds checks.
///
/// ## Line drawing
///
/// Orthogonal lines are plotted cell by cell, inclusive of both ends and in
/// either direction. Diagonals walk the dominant axis and accumulate the
/// minor/major slope as an integer error term; the minor coordinate steps
/// whenever the accumulated error reaches one half. This is Bresenham's
/// midpoint rule, exact for every slope (steep lines walk `y`).

pub const BLANK: char = ' ';

/// Dimensions of the display surface, in character cells.
///
/// Spawn geometry is always derived from the current `ScreenSize`, never
/// cached across resets.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ScreenSize {
    pub width: i32,
    pub height: i32,
}

impl ScreenSize {
    pub fn new(width: i32, height: i32) -> Self {
        ScreenSize { width, height }
    }

    /// Largest visible column.
    pub fn max_x(self) -> i32 {
        self.width - 1
    }

    /// Largest visible row.
    pub fn max_y(self) -> i32 {
        self.height - 1
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    cells: Vec<char>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Framebuffer {
            width,
            height,
            cells: vec![BLANK; width * height],
        }
    }

    /// Framebuffer covering a whole screen. Negative sizes yield an empty grid.
    pub fn for_screen(screen: ScreenSize) -> Self {
        Framebuffer::new(screen.width.max(0) as usize, screen.height.max(0) as usize)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> ScreenSize {
        ScreenSize::new(self.width as i32, self.height as i32)
    }

    pub fn clear(&mut self) {
        self.cells.fill(BLANK);
    }

    /// Write `ch` at (x, y). Out-of-bounds writes are ignored.
    #[inline]
    pub fn plot(&mut self, x: i32, y: i32, ch: char) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = ch;
        }
    }

    /// Cell at (x, y), or `None` outside the grid.
    pub fn get(&self, x: i32, y: i32) -> Option<char> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x < self.width && y < self.height {
            Some(self.cells[y * self.width + x])
        } else {
            None
        }
    }

    pub fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, ch: char) {
        if x1 == x2 {
            let step = if y2 >= y1 { 1 } else { -1 };
            let mut y = y1;
            loop {
                self.plot(x1, y, ch);
                if y == y2 { break; }
                y += step;
            }
        } else if y1 == y2 {
            let step = if x2 >= x1 { 1 } else { -1 };
            let mut x = x1;
            loop {
                self.plot(x, y1, ch);
                if x == x2 { break; }
                x += step;
            }
        } else {
            self.draw_diagonal(x1, y1, x2, y2, ch);
        }
    }

    /// Dominant-axis walk with an integer error accumulator.
    ///
    /// `err / major` is the fractional drift of the minor axis; it steps when
    /// `err / major >= 0.5`, i.e. `2 * err >= major`, then drops by one cell.
    fn draw_diagonal(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, ch: char) {
        let dx = x2 - x1;
        let dy = y2 - y1;
        let sx = dx.signum();
        let sy = dy.signum();
        let (adx, ady) = (dx.abs(), dy.abs());

        let (mut x, mut y) = (x1, y1);
        let mut err = 0;
        if adx >= ady {
            for _ in 0..=adx {
                self.plot(x, y, ch);
                err += ady;
                if 2 * err >= adx {
                    y += sy;
                    err -= adx;
                }
                x += sx;
            }
        } else {
            for _ in 0..=ady {
                self.plot(x, y, ch);
                err += adx;
                if 2 * err >= ady {
                    x += sx;
                    err -= ady;
                }
                y += sy;
            }
        }
    }

    /// Write a string left-to-right starting at (x, y), clipped per cell.
    pub fn draw_str(&mut self, x: i32, y: i32, s: &str) {
        for (i, ch) in s.chars().enumerate() {
            self.plot(x + i as i32, y, ch);
        }
    }

    /// Blank a full row.
    pub fn clear_row(&mut self, y: i32) {
        if self.width == 0 { return; }
        self.draw_line(0, y, self.width as i32 - 1, y, BLANK);
    }

    /// Row `y` as a slice of cells.
    pub fn row(&self, y: usize) -> &[char] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[char]> {
        // chunks() panics on 0; an empty buffer has no rows either way
        self.cells.chunks(self.width.max(1))
    }

    /// Render the buffer as newline-separated text (no trailing newline).
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for (i, row) in self.rows().enumerate() {
            if i > 0 { out.push('\n'); }
            out.extend(row.iter());
        }
        out
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
