/// Presentation layer: diff-based terminal output of a composed `Framebuffer`.
///
/// How it works:
///   1. The game composes each frame into a `Framebuffer` (see `hud`)
///   2. `present()` compares it cell by cell with what the terminal shows
///   3. Changed cells are grouped into horizontal runs; each run is one
///      `MoveTo` + `Print`
///   4. All commands are batched with `queue!`, flushed once at the end
///
/// The framebuffer may be larger than the terminal (fixed virtual screen in
/// config.toml); only the top-left portion that fits is shown.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::Print,
    terminal::{self, Clear, ClearType},
};

use crate::domain::framebuffer::{Framebuffer, ScreenSize};

const FALLBACK_SIZE: (u16, u16) = (80, 24);

/// A horizontal stretch of changed cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Run {
    pub x: usize,
    pub y: usize,
    pub text: String,
}

/// What the terminal currently shows. `None` cells are unknown and always
/// repainted.
struct ShownCells {
    width: usize,
    height: usize,
    cells: Vec<Option<char>>,
}

impl ShownCells {
    fn new(width: usize, height: usize) -> Self {
        ShownCells { width, height, cells: vec![None; width * height] }
    }

    fn get(&self, x: usize, y: usize) -> Option<char> {
        self.cells[y * self.width + x]
    }

    fn set(&mut self, x: usize, y: usize, ch: char) {
        self.cells[y * self.width + x] = Some(ch);
    }

    fn invalidate(&mut self) {
        self.cells.fill(None);
    }
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    shown: ShownCells,
    frame_size: Option<ScreenSize>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            shown: ShownCells::new(0, 0),
            frame_size: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            Clear(ClearType::All)
        )?;
        let size = terminal_size();
        self.shown = ShownCells::new(size.width as usize, size.height as usize);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    /// Bring the terminal in line with `fb`.
    pub fn present(&mut self, fb: &Framebuffer) -> io::Result<()> {
        // Detect terminal resize
        let size = terminal_size();
        let (tw, th) = (size.width as usize, size.height as usize);
        if tw != self.shown.width || th != self.shown.height {
            log::debug!("terminal resized to {tw}x{th}");
            self.shown = ShownCells::new(tw, th);
            queue!(self.writer, Clear(ClearType::All))?;
        }
        // A smaller frame would leave stale cells outside it
        if self.frame_size != Some(fb.size()) {
            self.frame_size = Some(fb.size());
            self.shown.invalidate();
            queue!(self.writer, Clear(ClearType::All))?;
        }

        for run in changed_runs(fb, &self.shown) {
            queue!(self.writer, MoveTo(run.x as u16, run.y as u16), Print(&run.text))?;
            for (i, ch) in run.text.chars().enumerate() {
                self.shown.set(run.x + i, run.y, ch);
            }
        }

        self.writer.flush()
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Current terminal size, or 80×24 when it cannot be queried.
pub fn terminal_size() -> ScreenSize {
    let (w, h) = terminal::size().unwrap_or(FALLBACK_SIZE);
    ScreenSize::new(w as i32, h as i32)
}

/// Runs of cells in `fb` that differ from `shown`, clipped to the smaller
/// of the two grids.
fn changed_runs(fb: &Framebuffer, shown: &ShownCells) -> Vec<Run> {
    let w = fb.width().min(shown.width);
    let h = fb.height().min(shown.height);
    let mut runs = Vec::new();

    for y in 0..h {
        let row = fb.row(y);
        let mut current: Option<Run> = None;
        for (x, &ch) in row.iter().enumerate().take(w) {
            if shown.get(x, y) == Some(ch) {
                if let Some(run) = current.take() {
                    runs.push(run);
                }
                continue;
            }
            match current.as_mut() {
                Some(run) => run.text.push(ch),
                None => current = Some(Run { x, y, text: ch.to_string() }),
            }
        }
        if let Some(run) = current {
            runs.push(run);
        }
    }
    runs
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
