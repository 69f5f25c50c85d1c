/// Screen transcript: an append-only text log of every presented frame and
/// every key read, for replaying or grading a session offline.
///
/// ## File format
///
/// ```text
/// Frame(80,24,1712345678.123456)
/// <24 rows of exactly 80 chars>
/// EndFrame
/// Char(258,1712345678.150000)
/// ```
///
/// Timestamps are seconds since the Unix epoch. Key codes are
/// curses-compatible: printable keys are their character code, arrows are
/// 258–261.
///
/// The file is opened, appended and closed per record. A failed append is
/// logged once and otherwise ignored; the game never stops over it.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::framebuffer::Framebuffer;

pub struct Transcript {
    path: PathBuf,
    warned: bool,
}

impl Transcript {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Transcript { path: path.into(), warned: false }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record_frame(&mut self, fb: &Framebuffer) {
        let result = self.append(|w| write_frame(w, fb, now_secs()));
        self.report(result);
    }

    pub fn record_key(&mut self, code: i32) {
        let result = self.append(|w| write_key(w, code, now_secs()));
        self.report(result);
    }

    fn append(&self, body: impl FnOnce(&mut dyn Write) -> io::Result<()>) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut buf: Vec<u8> = Vec::new();
        let w: &mut dyn Write = &mut buf;
        body(w)?;
        file.write_all(&buf)
    }

    fn report(&mut self, result: io::Result<()>) {
        if let Err(e) = result {
            if !self.warned {
                log::warn!("transcript append to {} failed: {e}", self.path.display());
                self.warned = true;
            }
        }
    }
}

pub fn write_frame(w: &mut dyn Write, fb: &Framebuffer, t: f64) -> io::Result<()> {
    writeln!(w, "Frame({},{},{t:.6})", fb.width(), fb.height())?;
    for row in fb.rows().take(fb.height()) {
        let line: String = row.iter().collect();
        writeln!(w, "{line}")?;
    }
    writeln!(w, "EndFrame")
}

pub fn write_key(w: &mut dyn Write, code: i32, t: f64) -> io::Result<()> {
    writeln!(w, "Char({code},{t:.6})")
}

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
