/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to the stock settings if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::physics::Level;

// ── Public Config Struct ──

#[derive(Clone, Debug, Default)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub speed: SpeedConfig,
    pub game: GameplayConfig,
    pub screen: ScreenConfig,
    pub transcript: TranscriptConfig,
    pub logging: LoggingConfig,
    pub gamepad: GamepadConfig,
}

#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub loop_step_ms: u64,   // simulation tick interval
    pub cpu_yield_ms: u64,   // sleep per loop iteration
}

/// Platform speed presets for the `1`/`2`/`3` keys (level 3 only).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpeedConfig {
    pub slow: i32,
    pub normal: i32,
    pub fast: i32,
    pub initial: i32,
}

#[derive(Clone, Debug)]
pub struct GameplayConfig {
    pub lives: u32,
    pub start_level: Level,
    /// `None` = seed from entropy.
    pub seed: Option<u64>,
}

/// Fixed virtual display. `None` = follow the terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScreenConfig {
    pub size: Option<(i32, i32)>,
}

#[derive(Clone, Debug)]
pub struct TranscriptConfig {
    pub enabled: bool,
    pub path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub file: PathBuf,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub reset: Vec<String>,
    pub change_level: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    game: TomlGame,
    #[serde(default)]
    screen: TomlScreen,
    #[serde(default)]
    transcript: TomlTranscript,
    #[serde(default)]
    logging: TomlLogging,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_loop_step")]
    loop_step_ms: u64,
    #[serde(default = "default_cpu_yield")]
    cpu_yield_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_speed_slow")]
    slow: i32,
    #[serde(default = "default_speed_normal")]
    normal: i32,
    #[serde(default = "default_speed_fast")]
    fast: i32,
    #[serde(default = "default_speed_normal")]
    initial: i32,
}

#[derive(Deserialize, Debug)]
struct TomlGame {
    #[serde(default = "default_lives")]
    lives: u32,
    #[serde(default = "default_start_level")]
    start_level: u8,
    #[serde(default)]
    seed: u64,
}

#[derive(Deserialize, Debug, Default)]
struct TomlScreen {
    #[serde(default)]
    width: i32,
    #[serde(default)]
    height: i32,
}

#[derive(Deserialize, Debug)]
struct TomlTranscript {
    #[serde(default)]
    enabled: bool,
    #[serde(default = "default_transcript_path")]
    path: String,
}

#[derive(Deserialize, Debug)]
struct TomlLogging {
    #[serde(default = "default_log_level")]
    level: String,
    #[serde(default = "default_log_file")]
    file: String,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_reset")]
    reset: Vec<String>,
    #[serde(default = "default_pad_change_level")]
    change_level: Vec<String>,
    #[serde(default)]
    quit: Vec<String>,
}

// ── Defaults ──

fn default_loop_step() -> u64 { 25 }
fn default_cpu_yield() -> u64 { 10 }
fn default_speed_slow() -> i32 { 25 }
fn default_speed_normal() -> i32 { 100 }
fn default_speed_fast() -> i32 { 400 }
fn default_lives() -> u32 { 3 }
fn default_start_level() -> u8 { 1 }
fn default_transcript_path() -> String { "platfall_screen.txt".into() }
fn default_log_level() -> String { "info".into() }
fn default_log_file() -> String { "platfall.log".into() }
fn default_pad_reset() -> Vec<String> { vec!["Start".into()] }
fn default_pad_change_level() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            loop_step_ms: default_loop_step(),
            cpu_yield_ms: default_cpu_yield(),
        }
    }
}

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            slow: default_speed_slow(),
            normal: default_speed_normal(),
            fast: default_speed_fast(),
            initial: default_speed_normal(),
        }
    }
}

impl Default for TomlGame {
    fn default() -> Self {
        TomlGame {
            lives: default_lives(),
            start_level: default_start_level(),
            seed: 0,
        }
    }
}

impl Default for TomlTranscript {
    fn default() -> Self {
        TomlTranscript {
            enabled: false,
            path: default_transcript_path(),
        }
    }
}

impl Default for TomlLogging {
    fn default() -> Self {
        TomlLogging {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            reset: default_pad_reset(),
            change_level: default_pad_change_level(),
            quit: vec![],
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        TomlTiming::default().into()
    }
}

impl Default for SpeedConfig {
    fn default() -> Self {
        TomlSpeed::default().into()
    }
}

impl Default for GameplayConfig {
    fn default() -> Self {
        TomlGame::default().into()
    }
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        TomlTranscript::default().into()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        TomlLogging::default().into()
    }
}

impl Default for GamepadConfig {
    fn default() -> Self {
        TomlGamepad::default().into()
    }
}

// ── Schema → Config ──

impl From<TomlTiming> for TimingConfig {
    fn from(t: TomlTiming) -> Self {
        TimingConfig {
            loop_step_ms: t.loop_step_ms.max(1),
            cpu_yield_ms: t.cpu_yield_ms,
        }
    }
}

impl From<TomlSpeed> for SpeedConfig {
    fn from(t: TomlSpeed) -> Self {
        SpeedConfig {
            slow: t.slow,
            normal: t.normal,
            fast: t.fast,
            initial: t.initial,
        }
    }
}

impl From<TomlGame> for GameplayConfig {
    fn from(t: TomlGame) -> Self {
        let start_level = Level::from_number(t.start_level).unwrap_or_else(|| {
            log::warn!("start_level {} out of range, using 1", t.start_level);
            Level::One
        });
        GameplayConfig {
            lives: t.lives.max(1),
            start_level,
            seed: (t.seed != 0).then_some(t.seed),
        }
    }
}

impl From<TomlScreen> for ScreenConfig {
    fn from(t: TomlScreen) -> Self {
        // Both dimensions are needed for an override
        let size = (t.width > 0 && t.height > 0).then_some((t.width, t.height));
        ScreenConfig { size }
    }
}

impl From<TomlTranscript> for TranscriptConfig {
    fn from(t: TomlTranscript) -> Self {
        TranscriptConfig { enabled: t.enabled, path: PathBuf::from(t.path) }
    }
}

impl From<TomlLogging> for LoggingConfig {
    fn from(t: TomlLogging) -> Self {
        LoggingConfig { level: t.level, file: PathBuf::from(t.file) }
    }
}

impl From<TomlGamepad> for GamepadConfig {
    fn from(t: TomlGamepad) -> Self {
        GamepadConfig { reset: t.reset, change_level: t.change_level, quit: t.quit }
    }
}

impl From<TomlConfig> for GameConfig {
    fn from(t: TomlConfig) -> Self {
        GameConfig {
            timing: t.timing.into(),
            speed: t.speed.into(),
            game: t.game.into(),
            screen: t.screen.into(),
            transcript: t.transcript.into(),
            logging: t.logging.into(),
            gamepad: t.gamepad.into(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) XDG data home. Missing file or keys fall back to defaults.
    pub fn load() -> Self {
        load_toml(&candidate_dirs()).into()
    }

    /// Parse a config document. Unknown keys are ignored.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(Into::into)
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data home (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // ~/.local/share/platfall
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/platfall");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
///
/// Runs before the logger exists, so problems go to stderr.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            return read_toml(&path);
        }
    }
    TomlConfig::default()
}

fn read_toml(path: &Path) -> TomlConfig {
    match std::fs::read_to_string(path) {
        Ok(text) => match toml::from_str::<TomlConfig>(&text) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Warning: config.toml parse error: {e}");
                eprintln!("Using default settings.");
                TomlConfig::default()
            }
        },
        Err(e) => {
            eprintln!("Warning: could not read {}: {e}", path.display());
            TomlConfig::default()
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
