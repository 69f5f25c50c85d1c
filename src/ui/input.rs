/// Keyboard input.
///
/// Every pending terminal event is drained once per loop iteration into a
/// queue; the game then takes one key per poll, so a burst of presses is
/// spread over consecutive iterations instead of collapsing into one.
///
/// Only Press/Repeat events count. Release events (reported by terminals
/// with keyboard enhancement) are dropped.

use std::collections::VecDeque;
use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::key::{Key, MoveDir, SpeedSetting};

// ── Curses key codes, as written to the transcript ──

pub const CODE_DOWN: i32 = 258;
pub const CODE_UP: i32 = 259;
pub const CODE_LEFT: i32 = 260;
pub const CODE_RIGHT: i32 = 261;
const CODE_BACKSPACE: i32 = 263;

/// Upper bound on queued keys; older presses are dropped first.
const QUEUE_LIMIT: usize = 32;

pub struct InputState {
    pending: VecDeque<KeyEvent>,
    ctrl_c: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            pending: VecDeque::with_capacity(8),
            ctrl_c: false,
        }
    }

    /// Drain all pending terminal events without blocking.
    pub fn drain_events(&mut self) {
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.push(key);
            }
        }
    }

    fn push(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        if is_ctrl_c(&key) {
            self.ctrl_c = true;
            return;
        }
        if self.pending.len() == QUEUE_LIMIT {
            self.pending.pop_front();
        }
        self.pending.push_back(key);
    }

    /// The oldest unread key, if any.
    pub fn next_key(&mut self) -> Option<KeyCode> {
        self.pending.pop_front().map(|k| k.code)
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.ctrl_c
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

fn is_ctrl_c(k: &KeyEvent) -> bool {
    k.modifiers.contains(KeyModifiers::CONTROL)
        && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
}

// ── Key Mapping ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_RESET: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_LEVEL: &[KeyCode] = &[KeyCode::Char('l'), KeyCode::Char('L')];

/// Translate a terminal key into a game key. Anything unmapped is `Other`.
pub fn key_for(code: KeyCode) -> Key {
    let is = |set: &[KeyCode]| set.contains(&code);
    if is(KEYS_QUIT) {
        Key::Quit
    } else if is(KEYS_RESET) {
        Key::Reset
    } else if is(KEYS_LEVEL) {
        Key::ChangeLevel
    } else if is(KEYS_UP) {
        Key::Move(MoveDir::Up)
    } else if is(KEYS_DOWN) {
        Key::Move(MoveDir::Down)
    } else if is(KEYS_LEFT) {
        Key::Move(MoveDir::Left)
    } else if is(KEYS_RIGHT) {
        Key::Move(MoveDir::Right)
    } else {
        match code {
            KeyCode::Char('1') => Key::Speed(SpeedSetting::Slow),
            KeyCode::Char('2') => Key::Speed(SpeedSetting::Normal),
            KeyCode::Char('3') => Key::Speed(SpeedSetting::Fast),
            _ => Key::Other,
        }
    }
}

/// Curses-compatible numeric code for the transcript, or `None` for keys
/// curses has no single code for.
pub fn curses_code(code: KeyCode) -> Option<i32> {
    match code {
        KeyCode::Char(c) => Some(c as i32),
        KeyCode::Down => Some(CODE_DOWN),
        KeyCode::Up => Some(CODE_UP),
        KeyCode::Left => Some(CODE_LEFT),
        KeyCode::Right => Some(CODE_RIGHT),
        KeyCode::Enter => Some(10),
        KeyCode::Tab => Some(9),
        KeyCode::Esc => Some(27),
        KeyCode::Backspace => Some(CODE_BACKSPACE),
        _ => None,
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn meta_keys() {
        assert_eq!(key_for(KeyCode::Char('q')), Key::Quit);
        assert_eq!(key_for(KeyCode::Char('r')), Key::Reset);
        assert_eq!(key_for(KeyCode::Char('L')), Key::ChangeLevel);
        assert_eq!(key_for(KeyCode::Char('1')), Key::Speed(SpeedSetting::Slow));
        assert_eq!(key_for(KeyCode::Char('2')), Key::Speed(SpeedSetting::Normal));
        assert_eq!(key_for(KeyCode::Char('3')), Key::Speed(SpeedSetting::Fast));
    }

    #[test]
    fn arrows_and_wasd_move() {
        assert_eq!(key_for(KeyCode::Up), Key::Move(MoveDir::Up));
        assert_eq!(key_for(KeyCode::Char('s')), Key::Move(MoveDir::Down));
        assert_eq!(key_for(KeyCode::Left), Key::Move(MoveDir::Left));
        assert_eq!(key_for(KeyCode::Char('D')), Key::Move(MoveDir::Right));
    }

    #[test]
    fn unmapped_keys_are_other() {
        assert_eq!(key_for(KeyCode::Char('x')), Key::Other);
        assert_eq!(key_for(KeyCode::Enter), Key::Other);
        assert_eq!(key_for(KeyCode::F(1)), Key::Other);
    }

    #[test]
    fn transcript_codes_follow_curses() {
        assert_eq!(curses_code(KeyCode::Down), Some(258));
        assert_eq!(curses_code(KeyCode::Up), Some(259));
        assert_eq!(curses_code(KeyCode::Left), Some(260));
        assert_eq!(curses_code(KeyCode::Right), Some(261));
        assert_eq!(curses_code(KeyCode::Char('q')), Some(113));
        assert_eq!(curses_code(KeyCode::F(5)), None);
    }

    #[test]
    fn queue_yields_one_key_per_poll() {
        let mut input = InputState::new();
        input.push(press(KeyCode::Char('1')));
        input.push(press(KeyCode::Left));
        assert_eq!(input.next_key(), Some(KeyCode::Char('1')));
        assert_eq!(input.next_key(), Some(KeyCode::Left));
        assert_eq!(input.next_key(), None);
    }

    #[test]
    fn releases_are_dropped_and_ctrl_c_is_flagged() {
        let mut input = InputState::new();
        input.push(KeyEvent::new_with_kind_and_state(
            KeyCode::Left,
            KeyModifiers::NONE,
            KeyEventKind::Release,
            KeyEventState::NONE,
        ));
        assert_eq!(input.next_key(), None);

        input.push(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(input.ctrl_c_pressed());
        assert_eq!(input.next_key(), None);
    }

    #[test]
    fn queue_drops_oldest_when_full() {
        let mut input = InputState::new();
        for _ in 0..QUEUE_LIMIT {
            input.push(press(KeyCode::Char('a')));
        }
        input.push(press(KeyCode::Char('z')));
        let mut last = None;
        let mut n = 0;
        while let Some(k) = input.next_key() {
            last = Some(k);
            n += 1;
        }
        assert_eq!(n, QUEUE_LIMIT);
        assert_eq!(last, Some(KeyCode::Char('z')));
    }
}
