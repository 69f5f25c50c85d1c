/// Gamepad input via gilrs, translated into the same `Key`s as the keyboard.
///
/// Mapping (buttons configurable in `[gamepad]` of config.toml):
///   D-pad / Left Stick    →  Move
///   Start                 →  Reset
///   Select                →  Change level
///   (unbound by default)  →  Quit
///   any other button      →  Other (answers "press any key")
///
/// Without the `gamepad` feature this compiles to a pad that never reports
/// anything.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::key::{Key, MoveDir};

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical face/shoulder buttons.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,
    B,
    X,
    Y,
    L1,
    R1,
    L2,
    R2,
    Start,
    Select,
}

const BTN_COUNT: usize = 10;

impl Btn {
    pub fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "L2" | "LT" => Some(Btn::L2),
            "R2" | "RT" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2 => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Button-to-action mapping, loaded from config.
struct ActionMap {
    reset: Vec<Btn>,
    change_level: Vec<Btn>,
    quit: Vec<Btn>,
}

impl ActionMap {
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names.iter().filter_map(|s| {
                let btn = Btn::from_name(s);
                if btn.is_none() {
                    log::warn!("unknown gamepad button name {s:?}");
                }
                btn
            }).collect()
        }
        ActionMap {
            reset: parse_list(&cfg.reset),
            change_level: parse_list(&cfg.change_level),
            quit: parse_list(&cfg.quit),
        }
    }
}

/// Held direction state from one source (d-pad or stick).
#[derive(Clone, Copy, Debug, Default)]
struct Directions {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

impl Directions {
    fn first(self) -> Option<MoveDir> {
        if self.up {
            Some(MoveDir::Up)
        } else if self.down {
            Some(MoveDir::Down)
        } else if self.left {
            Some(MoveDir::Left)
        } else if self.right {
            Some(MoveDir::Right)
        } else {
            None
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    just_pressed: [bool; BTN_COUNT],
    dpad: Directions,
    stick: Directions,
    stick_x: f32,
    stick_y: f32,

    actions: ActionMap,
    pub connected: bool,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(e) => {
                log::info!("gamepad support unavailable: {e}");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            just_pressed: [false; BTN_COUNT],
            dpad: Directions::default(),
            stick: Directions::default(),
            stick_x: 0.0,
            stick_y: 0.0,
            actions: ActionMap::from_config(cfg),
            connected,
        }
    }

    /// Pull pending controller events. Call once per loop iteration.
    pub fn update(&mut self) {
        self.just_pressed = [false; BTN_COUNT];

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => match axis {
                    Axis::LeftStickX => self.stick_x = value,
                    Axis::LeftStickY => self.stick_y = value,
                    _ => {}
                },
                EventType::Connected => {
                    log::info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    log::info!("gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }

        self.stick = Directions {
            up: self.stick_y > STICK_DEADZONE,
            down: self.stick_y < -STICK_DEADZONE,
            left: self.stick_x < -STICK_DEADZONE,
            right: self.stick_x > STICK_DEADZONE,
        };
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, down: bool) {
        match gilrs_btn {
            Button::DPadUp => self.dpad.up = down,
            Button::DPadDown => self.dpad.down = down,
            Button::DPadLeft => self.dpad.left = down,
            Button::DPadRight => self.dpad.right = down,
            other => {
                if let Some(btn) = Btn::from_gilrs(other) {
                    if down {
                        self.just_pressed[btn as usize] = true;
                    }
                }
            }
        }
    }

    /// This iteration's key from the pad, if any. Actions win over
    /// movement; movement repeats while a direction is held.
    pub fn poll_key(&self) -> Option<Key> {
        let pressed = |btns: &[Btn]| btns.iter().any(|&b| self.just_pressed[b as usize]);
        if pressed(&self.actions.quit) {
            Some(Key::Quit)
        } else if pressed(&self.actions.reset) {
            Some(Key::Reset)
        } else if pressed(&self.actions.change_level) {
            Some(Key::ChangeLevel)
        } else if let Some(dir) = self.dpad.first().or(self.stick.first()) {
            Some(Key::Move(dir))
        } else if self.just_pressed.iter().any(|&b| b) {
            Some(Key::Other)
        } else {
            None
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.just_pressed = [false; BTN_COUNT];
        self.dpad = Directions::default();
        self.stick = Directions::default();
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn pad() -> GamepadState {
        let mut gp = GamepadState::new(&GamepadConfig {
            reset: vec!["Start".into()],
            change_level: vec!["Select".into()],
            quit: vec!["Y".into(), "bogus".into()],
        });
        // tests drive the state directly
        #[cfg(feature = "gamepad")]
        { gp.gilrs = None; }
        gp.connected = true;
        gp
    }

    #[test]
    fn button_names() {
        assert_eq!(Btn::from_name("start"), Some(Btn::Start));
        assert_eq!(Btn::from_name("Back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("south"), Some(Btn::A));
        assert_eq!(Btn::from_name("Z"), None);
    }

    #[test]
    fn idle_pad_reports_nothing() {
        let mut gp = pad();
        gp.update();
        assert_eq!(gp.poll_key(), None);
    }

    #[test]
    fn mapped_buttons_become_actions() {
        let mut gp = pad();
        gp.just_pressed[Btn::Start as usize] = true;
        assert_eq!(gp.poll_key(), Some(Key::Reset));

        gp.update();
        gp.just_pressed[Btn::Select as usize] = true;
        assert_eq!(gp.poll_key(), Some(Key::ChangeLevel));

        gp.update();
        gp.just_pressed[Btn::Y as usize] = true;
        assert_eq!(gp.poll_key(), Some(Key::Quit));
    }

    #[test]
    fn unmapped_button_is_any_key() {
        let mut gp = pad();
        gp.just_pressed[Btn::A as usize] = true;
        assert_eq!(gp.poll_key(), Some(Key::Other));
    }

    #[test]
    fn held_direction_repeats_and_dpad_beats_stick() {
        let mut gp = pad();
        gp.stick.left = true;
        assert_eq!(gp.poll_key(), Some(Key::Move(MoveDir::Left)));
        gp.update();
        assert_eq!(gp.poll_key(), Some(Key::Move(MoveDir::Left)));

        gp.dpad.up = true;
        assert_eq!(gp.poll_key(), Some(Key::Move(MoveDir::Up)));

        gp.release_all();
        assert_eq!(gp.poll_key(), None);
    }
}
