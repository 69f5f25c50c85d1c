/// Logical game keys, independent of the input device.
///
/// The keyboard and the gamepad both translate into `Key`; the simulation
/// only ever sees these.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SpeedSetting {
    Slow,
    Normal,
    Fast,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Key {
    Quit,
    Reset,
    ChangeLevel,
    Speed(SpeedSetting),
    Move(MoveDir),
    /// Any other key. Only meaningful at "press any key" prompts.
    Other,
}

impl Key {
    /// The steering direction carried by this key, if any.
    pub fn as_move(self) -> Option<MoveDir> {
        match self {
            Key::Move(dir) => Some(dir),
            _ => None,
        }
    }
}
