/// Events emitted during a simulation tick.
/// The game loop consumes these for logging and lives bookkeeping.

use crate::domain::player::DeathCause;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameEvent {
    Scored { platform: usize, score: u32 },
    PlayerKilled { cause: DeathCause },
    BossAppeared,
    BossTurnStarted,
    BossTurnFinished,
}
