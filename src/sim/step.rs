/// The step function: advances the game by one tick, plus the meta-key
/// handling that moves the game between phases.
///
/// Processing order within a tick:
///   1. Player (steering, physics, landing, boss contact)
///   2. Platform field (fall + exit)
///   3. Boss (appear / drift / sweep)
///   4. Lives bookkeeping if the player died this tick
///
/// Each entity reports whether its rounded position changed; the caller
/// only re-renders when something actually moved.

use crate::domain::key::{Key, MoveDir, SpeedSetting};
use crate::domain::sprite::SpriteError;
use super::event::GameEvent;
use super::world::{GameState, Phase, MSG_EXIT, MSG_GAME_OVER};

/// What a tick did, for the redraw decision.
#[derive(Clone, Debug, Default)]
pub struct TickOutcome {
    pub player_moved: bool,
    pub platforms_moved: bool,
    pub boss_moved: bool,
    pub events: Vec<GameEvent>,
}

impl TickOutcome {
    pub fn needs_redraw(&self) -> bool {
        self.player_moved || self.platforms_moved || self.boss_moved || !self.events.is_empty()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MetaAction {
    Continue,
    Exit,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn tick(state: &mut GameState, movement: Option<MoveDir>) -> TickOutcome {
    let mut out = TickOutcome::default();
    if state.phase != Phase::Playing { return out; }
    state.tick += 1;

    // ── Player ──
    let update = state.player.step(
        movement,
        state.level,
        state.screen,
        state.platforms.platforms(),
        &state.boss,
    );
    out.player_moved = update.moved;
    if update.scored {
        if let Some(platform) = update.landed {
            out.events.push(GameEvent::Scored { platform, score: state.player.score });
        }
    }
    if let Some(cause) = update.death {
        out.events.push(GameEvent::PlayerKilled { cause });
    }

    // ── Platforms ──
    out.platforms_moved = state.platforms.step(state.level, state.speed);

    // ── Boss ──
    let was_appeared = state.boss.has_appeared();
    let was_turning = state.boss.is_turning();
    out.boss_moved = state.boss.step(state.level);
    if !was_appeared && state.boss.has_appeared() {
        log::info!("boss appeared at tick {}", state.tick);
        out.events.push(GameEvent::BossAppeared);
    }
    match (was_turning, state.boss.is_turning()) {
        (false, true) => out.events.push(GameEvent::BossTurnStarted),
        (true, false) => out.events.push(GameEvent::BossTurnFinished),
        _ => {}
    }

    if !state.player.is_alive() {
        lose_life(state);
    }

    out
}

/// Take a life from a dead player and park the game at the next prompt.
fn lose_life(state: &mut GameState) {
    state.lives = state.lives.saturating_sub(1);
    log::info!("life lost: score={} lives left={}", state.player.score, state.lives);
    if state.lives > 0 {
        let msg = format!("You have {} lives remaining! Press any key to reset.", state.lives);
        state.set_phase(Phase::LifeLost, &msg);
    } else {
        log::info!("game over");
        state.set_phase(Phase::GameOver, MSG_GAME_OVER);
    }
}

// ══════════════════════════════════════════════════════════════
// Meta keys
// ══════════════════════════════════════════════════════════════

/// Apply one polled key to the game phase. Movement keys in `Playing`
/// pass through untouched; the caller hands them to `tick`.
pub fn handle_key(state: &mut GameState, key: Option<Key>) -> Result<MetaAction, SpriteError> {
    let key = match key {
        Some(k) => k,
        None => return Ok(MetaAction::Continue),
    };

    match state.phase {
        Phase::AwaitingStart => {
            state.start_playing();
        }

        Phase::Playing => match key {
            Key::Quit => {
                log::info!("quit requested");
                state.set_phase(Phase::Exiting, MSG_EXIT);
            }
            Key::Reset => state.reset()?,
            Key::ChangeLevel => change_level(state)?,
            Key::Speed(setting) => select_speed(state, setting),
            Key::Move(_) | Key::Other => {}
        },

        Phase::LifeLost => state.reset()?,

        Phase::GameOver => {
            if key == Key::Quit {
                state.set_phase(Phase::Exiting, MSG_EXIT);
            } else {
                restart_game(state)?;
            }
        }

        Phase::Exiting => return Ok(MetaAction::Exit),
    }

    Ok(MetaAction::Continue)
}

/// Cycle 1 → 2 → 3 → 1 and start a fresh round.
pub fn change_level(state: &mut GameState) -> Result<(), SpriteError> {
    state.level = state.level.next();
    log::info!("level changed to {}", state.level.number());
    state.reset()
}

/// Full lives, starting level, fresh round.
pub fn restart_game(state: &mut GameState) -> Result<(), SpriteError> {
    state.lives = state.max_lives;
    state.level = state.start_level;
    log::info!("game restarted");
    state.reset()
}

/// Pick a new target speed. Ignored while a previous change is still easing.
pub fn select_speed(state: &mut GameState, setting: SpeedSetting) {
    if state.speed_changing() { return; }
    let p = &state.speed_presets;
    state.desired_speed = match setting {
        SpeedSetting::Slow => p.slow,
        SpeedSetting::Normal => p.normal,
        SpeedSetting::Fast => p.fast,
    };
    if state.speed_changing() {
        log::info!("speed {} -> {}", state.speed, state.desired_speed);
    }
}

/// Move the speed one unit toward the target. Returns true while easing.
pub fn ease_speed(state: &mut GameState) -> bool {
    if state.speed == state.desired_speed { return false; }
    state.speed += (state.desired_speed - state.speed).signum();
    true
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
