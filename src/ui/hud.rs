/// Frame composition: entities, then the HUD, then the phase prompt, all
/// into one `Framebuffer`.
///
/// Layout (W×H screen):
///   row 0     Remaining lives: N                       Time: m:s (col 58)
///   row 1     ---------------------------------------------------------
///   ...       playfield
///   row H-3   ---------------------------------------------------------
///   row H-2   Level N                                  Speed: NORM (col W-13, level 3)
///   row H-1   Score: N
///
/// Prompts are drawn over the finished frame, the way a blocking
/// "press any key" would leave them on screen.

use std::time::Duration;

use crate::domain::framebuffer::Framebuffer;
use crate::domain::physics::Level;
use crate::sim::world::{GameState, Phase};

const TIME_COLUMN: i32 = 58;
const SPEED_LABEL_INSET: i32 = 13;
const BORDER: char = '-';

/// Redraw the whole frame for `state`. `fb` is resized to the state's screen.
pub fn compose(state: &GameState, fb: &mut Framebuffer) {
    if fb.size() != state.screen {
        *fb = Framebuffer::for_screen(state.screen);
    }
    fb.clear();

    state.boss.draw(fb);
    state.platforms.draw(fb);
    state.player.draw(fb);

    draw_status(state, fb);
    draw_prompt(state, fb);
}

fn draw_status(state: &GameState, fb: &mut Framebuffer) {
    let max_x = state.screen.max_x();
    let max_y = state.screen.max_y();

    // ── Score ──
    fb.clear_row(max_y);
    fb.draw_str(0, max_y, &format!("Score: {}", state.player.score));

    // ── Lives + time ──
    fb.clear_row(0);
    fb.draw_str(0, 0, &format!("Remaining lives: {}", state.lives));
    fb.draw_str(TIME_COLUMN, 0, &format_elapsed(state.elapsed()));

    // ── Level + speed ──
    fb.clear_row(max_y - 1);
    fb.draw_str(0, max_y - 1, &format!("Level {}", state.level.number()));
    if state.level == Level::Three {
        fb.draw_str(state.screen.width - SPEED_LABEL_INSET, max_y - 1, state.speed_label());
    }

    // ── Border ──
    fb.draw_line(0, 1, max_x, 1, BORDER);
    fb.draw_line(0, max_y - 2, max_x, max_y - 2, BORDER);
}

fn draw_prompt(state: &GameState, fb: &mut Framebuffer) {
    let max_y = state.screen.max_y();
    match state.phase {
        Phase::Playing => {}
        Phase::AwaitingStart | Phase::LifeLost => fb.draw_str(0, 0, &state.message),
        Phase::GameOver => fb.draw_str(1, max_y / 2, &state.message),
        Phase::Exiting => {
            fb.clear_row(max_y);
            fb.draw_str(0, max_y, &state.message);
        }
    }
}

/// "Time: m:s", whole seconds, no zero padding.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("Time: {}:{}", secs / 60, secs % 60)
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::framebuffer::ScreenSize;
    use crate::sim::world::{MSG_BEGIN, MSG_EXIT, MSG_GAME_OVER};

    const SCREEN: ScreenSize = ScreenSize { width: 80, height: 24 };

    fn state() -> GameState {
        let mut cfg = GameConfig::default();
        cfg.game.seed = Some(11);
        GameState::new(SCREEN, &cfg).unwrap()
    }

    fn row(fb: &Framebuffer, y: usize) -> String {
        fb.row(y).iter().collect()
    }

    fn rendered(state: &GameState) -> Framebuffer {
        let mut fb = Framebuffer::new(0, 0);
        compose(state, &mut fb);
        fb
    }

    #[test]
    fn elapsed_is_unpadded_minutes_and_seconds() {
        assert_eq!(format_elapsed(Duration::ZERO), "Time: 0:0");
        assert_eq!(format_elapsed(Duration::from_millis(125_900)), "Time: 2:5");
        assert_eq!(format_elapsed(Duration::from_secs(600)), "Time: 10:0");
    }

    #[test]
    fn status_rows_while_playing() {
        let mut s = state();
        s.start_playing();
        s.player.score = 4;
        let fb = rendered(&s);

        assert_eq!(fb.size(), SCREEN);
        assert!(row(&fb, 0).starts_with("Remaining lives: 3 "));
        assert_eq!(&row(&fb, 0)[58..67], "Time: 0:0");
        assert_eq!(row(&fb, 1), "-".repeat(80));
        assert_eq!(row(&fb, 21), "-".repeat(80));
        assert_eq!(row(&fb, 22).trim_end(), "Level 1");
        assert_eq!(row(&fb, 23).trim_end(), "Score: 4");
    }

    #[test]
    fn player_is_drawn_at_spawn() {
        let mut s = state();
        s.start_playing();
        let fb = rendered(&s);
        assert_eq!(fb.get(39, 17), Some('0'));
        assert_eq!(fb.get(39, 18), Some('|'));
        assert_eq!(fb.get(39, 19), Some('M'));
    }

    #[test]
    fn speed_label_only_on_level_three() {
        let mut s = state();
        s.start_playing();
        assert!(!row(&rendered(&s), 22).contains("Speed"));

        s.level = Level::Three;
        s.reset().unwrap();
        s.start_playing();
        let fb = rendered(&s);
        assert_eq!(&row(&fb, 22)[67..78], "Speed: NORM");

        s.speed = 150;
        assert_eq!(&row(&rendered(&s), 22)[67..78], "Changing...");
    }

    #[test]
    fn start_prompt_overwrites_lives_row() {
        let s = state();
        let fb = rendered(&s);
        assert!(row(&fb, 0).starts_with(MSG_BEGIN));
        assert_eq!(&row(&fb, 0)[58..67], "Time: 0:0");
    }

    #[test]
    fn life_lost_prompt_on_top_row() {
        let mut s = state();
        s.lives = 2;
        s.set_phase(Phase::LifeLost, "You have 2 lives remaining! Press any key to reset.");
        let fb = rendered(&s);
        assert!(row(&fb, 0).starts_with("You have 2 lives remaining!"));
    }

    #[test]
    fn game_over_prompt_mid_screen() {
        let mut s = state();
        s.set_phase(Phase::GameOver, MSG_GAME_OVER);
        let fb = rendered(&s);
        assert_eq!(&row(&fb, 11)[1..1 + MSG_GAME_OVER.len()], MSG_GAME_OVER);
    }

    #[test]
    fn exit_prompt_replaces_score() {
        let mut s = state();
        s.set_phase(Phase::Exiting, MSG_EXIT);
        let fb = rendered(&s);
        assert_eq!(row(&fb, 23).trim_end(), MSG_EXIT);
    }

    #[test]
    fn framebuffer_follows_screen_size() {
        let mut s = state();
        s.set_screen(ScreenSize::new(60, 20));
        s.reset().unwrap();
        let fb = rendered(&s);
        assert_eq!((fb.width(), fb.height()), (60, 20));
        assert_eq!(row(&fb, 17), "-".repeat(60));
    }
}
