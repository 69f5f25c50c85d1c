/// Entry point and game loop.

use std::fs::File;

use env_logger::{Env, Target};

use platfall::config::{GameConfig, LoggingConfig};
use platfall::domain::framebuffer::{Framebuffer, ScreenSize};
use platfall::domain::key::MoveDir;
use platfall::sim::event::GameEvent;
use platfall::sim::step::{self, MetaAction};
use platfall::sim::timer::{self, IntervalTimer};
use platfall::sim::transcript::Transcript;
use platfall::sim::world::{GameState, Phase};
use platfall::ui::gamepad::GamepadState;
use platfall::ui::hud;
use platfall::ui::input::{curses_code, key_for, InputState};
use platfall::ui::renderer::{terminal_size, Renderer};

fn main() {
    let config = GameConfig::load();
    init_logging(&config.logging);

    let screen = match config.screen.size {
        Some((w, h)) => ScreenSize::new(w, h),
        None => terminal_size(),
    };

    let mut state = match GameState::new(screen, &config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Game setup failed: {e}");
            return;
        }
    };

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut state, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("game loop failed: {e}");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Platfall!");
    println!("Final Score: {}", state.player.score);
}

/// Log to a file; the terminal belongs to the game. `RUST_LOG` overrides
/// the configured level. No log file, no logging.
fn init_logging(cfg: &LoggingConfig) {
    let file = match File::create(&cfg.file) {
        Ok(f) => f,
        Err(_) => return,
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(cfg.level.as_str()))
        .target(Target::Pipe(Box::new(file)))
        .init();
}

fn game_loop(
    state: &mut GameState,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new(&config.gamepad);
    let mut transcript = config
        .transcript
        .enabled
        .then(|| Transcript::new(&config.transcript.path));
    let mut timer = IntervalTimer::from_millis(config.timing.loop_step_ms);
    let mut fb = Framebuffer::for_screen(state.screen);

    let mut pending_move: Option<MoveDir> = None;
    let mut dirty = true;

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }

        // New rounds follow the terminal unless the screen is fixed.
        if config.screen.size.is_none() {
            state.set_screen(terminal_size());
        }

        let key = match kb.next_key() {
            Some(code) => {
                if let (Some(t), Some(c)) = (transcript.as_mut(), curses_code(code)) {
                    t.record_key(c);
                }
                Some(key_for(code))
            }
            None => gp.poll_key(),
        };

        let phase_before = state.phase;
        if step::handle_key(state, key)? == MetaAction::Exit {
            break;
        }
        if state.phase != phase_before {
            dirty = true;
        }

        if state.phase == Phase::Playing {
            if let Some(dir) = key.and_then(|k| k.as_move()) {
                pending_move = Some(dir);
            }
            if timer.expired() {
                let outcome = step::tick(state, pending_move.take());
                log_events(&outcome.events);
                dirty |= outcome.needs_redraw();
            }
        } else {
            pending_move = None;
        }

        if dirty {
            hud::compose(state, &mut fb);
            renderer.present(&fb)?;
            if let Some(t) = transcript.as_mut() {
                t.record_frame(&fb);
            }
            dirty = false;
        }

        if state.phase == Phase::Playing {
            step::ease_speed(state);
        }

        timer::pause(config.timing.cpu_yield_ms);
    }

    Ok(())
}

fn log_events(events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::Scored { platform, score } => {
                log::debug!("landed on platform {platform}, score {score}");
            }
            GameEvent::PlayerKilled { cause } => log::info!("player killed: {cause:?}"),
            GameEvent::BossTurnStarted => log::debug!("boss sweep started"),
            GameEvent::BossTurnFinished => log::debug!("boss sweep finished"),
            GameEvent::BossAppeared => {}
        }
    }
}
