/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use domain::grid::Dir;
use sim::board::BoardError;
use sim::event::GameEvent;
use sim::level;
use sim::session::{Phase, Session};
use sim::step::step;
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();

    // levels/ dir takes priority if it has parseable files; otherwise
    // fall back to the built-in roster.
    let mut levels = level::load_from_directory(&config.levels_dir);
    if levels.is_empty() {
        levels = level::embedded_levels();
    }

    let mut session = Session::new(levels);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut session, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Crateshift!");
}

fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);

    // Ticks until a held key may move again. Fresh presses bypass it.
    let mut move_cooldown: u32 = 0;

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_meta(session, &kb) {
            break;
        }

        if last_tick.elapsed() >= tick_rate {
            session.anim_tick = session.anim_tick.wrapping_add(1);
            session.tick_message();

            if session.phase == Phase::Playing {
                move_cooldown = move_cooldown.saturating_sub(1);

                let fresh = detect_dir(&kb, true);
                let held = detect_dir(&kb, false);
                let dir = match (fresh, held) {
                    (Some(d), _) => Some(d),
                    (None, Some(d)) if move_cooldown == 0 => Some(d),
                    _ => None,
                };

                if let Some(dir) = dir {
                    apply_move(session, dir)?;
                    move_cooldown = config.speed.move_repeat_ticks;
                }
            }

            last_tick = Instant::now();
        }

        renderer.render(session)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Run one move through the engine and fold the outcome back into the
/// session. Stepping off an unwalled rim is recoverable: the board is
/// kept and the rejection is shown in the message bar.
fn apply_move(session: &mut Session, dir: Dir) -> Result<(), BoardError> {
    match step(&session.board, dir) {
        Ok(result) => {
            if result.moved() {
                session.moves += 1;
            }
            session.board = result.board;
            session.check_outcome();
            for event in &result.events {
                match event {
                    GameEvent::PushableSwallowed { .. } => {
                        session.set_message("swallowed by a sinkhole", 40);
                    }
                    GameEvent::PlayerSwallowed { .. } => {
                        session.set_message("the floor gave way", 0);
                    }
                    _ => {}
                }
            }
            Ok(())
        }
        Err(BoardError::OutOfBoard { dir, .. }) => {
            session.set_message(&format!("can't go {dir}: edge of the board"), 40);
            Ok(())
        }
        Err(err) => Err(err),
    }
}

// ── Key bindings ──

const KEYS_LEFT: &[KeyCode] = &[
    KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A'), KeyCode::Char('<'),
];
const KEYS_RIGHT: &[KeyCode] = &[
    KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D'), KeyCode::Char('>'),
];
const KEYS_UP: &[KeyCode] = &[
    KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W'), KeyCode::Char('^'),
];
const KEYS_DOWN: &[KeyCode] = &[
    KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S'), KeyCode::Char('v'),
];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];

fn detect_dir(kb: &InputState, fresh_only: bool) -> Option<Dir> {
    let active = |codes: &[KeyCode]| {
        if fresh_only {
            kb.any_pressed(codes)
        } else {
            kb.any_held(codes)
        }
    };
    if active(KEYS_UP) {
        Some(Dir::Up)
    } else if active(KEYS_DOWN) {
        Some(Dir::Down)
    } else if active(KEYS_LEFT) {
        Some(Dir::Left)
    } else if active(KEYS_RIGHT) {
        Some(Dir::Right)
    } else {
        None
    }
}

/// Phase transitions driven by meta keys. Returns true to quit.
fn handle_meta(session: &mut Session, kb: &InputState) -> bool {
    let confirm = kb.any_pressed(KEYS_CONFIRM);
    let escape = kb.was_pressed(KeyCode::Esc);

    match session.phase {
        Phase::Title => {
            if confirm {
                session.load_level(0);
            }
            if escape || kb.any_pressed(KEYS_QUIT) {
                return true;
            }
        }
        Phase::Playing => {
            if kb.any_pressed(KEYS_RESTART) {
                session.restart_level();
            }
            if escape {
                session.phase = Phase::Title;
            }
        }
        Phase::LevelWon => {
            if confirm {
                session.load_level(session.current_level + 1);
            }
            if escape {
                session.phase = Phase::Title;
            }
        }
        Phase::LevelLost => {
            if confirm || kb.any_pressed(KEYS_RESTART) {
                session.restart_level();
            }
            if escape {
                session.phase = Phase::Title;
            }
        }
        Phase::GameComplete => {
            if confirm || escape {
                session.phase = Phase::Title;
            }
        }
    }

    false
}
