//! Terminal chain reaction runner (default binary).
//!
//! Hot-seat play for 2 to 8 players on one terminal. Uses crossterm for input
//! and the framebuffer renderer from `chain_reaction::term`.

use std::fs::OpenOptions;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use chain_reaction::core::{EliminationRule, GameState};
use chain_reaction::engine::Session;
use chain_reaction::input::{handle_key_event, should_quit, Cursor};
use chain_reaction::term::{Frame, FrameBuffer, GameView, TerminalRenderer, Viewport};
use chain_reaction::types::{UiAction, MAX_PLAYERS, MIN_PLAYERS, TICK_MS, WAVE_DELAY_MS};

#[derive(Parser, Debug)]
#[command(name = "chain-reaction", version, about = "Chain reaction on the terminal")]
struct Args {
    /// Number of players sharing this terminal
    #[arg(short, long, default_value_t = 2)]
    players: usize,

    /// Delay between detonation waves in milliseconds (0 = instant)
    #[arg(long, default_value_t = WAVE_DELAY_MS)]
    wave_ms: u32,

    /// Keep everyone in the game until each player has moved once
    #[arg(long)]
    full_round: bool,
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // stdout belongs to the renderer
    match std::env::var("CHAIN_REACTION_LOG_FILE") {
        Ok(path) if !path.trim().is_empty() => {
            let file = OpenOptions::new().create(true).append(true).open(path.trim())?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::sink)
                .init();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&args.players) {
        anyhow::bail!(
            "--players must be between {MIN_PLAYERS} and {MAX_PLAYERS}, got {}",
            args.players
        );
    }
    init_logging()?;

    let rule = if args.full_round {
        EliminationRule::FullRound
    } else {
        EliminationRule::OpeningGuard
    };
    let state = GameState::with_default_players(args.players)?.with_rule(rule);
    let session = Session::new(state).with_wave_delay(args.wave_ms);
    info!(players = args.players, wave_ms = args.wave_ms, ?rule, "starting local game");

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, session);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn run(term: &mut TerminalRenderer, mut session: Session) -> Result<()> {
    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut cursor = Cursor::new(session.state().board().size());
    let mut notice: Option<String> = None;

    let mut last_tick = Instant::now();
    let tick_duration = Duration::from_millis(TICK_MS as u64);

    loop {
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let frame = Frame::from_session(&session, Some(cursor.position()))
            .with_notice(notice.as_deref());
        view.render_into(&frame, Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if should_quit(key) {
                        return Ok(());
                    }
                    match handle_key_event(key) {
                        Some(UiAction::Cursor(dir)) => cursor.step(dir),
                        Some(UiAction::Place) => {
                            notice = match session.submit(cursor.position()) {
                                Ok(_) => None,
                                Err(e) => {
                                    debug!(error = %e, "placement refused");
                                    Some(e.to_string())
                                }
                            };
                        }
                        Some(UiAction::SkipAnimation) => session.finish_playback(),
                        Some(UiAction::Restart) => {
                            session.restart();
                            notice = None;
                        }
                        None => {}
                    }
                }
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();
            session.tick(TICK_MS);
        }
    }
}
