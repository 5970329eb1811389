//! GameView: maps a game into a terminal framebuffer.
//!
//! Pure, no I/O, so it can be unit-tested.

use crate::core::{Board, DetonationWave, GameState};
use crate::engine::Session;
use crate::fb::{FrameBuffer, Rgb, Style};
use crate::types::{PlayerColor, Position};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub state: &'a GameState,
    /// Board to draw; differs from `state.board()` during wave playback.
    pub board: &'a Board,
    /// Cells that detonated in the wave just shown.
    pub wave: Option<&'a DetonationWave>,
    pub cursor: Option<Position>,
    /// Player whose cascade is being played back.
    pub mover: Option<PlayerColor>,
    /// One-line message, e.g. why the last placement was refused.
    pub notice: Option<&'a str>,
}

impl<'a> Frame<'a> {
    pub fn from_session(session: &'a Session, cursor: Option<Position>) -> Self {
        Self {
            state: session.state(),
            board: session.display_board(),
            wave: session.playback().and_then(|p| p.last_wave()),
            cursor,
            mover: session.playback().map(|p| p.mover()),
            notice: None,
        }
    }

    pub fn with_notice(mut self, notice: Option<&'a str>) -> Self {
        self.notice = notice;
        self
    }
}

const BOARD_BG: Rgb = Rgb::new(24, 24, 32);
const WAVE_BG: Rgb = Rgb::new(90, 60, 20);
const CURSOR_BG: Rgb = Rgb::new(60, 60, 80);

pub fn color_rgb(color: PlayerColor) -> Rgb {
    match color {
        PlayerColor::Red => Rgb::new(230, 70, 70),
        PlayerColor::Blue => Rgb::new(80, 130, 240),
        PlayerColor::Green => Rgb::new(90, 210, 110),
        PlayerColor::Yellow => Rgb::new(240, 220, 80),
        PlayerColor::Purple => Rgb::new(170, 100, 230),
        PlayerColor::Orange => Rgb::new(255, 160, 40),
        PlayerColor::Pink => Rgb::new(250, 130, 200),
        PlayerColor::Cyan => Rgb::new(80, 220, 220),
    }
}

/// Terminal renderer for the board and the player panel.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
}

impl Default for GameView {
    fn default() -> Self {
        // 3 columns: count in the middle, cursor brackets on the sides.
        Self { cell_w: 3 }
    }
}

impl GameView {
    /// Render into an existing framebuffer, resizing it to the viewport.
    pub fn render_into(&self, frame: &Frame<'_>, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(Style::default().glyph(' '));

        let rows = frame.board.rows() as u16;
        let cols = frame.board.cols() as u16;
        let frame_w = cols * self.cell_w + 2;
        let frame_h = rows + 2;
        // status line sits under the frame
        let start_x = viewport.width.saturating_sub(frame_w + 20) / 2;
        let start_y = viewport.height.saturating_sub(frame_h + 2) / 2;

        let mover = frame
            .mover
            .unwrap_or_else(|| frame.state.current_player().color);
        fb.draw_box(start_x, start_y, frame_w, frame_h, Style::fg(color_rgb(mover)));

        for (pos, cell) in frame.board.iter() {
            let bg = if frame.wave.is_some_and(|w| w.contains(pos)) {
                WAVE_BG
            } else if frame.cursor == Some(pos) {
                CURSOR_BG
            } else {
                BOARD_BG
            };
            let x = start_x + 1 + pos.col as u16 * self.cell_w;
            let y = start_y + 1 + pos.row as u16;
            fb.fill_rect(x, y, self.cell_w, 1, ' ', Style::default().on(bg));

            let mid = x + self.cell_w / 2;
            match cell.owner {
                Some(owner) => {
                    let ch = char::from_digit(cell.count.min(9), 10).unwrap_or('+');
                    fb.put_char(mid, y, ch, Style::fg(color_rgb(owner)).on(bg).bold());
                }
                None => {
                    fb.put_char(mid, y, '·', Style::fg(Rgb::new(90, 90, 100)).on(bg).dim());
                }
            }
            if frame.cursor == Some(pos) {
                let style = Style::fg(Rgb::new(240, 240, 240)).on(bg).bold();
                fb.put_char(x, y, '[', style);
                fb.put_char(x + self.cell_w - 1, y, ']', style);
            }
        }

        self.draw_status(fb, frame, start_x, start_y + frame_h, frame_w);
        self.draw_side_panel(fb, frame, viewport, start_x + frame_w + 2, start_y);
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, frame: &Frame<'_>, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(frame, viewport, &mut fb);
        fb
    }

    fn draw_status(&self, fb: &mut FrameBuffer, frame: &Frame<'_>, x: u16, y: u16, w: u16) {
        let state = frame.state;
        let (text, color) = if let Some(winner) = state.winner() {
            (format!("{} wins! r: restart", winner.name), winner.color)
        } else if let Some(mover) = frame.mover {
            ("chain reaction... tab: skip".to_string(), mover)
        } else {
            let player = state.current_player();
            (format!("{} ({}) to move", player.name, player.color), player.color)
        };
        fb.put_str_centered(x, y, w, &text, Style::fg(color_rgb(color)).bold());

        if let Some(notice) = frame.notice {
            fb.put_str_centered(x, y + 1, w, notice, Style::fg(Rgb::new(200, 200, 200)).dim());
        }
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        frame: &Frame<'_>,
        viewport: Viewport,
        panel_x: u16,
        start_y: u16,
    ) {
        if panel_x.saturating_add(12) > viewport.width {
            return;
        }
        let label = Style::fg(Rgb::new(220, 220, 220)).bold();
        let state = frame.state;

        fb.put_str(panel_x, start_y, "PLAYERS", label);
        let current = state.current_player_index();
        for (i, player) in state.players().iter().enumerate() {
            let y = start_y + 1 + i as u16;
            if y >= viewport.height {
                break;
            }
            let mut style = Style::fg(color_rgb(player.color));
            if !player.is_alive {
                style = style.dim();
            }
            let marker = if i == current && !state.is_finished() { '>' } else { ' ' };
            fb.put_char(panel_x, y, marker, label);
            let end = fb.put_str(panel_x + 2, y, player.color.as_str(), style);
            let units = frame.board.units_of(player.color);
            let tail = if player.is_alive {
                format!(" {units}")
            } else {
                " out".to_string()
            };
            fb.put_str(end, y, &tail, style);
        }

        let y = start_y + 2 + state.players().len() as u16;
        fb.put_str(panel_x, y, "MOVES", label);
        fb.put_str(
            panel_x,
            y + 1,
            &state.move_count().to_string(),
            Style::default(),
        );
    }
}
