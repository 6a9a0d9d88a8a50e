//! GameView: maps a game snapshot into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::GameSnapshot;
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::palette;
use crate::store::LeaderboardEntry;
use crate::types::{Grid, BOARD_SIZE, LEADERBOARD_LIMIT, USERNAME_MAX_LEN, USERNAME_MIN_LEN};

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

/// Which screen the front-end is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    /// First visit: asks for a username before play starts
    UsernameEntry,
    Playing,
    GameOver,
    Leaderboard,
}

/// Everything one frame needs besides the snapshot.
#[derive(Debug, Clone, Copy)]
pub struct ScreenView<'a> {
    pub screen: Screen,
    pub player: &'a str,
    /// Text typed so far on the username entry screen
    pub input: &'a str,
    /// Board to draw; differs from `snapshot.board` while a slide is animating
    pub grid: &'a Grid,
    pub leaderboard: &'a [LeaderboardEntry],
    /// One-line notice under the board or the entry box (e.g. a failed save)
    pub status: Option<&'a str>,
}

/// Rows above the board frame: player line, score labels, score values.
const HEADER_H: u16 = 3;

const PLAYING_HELP: &str = "←↑↓→ move · r restart · b leaderboard · q quit";
const GAME_OVER_HELP: &str = "r restart · b leaderboard · q quit";
const LEADERBOARD_HELP: &str = "b/esc return · q quit";
const ENTRY_HELP: &str = "enter continue · esc quit";

/// A lightweight terminal renderer for the 2048 board.
pub struct GameView {
    /// Tile width in terminal columns.
    tile_w: u16,
    /// Tile height in terminal rows.
    tile_h: u16,
    /// Empty columns/rows between tiles and around the edge.
    gap: u16,
}

impl Default for GameView {
    fn default() -> Self {
        // 6x3 keeps tiles roughly square with typical glyph aspect ratio.
        Self {
            tile_w: 6,
            tile_h: 3,
            gap: 1,
        }
    }
}

impl GameView {
    pub fn new(tile_w: u16, tile_h: u16, gap: u16) -> Self {
        Self {
            tile_w: tile_w.max(1),
            tile_h: tile_h.max(1),
            gap,
        }
    }

    fn board_inner(&self) -> (u16, u16) {
        let n = BOARD_SIZE as u16;
        (
            n * self.tile_w + (n + 1) * self.gap,
            n * self.tile_h + (n + 1) * self.gap,
        )
    }

    /// Size of the bordered board frame.
    pub fn frame_size(&self) -> (u16, u16) {
        let (w, h) = self.board_inner();
        (w + 2, h + 2)
    }

    /// Render one frame into an existing framebuffer.
    ///
    /// Callers can reuse a framebuffer across frames and only resize when the
    /// terminal size changes.
    pub fn render_into(
        &self,
        snap: &GameSnapshot,
        view: &ScreenView<'_>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().into_cell(' '));

        match view.screen {
            Screen::UsernameEntry => self.draw_username_entry(fb, view, viewport),
            Screen::Leaderboard => self.draw_leaderboard(fb, view, viewport),
            Screen::Playing | Screen::GameOver => self.draw_game(fb, snap, view, viewport),
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(
        &self,
        snap: &GameSnapshot,
        view: &ScreenView<'_>,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, view, viewport, &mut fb);
        fb
    }

    fn draw_game(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        view: &ScreenView<'_>,
        viewport: Viewport,
    ) {
        let (frame_w, frame_h) = self.frame_size();
        // Header, frame, blank, help line.
        let total_h = HEADER_H + frame_h + 2;

        let start_x = viewport.width.saturating_sub(frame_w) / 2;
        let start_y = viewport.height.saturating_sub(total_h) / 2;
        let board_y = start_y + HEADER_H;

        self.draw_header(fb, snap, view.player, start_x, start_y, frame_w);

        let border = CellStyle::new(palette::BOARD_BORDER, palette::SCREEN_BG);
        let bg = CellStyle::new(palette::BOARD_BG, palette::BOARD_BG);
        let (inner_w, inner_h) = self.board_inner();
        fb.fill_rect(start_x + 1, board_y + 1, inner_w, inner_h, ' ', bg);
        draw_border(fb, start_x, board_y, frame_w, frame_h, border);

        for (row, values) in view.grid.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                self.draw_tile(fb, start_x, board_y, row as u16, col as u16, value);
            }
        }

        let below = board_y + frame_h;
        if let Some(status) = view.status {
            let style = CellStyle::new(palette::GAME_OVER, palette::SCREEN_BG);
            fb.put_str_centered(0, viewport.width, below, status, style);
        }

        let help_style = CellStyle::new(palette::DARK_TEXT, palette::SCREEN_BG);
        if view.screen == Screen::GameOver {
            let (text, color) = if snap.won {
                ("You win!", palette::WIN)
            } else {
                ("Game over!", palette::GAME_OVER)
            };
            self.draw_overlay_text(fb, start_x, board_y, frame_w, frame_h, text, color);
            fb.put_str_centered(0, viewport.width, below + 1, GAME_OVER_HELP, help_style);
        } else {
            fb.put_str_centered(0, viewport.width, below + 1, PLAYING_HELP, help_style);
        }
    }

    fn draw_header(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        player: &str,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
    ) {
        let name_style = CellStyle::new(palette::LIGHT_TEXT, palette::SCREEN_BG);
        let label = CellStyle::new(palette::SCORE_LABEL, palette::SCREEN_BG).bold();
        let value = CellStyle::new(Rgb::new(255, 255, 255), palette::SCREEN_BG).bold();

        let mut line = [0u8; 64];
        let text = player_line(player, &mut line);
        fb.put_str_centered(start_x, frame_w, start_y, text, name_style);

        let half = frame_w / 2;
        fb.put_str_centered(start_x, half, start_y + 1, "SCORE", label);
        fb.put_str_centered(start_x + half, frame_w - half, start_y + 1, "BEST", label);

        let score_w = digit_count(snap.score);
        let best_w = digit_count(snap.best_score);
        fb.put_u32(start_x + half.saturating_sub(score_w) / 2, start_y + 2, snap.score, value);
        fb.put_u32(
            start_x + half + (frame_w - half).saturating_sub(best_w) / 2,
            start_y + 2,
            snap.best_score,
            value,
        );
    }

    fn draw_tile(
        &self,
        fb: &mut FrameBuffer,
        start_x: u16,
        board_y: u16,
        row: u16,
        col: u16,
        value: u32,
    ) {
        let px = start_x + 1 + self.gap + col * (self.tile_w + self.gap);
        let py = board_y + 1 + self.gap + row * (self.tile_h + self.gap);
        let style = palette::tile_style(value);
        fb.fill_rect(px, py, self.tile_w, self.tile_h, ' ', style);
        if value != 0 {
            let w = digit_count(value);
            let tx = px + self.tile_w.saturating_sub(w) / 2;
            fb.put_u32(tx, py + self.tile_h / 2, value, style);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_overlay_text(
        &self,
        fb: &mut FrameBuffer,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
        frame_h: u16,
        text: &str,
        color: Rgb,
    ) {
        let mid_y = start_y.saturating_add(frame_h / 2);
        let text_w = text.chars().count() as u16 + 4;
        let x = start_x.saturating_add(frame_w.saturating_sub(text_w) / 2);
        let style = CellStyle::new(color, Rgb::hex(0xfaf8ef)).bold();
        fb.fill_rect(x, mid_y.saturating_sub(1), text_w, 3, ' ', style);
        fb.put_str(x + 2, mid_y, text, style);
    }

    fn draw_leaderboard(&self, fb: &mut FrameBuffer, view: &ScreenView<'_>, viewport: Viewport) {
        const TABLE_W: u16 = 40;
        let rows = view.leaderboard.len().min(LEADERBOARD_LIMIT) as u16;
        // Title, blank, header, rule, rows (or the empty notice), blank, help.
        let total_h = 4 + rows.max(1) + 2;
        let start_x = viewport.width.saturating_sub(TABLE_W) / 2;
        let mut y = viewport.height.saturating_sub(total_h) / 2;

        let title = CellStyle::new(palette::WIN, palette::SCREEN_BG).bold();
        let head = CellStyle::new(palette::LIGHT_TEXT, palette::SCREEN_BG).bold();
        let text = CellStyle::new(palette::LIGHT_TEXT, palette::SCREEN_BG);
        let own = CellStyle::new(palette::WIN, palette::SCREEN_BG).bold();
        let dim = CellStyle::new(palette::DARK_TEXT, palette::SCREEN_BG);

        fb.put_str_centered(0, viewport.width, y, "Top 10 Leaderboard", title);
        y += 2;
        let header = format!("{:<4} {:<15} {:<8} {:<6}", "Rank", "Player", "Score", "Tile");
        fb.put_str(start_x, y, &header, head);
        y += 1;
        for dx in 0..TABLE_W {
            fb.put_char(start_x + dx, y, '─', dim);
        }
        y += 1;

        if view.leaderboard.is_empty() {
            fb.put_str(start_x, y, "No scores yet!", text);
            y += 1;
        }
        for entry in view.leaderboard.iter().take(LEADERBOARD_LIMIT) {
            let line = format!(
                "{:<4} {:<15} {:<8} {:<6}",
                entry.rank,
                truncate(&entry.username, 15),
                entry.score,
                entry.max_tile
            );
            let style = if entry.username == view.player { own } else { text };
            fb.put_str(start_x, y, &line, style);
            y += 1;
        }

        fb.put_str_centered(0, viewport.width, y + 1, LEADERBOARD_HELP, dim);
    }

    fn draw_username_entry(&self, fb: &mut FrameBuffer, view: &ScreenView<'_>, viewport: Viewport) {
        const BOX_W: u16 = 26;
        // Title, blank, two prompt lines, blank, input box, blank, hint, blank, status, help.
        let total_h = 13;
        let mut y = viewport.height.saturating_sub(total_h) / 2;

        let title = CellStyle::new(palette::WIN, palette::SCREEN_BG).bold();
        let text = CellStyle::new(palette::LIGHT_TEXT, palette::SCREEN_BG);
        let dim = CellStyle::new(palette::DARK_TEXT, palette::SCREEN_BG);
        let border = CellStyle::new(palette::BOARD_BORDER, palette::SCREEN_BG);
        let err = CellStyle::new(palette::GAME_OVER, palette::SCREEN_BG);

        fb.put_str_centered(0, viewport.width, y, "Welcome to 2048!", title);
        y += 2;
        let prompt = format!(
            "Please enter a username ({}-{} characters):",
            USERNAME_MIN_LEN, USERNAME_MAX_LEN
        );
        let first_visit = "This appears to be your first time playing.";
        fb.put_str_centered(0, viewport.width, y, first_visit, text);
        fb.put_str_centered(0, viewport.width, y + 1, &prompt, text);
        y += 3;

        let box_x = viewport.width.saturating_sub(BOX_W) / 2;
        draw_border(fb, box_x, y, BOX_W, 3, border);
        let mut x = box_x + 2;
        for ch in view.input.chars() {
            fb.put_char(x, y + 1, ch, text.bold());
            x += 1;
        }
        fb.put_char(x, y + 1, '_', text);
        y += 4;

        fb.put_str_centered(0, viewport.width, y, "Press Enter to continue", dim);
        y += 2;
        if let Some(status) = view.status {
            fb.put_str_centered(0, viewport.width, y, status, err);
        }
        fb.put_str_centered(0, viewport.width, y + 1, ENTRY_HELP, dim);
    }
}

fn draw_border(fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
    if w < 2 || h < 2 {
        return;
    }

    fb.put_char(x, y, '╭', style);
    fb.put_char(x + w - 1, y, '╮', style);
    fb.put_char(x, y + h - 1, '╰', style);
    fb.put_char(x + w - 1, y + h - 1, '╯', style);

    for dx in 1..w - 1 {
        fb.put_char(x + dx, y, '─', style);
        fb.put_char(x + dx, y + h - 1, '─', style);
    }
    for dy in 1..h - 1 {
        fb.put_char(x, y + dy, '│', style);
        fb.put_char(x + w - 1, y + dy, '│', style);
    }
}

fn digit_count(mut v: u32) -> u16 {
    let mut n = 1;
    while v >= 10 {
        v /= 10;
        n += 1;
    }
    n
}

/// `Player: <name>` into a stack buffer; names too long for it are cut.
fn player_line<'b>(player: &str, buf: &'b mut [u8; 64]) -> &'b str {
    const PREFIX: &[u8] = b"Player: ";
    buf[..PREFIX.len()].copy_from_slice(PREFIX);
    let mut len = PREFIX.len();
    for ch in player.chars() {
        let n = ch.len_utf8();
        if len + n > buf.len() {
            break;
        }
        ch.encode_utf8(&mut buf[len..len + n]);
        len += n;
    }
    std::str::from_utf8(&buf[..len]).unwrap_or("Player")
}

/// Cut `s` to `max` characters, ending in "..." when cut.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
