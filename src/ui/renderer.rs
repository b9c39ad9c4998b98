/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Each grid cell is two terminal columns wide. Layout:
///   row 0        HUD (level, lives, coins, gold left)
///   row 2..      map
///   below map    message line, then key help

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use loderunner::domain::tile::CellKind;
use loderunner::sim::event::GameEvent;
use loderunner::sim::world::World;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer: differs from any real cell.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Banners ──

/// Full-width message drawn over the middle of the map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Banner {
    LevelCleared(usize),
    Victory,
    Defeat,
}

impl Banner {
    fn text(&self) -> String {
        match self {
            Banner::LevelCleared(n) => format!("  LEVEL {n} CLEARED  "),
            Banner::Victory => "  ALL LEVELS CLEARED - YOU WIN!  ".to_string(),
            Banner::Defeat => "  GAME OVER - press any key  ".to_string(),
        }
    }

    fn color(&self) -> Color {
        match self {
            Banner::LevelCleared(_) => Color::Rgb { r: 80, g: 200, b: 80 },
            Banner::Victory => Color::Rgb { r: 255, g: 220, b: 50 },
            Banner::Defeat => Color::Rgb { r: 220, g: 50, b: 50 },
        }
    }
}

// ── Renderer ──

const CELL_W: usize = 2;
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
/// Frames a status message stays on screen.
const MESSAGE_FRAMES: u32 = 120;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    message: String,
    message_frames: u32,
    banner: Option<Banner>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            message: String::new(),
            message_frames: 0,
            banner: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;
        self.sync_size()?;
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn set_banner(&mut self, banner: Option<Banner>) {
        self.banner = banner;
    }

    /// Turn simulation events into status messages.
    pub fn note_events(&mut self, events: &[GameEvent]) {
        for event in events {
            let msg = match event {
                GameEvent::GoldCollected { coins, .. } => format!("Gold! ({coins} collected)"),
                GameEvent::LaddersRevealed { .. } => "All gold taken - climb to the top!".to_string(),
                GameEvent::LivesChanged { lives } => format!("Lives: {lives}"),
                GameEvent::EnemyRemoved { .. } => "An enemy was buried".to_string(),
                _ => continue,
            };
            self.message = msg;
            self.message_frames = MESSAGE_FRAMES;
        }
    }

    pub fn render(&mut self, world: &World) -> io::Result<()> {
        self.sync_size()?;

        if self.message_frames > 0 {
            self.message_frames -= 1;
            if self.message_frames == 0 {
                self.message.clear();
            }
        }

        self.front.clear();
        self.compose_hud(world);
        self.compose_map(world);
        self.compose_footer(world);
        if let Some(banner) = self.banner.clone() {
            self.compose_banner(world, &banner);
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    /// Pick up terminal resizes; forces a full repaint when the size changed.
    fn sync_size(&mut self) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_hud(&mut self, w: &World) {
        let (lives, coins) = w.player.as_ref().map_or((0, 0), |p| (p.lives, p.coins));
        let exit = if w.ladders_revealed { "EXIT OPEN" } else { "" };
        let hud = format!(
            " Level {:<2}  Lives {}  Coins {:<3}  Gold left {:<3} {} ",
            w.level, lives, coins, w.grid.gold_remaining(), exit,
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
    }

    fn compose_map(&mut self, w: &World) {
        for cell in w.grid.cells() {
            let (x, y) = cell.coord;
            let (glyph, fg, bg) = if cell.is_hidden() {
                ("  ", Color::White, Color::Reset)
            } else {
                tile_glyph(cell.kind)
            };
            self.put_glyph(x, y, glyph, fg, bg);
        }

        for enemy in &w.enemies {
            self.put_glyph(enemy.x, enemy.y, "☻ ", Color::Rgb { r: 255, g: 80, b: 80 }, Color::Reset);
        }
        if let Some(p) = w.player.as_ref() {
            self.put_glyph(p.x, p.y, "☺ ", Color::Rgb { r: 80, g: 255, b: 80 }, Color::Reset);
        }
    }

    fn put_glyph(&mut self, gx: usize, gy: usize, glyph: &str, fg: Color, bg: Color) {
        let row = MAP_ROW + gy;
        let col = gx * CELL_W;
        if row >= self.front.height || col + 1 >= self.front.width {
            return;
        }
        self.front.put_str(col, row, glyph, fg, bg);
    }

    fn compose_footer(&mut self, w: &World) {
        let msg_row = MAP_ROW + w.grid.height() + 1;
        if !self.message.is_empty() && msg_row < self.front.height {
            let msg = format!(" {} ", self.message);
            self.front.put_str(0, msg_row, &msg, Color::Rgb { r: 200, g: 180, b: 50 }, Color::Reset);
        }
        let help_row = msg_row + 1;
        if help_row < self.front.height {
            let help = " Arrows/WASD:Move  Z/Q:Dig left  C/X/E:Dig right  Esc:Quit";
            self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
        }
    }

    fn compose_banner(&mut self, w: &World, banner: &Banner) {
        let text = banner.text();
        let map_cols = w.grid.width() * CELL_W;
        let x = map_cols.saturating_sub(text.chars().count()) / 2;
        let y = MAP_ROW + w.grid.height() / 2;
        self.front.put_str(x, y, &text, Color::Black, banner.color());
    }
}

/// Two-column glyph and colors for a shown tile.
fn tile_glyph(kind: CellKind) -> (&'static str, Color, Color) {
    match kind {
        CellKind::Empty => ("  ", Color::White, Color::Reset),
        CellKind::Brick => ("▓▓", Color::Rgb { r: 180, g: 120, b: 60 }, Color::Rgb { r: 100, g: 65, b: 30 }),
        CellKind::Ladder | CellKind::HiddenLadder => ("╠╣", Color::Rgb { r: 100, g: 200, b: 255 }, Color::Reset),
        CellKind::Rope => ("──", Color::Rgb { r: 180, g: 100, b: 200 }, Color::Reset),
        CellKind::Gold => ("$$", Color::Rgb { r: 255, g: 215, b: 0 }, Color::Reset),
    }
}

