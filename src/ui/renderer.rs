/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into the `front` buffer (array of Cell)
///   2. Compare each cell with the `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Screen layout while playing:
///
///   row 0        info bar: Score │ Health │ Words │ Level
///   rows 1..h-1  playfield, backdrop gradient, falling words
///   row h-1      prompt bar
///
/// The renderer owns the purely cosmetic state (word colour drift, the title
/// background) and reports the terminal width back to the round, which uses
/// it for spawn columns and the prompt limit.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use matype::domain::rules::Difficulty;
use matype::sim::world::{Phase, WorldState};

use super::backdrop::Backdrop;
use super::effects::{self, MenuBackground, Rgb, WordColors};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit background for every empty cell, also used for full clears,
    /// so row gaps on VTE terminals match the cells.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel that differs from any real cell; filling the back buffer with
    /// it forces a full repaint.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

fn rgb(c: Rgb) -> Color {
    Color::Rgb { r: c.0, g: c.1, b: c.2 }
}

// ── Palette ──

const BAR_BG: Color = Color::Rgb { r: 40, g: 40, b: 40 };
const BORDER: Color = Color::Rgb { r: 255, g: 165, b: 0 };
const TEXT: Color = Color::White;
const WORD_BG: Color = Color::Rgb { r: 50, g: 50, b: 50 };
const TYPED_BG: Color = Color::Rgb { r: 220, g: 220, b: 220 };
const OFF_TRACK: Color = Color::Rgb { r: 255, g: 40, b: 40 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const CAPTION_BG: Color = Color::Rgb { r: 255, g: 255, b: 215 };
const MENU_TEXT: Color = Color::Rgb { r: 235, g: 235, b: 235 };
const MENU_FOCUS: Color = Color::Rgb { r: 40, g: 40, b: 240 };
const DIM: Color = Color::Rgb { r: 150, g: 150, b: 150 };

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

    /// Write a string at (x, y). One column per char, clipped at the edge.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    /// Like `put_str` but keeps whatever background is already there.
    fn overlay_str(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            let bg = self.get(x + i, y).bg;
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', TEXT, bg));
        }
    }

    /// Centre `s` on row `y`.
    fn center_str(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let x = self.width.saturating_sub(s.chars().count()) / 2;
        self.put_str(x, y, s, fg, bg);
    }

    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width).map(|x| self.get(x, y).ch).collect()
    }
}

// ── Renderer ──

const INFO_ROW: usize = 0;
const FIELD_TOP: usize = 1;

/// Smallest terminal that still fits the bars and a few rows of field.
const MIN_W: usize = 20;
const MIN_H: usize = 6;

const LOGO: [&str; 6] = [
    r" __  __     _____                  ",
    r"|  \/  | __|_   _|   _ _ __   ___  ",
    r"| |\/| |/ _` || || | | | '_ \ / _ \",
    r"| |  | | (_| || || |_| | |_) |  __/",
    r"|_|  |_|\__,_||_| \__, | .__/ \___|",
    r"                  |___/|_|         ",
];

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    rng: fastrand::Rng,
    word_colors: WordColors,
    menu_bg: Option<MenuBackground>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            rng: fastrand::Rng::new(),
            word_colors: WordColors::default(),
            menu_bg: None,
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
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.set_size(tw as usize, th as usize);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &mut WorldState, backdrop: &Backdrop) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.set_size(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Phase change: clear for a clean transition
        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            if world.phase == Phase::Playing {
                self.word_colors.clear();
            }
            self.last_phase = Some(world.phase);
        }

        self.compose(world, backdrop);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn set_size(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        self.back.cells.fill(Cell::INVALID);
        self.menu_bg = None;
    }

    fn prompt_row(&self) -> usize {
        self.term_h.saturating_sub(1)
    }

    fn field_height(&self) -> usize {
        self.prompt_row().saturating_sub(FIELD_TOP).max(1)
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        // Position of the terminal cursor, if known.
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colours; ResetColor would fall back to the terminal's
        // own default and leave line artifacts.
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

    /// Build the next frame into `front`. Also tells the round how wide the
    /// playfield currently is.
    fn compose(&mut self, world: &mut WorldState, backdrop: &Backdrop) {
        world.round.resize(self.term_w);
        self.front.clear();

        if self.term_w < MIN_W || self.term_h < MIN_H {
            self.front.put_str(0, 0, "Too small", TEXT, Cell::BASE_BG);
            return;
        }

        match world.phase {
            Phase::Title => self.compose_title(world),
            Phase::Playing => {
                if !world.paused {
                    self.word_colors.update(&world.round.falling, &mut self.rng);
                }
                self.compose_game(world, backdrop);
                if world.paused {
                    self.compose_pause_overlay(world);
                }
            }
            Phase::GameOver => {
                self.compose_game(world, backdrop);
                self.compose_game_over(world);
            }
        }
    }

    fn compose_game(&mut self, w: &WorldState, backdrop: &Backdrop) {
        self.compose_info_bar(w);
        self.compose_field(w, backdrop);
        self.compose_prompt(w);
    }

    fn compose_info_bar(&mut self, w: &WorldState) {
        let s = &w.session;
        let health = rgb(effects::health_color(s.health_ratio()));
        let items = [
            ("Score", s.score, TEXT),
            ("Health", s.health, health),
            ("Words", s.words_killed, TEXT),
            ("Level", s.level, TEXT),
        ];

        self.front.fill_row(INFO_ROW, BAR_BG);
        let seg = self.term_w / items.len();
        for (i, (label, value, color)) in items.iter().enumerate() {
            let text = format!("{label}: {value}");
            let x = i * seg + seg.saturating_sub(text.len()) / 2;
            self.front.put_str(x, INFO_ROW, &text, *color, BAR_BG);
            if i + 1 < items.len() {
                self.front.set((i + 1) * seg, INFO_ROW, Cell::new('│', BORDER, BAR_BG));
            }
        }
    }

    fn compose_field(&mut self, w: &WorldState, backdrop: &Backdrop) {
        let field_h = self.field_height();
        let bottom = FIELD_TOP + field_h - 1;

        // Backdrop gradient
        for i in 0..field_h {
            let frac = i as f32 / (field_h.max(2) - 1) as f32;
            self.front.fill_row(FIELD_TOP + i, rgb(backdrop.color_at(frac)));
        }

        // Theme caption, bottom right
        let caption = format!(" {} ", backdrop.theme().name);
        let cx = self.term_w.saturating_sub(caption.len() + 1);
        self.front.put_str(cx, bottom, &caption, Color::Black, CAPTION_BG);

        // Falling words
        let target = w.round.target();
        let typed_len = w.round.prompt.len();
        let fall_speed = w.round.settings.fall_speed;
        for f in w.round.falling.iter() {
            let pos = f.position(fall_speed).clamp(0.0, 1.0);
            let row = FIELD_TOP + (pos * (field_h - 1) as f32).round() as usize;
            let len = f.word.len();
            let max_x = self.term_w.saturating_sub(len);
            let x = ((f.x as f32 + effects::sway(f.age)).round().max(0.0) as usize).min(max_x);

            let done = if target == Some(&f.word) { typed_len } else { 0 };
            let color = rgb(self.word_colors.get(&f.word));
            for (i, ch) in f.word.as_str().chars().enumerate() {
                let cell = if i < done {
                    Cell::new(ch, Color::Black, TYPED_BG)
                } else {
                    Cell::new(ch, color, WORD_BG)
                };
                self.front.set(x + i, row, cell);
            }
        }

        if !w.message.is_empty() {
            let msg = format!(" {} ", w.message);
            self.front.center_str(FIELD_TOP, &msg, Color::Black, MSG_BG);
        }
    }

    fn compose_prompt(&mut self, w: &WorldState) {
        let row = self.prompt_row();
        self.front.fill_row(row, BAR_BG);

        let text = w.round.prompt.as_str().to_ascii_uppercase();
        let color = if w.round.prompt_on_track() { TEXT } else { OFF_TRACK };
        self.front.put_str(1, row, &text, color, BAR_BG);

        let blink = (w.anim_tick / 12) % 2 == 0;
        if blink && w.phase == Phase::Playing && !w.paused {
            self.front.set(1 + text.len(), row, Cell::new('_', TEXT, BAR_BG));
        }

        let hint = "Enter: pause  Esc: menu";
        let hx = self.term_w.saturating_sub(hint.len() + 1);
        if hx > text.len() + 3 {
            self.front.put_str(hx, row, hint, DIM, BAR_BG);
        }
    }

    fn compose_title(&mut self, w: &WorldState) {
        let (tw, th) = (self.term_w, self.term_h);
        if self.menu_bg.as_ref().map(|bg| bg.size()) != Some((tw, th)) {
            self.menu_bg = Some(MenuBackground::generate(tw, th, &mut self.rng));
        }
        if let Some(bg) = &self.menu_bg {
            for y in 0..th {
                for x in 0..tw {
                    self.front.set(x, y, Cell::new(' ', TEXT, rgb(bg.at(x, y))));
                }
            }
        }

        let logo_w = LOGO[0].len();
        let lx = tw.saturating_sub(logo_w) / 2;
        let ly = if th > LOGO.len() + 10 { 2 } else { 0 };
        if tw >= logo_w {
            for (i, line) in LOGO.iter().enumerate() {
                self.front.overlay_str(lx, ly + i, line, Color::Black);
            }
        }

        let menu_y = (ly + LOGO.len() + 2).min(th.saturating_sub(6));
        for i in 0..=Difficulty::ALL.len() {
            let label = menu_label(i);
            let y = menu_y + i;
            if i == w.menu_cursor {
                let text = format!("> {label} <");
                self.front.center_str(y, &text, MENU_FOCUS, TYPED_BG);
            } else {
                let x = tw.saturating_sub(label.len()) / 2;
                self.front.overlay_str(x, y, label, MENU_TEXT);
            }
        }

        let hs = format!(" Highscore: {} ", w.high_score);
        self.front.put_str(tw.saturating_sub(hs.len() + 2), th - 2, &hs, DIM, BAR_BG);

        self.front.overlay_str(1, th - 1, "Up/Down: choose  Enter: start  Ctrl+C: quit", Color::Black);

        if !w.message.is_empty() {
            let msg = format!(" {} ", w.message);
            self.front.center_str(menu_y + Difficulty::ALL.len() + 2, &msg, Color::Black, MSG_BG);
        }
    }

    /// Dark box centred in the playfield; returns its top-left corner and width.
    fn compose_box(&mut self, box_w: usize, box_h: usize) -> (usize, usize, usize) {
        let box_w = box_w.min(self.term_w);
        let box_h = box_h.min(self.field_height());
        let x0 = (self.term_w - box_w) / 2;
        let y0 = FIELD_TOP + (self.field_height() - box_h) / 2;
        for y in y0..y0 + box_h {
            for x in x0..x0 + box_w {
                self.front.set(x, y, Cell::new(' ', TEXT, BAR_BG));
            }
        }
        for x in x0..x0 + box_w {
            self.front.set(x, y0, Cell::new('─', BORDER, BAR_BG));
            self.front.set(x, y0 + box_h - 1, Cell::new('─', BORDER, BAR_BG));
        }
        (x0, y0, box_w)
    }

    fn compose_pause_overlay(&mut self, w: &WorldState) {
        let (x0, y0, box_w) = self.compose_box(30, 7);
        let blink = (w.anim_tick / 12) % 2 == 0;
        let title = if blink { "> PAUSED <" } else { "  PAUSED  " };
        let center = |s: &str| x0 + box_w.saturating_sub(s.len()) / 2;
        self.front.put_str(center(title), y0 + 2, title, BORDER, BAR_BG);
        let lines = ["Enter  resume", "Esc    menu  "];
        for (i, l) in lines.iter().enumerate() {
            self.front.put_str(center(l), y0 + 3 + i, l, DIM, BAR_BG);
        }
    }

    fn compose_game_over(&mut self, w: &WorldState) {
        let (x0, y0, box_w) = self.compose_box(34, 8);
        let center = |s: &str| x0 + box_w.saturating_sub(s.len()) / 2;

        let title = "GAME OVER";
        self.front.put_str(center(title), y0 + 2, title, OFF_TRACK, BAR_BG);

        let score = format!("Score: {}", w.session.score);
        self.front.put_str(center(&score), y0 + 3, &score, TEXT, BAR_BG);

        let (best, color) = if w.new_high_score {
            ("New high score!".to_string(), BORDER)
        } else {
            (format!("Highscore: {}", w.high_score), DIM)
        };
        self.front.put_str(center(&best), y0 + 4, &best, color, BAR_BG);

        let hint = "Enter: back to menu";
        self.front.put_str(center(hint), y0 + 5, hint, DIM, BAR_BG);
    }
}

fn menu_label(i: usize) -> &'static str {
    match Difficulty::ALL.get(i) {
        Some(Difficulty::Easy) => "Easy",
        Some(Difficulty::Medium) => "Medium",
        Some(Difficulty::Hard) => "Hard",
        None => "Quit",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matype::config::GameConfig;
    use matype::domain::rng::ScriptedRng;
    use matype::domain::word::Word;
    use matype::domain::wordbank::WordBank;

    fn setup(w: usize, h: usize) -> (Renderer, WorldState, Backdrop) {
        let cfg = GameConfig::default();
        let bank = WordBank::from_words(["cat", "dog"].iter().map(|s| Word::parse(s).unwrap()));
        let mut world = WorldState::new(&cfg, &bank, 12);
        world.start_round(&cfg, &bank, Difficulty::Easy);
        let mut r = Renderer::new();
        r.set_size(w, h);
        let backdrop = Backdrop::new(25.0, 0.7, &mut ScriptedRng::new(&[0]));
        (r, world, backdrop)
    }

    #[test]
    fn reports_field_width_to_round() {
        let (mut r, mut world, bd) = setup(64, 20);
        r.compose(&mut world, &bd);
        assert_eq!(world.round.field_width, 64);
    }

    #[test]
    fn info_bar_shows_tallies() {
        let (mut r, mut world, bd) = setup(80, 20);
        world.session.score = 42;
        r.compose(&mut world, &bd);
        let bar = r.front.row_text(INFO_ROW);
        assert!(bar.contains("Score: 42"));
        assert!(bar.contains("Health: 5"));
        assert!(bar.contains("Words: 0"));
        assert!(bar.contains("Level: 1"));
    }

    #[test]
    fn prompt_is_upper_case_and_red_off_track() {
        let (mut r, mut world, bd) = setup(40, 12);
        world.round.falling.insert(Word::parse("cat").unwrap(), 5);
        world.round.type_char('c');
        world.round.type_char('a');
        r.compose(&mut world, &bd);
        let row = r.prompt_row();
        assert!(r.front.row_text(row).starts_with(" CA"));
        assert_eq!(r.front.get(1, row).fg, TEXT);

        world.round.type_char('x');
        r.compose(&mut world, &bd);
        assert!(r.front.row_text(row).starts_with(" CAX"));
        assert_eq!(r.front.get(1, row).fg, OFF_TRACK);
    }

    #[test]
    fn falling_word_highlights_typed_prefix() {
        let (mut r, mut world, bd) = setup(40, 12);
        world.round.falling.insert(Word::parse("cat").unwrap(), 5);
        world.round.type_char('c');
        r.compose(&mut world, &bd);
        let line = r.front.row_text(FIELD_TOP);
        let x = line.find("cat").expect("word drawn on the top row");
        assert_eq!(r.front.get(x, FIELD_TOP).bg, TYPED_BG);
        assert_eq!(r.front.get(x + 1, FIELD_TOP).bg, WORD_BG);
    }

    #[test]
    fn off_track_prompt_highlights_nothing() {
        let (mut r, mut world, bd) = setup(40, 12);
        world.round.falling.insert(Word::parse("cat").unwrap(), 5);
        world.round.falling.insert(Word::parse("dog").unwrap(), 20);
        world.round.type_char('c');
        world.round.type_char('x');
        r.compose(&mut world, &bd);
        let line = r.front.row_text(FIELD_TOP);
        for word in ["cat", "dog"] {
            let x = line.find(word).expect("word drawn on the top row");
            assert_eq!(r.front.get(x, FIELD_TOP).bg, WORD_BG);
        }
    }

    #[test]
    fn title_lists_menu_and_high_score() {
        let (mut r, mut world, bd) = setup(80, 24);
        world.phase = Phase::Title;
        world.menu_cursor = 1;
        r.compose(&mut world, &bd);
        let screen: Vec<String> = (0..24).map(|y| r.front.row_text(y)).collect();
        assert!(screen.iter().any(|l| l.contains("> Medium <")));
        assert!(screen.iter().any(|l| l.contains("Quit")));
        assert!(screen.iter().any(|l| l.contains("Highscore: 12")));
    }

    #[test]
    fn game_over_box_reports_new_high_score() {
        let (mut r, mut world, bd) = setup(80, 24);
        world.phase = Phase::GameOver;
        world.session.score = 30;
        world.new_high_score = true;
        r.compose(&mut world, &bd);
        let screen: Vec<String> = (0..24).map(|y| r.front.row_text(y)).collect();
        assert!(screen.iter().any(|l| l.contains("GAME OVER")));
        assert!(screen.iter().any(|l| l.contains("Score: 30")));
        assert!(screen.iter().any(|l| l.contains("New high score!")));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let (mut r, mut world, bd) = setup(10, 3);
        r.compose(&mut world, &bd);
        assert!(r.front.row_text(0).starts_with("Too small"));
    }
}
