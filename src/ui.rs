use pm_escape::geometry::{Point, Rect as WorldRect};
use pm_escape::render::{Canvas, Tone};
use pm_escape::settings::{WORLD_HEIGHT, WORLD_WIDTH};
use pm_escape::{GameOverReason, GameShell, Screen};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
    Frame,
};

/// Terminal cells the world was last drawn into. Mouse events are mapped
/// back through it.
#[derive(Debug, Default, Clone, Copy)]
pub struct WorldView {
    area: Option<Rect>,
}

impl WorldView {
    pub fn to_world(&self, column: u16, row: u16) -> Option<Point> {
        let area = self.area?;
        if column < area.x || row < area.y || column >= area.right() || row >= area.bottom() {
            return None;
        }
        let cx = i32::from(column - area.x);
        let cy = i32::from(row - area.y);
        Some(Point::new(
            (cx * 2 + 1) * WORLD_WIDTH / (2 * i32::from(area.width)),
            (cy * 2 + 1) * WORLD_HEIGHT / (2 * i32::from(area.height)),
        ))
    }
}

/// Paints world-space draw calls onto a ratatui buffer.
struct TermCanvas<'a> {
    buf: &'a mut Buffer,
    area: Rect,
}

impl TermCanvas<'_> {
    fn cells(&self, r: WorldRect) -> Option<Rect> {
        let w = i32::from(self.area.width);
        let h = i32::from(self.area.height);
        let x0 = (r.x * w / WORLD_WIDTH).clamp(0, w);
        let y0 = (r.y * h / WORLD_HEIGHT).clamp(0, h);
        let x1 = (r.right() * w / WORLD_WIDTH).clamp(0, w).max(x0 + 1).min(w);
        let y1 = (r.bottom() * h / WORLD_HEIGHT).clamp(0, h).max(y0 + 1).min(h);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Rect::new(
            self.area.x + x0 as u16,
            self.area.y + y0 as u16,
            (x1 - x0) as u16,
            (y1 - y0) as u16,
        ))
    }
}

fn colour(tone: Tone) -> Color {
    match tone {
        Tone::Floor => Color::Rgb(24, 24, 32),
        Tone::Wall => Color::DarkGray,
        Tone::Mission => Color::Magenta,
        Tone::MissionDone => Color::Green,
        Tone::Transition => Color::Blue,
        Tone::TransitionOpen => Color::Cyan,
        Tone::Info => Color::Rgb(150, 120, 0),
        Tone::Player => Color::LightRed,
        Tone::Panel => Color::Rgb(16, 16, 40),
        Tone::Card => Color::Rgb(50, 50, 90),
        Tone::Slot => Color::Rgb(35, 35, 35),
        Tone::Button => Color::Blue,
        Tone::Text => Color::White,
        Tone::Highlight => Color::Yellow,
        Tone::Good => Color::Rgb(0, 110, 40),
        Tone::Bad => Color::Rgb(130, 20, 20),
    }
}

impl Canvas for TermCanvas<'_> {
    fn fill_rect(&mut self, rect: WorldRect, tone: Tone) {
        if let Some(area) = self.cells(rect) {
            self.buf.set_style(area, Style::default().bg(colour(tone)));
        }
    }

    fn stroke_rect(&mut self, rect: WorldRect, tone: Tone) {
        if let Some(area) = self.cells(rect) {
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colour(tone)))
                .render(area, self.buf);
        }
    }

    fn text(&mut self, at: Point, text: &str, tone: Tone) {
        if let Some(area) = self.cells(WorldRect::new(at.x, at.y, WORLD_WIDTH - at.x, 1)) {
            self.buf.set_stringn(
                area.x,
                area.y,
                text,
                usize::from(area.width),
                Style::default().fg(colour(tone)),
            );
        }
    }

    fn text_block(&mut self, rect: WorldRect, text: &str, tone: Tone) {
        if let Some(area) = self.cells(rect) {
            Paragraph::new(text)
                .wrap(Wrap { trim: true })
                .style(Style::default().fg(colour(tone)))
                .render(area, self.buf);
        }
    }
}

pub fn draw(f: &mut Frame, shell: &GameShell, view: &mut WorldView) {
    match shell.screen() {
        Screen::Menu => {
            view.area = None;
            draw_menu(f, shell);
        }
        Screen::Instructions => {
            view.area = None;
            draw_instructions(f);
        }
        Screen::GameOver(_) | Screen::Victory => {
            view.area = None;
            draw_result(f, shell);
        }
        Screen::PathSelection | Screen::Gameplay => draw_world(f, shell, view),
    }
}

fn draw_world(f: &mut Frame, shell: &GameShell, view: &mut WorldView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(5),
        ])
        .split(f.area());

    f.render_widget(
        Paragraph::new(status_line(shell)).block(Block::default().borders(Borders::BOTTOM)),
        chunks[0],
    );

    // Cells are about twice as tall as wide.
    let avail = chunks[1];
    let width = avail.width.min(avail.height.saturating_mul(2));
    let height = (width / 2).max(1);
    let world = Rect::new(
        avail.x + (avail.width - width) / 2,
        avail.y + (avail.height - height.min(avail.height)) / 2,
        width,
        height.min(avail.height),
    );
    view.area = Some(world);
    let mut canvas = TermCanvas {
        buf: f.buffer_mut(),
        area: world,
    };
    shell.render_world(&mut canvas);

    let (title, text) = match shell.screen() {
        Screen::PathSelection => (
            " Choose your path ",
            "Walk left for Scrum or right for PMBOK. Esc returns to the menu.".to_string(),
        ),
        _ => (
            " Notes ",
            shell.message().map(str::to_string).unwrap_or_else(|| {
                "Arrows/WASD move  •  E/Enter interact  •  Esc close or menu".to_string()
            }),
        ),
    };
    let notes = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::Yellow));
    f.render_widget(notes, chunks[2]);
}

fn status_line(shell: &GameShell) -> Line<'static> {
    let mut spans = vec![Span::styled(
        " PM ESCAPE ",
        Style::default().fg(Color::Black).bg(Color::Yellow),
    )];
    if let Some(session) = shell.session() {
        let run = session.run();
        let room = run.current_room();
        let secs = session.time_remaining().as_secs();
        spans.extend([
            Span::raw("  "),
            Span::styled(
                format!(" {} ", session.path()),
                Style::default().fg(Color::White).bg(Color::DarkGray),
            ),
            Span::raw("  "),
            Span::styled(
                format!(" Room {}/{}: {} ", run.index() + 1, run.len(), room.meta().title),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw("  "),
            Span::styled(
                format!(" Time {}:{:02} ", secs / 60, secs % 60),
                Style::default().fg(if secs > 60 { Color::Green } else { Color::Red }),
            ),
        ]);
    }
    spans.extend([
        Span::raw("  "),
        Span::styled(
            format!(" High score: {} ", shell.high_score()),
            Style::default().fg(Color::Yellow),
        ),
    ]);
    Line::from(spans)
}

fn draw_menu(f: &mut Frame, shell: &GameShell) {
    let title_art = r#"
    ╔═══════════════════════════════════════════════╗
    ║                                               ║
    ║        P M   E S C A P E   R O O M            ║
    ║                                               ║
    ║     "Manage the project, or stay locked in"   ║
    ║                                               ║
    ╚═══════════════════════════════════════════════╝
"#;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(10),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(1),
        ])
        .split(f.area());

    f.render_widget(
        Paragraph::new(title_art)
            .style(Style::default().fg(Color::Yellow))
            .alignment(Alignment::Center),
        chunks[0],
    );
    f.render_widget(
        Paragraph::new("  START  ")
            .style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center),
        chunks[1],
    );
    f.render_widget(
        Paragraph::new(format!("High score: {}", shell.high_score()))
            .style(Style::default().fg(Color::Cyan))
            .alignment(Alignment::Center),
        chunks[2],
    );
    f.render_widget(
        Paragraph::new("ENTER to start  •  i for instructions  •  q to quit")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        chunks[3],
    );
}

fn draw_instructions(f: &mut Frame) {
    let text = "\
Pick a learning path by walking to it: Scrum on the left, PMBOK on the right.

In every room, walk next to the glowing mission point and press E or Enter to
open its activity. Quizzes take a number key or a click. Matching and board
activities take drag-and-drop with the mouse, or the keyboard: Up/Down choose a
card, Left/Right choose a target, Enter places it, V checks the board.
Ordering: Space grabs a card, Up/Down move it, Enter checks the order.

Each activity allows 3 mistakes. A third mistake ends the run.
Once the mission is done, stand in the exit and press E to reach the next room.
Finish every room before the 5 minute clock runs out.

Score: 1000 points per room plus 10 points per second left.

[Enter] back";
    let para = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" How to play "))
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::White));
    f.render_widget(para, f.area());
}

fn draw_result(f: &mut Frame, shell: &GameShell) {
    let (title, style, headline) = match shell.screen() {
        Screen::Victory => (
            " VICTORY! ",
            Style::default().fg(Color::Black).bg(Color::Green),
            "You escaped every room.".to_string(),
        ),
        Screen::GameOver(reason) => (
            " GAME OVER ",
            Style::default().fg(Color::White).bg(Color::Red),
            match reason {
                GameOverReason::TimeUp => "Time is up.".to_string(),
                GameOverReason::ActivityFailed => "Too many mistakes in the activity.".to_string(),
            },
        ),
        _ => return,
    };
    let mut text = format!("{headline}\n\n");
    if let Some(detail) = shell.message() {
        text.push_str(detail);
        text.push_str("\n\n");
    }
    if let Some(score) = shell.last_score() {
        text.push_str(&format!(
            "Rooms cleared: {:>6}\nRoom points:   {:>6}\nTime bonus:    {:>6}\nTotal:         {:>6}\n",
            score.rooms, score.room_points, score.time_bonus, score.total
        ));
    }
    text.push_str(&format!("High score:    {:>6}\n\n[Enter] menu  •  [Esc] quit", shell.high_score()));
    let para = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false })
        .style(style);
    f.render_widget(para, f.area());
}
