mod ui;

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use env_logger::{Env, Target};
use log::info;
use ratatui::{backend::CrosstermBackend, Terminal};

use pm_escape::input::{InputEvent, Key};
use pm_escape::settings::FPS;
use pm_escape::{ContentLibrary, GameShell, LearningPath, Screen};
use ui::WorldView;

/// Educational escape room for project management.
#[derive(Debug, Parser)]
#[command(name = "pm-escape", version, about)]
struct Cli {
    /// Directory holding the pmbok/ and scrum/ room files.
    #[arg(long, default_value = "content")]
    content: PathBuf,

    /// Seed for shuffling activity layouts. Defaults to the clock.
    #[arg(long)]
    seed: Option<u64>,

    /// Skip the menu and start this path.
    #[arg(long, value_enum)]
    path: Option<LearningPath>,

    /// Write logs here (the terminal is busy with the game).
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let library = ContentLibrary::load(&cli.content)
        .with_context(|| format!("cannot load rooms from {}", cli.content.display()))?;
    let seed = cli.seed.unwrap_or_else(clock_seed);
    info!("content loaded from {}, seed {}", cli.content.display(), seed);

    let mut shell = GameShell::new(library, seed);
    if let Some(path) = cli.path {
        shell.start(path).context("cannot start the selected path")?;
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut shell);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    result?;

    match (shell.screen(), shell.last_score()) {
        (Screen::Victory, Some(score)) => {
            println!("\nYou escaped! Final score: {}\n", score.total);
        }
        (Screen::GameOver(_), Some(score)) => {
            println!("\nGame over. Score: {}\n", score.total);
        }
        _ => {}
    }
    Ok(())
}

/// Fixed-rate loop: draw, drain input until the frame deadline, update.
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    shell: &mut GameShell,
) -> Result<()> {
    let frame = Duration::from_secs(1) / FPS;
    let mut view = WorldView::default();
    let mut last = Instant::now();

    while !shell.should_quit() {
        terminal.draw(|f| ui::draw(f, shell, &mut view))?;

        let deadline = last + frame;
        while event::poll(deadline.saturating_duration_since(Instant::now()))? {
            let ev = event::read()?;
            if let Event::Key(KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            }) = ev
            {
                shell.request_quit();
                break;
            }
            if let Some(input) = translate(ev, &view) {
                shell.handle_input(input)?;
            }
        }

        let now = Instant::now();
        shell.update(now - last);
        last = now;
    }
    Ok(())
}

fn translate(ev: Event, view: &WorldView) -> Option<InputEvent> {
    match ev {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            let key = match key.code {
                KeyCode::Up => Key::Up,
                KeyCode::Down => Key::Down,
                KeyCode::Left => Key::Left,
                KeyCode::Right => Key::Right,
                KeyCode::Enter => Key::Enter,
                KeyCode::Esc => Key::Escape,
                KeyCode::Tab => Key::Tab,
                KeyCode::Backspace => Key::Backspace,
                KeyCode::Char(' ') => Key::Space,
                KeyCode::Char(c) => Key::Char(c.to_ascii_lowercase()),
                _ => return None,
            };
            Some(InputEvent::KeyDown(key))
        }
        Event::Mouse(mouse) => {
            let at = view.to_world(mouse.column, mouse.row)?;
            match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => Some(InputEvent::PointerDown(at)),
                MouseEventKind::Up(MouseButton::Left) => Some(InputEvent::PointerUp(at)),
                MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                    Some(InputEvent::PointerMove(at))
                }
                _ => None,
            }
        }
        _ => None,
    }
}
