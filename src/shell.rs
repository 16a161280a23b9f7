use std::time::Duration;

use log::{debug, info, warn};

use crate::error::Result;
use crate::geometry::{Point, Rect};
use crate::input::{InputEvent, Key};
use crate::path::{ContentLibrary, LearningPath};
use crate::player::Player;
use crate::render::{Canvas, Tone};
use crate::room::{Overlay, Room};
use crate::session::{GameSession, ScoreCard};
use crate::settings::{PLAYER_HEIGHT, PLAYER_WIDTH, WORLD_HEIGHT, WORLD_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    TimeUp,
    ActivityFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    PathSelection,
    Instructions,
    Gameplay,
    GameOver(GameOverReason),
    Victory,
}

/// Top-level screen machine. Owns the session while a run is in progress.
#[derive(Debug)]
pub struct GameShell {
    library: ContentLibrary,
    screen: Screen,
    session: Option<GameSession>,
    selector: Player,
    seed: u64,
    runs_started: u64,
    high_score: u64,
    last_score: Option<ScoreCard>,
    last_path: Option<LearningPath>,
    message: Option<String>,
    quit: bool,
}

fn is_interact(key: Key) -> bool {
    key.is_confirm() || key == Key::Char('e')
}

impl GameShell {
    pub fn new(library: ContentLibrary, seed: u64) -> Self {
        GameShell {
            library,
            screen: Screen::Menu,
            session: None,
            selector: Player::new(selector_start()),
            seed,
            runs_started: 0,
            high_score: 0,
            last_score: None,
            last_path: None,
            message: None,
            quit: false,
        }
    }

    /// Builds fresh rooms for `path` and enters gameplay.
    pub fn start(&mut self, path: LearningPath) -> Result<()> {
        let seed = self.seed.wrapping_add(self.runs_started.wrapping_mul(1000));
        let run = self.library.build(path, seed)?;
        self.runs_started += 1;
        self.session = Some(GameSession::new(run, seed));
        self.last_path = Some(path);
        self.last_score = None;
        self.message = None;
        self.screen = Screen::Gameplay;
        Ok(())
    }

    pub fn handle_input(&mut self, event: InputEvent) -> Result<()> {
        match self.screen {
            Screen::Menu => match event {
                InputEvent::KeyDown(Key::Enter) => self.enter_path_selection(),
                InputEvent::KeyDown(Key::Char('i')) => self.screen = Screen::Instructions,
                InputEvent::KeyDown(Key::Escape | Key::Char('q')) => self.quit = true,
                _ => {}
            },
            Screen::Instructions => {
                if matches!(event, InputEvent::KeyDown(Key::Enter | Key::Escape)) {
                    self.screen = Screen::Menu;
                }
            }
            Screen::PathSelection => return self.path_selection_input(event),
            Screen::Gameplay => self.gameplay_input(event),
            Screen::GameOver(_) | Screen::Victory => match event {
                InputEvent::KeyDown(Key::Enter) => self.back_to_menu(),
                InputEvent::KeyDown(Key::Escape | Key::Char('q')) => self.quit = true,
                _ => {}
            },
        }
        Ok(())
    }

    fn enter_path_selection(&mut self) {
        self.selector.place(selector_start());
        self.screen = Screen::PathSelection;
    }

    fn path_selection_input(&mut self, event: InputEvent) -> Result<()> {
        let InputEvent::KeyDown(key) = event else {
            return Ok(());
        };
        if key == Key::Escape {
            self.screen = Screen::Menu;
            return Ok(());
        }
        let Some(dir) = key.direction() else {
            return Ok(());
        };
        self.selector.step(dir, |_| false);
        let x = self.selector.rect().center().x;
        if x < WORLD_WIDTH / 3 {
            self.start(LearningPath::Scrum)?;
        } else if x > WORLD_WIDTH * 2 / 3 {
            self.start(LearningPath::Pmbok)?;
        }
        Ok(())
    }

    fn gameplay_input(&mut self, event: InputEvent) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let (run, player) = session.parts_mut();
        let room = run.current_room_mut();

        if room.overlay() != Overlay::None {
            if let Some(outcome) = room.handle_overlay_input(event) {
                debug!("room {}: {:?}", room.meta().id, outcome);
            }
            return;
        }

        let InputEvent::KeyDown(key) = event else {
            return;
        };
        if key == Key::Escape {
            info!("run abandoned, back to menu");
            self.back_to_menu();
            return;
        }
        if let Some(dir) = key.direction() {
            player.step(dir, |feet| room.check_collision(feet));
            self.message = None;
            return;
        }
        if is_interact(key) {
            self.interact();
        }
    }

    /// Interact key. An open exit wins, then the unfinished mission, then
    /// the info point.
    fn interact(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let body = session.player().rect();
        let room = session.run_mut().current_room_mut();
        let at_exit = room.check_transition_proximity(&body);
        let near_mission = room.check_mission_proximity(&body);
        if at_exit && room.is_advance_ready() {
            self.leave_room();
        } else if near_mission && !room.activity().machine().is_completed() {
            room.open_activity();
        } else if room.check_info_proximity(&body) {
            room.open_info();
        } else if at_exit {
            self.message = Some("Complete the mission before leaving the room.".into());
        } else if near_mission {
            self.message = Some("Mission already completed.".into());
        } else {
            self.message = Some("Nothing to interact with here.".into());
        }
    }

    /// Goes through the exit: next room, or victory after the last one.
    fn leave_room(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.advance() {
            self.message = Some(session.run().current_room().narrative().intro.clone());
        } else {
            self.finish_victory();
        }
    }

    /// Per-frame tick: counts down the clock and polls the room for a
    /// failed activity.
    pub fn update(&mut self, elapsed: Duration) {
        if self.screen != Screen::Gameplay {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.tick(elapsed);
        let room = session.run_mut().current_room_mut();
        room.update();
        if room.is_failed() {
            let mut lines: Vec<&str> = Vec::new();
            if let Some(failure) = &room.narrative().failure {
                lines.push(failure);
            }
            if let Some(feedback) = room.activity().machine().last_feedback() {
                lines.push(&feedback.message);
            }
            self.message = Some(lines.join("\n\n"));
            self.finish_game_over(GameOverReason::ActivityFailed);
        } else if session.is_time_up() {
            self.message = Some("The clock ran out.".into());
            self.finish_game_over(GameOverReason::TimeUp);
        }
    }

    fn finish_game_over(&mut self, reason: GameOverReason) {
        let Some(session) = self.session.take() else {
            return;
        };
        let score = session.game_over_score();
        warn!(
            "game over on {} path ({:?}): {} rooms, score {}",
            session.path(),
            reason,
            score.rooms,
            score.total
        );
        self.record(score);
        self.screen = Screen::GameOver(reason);
    }

    fn finish_victory(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let score = session.victory_score();
        info!(
            "victory on {} path: {} rooms = {} + time bonus {} = {}",
            session.path(),
            score.rooms,
            score.room_points,
            score.time_bonus,
            score.total
        );
        self.record(score);
        self.message = None;
        self.screen = Screen::Victory;
    }

    fn record(&mut self, score: ScoreCard) {
        if score.total > self.high_score {
            self.high_score = score.total;
        }
        self.last_score = Some(score);
    }

    fn back_to_menu(&mut self) {
        self.session = None;
        self.message = None;
        self.screen = Screen::Menu;
    }

    /// Draws the world area of the current screen. Menus and end screens
    /// have no world and draw nothing.
    pub fn render_world(&self, canvas: &mut dyn Canvas) {
        match self.screen {
            Screen::PathSelection => {
                let third = WORLD_WIDTH / 3;
                canvas.fill_rect(Rect::new(0, 0, WORLD_WIDTH, WORLD_HEIGHT), Tone::Floor);
                canvas.fill_rect(Rect::new(0, 0, third, WORLD_HEIGHT), Tone::Transition);
                canvas.fill_rect(Rect::new(2 * third, 0, third, WORLD_HEIGHT), Tone::Transition);
                canvas.text(Point::new(20, 20), "<- Scrum", Tone::Highlight);
                canvas.text(Point::new(2 * third + 20, 20), "PMBOK ->", Tone::Highlight);
                canvas.fill_rect(self.selector.rect(), Tone::Player);
            }
            Screen::Gameplay => {
                let Some(session) = &self.session else {
                    return;
                };
                let room = session.run().current_room();
                room.render(canvas);
                canvas.fill_rect(session.player().rect(), Tone::Player);
                canvas.stroke_rect(session.player().feet(), Tone::Highlight);
                room.render_overlay(canvas);
            }
            _ => {}
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut GameSession> {
        self.session.as_mut()
    }

    pub fn current_room(&self) -> Option<&Room> {
        self.session.as_ref().map(|s| s.run().current_room())
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn last_score(&self) -> Option<ScoreCard> {
        self.last_score
    }

    pub fn last_path(&self) -> Option<LearningPath> {
        self.last_path
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn selector(&self) -> &Player {
        &self.selector
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn request_quit(&mut self) {
        self.quit = true;
    }
}

fn selector_start() -> Point {
    Point::new(
        (WORLD_WIDTH - PLAYER_WIDTH) / 2,
        (WORLD_HEIGHT - PLAYER_HEIGHT) / 2,
    )
}
