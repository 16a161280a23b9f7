use std::time::Duration;

use log::info;

use crate::path::{LearningPath, PathRun};
use crate::player::Player;
use crate::settings::{POINTS_PER_ROOM, TIME_BONUS_RATE, TIME_LIMIT_SECS};
use crate::timer::Countdown;

/// Final score breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreCard {
    pub rooms: usize,
    pub room_points: u64,
    pub time_bonus: u64,
    pub total: u64,
}

impl ScoreCard {
    /// `rooms * 1000 + floor(secs_left * rate)`.
    pub fn victory(rooms: usize, secs_left: f64) -> Self {
        let room_points = rooms as u64 * POINTS_PER_ROOM;
        let time_bonus = (secs_left.max(0.0) * TIME_BONUS_RATE).floor() as u64;
        ScoreCard {
            rooms,
            room_points,
            time_bonus,
            total: room_points + time_bonus,
        }
    }

    /// Room points only; no bonus when the run ends early.
    pub fn game_over(rooms: usize) -> Self {
        let room_points = rooms as u64 * POINTS_PER_ROOM;
        ScoreCard {
            rooms,
            room_points,
            time_bonus: 0,
            total: room_points,
        }
    }
}

/// State of one run from path selection to game over or victory.
#[derive(Debug, Clone)]
pub struct GameSession {
    run: PathRun,
    player: Player,
    countdown: Countdown,
    seed: u64,
}

impl GameSession {
    pub fn new(run: PathRun, seed: u64) -> Self {
        let player = Player::new(run.current_room().spawn());
        info!("{} run started with seed {}", run.path(), seed);
        GameSession {
            run,
            player,
            countdown: Countdown::new(Duration::from_secs(TIME_LIMIT_SECS)),
            seed,
        }
    }

    pub fn path(&self) -> LearningPath {
        self.run.path()
    }

    pub fn run(&self) -> &PathRun {
        &self.run
    }

    pub fn run_mut(&mut self) -> &mut PathRun {
        &mut self.run
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Run plus player, borrowed together so movement can consult the room.
    pub fn parts_mut(&mut self) -> (&mut PathRun, &mut Player) {
        (&mut self.run, &mut self.player)
    }

    /// Moves to the next room and puts the player on its spawn point.
    pub fn advance(&mut self) -> bool {
        if !self.run.advance() {
            return false;
        }
        self.player.place(self.run.current_room().spawn());
        true
    }

    pub fn tick(&mut self, elapsed: Duration) {
        self.countdown.tick(elapsed);
    }

    pub fn is_time_up(&self) -> bool {
        self.countdown.is_expired()
    }

    pub fn time_remaining(&self) -> Duration {
        self.countdown.remaining()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn victory_score(&self) -> ScoreCard {
        ScoreCard::victory(self.run.completed_rooms(), self.countdown.remaining_secs())
    }

    pub fn game_over_score(&self) -> ScoreCard {
        ScoreCard::game_over(self.run.completed_rooms())
    }
}
