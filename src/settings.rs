//! Compile-time tuning for the game world.

/// World width in pixels. All room geometry lives in this space.
pub const WORLD_WIDTH: i32 = 600;
pub const WORLD_HEIGHT: i32 = 600;

pub const FPS: u32 = 60;

pub const PLAYER_WIDTH: i32 = 150;
pub const PLAYER_HEIGHT: i32 = 150;
/// Pixels moved per frame while a direction is held.
pub const PLAYER_SPEED: i32 = 5;
/// Frames of movement produced by one key press (terminals only report presses).
pub const PLAYER_STEP_FRAMES: i32 = 4;

/// Session time limit in seconds.
pub const TIME_LIMIT_SECS: u64 = 300;

pub const ERROR_BUDGET: u32 = 3;

pub const POINTS_PER_ROOM: u64 = 1000;
/// Points awarded per second left on the clock at victory.
pub const TIME_BONUS_RATE: f64 = 10.0;

pub const MISSION_PADDING: (i32, i32) = (100, 100);
pub const TRANSITION_PADDING: (i32, i32) = (0, 0);
pub const INFO_PADDING: (i32, i32) = (130, 60);

/// Extra margin around a slot when deciding where a dragged card was dropped.
pub const DROP_SLACK: i32 = 10;
