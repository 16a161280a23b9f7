use crate::geometry::{Point, Rect};
use crate::settings::{
    PLAYER_HEIGHT, PLAYER_SPEED, PLAYER_STEP_FRAMES, PLAYER_WIDTH, WORLD_HEIGHT, WORLD_WIDTH,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pos: Point,
}

impl Player {
    pub fn new(at: Point) -> Self {
        Player {
            pos: clamp(at),
        }
    }

    pub fn place(&mut self, at: Point) {
        self.pos = clamp(at);
    }

    /// Full body, used for proximity checks.
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, PLAYER_WIDTH, PLAYER_HEIGHT)
    }

    /// Bottom-centred feet box, used for collision.
    pub fn feet(&self) -> Rect {
        feet_at(self.pos)
    }

    /// Walks one key press in `dir`, frame by frame, stopping before the
    /// first frame whose feet would hit something. Returns how far it got.
    pub fn step(&mut self, (dx, dy): (i32, i32), blocked: impl Fn(&Rect) -> bool) -> i32 {
        let mut moved = 0;
        for _ in 0..PLAYER_STEP_FRAMES {
            let next = clamp(Point::new(
                self.pos.x + dx * PLAYER_SPEED,
                self.pos.y + dy * PLAYER_SPEED,
            ));
            if next == self.pos || blocked(&feet_at(next)) {
                break;
            }
            moved += (next.x - self.pos.x).abs() + (next.y - self.pos.y).abs();
            self.pos = next;
        }
        moved
    }

    pub fn position(&self) -> Point {
        self.pos
    }
}

fn feet_at(pos: Point) -> Rect {
    let w = PLAYER_WIDTH / 3;
    let h = PLAYER_HEIGHT / 4;
    Rect::new(
        pos.x + (PLAYER_WIDTH - w) / 2,
        pos.y + PLAYER_HEIGHT - h,
        w,
        h,
    )
}

fn clamp(p: Point) -> Point {
    Point::new(
        p.x.clamp(0, WORLD_WIDTH - PLAYER_WIDTH),
        p.y.clamp(0, WORLD_HEIGHT - PLAYER_HEIGHT),
    )
}
