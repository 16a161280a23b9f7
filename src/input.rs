use crate::geometry::Point;

/// Discrete input already translated from the host's event API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    PointerDown(Point),
    PointerUp(Point),
    PointerMove(Point),
    KeyDown(Key),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Space,
    Escape,
    Tab,
    Backspace,
    Char(char),
}

impl Key {
    /// Movement vector for arrow keys (and WASD).
    pub fn direction(self) -> Option<(i32, i32)> {
        match self {
            Key::Up | Key::Char('w') => Some((0, -1)),
            Key::Down | Key::Char('s') => Some((0, 1)),
            Key::Left | Key::Char('a') => Some((-1, 0)),
            Key::Right | Key::Char('d') => Some((1, 0)),
            _ => None,
        }
    }

    pub fn is_confirm(self) -> bool {
        matches!(self, Key::Enter | Key::Space)
    }
}
