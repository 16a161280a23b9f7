//! Drawing contract between the core and whatever paints pixels (or cells).

use crate::geometry::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Floor,
    Wall,
    Mission,
    MissionDone,
    Transition,
    TransitionOpen,
    Info,
    Player,
    Panel,
    Card,
    Slot,
    Button,
    Text,
    Highlight,
    Good,
    Bad,
}

/// Receives draw calls in world coordinates.
pub trait Canvas {
    fn fill_rect(&mut self, rect: Rect, tone: Tone);
    fn stroke_rect(&mut self, rect: Rect, tone: Tone);
    /// Single line starting at `at`.
    fn text(&mut self, at: Point, text: &str, tone: Tone);
    /// Text wrapped to fit inside `rect`.
    fn text_block(&mut self, rect: Rect, text: &str, tone: Tone);
}

/// Records draw calls; handy for tests and headless runs.
#[derive(Debug, Default)]
pub struct DrawList {
    pub calls: Vec<DrawCall>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Fill(Rect, Tone),
    Stroke(Rect, Tone),
    Text(Point, String, Tone),
    Block(Rect, String, Tone),
}

impl DrawList {
    /// True if any text call contains `needle`.
    pub fn has_text(&self, needle: &str) -> bool {
        self.calls.iter().any(|c| match c {
            DrawCall::Text(_, t, _) | DrawCall::Block(_, t, _) => t.contains(needle),
            _ => false,
        })
    }

    pub fn count_fills(&self, tone: Tone) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Fill(_, t) if *t == tone))
            .count()
    }
}

impl Canvas for DrawList {
    fn fill_rect(&mut self, rect: Rect, tone: Tone) {
        self.calls.push(DrawCall::Fill(rect, tone));
    }

    fn stroke_rect(&mut self, rect: Rect, tone: Tone) {
        self.calls.push(DrawCall::Stroke(rect, tone));
    }

    fn text(&mut self, at: Point, text: &str, tone: Tone) {
        self.calls.push(DrawCall::Text(at, text.to_string(), tone));
    }

    fn text_block(&mut self, rect: Rect, text: &str, tone: Tone) {
        self.calls.push(DrawCall::Block(rect, text.to_string(), tone));
    }
}
