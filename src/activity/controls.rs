use std::collections::BTreeMap;

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::challenge::{Candidate, ItemId, PlacementAssignment, SlotId};
use super::machine::{ActivityStateMachine, EvaluationMode, FeedbackKind, SubmitOutcome};
use crate::geometry::{Point, Rect};
use crate::input::{InputEvent, Key};
use crate::render::{Canvas, Tone};
use crate::settings::DROP_SLACK;

/// Presentation family of an activity. Decides layout and controls; the
/// judging itself lives in the challenge's answer rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Quiz,
    Matching,
    Ordering,
    Board,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSpot {
    pub id: ItemId,
    pub home: Rect,
    pub rect: Rect,
}

/// Interactive regions of the open activity, in world coordinates.
#[derive(Debug, Clone, Default)]
pub struct ActivityLayout {
    pub panel: Rect,
    pub prompt: Rect,
    /// Quiz options in display order, paired with their index in the challenge.
    pub options: Vec<(usize, Rect)>,
    pub cards: Vec<CardSpot>,
    pub slots: Vec<(SlotId, Rect)>,
    pub submit: Option<Rect>,
    pub close: Rect,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    card: usize,
    offset: Point,
}

/// Input and layout adapter around an [`ActivityStateMachine`].
///
/// Owns the seeded RNG used to shuffle options and cards, so a given seed
/// always produces the same presentation.
#[derive(Debug, Clone)]
pub struct ActivityControls {
    kind: ActivityKind,
    title: String,
    instructions: String,
    machine: ActivityStateMachine,
    rng: StdRng,
    container: Rect,
    layout: ActivityLayout,
    order: Vec<ItemId>,
    laid_out_for: usize,
    cursor: usize,
    slot_cursor: usize,
    grabbed: bool,
    drag: Option<Drag>,
}

impl ActivityControls {
    pub fn new(
        kind: ActivityKind,
        title: impl Into<String>,
        instructions: impl Into<String>,
        machine: ActivityStateMachine,
        seed: u64,
    ) -> Self {
        ActivityControls {
            kind,
            title: title.into(),
            instructions: instructions.into(),
            machine,
            rng: StdRng::seed_from_u64(seed),
            container: Rect::default(),
            layout: ActivityLayout::default(),
            order: Vec::new(),
            laid_out_for: 0,
            cursor: 0,
            slot_cursor: 0,
            grabbed: false,
            drag: None,
        }
    }

    /// Starts (or restarts) the activity inside `container`.
    pub fn activate(&mut self, container: Rect) {
        self.machine.activate();
        self.container = container;
        self.relayout_frame();
        self.relayout_challenge();
    }

    pub fn close(&mut self) {
        self.machine.deactivate();
        self.drag = None;
        self.grabbed = false;
    }

    pub fn update(&mut self) {
        self.machine.update();
        self.sync_challenge();
    }

    pub fn handle_input(&mut self, event: InputEvent) -> Option<SubmitOutcome> {
        if !self.machine.is_active() {
            return None;
        }
        if self.machine.is_showing_feedback() {
            let dismiss = match event {
                InputEvent::KeyDown(key) => key.is_confirm(),
                InputEvent::PointerDown(_) => true,
                _ => false,
            };
            if dismiss {
                self.machine.dismiss_feedback();
                self.sync_challenge();
                self.place_cards();
            }
            return None;
        }
        if self.machine.is_terminal() {
            return None;
        }

        let outcome = match event {
            InputEvent::KeyDown(key) => self.handle_key(key),
            InputEvent::PointerDown(p) => self.pointer_down(p),
            InputEvent::PointerMove(p) => {
                self.pointer_move(p);
                None
            }
            InputEvent::PointerUp(p) => self.pointer_up(p),
        };
        if let Some(outcome) = &outcome {
            debug!("{} -> {:?}", self.title, outcome);
        }
        self.place_cards();
        outcome
    }

    fn handle_key(&mut self, key: Key) -> Option<SubmitOutcome> {
        match self.kind {
            ActivityKind::Quiz => self.quiz_key(key),
            ActivityKind::Matching | ActivityKind::Board => self.board_key(key),
            ActivityKind::Ordering => self.ordering_key(key),
        }
    }

    fn quiz_key(&mut self, key: Key) -> Option<SubmitOutcome> {
        let count = self.layout.options.len();
        match key {
            Key::Up => {
                self.cursor = step(self.cursor, count, -1);
                None
            }
            Key::Down | Key::Tab => {
                self.cursor = step(self.cursor, count, 1);
                None
            }
            Key::Enter | Key::Space => self.choose(self.cursor),
            Key::Char(c) => {
                let n = c.to_digit(10)? as usize;
                if n >= 1 && n <= count {
                    self.cursor = n - 1;
                    self.choose(n - 1)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn choose(&mut self, shown: usize) -> Option<SubmitOutcome> {
        let (index, _) = *self.layout.options.get(shown)?;
        Some(self.machine.submit_answer(Candidate::Choice(index)))
    }

    fn board_key(&mut self, key: Key) -> Option<SubmitOutcome> {
        let cards = self.layout.cards.len();
        let slots = self.layout.slots.len();
        match key {
            Key::Up => {
                self.cursor = step(self.cursor, cards, -1);
                None
            }
            Key::Down | Key::Tab => {
                self.cursor = step(self.cursor, cards, 1);
                None
            }
            Key::Left => {
                self.slot_cursor = step(self.slot_cursor, slots, -1);
                None
            }
            Key::Right => {
                self.slot_cursor = step(self.slot_cursor, slots, 1);
                None
            }
            Key::Enter | Key::Space => {
                let item = self.layout.cards.get(self.cursor)?.id.clone();
                let slot = self.layout.slots.get(self.slot_cursor)?.0.clone();
                Some(self.machine.place(&item, &slot))
            }
            Key::Backspace => {
                let item = self.layout.cards.get(self.cursor)?.id.clone();
                self.machine.unplace(&item);
                None
            }
            Key::Char('v') | Key::Char('c') => self.submit_if_explicit(),
            _ => None,
        }
    }

    fn ordering_key(&mut self, key: Key) -> Option<SubmitOutcome> {
        let count = self.order.len();
        match key {
            Key::Up | Key::Down => {
                let delta = if key == Key::Up { -1 } else { 1 };
                let next = step(self.cursor, count, delta);
                if self.grabbed && count > 1 {
                    self.order.swap(self.cursor, next);
                    self.sync_order();
                }
                self.cursor = next;
                None
            }
            Key::Space => {
                self.grabbed = !self.grabbed;
                None
            }
            Key::Enter | Key::Char('v') | Key::Char('c') => {
                self.grabbed = false;
                self.sync_order();
                Some(self.machine.submit())
            }
            _ => None,
        }
    }

    fn submit_if_explicit(&mut self) -> Option<SubmitOutcome> {
        (self.machine.mode() == EvaluationMode::ExplicitSubmit).then(|| self.machine.submit())
    }

    fn pointer_down(&mut self, p: Point) -> Option<SubmitOutcome> {
        if self.layout.submit.is_some_and(|r| r.contains(p)) {
            if self.kind == ActivityKind::Ordering {
                self.sync_order();
            }
            return self.submit_if_explicit();
        }
        match self.kind {
            ActivityKind::Quiz => {
                let shown = self.layout.options.iter().position(|(_, r)| r.contains(p))?;
                self.cursor = shown;
                self.choose(shown)
            }
            _ => {
                let index = self.layout.cards.iter().position(|c| c.rect.contains(p))?;
                let card = &self.layout.cards[index];
                if self.machine.is_resolved(&card.id) {
                    return None;
                }
                self.drag = Some(Drag {
                    card: index,
                    offset: Point::new(p.x - card.rect.x, p.y - card.rect.y),
                });
                self.cursor = self.order_position(index);
                None
            }
        }
    }

    fn pointer_move(&mut self, p: Point) {
        let Some(drag) = self.drag else {
            return;
        };
        let vertical_only = self.kind == ActivityKind::Ordering;
        if let Some(card) = self.layout.cards.get_mut(drag.card) {
            let x = if vertical_only { card.rect.x } else { p.x - drag.offset.x };
            card.rect = card.rect.with_origin(x, p.y - drag.offset.y);
        }
    }

    fn pointer_up(&mut self, p: Point) -> Option<SubmitOutcome> {
        self.pointer_move(p);
        let drag = self.drag.take()?;
        let card = self.layout.cards.get(drag.card)?.clone();

        if self.kind == ActivityKind::Ordering {
            let mut by_y: Vec<(i32, ItemId)> = self
                .layout
                .cards
                .iter()
                .map(|c| (c.rect.y, c.id.clone()))
                .collect();
            by_y.sort_by_key(|(y, _)| *y);
            self.order = by_y.into_iter().map(|(_, id)| id).collect();
            self.sync_order();
            return None;
        }

        let centre = card.rect.center();
        let target = self
            .layout
            .slots
            .iter()
            .find(|(_, r)| r.inflate(DROP_SLACK * 2, DROP_SLACK * 2).contains(centre))
            .map(|(id, _)| id.clone());
        match target {
            Some(slot) => {
                if let Some(i) = self.layout.slots.iter().position(|(id, _)| *id == slot) {
                    self.slot_cursor = i;
                }
                Some(self.machine.place(&card.id, &slot))
            }
            None => {
                self.machine.unplace(&card.id);
                None
            }
        }
    }

    fn order_position(&self, card: usize) -> usize {
        match self.kind {
            ActivityKind::Ordering => {
                let id = &self.layout.cards[card].id;
                self.order.iter().position(|o| o == id).unwrap_or(0)
            }
            _ => card,
        }
    }

    fn sync_order(&mut self) {
        let Some(challenge) = self.machine.challenge() else {
            return;
        };
        let assignment: PlacementAssignment = self
            .order
            .iter()
            .zip(challenge.slots.iter())
            .map(|(item, slot)| (item.clone(), slot.id.clone()))
            .collect();
        self.machine.set_assignment(assignment);
    }

    fn sync_challenge(&mut self) {
        if self.machine.is_active() && self.machine.current_index() != self.laid_out_for {
            self.relayout_challenge();
        }
    }

    fn relayout_frame(&mut self) {
        let c = self.container;
        let panel = c.inflate(-(c.w / 5), -(c.h * 15 / 100));
        let prompt = Rect::new(panel.x + 10, panel.y + 10, panel.w - 20, 70);
        let bar_y = panel.bottom() - 45;
        let close = Rect::new(panel.right() - 110, bar_y, 100, 35);
        let submit = match (self.kind, self.machine.mode()) {
            (ActivityKind::Quiz, _) | (_, EvaluationMode::Immediate) => None,
            _ => Some(Rect::new(panel.x + 10, bar_y, 140, 35)),
        };
        self.layout = ActivityLayout {
            panel,
            prompt,
            options: Vec::new(),
            cards: Vec::new(),
            slots: Vec::new(),
            submit,
            close,
        };
    }

    fn body(&self) -> Rect {
        let top = self.layout.prompt.bottom() + 10;
        let bottom = self.layout.panel.bottom() - 55;
        Rect::new(
            self.layout.panel.x + 10,
            top,
            self.layout.panel.w - 20,
            (bottom - top).max(0),
        )
    }

    fn relayout_challenge(&mut self) {
        self.laid_out_for = self.machine.current_index();
        self.cursor = 0;
        self.slot_cursor = 0;
        self.grabbed = false;
        self.drag = None;
        self.layout.options.clear();
        self.layout.cards.clear();
        self.layout.slots.clear();

        let Some(challenge) = self.machine.challenge() else {
            return;
        };
        let mut items: Vec<ItemId> = challenge.items.iter().map(|c| c.id.clone()).collect();
        let mut slots: Vec<SlotId> = challenge.slots.iter().map(|c| c.id.clone()).collect();
        let option_count = challenge.items.len();
        let body = self.body();

        match self.kind {
            ActivityKind::Quiz => {
                let mut shown: Vec<usize> = (0..option_count).collect();
                shown.shuffle(&mut self.rng);
                let rects = stack(body, shown.len(), 12, 70);
                self.layout.options = shown.into_iter().zip(rects).collect();
            }
            ActivityKind::Matching => {
                items.shuffle(&mut self.rng);
                slots.shuffle(&mut self.rng);
                let left = Rect::new(body.x, body.y, body.w * 2 / 5, body.h);
                let right = Rect::new(body.x + body.w * 9 / 20, body.y, body.w * 11 / 20, body.h);
                self.layout.cards = spots(&items, stack(left, items.len(), 10, 90));
                self.layout.slots = slots.iter().cloned().zip(stack(right, slots.len(), 10, 100)).collect();
            }
            ActivityKind::Board => {
                items.shuffle(&mut self.rng);
                let columns_h = body.h * 3 / 5;
                let columns = Rect::new(body.x, body.y, body.w, columns_h);
                let tray = Rect::new(body.x, body.y + columns_h + 10, body.w, body.h - columns_h - 10);
                self.layout.slots = slots.iter().cloned().zip(row(columns, slots.len(), 4)).collect();
                let card_h = ((columns_h - 26) / items.len().max(1) as i32 - 4).clamp(20, 45);
                let tray_cards: Vec<Rect> = row(tray, items.len(), 4)
                    .into_iter()
                    .map(|r| Rect::new(r.x, r.y, r.w, card_h))
                    .collect();
                self.layout.cards = spots(&items, tray_cards);
            }
            ActivityKind::Ordering => {
                items.shuffle(&mut self.rng);
                self.layout.cards = spots(&items, stack(body, items.len(), 6, 80));
                self.order = items;
                self.sync_order();
            }
        }
        self.place_cards();
    }

    /// Moves cards to their slot or home position, leaving a dragged card alone.
    fn place_cards(&mut self) {
        let dragged = self.drag.map(|d| d.card);
        match self.kind {
            ActivityKind::Quiz => {}
            ActivityKind::Ordering => {
                let homes: Vec<Rect> = self.layout.cards.iter().map(|c| c.home).collect();
                let mut sorted = homes.clone();
                sorted.sort_by_key(|r| r.y);
                for (index, card) in self.layout.cards.iter_mut().enumerate() {
                    if dragged == Some(index) {
                        continue;
                    }
                    if let Some(pos) = self.order.iter().position(|id| *id == card.id) {
                        card.rect = sorted.get(pos).copied().unwrap_or(card.home);
                    }
                }
            }
            ActivityKind::Matching | ActivityKind::Board => {
                let working = self.machine.working();
                let single = self
                    .machine
                    .challenge()
                    .and_then(|c| c.slot_capacity)
                    .is_some_and(|cap| cap == 1);
                let header = |r: Rect| if single { r.h / 2 } else { 24 };
                let mut stacked: BTreeMap<&str, i32> = BTreeMap::new();
                for (index, card) in self.layout.cards.iter_mut().enumerate() {
                    if dragged == Some(index) {
                        continue;
                    }
                    let slot_rect = working.slot_of(&card.id).and_then(|slot| {
                        self.layout
                            .slots
                            .iter()
                            .find(|(id, _)| id == slot)
                            .map(|(id, r)| (id.as_str(), *r))
                    });
                    card.rect = match slot_rect {
                        Some((slot, r)) => {
                            let k = stacked.entry(slot).or_insert(0);
                            let h = if single {
                                (r.h / 2 - 4).clamp(1, card.home.h)
                            } else {
                                card.home.h
                            };
                            let placed = Rect::new(
                                r.x + 4,
                                r.y + header(r) + *k * (h + 4),
                                card.home.w.min(r.w - 8),
                                h,
                            );
                            *k += 1;
                            placed
                        }
                        None => card.home,
                    };
                }
            }
        }
    }

    pub fn kind(&self) -> ActivityKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn machine(&self) -> &ActivityStateMachine {
        &self.machine
    }

    #[cfg(test)]
    pub(crate) fn machine_mut(&mut self) -> &mut ActivityStateMachine {
        &mut self.machine
    }

    pub fn layout(&self) -> &ActivityLayout {
        &self.layout
    }

    /// Highlighted option or card, in display order.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn slot_cursor(&self) -> usize {
        self.slot_cursor
    }

    pub fn is_grabbed(&self) -> bool {
        self.grabbed
    }

    pub fn order(&self) -> &[ItemId] {
        &self.order
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn render(&self, canvas: &mut dyn Canvas) {
        let layout = &self.layout;
        canvas.fill_rect(layout.panel, Tone::Panel);
        canvas.stroke_rect(layout.panel, Tone::Highlight);

        let Some(challenge) = self.machine.challenge() else {
            return;
        };
        let mut heading = self.title.clone();
        if self.machine.challenge_count() > 1 {
            heading.push_str(&format!(
                " ({}/{})",
                self.machine.current_index() + 1,
                self.machine.challenge_count()
            ));
        }
        canvas.text(Point::new(layout.prompt.x, layout.prompt.y), &heading, Tone::Highlight);
        let errors = format!(
            "Errors {}/{}",
            self.machine.error_count(),
            self.machine.error_budget()
        );
        canvas.text(
            Point::new(layout.panel.right() - 120, layout.prompt.y),
            &errors,
            Tone::Bad,
        );
        let prompt_body = Rect::new(
            layout.prompt.x,
            layout.prompt.y + 20,
            layout.prompt.w,
            layout.prompt.h - 20,
        );
        let prompt = if challenge.prompt.is_empty() {
            &self.instructions
        } else {
            &challenge.prompt
        };
        canvas.text_block(prompt_body, prompt, Tone::Text);

        for (shown, (index, rect)) in layout.options.iter().enumerate() {
            let label = challenge.items.get(*index).map_or("", |c| c.label.as_str());
            canvas.fill_rect(*rect, Tone::Card);
            if shown == self.cursor {
                canvas.stroke_rect(*rect, Tone::Highlight);
            }
            canvas.text_block(*rect, &format!("{}. {}", shown + 1, label), Tone::Text);
        }

        for (i, (id, rect)) in layout.slots.iter().enumerate() {
            canvas.fill_rect(*rect, Tone::Slot);
            let tone = if i == self.slot_cursor { Tone::Highlight } else { Tone::Wall };
            canvas.stroke_rect(*rect, tone);
            let label = challenge.slot(id).map_or(id.as_str(), |c| c.label.as_str());
            canvas.text_block(Rect::new(rect.x + 2, rect.y + 2, rect.w - 4, 20), label, Tone::Text);
        }

        for (i, card) in layout.cards.iter().enumerate() {
            let label = challenge.item(&card.id).map_or(card.id.as_str(), |c| c.label.as_str());
            let resolved = self.machine.is_resolved(&card.id);
            canvas.fill_rect(card.rect, if resolved { Tone::Good } else { Tone::Card });
            let selected = match self.kind {
                ActivityKind::Ordering => self.order.get(self.cursor) == Some(&card.id),
                _ => i == self.cursor,
            };
            if selected || self.drag.is_some_and(|d| d.card == i) {
                canvas.stroke_rect(card.rect, Tone::Highlight);
            }
            let text = match self.kind {
                ActivityKind::Ordering => {
                    let pos = self.order.iter().position(|o| *o == card.id).unwrap_or(0);
                    let grab = if selected && self.grabbed { "* " } else { "" };
                    format!("{grab}{}. {}", pos + 1, label)
                }
                _ => label.to_string(),
            };
            canvas.text_block(card.rect, &text, Tone::Text);
        }

        if let Some(submit) = layout.submit {
            canvas.fill_rect(submit, Tone::Button);
            canvas.text_block(submit, "Check [v]", Tone::Text);
        }
        canvas.fill_rect(layout.close, Tone::Button);
        canvas.text_block(layout.close, "Close [Esc]", Tone::Text);

        if self.machine.is_showing_feedback() {
            if let Some(feedback) = self.machine.last_feedback() {
                let tone = match feedback.kind {
                    FeedbackKind::Correct | FeedbackKind::Completed => Tone::Good,
                    FeedbackKind::Incorrect | FeedbackKind::Failed => Tone::Bad,
                    FeedbackKind::Notice => Tone::Info,
                };
                let modal = layout.panel.inflate(-layout.panel.w / 5, -layout.panel.h / 2);
                canvas.fill_rect(modal, tone);
                canvas.stroke_rect(modal, Tone::Highlight);
                canvas.text_block(
                    modal,
                    &format!("{}\n\n[Enter] continue", feedback.message),
                    Tone::Text,
                );
            }
        }
    }
}

fn step(current: usize, len: usize, delta: i32) -> usize {
    if len == 0 {
        return 0;
    }
    (current as i64 + delta as i64).rem_euclid(len as i64) as usize
}

/// Splits `area` into `n` rows separated by `gap`, each at most `max_h` tall.
fn stack(area: Rect, n: usize, gap: i32, max_h: i32) -> Vec<Rect> {
    if n == 0 {
        return Vec::new();
    }
    let n_i = n as i32;
    let h = ((area.h - gap * (n_i - 1)) / n_i).min(max_h).max(1);
    (0..n_i)
        .map(|i| Rect::new(area.x, area.y + i * (h + gap), area.w, h))
        .collect()
}

/// Splits `area` into `n` columns separated by `gap`.
fn row(area: Rect, n: usize, gap: i32) -> Vec<Rect> {
    if n == 0 {
        return Vec::new();
    }
    let n_i = n as i32;
    let w = ((area.w - gap * (n_i - 1)) / n_i).max(1);
    (0..n_i)
        .map(|i| Rect::new(area.x + i * (w + gap), area.y, w, area.h))
        .collect()
}

fn spots(ids: &[ItemId], rects: Vec<Rect>) -> Vec<CardSpot> {
    ids.iter()
        .cloned()
        .zip(rects)
        .map(|(id, rect)| CardSpot {
            id,
            home: rect,
            rect,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use super::*;
    use crate::activity::challenge::{AnswerRule, Card, Challenge};
    use crate::activity::machine::ActivityPhase;

    const WORLD: Rect = Rect::new(0, 0, 600, 600);

    fn quiz_controls(seed: u64) -> ActivityControls {
        let challenge = Challenge {
            prompt: "Backend is late. What now?".into(),
            items: vec![
                Card::new("0", "Run usability tests"),
                Card::new("1", "Add redundant servers"),
                Card::new("2", "Set milestones and add resources"),
            ],
            slots: Vec::new(),
            slot_capacity: None,
            rule: AnswerRule::SingleChoice { correct: 2 },
            explanation: String::new(),
        };
        let machine = ActivityStateMachine::new(vec![challenge], EvaluationMode::Immediate, 3);
        ActivityControls::new(ActivityKind::Quiz, "Closing", "Pick one", machine, seed)
    }

    fn board_controls(mode: EvaluationMode) -> ActivityControls {
        let allowed: BTreeMap<ItemId, BTreeSet<SlotId>> =
            [("a", "todo"), ("b", "doing"), ("c", "done")]
                .into_iter()
                .map(|(i, s)| (i.to_string(), BTreeSet::from([s.to_string()])))
                .collect();
        let challenge = Challenge {
            prompt: "Sort the tasks".into(),
            items: vec![Card::new("a", "A"), Card::new("b", "B"), Card::new("c", "C")],
            slots: vec![
                Card::new("todo", "To do"),
                Card::new("doing", "In progress"),
                Card::new("done", "Done"),
            ],
            slot_capacity: None,
            rule: AnswerRule::SetMembership { allowed },
            explanation: String::new(),
        };
        let machine = ActivityStateMachine::new(vec![challenge], mode, 3);
        ActivityControls::new(ActivityKind::Board, "Board", "Drag", machine, 9)
    }

    fn card_index(c: &ActivityControls, id: &str) -> usize {
        c.layout().cards.iter().position(|s| s.id == id).unwrap()
    }

    fn slot_index(c: &ActivityControls, id: &str) -> usize {
        c.layout().slots.iter().position(|(s, _)| s == id).unwrap()
    }

    #[test]
    fn same_seed_same_shuffle() {
        let mut a = quiz_controls(7);
        let mut b = quiz_controls(7);
        a.activate(WORLD);
        b.activate(WORLD);
        let order = |c: &ActivityControls| c.layout().options.iter().map(|(i, _)| *i).collect::<Vec<_>>();
        assert_eq!(order(&a), order(&b));
        let mut sorted = order(&a);
        sorted.sort();
        assert_eq!(sorted, vec![0, 1, 2]);
    }

    #[test]
    fn clicking_the_right_option_completes() {
        let mut c = quiz_controls(3);
        c.activate(WORLD);
        let (_, rect) = *c.layout().options.iter().find(|(i, _)| *i == 2).unwrap();
        let outcome = c.handle_input(InputEvent::PointerDown(rect.center()));
        assert_eq!(outcome, Some(SubmitOutcome::Completed));
        assert!(c.machine().is_completed());
    }

    #[test]
    fn keyboard_wrong_answer_then_dismiss() {
        let mut c = quiz_controls(3);
        c.activate(WORLD);
        let wrong = c.layout().options.iter().position(|(i, _)| *i != 2).unwrap();
        let digit = char::from_digit(wrong as u32 + 1, 10).unwrap();
        let outcome = c.handle_input(InputEvent::KeyDown(Key::Char(digit)));
        assert!(matches!(outcome, Some(SubmitOutcome::Incorrect { errors: 1, .. })));
        assert!(c.machine().is_showing_feedback());
        c.handle_input(InputEvent::KeyDown(Key::Enter));
        assert_eq!(c.machine().phase(), ActivityPhase::Presenting);
    }

    #[test]
    fn drag_and_drop_onto_column() {
        let mut c = board_controls(EvaluationMode::ExplicitSubmit);
        c.activate(WORLD);
        for (item, slot) in [("a", "todo"), ("b", "doing"), ("c", "done")] {
            let from = c.layout().cards[card_index(&c, item)].rect.center();
            let to = c.layout().slots[slot_index(&c, slot)].1.center();
            c.handle_input(InputEvent::PointerDown(from));
            assert!(c.is_dragging());
            c.handle_input(InputEvent::PointerMove(to));
            assert_eq!(
                c.handle_input(InputEvent::PointerUp(to)),
                Some(SubmitOutcome::Recorded)
            );
            let card = &c.layout().cards[card_index(&c, item)];
            let column = c.layout().slots[slot_index(&c, slot)].1;
            assert!(column.contains(card.rect.center()));
        }
        let submit = c.layout().submit.unwrap();
        assert_eq!(
            c.handle_input(InputEvent::PointerDown(submit.center())),
            Some(SubmitOutcome::Completed)
        );
    }

    #[test]
    fn dropping_outside_returns_card_home() {
        let mut c = board_controls(EvaluationMode::ExplicitSubmit);
        c.activate(WORLD);
        let i = card_index(&c, "a");
        let home = c.layout().cards[i].home;
        c.handle_input(InputEvent::PointerDown(home.center()));
        c.handle_input(InputEvent::PointerUp(Point::new(2, 2)));
        assert_eq!(c.layout().cards[i].rect, home);
        assert!(c.machine().working().is_empty());
    }

    #[test]
    fn immediate_board_keyboard_placement() {
        let mut c = board_controls(EvaluationMode::Immediate);
        c.activate(WORLD);
        assert!(c.layout().submit.is_none());
        let wrong_slot = slot_index(&c, "done");
        let a = card_index(&c, "a");
        for _ in 0..a {
            c.handle_input(InputEvent::KeyDown(Key::Down));
        }
        for _ in 0..wrong_slot {
            c.handle_input(InputEvent::KeyDown(Key::Right));
        }
        assert!(matches!(
            c.handle_input(InputEvent::KeyDown(Key::Enter)),
            Some(SubmitOutcome::Incorrect { .. })
        ));
        assert_eq!(c.layout().cards[a].rect, c.layout().cards[a].home);
    }

    #[test]
    fn ordering_by_keyboard() {
        let ids = ["h1", "h2", "h3"];
        let expected: BTreeMap<ItemId, SlotId> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.to_string(), (i + 1).to_string()))
            .collect();
        let challenge = Challenge {
            prompt: "Prioritise".into(),
            items: ids.iter().map(|id| Card::new(*id, *id)).collect(),
            slots: (1..=3).map(|n| Card::new(n.to_string(), n.to_string())).collect(),
            slot_capacity: Some(1),
            rule: AnswerRule::FullAssignmentMatch { expected },
            explanation: String::new(),
        };
        let machine = ActivityStateMachine::new(vec![challenge], EvaluationMode::ExplicitSubmit, 3);
        let mut c = ActivityControls::new(ActivityKind::Ordering, "Order", "", machine, 11);
        c.activate(WORLD);
        assert_eq!(c.machine().working().len(), 3);

        // selection sort driven through grab + move
        for target in 0..ids.len() {
            let want = ids[target];
            let at = c.order().iter().position(|id| id == want).unwrap();
            while c.cursor() != at {
                c.handle_input(InputEvent::KeyDown(Key::Down));
            }
            c.handle_input(InputEvent::KeyDown(Key::Space));
            for _ in target..at {
                c.handle_input(InputEvent::KeyDown(Key::Up));
            }
            c.handle_input(InputEvent::KeyDown(Key::Space));
        }
        assert_eq!(c.order(), &["h1", "h2", "h3"]);
        assert_eq!(
            c.handle_input(InputEvent::KeyDown(Key::Enter)),
            Some(SubmitOutcome::Completed)
        );
    }

    #[test]
    fn stack_and_row_split_evenly() {
        let rows = stack(Rect::new(0, 0, 100, 100), 4, 4, 500);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1].y, rows[0].bottom() + 4);
        let cols = row(Rect::new(0, 0, 100, 10), 3, 5);
        assert_eq!(cols[2].x, 2 * (cols[0].w + 5));
    }
}
