use log::{info, warn};

use crate::activity::{ActivityControls, SubmitOutcome};
use crate::geometry::{Point, Rect};
use crate::input::{InputEvent, Key};
use crate::puzzle::{Narrative, RoomMeta, TransitionRule};
use crate::render::{Canvas, Tone};
use crate::settings::{WORLD_HEIGHT, WORLD_WIDTH};

/// Static geometry of a room, already in world coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomGeometry {
    pub collision: Vec<Rect>,
    pub mission: Rect,
    pub mission_padding: (i32, i32),
    pub transition: Rect,
    pub transition_padding: (i32, i32),
    pub transition_rule: TransitionRule,
    pub info: Option<Rect>,
    pub info_padding: (i32, i32),
    pub spawn: Point,
}

/// What is drawn over the map, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Activity,
    Info,
}

#[derive(Debug, Clone)]
pub struct Room {
    meta: RoomMeta,
    narrative: Narrative,
    geometry: RoomGeometry,
    mission_zone: Rect,
    transition_zone: Rect,
    info_zone: Option<Rect>,
    activity: ActivityControls,
    requires_activity: bool,
    overlay: Overlay,
}

impl Room {
    pub fn new(
        meta: RoomMeta,
        narrative: Narrative,
        geometry: RoomGeometry,
        activity: ActivityControls,
        requires_activity: bool,
    ) -> Self {
        let (mw, mh) = geometry.mission_padding;
        let (tw, th) = geometry.transition_padding;
        let (iw, ih) = geometry.info_padding;
        Room {
            mission_zone: geometry.mission.inflate(mw, mh),
            transition_zone: geometry.transition.inflate(tw, th),
            info_zone: geometry.info.map(|r| r.inflate(iw, ih)),
            meta,
            narrative,
            geometry,
            activity,
            requires_activity,
            overlay: Overlay::None,
        }
    }

    /// True if `candidate` intersects any wall. The caller rejects the move.
    pub fn check_collision(&self, candidate: &Rect) -> bool {
        self.geometry.collision.iter().any(|wall| wall.overlaps(candidate))
    }

    pub fn check_mission_proximity(&self, player: &Rect) -> bool {
        self.mission_zone.overlaps(player)
    }

    pub fn check_transition_proximity(&self, player: &Rect) -> bool {
        match self.geometry.transition_rule {
            TransitionRule::Overlap => self.transition_zone.overlaps(player),
            TransitionRule::Centre => {
                self.geometry.transition.contains_inclusive(player.center())
            }
        }
    }

    pub fn check_info_proximity(&self, player: &Rect) -> bool {
        self.info_zone.is_some_and(|zone| zone.overlaps(player))
    }

    pub fn is_advance_ready(&self) -> bool {
        !self.requires_activity || self.activity.machine().is_completed()
    }

    pub fn is_failed(&self) -> bool {
        self.activity.machine().is_failed()
    }

    /// Opens the embedded activity over the whole world area. A finished
    /// activity stays finished.
    pub fn open_activity(&mut self) -> bool {
        if self.activity.machine().is_completed() {
            return false;
        }
        self.activity.activate(Rect::new(0, 0, WORLD_WIDTH, WORLD_HEIGHT));
        self.overlay = Overlay::Activity;
        info!("room {}: activity '{}' opened", self.meta.id, self.activity.title());
        true
    }

    pub fn open_info(&mut self) -> bool {
        if self.geometry.info.is_none() {
            return false;
        }
        self.overlay = Overlay::Info;
        true
    }

    pub fn close_overlay(&mut self) {
        if self.overlay == Overlay::Activity {
            if !self.activity.machine().is_terminal() {
                info!("room {}: activity closed before finishing", self.meta.id);
            }
            self.activity.close();
        }
        self.overlay = Overlay::None;
    }

    /// Routes input to the open overlay. Returns the activity outcome, if
    /// the input reached the state machine.
    pub fn handle_overlay_input(&mut self, event: InputEvent) -> Option<SubmitOutcome> {
        match self.overlay {
            Overlay::None => None,
            Overlay::Info => {
                let closes = match event {
                    InputEvent::KeyDown(key) => {
                        key.is_confirm() || key == Key::Escape || key == Key::Char('e')
                    }
                    InputEvent::PointerDown(_) => true,
                    _ => false,
                };
                if closes {
                    self.overlay = Overlay::None;
                }
                None
            }
            Overlay::Activity => {
                let close_clicked = matches!(
                    event,
                    InputEvent::PointerDown(p) if self.activity.layout().close.contains(p)
                );
                if event == InputEvent::KeyDown(Key::Escape) || close_clicked {
                    self.close_overlay();
                    return None;
                }
                let outcome = self.activity.handle_input(event);
                if let Some(SubmitOutcome::Rejected(reason)) = &outcome {
                    warn!("room {}: submission rejected: {:?}", self.meta.id, reason);
                }
                outcome
            }
        }
    }

    /// Per-frame tick. Closes the activity once its final result was seen.
    pub fn update(&mut self) {
        if self.overlay != Overlay::Activity {
            return;
        }
        self.activity.update();
        let machine = self.activity.machine();
        if machine.is_completed() && machine.is_acknowledged() {
            info!("room {}: activity completed", self.meta.id);
            self.overlay = Overlay::None;
        }
    }

    pub fn render(&self, canvas: &mut dyn Canvas) {
        canvas.fill_rect(Rect::new(0, 0, WORLD_WIDTH, WORLD_HEIGHT), Tone::Floor);
        for wall in &self.geometry.collision {
            canvas.fill_rect(*wall, Tone::Wall);
        }
        let mission_tone = if self.activity.machine().is_completed() {
            Tone::MissionDone
        } else {
            Tone::Mission
        };
        canvas.fill_rect(self.geometry.mission, mission_tone);
        canvas.text(
            Point::new(self.geometry.mission.x, self.geometry.mission.y),
            "[E] mission",
            Tone::Text,
        );
        let transition_tone = if self.is_advance_ready() {
            Tone::TransitionOpen
        } else {
            Tone::Transition
        };
        canvas.stroke_rect(self.geometry.transition, transition_tone);
        if let Some(info) = self.geometry.info {
            canvas.fill_rect(info, Tone::Info);
            canvas.text(Point::new(info.x, info.y), "[E] info", Tone::Text);
        }
    }

    pub fn render_overlay(&self, canvas: &mut dyn Canvas) {
        match self.overlay {
            Overlay::None => {}
            Overlay::Activity => self.activity.render(canvas),
            Overlay::Info => {
                let panel = Rect::new(0, 0, WORLD_WIDTH, WORLD_HEIGHT)
                    .inflate(-WORLD_WIDTH / 5, -WORLD_HEIGHT / 5);
                canvas.fill_rect(panel, Tone::Panel);
                canvas.stroke_rect(panel, Tone::Info);
                let mut text = format!("{}\n\n", self.meta.concept);
                for concept in &self.narrative.concepts {
                    text.push_str(&format!("{}: {}\n", concept.name, concept.description));
                }
                text.push_str("\n[Esc] close");
                canvas.text_block(panel.inflate(-20, -20), &text, Tone::Text);
            }
        }
    }

    pub fn meta(&self) -> &RoomMeta {
        &self.meta
    }

    pub fn narrative(&self) -> &Narrative {
        &self.narrative
    }

    pub fn geometry(&self) -> &RoomGeometry {
        &self.geometry
    }

    pub fn spawn(&self) -> Point {
        self.geometry.spawn
    }

    pub fn overlay(&self) -> Overlay {
        self.overlay
    }

    pub fn activity(&self) -> &ActivityControls {
        &self.activity
    }

    pub fn activity_mut(&mut self) -> &mut ActivityControls {
        &mut self.activity
    }
}
