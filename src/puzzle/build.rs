use std::collections::{BTreeMap, BTreeSet};

use super::types::{ActivityDef, EvaluationDef, KindDef, RoomDef, RuleDef};
use crate::activity::{
    ActivityControls, ActivityKind, ActivityStateMachine, AnswerRule, Card, Challenge,
    EvaluationMode, ItemId, SlotId,
};
use crate::error::{EscapeError, Result};
use crate::geometry::{Point, Rect};
use crate::room::{Room, RoomGeometry};
use crate::settings::{
    ERROR_BUDGET, INFO_PADDING, MISSION_PADDING, PLAYER_HEIGHT, PLAYER_WIDTH, TRANSITION_PADDING,
    WORLD_HEIGHT, WORLD_WIDTH,
};

/// Builds a playable room. Every rect is shifted by the layout offset here,
/// once, so the room only ever sees world coordinates.
pub fn build_room(def: &RoomDef, seed: u64) -> Result<Room> {
    let layout = &def.layout;
    let [dx, dy] = layout.offset;
    let shift = |r: Rect| r.translate(dx, dy);
    let padding = |p: Option<[i32; 2]>, default: (i32, i32)| p.map_or(default, |[w, h]| (w, h));

    let spawn = layout.spawn.map_or(
        Point::new(WORLD_WIDTH - PLAYER_WIDTH - 50, WORLD_HEIGHT - PLAYER_HEIGHT - 50),
        |[x, y]| Point::new(x + dx, y + dy),
    );

    let geometry = RoomGeometry {
        collision: layout.collision.iter().copied().map(shift).collect(),
        mission: shift(layout.mission),
        mission_padding: padding(layout.mission_padding, MISSION_PADDING),
        transition: shift(layout.transition),
        transition_padding: padding(layout.transition_padding, TRANSITION_PADDING),
        transition_rule: layout.transition_rule,
        info: layout.info.map(shift),
        info_padding: padding(layout.info_padding, INFO_PADDING),
        spawn,
    };

    let controls = build_activity(&def.meta.id, &def.activity, &def.narrative.success, seed)?;
    Ok(Room::new(
        def.meta.clone(),
        def.narrative.clone(),
        geometry,
        controls,
        def.requires_activity,
    ))
}

fn build_activity(room: &str, def: &ActivityDef, success: &str, seed: u64) -> Result<ActivityControls> {
    let (kind, default_mode) = match def.kind {
        KindDef::Quiz => (ActivityKind::Quiz, EvaluationMode::Immediate),
        KindDef::Matching => (ActivityKind::Matching, EvaluationMode::Immediate),
        KindDef::Ordering => (ActivityKind::Ordering, EvaluationMode::ExplicitSubmit),
        KindDef::Board => (ActivityKind::Board, EvaluationMode::ExplicitSubmit),
    };
    let mode = match def.evaluation {
        Some(EvaluationDef::Immediate) => EvaluationMode::Immediate,
        Some(EvaluationDef::ExplicitSubmit) => EvaluationMode::ExplicitSubmit,
        None => default_mode,
    };

    let challenges = match kind {
        ActivityKind::Quiz => quiz_challenges(def),
        ActivityKind::Ordering => vec![ordering_challenge(room, def)?],
        ActivityKind::Matching | ActivityKind::Board => vec![placement_challenge(room, def, kind)?],
    };

    let mut machine = ActivityStateMachine::new(challenges, mode, def.error_budget.unwrap_or(ERROR_BUDGET))
        .with_success_message(success);
    if let Some(ticks) = def.auto_advance_ticks {
        machine = machine.with_auto_advance(ticks);
    }
    Ok(ActivityControls::new(kind, &def.title, &def.instructions, machine, seed))
}

fn quiz_challenges(def: &ActivityDef) -> Vec<Challenge> {
    def.questions
        .iter()
        .map(|q| Challenge {
            prompt: q.prompt.clone(),
            items: q
                .options
                .iter()
                .enumerate()
                .map(|(i, text)| Card::new(i.to_string(), text))
                .collect(),
            slots: Vec::new(),
            slot_capacity: None,
            rule: AnswerRule::SingleChoice { correct: q.answer },
            explanation: if q.explanation.is_empty() {
                def.explanation.clone()
            } else {
                q.explanation.clone()
            },
        })
        .collect()
}

fn items(def: &ActivityDef) -> Vec<Card> {
    def.items
        .iter()
        .map(|i| Card::new(&i.id, &i.label).with_detail(&i.detail))
        .collect()
}

fn ordering_challenge(room: &str, def: &ActivityDef) -> Result<Challenge> {
    let mut expected: BTreeMap<ItemId, SlotId> = BTreeMap::new();
    for item in &def.items {
        let rank = item
            .rank
            .ok_or_else(|| EscapeError::invalid(room, format!("item '{}' has no rank", item.id)))?;
        expected.insert(item.id.clone(), rank.to_string());
    }
    Ok(Challenge {
        prompt: def.prompt.clone(),
        items: items(def),
        slots: (1..=def.items.len())
            .map(|n| Card::new(n.to_string(), format!("#{n}")))
            .collect(),
        slot_capacity: Some(1),
        rule: AnswerRule::FullAssignmentMatch { expected },
        explanation: def.explanation.clone(),
    })
}

fn placement_challenge(room: &str, def: &ActivityDef, kind: ActivityKind) -> Result<Challenge> {
    let default_rule = match kind {
        ActivityKind::Board => RuleDef::Membership,
        _ => RuleDef::FullMatch,
    };
    let rule = match def.rule.unwrap_or(default_rule) {
        RuleDef::FullMatch => {
            let mut expected = BTreeMap::new();
            for item in &def.items {
                let [target] = item.targets.as_slice() else {
                    return Err(EscapeError::invalid(
                        room,
                        format!("item '{}' needs exactly one target for a full match", item.id),
                    ));
                };
                expected.insert(item.id.clone(), target.clone());
            }
            AnswerRule::FullAssignmentMatch { expected }
        }
        RuleDef::Membership => AnswerRule::SetMembership {
            allowed: def
                .items
                .iter()
                .map(|i| (i.id.clone(), i.targets.iter().cloned().collect::<BTreeSet<_>>()))
                .collect(),
        },
    };
    let slot_capacity = match kind {
        ActivityKind::Matching => Some(def.slot_capacity.unwrap_or(1)),
        _ => def.slot_capacity,
    };
    Ok(Challenge {
        prompt: def.prompt.clone(),
        items: items(def),
        slots: def
            .slots
            .iter()
            .map(|s| Card::new(&s.id, &s.label).with_detail(&s.detail))
            .collect(),
        slot_capacity,
        rule,
        explanation: def.explanation.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::SubmitOutcome;

    const BOARD: &str = r#"
[meta]
id = "b-1"
room_number = 2
title = "Board"
concept = "Kanban"

[narrative]
intro = "Sort"
success = "Sorted"

[layout]
offset = [10, 20]
collision = [[0, 0, 10, 10]]
mission = [100, 100, 50, 50]
transition = [300, 300, 50, 50]
spawn = [200, 200]

[activity]
kind = "board"
title = "Kanban"

[[activity.items]]
id = "a"
label = "Logo"
targets = ["done"]

[[activity.items]]
id = "b"
label = "Docs"
targets = ["todo", "doing"]

[[activity.slots]]
id = "todo"
label = "To do"

[[activity.slots]]
id = "doing"
label = "In progress"

[[activity.slots]]
id = "done"
label = "Done"
"#;

    fn parse(text: &str) -> RoomDef {
        toml::from_str(text).unwrap()
    }

    #[test]
    fn offset_is_applied_once() {
        let room = build_room(&parse(BOARD), 1).unwrap();
        assert!(room.check_collision(&Rect::new(15, 25, 0, 0)));
        assert!(!room.check_collision(&Rect::new(5, 5, 0, 0)));
        assert_eq!(room.spawn(), Point::new(210, 220));
        assert_eq!(room.geometry().mission, Rect::new(110, 120, 50, 50));
    }

    #[test]
    fn board_defaults_to_explicit_membership() {
        let mut room = build_room(&parse(BOARD), 1).unwrap();
        let controls = room.activity();
        assert_eq!(controls.kind(), ActivityKind::Board);
        assert_eq!(controls.machine().mode(), EvaluationMode::ExplicitSubmit);
        assert!(matches!(
            controls.machine().challenge().map(|c| &c.rule),
            Some(AnswerRule::SetMembership { .. })
        ));

        room.open_activity();
        let m = room.activity_mut().machine_mut();
        assert_eq!(m.place("a", "done"), SubmitOutcome::Recorded);
        assert_eq!(m.place("b", "doing"), SubmitOutcome::Recorded);
        assert_eq!(m.submit(), SubmitOutcome::Completed);
    }

    #[test]
    fn full_match_needs_single_targets() {
        let text = BOARD.replace("kind = \"board\"", "kind = \"matching\"");
        let err = build_room(&parse(&text), 1).unwrap_err();
        assert!(matches!(err, EscapeError::InvalidContent { .. }));
    }

    #[test]
    fn missing_spawn_uses_bottom_right() {
        let text = BOARD.replace("spawn = [200, 200]\n", "");
        let room = build_room(&parse(&text), 1).unwrap();
        assert_eq!(
            room.spawn(),
            Point::new(WORLD_WIDTH - PLAYER_WIDTH - 50, WORLD_HEIGHT - PLAYER_HEIGHT - 50)
        );
    }
}
