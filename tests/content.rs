use std::path::PathBuf;

use pm_escape::activity::{ActivityKind, AnswerRule, EvaluationMode};
use pm_escape::geometry::Rect;
use pm_escape::player::Player;
use pm_escape::puzzle::TransitionRule;
use pm_escape::settings::{PLAYER_HEIGHT, PLAYER_WIDTH, WORLD_HEIGHT, WORLD_WIDTH};
use pm_escape::{ContentLibrary, LearningPath};

fn library() -> ContentLibrary {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("content");
    ContentLibrary::load(&dir).expect("shipped content loads")
}

#[test]
fn paths_have_the_expected_rooms() {
    let lib = library();
    let titles = |path| {
        lib.rooms(path)
            .iter()
            .map(|r| r.meta.title.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(
        titles(LearningPath::Pmbok),
        ["Initiation", "Planning", "Execution", "Closing"]
    );
    assert_eq!(
        titles(LearningPath::Scrum),
        ["Scrum Roles", "Scrum Artifacts", "Scrum Events"]
    );
}

#[test]
fn activity_kinds_per_room() {
    let lib = library();
    let kinds = |path| {
        let run = lib.build(path, 7).unwrap();
        let mut out = Vec::new();
        let mut run = run;
        loop {
            let controls = run.current_room().activity();
            out.push((controls.kind(), controls.machine().mode()));
            if !run.advance() {
                break;
            }
        }
        out
    };
    assert_eq!(
        kinds(LearningPath::Pmbok),
        [
            (ActivityKind::Matching, EvaluationMode::Immediate),
            (ActivityKind::Board, EvaluationMode::ExplicitSubmit),
            (ActivityKind::Matching, EvaluationMode::Immediate),
            (ActivityKind::Quiz, EvaluationMode::Immediate),
        ]
    );
    assert_eq!(
        kinds(LearningPath::Scrum),
        [
            (ActivityKind::Ordering, EvaluationMode::ExplicitSubmit),
            (ActivityKind::Board, EvaluationMode::ExplicitSubmit),
            (ActivityKind::Matching, EvaluationMode::Immediate),
        ]
    );
}

#[test]
fn backlog_priorities_match_the_product_owner_order() {
    let lib = library();
    let run = lib.build(LearningPath::Scrum, 1).unwrap();
    let machine = run.current_room().activity().machine();
    let Some(AnswerRule::FullAssignmentMatch { expected }) = machine.challenge().map(|c| &c.rule)
    else {
        panic!("ordering uses a full match");
    };
    let mut order: Vec<_> = expected.iter().collect();
    order.sort_by_key(|(_, rank)| rank.parse::<usize>().unwrap());
    let ids: Vec<_> = order.into_iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, ["H2", "H4", "H3", "H5", "H1"]);
}

#[test]
fn every_room_spawn_is_free_and_inside_the_world() {
    let lib = library();
    for path in LearningPath::ALL {
        let mut run = lib.build(path, 3).unwrap();
        loop {
            let room = run.current_room();
            let player = Player::new(room.spawn());
            assert_eq!(player.position(), room.spawn(), "{} spawn clamped", room.meta().id);
            assert!(
                !room.check_collision(&player.feet()),
                "{} spawns inside a wall",
                room.meta().id
            );
            let world = Rect::new(0, 0, WORLD_WIDTH, WORLD_HEIGHT);
            assert!(world.contains(room.spawn()));
            assert!(room.spawn().x + PLAYER_WIDTH <= WORLD_WIDTH);
            assert!(room.spawn().y + PLAYER_HEIGHT <= WORLD_HEIGHT);
            if !run.advance() {
                break;
            }
        }
    }
}

#[test]
fn last_scrum_room_uses_the_centre_rule() {
    let lib = library();
    let mut run = lib.build(LearningPath::Scrum, 1).unwrap();
    while run.advance() {}
    let room = run.current_room();
    assert_eq!(room.geometry().transition_rule, TransitionRule::Centre);
    assert_eq!(room.meta().id, "scrum-3");
    assert!(room.geometry().info.is_none());
}
