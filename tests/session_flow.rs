//! Scripted runs through the shell, driving activities the way a player
//! would: number keys for quizzes, mouse drags for boards, grab-and-move for
//! ordering.

use std::path::PathBuf;
use std::time::Duration;

use pm_escape::activity::{ActivityControls, ActivityKind, AnswerRule, ItemId};
use pm_escape::geometry::Point;
use pm_escape::input::{InputEvent, Key};
use pm_escape::room::Overlay;
use pm_escape::settings::{PLAYER_HEIGHT, PLAYER_WIDTH};
use pm_escape::{ContentLibrary, GameOverReason, GameShell, LearningPath, Screen};

fn shell(seed: u64) -> GameShell {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("content");
    GameShell::new(ContentLibrary::load(&dir).unwrap(), seed)
}

fn send(shell: &mut GameShell, event: InputEvent) {
    shell.handle_input(event).unwrap();
}

fn press(shell: &mut GameShell, key: Key) {
    send(shell, InputEvent::KeyDown(key));
}

/// Puts the player's body centre on `centre`.
fn teleport(shell: &mut GameShell, centre: Point) {
    let session = shell.session_mut().unwrap();
    let (_, player) = session.parts_mut();
    player.place(Point::new(
        centre.x - PLAYER_WIDTH / 2,
        centre.y - PLAYER_HEIGHT / 2,
    ));
}

fn controls(shell: &GameShell) -> &ActivityControls {
    shell.current_room().unwrap().activity()
}

fn target_of(controls: &ActivityControls, item: &str) -> Option<String> {
    match &controls.machine().challenge()?.rule {
        AnswerRule::FullAssignmentMatch { expected } => expected.get(item).cloned(),
        AnswerRule::SetMembership { allowed } => allowed.get(item)?.iter().next().cloned(),
        AnswerRule::SingleChoice { .. } => None,
    }
}

/// Next inputs that move the open activity one step closer to a solution.
fn next_moves(c: &ActivityControls) -> Vec<InputEvent> {
    let machine = c.machine();
    if machine.is_showing_feedback() {
        return vec![InputEvent::KeyDown(Key::Enter)];
    }
    let layout = c.layout();
    match c.kind() {
        ActivityKind::Quiz => {
            let Some(AnswerRule::SingleChoice { correct }) = machine.challenge().map(|ch| &ch.rule)
            else {
                panic!("quiz without a single choice rule");
            };
            let shown = layout.options.iter().position(|(i, _)| i == correct).unwrap();
            let digit = char::from_digit(shown as u32 + 1, 10).unwrap();
            vec![InputEvent::KeyDown(Key::Char(digit))]
        }
        ActivityKind::Matching | ActivityKind::Board => {
            for card in &layout.cards {
                let target = target_of(c, &card.id).unwrap();
                if machine.working().slot_of(&card.id) == Some(target.as_str()) {
                    continue;
                }
                let slot = layout.slots.iter().find(|(id, _)| *id == target).unwrap().1;
                return vec![
                    InputEvent::PointerDown(card.rect.center()),
                    InputEvent::PointerMove(slot.center()),
                    InputEvent::PointerUp(slot.center()),
                ];
            }
            vec![InputEvent::KeyDown(Key::Char('v'))]
        }
        ActivityKind::Ordering => {
            let mut wanted: Vec<(usize, ItemId)> = c
                .order()
                .iter()
                .map(|id| (target_of(c, id).unwrap().parse().unwrap(), id.clone()))
                .collect();
            wanted.sort();
            let order = c.order();
            let Some(t) = (0..order.len()).find(|&t| order[t] != wanted[t].1) else {
                return vec![InputEvent::KeyDown(Key::Enter)];
            };
            let at = order.iter().position(|id| *id == wanted[t].1).unwrap();
            let n = order.len();
            let downs = (at + n - c.cursor()) % n;
            let mut moves = vec![InputEvent::KeyDown(Key::Down); downs];
            moves.push(InputEvent::KeyDown(Key::Space));
            moves.extend(std::iter::repeat(InputEvent::KeyDown(Key::Up)).take(at - t));
            moves.push(InputEvent::KeyDown(Key::Space));
            moves
        }
    }
}

fn solve_current_room(shell: &mut GameShell) {
    let mission = shell.current_room().unwrap().geometry().mission;
    teleport(shell, mission.center());
    press(shell, Key::Char('e'));
    assert_eq!(shell.current_room().unwrap().overlay(), Overlay::Activity);

    for _ in 0..200 {
        if shell.current_room().unwrap().overlay() == Overlay::None {
            break;
        }
        for event in next_moves(controls(shell)) {
            send(shell, event);
        }
        shell.update(Duration::ZERO);
    }
    let room = shell.current_room().unwrap();
    assert_eq!(room.overlay(), Overlay::None, "{} never closed", room.meta().id);
    assert!(room.is_advance_ready());
    assert_eq!(room.activity().machine().error_count(), 0);
}

fn walk_out(shell: &mut GameShell) {
    let transition = shell.current_room().unwrap().geometry().transition;
    teleport(shell, transition.center());
    press(shell, Key::Char('e'));
}

fn play_through(path: LearningPath, rooms: usize) -> GameShell {
    let mut s = shell(2024);
    s.start(path).unwrap();
    for n in 0..rooms {
        assert_eq!(s.session().unwrap().run().index(), n);
        solve_current_room(&mut s);
        walk_out(&mut s);
    }
    s
}

#[test]
fn pmbok_victory_scores_rooms_and_time() {
    let s = play_through(LearningPath::Pmbok, 4);
    assert_eq!(s.screen(), Screen::Victory);
    let score = s.last_score().unwrap();
    assert_eq!(score.rooms, 4);
    assert_eq!(score.time_bonus, 3000);
    assert_eq!(score.total, 7000);
    assert_eq!(s.high_score(), 7000);
}

#[test]
fn scrum_victory() {
    let s = play_through(LearningPath::Scrum, 3);
    assert_eq!(s.screen(), Screen::Victory);
    assert_eq!(s.last_score().unwrap().total, 6000);
}

#[test]
fn exit_stays_shut_until_the_mission_is_done() {
    let mut s = shell(5);
    s.start(LearningPath::Pmbok).unwrap();
    walk_out(&mut s);
    assert_eq!(s.session().unwrap().run().index(), 0);
    assert!(s.message().unwrap().contains("Complete the mission"));
}

#[test]
fn walking_through_an_open_exit_needs_an_interact_press() {
    let mut s = shell(11);
    s.start(LearningPath::Scrum).unwrap();
    solve_current_room(&mut s);

    let transition = s.current_room().unwrap().geometry().transition;
    teleport(&mut s, transition.center());
    press(&mut s, Key::Up);
    press(&mut s, Key::Down);
    assert_eq!(s.session().unwrap().run().index(), 0);
    assert_eq!(s.screen(), Screen::Gameplay);

    press(&mut s, Key::Char('e'));
    assert_eq!(s.session().unwrap().run().index(), 1);
    let spawn = s.current_room().unwrap().spawn();
    assert_eq!(s.session().unwrap().player().position(), spawn);
}

#[test]
fn three_wrong_drops_end_the_run() {
    let mut s = shell(9);
    s.start(LearningPath::Pmbok).unwrap();
    let mission = s.current_room().unwrap().geometry().mission;
    teleport(&mut s, mission.center());
    press(&mut s, Key::Char('e'));

    for _ in 0..3 {
        let c = controls(&s);
        let card = c.layout().cards[0].clone();
        let right = target_of(c, &card.id).unwrap();
        let wrong = c
            .layout()
            .slots
            .iter()
            .find(|(id, _)| *id != right)
            .unwrap()
            .1;
        send(&mut s, InputEvent::PointerDown(card.rect.center()));
        send(&mut s, InputEvent::PointerUp(wrong.center()));
        if s.current_room().unwrap().is_failed() {
            break;
        }
        press(&mut s, Key::Enter);
    }
    assert!(s.current_room().unwrap().is_failed());
    s.update(Duration::from_millis(16));
    assert_eq!(s.screen(), Screen::GameOver(GameOverReason::ActivityFailed));
    assert_eq!(s.last_score().unwrap().total, 0);
    let message = s.message().unwrap();
    assert!(message.starts_with("The sponsor rejected the charter."));
    assert!(message.contains("Too many mistakes"));

    press(&mut s, Key::Enter);
    assert_eq!(s.screen(), Screen::Menu);
}

#[test]
fn high_score_survives_a_later_worse_run() {
    let mut s = play_through(LearningPath::Scrum, 3);
    press(&mut s, Key::Enter);
    s.start(LearningPath::Pmbok).unwrap();
    s.update(Duration::from_secs(301));
    assert_eq!(s.screen(), Screen::GameOver(GameOverReason::TimeUp));
    assert_eq!(s.high_score(), 6000);
}

#[test]
fn info_point_opens_and_blocks_movement() {
    let mut s = shell(1);
    s.start(LearningPath::Scrum).unwrap();
    let info = s.current_room().unwrap().geometry().info.unwrap();
    teleport(&mut s, info.center());
    press(&mut s, Key::Enter);
    assert_eq!(s.current_room().unwrap().overlay(), Overlay::Info);

    let before = s.session().unwrap().player().position();
    press(&mut s, Key::Left);
    assert_eq!(s.session().unwrap().player().position(), before);
    press(&mut s, Key::Escape);
    assert_eq!(s.current_room().unwrap().overlay(), Overlay::None);
    assert_eq!(s.screen(), Screen::Gameplay);
}
