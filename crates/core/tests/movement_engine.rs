use approx::assert_relative_eq;
use calchart_core::continuity::{
    DiagonalContinuity, End, FollowLeaderContinuity, ForwardContinuity, FountainGridContinuity,
    StopContinuity, TwoStepContinuity,
};
use calchart_core::geometry::{EAST, NORTH, WEST};
use calchart_core::movement::total_duration;
use calchart_core::{
    Continuity, ContinuityKind, Coordinate, DotId, DotTarget, DotType, MovementCommand, SheetId,
    Show,
};

/// A show with `num_dots` dots on two sheets, positions on sheet 0 and 1
/// taken from the given lists.
fn two_sheet_show(first: &[Coordinate], second: &[Coordinate], num_beats: u32) -> (Show, SheetId) {
    let mut show = Show::new("Engine", first.len());
    let a = show.add_sheet(num_beats);
    let b = show.add_sheet(num_beats);
    for (dot, (&start, &end)) in first.iter().zip(second).enumerate() {
        show.set_position(&a, DotId(dot), start).unwrap();
        show.set_position(&b, DotId(dot), end).unwrap();
    }
    (show, a)
}

fn add(show: &mut Show, sheet: &SheetId, kind: ContinuityKind) {
    show.add_continuity(Continuity::new(sheet.clone(), DotType::Plain, kind))
        .unwrap();
}

fn moves(movements: &[MovementCommand]) -> Vec<(f64, f64)> {
    movements
        .iter()
        .filter_map(|movement| match movement {
            MovementCommand::Move(m) => Some((m.direction, m.duration)),
            MovementCommand::Stop(_) => None,
        })
        .collect()
}

#[test]
fn fountain_grid_leg_order() {
    let start = [Coordinate::new(0.0, 0.0)];
    let end = [Coordinate::new(4.0, -2.0)];

    let (mut show, sheet) = two_sheet_show(&start, &end, 8);
    add(
        &mut show,
        &sheet,
        ContinuityKind::FountainGrid(FountainGridContinuity::new(true, End::MT)),
    );
    show.update_movements(&sheet, DotTarget::All).unwrap();
    let movements = show.sheet(&sheet).unwrap().movements(DotId(0)).to_vec();
    assert_eq!(moves(&movements), vec![(WEST, 2.0), (NORTH, 4.0)]);
    assert!(matches!(movements.last(), Some(MovementCommand::Stop(stop)) if stop.duration == 2.0));
    assert_eq!(total_duration(&movements), 8.0);

    let (mut show, sheet) = two_sheet_show(&start, &end, 8);
    add(
        &mut show,
        &sheet,
        ContinuityKind::FountainGrid(FountainGridContinuity::new(false, End::MT)),
    );
    show.update_movements(&sheet, DotTarget::All).unwrap();
    let movements = show.sheet(&sheet).unwrap().movements(DotId(0));
    assert_eq!(moves(movements), vec![(NORTH, 4.0), (WEST, 2.0)]);
    let end_point = show.final_position(&sheet, DotId(0)).unwrap();
    assert_relative_eq!(end_point.x, 4.0, epsilon = 1e-9);
    assert_relative_eq!(end_point.y, -2.0, epsilon = 1e-9);
}

#[test]
fn diagonal_reaches_next_position() {
    let (mut show, sheet) = two_sheet_show(
        &[Coordinate::new(0.0, 0.0)],
        &[Coordinate::new(3.0, 5.0)],
        8,
    );
    add(
        &mut show,
        &sheet,
        ContinuityKind::Diagonal(DiagonalContinuity::new(true, End::MT)),
    );
    show.update_movements(&sheet, DotTarget::All).unwrap();

    let movements = show.sheet(&sheet).unwrap().movements(DotId(0));
    assert_eq!(moves(movements), vec![(315.0, 3.0), (EAST, 2.0)]);
    assert_eq!(total_duration(movements), 8.0);

    let end = show.final_position(&sheet, DotId(0)).unwrap();
    assert_relative_eq!(end.x, 3.0, epsilon = 1e-9);
    assert_relative_eq!(end.y, 5.0, epsilon = 1e-9);
}

#[test]
fn chain_is_clipped_to_sheet_beats() {
    let (mut show, sheet) = two_sheet_show(
        &[Coordinate::new(0.0, 0.0)],
        &[Coordinate::new(0.0, 0.0)],
        6,
    );
    add(
        &mut show,
        &sheet,
        ContinuityKind::Forward(ForwardContinuity::new(4.0, EAST)),
    );
    add(
        &mut show,
        &sheet,
        ContinuityKind::Forward(ForwardContinuity::new(4.0, NORTH)),
    );
    add(
        &mut show,
        &sheet,
        ContinuityKind::Stop(StopContinuity::new(true, None)),
    );
    show.update_movements(&sheet, DotTarget::All).unwrap();

    let movements = show.sheet(&sheet).unwrap().movements(DotId(0));
    assert_eq!(moves(movements), vec![(EAST, 4.0), (NORTH, 2.0)]);
    assert_eq!(total_duration(movements), 6.0);
}

#[test]
fn sheet_defaults_override_show_defaults() {
    let (mut show, sheet) = two_sheet_show(
        &[Coordinate::new(0.0, 0.0)],
        &[Coordinate::new(0.0, 0.0)],
        16,
    );
    show.defaults.beats_per_step = Some(4);
    show.sheet_mut(&sheet).unwrap().defaults.beats_per_step = Some(2);
    add(
        &mut show,
        &sheet,
        ContinuityKind::Forward(ForwardContinuity::new(3.0, EAST)),
    );
    show.update_movements(&sheet, DotTarget::All).unwrap();

    let movements = show.sheet(&sheet).unwrap().movements(DotId(0));
    assert_eq!(moves(movements), vec![(EAST, 6.0)]);
    let end = show.final_position(&sheet, DotId(0)).unwrap();
    assert_relative_eq!(end.y, 3.0, epsilon = 1e-9);
}

#[test]
fn follow_the_leader_alone_with_no_path_stays_put() {
    let (mut show, sheet) = two_sheet_show(
        &[Coordinate::new(2.0, 2.0)],
        &[Coordinate::new(2.0, 2.0)],
        8,
    );
    add(
        &mut show,
        &sheet,
        ContinuityKind::FollowLeader(FollowLeaderContinuity::new(vec![DotId(0)], Vec::new())),
    );
    show.update_movements(&sheet, DotTarget::All).unwrap();

    assert!(show.sheet(&sheet).unwrap().movements(DotId(0)).is_empty());
    assert_eq!(show.get_animation_state(&sheet, DotId(0), 0.0).unwrap(), None);
}

#[test]
fn two_step_delays_each_dot_in_order() {
    let start = [Coordinate::new(0.0, 0.0), Coordinate::new(0.0, -2.0)];
    let (mut show, sheet) = two_sheet_show(&start, &start, 8);
    let two = TwoStepContinuity::new(
        vec![DotId(0), DotId(1)],
        vec![ContinuityKind::Forward(ForwardContinuity::new(8.0, EAST))],
    )
    .unwrap();
    add(&mut show, &sheet, ContinuityKind::TwoStep(two));
    show.update_movements(&sheet, DotTarget::All).unwrap();

    let leader = show.sheet(&sheet).unwrap().movements(DotId(0));
    assert_eq!(moves(leader), vec![(EAST, 8.0)]);

    let follower = show.sheet(&sheet).unwrap().movements(DotId(1));
    match &follower[0] {
        MovementCommand::Stop(stop) => {
            assert_eq!(stop.duration, 2.0);
            assert!(stop.marktime);
        }
        other => panic!("expected a mark time, got {:?}", other),
    }
    assert_eq!(moves(follower), vec![(EAST, 6.0)]);
    assert_eq!(total_duration(follower), 8.0);
}

#[test]
fn crossing_dots_collide_on_both() {
    let (mut show, sheet) = two_sheet_show(
        &[Coordinate::new(0.0, 0.0), Coordinate::new(4.0, 0.0)],
        &[Coordinate::new(4.0, 0.0), Coordinate::new(0.0, 0.0)],
        4,
    );
    add(&mut show, &sheet, ContinuityKind::Even(Default::default()));
    show.update_movements(&sheet, DotTarget::All).unwrap();
    show.detect_collisions(&sheet).unwrap();

    let owner = show.sheet(&sheet).unwrap();
    let first: Vec<u32> = owner.collisions(DotId(0)).unwrap().iter().copied().collect();
    let second: Vec<u32> = owner.collisions(DotId(1)).unwrap().iter().copied().collect();
    assert_eq!(first, vec![2]);
    assert_eq!(first, second);
}

#[test]
fn saved_document_recomputes_the_same_movements() {
    let (mut show, sheet) = two_sheet_show(
        &[Coordinate::new(0.0, 0.0), Coordinate::new(2.0, 2.0)],
        &[Coordinate::new(4.0, -2.0), Coordinate::new(6.0, 6.0)],
        12,
    );
    add(
        &mut show,
        &sheet,
        ContinuityKind::Forward(ForwardContinuity::new(2.0, WEST)),
    );
    add(
        &mut show,
        &sheet,
        ContinuityKind::Diagonal(DiagonalContinuity::new(false, End::CL)),
    );
    show.update_movements(&sheet, DotTarget::All).unwrap();

    let json = show.to_json().unwrap();
    let mut loaded = Show::from_json(json).unwrap();
    loaded.update_movements(&sheet, DotTarget::All).unwrap();

    for dot in show.dot_ids() {
        assert_eq!(
            show.sheet(&sheet).unwrap().movements(dot),
            loaded.sheet(&sheet).unwrap().movements(dot)
        );
    }
    assert_eq!(
        show.sheet(&sheet).unwrap().continuities(DotType::Plain),
        loaded.sheet(&sheet).unwrap().continuities(DotType::Plain)
    );
}
