use calchart_core::{
    Coordinate, DotId, DotType, Editor, EditorCommand, EditorEvent, EditorRequest, Settings, Show,
};
use tokio::sync::mpsc;

fn show_with_sheets(num_dots: usize, sheets: usize) -> Show {
    let mut show = Show::new("Editor", num_dots);
    for _ in 0..sheets {
        show.add_sheet(8);
    }
    show
}

#[tokio::test]
async fn editor_loop_applies_requests_and_reports_collisions() {
    let show = show_with_sheets(2, 2);
    let sheet = show.sheet_id_at(0).unwrap();
    let editor = Editor::new(show, Settings::default()).with_collision_queue();
    let continuity = editor
        .create_continuity("MTRM", &sheet, DotType::Plain)
        .unwrap();

    let (request_tx, request_rx) = mpsc::unbounded_channel();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(editor.run_with_channels(request_rx, event_tx));

    request_tx
        .send(EditorRequest::Command(EditorCommand::AddContinuity { continuity }))
        .unwrap();

    let mut updated = false;
    while let Some(event) = event_rx.recv().await {
        if let EditorEvent::CollisionsUpdated { sheet: updated_sheet, .. } = &event {
            assert_eq!(updated_sheet, &sheet);
            updated = true;
            break;
        }
    }
    assert!(updated);

    request_tx
        .send(EditorRequest::Action("removeSheet(7)".to_string()))
        .unwrap();
    match event_rx.recv().await {
        Some(EditorEvent::Error { .. }) => {}
        other => panic!("expected an error event, got {:?}", other),
    }

    request_tx.send(EditorRequest::Shutdown).unwrap();
    let show = handle.await.unwrap().unwrap();
    assert_eq!(show.sheet(&sheet).unwrap().collisions(DotId(0)).unwrap().len(), 8);
    assert_eq!(show.sheet(&sheet).unwrap().continuities(DotType::Plain).len(), 1);
}

#[test]
fn undo_restores_removed_sheet_with_its_continuities() {
    let show = show_with_sheets(1, 3);
    let sheet = show.sheet_id_at(1).unwrap();
    let mut editor = Editor::new(
        show,
        Settings {
            collision_detection: false,
            ..Settings::default()
        },
    );
    let continuity = editor.create_continuity("EWNS", &sheet, DotType::Plain).unwrap();
    editor
        .apply(EditorCommand::AddContinuity { continuity })
        .unwrap();
    editor.do_action("removeSheet(1)").unwrap();
    assert!(editor.show().sheet(&sheet).is_err());

    editor.do_action("undo").unwrap();
    let restored = editor.show().sheet(&sheet).unwrap();
    assert_eq!(restored.index(), 1);
    assert_eq!(restored.continuities(DotType::Plain).len(), 1);
    assert_eq!(restored.movements(DotId(0)).len(), 1);
}

#[test]
fn moving_a_dot_recomputes_the_sheet_before_it() {
    let show = show_with_sheets(1, 2);
    let first = show.sheet_id_at(0).unwrap();
    let second = show.sheet_id_at(1).unwrap();
    let mut editor = Editor::new(show, Settings::default());
    let continuity = editor.create_continuity("EVEN", &first, DotType::Plain).unwrap();
    editor
        .apply(EditorCommand::AddContinuity { continuity })
        .unwrap();
    editor.drain_events();

    editor
        .apply(EditorCommand::SetPosition {
            sheet: second.clone(),
            dot: DotId(0),
            position: Coordinate::new(8.0, 0.0),
        })
        .unwrap();
    let events = editor.drain_events();
    assert!(events.contains(&EditorEvent::MovementsUpdated {
        sheet: first.clone()
    }));
    assert_eq!(
        editor.show().final_position(&first, DotId(0)).unwrap(),
        Coordinate::new(8.0, 0.0)
    );

    editor.undo().unwrap();
    assert_eq!(
        editor.show().final_position(&first, DotId(0)).unwrap(),
        Coordinate::new(0.0, 0.0)
    );
}
