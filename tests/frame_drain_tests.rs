// Integration tests for the per-frame mutation drain: deferral, drain
// order across queue kinds, and error reporting that never stops a frame.

use imframe::{
    App, HostEnv, InputFrame, Item, ItemKind, ManualClock, NullRenderer, Payload, RuntimeConfig,
    ScriptRegistry, ROOT_WINDOW,
};
use proptest::prelude::*;
use std::sync::Arc;

fn new_app() -> (App, Arc<ScriptRegistry>, ManualClock) {
    let registry = Arc::new(ScriptRegistry::new());
    let clock = ManualClock::new();
    let app = App::new(
        RuntimeConfig::default(),
        Arc::clone(&registry) as Arc<dyn HostEnv>,
        Box::new(NullRenderer::new()),
        Box::new(clock.clone()),
    );
    (app, registry, clock)
}

fn frame(app: &mut App) {
    app.frame(&InputFrame::default()).unwrap();
}

#[test]
fn mutations_queued_by_callbacks_apply_in_the_same_frame_drain() {
    let (mut app, registry, _clock) = new_app();

    // The render callback queues an add through a cross-thread handle,
    // the way a host script would.
    let queues = app.queues();
    registry.register(ScriptRegistry::PRIMARY, "spawn_widget", move |_, _| {
        queues.queue_add(imframe::PendingAdd::new(
            ROOT_WINDOW,
            None,
            Item::new(ItemKind::Widget, "spawned"),
        ));
        Ok(Payload::Empty)
    });
    app.set_render_callback(ROOT_WINDOW, "spawn_widget").unwrap();
    app.start();

    frame(&mut app);
    // Queued during render-prep, applied by this frame's drain.
    assert!(app.item("spawned").is_some());
    assert!(registry.errors().is_empty());
}

#[test]
fn delete_before_add_frees_a_name_for_same_frame_reuse() {
    let (mut app, registry, _clock) = new_app();
    app.add_item(Item::new(ItemKind::Widget, "slot")).unwrap();
    app.start();

    app.delete_item("slot").unwrap();
    app.add_runtime_item(ROOT_WINDOW, None, Item::new(ItemKind::Menu, "slot"))
        .unwrap();
    frame(&mut app);

    assert_eq!(app.item("slot").unwrap().kind, ItemKind::Menu);
    assert!(registry.errors().is_empty());
}

#[test]
fn duplicate_add_is_rejected_and_the_drain_continues() {
    let (mut app, registry, _clock) = new_app();
    app.add_item(Item::new(ItemKind::Widget, "taken")).unwrap();
    app.start();

    app.add_runtime_item(ROOT_WINDOW, None, Item::new(ItemKind::Widget, "taken"))
        .unwrap();
    app.add_runtime_item(ROOT_WINDOW, None, Item::new(ItemKind::Widget, "fresh"))
        .unwrap();
    frame(&mut app);

    assert!(registry.errors()[0].contains("unique names"));
    assert!(app.item("fresh").is_some());
    // The original survives.
    assert_eq!(app.item("taken").unwrap().kind, ItemKind::Widget);
}

#[test]
fn separators_tolerate_duplicate_names() {
    let (mut app, registry, _clock) = new_app();
    app.start();

    for _ in 0..2 {
        app.add_runtime_item(ROOT_WINDOW, None, Item::new(ItemKind::Separator, "sep"))
            .unwrap();
    }
    frame(&mut app);

    assert!(registry.errors().is_empty());
    assert_eq!(app.item(ROOT_WINDOW).unwrap().children.len(), 2);
}

#[test]
fn add_with_missing_parent_drops_the_item_and_reports() {
    let (mut app, registry, _clock) = new_app();
    app.start();

    app.add_runtime_item("nowhere", None, Item::new(ItemKind::Widget, "orphan"))
        .unwrap();
    frame(&mut app);

    assert!(registry.errors()[0].contains("orphan not added because its parent was not found"));
    assert!(app.item("orphan").is_none());
}

#[test]
fn add_before_a_named_sibling_and_with_a_stale_hint() {
    let (mut app, _registry, _clock) = new_app();
    app.add_item(Item::new(ItemKind::Widget, "first")).unwrap();
    app.add_item(Item::new(ItemKind::Widget, "last")).unwrap();
    app.start();

    app.add_runtime_item(
        ROOT_WINDOW,
        Some("last".to_string()),
        Item::new(ItemKind::Widget, "middle"),
    )
    .unwrap();
    app.add_runtime_item(
        ROOT_WINDOW,
        Some("gone".to_string()),
        Item::new(ItemKind::Widget, "appended"),
    )
    .unwrap();
    frame(&mut app);

    let children: Vec<&str> = app
        .item(ROOT_WINDOW)
        .unwrap()
        .children
        .iter()
        .map(|child| child.name.as_str())
        .collect();
    assert_eq!(children, ["first", "middle", "last", "appended"]);
}

#[test]
fn window_deletion_removes_the_window_wholesale() {
    let (mut app, registry, _clock) = new_app();
    app.add_item(Item::window("Tools", 300, 300)).unwrap();
    app.push_parent("Tools").unwrap();
    app.add_item(Item::new(ItemKind::Widget, "inner")).unwrap();
    app.pop_parent().unwrap();
    app.start();

    app.delete_item("Tools").unwrap();
    frame(&mut app);

    assert!(app.item("Tools").is_none());
    assert!(app.item("inner").is_none());
    assert_eq!(app.tree().window_count(), 1);
    assert!(registry.errors().is_empty());
}

#[test]
fn delete_children_keeps_the_item_itself() {
    let (mut app, _registry, _clock) = new_app();
    app.add_item(Item::new(ItemKind::Child, "panel")).unwrap();
    app.push_parent("panel").unwrap();
    app.add_item(Item::new(ItemKind::Widget, "a")).unwrap();
    app.add_item(Item::new(ItemKind::Widget, "b")).unwrap();
    app.pop_parent().unwrap();
    app.start();

    app.delete_children("panel").unwrap();
    frame(&mut app);

    assert!(app.item("panel").unwrap().children.is_empty());
    assert!(app.item("a").is_none());
}

#[test]
fn moves_swap_siblings_and_boundaries_are_silent() {
    let (mut app, registry, _clock) = new_app();
    for name in ["a", "b", "c"] {
        app.add_item(Item::new(ItemKind::Widget, name)).unwrap();
    }
    app.start();

    app.move_item_up("b").unwrap();
    app.move_item_down("c").unwrap();
    // Boundary no-ops.
    app.move_item_up("b").unwrap();
    app.move_item_down("c").unwrap();
    frame(&mut app);

    let children: Vec<&str> = app
        .item(ROOT_WINDOW)
        .unwrap()
        .children
        .iter()
        .map(|child| child.name.as_str())
        .collect();
    assert_eq!(children, ["b", "a", "c"]);
    assert!(registry.errors().is_empty());
}

#[test]
fn moving_a_missing_item_is_reported() {
    let (mut app, registry, _clock) = new_app();
    app.start();

    app.move_item_up("ghost").unwrap();
    frame(&mut app);

    assert!(registry.errors()[0].contains("ghost not moved because it was not found"));
}

#[test]
fn drain_order_is_deletes_adds_moves() {
    let (mut app, registry, _clock) = new_app();
    app.add_item(Item::new(ItemKind::Widget, "anchor")).unwrap();
    app.start();

    // Queued in reverse of the drain order: the move still sees the item
    // added this frame, and the add still sees the name freed this frame.
    app.move_item_up("newcomer").unwrap();
    app.add_runtime_item(ROOT_WINDOW, None, Item::new(ItemKind::Widget, "newcomer"))
        .unwrap();
    app.delete_item("anchor").unwrap();
    app.add_runtime_item(ROOT_WINDOW, None, Item::new(ItemKind::Widget, "anchor"))
        .unwrap();
    frame(&mut app);

    assert!(registry.errors().is_empty());
    assert!(app.item("newcomer").is_some());
    assert!(app.item("anchor").is_some());
}

#[test]
fn tree_is_never_mutated_during_build_phase_queues() {
    let (mut app, _registry, _clock) = new_app();
    app.start();

    app.add_runtime_item(ROOT_WINDOW, None, Item::new(ItemKind::Widget, "pending"))
        .unwrap();

    // Visible through the pending lookup, absent from the tree.
    assert!(app.find_pending("pending"));
    assert!(app.item("pending").is_none());

    frame(&mut app);
    assert!(!app.find_pending("pending"));
    assert!(app.item("pending").is_some());
}

#[derive(Debug, Clone)]
enum Op {
    Add { parent: u8, child: u8 },
    Delete(u8),
    DeleteChildren(u8),
    MoveUp(u8),
    MoveDown(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..10, 0u8..10).prop_map(|(parent, child)| Op::Add { parent, child }),
        (0u8..10).prop_map(Op::Delete),
        (0u8..10).prop_map(Op::DeleteChildren),
        (0u8..10).prop_map(Op::MoveUp),
        (0u8..10).prop_map(Op::MoveDown),
    ]
}

fn item_name(index: u8) -> String {
    format!("item{}", index % 8)
}

proptest! {
    // Arbitrary interleavings of queued mutations keep names unique and
    // the root window alive, frame after frame.
    #[test]
    fn interleaved_mutations_preserve_tree_invariants(
        ops in proptest::collection::vec(op_strategy(), 1..48),
    ) {
        let (mut app, _registry, _clock) = new_app();
        app.start();

        for batch in ops.chunks(6) {
            for op in batch {
                match op {
                    Op::Add { parent, child } => {
                        let parent = if parent % 3 == 0 {
                            ROOT_WINDOW.to_string()
                        } else {
                            item_name(*parent)
                        };
                        app.add_runtime_item(
                            parent,
                            None,
                            Item::new(ItemKind::Widget, item_name(*child)),
                        )
                        .unwrap();
                    }
                    Op::Delete(index) => app.delete_item(item_name(*index)).unwrap(),
                    Op::DeleteChildren(index) => {
                        app.delete_children(item_name(*index)).unwrap()
                    }
                    Op::MoveUp(index) => app.move_item_up(item_name(*index)).unwrap(),
                    Op::MoveDown(index) => app.move_item_down(item_name(*index)).unwrap(),
                }
            }

            app.frame(&InputFrame::default()).unwrap();

            let names = app.tree().all_names();
            let mut unique = names.clone();
            unique.sort();
            unique.dedup();
            prop_assert_eq!(names.len(), unique.len());
            prop_assert!(app.item(ROOT_WINDOW).is_some());
        }
    }
}
