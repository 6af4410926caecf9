/// End-to-end checks of the host adapter driven through a mounted stage:
/// initial layout, single-prop updates, keyed reorders and teardown.
use std::cell::Cell;
use std::rc::Rc;

use easel_ui::scene::{dispatch, SceneCommand};
use easel_ui::{
    text, Element, Event, EventHandler, EventType, Image, NodeKind, Props, RecordingCanvas, Stage, StageProps,
    Ticker, TickerConfig,
};

fn mounted(tree: Element) -> (Stage, Rc<Ticker>) {
    let ticker = Ticker::new(TickerConfig::default());
    let mut stage = Stage::default();
    stage
        .mount(Box::new(RecordingCanvas::new(300, 150)), &ticker, Some(tree))
        .unwrap();
    (stage, ticker)
}

#[test]
fn test_container_with_two_bitmaps() {
    let image = Rc::new(Image::new("tile.png", 16, 16));
    let tree = Element::new(NodeKind::Container, Props::new())
        .child(Element::new(NodeKind::Bitmap, Props::new().with("image", image.clone()).with("x", 0.0)))
        .child(Element::new(NodeKind::Bitmap, Props::new().with("image", image.clone()).with("x", 50.0)));

    let (stage, _ticker) = mounted(tree);

    let scene = stage.scene().unwrap();
    let scene = scene.borrow();
    let top = scene.children(stage.root_node().unwrap());
    assert_eq!(top.len(), 1);
    let container = scene.object(top[0]).unwrap();
    assert_eq!(container.kind(), NodeKind::Container);

    let xs: Vec<f64> = container
        .children()
        .iter()
        .map(|&id| {
            let bitmap = scene.object(id).unwrap();
            assert_eq!(bitmap.kind(), NodeKind::Bitmap);
            bitmap.number("x").unwrap()
        })
        .collect();
    assert_eq!(xs, vec![0.0, 50.0]);
}

#[test]
fn test_text_change_sets_only_text() {
    let (mut stage, _ticker) = mounted(text(Props::new(), ["a"]));
    let scene = stage.scene().unwrap();
    let node = stage.root().unwrap().instances()[0];
    scene.borrow_mut().record_commands(true);

    stage
        .update(StageProps::default(), Some(text(Props::new(), ["b"])))
        .unwrap();

    let journal = scene.borrow_mut().take_commands();
    assert_eq!(journal.len(), 1);
    match &journal[0] {
        SceneCommand::Set { node: target, keys } => {
            assert_eq!(*target, node);
            assert_eq!(keys.as_slice(), ["text"]);
        }
        other => panic!("expected a single set, got {:?}", other),
    }
    assert_eq!(scene.borrow().object(node).unwrap().string("text"), Some("b"));
}

#[test]
fn test_keyed_swap_moves_without_rebuild() {
    let child = |key: &str| Element::new(NodeKind::Container, Props::new()).key(key);
    let (mut stage, _ticker) = mounted(Element::new(NodeKind::Container, Props::new()).children([child("a"), child("b")]));
    let scene = stage.scene().unwrap();
    let parent = stage.root().unwrap().instances()[0];
    let before = scene.borrow().children(parent).to_vec();
    scene.borrow_mut().record_commands(true);

    stage
        .update(
            StageProps::default(),
            Some(Element::new(NodeKind::Container, Props::new()).children([child("b"), child("a")])),
        )
        .unwrap();

    let (a, b) = (before[0], before[1]);
    assert_eq!(scene.borrow().children(parent), &[b, a]);
    assert_eq!(
        scene.borrow_mut().take_commands(),
        vec![
            SceneCommand::RemoveChild { parent, child: a },
            SceneCommand::AddChild { parent, child: a },
        ]
    );
}

#[test]
fn test_unmount_releases_handlers_and_registrations() {
    let marker = Rc::new(Cell::new(0));
    let hits = marker.clone();
    let on_click = EventHandler::new(move |_| hits.set(hits.get() + 1));
    let (mut stage, ticker) = mounted(Element::new(NodeKind::Shape, Props::new().with("onClick", on_click)));

    let scene = stage.scene().unwrap();
    let surface = stage.surface().unwrap();
    let shape = stage.root().unwrap().instances()[0];
    assert_eq!(scene.borrow().subscriptions(shape).map(|s| s.len()), Some(1));
    assert_eq!(dispatch(&scene, &Event::new(EventType::Click, shape)), 1);
    assert!(surface.borrow().is_touch_enabled());
    assert_eq!(ticker.listener_count(), 1);

    stage.unmount().unwrap();

    assert!(scene.borrow().subscriptions(shape).is_none());
    assert_eq!(dispatch(&scene, &Event::new(EventType::Click, shape)), 0);
    assert_eq!(marker.get(), 1);
    assert_eq!(Rc::strong_count(&marker), 1);
    assert!(!surface.borrow().is_touch_enabled());
    assert_eq!(ticker.listener_count(), 0);
    assert!(scene.borrow().children(surface.borrow().root()).is_empty());
}
