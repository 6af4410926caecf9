/// Stage behaviour as seen by an embedding application: input routed
/// through the ticker, redraws and render failures.
use std::cell::Cell;
use std::rc::Rc;

use easel_ui::{
    Element, Error, EventHandler, EventType, Graphics, NodeKind, Props, RecordingCanvas, Stage, StageProps, Ticker,
    TickerConfig, DrawCommand, bitmap_text,
};

#[test]
fn test_pointer_input_reaches_handler_on_tick() {
    let ticker = Ticker::new(TickerConfig::default());
    let clicks = Rc::new(Cell::new(0));
    let counter = clicks.clone();
    let mut graphics = Graphics::new();
    graphics.begin_fill("#f00").draw_rect(0.0, 0.0, 10.0, 10.0);
    let tree = Element::new(
        NodeKind::Shape,
        Props::new()
            .with("graphics", graphics)
            .with("onClick", EventHandler::new(move |_| counter.set(counter.get() + 1))),
    );
    let canvas = RecordingCanvas::new(100, 100);
    let frames = canvas.frames();
    let mut stage = Stage::default();
    stage.mount(Box::new(canvas), &ticker, Some(tree)).unwrap();

    let shape = stage.root().unwrap().instances()[0];
    stage
        .surface()
        .unwrap()
        .borrow_mut()
        .queue_event(shape, EventType::Click);
    assert_eq!(clicks.get(), 0);

    assert_eq!(ticker.tick(), 1);
    assert_eq!(clicks.get(), 1);
    assert!(matches!(frames.borrow().last().map(|f| &f[..]), Some([DrawCommand::Shape { .. }])));
}

#[test]
fn test_handler_swap_keeps_one_listener() {
    let ticker = Ticker::new(TickerConfig::default());
    let make = || Element::new(NodeKind::Container, Props::new().with("onDblclick", EventHandler::new(|_| {})));
    let mut stage = Stage::default();
    stage.mount(Box::new(RecordingCanvas::new(1, 1)), &ticker, Some(make())).unwrap();
    let node = stage.root().unwrap().instances()[0];

    for _ in 0..3 {
        stage.update(StageProps::default(), Some(make())).unwrap();
    }

    let scene = stage.scene().unwrap();
    assert_eq!(scene.borrow().listener_count(node, EventType::DblClick), 1);
    assert_eq!(scene.borrow().subscriptions(node).map(|s| s.len()), Some(1));
}

#[test]
fn test_failed_update_leaves_no_instances_behind() {
    let ticker = Ticker::new(TickerConfig::default());
    let tree = || Element::new(NodeKind::Container, Props::new()).child(Element::new(NodeKind::Shape, Props::new()));
    let mut stage = Stage::default();
    stage.mount(Box::new(RecordingCanvas::new(1, 1)), &ticker, Some(tree())).unwrap();
    let scene = stage.scene().unwrap();
    let before = scene.borrow().len();

    for _ in 0..5 {
        let group = Element::new(NodeKind::Container, Props::new())
            .child(Element::new(
                NodeKind::Shape,
                Props::new().with("onClick", EventHandler::new(|_| {})),
            ))
            .child(Element::host("Video", Props::new()));
        let broken = tree().child(group);
        let err = stage.update(StageProps::default(), Some(broken)).unwrap_err();
        assert_eq!(err, Error::UnsupportedType("Video".into()));
    }

    assert_eq!(scene.borrow().len(), before);
    stage.update(StageProps::default(), Some(tree())).unwrap();
    assert_eq!(scene.borrow().len(), before);
}

#[test]
fn test_valid_update_succeeds_after_failed_commit() {
    let ticker = Ticker::new(TickerConfig::default());
    let bitmap = || Element::new(NodeKind::Bitmap, Props::new()).key("b");
    let mut stage = Stage::default();
    let first = Element::new(NodeKind::Container, Props::new())
        .child(Element::new(NodeKind::Shape, Props::new()).key("x"))
        .child(bitmap());
    stage.mount(Box::new(RecordingCanvas::new(1, 1)), &ticker, Some(first)).unwrap();

    // A bitmap cannot hold children, so the commit fails after `x` is gone
    let invalid = Element::new(NodeKind::Container, Props::new())
        .child(bitmap().child(Element::new(NodeKind::Container, Props::new())));
    let err = stage.update(StageProps::default(), Some(invalid)).unwrap_err();
    assert!(matches!(err, Error::NotAContainer(_)));
    let scene = stage.scene().unwrap();
    assert_eq!(scene.borrow().len(), 1);
    assert!(stage.root().unwrap().instances().is_empty());

    let valid = Element::new(NodeKind::Container, Props::new()).child(bitmap());
    stage.update(StageProps::default(), Some(valid)).unwrap();
    let container = stage.root().unwrap().instances()[0];
    assert_eq!(scene.borrow().children(stage.root_node().unwrap()), &[container]);
    assert_eq!(scene.borrow().children(container).len(), 1);
    assert_eq!(scene.borrow().len(), 3);
}

#[test]
fn test_unknown_type_aborts_mount() {
    let ticker = Ticker::new(TickerConfig::default());
    let mut stage = Stage::default();

    let err = stage
        .mount(Box::new(RecordingCanvas::new(1, 1)), &ticker, Some(Element::host("Video", Props::new())))
        .unwrap_err();

    assert_eq!(err, Error::UnsupportedType("Video".to_string()));
    assert!(!stage.is_mounted());
    assert_eq!(ticker.listener_count(), 0);
}

#[test]
fn test_unflattened_text_child_is_rejected() {
    let ticker = Ticker::new(TickerConfig::default());
    let mut stage = Stage::default();
    let tree = Element::new(NodeKind::Container, Props::new()).child("loose text");

    let err = stage
        .mount(Box::new(RecordingCanvas::new(1, 1)), &ticker, Some(tree))
        .unwrap_err();
    assert_eq!(err, Error::UnflattenedText);
}

#[test]
fn test_bitmap_text_wrapper_mounts_flattened_text() {
    let ticker = Ticker::new(TickerConfig::default());
    let mut stage = Stage::default();
    stage
        .mount(
            Box::new(RecordingCanvas::new(1, 1)),
            &ticker,
            Some(bitmap_text(Props::new(), ["Lives: ", "3"])),
        )
        .unwrap();

    let node = stage.root().unwrap().instances()[0];
    let scene = stage.scene().unwrap();
    assert_eq!(scene.borrow().object(node).unwrap().string("text"), Some("Lives: 3"));
}

#[test]
fn test_stage_props_from_json_drive_canvas_element() {
    let props = StageProps::from_json(r#"{ "width": 800, "height": 600, "accessKey": "s", "enableMouseOver": false }"#).unwrap();
    let stage = Stage::new(props);

    let element = stage.canvas_element();
    assert_eq!((element.width, element.height), (800, 600));
    assert_eq!(element.access_key.as_deref(), Some("s"));
    let json = serde_json::to_value(&element).unwrap();
    assert_eq!(json["accessKey"], "s");
}
