//! End-to-end behaviour of a client session on the recording host

use xshim::backend::recording::{CallLog, HostCall, RecordingBackend};
use xshim::backend::null::NullBackend;
use xshim::colors::XColor;
use xshim::display::SetWindowAttributes;
use xshim::gc::{GcValueMask, XGcValues};
use xshim::protocol::*;
use xshim::{Display, DisplayConfig};

fn recording_display() -> (Display, CallLog) {
    let backend = RecordingBackend::new();
    let log = backend.log();
    let display = Display::open(DisplayConfig::default(), Box::new(backend)).unwrap();
    (display, log)
}

fn null_display() -> Display {
    Display::open(DisplayConfig::default(), Box::new(NullBackend::new())).unwrap()
}

fn tagged(window: Window, tag: u8) -> Event {
    let mut data = [0u8; 20];
    data[0] = tag;
    Event::ClientMessage(ClientMessageEvent {
        serial: 0,
        send_event: false,
        window,
        message_type: Atom::WM_NAME,
        format: 8,
        data,
    })
}

fn tag_of(event: &Event) -> u8 {
    match event {
        Event::ClientMessage(m) => m.data[0],
        other => panic!("unexpected event {:?}", other),
    }
}

#[test_log::test]
fn test_queue_is_fifo_except_put_back() {
    let mut display = null_display();
    let root = display.root_window();
    for tag in 1..=5 {
        display.send_event(root, false, 0, tagged(root, tag)).unwrap();
    }
    let first = display.next_event().unwrap();
    let second = display.next_event().unwrap();
    assert_eq!((tag_of(&first), tag_of(&second)), (1, 2));
    assert!(first.serial() < second.serial());

    display.put_back_event(second);
    let order: Vec<u8> = std::iter::from_fn(|| display.check_if_event(|_| true))
        .map(|e| tag_of(&e))
        .collect();
    assert_eq!(order, vec![2, 3, 4, 5]);
}

#[test_log::test]
fn test_destroy_reports_children_before_parent() {
    let mut display = null_display();
    let root = display.root_window();
    let parent = display.create_simple_window(root, 0, 0, 100, 100, 0, 0, 0).unwrap();
    let mut children = Vec::new();
    for i in 0..3 {
        let child = display
            .create_simple_window(parent, i * 10, 0, 10, 10, 0, 0, 0)
            .unwrap();
        display.select_input(child, event_mask::STRUCTURE_NOTIFY).unwrap();
        children.push(child);
    }
    let grandchild = display.create_simple_window(children[0], 0, 0, 5, 5, 0, 0, 0).unwrap();
    display.select_input(grandchild, event_mask::STRUCTURE_NOTIFY).unwrap();
    display.select_input(parent, event_mask::STRUCTURE_NOTIFY).unwrap();

    display.destroy_window(parent).unwrap();

    let destroyed: Vec<Window> = std::iter::from_fn(|| display.check_typed_event(EventType::DestroyNotify))
        .map(|e| match e {
            Event::DestroyNotify(d) => d.window,
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(destroyed.len(), children.len() + 2);
    assert_eq!(destroyed.last(), Some(&parent));
    let position = |w: Window| destroyed.iter().position(|d| *d == w).unwrap();
    assert!(position(grandchild) < position(children[0]));

    let err = display.get_geometry(children[1].id()).unwrap_err();
    assert_eq!(err.code, ErrorCode::Drawable);
}

#[test_log::test]
fn test_resource_ids_are_not_reused() {
    let mut display = null_display();
    let root = display.root_window();
    let first = display.create_simple_window(root, 0, 0, 10, 10, 0, 0, 0).unwrap();
    display.destroy_window(first).unwrap();
    let second = display.create_simple_window(root, 0, 0, 10, 10, 0, 0, 0).unwrap();
    let pixmap = display.create_pixmap(second.id(), 4, 4, 1).unwrap();
    assert!(second.id() > first.id());
    assert!(pixmap.id() > second.id());
}

#[test_log::test]
fn test_gc_switching_cost() {
    let (mut display, log) = recording_display();
    let root = display.root_window();
    let window = display.create_simple_window(root, 0, 0, 50, 50, 0, 0, 0).unwrap();
    let a_values = XGcValues {
        foreground: 0xff0000,
        ..Default::default()
    };
    let b_values = XGcValues {
        foreground: 0x0000ff,
        fill_rule: FillRule::Winding as u32,
        line_width: 4,
        ..Default::default()
    };
    let a = display.create_gc(window.id(), GcValueMask::FOREGROUND, &a_values).unwrap();
    let b = display
        .create_gc(
            window.id(),
            GcValueMask::FOREGROUND | GcValueMask::FILL_RULE | GcValueMask::LINE_WIDTH,
            &b_values,
        )
        .unwrap();

    let state_calls = || log.take().iter().filter(|c| c.is_state_change()).count();
    display.fill_rectangle(window.id(), a, 0, 0, 5, 5).unwrap();
    state_calls();

    display.fill_rectangle(window.id(), b, 0, 0, 5, 5).unwrap();
    assert_eq!(state_calls(), 3);
    display.fill_rectangle(window.id(), a, 0, 0, 5, 5).unwrap();
    assert_eq!(state_calls(), 3);
    display.fill_rectangle(window.id(), a, 0, 0, 5, 5).unwrap();
    assert_eq!(state_calls(), 0);

    display.set_foreground(a, 0x00ff00).unwrap();
    display.set_foreground(a, 0x00ff00).unwrap();
    display.fill_rectangle(window.id(), a, 0, 0, 5, 5).unwrap();
    assert_eq!(state_calls(), 1);
}

#[test_log::test]
fn test_color_round_trip() {
    let mut display = null_display();
    let colormap = display.default_colormap();
    for (name, rgb) in [
        ("red", (0xffff, 0, 0)),
        ("Navy Blue", (0, 0, 0x8080)),
        ("white", (0xffff, 0xffff, 0xffff)),
    ] {
        let (screen, _) = display.alloc_named_color(colormap, name).unwrap();
        let mut queried = XColor {
            pixel: screen.pixel,
            ..Default::default()
        };
        display.query_color(colormap, &mut queried).unwrap();
        assert_eq!((queried.red, queried.green, queried.blue), rgb, "{}", name);
    }
}

#[test_log::test]
fn test_mapping_top_level_exposes_once() {
    let (mut display, log) = recording_display();
    let root = display.root_window();
    let attributes = SetWindowAttributes {
        event_mask: Some(event_mask::STRUCTURE_NOTIFY | event_mask::EXPOSURE),
        ..Default::default()
    };
    let window = display
        .create_window(root, 10, 10, 100, 100, 0, 0, WindowClass::CopyFromParent, &attributes)
        .unwrap();
    assert!(log
        .calls()
        .iter()
        .any(|c| matches!(c, HostCall::CreateWindow { frame, .. } if frame.x == 10 && frame.y == 10)));

    display.map_window(window).unwrap();
    let events: Vec<Event> = std::iter::from_fn(|| display.check_if_event(|_| true)).collect();
    let maps = events
        .iter()
        .filter(|e| e.event_type() == EventType::MapNotify)
        .count();
    assert_eq!(maps, 1);
    assert_eq!(events[0].event_type(), EventType::MapNotify);
    match &events[1] {
        Event::Expose(e) => {
            assert_eq!(e.window, window);
            assert_eq!((e.x, e.y, e.width, e.height), (0, 0, 100, 100));
        }
        other => panic!("expected Expose, got {:?}", other),
    }
    assert_eq!(events.len(), 2);
}

#[test_log::test]
fn test_errors_reach_the_handler() {
    use std::sync::{Arc, Mutex};

    let mut display = null_display();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    display.set_error_handler(Some(Box::new(move |err: &X11Error| {
        sink.lock().unwrap().push((err.code, err.request));
    })));
    let missing = Window::new(0x4242);
    assert!(display.map_window(missing).is_err());
    assert!(display.free_pixmap(Pixmap::new(0x4343)).is_err());
    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![(ErrorCode::Window, "XMapWindow"), (ErrorCode::Pixmap, "XFreePixmap")]
    );
}
