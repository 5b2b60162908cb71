//! Host input delivered from a separate thread

use std::thread;

use xshim::backend::recording::{CallLog, HostCall, RecordingBackend};
use xshim::backend::{BackendEvent, HostView, HostWindow, ViewParent};
use xshim::display::SetWindowAttributes;
use xshim::protocol::*;
use xshim::{Display, DisplayConfig};

/// A mapped top-level and the host view standing for it
fn top_level(event_mask: u32) -> (Display, Window, HostView) {
    let backend = RecordingBackend::new();
    let log: CallLog = backend.log();
    let mut display = Display::open(DisplayConfig::default(), Box::new(backend)).unwrap();
    let root = display.root_window();
    let attributes = SetWindowAttributes {
        event_mask: Some(event_mask),
        ..Default::default()
    };
    let window = display
        .create_window(root, 10, 10, 100, 100, 0, 0, WindowClass::CopyFromParent, &attributes)
        .unwrap();
    display.map_window(window).unwrap();
    while display.check_if_event(|_| true).is_some() {}

    let view = log
        .calls()
        .into_iter()
        .find_map(|c| match c {
            HostCall::CreateView {
                view,
                parent: ViewParent::Window(_),
                ..
            } => Some(view),
            _ => None,
        })
        .unwrap();
    (display, window, view)
}

fn press(view: HostView, button: u8, x: i16) -> BackendEvent {
    BackendEvent::ButtonPress {
        view,
        button,
        state: 0,
        time: button as u32,
        x,
        y: 5,
    }
}

fn motion(view: HostView, x: i16) -> BackendEvent {
    BackendEvent::MotionNotify {
        view,
        state: 0,
        time: 0,
        x,
        y: 5,
    }
}

#[test_log::test]
fn test_events_cross_threads_in_order() {
    let (mut display, window, view) = top_level(event_mask::BUTTON_PRESS | event_mask::POINTER_MOTION);
    let sink = display.input_sink();

    let producer = thread::spawn(move || {
        for i in 0..20u8 {
            sink.deliver(motion(view, i as i16));
            sink.deliver(press(view, i % 5 + 1, i as i16));
        }
    });

    let mut serials = Vec::new();
    for i in 0..20u8 {
        match display.mask_event(event_mask::BUTTON_PRESS) {
            Some(Event::ButtonPress(e)) => {
                assert_eq!(e.window, window);
                assert_eq!(e.detail, i % 5 + 1);
                assert_eq!((e.x, e.x_root), (i as i16, 10 + i as i16));
                serials.push(e.serial);
            }
            other => panic!("expected ButtonPress, got {:?}", other),
        }
    }
    producer.join().unwrap();

    assert!(serials.windows(2).all(|w| w[0] < w[1]));
    // motion stays queued for whoever asks for it
    let mut motions = 0;
    while let Some(event) = display.check_mask_event(event_mask::ALL_EVENTS) {
        assert_eq!(event.event_type(), EventType::MotionNotify);
        motions += 1;
    }
    assert_eq!(motions, 20);
}

#[test_log::test]
fn test_button_mask_never_yields_motion() {
    let (mut display, _, view) = top_level(event_mask::BUTTON_PRESS);
    let sink = display.input_sink();
    sink.deliver(motion(view, 1));
    sink.deliver(press(view, 1, 1));
    sink.deliver(motion(view, 2));

    let event = display.mask_event(event_mask::BUTTON_PRESS).unwrap();
    assert_eq!(event.event_type(), EventType::ButtonPress);
    assert!(display.check_mask_event(event_mask::ALL_EVENTS).is_none());
    assert_eq!(display.pending(), 0);
}

#[test_log::test]
fn test_pointer_grab_redirects_presses() {
    let (mut display, window, view) = top_level(event_mask::BUTTON_PRESS);
    let root = display.root_window();
    let other = display.create_simple_window(root, 200, 200, 20, 20, 0, 0, 0).unwrap();
    display.map_window(other).unwrap();
    assert_eq!(
        display
            .grab_pointer(other, false, event_mask::BUTTON_PRESS, Timestamp::CURRENT_TIME)
            .unwrap(),
        GrabStatus::Success
    );

    display.input_sink().deliver(press(view, 3, 4));
    match display.next_event() {
        Some(Event::ButtonPress(e)) => {
            assert_eq!(e.window, other);
            assert_eq!((e.x_root, e.y_root), (14, 15));
        }
        other => panic!("expected grabbed ButtonPress, got {:?}", other),
    }

    display.ungrab_pointer(Timestamp::CURRENT_TIME);
    display.input_sink().deliver(press(view, 1, 4));
    assert!(matches!(display.next_event(), Some(Event::ButtonPress(e)) if e.window == window));
}

#[test_log::test]
fn test_host_expose_is_translated() {
    let (mut display, window, view) = top_level(event_mask::EXPOSURE);
    display.input_sink().deliver(BackendEvent::Expose {
        view,
        x: 5,
        y: 6,
        width: 7,
        height: 8,
    });
    match display.next_event() {
        Some(Event::Expose(e)) => {
            assert_eq!(e.window, window);
            assert_eq!((e.x, e.y, e.width, e.height), (5, 6, 7, 8));
        }
        other => panic!("expected Expose, got {:?}", other),
    }
}

/// A mapped top-level at (10,10) with a 2 pixel border, its host window and
/// content view, and the host call log
fn bordered_top_level() -> (Display, CallLog, Window, HostWindow, HostView) {
    let backend = RecordingBackend::new();
    let log = backend.log();
    let mut display = Display::open(DisplayConfig::default(), Box::new(backend)).unwrap();
    let root = display.root_window();
    let attributes = SetWindowAttributes {
        event_mask: Some(event_mask::STRUCTURE_NOTIFY | event_mask::EXPOSURE),
        ..Default::default()
    };
    let window = display
        .create_window(root, 10, 10, 100, 100, 2, 0, WindowClass::CopyFromParent, &attributes)
        .unwrap();
    display.map_window(window).unwrap();
    while display.check_if_event(|_| true).is_some() {}

    let calls = log.take();
    let (host, frame) = calls
        .iter()
        .find_map(|c| match c {
            HostCall::CreateWindow { window, frame, .. } => Some((*window, *frame)),
            _ => None,
        })
        .unwrap();
    assert_eq!(frame, Rectangle::new(12, 12, 100, 100));
    let view = calls
        .iter()
        .find_map(|c| match c {
            HostCall::CreateView {
                view,
                parent: ViewParent::Window(_),
                ..
            } => Some(*view),
            _ => None,
        })
        .unwrap();
    (display, log, window, host, view)
}

fn host_configure(host: HostWindow, x: i16, y: i16, width: u16, height: u16) -> BackendEvent {
    BackendEvent::Configure {
        window: host,
        x,
        y,
        width,
        height,
    }
}

#[test_log::test]
fn test_host_echo_of_bordered_frame_changes_nothing() {
    let (mut display, _, window, host, _) = bordered_top_level();
    display.input_sink().deliver(host_configure(host, 12, 12, 100, 100));

    assert_eq!(display.pending(), 0);
    let geometry = display.get_geometry(window.id()).unwrap();
    assert_eq!((geometry.x, geometry.y, geometry.width, geometry.height), (10, 10, 100, 100));
}

#[test_log::test]
fn test_host_move_resize_of_bordered_top_level() {
    let (mut display, log, window, host, view) = bordered_top_level();
    display.input_sink().deliver(host_configure(host, 32, 42, 200, 150));

    match display.next_event() {
        Some(Event::ConfigureNotify(e)) => {
            assert_eq!(e.window, window);
            assert_eq!((e.x, e.y, e.width, e.height), (30, 40, 200, 150));
            assert_eq!(e.border_width, 2);
        }
        other => panic!("expected ConfigureNotify, got {:?}", other),
    }
    match display.next_event() {
        Some(Event::Expose(e)) => {
            assert_eq!(e.window, window);
            assert_eq!((e.x, e.y, e.width, e.height), (0, 0, 200, 150));
        }
        other => panic!("expected Expose, got {:?}", other),
    }
    let geometry = display.get_geometry(window.id()).unwrap();
    assert_eq!((geometry.x, geometry.y, geometry.width, geometry.height), (30, 40, 200, 150));
    assert_eq!(log.count(|c| *c == HostCall::ResizeView(view, 200, 150)), 1);
}

#[test_log::test]
fn test_host_shrink_resizes_view_without_expose() {
    let (mut display, log, _, host, view) = bordered_top_level();
    display.input_sink().deliver(host_configure(host, 12, 12, 60, 40));

    let event = display.next_event().unwrap();
    assert_eq!(event.event_type(), EventType::ConfigureNotify);
    assert_eq!(display.pending(), 0);
    assert_eq!(log.count(|c| *c == HostCall::ResizeView(view, 60, 40)), 1);
}
