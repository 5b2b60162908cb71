//! Host input translation
//!
//! The host toolkit reports input on its own thread, against host views and
//! in view-local coordinates. `InputSink` turns each report into the X event
//! the client expects: it resolves the view to a window, honours active
//! grabs and keyboard focus, walks device events up the ancestor chain to
//! the first window selecting them, and sends the result through the event
//! queue's producer handle.

use crate::backend::{BackendEvent, HostView, HostWindow};
use crate::protocol::*;
use crate::queue::EventSender;
use crate::resources::{DrawableRegistry, RegistryView};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// An active pointer or keyboard grab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ActiveGrab {
    pub window: Window,
    pub owner_events: bool,
    /// Pointer grabs only; keyboard grabs take every key event
    pub event_mask: u32,
}

/// Grab, focus and pointer state shared by the client and host threads
#[derive(Debug)]
pub(crate) struct InputState {
    pub pointer_grab: Option<ActiveGrab>,
    pub keyboard_grab: Option<ActiveGrab>,
    pub focus: Window,
    pub revert_to: u8,
    pub pointer_window: Window,
    pub pointer_x: i32,
    pub pointer_y: i32,
    pub pointer_state: u16,
    /// Host resizes the client side still has to follow up on
    pub pending_resizes: Vec<PendingResize>,
}

/// A top-level the host resized; its content view has not followed yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingResize {
    pub window: Window,
    pub grew: bool,
}

impl InputState {
    pub fn new(root: Window) -> Self {
        InputState {
            pointer_grab: None,
            keyboard_grab: None,
            focus: root,
            revert_to: revert_to::POINTER_ROOT,
            pointer_window: root,
            pointer_x: 0,
            pointer_y: 0,
            pointer_state: 0,
            pending_resizes: Vec::new(),
        }
    }
}

/// `set_input_focus` revert modes
pub mod revert_to {
    pub const NONE: u8 = 0;
    pub const POINTER_ROOT: u8 = 1;
    pub const PARENT: u8 = 2;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeviceKind {
    KeyPress,
    KeyRelease,
    ButtonPress,
    ButtonRelease,
    Motion,
}

/// A device event before it is bound to a window
#[derive(Debug, Clone, Copy)]
struct Device {
    kind: DeviceKind,
    detail: u8,
    state: u16,
    time: Timestamp,
    root_x: i32,
    root_y: i32,
}

impl Device {
    /// Mask bits that select this event
    fn select_bits(&self) -> u32 {
        use event_mask::*;
        match self.kind {
            DeviceKind::KeyPress => KEY_PRESS,
            DeviceKind::KeyRelease => KEY_RELEASE,
            DeviceKind::ButtonPress => BUTTON_PRESS,
            DeviceKind::ButtonRelease => BUTTON_RELEASE,
            DeviceKind::Motion => {
                let mut bits = POINTER_MOTION;
                let buttons = [
                    (modifier_mask::BUTTON1, BUTTON1_MOTION),
                    (modifier_mask::BUTTON2, BUTTON2_MOTION),
                    (modifier_mask::BUTTON3, BUTTON3_MOTION),
                    (modifier_mask::BUTTON4, BUTTON4_MOTION),
                    (modifier_mask::BUTTON5, BUTTON5_MOTION),
                ];
                for (held, bit) in buttons {
                    if self.state & held != 0 {
                        bits |= bit | BUTTON_MOTION;
                    }
                }
                bits
            }
        }
    }

    fn is_key(&self) -> bool {
        matches!(self.kind, DeviceKind::KeyPress | DeviceKind::KeyRelease)
    }

    fn build(&self, window: Window, root: Window, subwindow: Window, origin: (i32, i32)) -> Event {
        let x = (self.root_x - origin.0) as i16;
        let y = (self.root_y - origin.1) as i16;
        macro_rules! key_button {
            ($variant:ident, $payload:ident) => {
                Event::$variant($payload {
                    serial: 0,
                    send_event: false,
                    window,
                    root,
                    subwindow,
                    time: self.time,
                    x,
                    y,
                    x_root: self.root_x as i16,
                    y_root: self.root_y as i16,
                    state: self.state,
                    detail: self.detail,
                    same_screen: true,
                })
            };
        }
        match self.kind {
            DeviceKind::KeyPress => key_button!(KeyPress, KeyPressEvent),
            DeviceKind::KeyRelease => key_button!(KeyRelease, KeyReleaseEvent),
            DeviceKind::ButtonPress => key_button!(ButtonPress, ButtonPressEvent),
            DeviceKind::ButtonRelease => key_button!(ButtonRelease, ButtonReleaseEvent),
            DeviceKind::Motion => Event::MotionNotify(MotionNotifyEvent {
                serial: 0,
                send_event: false,
                window,
                root,
                subwindow,
                time: self.time,
                x,
                y,
                x_root: self.root_x as i16,
                y_root: self.root_y as i16,
                state: self.state,
                is_hint: false,
                same_screen: true,
            }),
        }
    }
}

/// Walk from `source` towards the root and bind the event to the first
/// window selecting it, unless a `do_not_propagate` mask stops it first
fn propagate(reg: &RegistryView<'_>, root: Window, source: Window, device: &Device) -> Option<Event> {
    let bits = device.select_bits();
    let mut current = source;
    let mut child = Window::NONE;
    loop {
        let record = reg.window(current)?;
        if record.event_mask & bits != 0 {
            return Some(device.build(current, root, child, reg.root_origin(current)));
        }
        if record.do_not_propagate & bits != 0 || record.parent == Window::NONE {
            return None;
        }
        child = current;
        current = record.parent;
    }
}

fn is_inferior_or_self(reg: &RegistryView<'_>, window: Window, ancestor: Window) -> bool {
    window == ancestor || reg.ancestors(window).contains(&ancestor)
}

/// The host thread's handle for reporting input
#[derive(Debug, Clone)]
pub struct InputSink {
    registry: Arc<DrawableRegistry>,
    sender: EventSender,
    state: Arc<Mutex<InputState>>,
    root: Window,
}

impl InputSink {
    pub(crate) fn new(
        registry: Arc<DrawableRegistry>,
        sender: EventSender,
        state: Arc<Mutex<InputState>>,
        root: Window,
    ) -> Self {
        InputSink {
            registry,
            sender,
            state,
            root,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, InputState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Translate one host report and queue the resulting X event, if any
    pub fn deliver(&self, event: BackendEvent) {
        log::trace!("host input: {:?}", event);
        match event {
            BackendEvent::Expose {
                view,
                x,
                y,
                width,
                height,
            } => self.expose(view, Rectangle::new(x, y, width, height)),
            BackendEvent::Configure {
                window,
                x,
                y,
                width,
                height,
            } => self.configure(window, Rectangle::new(x, y, width, height)),
            BackendEvent::KeyPress {
                view,
                keycode,
                state,
                time,
                x,
                y,
            } => self.device(view, DeviceKind::KeyPress, keycode, state, time, x, y),
            BackendEvent::KeyRelease {
                view,
                keycode,
                state,
                time,
                x,
                y,
            } => self.device(view, DeviceKind::KeyRelease, keycode, state, time, x, y),
            BackendEvent::ButtonPress {
                view,
                button,
                state,
                time,
                x,
                y,
            } => self.device(view, DeviceKind::ButtonPress, button, state, time, x, y),
            BackendEvent::ButtonRelease {
                view,
                button,
                state,
                time,
                x,
                y,
            } => self.device(view, DeviceKind::ButtonRelease, button, state, time, x, y),
            BackendEvent::MotionNotify {
                view,
                state,
                time,
                x,
                y,
            } => self.device(view, DeviceKind::Motion, 0, state, time, x, y),
            BackendEvent::EnterNotify { view, x, y, time } => self.crossing(view, true, x, y, time),
            BackendEvent::LeaveNotify { view, x, y, time } => self.crossing(view, false, x, y, time),
            BackendEvent::FocusIn { view } => self.focus(view, true),
            BackendEvent::FocusOut { view } => self.focus(view, false),
        }
    }

    fn expose(&self, view: HostView, rect: Rectangle) {
        let reg = self.registry.read();
        let Some(window) = reg.window_for_view(view) else {
            log::debug!("expose for unknown view {:?}", view);
            return;
        };
        let Some(record) = reg.window(window) else {
            return;
        };
        if record.event_mask & event_mask::EXPOSURE == 0 || record.class == WindowClass::InputOnly {
            return;
        }
        self.sender.send(Event::Expose(ExposeEvent {
            serial: 0,
            send_event: false,
            window,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            count: 0,
        }));
    }

    /// The host moved or resized a top-level. `frame` is the interior the
    /// host shows, so the border is taken back out of the position.
    fn configure(&self, host: HostWindow, frame: Rectangle) {
        let Some(window) = self.registry.read().window_for_host_window(host) else {
            return;
        };
        let updated = self.registry.update_window(window, |w| {
            if w.host_frame() == frame {
                return None;
            }
            let bw = w.border_width as i16;
            let grew = frame.width > w.width || frame.height > w.height;
            let resized = (frame.width, frame.height) != (w.width, w.height);
            w.x = frame.x.saturating_sub(bw);
            w.y = frame.y.saturating_sub(bw);
            w.width = frame.width;
            w.height = frame.height;
            Some((w.clone(), resized, grew))
        });
        let Some(Some((record, resized, grew))) = updated else {
            return;
        };
        log::debug!("host reconfigured {} to {:?}", window, record.host_frame());
        let parent_mask = self
            .registry
            .get_window(record.parent)
            .map(|p| p.event_mask)
            .unwrap_or(0);
        let make = |event: Window| {
            Event::ConfigureNotify(ConfigureNotifyEvent {
                serial: 0,
                send_event: false,
                event,
                window,
                x: record.x,
                y: record.y,
                width: record.width,
                height: record.height,
                border_width: record.border_width,
                above: Window::NONE,
                override_redirect: record.override_redirect,
            })
        };
        if record.event_mask & event_mask::STRUCTURE_NOTIFY != 0 {
            self.sender.send(make(window));
        }
        if parent_mask & event_mask::SUBSTRUCTURE_NOTIFY != 0 {
            self.sender.send(make(record.parent));
        }
        // after the notify, so a follow-up Expose queues behind it
        if resized {
            self.lock_state().pending_resizes.push(PendingResize { window, grew });
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn device(&self, view: HostView, kind: DeviceKind, detail: u8, state: u16, time: u32, x: i16, y: i16) {
        let mut input = self.lock_state();
        let reg = self.registry.read();
        let Some(window) = reg.window_for_view(view) else {
            log::debug!("input for unknown view {:?}", view);
            return;
        };
        let (ox, oy) = reg.root_origin(window);
        let device = Device {
            kind,
            detail,
            state,
            time: Timestamp::new(time),
            root_x: ox + x as i32,
            root_y: oy + y as i32,
        };

        if !device.is_key() {
            input.pointer_x = device.root_x;
            input.pointer_y = device.root_y;
            input.pointer_window = window;
            input.pointer_state = state;
        }

        let grab = if device.is_key() {
            input.keyboard_grab
        } else {
            input.pointer_grab
        };

        let source = if device.is_key() && grab.is_none() {
            let focus = input.focus;
            if focus == Window::NONE {
                return;
            }
            if focus == self.root || is_inferior_or_self(&reg, window, focus) {
                window
            } else {
                focus
            }
        } else {
            window
        };
        drop(input);

        let event = match grab {
            None => propagate(&reg, self.root, source, &device),
            Some(grab) => {
                let normal = if grab.owner_events {
                    propagate(&reg, self.root, source, &device)
                } else {
                    None
                };
                normal.or_else(|| {
                    let selected = device.is_key() || grab.event_mask & device.select_bits() != 0;
                    selected.then(|| {
                        device.build(grab.window, self.root, Window::NONE, reg.root_origin(grab.window))
                    })
                })
            }
        };
        drop(reg);
        if let Some(event) = event {
            self.sender.send(event);
        }
    }

    fn crossing(&self, view: HostView, enter: bool, x: i16, y: i16, time: u32) {
        let reg = self.registry.read();
        let Some(window) = reg.window_for_view(view) else {
            return;
        };
        let Some(record) = reg.window(window) else {
            return;
        };
        let (ox, oy) = reg.root_origin(window);
        let mask = record.event_mask;
        drop(reg);

        let mut input = self.lock_state();
        if enter {
            input.pointer_window = window;
        }
        input.pointer_x = ox + x as i32;
        input.pointer_y = oy + y as i32;
        let focus = input.focus == window;
        let state = input.pointer_state;
        let mode = if input.pointer_grab.is_some() {
            notify_mode::GRAB
        } else {
            notify_mode::NORMAL
        };
        drop(input);

        let bit = if enter {
            event_mask::ENTER_WINDOW
        } else {
            event_mask::LEAVE_WINDOW
        };
        if mask & bit == 0 {
            return;
        }
        macro_rules! crossing {
            ($variant:ident, $payload:ident) => {
                Event::$variant($payload {
                    serial: 0,
                    send_event: false,
                    window,
                    root: self.root,
                    subwindow: Window::NONE,
                    time: Timestamp::new(time),
                    x,
                    y,
                    x_root: (ox + x as i32) as i16,
                    y_root: (oy + y as i32) as i16,
                    mode,
                    detail: notify_detail::NONLINEAR,
                    focus,
                    state,
                })
            };
        }
        let event = if enter {
            crossing!(EnterNotify, EnterNotifyEvent)
        } else {
            crossing!(LeaveNotify, LeaveNotifyEvent)
        };
        self.sender.send(event);
    }

    fn focus(&self, view: HostView, gained: bool) {
        let Some(window) = self.registry.window_for_view(view) else {
            return;
        };
        if gained {
            self.lock_state().focus = window;
        }
        let selected = self
            .registry
            .get_window(window)
            .map(|w| w.event_mask & event_mask::FOCUS_CHANGE != 0)
            .unwrap_or(false);
        if !selected {
            return;
        }
        let event = if gained {
            Event::FocusIn(FocusInEvent {
                serial: 0,
                send_event: false,
                window,
                mode: notify_mode::NORMAL,
                detail: notify_detail::NONLINEAR,
            })
        } else {
            Event::FocusOut(FocusOutEvent {
                serial: 0,
                send_event: false,
                window,
                mode: notify_mode::NORMAL,
                detail: notify_detail::NONLINEAR,
            })
        };
        self.sender.send(event);
    }
}
