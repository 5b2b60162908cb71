//! Xlib events
//!
//! Events are queued per connection and handed to the client by the event
//! retrieval entry points. Every payload carries the connection serial that
//! was current when it was queued and whether it was synthesized by
//! `send_event`.

use super::types::*;

/// Event type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventType {
    KeyPress = 2,
    KeyRelease = 3,
    ButtonPress = 4,
    ButtonRelease = 5,
    MotionNotify = 6,
    EnterNotify = 7,
    LeaveNotify = 8,
    FocusIn = 9,
    FocusOut = 10,
    KeymapNotify = 11,
    Expose = 12,
    GraphicsExposure = 13,
    NoExposure = 14,
    VisibilityNotify = 15,
    CreateNotify = 16,
    DestroyNotify = 17,
    UnmapNotify = 18,
    MapNotify = 19,
    MapRequest = 20,
    ReparentNotify = 21,
    ConfigureNotify = 22,
    ConfigureRequest = 23,
    GravityNotify = 24,
    ResizeRequest = 25,
    CirculateNotify = 26,
    CirculateRequest = 27,
    PropertyNotify = 28,
    SelectionClear = 29,
    SelectionRequest = 30,
    SelectionNotify = 31,
    ColormapNotify = 32,
    ClientMessage = 33,
    MappingNotify = 34,
}

impl EventType {
    /// The one event-mask bit that selects this event type.
    ///
    /// Types that cannot be selected report `NO_EVENT` and are only matched
    /// by `event_mask::ALL_EVENTS`.
    pub fn mask(&self) -> u32 {
        use event_mask::*;
        match self {
            EventType::KeyPress => KEY_PRESS,
            EventType::KeyRelease => KEY_RELEASE,
            EventType::ButtonPress => BUTTON_PRESS,
            EventType::ButtonRelease => BUTTON_RELEASE,
            EventType::MotionNotify => POINTER_MOTION,
            EventType::EnterNotify => ENTER_WINDOW,
            EventType::LeaveNotify => LEAVE_WINDOW,
            EventType::FocusIn | EventType::FocusOut => FOCUS_CHANGE,
            EventType::KeymapNotify => KEYMAP_STATE,
            EventType::Expose => EXPOSURE,
            EventType::VisibilityNotify => VISIBILITY_CHANGE,
            EventType::CreateNotify => SUBSTRUCTURE_NOTIFY,
            EventType::DestroyNotify
            | EventType::UnmapNotify
            | EventType::MapNotify
            | EventType::ReparentNotify
            | EventType::ConfigureNotify
            | EventType::GravityNotify
            | EventType::CirculateNotify => STRUCTURE_NOTIFY,
            EventType::MapRequest | EventType::ConfigureRequest | EventType::CirculateRequest => {
                SUBSTRUCTURE_REDIRECT
            }
            EventType::ResizeRequest => RESIZE_REDIRECT,
            EventType::PropertyNotify => PROPERTY_CHANGE,
            EventType::ColormapNotify => COLORMAP_CHANGE,
            EventType::GraphicsExposure
            | EventType::NoExposure
            | EventType::SelectionClear
            | EventType::SelectionRequest
            | EventType::SelectionNotify
            | EventType::ClientMessage
            | EventType::MappingNotify => NO_EVENT,
        }
    }
}

/// Queued event
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    KeyPress(KeyPressEvent),
    KeyRelease(KeyReleaseEvent),
    ButtonPress(ButtonPressEvent),
    ButtonRelease(ButtonReleaseEvent),
    MotionNotify(MotionNotifyEvent),
    EnterNotify(EnterNotifyEvent),
    LeaveNotify(LeaveNotifyEvent),
    FocusIn(FocusInEvent),
    FocusOut(FocusOutEvent),
    Expose(ExposeEvent),
    GraphicsExposure(GraphicsExposureEvent),
    NoExposure(NoExposureEvent),
    CreateNotify(CreateNotifyEvent),
    DestroyNotify(DestroyNotifyEvent),
    UnmapNotify(UnmapNotifyEvent),
    MapNotify(MapNotifyEvent),
    ReparentNotify(ReparentNotifyEvent),
    ConfigureNotify(ConfigureNotifyEvent),
    PropertyNotify(PropertyNotifyEvent),
    SelectionClear(SelectionClearEvent),
    SelectionRequest(SelectionRequestEvent),
    SelectionNotify(SelectionNotifyEvent),
    ClientMessage(ClientMessageEvent),
}

macro_rules! with_payload {
    ($event:expr, $e:ident => $body:expr) => {
        match $event {
            Event::KeyPress($e) => $body,
            Event::KeyRelease($e) => $body,
            Event::ButtonPress($e) => $body,
            Event::ButtonRelease($e) => $body,
            Event::MotionNotify($e) => $body,
            Event::EnterNotify($e) => $body,
            Event::LeaveNotify($e) => $body,
            Event::FocusIn($e) => $body,
            Event::FocusOut($e) => $body,
            Event::Expose($e) => $body,
            Event::GraphicsExposure($e) => $body,
            Event::NoExposure($e) => $body,
            Event::CreateNotify($e) => $body,
            Event::DestroyNotify($e) => $body,
            Event::UnmapNotify($e) => $body,
            Event::MapNotify($e) => $body,
            Event::ReparentNotify($e) => $body,
            Event::ConfigureNotify($e) => $body,
            Event::PropertyNotify($e) => $body,
            Event::SelectionClear($e) => $body,
            Event::SelectionRequest($e) => $body,
            Event::SelectionNotify($e) => $body,
            Event::ClientMessage($e) => $body,
        }
    };
}

impl Event {
    /// Get the event type code
    pub fn event_type(&self) -> EventType {
        match self {
            Event::KeyPress(_) => EventType::KeyPress,
            Event::KeyRelease(_) => EventType::KeyRelease,
            Event::ButtonPress(_) => EventType::ButtonPress,
            Event::ButtonRelease(_) => EventType::ButtonRelease,
            Event::MotionNotify(_) => EventType::MotionNotify,
            Event::EnterNotify(_) => EventType::EnterNotify,
            Event::LeaveNotify(_) => EventType::LeaveNotify,
            Event::FocusIn(_) => EventType::FocusIn,
            Event::FocusOut(_) => EventType::FocusOut,
            Event::Expose(_) => EventType::Expose,
            Event::GraphicsExposure(_) => EventType::GraphicsExposure,
            Event::NoExposure(_) => EventType::NoExposure,
            Event::CreateNotify(_) => EventType::CreateNotify,
            Event::DestroyNotify(_) => EventType::DestroyNotify,
            Event::UnmapNotify(_) => EventType::UnmapNotify,
            Event::MapNotify(_) => EventType::MapNotify,
            Event::ReparentNotify(_) => EventType::ReparentNotify,
            Event::ConfigureNotify(_) => EventType::ConfigureNotify,
            Event::PropertyNotify(_) => EventType::PropertyNotify,
            Event::SelectionClear(_) => EventType::SelectionClear,
            Event::SelectionRequest(_) => EventType::SelectionRequest,
            Event::SelectionNotify(_) => EventType::SelectionNotify,
            Event::ClientMessage(_) => EventType::ClientMessage,
        }
    }

    pub fn serial(&self) -> u64 {
        with_payload!(self, e => e.serial)
    }

    pub fn set_serial(&mut self, serial: u64) {
        with_payload!(self, e => e.serial = serial)
    }

    pub fn send_event(&self) -> bool {
        with_payload!(self, e => e.send_event)
    }

    pub fn set_send_event(&mut self, synthetic: bool) {
        with_payload!(self, e => e.send_event = synthetic)
    }

    /// The resource the event is reported relative to (`xany.window`)
    pub fn window(&self) -> XID {
        match self {
            Event::KeyPress(e) => e.window.id(),
            Event::KeyRelease(e) => e.window.id(),
            Event::ButtonPress(e) => e.window.id(),
            Event::ButtonRelease(e) => e.window.id(),
            Event::MotionNotify(e) => e.window.id(),
            Event::EnterNotify(e) => e.window.id(),
            Event::LeaveNotify(e) => e.window.id(),
            Event::FocusIn(e) => e.window.id(),
            Event::FocusOut(e) => e.window.id(),
            Event::Expose(e) => e.window.id(),
            Event::GraphicsExposure(e) => e.drawable.id(),
            Event::NoExposure(e) => e.drawable.id(),
            Event::CreateNotify(e) => e.parent.id(),
            Event::DestroyNotify(e) => e.event.id(),
            Event::UnmapNotify(e) => e.event.id(),
            Event::MapNotify(e) => e.event.id(),
            Event::ReparentNotify(e) => e.event.id(),
            Event::ConfigureNotify(e) => e.event.id(),
            Event::PropertyNotify(e) => e.window.id(),
            Event::SelectionClear(e) => e.window.id(),
            Event::SelectionRequest(e) => e.owner.id(),
            Event::SelectionNotify(e) => e.requestor.id(),
            Event::ClientMessage(e) => e.window.id(),
        }
    }

    /// True when the event type is selected by `mask`
    pub fn matches_mask(&self, mask: u32) -> bool {
        if mask == event_mask::ALL_EVENTS {
            return true;
        }
        if let Event::MotionNotify(_) = self {
            return mask & event_mask::ANY_MOTION != 0;
        }
        let bit = self.event_type().mask();
        bit != 0 && mask & bit != 0
    }
}

// Key and button events share a common structure
macro_rules! define_key_button_event {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            pub serial: u64,
            pub send_event: bool,
            pub window: Window,
            pub root: Window,
            pub subwindow: Window,
            pub time: Timestamp,
            pub x: i16,
            pub y: i16,
            pub x_root: i16,
            pub y_root: i16,
            pub state: u16, // Modifier mask
            pub detail: u8, // Keycode or button
            pub same_screen: bool,
        }
    };
}

define_key_button_event!(KeyPressEvent);
define_key_button_event!(KeyReleaseEvent);
define_key_button_event!(ButtonPressEvent);
define_key_button_event!(ButtonReleaseEvent);

#[derive(Debug, Clone, PartialEq)]
pub struct MotionNotifyEvent {
    pub serial: u64,
    pub send_event: bool,
    pub window: Window,
    pub root: Window,
    pub subwindow: Window,
    pub time: Timestamp,
    pub x: i16,
    pub y: i16,
    pub x_root: i16,
    pub y_root: i16,
    pub state: u16,
    pub is_hint: bool,
    pub same_screen: bool,
}

/// Crossing mode: NotifyNormal, NotifyGrab, NotifyUngrab
pub mod notify_mode {
    pub const NORMAL: u8 = 0;
    pub const GRAB: u8 = 1;
    pub const UNGRAB: u8 = 2;
}

/// Crossing detail
pub mod notify_detail {
    pub const ANCESTOR: u8 = 0;
    pub const VIRTUAL: u8 = 1;
    pub const INFERIOR: u8 = 2;
    pub const NONLINEAR: u8 = 3;
    pub const NONLINEAR_VIRTUAL: u8 = 4;
    pub const POINTER: u8 = 5;
    pub const POINTER_ROOT: u8 = 6;
    pub const NONE: u8 = 7;
}

macro_rules! define_enter_leave_event {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            pub serial: u64,
            pub send_event: bool,
            pub window: Window,
            pub root: Window,
            pub subwindow: Window,
            pub time: Timestamp,
            pub x: i16,
            pub y: i16,
            pub x_root: i16,
            pub y_root: i16,
            pub mode: u8,
            pub detail: u8,
            pub focus: bool,
            pub state: u16,
        }
    };
}

define_enter_leave_event!(EnterNotifyEvent);
define_enter_leave_event!(LeaveNotifyEvent);

macro_rules! define_focus_event {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            pub serial: u64,
            pub send_event: bool,
            pub window: Window,
            pub mode: u8,
            pub detail: u8,
        }
    };
}

define_focus_event!(FocusInEvent);
define_focus_event!(FocusOutEvent);

#[derive(Debug, Clone, PartialEq)]
pub struct ExposeEvent {
    pub serial: u64,
    pub send_event: bool,
    pub window: Window,
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
    pub count: u16, // Number of following expose events
}

impl ExposeEvent {
    pub fn rectangle(&self) -> Rectangle {
        Rectangle::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsExposureEvent {
    pub serial: u64,
    pub send_event: bool,
    pub drawable: Drawable,
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
    pub count: u16,
    pub major_code: u8,
    pub minor_code: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoExposureEvent {
    pub serial: u64,
    pub send_event: bool,
    pub drawable: Drawable,
    pub major_code: u8,
    pub minor_code: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateNotifyEvent {
    pub serial: u64,
    pub send_event: bool,
    pub parent: Window,
    pub window: Window,
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
    pub border_width: u16,
    pub override_redirect: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DestroyNotifyEvent {
    pub serial: u64,
    pub send_event: bool,
    pub event: Window,
    pub window: Window,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnmapNotifyEvent {
    pub serial: u64,
    pub send_event: bool,
    pub event: Window,
    pub window: Window,
    pub from_configure: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapNotifyEvent {
    pub serial: u64,
    pub send_event: bool,
    pub event: Window,
    pub window: Window,
    pub override_redirect: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReparentNotifyEvent {
    pub serial: u64,
    pub send_event: bool,
    pub event: Window,
    pub window: Window,
    pub parent: Window,
    pub x: i16,
    pub y: i16,
    pub override_redirect: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigureNotifyEvent {
    pub serial: u64,
    pub send_event: bool,
    pub event: Window,
    pub window: Window,
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
    pub border_width: u16,
    pub above: Window,
    pub override_redirect: bool,
}

/// PropertyNotify state
pub mod property_state {
    pub const NEW_VALUE: u8 = 0;
    pub const DELETED: u8 = 1;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyNotifyEvent {
    pub serial: u64,
    pub send_event: bool,
    pub window: Window,
    pub atom: Atom,
    pub time: Timestamp,
    pub state: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionClearEvent {
    pub serial: u64,
    pub send_event: bool,
    pub window: Window,
    pub selection: Atom,
    pub time: Timestamp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionRequestEvent {
    pub serial: u64,
    pub send_event: bool,
    pub owner: Window,
    pub requestor: Window,
    pub selection: Atom,
    pub target: Atom,
    pub property: Atom,
    pub time: Timestamp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionNotifyEvent {
    pub serial: u64,
    pub send_event: bool,
    pub requestor: Window,
    pub selection: Atom,
    pub target: Atom,
    pub property: Atom,
    pub time: Timestamp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientMessageEvent {
    pub serial: u64,
    pub send_event: bool,
    pub window: Window,
    pub message_type: Atom,
    pub format: u8,
    pub data: [u8; 20],
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expose(window: u32) -> Event {
        Event::Expose(ExposeEvent {
            serial: 0,
            send_event: false,
            window: Window::new(window),
            x: 0,
            y: 0,
            width: 10,
            height: 10,
            count: 0,
        })
    }

    #[test]
    fn test_mask_table() {
        assert_eq!(EventType::MotionNotify.mask(), event_mask::POINTER_MOTION);
        assert_eq!(EventType::ButtonPress.mask(), event_mask::BUTTON_PRESS);
        assert_eq!(EventType::MapNotify.mask(), event_mask::STRUCTURE_NOTIFY);
        assert_eq!(EventType::ClientMessage.mask(), event_mask::NO_EVENT);
    }

    #[test]
    fn test_matches_mask() {
        let ev = expose(0x200);
        assert!(ev.matches_mask(event_mask::EXPOSURE));
        assert!(!ev.matches_mask(event_mask::BUTTON_PRESS));
        assert!(!ev.matches_mask(event_mask::NO_EVENT));
        assert!(ev.matches_mask(event_mask::ALL_EVENTS));
    }

    #[test]
    fn test_motion_matches_any_motion_bit() {
        let ev = Event::MotionNotify(MotionNotifyEvent {
            serial: 0,
            send_event: false,
            window: Window::new(0x200),
            root: Window::new(1),
            subwindow: Window::NONE,
            time: Timestamp::new(0),
            x: 0,
            y: 0,
            x_root: 0,
            y_root: 0,
            state: 0,
            is_hint: false,
            same_screen: true,
        });
        assert!(ev.matches_mask(event_mask::BUTTON1_MOTION));
        assert!(ev.matches_mask(event_mask::POINTER_MOTION));
        assert!(!ev.matches_mask(event_mask::BUTTON_PRESS));
    }

    #[test]
    fn test_unselectable_only_matches_all() {
        let ev = Event::ClientMessage(ClientMessageEvent {
            serial: 0,
            send_event: true,
            window: Window::new(0x200),
            message_type: Atom::new(70),
            format: 32,
            data: [0; 20],
        });
        assert!(!ev.matches_mask(event_mask::ALL_MASK_BITS));
        assert!(ev.matches_mask(event_mask::ALL_EVENTS));
    }

    #[test]
    fn test_serial_accessors() {
        let mut ev = expose(0x200);
        ev.set_serial(41);
        assert_eq!(ev.serial(), 41);
        assert_eq!(ev.window(), XID::new(0x200));
    }
}
