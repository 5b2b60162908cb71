//! Grabs, focus and pointer queries
//!
//! Grab and focus state lives in the `InputState` shared with the host
//! input thread, which consults it when routing device events.

use super::input::{revert_to, ActiveGrab};
use super::Display;
use crate::protocol::*;

/// Events a pointer grab may select
const POINTER_GRAB_MASK: u32 = event_mask::BUTTON_PRESS
    | event_mask::BUTTON_RELEASE
    | event_mask::ENTER_WINDOW
    | event_mask::LEAVE_WINDOW
    | event_mask::ANY_MOTION
    | event_mask::KEYMAP_STATE;

/// `XQueryPointer`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerInfo {
    pub root: Window,
    /// Mapped child of the queried window containing the pointer
    pub child: Window,
    pub root_x: i16,
    pub root_y: i16,
    pub win_x: i16,
    pub win_y: i16,
    /// Modifier and button state
    pub mask: u16,
    pub same_screen: bool,
}

impl Display {
    /// Shared precondition checks; `Ok(None)` means the grab may proceed
    fn grab_precheck(
        &self,
        window: Window,
        allowed: bool,
        time: Timestamp,
        request: &'static str,
    ) -> X11Result<Option<GrabStatus>> {
        self.window_record(window, request)?;
        if !allowed {
            log::info!("{} refused by configuration", request);
            return Ok(Some(GrabStatus::Frozen));
        }
        if time != Timestamp::CURRENT_TIME && time > self.now() {
            return Ok(Some(GrabStatus::InvalidTime));
        }
        if !self.registry.read().is_viewable(window) {
            return Ok(Some(GrabStatus::NotViewable));
        }
        Ok(None)
    }

    /// Route pointer events to `window` until ungrabbed.
    ///
    /// With `owner_events`, events that would normally reach one of the
    /// client's windows are delivered there; everything else goes to the
    /// grab window if `event_mask` selects it.
    pub fn grab_pointer(
        &mut self,
        window: Window,
        owner_events: bool,
        event_mask: u32,
        time: Timestamp,
    ) -> X11Result<GrabStatus> {
        const REQUEST: &str = "XGrabPointer";
        self.request(|d| {
            if event_mask & !POINTER_GRAB_MASK != 0 {
                return Err(X11Error::bad_value(event_mask, REQUEST));
            }
            if let Some(status) = d.grab_precheck(window, d.config.allow_pointer_grabs, time, REQUEST)? {
                return Ok(status);
            }
            let mut input = d.lock_input();
            if let Some(current) = input.pointer_grab {
                if current.window != window {
                    return Ok(GrabStatus::AlreadyGrabbed);
                }
            }
            input.pointer_grab = Some(ActiveGrab {
                window,
                owner_events,
                event_mask,
            });
            log::debug!("pointer grabbed by {}", window);
            Ok(GrabStatus::Success)
        })
    }

    pub fn ungrab_pointer(&mut self, time: Timestamp) {
        let mut input = self.lock_input();
        if input.pointer_grab.take().is_some() {
            log::debug!("pointer ungrabbed at {}", time.get());
        }
    }

    /// Route every key event to `window` until ungrabbed
    pub fn grab_keyboard(&mut self, window: Window, owner_events: bool, time: Timestamp) -> X11Result<GrabStatus> {
        const REQUEST: &str = "XGrabKeyboard";
        self.request(|d| {
            if let Some(status) = d.grab_precheck(window, d.config.allow_keyboard_grabs, time, REQUEST)? {
                return Ok(status);
            }
            let mut input = d.lock_input();
            if let Some(current) = input.keyboard_grab {
                if current.window != window {
                    return Ok(GrabStatus::AlreadyGrabbed);
                }
            }
            input.keyboard_grab = Some(ActiveGrab {
                window,
                owner_events,
                event_mask: event_mask::KEY_PRESS | event_mask::KEY_RELEASE,
            });
            log::debug!("keyboard grabbed by {}", window);
            Ok(GrabStatus::Success)
        })
    }

    pub fn ungrab_keyboard(&mut self, time: Timestamp) {
        let mut input = self.lock_input();
        if input.keyboard_grab.take().is_some() {
            log::debug!("keyboard ungrabbed at {}", time.get());
        }
    }

    /// Move keyboard focus; `Window::NONE` discards key events
    pub fn set_input_focus(&mut self, focus: Window, revert: u8, time: Timestamp) -> X11Result<()> {
        const REQUEST: &str = "XSetInputFocus";
        self.request(|d| {
            if revert > revert_to::PARENT {
                return Err(X11Error::bad_value(revert as u32, REQUEST));
            }
            if focus != Window::NONE {
                d.window_record(focus, REQUEST)?;
                if !d.registry.read().is_viewable(focus) {
                    return Err(X11Error::bad_match(REQUEST));
                }
            }
            let selects = |w: Window| {
                d.registry
                    .get_window(w)
                    .map(|r| r.event_mask & event_mask::FOCUS_CHANGE != 0)
                    .unwrap_or(false)
            };
            let previous = {
                let mut input = d.lock_input();
                let previous = input.focus;
                input.focus = focus;
                input.revert_to = revert;
                previous
            };
            if previous == focus {
                return Ok(());
            }
            log::debug!("focus {} -> {} at {}", previous, focus, time.get());
            let out_selected = selects(previous);
            let in_selected = selects(focus);
            if out_selected {
                d.queue_event(Event::FocusOut(FocusOutEvent {
                    serial: 0,
                    send_event: false,
                    window: previous,
                    mode: notify_mode::NORMAL,
                    detail: notify_detail::NONLINEAR,
                }));
            }
            if in_selected {
                d.queue_event(Event::FocusIn(FocusInEvent {
                    serial: 0,
                    send_event: false,
                    window: focus,
                    mode: notify_mode::NORMAL,
                    detail: notify_detail::NONLINEAR,
                }));
            }
            Ok(())
        })
    }

    /// Focus window and revert mode
    pub fn get_input_focus(&self) -> (Window, u8) {
        let input = self.lock_input();
        (input.focus, input.revert_to)
    }

    pub fn query_pointer(&mut self, window: Window) -> X11Result<PointerInfo> {
        self.request(|d| {
            d.window_record(window, "XQueryPointer")?;
            let (root_x, root_y, mask) = {
                let input = d.lock_input();
                (input.pointer_x, input.pointer_y, input.pointer_state)
            };
            let reg = d.registry.read();
            let (ox, oy) = reg.root_origin(window);
            let win_x = root_x - ox;
            let win_y = root_y - oy;
            Ok(PointerInfo {
                root: d.root,
                child: reg.child_at(window, win_x, win_y).unwrap_or(Window::NONE),
                root_x: root_x as i16,
                root_y: root_y as i16,
                win_x: win_x as i16,
                win_y: win_y as i16,
                mask,
                same_screen: true,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::null::NullBackend;
    use crate::display::DisplayConfig;

    fn open_with(config: DisplayConfig) -> (Display, Window) {
        let mut display = Display::open(config, Box::new(NullBackend::new())).unwrap();
        let root = display.root_window();
        let window = display.create_simple_window(root, 0, 0, 50, 50, 0, 0, 0).unwrap();
        (display, window)
    }

    #[test]
    fn test_grab_requires_viewable() {
        let (mut display, window) = open_with(DisplayConfig::default());
        let status = display
            .grab_pointer(window, false, event_mask::BUTTON_PRESS, Timestamp::CURRENT_TIME)
            .unwrap();
        assert_eq!(status, GrabStatus::NotViewable);
        display.map_window(window).unwrap();
        let status = display
            .grab_pointer(window, false, event_mask::BUTTON_PRESS, Timestamp::CURRENT_TIME)
            .unwrap();
        assert_eq!(status, GrabStatus::Success);
    }

    #[test]
    fn test_second_window_already_grabbed() {
        let (mut display, window) = open_with(DisplayConfig::default());
        let root = display.root_window();
        let other = display.create_simple_window(root, 0, 0, 5, 5, 0, 0, 0).unwrap();
        display.map_window(window).unwrap();
        display.map_window(other).unwrap();
        assert_eq!(
            display.grab_keyboard(window, false, Timestamp::CURRENT_TIME).unwrap(),
            GrabStatus::Success
        );
        assert_eq!(
            display.grab_keyboard(other, false, Timestamp::CURRENT_TIME).unwrap(),
            GrabStatus::AlreadyGrabbed
        );
        display.ungrab_keyboard(Timestamp::CURRENT_TIME);
        assert_eq!(
            display.grab_keyboard(other, false, Timestamp::CURRENT_TIME).unwrap(),
            GrabStatus::Success
        );
    }

    #[test]
    fn test_grabs_disabled_by_config() {
        let (mut display, window) = open_with(DisplayConfig::default().with_grabs(false));
        display.map_window(window).unwrap();
        let status = display
            .grab_pointer(window, true, 0, Timestamp::CURRENT_TIME)
            .unwrap();
        assert_eq!(status, GrabStatus::Frozen);
    }

    #[test]
    fn test_grab_mask_validated() {
        let (mut display, window) = open_with(DisplayConfig::default());
        let err = display
            .grab_pointer(window, false, event_mask::KEY_PRESS, Timestamp::CURRENT_TIME)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Value);
    }

    #[test]
    fn test_focus_change_events() {
        let (mut display, window) = open_with(DisplayConfig::default());
        display.map_window(window).unwrap();
        display.select_input(window, event_mask::FOCUS_CHANGE).unwrap();

        display
            .set_input_focus(window, revert_to::PARENT, Timestamp::CURRENT_TIME)
            .unwrap();
        assert!(matches!(display.next_event(), Some(Event::FocusIn(e)) if e.window == window));
        assert_eq!(display.get_input_focus(), (window, revert_to::PARENT));

        let root = display.root_window();
        display
            .set_input_focus(root, revert_to::NONE, Timestamp::CURRENT_TIME)
            .unwrap();
        assert!(matches!(display.next_event(), Some(Event::FocusOut(e)) if e.window == window));
    }

    #[test]
    fn test_focus_reverts_on_destroy() {
        let (mut display, window) = open_with(DisplayConfig::default());
        display.map_window(window).unwrap();
        display
            .set_input_focus(window, revert_to::PARENT, Timestamp::CURRENT_TIME)
            .unwrap();
        display.destroy_window(window).unwrap();
        assert_eq!(display.get_input_focus().0, display.root_window());
    }

    #[test]
    fn test_focus_on_unviewable_is_bad_match() {
        let (mut display, window) = open_with(DisplayConfig::default());
        let err = display
            .set_input_focus(window, revert_to::NONE, Timestamp::CURRENT_TIME)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Match);
    }
}
