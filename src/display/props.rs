//! Atoms, window properties and selections

use super::Display;
use crate::atoms::{PropMode, PropertyReply};
use crate::protocol::*;

impl Display {
    fn check_atom(&self, atom: Atom, request: &'static str) -> X11Result<()> {
        if self.atoms.contains(atom) {
            Ok(())
        } else {
            Err(X11Error::bad_atom(atom, request))
        }
    }

    /// Current time for requests passing `CURRENT_TIME`
    fn resolve_time(&self, time: Timestamp) -> Timestamp {
        if time == Timestamp::CURRENT_TIME {
            self.now()
        } else {
            time
        }
    }

    fn notify_property(&mut self, window: Window, atom: Atom, state: u8) {
        let selected = self
            .registry
            .get_window(window)
            .map(|r| r.event_mask & event_mask::PROPERTY_CHANGE != 0)
            .unwrap_or(false);
        if selected {
            let time = self.now();
            self.queue_event(Event::PropertyNotify(PropertyNotifyEvent {
                serial: 0,
                send_event: false,
                window,
                atom,
                time,
                state,
            }));
        }
    }

    /// `None` when `only_if_exists` is set and the name was never interned
    pub fn intern_atom(&mut self, name: &str, only_if_exists: bool) -> Option<Atom> {
        self.atoms.intern(name, only_if_exists)
    }

    pub fn get_atom_name(&mut self, atom: Atom) -> X11Result<String> {
        self.request(|d| d.atoms.name(atom).map(str::to_string))
    }

    /// Store, prepend to or append to a property. `data` holds items of
    /// `format` bits in native byte order.
    pub fn change_property(
        &mut self,
        window: Window,
        property: Atom,
        type_: Atom,
        format: u8,
        mode: PropMode,
        data: &[u8],
    ) -> X11Result<()> {
        const REQUEST: &str = "XChangeProperty";
        self.request(|d| {
            d.window_record(window, REQUEST)?;
            d.check_atom(property, REQUEST)?;
            d.check_atom(type_, REQUEST)?;
            d.properties.change(window, property, type_, format, mode, data)?;
            log::trace!("property {} on {} changed ({} bytes)", property.get(), window, data.len());
            d.notify_property(window, property, property_state::NEW_VALUE);
            Ok(())
        })
    }

    /// Read part of a property; `long_offset` and `long_length` count
    /// 32-bit units. A missing property yields a reply of type `NONE`.
    pub fn get_property(
        &mut self,
        window: Window,
        property: Atom,
        req_type: Atom,
        long_offset: u32,
        long_length: u32,
        delete: bool,
    ) -> X11Result<PropertyReply> {
        const REQUEST: &str = "XGetWindowProperty";
        self.request(|d| {
            d.window_record(window, REQUEST)?;
            d.check_atom(property, REQUEST)?;
            if req_type != Atom::ANY_PROPERTY_TYPE {
                d.check_atom(req_type, REQUEST)?;
            }
            let (reply, deleted) =
                d.properties
                    .get(window, property, req_type, long_offset, long_length, delete)?;
            if deleted {
                d.notify_property(window, property, property_state::DELETED);
            }
            Ok(reply)
        })
    }

    pub fn delete_property(&mut self, window: Window, property: Atom) -> X11Result<()> {
        const REQUEST: &str = "XDeleteProperty";
        self.request(|d| {
            d.window_record(window, REQUEST)?;
            d.check_atom(property, REQUEST)?;
            if d.properties.delete(window, property) {
                d.notify_property(window, property, property_state::DELETED);
            }
            Ok(())
        })
    }

    pub fn list_properties(&mut self, window: Window) -> X11Result<Vec<Atom>> {
        self.request(|d| {
            d.window_record(window, "XListProperties")?;
            Ok(d.properties.list(window))
        })
    }

    /// Take or release a selection. The previous owner, if any, gets a
    /// SelectionClear.
    pub fn set_selection_owner(&mut self, selection: Atom, owner: Window, time: Timestamp) -> X11Result<()> {
        const REQUEST: &str = "XSetSelectionOwner";
        self.request(|d| {
            d.check_atom(selection, REQUEST)?;
            if owner != Window::NONE {
                d.window_record(owner, REQUEST)?;
            }
            let time = d.resolve_time(time);
            if let Some(previous) = d.selections.set_owner(selection, owner, time) {
                log::debug!("selection {} moves from {} to {}", selection.get(), previous, owner);
                if d.registry.get_window(previous).is_some() {
                    d.queue_event(Event::SelectionClear(SelectionClearEvent {
                        serial: 0,
                        send_event: false,
                        window: previous,
                        selection,
                        time,
                    }));
                }
            }
            Ok(())
        })
    }

    pub fn get_selection_owner(&mut self, selection: Atom) -> X11Result<Window> {
        self.request(|d| {
            d.check_atom(selection, "XGetSelectionOwner")?;
            Ok(d.selections.owner(selection))
        })
    }

    /// Ask the selection owner to convert `selection` to `target` and
    /// store it in `property` on `requestor`. Without an owner the
    /// requestor is told at once, with a `NONE` property.
    pub fn convert_selection(
        &mut self,
        selection: Atom,
        target: Atom,
        property: Atom,
        requestor: Window,
        time: Timestamp,
    ) -> X11Result<()> {
        const REQUEST: &str = "XConvertSelection";
        self.request(|d| {
            d.window_record(requestor, REQUEST)?;
            d.check_atom(selection, REQUEST)?;
            d.check_atom(target, REQUEST)?;
            if property != Atom::NONE {
                d.check_atom(property, REQUEST)?;
            }
            let owner = d.selections.owner(selection);
            let event = if owner == Window::NONE {
                Event::SelectionNotify(SelectionNotifyEvent {
                    serial: 0,
                    send_event: false,
                    requestor,
                    selection,
                    target,
                    property: Atom::NONE,
                    time,
                })
            } else {
                Event::SelectionRequest(SelectionRequestEvent {
                    serial: 0,
                    send_event: false,
                    owner,
                    requestor,
                    selection,
                    target,
                    property,
                    time,
                })
            };
            d.queue_event(event);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::encode_items32;
    use crate::backend::null::NullBackend;
    use crate::display::DisplayConfig;

    fn open() -> (Display, Window) {
        let mut display = Display::open(DisplayConfig::default(), Box::new(NullBackend::new())).unwrap();
        let root = display.root_window();
        let window = display.create_simple_window(root, 0, 0, 10, 10, 0, 0, 0).unwrap();
        (display, window)
    }

    #[test]
    fn test_atoms_are_stable() {
        let (mut display, _) = open();
        assert_eq!(display.intern_atom("_XSHIM_TEST", true), None);
        let atom = display.intern_atom("_XSHIM_TEST", false).unwrap();
        assert_eq!(display.intern_atom("_XSHIM_TEST", true), Some(atom));
        assert_eq!(display.get_atom_name(atom).unwrap(), "_XSHIM_TEST");
        assert_eq!(display.get_atom_name(Atom::new(5000)).unwrap_err().code, ErrorCode::Atom);
    }

    #[test]
    fn test_property_notify_on_change_and_delete() {
        let (mut display, window) = open();
        display.select_input(window, event_mask::PROPERTY_CHANGE).unwrap();
        display
            .change_property(window, Atom::WM_CLASS, Atom::STRING, 8, PropMode::Replace, b"xshim\0")
            .unwrap();
        let reply = display
            .get_property(window, Atom::WM_CLASS, Atom::ANY_PROPERTY_TYPE, 0, 64, true)
            .unwrap();
        assert_eq!(reply.data, b"xshim\0");
        assert!(display.list_properties(window).unwrap().is_empty());

        let states: Vec<u8> = std::iter::from_fn(|| display.check_typed_event(EventType::PropertyNotify))
            .map(|e| match e {
                Event::PropertyNotify(p) => p.state,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(states, vec![property_state::NEW_VALUE, property_state::DELETED]);
    }

    #[test]
    fn test_append_requires_matching_format() {
        let (mut display, window) = open();
        display
            .change_property(window, Atom::WM_NAME, Atom::CARDINAL, 32, PropMode::Replace, &encode_items32(&[1]))
            .unwrap();
        display
            .change_property(window, Atom::WM_NAME, Atom::CARDINAL, 32, PropMode::Append, &encode_items32(&[2]))
            .unwrap();
        let reply = display
            .get_property(window, Atom::WM_NAME, Atom::CARDINAL, 0, 8, false)
            .unwrap();
        assert_eq!(reply.items32(), vec![1, 2]);
        let err = display
            .change_property(window, Atom::WM_NAME, Atom::STRING, 8, PropMode::Append, b"x")
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Match);
    }

    #[test]
    fn test_property_on_missing_window() {
        let (mut display, _) = open();
        let err = display
            .change_property(Window::new(0x5555), Atom::WM_NAME, Atom::STRING, 8, PropMode::Replace, b"x")
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Window);
    }

    #[test]
    fn test_selection_handover() {
        let (mut display, first) = open();
        let root = display.root_window();
        let second = display.create_simple_window(root, 0, 0, 10, 10, 0, 0, 0).unwrap();

        display.set_selection_owner(Atom::PRIMARY, first, Timestamp::CURRENT_TIME).unwrap();
        assert_eq!(display.get_selection_owner(Atom::PRIMARY).unwrap(), first);
        display.set_selection_owner(Atom::PRIMARY, second, Timestamp::CURRENT_TIME).unwrap();
        assert!(matches!(
            display.next_event(),
            Some(Event::SelectionClear(e)) if e.window == first && e.selection == Atom::PRIMARY
        ));

        display
            .convert_selection(Atom::PRIMARY, Atom::STRING, Atom::WM_NAME, first, Timestamp::CURRENT_TIME)
            .unwrap();
        assert!(matches!(
            display.next_event(),
            Some(Event::SelectionRequest(e)) if e.owner == second && e.requestor == first
        ));
    }

    #[test]
    fn test_convert_unowned_selection() {
        let (mut display, window) = open();
        display
            .convert_selection(Atom::SECONDARY, Atom::STRING, Atom::WM_NAME, window, Timestamp::CURRENT_TIME)
            .unwrap();
        assert!(matches!(
            display.next_event(),
            Some(Event::SelectionNotify(e)) if e.property == Atom::NONE && e.requestor == window
        ));
    }

    #[test]
    fn test_destroyed_owner_releases_selection() {
        let (mut display, window) = open();
        display.set_selection_owner(Atom::PRIMARY, window, Timestamp::CURRENT_TIME).unwrap();
        display.destroy_window(window).unwrap();
        assert_eq!(display.get_selection_owner(Atom::PRIMARY).unwrap(), Window::NONE);
    }
}
