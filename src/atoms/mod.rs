//! Atoms, window properties and selections
//!
//! Property values are stored as raw bytes. Format 16 and 32 items are kept
//! in native byte order, as Xlib hands them to the client.

use crate::protocol::*;
use byteorder::{ByteOrder, NativeEndian};
use std::collections::HashMap;

const PREDEFINED_ATOMS: [&str; 68] = [
    "PRIMARY",
    "SECONDARY",
    "ARC",
    "ATOM",
    "BITMAP",
    "CARDINAL",
    "COLORMAP",
    "CURSOR",
    "CUT_BUFFER0",
    "CUT_BUFFER1",
    "CUT_BUFFER2",
    "CUT_BUFFER3",
    "CUT_BUFFER4",
    "CUT_BUFFER5",
    "CUT_BUFFER6",
    "CUT_BUFFER7",
    "DRAWABLE",
    "FONT",
    "INTEGER",
    "PIXMAP",
    "POINT",
    "RECTANGLE",
    "RESOURCE_MANAGER",
    "RGB_COLOR_MAP",
    "RGB_BEST_MAP",
    "RGB_BLUE_MAP",
    "RGB_DEFAULT_MAP",
    "RGB_GRAY_MAP",
    "RGB_GREEN_MAP",
    "RGB_RED_MAP",
    "STRING",
    "VISUALID",
    "WINDOW",
    "WM_COMMAND",
    "WM_HINTS",
    "WM_CLIENT_MACHINE",
    "WM_ICON_NAME",
    "WM_ICON_SIZE",
    "WM_NAME",
    "WM_NORMAL_HINTS",
    "WM_SIZE_HINTS",
    "WM_ZOOM_HINTS",
    "MIN_SPACE",
    "NORM_SPACE",
    "MAX_SPACE",
    "END_SPACE",
    "SUPERSCRIPT_X",
    "SUPERSCRIPT_Y",
    "SUBSCRIPT_X",
    "SUBSCRIPT_Y",
    "UNDERLINE_POSITION",
    "UNDERLINE_THICKNESS",
    "STRIKEOUT_ASCENT",
    "STRIKEOUT_DESCENT",
    "ITALIC_ANGLE",
    "X_HEIGHT",
    "QUAD_WIDTH",
    "WEIGHT",
    "POINT_SIZE",
    "RESOLUTION",
    "COPYRIGHT",
    "NOTICE",
    "FONT_NAME",
    "FAMILY_NAME",
    "FULL_NAME",
    "CAP_HEIGHT",
    "WM_CLASS",
    "WM_TRANSIENT_FOR",
];

/// Interned atom names, for the lifetime of the connection
#[derive(Debug)]
pub struct AtomTable {
    by_name: HashMap<String, Atom>,
    names: HashMap<Atom, String>,
    next_atom: u32,
}

impl Default for AtomTable {
    fn default() -> Self {
        Self::new()
    }
}

impl AtomTable {
    pub fn new() -> Self {
        let mut table = AtomTable {
            by_name: HashMap::new(),
            names: HashMap::new(),
            next_atom: Atom::FIRST_USER_ATOM,
        };
        for (i, name) in PREDEFINED_ATOMS.iter().enumerate() {
            table.insert(Atom::new(i as u32 + 1), name);
        }
        table
    }

    fn insert(&mut self, atom: Atom, name: &str) {
        self.by_name.insert(name.to_string(), atom);
        self.names.insert(atom, name.to_string());
    }

    /// `None` only when `only_if_exists` and the name is unknown
    pub fn intern(&mut self, name: &str, only_if_exists: bool) -> Option<Atom> {
        if let Some(atom) = self.by_name.get(name) {
            return Some(*atom);
        }
        if only_if_exists {
            return None;
        }
        let atom = Atom::new(self.next_atom);
        self.next_atom += 1;
        self.insert(atom, name);
        log::debug!("interned atom {} = {}", name, atom.get());
        Some(atom)
    }

    pub fn name(&self, atom: Atom) -> X11Result<&str> {
        self.names
            .get(&atom)
            .map(String::as_str)
            .ok_or_else(|| X11Error::bad_atom(atom, "XGetAtomName"))
    }

    pub fn contains(&self, atom: Atom) -> bool {
        self.names.contains_key(&atom)
    }
}

/// `change_property` mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropMode {
    Replace = 0,
    Prepend = 1,
    Append = 2,
}

impl PropMode {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(PropMode::Replace),
            1 => Some(PropMode::Prepend),
            2 => Some(PropMode::Append),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyValue {
    pub type_: Atom,
    pub format: u8,
    pub data: Vec<u8>,
}

impl PropertyValue {
    pub fn item_count(&self) -> usize {
        self.data.len() / (self.format as usize / 8).max(1)
    }
}

/// What `get_property` returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyReply {
    /// `Atom::NONE` when the property does not exist
    pub type_: Atom,
    pub format: u8,
    pub bytes_after: u32,
    pub data: Vec<u8>,
}

impl PropertyReply {
    pub fn none() -> Self {
        PropertyReply {
            type_: Atom::NONE,
            format: 0,
            bytes_after: 0,
            data: Vec::new(),
        }
    }

    pub fn nitems(&self) -> usize {
        match self.format {
            0 => 0,
            f => self.data.len() / (f as usize / 8),
        }
    }

    pub fn items16(&self) -> Vec<u16> {
        decode_items16(&self.data)
    }

    pub fn items32(&self) -> Vec<u32> {
        decode_items32(&self.data)
    }
}

pub fn encode_items16(items: &[u16]) -> Vec<u8> {
    let mut data = vec![0u8; items.len() * 2];
    NativeEndian::write_u16_into(items, &mut data);
    data
}

pub fn encode_items32(items: &[u32]) -> Vec<u8> {
    let mut data = vec![0u8; items.len() * 4];
    NativeEndian::write_u32_into(items, &mut data);
    data
}

pub fn decode_items16(data: &[u8]) -> Vec<u16> {
    let mut items = vec![0u16; data.len() / 2];
    NativeEndian::read_u16_into(&data[..items.len() * 2], &mut items);
    items
}

pub fn decode_items32(data: &[u8]) -> Vec<u32> {
    let mut items = vec![0u32; data.len() / 4];
    NativeEndian::read_u32_into(&data[..items.len() * 4], &mut items);
    items
}

/// Properties of every window
#[derive(Debug, Default)]
pub struct PropertyStore {
    windows: HashMap<Window, HashMap<Atom, PropertyValue>>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn change(
        &mut self,
        window: Window,
        property: Atom,
        type_: Atom,
        format: u8,
        mode: PropMode,
        data: &[u8],
    ) -> X11Result<()> {
        if !matches!(format, 8 | 16 | 32) {
            return Err(X11Error::bad_value(format as u32, "XChangeProperty"));
        }
        if data.len() % (format as usize / 8) != 0 {
            return Err(X11Error::bad_length("XChangeProperty"));
        }
        let props = self.windows.entry(window).or_default();
        if mode != PropMode::Replace {
            if let Some(existing) = props.get_mut(&property) {
                if existing.type_ != type_ || existing.format != format {
                    return Err(X11Error::bad_match("XChangeProperty"));
                }
                if mode == PropMode::Prepend {
                    let mut joined = data.to_vec();
                    joined.extend_from_slice(&existing.data);
                    existing.data = joined;
                } else {
                    existing.data.extend_from_slice(data);
                }
                return Ok(());
            }
        }
        props.insert(
            property,
            PropertyValue {
                type_,
                format,
                data: data.to_vec(),
            },
        );
        Ok(())
    }

    /// Read a property; `long_offset`/`long_length` count 32-bit units.
    ///
    /// A type mismatch returns the actual type and format with no data.
    /// With `delete`, the property is removed once fully read; the returned
    /// flag tells the caller whether that happened.
    pub fn get(
        &mut self,
        window: Window,
        property: Atom,
        req_type: Atom,
        long_offset: u32,
        long_length: u32,
        delete: bool,
    ) -> X11Result<(PropertyReply, bool)> {
        let Some(value) = self.windows.get(&window).and_then(|p| p.get(&property)) else {
            return Ok((PropertyReply::none(), false));
        };
        if req_type != Atom::ANY_PROPERTY_TYPE && req_type != value.type_ {
            return Ok((
                PropertyReply {
                    type_: value.type_,
                    format: value.format,
                    bytes_after: value.data.len() as u32,
                    data: Vec::new(),
                },
                false,
            ));
        }
        let start = long_offset as usize * 4;
        if start > value.data.len() {
            return Err(X11Error::bad_value(long_offset, "XGetWindowProperty"));
        }
        let end = value
            .data
            .len()
            .min(start.saturating_add(long_length as usize * 4));
        let reply = PropertyReply {
            type_: value.type_,
            format: value.format,
            bytes_after: (value.data.len() - end) as u32,
            data: value.data[start..end].to_vec(),
        };
        let deleted = delete && reply.bytes_after == 0;
        if deleted {
            self.delete(window, property);
        }
        Ok((reply, deleted))
    }

    /// True when a property was actually removed
    pub fn delete(&mut self, window: Window, property: Atom) -> bool {
        self.windows
            .get_mut(&window)
            .map(|p| p.remove(&property).is_some())
            .unwrap_or(false)
    }

    pub fn list(&self, window: Window) -> Vec<Atom> {
        let mut atoms: Vec<Atom> = self
            .windows
            .get(&window)
            .map(|p| p.keys().copied().collect())
            .unwrap_or_default();
        atoms.sort();
        atoms
    }

    /// Forget every property of a destroyed window
    pub fn remove_window(&mut self, window: Window) {
        self.windows.remove(&window);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionOwner {
    pub owner: Window,
    pub time: Timestamp,
}

/// Selection ownership
#[derive(Debug, Default)]
pub struct SelectionTable {
    owners: HashMap<Atom, SelectionOwner>,
}

impl SelectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the owner; returns the previous owner when it loses the
    /// selection to a different window. Requests older than the current
    /// ownership are ignored.
    pub fn set_owner(&mut self, selection: Atom, owner: Window, time: Timestamp) -> Option<Window> {
        let current = self.owners.get(&selection).copied();
        if let Some(current) = current {
            if time != Timestamp::CURRENT_TIME
                && current.time != Timestamp::CURRENT_TIME
                && time < current.time
            {
                return None;
            }
        }
        if owner == Window::NONE {
            self.owners.remove(&selection);
        } else {
            self.owners.insert(selection, SelectionOwner { owner, time });
        }
        current.map(|c| c.owner).filter(|previous| *previous != owner)
    }

    pub fn owner(&self, selection: Atom) -> Window {
        self.owners
            .get(&selection)
            .map(|s| s.owner)
            .unwrap_or(Window::NONE)
    }

    /// Drop every selection owned by a destroyed window
    pub fn forget_window(&mut self, window: Window) {
        self.owners.retain(|_, s| s.owner != window);
    }
}
