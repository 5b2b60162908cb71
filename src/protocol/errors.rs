//! Xlib status codes and error reporting

use super::types::*;
use std::error::Error;
use std::fmt;

/// X11 error codes as defined in the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCode {
    Request = 1,
    Value = 2,
    Window = 3,
    Pixmap = 4,
    Atom = 5,
    Cursor = 6,
    Font = 7,
    Match = 8,
    Drawable = 9,
    Access = 10,
    Alloc = 11,
    Colormap = 12,
    GContext = 13,
    IDChoice = 14,
    Name = 15,
    Length = 16,
    Implementation = 17,
}

impl ErrorCode {
    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            1 => Some(ErrorCode::Request),
            2 => Some(ErrorCode::Value),
            3 => Some(ErrorCode::Window),
            4 => Some(ErrorCode::Pixmap),
            5 => Some(ErrorCode::Atom),
            6 => Some(ErrorCode::Cursor),
            7 => Some(ErrorCode::Font),
            8 => Some(ErrorCode::Match),
            9 => Some(ErrorCode::Drawable),
            10 => Some(ErrorCode::Access),
            11 => Some(ErrorCode::Alloc),
            12 => Some(ErrorCode::Colormap),
            13 => Some(ErrorCode::GContext),
            14 => Some(ErrorCode::IDChoice),
            15 => Some(ErrorCode::Name),
            16 => Some(ErrorCode::Length),
            17 => Some(ErrorCode::Implementation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Request => "BadRequest (invalid request code or no such operation)",
            ErrorCode::Value => "BadValue (integer parameter out of range for operation)",
            ErrorCode::Window => "BadWindow (invalid Window parameter)",
            ErrorCode::Pixmap => "BadPixmap (invalid Pixmap parameter)",
            ErrorCode::Atom => "BadAtom (invalid Atom parameter)",
            ErrorCode::Cursor => "BadCursor (invalid Cursor parameter)",
            ErrorCode::Font => "BadFont (invalid Font parameter)",
            ErrorCode::Match => "BadMatch (invalid parameter attributes)",
            ErrorCode::Drawable => "BadDrawable (invalid Pixmap or Window parameter)",
            ErrorCode::Access => "BadAccess (attempt to access private resource denied)",
            ErrorCode::Alloc => "BadAlloc (insufficient resources for operation)",
            ErrorCode::Colormap => "BadColor (invalid Colormap parameter)",
            ErrorCode::GContext => "BadGC (invalid GC parameter)",
            ErrorCode::IDChoice => "BadIDChoice (invalid resource ID chosen for this connection)",
            ErrorCode::Name => "BadName (named color or font does not exist)",
            ErrorCode::Length => "BadLength (poly request too large or internal Xlib length error)",
            ErrorCode::Implementation => "BadImplementation (server does not implement operation)",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error reported by an emulated entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct X11Error {
    pub code: ErrorCode,
    /// Serial of the failing request
    pub serial: u64,
    /// Offending resource ID or value
    pub resource_id: u32,
    /// Name of the Xlib entry point that failed
    pub request: &'static str,
}

impl X11Error {
    pub fn new(code: ErrorCode, resource_id: u32, request: &'static str) -> Self {
        X11Error {
            code,
            serial: 0,
            resource_id,
            request,
        }
    }

    pub fn with_serial(mut self, serial: u64) -> Self {
        self.serial = serial;
        self
    }
}

impl fmt::Display for X11Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X Error of failed request: {} (request: {}, resource id: 0x{:x}, serial: {})",
            self.code, self.request, self.resource_id, self.serial
        )
    }
}

impl Error for X11Error {}

/// Result type for X11 operations
pub type X11Result<T> = Result<T, X11Error>;

/// Helper functions to create common errors
impl X11Error {
    pub fn bad_value(value: u32, request: &'static str) -> Self {
        X11Error::new(ErrorCode::Value, value, request)
    }

    pub fn bad_window(window: Window, request: &'static str) -> Self {
        X11Error::new(ErrorCode::Window, window.id().get(), request)
    }

    pub fn bad_pixmap(pixmap: Pixmap, request: &'static str) -> Self {
        X11Error::new(ErrorCode::Pixmap, pixmap.id().get(), request)
    }

    pub fn bad_atom(atom: Atom, request: &'static str) -> Self {
        X11Error::new(ErrorCode::Atom, atom.get(), request)
    }

    pub fn bad_drawable(id: XID, request: &'static str) -> Self {
        X11Error::new(ErrorCode::Drawable, id.get(), request)
    }

    pub fn bad_gc(gc: GContext, request: &'static str) -> Self {
        X11Error::new(ErrorCode::GContext, gc.id().get(), request)
    }

    pub fn bad_font(font: Font, request: &'static str) -> Self {
        X11Error::new(ErrorCode::Font, font.id().get(), request)
    }

    pub fn bad_match(request: &'static str) -> Self {
        X11Error::new(ErrorCode::Match, 0, request)
    }

    pub fn bad_alloc(request: &'static str) -> Self {
        X11Error::new(ErrorCode::Alloc, 0, request)
    }

    pub fn bad_name(request: &'static str) -> Self {
        X11Error::new(ErrorCode::Name, 0, request)
    }

    pub fn bad_length(request: &'static str) -> Self {
        X11Error::new(ErrorCode::Length, 0, request)
    }

    /// Entry point intentionally left unsupported
    pub fn not_implemented(request: &'static str) -> Self {
        X11Error::new(ErrorCode::Implementation, 0, request)
    }
}

/// Result of a pointer or keyboard grab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GrabStatus {
    Success = 0,
    AlreadyGrabbed = 1,
    InvalidTime = 2,
    NotViewable = 3,
    Frozen = 4,
}

impl fmt::Display for GrabStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GrabStatus::Success => "GrabSuccess",
            GrabStatus::AlreadyGrabbed => "AlreadyGrabbed",
            GrabStatus::InvalidTime => "GrabInvalidTime",
            GrabStatus::NotViewable => "GrabNotViewable",
            GrabStatus::Frozen => "GrabFrozen",
        };
        f.write_str(name)
    }
}
