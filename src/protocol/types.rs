//! Core Xlib types
//!
//! Resource identifiers, geometry primitives and the fixed X11 enumerations
//! that client programs pass through the emulated entry points.

use std::fmt;

/// Opaque resource ID shared by windows, pixmaps, GCs, fonts and cursors.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct XID(pub u32);

impl XID {
    pub const NONE: XID = XID(0);

    pub fn new(id: u32) -> Self {
        XID(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for XID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

macro_rules! define_resource_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub XID);

        impl $name {
            pub const NONE: $name = $name(XID::NONE);

            pub fn new(id: u32) -> Self {
                $name(XID::new(id))
            }

            pub fn id(&self) -> XID {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_resource_id!(
    /// Window ID
    Window
);
define_resource_id!(
    /// Pixmap ID
    Pixmap
);
define_resource_id!(
    /// Graphics Context ID
    GContext
);
define_resource_id!(
    /// Colormap ID
    Colormap
);
define_resource_id!(
    /// Cursor ID
    Cursor
);
define_resource_id!(
    /// Font ID
    Font
);

/// Drawable - can be either a Window or Pixmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Drawable {
    Window(Window),
    Pixmap(Pixmap),
}

impl Drawable {
    pub fn id(&self) -> XID {
        match self {
            Drawable::Window(w) => w.id(),
            Drawable::Pixmap(p) => p.id(),
        }
    }

    pub fn as_window(&self) -> Option<Window> {
        match self {
            Drawable::Window(w) => Some(*w),
            Drawable::Pixmap(_) => None,
        }
    }
}

impl From<Window> for Drawable {
    fn from(window: Window) -> Self {
        Drawable::Window(window)
    }
}

impl From<Pixmap> for Drawable {
    fn from(pixmap: Pixmap) -> Self {
        Drawable::Pixmap(pixmap)
    }
}

/// Atom - interned string identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    pub const NONE: Atom = Atom(0);
    pub const PRIMARY: Atom = Atom(1);
    pub const SECONDARY: Atom = Atom(2);
    pub const ATOM: Atom = Atom(4);
    pub const CARDINAL: Atom = Atom(6);
    pub const INTEGER: Atom = Atom(19);
    pub const STRING: Atom = Atom(31);
    pub const WINDOW: Atom = Atom(33);
    pub const WM_ICON_NAME: Atom = Atom(37);
    pub const WM_NAME: Atom = Atom(39);
    pub const WM_CLASS: Atom = Atom(67);
    pub const WM_TRANSIENT_FOR: Atom = Atom(68);

    /// Pseudo-type accepted by `get_property` to match any property type.
    pub const ANY_PROPERTY_TYPE: Atom = Atom(0);

    /// First atom ID handed out by `intern_atom`
    pub const FIRST_USER_ATOM: u32 = 69;

    pub fn new(id: u32) -> Self {
        Atom(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

/// Visual ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualID(pub u32);

impl VisualID {
    pub fn new(id: u32) -> Self {
        VisualID(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

/// Timestamp (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Timestamp(pub u32);

impl Timestamp {
    pub const CURRENT_TIME: Timestamp = Timestamp(0);

    pub fn new(ms: u32) -> Self {
        Timestamp(ms)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

/// Point (x, y coordinate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i16,
    pub y: i16,
}

impl Point {
    pub fn new(x: i16, y: i16) -> Self {
        Point { x, y }
    }
}

/// Rectangle, origin top-left, Y growing downwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rectangle {
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
}

impl Rectangle {
    pub fn new(x: i16, y: i16, width: u16, height: u16) -> Self {
        Rectangle {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge
    pub fn right(&self) -> i32 {
        self.x as i32 + self.width as i32
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> i32 {
        self.y as i32 + self.height as i32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x as i32 && y >= self.y as i32 && x < self.right() && y < self.bottom()
    }

    /// True when `other` lies entirely inside `self`
    pub fn contains(&self, other: &Rectangle) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn intersection(&self, other: &Rectangle) -> Option<Rectangle> {
        let x1 = (self.x as i32).max(other.x as i32);
        let y1 = (self.y as i32).max(other.y as i32);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(Rectangle::from_edges(x1, y1, x2, y2))
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x1 = (self.x as i32).min(other.x as i32);
        let y1 = (self.y as i32).min(other.y as i32);
        let x2 = self.right().max(other.right());
        let y2 = self.bottom().max(other.bottom());
        Rectangle::from_edges(x1, y1, x2, y2)
    }

    pub fn offset(&self, dx: i16, dy: i16) -> Rectangle {
        Rectangle::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }

    pub(crate) fn from_edges(x1: i32, y1: i32, x2: i32, y2: i32) -> Rectangle {
        Rectangle::new(
            x1 as i16,
            y1 as i16,
            (x2 - x1).clamp(0, u16::MAX as i32) as u16,
            (y2 - y1).clamp(0, u16::MAX as i32) as u16,
        )
    }
}

/// Segment (for drawing line segments)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub x1: i16,
    pub y1: i16,
    pub x2: i16,
    pub y2: i16,
}

/// Arc (for drawing arcs and ellipses)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arc {
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
    pub angle1: i16, // Start angle in 1/64 degrees
    pub angle2: i16, // Arc angle in 1/64 degrees
}

impl Arc {
    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(self.x, self.y, self.width, self.height)
    }
}

/// Window class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowClass {
    CopyFromParent = 0,
    InputOutput = 1,
    InputOnly = 2,
}

impl WindowClass {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(WindowClass::CopyFromParent),
            1 => Some(WindowClass::InputOutput),
            2 => Some(WindowClass::InputOnly),
            _ => None,
        }
    }
}

/// Map state reported by `get_window_attributes`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapState {
    Unmapped = 0,
    Unviewable = 1,
    Viewable = 2,
}

/// Stack mode for ConfigureWindow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackMode {
    Above = 0,
    Below = 1,
    TopIf = 2,
    BottomIf = 3,
    Opposite = 4,
}

impl StackMode {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(StackMode::Above),
            1 => Some(StackMode::Below),
            2 => Some(StackMode::TopIf),
            3 => Some(StackMode::BottomIf),
            4 => Some(StackMode::Opposite),
            _ => None,
        }
    }
}

/// Event masks
pub mod event_mask {
    pub const NO_EVENT: u32 = 0;
    pub const KEY_PRESS: u32 = 1 << 0;
    pub const KEY_RELEASE: u32 = 1 << 1;
    pub const BUTTON_PRESS: u32 = 1 << 2;
    pub const BUTTON_RELEASE: u32 = 1 << 3;
    pub const ENTER_WINDOW: u32 = 1 << 4;
    pub const LEAVE_WINDOW: u32 = 1 << 5;
    pub const POINTER_MOTION: u32 = 1 << 6;
    pub const POINTER_MOTION_HINT: u32 = 1 << 7;
    pub const BUTTON1_MOTION: u32 = 1 << 8;
    pub const BUTTON2_MOTION: u32 = 1 << 9;
    pub const BUTTON3_MOTION: u32 = 1 << 10;
    pub const BUTTON4_MOTION: u32 = 1 << 11;
    pub const BUTTON5_MOTION: u32 = 1 << 12;
    pub const BUTTON_MOTION: u32 = 1 << 13;
    pub const KEYMAP_STATE: u32 = 1 << 14;
    pub const EXPOSURE: u32 = 1 << 15;
    pub const VISIBILITY_CHANGE: u32 = 1 << 16;
    pub const STRUCTURE_NOTIFY: u32 = 1 << 17;
    pub const RESIZE_REDIRECT: u32 = 1 << 18;
    pub const SUBSTRUCTURE_NOTIFY: u32 = 1 << 19;
    pub const SUBSTRUCTURE_REDIRECT: u32 = 1 << 20;
    pub const FOCUS_CHANGE: u32 = 1 << 21;
    pub const PROPERTY_CHANGE: u32 = 1 << 22;
    pub const COLORMAP_CHANGE: u32 = 1 << 23;
    pub const OWNER_GRAB_BUTTON: u32 = 1 << 24;

    /// Every defined mask bit
    pub const ALL_MASK_BITS: u32 = (1 << 25) - 1;

    /// Matches every event type, including those with no selectable mask
    pub const ALL_EVENTS: u32 = u32::MAX;

    /// Bits that select MotionNotify
    pub const ANY_MOTION: u32 = POINTER_MOTION
        | POINTER_MOTION_HINT
        | BUTTON1_MOTION
        | BUTTON2_MOTION
        | BUTTON3_MOTION
        | BUTTON4_MOTION
        | BUTTON5_MOTION
        | BUTTON_MOTION;

    /// Device events that propagate towards the root
    pub const PROPAGATING: u32 = KEY_PRESS
        | KEY_RELEASE
        | BUTTON_PRESS
        | BUTTON_RELEASE
        | POINTER_MOTION
        | BUTTON1_MOTION
        | BUTTON2_MOTION
        | BUTTON3_MOTION
        | BUTTON4_MOTION
        | BUTTON5_MOTION
        | BUTTON_MOTION;
}

/// Keyboard/pointer modifier masks
pub mod modifier_mask {
    pub const SHIFT: u16 = 1 << 0;
    pub const LOCK: u16 = 1 << 1;
    pub const CONTROL: u16 = 1 << 2;
    pub const MOD1: u16 = 1 << 3;
    pub const MOD2: u16 = 1 << 4;
    pub const MOD3: u16 = 1 << 5;
    pub const MOD4: u16 = 1 << 6;
    pub const MOD5: u16 = 1 << 7;
    pub const BUTTON1: u16 = 1 << 8;
    pub const BUTTON2: u16 = 1 << 9;
    pub const BUTTON3: u16 = 1 << 10;
    pub const BUTTON4: u16 = 1 << 11;
    pub const BUTTON5: u16 = 1 << 12;
}

macro_rules! define_enumerant {
    ($(#[$doc:meta])* $name:ident { $($variant:ident = $value:literal),+ $(,)? }) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant = $value),+
        }

        impl $name {
            pub fn from_u32(value: u32) -> Option<Self> {
                match value {
                    $($value => Some($name::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

define_enumerant!(
    /// GC function (raster op)
    GCFunction {
        Clear = 0,
        And = 1,
        AndReverse = 2,
        Copy = 3,
        AndInverted = 4,
        NoOp = 5,
        Xor = 6,
        Or = 7,
        Nor = 8,
        Equiv = 9,
        Invert = 10,
        OrReverse = 11,
        CopyInverted = 12,
        OrInverted = 13,
        Nand = 14,
        Set = 15,
    }
);

define_enumerant!(
    /// Line style
    LineStyle {
        Solid = 0,
        OnOffDash = 1,
        DoubleDash = 2,
    }
);

define_enumerant!(
    /// Cap style
    CapStyle {
        NotLast = 0,
        Butt = 1,
        Round = 2,
        Projecting = 3,
    }
);

define_enumerant!(
    /// Join style
    JoinStyle {
        Miter = 0,
        Round = 1,
        Bevel = 2,
    }
);

define_enumerant!(
    /// Fill style
    FillStyle {
        Solid = 0,
        Tiled = 1,
        Stippled = 2,
        OpaqueStippled = 3,
    }
);

define_enumerant!(
    /// Fill rule
    FillRule {
        EvenOdd = 0,
        Winding = 1,
    }
);

define_enumerant!(
    /// Arc mode
    ArcMode {
        Chord = 0,
        PieSlice = 1,
    }
);

define_enumerant!(
    /// Subwindow mode
    SubwindowMode {
        ClipByChildren = 0,
        IncludeInferiors = 1,
    }
);
