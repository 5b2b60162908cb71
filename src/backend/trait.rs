//! Backend trait definition
//!
//! This module defines the trait a host windowing toolkit must implement.
//! The shim translates Xlib calls into operations on host windows, views and
//! bitmaps, and pushes graphics-context state into host drawing state only
//! when a drawable is actually drawn to.

use crate::display::InputSink;
use crate::protocol::*;
use std::error::Error;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// Host top-level window handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostWindow(pub usize);

/// Host view handle; every drawable renders through one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostView(pub usize);

/// Host off-screen bitmap handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostBitmap(pub usize);

/// Where a host view is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewParent {
    Window(HostWindow),
    View(HostView),
    Bitmap(HostBitmap),
}

/// 8-bit RGBA colour as understood by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HostColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl HostColor {
    /// Decompose a TrueColor 0xRRGGBB pixel
    pub fn from_pixel(pixel: u32) -> Self {
        HostColor {
            red: ((pixel >> 16) & 0xff) as u8,
            green: ((pixel >> 8) & 0xff) as u8,
            blue: (pixel & 0xff) as u8,
            alpha: 0xff,
        }
    }
}

/// Host transfer modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawingMode {
    Copy,
    Over,
    Erase,
    Invert,
    Add,
    Subtract,
    Min,
    Max,
    Select,
}

/// Host line caps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

/// Host line joins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

/// Host stroke pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StrokePattern {
    Solid,
    /// Alternating on/off dash lengths starting at `offset`
    Dashed { offset: u16, dashes: Vec<u8> },
    /// Like `Dashed`, the off segments painted in the low colour
    DoubleDashed { offset: u16, dashes: Vec<u8> },
}

/// Host fill rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostFillRule {
    EvenOdd,
    NonZero,
}

/// Host fill pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FillPattern {
    SolidHigh,
    Tiled,
    Stippled,
    OpaqueStippled,
}

/// Which of the two host colours a fill uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    High,
    Low,
}

/// Host font selection
#[derive(Debug, Clone, PartialEq)]
pub struct HostFont {
    pub family: String,
    pub style: String,
    pub size: f32,
}

/// Screen information
#[derive(Debug, Clone)]
pub struct ScreenInfo {
    pub width: u16,
    pub height: u16,
    pub width_mm: u16,
    pub height_mm: u16,
    pub root_visual: VisualID,
    pub root_depth: u8,
    pub white_pixel: u32,
    pub black_pixel: u32,
}

/// Input delivered by the host toolkit on its own thread.
///
/// Coordinates are local to the view the host reports.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    /// View needs to be redrawn
    Expose {
        view: HostView,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
    },
    /// Top-level window was moved or resized by the host window manager
    Configure {
        window: HostWindow,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
    },
    KeyPress {
        view: HostView,
        keycode: u8,
        state: u16,
        time: u32,
        x: i16,
        y: i16,
    },
    KeyRelease {
        view: HostView,
        keycode: u8,
        state: u16,
        time: u32,
        x: i16,
        y: i16,
    },
    ButtonPress {
        view: HostView,
        button: u8,
        state: u16,
        time: u32,
        x: i16,
        y: i16,
    },
    ButtonRelease {
        view: HostView,
        button: u8,
        state: u16,
        time: u32,
        x: i16,
        y: i16,
    },
    MotionNotify {
        view: HostView,
        state: u16,
        time: u32,
        x: i16,
        y: i16,
    },
    EnterNotify {
        view: HostView,
        x: i16,
        y: i16,
        time: u32,
    },
    LeaveNotify {
        view: HostView,
        x: i16,
        y: i16,
        time: u32,
    },
    FocusIn { view: HostView },
    FocusOut { view: HostView },
}

impl BackendEvent {
    pub fn view(&self) -> Option<HostView> {
        match self {
            BackendEvent::Expose { view, .. }
            | BackendEvent::KeyPress { view, .. }
            | BackendEvent::KeyRelease { view, .. }
            | BackendEvent::ButtonPress { view, .. }
            | BackendEvent::ButtonRelease { view, .. }
            | BackendEvent::MotionNotify { view, .. }
            | BackendEvent::EnterNotify { view, .. }
            | BackendEvent::LeaveNotify { view, .. }
            | BackendEvent::FocusIn { view }
            | BackendEvent::FocusOut { view } => Some(*view),
            BackendEvent::Configure { .. } => None,
        }
    }
}

/// The host toolkit
///
/// Every method is called from the client thread. Input flows the other
/// way: the backend calls `InputSink::deliver` from its own thread.
pub trait Backend: Send {
    /// Initialize the backend
    fn init(&mut self) -> BackendResult<()>;

    /// Get screen information
    fn get_screen_info(&self) -> BackendResult<ScreenInfo>;

    /// Hand the backend the sink its input callbacks feed
    fn attach_input(&mut self, sink: InputSink) {
        let _ = sink;
    }

    // Top-level windows

    fn create_window(&mut self, frame: Rectangle, title: &str) -> BackendResult<HostWindow>;

    fn destroy_window(&mut self, window: HostWindow) -> BackendResult<()>;

    fn show_window(&mut self, window: HostWindow) -> BackendResult<()>;

    fn hide_window(&mut self, window: HostWindow) -> BackendResult<()>;

    fn move_window(&mut self, window: HostWindow, x: i16, y: i16) -> BackendResult<()>;

    fn resize_window(&mut self, window: HostWindow, width: u16, height: u16) -> BackendResult<()>;

    fn raise_window(&mut self, window: HostWindow) -> BackendResult<()>;

    fn lower_window(&mut self, window: HostWindow) -> BackendResult<()>;

    fn set_window_title(&mut self, window: HostWindow, title: &str) -> BackendResult<()>;

    // Views

    fn create_view(&mut self, parent: ViewParent, frame: Rectangle) -> BackendResult<HostView>;

    /// Detach and free a view; its children go with it
    fn remove_view(&mut self, view: HostView) -> BackendResult<()>;

    fn show_view(&mut self, view: HostView) -> BackendResult<()>;

    fn hide_view(&mut self, view: HostView) -> BackendResult<()>;

    fn move_view(&mut self, view: HostView, x: i16, y: i16) -> BackendResult<()>;

    fn resize_view(&mut self, view: HostView, width: u16, height: u16) -> BackendResult<()>;

    fn reparent_view(&mut self, view: HostView, parent: ViewParent) -> BackendResult<()>;

    /// Move a view to the top of its siblings
    fn raise_view(&mut self, view: HostView) -> BackendResult<()>;

    /// Move a view to the bottom of its siblings
    fn lower_view(&mut self, view: HostView) -> BackendResult<()>;

    fn set_view_color(&mut self, view: HostView, color: HostColor) -> BackendResult<()>;

    // Bitmaps

    fn create_bitmap(&mut self, width: u16, height: u16, depth: u8) -> BackendResult<HostBitmap>;

    fn free_bitmap(&mut self, bitmap: HostBitmap) -> BackendResult<()>;

    // Drawing state

    fn set_drawing_mode(&mut self, view: HostView, mode: DrawingMode) -> BackendResult<()>;

    fn set_high_color(&mut self, view: HostView, color: HostColor) -> BackendResult<()>;

    fn set_low_color(&mut self, view: HostView, color: HostColor) -> BackendResult<()>;

    fn set_pen_size(&mut self, view: HostView, size: f32) -> BackendResult<()>;

    fn set_line_cap(&mut self, view: HostView, cap: LineCap) -> BackendResult<()>;

    fn set_line_join(&mut self, view: HostView, join: LineJoin) -> BackendResult<()>;

    fn set_stroke_pattern(&mut self, view: HostView, pattern: &StrokePattern) -> BackendResult<()>;

    fn set_fill_rule(&mut self, view: HostView, rule: HostFillRule) -> BackendResult<()>;

    fn set_fill_pattern(&mut self, view: HostView, pattern: FillPattern) -> BackendResult<()>;

    fn set_font(&mut self, view: HostView, font: &HostFont) -> BackendResult<()>;

    /// Restrict drawing to `rects` (view coordinates); `None` lifts the clip
    fn set_clipping(&mut self, view: HostView, rects: Option<&[Rectangle]>) -> BackendResult<()>;

    fn set_draw_over_children(&mut self, view: HostView, enabled: bool) -> BackendResult<()>;

    // Drawing operations

    fn stroke_line(&mut self, view: HostView, from: Point, to: Point) -> BackendResult<()>;

    /// Draw connected lines
    fn stroke_polyline(&mut self, view: HostView, points: &[Point]) -> BackendResult<()> {
        // Default implementation: draw segments
        for pair in points.windows(2) {
            self.stroke_line(view, pair[0], pair[1])?;
        }
        Ok(())
    }

    fn plot_points(&mut self, view: HostView, points: &[Point]) -> BackendResult<()> {
        // Default implementation: one-pixel fills
        for p in points {
            self.fill_rect(view, Rectangle::new(p.x, p.y, 1, 1), Tone::High)?;
        }
        Ok(())
    }

    fn stroke_rect(&mut self, view: HostView, rect: Rectangle) -> BackendResult<()>;

    fn fill_rect(&mut self, view: HostView, rect: Rectangle, tone: Tone) -> BackendResult<()>;

    /// Stroke an elliptical arc; angles in degrees, counter-clockwise from 3 o'clock
    fn stroke_arc(
        &mut self,
        view: HostView,
        bounds: Rectangle,
        start: f32,
        span: f32,
    ) -> BackendResult<()>;

    /// Fill an elliptical arc as a pie slice (`pie`) or chord
    fn fill_arc(
        &mut self,
        view: HostView,
        bounds: Rectangle,
        start: f32,
        span: f32,
        pie: bool,
    ) -> BackendResult<()>;

    fn fill_polygon(&mut self, view: HostView, points: &[Point]) -> BackendResult<()>;

    /// Draw text with its baseline starting at `origin`
    fn draw_string(&mut self, view: HostView, origin: Point, text: &str) -> BackendResult<()>;

    fn invalidate(&mut self, view: HostView, rect: Rectangle) -> BackendResult<()>;

    /// Copy pixels between two views
    fn copy_bits(
        &mut self,
        src: HostView,
        dst: HostView,
        src_rect: Rectangle,
        dst_origin: Point,
    ) -> BackendResult<()>;

    /// Flush any pending operations to the display
    fn flush(&mut self) -> BackendResult<()>;

    /// Flush and wait until the host has processed everything
    fn sync(&mut self) -> BackendResult<()> {
        self.flush()
    }
}
