//! Graphics context emulation
//!
//! The host has no graphics-context object: drawing state lives on each host
//! view. A `GraphicsContext` therefore records the X11 values plus a dirty
//! mask, and state is pushed into a view only when something is drawn there.
//! Each drawable remembers which GC last configured it and with what values
//! (`AppliedState`), so switching GCs or drawables costs exactly the calls
//! for the attributes that differ.

pub mod translate;

use crate::backend::{Backend, BackendResult, HostFont, HostView};
use crate::protocol::*;
use crate::region::Region;
use bitflags::bitflags;

bitflags! {
    /// GC component bits, at their X11 `GC*` positions
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GcValueMask: u32 {
        const FUNCTION = 1 << 0;
        const PLANE_MASK = 1 << 1;
        const FOREGROUND = 1 << 2;
        const BACKGROUND = 1 << 3;
        const LINE_WIDTH = 1 << 4;
        const LINE_STYLE = 1 << 5;
        const CAP_STYLE = 1 << 6;
        const JOIN_STYLE = 1 << 7;
        const FILL_STYLE = 1 << 8;
        const FILL_RULE = 1 << 9;
        const TILE = 1 << 10;
        const STIPPLE = 1 << 11;
        const TILE_STIP_X_ORIGIN = 1 << 12;
        const TILE_STIP_Y_ORIGIN = 1 << 13;
        const FONT = 1 << 14;
        const SUBWINDOW_MODE = 1 << 15;
        const GRAPHICS_EXPOSURES = 1 << 16;
        const CLIP_X_ORIGIN = 1 << 17;
        const CLIP_Y_ORIGIN = 1 << 18;
        const CLIP_MASK = 1 << 19;
        const DASH_OFFSET = 1 << 20;
        const DASH_LIST = 1 << 21;
        const ARC_MODE = 1 << 22;
    }
}

impl GcValueMask {
    /// Components backed by host view drawing state
    pub const HOST_APPLIED: GcValueMask = GcValueMask::from_bits_truncate(
        GcValueMask::FUNCTION.bits()
            | GcValueMask::FOREGROUND.bits()
            | GcValueMask::BACKGROUND.bits()
            | GcValueMask::LINE_WIDTH.bits()
            | GcValueMask::LINE_STYLE.bits()
            | GcValueMask::CAP_STYLE.bits()
            | GcValueMask::JOIN_STYLE.bits()
            | GcValueMask::FILL_STYLE.bits()
            | GcValueMask::FILL_RULE.bits()
            | GcValueMask::FONT.bits()
            | GcValueMask::SUBWINDOW_MODE.bits()
            | GcValueMask::CLIP_X_ORIGIN.bits()
            | GcValueMask::CLIP_Y_ORIGIN.bits()
            | GcValueMask::CLIP_MASK.bits()
            | GcValueMask::DASH_OFFSET.bits()
            | GcValueMask::DASH_LIST.bits(),
    );

    /// Components folded into one host stroke-pattern call
    pub const STROKE_PATTERN: GcValueMask = GcValueMask::from_bits_truncate(
        GcValueMask::LINE_STYLE.bits()
            | GcValueMask::DASH_OFFSET.bits()
            | GcValueMask::DASH_LIST.bits(),
    );

    /// Components folded into one host clipping call
    pub const CLIPPING: GcValueMask = GcValueMask::from_bits_truncate(
        GcValueMask::CLIP_X_ORIGIN.bits()
            | GcValueMask::CLIP_Y_ORIGIN.bits()
            | GcValueMask::CLIP_MASK.bits(),
    );
}

/// Typed GC state
#[derive(Debug, Clone, PartialEq)]
pub struct GcValues {
    pub function: GCFunction,
    pub plane_mask: u32,
    pub foreground: u32,
    pub background: u32,
    pub line_width: u16,
    pub line_style: LineStyle,
    pub cap_style: CapStyle,
    pub join_style: JoinStyle,
    pub fill_style: FillStyle,
    pub fill_rule: FillRule,
    pub arc_mode: ArcMode,
    pub tile: Pixmap,
    pub stipple: Pixmap,
    pub ts_x_origin: i16,
    pub ts_y_origin: i16,
    pub font: Font,
    pub subwindow_mode: SubwindowMode,
    pub graphics_exposures: bool,
    pub clip_x_origin: i16,
    pub clip_y_origin: i16,
    /// `None` draws unclipped
    pub clip_mask: Option<Region>,
    pub dash_offset: u16,
    pub dashes: Vec<u8>,
}

impl Default for GcValues {
    fn default() -> Self {
        GcValues {
            function: GCFunction::Copy,
            plane_mask: u32::MAX,
            foreground: 0,
            background: 1,
            line_width: 0,
            line_style: LineStyle::Solid,
            cap_style: CapStyle::Butt,
            join_style: JoinStyle::Miter,
            fill_style: FillStyle::Solid,
            fill_rule: FillRule::EvenOdd,
            arc_mode: ArcMode::PieSlice,
            tile: Pixmap::NONE,
            stipple: Pixmap::NONE,
            ts_x_origin: 0,
            ts_y_origin: 0,
            font: Font::NONE,
            subwindow_mode: SubwindowMode::ClipByChildren,
            graphics_exposures: true,
            clip_x_origin: 0,
            clip_y_origin: 0,
            clip_mask: None,
            dash_offset: 0,
            dashes: vec![4, 4],
        }
    }
}

impl GcValues {
    /// Components whose values differ between `self` and `other`
    pub fn diff(&self, other: &GcValues) -> GcValueMask {
        let mut mask = GcValueMask::empty();
        macro_rules! cmp {
            ($($field:ident => $bit:ident),+ $(,)?) => {
                $(
                    if self.$field != other.$field {
                        mask |= GcValueMask::$bit;
                    }
                )+
            };
        }
        cmp!(
            function => FUNCTION,
            plane_mask => PLANE_MASK,
            foreground => FOREGROUND,
            background => BACKGROUND,
            line_width => LINE_WIDTH,
            line_style => LINE_STYLE,
            cap_style => CAP_STYLE,
            join_style => JOIN_STYLE,
            fill_style => FILL_STYLE,
            fill_rule => FILL_RULE,
            arc_mode => ARC_MODE,
            tile => TILE,
            stipple => STIPPLE,
            ts_x_origin => TILE_STIP_X_ORIGIN,
            ts_y_origin => TILE_STIP_Y_ORIGIN,
            font => FONT,
            subwindow_mode => SUBWINDOW_MODE,
            graphics_exposures => GRAPHICS_EXPOSURES,
            clip_x_origin => CLIP_X_ORIGIN,
            clip_y_origin => CLIP_Y_ORIGIN,
            clip_mask => CLIP_MASK,
            dash_offset => DASH_OFFSET,
            dashes => DASH_LIST,
        );
        mask
    }
}

/// The raw values struct passed to `create_gc`/`change_gc`, enumerants as
/// plain integers
#[derive(Debug, Clone, Default)]
pub struct XGcValues {
    pub function: u32,
    pub plane_mask: u32,
    pub foreground: u32,
    pub background: u32,
    pub line_width: u32,
    pub line_style: u32,
    pub cap_style: u32,
    pub join_style: u32,
    pub fill_style: u32,
    pub fill_rule: u32,
    pub arc_mode: u32,
    pub tile: Pixmap,
    pub stipple: Pixmap,
    pub ts_x_origin: i32,
    pub ts_y_origin: i32,
    pub font: Font,
    pub subwindow_mode: u32,
    pub graphics_exposures: bool,
    pub clip_x_origin: i32,
    pub clip_y_origin: i32,
    pub clip_mask: Pixmap,
    pub dash_offset: u32,
    pub dashes: u8,
}

/// What a drawable's host view was last configured with
#[derive(Debug, Clone, Default)]
pub struct AppliedState {
    /// `None` until the first GC is applied; host defaults are unknown
    pub values: Option<GcValues>,
    pub gc: Option<GContext>,
}

#[derive(Debug, Clone)]
pub struct GraphicsContext {
    pub id: GContext,
    pub values: GcValues,
    pub dirty: GcValueMask,
    pub last_drawable: Option<XID>,
}

macro_rules! set_field {
    ($self:ident, $field:ident, $value:expr, $bit:ident) => {{
        let value = $value;
        if $self.values.$field != value {
            $self.values.$field = value;
            $self.dirty |= GcValueMask::$bit;
        }
    }};
}

fn enumerant<T>(value: u32, parse: fn(u32) -> Option<T>, request: &'static str) -> X11Result<T> {
    parse(value).ok_or_else(|| X11Error::bad_value(value, request))
}

impl GraphicsContext {
    pub fn new(id: GContext) -> Self {
        GraphicsContext {
            id,
            values: GcValues::default(),
            dirty: GcValueMask::all(),
            last_drawable: None,
        }
    }

    /// Copy the masked subset of `raw` into the GC.
    ///
    /// All enumerants are validated before anything is stored, so a
    /// `BadValue` leaves the GC untouched. `CLIP_MASK` is resolved by the
    /// caller (it needs the pixmap's extent) and ignored here.
    pub fn change(&mut self, mask: GcValueMask, raw: &XGcValues, request: &'static str) -> X11Result<()> {
        let function = if mask.contains(GcValueMask::FUNCTION) {
            Some(enumerant(raw.function, GCFunction::from_u32, request)?)
        } else {
            None
        };
        let line_style = if mask.contains(GcValueMask::LINE_STYLE) {
            Some(enumerant(raw.line_style, LineStyle::from_u32, request)?)
        } else {
            None
        };
        let cap_style = if mask.contains(GcValueMask::CAP_STYLE) {
            Some(enumerant(raw.cap_style, CapStyle::from_u32, request)?)
        } else {
            None
        };
        let join_style = if mask.contains(GcValueMask::JOIN_STYLE) {
            Some(enumerant(raw.join_style, JoinStyle::from_u32, request)?)
        } else {
            None
        };
        let fill_style = if mask.contains(GcValueMask::FILL_STYLE) {
            Some(enumerant(raw.fill_style, FillStyle::from_u32, request)?)
        } else {
            None
        };
        let fill_rule = if mask.contains(GcValueMask::FILL_RULE) {
            Some(enumerant(raw.fill_rule, FillRule::from_u32, request)?)
        } else {
            None
        };
        let arc_mode = if mask.contains(GcValueMask::ARC_MODE) {
            Some(enumerant(raw.arc_mode, ArcMode::from_u32, request)?)
        } else {
            None
        };
        let subwindow_mode = if mask.contains(GcValueMask::SUBWINDOW_MODE) {
            Some(enumerant(raw.subwindow_mode, SubwindowMode::from_u32, request)?)
        } else {
            None
        };
        if mask.contains(GcValueMask::LINE_WIDTH) && raw.line_width > u16::MAX as u32 {
            return Err(X11Error::bad_value(raw.line_width, request));
        }
        if mask.contains(GcValueMask::DASH_LIST) && raw.dashes == 0 {
            return Err(X11Error::bad_value(0, request));
        }

        if let Some(v) = function {
            set_field!(self, function, v, FUNCTION);
        }
        if mask.contains(GcValueMask::PLANE_MASK) {
            set_field!(self, plane_mask, raw.plane_mask, PLANE_MASK);
        }
        if mask.contains(GcValueMask::FOREGROUND) {
            set_field!(self, foreground, raw.foreground, FOREGROUND);
        }
        if mask.contains(GcValueMask::BACKGROUND) {
            set_field!(self, background, raw.background, BACKGROUND);
        }
        if mask.contains(GcValueMask::LINE_WIDTH) {
            set_field!(self, line_width, raw.line_width as u16, LINE_WIDTH);
        }
        if let Some(v) = line_style {
            set_field!(self, line_style, v, LINE_STYLE);
        }
        if let Some(v) = cap_style {
            set_field!(self, cap_style, v, CAP_STYLE);
        }
        if let Some(v) = join_style {
            set_field!(self, join_style, v, JOIN_STYLE);
        }
        if let Some(v) = fill_style {
            set_field!(self, fill_style, v, FILL_STYLE);
        }
        if let Some(v) = fill_rule {
            set_field!(self, fill_rule, v, FILL_RULE);
        }
        if let Some(v) = arc_mode {
            set_field!(self, arc_mode, v, ARC_MODE);
        }
        if mask.contains(GcValueMask::TILE) {
            set_field!(self, tile, raw.tile, TILE);
        }
        if mask.contains(GcValueMask::STIPPLE) {
            set_field!(self, stipple, raw.stipple, STIPPLE);
        }
        if mask.contains(GcValueMask::TILE_STIP_X_ORIGIN) {
            set_field!(self, ts_x_origin, raw.ts_x_origin as i16, TILE_STIP_X_ORIGIN);
        }
        if mask.contains(GcValueMask::TILE_STIP_Y_ORIGIN) {
            set_field!(self, ts_y_origin, raw.ts_y_origin as i16, TILE_STIP_Y_ORIGIN);
        }
        if mask.contains(GcValueMask::FONT) {
            set_field!(self, font, raw.font, FONT);
        }
        if let Some(v) = subwindow_mode {
            set_field!(self, subwindow_mode, v, SUBWINDOW_MODE);
        }
        if mask.contains(GcValueMask::GRAPHICS_EXPOSURES) {
            set_field!(self, graphics_exposures, raw.graphics_exposures, GRAPHICS_EXPOSURES);
        }
        if mask.contains(GcValueMask::CLIP_X_ORIGIN) {
            set_field!(self, clip_x_origin, raw.clip_x_origin as i16, CLIP_X_ORIGIN);
        }
        if mask.contains(GcValueMask::CLIP_Y_ORIGIN) {
            set_field!(self, clip_y_origin, raw.clip_y_origin as i16, CLIP_Y_ORIGIN);
        }
        if mask.contains(GcValueMask::DASH_OFFSET) {
            set_field!(self, dash_offset, raw.dash_offset as u16, DASH_OFFSET);
        }
        if mask.contains(GcValueMask::DASH_LIST) {
            set_field!(self, dashes, vec![raw.dashes, raw.dashes], DASH_LIST);
        }
        Ok(())
    }

    /// Read the masked subset back into a values struct
    pub fn get_values(&self, mask: GcValueMask) -> XGcValues {
        let v = &self.values;
        let mut raw = XGcValues::default();
        if mask.contains(GcValueMask::FUNCTION) {
            raw.function = v.function as u32;
        }
        if mask.contains(GcValueMask::PLANE_MASK) {
            raw.plane_mask = v.plane_mask;
        }
        if mask.contains(GcValueMask::FOREGROUND) {
            raw.foreground = v.foreground;
        }
        if mask.contains(GcValueMask::BACKGROUND) {
            raw.background = v.background;
        }
        if mask.contains(GcValueMask::LINE_WIDTH) {
            raw.line_width = v.line_width as u32;
        }
        if mask.contains(GcValueMask::LINE_STYLE) {
            raw.line_style = v.line_style as u32;
        }
        if mask.contains(GcValueMask::CAP_STYLE) {
            raw.cap_style = v.cap_style as u32;
        }
        if mask.contains(GcValueMask::JOIN_STYLE) {
            raw.join_style = v.join_style as u32;
        }
        if mask.contains(GcValueMask::FILL_STYLE) {
            raw.fill_style = v.fill_style as u32;
        }
        if mask.contains(GcValueMask::FILL_RULE) {
            raw.fill_rule = v.fill_rule as u32;
        }
        if mask.contains(GcValueMask::ARC_MODE) {
            raw.arc_mode = v.arc_mode as u32;
        }
        if mask.contains(GcValueMask::TILE) {
            raw.tile = v.tile;
        }
        if mask.contains(GcValueMask::STIPPLE) {
            raw.stipple = v.stipple;
        }
        if mask.contains(GcValueMask::TILE_STIP_X_ORIGIN) {
            raw.ts_x_origin = v.ts_x_origin as i32;
        }
        if mask.contains(GcValueMask::TILE_STIP_Y_ORIGIN) {
            raw.ts_y_origin = v.ts_y_origin as i32;
        }
        if mask.contains(GcValueMask::FONT) {
            raw.font = v.font;
        }
        if mask.contains(GcValueMask::SUBWINDOW_MODE) {
            raw.subwindow_mode = v.subwindow_mode as u32;
        }
        if mask.contains(GcValueMask::GRAPHICS_EXPOSURES) {
            raw.graphics_exposures = v.graphics_exposures;
        }
        if mask.contains(GcValueMask::CLIP_X_ORIGIN) {
            raw.clip_x_origin = v.clip_x_origin as i32;
        }
        if mask.contains(GcValueMask::CLIP_Y_ORIGIN) {
            raw.clip_y_origin = v.clip_y_origin as i32;
        }
        if mask.contains(GcValueMask::DASH_OFFSET) {
            raw.dash_offset = v.dash_offset as u32;
        }
        if mask.contains(GcValueMask::DASH_LIST) {
            raw.dashes = v.dashes.first().copied().unwrap_or(4);
        }
        raw
    }

    pub fn set_function(&mut self, function: GCFunction) {
        set_field!(self, function, function, FUNCTION);
    }

    pub fn set_plane_mask(&mut self, plane_mask: u32) {
        set_field!(self, plane_mask, plane_mask, PLANE_MASK);
    }

    pub fn set_foreground(&mut self, pixel: u32) {
        set_field!(self, foreground, pixel, FOREGROUND);
    }

    pub fn set_background(&mut self, pixel: u32) {
        set_field!(self, background, pixel, BACKGROUND);
    }

    pub fn set_line_attributes(
        &mut self,
        width: u16,
        style: LineStyle,
        cap: CapStyle,
        join: JoinStyle,
    ) {
        set_field!(self, line_width, width, LINE_WIDTH);
        set_field!(self, line_style, style, LINE_STYLE);
        set_field!(self, cap_style, cap, CAP_STYLE);
        set_field!(self, join_style, join, JOIN_STYLE);
    }

    pub fn set_fill_style(&mut self, style: FillStyle) {
        set_field!(self, fill_style, style, FILL_STYLE);
    }

    pub fn set_fill_rule(&mut self, rule: FillRule) {
        set_field!(self, fill_rule, rule, FILL_RULE);
    }

    pub fn set_arc_mode(&mut self, mode: ArcMode) {
        set_field!(self, arc_mode, mode, ARC_MODE);
    }

    pub fn set_tile(&mut self, tile: Pixmap) {
        set_field!(self, tile, tile, TILE);
    }

    pub fn set_stipple(&mut self, stipple: Pixmap) {
        set_field!(self, stipple, stipple, STIPPLE);
    }

    pub fn set_ts_origin(&mut self, x: i16, y: i16) {
        set_field!(self, ts_x_origin, x, TILE_STIP_X_ORIGIN);
        set_field!(self, ts_y_origin, y, TILE_STIP_Y_ORIGIN);
    }

    pub fn set_font(&mut self, font: Font) {
        set_field!(self, font, font, FONT);
    }

    pub fn set_subwindow_mode(&mut self, mode: SubwindowMode) {
        set_field!(self, subwindow_mode, mode, SUBWINDOW_MODE);
    }

    pub fn set_graphics_exposures(&mut self, enabled: bool) {
        set_field!(self, graphics_exposures, enabled, GRAPHICS_EXPOSURES);
    }

    pub fn set_clip_origin(&mut self, x: i16, y: i16) {
        set_field!(self, clip_x_origin, x, CLIP_X_ORIGIN);
        set_field!(self, clip_y_origin, y, CLIP_Y_ORIGIN);
    }

    pub fn set_clip_mask(&mut self, region: Option<Region>) {
        set_field!(self, clip_mask, region, CLIP_MASK);
    }

    pub fn set_dashes(&mut self, offset: u16, dashes: &[u8]) {
        set_field!(self, dash_offset, offset, DASH_OFFSET);
        set_field!(self, dashes, dashes.to_vec(), DASH_LIST);
    }

    /// Copy the masked components of `src` into `self`
    pub fn copy_from(&mut self, src: &GraphicsContext, mask: GcValueMask) {
        let s = &src.values;
        macro_rules! copy {
            ($($field:ident => $bit:ident),+ $(,)?) => {
                $(
                    if mask.contains(GcValueMask::$bit) {
                        set_field!(self, $field, s.$field.clone(), $bit);
                    }
                )+
            };
        }
        copy!(
            function => FUNCTION,
            plane_mask => PLANE_MASK,
            foreground => FOREGROUND,
            background => BACKGROUND,
            line_width => LINE_WIDTH,
            line_style => LINE_STYLE,
            cap_style => CAP_STYLE,
            join_style => JOIN_STYLE,
            fill_style => FILL_STYLE,
            fill_rule => FILL_RULE,
            arc_mode => ARC_MODE,
            tile => TILE,
            stipple => STIPPLE,
            ts_x_origin => TILE_STIP_X_ORIGIN,
            ts_y_origin => TILE_STIP_Y_ORIGIN,
            font => FONT,
            subwindow_mode => SUBWINDOW_MODE,
            graphics_exposures => GRAPHICS_EXPOSURES,
            clip_x_origin => CLIP_X_ORIGIN,
            clip_y_origin => CLIP_Y_ORIGIN,
            clip_mask => CLIP_MASK,
            dash_offset => DASH_OFFSET,
            dashes => DASH_LIST,
        );
    }

    /// Host-backed components that must be pushed before drawing to
    /// `drawable`, whose view was last configured as `applied` says.
    pub fn check(&self, drawable: XID, applied: &AppliedState) -> GcValueMask {
        let switched = self.last_drawable != Some(drawable) || applied.gc != Some(self.id);
        let mask = if switched {
            match &applied.values {
                Some(values) => self.values.diff(values),
                None => GcValueMask::all(),
            }
        } else {
            self.dirty
        };
        mask & GcValueMask::HOST_APPLIED
    }

    /// Push the `mask` components into `view`
    pub fn apply(
        &self,
        backend: &mut dyn Backend,
        view: HostView,
        mask: GcValueMask,
        resolve_font: &dyn Fn(Font) -> Option<HostFont>,
    ) -> BackendResult<()> {
        let v = &self.values;
        if mask.contains(GcValueMask::FUNCTION) {
            backend.set_drawing_mode(view, translate::drawing_mode(v.function))?;
        }
        if mask.contains(GcValueMask::FOREGROUND) {
            backend.set_high_color(view, translate::color(v.foreground))?;
        }
        if mask.contains(GcValueMask::BACKGROUND) {
            backend.set_low_color(view, translate::color(v.background))?;
        }
        if mask.contains(GcValueMask::LINE_WIDTH) {
            backend.set_pen_size(view, translate::pen_size(v.line_width))?;
        }
        if mask.intersects(GcValueMask::STROKE_PATTERN) {
            let pattern = translate::stroke_pattern(v.line_style, v.dash_offset, &v.dashes);
            backend.set_stroke_pattern(view, &pattern)?;
        }
        if mask.contains(GcValueMask::CAP_STYLE) {
            backend.set_line_cap(view, translate::line_cap(v.cap_style))?;
        }
        if mask.contains(GcValueMask::JOIN_STYLE) {
            backend.set_line_join(view, translate::line_join(v.join_style))?;
        }
        if mask.contains(GcValueMask::FILL_STYLE) {
            backend.set_fill_pattern(view, translate::fill_pattern(v.fill_style))?;
        }
        if mask.contains(GcValueMask::FILL_RULE) {
            backend.set_fill_rule(view, translate::fill_rule(v.fill_rule))?;
        }
        if mask.contains(GcValueMask::FONT) && v.font != Font::NONE {
            match resolve_font(v.font) {
                Some(font) => backend.set_font(view, &font)?,
                None => log::warn!("GC {} references unknown font {}", self.id, v.font),
            }
        }
        if mask.contains(GcValueMask::SUBWINDOW_MODE) {
            backend.set_draw_over_children(
                view,
                v.subwindow_mode == SubwindowMode::IncludeInferiors,
            )?;
        }
        if mask.intersects(GcValueMask::CLIPPING) {
            match &v.clip_mask {
                Some(region) => {
                    let mut clip = region.clone();
                    clip.offset(v.clip_x_origin, v.clip_y_origin);
                    backend.set_clipping(view, Some(clip.rectangles()))?;
                }
                None => backend.set_clipping(view, None)?,
            }
        }
        Ok(())
    }

    /// Record that `drawable` now carries this GC's values
    pub fn commit(&mut self, drawable: XID, applied: &mut AppliedState) {
        self.dirty = GcValueMask::empty();
        self.last_drawable = Some(drawable);
        applied.values = Some(self.values.clone());
        applied.gc = Some(self.id);
    }
}
