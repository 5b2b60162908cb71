//! Drawing requests and pixmaps
//!
//! Every drawing call resolves its drawable, validates the GC, pushes only
//! the GC state the drawable's host view is missing, and then issues the
//! host drawing operation.

use super::{host_alloc, host_failure, log_host, Display};
use crate::backend::{HostFont, HostView, Tone, ViewParent};
use crate::gc::translate;
use crate::gc::AppliedState;
use crate::protocol::*;
use crate::resources::{DrawableEntry, PixmapRecord};

/// Major opcode reported in NoExposure for `copy_area`
const COPY_AREA_OPCODE: u8 = 62;

/// How point lists are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordMode {
    /// Every point is relative to the drawable's origin
    Origin,
    /// Every point after the first is relative to the previous one
    Previous,
}

fn absolute(points: &[Point], mode: CoordMode) -> Vec<Point> {
    match mode {
        CoordMode::Origin => points.to_vec(),
        CoordMode::Previous => {
            let mut out = Vec::with_capacity(points.len());
            let mut last: Option<Point> = None;
            for p in points {
                let next = match last {
                    Some(prev) => Point::new(prev.x.wrapping_add(p.x), prev.y.wrapping_add(p.y)),
                    None => *p,
                };
                out.push(next);
                last = Some(next);
            }
            out
        }
    }
}

impl Display {
    /// Resolve `drawable` and `gc` and bring the drawable's host view up to
    /// date with the GC. `None` when the drawable has no host view (the
    /// root), in which case drawing is a no-op.
    fn prepare(&mut self, drawable: XID, gc: GContext, request: &'static str) -> X11Result<Option<HostView>> {
        let (view, applied) = {
            let reg = self.registry.read();
            let entry = reg
                .get(drawable)
                .ok_or_else(|| X11Error::bad_drawable(drawable, request))?;
            if let DrawableEntry::Window(w) = entry {
                if w.class == WindowClass::InputOnly {
                    return Err(X11Error::bad_match(request));
                }
            }
            (entry.view(), entry.applied().clone())
        };
        let context = self
            .gcs
            .get_mut(&gc)
            .ok_or_else(|| X11Error::bad_gc(gc, request))?;
        let Some(view) = view else {
            return Ok(None);
        };

        let mask = context.check(drawable, &applied);
        let switched = context.last_drawable != Some(drawable) || applied.gc != Some(gc);
        if mask.is_empty() && !switched {
            return Ok(Some(view));
        }
        let fonts = &self.fonts;
        let resolve = |font: Font| -> Option<HostFont> { fonts.host_font(font) };
        context
            .apply(self.backend.as_mut(), view, mask, &resolve)
            .map_err(host_failure(request))?;
        let mut applied: AppliedState = applied;
        context.commit(drawable, &mut applied);
        self.registry.update(drawable, |entry| *entry.applied_mut() = applied);
        Ok(Some(view))
    }

    pub fn draw_point(&mut self, drawable: XID, gc: GContext, x: i16, y: i16) -> X11Result<()> {
        self.draw_points(drawable, gc, &[Point::new(x, y)], CoordMode::Origin)
    }

    pub fn draw_points(
        &mut self,
        drawable: XID,
        gc: GContext,
        points: &[Point],
        mode: CoordMode,
    ) -> X11Result<()> {
        const REQUEST: &str = "XDrawPoints";
        self.request(|d| {
            let Some(view) = d.prepare(drawable, gc, REQUEST)? else {
                return Ok(());
            };
            d.backend
                .plot_points(view, &absolute(points, mode))
                .map_err(host_failure(REQUEST))
        })
    }

    pub fn draw_line(
        &mut self,
        drawable: XID,
        gc: GContext,
        x1: i16,
        y1: i16,
        x2: i16,
        y2: i16,
    ) -> X11Result<()> {
        const REQUEST: &str = "XDrawLine";
        self.request(|d| {
            let Some(view) = d.prepare(drawable, gc, REQUEST)? else {
                return Ok(());
            };
            d.backend
                .stroke_line(view, Point::new(x1, y1), Point::new(x2, y2))
                .map_err(host_failure(REQUEST))
        })
    }

    /// Connected lines through `points`
    pub fn draw_lines(
        &mut self,
        drawable: XID,
        gc: GContext,
        points: &[Point],
        mode: CoordMode,
    ) -> X11Result<()> {
        const REQUEST: &str = "XDrawLines";
        self.request(|d| {
            let Some(view) = d.prepare(drawable, gc, REQUEST)? else {
                return Ok(());
            };
            d.backend
                .stroke_polyline(view, &absolute(points, mode))
                .map_err(host_failure(REQUEST))
        })
    }

    /// Disjoint lines
    pub fn draw_segments(&mut self, drawable: XID, gc: GContext, segments: &[Segment]) -> X11Result<()> {
        const REQUEST: &str = "XDrawSegments";
        self.request(|d| {
            let Some(view) = d.prepare(drawable, gc, REQUEST)? else {
                return Ok(());
            };
            for s in segments {
                d.backend
                    .stroke_line(view, Point::new(s.x1, s.y1), Point::new(s.x2, s.y2))
                    .map_err(host_failure(REQUEST))?;
            }
            Ok(())
        })
    }

    pub fn draw_rectangle(
        &mut self,
        drawable: XID,
        gc: GContext,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
    ) -> X11Result<()> {
        self.draw_rectangles(drawable, gc, &[Rectangle::new(x, y, width, height)])
    }

    pub fn draw_rectangles(&mut self, drawable: XID, gc: GContext, rects: &[Rectangle]) -> X11Result<()> {
        const REQUEST: &str = "XDrawRectangles";
        self.request(|d| {
            let Some(view) = d.prepare(drawable, gc, REQUEST)? else {
                return Ok(());
            };
            for rect in rects {
                d.backend.stroke_rect(view, *rect).map_err(host_failure(REQUEST))?;
            }
            Ok(())
        })
    }

    pub fn fill_rectangle(
        &mut self,
        drawable: XID,
        gc: GContext,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
    ) -> X11Result<()> {
        self.fill_rectangles(drawable, gc, &[Rectangle::new(x, y, width, height)])
    }

    pub fn fill_rectangles(&mut self, drawable: XID, gc: GContext, rects: &[Rectangle]) -> X11Result<()> {
        const REQUEST: &str = "XFillRectangles";
        self.request(|d| {
            let Some(view) = d.prepare(drawable, gc, REQUEST)? else {
                return Ok(());
            };
            for rect in rects {
                d.backend
                    .fill_rect(view, *rect, Tone::High)
                    .map_err(host_failure(REQUEST))?;
            }
            Ok(())
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_arc(
        &mut self,
        drawable: XID,
        gc: GContext,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
        angle1: i16,
        angle2: i16,
    ) -> X11Result<()> {
        let arc = Arc {
            x,
            y,
            width,
            height,
            angle1,
            angle2,
        };
        self.draw_arcs(drawable, gc, &[arc])
    }

    pub fn draw_arcs(&mut self, drawable: XID, gc: GContext, arcs: &[Arc]) -> X11Result<()> {
        const REQUEST: &str = "XDrawArcs";
        self.request(|d| {
            let Some(view) = d.prepare(drawable, gc, REQUEST)? else {
                return Ok(());
            };
            for arc in arcs {
                d.backend
                    .stroke_arc(
                        view,
                        arc.bounds(),
                        translate::arc_degrees(arc.angle1),
                        translate::arc_degrees(arc.angle2),
                    )
                    .map_err(host_failure(REQUEST))?;
            }
            Ok(())
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn fill_arc(
        &mut self,
        drawable: XID,
        gc: GContext,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
        angle1: i16,
        angle2: i16,
    ) -> X11Result<()> {
        let arc = Arc {
            x,
            y,
            width,
            height,
            angle1,
            angle2,
        };
        self.fill_arcs(drawable, gc, &[arc])
    }

    /// Filled arcs, as pie slices or chords per the GC's arc mode
    pub fn fill_arcs(&mut self, drawable: XID, gc: GContext, arcs: &[Arc]) -> X11Result<()> {
        const REQUEST: &str = "XFillArcs";
        self.request(|d| {
            let Some(view) = d.prepare(drawable, gc, REQUEST)? else {
                return Ok(());
            };
            let pie = d
                .gcs
                .get(&gc)
                .map(|c| c.values.arc_mode == ArcMode::PieSlice)
                .unwrap_or(true);
            for arc in arcs {
                d.backend
                    .fill_arc(
                        view,
                        arc.bounds(),
                        translate::arc_degrees(arc.angle1),
                        translate::arc_degrees(arc.angle2),
                        pie,
                    )
                    .map_err(host_failure(REQUEST))?;
            }
            Ok(())
        })
    }

    pub fn fill_polygon(
        &mut self,
        drawable: XID,
        gc: GContext,
        points: &[Point],
        mode: CoordMode,
    ) -> X11Result<()> {
        const REQUEST: &str = "XFillPolygon";
        self.request(|d| {
            let Some(view) = d.prepare(drawable, gc, REQUEST)? else {
                return Ok(());
            };
            if points.len() < 3 {
                return Ok(());
            }
            d.backend
                .fill_polygon(view, &absolute(points, mode))
                .map_err(host_failure(REQUEST))
        })
    }

    /// Text in the GC's font, baseline starting at (x, y)
    pub fn draw_string(&mut self, drawable: XID, gc: GContext, x: i16, y: i16, text: &str) -> X11Result<()> {
        const REQUEST: &str = "XDrawString";
        self.request(|d| {
            let Some(view) = d.prepare(drawable, gc, REQUEST)? else {
                return Ok(());
            };
            d.backend
                .draw_string(view, Point::new(x, y), text)
                .map_err(host_failure(REQUEST))
        })
    }

    /// Text over a box filled with the GC's background
    pub fn draw_image_string(
        &mut self,
        drawable: XID,
        gc: GContext,
        x: i16,
        y: i16,
        text: &str,
    ) -> X11Result<()> {
        const REQUEST: &str = "XDrawImageString";
        self.request(|d| {
            let Some(view) = d.prepare(drawable, gc, REQUEST)? else {
                return Ok(());
            };
            let font = d.gcs.get(&gc).map(|c| c.values.font).unwrap_or(d.default_font);
            if let Some(entry) = d.fonts.get(font) {
                let backdrop = Rectangle::new(
                    x,
                    y.saturating_sub(entry.ascent),
                    entry.text_width(text).clamp(0, u16::MAX as i32) as u16,
                    (entry.ascent + entry.descent) as u16,
                );
                d.backend
                    .fill_rect(view, backdrop, Tone::Low)
                    .map_err(host_failure(REQUEST))?;
            }
            d.backend
                .draw_string(view, Point::new(x, y), text)
                .map_err(host_failure(REQUEST))
        })
    }

    /// Copy a rectangle between drawables of the same depth
    #[allow(clippy::too_many_arguments)]
    pub fn copy_area(
        &mut self,
        src: XID,
        dst: XID,
        gc: GContext,
        src_x: i16,
        src_y: i16,
        width: u16,
        height: u16,
        dst_x: i16,
        dst_y: i16,
    ) -> X11Result<()> {
        const REQUEST: &str = "XCopyArea";
        self.request(|d| {
            let (src_view, src_depth, dst_depth) = {
                let reg = d.registry.read();
                let s = reg.get(src).ok_or_else(|| X11Error::bad_drawable(src, REQUEST))?;
                let t = reg.get(dst).ok_or_else(|| X11Error::bad_drawable(dst, REQUEST))?;
                (s.view(), s.depth(), t.depth())
            };
            if src_depth != dst_depth {
                return Err(X11Error::bad_match(REQUEST));
            }
            let Some(dst_view) = d.prepare(dst, gc, REQUEST)? else {
                return Ok(());
            };
            if let Some(src_view) = src_view {
                d.backend
                    .copy_bits(
                        src_view,
                        dst_view,
                        Rectangle::new(src_x, src_y, width, height),
                        Point::new(dst_x, dst_y),
                    )
                    .map_err(host_failure(REQUEST))?;
            }
            let exposures = d
                .gcs
                .get(&gc)
                .map(|c| c.values.graphics_exposures)
                .unwrap_or(false);
            if exposures {
                let drawable = match d.registry.get(dst) {
                    Some(drawable) => drawable,
                    None => return Ok(()),
                };
                d.queue_event(Event::NoExposure(NoExposureEvent {
                    serial: 0,
                    send_event: false,
                    drawable,
                    major_code: COPY_AREA_OPCODE,
                    minor_code: 0,
                }));
            }
            Ok(())
        })
    }

    /// Off-screen drawable of depth 1 or the screen depth
    pub fn create_pixmap(&mut self, drawable: XID, width: u16, height: u16, depth: u8) -> X11Result<Pixmap> {
        const REQUEST: &str = "XCreatePixmap";
        self.request(|d| {
            if !d.registry.contains(drawable) {
                return Err(X11Error::bad_drawable(drawable, REQUEST));
            }
            if width == 0 || height == 0 {
                return Err(X11Error::bad_value(0, REQUEST));
            }
            if depth != 1 && depth != d.screen.root_depth {
                return Err(X11Error::bad_value(depth as u32, REQUEST));
            }
            if d.config.max_pixmaps > 0 && d.registry.pixmaps().len() >= d.config.max_pixmaps {
                log::warn!("pixmap limit of {} reached", d.config.max_pixmaps);
                return Err(X11Error::bad_alloc(REQUEST));
            }
            let bitmap = d
                .backend
                .create_bitmap(width, height, depth)
                .map_err(host_alloc(REQUEST))?;
            let view = match d
                .backend
                .create_view(ViewParent::Bitmap(bitmap), Rectangle::new(0, 0, width, height))
            {
                Ok(view) => view,
                Err(err) => {
                    log_host(d.backend.free_bitmap(bitmap), "free_bitmap");
                    return Err(host_alloc(REQUEST)(err));
                }
            };
            let id = d.registry.add(DrawableEntry::Pixmap(PixmapRecord {
                width,
                height,
                depth,
                bitmap,
                view,
                applied: AppliedState::default(),
            }));
            log::debug!("created pixmap {} ({}x{}x{})", id, width, height, depth);
            Ok(Pixmap(id))
        })
    }

    pub fn free_pixmap(&mut self, pixmap: Pixmap) -> X11Result<()> {
        self.request(|d| {
            let record = d
                .registry
                .get_pixmap(pixmap)
                .ok_or_else(|| X11Error::bad_pixmap(pixmap, "XFreePixmap"))?;
            log_host(d.backend.remove_view(record.view), "remove_view");
            log_host(d.backend.free_bitmap(record.bitmap), "free_bitmap");
            d.registry.erase(pixmap.id());
            log::debug!("freed pixmap {}", pixmap);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recording::{CallLog, HostCall, RecordingBackend};
    use crate::display::DisplayConfig;
    use crate::gc::GcValueMask;

    fn open() -> (Display, CallLog, Window) {
        let backend = RecordingBackend::new();
        let log = backend.log();
        let mut display = Display::open(DisplayConfig::default(), Box::new(backend)).unwrap();
        let root = display.root_window();
        let window = display.create_simple_window(root, 0, 0, 100, 100, 0, 0, 0).unwrap();
        log.clear();
        (display, log, window)
    }

    #[test]
    fn test_previous_coordinates() {
        let points = [Point::new(10, 10), Point::new(5, 0), Point::new(0, 5)];
        assert_eq!(
            absolute(&points, CoordMode::Previous),
            vec![Point::new(10, 10), Point::new(15, 10), Point::new(15, 15)]
        );
    }

    #[test]
    fn test_state_pushed_once_per_drawable() {
        let (mut display, log, window) = open();
        let gc = display.default_gc();
        display.draw_line(window.id(), gc, 0, 0, 10, 10).unwrap();
        let first = log.count(HostCall::is_state_change);
        assert!(first > 0);
        log.clear();
        display.draw_line(window.id(), gc, 0, 0, 20, 20).unwrap();
        assert_eq!(log.count(HostCall::is_state_change), 0);
        assert_eq!(log.count(|c| matches!(c, HostCall::StrokeLine(..))), 1);
    }

    #[test]
    fn test_bad_drawable_and_gc() {
        let (mut display, _, window) = open();
        let gc = display.default_gc();
        let err = display.draw_point(XID::new(0x7777), gc, 0, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::Drawable);
        let err = display.draw_point(window.id(), GContext::new(0x7777), 0, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::GContext);
    }

    #[test]
    fn test_root_drawing_is_noop() {
        let (mut display, log, _) = open();
        let gc = display.default_gc();
        let root = display.root_window();
        display.fill_rectangle(root.id(), gc, 0, 0, 10, 10).unwrap();
        assert!(log.calls().is_empty());
    }

    #[test]
    fn test_input_only_is_bad_match() {
        let (mut display, _, _) = open();
        let root = display.root_window();
        let gc = display.default_gc();
        let input_only = display
            .create_window(
                root,
                0,
                0,
                10,
                10,
                0,
                0,
                WindowClass::InputOnly,
                &Default::default(),
            )
            .unwrap();
        let err = display.draw_point(input_only.id(), gc, 0, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::Match);
    }

    #[test]
    fn test_fill_arc_follows_arc_mode() {
        let (mut display, log, window) = open();
        let gc = display.create_gc(window.id(), GcValueMask::empty(), &Default::default()).unwrap();
        display.fill_arc(window.id(), gc, 0, 0, 10, 10, 0, 90 * 64).unwrap();
        display.set_arc_mode(gc, ArcMode::Chord).unwrap();
        display.fill_arc(window.id(), gc, 0, 0, 10, 10, 0, 90 * 64).unwrap();
        let pies: Vec<bool> = log
            .calls()
            .iter()
            .filter_map(|c| match c {
                HostCall::FillArc(_, _, start, span, pie) => {
                    assert_eq!((*start, *span), (0.0, 90.0));
                    Some(*pie)
                }
                _ => None,
            })
            .collect();
        assert_eq!(pies, vec![true, false]);
    }

    #[test]
    fn test_image_string_fills_backdrop_first() {
        let (mut display, log, window) = open();
        let gc = display.default_gc();
        display.draw_image_string(window.id(), gc, 5, 20, "hi").unwrap();
        let drawing: Vec<HostCall> = log
            .calls()
            .into_iter()
            .filter(|c| !c.is_state_change())
            .collect();
        assert!(matches!(drawing[0], HostCall::FillRect(_, _, Tone::Low)));
        assert!(matches!(&drawing[1], HostCall::DrawString(_, p, t) if *p == Point::new(5, 20) && t == "hi"));
    }

    #[test]
    fn test_copy_area_no_exposure() {
        let (mut display, log, window) = open();
        let gc = display.default_gc();
        let depth = display.default_depth();
        let pixmap = display.create_pixmap(window.id(), 16, 16, depth).unwrap();
        display
            .copy_area(pixmap.id(), window.id(), gc, 0, 0, 16, 16, 4, 4)
            .unwrap();
        assert_eq!(log.count(|c| matches!(c, HostCall::CopyBits(..))), 1);
        assert!(matches!(display.next_event(), Some(Event::NoExposure(e)) if e.drawable == Drawable::Window(window)));

        let bitmap = display.create_pixmap(window.id(), 16, 16, 1).unwrap();
        let err = display
            .copy_area(bitmap.id(), window.id(), gc, 0, 0, 16, 16, 0, 0)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Match);
    }

    #[test]
    fn test_pixmap_lifecycle() {
        let (mut display, log, window) = open();
        let err = display.create_pixmap(window.id(), 8, 8, 7).unwrap_err();
        assert_eq!(err.code, ErrorCode::Value);
        let pixmap = display.create_pixmap(window.id(), 8, 8, 1).unwrap();
        let geometry = display.get_geometry(pixmap.id()).unwrap();
        assert_eq!((geometry.width, geometry.height, geometry.depth), (8, 8, 1));
        display.free_pixmap(pixmap).unwrap();
        assert_eq!(log.count(|c| matches!(c, HostCall::FreeBitmap(_))), 1);
        assert_eq!(display.free_pixmap(pixmap).unwrap_err().code, ErrorCode::Pixmap);
    }
}
