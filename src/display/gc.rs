//! GC and font requests

use super::Display;
use crate::fonts::FontMetrics;
use crate::gc::{GcValueMask, GraphicsContext, XGcValues};
use crate::protocol::*;
use crate::region::Region;

impl Display {
    /// Clip region covering `pixmap`, `None` for `Pixmap::NONE`
    fn clip_from_pixmap(&self, pixmap: Pixmap, request: &'static str) -> X11Result<Option<Region>> {
        if pixmap == Pixmap::NONE {
            return Ok(None);
        }
        let record = self
            .registry
            .get_pixmap(pixmap)
            .ok_or_else(|| X11Error::bad_pixmap(pixmap, request))?;
        Ok(Some(Region::from_rectangles(&[record.bounds()])))
    }

    /// Resource references in `raw` that must exist before any value is stored
    fn check_gc_references(&self, mask: GcValueMask, raw: &XGcValues, request: &'static str) -> X11Result<()> {
        if mask.contains(GcValueMask::FONT) && self.fonts.get(raw.font).is_none() {
            return Err(X11Error::bad_font(raw.font, request));
        }
        for (bit, pixmap) in [(GcValueMask::TILE, raw.tile), (GcValueMask::STIPPLE, raw.stipple)] {
            if mask.contains(bit) && pixmap != Pixmap::NONE && self.registry.get_pixmap(pixmap).is_none() {
                return Err(X11Error::bad_pixmap(pixmap, request));
            }
        }
        Ok(())
    }

    fn with_gc<R, F>(&mut self, gc: GContext, request: &'static str, f: F) -> X11Result<R>
    where
        F: FnOnce(&mut GraphicsContext) -> R,
    {
        self.gcs
            .get_mut(&gc)
            .map(f)
            .ok_or_else(|| X11Error::bad_gc(gc, request))
    }

    /// New GC usable on drawables of `drawable`'s screen
    pub fn create_gc(&mut self, drawable: XID, mask: GcValueMask, values: &XGcValues) -> X11Result<GContext> {
        const REQUEST: &str = "XCreateGC";
        self.request(|d| {
            if !d.registry.contains(drawable) {
                return Err(X11Error::bad_drawable(drawable, REQUEST));
            }
            d.check_gc_references(mask, values, REQUEST)?;
            let clip = if mask.contains(GcValueMask::CLIP_MASK) {
                Some(d.clip_from_pixmap(values.clip_mask, REQUEST)?)
            } else {
                None
            };
            let id = GContext(d.registry.allocate_id());
            let mut gc = GraphicsContext::new(id);
            gc.set_font(d.default_font);
            gc.change(mask, values, REQUEST)?;
            if let Some(clip) = clip {
                gc.set_clip_mask(clip);
            }
            d.gcs.insert(id, gc);
            log::debug!("created GC {} for {}", id, drawable);
            Ok(id)
        })
    }

    pub fn change_gc(&mut self, gc: GContext, mask: GcValueMask, values: &XGcValues) -> X11Result<()> {
        const REQUEST: &str = "XChangeGC";
        self.request(|d| {
            if !d.gcs.contains_key(&gc) {
                return Err(X11Error::bad_gc(gc, REQUEST));
            }
            d.check_gc_references(mask, values, REQUEST)?;
            let clip = if mask.contains(GcValueMask::CLIP_MASK) {
                Some(d.clip_from_pixmap(values.clip_mask, REQUEST)?)
            } else {
                None
            };
            d.with_gc(gc, REQUEST, |context| {
                context.change(mask, values, REQUEST)?;
                if let Some(clip) = clip {
                    context.set_clip_mask(clip);
                }
                Ok(())
            })?
        })
    }

    /// The masked components; clip masks and dash lists cannot be read back
    pub fn get_gc_values(&mut self, gc: GContext, mask: GcValueMask) -> X11Result<XGcValues> {
        self.request(|d| d.with_gc(gc, "XGetGCValues", |context| context.get_values(mask)))
    }

    /// Copy the masked components of `src` into `dst`
    pub fn copy_gc(&mut self, src: GContext, mask: GcValueMask, dst: GContext) -> X11Result<()> {
        const REQUEST: &str = "XCopyGC";
        self.request(|d| {
            let source = d
                .gcs
                .get(&src)
                .cloned()
                .ok_or_else(|| X11Error::bad_gc(src, REQUEST))?;
            d.with_gc(dst, REQUEST, |context| context.copy_from(&source, mask))
        })
    }

    pub fn free_gc(&mut self, gc: GContext) -> X11Result<()> {
        const REQUEST: &str = "XFreeGC";
        self.request(|d| {
            if gc == d.default_gc {
                return Err(X11Error::new(ErrorCode::Access, gc.id().get(), REQUEST));
            }
            d.gcs
                .remove(&gc)
                .ok_or_else(|| X11Error::bad_gc(gc, REQUEST))?;
            log::debug!("freed GC {}", gc);
            Ok(())
        })
    }

    /// GC created on open: black on white in the default font
    pub fn default_gc(&self) -> GContext {
        self.default_gc
    }

    pub fn set_function(&mut self, gc: GContext, function: GCFunction) -> X11Result<()> {
        self.request(|d| d.with_gc(gc, "XSetFunction", |c| c.set_function(function)))
    }

    pub fn set_plane_mask(&mut self, gc: GContext, plane_mask: u32) -> X11Result<()> {
        self.request(|d| d.with_gc(gc, "XSetPlaneMask", |c| c.set_plane_mask(plane_mask)))
    }

    pub fn set_foreground(&mut self, gc: GContext, pixel: u32) -> X11Result<()> {
        self.request(|d| d.with_gc(gc, "XSetForeground", |c| c.set_foreground(pixel)))
    }

    pub fn set_background(&mut self, gc: GContext, pixel: u32) -> X11Result<()> {
        self.request(|d| d.with_gc(gc, "XSetBackground", |c| c.set_background(pixel)))
    }

    pub fn set_line_attributes(
        &mut self,
        gc: GContext,
        width: u16,
        style: LineStyle,
        cap: CapStyle,
        join: JoinStyle,
    ) -> X11Result<()> {
        self.request(|d| {
            d.with_gc(gc, "XSetLineAttributes", |c| {
                c.set_line_attributes(width, style, cap, join)
            })
        })
    }

    /// Dash pattern; every segment length must be non-zero
    pub fn set_dashes(&mut self, gc: GContext, offset: u16, dashes: &[u8]) -> X11Result<()> {
        const REQUEST: &str = "XSetDashes";
        self.request(|d| {
            if dashes.is_empty() || dashes.contains(&0) {
                return Err(X11Error::bad_value(0, REQUEST));
            }
            d.with_gc(gc, REQUEST, |c| c.set_dashes(offset, dashes))
        })
    }

    pub fn set_fill_style(&mut self, gc: GContext, style: FillStyle) -> X11Result<()> {
        self.request(|d| d.with_gc(gc, "XSetFillStyle", |c| c.set_fill_style(style)))
    }

    pub fn set_fill_rule(&mut self, gc: GContext, rule: FillRule) -> X11Result<()> {
        self.request(|d| d.with_gc(gc, "XSetFillRule", |c| c.set_fill_rule(rule)))
    }

    pub fn set_arc_mode(&mut self, gc: GContext, mode: ArcMode) -> X11Result<()> {
        self.request(|d| d.with_gc(gc, "XSetArcMode", |c| c.set_arc_mode(mode)))
    }

    pub fn set_tile(&mut self, gc: GContext, tile: Pixmap) -> X11Result<()> {
        const REQUEST: &str = "XSetTile";
        self.request(|d| {
            if d.registry.get_pixmap(tile).is_none() {
                return Err(X11Error::bad_pixmap(tile, REQUEST));
            }
            d.with_gc(gc, REQUEST, |c| c.set_tile(tile))
        })
    }

    pub fn set_stipple(&mut self, gc: GContext, stipple: Pixmap) -> X11Result<()> {
        const REQUEST: &str = "XSetStipple";
        self.request(|d| {
            if d.registry.get_pixmap(stipple).is_none() {
                return Err(X11Error::bad_pixmap(stipple, REQUEST));
            }
            d.with_gc(gc, REQUEST, |c| c.set_stipple(stipple))
        })
    }

    pub fn set_ts_origin(&mut self, gc: GContext, x: i16, y: i16) -> X11Result<()> {
        self.request(|d| d.with_gc(gc, "XSetTSOrigin", |c| c.set_ts_origin(x, y)))
    }

    pub fn set_font(&mut self, gc: GContext, font: Font) -> X11Result<()> {
        const REQUEST: &str = "XSetFont";
        self.request(|d| {
            if d.fonts.get(font).is_none() {
                return Err(X11Error::bad_font(font, REQUEST));
            }
            d.with_gc(gc, REQUEST, |c| c.set_font(font))
        })
    }

    pub fn set_subwindow_mode(&mut self, gc: GContext, mode: SubwindowMode) -> X11Result<()> {
        self.request(|d| d.with_gc(gc, "XSetSubwindowMode", |c| c.set_subwindow_mode(mode)))
    }

    pub fn set_graphics_exposures(&mut self, gc: GContext, enabled: bool) -> X11Result<()> {
        self.request(|d| {
            d.with_gc(gc, "XSetGraphicsExposures", |c| c.set_graphics_exposures(enabled))
        })
    }

    pub fn set_clip_origin(&mut self, gc: GContext, x: i16, y: i16) -> X11Result<()> {
        self.request(|d| d.with_gc(gc, "XSetClipOrigin", |c| c.set_clip_origin(x, y)))
    }

    /// Clip to the extent of `pixmap`; `Pixmap::NONE` removes clipping
    pub fn set_clip_mask(&mut self, gc: GContext, pixmap: Pixmap) -> X11Result<()> {
        const REQUEST: &str = "XSetClipMask";
        self.request(|d| {
            let clip = d.clip_from_pixmap(pixmap, REQUEST)?;
            d.with_gc(gc, REQUEST, |c| c.set_clip_mask(clip))
        })
    }

    /// Clip to `rects`, offset by the clip origin
    pub fn set_clip_rectangles(
        &mut self,
        gc: GContext,
        x_origin: i16,
        y_origin: i16,
        rects: &[Rectangle],
    ) -> X11Result<()> {
        self.request(|d| {
            d.with_gc(gc, "XSetClipRectangles", |c| {
                c.set_clip_origin(x_origin, y_origin);
                c.set_clip_mask(Some(Region::from_rectangles(rects)));
            })
        })
    }

    /// Clip to `region` with a zero clip origin
    pub fn set_region(&mut self, gc: GContext, region: &Region) -> X11Result<()> {
        self.request(|d| {
            d.with_gc(gc, "XSetRegion", |c| {
                c.set_clip_origin(0, 0);
                c.set_clip_mask(Some(region.clone()));
            })
        })
    }

    /// Load the first font whose name matches `name` (wildcards allowed)
    pub fn load_font(&mut self, name: &str) -> X11Result<Font> {
        self.request(|d| {
            let fid = Font(d.registry.allocate_id());
            d.fonts.load(fid, name)?;
            Ok(fid)
        })
    }

    pub fn unload_font(&mut self, font: Font) -> X11Result<()> {
        self.request(|d| {
            if font == d.default_font {
                return Err(X11Error::new(ErrorCode::Access, font.id().get(), "XUnloadFont"));
            }
            d.fonts.unload(font)
        })
    }

    pub fn list_fonts(&self, pattern: &str, max_names: usize) -> Vec<String> {
        self.fonts.list(pattern, max_names)
    }

    pub fn query_font(&mut self, font: Font) -> X11Result<FontMetrics> {
        self.request(|d| d.fonts.query(font))
    }

    /// Width in pixels of `text` drawn in `font`
    pub fn text_width(&mut self, font: Font, text: &str) -> X11Result<i32> {
        self.request(|d| d.fonts.text_width(font, text))
    }

    pub fn default_font(&self) -> Font {
        self.default_font
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recording::{CallLog, HostCall, RecordingBackend};
    use crate::display::DisplayConfig;

    fn open() -> (Display, CallLog, Window) {
        let backend = RecordingBackend::new();
        let log = backend.log();
        let mut display = Display::open(DisplayConfig::default(), Box::new(backend)).unwrap();
        let root = display.root_window();
        let window = display.create_simple_window(root, 0, 0, 100, 100, 0, 0, 0).unwrap();
        log.clear();
        (display, log, window)
    }

    fn state_calls(log: &CallLog) -> usize {
        log.take().iter().filter(|c| c.is_state_change()).count()
    }

    #[test]
    fn test_switching_gcs_pushes_only_differences() {
        let (mut display, log, window) = open();
        let a = display.create_gc(window.id(), GcValueMask::empty(), &XGcValues::default()).unwrap();
        let b = display.create_gc(window.id(), GcValueMask::empty(), &XGcValues::default()).unwrap();
        display.set_foreground(a, 0xff0000).unwrap();
        display.set_foreground(b, 0x00ff00).unwrap();
        display.set_line_attributes(b, 3, LineStyle::Solid, CapStyle::Butt, JoinStyle::Miter).unwrap();

        display.draw_point(window.id(), a, 0, 0).unwrap();
        assert!(state_calls(&log) > 2);
        // B differs in foreground and line width
        display.draw_point(window.id(), b, 0, 0).unwrap();
        assert_eq!(state_calls(&log), 2);
        display.draw_point(window.id(), a, 0, 0).unwrap();
        assert_eq!(state_calls(&log), 2);
        display.draw_point(window.id(), a, 0, 0).unwrap();
        assert_eq!(state_calls(&log), 0);
    }

    #[test]
    fn test_repeated_setter_costs_one_call() {
        let (mut display, log, window) = open();
        let gc = display.default_gc();
        display.draw_point(window.id(), gc, 0, 0).unwrap();
        log.clear();
        display.set_foreground(gc, 0x123456).unwrap();
        display.set_foreground(gc, 0x123456).unwrap();
        display.draw_point(window.id(), gc, 0, 0).unwrap();
        let calls = log.take();
        assert_eq!(calls.iter().filter(|c| c.is_state_change()).count(), 1);
        assert!(matches!(calls[0], HostCall::SetHighColor(..)));
    }

    #[test]
    fn test_consumed_attributes_never_reach_host() {
        let (mut display, log, window) = open();
        let gc = display.default_gc();
        display.draw_point(window.id(), gc, 0, 0).unwrap();
        log.clear();
        display.set_plane_mask(gc, 0xff).unwrap();
        display.set_graphics_exposures(gc, false).unwrap();
        display.set_ts_origin(gc, 4, 4).unwrap();
        display.draw_point(window.id(), gc, 0, 0).unwrap();
        assert_eq!(state_calls(&log), 0);
    }

    #[test]
    fn test_bad_enumerant_leaves_gc_untouched() {
        let (mut display, _, window) = open();
        let gc = display.create_gc(window.id(), GcValueMask::empty(), &XGcValues::default()).unwrap();
        let values = XGcValues {
            foreground: 0xabcdef,
            function: 99,
            ..Default::default()
        };
        let err = display
            .change_gc(gc, GcValueMask::FOREGROUND | GcValueMask::FUNCTION, &values)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Value);
        let read = display.get_gc_values(gc, GcValueMask::FOREGROUND).unwrap();
        assert_eq!(read.foreground, 0);
    }

    #[test]
    fn test_clip_mask_from_pixmap() {
        let (mut display, log, window) = open();
        let pixmap = display.create_pixmap(window.id(), 20, 10, 1).unwrap();
        let values = XGcValues {
            clip_mask: pixmap,
            ..Default::default()
        };
        let gc = display.create_gc(window.id(), GcValueMask::CLIP_MASK, &values).unwrap();
        display.set_clip_origin(gc, 5, 5).unwrap();
        log.clear();
        display.draw_point(window.id(), gc, 0, 0).unwrap();
        let clip = log.calls().into_iter().find_map(|c| match c {
            HostCall::SetClipping(_, rects) => rects,
            _ => None,
        });
        assert_eq!(clip, Some(vec![Rectangle::new(5, 5, 20, 10)]));

        let err = display.set_clip_mask(gc, Pixmap::new(0x9999)).unwrap_err();
        assert_eq!(err.code, ErrorCode::Pixmap);
    }

    #[test]
    fn test_copy_and_free() {
        let (mut display, _, window) = open();
        let a = display.create_gc(window.id(), GcValueMask::empty(), &XGcValues::default()).unwrap();
        let b = display.create_gc(window.id(), GcValueMask::empty(), &XGcValues::default()).unwrap();
        display.set_foreground(a, 7).unwrap();
        display.set_background(a, 9).unwrap();
        display.copy_gc(a, GcValueMask::FOREGROUND, b).unwrap();
        let read = display
            .get_gc_values(b, GcValueMask::FOREGROUND | GcValueMask::BACKGROUND)
            .unwrap();
        assert_eq!((read.foreground, read.background), (7, 1));

        display.free_gc(a).unwrap();
        assert_eq!(display.free_gc(a).unwrap_err().code, ErrorCode::GContext);
        let default = display.default_gc();
        assert_eq!(display.free_gc(default).unwrap_err().code, ErrorCode::Access);
    }

    #[test]
    fn test_dashes_validated() {
        let (mut display, _, _) = open();
        let gc = display.default_gc();
        assert_eq!(display.set_dashes(gc, 0, &[]).unwrap_err().code, ErrorCode::Value);
        assert_eq!(display.set_dashes(gc, 0, &[4, 0]).unwrap_err().code, ErrorCode::Value);
        display.set_dashes(gc, 2, &[6, 2]).unwrap();
    }

    #[test]
    fn test_fonts() {
        let (mut display, _, _) = open();
        let font = display.load_font("*courier*").unwrap();
        assert!(display.text_width(font, "abc").unwrap() > 0);
        let gc = display.default_gc();
        display.set_font(gc, font).unwrap();
        assert_eq!(display.load_font("-nope-*").unwrap_err().code, ErrorCode::Name);
        display.unload_font(font).unwrap();
        assert_eq!(display.query_font(font).unwrap_err().code, ErrorCode::Font);
        assert_eq!(display.set_font(gc, font).unwrap_err().code, ErrorCode::Font);
        assert!(!display.list_fonts("fixed", 5).is_empty());
    }
}
