//! Recording Backend - logs every host call
//!
//! Behaves like the null backend but appends each call to a shared log.
//! The CLI's `-trace` mode prints the log; tests use it to assert exactly
//! which host operations an Xlib call produced.

use super::*;
use crate::protocol::*;
use std::sync::{Arc, Mutex};

/// One recorded host operation
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    CreateWindow { window: HostWindow, frame: Rectangle, title: String },
    DestroyWindow(HostWindow),
    ShowWindow(HostWindow),
    HideWindow(HostWindow),
    MoveWindow(HostWindow, i16, i16),
    ResizeWindow(HostWindow, u16, u16),
    RaiseWindow(HostWindow),
    LowerWindow(HostWindow),
    SetWindowTitle(HostWindow, String),
    CreateView { view: HostView, parent: ViewParent, frame: Rectangle },
    RemoveView(HostView),
    ShowView(HostView),
    HideView(HostView),
    MoveView(HostView, i16, i16),
    ResizeView(HostView, u16, u16),
    ReparentView(HostView, ViewParent),
    RaiseView(HostView),
    LowerView(HostView),
    SetViewColor(HostView, HostColor),
    CreateBitmap { bitmap: HostBitmap, width: u16, height: u16, depth: u8 },
    FreeBitmap(HostBitmap),
    SetDrawingMode(HostView, DrawingMode),
    SetHighColor(HostView, HostColor),
    SetLowColor(HostView, HostColor),
    SetPenSize(HostView, f32),
    SetLineCap(HostView, LineCap),
    SetLineJoin(HostView, LineJoin),
    SetStrokePattern(HostView, StrokePattern),
    SetFillRule(HostView, HostFillRule),
    SetFillPattern(HostView, FillPattern),
    SetFont(HostView, HostFont),
    SetClipping(HostView, Option<Vec<Rectangle>>),
    SetDrawOverChildren(HostView, bool),
    StrokeLine(HostView, Point, Point),
    StrokeRect(HostView, Rectangle),
    FillRect(HostView, Rectangle, Tone),
    StrokeArc(HostView, Rectangle, f32, f32),
    FillArc(HostView, Rectangle, f32, f32, bool),
    FillPolygon(HostView, Vec<Point>),
    DrawString(HostView, Point, String),
    Invalidate(HostView, Rectangle),
    CopyBits(HostView, HostView, Rectangle, Point),
    Flush,
}

impl HostCall {
    /// True for calls that reconfigure a view's drawing state
    pub fn is_state_change(&self) -> bool {
        matches!(
            self,
            HostCall::SetDrawingMode(..)
                | HostCall::SetHighColor(..)
                | HostCall::SetLowColor(..)
                | HostCall::SetPenSize(..)
                | HostCall::SetLineCap(..)
                | HostCall::SetLineJoin(..)
                | HostCall::SetStrokePattern(..)
                | HostCall::SetFillRule(..)
                | HostCall::SetFillPattern(..)
                | HostCall::SetFont(..)
                | HostCall::SetClipping(..)
                | HostCall::SetDrawOverChildren(..)
        )
    }
}

/// Shared handle on the recorded calls
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<HostCall>>>,
}

impl CallLog {
    pub fn calls(&self) -> Vec<HostCall> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Take every recorded call, leaving the log empty
    pub fn take(&self) -> Vec<HostCall> {
        match self.calls.lock() {
            Ok(mut calls) => std::mem::take(&mut *calls),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn clear(&self) {
        self.take();
    }

    pub fn count<F: Fn(&HostCall) -> bool>(&self, pred: F) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn push(&self, call: HostCall) {
        log::trace!("host call: {:?}", call);
        match self.calls.lock() {
            Ok(mut calls) => calls.push(call),
            Err(poisoned) => poisoned.into_inner().push(call),
        }
    }
}

pub struct RecordingBackend {
    next_handle: usize,
    log: CallLog,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            log: CallLog::default(),
        }
    }

    /// A second handle on the log, usable after the backend is boxed
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    fn next(&mut self) -> usize {
        let id = self.next_handle;
        self.next_handle += 1;
        id
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for RecordingBackend {
    fn init(&mut self) -> BackendResult<()> {
        Ok(())
    }

    fn get_screen_info(&self) -> BackendResult<ScreenInfo> {
        Ok(ScreenInfo {
            width: 1920,
            height: 1080,
            width_mm: 508,
            height_mm: 285,
            root_visual: VisualID::new(0x21),
            root_depth: 24,
            white_pixel: 0xFFFFFF,
            black_pixel: 0x000000,
        })
    }

    fn create_window(&mut self, frame: Rectangle, title: &str) -> BackendResult<HostWindow> {
        let window = HostWindow(self.next());
        self.log.push(HostCall::CreateWindow {
            window,
            frame,
            title: title.to_string(),
        });
        Ok(window)
    }

    fn destroy_window(&mut self, window: HostWindow) -> BackendResult<()> {
        self.log.push(HostCall::DestroyWindow(window));
        Ok(())
    }

    fn show_window(&mut self, window: HostWindow) -> BackendResult<()> {
        self.log.push(HostCall::ShowWindow(window));
        Ok(())
    }

    fn hide_window(&mut self, window: HostWindow) -> BackendResult<()> {
        self.log.push(HostCall::HideWindow(window));
        Ok(())
    }

    fn move_window(&mut self, window: HostWindow, x: i16, y: i16) -> BackendResult<()> {
        self.log.push(HostCall::MoveWindow(window, x, y));
        Ok(())
    }

    fn resize_window(&mut self, window: HostWindow, width: u16, height: u16) -> BackendResult<()> {
        self.log.push(HostCall::ResizeWindow(window, width, height));
        Ok(())
    }

    fn raise_window(&mut self, window: HostWindow) -> BackendResult<()> {
        self.log.push(HostCall::RaiseWindow(window));
        Ok(())
    }

    fn lower_window(&mut self, window: HostWindow) -> BackendResult<()> {
        self.log.push(HostCall::LowerWindow(window));
        Ok(())
    }

    fn set_window_title(&mut self, window: HostWindow, title: &str) -> BackendResult<()> {
        self.log
            .push(HostCall::SetWindowTitle(window, title.to_string()));
        Ok(())
    }

    fn create_view(&mut self, parent: ViewParent, frame: Rectangle) -> BackendResult<HostView> {
        let view = HostView(self.next());
        self.log.push(HostCall::CreateView {
            view,
            parent,
            frame,
        });
        Ok(view)
    }

    fn remove_view(&mut self, view: HostView) -> BackendResult<()> {
        self.log.push(HostCall::RemoveView(view));
        Ok(())
    }

    fn show_view(&mut self, view: HostView) -> BackendResult<()> {
        self.log.push(HostCall::ShowView(view));
        Ok(())
    }

    fn hide_view(&mut self, view: HostView) -> BackendResult<()> {
        self.log.push(HostCall::HideView(view));
        Ok(())
    }

    fn move_view(&mut self, view: HostView, x: i16, y: i16) -> BackendResult<()> {
        self.log.push(HostCall::MoveView(view, x, y));
        Ok(())
    }

    fn resize_view(&mut self, view: HostView, width: u16, height: u16) -> BackendResult<()> {
        self.log.push(HostCall::ResizeView(view, width, height));
        Ok(())
    }

    fn reparent_view(&mut self, view: HostView, parent: ViewParent) -> BackendResult<()> {
        self.log.push(HostCall::ReparentView(view, parent));
        Ok(())
    }

    fn raise_view(&mut self, view: HostView) -> BackendResult<()> {
        self.log.push(HostCall::RaiseView(view));
        Ok(())
    }

    fn lower_view(&mut self, view: HostView) -> BackendResult<()> {
        self.log.push(HostCall::LowerView(view));
        Ok(())
    }

    fn set_view_color(&mut self, view: HostView, color: HostColor) -> BackendResult<()> {
        self.log.push(HostCall::SetViewColor(view, color));
        Ok(())
    }

    fn create_bitmap(&mut self, width: u16, height: u16, depth: u8) -> BackendResult<HostBitmap> {
        let bitmap = HostBitmap(self.next());
        self.log.push(HostCall::CreateBitmap {
            bitmap,
            width,
            height,
            depth,
        });
        Ok(bitmap)
    }

    fn free_bitmap(&mut self, bitmap: HostBitmap) -> BackendResult<()> {
        self.log.push(HostCall::FreeBitmap(bitmap));
        Ok(())
    }

    fn set_drawing_mode(&mut self, view: HostView, mode: DrawingMode) -> BackendResult<()> {
        self.log.push(HostCall::SetDrawingMode(view, mode));
        Ok(())
    }

    fn set_high_color(&mut self, view: HostView, color: HostColor) -> BackendResult<()> {
        self.log.push(HostCall::SetHighColor(view, color));
        Ok(())
    }

    fn set_low_color(&mut self, view: HostView, color: HostColor) -> BackendResult<()> {
        self.log.push(HostCall::SetLowColor(view, color));
        Ok(())
    }

    fn set_pen_size(&mut self, view: HostView, size: f32) -> BackendResult<()> {
        self.log.push(HostCall::SetPenSize(view, size));
        Ok(())
    }

    fn set_line_cap(&mut self, view: HostView, cap: LineCap) -> BackendResult<()> {
        self.log.push(HostCall::SetLineCap(view, cap));
        Ok(())
    }

    fn set_line_join(&mut self, view: HostView, join: LineJoin) -> BackendResult<()> {
        self.log.push(HostCall::SetLineJoin(view, join));
        Ok(())
    }

    fn set_stroke_pattern(&mut self, view: HostView, pattern: &StrokePattern) -> BackendResult<()> {
        self.log
            .push(HostCall::SetStrokePattern(view, pattern.clone()));
        Ok(())
    }

    fn set_fill_rule(&mut self, view: HostView, rule: HostFillRule) -> BackendResult<()> {
        self.log.push(HostCall::SetFillRule(view, rule));
        Ok(())
    }

    fn set_fill_pattern(&mut self, view: HostView, pattern: FillPattern) -> BackendResult<()> {
        self.log.push(HostCall::SetFillPattern(view, pattern));
        Ok(())
    }

    fn set_font(&mut self, view: HostView, font: &HostFont) -> BackendResult<()> {
        self.log.push(HostCall::SetFont(view, font.clone()));
        Ok(())
    }

    fn set_clipping(&mut self, view: HostView, rects: Option<&[Rectangle]>) -> BackendResult<()> {
        self.log
            .push(HostCall::SetClipping(view, rects.map(|r| r.to_vec())));
        Ok(())
    }

    fn set_draw_over_children(&mut self, view: HostView, enabled: bool) -> BackendResult<()> {
        self.log.push(HostCall::SetDrawOverChildren(view, enabled));
        Ok(())
    }

    fn stroke_line(&mut self, view: HostView, from: Point, to: Point) -> BackendResult<()> {
        self.log.push(HostCall::StrokeLine(view, from, to));
        Ok(())
    }

    fn stroke_rect(&mut self, view: HostView, rect: Rectangle) -> BackendResult<()> {
        self.log.push(HostCall::StrokeRect(view, rect));
        Ok(())
    }

    fn fill_rect(&mut self, view: HostView, rect: Rectangle, tone: Tone) -> BackendResult<()> {
        self.log.push(HostCall::FillRect(view, rect, tone));
        Ok(())
    }

    fn stroke_arc(
        &mut self,
        view: HostView,
        bounds: Rectangle,
        start: f32,
        span: f32,
    ) -> BackendResult<()> {
        self.log.push(HostCall::StrokeArc(view, bounds, start, span));
        Ok(())
    }

    fn fill_arc(
        &mut self,
        view: HostView,
        bounds: Rectangle,
        start: f32,
        span: f32,
        pie: bool,
    ) -> BackendResult<()> {
        self.log
            .push(HostCall::FillArc(view, bounds, start, span, pie));
        Ok(())
    }

    fn fill_polygon(&mut self, view: HostView, points: &[Point]) -> BackendResult<()> {
        self.log.push(HostCall::FillPolygon(view, points.to_vec()));
        Ok(())
    }

    fn draw_string(&mut self, view: HostView, origin: Point, text: &str) -> BackendResult<()> {
        self.log
            .push(HostCall::DrawString(view, origin, text.to_string()));
        Ok(())
    }

    fn invalidate(&mut self, view: HostView, rect: Rectangle) -> BackendResult<()> {
        self.log.push(HostCall::Invalidate(view, rect));
        Ok(())
    }

    fn copy_bits(
        &mut self,
        src: HostView,
        dst: HostView,
        src_rect: Rectangle,
        dst_origin: Point,
    ) -> BackendResult<()> {
        self.log
            .push(HostCall::CopyBits(src, dst, src_rect, dst_origin));
        Ok(())
    }

    fn flush(&mut self) -> BackendResult<()> {
        self.log.push(HostCall::Flush);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_shared_after_boxing() {
        let backend = RecordingBackend::new();
        let log = backend.log();
        let mut boxed: Box<dyn Backend> = Box::new(backend);

        let window = boxed
            .create_window(Rectangle::new(0, 0, 10, 10), "t")
            .unwrap();
        boxed.show_window(window).unwrap();

        let calls = log.take();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1], HostCall::ShowWindow(window));
        assert!(log.calls().is_empty());
    }

    #[test]
    fn test_state_change_classification() {
        let view = HostView(3);
        assert!(HostCall::SetPenSize(view, 2.0).is_state_change());
        assert!(!HostCall::StrokeLine(view, Point::new(0, 0), Point::new(1, 1)).is_state_change());
    }
}
