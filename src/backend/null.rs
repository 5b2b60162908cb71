//! Null Backend - Minimal host for headless use
//!
//! This backend accepts all commands but doesn't perform any actual rendering.
//! Handles are allocated from a single counter so that windows, views and
//! bitmaps never collide.

use super::*;
use crate::protocol::*;

pub struct NullBackend {
    next_handle: usize,
    screen_width: u16,
    screen_height: u16,
}

impl NullBackend {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            screen_width: 1920,
            screen_height: 1080,
        }
    }

    pub fn with_screen_size(mut self, width: u16, height: u16) -> Self {
        self.screen_width = width;
        self.screen_height = height;
        self
    }

    fn next(&mut self) -> usize {
        let id = self.next_handle;
        self.next_handle += 1;
        id
    }
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for NullBackend {
    fn init(&mut self) -> BackendResult<()> {
        Ok(())
    }

    fn get_screen_info(&self) -> BackendResult<ScreenInfo> {
        Ok(ScreenInfo {
            width: self.screen_width,
            height: self.screen_height,
            width_mm: (self.screen_width as u32 * 254 / 960) as u16,
            height_mm: (self.screen_height as u32 * 254 / 960) as u16,
            root_visual: VisualID::new(0x21),
            root_depth: 24,
            white_pixel: 0xFFFFFF,
            black_pixel: 0x000000,
        })
    }

    fn create_window(&mut self, _frame: Rectangle, _title: &str) -> BackendResult<HostWindow> {
        Ok(HostWindow(self.next()))
    }

    fn destroy_window(&mut self, _window: HostWindow) -> BackendResult<()> {
        Ok(())
    }

    fn show_window(&mut self, _window: HostWindow) -> BackendResult<()> {
        Ok(())
    }

    fn hide_window(&mut self, _window: HostWindow) -> BackendResult<()> {
        Ok(())
    }

    fn move_window(&mut self, _window: HostWindow, _x: i16, _y: i16) -> BackendResult<()> {
        Ok(())
    }

    fn resize_window(&mut self, _window: HostWindow, _width: u16, _height: u16) -> BackendResult<()> {
        Ok(())
    }

    fn raise_window(&mut self, _window: HostWindow) -> BackendResult<()> {
        Ok(())
    }

    fn lower_window(&mut self, _window: HostWindow) -> BackendResult<()> {
        Ok(())
    }

    fn set_window_title(&mut self, _window: HostWindow, _title: &str) -> BackendResult<()> {
        Ok(())
    }

    fn create_view(&mut self, _parent: ViewParent, _frame: Rectangle) -> BackendResult<HostView> {
        Ok(HostView(self.next()))
    }

    fn remove_view(&mut self, _view: HostView) -> BackendResult<()> {
        Ok(())
    }

    fn show_view(&mut self, _view: HostView) -> BackendResult<()> {
        Ok(())
    }

    fn hide_view(&mut self, _view: HostView) -> BackendResult<()> {
        Ok(())
    }

    fn move_view(&mut self, _view: HostView, _x: i16, _y: i16) -> BackendResult<()> {
        Ok(())
    }

    fn resize_view(&mut self, _view: HostView, _width: u16, _height: u16) -> BackendResult<()> {
        Ok(())
    }

    fn reparent_view(&mut self, _view: HostView, _parent: ViewParent) -> BackendResult<()> {
        Ok(())
    }

    fn raise_view(&mut self, _view: HostView) -> BackendResult<()> {
        Ok(())
    }

    fn lower_view(&mut self, _view: HostView) -> BackendResult<()> {
        Ok(())
    }

    fn set_view_color(&mut self, _view: HostView, _color: HostColor) -> BackendResult<()> {
        Ok(())
    }

    fn create_bitmap(&mut self, _width: u16, _height: u16, _depth: u8) -> BackendResult<HostBitmap> {
        Ok(HostBitmap(self.next()))
    }

    fn free_bitmap(&mut self, _bitmap: HostBitmap) -> BackendResult<()> {
        Ok(())
    }

    fn set_drawing_mode(&mut self, _view: HostView, _mode: DrawingMode) -> BackendResult<()> {
        Ok(())
    }

    fn set_high_color(&mut self, _view: HostView, _color: HostColor) -> BackendResult<()> {
        Ok(())
    }

    fn set_low_color(&mut self, _view: HostView, _color: HostColor) -> BackendResult<()> {
        Ok(())
    }

    fn set_pen_size(&mut self, _view: HostView, _size: f32) -> BackendResult<()> {
        Ok(())
    }

    fn set_line_cap(&mut self, _view: HostView, _cap: LineCap) -> BackendResult<()> {
        Ok(())
    }

    fn set_line_join(&mut self, _view: HostView, _join: LineJoin) -> BackendResult<()> {
        Ok(())
    }

    fn set_stroke_pattern(&mut self, _view: HostView, _pattern: &StrokePattern) -> BackendResult<()> {
        Ok(())
    }

    fn set_fill_rule(&mut self, _view: HostView, _rule: HostFillRule) -> BackendResult<()> {
        Ok(())
    }

    fn set_fill_pattern(&mut self, _view: HostView, _pattern: FillPattern) -> BackendResult<()> {
        Ok(())
    }

    fn set_font(&mut self, _view: HostView, _font: &HostFont) -> BackendResult<()> {
        Ok(())
    }

    fn set_clipping(&mut self, _view: HostView, _rects: Option<&[Rectangle]>) -> BackendResult<()> {
        Ok(())
    }

    fn set_draw_over_children(&mut self, _view: HostView, _enabled: bool) -> BackendResult<()> {
        Ok(())
    }

    fn stroke_line(&mut self, _view: HostView, _from: Point, _to: Point) -> BackendResult<()> {
        Ok(())
    }

    fn stroke_rect(&mut self, _view: HostView, _rect: Rectangle) -> BackendResult<()> {
        Ok(())
    }

    fn fill_rect(&mut self, _view: HostView, _rect: Rectangle, _tone: Tone) -> BackendResult<()> {
        Ok(())
    }

    fn stroke_arc(
        &mut self,
        _view: HostView,
        _bounds: Rectangle,
        _start: f32,
        _span: f32,
    ) -> BackendResult<()> {
        Ok(())
    }

    fn fill_arc(
        &mut self,
        _view: HostView,
        _bounds: Rectangle,
        _start: f32,
        _span: f32,
        _pie: bool,
    ) -> BackendResult<()> {
        Ok(())
    }

    fn fill_polygon(&mut self, _view: HostView, _points: &[Point]) -> BackendResult<()> {
        Ok(())
    }

    fn draw_string(&mut self, _view: HostView, _origin: Point, _text: &str) -> BackendResult<()> {
        Ok(())
    }

    fn invalidate(&mut self, _view: HostView, _rect: Rectangle) -> BackendResult<()> {
        Ok(())
    }

    fn copy_bits(
        &mut self,
        _src: HostView,
        _dst: HostView,
        _src_rect: Rectangle,
        _dst_origin: Point,
    ) -> BackendResult<()> {
        Ok(())
    }

    fn flush(&mut self) -> BackendResult<()> {
        Ok(())
    }
}
