//! The client connection
//!
//! A `Display` is what `XOpenDisplay` hands back: it owns the host backend,
//! the event queue and every client-side table (GCs, fonts, atoms,
//! properties, selections). The drawable registry and the grab/focus state
//! are shared with the host input thread through the `InputSink` given to
//! the backend on open.
//!
//! Entry points are spread over submodules by concern; all of them go
//! through `Display::request`, which stamps failures with the current serial
//! and hands them to the installed error handler before returning them.

pub mod config;
mod draw;
mod events;
mod gc;
mod grab;
mod input;
mod props;
mod window;

pub use config::DisplayConfig;
pub use draw::CoordMode;
pub use events::{Destination, QueuedMode};
pub use grab::PointerInfo;
pub use input::{revert_to, InputSink};
pub use window::{Geometry, SetWindowAttributes, TreeInfo, WindowAttributes, WindowChanges};

use crate::atoms::{AtomTable, PropertyStore, SelectionTable};
use crate::backend::{create_backend, Backend, BackendResult, ScreenInfo};
use crate::colors::{self, XColor, DEFAULT_COLORMAP};
use crate::fonts::FontTable;
use crate::gc::GraphicsContext;
use crate::protocol::*;
use crate::queue::EventQueue;
use crate::resources::{DrawableEntry, DrawableRegistry, WindowRecord, ROOT_WINDOW_ID};
use input::InputState;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Called with every error an entry point reports
pub type ErrorHandler = Box<dyn FnMut(&X11Error) + Send>;

/// An open connection
pub struct Display {
    backend: Box<dyn Backend>,
    registry: Arc<DrawableRegistry>,
    queue: EventQueue,
    /// Kept so the queue always has a live producer
    sink: InputSink,
    input: Arc<Mutex<InputState>>,
    gcs: HashMap<GContext, GraphicsContext>,
    default_gc: GContext,
    fonts: FontTable,
    default_font: Font,
    atoms: AtomTable,
    properties: PropertyStore,
    selections: SelectionTable,
    screen: ScreenInfo,
    config: DisplayConfig,
    error_handler: Option<ErrorHandler>,
    request_depth: usize,
    root: Window,
    opened: Instant,
}

/// Map a host failure during object creation
fn host_alloc(request: &'static str) -> impl FnOnce(Box<dyn std::error::Error + Send + Sync>) -> X11Error {
    move |err| {
        log::warn!("{}: host refused allocation: {}", request, err);
        X11Error::bad_alloc(request)
    }
}

/// Map any other host failure
fn host_failure(request: &'static str) -> impl FnOnce(Box<dyn std::error::Error + Send + Sync>) -> X11Error {
    move |err| {
        log::warn!("{}: host call failed: {}", request, err);
        X11Error::not_implemented(request)
    }
}

fn bad_colormap(colormap: Colormap, request: &'static str) -> X11Error {
    X11Error::new(ErrorCode::Colormap, colormap.id().get(), request)
}

impl Display {
    /// Open a connection on `backend`
    pub fn open(config: DisplayConfig, mut backend: Box<dyn Backend>) -> X11Result<Display> {
        backend.init().map_err(host_failure("XOpenDisplay"))?;
        let mut screen = backend.get_screen_info().map_err(host_failure("XOpenDisplay"))?;
        if let Some((width, height)) = config.screen_size {
            screen.width = width;
            screen.height = height;
        }

        let registry = Arc::new(DrawableRegistry::new());
        let root = Window::new(ROOT_WINDOW_ID);
        let mut root_record = WindowRecord::new(
            Window::NONE,
            Rectangle::new(0, 0, screen.width, screen.height),
            0,
            screen.root_depth,
        );
        root_record.mapped = true;
        root_record.background_pixel = Some(screen.black_pixel);
        registry.add_reserved(root.id(), DrawableEntry::Window(root_record));

        let (queue, sender) = EventQueue::new();
        let input = Arc::new(Mutex::new(InputState::new(root)));
        let sink = InputSink::new(Arc::clone(&registry), sender, Arc::clone(&input), root);
        backend.attach_input(sink.clone());

        let mut fonts = FontTable::new();
        let default_font = Font(registry.allocate_id());
        fonts.load(default_font, "fixed")?;

        let default_gc = GContext(registry.allocate_id());
        let mut gc = GraphicsContext::new(default_gc);
        gc.set_font(default_font);
        gc.set_foreground(screen.black_pixel);
        gc.set_background(screen.white_pixel);
        let mut gcs = HashMap::new();
        gcs.insert(default_gc, gc);

        log::info!(
            "opened display {} ({}x{}, depth {})",
            config.display_name,
            screen.width,
            screen.height,
            screen.root_depth
        );

        Ok(Display {
            backend,
            registry,
            queue,
            sink,
            input,
            gcs,
            default_gc,
            fonts,
            default_font,
            atoms: AtomTable::new(),
            properties: PropertyStore::new(),
            selections: SelectionTable::new(),
            screen,
            config,
            error_handler: None,
            request_depth: 0,
            root,
            opened: Instant::now(),
        })
    }

    /// Open a connection on a backend chosen by name
    pub fn open_backend(config: DisplayConfig, name: &str) -> X11Result<Display> {
        let backend = create_backend(name).ok_or_else(|| {
            log::warn!("unknown backend {:?}", name);
            X11Error::bad_name("XOpenDisplay")
        })?;
        Self::open(config, backend)
    }

    /// Tear down every client window and pixmap, then flush
    pub fn close(mut self) {
        let top_levels = self
            .registry
            .get_window(self.root)
            .map(|r| r.children)
            .unwrap_or_default();
        // failures have already gone through the error handler
        for window in top_levels.into_iter().rev() {
            if let Err(err) = self.destroy_window(window) {
                log::debug!("close: {}", err);
            }
        }
        for pixmap in self.registry.pixmaps() {
            if let Err(err) = self.free_pixmap(pixmap) {
                log::debug!("close: {}", err);
            }
        }
        if let Err(err) = self.backend.flush() {
            log::warn!("flush on close failed: {}", err);
        }
        log::info!("closed display {}", self.config.display_name);
    }

    /// Run one entry point, reporting its failure if it is the outermost
    fn request<T, F>(&mut self, f: F) -> X11Result<T>
    where
        F: FnOnce(&mut Self) -> X11Result<T>,
    {
        self.request_depth += 1;
        let result = f(self);
        self.request_depth -= 1;
        if self.request_depth > 0 {
            return result;
        }
        match result {
            Ok(value) => {
                if self.config.synchronous {
                    if let Err(err) = self.backend.sync() {
                        log::warn!("host sync failed: {}", err);
                    }
                }
                Ok(value)
            }
            Err(err) => {
                let err = err.with_serial(self.queue.last_serial());
                self.report(&err);
                Err(err)
            }
        }
    }

    fn report(&mut self, err: &X11Error) {
        match self.error_handler.as_mut() {
            Some(handler) => handler(err),
            None => log::warn!("{}", err),
        }
    }

    /// Install an error handler, returning the previous one.
    ///
    /// `None` restores the default, which logs the error.
    pub fn set_error_handler(&mut self, handler: Option<ErrorHandler>) -> Option<ErrorHandler> {
        std::mem::replace(&mut self.error_handler, handler)
    }

    fn lock_input(&self) -> MutexGuard<'_, InputState> {
        self.input.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Milliseconds since the connection opened
    fn now(&self) -> Timestamp {
        Timestamp::new(self.opened.elapsed().as_millis() as u32)
    }

    fn window_record(&self, window: Window, request: &'static str) -> X11Result<WindowRecord> {
        self.registry
            .get_window(window)
            .ok_or_else(|| X11Error::bad_window(window, request))
    }

    /// Windows a structure event about `window` is reported on: the window
    /// itself for StructureNotify, its parent for SubstructureNotify
    fn structure_targets(&self, window: Window, record: &WindowRecord) -> Vec<Window> {
        let mut targets = Vec::new();
        if record.event_mask & event_mask::STRUCTURE_NOTIFY != 0 {
            targets.push(window);
        }
        let parent_selects = self
            .registry
            .get_window(record.parent)
            .map(|p| p.event_mask & event_mask::SUBSTRUCTURE_NOTIFY != 0)
            .unwrap_or(false);
        if parent_selects {
            targets.push(record.parent);
        }
        targets
    }

    fn queue_event(&mut self, event: Event) {
        log::trace!("queue {:?}", event.event_type());
        self.queue.add(event, false);
    }

    /// Queue an Expose for `rect` if the window selects it and no queued
    /// Expose for the window already covers it
    fn queue_expose(&mut self, window: Window, rect: Rectangle) {
        let Some(record) = self.registry.get_window(window) else {
            return;
        };
        if rect.is_empty()
            || record.class == WindowClass::InputOnly
            || record.event_mask & event_mask::EXPOSURE == 0
        {
            return;
        }
        if self.config.coalesce_expose {
            self.queue.drain_pending();
            let covered = self.queue.iter().any(|e| match e {
                Event::Expose(x) => x.window == window && x.rectangle().contains(&rect),
                _ => false,
            });
            if covered {
                log::trace!("expose {:?} on {} already queued", rect, window);
                return;
            }
        }
        self.queue_event(Event::Expose(ExposeEvent {
            serial: 0,
            send_event: false,
            window,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            count: 0,
        }));
    }

    /// Drop grabs and focus held by a window that is going away
    fn release_input(&mut self, window: Window, parent: Window) {
        let mut input = self.lock_input();
        if input.pointer_grab.map(|g| g.window) == Some(window) {
            input.pointer_grab = None;
        }
        if input.keyboard_grab.map(|g| g.window) == Some(window) {
            input.keyboard_grab = None;
        }
        if input.focus == window {
            input.focus = match input.revert_to {
                revert_to::PARENT => parent,
                revert_to::POINTER_ROOT => self.root,
                _ => Window::NONE,
            };
        }
        if input.pointer_window == window {
            input.pointer_window = self.root;
        }
    }

    // Connection information

    pub fn display_string(&self) -> &str {
        &self.config.display_name
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// A handle for feeding host input, usable from any thread
    pub fn input_sink(&self) -> InputSink {
        self.sink.clone()
    }

    pub fn protocol_version(&self) -> u16 {
        PROTOCOL_MAJOR_VERSION
    }

    pub fn protocol_revision(&self) -> u16 {
        PROTOCOL_MINOR_VERSION
    }

    pub fn default_screen(&self) -> usize {
        0
    }

    pub fn screen_count(&self) -> usize {
        1
    }

    pub fn screen(&self) -> &ScreenInfo {
        &self.screen
    }

    pub fn root_window(&self) -> Window {
        self.root
    }

    pub fn display_width(&self) -> u16 {
        self.screen.width
    }

    pub fn display_height(&self) -> u16 {
        self.screen.height
    }

    pub fn default_depth(&self) -> u8 {
        self.screen.root_depth
    }

    pub fn default_visual(&self) -> VisualID {
        self.screen.root_visual
    }

    pub fn black_pixel(&self) -> u32 {
        self.screen.black_pixel
    }

    pub fn white_pixel(&self) -> u32 {
        self.screen.white_pixel
    }

    pub fn default_colormap(&self) -> Colormap {
        DEFAULT_COLORMAP
    }

    // Colors

    fn check_colormap(colormap: Colormap, request: &'static str) -> X11Result<()> {
        if colormap == DEFAULT_COLORMAP {
            Ok(())
        } else {
            Err(bad_colormap(colormap, request))
        }
    }

    pub fn parse_color(&mut self, colormap: Colormap, spec: &str) -> X11Result<XColor> {
        self.request(|_| {
            Self::check_colormap(colormap, "XParseColor")?;
            colors::parse_color(spec)
        })
    }

    /// Allocate the closest pixel, rewriting `color` to what the visual shows
    pub fn alloc_color(&mut self, colormap: Colormap, color: &mut XColor) -> X11Result<()> {
        self.request(|_| {
            Self::check_colormap(colormap, "XAllocColor")?;
            colors::alloc_color(color);
            Ok(())
        })
    }

    /// `(screen, exact)` for a color name
    pub fn alloc_named_color(&mut self, colormap: Colormap, name: &str) -> X11Result<(XColor, XColor)> {
        self.request(|_| {
            Self::check_colormap(colormap, "XAllocNamedColor")?;
            colors::alloc_named_color(name)
        })
    }

    /// `(exact, screen)` for a color name
    pub fn lookup_color(&mut self, colormap: Colormap, name: &str) -> X11Result<(XColor, XColor)> {
        self.request(|_| {
            Self::check_colormap(colormap, "XLookupColor")?;
            colors::lookup_color(name)
        })
    }

    /// Fill in the channels of `color.pixel`
    pub fn query_color(&mut self, colormap: Colormap, color: &mut XColor) -> X11Result<()> {
        self.request(|_| {
            Self::check_colormap(colormap, "XQueryColor")?;
            *color = colors::query_color(color.pixel);
            Ok(())
        })
    }

    pub fn query_colors(&mut self, colormap: Colormap, defs: &mut [XColor]) -> X11Result<()> {
        self.request(|_| {
            Self::check_colormap(colormap, "XQueryColors")?;
            for color in defs.iter_mut() {
                *color = colors::query_color(color.pixel);
            }
            Ok(())
        })
    }

    /// TrueColor pixels are never really allocated
    pub fn free_colors(&mut self, colormap: Colormap, pixels: &[u32]) -> X11Result<()> {
        self.request(|_| {
            Self::check_colormap(colormap, "XFreeColors")?;
            log::trace!("free {} colors", pixels.len());
            Ok(())
        })
    }
}

/// Surface host results that have no X error of their own
fn log_host(result: BackendResult<()>, what: &str) {
    if let Err(err) = result {
        log::warn!("host {} failed: {}", what, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::null::NullBackend;

    fn open() -> Display {
        Display::open(DisplayConfig::default(), Box::new(NullBackend::new())).unwrap()
    }

    #[test]
    fn test_open_registers_root() {
        let display = open();
        let root = display.root_window();
        assert_eq!(root, Window::new(ROOT_WINDOW_ID));
        let record = display.registry.get_window(root).unwrap();
        assert!(record.mapped);
        assert_eq!(record.width, display.display_width());
    }

    #[test]
    fn test_screen_size_override() {
        let config = DisplayConfig::default().with_screen_size(640, 480);
        let display = Display::open(config, Box::new(NullBackend::new())).unwrap();
        assert_eq!(display.display_width(), 640);
        assert_eq!(display.display_height(), 480);
    }

    #[test]
    fn test_unknown_backend() {
        let err = Display::open_backend(DisplayConfig::default(), "carrier-pigeon").err().unwrap();
        assert_eq!(err.code, ErrorCode::Name);
    }

    #[test]
    fn test_error_handler_sees_failures() {
        let mut display = open();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        display.set_error_handler(Some(Box::new(move |err: &X11Error| {
            sink.lock().unwrap().push(err.code);
        })));
        let bogus = Window::new(0xdead);
        assert!(display.map_window(bogus).is_err());
        assert!(display.destroy_window(bogus).is_err());
        assert_eq!(*seen.lock().unwrap(), vec![ErrorCode::Window, ErrorCode::Window]);
    }

    #[test]
    fn test_nested_failure_reported_once() {
        let mut display = open();
        let count = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&count);
        display.set_error_handler(Some(Box::new(move |_: &X11Error| {
            *counter.lock().unwrap() += 1;
        })));
        // map_raised runs configure and map as nested requests
        assert!(display.map_raised(Window::new(0xdead)).is_err());
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_foreign_colormap_rejected() {
        let mut display = open();
        let err = display.parse_color(Colormap::new(0x99), "red").unwrap_err();
        assert_eq!(err.code, ErrorCode::Colormap);
        let cmap = display.default_colormap();
        let color = display.parse_color(cmap, "red").unwrap();
        assert_eq!(color.red, 0xffff);
    }

    #[test]
    fn test_close_tears_down_windows_and_pixmaps() {
        use crate::backend::recording::{HostCall, RecordingBackend};

        let backend = RecordingBackend::new();
        let log = backend.log();
        let mut display = Display::open(DisplayConfig::default(), Box::new(backend)).unwrap();
        let root = display.root_window();
        let top = display.create_simple_window(root, 0, 0, 10, 10, 0, 0, 0).unwrap();
        display.create_simple_window(top, 0, 0, 5, 5, 0, 0, 0).unwrap();
        display.create_pixmap(top.id(), 4, 4, 1).unwrap();

        display.close();
        assert_eq!(log.count(|c| matches!(c, HostCall::DestroyWindow(_))), 1);
        assert_eq!(log.count(|c| matches!(c, HostCall::FreeBitmap(_))), 1);
    }
}
