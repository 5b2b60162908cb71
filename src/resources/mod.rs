//! Drawable registry
//!
//! Maps window and pixmap XIDs to the host objects that back them. The
//! registry is shared between the client thread, which creates and mutates
//! drawables, and the host input thread, which resolves host views back to
//! windows. A single `RwLock` guards it: lookups from either side proceed
//! concurrently, mutation is exclusive.

use crate::backend::{HostBitmap, HostView, HostWindow};
use crate::gc::AppliedState;
use crate::protocol::*;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// First XID handed to client resources; lower IDs are reserved
pub const FIRST_CLIENT_ID: u32 = 0x200;

/// The root window's reserved ID
pub const ROOT_WINDOW_ID: u32 = 1;

/// How a window is represented on the host side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAttachment {
    /// The screen itself; no host object
    Root,
    /// A child of the root: its own host window with a content view
    TopLevel { window: HostWindow, view: HostView },
    /// Any deeper window: a view nested in its parent's view
    Embedded { view: HostView },
}

impl HostAttachment {
    pub fn view(&self) -> Option<HostView> {
        match self {
            HostAttachment::Root => None,
            HostAttachment::TopLevel { view, .. } | HostAttachment::Embedded { view } => {
                Some(*view)
            }
        }
    }

    pub fn host_window(&self) -> Option<HostWindow> {
        match self {
            HostAttachment::TopLevel { window, .. } => Some(*window),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WindowRecord {
    pub parent: Window,
    /// Stacking order, bottom-most first
    pub children: Vec<Window>,
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
    pub border_width: u16,
    pub depth: u8,
    pub class: WindowClass,
    pub mapped: bool,
    pub event_mask: u32,
    pub do_not_propagate: u32,
    pub override_redirect: bool,
    pub background_pixel: Option<u32>,
    pub border_pixel: u32,
    pub host: HostAttachment,
    pub applied: AppliedState,
}

impl WindowRecord {
    pub fn new(parent: Window, geometry: Rectangle, border_width: u16, depth: u8) -> Self {
        WindowRecord {
            parent,
            children: Vec::new(),
            x: geometry.x,
            y: geometry.y,
            width: geometry.width,
            height: geometry.height,
            border_width,
            depth,
            class: WindowClass::InputOutput,
            mapped: false,
            event_mask: 0,
            do_not_propagate: 0,
            override_redirect: false,
            background_pixel: None,
            border_pixel: 0,
            host: HostAttachment::Root,
            applied: AppliedState::default(),
        }
    }

    /// Window-local bounds, origin at (0, 0)
    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(0, 0, self.width, self.height)
    }

    /// Interior rectangle in the parent's host view, inside the border
    pub fn host_frame(&self) -> Rectangle {
        let bw = self.border_width as i16;
        Rectangle::new(
            self.x.saturating_add(bw),
            self.y.saturating_add(bw),
            self.width,
            self.height,
        )
    }
}

#[derive(Debug, Clone)]
pub struct PixmapRecord {
    pub width: u16,
    pub height: u16,
    pub depth: u8,
    pub bitmap: HostBitmap,
    /// View attached to the bitmap, used as the drawing target
    pub view: HostView,
    pub applied: AppliedState,
}

impl PixmapRecord {
    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(0, 0, self.width, self.height)
    }
}

#[derive(Debug, Clone)]
pub enum DrawableEntry {
    Window(WindowRecord),
    Pixmap(PixmapRecord),
}

impl DrawableEntry {
    pub fn view(&self) -> Option<HostView> {
        match self {
            DrawableEntry::Window(w) => w.host.view(),
            DrawableEntry::Pixmap(p) => Some(p.view),
        }
    }

    pub fn applied(&self) -> &AppliedState {
        match self {
            DrawableEntry::Window(w) => &w.applied,
            DrawableEntry::Pixmap(p) => &p.applied,
        }
    }

    pub fn applied_mut(&mut self) -> &mut AppliedState {
        match self {
            DrawableEntry::Window(w) => &mut w.applied,
            DrawableEntry::Pixmap(p) => &mut p.applied,
        }
    }

    pub fn depth(&self) -> u8 {
        match self {
            DrawableEntry::Window(w) => w.depth,
            DrawableEntry::Pixmap(p) => p.depth,
        }
    }

    pub fn bounds(&self) -> Rectangle {
        match self {
            DrawableEntry::Window(w) => w.bounds(),
            DrawableEntry::Pixmap(p) => p.bounds(),
        }
    }
}

#[derive(Debug)]
struct RegistryInner {
    next_id: u32,
    entries: HashMap<XID, DrawableEntry>,
    views: HashMap<HostView, XID>,
}

impl RegistryInner {
    fn index(&mut self, id: XID, entry: &DrawableEntry) {
        if let Some(view) = entry.view() {
            self.views.insert(view, id);
        }
    }
}

/// Thread-safe XID to drawable mapping
#[derive(Debug)]
pub struct DrawableRegistry {
    inner: RwLock<RegistryInner>,
}

impl Default for DrawableRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawableRegistry {
    pub fn new() -> Self {
        DrawableRegistry {
            inner: RwLock::new(RegistryInner {
                next_id: FIRST_CLIENT_ID,
                entries: HashMap::new(),
                views: HashMap::new(),
            }),
        }
    }

    fn read_inner(&self) -> RwLockReadGuard<'_, RegistryInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_inner(&self) -> RwLockWriteGuard<'_, RegistryInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a drawable under a fresh ID
    pub fn add(&self, entry: DrawableEntry) -> XID {
        let mut inner = self.write_inner();
        let id = XID::new(inner.next_id);
        inner.next_id += 1;
        inner.index(id, &entry);
        inner.entries.insert(id, entry);
        log::debug!("registered drawable {}", id);
        id
    }

    /// Register a drawable under a reserved ID below the client range
    pub fn add_reserved(&self, id: XID, entry: DrawableEntry) {
        debug_assert!(id.get() < FIRST_CLIENT_ID);
        let mut inner = self.write_inner();
        inner.index(id, &entry);
        inner.entries.insert(id, entry);
    }

    /// Draw an ID for a non-drawable resource from the same counter
    pub fn allocate_id(&self) -> XID {
        let mut inner = self.write_inner();
        let id = XID::new(inner.next_id);
        inner.next_id += 1;
        id
    }

    pub fn get(&self, id: XID) -> Option<Drawable> {
        self.read_inner().entries.get(&id).map(|entry| match entry {
            DrawableEntry::Window(_) => Drawable::Window(Window(id)),
            DrawableEntry::Pixmap(_) => Drawable::Pixmap(Pixmap(id)),
        })
    }

    pub fn contains(&self, id: XID) -> bool {
        self.read_inner().entries.contains_key(&id)
    }

    pub fn get_window(&self, window: Window) -> Option<WindowRecord> {
        match self.read_inner().entries.get(&window.id()) {
            Some(DrawableEntry::Window(w)) => Some(w.clone()),
            _ => None,
        }
    }

    pub fn get_pixmap(&self, pixmap: Pixmap) -> Option<PixmapRecord> {
        match self.read_inner().entries.get(&pixmap.id()) {
            Some(DrawableEntry::Pixmap(p)) => Some(p.clone()),
            _ => None,
        }
    }

    /// Mutate a window record in place; `None` if it is not a window
    pub fn update_window<R, F>(&self, window: Window, f: F) -> Option<R>
    where
        F: FnOnce(&mut WindowRecord) -> R,
    {
        let mut inner = self.write_inner();
        let result = match inner.entries.get_mut(&window.id()) {
            Some(DrawableEntry::Window(w)) => f(w),
            _ => return None,
        };
        // the host attachment may have changed
        let view = match inner.entries.get(&window.id()) {
            Some(entry) => entry.view(),
            None => None,
        };
        inner.views.retain(|_, id| *id != window.id());
        if let Some(view) = view {
            inner.views.insert(view, window.id());
        }
        Some(result)
    }

    /// Mutate any drawable's entry
    pub fn update<R, F>(&self, id: XID, f: F) -> Option<R>
    where
        F: FnOnce(&mut DrawableEntry) -> R,
    {
        self.write_inner().entries.get_mut(&id).map(f)
    }

    /// Drop the mapping; host teardown is the caller's job
    pub fn erase(&self, id: XID) -> Option<DrawableEntry> {
        let mut inner = self.write_inner();
        let entry = inner.entries.remove(&id)?;
        if let Some(view) = entry.view() {
            inner.views.remove(&view);
        }
        log::debug!("erased drawable {}", id);
        Some(entry)
    }

    pub fn window_for_view(&self, view: HostView) -> Option<Window> {
        let inner = self.read_inner();
        let id = inner.views.get(&view)?;
        match inner.entries.get(id) {
            Some(DrawableEntry::Window(_)) => Some(Window(*id)),
            _ => None,
        }
    }

    /// Hold the read lock across several lookups
    pub fn read(&self) -> RegistryView<'_> {
        RegistryView {
            guard: self.read_inner(),
        }
    }

    pub fn len(&self) -> usize {
        self.read_inner().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every registered window ID
    pub fn windows(&self) -> Vec<Window> {
        self.read_inner()
            .entries
            .iter()
            .filter_map(|(id, entry)| match entry {
                DrawableEntry::Window(_) => Some(Window(*id)),
                DrawableEntry::Pixmap(_) => None,
            })
            .collect()
    }

    /// Every registered pixmap ID
    pub fn pixmaps(&self) -> Vec<Pixmap> {
        self.read_inner()
            .entries
            .iter()
            .filter_map(|(id, entry)| match entry {
                DrawableEntry::Pixmap(_) => Some(Pixmap(*id)),
                DrawableEntry::Window(_) => None,
            })
            .collect()
    }
}

/// A consistent read-only view of the registry
pub struct RegistryView<'a> {
    guard: RwLockReadGuard<'a, RegistryInner>,
}

impl RegistryView<'_> {
    pub fn get(&self, id: XID) -> Option<&DrawableEntry> {
        self.guard.entries.get(&id)
    }

    pub fn window(&self, window: Window) -> Option<&WindowRecord> {
        match self.guard.entries.get(&window.id()) {
            Some(DrawableEntry::Window(w)) => Some(w),
            _ => None,
        }
    }

    pub fn pixmap(&self, pixmap: Pixmap) -> Option<&PixmapRecord> {
        match self.guard.entries.get(&pixmap.id()) {
            Some(DrawableEntry::Pixmap(p)) => Some(p),
            _ => None,
        }
    }

    pub fn window_for_view(&self, view: HostView) -> Option<Window> {
        let id = self.guard.views.get(&view)?;
        self.window(Window(*id)).map(|_| Window(*id))
    }

    /// The window promoted to `host` top-level
    pub fn window_for_host_window(&self, host: HostWindow) -> Option<Window> {
        self.guard.entries.iter().find_map(|(id, entry)| match entry {
            DrawableEntry::Window(w) if w.host.host_window() == Some(host) => Some(Window(*id)),
            _ => None,
        })
    }

    /// Ancestors from the parent up to and including the root
    pub fn ancestors(&self, window: Window) -> Vec<Window> {
        let mut chain = Vec::new();
        let mut current = window;
        while let Some(record) = self.window(current) {
            if record.parent == Window::NONE {
                break;
            }
            chain.push(record.parent);
            current = record.parent;
        }
        chain
    }

    /// Position of the window's origin in root coordinates
    pub fn root_origin(&self, window: Window) -> (i32, i32) {
        let mut x = 0i32;
        let mut y = 0i32;
        let mut current = window;
        while let Some(record) = self.window(current) {
            if record.parent == Window::NONE {
                break;
            }
            x += record.x as i32 + record.border_width as i32;
            y += record.y as i32 + record.border_width as i32;
            current = record.parent;
        }
        (x, y)
    }

    /// Mapped, and every ancestor mapped up to the root
    pub fn is_viewable(&self, window: Window) -> bool {
        let mut current = window;
        loop {
            match self.window(current) {
                Some(record) if record.parent == Window::NONE => return true,
                Some(record) if record.mapped => current = record.parent,
                _ => return false,
            }
        }
    }

    /// Topmost mapped child of `window` whose outer frame contains the
    /// window-local point
    pub fn child_at(&self, window: Window, x: i32, y: i32) -> Option<Window> {
        let record = self.window(window)?;
        for child in record.children.iter().rev() {
            let Some(c) = self.window(*child) else {
                continue;
            };
            if !c.mapped {
                continue;
            }
            let outer = Rectangle::new(
                c.x,
                c.y,
                c.width.saturating_add(2 * c.border_width),
                c.height.saturating_add(2 * c.border_width),
            );
            if outer.contains_point(x, y) {
                return Some(*child);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_entry(parent: Window) -> DrawableEntry {
        DrawableEntry::Window(WindowRecord::new(parent, Rectangle::new(0, 0, 10, 10), 0, 24))
    }

    #[test]
    fn test_ids_start_above_reserved_range() {
        let registry = DrawableRegistry::new();
        let id = registry.add(window_entry(Window::new(ROOT_WINDOW_ID)));
        assert_eq!(id, XID::new(FIRST_CLIENT_ID));
    }

    #[test]
    fn test_ids_never_reused() {
        let registry = DrawableRegistry::new();
        let a = registry.add(window_entry(Window::NONE));
        registry.erase(a);
        let gc = registry.allocate_id();
        let b = registry.add(window_entry(Window::NONE));
        assert!(gc > a);
        assert!(b > gc);
        assert!(registry.get(a).is_none());
    }

    #[test]
    fn test_variant_narrowing() {
        let registry = DrawableRegistry::new();
        let id = registry.add(DrawableEntry::Pixmap(PixmapRecord {
            width: 4,
            height: 4,
            depth: 24,
            bitmap: HostBitmap(1),
            view: HostView(2),
            applied: AppliedState::default(),
        }));
        assert_eq!(registry.get(id), Some(Drawable::Pixmap(Pixmap(id))));
        assert!(registry.get_window(Window(id)).is_none());
        assert!(registry.get_pixmap(Pixmap(id)).is_some());
        // pixmap views never resolve to windows
        assert_eq!(registry.window_for_view(HostView(2)), None);
    }

    #[test]
    fn test_view_index_follows_updates() {
        let registry = DrawableRegistry::new();
        let id = registry.add(window_entry(Window::NONE));
        let window = Window(id);
        registry.update_window(window, |w| {
            w.host = HostAttachment::Embedded { view: HostView(7) };
        });
        assert_eq!(registry.window_for_view(HostView(7)), Some(window));
        registry.update_window(window, |w| {
            w.host = HostAttachment::Embedded { view: HostView(8) };
        });
        assert_eq!(registry.window_for_view(HostView(7)), None);
        assert_eq!(registry.window_for_view(HostView(8)), Some(window));
        registry.erase(id);
        assert_eq!(registry.window_for_view(HostView(8)), None);
    }

    #[test]
    fn test_root_origin_and_viewable() {
        let registry = DrawableRegistry::new();
        let root = Window::new(ROOT_WINDOW_ID);
        let mut root_record = WindowRecord::new(Window::NONE, Rectangle::new(0, 0, 800, 600), 0, 24);
        root_record.mapped = true;
        registry.add_reserved(root.id(), DrawableEntry::Window(root_record));

        let mut top = WindowRecord::new(root, Rectangle::new(10, 20, 100, 100), 1, 24);
        top.mapped = true;
        let top = Window(registry.add(DrawableEntry::Window(top)));
        let child = Window(registry.add(DrawableEntry::Window(WindowRecord::new(
            top,
            Rectangle::new(5, 5, 10, 10),
            0,
            24,
        ))));

        let view = registry.read();
        assert_eq!(view.root_origin(child), (16, 26));
        assert_eq!(view.ancestors(child), vec![top, root]);
        assert!(view.is_viewable(top));
        assert!(!view.is_viewable(child));
    }
}
