//! Window and geometry requests
//!
//! A child of the root is promoted to a host top-level window with a
//! content view; every deeper window is a view nested in its parent's view.
//! Reparenting converts between the two. Structure changes are reported as
//! events following the X11 mask rules: StructureNotify on the window
//! itself, SubstructureNotify on its parent.

use super::{host_alloc, host_failure, log_host, Display};
use crate::atoms::PropMode;
use crate::backend::{HostColor, ViewParent};
use crate::protocol::*;
use crate::resources::{DrawableEntry, HostAttachment, WindowRecord};

/// Attributes accepted by `create_window` and `change_window_attributes`;
/// `None` leaves the attribute alone
#[derive(Debug, Clone, Default)]
pub struct SetWindowAttributes {
    pub background_pixel: Option<u32>,
    pub border_pixel: Option<u32>,
    pub event_mask: Option<u32>,
    pub do_not_propagate_mask: Option<u32>,
    pub override_redirect: Option<bool>,
}

/// `XGetWindowAttributes`
#[derive(Debug, Clone, PartialEq)]
pub struct WindowAttributes {
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
    pub border_width: u16,
    pub depth: u8,
    pub class: WindowClass,
    pub map_state: MapState,
    pub override_redirect: bool,
    pub your_event_mask: u32,
    pub do_not_propagate_mask: u32,
    pub root: Window,
    pub colormap: Colormap,
}

/// `XGetGeometry`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub root: Window,
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
    pub border_width: u16,
    pub depth: u8,
}

/// `XQueryTree`; children bottom-most first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeInfo {
    pub root: Window,
    pub parent: Window,
    pub children: Vec<Window>,
}

/// `XConfigureWindow` changes; `None` leaves the component alone
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowChanges {
    pub x: Option<i16>,
    pub y: Option<i16>,
    pub width: Option<u16>,
    pub height: Option<u16>,
    pub border_width: Option<u16>,
    pub sibling: Option<Window>,
    pub stack_mode: Option<StackMode>,
}

/// Rectangle including the border, in parent coordinates
fn outer_frame(record: &WindowRecord) -> Rectangle {
    Rectangle::new(
        record.x,
        record.y,
        record.width.saturating_add(2 * record.border_width),
        record.height.saturating_add(2 * record.border_width),
    )
}

enum Placement {
    Stay,
    Top,
    Bottom,
    AboveOf(Window),
    BelowOf(Window),
}

impl Display {
    /// Create an unmapped window
    #[allow(clippy::too_many_arguments)]
    pub fn create_window(
        &mut self,
        parent: Window,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
        border_width: u16,
        depth: u8,
        class: WindowClass,
        attributes: &SetWindowAttributes,
    ) -> X11Result<Window> {
        const REQUEST: &str = "XCreateWindow";
        self.request(|d| {
            let parent_record = d.window_record(parent, REQUEST)?;
            if width == 0 || height == 0 {
                return Err(X11Error::bad_value(0, REQUEST));
            }
            let class = match class {
                WindowClass::CopyFromParent => parent_record.class,
                other => other,
            };
            let depth = if class == WindowClass::InputOnly {
                if depth != 0 || border_width != 0 {
                    return Err(X11Error::bad_match(REQUEST));
                }
                0
            } else {
                if parent_record.class == WindowClass::InputOnly {
                    return Err(X11Error::bad_match(REQUEST));
                }
                match depth {
                    0 => parent_record.depth,
                    depth if depth == d.screen.root_depth => depth,
                    _ => return Err(X11Error::bad_match(REQUEST)),
                }
            };
            let live = d.registry.windows().len().saturating_sub(1);
            if d.config.max_windows > 0 && live >= d.config.max_windows {
                log::warn!("window limit of {} reached", d.config.max_windows);
                return Err(X11Error::bad_alloc(REQUEST));
            }

            let mut record =
                WindowRecord::new(parent, Rectangle::new(x, y, width, height), border_width, depth);
            record.class = class;
            record.background_pixel = attributes.background_pixel;
            if let Some(pixel) = attributes.border_pixel {
                record.border_pixel = pixel;
            }
            record.event_mask = attributes.event_mask.unwrap_or(0);
            record.do_not_propagate =
                attributes.do_not_propagate_mask.unwrap_or(0) & event_mask::PROPAGATING;
            record.override_redirect = attributes.override_redirect.unwrap_or(false);

            let frame = record.host_frame();
            record.host = if parent == d.root {
                let host_window = d
                    .backend
                    .create_window(frame, "")
                    .map_err(host_alloc(REQUEST))?;
                let view = match d
                    .backend
                    .create_view(ViewParent::Window(host_window), record.bounds())
                {
                    Ok(view) => view,
                    Err(err) => {
                        log_host(d.backend.destroy_window(host_window), "destroy_window");
                        return Err(host_alloc(REQUEST)(err));
                    }
                };
                // the content view follows its host window's visibility
                log_host(d.backend.show_view(view), "show_view");
                HostAttachment::TopLevel {
                    window: host_window,
                    view,
                }
            } else {
                let parent_view = parent_record
                    .host
                    .view()
                    .ok_or_else(|| X11Error::bad_match(REQUEST))?;
                let view = d
                    .backend
                    .create_view(ViewParent::View(parent_view), frame)
                    .map_err(host_alloc(REQUEST))?;
                HostAttachment::Embedded { view }
            };
            if let (Some(pixel), Some(view)) = (record.background_pixel, record.host.view()) {
                log_host(
                    d.backend.set_view_color(view, HostColor::from_pixel(pixel)),
                    "set_view_color",
                );
            }

            let override_redirect = record.override_redirect;
            let window = Window(d.registry.add(DrawableEntry::Window(record)));
            d.registry.update_window(parent, |p| p.children.push(window));
            log::debug!(
                "created window {} under {} ({}x{}+{}+{})",
                window,
                parent,
                width,
                height,
                x,
                y
            );

            if parent_record.event_mask & event_mask::SUBSTRUCTURE_NOTIFY != 0 {
                d.queue_event(Event::CreateNotify(CreateNotifyEvent {
                    serial: 0,
                    send_event: false,
                    parent,
                    window,
                    x,
                    y,
                    width,
                    height,
                    border_width,
                    override_redirect,
                }));
            }
            Ok(window)
        })
    }

    /// `create_window` with the parent's depth and class, border and
    /// background set
    #[allow(clippy::too_many_arguments)]
    pub fn create_simple_window(
        &mut self,
        parent: Window,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
        border_width: u16,
        border: u32,
        background: u32,
    ) -> X11Result<Window> {
        let attributes = SetWindowAttributes {
            background_pixel: Some(background),
            border_pixel: Some(border),
            ..SetWindowAttributes::default()
        };
        self.create_window(
            parent,
            x,
            y,
            width,
            height,
            border_width,
            0,
            WindowClass::CopyFromParent,
            &attributes,
        )
    }

    /// The window and its mapped descendants, parents before children
    fn mapped_subtree(&self, window: Window) -> Vec<Window> {
        let reg = self.registry.read();
        let mut out = Vec::new();
        let mut stack = vec![window];
        while let Some(current) = stack.pop() {
            let Some(record) = reg.window(current) else {
                continue;
            };
            out.push(current);
            for child in record.children.iter().rev() {
                if reg.window(*child).map(|c| c.mapped).unwrap_or(false) {
                    stack.push(*child);
                }
            }
        }
        out
    }

    pub fn map_window(&mut self, window: Window) -> X11Result<()> {
        self.request(|d| {
            let record = d.window_record(window, "XMapWindow")?;
            if record.mapped {
                return Ok(());
            }
            d.registry.update_window(window, |w| w.mapped = true);
            match record.host {
                HostAttachment::TopLevel { window: host, .. } => {
                    log_host(d.backend.show_window(host), "show_window")
                }
                HostAttachment::Embedded { view } => log_host(d.backend.show_view(view), "show_view"),
                HostAttachment::Root => {}
            }
            log::debug!("mapped window {}", window);

            for target in d.structure_targets(window, &record) {
                d.queue_event(Event::MapNotify(MapNotifyEvent {
                    serial: 0,
                    send_event: false,
                    event: target,
                    window,
                    override_redirect: record.override_redirect,
                }));
            }

            if d.registry.read().is_viewable(window) {
                for exposed in d.mapped_subtree(window) {
                    if let Some(r) = d.registry.get_window(exposed) {
                        d.queue_expose(exposed, r.bounds());
                    }
                }
            }
            Ok(())
        })
    }

    pub fn map_raised(&mut self, window: Window) -> X11Result<()> {
        self.request(|d| {
            d.raise_window(window)?;
            d.map_window(window)
        })
    }

    /// Map every unmapped child, top-most first
    pub fn map_subwindows(&mut self, window: Window) -> X11Result<()> {
        self.request(|d| {
            let record = d.window_record(window, "XMapSubwindows")?;
            for child in record.children.iter().rev() {
                d.map_window(*child)?;
            }
            Ok(())
        })
    }

    pub fn unmap_window(&mut self, window: Window) -> X11Result<()> {
        self.request(|d| {
            let record = d.window_record(window, "XUnmapWindow")?;
            if !record.mapped || window == d.root {
                return Ok(());
            }
            let was_viewable = d.registry.read().is_viewable(window);
            d.registry.update_window(window, |w| w.mapped = false);
            match record.host {
                HostAttachment::TopLevel { window: host, .. } => {
                    log_host(d.backend.hide_window(host), "hide_window")
                }
                HostAttachment::Embedded { view } => log_host(d.backend.hide_view(view), "hide_view"),
                HostAttachment::Root => {}
            }
            log::debug!("unmapped window {}", window);

            for target in d.structure_targets(window, &record) {
                d.queue_event(Event::UnmapNotify(UnmapNotifyEvent {
                    serial: 0,
                    send_event: false,
                    event: target,
                    window,
                    from_configure: false,
                }));
            }

            // the parent shows through where the window was
            if was_viewable && record.parent != d.root {
                if let Some(parent) = d.registry.get_window(record.parent) {
                    if let Some(uncovered) = outer_frame(&record).intersection(&parent.bounds()) {
                        d.queue_expose(record.parent, uncovered);
                    }
                }
            }
            Ok(())
        })
    }

    /// Unmap every mapped child, bottom-most first
    pub fn unmap_subwindows(&mut self, window: Window) -> X11Result<()> {
        self.request(|d| {
            let record = d.window_record(window, "XUnmapSubwindows")?;
            for child in &record.children {
                d.unmap_window(*child)?;
            }
            Ok(())
        })
    }

    /// Where `window` lands in its parent's stacking order
    fn restack_order(
        &self,
        order: &[Window],
        window: Window,
        frame: Rectangle,
        sibling: Option<Window>,
        mode: StackMode,
    ) -> Vec<Window> {
        let position = order.iter().position(|w| *w == window).unwrap_or(order.len());
        let reg = self.registry.read();
        let overlaps = |other: &Window| {
            reg.window(*other)
                .filter(|r| r.mapped)
                .map(|r| outer_frame(r).intersection(&frame).is_some())
                .unwrap_or(false)
        };
        let conflicts = |set: &[Window]| match sibling {
            Some(s) => set.contains(&s) && overlaps(&s),
            None => set.iter().any(&overlaps),
        };
        let below = &order[..position.min(order.len())];
        let above = if position < order.len() {
            &order[position + 1..]
        } else {
            &[][..]
        };
        let occluded = conflicts(above);
        let occludes = conflicts(below);

        let placement = match (mode, sibling) {
            (StackMode::Above, Some(s)) => Placement::AboveOf(s),
            (StackMode::Above, None) => Placement::Top,
            (StackMode::Below, Some(s)) => Placement::BelowOf(s),
            (StackMode::Below, None) => Placement::Bottom,
            (StackMode::TopIf, _) if occluded => Placement::Top,
            (StackMode::BottomIf, _) if occludes => Placement::Bottom,
            (StackMode::Opposite, _) if occluded => Placement::Top,
            (StackMode::Opposite, _) if occludes => Placement::Bottom,
            _ => Placement::Stay,
        };

        let mut rest: Vec<Window> = order.iter().copied().filter(|w| *w != window).collect();
        match placement {
            Placement::Stay => return order.to_vec(),
            Placement::Top => rest.push(window),
            Placement::Bottom => rest.insert(0, window),
            Placement::AboveOf(s) => {
                let index = rest.iter().position(|w| *w == s).map(|i| i + 1).unwrap_or(rest.len());
                rest.insert(index, window);
            }
            Placement::BelowOf(s) => {
                let index = rest.iter().position(|w| *w == s).unwrap_or(0);
                rest.insert(index, window);
            }
        }
        rest
    }

    /// Replay a new stacking order on the host, which only knows "raise"
    fn restack_host(&mut self, order: &[Window], window: Window) {
        let Some(start) = order.iter().position(|w| *w == window) else {
            return;
        };
        for w in &order[start..] {
            let Some(record) = self.registry.get_window(*w) else {
                continue;
            };
            match record.host {
                HostAttachment::TopLevel { window: host, .. } => {
                    log_host(self.backend.raise_window(host), "raise_window")
                }
                HostAttachment::Embedded { view } => log_host(self.backend.raise_view(view), "raise_view"),
                HostAttachment::Root => {}
            }
        }
    }

    /// Follow up on top-levels the host resized: the content view is
    /// resized to match and a grown, viewable window is exposed
    pub(super) fn follow_host_resizes(&mut self) {
        let pending = std::mem::take(&mut self.lock_input().pending_resizes);
        for resize in pending {
            let Some(record) = self.registry.get_window(resize.window) else {
                continue;
            };
            if let HostAttachment::TopLevel { view, .. } = record.host {
                log_host(self.backend.resize_view(view, record.width, record.height), "resize_view");
            }
            if resize.grew && self.registry.read().is_viewable(resize.window) {
                self.queue_expose(resize.window, record.bounds());
            }
        }
    }

    pub fn configure_window(&mut self, window: Window, changes: &WindowChanges) -> X11Result<()> {
        const REQUEST: &str = "XConfigureWindow";
        self.request(|d| {
            let record = d.window_record(window, REQUEST)?;
            if window == d.root {
                return Ok(());
            }
            if changes.width == Some(0) || changes.height == Some(0) {
                return Err(X11Error::bad_value(0, REQUEST));
            }
            if let Some(sibling) = changes.sibling {
                if changes.stack_mode.is_none() || sibling == window {
                    return Err(X11Error::bad_match(REQUEST));
                }
                if d.window_record(sibling, REQUEST)?.parent != record.parent {
                    return Err(X11Error::bad_match(REQUEST));
                }
            }
            if record.class == WindowClass::InputOnly && changes.border_width.is_some_and(|b| b != 0) {
                return Err(X11Error::bad_match(REQUEST));
            }

            let mut updated = record.clone();
            if let Some(x) = changes.x {
                updated.x = x;
            }
            if let Some(y) = changes.y {
                updated.y = y;
            }
            if let Some(width) = changes.width {
                updated.width = width;
            }
            if let Some(height) = changes.height {
                updated.height = height;
            }
            if let Some(border_width) = changes.border_width {
                updated.border_width = border_width;
            }
            let old_frame = record.host_frame();
            let new_frame = updated.host_frame();
            let moved = (old_frame.x, old_frame.y) != (new_frame.x, new_frame.y);
            let resized = (old_frame.width, old_frame.height) != (new_frame.width, new_frame.height);
            let reshaped = moved || resized || updated.border_width != record.border_width;

            let order = d
                .registry
                .get_window(record.parent)
                .map(|p| p.children)
                .unwrap_or_default();
            let new_order = match changes.stack_mode {
                Some(mode) => d.restack_order(&order, window, outer_frame(&updated), changes.sibling, mode),
                None => order.clone(),
            };
            let restacked = new_order != order;
            if !reshaped && !restacked {
                return Ok(());
            }

            d.registry.update_window(window, |w| {
                w.x = updated.x;
                w.y = updated.y;
                w.width = updated.width;
                w.height = updated.height;
                w.border_width = updated.border_width;
            });
            if restacked {
                let stacking = new_order.clone();
                d.registry.update_window(record.parent, move |p| p.children = stacking);
            }

            match record.host {
                HostAttachment::TopLevel { window: host, view } => {
                    if moved {
                        log_host(d.backend.move_window(host, new_frame.x, new_frame.y), "move_window");
                    }
                    if resized {
                        log_host(
                            d.backend.resize_window(host, new_frame.width, new_frame.height),
                            "resize_window",
                        );
                        log_host(
                            d.backend.resize_view(view, new_frame.width, new_frame.height),
                            "resize_view",
                        );
                    }
                }
                HostAttachment::Embedded { view } => {
                    if moved {
                        log_host(d.backend.move_view(view, new_frame.x, new_frame.y), "move_view");
                    }
                    if resized {
                        log_host(
                            d.backend.resize_view(view, new_frame.width, new_frame.height),
                            "resize_view",
                        );
                    }
                }
                HostAttachment::Root => {}
            }
            if restacked {
                d.restack_host(&new_order, window);
            }

            let above = new_order
                .iter()
                .position(|w| *w == window)
                .and_then(|i| i.checked_sub(1))
                .map(|i| new_order[i])
                .unwrap_or(Window::NONE);
            for target in d.structure_targets(window, &updated) {
                d.queue_event(Event::ConfigureNotify(ConfigureNotifyEvent {
                    serial: 0,
                    send_event: false,
                    event: target,
                    window,
                    x: updated.x,
                    y: updated.y,
                    width: updated.width,
                    height: updated.height,
                    border_width: updated.border_width,
                    above,
                    override_redirect: updated.override_redirect,
                }));
            }

            let grew = updated.width > record.width || updated.height > record.height;
            if grew && d.registry.read().is_viewable(window) {
                d.queue_expose(window, updated.bounds());
            }
            Ok(())
        })
    }

    pub fn move_window(&mut self, window: Window, x: i16, y: i16) -> X11Result<()> {
        self.configure_window(
            window,
            &WindowChanges {
                x: Some(x),
                y: Some(y),
                ..WindowChanges::default()
            },
        )
    }

    pub fn resize_window(&mut self, window: Window, width: u16, height: u16) -> X11Result<()> {
        self.configure_window(
            window,
            &WindowChanges {
                width: Some(width),
                height: Some(height),
                ..WindowChanges::default()
            },
        )
    }

    pub fn move_resize_window(
        &mut self,
        window: Window,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
    ) -> X11Result<()> {
        self.configure_window(
            window,
            &WindowChanges {
                x: Some(x),
                y: Some(y),
                width: Some(width),
                height: Some(height),
                ..WindowChanges::default()
            },
        )
    }

    pub fn set_window_border_width(&mut self, window: Window, width: u16) -> X11Result<()> {
        self.configure_window(
            window,
            &WindowChanges {
                border_width: Some(width),
                ..WindowChanges::default()
            },
        )
    }

    pub fn raise_window(&mut self, window: Window) -> X11Result<()> {
        self.configure_window(
            window,
            &WindowChanges {
                stack_mode: Some(StackMode::Above),
                ..WindowChanges::default()
            },
        )
    }

    pub fn lower_window(&mut self, window: Window) -> X11Result<()> {
        self.configure_window(
            window,
            &WindowChanges {
                stack_mode: Some(StackMode::Below),
                ..WindowChanges::default()
            },
        )
    }

    /// Stack `windows` top to bottom; the first keeps its position
    pub fn restack_windows(&mut self, windows: &[Window]) -> X11Result<()> {
        self.request(|d| {
            for pair in windows.windows(2) {
                d.configure_window(
                    pair[1],
                    &WindowChanges {
                        sibling: Some(pair[0]),
                        stack_mode: Some(StackMode::Below),
                        ..WindowChanges::default()
                    },
                )?;
            }
            Ok(())
        })
    }

    /// Move a window's host representation under a new parent
    fn rehost(
        &mut self,
        host: HostAttachment,
        to_root: bool,
        parent: &WindowRecord,
        frame: Rectangle,
        title: &str,
    ) -> X11Result<HostAttachment> {
        const REQUEST: &str = "XReparentWindow";
        match host {
            HostAttachment::TopLevel { window, .. } if to_root => {
                log_host(self.backend.move_window(window, frame.x, frame.y), "move_window");
                Ok(host)
            }
            HostAttachment::TopLevel { window, view } => {
                let parent_view = parent.host.view().ok_or_else(|| X11Error::bad_match(REQUEST))?;
                self.backend
                    .reparent_view(view, ViewParent::View(parent_view))
                    .map_err(host_failure(REQUEST))?;
                log_host(self.backend.hide_view(view), "hide_view");
                log_host(self.backend.move_view(view, frame.x, frame.y), "move_view");
                log_host(self.backend.destroy_window(window), "destroy_window");
                Ok(HostAttachment::Embedded { view })
            }
            HostAttachment::Embedded { view } if to_root => {
                let window = self
                    .backend
                    .create_window(frame, title)
                    .map_err(host_alloc(REQUEST))?;
                self.backend
                    .reparent_view(view, ViewParent::Window(window))
                    .map_err(host_failure(REQUEST))?;
                log_host(self.backend.move_view(view, 0, 0), "move_view");
                log_host(self.backend.show_view(view), "show_view");
                Ok(HostAttachment::TopLevel { window, view })
            }
            HostAttachment::Embedded { view } => {
                let parent_view = parent.host.view().ok_or_else(|| X11Error::bad_match(REQUEST))?;
                self.backend
                    .reparent_view(view, ViewParent::View(parent_view))
                    .map_err(host_failure(REQUEST))?;
                log_host(self.backend.move_view(view, frame.x, frame.y), "move_view");
                Ok(host)
            }
            HostAttachment::Root => Err(X11Error::bad_match(REQUEST)),
        }
    }

    pub fn reparent_window(&mut self, window: Window, parent: Window, x: i16, y: i16) -> X11Result<()> {
        const REQUEST: &str = "XReparentWindow";
        self.request(|d| {
            let record = d.window_record(window, REQUEST)?;
            let new_parent = d.window_record(parent, REQUEST)?;
            if window == d.root {
                return Err(X11Error::bad_match(REQUEST));
            }
            let cycle = parent == window || d.registry.read().ancestors(parent).contains(&window);
            if cycle {
                return Err(X11Error::bad_match(REQUEST));
            }
            if new_parent.class == WindowClass::InputOnly && record.class != WindowClass::InputOnly {
                return Err(X11Error::bad_match(REQUEST));
            }

            let was_mapped = record.mapped;
            if was_mapped {
                d.unmap_window(window)?;
            }

            let mut moved = record.clone();
            moved.x = x;
            moved.y = y;
            let title = d.name_of(window).unwrap_or_default();
            let host = d.rehost(record.host, parent == d.root, &new_parent, moved.host_frame(), &title)?;

            let old_parent = record.parent;
            d.registry
                .update_window(old_parent, |p| p.children.retain(|c| *c != window));
            d.registry.update_window(parent, |p| p.children.push(window));
            d.registry.update_window(window, |w| {
                w.parent = parent;
                w.x = x;
                w.y = y;
                w.host = host;
            });
            log::debug!("reparented window {} from {} to {}", window, old_parent, parent);

            let mut targets = Vec::new();
            if record.event_mask & event_mask::STRUCTURE_NOTIFY != 0 {
                targets.push(window);
            }
            let selects = |w: Window| {
                d.registry
                    .get_window(w)
                    .map(|r| r.event_mask & event_mask::SUBSTRUCTURE_NOTIFY != 0)
                    .unwrap_or(false)
            };
            if selects(old_parent) {
                targets.push(old_parent);
            }
            if parent != old_parent && selects(parent) {
                targets.push(parent);
            }
            for target in targets {
                d.queue_event(Event::ReparentNotify(ReparentNotifyEvent {
                    serial: 0,
                    send_event: false,
                    event: target,
                    window,
                    parent,
                    x,
                    y,
                    override_redirect: record.override_redirect,
                }));
            }

            if was_mapped {
                d.map_window(window)?;
            }
            Ok(())
        })
    }

    /// Destroy a window and all its inferiors.
    ///
    /// A mapped window is unmapped first. DestroyNotify is reported for
    /// every inferior before the window itself.
    pub fn destroy_window(&mut self, window: Window) -> X11Result<()> {
        self.request(|d| {
            let record = d.window_record(window, "XDestroyWindow")?;
            if window == d.root {
                return Ok(());
            }
            if record.mapped {
                d.unmap_window(window)?;
            }
            // nested views go with their ancestor
            match record.host {
                HostAttachment::TopLevel { window: host, view } => {
                    log_host(d.backend.remove_view(view), "remove_view");
                    log_host(d.backend.destroy_window(host), "destroy_window");
                }
                HostAttachment::Embedded { view } => log_host(d.backend.remove_view(view), "remove_view"),
                HostAttachment::Root => {}
            }
            d.destroy_tree(window);
            d.registry
                .update_window(record.parent, |p| p.children.retain(|c| *c != window));
            Ok(())
        })
    }

    fn destroy_tree(&mut self, window: Window) {
        let Some(record) = self.registry.get_window(window) else {
            return;
        };
        for child in &record.children {
            self.destroy_tree(*child);
        }
        for target in self.structure_targets(window, &record) {
            self.queue_event(Event::DestroyNotify(DestroyNotifyEvent {
                serial: 0,
                send_event: false,
                event: target,
                window,
            }));
        }
        self.registry.erase(window.id());
        self.properties.remove_window(window);
        self.selections.forget_window(window);
        self.release_input(window, record.parent);
        log::debug!("destroyed window {}", window);
    }

    /// Destroy every child, bottom-most first
    pub fn destroy_subwindows(&mut self, window: Window) -> X11Result<()> {
        self.request(|d| {
            let record = d.window_record(window, "XDestroySubwindows")?;
            for child in &record.children {
                d.destroy_window(*child)?;
            }
            Ok(())
        })
    }

    pub fn change_window_attributes(
        &mut self,
        window: Window,
        attributes: &SetWindowAttributes,
    ) -> X11Result<()> {
        const REQUEST: &str = "XChangeWindowAttributes";
        self.request(|d| {
            let record = d.window_record(window, REQUEST)?;
            let paints = attributes.background_pixel.is_some() || attributes.border_pixel.is_some();
            if record.class == WindowClass::InputOnly && paints {
                return Err(X11Error::bad_match(REQUEST));
            }
            d.registry.update_window(window, |w| {
                if let Some(pixel) = attributes.background_pixel {
                    w.background_pixel = Some(pixel);
                }
                if let Some(pixel) = attributes.border_pixel {
                    w.border_pixel = pixel;
                }
                if let Some(mask) = attributes.event_mask {
                    w.event_mask = mask;
                }
                if let Some(mask) = attributes.do_not_propagate_mask {
                    w.do_not_propagate = mask & event_mask::PROPAGATING;
                }
                if let Some(flag) = attributes.override_redirect {
                    w.override_redirect = flag;
                }
            });
            if let (Some(pixel), Some(view)) = (attributes.background_pixel, record.host.view()) {
                log_host(
                    d.backend.set_view_color(view, HostColor::from_pixel(pixel)),
                    "set_view_color",
                );
            }
            Ok(())
        })
    }

    pub fn select_input(&mut self, window: Window, mask: u32) -> X11Result<()> {
        log::debug!("window {} selects 0x{:x}", window, mask);
        self.change_window_attributes(
            window,
            &SetWindowAttributes {
                event_mask: Some(mask),
                ..SetWindowAttributes::default()
            },
        )
    }

    pub fn set_window_background(&mut self, window: Window, pixel: u32) -> X11Result<()> {
        self.change_window_attributes(
            window,
            &SetWindowAttributes {
                background_pixel: Some(pixel),
                ..SetWindowAttributes::default()
            },
        )
    }

    pub fn set_window_border(&mut self, window: Window, pixel: u32) -> X11Result<()> {
        self.change_window_attributes(
            window,
            &SetWindowAttributes {
                border_pixel: Some(pixel),
                ..SetWindowAttributes::default()
            },
        )
    }

    pub fn get_window_attributes(&mut self, window: Window) -> X11Result<WindowAttributes> {
        self.request(|d| {
            let record = d.window_record(window, "XGetWindowAttributes")?;
            let map_state = if !record.mapped {
                MapState::Unmapped
            } else if d.registry.read().is_viewable(window) {
                MapState::Viewable
            } else {
                MapState::Unviewable
            };
            Ok(WindowAttributes {
                x: record.x,
                y: record.y,
                width: record.width,
                height: record.height,
                border_width: record.border_width,
                depth: record.depth,
                class: record.class,
                map_state,
                override_redirect: record.override_redirect,
                your_event_mask: record.event_mask,
                do_not_propagate_mask: record.do_not_propagate,
                root: d.root,
                colormap: d.default_colormap(),
            })
        })
    }

    /// Geometry of a window or pixmap
    pub fn get_geometry(&mut self, drawable: XID) -> X11Result<Geometry> {
        self.request(|d| {
            let root = d.root;
            let reg = d.registry.read();
            match reg.get(drawable) {
                Some(DrawableEntry::Window(w)) => Ok(Geometry {
                    root,
                    x: w.x,
                    y: w.y,
                    width: w.width,
                    height: w.height,
                    border_width: w.border_width,
                    depth: w.depth,
                }),
                Some(DrawableEntry::Pixmap(p)) => Ok(Geometry {
                    root,
                    x: 0,
                    y: 0,
                    width: p.width,
                    height: p.height,
                    border_width: 0,
                    depth: p.depth,
                }),
                None => Err(X11Error::bad_drawable(drawable, "XGetGeometry")),
            }
        })
    }

    pub fn query_tree(&mut self, window: Window) -> X11Result<TreeInfo> {
        self.request(|d| {
            let record = d.window_record(window, "XQueryTree")?;
            Ok(TreeInfo {
                root: d.root,
                parent: record.parent,
                children: record.children,
            })
        })
    }

    /// Convert a point from `src` to `dst` coordinates, also reporting the
    /// mapped child of `dst` containing it
    pub fn translate_coordinates(
        &mut self,
        src: Window,
        dst: Window,
        src_x: i16,
        src_y: i16,
    ) -> X11Result<(i16, i16, Window)> {
        const REQUEST: &str = "XTranslateCoordinates";
        self.request(|d| {
            d.window_record(src, REQUEST)?;
            d.window_record(dst, REQUEST)?;
            let reg = d.registry.read();
            let (sx, sy) = reg.root_origin(src);
            let (dx, dy) = reg.root_origin(dst);
            let x = sx + src_x as i32 - dx;
            let y = sy + src_y as i32 - dy;
            let child = reg.child_at(dst, x, y).unwrap_or(Window::NONE);
            Ok((x as i16, y as i16, child))
        })
    }

    /// Set WM_NAME, and the host title of a top-level
    pub fn store_name(&mut self, window: Window, name: &str) -> X11Result<()> {
        self.request(|d| {
            let record = d.window_record(window, "XStoreName")?;
            d.change_property(window, Atom::WM_NAME, Atom::STRING, 8, PropMode::Replace, name.as_bytes())?;
            if let Some(host) = record.host.host_window() {
                log_host(d.backend.set_window_title(host, name), "set_window_title");
            }
            Ok(())
        })
    }

    pub fn fetch_name(&mut self, window: Window) -> X11Result<Option<String>> {
        self.request(|d| {
            d.window_record(window, "XFetchName")?;
            Ok(d.name_of(window))
        })
    }

    fn name_of(&mut self, window: Window) -> Option<String> {
        let (reply, _) = self
            .properties
            .get(window, Atom::WM_NAME, Atom::STRING, 0, u32::MAX / 4, false)
            .ok()?;
        if reply.type_ != Atom::STRING || reply.format != 8 {
            return None;
        }
        Some(String::from_utf8_lossy(&reply.data).into_owned())
    }

    /// Invalidate part of a window; a zero width or height extends to the
    /// window's edge. With `exposures`, an Expose for exactly that
    /// rectangle is queued.
    pub fn clear_area(
        &mut self,
        window: Window,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
        exposures: bool,
    ) -> X11Result<()> {
        const REQUEST: &str = "XClearArea";
        self.request(|d| {
            let record = d.window_record(window, REQUEST)?;
            if record.class == WindowClass::InputOnly {
                return Err(X11Error::bad_match(REQUEST));
            }
            let to_edge = |size: u16, origin: i16| {
                (size as i32 - origin as i32).clamp(0, u16::MAX as i32) as u16
            };
            let width = if width == 0 { to_edge(record.width, x) } else { width };
            let height = if height == 0 { to_edge(record.height, y) } else { height };
            let Some(rect) = Rectangle::new(x, y, width, height).intersection(&record.bounds()) else {
                return Ok(());
            };
            if let Some(view) = record.host.view() {
                log_host(d.backend.invalidate(view, rect), "invalidate");
            }
            if exposures {
                d.queue_expose(window, rect);
            }
            Ok(())
        })
    }

    pub fn clear_window(&mut self, window: Window) -> X11Result<()> {
        self.clear_area(window, 0, 0, 0, 0, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::null::NullBackend;
    use crate::backend::recording::{HostCall, RecordingBackend};
    use crate::display::DisplayConfig;

    fn open() -> Display {
        Display::open(DisplayConfig::default(), Box::new(NullBackend::new())).unwrap()
    }

    fn drain(display: &mut Display) -> Vec<Event> {
        let mut events = Vec::new();
        while display.pending() > 0 {
            events.extend(display.next_event());
        }
        events
    }

    fn structure(display: &mut Display, parent: Window) -> Window {
        let window = display.create_simple_window(parent, 0, 0, 50, 50, 0, 0, 0).unwrap();
        display
            .select_input(window, event_mask::STRUCTURE_NOTIFY | event_mask::SUBSTRUCTURE_NOTIFY)
            .unwrap();
        window
    }

    #[test]
    fn test_top_level_promoted_child_embedded() {
        let backend = RecordingBackend::new();
        let log = backend.log();
        let mut display = Display::open(DisplayConfig::default(), Box::new(backend)).unwrap();
        let root = display.root_window();
        let top = display.create_simple_window(root, 10, 10, 100, 100, 0, 0, 0).unwrap();
        let child = display.create_simple_window(top, 5, 5, 20, 20, 0, 0, 0).unwrap();

        let top_record = display.registry.get_window(top).unwrap();
        let child_record = display.registry.get_window(child).unwrap();
        assert!(matches!(top_record.host, HostAttachment::TopLevel { .. }));
        assert!(matches!(child_record.host, HostAttachment::Embedded { .. }));
        assert_eq!(log.count(|c| matches!(c, HostCall::CreateWindow { .. })), 1);
        assert_eq!(log.count(|c| matches!(c, HostCall::CreateView { .. })), 2);
    }

    #[test]
    fn test_create_validation() {
        let mut display = open();
        let root = display.root_window();
        let attrs = SetWindowAttributes::default();
        let err = display
            .create_window(root, 0, 0, 0, 10, 0, 0, WindowClass::InputOutput, &attrs)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Value);
        let err = display
            .create_window(root, 0, 0, 10, 10, 1, 0, WindowClass::InputOnly, &attrs)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Match);
        let err = display
            .create_window(Window::new(0x999), 0, 0, 10, 10, 0, 0, WindowClass::InputOutput, &attrs)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Window);
        let err = display
            .create_window(root, 0, 0, 10, 10, 0, 7, WindowClass::InputOutput, &attrs)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Match);
    }

    #[test]
    fn test_window_limit() {
        let config = DisplayConfig::default().with_limits(2, 0);
        let mut display = Display::open(config, Box::new(NullBackend::new())).unwrap();
        let root = display.root_window();
        display.create_simple_window(root, 0, 0, 1, 1, 0, 0, 0).unwrap();
        display.create_simple_window(root, 0, 0, 1, 1, 0, 0, 0).unwrap();
        let err = display.create_simple_window(root, 0, 0, 1, 1, 0, 0, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::Alloc);
    }

    #[test]
    fn test_create_notify_on_parent() {
        let mut display = open();
        let root = display.root_window();
        let parent = structure(&mut display, root);
        let child = display.create_simple_window(parent, 1, 2, 3, 4, 0, 0, 0).unwrap();
        match display.next_event() {
            Some(Event::CreateNotify(e)) => {
                assert_eq!(e.parent, parent);
                assert_eq!(e.window, child);
                assert_eq!((e.x, e.y, e.width, e.height), (1, 2, 3, 4));
            }
            other => panic!("expected CreateNotify, got {:?}", other),
        }
    }

    #[test]
    fn test_map_reports_on_window_and_parent() {
        let mut display = open();
        let root = display.root_window();
        let parent = structure(&mut display, root);
        let child = structure(&mut display, parent);
        drain(&mut display);

        display.map_window(child).unwrap();
        let events = drain(&mut display);
        let targets: Vec<Window> = events
            .iter()
            .filter_map(|e| match e {
                Event::MapNotify(m) => Some(m.event),
                _ => None,
            })
            .collect();
        assert_eq!(targets, vec![child, parent]);
    }

    #[test]
    fn test_expose_only_when_viewable() {
        let mut display = open();
        let root = display.root_window();
        let top = display.create_simple_window(root, 0, 0, 40, 40, 0, 0, 0).unwrap();
        let child = display.create_simple_window(top, 0, 0, 10, 10, 0, 0, 0).unwrap();
        display.select_input(top, event_mask::EXPOSURE).unwrap();
        display.select_input(child, event_mask::EXPOSURE).unwrap();

        // parent unmapped: child is not viewable yet
        display.map_window(child).unwrap();
        assert_eq!(display.pending(), 0);

        display.map_window(top).unwrap();
        let exposed: Vec<XID> = drain(&mut display).iter().map(|e| e.window()).collect();
        assert_eq!(exposed, vec![top.id(), child.id()]);
    }

    #[test]
    fn test_destroy_order_children_first() {
        let mut display = open();
        let root = display.root_window();
        let parent = structure(&mut display, root);
        let a = structure(&mut display, parent);
        let b = structure(&mut display, parent);
        drain(&mut display);

        display.destroy_window(parent).unwrap();
        let destroyed: Vec<Window> = drain(&mut display)
            .iter()
            .filter_map(|e| match e {
                Event::DestroyNotify(d) if d.event == d.window => Some(d.window),
                _ => None,
            })
            .collect();
        assert_eq!(destroyed, vec![a, b, parent]);
        assert!(display.registry.get_window(a).is_none());
        assert!(display.query_tree(root).unwrap().children.is_empty());
    }

    #[test]
    fn test_configure_restacks_and_reports_above() {
        let mut display = open();
        let root = display.root_window();
        let parent = display.create_simple_window(root, 0, 0, 100, 100, 0, 0, 0).unwrap();
        let a = display.create_simple_window(parent, 0, 0, 10, 10, 0, 0, 0).unwrap();
        let b = display.create_simple_window(parent, 0, 0, 10, 10, 0, 0, 0).unwrap();
        display.select_input(a, event_mask::STRUCTURE_NOTIFY).unwrap();

        display.raise_window(a).unwrap();
        assert_eq!(display.query_tree(parent).unwrap().children, vec![b, a]);
        match display.next_event() {
            Some(Event::ConfigureNotify(e)) => assert_eq!(e.above, b),
            other => panic!("expected ConfigureNotify, got {:?}", other),
        }

        display.lower_window(a).unwrap();
        assert_eq!(display.query_tree(parent).unwrap().children, vec![a, b]);
    }

    #[test]
    fn test_configure_sibling_rules() {
        let mut display = open();
        let root = display.root_window();
        let a = display.create_simple_window(root, 0, 0, 10, 10, 0, 0, 0).unwrap();
        let b = display.create_simple_window(root, 0, 0, 10, 10, 0, 0, 0).unwrap();
        let c = display.create_simple_window(a, 0, 0, 5, 5, 0, 0, 0).unwrap();

        let no_mode = WindowChanges {
            sibling: Some(b),
            ..WindowChanges::default()
        };
        assert_eq!(display.configure_window(a, &no_mode).unwrap_err().code, ErrorCode::Match);
        let not_sibling = WindowChanges {
            sibling: Some(c),
            stack_mode: Some(StackMode::Above),
            ..WindowChanges::default()
        };
        assert_eq!(display.configure_window(b, &not_sibling).unwrap_err().code, ErrorCode::Match);
        assert_eq!(display.resize_window(a, 0, 5).unwrap_err().code, ErrorCode::Value);
    }

    #[test]
    fn test_grow_exposes_new_bounds() {
        let mut display = open();
        let root = display.root_window();
        let top = display.create_simple_window(root, 0, 0, 20, 20, 0, 0, 0).unwrap();
        display.select_input(top, event_mask::EXPOSURE).unwrap();
        display.map_window(top).unwrap();
        drain(&mut display);

        display.resize_window(top, 10, 10).unwrap();
        assert_eq!(display.pending(), 0);
        display.resize_window(top, 30, 10).unwrap();
        match display.next_event() {
            Some(Event::Expose(e)) => assert_eq!(e.rectangle(), Rectangle::new(0, 0, 30, 10)),
            other => panic!("expected Expose, got {:?}", other),
        }
    }

    #[test]
    fn test_reparent_converts_host_representation() {
        let backend = RecordingBackend::new();
        let log = backend.log();
        let mut display = Display::open(DisplayConfig::default(), Box::new(backend)).unwrap();
        let root = display.root_window();
        let a = display.create_simple_window(root, 0, 0, 50, 50, 0, 0, 0).unwrap();
        let b = display.create_simple_window(root, 60, 0, 50, 50, 0, 0, 0).unwrap();
        display.select_input(b, event_mask::STRUCTURE_NOTIFY).unwrap();

        display.reparent_window(b, a, 5, 5).unwrap();
        let record = display.registry.get_window(b).unwrap();
        assert!(matches!(record.host, HostAttachment::Embedded { .. }));
        assert_eq!(record.parent, a);
        assert_eq!(log.count(|c| matches!(c, HostCall::DestroyWindow(_))), 1);
        match display.next_event() {
            Some(Event::ReparentNotify(e)) => {
                assert_eq!(e.parent, a);
                assert_eq!((e.x, e.y), (5, 5));
            }
            other => panic!("expected ReparentNotify, got {:?}", other),
        }

        display.reparent_window(b, root, 1, 1).unwrap();
        let record = display.registry.get_window(b).unwrap();
        assert!(matches!(record.host, HostAttachment::TopLevel { .. }));

        display.reparent_window(a, b, 0, 0).unwrap();
        assert_eq!(display.reparent_window(b, a, 0, 0).unwrap_err().code, ErrorCode::Match);
    }

    #[test]
    fn test_clear_area_exact_rectangle() {
        let mut display = open();
        let root = display.root_window();
        let top = display.create_simple_window(root, 0, 0, 100, 80, 0, 0, 0).unwrap();
        display.select_input(top, event_mask::EXPOSURE).unwrap();

        display.clear_area(top, 10, 20, 30, 40, true).unwrap();
        display.clear_area(top, 90, 70, 0, 0, true).unwrap();
        let rects: Vec<Rectangle> = drain(&mut display)
            .iter()
            .filter_map(|e| match e {
                Event::Expose(x) => Some(x.rectangle()),
                _ => None,
            })
            .collect();
        assert_eq!(rects, vec![Rectangle::new(10, 20, 30, 40), Rectangle::new(90, 70, 10, 10)]);
    }

    #[test]
    fn test_expose_coalescing() {
        let mut display = open();
        let root = display.root_window();
        let top = display.create_simple_window(root, 0, 0, 100, 100, 0, 0, 0).unwrap();
        display.select_input(top, event_mask::EXPOSURE).unwrap();
        display.clear_area(top, 0, 0, 50, 50, true).unwrap();
        display.clear_area(top, 10, 10, 10, 10, true).unwrap();
        assert_eq!(display.pending(), 1);

        let config = DisplayConfig::default().with_expose_coalescing(false);
        let mut display = Display::open(config, Box::new(NullBackend::new())).unwrap();
        let top = display.create_simple_window(root, 0, 0, 100, 100, 0, 0, 0).unwrap();
        display.select_input(top, event_mask::EXPOSURE).unwrap();
        display.clear_area(top, 0, 0, 50, 50, true).unwrap();
        display.clear_area(top, 10, 10, 10, 10, true).unwrap();
        assert_eq!(display.pending(), 2);
    }

    #[test]
    fn test_names_and_geometry() {
        let backend = RecordingBackend::new();
        let log = backend.log();
        let mut display = Display::open(DisplayConfig::default(), Box::new(backend)).unwrap();
        let root = display.root_window();
        let top = display.create_simple_window(root, 3, 4, 30, 40, 2, 0, 0).unwrap();
        assert_eq!(display.fetch_name(top).unwrap(), None);
        display.store_name(top, "hello").unwrap();
        assert_eq!(display.fetch_name(top).unwrap().as_deref(), Some("hello"));
        assert_eq!(log.count(|c| matches!(c, HostCall::SetWindowTitle(_, t) if t == "hello")), 1);

        let geometry = display.get_geometry(top.id()).unwrap();
        assert_eq!((geometry.x, geometry.y, geometry.width, geometry.height), (3, 4, 30, 40));
        assert_eq!(geometry.border_width, 2);
        let err = display.get_geometry(XID::new(0x4242)).unwrap_err();
        assert_eq!(err.code, ErrorCode::Drawable);
    }

    #[test]
    fn test_translate_coordinates() {
        let mut display = open();
        let root = display.root_window();
        let top = display.create_simple_window(root, 10, 20, 100, 100, 1, 0, 0).unwrap();
        let child = display.create_simple_window(top, 5, 5, 10, 10, 0, 0, 0).unwrap();
        let grandchild = display.create_simple_window(child, 0, 0, 10, 10, 0, 0, 0).unwrap();
        display.map_window(child).unwrap();
        display.map_window(grandchild).unwrap();

        // the immediate child, not the deepest window under the point
        let (x, y, under) = display.translate_coordinates(root, top, 20, 30).unwrap();
        assert_eq!((x, y), (9, 9));
        assert_eq!(under, child);
        let (x, y, _) = display.translate_coordinates(child, root, 0, 0).unwrap();
        assert_eq!((x, y), (16, 26));
    }

    #[test]
    fn test_map_state() {
        let mut display = open();
        let root = display.root_window();
        let top = display.create_simple_window(root, 0, 0, 10, 10, 0, 0, 0).unwrap();
        let child = display.create_simple_window(top, 0, 0, 5, 5, 0, 0, 0).unwrap();
        assert_eq!(display.get_window_attributes(top).unwrap().map_state, MapState::Unmapped);
        display.map_window(child).unwrap();
        assert_eq!(display.get_window_attributes(child).unwrap().map_state, MapState::Unviewable);
        display.map_window(top).unwrap();
        assert_eq!(display.get_window_attributes(child).unwrap().map_state, MapState::Viewable);
    }

    #[test]
    fn test_restack_windows_order() {
        let mut display = open();
        let root = display.root_window();
        let parent = display.create_simple_window(root, 0, 0, 100, 100, 0, 0, 0).unwrap();
        let a = display.create_simple_window(parent, 0, 0, 10, 10, 0, 0, 0).unwrap();
        let b = display.create_simple_window(parent, 0, 0, 10, 10, 0, 0, 0).unwrap();
        let c = display.create_simple_window(parent, 0, 0, 10, 10, 0, 0, 0).unwrap();
        assert_eq!(display.query_tree(parent).unwrap().children, vec![a, b, c]);

        // first entry stays put, each next one goes right below its predecessor
        display.restack_windows(&[a, b, c]).unwrap();
        assert_eq!(display.query_tree(parent).unwrap().children, vec![c, b, a]);
    }

    #[test]
    fn test_destroy_subwindows_keeps_parent() {
        let mut display = open();
        let root = display.root_window();
        let parent = structure(&mut display, root);
        let a = structure(&mut display, parent);
        let b = structure(&mut display, parent);
        drain(&mut display);

        display.destroy_subwindows(parent).unwrap();
        let destroyed: Vec<Window> = drain(&mut display)
            .iter()
            .filter_map(|e| match e {
                Event::DestroyNotify(d) if d.event == d.window => Some(d.window),
                _ => None,
            })
            .collect();
        assert_eq!(destroyed, vec![a, b]);
        assert!(display.registry.get_window(parent).is_some());
        assert!(display.query_tree(parent).unwrap().children.is_empty());
        assert_eq!(display.query_tree(root).unwrap().children, vec![parent]);
    }

    #[test]
    fn test_clear_area_to_edge_from_negative_origin() {
        let mut display = open();
        let root = display.root_window();
        let wide = display.create_simple_window(root, 0, 0, 60000, 10, 0, 0, 0).unwrap();
        display.select_input(wide, event_mask::EXPOSURE).unwrap();

        display.clear_area(wide, -10000, 0, 0, 0, true).unwrap();
        match display.next_event() {
            Some(Event::Expose(e)) => assert_eq!(e.rectangle(), Rectangle::new(0, 0, 55535, 10)),
            other => panic!("expected Expose, got {:?}", other),
        }
    }
}
