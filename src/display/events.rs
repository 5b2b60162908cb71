//! Event retrieval
//!
//! Blocking calls park on the queue's channel until the host thread sends
//! something suitable. There are no timeouts.

use super::{host_failure, log_host, Display};
use crate::protocol::*;

/// `XEventsQueued` modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueuedMode {
    /// Count what is already in the queue
    Already,
    /// Pull in pending host events first
    AfterReading,
    /// Flush the host, then pull in pending events
    AfterFlush,
}

/// Where `send_event` starts looking for a recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// The window the pointer is in
    PointerWindow,
    /// The focus window
    InputFocus,
    Window(Window),
}

impl From<Window> for Destination {
    fn from(window: Window) -> Self {
        Destination::Window(window)
    }
}

impl Display {
    fn flush_host(&mut self) {
        self.follow_host_resizes();
        log_host(self.backend.flush(), "flush");
    }

    /// Remove and return the head event, blocking until there is one.
    ///
    /// Returns `None` only if every producer has gone away.
    pub fn next_event(&mut self) -> Option<Event> {
        self.flush_host();
        self.queue.wait_for_next(true, true)
    }

    /// Like `next_event`, without removing the event
    pub fn peek_event(&mut self) -> Option<Event> {
        self.flush_host();
        self.queue.wait_for_next(true, false)
    }

    /// Events queued after flushing the host
    pub fn pending(&mut self) -> usize {
        self.events_queued(QueuedMode::AfterFlush)
    }

    pub fn events_queued(&mut self, mode: QueuedMode) -> usize {
        match mode {
            QueuedMode::Already => self.queue.queued(),
            QueuedMode::AfterReading => {
                self.follow_host_resizes();
                self.queue.len()
            }
            QueuedMode::AfterFlush => {
                self.flush_host();
                self.queue.len()
            }
        }
    }

    /// Block for the first event on `window` selected by `mask`
    pub fn window_event(&mut self, window: Window, mask: u32) -> Option<Event> {
        self.flush_host();
        self.queue
            .query(|e| e.window() == window.id() && e.matches_mask(mask), true, true)
    }

    pub fn check_window_event(&mut self, window: Window, mask: u32) -> Option<Event> {
        self.flush_host();
        self.queue
            .query(|e| e.window() == window.id() && e.matches_mask(mask), false, true)
    }

    /// Block for the first event selected by `mask`
    pub fn mask_event(&mut self, mask: u32) -> Option<Event> {
        self.flush_host();
        self.queue.query(|e| e.matches_mask(mask), true, true)
    }

    pub fn check_mask_event(&mut self, mask: u32) -> Option<Event> {
        self.flush_host();
        self.queue.query(|e| e.matches_mask(mask), false, true)
    }

    pub fn check_typed_event(&mut self, event_type: EventType) -> Option<Event> {
        self.flush_host();
        self.queue.query(|e| e.event_type() == event_type, false, true)
    }

    pub fn check_typed_window_event(&mut self, window: Window, event_type: EventType) -> Option<Event> {
        self.flush_host();
        self.queue.query(
            |e| e.window() == window.id() && e.event_type() == event_type,
            false,
            true,
        )
    }

    /// Block for the first event `predicate` accepts
    pub fn if_event<P>(&mut self, predicate: P) -> Option<Event>
    where
        P: FnMut(&Event) -> bool,
    {
        self.flush_host();
        self.queue.query(predicate, true, true)
    }

    pub fn check_if_event<P>(&mut self, predicate: P) -> Option<Event>
    where
        P: FnMut(&Event) -> bool,
    {
        self.flush_host();
        self.queue.query(predicate, false, true)
    }

    /// Block for the first event `predicate` accepts, leaving it queued
    pub fn peek_if_event<P>(&mut self, predicate: P) -> Option<Event>
    where
        P: FnMut(&Event) -> bool,
    {
        self.flush_host();
        self.queue.query(predicate, true, false)
    }

    /// Return an event to the head of the queue; it keeps its serial
    pub fn put_back_event(&mut self, event: Event) {
        self.queue.put_back(event);
    }

    /// Queue a synthetic event.
    ///
    /// With an empty `mask` the event goes to the destination window.
    /// Otherwise it goes to the first window selecting `mask`, starting at
    /// the destination and, with `propagate`, walking up the ancestors
    /// until a `do_not_propagate` mask stops it. An event nobody selects is
    /// dropped without error.
    pub fn send_event(
        &mut self,
        destination: impl Into<Destination>,
        propagate: bool,
        mask: u32,
        mut event: Event,
    ) -> X11Result<()> {
        const REQUEST: &str = "XSendEvent";
        let destination = destination.into();
        self.request(|d| {
            if !d.config.allow_synthetic_events {
                return Err(X11Error::new(ErrorCode::Access, 0, REQUEST));
            }
            let start = match destination {
                Destination::PointerWindow => d.lock_input().pointer_window,
                Destination::InputFocus => d.lock_input().focus,
                Destination::Window(window) => {
                    d.window_record(window, REQUEST)?;
                    window
                }
            };
            if start == Window::NONE {
                return Ok(());
            }
            let recipient = if mask == 0 {
                Some(start)
            } else {
                let reg = d.registry.read();
                let mut current = start;
                loop {
                    let Some(record) = reg.window(current) else {
                        break None;
                    };
                    if record.event_mask & mask != 0 {
                        break Some(current);
                    }
                    if !propagate || record.do_not_propagate & mask != 0 || record.parent == Window::NONE {
                        break None;
                    }
                    current = record.parent;
                }
            };
            match recipient {
                Some(window) => {
                    log::debug!("synthetic {:?} for {}", event.event_type(), window);
                    event.set_send_event(true);
                    d.queue_event(event);
                }
                None => log::trace!("synthetic {:?} not selected", event.event_type()),
            }
            Ok(())
        })
    }

    /// Push buffered host work out
    pub fn flush(&mut self) -> X11Result<()> {
        self.request(|d| d.backend.flush().map_err(host_failure("XFlush")))
    }

    /// Wait for the host to finish, optionally discarding queued events
    pub fn sync(&mut self, discard: bool) -> X11Result<()> {
        self.request(|d| {
            d.backend.sync().map_err(host_failure("XSync"))?;
            d.follow_host_resizes();
            if discard {
                d.queue.clear();
            }
            Ok(())
        })
    }
}
