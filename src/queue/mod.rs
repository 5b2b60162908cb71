//! Per-connection event queue
//!
//! The host toolkit delivers input on its own thread while the client reads
//! events on the connection thread. Host-side producers hold an
//! `EventSender`; the `EventQueue` owns the receiving end and moves
//! everything that has arrived into its deque before each inspection, so
//! the deque always reflects arrival order. A blocking read that finds
//! nothing suitable parks on the channel until the next event arrives.

use crate::protocol::Event;
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

/// Producer handle, safe to clone onto any thread
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<Event>,
}

impl EventSender {
    /// Queue an event behind everything already sent
    pub fn send(&self, event: Event) {
        if self.tx.send(event).is_err() {
            log::warn!("event queue closed, dropping event");
        }
    }
}

/// Consumer side of the queue
#[derive(Debug)]
pub struct EventQueue {
    events: VecDeque<Event>,
    rx: Receiver<Event>,
    serial: u64,
}

impl EventQueue {
    pub fn new() -> (EventQueue, EventSender) {
        let (tx, rx) = mpsc::channel();
        let queue = EventQueue {
            events: VecDeque::new(),
            rx,
            serial: 0,
        };
        (queue, EventSender { tx })
    }

    fn stamp(&mut self, event: &mut Event) {
        self.serial += 1;
        event.set_serial(self.serial);
    }

    /// Move everything the producers have sent into the deque.
    ///
    /// Returns the number of events moved.
    pub fn drain_pending(&mut self) -> usize {
        let mut moved = 0;
        loop {
            match self.rx.try_recv() {
                Ok(mut event) => {
                    self.stamp(&mut event);
                    self.events.push_back(event);
                    moved += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        moved
    }

    /// Block for the next arrival; false when every producer is gone
    fn wait_for_arrival(&mut self) -> bool {
        match self.rx.recv() {
            Ok(mut event) => {
                self.stamp(&mut event);
                self.events.push_back(event);
                self.drain_pending();
                true
            }
            Err(_) => {
                log::warn!("all event producers disconnected");
                false
            }
        }
    }

    /// Queue an event generated on the client thread
    pub fn add(&mut self, mut event: Event, front: bool) {
        self.drain_pending();
        self.stamp(&mut event);
        if front {
            self.events.push_front(event);
        } else {
            self.events.push_back(event);
        }
    }

    /// Return an event to the head of the queue, keeping its serial
    pub fn put_back(&mut self, event: Event) {
        self.drain_pending();
        self.events.push_front(event);
    }

    /// The head event, waiting for one if `blocking`
    pub fn wait_for_next(&mut self, blocking: bool, dequeue: bool) -> Option<Event> {
        self.query(|_| true, blocking, dequeue)
    }

    /// First queued event satisfying `predicate`.
    ///
    /// Scans in queue order; when nothing matches and `wait` is set, blocks
    /// for further arrivals and rescans only the new tail.
    pub fn query<P>(&mut self, mut predicate: P, wait: bool, dequeue: bool) -> Option<Event>
    where
        P: FnMut(&Event) -> bool,
    {
        self.drain_pending();
        let mut scanned = 0;
        loop {
            if let Some(offset) = self.events.iter().skip(scanned).position(&mut predicate) {
                let index = scanned + offset;
                return if dequeue {
                    self.events.remove(index)
                } else {
                    self.events.get(index).cloned()
                };
            }
            scanned = self.events.len();
            if !wait || !self.wait_for_arrival() {
                return None;
            }
        }
    }

    /// Queue length after pulling in pending arrivals
    pub fn len(&mut self) -> usize {
        self.drain_pending();
        self.events.len()
    }

    /// Queue length without touching the channel
    pub fn queued(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    /// Remove everything, including unread arrivals
    pub fn clear(&mut self) {
        self.drain_pending();
        self.events.clear();
    }

    pub fn last_serial(&self) -> u64 {
        self.serial
    }

    /// Iterate the queued events in order
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::*;
    use std::thread;
    use std::time::Duration;

    fn client_message(tag: u8) -> Event {
        let mut data = [0u8; 20];
        data[0] = tag;
        Event::ClientMessage(ClientMessageEvent {
            serial: 0,
            send_event: false,
            window: Window::new(0x200),
            message_type: Atom::new(70),
            format: 8,
            data,
        })
    }

    fn tag(event: &Event) -> u8 {
        match event {
            Event::ClientMessage(m) => m.data[0],
            _ => 0,
        }
    }

    #[test]
    fn test_fifo_with_push_front() {
        let (mut queue, _sender) = EventQueue::new();
        queue.add(client_message(1), false);
        queue.add(client_message(2), false);
        queue.add(client_message(3), true);
        let order: Vec<u8> = (0..3)
            .filter_map(|_| queue.wait_for_next(false, true))
            .map(|e| tag(&e))
            .collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn test_serials_increase_and_put_back_keeps_serial() {
        let (mut queue, _sender) = EventQueue::new();
        queue.add(client_message(1), false);
        queue.add(client_message(2), false);
        let first = queue.wait_for_next(false, true).unwrap();
        assert_eq!(first.serial(), 1);
        queue.put_back(first.clone());
        let again = queue.wait_for_next(false, true).unwrap();
        assert_eq!(again.serial(), 1);
        assert_eq!(queue.last_serial(), 2);
    }

    #[test]
    fn test_sender_events_precede_later_client_events() {
        let (mut queue, sender) = EventQueue::new();
        sender.send(client_message(1));
        queue.add(client_message(2), false);
        assert_eq!(tag(&queue.wait_for_next(false, true).unwrap()), 1);
        assert_eq!(tag(&queue.wait_for_next(false, true).unwrap()), 2);
    }

    #[test]
    fn test_query_without_wait() {
        let (mut queue, _sender) = EventQueue::new();
        queue.add(client_message(1), false);
        queue.add(client_message(2), false);
        let found = queue.query(|e| tag(e) == 2, false, true).unwrap();
        assert_eq!(tag(&found), 2);
        assert_eq!(queue.len(), 1);
        assert!(queue.query(|e| tag(e) == 9, false, true).is_none());
        // peek leaves the event in place
        assert!(queue.query(|e| tag(e) == 1, false, false).is_some());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_blocking_query_wakes_on_producer() {
        let (mut queue, sender) = EventQueue::new();
        queue.add(client_message(1), false);
        let producer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            sender.send(client_message(5));
        });
        let found = queue.query(|e| tag(e) == 5, true, true).unwrap();
        assert_eq!(tag(&found), 5);
        assert_eq!(queue.len(), 1);
        producer.join().unwrap();
    }

    #[test]
    fn test_blocking_returns_none_once_producers_are_gone() {
        let (mut queue, sender) = EventQueue::new();
        drop(sender);
        assert!(queue.wait_for_next(true, true).is_none());
    }
}
