//! Event delivery from the land to its subscribers.
//!
//! Each subscriber owns a bounded queue. When a queue is full the oldest event
//! is discarded so a slow subscriber never holds up the land or other
//! subscribers.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use tracing::debug;

use wonder_proto::StreamItem;

use super::LAND_TARGET;

/// Events buffered per subscriber before the oldest are dropped.
pub const EVENT_QUEUE_CAPACITY: usize = 512;

#[derive(Debug, Default)]
struct QueueState {
    items: VecDeque<StreamItem>,
    closed: bool,
    dropped: u64,
}

/// Bounded, drop-oldest queue feeding one event stream.
#[derive(Debug)]
pub struct EventQueue {
    capacity: usize,
    state: Mutex<QueueState>,
    ready: Condvar,
}

impl EventQueue {
    /// Builds an open queue holding at most `capacity` events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(QueueState::default()),
            ready: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|poison| poison.into_inner())
    }

    /// Appends `item`, discarding the oldest event when full.
    ///
    /// Returns `false` once the queue is closed.
    pub fn push(&self, item: StreamItem) -> bool {
        let mut state = self.lock();
        if state.closed {
            return false;
        }
        if state.items.len() == self.capacity {
            state.items.pop_front();
            state.dropped += 1;
            debug!(target: LAND_TARGET, dropped = state.dropped, "event queue full, dropped oldest event");
        }
        state.items.push_back(item);
        drop(state);
        self.ready.notify_one();
        true
    }

    /// Blocks until an event is available. Returns `None` once closed.
    pub fn pop(&self) -> Option<StreamItem> {
        let mut state = self.lock();
        loop {
            if state.closed {
                return None;
            }
            if let Some(item) = state.items.pop_front() {
                return Some(item);
            }
            state = self
                .ready
                .wait(state)
                .unwrap_or_else(|poison| poison.into_inner());
        }
    }

    /// Closes the queue, waking any blocked [`Self::pop`]. Idempotent.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.items.clear();
        drop(state);
        self.ready.notify_all();
    }

    /// Returns `true` once the queue is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Events discarded because the queue was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.lock().dropped
    }
}

/// Set of live subscriber queues.
#[derive(Debug)]
pub struct EventFanout {
    capacity: usize,
    queues: Mutex<Vec<Arc<EventQueue>>>,
}

impl Default for EventFanout {
    fn default() -> Self {
        Self::new(EVENT_QUEUE_CAPACITY)
    }
}

impl EventFanout {
    /// Builds a fan-out whose queues hold `capacity` events each.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            queues: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<EventQueue>>> {
        self.queues.lock().unwrap_or_else(|poison| poison.into_inner())
    }

    /// Registers a new subscriber queue.
    pub fn subscribe(&self) -> Arc<EventQueue> {
        let queue = Arc::new(EventQueue::new(self.capacity));
        self.lock().push(Arc::clone(&queue));
        queue
    }

    /// Delivers `item` to every open queue and forgets the closed ones.
    pub fn publish(&self, item: &StreamItem) {
        self.lock().retain(|queue| queue.push(item.clone()));
    }

    /// Number of registered queues.
    #[must_use]
    pub fn subscribers(&self) -> usize {
        self.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use wonder_proto::EventKind;

    use super::*;

    fn event(index: u16) -> StreamItem {
        StreamItem::json(EventKind::Move.as_str(), &index).expect("encode event")
    }

    #[test]
    fn full_queue_drops_the_oldest_event() {
        let queue = EventQueue::new(2);
        for index in 0..3 {
            assert!(queue.push(event(index)));
        }
        assert_eq!(queue.dropped(), 1);
        assert_eq!(queue.pop(), Some(event(1)));
        assert_eq!(queue.pop(), Some(event(2)));
    }

    #[test]
    fn close_wakes_a_blocked_pop() {
        let queue = Arc::new(EventQueue::new(4));
        let waiter = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.pop())
        };
        thread::sleep(Duration::from_millis(20));
        queue.close();
        assert_eq!(waiter.join().expect("join waiter"), None);
        assert!(!queue.push(event(0)));
    }

    #[test]
    fn publish_prunes_closed_subscribers() {
        let fanout = EventFanout::new(4);
        let kept = fanout.subscribe();
        let closed = fanout.subscribe();
        closed.close();

        fanout.publish(&event(7));

        assert_eq!(fanout.subscribers(), 1);
        assert_eq!(kept.pop(), Some(event(7)));
    }
}
