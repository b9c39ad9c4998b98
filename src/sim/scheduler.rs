/// Tick scheduler: a discrete logical clock with delayed and recurring events.
///
/// ## Model
///
///   - `tick`  — current logical time, +1 per `advance()`.
///   - `queue` — fire tick → bucket of events, kept in insertion order.
///
/// Events carry a plain data payload rather than a closure. `advance()`
/// hands the due payloads back to the owner, which dispatches them to its
/// own handlers. That keeps the scheduler free of any borrow on the world
/// it drives.
///
/// ## Ordering
///
///   - Events due on the same tick fire FIFO (registration order).
///   - A recurring event is re-queued `delay` ticks after the tick it fired
///     on, under the same handle, so `cancel()` stops all future firings.
///   - A delay of 0 is treated as 1: the current tick's bucket has already
///     been taken by the time anything could be added to it.

use std::collections::BTreeMap;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EventHandle(u64);

#[derive(Clone, Debug)]
struct Scheduled<T> {
    handle: EventHandle,
    payload: T,
    delay: u64,
    recurring: bool,
}

/// An event that came due during `advance()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fired<T> {
    pub handle: EventHandle,
    pub tick: u64,
    pub payload: T,
}

#[derive(Clone, Debug)]
pub struct Scheduler<T> {
    tick: u64,
    next_id: u64,
    queue: BTreeMap<u64, Vec<Scheduled<T>>>,
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Scheduler { tick: 0, next_id: 0, queue: BTreeMap::new() }
    }

    /// Current logical tick.
    pub fn now(&self) -> u64 {
        self.tick
    }

    /// Queue `payload` to fire `delay` ticks from now.
    pub fn schedule(&mut self, payload: T, delay: u64, recurring: bool) -> EventHandle {
        let handle = EventHandle(self.next_id);
        self.next_id += 1;
        let delay = delay.max(1);
        let at = self.tick + delay;
        self.enqueue(at, Scheduled { handle, payload, delay, recurring });
        handle
    }

    fn enqueue(&mut self, at: u64, event: Scheduled<T>) {
        self.queue.entry(at).or_default().push(event);
    }

    /// Fire everything due this tick, then move the clock forward.
    /// Returns the fired payloads in firing order.
    pub fn advance(&mut self) -> Vec<Fired<T>> {
        let now = self.tick;
        let mut fired = Vec::new();

        if let Some(bucket) = self.queue.remove(&now) {
            for event in bucket {
                fired.push(Fired { handle: event.handle, tick: now, payload: event.payload.clone() });
                if event.recurring {
                    self.enqueue(now + event.delay, event);
                }
            }
        }

        self.tick += 1;
        fired
    }

    /// Remove a pending event. Returns false if it already fired
    /// (one-shot) or was cancelled before.
    pub fn cancel(&mut self, handle: EventHandle) -> bool {
        let mut removed = false;
        for bucket in self.queue.values_mut() {
            let before = bucket.len();
            bucket.retain(|e| e.handle != handle);
            removed |= bucket.len() != before;
        }
        self.queue.retain(|_, bucket| !bucket.is_empty());
        removed
    }

    pub fn is_pending(&self, handle: EventHandle) -> bool {
        self.queue.values().any(|b| b.iter().any(|e| e.handle == handle))
    }

    /// Number of events waiting to fire.
    pub fn pending(&self) -> usize {
        self.queue.values().map(Vec::len).sum()
    }
}

impl<T: Clone> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
