use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Clone, Copy, Debug)]
struct Entry {
    due: f64,
    id: TimerId,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// earlier deadline first; ties go to whichever was scheduled first
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due.total_cmp(&other.due).then(self.id.0.cmp(&other.id.0))
    }
}

/// Deadline-ordered one-shot timers with O(1) cancellation.
///
/// Cancelling only forgets the payload; the heap entry is skipped when it
/// surfaces. A timer fires at most once and never after it was cancelled.
pub struct TimerQueue<E> {
    next_id: u64,
    heap: BinaryHeap<Reverse<Entry>>,
    live: HashMap<TimerId, E>,
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            heap: BinaryHeap::new(),
            live: HashMap::new(),
        }
    }

    pub fn schedule(&mut self, due: f64, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.heap.push(Reverse(Entry { due, id }));
        self.live.insert(id, event);
        self.compact();
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.live.remove(&id).is_some()
    }

    pub fn pending(&self) -> usize {
        self.live.len()
    }

    // earliest timer due at or before `now`
    pub fn pop_due(&mut self, now: f64) -> Option<(TimerId, f64, E)> {
        self.skip_cancelled();
        let Reverse(top) = *self.heap.peek()?;
        if top.due > now {
            return None;
        }
        self.heap.pop();
        let event = self.live.remove(&top.id)?;
        Some((top.id, top.due, event))
    }

    fn skip_cancelled(&mut self) {
        while let Some(Reverse(top)) = self.heap.peek() {
            if self.live.contains_key(&top.id) {
                break;
            }
            self.heap.pop();
        }
    }

    // cancelled entries pile up under rapid start/stop; rebuild once they dominate
    fn compact(&mut self) {
        if self.heap.len() > 64 && self.heap.len() > self.live.len() * 4 {
            let live = &self.live;
            self.heap.retain(|Reverse(e)| live.contains_key(&e.id));
        }
    }
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_deadline_order() {
        let mut q = TimerQueue::new();
        q.schedule(2.0, "b");
        q.schedule(1.0, "a");
        q.schedule(2.0, "c");
        assert_eq!(q.pop_due(0.5).map(|t| t.2), None);
        assert_eq!(q.pop_due(5.0).map(|t| t.2), Some("a"));
        assert_eq!(q.pop_due(5.0).map(|t| t.2), Some("b"));
        assert_eq!(q.pop_due(5.0).map(|t| t.2), Some("c"));
        assert_eq!(q.pop_due(5.0).map(|t| t.2), None);
        assert_eq!(q.pending(), 0);
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut q = TimerQueue::new();
        let a = q.schedule(1.0, 1);
        q.schedule(2.0, 2);
        assert!(q.cancel(a));
        assert!(!q.cancel(a));
        assert_eq!(q.pending(), 1);
        assert_eq!(q.pop_due(10.0).map(|t| (t.1, t.2)), Some((2.0, 2)));
    }

    #[test]
    fn test_due_exactly_now_fires() {
        let mut q = TimerQueue::new();
        q.schedule(0.25, ());
        assert!(q.pop_due(0.25).is_some());
    }

    #[test]
    fn test_compaction_keeps_live_timers() {
        let mut q = TimerQueue::new();
        q.schedule(100.0, "keep");
        for i in 0..500 {
            let id = q.schedule(i as f64, "drop");
            q.cancel(id);
        }
        assert!(q.heap.len() < 500);
        assert_eq!(q.pending(), 1);
        assert_eq!(q.pop_due(1000.0).map(|t| t.2), Some("keep"));
    }
}
