// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! The queue of pending wakeups.
//!
//! Wakeups are ordered by virtual time and then by the ID of the task that
//! scheduled them. Task IDs are allocated in spawn order, so tasks due at the
//! same instant always resume in the order they were spawned.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::task::Waker;

/// Identifier given to each task when it is spawned.
pub type TaskId = usize;

struct Wakeup {
    at: f64,
    task: TaskId,
    waker: Waker,
}

impl PartialEq for Wakeup {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Wakeup {}

/// Reversed so that the [`BinaryHeap`] pops the earliest wakeup first.
impl Ord for Wakeup {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .total_cmp(&self.at)
            .then_with(|| other.task.cmp(&self.task))
    }
}

impl PartialOrd for Wakeup {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-heap of wakers keyed by `(time, task)`.
#[derive(Default)]
pub struct EventQueue {
    heap: BinaryHeap<Wakeup>,
}

impl EventQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a waker to be woken at time `at`.
    pub fn push(&mut self, at: f64, task: TaskId, waker: Waker) {
        self.heap.push(Wakeup { at, task, waker });
    }

    /// Time of the earliest pending wakeup.
    #[must_use]
    pub fn next_time(&self) -> Option<f64> {
        self.heap.peek().map(|w| w.at)
    }

    /// Remove every wakeup due at exactly `at`, in task order.
    pub fn pop_due(&mut self, at: f64) -> Vec<Waker> {
        let mut wakers = Vec::new();
        while let Some(next) = self.heap.peek() {
            if next.at.total_cmp(&at) != Ordering::Equal {
                break;
            }
            if let Some(wakeup) = self.heap.pop() {
                wakers.push(wakeup.waker);
            }
        }
        wakers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::task::Wake;

    use super::*;

    struct Recorder {
        id: usize,
        woken: Arc<Mutex<Vec<usize>>>,
    }

    impl Wake for Recorder {
        fn wake(self: Arc<Self>) {
            self.woken.lock().unwrap().push(self.id);
        }
    }

    fn recorder(id: usize, woken: &Arc<Mutex<Vec<usize>>>) -> Waker {
        Waker::from(Arc::new(Recorder {
            id,
            woken: woken.clone(),
        }))
    }

    #[test]
    fn earliest_time_first() {
        let woken = Arc::new(Mutex::new(Vec::new()));
        let mut queue = EventQueue::new();
        queue.push(3.0, 0, recorder(0, &woken));
        queue.push(1.5, 1, recorder(1, &woken));
        queue.push(2.0, 2, recorder(2, &woken));

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.next_time(), Some(1.5));
        for w in queue.pop_due(1.5) {
            w.wake();
        }
        assert_eq!(queue.next_time(), Some(2.0));
        for w in queue.pop_due(2.0) {
            w.wake();
        }
        assert_eq!(queue.next_time(), Some(3.0));
        for w in queue.pop_due(3.0) {
            w.wake();
        }
        assert!(queue.is_empty());
        assert_eq!(*woken.lock().unwrap(), vec![1, 2, 0]);
    }

    #[test]
    fn same_time_in_task_order() {
        let woken = Arc::new(Mutex::new(Vec::new()));
        let mut queue = EventQueue::new();
        queue.push(4.0, 7, recorder(7, &woken));
        queue.push(4.0, 2, recorder(2, &woken));
        queue.push(5.0, 0, recorder(0, &woken));
        queue.push(4.0, 5, recorder(5, &woken));

        let due = queue.pop_due(4.0);
        assert_eq!(due.len(), 3);
        for w in due {
            w.wake();
        }
        assert_eq!(*woken.lock().unwrap(), vec![2, 5, 7]);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn nothing_due() {
        let woken = Arc::new(Mutex::new(Vec::new()));
        let mut queue = EventQueue::new();
        queue.push(4.0, 0, recorder(0, &woken));
        assert!(queue.pop_due(3.0).is_empty());
        assert_eq!(queue.len(), 1);
    }
}
