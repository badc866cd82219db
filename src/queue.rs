/// Bounded thread-safe queue between the transport and parser stages
///
/// A mutex-and-condvar FIFO with a fixed capacity. Items transfer by
/// move. `shutdown` is idempotent, wakes every waiter, and lets the
/// consumer drain items already queued before observing the shutdown,
/// so no accepted bytes are lost on stop.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use thiserror::Error;

/// Push rejected; the item is handed back to the caller.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TryPushError<T> {
    #[error("queue full")]
    Full(T),
    #[error("queue shut down")]
    Shutdown(T),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PushError<T> {
    #[error("queue shut down")]
    Shutdown(T),
}

struct QueueInner<T> {
    items: VecDeque<T>,
    shutdown: bool,
}

pub struct BoundedQueue<T> {
    inner: Mutex<QueueInner<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    pub fn new(capacity: usize) -> Self {
        BoundedQueue {
            inner: Mutex::new(QueueInner {
                items: VecDeque::with_capacity(capacity),
                shutdown: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        }
    }

    /// Push, blocking while the queue is full. Fails only after
    /// shutdown.
    pub fn push_blocking(&self, item: T) -> Result<(), PushError<T>> {
        let mut inner = self.inner.lock();
        while inner.items.len() >= self.capacity && !inner.shutdown {
            self.not_full.wait(&mut inner);
        }
        if inner.shutdown {
            return Err(PushError::Shutdown(item));
        }
        inner.items.push_back(item);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Push without blocking. On `Full` the caller owns the drop
    /// decision and must count the overflow.
    pub fn try_push(&self, item: T) -> Result<(), TryPushError<T>> {
        let mut inner = self.inner.lock();
        if inner.shutdown {
            return Err(TryPushError::Shutdown(item));
        }
        if inner.items.len() >= self.capacity {
            return Err(TryPushError::Full(item));
        }
        inner.items.push_back(item);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Pop, blocking while empty. After shutdown, queued items are
    /// still delivered; `None` means shut down and drained.
    pub fn pop_blocking(&self) -> Option<T> {
        let mut inner = self.inner.lock();
        while inner.items.is_empty() && !inner.shutdown {
            self.not_empty.wait(&mut inner);
        }
        let item = inner.items.pop_front();
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    pub fn try_pop(&self) -> Option<T> {
        let mut inner = self.inner.lock();
        let item = inner.items.pop_front();
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    /// Idempotent. Wakes all blocked producers and consumers.
    pub fn shutdown(&self) {
        let mut inner = self.inner.lock();
        inner.shutdown = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn is_shutdown(&self) -> bool {
        self.inner.lock().shutdown
    }

    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_fifo_order() {
        let queue = BoundedQueue::new(4);
        queue.try_push(1).unwrap();
        queue.try_push(2).unwrap();
        queue.try_push(3).unwrap();
        assert_eq!(queue.try_pop(), Some(1));
        assert_eq!(queue.try_pop(), Some(2));
        assert_eq!(queue.try_pop(), Some(3));
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn test_try_push_full_returns_item() {
        let queue = BoundedQueue::new(1);
        queue.try_push(10).unwrap();
        assert_eq!(queue.try_push(11), Err(TryPushError::Full(11)));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_push_after_shutdown_fails() {
        let queue = BoundedQueue::new(4);
        queue.shutdown();
        assert_eq!(queue.try_push(1), Err(TryPushError::Shutdown(1)));
        assert_eq!(queue.push_blocking(2), Err(PushError::Shutdown(2)));
    }

    #[test]
    fn test_shutdown_drains_before_none() {
        let queue = BoundedQueue::new(4);
        queue.try_push(1).unwrap();
        queue.try_push(2).unwrap();
        queue.shutdown();
        assert_eq!(queue.pop_blocking(), Some(1));
        assert_eq!(queue.pop_blocking(), Some(2));
        assert_eq!(queue.pop_blocking(), None);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let queue: BoundedQueue<u32> = BoundedQueue::new(4);
        queue.shutdown();
        queue.shutdown();
        assert!(queue.is_shutdown());
    }

    #[test]
    fn test_shutdown_wakes_blocked_consumer() {
        let queue: Arc<BoundedQueue<u32>> = Arc::new(BoundedQueue::new(4));
        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.pop_blocking())
        };
        queue.shutdown();
        assert_eq!(consumer.join().unwrap(), None);
    }

    #[test]
    fn test_blocking_push_waits_for_space() {
        let queue: Arc<BoundedQueue<u32>> = Arc::new(BoundedQueue::new(1));
        queue.try_push(1).unwrap();

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.push_blocking(2))
        };

        // Free a slot; the blocked producer must complete.
        assert_eq!(queue.pop_blocking(), Some(1));
        assert_eq!(producer.join().unwrap(), Ok(()));
        assert_eq!(queue.pop_blocking(), Some(2));
    }

    #[test]
    fn test_no_loss_no_duplication() {
        let queue: Arc<BoundedQueue<u64>> = Arc::new(BoundedQueue::new(16));
        const ITEMS: u64 = 10_000;

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..ITEMS {
                    queue.push_blocking(i).unwrap();
                }
                queue.shutdown();
            })
        };

        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let mut sum = 0u64;
                let mut count = 0u64;
                while let Some(item) = queue.pop_blocking() {
                    sum += item;
                    count += 1;
                }
                (sum, count)
            })
        };

        producer.join().unwrap();
        let (sum, count) = consumer.join().unwrap();
        assert_eq!(count, ITEMS);
        assert_eq!(sum, ITEMS * (ITEMS - 1) / 2);
    }
}
