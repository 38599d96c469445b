//! # State history
//!
//! A fixed-capacity ring buffer. Once full, pushing a new item overwrites the
//! oldest one, so eviction never moves any other item.

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Bounded history of items in arrival order.
#[derive(Debug, Clone)]
pub struct History<T> {
    buf: Vec<T>,
    capacity: usize,

    /// Index of the oldest item once the buffer is full. Zero until then.
    head: usize
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<T> History<T> {

    /// Create an empty history holding at most `capacity` items.
    ///
    /// A history with zero capacity silently discards everything pushed into
    /// it.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
            head: 0
        }
    }

    /// Append an item, evicting the oldest if the history is full.
    pub fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return
        }

        if self.buf.len() < self.capacity {
            self.buf.push(item);
        }
        else {
            self.buf[self.head] = item;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    /// Iterate from the oldest to the newest item.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let (newer, older) = self.buf.split_at(self.head);
        older.iter().chain(newer.iter())
    }

    /// The most recently pushed item.
    pub fn latest(&self) -> Option<&T> {
        if self.buf.is_empty() {
            None
        }
        else if self.head == 0 {
            self.buf.last()
        }
        else {
            self.buf.get(self.head - 1)
        }
    }

    /// The oldest item still held.
    pub fn oldest(&self) -> Option<&T> {
        self.buf.get(self.head)
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.capacity > 0 && self.buf.len() == self.capacity
    }

    /// Remove every item, keeping the capacity.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.head = 0;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fill_and_evict() {
        let mut h = History::with_capacity(3);
        assert!(h.is_empty());
        assert_eq!(h.latest(), None);
        assert_eq!(h.oldest(), None);

        h.push(1);
        h.push(2);
        assert_eq!(h.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(h.latest(), Some(&2));
        assert_eq!(h.oldest(), Some(&1));
        assert!(!h.is_full());

        h.push(3);
        assert!(h.is_full());

        h.push(4);
        h.push(5);
        assert_eq!(h.len(), 3);
        assert_eq!(h.iter().copied().collect::<Vec<_>>(), vec![3, 4, 5]);
        assert_eq!(h.latest(), Some(&5));
        assert_eq!(h.oldest(), Some(&3));

        // Wrap the head all the way round
        h.push(6);
        assert_eq!(h.iter().copied().collect::<Vec<_>>(), vec![4, 5, 6]);
        assert_eq!(h.latest(), Some(&6));

        h.clear();
        assert!(h.is_empty());
        assert_eq!(h.capacity(), 3);
    }

    #[test]
    fn test_long_run() {
        let mut h = History::with_capacity(1000);
        for i in 0..2500 {
            h.push(i);
        }

        assert_eq!(h.len(), 1000);
        assert_eq!(h.oldest(), Some(&1500));
        assert_eq!(h.latest(), Some(&2499));
        assert!(h.iter().zip(1500..2500).all(|(&a, b)| a == b));
    }

    #[test]
    fn test_zero_capacity() {
        let mut h = History::with_capacity(0);
        h.push(1);
        assert!(h.is_empty());
        assert!(!h.is_full());
        assert_eq!(h.latest(), None);
    }
}
