/// Default number of request ids remembered by each suppressor.
pub const DEFAULT_REQUEST_MEMORY_SIZE: usize = 64;

/// Fixed-capacity memory of recently handled request ids. Once full, marking a new id
/// overwrites the oldest one.
#[derive(Debug, Clone)]
pub struct DuplicateSuppressor {
    slots: Vec<String>,
    capacity: usize,
    /// Slot that the next new id will be written into once the buffer is full
    next: usize,
}

impl Default for DuplicateSuppressor {
    fn default() -> Self {
        DuplicateSuppressor::new(DEFAULT_REQUEST_MEMORY_SIZE)
    }
}

impl DuplicateSuppressor {
    pub fn new(capacity: usize) -> Self {
        let capacity = std::cmp::max(capacity, 1);
        DuplicateSuppressor {
            slots: Vec::with_capacity(capacity),
            capacity,
            next: 0,
        }
    }

    pub fn has_handled(&self, id: &str) -> bool {
        self.slots.iter().any(|s| s == id)
    }

    /// Remembers `id`. Returns false if it was already remembered, in which case its
    /// position in the eviction order is unchanged.
    pub fn mark_handled(&mut self, id: &str) -> bool {
        if self.has_handled(id) {
            return false;
        }
        if self.slots.len() < self.capacity {
            self.slots.push(id.to_string());
        } else {
            self.slots[self.next] = id.to_string();
            self.next = (self.next + 1) % self.capacity;
        }
        true
    }

    /// Remembers `id` and reports whether it had been handled before.
    pub fn check_and_mark(&mut self, id: &str) -> bool {
        !self.mark_handled(id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
