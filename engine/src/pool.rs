/// Capacity-bounded recycling store for short-lived records.
///
/// `acquire` never fails: when the free list is empty a fresh default
/// instance is allocated. Only `release` is bounded, so the pool caps
/// retained memory without ever blocking creation.
#[derive(Debug)]
pub struct Pool<T> {
    free: Vec<T>,
    capacity: usize,
}

impl<T: Default> Pool<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Pop a recycled instance, or allocate a blank one if the pool is
    /// empty. Callers must overwrite every field they care about.
    pub fn acquire(&mut self) -> T {
        self.free.pop().unwrap_or_default()
    }

    /// Return an instance to the pool, discarding it if the pool is full.
    pub fn release(&mut self, item: T) {
        if self.free.len() < self.capacity {
            self.free.push(item);
        }
    }

    pub fn len(&self) -> usize {
        self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
