use std::{
    mem,
    ops::{Deref, DerefMut},
    sync::Mutex,
};

/// How many returned buffers the pool keeps around for reuse
const MAX_RETAINED: usize = 8;

/// Bounded pool of reusable argument buffers.
///
/// `rent` never blocks waiting for a slot: when the free list is empty a new
/// buffer is allocated, and requests larger than `max_length` fall back to an
/// exact-size allocation that is simply discarded on return.
///
/// Buffers are not zeroed between uses - a lease starts at length zero and
/// renters only read what they pushed themselves.
pub struct CappedBufferPool<T> {
    max_length: usize,
    slots: Mutex<Vec<Vec<T>>>,
}

impl<T> CappedBufferPool<T> {
    pub fn new(max_length: usize) -> Self {
        CappedBufferPool {
            max_length,
            slots: Mutex::new(Vec::new()),
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Checks out a buffer with capacity for at least `length` elements
    pub fn rent(&self, length: usize) -> BufferLease<'_, T> {
        if length > self.max_length {
            // Beyond the pool's ceiling: allocate exactly, don't pool
            return BufferLease {
                pool: None,
                buffer: Vec::with_capacity(length),
            };
        }

        let buffer = self
            .slots
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(self.max_length));

        BufferLease {
            pool: Some(self),
            buffer,
        }
    }

    fn restore(&self, mut buffer: Vec<T>) {
        buffer.clear();

        let mut slots = self.slots.lock().unwrap();
        if slots.len() < MAX_RETAINED {
            slots.push(buffer);
        }
    }

    #[cfg(test)]
    fn retained(&self) -> usize {
        self.slots.lock().unwrap().len()
    }
}

/// A rented buffer, returned to its pool on drop.
///
/// Dropping is the guaranteed-release point: the buffer goes back on every
/// exit path of the renting call, whether injection succeeded or failed.
pub struct BufferLease<'a, T> {
    pool: Option<&'a CappedBufferPool<T>>,
    buffer: Vec<T>,
}

impl<T> Deref for BufferLease<'_, T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Self::Target {
        &self.buffer
    }
}

impl<T> DerefMut for BufferLease<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buffer
    }
}

impl<T> Drop for BufferLease<'_, T> {
    fn drop(&mut self) {
        if let Some(pool) = self.pool {
            pool.restore(mem::take(&mut self.buffer));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returned_buffers_are_reused() {
        let pool = CappedBufferPool::<u8>::new(8);

        let first_ptr = {
            let mut lease = pool.rent(3);
            lease.push(1);
            lease.as_ptr()
        };
        assert_eq!(pool.retained(), 1);

        let lease = pool.rent(5);
        assert_eq!(lease.as_ptr(), first_ptr);
        assert!(lease.is_empty(), "reused buffer must come back empty");
    }

    #[test]
    fn oversized_rents_allocate_and_are_not_pooled() {
        let pool = CappedBufferPool::<u8>::new(8);

        {
            let mut lease = pool.rent(10);
            assert!(lease.capacity() >= 10);
            for i in 0..10 {
                lease.push(i);
            }
        }

        assert_eq!(pool.retained(), 0);
    }

    #[test]
    fn retained_buffers_are_bounded() {
        let pool = CappedBufferPool::<u8>::new(8);

        let leases: Vec<_> = (0..12).map(|_| pool.rent(1)).collect();
        drop(leases);

        assert_eq!(pool.retained(), MAX_RETAINED);
    }

    #[test]
    fn concurrent_renters_never_share_a_buffer() {
        use std::sync::Arc;
        use std::thread;

        let pool = Arc::new(CappedBufferPool::<usize>::new(8));
        let mut handles = Vec::new();

        for worker in 0..4 {
            let pool = Arc::clone(&pool);
            handles.push(thread::spawn(move || {
                for round in 0..500 {
                    let mut lease = pool.rent(4);
                    for i in 0..4 {
                        lease.push(worker * 1000 + round + i);
                    }
                    // Everything read back must be what this renter wrote
                    for i in 0..4 {
                        assert_eq!(lease[i], worker * 1000 + round + i);
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
