#![forbid(unsafe_code)]
use parking_lot::Mutex;
use std::collections::TryReserveError;
use std::ops::Deref;
use std::ops::DerefMut;

pub struct MemPool<T> {
    bufs: Mutex<Vec<Vec<T>>>,
}

impl<T> MemPool<T> {
    pub const fn new() -> Self {
        Self {
            bufs: Mutex::new(Vec::new()),
        }
    }

    /// Pop a buffer of at least `size` initialized elements.
    /// A fresh buffer is reserved with [`Vec::try_reserve`], so allocation
    /// failure is an error, and then filled with `init_value`.
    ///
    /// Recycled buffers keep their previous contents.
    pub fn pop_init(&self, size: usize, init_value: T) -> Result<Vec<T>, TryReserveError>
    where
        T: Copy,
    {
        if let Some(buf) = self.bufs.lock().pop() {
            if size <= buf.len() {
                return Ok(buf);
            }
        }
        let mut buf = Vec::new();
        buf.try_reserve(size)?;
        buf.resize(size, init_value);
        Ok(buf)
    }

    pub fn push(&self, buf: Vec<T>) {
        self.bufs.lock().push(buf);
    }

    /// Like [`Self::pop_init`], but the buffer goes back to the pool
    /// when the guard is dropped.
    pub fn acquire(&self, size: usize, init_value: T) -> Result<PooledBuf<'_, T>, TryReserveError>
    where
        T: Copy,
    {
        let buf = self.pop_init(size, init_value)?;
        Ok(PooledBuf {
            pool: self,
            buf,
            len: size,
        })
    }

    /// Number of idle buffers.
    pub fn idle(&self) -> usize {
        self.bufs.lock().len()
    }
}

impl<T> Default for MemPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped loan of a [`MemPool`] buffer, returned on drop (including unwinding).
pub struct PooledBuf<'a, T> {
    pool: &'a MemPool<T>,
    buf: Vec<T>,
    len: usize,
}

impl<T> Deref for PooledBuf<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.buf[..self.len]
    }
}

impl<T> DerefMut for PooledBuf<'_, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.buf[..self.len]
    }
}

impl<T> Drop for PooledBuf<'_, T> {
    fn drop(&mut self) {
        self.pool.push(std::mem::take(&mut self.buf));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_returns_buffer() {
        let pool = MemPool::<i16>::new();
        {
            let mut a = pool.acquire(64, 0).unwrap();
            assert_eq!(a.len(), 64);
            a[63] = 7;
            assert_eq!(pool.idle(), 0);
        }
        assert_eq!(pool.idle(), 1);

        // Smaller request reuses the same allocation, view is trimmed.
        let b = pool.acquire(16, 0).unwrap();
        assert_eq!(b.len(), 16);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn guard_returns_buffer_on_panic() {
        let pool = MemPool::<i16>::new();
        let r = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _buf = pool.acquire(8, 0).unwrap();
            panic!("boom");
        }));
        assert!(r.is_err());
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn larger_request_allocates_fresh() {
        let pool = MemPool::<u8>::new();
        drop(pool.acquire(4, 1).unwrap());
        let big = pool.acquire(32, 1).unwrap();
        assert_eq!(big.len(), 32);
        assert!(big.iter().all(|&v| v == 1));
    }

    #[test]
    fn fresh_buffers_take_init_value_recycled_keep_contents() {
        let pool = MemPool::<i16>::new();
        let mut buf = pool.pop_init(8, -3).unwrap();
        assert_eq!(buf, [-3; 8]);
        buf[0] = 5;
        pool.push(buf);
        let again = pool.pop_init(8, 0).unwrap();
        assert_eq!(again[0], 5);
        assert!(pool.pop_init(usize::MAX, 0).is_err());
    }
}
