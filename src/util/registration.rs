use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// Counts an open connection: adds 1 on instantiation, subtracts 1 on drop.
///
/// The guard travels with the connection task into the worker, so the count
/// drops as soon as the request is done.
pub(crate) struct ConnectionGuard {
    count: Arc<AtomicUsize>,
}

impl ConnectionGuard {
    pub(crate) fn new(count: Arc<AtomicUsize>) -> Self {
        let _ = count.fetch_add(1, Ordering::Release);
        Self { count }
    }

    /// Current number of registered connections, this one included.
    pub(crate) fn value(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let _ = self.count.fetch_sub(1, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::ConnectionGuard;

    #[test]
    fn guard_counts_test() {
        let count = Arc::new(AtomicUsize::new(0));

        let first = ConnectionGuard::new(Arc::clone(&count));
        assert_eq!(first.value(), 1);

        {
            let second = ConnectionGuard::new(Arc::clone(&count));
            assert_eq!(second.value(), 2);
        }

        assert_eq!(count.load(Ordering::Acquire), 1);
        drop(first);
        assert_eq!(count.load(Ordering::Acquire), 0);
    }
}
