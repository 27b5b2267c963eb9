use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Process-wide cap on concurrently running analyses. Cloning shares the
/// same counter.
#[derive(Debug, Clone)]
pub struct RequestLimiter {
    in_flight: Arc<AtomicUsize>,
    max_in_flight: usize,
}

/// Held for the duration of one analysis; releases its slot on drop.
#[derive(Debug)]
pub struct Permit {
    in_flight: Arc<AtomicUsize>,
}

impl RequestLimiter {
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: max_in_flight.max(1),
        }
    }

    pub fn try_acquire(&self) -> Option<Permit> {
        self.in_flight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current < self.max_in_flight).then_some(current + 1)
            })
            .ok()
            .map(|_| Permit {
                in_flight: Arc::clone(&self.in_flight),
            })
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn capacity(&self) -> usize {
        self.max_in_flight
    }
}

impl Drop for Permit {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_beyond_capacity() {
        let limiter = RequestLimiter::new(2);

        let a = limiter.try_acquire();
        let b = limiter.try_acquire();
        assert!(a.is_some() && b.is_some());
        assert!(limiter.try_acquire().is_none());
        assert_eq!(limiter.in_flight(), 2);

        drop(a);
        assert_eq!(limiter.in_flight(), 1);
        assert!(limiter.try_acquire().is_some());
    }

    #[test]
    fn test_clones_share_counter() {
        let limiter = RequestLimiter::new(1);
        let shared = limiter.clone();

        let _permit = limiter.try_acquire().unwrap();
        assert!(shared.try_acquire().is_none());
        assert_eq!(shared.in_flight(), 1);
    }

    #[test]
    fn test_zero_capacity_allows_one() {
        assert_eq!(RequestLimiter::new(0).capacity(), 1);
    }

    #[test]
    fn test_concurrent_acquire_never_exceeds_capacity() {
        let limiter = RequestLimiter::new(3);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || limiter.try_acquire())
            })
            .collect();

        let permits: Vec<Permit> = handles
            .into_iter()
            .filter_map(|h| h.join().unwrap())
            .collect();

        assert_eq!(permits.len(), 3);
        drop(permits);
        assert_eq!(limiter.in_flight(), 0);
    }
}
