//! Bitfinex Nonce
//!
//! The exchange rejects any signed request whose nonce is not larger than
//! every nonce it already accepted for the same key. Wall-clock microseconds
//! alone collide under rapid calls, so the generator issues
//! `max(now, last + 1)`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use crate::adapters::types::current_time_micros;

/// Process-wide generator shared by every client that does not bring its own
static SHARED_NONCE: OnceLock<Arc<NonceGenerator>> = OnceLock::new();

/// Strictly increasing nonce source, safe to call from many threads
#[derive(Debug, Default)]
pub struct NonceGenerator {
    last: AtomicU64,
}

impl NonceGenerator {
    pub const fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// Generator whose first nonce is at least `n + 1`
    pub const fn starting_at(n: u64) -> Self {
        Self {
            last: AtomicU64::new(n),
        }
    }

    /// The generator used by clients unless one is injected
    pub fn shared() -> Arc<NonceGenerator> {
        Arc::clone(SHARED_NONCE.get_or_init(|| Arc::new(NonceGenerator::new())))
    }

    /// Next nonce: wall-clock microseconds, bumped past the last issued value
    pub fn next(&self) -> u64 {
        let now = current_time_micros();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last.saturating_add(1));
            match self
                .last
                .compare_exchange_weak(last, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => last = actual,
            }
        }
    }

    /// Raise the floor so the next nonce is at least `floor + 1`; never lowers it
    pub fn advance_to(&self, floor: u64) {
        self.last.fetch_max(floor, Ordering::AcqRel);
    }

    /// Last value handed out (0 if none yet)
    pub fn last_issued(&self) -> u64 {
        self.last.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_nonce_is_wall_clock_micros() {
        let before = current_time_micros();
        let nonce = NonceGenerator::new().next();
        let after = current_time_micros();
        assert!(nonce >= before && nonce <= after);
    }

    #[test]
    fn test_nonce_strictly_increasing_in_tight_loop() {
        let generator = NonceGenerator::new();
        let mut previous = generator.next();
        for _ in 0..10_000 {
            let next = generator.next();
            assert!(next > previous, "{} not > {}", next, previous);
            previous = next;
        }
        assert_eq!(generator.last_issued(), previous);
    }

    #[test]
    fn test_nonce_ahead_of_clock_keeps_incrementing() {
        // Seeded far in the future: the clock never catches up, every call is +1
        let seed = current_time_micros() + 3_600_000_000;
        let generator = NonceGenerator::starting_at(seed);
        assert_eq!(generator.next(), seed + 1);
        assert_eq!(generator.next(), seed + 2);
    }

    #[test]
    fn test_advance_to_only_raises() {
        let seed = current_time_micros() * 1_000;
        let generator = NonceGenerator::new();
        generator.advance_to(seed);
        assert_eq!(generator.next(), seed + 1);

        generator.advance_to(seed - 10);
        assert_eq!(generator.next(), seed + 2);
    }

    #[test]
    fn test_nonce_unique_across_threads() {
        let generator = Arc::new(NonceGenerator::new());
        let per_thread = 2_000;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let generator = Arc::clone(&generator);
                std::thread::spawn(move || {
                    let mut seen = Vec::with_capacity(per_thread);
                    for _ in 0..per_thread {
                        seen.push(generator.next());
                    }
                    seen
                })
            })
            .collect();

        let mut all = HashSet::new();
        for handle in handles {
            let seen = handle.join().unwrap();
            // Each thread observes its own values in increasing order
            assert!(seen.windows(2).all(|w| w[1] > w[0]));
            all.extend(seen);
        }
        assert_eq!(all.len(), 8 * per_thread);
    }

    #[test]
    fn test_shared_generator_is_singleton() {
        let a = NonceGenerator::shared();
        let b = NonceGenerator::shared();
        assert!(Arc::ptr_eq(&a, &b));
        let first = a.next();
        assert!(b.next() > first);
    }
}
