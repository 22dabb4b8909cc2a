use rand::rngs::{OsRng, SmallRng, StdRng};
use rand::{RngCore, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// Uniform integer source for shuffling.
///
/// Draws 32-bit values from the operating system CSPRNG when it is
/// available and applies rejection sampling, so `uniform_int` is exactly
/// uniform over its range rather than approximately so. A table host
/// without a working OS RNG degrades to a time-seeded `SmallRng`; that
/// weakens unpredictability but not uniformity.
#[derive(Debug)]
pub struct UniformRng {
    backend: Backend,
}

#[derive(Debug)]
enum Backend {
    Os(OsRng),
    Seeded(StdRng),
    Fallback(SmallRng),
}

impl UniformRng {
    /// Preferred constructor: OS CSPRNG, with the degraded fallback.
    pub fn secure() -> Self {
        let mut probe = [0u8; 4];
        if OsRng.try_fill_bytes(&mut probe).is_ok() {
            return Self { backend: Backend::Os(OsRng) };
        }
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Self {
            backend: Backend::Fallback(SmallRng::seed_from_u64(nanos)),
        }
    }

    /// Deterministic source for tests, replays and simulations.
    pub fn seeded(seed: u64) -> Self {
        Self {
            backend: Backend::Seeded(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn is_secure(&self) -> bool {
        matches!(self.backend, Backend::Os(_))
    }

    fn next_u32(&mut self) -> u32 {
        match &mut self.backend {
            Backend::Os(rng) => rng.next_u32(),
            Backend::Seeded(rng) => rng.next_u32(),
            Backend::Fallback(rng) => rng.next_u32(),
        }
    }

    /// Uniform integer in `[0, max_exclusive)`.
    ///
    /// Rejection sampling over the full 2^32 draw range: values at or above
    /// `(2^32 / max) * max` are redrawn, which removes modulo bias exactly.
    /// `uniform_int(0)` returns 0; the degenerate range is not an error.
    pub fn uniform_int(&mut self, max_exclusive: u32) -> u32 {
        if max_exclusive == 0 {
            return 0;
        }
        let max = u64::from(max_exclusive);
        let limit = ((1u64 << 32) / max) * max;
        loop {
            let value = u64::from(self.next_u32());
            if value < limit {
                return (value % max) as u32;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::UniformRng;

    #[test]
    fn values_stay_below_the_bound() {
        let mut rng = UniformRng::seeded(7);
        for max in [1u32, 2, 3, 13, 52, 416] {
            for _ in 0..1_000 {
                assert!(rng.uniform_int(max) < max);
            }
        }
    }

    #[test]
    fn degenerate_range_returns_zero() {
        let mut rng = UniformRng::seeded(7);
        assert_eq!(rng.uniform_int(0), 0);
        assert_eq!(rng.uniform_int(1), 0);
    }

    #[test]
    fn seeded_sources_are_reproducible() {
        let mut a = UniformRng::seeded(42);
        let mut b = UniformRng::seeded(42);
        let draws_a: Vec<u32> = (0..64).map(|_| a.uniform_int(52)).collect();
        let draws_b: Vec<u32> = (0..64).map(|_| b.uniform_int(52)).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[test]
    fn every_residue_is_reachable() {
        let mut rng = UniformRng::seeded(99);
        let mut seen = [false; 13];
        for _ in 0..10_000 {
            seen[rng.uniform_int(13) as usize] = true;
        }
        assert!(seen.iter().all(|&hit| hit));
    }

    #[test]
    fn secure_source_constructs() {
        let mut rng = UniformRng::secure();
        assert!(rng.uniform_int(10) < 10);
    }
}
