use parking_lot::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Highest accepted resume point for a nonce sequence.
pub const MAX_NONCE_FLOOR: u64 = u64::MAX / 2;

/// Strictly increasing per-credential nonce sequence.
///
/// The first call seeds the sequence from the wall clock in 10 µs units, every
/// later call returns the previous value plus one. The seed only guarantees
/// uniqueness against earlier runs that issued fewer than ~100k nonces per second;
/// callers that need a hard guarantee across restarts persist [`last_issued`] and
/// construct the next generator with [`NonceGenerator::starting_after`].
///
/// Floors are clamped to [`MAX_NONCE_FLOOR`] so the sequence keeps half the `u64`
/// range as headroom. Past `u64::MAX` the sequence saturates.
///
/// [`last_issued`]: NonceGenerator::last_issued
#[derive(Debug, Default)]
pub struct NonceGenerator {
    last: Mutex<Option<u64>>,
    floor: u64,
}

impl NonceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first issued nonce is `max(clock seed, floor + 1)`.
    pub fn starting_after(floor: u64) -> Self {
        Self {
            last: Mutex::new(None),
            floor: floor.min(MAX_NONCE_FLOOR),
        }
    }

    pub fn next(&self) -> u64 {
        let mut last = self.last.lock();
        let nonce = match *last {
            Some(previous) => previous.saturating_add(1),
            None => clock_seed().max(self.floor + 1),
        };
        *last = Some(nonce);
        nonce
    }

    /// Highest nonce handed out so far, `None` before the first call.
    pub fn last_issued(&self) -> Option<u64> {
        *self.last.lock()
    }
}

fn clock_seed() -> u64 {
    // A clock before the epoch yields 0, the floor still applies.
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| (d.as_nanos() / 10_000) as u64)
        .unwrap_or_default()
}
