//! Client-side chronological id generation.
//!
//! Ids are minted locally so callers can reference a new document before any
//! write round-trips, and they sort lexicographically in creation order so
//! the store never has to maintain a counter.
//!
//! DESIGN
//! ======
//! An id is 20 characters over a 64-symbol alphabet chosen to be ASCII
//! ascending, so plain string comparison is chronological comparison. The
//! first 8 characters encode the millisecond timestamp, the remaining 12 are
//! random entropy. Ids minted in the same millisecond reuse the previous
//! entropy incremented by one, which keeps them unique and ordered even when
//! the clock cannot tell them apart.

#[cfg(test)]
#[path = "push_id_test.rs"]
mod push_id_test;

use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

/// 64 symbols in ascending ASCII order.
const ALPHABET: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

const TIMESTAMP_CHARS: usize = 8;
const ENTROPY_CHARS: usize = 12;

/// Thread-safe generator of chronologically sortable ids.
pub struct PushIdGenerator {
    state: Mutex<State>,
}

struct State {
    last_time_ms: u64,
    entropy: [u8; ENTROPY_CHARS],
}

impl PushIdGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                last_time_ms: 0,
                entropy: [0; ENTROPY_CHARS],
            }),
        }
    }

    /// Mint a fresh id for the current wall-clock time.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.next(epoch_millis())
    }
}

impl Default for PushIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    fn next(&mut self, now_ms: u64) -> String {
        if now_ms == self.last_time_ms {
            increment(&mut self.entropy);
        } else {
            let mut rng = rand::rng();
            for slot in &mut self.entropy {
                *slot = rng.random_range(0..ALPHABET.len() as u8);
            }
        }
        self.last_time_ms = now_ms;

        let mut stamp = [0u8; TIMESTAMP_CHARS];
        let mut remaining = now_ms;
        for slot in stamp.iter_mut().rev() {
            *slot = ALPHABET[(remaining % 64) as usize];
            remaining /= 64;
        }

        let mut id = String::with_capacity(TIMESTAMP_CHARS + ENTROPY_CHARS);
        id.extend(stamp.iter().map(|&byte| byte as char));
        id.extend(self.entropy.iter().map(|&slot| ALPHABET[slot as usize] as char));
        id
    }
}

// Ripple-carry increment over the entropy digits, least significant first.
fn increment(entropy: &mut [u8; ENTROPY_CHARS]) {
    for slot in entropy.iter_mut().rev() {
        if *slot == 63 {
            *slot = 0;
        } else {
            *slot += 1;
            return;
        }
    }
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}
