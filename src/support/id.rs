//! Identifier generation for chargers, outbound calls and transactions

use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};

use chrono::Utc;
use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Random identifier for a charger that connected without a path segment.
pub fn random_charger_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("client-{}", suffix)
}

/// Generates `<Action>-<unix millis>-<seq>` message ids for outbound calls.
///
/// Unique for the lifetime of the process only.
#[derive(Debug, Default)]
pub struct MessageIdGenerator {
    counter: AtomicU64,
}

impl MessageIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, action: &str) -> String {
        let seq = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}-{}-{}", action, Utc::now().timestamp_millis(), seq)
    }
}

/// Start of the transaction id clock, 2024-01-01T00:00:00Z.
const TRANSACTION_EPOCH: i64 = 1_704_067_200;

/// Monotonic transaction ids, seeded from the seconds elapsed since
/// [`TRANSACTION_EPOCH`].
///
/// OCPP 1.6 carries transactionId as a 32-bit integer; the seed is clamped
/// to half of that range.
#[derive(Debug)]
pub struct TransactionIdGenerator {
    next: AtomicI32,
}

impl TransactionIdGenerator {
    pub fn new() -> Self {
        Self::starting_at(seed_at(Utc::now().timestamp()))
    }

    pub fn starting_at(seed: i32) -> Self {
        Self {
            next: AtomicI32::new(seed),
        }
    }

    pub fn next(&self) -> i32 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

fn seed_at(unix_seconds: i64) -> i32 {
    (unix_seconds - TRANSACTION_EPOCH).clamp(1, i64::from(i32::MAX / 2)) as i32
}

impl Default for TransactionIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_charger_id_shape() {
        let id = random_charger_id();
        let suffix = id.strip_prefix("client-").expect("prefix");
        assert_eq!(suffix.len(), 9);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn message_ids_are_action_prefixed_and_distinct() {
        let ids = MessageIdGenerator::new();
        let a = ids.next("RemoteStartTransaction");
        let b = ids.next("RemoteStartTransaction");
        assert!(a.starts_with("RemoteStartTransaction-"));
        assert_ne!(a, b);
    }

    #[test]
    fn transaction_ids_are_monotonic() {
        let ids = TransactionIdGenerator::starting_at(100);
        assert_eq!(ids.next(), 100);
        assert_eq!(ids.next(), 101);
        assert!(TransactionIdGenerator::new().next() > 0);
    }

    #[test]
    fn transaction_seed_moves_with_the_clock() {
        let now = Utc::now().timestamp();
        let seed = seed_at(now);
        assert!(seed > 1 && seed < i32::MAX / 2);
        assert_eq!(seed_at(now + 60), seed + 60);
        assert_eq!(seed_at(0), 1);
    }
}
