//! Order Tracker Module
//!
//! Sequence-ordered key index shared by both eviction policies.

use std::collections::{BTreeMap, HashMap};

// == Order Tracker ==
/// Assigns each tracked key a unique, strictly increasing sequence number.
///
/// The smallest live sequence is always the next eviction candidate:
/// - Touch only on insertion = FIFO-by-insertion
/// - Touch on every access = LRU
#[derive(Debug, Default)]
pub struct OrderTracker {
    /// Current sequence of each key
    positions: HashMap<String, u64>,
    /// Keys ordered by sequence (first = oldest)
    order: BTreeMap<u64, String>,
    /// Last sequence handed out; never reused
    last_sequence: u64,
}

impl OrderTracker {
    // == Constructor ==
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Moves a key to the newest position and returns its new sequence.
    ///
    /// Unknown keys are added; known keys are re-sequenced.
    pub fn touch(&mut self, key: &str) -> u64 {
        self.remove(key);
        self.last_sequence += 1;
        let sequence = self.last_sequence;
        self.positions.insert(key.to_string(), sequence);
        self.order.insert(sequence, key.to_string());
        sequence
    }

    // == Remove ==
    /// Stops tracking a key, returning the sequence it held.
    pub fn remove(&mut self, key: &str) -> Option<u64> {
        let sequence = self.positions.remove(key)?;
        self.order.remove(&sequence);
        Some(sequence)
    }

    // == Evict Oldest ==
    /// Returns and removes the key with the smallest sequence.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.positions.remove(&key);
        Some(key)
    }

    // == Peek Oldest ==
    /// Returns the key with the smallest sequence without removing it.
    #[cfg(test)]
    pub fn peek_oldest(&self) -> Option<&str> {
        self.order.first_key_value().map(|(_, key)| key.as_str())
    }

    /// Returns the current sequence of a key.
    #[cfg(test)]
    pub fn sequence_of(&self, key: &str) -> Option<u64> {
        self.positions.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }
}
