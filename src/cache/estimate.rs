//! Size Estimation Module
//!
//! Approximate, recursive memory footprint of cached values.
//!
//! Estimates are a sum of inline sizes (`size_of`) plus string byte lengths,
//! walked recursively through sequences and mappings. Allocator overhead and
//! spare capacity are ignored. Values reached through an `Arc` are counted
//! once per estimate: the pointer identity is recorded in `seen`, so shared
//! subtrees are not double counted and cyclic graphs terminate.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::mem::size_of;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};

// == Estimate Size ==
/// Capability every value stored in a size-bounded cache provides.
pub trait EstimateSize {
    /// Estimated footprint in bytes, skipping identities already in `seen`.
    fn estimate_size(&self, seen: &mut HashSet<usize>) -> usize;
}

/// Estimates a value with a fresh identity set.
pub fn estimate<T: EstimateSize + ?Sized>(value: &T) -> usize {
    let mut seen = HashSet::new();
    value.estimate_size(&mut seen)
}

macro_rules! impl_inline_size {
    ($($ty:ty),* $(,)?) => {
        $(
            impl EstimateSize for $ty {
                fn estimate_size(&self, _seen: &mut HashSet<usize>) -> usize {
                    size_of::<$ty>()
                }
            }
        )*
    };
}

impl_inline_size!(bool, char, u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64);

impl EstimateSize for str {
    fn estimate_size(&self, _seen: &mut HashSet<usize>) -> usize {
        size_of::<String>() + self.len()
    }
}

impl EstimateSize for String {
    fn estimate_size(&self, seen: &mut HashSet<usize>) -> usize {
        self.as_str().estimate_size(seen)
    }
}

impl<T: EstimateSize> EstimateSize for Option<T> {
    fn estimate_size(&self, seen: &mut HashSet<usize>) -> usize {
        let inner = self.as_ref().map_or(0, |inner| inner.estimate_size(seen));
        size_of::<Self>() + inner
    }
}

impl<T: EstimateSize> EstimateSize for [T] {
    fn estimate_size(&self, seen: &mut HashSet<usize>) -> usize {
        let elements: usize = self.iter().map(|item| item.estimate_size(seen)).sum();
        size_of::<Vec<T>>() + elements
    }
}

impl<T: EstimateSize> EstimateSize for Vec<T> {
    fn estimate_size(&self, seen: &mut HashSet<usize>) -> usize {
        self.as_slice().estimate_size(seen)
    }
}

impl<K: EstimateSize, V: EstimateSize> EstimateSize for BTreeMap<K, V> {
    fn estimate_size(&self, seen: &mut HashSet<usize>) -> usize {
        let entries: usize = self
            .iter()
            .map(|(key, value)| key.estimate_size(seen) + value.estimate_size(seen))
            .sum();
        size_of::<Self>() + entries
    }
}

impl<K: EstimateSize, V: EstimateSize, S> EstimateSize for HashMap<K, V, S> {
    fn estimate_size(&self, seen: &mut HashSet<usize>) -> usize {
        let entries: usize = self
            .iter()
            .map(|(key, value)| key.estimate_size(seen) + value.estimate_size(seen))
            .sum();
        size_of::<Self>() + entries
    }
}

impl EstimateSize for Map<String, Value> {
    fn estimate_size(&self, seen: &mut HashSet<usize>) -> usize {
        let entries: usize = self
            .iter()
            .map(|(key, value)| key.estimate_size(seen) + value.estimate_size(seen))
            .sum();
        size_of::<Self>() + entries
    }
}

impl EstimateSize for Value {
    fn estimate_size(&self, seen: &mut HashSet<usize>) -> usize {
        let nested = match self {
            Value::String(text) => text.len(),
            Value::Array(items) => items.iter().map(|item| item.estimate_size(seen)).sum(),
            Value::Object(map) => map.estimate_size(seen),
            Value::Null | Value::Bool(_) | Value::Number(_) => 0,
        };
        size_of::<Value>() + nested
    }
}

impl<T: EstimateSize + ?Sized> EstimateSize for Arc<T> {
    fn estimate_size(&self, seen: &mut HashSet<usize>) -> usize {
        let identity = Arc::as_ptr(self) as *const () as usize;
        if !seen.insert(identity) {
            return 0;
        }
        size_of::<Self>() + (**self).estimate_size(seen)
    }
}

impl<T: EstimateSize> EstimateSize for RwLock<T> {
    fn estimate_size(&self, seen: &mut HashSet<usize>) -> usize {
        size_of::<Self>() + self.read().estimate_size(seen)
    }
}
