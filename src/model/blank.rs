//! Blank node identifier minting

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::iri::Iri;

/// Mints `_:b1`, `_:b2`, ... from a shared atomic counter.
///
/// Clones share the counter, so one generator handed to several graphs or
/// parsers keeps their anonymous identifiers apart. Independent generators
/// each start at 1.
#[derive(Debug, Clone)]
pub struct BlankNodeGenerator {
    counter: Arc<AtomicU64>,
}

impl Default for BlankNodeGenerator {
    fn default() -> Self {
        BlankNodeGenerator {
            counter: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl BlankNodeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next local name, `b<N>`
    pub fn next_label(&self) -> String {
        format!("b{}", self.counter.fetch_add(1, Ordering::SeqCst))
    }

    /// Next blank node identifier
    pub fn next_iri(&self) -> Iri {
        Iri::blank(&self.next_label())
    }

    /// The number the next identifier will carry
    pub fn peek(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    /// Restart numbering at 1; meant for deterministic test setup
    pub fn reset(&self) {
        self.counter.store(1, Ordering::SeqCst);
    }
}
