use std::collections::HashSet;
use std::fmt;

/// Identifier taken from an item's permanent link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifiers whose action sequence has been attempted. Only grows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DedupLedger {
    seen: HashSet<ItemId>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.seen.contains(id)
    }

    /// Returns `false` if the identifier was already recorded.
    pub fn record(&mut self, id: ItemId) -> bool {
        self.seen.insert(id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
