//! Record values

use indexmap::IndexMap;

use crate::Symbol;

use super::Value;

/// A record: a class mapping symbols to slots, and the slot values.
///
/// `cls` is injective and `values.len()` always equals `cls.len()`. Member
/// access is one map lookup followed by an index. Slot order is the order in
/// which members were first written.
#[derive(Debug, Clone, Default)]
pub struct Record {
    cls: IndexMap<Symbol, usize>,
    values: Vec<Value>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member unless `symbol` is already present.
    ///
    /// Returns whether the member was added; the first writer wins.
    pub fn insert(&mut self, symbol: Symbol, value: Value) -> bool {
        if self.cls.contains_key(&symbol) {
            return false;
        }
        self.cls.insert(symbol, self.values.len());
        self.values.push(value);
        true
    }

    /// Add a member (builder pattern).
    pub fn with(mut self, symbol: Symbol, value: Value) -> Self {
        self.insert(symbol, value);
        self
    }

    /// Get a member by symbol.
    pub fn get(&self, symbol: Symbol) -> Option<&Value> {
        self.cls.get(&symbol).map(|slot| &self.values[*slot])
    }

    /// Check if a member exists.
    pub fn contains(&self, symbol: Symbol) -> bool {
        self.cls.contains_key(&symbol)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the record has no members.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The slot of `symbol`.
    pub fn slot_of(&self, symbol: Symbol) -> Option<usize> {
        self.cls.get(&symbol).copied()
    }

    /// Members in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &Value)> + '_ {
        self.cls
            .iter()
            .map(move |(symbol, slot)| (*symbol, &self.values[*slot]))
    }

    /// Member symbols in slot order.
    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.cls.keys().copied()
    }
}
