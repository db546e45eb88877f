//! Compile-time scope chains

use std::sync::Arc;

use indexmap::IndexMap;

use crate::bound::Address;
use crate::Symbol;

/// A persistent chain of lexical contexts, innermost first.
///
/// Pushing returns a new chain and leaves the original untouched, so the
/// binder can hand different chains to different subtrees (and swap them for
/// quotes) without any bookkeeping on return.
///
/// # Example
///
/// ```
/// use quasi::binder::Scope;
/// use quasi::{Address, SymbolTable};
///
/// let symbols = SymbolTable::new();
/// let (x, y) = (symbols.intern("x"), symbols.intern("y"));
///
/// let outer = Scope::root().push_names(&[x]);
/// let inner = outer.push_names(&[y]);
///
/// assert_eq!(inner.find(y), Some(Address::new(0, 0)));
/// assert_eq!(inner.find(x), Some(Address::new(1, 0)));
/// assert_eq!(outer.find(y), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Scope {
    head: Option<Arc<ScopeFrame>>,
}

#[derive(Debug)]
struct ScopeFrame {
    slots: IndexMap<Symbol, usize>,
    parent: Scope,
}

impl Scope {
    /// The empty chain.
    pub fn root() -> Self {
        Self::default()
    }

    /// Extend the chain with a context holding `slots`.
    pub fn push(&self, slots: IndexMap<Symbol, usize>) -> Scope {
        Scope {
            head: Some(Arc::new(ScopeFrame {
                slots,
                parent: self.clone(),
            })),
        }
    }

    /// Extend the chain with one slot per name, in order.
    ///
    /// A repeated name resolves to its last slot.
    pub fn push_names(&self, names: &[Symbol]) -> Scope {
        let mut slots = IndexMap::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            slots.insert(*name, index);
        }
        self.push(slots)
    }

    /// Resolve `name`, counting one level per context crossed.
    pub fn find(&self, name: Symbol) -> Option<Address> {
        let mut level = 0;
        let mut current = self.head.as_ref();
        while let Some(frame) = current {
            if let Some(index) = frame.slots.get(&name) {
                return Some(Address::new(level, *index));
            }
            level += 1;
            current = frame.parent.head.as_ref();
        }
        None
    }

    /// Number of contexts in the chain.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.head.as_ref();
        while let Some(frame) = current {
            depth += 1;
            current = frame.parent.head.as_ref();
        }
        depth
    }

    /// Check if two handles are the same chain.
    pub fn same_chain(&self, other: &Scope) -> bool {
        match (&self.head, &other.head) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

/// Collects the variables of one match-clause pattern into a fresh frame.
#[derive(Debug, Default)]
pub struct PatternScope {
    slots: IndexMap<Symbol, usize>,
}

impl PatternScope {
    /// Create an empty pattern scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a slot to `name`, reusing the existing one if already allocated.
    pub fn allocate(&mut self, name: Symbol) -> usize {
        let next = self.slots.len();
        *self.slots.entry(name).or_insert(next)
    }

    /// Number of slots allocated so far.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if no variables were allocated.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Variable names in slot order.
    pub fn names(&self) -> Arc<[Symbol]> {
        self.slots.keys().copied().collect()
    }

    /// Consume the builder, yielding the slot map for a scope push.
    pub fn into_slots(self) -> IndexMap<Symbol, usize> {
        self.slots
    }
}
