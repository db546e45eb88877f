//! Symbol interning for member and variable names
//!
//! Record member lookup and frame introspection never compare strings at run
//! time: every name is interned once into a [`SymbolTable`] and referred to by
//! its [`Symbol`] id afterwards.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use dashmap::DashMap;

/// An interned name.
///
/// Ids are allocated sequentially by [`SymbolTable::intern`] and are never
/// reused for the lifetime of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
    /// Wrap a raw id. Only meaningful for ids handed out by a table.
    pub fn from_raw(id: u32) -> Self {
        Symbol(id)
    }

    /// The raw numeric id.
    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Bidirectional, append-only mapping between names and [`Symbol`] ids.
///
/// The table is usually shared behind an `Arc` by the binder, the evaluator
/// and whatever front end renders values, so interning takes `&self`.
///
/// # Example
///
/// ```
/// use quasi::SymbolTable;
///
/// let symbols = SymbolTable::new();
/// let a = symbols.intern("a");
/// assert_eq!(symbols.intern("a"), a);
/// assert_eq!(&*symbols.name_of(a), "a");
/// ```
#[derive(Debug, Default)]
pub struct SymbolTable {
    ids: DashMap<Arc<str>, Symbol>,
    names: RwLock<Vec<Arc<str>>>,
}

impl SymbolTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `name`, returning its existing id or allocating the next one.
    pub fn intern(&self, name: &str) -> Symbol {
        if let Some(symbol) = self.ids.get(name) {
            return *symbol;
        }

        // The entry holds the shard lock, so two racing interns of the same
        // name cannot both allocate.
        *self.ids.entry(Arc::from(name)).or_insert_with(|| {
            let mut names = self.names.write().unwrap_or_else(PoisonError::into_inner);
            let symbol = Symbol(names.len() as u32);
            names.push(Arc::from(name));
            symbol
        })
    }

    /// Look up a name without interning it.
    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        self.ids.get(name).map(|symbol| *symbol)
    }

    /// The name behind `symbol`.
    ///
    /// Unknown ids produce a placeholder rather than failing; this path only
    /// serves diagnostics.
    pub fn name_of(&self, symbol: Symbol) -> Arc<str> {
        let names = self.names.read().unwrap_or_else(PoisonError::into_inner);
        match names.get(symbol.0 as usize) {
            Some(name) => Arc::clone(name),
            None => Arc::from(format!("<unknown symbol {}>", symbol)),
        }
    }

    /// Number of interned names.
    pub fn len(&self) -> usize {
        self.names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if nothing has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
