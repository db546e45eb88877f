//! Value representation for runtime values

mod callable;
mod display;
mod impls;
mod record;

pub use callable::{Closure, NativeFn, NativeFnPtr};
pub use display::Printed;
pub use record::Record;

use std::sync::Arc;

use crate::bound::Bound;
use crate::environment::CallContext;
use crate::syntax::Offset;

/// Runtime value representation.
///
/// Values are immutable once built. Compound values sit behind `Arc`, so
/// cloning a value never copies its contents.
#[derive(Clone)]
pub enum Value {
    // ═══════════════════════════════════════════════════════════════════
    // Literals
    // ═══════════════════════════════════════════════════════════════════
    /// `null`
    Null,

    /// Boolean
    Bool(bool),

    /// 64-bit signed integer
    Int(i64),

    /// 64-bit float
    Float(f64),

    /// Immutable string
    Str(Arc<str>),

    // ═══════════════════════════════════════════════════════════════════
    // Compound
    // ═══════════════════════════════════════════════════════════════════
    /// Ordered elements
    Array(Arc<Vec<Value>>),

    /// Symbol-keyed slots
    Record(Arc<Record>),

    /// Captured, already-bound code
    Quote(Quoted),

    // ═══════════════════════════════════════════════════════════════════
    // Callables
    // ═══════════════════════════════════════════════════════════════════
    /// Lambda with its captured context
    Closure(Arc<Closure>),

    /// Host function handed out by an import resolver
    Native(NativeFn),

    // ═══════════════════════════════════════════════════════════════════
    // Errors
    // ═══════════════════════════════════════════════════════════════════
    /// Evaluation error, short-circuits every combinator
    Error(Arc<ErrorValue>),
}

/// Code captured by a quote.
///
/// `context` is the context the code's references are addressed against.
/// It is `None` for code quoted inside an antiquote, whose names belong to
/// the quoted region the antiquote sits in: such code only runs once it has
/// been substituted there.
#[derive(Debug, Clone)]
pub struct Quoted {
    /// The captured tree
    pub code: Arc<Bound>,
    /// Where the code runs when spliced
    pub context: Option<CallContext>,
}

impl Quoted {
    /// Code that runs in `context`.
    pub fn new(code: Arc<Bound>, context: CallContext) -> Self {
        Self {
            code,
            context: Some(context),
        }
    }

    /// Code that runs wherever it is substituted.
    pub fn open(code: Arc<Bound>) -> Self {
        Self {
            code,
            context: None,
        }
    }
}

impl PartialEq for Quoted {
    fn eq(&self, other: &Self) -> bool {
        let same_context = match (&self.context, &other.context) {
            (Some(a), Some(b)) => a.same_frames(b),
            (None, None) => true,
            _ => false,
        };
        same_context && self.code == other.code
    }
}

/// An evaluation error.
///
/// `trace` lists call-site offsets from the innermost call outwards; it grows
/// as the error propagates out of nested evaluations.
#[derive(Debug, Clone)]
pub struct ErrorValue {
    /// Human-readable message
    pub message: String,

    /// Where the error was raised
    pub offset: Option<Offset>,

    /// Call sites the error propagated through, innermost first
    pub trace: Vec<Offset>,
}

impl ErrorValue {
    /// Create an error without a location.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            offset: None,
            trace: Vec::new(),
        }
    }

    /// Attach the offset the error was raised at.
    pub fn at(mut self, offset: Offset) -> Self {
        self.offset = Some(offset);
        self
    }

    /// A copy of this error with `offset` appended to its trace.
    pub fn with_call_site(&self, offset: Offset) -> Self {
        let mut error = self.clone();
        error.trace.push(offset);
        error
    }
}

impl PartialEq for ErrorValue {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message
    }
}

impl std::fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ErrorValue {}
