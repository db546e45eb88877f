//! Bound expression tree
//!
//! The binder turns an [`Expr`](crate::syntax::Expr) into a [`Bound`] tree:
//! references become lexical [`Address`]es, member names become [`Symbol`]s
//! and imports are resolved into values. Two synthetic node kinds,
//! [`BoundKind::Debug`] and [`BoundKind::LambdaBody`], only appear after
//! [`instrument`](crate::debug::instrument) has run, and
//! [`BoundKind::Spliced`] is only built by the evaluator when it fills an
//! antiquote.
//!
//! Subtrees are shared through `Arc`, so quotes, closures and instrumented
//! copies can hold on to them without copying.

use std::fmt;
use std::sync::Arc;

use crate::syntax::{Literal, Offset};
use crate::value::{Quoted, Value};
use crate::Symbol;

/// A lexical address: how many frames to skip, and the slot in that frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    /// Number of enclosing frames to skip (0 = innermost)
    pub level: usize,
    /// Slot within that frame
    pub index: usize,
}

impl Address {
    /// Create an address.
    pub fn new(level: usize, index: usize) -> Self {
        Self { level, index }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.level, self.index)
    }
}

/// A bound node with its source offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    /// Source offset of the node this was bound from
    pub offset: Offset,

    /// What kind of node this is
    pub kind: BoundKind,
}

/// The bound node variants.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundKind {
    /// Constant
    Literal(Literal),

    /// Lexically addressed variable
    Reference {
        /// Where the value lives at run time
        address: Address,
        /// Name, for diagnostics only
        name: Symbol,
    },

    /// Recursive let: one frame holding every binding
    Let {
        /// Binding names in slot order
        names: Arc<[Symbol]>,
        /// Binding values in slot order
        bindings: Vec<Arc<Bound>>,
        /// Body evaluated with the frame in scope
        body: Arc<Bound>,
    },

    /// Function literal
    Lambda {
        /// Parameter names in argument order
        params: Arc<[Symbol]>,
        /// Body evaluated in a frame of `params.len()` slots
        body: Arc<Bound>,
    },

    /// Function application
    Call {
        /// The callee
        target: Arc<Bound>,
        /// Arguments
        args: Vec<Arc<Bound>>,
    },

    /// Record construction
    Record(Vec<BoundMember>),

    /// Array construction
    Array(Vec<BoundElement>),

    /// Member access
    Select {
        /// The record expression
        target: Arc<Bound>,
        /// Member symbol
        member: Symbol,
    },

    /// Element or character access
    Index {
        /// Array or string expression
        target: Arc<Bound>,
        /// Integer index expression
        index: Arc<Bound>,
    },

    /// Captured code
    Quote {
        /// The quoted tree
        code: Arc<Bound>,
        /// Frames to drop from the run-time context to reach the context
        /// `code` is addressed against. `None` when that context is a quoted
        /// region that only exists once an enclosing quote is spliced.
        lift: Option<usize>,
    },

    /// Run captured code (or, inside a quote, substitute it)
    Splice {
        /// Expression producing the quote
        target: Arc<Bound>,
        /// Frames to drop before evaluating `target` at run time, as for
        /// [`BoundKind::Quote`]
        lift: Option<usize>,
    },

    /// Quoted code substituted by an antiquote, run in the context it was
    /// captured in
    Spliced(Quoted),

    /// Structural match
    Match {
        /// Scrutinee
        target: Arc<Bound>,
        /// Clauses tried in order
        clauses: Vec<BoundClause>,
    },

    /// Import resolved at bind time; failures are embedded as error values
    Import {
        /// Imported name
        name: Arc<str>,
        /// Resolved value
        value: Value,
    },

    /// Debugger statement marker around one position-bearing node
    Debug(Arc<Bound>),

    /// Debugger function entry/exit marker around a lambda body
    LambdaBody(Arc<Bound>),
}

/// A bound record member.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundMember {
    /// `name: value`
    Named {
        /// Member symbol
        symbol: Symbol,
        /// Member value
        value: Arc<Bound>,
    },
    /// `...expr`, merged at evaluation time
    Projection(Arc<Bound>),
}

/// A bound array element.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundElement {
    /// A single element
    Item(Arc<Bound>),
    /// `...expr`
    Projection(Arc<Bound>),
}

/// A bound match clause.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundClause {
    /// The pattern
    pub pattern: Pattern,
    /// Names of the pattern variables, in slot order
    pub names: Arc<[Symbol]>,
    /// The clause body, bound with the pattern frame in scope
    pub value: Arc<Bound>,
}

/// A bound pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// `#name`: always matches, binds into `slot`
    Variable {
        /// Slot in the clause frame
        slot: usize,
        /// Name, for diagnostics
        name: Symbol,
    },

    /// Any other expression: evaluated and compared by value equality
    Value(Arc<Bound>),

    /// Positional array pattern, at most one projection
    Array(Vec<PatternElement>),

    /// Record pattern, at most one projection
    Record(Vec<PatternMember>),
}

/// An element of an array pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternElement {
    /// Matched positionally
    Item(Pattern),
    /// Captures the middle slice as an array
    Projection(Pattern),
}

/// A member of a record pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternMember {
    /// Member that must be present
    Named {
        /// Member symbol
        symbol: Symbol,
        /// Pattern for the member value
        pattern: Pattern,
    },
    /// Captures every member not named elsewhere in the pattern
    Projection(Pattern),
}

impl Bound {
    /// Create a node.
    pub fn new(offset: Offset, kind: BoundKind) -> Self {
        Self { offset, kind }
    }

    /// Human-readable name of the node kind.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            BoundKind::Literal(_) => "literal",
            BoundKind::Reference { .. } => "reference",
            BoundKind::Let { .. } => "let",
            BoundKind::Lambda { .. } => "lambda",
            BoundKind::Call { .. } => "call",
            BoundKind::Record(_) => "record",
            BoundKind::Array(_) => "array",
            BoundKind::Select { .. } => "select",
            BoundKind::Index { .. } => "index",
            BoundKind::Quote { .. } => "quote",
            BoundKind::Splice { .. } => "splice",
            BoundKind::Spliced(_) => "spliced code",
            BoundKind::Match { .. } => "match",
            BoundKind::Import { .. } => "import",
            BoundKind::Debug(_) => "debug marker",
            BoundKind::LambdaBody(_) => "lambda body marker",
        }
    }

    /// Check if this node is a debugger marker.
    pub fn is_marker(&self) -> bool {
        matches!(self.kind, BoundKind::Debug(_) | BoundKind::LambdaBody(_))
    }

    /// Strip debugger markers from the top of this node.
    pub fn unmarked(&self) -> &Bound {
        match &self.kind {
            BoundKind::Debug(inner) | BoundKind::LambdaBody(inner) => inner.unmarked(),
            _ => self,
        }
    }

    /// Rebuild this node with every direct child passed through `f`.
    ///
    /// `f` returns `Ok(None)` to keep a child as is. The result is `None`
    /// when no child changed, so untouched subtrees stay shared.
    pub(crate) fn try_map_children<E>(
        &self,
        f: &mut dyn FnMut(&Arc<Bound>) -> Result<Option<Arc<Bound>>, E>,
    ) -> Result<Option<Bound>, E> {
        let mut m = ChildMapper { f, changed: false };

        let kind = match &self.kind {
            BoundKind::Literal(_)
            | BoundKind::Reference { .. }
            | BoundKind::Import { .. }
            | BoundKind::Spliced(_) => return Ok(None),
            BoundKind::Let {
                names,
                bindings,
                body,
            } => BoundKind::Let {
                names: Arc::clone(names),
                bindings: m.all(bindings)?,
                body: m.one(body)?,
            },
            BoundKind::Lambda { params, body } => BoundKind::Lambda {
                params: Arc::clone(params),
                body: m.one(body)?,
            },
            BoundKind::Call { target, args } => BoundKind::Call {
                target: m.one(target)?,
                args: m.all(args)?,
            },
            BoundKind::Record(members) => BoundKind::Record(
                members
                    .iter()
                    .map(|member| -> Result<BoundMember, E> {
                        Ok(match member {
                            BoundMember::Named { symbol, value } => BoundMember::Named {
                                symbol: *symbol,
                                value: m.one(value)?,
                            },
                            BoundMember::Projection(value) => {
                                BoundMember::Projection(m.one(value)?)
                            }
                        })
                    })
                    .collect::<Result<_, E>>()?,
            ),
            BoundKind::Array(elements) => BoundKind::Array(
                elements
                    .iter()
                    .map(|element| -> Result<BoundElement, E> {
                        Ok(match element {
                            BoundElement::Item(value) => BoundElement::Item(m.one(value)?),
                            BoundElement::Projection(value) => {
                                BoundElement::Projection(m.one(value)?)
                            }
                        })
                    })
                    .collect::<Result<_, E>>()?,
            ),
            BoundKind::Select { target, member } => BoundKind::Select {
                target: m.one(target)?,
                member: *member,
            },
            BoundKind::Index { target, index } => BoundKind::Index {
                target: m.one(target)?,
                index: m.one(index)?,
            },
            BoundKind::Quote { code, lift } => BoundKind::Quote {
                code: m.one(code)?,
                lift: *lift,
            },
            BoundKind::Splice { target, lift } => BoundKind::Splice {
                target: m.one(target)?,
                lift: *lift,
            },
            BoundKind::Match { target, clauses } => BoundKind::Match {
                target: m.one(target)?,
                clauses: clauses
                    .iter()
                    .map(|clause| -> Result<BoundClause, E> {
                        Ok(BoundClause {
                            pattern: m.pattern(&clause.pattern)?,
                            names: Arc::clone(&clause.names),
                            value: m.one(&clause.value)?,
                        })
                    })
                    .collect::<Result<_, E>>()?,
            },
            BoundKind::Debug(inner) => BoundKind::Debug(m.one(inner)?),
            BoundKind::LambdaBody(inner) => BoundKind::LambdaBody(m.one(inner)?),
        };

        if m.changed {
            Ok(Some(Bound::new(self.offset, kind)))
        } else {
            Ok(None)
        }
    }
}

struct ChildMapper<'f, E> {
    f: &'f mut dyn FnMut(&Arc<Bound>) -> Result<Option<Arc<Bound>>, E>,
    changed: bool,
}

impl<E> ChildMapper<'_, E> {
    fn one(&mut self, child: &Arc<Bound>) -> Result<Arc<Bound>, E> {
        match (self.f)(child)? {
            Some(replacement) => {
                self.changed = true;
                Ok(replacement)
            }
            None => Ok(Arc::clone(child)),
        }
    }

    fn all(&mut self, children: &[Arc<Bound>]) -> Result<Vec<Arc<Bound>>, E> {
        children.iter().map(|child| self.one(child)).collect()
    }

    fn pattern(&mut self, pattern: &Pattern) -> Result<Pattern, E> {
        Ok(match pattern {
            Pattern::Variable { slot, name } => Pattern::Variable {
                slot: *slot,
                name: *name,
            },
            Pattern::Value(expr) => Pattern::Value(self.one(expr)?),
            Pattern::Array(elements) => Pattern::Array(
                elements
                    .iter()
                    .map(|element| -> Result<PatternElement, E> {
                        Ok(match element {
                            PatternElement::Item(p) => PatternElement::Item(self.pattern(p)?),
                            PatternElement::Projection(p) => {
                                PatternElement::Projection(self.pattern(p)?)
                            }
                        })
                    })
                    .collect::<Result<_, E>>()?,
            ),
            Pattern::Record(members) => Pattern::Record(
                members
                    .iter()
                    .map(|member| -> Result<PatternMember, E> {
                        Ok(match member {
                            PatternMember::Named { symbol, pattern } => PatternMember::Named {
                                symbol: *symbol,
                                pattern: self.pattern(pattern)?,
                            },
                            PatternMember::Projection(p) => {
                                PatternMember::Projection(self.pattern(p)?)
                            }
                        })
                    })
                    .collect::<Result<_, E>>()?,
            ),
        })
    }
}
