//! Input expression tree
//!
//! This is the tree a parser hands to the [`Binder`](crate::Binder). Names are
//! still strings here and every node carries the source offset it came from.
//! Offsets are a single global integer space shared with the debugger and the
//! [`SourceMap`](crate::SourceMap).
//!
//! Hosts that generate trees programmatically (and the test-suite) use
//! [`Builder`], which hands out sequential offsets.

use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

/// A position in the global source offset space.
pub type Offset = usize;

/// A literal constant.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `null`
    Null,
    /// `true` / `false`
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// String literal
    Str(Arc<str>),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Int(n) => write!(f, "{}", n),
            Literal::Float(n) => write!(f, "{:?}", n),
            Literal::Str(s) => write!(f, "{:?}", s.as_ref()),
        }
    }
}

/// An expression node with its source offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    /// Where this node starts in the source
    pub offset: Offset,

    /// What kind of node this is
    pub kind: ExprKind,
}

/// The expression variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Constant
    Literal(Literal),

    /// Variable reference by name
    Reference(String),

    /// `let a = .., b = .. in body` (recursive scope)
    Let {
        /// Bindings in declaration order
        bindings: Vec<LetBinding>,
        /// Expression evaluated with all bindings in scope
        body: Box<Expr>,
    },

    /// `(a, b) => body`
    Lambda {
        /// Parameter names
        params: Vec<String>,
        /// Function body
        body: Box<Expr>,
    },

    /// `target(args..)`
    Call {
        /// The callee
        target: Box<Expr>,
        /// Arguments, evaluated left to right
        args: Vec<Expr>,
    },

    /// `{a: 1, ...other}`
    Record(Vec<Member>),

    /// `[1, ...other]`
    Array(Vec<Element>),

    /// `target.name`
    Select {
        /// The record expression
        target: Box<Expr>,
        /// Member name
        name: String,
    },

    /// `target[index]`
    Index {
        /// Array or string expression
        target: Box<Expr>,
        /// Integer index expression
        index: Box<Expr>,
    },

    /// `'expr`
    Quote(Box<Expr>),

    /// `$expr`
    Splice(Box<Expr>),

    /// `match target { pattern => value, .. }`
    Match {
        /// Scrutinee
        target: Box<Expr>,
        /// Clauses tried in order
        clauses: Vec<Clause>,
    },

    /// `#name`, only valid inside a match pattern
    Variable(String),

    /// `import name`
    Import(String),
}

/// One `name = value` entry of a let.
#[derive(Debug, Clone, PartialEq)]
pub struct LetBinding {
    /// Bound name
    pub name: String,
    /// Bound value
    pub value: Expr,
}

/// A record member: either named or a projection (`...expr`).
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    /// `name: value`
    Named {
        /// Member name
        name: String,
        /// Member value
        value: Expr,
    },
    /// `...expr`
    Projection(Expr),
}

impl Member {
    /// Create a named member.
    pub fn named(name: impl Into<String>, value: Expr) -> Self {
        Member::Named {
            name: name.into(),
            value,
        }
    }

    /// Create a projected member.
    pub fn projection(value: Expr) -> Self {
        Member::Projection(value)
    }
}

/// An array element: either plain or a projection (`...expr`).
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// A single element
    Item(Expr),
    /// `...expr`
    Projection(Expr),
}

impl Element {
    /// Create a projected element.
    pub fn projection(value: Expr) -> Self {
        Element::Projection(value)
    }
}

impl From<Expr> for Element {
    fn from(expr: Expr) -> Self {
        Element::Item(expr)
    }
}

/// A `pattern => value` match clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// Pattern expression (may contain [`ExprKind::Variable`])
    pub pattern: Expr,
    /// Result when the pattern matches
    pub value: Expr,
}

/// Builds expression trees with sequential offsets.
///
/// Each constructor consumes the next offset, so children built first get
/// smaller offsets than their parents.
///
/// # Example
///
/// ```
/// use quasi::syntax::Builder;
///
/// let b = Builder::new();
/// let one = b.int(1);
/// let call = b.call(b.reference("f"), vec![one]);
/// assert_eq!(call.offset, 2);
/// ```
#[derive(Debug, Default)]
pub struct Builder {
    next: Cell<Offset>,
}

impl Builder {
    /// Start at offset 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at an arbitrary offset.
    pub fn starting_at(offset: Offset) -> Self {
        Self {
            next: Cell::new(offset),
        }
    }

    /// The offset the next node will receive.
    pub fn next_offset(&self) -> Offset {
        self.next.get()
    }

    fn node(&self, kind: ExprKind) -> Expr {
        let offset = self.next.get();
        self.next.set(offset + 1);
        Expr { offset, kind }
    }

    /// `null`
    pub fn null(&self) -> Expr {
        self.node(ExprKind::Literal(Literal::Null))
    }

    /// Boolean literal
    pub fn bool(&self, value: bool) -> Expr {
        self.node(ExprKind::Literal(Literal::Bool(value)))
    }

    /// Integer literal
    pub fn int(&self, value: i64) -> Expr {
        self.node(ExprKind::Literal(Literal::Int(value)))
    }

    /// Float literal
    pub fn float(&self, value: f64) -> Expr {
        self.node(ExprKind::Literal(Literal::Float(value)))
    }

    /// String literal
    pub fn string(&self, value: &str) -> Expr {
        self.node(ExprKind::Literal(Literal::Str(Arc::from(value))))
    }

    /// Variable reference
    pub fn reference(&self, name: &str) -> Expr {
        self.node(ExprKind::Reference(name.to_string()))
    }

    /// `let .. in body`
    pub fn let_in(&self, bindings: Vec<(&str, Expr)>, body: Expr) -> Expr {
        let bindings = bindings
            .into_iter()
            .map(|(name, value)| LetBinding {
                name: name.to_string(),
                value,
            })
            .collect();
        self.node(ExprKind::Let {
            bindings,
            body: Box::new(body),
        })
    }

    /// `(params..) => body`
    pub fn lambda(&self, params: &[&str], body: Expr) -> Expr {
        self.node(ExprKind::Lambda {
            params: params.iter().map(|p| p.to_string()).collect(),
            body: Box::new(body),
        })
    }

    /// `target(args..)`
    pub fn call(&self, target: Expr, args: Vec<Expr>) -> Expr {
        self.node(ExprKind::Call {
            target: Box::new(target),
            args,
        })
    }

    /// Record construction (or record pattern)
    pub fn record(&self, members: Vec<Member>) -> Expr {
        self.node(ExprKind::Record(members))
    }

    /// Array construction (or array pattern)
    pub fn array(&self, elements: Vec<Element>) -> Expr {
        self.node(ExprKind::Array(elements))
    }

    /// `target.name`
    pub fn select(&self, target: Expr, name: &str) -> Expr {
        self.node(ExprKind::Select {
            target: Box::new(target),
            name: name.to_string(),
        })
    }

    /// `target[index]`
    pub fn index(&self, target: Expr, index: Expr) -> Expr {
        self.node(ExprKind::Index {
            target: Box::new(target),
            index: Box::new(index),
        })
    }

    /// `'target`
    pub fn quote(&self, target: Expr) -> Expr {
        self.node(ExprKind::Quote(Box::new(target)))
    }

    /// `$target`
    pub fn splice(&self, target: Expr) -> Expr {
        self.node(ExprKind::Splice(Box::new(target)))
    }

    /// `match target { pattern => value, .. }`
    pub fn match_on(&self, target: Expr, clauses: Vec<(Expr, Expr)>) -> Expr {
        let clauses = clauses
            .into_iter()
            .map(|(pattern, value)| Clause { pattern, value })
            .collect();
        self.node(ExprKind::Match {
            target: Box::new(target),
            clauses,
        })
    }

    /// `#name` variable pattern
    pub fn var(&self, name: &str) -> Expr {
        self.node(ExprKind::Variable(name.to_string()))
    }

    /// `import name`
    pub fn import(&self, name: &str) -> Expr {
        self.node(ExprKind::Import(name.to_string()))
    }
}
