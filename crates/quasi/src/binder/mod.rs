//! Lexical binding
//!
//! The binder walks an [`Expr`] tree and produces the [`Bound`] tree the
//! evaluator runs: every reference becomes a `(level, index)` address, member
//! names are interned, and imports are resolved eagerly.
//!
//! # Quote staging
//!
//! Binding carries two scope chains. The active chain resolves ordinary
//! references; the quote chain is what the active chain was on the other side
//! of the innermost quote/splice boundary. Entering a `quote` or a `splice`
//! swaps the two, so a splice inside a quote resolves its target against the
//! scope surrounding the quote, and a quote inside that splice resolves
//! against the quoted region again. Swapping never pushes a context of its
//! own.
//!
//! Until the first boundary is crossed the quote chain simply follows the
//! active chain; from then on, contexts introduced by `let`, lambdas and
//! match clauses extend only the active chain.
//!
//! Every quote and splice records its lift: how many of the active chain's
//! innermost contexts lie past the chain its operand is bound against. The
//! evaluator drops that many frames to find the operand's run-time context.
//! No lift exists when the operand's chain is a quoted region that is not
//! running yet.

mod scope;

pub use scope::{PatternScope, Scope};

use std::sync::Arc;

use indexmap::IndexMap;
use log::debug;

use crate::bound::{
    Bound, BoundClause, BoundElement, BoundKind, BoundMember, Pattern, PatternElement,
    PatternMember,
};
use crate::error::{BindError, Result};
use crate::syntax::{Element, Expr, ExprKind, Member};
use crate::value::{ErrorValue, Value};
use crate::{Symbol, SymbolTable};

/// Resolves `import name` at bind time.
///
/// Returning `None` embeds a "not found" error value in the bound tree.
pub trait ImportResolver {
    /// Resolve `name`.
    fn resolve(&self, name: &str) -> Option<Value>;
}

impl<F> ImportResolver for F
where
    F: Fn(&str) -> Option<Value>,
{
    fn resolve(&self, name: &str) -> Option<Value> {
        self(name)
    }
}

/// An import resolver that knows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImports;

impl ImportResolver for NoImports {
    fn resolve(&self, _name: &str) -> Option<Value> {
        None
    }
}

/// The two scope chains plus the staging flag.
#[derive(Debug, Clone)]
struct BindContext {
    scope: Scope,
    /// `None` until the first quote/splice boundary: the quote chain tracks
    /// `scope` until then.
    quote_scope: Option<Scope>,
    /// Flipped on every quote/splice boundary.
    splice_quote: bool,
    /// How the quote chain relates to `scope`: `Some(k)` with `k >= 0` when
    /// it is `scope` minus its `k` innermost contexts, `Some(-k)` when
    /// `scope` is the quote chain minus `k`, `None` when neither extends the
    /// other.
    gap: Option<isize>,
}

impl BindContext {
    fn new(scope: Scope) -> Self {
        BindContext {
            scope,
            quote_scope: None,
            splice_quote: false,
            gap: Some(0),
        }
    }

    /// Cross a quote or splice boundary.
    fn swapped(&self) -> Self {
        let quote = self
            .quote_scope
            .clone()
            .unwrap_or_else(|| self.scope.clone());
        BindContext {
            scope: quote,
            quote_scope: Some(self.scope.clone()),
            splice_quote: !self.splice_quote,
            gap: self.gap.map(|k| -k),
        }
    }

    /// Contexts a quote or splice here must drop at run time to reach the
    /// context its operand is bound against.
    fn lift(&self) -> Option<usize> {
        self.gap.and_then(|k| usize::try_from(k).ok())
    }

    /// Gap after pushing a context onto the active chain only.
    fn pushed_gap(&self) -> Option<isize> {
        match (&self.quote_scope, self.gap) {
            (None, gap) => gap,
            (Some(_), Some(k)) if k >= 0 => Some(k + 1),
            (Some(_), _) => None,
        }
    }

    /// Enter a new lexical context.
    fn with_slots(&self, slots: IndexMap<Symbol, usize>) -> Self {
        BindContext {
            scope: self.scope.push(slots),
            quote_scope: self.quote_scope.clone(),
            splice_quote: self.splice_quote,
            gap: self.pushed_gap(),
        }
    }

    fn with_names(&self, names: &[Symbol]) -> Self {
        BindContext {
            scope: self.scope.push_names(names),
            quote_scope: self.quote_scope.clone(),
            splice_quote: self.splice_quote,
            gap: self.pushed_gap(),
        }
    }
}

/// Binds expression trees against a symbol table and an import resolver.
pub struct Binder<'a> {
    symbols: &'a SymbolTable,
    imports: &'a dyn ImportResolver,
}

impl<'a> Binder<'a> {
    /// Create a binder.
    pub fn new(symbols: &'a SymbolTable, imports: &'a dyn ImportResolver) -> Self {
        Self { symbols, imports }
    }

    /// Bind a whole program.
    pub fn bind(&self, expr: &Expr) -> Result<Arc<Bound>> {
        self.bind_in(expr, &Scope::root())
    }

    /// Bind a program whose free names resolve against `scope`.
    ///
    /// The caller is responsible for evaluating the result in a call context
    /// shaped like `scope`.
    pub fn bind_in(&self, expr: &Expr, scope: &Scope) -> Result<Arc<Bound>> {
        debug!("binding program at offset {}", expr.offset);
        let context = BindContext::new(scope.clone());
        let bound = self.bind_expr(expr, &context);
        if let Err(err) = &bound {
            debug!("binding failed: {}", err);
        }
        bound
    }

    fn bind_expr(&self, expr: &Expr, cx: &BindContext) -> Result<Arc<Bound>> {
        let kind = match &expr.kind {
            ExprKind::Literal(lit) => BoundKind::Literal(lit.clone()),

            ExprKind::Reference(name) => {
                let symbol = self.symbols.intern(name);
                let address =
                    cx.scope
                        .find(symbol)
                        .ok_or_else(|| BindError::UndefinedReference {
                            name: name.clone(),
                            offset: expr.offset,
                        })?;
                BoundKind::Reference {
                    address,
                    name: symbol,
                }
            }

            ExprKind::Let { bindings, body } => {
                let mut slots = IndexMap::with_capacity(bindings.len());
                for (index, binding) in bindings.iter().enumerate() {
                    let symbol = self.symbols.intern(&binding.name);
                    if slots.insert(symbol, index).is_some() {
                        return Err(BindError::DuplicateBinding {
                            name: binding.name.clone(),
                            offset: binding.value.offset,
                        });
                    }
                }
                let names: Arc<[Symbol]> = slots.keys().copied().collect();
                let inner = cx.with_slots(slots);

                let bindings = bindings
                    .iter()
                    .map(|binding| self.bind_expr(&binding.value, &inner))
                    .collect::<Result<Vec<_>>>()?;
                BoundKind::Let {
                    names,
                    bindings,
                    body: self.bind_expr(body, &inner)?,
                }
            }

            ExprKind::Lambda { params, body } => {
                let params: Arc<[Symbol]> =
                    params.iter().map(|p| self.symbols.intern(p)).collect();
                let inner = cx.with_names(&params);
                BoundKind::Lambda {
                    body: self.bind_expr(body, &inner)?,
                    params,
                }
            }

            ExprKind::Call { target, args } => BoundKind::Call {
                target: self.bind_expr(target, cx)?,
                args: args
                    .iter()
                    .map(|arg| self.bind_expr(arg, cx))
                    .collect::<Result<_>>()?,
            },

            ExprKind::Record(members) => BoundKind::Record(
                members
                    .iter()
                    .map(|member| match member {
                        Member::Named { name, value } => Ok(BoundMember::Named {
                            symbol: self.symbols.intern(name),
                            value: self.bind_expr(value, cx)?,
                        }),
                        Member::Projection(value) => {
                            Ok(BoundMember::Projection(self.bind_expr(value, cx)?))
                        }
                    })
                    .collect::<Result<_>>()?,
            ),

            ExprKind::Array(elements) => BoundKind::Array(
                elements
                    .iter()
                    .map(|element| match element {
                        Element::Item(value) => Ok(BoundElement::Item(self.bind_expr(value, cx)?)),
                        Element::Projection(value) => {
                            Ok(BoundElement::Projection(self.bind_expr(value, cx)?))
                        }
                    })
                    .collect::<Result<_>>()?,
            ),

            ExprKind::Select { target, name } => BoundKind::Select {
                target: self.bind_expr(target, cx)?,
                member: self.symbols.intern(name),
            },

            ExprKind::Index { target, index } => BoundKind::Index {
                target: self.bind_expr(target, cx)?,
                index: self.bind_expr(index, cx)?,
            },

            ExprKind::Quote(target) => BoundKind::Quote {
                code: self.bind_expr(target, &cx.swapped())?,
                lift: cx.lift(),
            },

            ExprKind::Splice(target) => BoundKind::Splice {
                target: self.bind_expr(target, &cx.swapped())?,
                lift: cx.lift(),
            },

            ExprKind::Match { target, clauses } => BoundKind::Match {
                target: self.bind_expr(target, cx)?,
                clauses: clauses
                    .iter()
                    .map(|clause| {
                        let mut pattern_scope = PatternScope::new();
                        let pattern = self.bind_pattern(&clause.pattern, cx, &mut pattern_scope)?;
                        let names = pattern_scope.names();
                        let inner = cx.with_slots(pattern_scope.into_slots());
                        Ok(BoundClause {
                            pattern,
                            names,
                            value: self.bind_expr(&clause.value, &inner)?,
                        })
                    })
                    .collect::<Result<_>>()?,
            },

            ExprKind::Variable(name) => {
                return Err(BindError::PatternOutsideMatch {
                    name: name.clone(),
                    offset: expr.offset,
                })
            }

            ExprKind::Import(name) => {
                let value = self.imports.resolve(name).unwrap_or_else(|| {
                    debug!("import `{}` not found", name);
                    Value::Error(Arc::new(
                        ErrorValue::new(format!("import `{}` not found", name)).at(expr.offset),
                    ))
                });
                BoundKind::Import {
                    name: Arc::from(name.as_str()),
                    value,
                }
            }
        };

        Ok(Arc::new(Bound::new(expr.offset, kind)))
    }

    /// Bind a match pattern. Variables go into `pattern_scope`; anything that
    /// is not structural is bound as an expression in the enclosing scope.
    fn bind_pattern(
        &self,
        expr: &Expr,
        cx: &BindContext,
        pattern_scope: &mut PatternScope,
    ) -> Result<Pattern> {
        match &expr.kind {
            ExprKind::Variable(name) => {
                let symbol = self.symbols.intern(name);
                Ok(Pattern::Variable {
                    slot: pattern_scope.allocate(symbol),
                    name: symbol,
                })
            }

            ExprKind::Array(elements) => {
                let projections = elements
                    .iter()
                    .filter(|e| matches!(e, Element::Projection(_)))
                    .count();
                if projections > 1 {
                    return Err(BindError::MultipleProjections {
                        offset: expr.offset,
                    });
                }
                let elements = elements
                    .iter()
                    .map(|element| match element {
                        Element::Item(e) => Ok(PatternElement::Item(
                            self.bind_pattern(e, cx, pattern_scope)?,
                        )),
                        Element::Projection(e) => Ok(PatternElement::Projection(
                            self.bind_pattern(e, cx, pattern_scope)?,
                        )),
                    })
                    .collect::<Result<_>>()?;
                Ok(Pattern::Array(elements))
            }

            ExprKind::Record(members) => {
                let projections = members
                    .iter()
                    .filter(|m| matches!(m, Member::Projection(_)))
                    .count();
                if projections > 1 {
                    return Err(BindError::MultipleProjections {
                        offset: expr.offset,
                    });
                }
                let members = members
                    .iter()
                    .map(|member| match member {
                        Member::Named { name, value } => Ok(PatternMember::Named {
                            symbol: self.symbols.intern(name),
                            pattern: self.bind_pattern(value, cx, pattern_scope)?,
                        }),
                        Member::Projection(e) => Ok(PatternMember::Projection(
                            self.bind_pattern(e, cx, pattern_scope)?,
                        )),
                    })
                    .collect::<Result<_>>()?;
                Ok(Pattern::Record(members))
            }

            _ => Ok(Pattern::Value(self.bind_expr(expr, cx)?)),
        }
    }
}

/// Bind `expr` with a fresh [`Binder`].
pub fn bind(
    expr: &Expr,
    symbols: &SymbolTable,
    imports: &dyn ImportResolver,
) -> Result<Arc<Bound>> {
    Binder::new(symbols, imports).bind(expr)
}
