//! # Quasi
//!
//! A small expression language runtime with quasiquotation and a stepping
//! debugger.
//!
//! Programs arrive as [`syntax::Expr`] trees from an external parser (or from
//! [`syntax::Builder`]). The [`Binder`] resolves every name to a lexical
//! address and produces a [`Bound`] tree, which the [`Interpreter`]
//! evaluates with a trampoline so tail calls run in constant native stack.
//!
//! ## Architecture
//!
//! - **Symbols**: names interned into a shared [`SymbolTable`]
//! - **Binder**: lexical addressing, quote/splice staging, imports
//! - **Evaluator**: closures, records, arrays, pattern matching, quotes
//! - **Debugger**: tree instrumentation plus a [`Session`] driven by a
//!   [`Controller`]
//!
//! ```
//! use quasi::{bind, syntax::Builder, Interpreter, Prelude, SymbolTable, Value};
//!
//! let symbols = SymbolTable::new();
//! let b = Builder::new();
//! // let add = import add in add(40, 2)
//! let program = b.let_in(
//!     vec![("add", b.import("add"))],
//!     b.call(b.reference("add"), vec![b.int(40), b.int(2)]),
//! );
//!
//! let bound = bind(&program, &symbols, &Prelude::new()).unwrap();
//! assert_eq!(Interpreter::new(&symbols).run(&bound), Value::Int(42));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod binder;
pub mod bound;
pub mod context;
pub mod debug;
pub mod environment;
pub mod error;
pub mod eval;
pub mod prelude;
pub mod source;
pub mod symbol;
pub mod syntax;
pub mod value;

// Re-export main types
pub use binder::{bind, Binder, ImportResolver, NoImports};
pub use bound::{Address, Bound, BoundKind};
pub use context::EvalContext;
pub use debug::{attach, instrument, Controller, DebugContext, Debugger, Request, Session};
pub use environment::{CallContext, Frame};
pub use error::{BindError, Result};
pub use eval::Interpreter;
pub use prelude::Prelude;
pub use source::{render_error, SourceMap, SourcePosition};
pub use symbol::{Symbol, SymbolTable};
pub use value::{Closure, ErrorValue, NativeFn, Quoted, Record, Value};

/// Quasi version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
