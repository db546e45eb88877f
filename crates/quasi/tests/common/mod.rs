//! Shared helpers for the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use quasi::syntax::Expr;
use quasi::*;

/// Install a test logger once; `RUST_LOG=quasi=trace` shows the evaluation.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Bind `expr` against the prelude.
pub fn bind_with_prelude(expr: &Expr, symbols: &SymbolTable) -> anyhow::Result<Arc<Bound>> {
    init_logging();
    Ok(bind(expr, symbols, &Prelude::new())?)
}

/// Bind and run `expr` with the prelude available.
pub fn run(expr: &Expr) -> anyhow::Result<Value> {
    let symbols = SymbolTable::new();
    let bound = bind_with_prelude(expr, &symbols)?;
    Ok(Interpreter::new(&symbols).run(&bound))
}

/// Bind and run `expr` with an explicit configuration.
pub fn run_with(expr: &Expr, config: EvalContext) -> anyhow::Result<Value> {
    let symbols = SymbolTable::new();
    let bound = bind_with_prelude(expr, &symbols)?;
    Ok(Interpreter::new(&symbols).with_config(config).run(&bound))
}

/// The error inside `value`, failing the test otherwise.
pub fn expect_error(value: &Value) -> &ErrorValue {
    match value.as_error() {
        Some(error) => error,
        None => panic!("expected an error value, found {:?}", value),
    }
}
