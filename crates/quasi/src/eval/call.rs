//! Function call evaluation

use std::sync::Arc;

use crate::bound::Bound;
use crate::environment::{CallContext, Frame};
use crate::value::{NativeFn, Value};

use super::{Interpreter, Step};

impl Interpreter<'_> {
    /// Evaluate a call.
    ///
    /// Closure bodies are entered as a tail step stamped with this call's
    /// offset. Natives run immediately.
    pub(super) fn step_call(
        &mut self,
        node: &Arc<Bound>,
        target: &Arc<Bound>,
        args: &[Arc<Bound>],
        context: &CallContext,
    ) -> Step {
        let callee = self.evaluate(target, context);
        if callee.is_error() {
            return Step::Done(callee);
        }

        let args = match self.evaluate_all(args, context) {
            Ok(args) => args,
            Err(error) => return Step::Done(error),
        };

        match callee {
            Value::Closure(closure) => {
                if closure.arity != args.len() {
                    return Step::Done(arity_mismatch(closure.arity, args.len(), node));
                }
                let frame = Frame::from_values(args, Some(Arc::clone(&closure.params)));
                Step::Tail {
                    node: Arc::clone(&closure.body),
                    context: closure.context.push(frame),
                    call_site: Some(node.offset),
                }
            }
            Value::Native(native) => Step::Done(call_native(&native, &args, node)),
            other => Step::Done(Value::error(
                format!("value cannot be called: {}", self.printed(&other)),
                node.offset,
            )),
        }
    }
}

/// Invoke a host function; an `Err` becomes an error at the call.
fn call_native(native: &NativeFn, args: &[Value], node: &Bound) -> Value {
    if let Some(arity) = native.arity {
        if arity != args.len() {
            return arity_mismatch(arity, args.len(), node);
        }
    }

    match native.call(args) {
        Ok(value) => value,
        Err(message) => Value::error(format!("{}: {}", native.name, message), node.offset),
    }
}

fn arity_mismatch(expected: usize, received: usize, node: &Bound) -> Value {
    Value::error(
        format!(
            "arity mismatch: expected {} arguments, received {}",
            expected, received
        ),
        node.offset,
    )
}
