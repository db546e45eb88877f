//! Quote and splice evaluation

use std::sync::Arc;

use crate::bound::{Bound, BoundKind};
use crate::environment::CallContext;
use crate::value::{Quoted, Value};

use super::{Interpreter, Step};

impl Interpreter<'_> {
    /// Capture `code`, first substituting its antiquotes.
    ///
    /// An antiquote is a splice at quote depth one inside `code`. Its target
    /// is evaluated here, in the quote's own context, and the quoted tree it
    /// yields takes the splice's place. Subtrees without antiquotes are
    /// shared with the original.
    ///
    /// The quote keeps the context its code is addressed against, so the
    /// code reads the same slots wherever it is later spliced.
    pub(super) fn quote(
        &mut self,
        node: &Bound,
        code: &Arc<Bound>,
        lift: Option<usize>,
        context: &CallContext,
    ) -> Value {
        let code = match self.substitute(code, 1, context) {
            Ok(Some(filled)) => filled,
            Ok(None) => Arc::clone(code),
            Err(error) => return error,
        };
        match lift {
            Some(lift) => Value::Quote(Quoted::new(code, lifted(node, context, lift))),
            None => Value::Quote(Quoted::open(code)),
        }
    }

    fn substitute(
        &mut self,
        node: &Arc<Bound>,
        depth: usize,
        context: &CallContext,
    ) -> Result<Option<Arc<Bound>>, Value> {
        let depth = match &node.kind {
            BoundKind::Splice { target, .. } if depth == 1 => {
                return self.antiquote(node, target, context).map(Some);
            }
            BoundKind::Splice { .. } => depth - 1,
            BoundKind::Quote { .. } => depth + 1,
            _ => depth,
        };
        let rebuilt = node.try_map_children(&mut |child: &Arc<Bound>| {
            self.substitute(child, depth, context)
        })?;
        Ok(rebuilt.map(Arc::new))
    }

    /// Evaluate an antiquote's target and build the node replacing it.
    ///
    /// Code that carries its own context is wrapped so it keeps running
    /// there; open code belongs to the region it is substituted into.
    fn antiquote(
        &mut self,
        node: &Bound,
        target: &Arc<Bound>,
        context: &CallContext,
    ) -> Result<Arc<Bound>, Value> {
        match self.evaluate(target, context) {
            Value::Quote(quoted) if quoted.context.is_some() => Ok(Arc::new(Bound::new(
                quoted.code.offset,
                BoundKind::Spliced(quoted),
            ))),
            Value::Quote(quoted) => Ok(quoted.code),
            error @ Value::Error(_) => Err(error),
            other => Err(self.splice_mismatch(node, &other)),
        }
    }

    /// Evaluate a splice outside any quote: run the quoted tree in the
    /// context it was captured in.
    pub(super) fn step_splice(
        &mut self,
        node: &Bound,
        target: &Arc<Bound>,
        lift: Option<usize>,
        context: &CallContext,
    ) -> Step {
        let Some(lift) = lift else {
            return Step::Done(Value::error(
                "cannot splice here: the target is bound inside quoted code",
                node.offset,
            ));
        };

        match self.evaluate(target, &lifted(node, context, lift)) {
            Value::Quote(Quoted {
                code,
                context: Some(captured),
            }) => Step::Tail {
                node: code,
                context: captured,
                call_site: None,
            },
            Value::Quote(_) => Step::Done(Value::error(
                "cannot splice quoted code outside the quote it was written in",
                node.offset,
            )),
            error @ Value::Error(_) => Step::Done(error),
            other => Step::Done(self.splice_mismatch(node, &other)),
        }
    }

    fn splice_mismatch(&self, node: &Bound, value: &Value) -> Value {
        Value::error(
            format!("cannot splice non-quote value {}", self.printed(value)),
            node.offset,
        )
    }
}

/// `context` without its `lift` innermost frames.
///
/// The binder only emits lifts that fit the context the node runs in.
fn lifted(node: &Bound, context: &CallContext, lift: usize) -> CallContext {
    match context.outer(lift) {
        Some(outer) => outer,
        None => panic!(
            "{} at offset {} lifts {} frames out of a context of {} frames",
            node.kind_name(),
            node.offset,
            lift,
            context.len()
        ),
    }
}
