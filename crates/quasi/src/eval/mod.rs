//! Expression evaluation
//!
//! [`Interpreter::evaluate`] runs a trampoline: each node either finishes
//! with a value or hands back the next node to run in its place
//! ([`Step::Tail`]). Calls in tail position therefore never grow the native
//! stack; only non-tail subexpressions (arguments, bindings, scrutinees)
//! recurse, and that recursion is bounded by [`EvalContext::max_depth`].
//!
//! Errors are ordinary [`Value::Error`]s. Every compound node returns the
//! first error it meets, left to right, without evaluating the rest.

mod call;
mod construct;
mod pattern;
mod quote;

use std::sync::Arc;

use log::{trace, warn};

use crate::bound::{Bound, BoundKind};
use crate::debug::Debugger;
use crate::environment::{CallContext, Frame, Slot};
use crate::syntax::Offset;
use crate::value::{Closure, Value};
use crate::{EvalContext, SymbolTable};

/// Result of evaluating one node.
pub(crate) enum Step {
    /// Evaluation finished
    Done(Value),

    /// Continue with `node` in `context`.
    ///
    /// `call_site` is set when the jump enters a closure body; an error
    /// escaping the trampoline is stamped with the latest such site.
    Tail {
        node: Arc<Bound>,
        context: CallContext,
        call_site: Option<Offset>,
    },

    /// Continue with an instrumented function body entered at `entry`.
    EnterBody {
        body: Arc<Bound>,
        context: CallContext,
        entry: Offset,
    },
}

impl Step {
    fn tail(node: &Arc<Bound>, context: CallContext) -> Self {
        Step::Tail {
            node: Arc::clone(node),
            context,
            call_site: None,
        }
    }
}

/// Tree-walking evaluator for bound programs.
///
/// # Example
///
/// ```
/// use quasi::{bind, syntax::Builder, Interpreter, NoImports, SymbolTable, Value};
///
/// let symbols = SymbolTable::new();
/// let b = Builder::new();
/// let program = b.call(b.lambda(&["x"], b.reference("x")), vec![b.int(7)]);
///
/// let bound = bind(&program, &symbols, &NoImports).unwrap();
/// let value = Interpreter::new(&symbols).run(&bound);
/// assert_eq!(value, Value::Int(7));
/// ```
pub struct Interpreter<'a> {
    symbols: &'a SymbolTable,
    config: EvalContext,
    debugger: Option<&'a mut dyn Debugger>,
    depth: usize,
}

impl<'a> Interpreter<'a> {
    /// Create an interpreter with the default configuration.
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self {
            symbols,
            config: EvalContext::default(),
            debugger: None,
            depth: 0,
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: EvalContext) -> Self {
        self.config = config;
        self
    }

    /// Consult `debugger` at every marker of an instrumented tree.
    pub fn with_debugger(mut self, debugger: &'a mut dyn Debugger) -> Self {
        self.debugger = Some(debugger);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &EvalContext {
        &self.config
    }

    /// Evaluate a whole program in the empty context.
    ///
    /// When a debugger is attached the program is instrumented first. The
    /// markers only report to the debugger: results, error traces and
    /// depth use are the same as without one.
    pub fn run(&mut self, program: &Arc<Bound>) -> Value {
        let program = if self.debugger.is_some() {
            crate::debug::instrument(program)
        } else {
            Arc::clone(program)
        };
        self.evaluate(&program, &CallContext::new())
    }

    /// Evaluate `node` in `context`.
    ///
    /// Never fails: user-visible problems come back as [`Value::Error`].
    pub fn evaluate(&mut self, node: &Arc<Bound>, context: &CallContext) -> Value {
        if self.depth >= self.config.max_depth {
            warn!(
                "evaluation depth limit {} hit at offset {}",
                self.config.max_depth, node.offset
            );
            return Value::error(
                format!(
                    "maximum evaluation depth of {} exceeded",
                    self.config.max_depth
                ),
                node.offset,
            );
        }

        self.depth += 1;
        let value = self.trampoline(Arc::clone(node), context.clone());
        self.depth -= 1;
        value
    }

    fn trampoline(&mut self, mut node: Arc<Bound>, mut context: CallContext) -> Value {
        let mut call_site = None;
        // Entry of the instrumented function body this trampoline is in
        let mut function = None;

        let value = loop {
            if self.config.is_interrupted() {
                warn!("evaluation interrupted at offset {}", node.offset);
                let error = Value::error("evaluation interrupted", node.offset);
                break stamp_call_site(error, call_site);
            }
            if self.config.trace {
                trace!("eval {} @{}", node.kind_name(), node.offset);
            }

            match self.step(&node, &context) {
                Step::Done(value) => break stamp_call_site(value, call_site),
                Step::Tail {
                    node: next,
                    context: next_context,
                    call_site: site,
                } => {
                    node = next;
                    context = next_context;
                    if site.is_some() {
                        call_site = site;
                    }
                }
                Step::EnterBody {
                    body,
                    context: body_context,
                    entry,
                } => {
                    // A body reached by a tail call replaces the one running
                    if let Some(debugger) = self.debugger.as_deref_mut() {
                        if let Some(previous) = function.replace(entry) {
                            debugger.end_function(previous);
                        }
                        debugger.start_function(entry, &body_context);
                    }
                    node = body;
                    context = body_context;
                }
            }
        };

        if let (Some(entry), Some(debugger)) = (function, self.debugger.as_deref_mut()) {
            debugger.end_function(entry);
        }
        value
    }

    fn step(&mut self, node: &Arc<Bound>, context: &CallContext) -> Step {
        match &node.kind {
            BoundKind::Literal(literal) => Step::Done(Value::from(literal)),

            BoundKind::Reference { address, name } => match context.slot(*address) {
                Slot::Bound(value) => Step::Done(value.clone()),
                Slot::Uninitialized => Step::Done(Value::error(
                    format!("`{}` used before initialization", self.symbols.name_of(*name)),
                    node.offset,
                )),
                Slot::Missing => panic!(
                    "reference `{}` at offset {} resolves to missing slot {} in a context of {} frames",
                    self.symbols.name_of(*name),
                    node.offset,
                    address,
                    context.len()
                ),
            },

            BoundKind::Let {
                names,
                bindings,
                body,
            } => {
                let frame = Arc::new(Frame::with_size(bindings.len(), Some(Arc::clone(names))));
                let inner = context.push_shared(Arc::clone(&frame));
                for (index, binding) in bindings.iter().enumerate() {
                    let value = self.evaluate(binding, &inner);
                    if value.is_error() {
                        return Step::Done(value);
                    }
                    frame.init(index, value);
                }
                Step::tail(body, inner)
            }

            BoundKind::Lambda { params, body } => Step::Done(Value::Closure(Arc::new(Closure {
                arity: params.len(),
                params: Arc::clone(params),
                body: Arc::clone(body),
                context: context.clone(),
                offset: node.offset,
            }))),

            BoundKind::Call { target, args } => self.step_call(node, target, args, context),

            BoundKind::Record(members) => Step::Done(self.build_record(members, context)),

            BoundKind::Array(elements) => Step::Done(self.build_array(elements, context)),

            BoundKind::Select { target, member } => {
                Step::Done(self.select(node, target, *member, context))
            }

            BoundKind::Index { target, index } => {
                Step::Done(self.index(node, target, index, context))
            }

            BoundKind::Quote { code, lift } => Step::Done(self.quote(node, code, *lift, context)),

            BoundKind::Splice { target, lift } => self.step_splice(node, target, *lift, context),

            BoundKind::Spliced(quoted) => match &quoted.context {
                Some(captured) => Step::tail(&quoted.code, captured.clone()),
                None => Step::tail(&quoted.code, context.clone()),
            },

            BoundKind::Match { target, clauses } => self.step_match(node, target, clauses, context),

            BoundKind::Import { value, .. } => Step::Done(value.clone()),

            BoundKind::Debug(inner) => {
                if let Some(debugger) = self.debugger.as_deref_mut() {
                    if !debugger.statement(node.offset, context) {
                        return Step::Done(Value::error("Terminate", node.offset));
                    }
                }
                Step::tail(inner, context.clone())
            }

            BoundKind::LambdaBody(body) => Step::EnterBody {
                body: Arc::clone(body),
                context: context.clone(),
                entry: node.offset,
            },
        }
    }

    /// Evaluate each node in order, stopping at the first error.
    fn evaluate_all(
        &mut self,
        nodes: &[Arc<Bound>],
        context: &CallContext,
    ) -> Result<Vec<Value>, Value> {
        let mut values = Vec::with_capacity(nodes.len());
        for node in nodes {
            let value = self.evaluate(node, context);
            if value.is_error() {
                return Err(value);
            }
            values.push(value);
        }
        Ok(values)
    }

    fn printed(&self, value: &Value) -> String {
        value.display(self.symbols).to_string()
    }
}

/// Record `call_site` on an error leaving a trampoline.
fn stamp_call_site(value: Value, call_site: Option<Offset>) -> Value {
    match (value, call_site) {
        (Value::Error(error), Some(site)) => Value::Error(Arc::new(error.with_call_site(site))),
        (value, _) => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::{bind, NoImports};
    use crate::syntax::Builder;

    #[test]
    fn test_let_frame_lives_as_long_as_its_closures() {
        let symbols = SymbolTable::new();
        let b = Builder::new();
        let frame_of = |value: &Value| match value {
            Value::Closure(closure) => {
                Arc::downgrade(closure.context.frame(0).expect("captured frame"))
            }
            other => panic!("expected a closure, found {:?}", other),
        };

        // let a = 1 in \x -> a: the closure escapes, the frame holds no closure
        let plain = b.let_in(vec![("a", b.int(1))], b.lambda(&["x"], b.reference("a")));
        let bound = bind(&plain, &symbols, &NoImports).unwrap();
        let value = Interpreter::new(&symbols).run(&bound);
        let frame = frame_of(&value);
        assert!(frame.upgrade().is_some());
        drop(value);
        assert!(frame.upgrade().is_none());

        // let f = \x -> f(x) in f: frame and closure hold each other
        let recursive = b.let_in(
            vec![(
                "f",
                b.lambda(&["x"], b.call(b.reference("f"), vec![b.reference("x")])),
            )],
            b.reference("f"),
        );
        let bound = bind(&recursive, &symbols, &NoImports).unwrap();
        let value = Interpreter::new(&symbols).run(&bound);
        let frame = frame_of(&value);
        drop(value);
        assert!(frame.upgrade().is_some());
    }

    #[test]
    fn test_stamp_call_site_only_touches_errors() {
        assert_eq!(stamp_call_site(Value::Int(1), Some(3)), Value::Int(1));

        let stamped = stamp_call_site(Value::error("e", 0), Some(3));
        assert_eq!(stamped.as_error().map(|e| e.trace.clone()), Some(vec![3]));

        let untouched = stamp_call_site(Value::error("e", 0), None);
        assert_eq!(untouched.as_error().map(|e| e.trace.len()), Some(0));
    }

    #[test]
    fn test_depth_resets_after_evaluation() {
        let symbols = SymbolTable::new();
        let b = Builder::new();
        let program = b.array(vec![b.array(vec![b.int(1).into()]).into()]);
        let bound = bind(&program, &symbols, &NoImports).unwrap();

        let mut interpreter = Interpreter::new(&symbols);
        interpreter.run(&bound);
        assert_eq!(interpreter.depth, 0);
    }

    #[test]
    fn test_let_forward_reference_is_an_error() {
        let symbols = SymbolTable::new();
        let b = Builder::new();
        let program = b.let_in(vec![("a", b.reference("b")), ("b", b.int(1))], b.reference("a"));
        let bound = bind(&program, &symbols, &NoImports).unwrap();

        let value = Interpreter::new(&symbols).run(&bound);
        let error = value.as_error().expect("expected an error");
        assert_eq!(error.message, "`b` used before initialization");
        assert_eq!(error.offset, Some(0));
    }
}
