//! Debugger support
//!
//! Debugging works on an [`instrument`]ed copy of a bound program. The
//! evaluator consults a [`Debugger`] at every marker in that copy and the
//! rest of evaluation is unchanged.
//!
//! [`Session`] is the stepping debugger: it tracks a call stack, the set of
//! reached offsets and the breakpoints, and hands control to a
//! [`Controller`] whenever it decides to pause. The controller runs
//! synchronously on the evaluating thread and may block as long as it likes.
//!
//! ```
//! use quasi::debug::{attach, DebugContext, Request};
//! use quasi::{bind, syntax::Builder, Interpreter, NoImports, SymbolTable, Value};
//!
//! let symbols = SymbolTable::new();
//! let b = Builder::new();
//! let bound = bind(&b.array(vec![b.int(1).into()]), &symbols, &NoImports).unwrap();
//!
//! let mut stops = Vec::new();
//! let mut session = attach(|cx: &DebugContext<'_>| {
//!     stops.push(cx.offset());
//!     Some(Request::StepInto)
//! });
//! let value = Interpreter::new(&symbols).with_debugger(&mut session).run(&bound);
//! drop(session);
//!
//! assert_eq!(value, Value::array(vec![Value::Int(1)]));
//! assert_eq!(stops, vec![1, 0]);
//! ```

mod breakpoints;
mod instrument;
mod stack;
mod stepper;

pub use breakpoints::{BreakLocations, Breakpoints};
pub use instrument::instrument;
pub use stack::{CallStack, StackFrame};
pub use stepper::{StepState, Stepper};

use log::debug;

use crate::environment::CallContext;
use crate::syntax::Offset;

/// Hooks the evaluator calls while running an instrumented tree.
pub trait Debugger {
    /// A lambda body at `offset` is entered with `context`.
    fn start_function(&mut self, offset: Offset, context: &CallContext);

    /// The lambda body at `offset` finished.
    fn end_function(&mut self, offset: Offset);

    /// The node at `offset` is about to run. Returning `false` aborts
    /// evaluation with a `Terminate` error.
    fn statement(&mut self, offset: Offset, context: &CallContext) -> bool;
}

/// Instructions a controller gives a paused session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Continue until a breakpoint
    Run,
    /// Stop at the next statement
    StepInto,
    /// Stop at the next statement in this function or a caller
    StepOver,
    /// Stop at the next statement in a caller
    StepOut,
    /// Abort evaluation
    Terminate,
    /// Add breakpoints, then ask again
    SetBreakpoints(Vec<Offset>),
    /// Remove the given breakpoints (all for `None`), then ask again
    ClearBreakpoints(Option<Vec<Offset>>),
}

/// Decides what a paused session does next.
///
/// Returning `None` leaves the session stopped: evaluation moves on and
/// pauses again at the next statement.
pub trait Controller {
    /// Called each time the session pauses.
    fn notification(&mut self, context: &DebugContext<'_>) -> Option<Request>;
}

impl<F> Controller for F
where
    F: FnMut(&DebugContext<'_>) -> Option<Request>,
{
    fn notification(&mut self, context: &DebugContext<'_>) -> Option<Request> {
        self(context)
    }
}

/// Session options.
#[derive(Debug, Clone)]
pub struct DebugOptions {
    /// Pause at the first statement (otherwise run to the first breakpoint)
    pub stop_on_entry: bool,
}

impl Default for DebugOptions {
    fn default() -> Self {
        Self {
            stop_on_entry: true,
        }
    }
}

/// What a controller can see while the session is paused.
pub struct DebugContext<'a> {
    offset: Offset,
    state: StepState,
    stack: &'a CallStack,
    locations: &'a BreakLocations,
    breakpoints: &'a Breakpoints,
}

impl<'a> DebugContext<'a> {
    /// Offset of the statement about to run.
    pub fn offset(&self) -> Offset {
        self.offset
    }

    /// The stepper state that caused this pause.
    pub fn state(&self) -> StepState {
        self.state
    }

    /// Call depth, counting the top-level frame.
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// Frame at `depth`, counting from the top level (0).
    pub fn frame(&self, depth: usize) -> Option<&'a StackFrame> {
        self.stack.get(depth)
    }

    /// Frames from the top level inwards.
    pub fn frames(&self) -> impl Iterator<Item = &'a StackFrame> {
        self.stack.iter()
    }

    /// Context of the statement about to run.
    pub fn context(&self) -> &'a CallContext {
        &self.stack.top().context
    }

    /// Reached statement offsets in `start..=end`, sorted.
    pub fn valid_break_locations(&self, start: Offset, end: Offset) -> &'a [Offset] {
        self.locations.range(start, end)
    }

    /// Breakpoints in `start..=end`, sorted.
    pub fn breakpoint_list(&self, start: Offset, end: Offset) -> Vec<Offset> {
        self.breakpoints.range(start, end)
    }

    /// Check if `offset` has a breakpoint.
    pub fn is_breakpoint(&self, offset: Offset) -> bool {
        self.breakpoints.contains(offset)
    }
}

/// A stepping debugger driven by a [`Controller`].
pub struct Session<C> {
    controller: C,
    stepper: Stepper,
    stack: CallStack,
    locations: BreakLocations,
    breakpoints: Breakpoints,
}

/// Start a session that pauses at the first statement.
pub fn attach<C: Controller>(controller: C) -> Session<C> {
    Session::with_options(controller, DebugOptions::default())
}

impl<C: Controller> Session<C> {
    /// Start a session with explicit options.
    pub fn with_options(controller: C, options: DebugOptions) -> Self {
        debug!("debug session attached (stop on entry: {})", options.stop_on_entry);
        let state = if options.stop_on_entry {
            StepState::StepInto
        } else {
            StepState::Running
        };
        Self {
            controller,
            stepper: Stepper::new(state),
            stack: CallStack::new(),
            locations: BreakLocations::new(),
            breakpoints: Breakpoints::new(),
        }
    }

    /// Set breakpoints before evaluation starts.
    pub fn set_breakpoints(&mut self, offsets: impl IntoIterator<Item = Offset>) {
        self.breakpoints.set(offsets);
    }

    /// Current stepper state.
    pub fn state(&self) -> StepState {
        self.stepper.state()
    }

    /// Check if the controller terminated the session.
    pub fn is_terminated(&self) -> bool {
        self.stepper.is_terminated()
    }

    /// The debugger's call stack.
    pub fn stack(&self) -> &CallStack {
        &self.stack
    }

    /// Offsets reached so far.
    pub fn locations(&self) -> &BreakLocations {
        &self.locations
    }

    /// Breakpoints currently set.
    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    /// End the session, returning the controller.
    pub fn into_controller(self) -> C {
        self.controller
    }

    /// Ask the controller what to do until it lets evaluation move on.
    fn pause(&mut self, offset: Offset) -> bool {
        let depth = self.stack.depth();
        loop {
            let request = {
                let context = DebugContext {
                    offset,
                    state: self.stepper.state(),
                    stack: &self.stack,
                    locations: &self.locations,
                    breakpoints: &self.breakpoints,
                };
                self.controller.notification(&context)
            };
            debug!("controller request at offset {}: {:?}", offset, request);

            match request {
                None => {
                    self.stepper.stop();
                    return true;
                }
                Some(Request::Run) => self.stepper.run(),
                Some(Request::StepInto) => self.stepper.step_into(),
                Some(Request::StepOver) => self.stepper.step_over(depth),
                Some(Request::StepOut) => self.stepper.step_out(depth),
                Some(Request::Terminate) => {
                    debug!("debug session terminated at offset {}", offset);
                    self.stepper.terminate();
                    return false;
                }
                Some(Request::SetBreakpoints(offsets)) => {
                    debug!("setting breakpoints {:?}", offsets);
                    self.breakpoints.set(offsets);
                    self.stepper.stop();
                    continue;
                }
                Some(Request::ClearBreakpoints(offsets)) => {
                    debug!("clearing breakpoints {:?}", offsets);
                    self.breakpoints.clear(offsets.as_deref());
                    self.stepper.stop();
                    continue;
                }
            }
            return true;
        }
    }
}

impl<C: Controller> Debugger for Session<C> {
    fn start_function(&mut self, offset: Offset, context: &CallContext) {
        self.stack.push(offset, context.clone());
    }

    fn end_function(&mut self, _offset: Offset) {
        self.stack.pop();
    }

    fn statement(&mut self, offset: Offset, context: &CallContext) -> bool {
        self.locations.record(offset);
        self.stack.update(offset, context);

        if self.stepper.is_terminated() {
            return false;
        }

        let at_breakpoint = self.breakpoints.contains(offset);
        if !self.stepper.should_stop(self.stack.depth(), at_breakpoint) {
            return true;
        }
        self.pause(offset)
    }
}
