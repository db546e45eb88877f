//! Stepping state machine

use log::trace;

/// What the debugger does at the next statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    /// Stop at the very next statement
    StepInto,
    /// Stop once the call depth is back at or above the remembered depth
    StepOver,
    /// Stop once the call depth is above the remembered depth
    StepOut,
    /// Stop only at breakpoints
    Running,
    /// Paused; the next statement asks the controller again
    Stopped,
}

/// The state machine behind a [`Session`](super::Session).
#[derive(Debug, Clone)]
pub struct Stepper {
    state: StepState,
    step_depth: usize,
    terminated: bool,
}

impl Stepper {
    /// A stepper starting in `state`.
    pub fn new(state: StepState) -> Self {
        Self {
            state,
            step_depth: 0,
            terminated: false,
        }
    }

    /// Current state.
    pub fn state(&self) -> StepState {
        self.state
    }

    /// Depth remembered by the last step-over or step-out.
    pub fn step_depth(&self) -> usize {
        self.step_depth
    }

    /// Check if a terminate request was received.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Decide whether the statement at `depth` pauses evaluation.
    ///
    /// A breakpoint stops every state.
    pub fn should_stop(&self, depth: usize, at_breakpoint: bool) -> bool {
        let stop = at_breakpoint
            || match self.state {
                StepState::StepInto | StepState::Stopped => true,
                StepState::StepOver => depth <= self.step_depth,
                StepState::StepOut => depth < self.step_depth,
                StepState::Running => false,
            };
        trace!(
            "stepper {:?} (step depth {}) at depth {}, breakpoint {}: {}",
            self.state,
            self.step_depth,
            depth,
            at_breakpoint,
            if stop { "stop" } else { "continue" }
        );
        stop
    }

    /// Continue until a breakpoint.
    pub fn run(&mut self) {
        self.state = StepState::Running;
    }

    /// Stop at the next statement.
    pub fn step_into(&mut self) {
        self.state = StepState::StepInto;
    }

    /// Stop at the next statement at `depth` or shallower.
    pub fn step_over(&mut self, depth: usize) {
        self.state = StepState::StepOver;
        self.step_depth = depth;
    }

    /// Stop at the next statement shallower than `depth`.
    pub fn step_out(&mut self, depth: usize) {
        self.state = StepState::StepOut;
        self.step_depth = depth;
    }

    /// Pause.
    pub fn stop(&mut self) {
        self.state = StepState::Stopped;
    }

    /// Stop for good; every later statement refuses to continue.
    pub fn terminate(&mut self) {
        self.state = StepState::Stopped;
        self.terminated = true;
    }
}
