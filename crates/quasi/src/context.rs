//! Evaluation context configuration

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Configuration and state for evaluation.
///
/// Handed to an [`Interpreter`](crate::Interpreter) once and consulted on every
/// trampoline step.
#[derive(Debug, Clone)]
pub struct EvalContext {
    /// Maximum nesting of non-tail evaluations (native stack protection).
    ///
    /// Hosts evaluating on small thread stacks should lower it.
    pub max_depth: usize,

    /// Set from any thread to stop at the next trampoline step
    pub interrupt: Arc<AtomicBool>,

    /// Whether to log every evaluated node at `trace` level
    pub trace: bool,
}

impl Default for EvalContext {
    fn default() -> Self {
        Self {
            max_depth: 1000,
            interrupt: Arc::new(AtomicBool::new(false)),
            trace: false,
        }
    }
}

impl EvalContext {
    /// Create a new context with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with a custom nesting limit.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Default::default()
        }
    }

    /// Enable or disable per-node tracing.
    pub fn traced(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Check if evaluation has been interrupted.
    pub fn is_interrupted(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed)
    }

    /// Make the running evaluation return `evaluation interrupted`.
    ///
    /// Clones of this context share the flag.
    pub fn interrupt(&self) {
        self.interrupt.store(true, Ordering::Relaxed);
    }

    /// Reset the interrupt flag.
    pub fn reset_interrupt(&self) {
        self.interrupt.store(false, Ordering::Relaxed);
    }
}
