//! Debugger call stack

use log::warn;

use crate::environment::CallContext;
use crate::syntax::Offset;

/// One active function as seen by the debugger.
#[derive(Debug, Clone)]
pub struct StackFrame {
    /// Offset of the function body's entry marker
    pub entry: Offset,
    /// Offset of the statement most recently reached in this frame
    pub current: Offset,
    /// Context at the most recent statement
    pub context: CallContext,
}

/// Frames pushed by function entry and popped by function exit.
///
/// Frame 0 stands for the program's top level and is never popped, so the
/// depth is always at least one.
#[derive(Debug, Clone)]
pub struct CallStack {
    frames: Vec<StackFrame>,
}

impl Default for CallStack {
    fn default() -> Self {
        Self {
            frames: vec![StackFrame {
                entry: 0,
                current: 0,
                context: CallContext::new(),
            }],
        }
    }
}

impl CallStack {
    /// A stack holding only the top-level frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames, including the top-level frame.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Enter a function body.
    pub fn push(&mut self, entry: Offset, context: CallContext) {
        self.frames.push(StackFrame {
            entry,
            current: entry,
            context,
        });
    }

    /// Leave the innermost function body.
    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        } else {
            warn!("function exit without a matching entry");
        }
    }

    /// Record the statement being executed in the innermost frame.
    pub fn update(&mut self, offset: Offset, context: &CallContext) {
        if let Some(top) = self.frames.last_mut() {
            top.current = offset;
            top.context = context.clone();
        }
    }

    /// The innermost frame.
    pub fn top(&self) -> &StackFrame {
        // Frame 0 is never popped.
        &self.frames[self.frames.len() - 1]
    }

    /// Frame at `index`, counting from the top level (0).
    pub fn get(&self, index: usize) -> Option<&StackFrame> {
        self.frames.get(index)
    }

    /// Frames from the top level inwards.
    pub fn iter(&self) -> std::slice::Iter<'_, StackFrame> {
        self.frames.iter()
    }
}
