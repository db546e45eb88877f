//! Run-time environment chain

mod frame;

pub use frame::Frame;

use std::fmt;
use std::sync::Arc;

use crate::bound::Address;
use crate::value::Value;

/// The chain of frames visible at one point of evaluation, innermost first.
///
/// The chain is a persistent linked list: pushing a frame returns a new
/// context that shares every existing frame. Closures capture a context by
/// cloning the handle, never the frames.
///
/// # Example
///
/// ```
/// use quasi::{Address, CallContext, Frame, Value};
///
/// let outer = CallContext::new().push(Frame::from_values(vec![Value::Int(1)], None));
/// let inner = outer.push(Frame::from_values(vec![Value::Int(2)], None));
///
/// assert_eq!(inner.len(), 2);
/// assert_eq!(inner.get(Address::new(1, 0)), Some(&Value::Int(1)));
/// assert_eq!(outer.len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct CallContext {
    head: Option<Arc<Link>>,
}

struct Link {
    frame: Arc<Frame>,
    parent: CallContext,
    len: usize,
}

/// What an address refers to in a context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slot<'a> {
    /// A written slot
    Bound(&'a Value),
    /// The slot exists but its binding has not been evaluated yet
    Uninitialized,
    /// No such frame or slot
    Missing,
}

impl CallContext {
    /// The empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend the context with `frame`.
    pub fn push(&self, frame: Frame) -> CallContext {
        self.push_shared(Arc::new(frame))
    }

    /// Extend the context with a frame the caller keeps a handle to.
    pub fn push_shared(&self, frame: Arc<Frame>) -> CallContext {
        CallContext {
            head: Some(Arc::new(Link {
                frame,
                parent: self.clone(),
                len: self.len() + 1,
            })),
        }
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.head.as_ref().map_or(0, |link| link.len)
    }

    /// Check if the context has no frames.
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// The frame `level` steps out from the innermost one.
    pub fn frame(&self, level: usize) -> Option<&Arc<Frame>> {
        self.frames().nth(level)
    }

    /// The context `levels` frames out from this one.
    pub fn outer(&self, levels: usize) -> Option<CallContext> {
        let mut context = self;
        for _ in 0..levels {
            context = &context.head.as_ref()?.parent;
        }
        Some(context.clone())
    }

    /// Iterate frames from innermost to outermost.
    pub fn frames(&self) -> impl Iterator<Item = &Arc<Frame>> + '_ {
        let mut current = self.head.as_deref();
        std::iter::from_fn(move || {
            let link = current?;
            current = link.parent.head.as_deref();
            Some(&link.frame)
        })
    }

    /// Resolve `address`.
    pub fn slot(&self, address: Address) -> Slot<'_> {
        match self.frame(address.level) {
            Some(frame) if frame.has_slot(address.index) => match frame.get(address.index) {
                Some(value) => Slot::Bound(value),
                None => Slot::Uninitialized,
            },
            _ => Slot::Missing,
        }
    }

    /// The value at `address`, if it exists and has been written.
    pub fn get(&self, address: Address) -> Option<&Value> {
        match self.slot(address) {
            Slot::Bound(value) => Some(value),
            Slot::Uninitialized | Slot::Missing => None,
        }
    }

    /// Check if two handles share the same innermost frame.
    pub fn same_frames(&self, other: &CallContext) -> bool {
        match (&self.head, &other.head) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for CallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.frames()).finish()
    }
}
