//! Run-time frames

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::value::Value;
use crate::Symbol;

/// One environment's slots.
///
/// Each slot is written at most once. Let frames are created empty and filled
/// binding by binding; call and match frames are created full. Closures may
/// hold a frame before all of its slots are written, which is what makes
/// recursive lets work.
///
/// Frames are reference counted. A lambda bound by a `let` captures a
/// context that holds the let's own frame, and the frame holds the closure,
/// so such a frame is never freed. A weak link back would break closures
/// that escape the let (`let f = \x -> f(x) in f`).
pub struct Frame {
    slots: Box<[OnceLock<Value>]>,
    names: Option<Arc<[Symbol]>>,
}

impl Frame {
    /// A frame of `size` unwritten slots.
    pub fn with_size(size: usize, names: Option<Arc<[Symbol]>>) -> Self {
        Self {
            slots: (0..size).map(|_| OnceLock::new()).collect(),
            names,
        }
    }

    /// A frame holding `values`.
    pub fn from_values(values: Vec<Value>, names: Option<Arc<[Symbol]>>) -> Self {
        Self {
            slots: values.into_iter().map(OnceLock::from).collect(),
            names,
        }
    }

    /// A frame where only some slots are written.
    pub fn from_slots(slots: Vec<Option<Value>>, names: Option<Arc<[Symbol]>>) -> Self {
        Self {
            slots: slots
                .into_iter()
                .map(|slot| match slot {
                    Some(value) => OnceLock::from(value),
                    None => OnceLock::new(),
                })
                .collect(),
            names,
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the frame has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The value in `index`, if that slot exists and has been written.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.slots.get(index).and_then(OnceLock::get)
    }

    /// Check if `index` names a slot of this frame.
    pub fn has_slot(&self, index: usize) -> bool {
        index < self.slots.len()
    }

    /// Write slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if the slot does not exist or was already written; both mean
    /// the evaluator lost track of the frame layout.
    pub(crate) fn init(&self, index: usize, value: Value) {
        let slot = match self.slots.get(index) {
            Some(slot) => slot,
            None => panic!(
                "frame slot {} out of range (frame has {} slots)",
                index,
                self.slots.len()
            ),
        };
        if slot.set(value).is_err() {
            panic!("frame slot {} written twice", index);
        }
    }

    /// Slot names, when the frame was built from named bindings.
    pub fn names(&self) -> Option<&[Symbol]> {
        self.names.as_deref()
    }

    /// Each slot with its name (if known) and value (if written).
    pub fn entries(&self) -> impl Iterator<Item = (Option<Symbol>, Option<&Value>)> + '_ {
        self.slots.iter().enumerate().map(move |(index, slot)| {
            let name = self
                .names
                .as_ref()
                .and_then(|names| names.get(index).copied());
            (name, slot.get())
        })
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Values may be closures that capture this very frame, so only the
        // shape is printed.
        let written = self.slots.iter().filter(|s| s.get().is_some()).count();
        write!(f, "Frame({}/{} written)", written, self.slots.len())
    }
}
