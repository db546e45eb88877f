//! Callable value types: closures and native functions

use std::fmt;
use std::sync::Arc;

use crate::bound::Bound;
use crate::environment::CallContext;
use crate::syntax::Offset;
use crate::Symbol;

use super::Value;

/// Type alias for native function pointers to reduce complexity
pub type NativeFnPtr = Arc<dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync>;

/// A lambda together with the context it was created in.
#[derive(Clone)]
pub struct Closure {
    /// Number of arguments the lambda takes
    pub arity: usize,

    /// Parameter names, for frame introspection
    pub params: Arc<[Symbol]>,

    /// The body, bound against `params` pushed onto `context`
    pub body: Arc<Bound>,

    /// The captured context (shared, not copied)
    pub context: CallContext,

    /// Where the lambda was defined
    pub offset: Offset,
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The captured context can reach this closure again.
        f.debug_struct("Closure")
            .field("arity", &self.arity)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

/// A host function.
///
/// Natives are handed out by import resolvers. An `Err(message)` from the
/// function becomes an error value at the call site.
#[derive(Clone)]
pub struct NativeFn {
    /// Function name (for display/debugging)
    pub name: Arc<str>,

    /// Expected argument count, `None` for variadic
    pub arity: Option<usize>,

    /// The actual function pointer
    pub func: NativeFnPtr,
}

impl NativeFn {
    /// Wrap a host function.
    pub fn new<F>(name: &str, arity: Option<usize>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            arity,
            func: Arc::new(func),
        }
    }

    /// Invoke the function.
    pub fn call(&self, args: &[Value]) -> Result<Value, String> {
        (self.func)(args)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFn({})", self.name)
    }
}
