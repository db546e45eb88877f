//! Value trait implementations: constructors, predicates, extractors, From traits, PartialEq

use std::sync::Arc;

use crate::bound::BoundKind;
use crate::syntax::{Literal, Offset};

use super::*;

// ═══════════════════════════════════════════════════════════════════
// Convenience Constructors
// ═══════════════════════════════════════════════════════════════════

impl Value {
    /// Create a string value
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    /// Create an array value
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Arc::new(items))
    }

    /// Create a record value
    pub fn record(record: Record) -> Self {
        Value::Record(Arc::new(record))
    }

    /// Create an error value raised at `offset`
    pub fn error(message: impl Into<String>, offset: Offset) -> Self {
        Value::Error(Arc::new(ErrorValue::new(message).at(offset)))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Type Predicates
    // ═══════════════════════════════════════════════════════════════════
    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if value is an evaluation error
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Check if value is a quote
    pub fn is_quote(&self) -> bool {
        matches!(self, Value::Quote(_))
    }

    /// Check if value is callable (closure or native)
    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Closure(_) | Value::Native(_))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Extractors (return Option for safe access)
    // ═══════════════════════════════════════════════════════════════════
    /// Extract boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract integer value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract float value
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// Extract array elements
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Extract record
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record.as_ref()),
            _ => None,
        }
    }

    /// Extract quoted code
    pub fn as_quote(&self) -> Option<&Quoted> {
        match self {
            Value::Quote(quoted) => Some(quoted),
            _ => None,
        }
    }

    /// Extract error
    pub fn as_error(&self) -> Option<&ErrorValue> {
        match self {
            Value::Error(error) => Some(error.as_ref()),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// PartialEq Implementation
// ═══════════════════════════════════════════════════════════════════

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        if same_allocation(self, other) {
            return true;
        }

        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,

            // Int and Float are distinct kinds
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,

            (Value::Array(a), Value::Array(b)) => a == b,

            // Same member set, equal value per member; slot order is ignored
            (Value::Record(a), Value::Record(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(symbol, value)| b.get(symbol).is_some_and(|v| v == value))
            }

            // Only literal-quoted literals have a structural equality
            (Value::Quote(a), Value::Quote(b)) => {
                match (&a.code.unmarked().kind, &b.code.unmarked().kind) {
                    (BoundKind::Literal(x), BoundKind::Literal(y)) => x == y,
                    _ => false,
                }
            }

            // Functions are equal if they're the same Arc
            (Value::Closure(a), Value::Closure(b)) => Arc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Arc::ptr_eq(&a.func, &b.func),

            (Value::Error(a), Value::Error(b)) => a == b,

            // Different kinds are never equal
            _ => false,
        }
    }
}

fn same_allocation(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b),
        (Value::Record(a), Value::Record(b)) => Arc::ptr_eq(a, b),
        (Value::Quote(a), Value::Quote(b)) => Arc::ptr_eq(&a.code, &b.code),
        (Value::Error(a), Value::Error(b)) => Arc::ptr_eq(a, b),
        _ => false,
    }
}

// ═══════════════════════════════════════════════════════════════════
// From Trait Implementations
// ═══════════════════════════════════════════════════════════════════

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::array(items)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::record(record)
    }
}

impl From<ErrorValue> for Value {
    fn from(error: ErrorValue) -> Self {
        Value::Error(Arc::new(error))
    }
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Null => Value::Null,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(n) => Value::Int(*n),
            Literal::Float(n) => Value::Float(*n),
            Literal::Str(s) => Value::Str(Arc::clone(s)),
        }
    }
}
