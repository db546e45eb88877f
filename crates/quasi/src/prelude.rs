//! Standard prelude with built-in functions
//!
//! The language itself has no operators. Hosts hand arithmetic, comparison
//! and friends to programs as imports; [`Prelude`] is a ready-made
//! [`ImportResolver`] for that.

use indexmap::IndexMap;

use crate::binder::ImportResolver;
use crate::error::type_name;
use crate::value::{NativeFn, Value};

type BuiltinImpl = fn(&[Value]) -> Result<Value, String>;

/// Import resolver offering the built-in functions.
///
/// | name | arity | meaning |
/// |---|---|---|
/// | `add`, `sub`, `mul`, `div` | 2 | arithmetic on ints or floats (an int and a float give a float) |
/// | `eq` | 2 | value equality |
/// | `lt` | 2 | ordering of numbers or strings |
/// | `not` | 1 | boolean negation |
/// | `len` | 1 | length of an array, string (in characters) or record |
/// | `concat` | any | joins strings, or arrays |
/// | `type_of` | 1 | kind name as a string |
///
/// Names it does not know are passed to the fallback resolver, if any.
pub struct Prelude<'a> {
    natives: IndexMap<&'static str, NativeFn>,
    fallback: Option<&'a dyn ImportResolver>,
}

impl Prelude<'static> {
    /// The built-in functions alone.
    pub fn new() -> Self {
        let mut natives = IndexMap::new();
        let mut define = |name: &'static str, arity: Option<usize>, func: BuiltinImpl| {
            natives.insert(name, NativeFn::new(name, arity, func));
        };

        // Arithmetic
        define("add", Some(2), builtin_add);
        define("sub", Some(2), builtin_sub);
        define("mul", Some(2), builtin_mul);
        define("div", Some(2), builtin_div);

        // Comparison
        define("eq", Some(2), builtin_eq);
        define("lt", Some(2), builtin_lt);
        define("not", Some(1), builtin_not);

        // Collections
        define("len", Some(1), builtin_len);
        define("concat", None, builtin_concat);

        // Type inspection
        define("type_of", Some(1), builtin_type_of);

        Self {
            natives,
            fallback: None,
        }
    }
}

impl Default for Prelude<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Prelude<'a> {
    /// Resolve unknown names through `fallback`.
    pub fn with_fallback<'b>(self, fallback: &'b dyn ImportResolver) -> Prelude<'b> {
        Prelude {
            natives: self.natives,
            fallback: Some(fallback),
        }
    }

    /// Names of the built-in functions, in definition order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.natives.keys().copied()
    }
}

impl ImportResolver for Prelude<'_> {
    fn resolve(&self, name: &str) -> Option<Value> {
        match self.natives.get(name) {
            Some(native) => Some(Value::Native(native.clone())),
            None => self.fallback.and_then(|fallback| fallback.resolve(name)),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Built-in Function Implementations
// ═══════════════════════════════════════════════════════════════════════

/// Apply an int operation, or a float one when either side is a float.
fn arithmetic(
    args: &[Value],
    int_op: fn(i64, i64) -> Result<i64, String>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::Int(a), Value::Int(b)) => int_op(*a, *b).map(Value::Int),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(float_op(*a, *b))),
        (Value::Int(a), Value::Float(b)) => Ok(Value::Float(float_op(*a as f64, *b))),
        (Value::Float(a), Value::Int(b)) => Ok(Value::Float(float_op(*a, *b as f64))),
        (a, b) => Err(format!(
            "expected numbers, found {} and {}",
            type_name(a),
            type_name(b)
        )),
    }
}

fn overflow() -> String {
    "integer overflow".to_string()
}

fn builtin_add(args: &[Value]) -> Result<Value, String> {
    arithmetic(args, |a, b| a.checked_add(b).ok_or_else(overflow), |a, b| a + b)
}

fn builtin_sub(args: &[Value]) -> Result<Value, String> {
    arithmetic(args, |a, b| a.checked_sub(b).ok_or_else(overflow), |a, b| a - b)
}

fn builtin_mul(args: &[Value]) -> Result<Value, String> {
    arithmetic(args, |a, b| a.checked_mul(b).ok_or_else(overflow), |a, b| a * b)
}

fn builtin_div(args: &[Value]) -> Result<Value, String> {
    arithmetic(
        args,
        |a, b| {
            if b == 0 {
                return Err("division by zero".to_string());
            }
            a.checked_div(b).ok_or_else(overflow)
        },
        |a, b| a / b,
    )
}

fn builtin_eq(args: &[Value]) -> Result<Value, String> {
    Ok(Value::Bool(args[0] == args[1]))
}

fn builtin_lt(args: &[Value]) -> Result<Value, String> {
    let less = match (&args[0], &args[1]) {
        (Value::Int(a), Value::Int(b)) => a < b,
        (Value::Float(a), Value::Float(b)) => a < b,
        (Value::Int(a), Value::Float(b)) => (*a as f64) < *b,
        (Value::Float(a), Value::Int(b)) => *a < (*b as f64),
        (Value::Str(a), Value::Str(b)) => a < b,
        (a, b) => {
            return Err(format!(
                "cannot compare {} with {}",
                type_name(a),
                type_name(b)
            ))
        }
    };
    Ok(Value::Bool(less))
}

fn builtin_not(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::Bool(b) => Ok(Value::Bool(!b)),
        other => Err(format!("expected bool, found {}", type_name(other))),
    }
}

fn builtin_len(args: &[Value]) -> Result<Value, String> {
    let len = match &args[0] {
        Value::Array(items) => items.len(),
        Value::Str(s) => s.chars().count(),
        Value::Record(record) => record.len(),
        other => return Err(format!("{} has no length", type_name(other))),
    };
    i64::try_from(len)
        .map(Value::Int)
        .map_err(|_| overflow())
}

fn builtin_concat(args: &[Value]) -> Result<Value, String> {
    match args.first() {
        None => Ok(Value::string("")),
        Some(Value::Str(_)) => {
            let mut joined = String::new();
            for arg in args {
                match arg {
                    Value::Str(s) => joined.push_str(s),
                    other => return Err(format!("cannot concat string and {}", type_name(other))),
                }
            }
            Ok(Value::string(joined))
        }
        Some(Value::Array(_)) => {
            let mut joined = Vec::new();
            for arg in args {
                match arg {
                    Value::Array(items) => joined.extend(items.iter().cloned()),
                    other => return Err(format!("cannot concat array and {}", type_name(other))),
                }
            }
            Ok(Value::array(joined))
        }
        Some(other) => Err(format!("cannot concat {}", type_name(other))),
    }
}

fn builtin_type_of(args: &[Value]) -> Result<Value, String> {
    Ok(Value::string(type_name(&args[0])))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: &[Value]) -> Result<Value, String> {
        match Prelude::new().resolve(name) {
            Some(Value::Native(native)) => native.call(args),
            other => panic!("expected native `{}`, found {:?}", name, other),
        }
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(call("add", &[Value::Int(2), Value::Int(3)]), Ok(Value::Int(5)));
        assert_eq!(call("sub", &[Value::Int(2), Value::Int(3)]), Ok(Value::Int(-1)));
        assert_eq!(call("mul", &[Value::Int(2), Value::Float(1.5)]), Ok(Value::Float(3.0)));
        assert_eq!(call("div", &[Value::Int(7), Value::Int(2)]), Ok(Value::Int(3)));
        assert_eq!(
            call("div", &[Value::Int(1), Value::Int(0)]),
            Err("division by zero".to_string())
        );
        assert_eq!(
            call("add", &[Value::Int(i64::MAX), Value::Int(1)]),
            Err("integer overflow".to_string())
        );
        assert!(call("add", &[Value::Null, Value::Int(1)]).is_err());
    }

    #[test]
    fn test_comparison() {
        assert_eq!(call("lt", &[Value::Int(1), Value::Int(2)]), Ok(Value::Bool(true)));
        assert_eq!(
            call("lt", &[Value::string("b"), Value::string("a")]),
            Ok(Value::Bool(false))
        );
        assert_eq!(call("eq", &[Value::Int(1), Value::Float(1.0)]), Ok(Value::Bool(false)));
        assert_eq!(call("not", &[Value::Bool(false)]), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_collections() {
        assert_eq!(call("len", &[Value::string("héllo")]), Ok(Value::Int(5)));
        assert_eq!(
            call("concat", &[Value::string("a"), Value::string("b")]),
            Ok(Value::string("ab"))
        );
        assert_eq!(
            call(
                "concat",
                &[Value::array(vec![Value::Int(1)]), Value::array(vec![Value::Int(2)])]
            ),
            Ok(Value::array(vec![Value::Int(1), Value::Int(2)]))
        );
        assert_eq!(call("type_of", &[Value::Null]), Ok(Value::string("null")));
    }

    #[test]
    fn test_fallback_and_identity() {
        let host = |name: &str| (name == "answer").then_some(Value::Int(42));
        let prelude = Prelude::new().with_fallback(&host);
        assert_eq!(prelude.resolve("answer"), Some(Value::Int(42)));
        assert_eq!(prelude.resolve("missing"), None);

        // Every import of a name yields the same function
        assert_eq!(prelude.resolve("add"), prelude.resolve("add"));
        assert_eq!(prelude.names().count(), 10);
    }
}
