//! Display and Debug implementations for Value

use std::fmt;

use crate::bound::BoundKind;
use crate::SymbolTable;

use super::*;

/// A value paired with the symbol table used to name record members.
///
/// Created by [`Value::display`]. Without a table, members print as their
/// symbol ids (`#3`).
pub struct Printed<'a> {
    value: &'a Value,
    symbols: Option<&'a SymbolTable>,
}

impl Value {
    /// Render this value, naming record members through `symbols`.
    pub fn display<'a>(&'a self, symbols: &'a SymbolTable) -> Printed<'a> {
        Printed {
            value: self,
            symbols: Some(symbols),
        }
    }
}

impl Printed<'_> {
    fn nested<'b>(&'b self, value: &'b Value) -> Printed<'b> {
        Printed {
            value,
            symbols: self.symbols,
        }
    }
}

impl fmt::Display for Printed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{:?}", n),
            Value::Str(s) => write!(f, "{:?}", s.as_ref()),

            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", self.nested(item))?;
                }
                write!(f, "]")
            }

            Value::Record(record) => {
                if record.is_empty() {
                    return write!(f, "{{}}");
                }
                write!(f, "{{ ")?;
                for (i, (symbol, value)) in record.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match self.symbols {
                        Some(table) => write!(f, "{}", table.name_of(symbol))?,
                        None => write!(f, "{}", symbol)?,
                    }
                    write!(f, ": {}", self.nested(value))?;
                }
                write!(f, " }}")
            }

            Value::Quote(quoted) => {
                let code = quoted.code.unmarked();
                match &code.kind {
                    BoundKind::Literal(literal) => write!(f, "'{}", literal),
                    _ => write!(f, "'<{} @{}>", code.kind_name(), code.offset),
                }
            }

            Value::Closure(closure) => write!(f, "<lambda/{}>", closure.arity),
            Value::Native(native) => write!(f, "<native {}>", native.name),
            Value::Error(error) => write!(f, "<error: {}>", error.message),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let printed = Printed {
            value: self,
            symbols: None,
        };
        fmt::Display::fmt(&printed, f)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Debug also shows where the error came from
            Value::Error(error) => {
                write!(f, "Error({:?}", error.message)?;
                if let Some(offset) = error.offset {
                    write!(f, " @{}", offset)?;
                }
                if !error.trace.is_empty() {
                    write!(f, " via {:?}", error.trace)?;
                }
                write!(f, ")")
            }
            _ => fmt::Display::fmt(self, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Literal;

    #[test]
    fn test_display_literals() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::Float(1.0).to_string(), "1.0");
        assert_eq!(Value::string("hi").to_string(), "\"hi\"");
    }

    #[test]
    fn test_display_record_with_names() {
        let symbols = SymbolTable::new();
        let x = symbols.intern("x");
        let y = symbols.intern("y");
        let value = Value::record(
            Record::new()
                .with(x, Value::Int(1))
                .with(y, Value::array(vec![Value::Int(2), Value::Null])),
        );
        assert_eq!(value.display(&symbols).to_string(), "{ x: 1, y: [2, null] }");
        assert_eq!(value.to_string(), "{ #0: 1, #1: [2, null] }");
        assert_eq!(Value::record(Record::new()).to_string(), "{}");
    }

    #[test]
    fn test_display_quote() {
        let literal = Value::Quote(Quoted::open(Arc::new(Bound::new(
            3,
            BoundKind::Literal(Literal::Int(42)),
        ))));
        assert_eq!(literal.to_string(), "'42");

        let code = Value::Quote(Quoted::new(
            Arc::new(Bound::new(8, BoundKind::Array(Vec::new()))),
            CallContext::new(),
        ));
        assert_eq!(code.to_string(), "'<array @8>");
    }

    #[test]
    fn test_debug_error_shows_location() {
        let error = ErrorValue::new("boom").at(4).with_call_site(9);
        let value = Value::Error(Arc::new(error));
        assert_eq!(format!("{:?}", value), "Error(\"boom\" @4 via [9])");
        assert_eq!(value.to_string(), "<error: boom>");
    }
}
