//! Record and array construction, member selection and indexing

use std::sync::Arc;

use crate::bound::{Bound, BoundElement, BoundMember};
use crate::environment::CallContext;
use crate::error::type_name;
use crate::value::{Record, Value};
use crate::Symbol;

use super::Interpreter;

impl Interpreter<'_> {
    /// Build a record. The first writer of a symbol wins, whether it is a
    /// named member or a projection.
    pub(super) fn build_record(&mut self, members: &[BoundMember], context: &CallContext) -> Value {
        let mut record = Record::new();
        for member in members {
            match member {
                BoundMember::Named { symbol, value } => {
                    let value = self.evaluate(value, context);
                    if value.is_error() {
                        return value;
                    }
                    record.insert(*symbol, value);
                }
                BoundMember::Projection(source) => {
                    let value = self.evaluate(source, context);
                    match &value {
                        Value::Error(_) => return value,
                        Value::Record(projected) => {
                            for (symbol, member) in projected.iter() {
                                record.insert(symbol, member.clone());
                            }
                        }
                        other => {
                            return Value::error(
                                format!(
                                    "cannot project {} {} into a record",
                                    type_name(other),
                                    self.printed(other)
                                ),
                                source.offset,
                            )
                        }
                    }
                }
            }
        }
        Value::record(record)
    }

    /// Build an array, splicing projected arrays in place.
    pub(super) fn build_array(&mut self, elements: &[BoundElement], context: &CallContext) -> Value {
        let mut items = Vec::with_capacity(elements.len());
        for element in elements {
            match element {
                BoundElement::Item(node) => {
                    let value = self.evaluate(node, context);
                    if value.is_error() {
                        return value;
                    }
                    items.push(value);
                }
                BoundElement::Projection(source) => {
                    let value = self.evaluate(source, context);
                    match &value {
                        Value::Error(_) => return value,
                        Value::Array(projected) => items.extend(projected.iter().cloned()),
                        other => {
                            return Value::error(
                                format!(
                                    "cannot project {} {} into an array",
                                    type_name(other),
                                    self.printed(other)
                                ),
                                source.offset,
                            )
                        }
                    }
                }
            }
        }
        Value::array(items)
    }

    pub(super) fn select(
        &mut self,
        node: &Bound,
        target: &Arc<Bound>,
        member: Symbol,
        context: &CallContext,
    ) -> Value {
        let value = self.evaluate(target, context);
        match &value {
            Value::Error(_) => value,
            Value::Record(record) => match record.get(member) {
                Some(found) => found.clone(),
                None => Value::error(
                    format!("record has no member `{}`", self.symbols.name_of(member)),
                    node.offset,
                ),
            },
            other => Value::error(
                format!(
                    "cannot select `{}` from {} {}",
                    self.symbols.name_of(member),
                    type_name(other),
                    self.printed(other)
                ),
                node.offset,
            ),
        }
    }

    /// Index an array, or a string by character (yielding the code point).
    pub(super) fn index(
        &mut self,
        node: &Bound,
        target: &Arc<Bound>,
        index: &Arc<Bound>,
        context: &CallContext,
    ) -> Value {
        let container = self.evaluate(target, context);
        if container.is_error() {
            return container;
        }
        let position = self.evaluate(index, context);
        let position = match &position {
            Value::Error(_) => return position,
            Value::Int(n) => *n,
            other => {
                return Value::error(
                    format!("index must be an int, found {}", type_name(other)),
                    index.offset,
                )
            }
        };

        match &container {
            Value::Array(items) => match checked_index(position, items.len()) {
                Some(i) => items[i].clone(),
                None => out_of_range(position, items.len(), node),
            },
            Value::Str(text) => {
                let len = text.chars().count();
                match checked_index(position, len).and_then(|i| text.chars().nth(i)) {
                    Some(c) => Value::Int(i64::from(u32::from(c))),
                    None => out_of_range(position, len, node),
                }
            }
            other => Value::error(
                format!("cannot index into {} {}", type_name(other), self.printed(other)),
                node.offset,
            ),
        }
    }
}

fn checked_index(position: i64, len: usize) -> Option<usize> {
    usize::try_from(position).ok().filter(|i| *i < len)
}

fn out_of_range(position: i64, len: usize, node: &Bound) -> Value {
    let message = if len == 0 {
        format!("index {} is out of range, the target is empty", position)
    } else {
        format!("index {} is out of range 0..{}", position, len - 1)
    };
    Value::error(message, node.offset)
}
