//! Pattern matching logic

use std::collections::HashSet;
use std::sync::Arc;

use crate::bound::{Bound, BoundClause, Pattern, PatternElement, PatternMember};
use crate::environment::{CallContext, Frame};
use crate::value::{Record, Value};

use super::{Interpreter, Step};

/// Slot values collected while matching one clause.
type Slots = Vec<Option<Value>>;

impl Interpreter<'_> {
    /// Evaluate a match: the scrutinee once, then clauses in order.
    pub(super) fn step_match(
        &mut self,
        node: &Bound,
        target: &Arc<Bound>,
        clauses: &[BoundClause],
        context: &CallContext,
    ) -> Step {
        let value = self.evaluate(target, context);
        if value.is_error() {
            return Step::Done(value);
        }

        for clause in clauses {
            let mut slots: Slots = vec![None; clause.names.len()];
            match self.match_pattern(&clause.pattern, &value, &mut slots, context) {
                Ok(true) => {
                    let frame = Frame::from_slots(slots, Some(Arc::clone(&clause.names)));
                    return Step::Tail {
                        node: Arc::clone(&clause.value),
                        context: context.push(frame),
                        call_site: None,
                    };
                }
                Ok(false) => continue,
                Err(error) => return Step::Done(error),
            }
        }

        Step::Done(Value::error(
            format!("no clause matches value {}", self.printed(&value)),
            node.offset,
        ))
    }

    /// Match `value` against `pattern`.
    ///
    /// Returns `Ok(false)` on a plain mismatch and `Err(error)` when a value
    /// pattern itself evaluates to an error.
    fn match_pattern(
        &mut self,
        pattern: &Pattern,
        value: &Value,
        slots: &mut Slots,
        context: &CallContext,
    ) -> Result<bool, Value> {
        match pattern {
            Pattern::Variable { slot, .. } => {
                slots[*slot] = Some(value.clone());
                Ok(true)
            }

            Pattern::Value(expr) => {
                let expected = self.evaluate(expr, context);
                if expected.is_error() {
                    return Err(expected);
                }
                Ok(expected == *value)
            }

            Pattern::Array(elements) => match value {
                Value::Array(items) => self.match_array(elements, items, slots, context),
                _ => Ok(false),
            },

            Pattern::Record(members) => match value {
                Value::Record(record) => self.match_record(members, record, slots, context),
                _ => Ok(false),
            },
        }
    }

    fn match_array(
        &mut self,
        elements: &[PatternElement],
        items: &[Value],
        slots: &mut Slots,
        context: &CallContext,
    ) -> Result<bool, Value> {
        let mut projections = elements
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e, PatternElement::Projection(_)));
        let projection = projections.next().map(|(position, _)| position);
        if projections.next().is_some() {
            unreachable!("array pattern with more than one projection survived binding");
        }

        let Some(position) = projection else {
            if elements.len() != items.len() {
                return Ok(false);
            }
            return self.match_items(elements, items, slots, context);
        };

        let before = &elements[..position];
        let after = &elements[position + 1..];
        if items.len() < before.len() + after.len() {
            return Ok(false);
        }

        // Match patterns before the projection, then those after it from the end
        let after_start = items.len() - after.len();
        if !self.match_items(before, &items[..before.len()], slots, context)? {
            return Ok(false);
        }
        if !self.match_items(after, &items[after_start..], slots, context)? {
            return Ok(false);
        }

        let PatternElement::Projection(rest) = &elements[position] else {
            unreachable!("projection position points at an item");
        };
        let middle = Value::array(items[before.len()..after_start].to_vec());
        self.match_pattern(rest, &middle, slots, context)
    }

    fn match_items(
        &mut self,
        elements: &[PatternElement],
        items: &[Value],
        slots: &mut Slots,
        context: &CallContext,
    ) -> Result<bool, Value> {
        for (element, item) in elements.iter().zip(items) {
            let pattern = match element {
                PatternElement::Item(pattern) | PatternElement::Projection(pattern) => pattern,
            };
            if !self.match_pattern(pattern, item, slots, context)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn match_record(
        &mut self,
        members: &[PatternMember],
        record: &Record,
        slots: &mut Slots,
        context: &CallContext,
    ) -> Result<bool, Value> {
        let mut consumed = HashSet::new();
        let mut rest = None;

        for member in members {
            match member {
                PatternMember::Named { symbol, pattern } => {
                    let Some(found) = record.get(*symbol) else {
                        return Ok(false);
                    };
                    if !self.match_pattern(pattern, found, slots, context)? {
                        return Ok(false);
                    }
                    consumed.insert(*symbol);
                }
                PatternMember::Projection(pattern) => {
                    // Only members named before the projection are excluded
                    if rest.replace((pattern, consumed.clone())).is_some() {
                        unreachable!("record pattern with more than one projection survived binding");
                    }
                }
            }
        }

        match rest {
            Some((pattern, excluded)) => {
                let mut remaining = Record::new();
                for (symbol, member) in record.iter() {
                    if !excluded.contains(&symbol) {
                        remaining.insert(symbol, member.clone());
                    }
                }
                self.match_pattern(pattern, &Value::record(remaining), slots, context)
            }
            None => Ok(true),
        }
    }
}
