//! Index reads and writes, push, pop and ranges over list values.

use crate::value::{error::RuntimeErrorKind, List, Value, ValueKind};

enum Indices {
    Single(f64),
    /// Zero or at least two positions.
    Vector(Vec<f64>),
}

/// Rounds half toward positive infinity.
fn round_index(index: f64) -> f64 {
    (index + 0.5).floor()
}

/// Gathers the numeric positions of `index`. NaN positions are out of range for every list.
fn collect_indices(
    target: ValueKind,
    index: &Value,
    length: usize,
) -> Result<Indices, RuntimeErrorKind> {
    let number = |value: &Value| match value {
        Value::Number(n) if n.is_nan() => Err(RuntimeErrorKind::IndexOutOfRange {
            index: *n,
            length,
        }),
        Value::Number(n) => Ok(*n),
        other => Err(RuntimeErrorKind::NonNumericIndex {
            target,
            index: other.kind(),
        }),
    };
    match index {
        Value::List(list) => {
            let mut indices = list
                .snapshot()
                .iter()
                .map(number)
                .collect::<Result<Vec<_>, _>>()?;
            if indices.len() == 1 {
                Ok(Indices::Single(indices.remove(0)))
            } else {
                Ok(Indices::Vector(indices))
            }
        }
        value => Ok(Indices::Single(number(value)?)),
    }
}

fn expect_list(target: &Value) -> Result<&List, RuntimeErrorKind> {
    if !target.is_indexable() {
        return Err(RuntimeErrorKind::NonIndexable(target.kind()));
    }
    match target {
        Value::List(list) => Ok(list),
        other => Err(RuntimeErrorKind::MissingCapability {
            capability: "length",
            kind: other.kind(),
        }),
    }
}

pub fn read_index(target: &Value, index: &Value) -> Result<Value, RuntimeErrorKind> {
    let list = expect_list(target)?;
    let items = list.snapshot();
    let length = items.len();
    let indices = collect_indices(target.kind(), index, length)?;

    let read = |raw: f64| {
        let mut position = round_index(raw);
        if position < 0.0 {
            position += length as f64;
        }
        if position.is_nan() || position < 0.0 || position >= length as f64 {
            return Err(RuntimeErrorKind::IndexOutOfRange { index: raw, length });
        }
        Ok(items[position as usize].clone())
    };

    match indices {
        Indices::Single(raw) => read(raw),
        Indices::Vector(raws) => Ok(Value::list(
            raws.into_iter().map(read).collect::<Result<Vec<_>, _>>()?,
        )),
    }
}

/// Negative positions count from the end, then everything is clamped into `[0, length]`.
fn clamp_position(raw: f64, length: usize) -> usize {
    let mut position = round_index(raw);
    if position < 0.0 {
        position += length as f64;
    }
    position.clamp(0.0, length as f64) as usize
}

pub fn write_index(target: &Value, index: &Value, value: Value) -> Result<Value, RuntimeErrorKind> {
    let list = expect_list(target)?;
    match collect_indices(target.kind(), index, list.len())? {
        Indices::Single(raw) => {
            let position = clamp_position(raw, list.len());
            list.set(position, value.clone());
        }
        Indices::Vector(raws) if raws.is_empty() => {}
        Indices::Vector(raws) => {
            let Value::List(values) = &value else {
                return Err(RuntimeErrorKind::NonListAssignment(value.kind()));
            };
            let items = values.snapshot();
            if items.len() != raws.len() {
                return Err(RuntimeErrorKind::LengthMismatch {
                    expected: raws.len(),
                    actual: items.len(),
                });
            }
            let length = list.len();
            let positions: Vec<usize> = raws
                .into_iter()
                .map(|raw| clamp_position(raw, length))
                .collect();
            for (position, item) in positions.into_iter().zip(items) {
                list.set(position, item);
            }
        }
    }
    Ok(value)
}

/// Removes the element(s) at `index`. Non-list targets pass through untouched.
pub fn pop(target: Value, index: &Value) -> Result<Value, RuntimeErrorKind> {
    let Value::List(list) = &target else {
        return Ok(target);
    };
    let length = list.len();
    let raws = match collect_indices(ValueKind::List, index, length)? {
        Indices::Single(raw) => vec![raw],
        Indices::Vector(raws) => raws,
    };
    if let Some(raw) = raws.iter().find(|raw| **raw > length as f64) {
        return Err(RuntimeErrorKind::IndexOutOfRange { index: *raw, length });
    }

    let mut removed = Vec::new();
    for raw in raws {
        let mut position = raw.trunc();
        if position < 0.0 {
            position = (list.len() as f64 + position).max(0.0);
        }
        if let Some(value) = list.remove(position as usize) {
            removed.push(value);
        }
    }

    Ok(match removed.len() {
        0 => Value::Null,
        1 => removed.swap_remove(0),
        _ => Value::list(removed),
    })
}

/// Inserts `value` at `index` and returns the list. A non-list target is wrapped into one.
///
/// Pushing a list into itself rotates it left instead.
pub fn push(target: Value, index: &Value, value: Value) -> Result<Value, RuntimeErrorKind> {
    let list = match target {
        Value::List(list) => list,
        other => List::new(vec![other]),
    };
    let length = list.len();
    let resolve = |raw: f64| {
        let mut position = round_index(raw);
        if position < 0.0 {
            position += length as f64 + 1.0;
        }
        position.clamp(0.0, length as f64) as usize
    };

    match collect_indices(ValueKind::List, index, length)? {
        Indices::Single(raw) => match &value {
            Value::List(other) if other.ptr_eq(&list) => {
                if length > 0 {
                    let length = length as f64;
                    let count = (-(round_index(raw) % length) + length) % length;
                    list.rotate_left(count as usize);
                }
            }
            value => list.insert(resolve(raw), value.clone()),
        },
        Indices::Vector(raws) => {
            let positions: Vec<usize> = raws.into_iter().map(resolve).collect();
            match &value {
                Value::List(values) => {
                    let items = values.snapshot();
                    if items.len() != positions.len() {
                        return Err(RuntimeErrorKind::LengthMismatch {
                            expected: positions.len(),
                            actual: items.len(),
                        });
                    }
                    for (position, item) in positions.into_iter().zip(items) {
                        list.insert(position, item);
                    }
                }
                value => {
                    for position in positions {
                        list.insert(position, value.clone());
                    }
                }
            }
        }
    }
    Ok(Value::List(list))
}

/// Materializes `start..end` (or `start..=end`) stepping by `step`.
///
/// Reversed bounds or a negative step produce the sequence in descending order.
pub fn range(
    start: &Value,
    end: &Value,
    step: &Value,
    inclusive: bool,
) -> Result<Value, RuntimeErrorKind> {
    let (Value::Number(start), Value::Number(end), Value::Number(step)) = (start, end, step)
    else {
        return Err(RuntimeErrorKind::NonNumericRange(
            start.kind(),
            end.kind(),
            step.kind(),
        ));
    };
    let (mut start, mut end, mut step) = (*start, *end, *step);
    if !start.is_finite() || !end.is_finite() || !step.is_finite() || step == 0.0 {
        return Err(RuntimeErrorKind::InvalidRange);
    }

    let mut reverse = false;
    if end < start {
        std::mem::swap(&mut start, &mut end);
        reverse = true;
    }
    if step < 0.0 {
        step = -step;
        reverse = true;
    }

    let mut values = Vec::new();
    let mut current = start;
    while if inclusive { current <= end } else { current < end } {
        values.push(Value::Number(current));
        let next = current + step;
        // The step vanished into the rounding of `current`.
        if next == current {
            return Err(RuntimeErrorKind::InvalidRange);
        }
        current = next;
    }
    if reverse {
        values.reverse();
    }
    Ok(Value::list(values))
}
