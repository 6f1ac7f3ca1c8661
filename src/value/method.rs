use super::{error::RuntimeErrorKind, List, Value, ValueKind};

/// A method bound at call time to its receiver.
pub type Method = fn(&Value, Vec<Value>) -> Result<Value, RuntimeErrorKind>;

const NUMBER_METHODS: &[(&str, Method)] = &[
    ("toFixed", number_to_fixed),
    ("toString", to_string),
    ("ceil", number_ceil),
    ("floor", number_floor),
];

const LIST_METHODS: &[(&str, Method)] = &[("replace", list_replace), ("toString", to_string)];

impl Value {
    pub fn find_method(&self, name: &str) -> Result<Method, RuntimeErrorKind> {
        let table = match self {
            Value::Number(_) => NUMBER_METHODS,
            Value::List(_) => LIST_METHODS,
            value => return Err(RuntimeErrorKind::NoMethods(value.kind())),
        };
        table
            .iter()
            .find(|(method, _)| *method == name)
            .map(|(_, method)| *method)
            .ok_or_else(|| RuntimeErrorKind::UnknownMethod {
                kind: self.kind(),
                name: name.into(),
            })
    }
}

fn expect_arguments(arguments: &[Value], expected: usize) -> Result<(), RuntimeErrorKind> {
    if arguments.len() != expected {
        return Err(RuntimeErrorKind::InvalidArgumentCount {
            actual: arguments.len(),
            expected,
        });
    }
    Ok(())
}

fn receiver_number(receiver: &Value) -> Result<f64, RuntimeErrorKind> {
    match receiver {
        Value::Number(v) => Ok(*v),
        value => Err(RuntimeErrorKind::MissingCapability {
            capability: "number method",
            kind: value.kind(),
        }),
    }
}

fn to_string(receiver: &Value, arguments: Vec<Value>) -> Result<Value, RuntimeErrorKind> {
    expect_arguments(&arguments, 0)?;
    Ok(Value::string(&receiver.to_text()?))
}

fn number_to_fixed(receiver: &Value, arguments: Vec<Value>) -> Result<Value, RuntimeErrorKind> {
    if arguments.len() > 1 {
        return Err(RuntimeErrorKind::InvalidArgumentCount {
            actual: arguments.len(),
            expected: 1,
        });
    }
    let value = receiver_number(receiver)?;
    let digits = match arguments.first() {
        None => 1.0,
        Some(Value::Number(digits)) => *digits,
        Some(other) => {
            return Err(RuntimeErrorKind::InvalidArgumentType {
                name: "digits",
                expected: ValueKind::Number,
                actual: other.kind(),
            })
        }
    };
    if !(0.0..=100.0).contains(&digits) || digits.fract() != 0.0 {
        return Err(RuntimeErrorKind::InvalidDigits(digits));
    }
    if !value.is_finite() || digits > 15.0 {
        return Ok(Value::Number(value));
    }
    let factor = 10f64.powi(digits as i32);
    Ok(Value::Number((value * factor).round() / factor))
}

fn number_ceil(receiver: &Value, arguments: Vec<Value>) -> Result<Value, RuntimeErrorKind> {
    expect_arguments(&arguments, 0)?;
    Ok(Value::Number(receiver_number(receiver)?.ceil()))
}

fn number_floor(receiver: &Value, arguments: Vec<Value>) -> Result<Value, RuntimeErrorKind> {
    expect_arguments(&arguments, 0)?;
    Ok(Value::Number(receiver_number(receiver)?.floor()))
}

fn as_items(value: &Value) -> Vec<Value> {
    match value {
        Value::List(list) => list.snapshot(),
        value => vec![value.clone()],
    }
}

/// Replaces the first occurrence of `search` with `replacement` in a new list.
fn list_replace(receiver: &Value, arguments: Vec<Value>) -> Result<Value, RuntimeErrorKind> {
    expect_arguments(&arguments, 2)?;
    let Value::List(list) = receiver else {
        return Err(RuntimeErrorKind::MissingCapability {
            capability: "list method",
            kind: receiver.kind(),
        });
    };
    let items = list.snapshot();
    let search = as_items(&arguments[0]);
    let replacement = as_items(&arguments[1]);

    let matches_at = |start: usize| {
        search
            .iter()
            .zip(items[start..].iter())
            .all(|(s, v)| matches!(s.equal(v), Some(Value::Boolean(true))))
    };
    let found = if search.len() <= items.len() {
        (0..=items.len() - search.len()).find(|&start| matches_at(start))
    } else {
        None
    };

    let Some(start) = found else {
        return Ok(Value::List(List::new(items)));
    };
    let mut replaced = Vec::with_capacity(items.len() + replacement.len());
    replaced.extend_from_slice(&items[..start]);
    replaced.extend(replacement);
    replaced.extend_from_slice(&items[start + search.len()..]);
    Ok(Value::List(List::new(replaced)))
}
