pub mod error;
pub mod formatter;
mod list;
mod method;

use crate::environment::Environment;
use crate::interpreter::SystemContext;
use crate::parser::expression::{Block, ControlKind};
use compact_str::CompactString;
use error::RuntimeErrorKind;
pub use list::List;
pub use method::Method;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Number,
    Boolean,
    Character,
    List,
    Function,
    NativeFunction,
    Control,
    None,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueKind::Null => "Null",
            ValueKind::Number => "Number",
            ValueKind::Boolean => "Boolean",
            ValueKind::Character => "Character",
            ValueKind::List => "List",
            ValueKind::Function => "Function",
            ValueKind::NativeFunction => "NativeFunction",
            ValueKind::Control => "Control",
            ValueKind::None => "None",
        };
        write!(f, "{name}")
    }
}

pub trait NativeFunction: std::fmt::Debug + Send + Sync {
    fn get_name(&self) -> &'static str;
    /// Number of accepted arguments, `None` for variadic functions.
    fn get_arity(&self) -> Option<usize>;
    fn call(
        &self,
        arguments: Vec<Value>,
        context: &mut dyn SystemContext,
    ) -> Result<Value, RuntimeErrorKind>;
}

pub struct Function {
    pub parameters: Vec<CompactString>,
    pub body: Arc<Block>,
    /// Scope the function literal was evaluated in.
    pub closure: Environment,
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// A pending `break`/`continue` that still has to cross `carry` block boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Control {
    pub kind: ControlKind,
    pub carry: u32,
}

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Number(f64),
    Boolean(bool),
    Character(char),
    List(List),
    Function(Arc<Function>),
    NativeFunction(Arc<dyn NativeFunction>),
    Control(Control),
    /// Produced by expressions that yield nothing. Blocks skip it.
    None,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Number(_) => ValueKind::Number,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Character(_) => ValueKind::Character,
            Value::List(_) => ValueKind::List,
            Value::Function(_) => ValueKind::Function,
            Value::NativeFunction(_) => ValueKind::NativeFunction,
            Value::Control(_) => ValueKind::Control,
            Value::None => ValueKind::None,
        }
    }

    pub fn string(text: &str) -> Value {
        Value::List(List::from_text(text))
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(List::new(items))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_indexable(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Prepares a value for storage: the empty marker becomes `null`, control flow is rejected.
    pub fn settle(self) -> Result<Value, RuntimeErrorKind> {
        match self {
            Value::None => Ok(Value::Null),
            Value::Control(control) => Err(RuntimeErrorKind::ControlEscape(control.kind)),
            value => Ok(value),
        }
    }
}

// Structural capabilities
impl Value {
    pub fn length(&self) -> Option<usize> {
        match self {
            Value::List(list) => Some(list.len()),
            _ => None,
        }
    }

    /// Index positions `0..length` as numbers.
    pub fn enumerate(&self) -> Option<Vec<Value>> {
        self.length()
            .map(|length| (0..length).map(|i| Value::Number(i as f64)).collect())
    }

    pub fn iterate(&self) -> Option<Vec<Value>> {
        match self {
            Value::List(list) => Some(list.snapshot()),
            _ => None,
        }
    }

    /// Shallow copy for lists, the value itself for everything else.
    pub fn copy(&self) -> Value {
        match self {
            Value::List(list) => Value::List(list.shallow_copy()),
            value => value.clone(),
        }
    }
}

// Arithmetic
impl Value {
    fn numeric(&self, other: &Value, op: impl Fn(f64, f64) -> f64) -> Option<Value> {
        match (self, other) {
            (Value::Number(lhs), Value::Number(rhs)) => Some(Value::Number(op(*lhs, *rhs))),
            _ => None,
        }
    }

    pub fn add(&self, other: &Value) -> Option<Value> {
        match (self, other) {
            (Value::List(lhs), Value::List(rhs)) => {
                let mut items = lhs.snapshot();
                items.extend(rhs.snapshot());
                Some(Value::list(items))
            }
            _ => self.numeric(other, |lhs, rhs| lhs + rhs),
        }
    }

    pub fn sub(&self, other: &Value) -> Option<Value> {
        self.numeric(other, |lhs, rhs| lhs - rhs)
    }

    pub fn mul(&self, other: &Value) -> Option<Value> {
        self.numeric(other, |lhs, rhs| lhs * rhs)
    }

    pub fn div(&self, other: &Value) -> Option<Value> {
        self.numeric(other, |lhs, rhs| lhs / rhs)
    }

    pub fn rem(&self, other: &Value) -> Option<Value> {
        self.numeric(other, |lhs, rhs| lhs % rhs)
    }

    pub fn negate(&self) -> Option<Value> {
        match self {
            Value::Number(v) => Some(Value::Number(-v)),
            _ => None,
        }
    }
}

// Comparison and logic
impl Value {
    fn compare(&self, other: &Value, op: impl Fn(f64, f64) -> bool) -> Option<Value> {
        match (self, other) {
            (Value::Number(lhs), Value::Number(rhs)) => Some(Value::Boolean(op(*lhs, *rhs))),
            _ => None,
        }
    }

    pub fn greater(&self, other: &Value) -> Option<Value> {
        self.compare(other, |lhs, rhs| lhs > rhs)
    }

    pub fn lesser(&self, other: &Value) -> Option<Value> {
        self.compare(other, |lhs, rhs| lhs < rhs)
    }

    pub fn greater_eq(&self, other: &Value) -> Option<Value> {
        self.compare(other, |lhs, rhs| lhs >= rhs)
    }

    pub fn lesser_eq(&self, other: &Value) -> Option<Value> {
        self.compare(other, |lhs, rhs| lhs <= rhs)
    }

    pub fn equal(&self, other: &Value) -> Option<Value> {
        self.is_equal(other).map(Value::Boolean)
    }

    fn is_equal(&self, other: &Value) -> Option<bool> {
        self.is_equal_within(other, &mut Vec::new())
    }

    /// `comparing` holds the list pairs already being compared further up. Meeting one
    /// again means the lists are mutually recursive and equal so far.
    fn is_equal_within(
        &self,
        other: &Value,
        comparing: &mut Vec<(usize, usize)>,
    ) -> Option<bool> {
        match (self, other) {
            (Value::Number(lhs), Value::Number(rhs)) => Some(lhs == rhs),
            (Value::Boolean(lhs), Value::Boolean(rhs)) => Some(lhs == rhs),
            (Value::Character(lhs), Value::Character(rhs)) => Some(lhs == rhs),
            (Value::Null, Value::Null) => Some(true),
            (Value::List(lhs), Value::List(rhs)) => {
                let pair = (lhs.id(), rhs.id());
                if lhs.ptr_eq(rhs) || comparing.contains(&pair) {
                    return Some(true);
                }
                let (lhs, rhs) = (lhs.snapshot(), rhs.snapshot());
                if lhs.len() != rhs.len() {
                    return Some(false);
                }
                comparing.push(pair);
                let equal = lhs
                    .iter()
                    .zip(rhs.iter())
                    .all(|(l, r)| l.is_equal_within(r, comparing).unwrap_or(false));
                comparing.pop();
                Some(equal)
            }
            _ => None,
        }
    }

    pub fn and(&self, other: &Value) -> Option<Value> {
        match (self, other) {
            (Value::Boolean(lhs), Value::Boolean(rhs)) => Some(Value::Boolean(*lhs && *rhs)),
            _ => None,
        }
    }

    pub fn or(&self, other: &Value) -> Option<Value> {
        match (self, other) {
            (Value::Boolean(lhs), Value::Boolean(rhs)) => Some(Value::Boolean(*lhs || *rhs)),
            _ => None,
        }
    }

    pub fn not(&self) -> Option<Value> {
        match self {
            Value::Boolean(v) => Some(Value::Boolean(!v)),
            _ => None,
        }
    }
}

// Text
impl Value {
    /// Converts into the character-list text form, failing on values that have none.
    pub fn to_text(&self) -> Result<String, RuntimeErrorKind> {
        let mut text = String::new();
        self.push_text(&mut text, &mut Vec::new())?;
        Ok(text)
    }

    /// Lists already on `open` are skipped.
    fn push_text(
        &self,
        text: &mut String,
        open: &mut Vec<usize>,
    ) -> Result<(), RuntimeErrorKind> {
        match self {
            Value::Null => text.push_str("null"),
            Value::Number(v) => text.push_str(&format_number(*v)),
            Value::Boolean(v) => text.push_str(&v.to_string()),
            Value::Character(c) => text.push(*c),
            Value::List(list) => {
                if open.contains(&list.id()) {
                    return Ok(());
                }
                open.push(list.id());
                let result = list
                    .snapshot()
                    .iter()
                    .try_for_each(|item| item.push_text(text, open));
                open.pop();
                result?;
            }
            value => return Err(RuntimeErrorKind::NonStringable(value.kind())),
        }
        Ok(())
    }

    /// Print form. A list met again inside itself renders as `[...]`.
    fn write_print(
        &self,
        f: &mut std::fmt::Formatter<'_>,
        open: &mut Vec<usize>,
    ) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Number(v) => write!(f, "{}", format_number(*v)),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Character(c) => write!(f, "{c}"),
            Value::List(list) if open.contains(&list.id()) => write!(f, "[...]"),
            Value::List(list) => {
                let items = list.snapshot();
                if !items.is_empty() && items.iter().all(|v| matches!(v, Value::Character(_))) {
                    for item in items.iter() {
                        write!(f, "{item}")?;
                    }
                    return Ok(());
                }
                open.push(list.id());
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.write_print(f, open)?;
                }
                open.pop();
                write!(f, "]")
            }
            Value::Function(function) => write!(f, "<fn({})>", function.parameters.join(", ")),
            Value::NativeFunction(native) => write!(f, "<native fn {}>", native.get_name()),
            Value::Control(control) => write!(f, "<{}>", control.kind),
            Value::None => write!(f, "none"),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.write_print(f, &mut Vec::new())
    }
}

/// Renders a number the way the language prints it: no trailing `.0` on integral values.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".into()
    } else if value.is_infinite() {
        if value > 0.0 {
            "Infinity".into()
        } else {
            "-Infinity".into()
        }
    } else if value == 0.0 {
        "0".into()
    } else if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}
