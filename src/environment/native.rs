use crate::interpreter::SystemContext;
use crate::value::{error::RuntimeErrorKind, NativeFunction, Value, ValueKind};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug)]
pub struct NativePrint;

impl NativeFunction for NativePrint {
    fn get_name(&self) -> &'static str {
        "print"
    }

    fn get_arity(&self) -> Option<usize> {
        None
    }

    fn call(
        &self,
        arguments: Vec<Value>,
        context: &mut dyn SystemContext,
    ) -> Result<Value, RuntimeErrorKind> {
        let line = arguments
            .iter()
            .map(|argument| argument.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        context.writeln(&line);
        Ok(Value::Null)
    }
}

#[derive(Debug)]
pub struct NativeLen;

impl NativeFunction for NativeLen {
    fn get_name(&self) -> &'static str {
        "len"
    }

    fn get_arity(&self) -> Option<usize> {
        Some(1)
    }

    fn call(
        &self,
        arguments: Vec<Value>,
        _context: &mut dyn SystemContext,
    ) -> Result<Value, RuntimeErrorKind> {
        let argument = &arguments[0];
        argument
            .length()
            .map(|length| Value::Number(length as f64))
            .ok_or(RuntimeErrorKind::InvalidArgumentType {
                name: "list",
                expected: ValueKind::List,
                actual: argument.kind(),
            })
    }
}

#[derive(Debug)]
pub struct NativeClock;

impl NativeFunction for NativeClock {
    fn get_name(&self) -> &'static str {
        "clock"
    }

    fn get_arity(&self) -> Option<usize> {
        Some(0)
    }

    fn call(
        &self,
        _arguments: Vec<Value>,
        _context: &mut dyn SystemContext,
    ) -> Result<Value, RuntimeErrorKind> {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_secs_f64())
            .unwrap_or_default();
        Ok(Value::Number(seconds))
    }
}
