use crate::parser::expression::{InfixOperator, PrefixOperator};
use crate::value::{error::RuntimeErrorKind, Value};

pub fn evaluate_infix(
    operator: InfixOperator,
    lhs: &Value,
    rhs: &Value,
) -> Result<Value, RuntimeErrorKind> {
    let result = match operator {
        InfixOperator::Add => lhs.add(rhs),
        InfixOperator::Subtract => lhs.sub(rhs),
        InfixOperator::Multiply => lhs.mul(rhs),
        InfixOperator::Divide => lhs.div(rhs),
        InfixOperator::Modulo => lhs.rem(rhs),
        InfixOperator::GreaterThan => lhs.greater(rhs),
        InfixOperator::LessThan => lhs.lesser(rhs),
        InfixOperator::GreaterThanEqual => lhs.greater_eq(rhs),
        InfixOperator::LessThanEqual => lhs.lesser_eq(rhs),
        InfixOperator::EqualEqual => lhs.equal(rhs),
        InfixOperator::And => lhs.and(rhs),
        InfixOperator::Or => lhs.or(rhs),
    };
    result.ok_or(RuntimeErrorKind::UnsupportedBinary {
        operator: operator.symbol(),
        lhs: lhs.kind(),
        rhs: rhs.kind(),
    })
}

/// Prefix operators that only read their operand. Updates go through [`step`].
pub fn evaluate_prefix(
    operator: PrefixOperator,
    operand: &Value,
) -> Result<Value, RuntimeErrorKind> {
    let result = match operator {
        PrefixOperator::Minus => operand.negate(),
        PrefixOperator::Bang => operand.not(),
        PrefixOperator::Star => Some(operand.copy()),
        PrefixOperator::Increment => operand.add(&Value::Number(1.0)),
        PrefixOperator::Decrement => operand.sub(&Value::Number(1.0)),
    };
    result.ok_or(RuntimeErrorKind::UnsupportedUnary {
        operator: operator.symbol(),
        operand: operand.kind(),
    })
}

/// The value `++`/`--` store back into their operand.
pub fn step(operand: &Value, increment: bool) -> Result<Value, RuntimeErrorKind> {
    let operator = if increment {
        PrefixOperator::Increment
    } else {
        PrefixOperator::Decrement
    };
    match operand {
        Value::Number(_) => evaluate_prefix(operator, operand),
        _ => Err(RuntimeErrorKind::UnsupportedUnary {
            operator: operator.symbol(),
            operand: operand.kind(),
        }),
    }
}
