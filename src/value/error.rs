use super::ValueKind;
use crate::lexer::Span;
use crate::parser::expression::ControlKind;
use compact_str::CompactString;
use thiserror::Error;

/// Error classes a script author sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Syntax,
    Type,
    Range,
    Runtime,
    /// Evaluator defects and resource ceilings. Not recoverable by the caller.
    Fatal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Syntax => write!(f, "SyntaxError"),
            ErrorCategory::Type => write!(f, "TypeError"),
            ErrorCategory::Range => write!(f, "RangeError"),
            ErrorCategory::Runtime => write!(f, "RuntimeError"),
            ErrorCategory::Fatal => write!(f, "FatalError"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    #[error("Invalid left-hand side of assignment")]
    InvalidAssignmentTarget,
    #[error("Cannot shift value into this target")]
    InvalidShiftTarget,
    #[error("Invalid operand for {0}")]
    InvalidUpdateTarget(&'static str),
    #[error("Unsupported operand types for {operator}: {lhs} and {rhs}")]
    UnsupportedBinary {
        operator: &'static str,
        lhs: ValueKind,
        rhs: ValueKind,
    },
    #[error("Unsupported operand type for {operator}: {operand}")]
    UnsupportedUnary {
        operator: &'static str,
        operand: ValueKind,
    },
    #[error("Cannot index type {0}")]
    NonIndexable(ValueKind),
    #[error("Cannot index type {target} with type {index}")]
    NonNumericIndex { target: ValueKind, index: ValueKind },
    #[error("Cannot enumerate through type {0}")]
    NonEnumerable(ValueKind),
    #[error("Cannot iterate through type {0}")]
    NonIterable(ValueKind),
    #[error("Cannot evaluate {construct} condition with type {kind}")]
    NonBooleanCondition {
        construct: &'static str,
        kind: ValueKind,
    },
    #[error("Variable limit must be type Number but given {0}")]
    NonNumericLimit(ValueKind),
    #[error("All range values must be Number but given {0}, {1}, {2}")]
    NonNumericRange(ValueKind, ValueKind, ValueKind),
    #[error("Expected right hand to be a List when assigning with multiple index but given {0}")]
    NonListAssignment(ValueKind),
    #[error("{0} is not a Function")]
    InvalidCallee(ValueKind),
    #[error("Type {0} does not have any method")]
    NoMethods(ValueKind),
    #[error("Cannot convert type {0} to Character List")]
    NonStringable(ValueKind),
    #[error("Argument `{name}` must be type {expected} but given {actual}")]
    InvalidArgumentType {
        name: &'static str,
        expected: ValueKind,
        actual: ValueKind,
    },
    #[error("Index {index} out of bound for length {length}")]
    IndexOutOfRange { index: f64, length: usize },
    #[error("Digits {0} must be an integer between 0 and 100")]
    InvalidDigits(f64),
    #[error("Undefined identifier {0}")]
    UndefinedIdentifier(CompactString),
    #[error("Cannot reassign constant {0}")]
    ConstantReassignment(CompactString),
    #[error("Length mismatch when assigning with multiple index. Expected {expected} item but given {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("Expected {expected} argument but given {actual}")]
    InvalidArgumentCount { actual: usize, expected: usize },
    #[error("Type {kind} does not have \"{name}\"")]
    UnknownMethod { kind: ValueKind, name: CompactString },
    #[error("`{0}` cannot be used as a value")]
    ControlEscape(ControlKind),
    #[error("Range needs finite bounds and a non-zero step")]
    InvalidRange,
    #[error("Loop exceeded {0} iterations")]
    TooManyIterations(usize),
    #[error("Call depth exceeded {0} frames")]
    CallDepthExceeded(usize),
    #[error("Capability `{capability}` is not wired for type {kind}")]
    MissingCapability {
        capability: &'static str,
        kind: ValueKind,
    },
}

impl RuntimeErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RuntimeErrorKind::InvalidAssignmentTarget
            | RuntimeErrorKind::InvalidShiftTarget
            | RuntimeErrorKind::InvalidUpdateTarget(_) => ErrorCategory::Syntax,
            RuntimeErrorKind::UnsupportedBinary { .. }
            | RuntimeErrorKind::UnsupportedUnary { .. }
            | RuntimeErrorKind::NonIndexable(_)
            | RuntimeErrorKind::NonNumericIndex { .. }
            | RuntimeErrorKind::NonEnumerable(_)
            | RuntimeErrorKind::NonIterable(_)
            | RuntimeErrorKind::NonBooleanCondition { .. }
            | RuntimeErrorKind::NonNumericLimit(_)
            | RuntimeErrorKind::NonNumericRange(..)
            | RuntimeErrorKind::NonListAssignment(_)
            | RuntimeErrorKind::InvalidCallee(_)
            | RuntimeErrorKind::NoMethods(_)
            | RuntimeErrorKind::NonStringable(_)
            | RuntimeErrorKind::InvalidArgumentType { .. } => ErrorCategory::Type,
            RuntimeErrorKind::IndexOutOfRange { .. } | RuntimeErrorKind::InvalidDigits(_) => {
                ErrorCategory::Range
            }
            RuntimeErrorKind::UndefinedIdentifier(_)
            | RuntimeErrorKind::ConstantReassignment(_)
            | RuntimeErrorKind::LengthMismatch { .. }
            | RuntimeErrorKind::InvalidArgumentCount { .. }
            | RuntimeErrorKind::UnknownMethod { .. }
            | RuntimeErrorKind::ControlEscape(_)
            | RuntimeErrorKind::InvalidRange => ErrorCategory::Runtime,
            RuntimeErrorKind::TooManyIterations(_)
            | RuntimeErrorKind::CallDepthExceeded(_)
            | RuntimeErrorKind::MissingCapability { .. } => ErrorCategory::Fatal,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub span: Span,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    pub fn is_fatal(&self) -> bool {
        self.category() == ErrorCategory::Fatal
    }

    pub fn code(&self) -> &'static str {
        match self.kind {
            RuntimeErrorKind::InvalidAssignmentTarget => "RT001",
            RuntimeErrorKind::InvalidShiftTarget => "RT002",
            RuntimeErrorKind::InvalidUpdateTarget(_) => "RT003",
            RuntimeErrorKind::UnsupportedBinary { .. } => "RT004",
            RuntimeErrorKind::UnsupportedUnary { .. } => "RT005",
            RuntimeErrorKind::NonIndexable(_) => "RT006",
            RuntimeErrorKind::NonNumericIndex { .. } => "RT007",
            RuntimeErrorKind::NonEnumerable(_) => "RT008",
            RuntimeErrorKind::NonIterable(_) => "RT009",
            RuntimeErrorKind::NonBooleanCondition { .. } => "RT010",
            RuntimeErrorKind::NonNumericLimit(_) => "RT011",
            RuntimeErrorKind::NonNumericRange(..) => "RT012",
            RuntimeErrorKind::NonListAssignment(_) => "RT013",
            RuntimeErrorKind::InvalidCallee(_) => "RT014",
            RuntimeErrorKind::NoMethods(_) => "RT015",
            RuntimeErrorKind::NonStringable(_) => "RT016",
            RuntimeErrorKind::InvalidArgumentType { .. } => "RT017",
            RuntimeErrorKind::IndexOutOfRange { .. } => "RT018",
            RuntimeErrorKind::InvalidDigits(_) => "RT019",
            RuntimeErrorKind::UndefinedIdentifier(_) => "RT020",
            RuntimeErrorKind::ConstantReassignment(_) => "RT021",
            RuntimeErrorKind::LengthMismatch { .. } => "RT022",
            RuntimeErrorKind::InvalidArgumentCount { .. } => "RT023",
            RuntimeErrorKind::UnknownMethod { .. } => "RT024",
            RuntimeErrorKind::ControlEscape(_) => "RT025",
            RuntimeErrorKind::InvalidRange => "RT026",
            RuntimeErrorKind::TooManyIterations(_) => "RT027",
            RuntimeErrorKind::CallDepthExceeded(_) => "RT028",
            RuntimeErrorKind::MissingCapability { .. } => "RT029",
        }
    }
}
