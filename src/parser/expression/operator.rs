/// Binding power of every prefix operator.
pub const PREFIX_BINDING_POWER: u8 = 19;
/// Binding power of calls, indexing, method calls and postfix updates.
pub const POSTFIX_BINDING_POWER: u8 = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    Minus,
    Bang,
    /// Shallow copy of a list.
    Star,
    Increment,
    Decrement,
}

impl PrefixOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            PrefixOperator::Minus => "-",
            PrefixOperator::Bang => "!",
            PrefixOperator::Star => "*",
            PrefixOperator::Increment => "++",
            PrefixOperator::Decrement => "--",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOperator {
    Increment,
    Decrement,
}

impl PostfixOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            PostfixOperator::Increment => "++",
            PostfixOperator::Decrement => "--",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    GreaterThan,
    LessThan,
    GreaterThanEqual,
    LessThanEqual,
    EqualEqual,
    And,
    Or,
}

impl InfixOperator {
    pub fn get_binding_power(&self) -> (u8, u8) {
        match self {
            // Multiplicative operators
            Self::Multiply | Self::Divide | Self::Modulo => (17, 18),
            // Additive operators
            Self::Add | Self::Subtract => (15, 16),
            // Comparison operators
            Self::LessThan | Self::LessThanEqual | Self::GreaterThan | Self::GreaterThanEqual => {
                (11, 12)
            }
            Self::EqualEqual => (9, 10),
            Self::And => (7, 8),
            Self::Or => (5, 6),
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            InfixOperator::Add => "+",
            InfixOperator::Subtract => "-",
            InfixOperator::Multiply => "*",
            InfixOperator::Divide => "/",
            InfixOperator::Modulo => "%",
            InfixOperator::GreaterThan => ">",
            InfixOperator::LessThan => "<",
            InfixOperator::GreaterThanEqual => ">=",
            InfixOperator::LessThanEqual => "<=",
            InfixOperator::EqualEqual => "==",
            InfixOperator::And => "&&",
            InfixOperator::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOperator {
    Exclusive,
    Inclusive,
}

impl RangeOperator {
    pub fn get_binding_power(&self) -> (u8, u8) {
        (13, 14)
    }
}

/// `<<` push and `>>` shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOperator {
    Push,
    Shift,
}

impl ListOperator {
    pub fn get_binding_power(&self) -> (u8, u8) {
        (3, 4)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOperator {
    Assign,
    Constant,
    Compound(InfixOperator),
}

impl AssignmentOperator {
    pub fn get_binding_power(&self) -> (u8, u8) {
        (2, 1)
    }
}
