use super::{
    expression::{Block, Expression, ExpressionKind, ForLoop, Program},
    ParserError, ParserErrorKind,
};
use crate::lexer::LineBreaks;
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::path::Path;

const ARIADNE_MSG: &str = "Ariadne produces valid utf-8 strings";
const ARIADNE_WRITE_MSG: &str = "Write into buffer should not fail.";

pub trait ExpressionFormatter {
    fn format(&self, expression: &Expression) -> String;
    fn format_error(&self, error: &ParserError) -> String;

    /// Every top-level expression on its own line.
    fn format_program(&self, program: &Program) -> String {
        program
            .block
            .body
            .iter()
            .map(|expression| self.format(expression))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub struct DebugFormatter;

impl ExpressionFormatter for DebugFormatter {
    fn format(&self, expression: &Expression) -> String {
        format!("{expression:?}")
    }

    fn format_error(&self, error: &ParserError) -> String {
        format!("{error:?}")
    }
}

pub struct SExpressionFormatter {
    line_breaks: LineBreaks,
}

impl SExpressionFormatter {
    pub fn new(text: &str) -> Self {
        Self {
            line_breaks: LineBreaks::new(text),
        }
    }

    fn format_list<'a>(head: &str, items: impl IntoIterator<Item = &'a Expression>) -> String {
        let mut buffer = format!("({head}");
        for item in items {
            buffer.push(' ');
            buffer.push_str(&Self::format_node(item));
        }
        buffer.push(')');
        buffer
    }

    fn format_block(block: &Block) -> String {
        Self::format_list("block", block.body.iter())
    }

    /// The parser fills in `-1` with an empty span when no limit was written.
    fn is_default_limit(limit: &Expression) -> bool {
        matches!(limit.kind, ExpressionKind::Number(v) if v == -1.0) && limit.span.length == 0
    }

    fn format_node(expression: &Expression) -> String {
        match &expression.kind {
            ExpressionKind::Number(v) => format!("{v:?}"),
            ExpressionKind::Bool(v) => format!("{v}"),
            ExpressionKind::Null => "null".into(),
            ExpressionKind::StringLiteral(v) => format!("{v:?}"),
            ExpressionKind::Character(c) => format!("@{}", c.escape_default()),
            ExpressionKind::Identifier(name) => name.to_string(),
            ExpressionKind::List(items) => Self::format_list("list", items.iter()),
            ExpressionKind::Block(block) => Self::format_block(block),
            ExpressionKind::Group(inner) => Self::format_list("group", [inner.as_ref()]),
            ExpressionKind::Control { kind, carry } => format!("({kind} {carry})"),
            ExpressionKind::Prefix { operator, operand } => {
                Self::format_list(operator.symbol(), [operand.as_ref()])
            }
            ExpressionKind::Postfix { operator, operand } => {
                Self::format_list(&format!("post{}", operator.symbol()), [operand.as_ref()])
            }
            ExpressionKind::Infix { operator, lhs, rhs } => {
                Self::format_list(operator.symbol(), [lhs.as_ref(), rhs.as_ref()])
            }
            ExpressionKind::Assignment(assignment) => {
                let head = match (assignment.is_ref, assignment.is_const) {
                    (true, true) => "&:=",
                    (true, false) => "&=",
                    (false, true) => ":=",
                    (false, false) => "=",
                };
                if Self::is_default_limit(&assignment.limit) {
                    Self::format_list(head, [&assignment.target, &assignment.value])
                } else {
                    Self::format_list(
                        head,
                        [&assignment.target, &assignment.value, &assignment.limit],
                    )
                }
            }
            ExpressionKind::Call { callee, arguments } => {
                Self::format_list("call", std::iter::once(callee.as_ref()).chain(arguments))
            }
            ExpressionKind::Function { parameters, body } => {
                format!(
                    "(fn ({}) {})",
                    parameters.join(" "),
                    Self::format_block(body)
                )
            }
            ExpressionKind::If {
                condition,
                success,
                failure,
            } => Self::format_list(
                "if",
                [condition.as_ref(), success.as_ref()]
                    .into_iter()
                    .chain(failure.as_deref()),
            ),
            ExpressionKind::While { condition, body } => {
                Self::format_list("while", [condition.as_ref(), body.as_ref()])
            }
            ExpressionKind::For(for_loop) => match for_loop.as_ref() {
                ForLoop::Traditional {
                    initializer,
                    condition,
                    step,
                    body,
                } => Self::format_list("for", [initializer, condition, step, body]),
                ForLoop::In {
                    variable,
                    enumerable,
                    body,
                } => format!(
                    "(for-in {variable} {} {})",
                    Self::format_node(enumerable),
                    Self::format_node(body)
                ),
                ForLoop::Of {
                    variable,
                    enumerable,
                    body,
                } => format!(
                    "(for-of {variable} {} {})",
                    Self::format_node(enumerable),
                    Self::format_node(body)
                ),
            },
            ExpressionKind::Index { target, index } => {
                Self::format_list("index", [target.as_ref(), index.as_ref()])
            }
            ExpressionKind::Method {
                receiver,
                name,
                arguments,
            } => Self::format_list(
                &format!("method {name}"),
                std::iter::once(receiver.as_ref()).chain(arguments),
            ),
            ExpressionKind::Range {
                start,
                end,
                step,
                inclusive,
            } => Self::format_list(
                if *inclusive { "..=" } else { ".." },
                [start.as_ref(), end.as_ref(), step.as_ref()],
            ),
            ExpressionKind::Shift { source, target } => {
                Self::format_list(">>", [source.as_ref(), target.as_ref()])
            }
            ExpressionKind::Pop { list, index } => {
                Self::format_list("pop", [list.as_ref(), index.as_ref()])
            }
            ExpressionKind::Push { list, index, value } => {
                Self::format_list("push", [list.as_ref(), index.as_ref(), value.as_ref()])
            }
        }
    }
}

impl ExpressionFormatter for SExpressionFormatter {
    fn format(&self, expression: &Expression) -> String {
        Self::format_node(expression)
    }

    fn format_error(&self, error: &ParserError) -> String {
        let line = self.line_breaks.get_line_from_span(error.span);
        match error.kind {
            ParserErrorKind::UnexpectedToken { actual, expected } => {
                format!("({line}) Unexpected: A = {actual} E = {expected}")
            }
            ParserErrorKind::NonExpression(kind) => format!("({line}) Non-Expression: {kind}"),
            ParserErrorKind::UnexpectedEof => format!("({line}) Unexpected EOF"),
            ParserErrorKind::InvalidParameter => format!("({line}) Invalid Parameter"),
            ParserErrorKind::ExpectedAssignment => format!("({line}) Expected Assignment"),
            ParserErrorKind::InvalidCarryCount(count) => {
                format!("({line}) Invalid Carry Count: {count}")
            }
            ParserErrorKind::LexicalError(ref error) => format!("({line}) Lexical: {error}"),
        }
    }
}

pub struct PrettyFormatter<'src> {
    text: &'src str,
    path: &'src Path,
}

impl<'src> PrettyFormatter<'src> {
    pub fn new(text: &'src str, path: &'src Path) -> Self {
        Self { text, path }
    }
}

impl<'src> ExpressionFormatter for PrettyFormatter<'src> {
    fn format(&self, expression: &Expression) -> String {
        SExpressionFormatter::format_node(expression)
    }

    fn format_error(&self, error: &ParserError) -> String {
        let path = self.path.to_string_lossy();
        let path = path.as_ref();
        let span = error.span;
        let (message, label) = match error.kind {
            ParserErrorKind::UnexpectedToken { actual, expected } => (
                "Encountered an unexpected token".to_string(),
                format!(
                    "Expected {} but got {}",
                    expected.fg(Color::BrightCyan),
                    actual.fg(Color::BrightRed)
                ),
            ),
            ParserErrorKind::NonExpression(kind) => (
                "Expected the start of an expression".to_string(),
                format!("Not an expression token {}", kind.fg(Color::BrightRed)),
            ),
            ParserErrorKind::UnexpectedEof => (
                "Source ended in the middle of an expression".to_string(),
                "Expected more input here".to_string(),
            ),
            ref kind => ("Invalid syntax".to_string(), kind.to_string()),
        };
        let mut output = std::io::Cursor::new(Vec::new());
        Report::build(ReportKind::Error, (path, span.range()))
            .with_code(error.code())
            .with_message(message)
            .with_label(
                Label::new((path, span.range()))
                    .with_message(label)
                    .with_color(Color::BrightRed),
            )
            .finish()
            .write((path, Source::from(self.text)), &mut output)
            .expect(ARIADNE_WRITE_MSG);
        String::from_utf8(output.into_inner()).expect(ARIADNE_MSG)
    }
}
