use super::error::{ErrorCategory, RuntimeError, RuntimeErrorKind};
use super::Value;
use crate::lexer::LineBreaks;
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::path::Path;

const ARIADNE_MSG: &str = "Ariadne produces valid utf-8 strings";
const ARIADNE_WRITE_MSG: &str = "Write into buffer should not fail.";

pub trait ValueFormatter {
    fn format(&self, value: &Value) -> String;
    fn format_error(&self, error: &RuntimeError) -> String;
}

pub struct DebugFormatter;

impl ValueFormatter for DebugFormatter {
    fn format(&self, value: &Value) -> String {
        format!("{value:?}")
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        format!("{error:?}")
    }
}

/// One line per error: `({line}) {Category}: {message}`.
pub struct BasicFormatter {
    line_breaks: LineBreaks,
}

impl BasicFormatter {
    pub fn new(text: &str) -> Self {
        let line_breaks = LineBreaks::new(text);
        Self { line_breaks }
    }
}

impl ValueFormatter for BasicFormatter {
    fn format(&self, value: &Value) -> String {
        format!("{value}")
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        let line = self.line_breaks.get_line_from_span(error.span);
        format!("({line}) {}: {}", error.category(), error.kind)
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

    fn headline(error: &RuntimeError) -> &'static str {
        match error.category() {
            ErrorCategory::Syntax => "Malformed expression",
            ErrorCategory::Type => "Operation applied to a value of the wrong type",
            ErrorCategory::Range => "Value outside the accepted range",
            ErrorCategory::Runtime => "Evaluation failed",
            ErrorCategory::Fatal => "Evaluation aborted",
        }
    }

    fn note(kind: &RuntimeErrorKind) -> Option<String> {
        match kind {
            RuntimeErrorKind::TooManyIterations(limit) => Some(format!(
                "Raise the ceiling with `--max-iterations` if {} iterations are intended",
                limit.fg(Color::BrightCyan)
            )),
            RuntimeErrorKind::CallDepthExceeded(limit) => Some(format!(
                "Raise the ceiling with `--max-call-depth` if {} frames are intended",
                limit.fg(Color::BrightCyan)
            )),
            RuntimeErrorKind::MissingCapability { .. } => {
                Some("This is an interpreter defect, not a script error".into())
            }
            _ => None,
        }
    }
}

impl<'src> ValueFormatter for PrettyFormatter<'src> {
    fn format(&self, value: &Value) -> String {
        format!("{value}")
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        let path = self.path.to_string_lossy();
        let path = path.as_ref();
        let mut output = std::io::Cursor::new(Vec::new());
        let span = error.span;
        let mut report = Report::build(ReportKind::Error, (path, span.range()))
            .with_code(error.code())
            .with_message(format!(
                "{}: {}",
                error.category().fg(Color::BrightRed),
                Self::headline(error)
            ))
            .with_label(
                Label::new((path, span.range()))
                    .with_message(format!("{}", error.kind))
                    .with_color(Color::BrightRed),
            );
        if let Some(note) = Self::note(&error.kind) {
            report = report.with_note(note);
        }
        report
            .finish()
            .write((path, Source::from(self.text)), &mut output)
            .expect(ARIADNE_WRITE_MSG);
        String::from_utf8(output.into_inner()).expect(ARIADNE_MSG)
    }
}
