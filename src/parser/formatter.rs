use super::{
    error::{ParserError, ParserErrorKind},
    program::Program,
};
use ariadne::{Color, Label, Report, ReportKind, Source};
use std::path::Path;

const ARIADNE_MSG: &str = "Ariadne produces valid utf-8 strings";
const ARIADNE_WRITE_MSG: &str = "Write into buffer should not fail.";

pub trait ProgramFormatter {
    fn format(&self, program: &Program) -> String;
    fn format_error(&self, error: &ParserError) -> String;
}

pub struct DebugFormatter;

impl ProgramFormatter for DebugFormatter {
    fn format(&self, program: &Program) -> String {
        format!("{program:#?}")
    }

    fn format_error(&self, error: &ParserError) -> String {
        format!("{error:?}")
    }
}

/// Canonical rendering of the tree; errors are wrapped in tabs as in the REPL.
pub struct BasicFormatter;

impl ProgramFormatter for BasicFormatter {
    fn format(&self, program: &Program) -> String {
        program.to_string()
    }

    fn format_error(&self, error: &ParserError) -> String {
        format!("\t{error}\t")
    }
}

/// Canonical rendering of the tree with errors reported against the source.
pub struct PrettyFormatter<'src> {
    text: &'src str,
    path: &'src Path,
}

impl<'src> PrettyFormatter<'src> {
    pub fn new(text: &'src str, path: &'src Path) -> Self {
        Self { text, path }
    }
}

impl<'src> ProgramFormatter for PrettyFormatter<'src> {
    fn format(&self, program: &Program) -> String {
        program.to_string()
    }

    fn format_error(&self, error: &ParserError) -> String {
        let path = self.path.to_string_lossy();
        let path: &str = &path;
        let span = error.span.range();
        let label = match &error.kind {
            ParserErrorKind::UnexpectedToken { expected, actual } => {
                format!("Expected {expected} but got {actual}")
            }
            ParserErrorKind::NoPrefixParseFunction(kind) => {
                format!("{kind} cannot start an expression")
            }
            ParserErrorKind::InvalidInteger(_) => "Does not fit in a 64-bit integer".into(),
        };

        let mut output = std::io::Cursor::new(Vec::new());
        Report::build(ReportKind::Error, (path, span.clone()))
            .with_code(error.code())
            .with_message(error.to_string())
            .with_label(
                Label::new((path, span))
                    .with_message(label)
                    .with_color(Color::BrightRed),
            )
            .finish()
            .write((path, Source::from(self.text)), &mut output)
            .expect(ARIADNE_WRITE_MSG);
        String::from_utf8(output.into_inner()).expect(ARIADNE_MSG)
    }
}
