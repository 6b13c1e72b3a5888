use super::error::RuntimeError;
use super::Object;

pub trait ValueFormatter {
    fn format(&self, value: &Object) -> String;
    fn format_error(&self, error: &RuntimeError) -> String;
}

pub struct DebugFormatter;

impl ValueFormatter for DebugFormatter {
    fn format(&self, value: &Object) -> String {
        format!("{value:?}")
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        format!("{error:?}")
    }
}

/// Renders values by their inspect string.
pub struct BasicFormatter;

impl ValueFormatter for BasicFormatter {
    fn format(&self, value: &Object) -> String {
        match value {
            Object::Error(error) => self.format_error(error),
            value => value.inspect(),
        }
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        format!("ERROR: {error}")
    }
}

/// Like [`BasicFormatter`] but tags runtime errors with their error code.
pub struct CodedFormatter;

impl ValueFormatter for CodedFormatter {
    fn format(&self, value: &Object) -> String {
        match value {
            Object::Error(error) => self.format_error(error),
            value => value.inspect(),
        }
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        format!("[{}] ERROR: {error}", error.code())
    }
}
