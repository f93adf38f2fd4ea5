//! The one-call parse-and-convert facade.

use std::path::Path;

use crate::convert::{Converter, ConvertOptions};
use crate::error::ProcessError;
use crate::parser::{Parser, ParserOptions, Severity};

pub struct Processor;

impl Processor {
    pub fn process_text<T>(text: &str, converter: &impl Converter<T>) -> Result<T, ProcessError> {
        Self::process_text_with(text, converter, &ParserOptions::default(), &ConvertOptions::default())
    }

    pub fn process_text_with<T>(
        text: &str,
        converter: &impl Converter<T>,
        parser_options: &ParserOptions,
        convert_options: &ConvertOptions,
    ) -> Result<T, ProcessError> {
        let (document, diagnostics) = Parser::new(parser_options.clone()).parse(text);
        if diagnostics.iter().any(|d| d.severity == Severity::Error) {
            return Err(ProcessError::WithDiagnostics(diagnostics));
        }
        Ok(converter.convert_with(&document, convert_options))
    }

    pub fn process_file<T>(path: &Path, converter: &impl Converter<T>) -> Result<T, ProcessError> {
        if path.as_os_str().is_empty() {
            return Err(ProcessError::InvalidArgument("path must not be empty".to_string()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| ProcessError::Io { path: path.to_path_buf(), source })?;
        let mut options = ParserOptions::default();
        if let Some(parent) = path.parent() {
            options.base_directory = parent.to_path_buf();
        }
        Self::process_text_with(&text, converter, &options, &ConvertOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::html::HtmlConverter;

    #[test]
    fn processes_text_end_to_end() {
        let html = Processor::process_text("= Title\n\nBody.\n", &HtmlConverter).unwrap();
        assert!(html.contains("<h1>Title</h1>"));
    }

    #[test]
    fn rejects_empty_path() {
        let err = Processor::process_file(Path::new(""), &HtmlConverter).unwrap_err();
        assert!(matches!(err, ProcessError::InvalidArgument(_)));
    }
}
