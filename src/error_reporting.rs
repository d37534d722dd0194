// Source location information and rustc-style diagnostic rendering for
// parse and analysis failures.

use std::fmt;

/// Source span representing a range in the source code
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSpan {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub source_text: Option<String>,
}

impl SourceSpan {
    pub fn new(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
            source_text: None,
        }
    }

    pub fn with_source_text(mut self, source_text: String) -> Self {
        self.source_text = Some(source_text);
        self
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}:{}", self.start_line, self.start_column)
    }
}

/// Pretty-printer for a diagnostic: header line, location, and a caret
/// snippet when the span carries the source text.
pub struct DiagnosticFormatter;

impl DiagnosticFormatter {
    pub fn format(message: &str, span: Option<&SourceSpan>) -> String {
        let mut output = String::new();
        output.push_str(&format!("error: {}\n", message));

        if let Some(span) = span {
            output.push_str(&format!(
                "  --> line {}:{}\n",
                span.start_line, span.start_column
            ));
            if let Some(ref source) = span.source_text {
                for line in source.lines().take(3) {
                    output.push_str(&format!("   | {}\n", line));
                }
                if let Some(first) = source.lines().next() {
                    let width = first.trim_end().len().max(1);
                    output.push_str(&format!("   | {}\n", "^".repeat(width.min(60))));
                }
            }
        }

        output
    }
}
