use crate::error_reporting::{DiagnosticFormatter, SourceSpan};
use pest::iterators::Pair;

// Helper function to convert a pest span to our SourceSpan
pub fn pest_span_to_source_span(span: pest::Span) -> SourceSpan {
    let (start_line, start_column) = span.start_pos().line_col();
    let (end_line, end_column) = span.end_pos().line_col();
    SourceSpan::new(start_line, start_column, end_line, end_column)
        .with_source_text(span.as_str().to_string())
}

// Helper function to create a SourceSpan from a Pair
pub fn pair_to_source_span(pair: &Pair<super::Rule>) -> SourceSpan {
    pest_span_to_source_span(pair.as_span())
}

pub fn missing_token_error(token: &str, span: SourceSpan) -> YulParseError {
    YulParseError::MissingToken {
        token: token.to_string(),
        span,
    }
}

pub fn unexpected_rule_error(expected: &str, pair: &Pair<super::Rule>) -> YulParseError {
    YulParseError::UnexpectedRule {
        expected: expected.to_string(),
        found: format!("{:?}", pair.as_rule()),
        span: pair_to_source_span(pair),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum YulParseError {
    /// Syntax error straight from pest; its Display already renders a
    /// caret diagnostic.
    #[error("{0}")]
    Syntax(Box<pest::error::Error<super::Rule>>),

    #[error("{}", DiagnosticFormatter::format(
        &format!("expected {}, found {}", expected, found), Some(span)))]
    UnexpectedRule {
        expected: String,
        found: String,
        span: SourceSpan,
    },

    #[error("{}", DiagnosticFormatter::format(
        &format!("missing {}", token), Some(span)))]
    MissingToken { token: String, span: SourceSpan },

    #[error("{}", DiagnosticFormatter::format(
        &format!("invalid escape sequence `{}`", sequence), Some(span)))]
    InvalidEscapeSequence { sequence: String, span: SourceSpan },

    #[error("{}", DiagnosticFormatter::format(message, Some(span)))]
    InvalidLiteral { message: String, span: SourceSpan },
}

impl From<pest::error::Error<super::Rule>> for YulParseError {
    fn from(error: pest::error::Error<super::Rule>) -> Self {
        YulParseError::Syntax(Box::new(error))
    }
}
