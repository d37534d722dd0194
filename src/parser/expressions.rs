use super::errors::{
    missing_token_error, pair_to_source_span, unexpected_rule_error, YulParseError,
};
use super::Rule;
use crate::ast::{Expression, FunctionCall, Identifier, Literal};
use pest::iterators::Pair;

pub(super) fn build_expression(pair: Pair<Rule>) -> Result<Expression, YulParseError> {
    let expression_span = pair_to_source_span(&pair);
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| missing_token_error("expression", expression_span))?;

    match inner.as_rule() {
        Rule::function_call => Ok(Expression::FunctionCall(build_function_call(inner)?)),
        Rule::literal => Ok(Expression::Literal(build_literal(inner)?)),
        Rule::identifier => Ok(Expression::Identifier(build_identifier(&inner))),
        _ => Err(unexpected_rule_error("expression", &inner)),
    }
}

pub(super) fn build_function_call(pair: Pair<Rule>) -> Result<FunctionCall, YulParseError> {
    let call_span = pair_to_source_span(&pair);
    let mut inner = pair.into_inner();
    let name_pair = inner
        .next()
        .ok_or_else(|| missing_token_error("function name", call_span))?;
    if name_pair.as_rule() != Rule::identifier {
        return Err(unexpected_rule_error("function name", &name_pair));
    }

    let mut arguments = Vec::new();
    for argument in inner {
        arguments.push(build_expression(argument)?);
    }

    Ok(FunctionCall {
        function: build_identifier(&name_pair),
        arguments,
    })
}

pub(super) fn build_literal(pair: Pair<Rule>) -> Result<Literal, YulParseError> {
    let literal_span = pair_to_source_span(&pair);
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| missing_token_error("literal", literal_span))?;
    let inner_span = pair_to_source_span(&inner);

    match inner.as_rule() {
        Rule::hex_number | Rule::decimal_number => Ok(Literal::Number(inner.as_str().to_string())),
        Rule::boolean => Ok(Literal::Boolean(inner.as_str().parse().map_err(|_| {
            YulParseError::InvalidLiteral {
                message: format!("invalid boolean: {}", inner.as_str()),
                span: inner_span.clone(),
            }
        })?)),
        Rule::string_literal => Ok(Literal::Str(build_string_content(&inner)?)),
        _ => Err(unexpected_rule_error("literal", &inner)),
    }
}

pub(super) fn build_identifier(pair: &Pair<Rule>) -> Identifier {
    Identifier::new(pair.as_str())
}

/// Strips the quotes from a `string_literal` pair and resolves escapes.
pub(super) fn build_string_content(pair: &Pair<Rule>) -> Result<String, YulParseError> {
    let raw = pair.as_str();
    let content = &raw[1..raw.len() - 1];
    unescape(content).map_err(|sequence| YulParseError::InvalidEscapeSequence {
        sequence,
        span: pair_to_source_span(pair),
    })
}

fn unescape(content: &str) -> Result<String, String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            other => return Err(format!("\\{}", other.map(String::from).unwrap_or_default())),
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::unescape;

    #[test]
    fn unescape_sequences() {
        assert_eq!(unescape("plain").unwrap(), "plain");
        assert_eq!(unescape("a\\nb").unwrap(), "a\nb");
        assert_eq!(unescape("quote \\\"x\\\"").unwrap(), "quote \"x\"");
        assert!(unescape("bad \\q").is_err());
    }
}
