// Parser for the Yul-style IR: pest grammar plus AST builder functions.

pub mod errors;
pub(crate) mod expressions;
pub(crate) mod statements;

pub use errors::YulParseError;

use crate::ast::{DataValue, Object, ObjectMember, ParsedInput};
use crate::error_reporting::SourceSpan;
use errors::{missing_token_error, pair_to_source_span, unexpected_rule_error};
use pest::iterators::Pair;
use pest::Parser;

#[derive(pest_derive::Parser)]
#[grammar = "yul.pest"]
pub struct YulParser;

/// Parses a full object tree or a bare code block.
pub fn parse(source: &str) -> Result<ParsedInput, YulParseError> {
    let mut pairs = YulParser::parse(Rule::program, source)?;
    let program = pairs
        .next()
        .ok_or_else(|| missing_token_error("program", SourceSpan::new(1, 1, 1, 1)))?;

    for pair in program.into_inner() {
        match pair.as_rule() {
            Rule::object => return Ok(ParsedInput::Object(build_object(pair)?)),
            Rule::block => {
                return Ok(ParsedInput::Block(statements::build_block(pair)?));
            }
            Rule::EOI => {}
            _ => return Err(unexpected_rule_error("object or block", &pair)),
        }
    }

    Err(missing_token_error(
        "object or block",
        SourceSpan::new(1, 1, 1, 1),
    ))
}

fn build_object(pair: Pair<Rule>) -> Result<Object, YulParseError> {
    let object_span = pair_to_source_span(&pair);
    let mut name = None;
    let mut code = None;
    let mut members = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::kw_object => {}
            Rule::string_literal => {
                name = Some(expressions::build_string_content(&inner)?);
            }
            Rule::code => {
                let block_pair = inner
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::block)
                    .ok_or_else(|| missing_token_error("code block", object_span.clone()))?;
                code = Some(statements::build_block(block_pair)?);
            }
            Rule::object => {
                members.push(ObjectMember::Object(build_object(inner)?));
            }
            Rule::data => {
                members.push(build_data(inner)?);
            }
            _ => return Err(unexpected_rule_error("object member", &inner)),
        }
    }

    Ok(Object {
        name: name.ok_or_else(|| missing_token_error("object name", object_span.clone()))?,
        code: code.ok_or_else(|| missing_token_error("code block", object_span))?,
        members,
    })
}

fn build_data(pair: Pair<Rule>) -> Result<ObjectMember, YulParseError> {
    let data_span = pair_to_source_span(&pair);
    let mut name = None;
    let mut value = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::kw_data => {}
            Rule::string_literal if name.is_none() => {
                name = Some(expressions::build_string_content(&inner)?);
            }
            Rule::string_literal => {
                value = Some(DataValue::Str(expressions::build_string_content(&inner)?));
            }
            Rule::hex_literal => {
                let text = inner.as_str();
                let digits = text
                    .strip_prefix("hex\"")
                    .and_then(|rest| rest.strip_suffix('"'))
                    .ok_or_else(|| unexpected_rule_error("hex literal", &inner))?;
                value = Some(DataValue::Hex(digits.to_string()));
            }
            _ => return Err(unexpected_rule_error("data payload", &inner)),
        }
    }

    Ok(ObjectMember::Data {
        name: name.ok_or_else(|| missing_token_error("data name", data_span.clone()))?,
        value: value.ok_or_else(|| missing_token_error("data payload", data_span))?,
    })
}
