use super::errors::{
    missing_token_error, pair_to_source_span, unexpected_rule_error, YulParseError,
};
use super::expressions::{build_expression, build_identifier, build_literal};
use super::Rule;
use crate::ast::{
    Assignment, Block, Case, ForLoop, FunctionDefinition, Identifier, If, Statement, Switch,
    VariableDeclaration,
};
use pest::iterators::Pair;

pub(super) fn build_block(pair: Pair<Rule>) -> Result<Block, YulParseError> {
    let mut statements = Vec::new();
    for inner in pair.into_inner() {
        statements.push(build_statement(inner)?);
    }
    Ok(Block { statements })
}

fn build_statement(pair: Pair<Rule>) -> Result<Statement, YulParseError> {
    match pair.as_rule() {
        Rule::block => Ok(Statement::Block(build_block(pair)?)),
        Rule::function_definition => build_function_definition(pair),
        Rule::variable_declaration => build_variable_declaration(pair),
        Rule::assignment => build_assignment(pair),
        Rule::expression_statement => {
            let span = pair_to_source_span(&pair);
            let inner = pair
                .into_inner()
                .next()
                .ok_or_else(|| missing_token_error("expression", span))?;
            Ok(Statement::Expression(build_expression(inner)?))
        }
        Rule::if_statement => build_if(pair),
        Rule::switch_statement => build_switch(pair),
        Rule::for_statement => build_for(pair),
        Rule::break_statement => Ok(Statement::Break),
        Rule::continue_statement => Ok(Statement::Continue),
        Rule::leave_statement => Ok(Statement::Leave),
        _ => Err(unexpected_rule_error("statement", &pair)),
    }
}

fn build_function_definition(pair: Pair<Rule>) -> Result<Statement, YulParseError> {
    let definition_span = pair_to_source_span(&pair);
    let mut name = None;
    let mut parameters = Vec::new();
    let mut returns = Vec::new();
    let mut body = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::kw_function => {}
            Rule::identifier => name = Some(build_identifier(&inner)),
            Rule::param_list => parameters = build_identifiers(inner),
            Rule::return_list => returns = build_identifiers(inner),
            Rule::block => body = Some(build_block(inner)?),
            _ => return Err(unexpected_rule_error("function part", &inner)),
        }
    }

    Ok(Statement::FunctionDefinition(FunctionDefinition {
        name: name
            .ok_or_else(|| missing_token_error("function name", definition_span.clone()))?,
        parameters,
        returns,
        body: body.ok_or_else(|| missing_token_error("function body", definition_span))?,
    }))
}

fn build_variable_declaration(pair: Pair<Rule>) -> Result<Statement, YulParseError> {
    let declaration_span = pair_to_source_span(&pair);
    let mut variables = Vec::new();
    let mut value = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::kw_let => {}
            Rule::identifier_list => variables = build_identifiers(inner),
            Rule::expression => value = Some(build_expression(inner)?),
            _ => return Err(unexpected_rule_error("variable declaration part", &inner)),
        }
    }

    if variables.is_empty() {
        return Err(missing_token_error("variable name", declaration_span));
    }
    Ok(Statement::VariableDeclaration(VariableDeclaration {
        variables,
        value,
    }))
}

fn build_assignment(pair: Pair<Rule>) -> Result<Statement, YulParseError> {
    let assignment_span = pair_to_source_span(&pair);
    let mut inner = pair.into_inner();
    let targets_pair = inner
        .next()
        .ok_or_else(|| missing_token_error("assignment targets", assignment_span.clone()))?;
    let value_pair = inner
        .next()
        .ok_or_else(|| missing_token_error("assigned value", assignment_span))?;

    Ok(Statement::Assignment(Assignment {
        targets: build_identifiers(targets_pair),
        value: build_expression(value_pair)?,
    }))
}

fn build_if(pair: Pair<Rule>) -> Result<Statement, YulParseError> {
    let if_span = pair_to_source_span(&pair);
    let mut condition = None;
    let mut body = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::kw_if => {}
            Rule::expression => condition = Some(build_expression(inner)?),
            Rule::block => body = Some(build_block(inner)?),
            _ => return Err(unexpected_rule_error("if part", &inner)),
        }
    }

    Ok(Statement::If(If {
        condition: condition.ok_or_else(|| missing_token_error("if condition", if_span.clone()))?,
        body: body.ok_or_else(|| missing_token_error("if body", if_span))?,
    }))
}

fn build_switch(pair: Pair<Rule>) -> Result<Statement, YulParseError> {
    let switch_span = pair_to_source_span(&pair);
    let mut expression = None;
    let mut cases = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::kw_switch => {}
            Rule::expression => expression = Some(build_expression(inner)?),
            Rule::case_clause => cases.push(build_case(inner)?),
            Rule::default_clause => {
                let clause_span = pair_to_source_span(&inner);
                let body_pair = inner
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::block)
                    .ok_or_else(|| missing_token_error("default body", clause_span))?;
                cases.push(Case {
                    value: None,
                    body: build_block(body_pair)?,
                });
            }
            _ => return Err(unexpected_rule_error("switch part", &inner)),
        }
    }

    Ok(Statement::Switch(Switch {
        expression: expression
            .ok_or_else(|| missing_token_error("switch expression", switch_span))?,
        cases,
    }))
}

fn build_case(pair: Pair<Rule>) -> Result<Case, YulParseError> {
    let case_span = pair_to_source_span(&pair);
    let mut value = None;
    let mut body = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::kw_case => {}
            Rule::literal => value = Some(build_literal(inner)?),
            Rule::block => body = Some(build_block(inner)?),
            _ => return Err(unexpected_rule_error("case part", &inner)),
        }
    }

    Ok(Case {
        value: Some(value.ok_or_else(|| missing_token_error("case value", case_span.clone()))?),
        body: body.ok_or_else(|| missing_token_error("case body", case_span))?,
    })
}

fn build_for(pair: Pair<Rule>) -> Result<Statement, YulParseError> {
    let for_span = pair_to_source_span(&pair);
    let mut blocks = Vec::new();
    let mut condition = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::kw_for => {}
            Rule::block => blocks.push(build_block(inner)?),
            Rule::expression => condition = Some(build_expression(inner)?),
            _ => return Err(unexpected_rule_error("for part", &inner)),
        }
    }

    if blocks.len() != 3 {
        return Err(missing_token_error("for-loop blocks", for_span));
    }
    let body = blocks.pop().unwrap_or_default();
    let post = blocks.pop().unwrap_or_default();
    let pre = blocks.pop().unwrap_or_default();

    Ok(Statement::ForLoop(ForLoop {
        pre,
        condition: condition.ok_or_else(|| missing_token_error("for condition", for_span))?,
        post,
        body,
    }))
}

fn build_identifiers(pair: Pair<Rule>) -> Vec<Identifier> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::identifier)
        .map(|p| build_identifier(&p))
        .collect()
}
