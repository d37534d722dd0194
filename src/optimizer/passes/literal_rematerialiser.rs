use super::{collect_assigned, statement_expressions_mut};
use crate::ast::{Block, Expression, Literal, Statement};
use crate::optimizer::{OptimizerContext, OptimizerStep};
use std::collections::{HashMap, HashSet};

/// Replaces uses of variables bound to a literal with the literal itself.
/// Only variables that are never reassigned qualify, so the binding seen at
/// the declaration holds for every use. The declarations stay behind for
/// UnusedPruner to collect.
pub struct LiteralRematerialiser;

impl OptimizerStep for LiteralRematerialiser {
    fn name(&self) -> &'static str {
        "LiteralRematerialiser"
    }

    fn abbreviation(&self) -> char {
        'T'
    }

    fn run(&self, _ctx: &mut OptimizerContext, block: &mut Block) {
        let mut assigned = HashSet::new();
        for statement in &block.statements {
            collect_assigned(statement, &mut assigned);
        }
        let mut bindings = HashMap::new();
        collect_literal_bindings(block, &assigned, &mut bindings);
        substitute_in_block(block, &bindings);
    }
}

fn collect_literal_bindings(
    block: &Block,
    assigned: &HashSet<String>,
    bindings: &mut HashMap<String, Literal>,
) {
    for statement in &block.statements {
        match statement {
            Statement::VariableDeclaration(declaration) => {
                if let [variable] = declaration.variables.as_slice() {
                    if let Some(Expression::Literal(literal)) = &declaration.value {
                        if !assigned.contains(variable.as_str()) {
                            bindings.insert(variable.as_str().to_string(), literal.clone());
                        }
                    }
                }
            }
            Statement::FunctionDefinition(function) => {
                collect_literal_bindings(&function.body, assigned, bindings);
            }
            Statement::Block(inner) => collect_literal_bindings(inner, assigned, bindings),
            Statement::If(if_statement) => {
                collect_literal_bindings(&if_statement.body, assigned, bindings);
            }
            Statement::Switch(switch) => {
                for case in &switch.cases {
                    collect_literal_bindings(&case.body, assigned, bindings);
                }
            }
            Statement::ForLoop(for_loop) => {
                collect_literal_bindings(&for_loop.pre, assigned, bindings);
                collect_literal_bindings(&for_loop.post, assigned, bindings);
                collect_literal_bindings(&for_loop.body, assigned, bindings);
            }
            _ => {}
        }
    }
}

fn substitute_in_block(block: &mut Block, bindings: &HashMap<String, Literal>) {
    for statement in &mut block.statements {
        for expression in statement_expressions_mut(statement) {
            substitute(expression, bindings);
        }
        match statement {
            Statement::FunctionDefinition(function) => {
                substitute_in_block(&mut function.body, bindings);
            }
            Statement::Block(inner) => substitute_in_block(inner, bindings),
            Statement::If(if_statement) => substitute_in_block(&mut if_statement.body, bindings),
            Statement::Switch(switch) => {
                for case in &mut switch.cases {
                    substitute_in_block(&mut case.body, bindings);
                }
            }
            Statement::ForLoop(for_loop) => {
                substitute_in_block(&mut for_loop.pre, bindings);
                substitute_in_block(&mut for_loop.post, bindings);
                substitute_in_block(&mut for_loop.body, bindings);
            }
            _ => {}
        }
    }
}

fn substitute(expression: &mut Expression, bindings: &HashMap<String, Literal>) {
    match expression {
        Expression::Literal(_) => {}
        Expression::Identifier(identifier) => {
            if let Some(literal) = bindings.get(identifier.as_str()) {
                *expression = Expression::Literal(literal.clone());
            }
        }
        Expression::FunctionCall(call) => {
            for argument in &mut call.arguments {
                substitute(argument, bindings);
            }
        }
    }
}
