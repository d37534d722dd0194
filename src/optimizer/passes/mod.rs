// The individual optimizer steps, one per module, plus the AST-walking
// helpers they share.

pub mod block_flattener;
pub mod control_flow_simplifier;
pub mod dead_code_eliminator;
pub mod expression_joiner;
pub mod expression_simplifier;
pub mod expression_splitter;
pub mod for_loop_init_rewriter;
pub mod function_grouper;
pub mod function_hoister;
pub mod literal_rematerialiser;
pub mod redundant_assign_eliminator;
pub mod unused_pruner;
pub mod var_decl_initializer;

use crate::ast::{Block, Expression, Statement};
use crate::dialect::Dialect;
use std::collections::{HashMap, HashSet};

/// Every block nested under a statement, in declaration order.
pub(crate) fn child_blocks_mut(statement: &mut Statement) -> Vec<&mut Block> {
    match statement {
        Statement::Block(block) => vec![block],
        Statement::FunctionDefinition(function) => vec![&mut function.body],
        Statement::If(if_statement) => vec![&mut if_statement.body],
        Statement::Switch(switch) => switch.cases.iter_mut().map(|c| &mut c.body).collect(),
        Statement::ForLoop(for_loop) => {
            vec![&mut for_loop.pre, &mut for_loop.post, &mut for_loop.body]
        }
        _ => Vec::new(),
    }
}

/// Post-order visit of `block` and every block nested inside it.
pub(crate) fn visit_blocks_mut(block: &mut Block, f: &mut impl FnMut(&mut Block)) {
    for statement in &mut block.statements {
        for child in child_blocks_mut(statement) {
            visit_blocks_mut(child, f);
        }
    }
    f(block);
}

/// Expressions directly attached to a statement (not those in child blocks).
pub(crate) fn statement_expressions_mut(statement: &mut Statement) -> Vec<&mut Expression> {
    match statement {
        Statement::VariableDeclaration(declaration) => {
            declaration.value.as_mut().into_iter().collect()
        }
        Statement::Assignment(assignment) => vec![&mut assignment.value],
        Statement::Expression(expression) => vec![expression],
        Statement::If(if_statement) => vec![&mut if_statement.condition],
        Statement::Switch(switch) => vec![&mut switch.expression],
        Statement::ForLoop(for_loop) => vec![&mut for_loop.condition],
        _ => Vec::new(),
    }
}

fn collect_expression_names(expression: &Expression, names: &mut HashSet<String>) {
    match expression {
        Expression::Literal(_) => {}
        Expression::Identifier(identifier) => {
            names.insert(identifier.as_str().to_string());
        }
        Expression::FunctionCall(call) => {
            names.insert(call.function.as_str().to_string());
            for argument in &call.arguments {
                collect_expression_names(argument, names);
            }
        }
    }
}

/// Every identifier appearing in the block: declarations and uses alike.
pub(crate) fn collect_names(block: &Block) -> HashSet<String> {
    let mut names = HashSet::new();
    collect_block_names(block, &mut names);
    names
}

fn collect_block_names(block: &Block, names: &mut HashSet<String>) {
    for statement in &block.statements {
        match statement {
            Statement::FunctionDefinition(function) => {
                names.insert(function.name.as_str().to_string());
                for identifier in function.parameters.iter().chain(&function.returns) {
                    names.insert(identifier.as_str().to_string());
                }
                collect_block_names(&function.body, names);
            }
            Statement::VariableDeclaration(declaration) => {
                for variable in &declaration.variables {
                    names.insert(variable.as_str().to_string());
                }
                if let Some(value) = &declaration.value {
                    collect_expression_names(value, names);
                }
            }
            Statement::Assignment(assignment) => {
                for target in &assignment.targets {
                    names.insert(target.as_str().to_string());
                }
                collect_expression_names(&assignment.value, names);
            }
            Statement::Expression(expression) => collect_expression_names(expression, names),
            Statement::Block(inner) => collect_block_names(inner, names),
            Statement::If(if_statement) => {
                collect_expression_names(&if_statement.condition, names);
                collect_block_names(&if_statement.body, names);
            }
            Statement::Switch(switch) => {
                collect_expression_names(&switch.expression, names);
                for case in &switch.cases {
                    collect_block_names(&case.body, names);
                }
            }
            Statement::ForLoop(for_loop) => {
                collect_block_names(&for_loop.pre, names);
                collect_expression_names(&for_loop.condition, names);
                collect_block_names(&for_loop.post, names);
                collect_block_names(&for_loop.body, names);
            }
            Statement::Break | Statement::Continue | Statement::Leave => {}
        }
    }
}

fn count_expression_references(expression: &Expression, counts: &mut HashMap<String, usize>) {
    match expression {
        Expression::Literal(_) => {}
        Expression::Identifier(identifier) => {
            *counts.entry(identifier.as_str().to_string()).or_insert(0) += 1;
        }
        Expression::FunctionCall(call) => {
            *counts
                .entry(call.function.as_str().to_string())
                .or_insert(0) += 1;
            for argument in &call.arguments {
                count_expression_references(argument, counts);
            }
        }
    }
}

/// Use counts per identifier: occurrences in expressions and as call
/// targets. Declarations and assignment targets do not count as uses.
pub(crate) fn count_references(block: &Block) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    count_block_references(block, &mut counts);
    counts
}

fn count_block_references(block: &Block, counts: &mut HashMap<String, usize>) {
    for statement in &block.statements {
        count_statement_references(statement, counts);
    }
}

pub(crate) fn count_statement_references(
    statement: &Statement,
    counts: &mut HashMap<String, usize>,
) {
    match statement {
        Statement::FunctionDefinition(function) => count_block_references(&function.body, counts),
        Statement::VariableDeclaration(declaration) => {
            if let Some(value) = &declaration.value {
                count_expression_references(value, counts);
            }
        }
        Statement::Assignment(assignment) => {
            count_expression_references(&assignment.value, counts)
        }
        Statement::Expression(expression) => count_expression_references(expression, counts),
        Statement::Block(inner) => count_block_references(inner, counts),
        Statement::If(if_statement) => {
            count_expression_references(&if_statement.condition, counts);
            count_block_references(&if_statement.body, counts);
        }
        Statement::Switch(switch) => {
            count_expression_references(&switch.expression, counts);
            for case in &switch.cases {
                count_block_references(&case.body, counts);
            }
        }
        Statement::ForLoop(for_loop) => {
            count_block_references(&for_loop.pre, counts);
            count_expression_references(&for_loop.condition, counts);
            count_block_references(&for_loop.post, counts);
            count_block_references(&for_loop.body, counts);
        }
        Statement::Break | Statement::Continue | Statement::Leave => {}
    }
}

/// Names assigned (not declared) anywhere under the statement.
pub(crate) fn collect_assigned(statement: &Statement, assigned: &mut HashSet<String>) {
    match statement {
        Statement::Assignment(assignment) => {
            for target in &assignment.targets {
                assigned.insert(target.as_str().to_string());
            }
        }
        _ => {
            for_each_nested_statement(statement, &mut |nested| collect_assigned(nested, assigned));
        }
    }
}

fn for_each_nested_statement(statement: &Statement, f: &mut impl FnMut(&Statement)) {
    let blocks: Vec<&Block> = match statement {
        Statement::Block(block) => vec![block],
        Statement::FunctionDefinition(function) => vec![&function.body],
        Statement::If(if_statement) => vec![&if_statement.body],
        Statement::Switch(switch) => switch.cases.iter().map(|c| &c.body).collect(),
        Statement::ForLoop(for_loop) => vec![&for_loop.pre, &for_loop.post, &for_loop.body],
        _ => Vec::new(),
    };
    for block in blocks {
        for nested in &block.statements {
            f(nested);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::analysis;
    use crate::ast::{Block, ParsedInput};
    use crate::dialect::Dialect;
    use crate::optimizer::{Disambiguator, OptimizerContext, OptimizerStep};
    use crate::parser;
    use crate::printer::Printer;

    pub(crate) fn parse_block(source: &str) -> Block {
        match parser::parse(source).unwrap() {
            ParsedInput::Block(block) => block,
            ParsedInput::Object(_) => panic!("expected a bare block"),
        }
    }

    /// Parses, disambiguates, runs the step, re-analyzes, prints.
    pub(crate) fn run_on_block(step: &dyn OptimizerStep, source: &str) -> String {
        let dialect = Dialect::evm();
        let mut block = parse_block(source);
        analysis::analyze_block(&dialect, &block).expect("input should analyze");

        let mut ctx = OptimizerContext::for_block(&dialect, &block);
        Disambiguator::run(&mut ctx, &mut block);
        step.run(&mut ctx, &mut block);

        analysis::analyze_block(&dialect, &block).expect("step output should analyze");
        Printer::print_block(&block)
    }
}

/// The expression may read state, but evaluating it
/// has no observable effect, so skipping the evaluation is sound.
pub(crate) fn expression_is_droppable(dialect: &Dialect, expression: &Expression) -> bool {
    use crate::dialect::Effects;
    match expression {
        Expression::Literal(_) | Expression::Identifier(_) => true,
        Expression::FunctionCall(call) => {
            dialect
                .builtin(call.function.as_str())
                .is_some_and(|builtin| {
                    matches!(builtin.effects, Effects::Pure | Effects::Reads)
                })
                && call
                    .arguments
                    .iter()
                    .all(|argument| expression_is_droppable(dialect, argument))
        }
    }
}
