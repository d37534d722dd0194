use super::{collect_assigned, count_references, visit_blocks_mut};
use crate::ast::{Block, Expression, Identifier, Statement};
use crate::optimizer::{OptimizerContext, OptimizerStep};
use std::collections::{HashMap, HashSet};

/// Inverse of the splitter: inlines `let x := <expr>` into the directly
/// following statement when `x` is used exactly once in the whole block,
/// is never an assignment target, and sits in a position that preserves
/// evaluation order (everything evaluated before it must be trivial).
pub struct ExpressionJoiner;

impl OptimizerStep for ExpressionJoiner {
    fn name(&self) -> &'static str {
        "ExpressionJoiner"
    }

    fn abbreviation(&self) -> char {
        'j'
    }

    fn run(&self, _ctx: &mut OptimizerContext, block: &mut Block) {
        let counts = count_references(block);
        let mut assigned = HashSet::new();
        for statement in &block.statements {
            collect_assigned(statement, &mut assigned);
        }
        visit_blocks_mut(block, &mut |current| {
            join_in_block(current, &counts, &assigned)
        });
    }
}

fn join_in_block(
    block: &mut Block,
    counts: &HashMap<String, usize>,
    assigned: &HashSet<String>,
) {
    let statements = std::mem::take(&mut block.statements);
    let mut result: Vec<Statement> = Vec::with_capacity(statements.len());

    for mut statement in statements {
        // Keep merging the previous `let` into this statement while
        // possible; chains like split output join back in one pass.
        loop {
            let Some(candidate) = joinable_declaration(result.last(), counts, assigned) else {
                break;
            };
            let Some(target) = statement_value_mut(&mut statement) else {
                break;
            };
            if !substitute(target, &candidate) {
                break;
            }
            // The declaration's value replaced the single use; drop it.
            let value = match result.pop() {
                Some(Statement::VariableDeclaration(declaration)) => declaration.value,
                _ => None,
            };
            if let Some(value) = value {
                replace_placeholder(statement_value_mut(&mut statement), &candidate, value);
            }
        }
        result.push(statement);
    }

    block.statements = result;
}

/// The name declared by `statement` when it is a single-variable `let`
/// with a value, read exactly once overall and never reassigned. A name
/// that is ever an assignment target must keep its declaration, the later
/// assignment would dangle otherwise.
fn joinable_declaration(
    statement: Option<&Statement>,
    counts: &HashMap<String, usize>,
    assigned: &HashSet<String>,
) -> Option<Identifier> {
    match statement {
        Some(Statement::VariableDeclaration(declaration)) => {
            if declaration.variables.len() != 1 || declaration.value.is_none() {
                return None;
            }
            let name = &declaration.variables[0];
            if assigned.contains(name.as_str()) {
                return None;
            }
            (counts.get(name.as_str()).copied().unwrap_or(0) == 1).then(|| name.clone())
        }
        _ => None,
    }
}

/// Expression a statement evaluates first, if any. Conditions of `if` and
/// `switch` qualify; for-loop conditions do not (not evaluated first once
/// the loop repeats - joining there would change semantics only if the
/// variable were reassigned, which disambiguated splitter output never
/// does, but we stay conservative).
fn statement_value_mut(statement: &mut Statement) -> Option<&mut Expression> {
    match statement {
        Statement::VariableDeclaration(declaration) => declaration.value.as_mut(),
        Statement::Assignment(assignment) => Some(&mut assignment.value),
        Statement::Expression(expression) => Some(expression),
        Statement::If(if_statement) => Some(&mut if_statement.condition),
        Statement::Switch(switch) => Some(&mut switch.expression),
        _ => None,
    }
}

/// Checks that the leftmost non-trivial position of `expression` is a use
/// of `name`. Does not rewrite anything yet.
fn substitute(expression: &Expression, name: &Identifier) -> bool {
    match expression {
        Expression::Identifier(identifier) => identifier == name,
        Expression::FunctionCall(call) => {
            for argument in &call.arguments {
                if let Expression::Identifier(identifier) = argument {
                    if identifier == name {
                        return true;
                    }
                    continue;
                }
                if argument.is_trivial() {
                    continue;
                }
                // First non-trivial argument: the join must happen inside
                // it or not at all.
                return substitute(argument, name);
            }
            false
        }
        Expression::Literal(_) => false,
    }
}

/// Replaces the single occurrence of `name` with `value`.
fn replace_placeholder(
    expression: Option<&mut Expression>,
    name: &Identifier,
    value: Expression,
) {
    fn replace(expression: &mut Expression, name: &Identifier, value: &mut Option<Expression>) {
        match expression {
            Expression::Identifier(identifier) if identifier == name => {
                if let Some(value) = value.take() {
                    *expression = value;
                }
            }
            Expression::FunctionCall(call) => {
                for argument in &mut call.arguments {
                    replace(argument, name, value);
                }
            }
            _ => {}
        }
    }

    if let Some(expression) = expression {
        let mut slot = Some(value);
        replace(expression, name, &mut slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::passes::tests::run_on_block;

    #[test]
    fn rejoins_split_chains() {
        let output = run_on_block(
            &ExpressionJoiner,
            "{ let a := mload(0) let b := add(a, 1) sstore(0, b) }",
        );
        assert!(output.contains("sstore(0, add(mload(0), 1))"));
        assert!(!output.contains("let"));
    }

    #[test]
    fn keeps_variables_used_twice() {
        let output = run_on_block(
            &ExpressionJoiner,
            "{ let a := mload(0) sstore(a, a) }",
        );
        assert!(output.contains("let a := mload(0)"));
        assert!(output.contains("sstore(a, a)"));
    }

    #[test]
    fn keeps_declarations_of_reassigned_variables() {
        // `a` is read once but reassigned later; inlining the declaration
        // would leave the assignment without a declared target.
        let output = run_on_block(
            &ExpressionJoiner,
            "{ let a := mload(0) sstore(0, a) a := 2 }",
        );
        assert!(output.contains("let a := mload(0)"));
        assert!(output.contains("a := 2"));
    }

    #[test]
    fn does_not_jump_over_non_trivial_arguments() {
        // `a` is evaluated before the mload; joining it into the second
        // argument would reorder the two loads.
        let output = run_on_block(
            &ExpressionJoiner,
            "{ let a := sload(0) sstore(mload(1), a) }",
        );
        assert!(output.contains("let a := sload(0)"));
    }
}
