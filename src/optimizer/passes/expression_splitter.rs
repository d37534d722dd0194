use super::child_blocks_mut;
use crate::ast::{Block, Expression, Statement, VariableDeclaration};
use crate::optimizer::{OptimizerContext, OptimizerStep};

/// Pulls nested call arguments out into fresh variables so that every
/// call argument is a literal or an identifier:
/// `sstore(0, add(mload(0), 1))` becomes
/// `let tmp_1 := mload(0)  let tmp_2 := add(tmp_1, 1)  sstore(0, tmp_2)`.
///
/// For-loop conditions are left alone: they are re-evaluated every
/// iteration and cannot be hoisted in front of the loop.
pub struct ExpressionSplitter;

impl OptimizerStep for ExpressionSplitter {
    fn name(&self) -> &'static str {
        "ExpressionSplitter"
    }

    fn abbreviation(&self) -> char {
        'x'
    }

    fn run(&self, ctx: &mut OptimizerContext, block: &mut Block) {
        process_block(ctx, block);
    }
}

fn process_block(ctx: &mut OptimizerContext, block: &mut Block) {
    let statements = std::mem::take(&mut block.statements);
    for mut statement in statements {
        for child in child_blocks_mut(&mut statement) {
            process_block(ctx, child);
        }

        let mut prelude = Vec::new();
        match &mut statement {
            Statement::VariableDeclaration(declaration) => {
                if let Some(value) = &mut declaration.value {
                    split_arguments(ctx, value, &mut prelude);
                }
            }
            Statement::Assignment(assignment) => {
                split_arguments(ctx, &mut assignment.value, &mut prelude);
            }
            Statement::Expression(expression) => {
                split_arguments(ctx, expression, &mut prelude);
            }
            Statement::If(if_statement) => {
                split_arguments(ctx, &mut if_statement.condition, &mut prelude);
            }
            Statement::Switch(switch) => {
                split_arguments(ctx, &mut switch.expression, &mut prelude);
            }
            _ => {}
        }
        block.statements.extend(prelude);
        block.statements.push(statement);
    }
}

/// Replaces every non-trivial argument of `expression` (recursively) with
/// a fresh variable, emitting the hoisted declarations to `prelude` in
/// evaluation order. The outermost call itself stays in place.
fn split_arguments(
    ctx: &mut OptimizerContext,
    expression: &mut Expression,
    prelude: &mut Vec<Statement>,
) {
    if let Expression::FunctionCall(call) = expression {
        let skip_member_argument = ctx
            .dialect
            .builtin(call.function.as_str())
            .is_some_and(|builtin| builtin.needs_literal_member);

        for (index, argument) in call.arguments.iter_mut().enumerate() {
            if skip_member_argument && index == 0 {
                continue;
            }
            split_arguments(ctx, argument, prelude);
            if argument.is_trivial() {
                continue;
            }
            let fresh = ctx.dispenser.fresh("tmp");
            let value =
                std::mem::replace(argument, Expression::Identifier(fresh.clone()));
            prelude.push(Statement::VariableDeclaration(VariableDeclaration {
                variables: vec![fresh],
                value: Some(value),
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::passes::tests::run_on_block;

    #[test]
    fn nested_arguments_become_variables() {
        let output = run_on_block(
            &ExpressionSplitter,
            "{ sstore(0, add(mload(0), 1)) }",
        );
        // The sstore argument is now an identifier, not a nested call.
        let line = output
            .lines()
            .find(|l| l.contains("sstore"))
            .unwrap();
        assert!(!line.contains("add("));
        assert!(output.matches("let ").count() >= 2);
    }

    #[test]
    fn trivial_arguments_stay_inline() {
        let output = run_on_block(&ExpressionSplitter, "{ let x := 1 sstore(x, 2) }");
        assert!(output.contains("sstore(x, 2)"));
    }

    #[test]
    fn for_conditions_are_not_hoisted() {
        let output = run_on_block(
            &ExpressionSplitter,
            "{ for { let i := 0 } lt(i, calldatasize()) { i := add(i, 1) } { } }",
        );
        assert!(output.contains("lt(i, calldatasize())"));
    }
}
