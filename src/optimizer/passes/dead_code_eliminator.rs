use super::visit_blocks_mut;
use crate::ast::{Block, Expression, Statement};
use crate::dialect::Dialect;
use crate::optimizer::{OptimizerContext, OptimizerStep};

/// Removes statements that can never execute: everything following
/// `break`, `continue`, `leave` or a call to a terminating builtin within
/// the same block. Function definitions survive, they are reachable
/// regardless of position.
pub struct DeadCodeEliminator;

impl OptimizerStep for DeadCodeEliminator {
    fn name(&self) -> &'static str {
        "DeadCodeEliminator"
    }

    fn abbreviation(&self) -> char {
        'D'
    }

    fn run(&self, ctx: &mut OptimizerContext, block: &mut Block) {
        let dialect = ctx.dialect;
        visit_blocks_mut(block, &mut |current| {
            let Some(position) = current
                .statements
                .iter()
                .position(|s| is_terminating(dialect, s))
            else {
                return;
            };
            let tail = current.statements.split_off(position + 1);
            current.statements.extend(
                tail.into_iter()
                    .filter(|s| matches!(s, Statement::FunctionDefinition(_))),
            );
        });
    }
}

fn is_terminating(dialect: &Dialect, statement: &Statement) -> bool {
    match statement {
        Statement::Break | Statement::Continue | Statement::Leave => true,
        Statement::Expression(Expression::FunctionCall(call)) => dialect
            .builtin(call.function.as_str())
            .is_some_and(|builtin| builtin.is_terminating()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::passes::tests::run_on_block;

    #[test]
    fn drops_statements_after_revert() {
        let output = run_on_block(&DeadCodeEliminator, "{ revert(0, 0) sstore(0, 1) }");
        assert!(output.contains("revert(0, 0)"));
        assert!(!output.contains("sstore"));
    }

    #[test]
    fn keeps_functions_after_a_terminator() {
        let output = run_on_block(
            &DeadCodeEliminator,
            "{ sstore(0, f()) return(0, 0) function f() -> r { r := 1 } }",
        );
        assert!(output.contains("function f"));
        assert!(output.contains("return(0, 0)"));
    }

    #[test]
    fn drops_code_after_break_in_loop_body() {
        let output = run_on_block(
            &DeadCodeEliminator,
            "{ for { } 1 { } { break sstore(0, 1) } }",
        );
        assert!(!output.contains("sstore"));
    }
}
