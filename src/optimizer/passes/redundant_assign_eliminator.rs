use super::{count_statement_references, expression_is_droppable, visit_blocks_mut};
use crate::ast::{Block, Statement};
use crate::dialect::Dialect;
use crate::optimizer::{OptimizerContext, OptimizerStep};
use std::collections::HashMap;

/// Removes assignments whose value is overwritten before it can be read.
/// The scan is straight-line only: any intervening control flow, or any
/// statement that mentions the variable, keeps the assignment.
pub struct RedundantAssignEliminator;

impl OptimizerStep for RedundantAssignEliminator {
    fn name(&self) -> &'static str {
        "RedundantAssignEliminator"
    }

    fn abbreviation(&self) -> char {
        'r'
    }

    fn run(&self, ctx: &mut OptimizerContext, block: &mut Block) {
        let dialect = ctx.dialect;
        visit_blocks_mut(block, &mut |current| eliminate_in_block(dialect, current));
    }
}

fn eliminate_in_block(dialect: &Dialect, block: &mut Block) {
    let mut redundant = vec![false; block.statements.len()];
    for (index, statement) in block.statements.iter().enumerate() {
        if let Statement::Assignment(assignment) = statement {
            if let [target] = assignment.targets.as_slice() {
                if expression_is_droppable(dialect, &assignment.value)
                    && overwritten_before_read(dialect, block, index + 1, target.as_str())
                {
                    redundant[index] = true;
                }
            }
        }
    }
    let mut index = 0;
    block.statements.retain(|_| {
        let keep = !redundant[index];
        index += 1;
        keep
    });
}

fn overwritten_before_read(dialect: &Dialect, block: &Block, from: usize, name: &str) -> bool {
    for statement in &block.statements[from..] {
        let mut references = HashMap::new();
        count_statement_references(statement, &mut references);
        if references.contains_key(name) {
            return false;
        }
        match statement {
            Statement::Assignment(assignment)
                if assignment.targets.iter().any(|t| t.as_str() == name) =>
            {
                return true;
            }
            // Function bodies cannot reach this variable, skip over them.
            Statement::FunctionDefinition(_)
            | Statement::VariableDeclaration(_)
            | Statement::Assignment(_)
            | Statement::Expression(_) => {
                if !statement_may_terminate(dialect, statement) {
                    continue;
                }
                return false;
            }
            _ => return false,
        }
    }
    false
}

fn statement_may_terminate(dialect: &Dialect, statement: &Statement) -> bool {
    if let Statement::Expression(crate::ast::Expression::FunctionCall(call)) = statement {
        return dialect
            .builtin(call.function.as_str())
            .map_or(true, |builtin| builtin.is_terminating());
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::passes::tests::run_on_block;

    #[test]
    fn overwritten_assignment_is_removed() {
        let output = run_on_block(
            &RedundantAssignEliminator,
            "{ let x := 0 x := 1 x := 2 sstore(0, x) }",
        );
        assert!(!output.contains("x := 1"));
        assert!(output.contains("x := 2"));
    }

    #[test]
    fn read_between_assignments_keeps_both() {
        let output = run_on_block(
            &RedundantAssignEliminator,
            "{ let x := 0 x := 1 sstore(0, x) x := 2 sstore(1, x) }",
        );
        assert!(output.contains("x := 1"));
        assert!(output.contains("x := 2"));
    }

    #[test]
    fn control_flow_between_assignments_keeps_the_first() {
        let output = run_on_block(
            &RedundantAssignEliminator,
            "{ let x := 0 x := 1 if callvalue() { sstore(0, x) } x := 2 sstore(1, x) }",
        );
        assert!(output.contains("x := 1"));
    }

    #[test]
    fn effectful_values_are_kept() {
        let output = run_on_block(
            &RedundantAssignEliminator,
            "{ let x := 0 x := call(gas(), 1, 2, 3, 4, 5, 6) x := 2 sstore(0, x) }",
        );
        assert!(output.contains("x := call("));
    }
}
