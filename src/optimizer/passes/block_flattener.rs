use super::visit_blocks_mut;
use crate::ast::{Block, Statement};
use crate::optimizer::{OptimizerContext, OptimizerStep};

/// Splices nested blocks into their parent. Safe only after
/// disambiguation, since it erases scope boundaries.
pub struct BlockFlattener;

impl OptimizerStep for BlockFlattener {
    fn name(&self) -> &'static str {
        "BlockFlattener"
    }

    fn abbreviation(&self) -> char {
        'f'
    }

    fn run(&self, _ctx: &mut OptimizerContext, block: &mut Block) {
        // Post-order: inner blocks are already flat when the parent is
        // spliced, so one traversal suffices.
        visit_blocks_mut(block, &mut |current| {
            let statements = std::mem::take(&mut current.statements);
            for statement in statements {
                match statement {
                    Statement::Block(inner) => current.statements.extend(inner.statements),
                    other => current.statements.push(other),
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::passes::tests::run_on_block;

    #[test]
    fn flattens_nested_blocks() {
        let output = run_on_block(
            &BlockFlattener,
            "{ let a := 1 { let b := a { let c := b sstore(b, c) } } }",
        );
        assert!(!output.contains("{\n        "));
        assert!(output.contains("let c := b"));
    }

    #[test]
    fn keeps_control_flow_blocks() {
        let output = run_on_block(&BlockFlattener, "{ if callvalue() { { revert(0, 0) } } }");
        assert!(output.contains("if callvalue()"));
        assert!(output.contains("revert(0, 0)"));
    }
}
