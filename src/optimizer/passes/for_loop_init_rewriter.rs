use super::visit_blocks_mut;
use crate::ast::{Block, Statement};
use crate::optimizer::{OptimizerContext, OptimizerStep};

/// Moves the statements of every for-loop init block in front of the loop,
/// leaving the init block empty. Later passes can then treat the condition
/// as the first thing the loop evaluates.
pub struct ForLoopInitRewriter;

impl OptimizerStep for ForLoopInitRewriter {
    fn name(&self) -> &'static str {
        "ForLoopInitRewriter"
    }

    fn abbreviation(&self) -> char {
        'o'
    }

    fn run(&self, _ctx: &mut OptimizerContext, block: &mut Block) {
        visit_blocks_mut(block, &mut rewrite_block);
    }
}

fn rewrite_block(block: &mut Block) {
    let statements = std::mem::take(&mut block.statements);
    for statement in statements {
        match statement {
            Statement::ForLoop(mut for_loop) if !for_loop.pre.statements.is_empty() => {
                block
                    .statements
                    .append(&mut for_loop.pre.statements);
                block.statements.push(Statement::ForLoop(for_loop));
            }
            other => block.statements.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::passes::tests::run_on_block;

    #[test]
    fn init_statements_move_before_the_loop() {
        let output = run_on_block(
            &ForLoopInitRewriter,
            "{ for { let i := 0 } lt(i, 10) { i := add(i, 1) } { sstore(i, i) } }",
        );
        let let_position = output.find("let i := 0").unwrap();
        let for_position = output.find("for").unwrap();
        assert!(let_position < for_position);
        assert!(output.contains("for { }"));
    }

    #[test]
    fn empty_init_blocks_are_untouched() {
        let output = run_on_block(
            &ForLoopInitRewriter,
            "{ let i := 0 for { } lt(i, 10) { i := add(i, 1) } { sstore(i, i) } }",
        );
        assert!(output.contains("for { }"));
    }

    #[test]
    fn nested_loops_are_rewritten_too() {
        let output = run_on_block(
            &ForLoopInitRewriter,
            "{ for { let i := 0 } lt(i, 2) { i := add(i, 1) } { for { let j := 0 } lt(j, 2) { j := add(j, 1) } { sstore(i, j) } } }",
        );
        assert!(!output.contains("for { let"));
    }
}
