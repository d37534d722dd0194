use super::{expression_is_droppable, visit_blocks_mut};
use crate::ast::{Block, Expression, Statement};
use crate::dialect::Dialect;
use crate::optimizer::{OptimizerContext, OptimizerStep};

/// Removes control flow that provably does nothing:
/// - `if` with a literal condition is inlined or dropped;
/// - `if` with an empty body and a droppable condition is dropped;
/// - `switch` over a literal collapses to the matching case;
/// - `switch` with only a default case collapses to its body;
/// - `for` with a literal-false condition and an empty init block is
///   dropped.
pub struct ControlFlowSimplifier;

impl OptimizerStep for ControlFlowSimplifier {
    fn name(&self) -> &'static str {
        "ControlFlowSimplifier"
    }

    fn abbreviation(&self) -> char {
        'n'
    }

    fn run(&self, ctx: &mut OptimizerContext, block: &mut Block) {
        let dialect = ctx.dialect;
        visit_blocks_mut(block, &mut |current| {
            let statements = std::mem::take(&mut current.statements);
            for statement in statements {
                if let Some(replacement) = simplify(dialect, statement) {
                    current.statements.push(replacement);
                }
            }
        });
    }
}

fn simplify(dialect: &Dialect, statement: Statement) -> Option<Statement> {
    match statement {
        Statement::If(if_statement) => {
            if let Expression::Literal(literal) = &if_statement.condition {
                return match literal.as_bool() {
                    // Literal conditions need no own scope, the body block
                    // keeps one.
                    Some(true) => Some(Statement::Block(if_statement.body)),
                    Some(false) => None,
                    None => Some(Statement::If(if_statement)),
                };
            }
            if if_statement.body.is_empty() && expression_is_droppable(dialect, &if_statement.condition)
            {
                return None;
            }
            Some(Statement::If(if_statement))
        }
        Statement::Switch(mut switch) => {
            if let Expression::Literal(selector) = &switch.expression {
                if let Some(value) = selector.as_u128() {
                    let position = switch
                        .cases
                        .iter()
                        .position(|case| match &case.value {
                            Some(label) => label.as_u128() == Some(value),
                            None => true,
                        });
                    return match position {
                        Some(index) => Some(Statement::Block(switch.cases.swap_remove(index).body)),
                        None => None,
                    };
                }
            }
            if switch.cases.len() == 1
                && switch.cases[0].value.is_none()
                && expression_is_droppable(dialect, &switch.expression)
            {
                return Some(Statement::Block(switch.cases.remove(0).body));
            }
            Some(Statement::Switch(switch))
        }
        Statement::ForLoop(for_loop) => {
            if let Expression::Literal(literal) = &for_loop.condition {
                if literal.as_bool() == Some(false) {
                    return if for_loop.pre.is_empty() {
                        None
                    } else {
                        // The init block still runs once; its scope is
                        // preserved by keeping it a block.
                        Some(Statement::Block(for_loop.pre))
                    };
                }
            }
            Some(Statement::ForLoop(for_loop))
        }
        other => Some(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::passes::tests::run_on_block;

    #[test]
    fn literal_true_if_is_inlined() {
        let output = run_on_block(&ControlFlowSimplifier, "{ if 1 { sstore(0, 1) } }");
        assert!(!output.contains("if"));
        assert!(output.contains("sstore(0, 1)"));
    }

    #[test]
    fn literal_false_if_is_dropped() {
        let output = run_on_block(&ControlFlowSimplifier, "{ if 0 { sstore(0, 1) } }");
        assert!(!output.contains("sstore"));
    }

    #[test]
    fn empty_if_with_droppable_condition_is_dropped() {
        let output = run_on_block(&ControlFlowSimplifier, "{ let x := 1 if lt(x, 2) { } }");
        assert!(!output.contains("if"));
    }

    #[test]
    fn empty_if_with_effectful_condition_stays() {
        let output = run_on_block(
            &ControlFlowSimplifier,
            "{ if call(gas(), 1, 2, 3, 4, 5, 6) { } }",
        );
        assert!(output.contains("if call("));
    }

    #[test]
    fn empty_if_with_read_only_condition_is_dropped() {
        let output = run_on_block(&ControlFlowSimplifier, "{ if mload(0) { } }");
        assert!(!output.contains("if"));
    }

    #[test]
    fn switch_over_literal_collapses() {
        let output = run_on_block(
            &ControlFlowSimplifier,
            "{ switch 1 case 0 { sstore(0, 0) } case 1 { sstore(0, 1) } default { sstore(0, 2) } }",
        );
        assert!(!output.contains("switch"));
        assert!(output.contains("sstore(0, 1)"));
        assert!(!output.contains("sstore(0, 0)"));
        assert!(!output.contains("sstore(0, 2)"));
    }

    #[test]
    fn default_only_switch_collapses() {
        let output = run_on_block(
            &ControlFlowSimplifier,
            "{ switch callvalue() default { sstore(0, 1) } }",
        );
        assert!(!output.contains("switch"));
        assert!(output.contains("sstore(0, 1)"));
    }

    #[test]
    fn dead_loop_keeps_its_init_block() {
        let output = run_on_block(
            &ControlFlowSimplifier,
            "{ for { sstore(0, 1) } 0 { } { sstore(0, 2) } }",
        );
        assert!(!output.contains("for"));
        assert!(output.contains("sstore(0, 1)"));
        assert!(!output.contains("sstore(0, 2)"));
    }
}
