use super::visit_blocks_mut;
use crate::ast::{Block, Statement};
use crate::optimizer::{OptimizerContext, OptimizerStep};

/// Moves every function definition to the end of its block, keeping the
/// relative order within each group.
pub struct FunctionGrouper;

impl OptimizerStep for FunctionGrouper {
    fn name(&self) -> &'static str {
        "FunctionGrouper"
    }

    fn abbreviation(&self) -> char {
        'g'
    }

    fn run(&self, _ctx: &mut OptimizerContext, block: &mut Block) {
        visit_blocks_mut(block, &mut |current| {
            let (functions, mut rest): (Vec<_>, Vec<_>) = current
                .statements
                .drain(..)
                .partition(|s| matches!(s, Statement::FunctionDefinition(_)));
            rest.extend(functions);
            current.statements = rest;
        });
    }
}
