use super::child_blocks_mut;
use crate::ast::{Block, Statement};
use crate::optimizer::{OptimizerContext, OptimizerStep};

/// Lifts function definitions out of nested blocks (including other
/// function bodies) into the outermost block. Requires disambiguated
/// input; hoisting is sound because functions cannot capture variables.
pub struct FunctionHoister;

impl OptimizerStep for FunctionHoister {
    fn name(&self) -> &'static str {
        "FunctionHoister"
    }

    fn abbreviation(&self) -> char {
        'h'
    }

    fn run(&self, _ctx: &mut OptimizerContext, block: &mut Block) {
        let mut hoisted = Vec::new();
        for statement in &mut block.statements {
            extract_from_statement(statement, &mut hoisted);
        }
        block.statements.extend(hoisted);
    }
}

fn extract_from_statement(statement: &mut Statement, hoisted: &mut Vec<Statement>) {
    for child in child_blocks_mut(statement) {
        extract_from_block(child, hoisted);
    }
}

fn extract_from_block(block: &mut Block, hoisted: &mut Vec<Statement>) {
    for statement in &mut block.statements {
        extract_from_statement(statement, hoisted);
    }
    let statements = std::mem::take(&mut block.statements);
    for statement in statements {
        if matches!(statement, Statement::FunctionDefinition(_)) {
            hoisted.push(statement);
        } else {
            block.statements.push(statement);
        }
    }
}
