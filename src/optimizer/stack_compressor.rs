use crate::ast::{Block, Statement};
use crate::optimizer::passes::literal_rematerialiser::LiteralRematerialiser;
use crate::optimizer::passes::unused_pruner::UnusedPruner;
use crate::optimizer::{OptimizerContext, OptimizerStep};

/// Heuristic reaction to stack pressure: while any function (or the top
/// level) holds more locals than the EVM can reach with swap/dup,
/// rematerialise literal bindings and prune what that leaves unused.
pub struct StackCompressor;

/// swap16/dup16 depth.
const MAX_REACHABLE_LOCALS: usize = 16;
const MAX_ROUNDS: usize = 4;

impl StackCompressor {
    pub fn run(ctx: &mut OptimizerContext, block: &mut Block) {
        for _ in 0..MAX_ROUNDS {
            if max_locals(block) <= MAX_REACHABLE_LOCALS {
                break;
            }
            LiteralRematerialiser.run(ctx, block);
            UnusedPruner.run(ctx, block);
        }
    }
}

/// Largest number of locals live in any one function, counting parameters
/// and returns. Nested functions count separately.
fn max_locals(block: &Block) -> usize {
    let mut worst = locals_in_block(block);
    visit_function_bodies(block, &mut |function| {
        let in_function = function.parameters.len()
            + function.returns.len()
            + locals_in_block(&function.body);
        worst = worst.max(in_function);
    });
    worst
}

fn visit_function_bodies(block: &Block, f: &mut impl FnMut(&crate::ast::FunctionDefinition)) {
    for statement in &block.statements {
        match statement {
            Statement::FunctionDefinition(function) => {
                f(function);
                visit_function_bodies(&function.body, f);
            }
            Statement::Block(inner) => visit_function_bodies(inner, f),
            Statement::If(if_statement) => visit_function_bodies(&if_statement.body, f),
            Statement::Switch(switch) => {
                for case in &switch.cases {
                    visit_function_bodies(&case.body, f);
                }
            }
            Statement::ForLoop(for_loop) => {
                visit_function_bodies(&for_loop.pre, f);
                visit_function_bodies(&for_loop.post, f);
                visit_function_bodies(&for_loop.body, f);
            }
            _ => {}
        }
    }
}

fn locals_in_block(block: &Block) -> usize {
    let mut count = 0;
    for statement in &block.statements {
        match statement {
            Statement::VariableDeclaration(declaration) => count += declaration.variables.len(),
            Statement::Block(inner) => count += locals_in_block(inner),
            Statement::If(if_statement) => count += locals_in_block(&if_statement.body),
            Statement::Switch(switch) => {
                count += switch
                    .cases
                    .iter()
                    .map(|case| locals_in_block(&case.body))
                    .max()
                    .unwrap_or(0);
            }
            Statement::ForLoop(for_loop) => {
                count += locals_in_block(&for_loop.pre)
                    + locals_in_block(&for_loop.post)
                    + locals_in_block(&for_loop.body);
            }
            Statement::FunctionDefinition(_) => {}
            _ => {}
        }
    }
    count
}
