use super::{collect_assigned, count_references, expression_is_droppable, visit_blocks_mut};
use crate::ast::{Block, Statement};
use std::collections::HashSet;
use crate::optimizer::{OptimizerContext, OptimizerStep};

/// Deletes declarations of variables that are never read (when dropping
/// the initializer is sound) and function definitions that are never
/// called. Runs to a fixed point: removing one user can make the next
/// candidate unused.
pub struct UnusedPruner;

const MAX_ROUNDS: usize = 64;

impl OptimizerStep for UnusedPruner {
    fn name(&self) -> &'static str {
        "UnusedPruner"
    }

    fn abbreviation(&self) -> char {
        'u'
    }

    fn run(&self, ctx: &mut OptimizerContext, block: &mut Block) {
        for _ in 0..MAX_ROUNDS {
            if !prune_once(ctx, block) {
                break;
            }
        }
    }
}

fn prune_once(ctx: &mut OptimizerContext, block: &mut Block) -> bool {
    let counts = count_references(block);
    let mut assigned = HashSet::new();
    for statement in &block.statements {
        collect_assigned(statement, &mut assigned);
    }
    let dialect = ctx.dialect;
    let mut changed = false;

    visit_blocks_mut(block, &mut |current| {
        let statements = std::mem::take(&mut current.statements);
        for statement in statements {
            let unused = match &statement {
                Statement::FunctionDefinition(function) => {
                    counts.get(function.name.as_str()).copied().unwrap_or(0) == 0
                }
                Statement::VariableDeclaration(declaration) => {
                    declaration.variables.iter().all(|v| {
                        counts.get(v.as_str()).copied().unwrap_or(0) == 0
                            && !assigned.contains(v.as_str())
                    }) && declaration
                        .value
                        .as_ref()
                        .map_or(true, |value| expression_is_droppable(dialect, value))
                }
                _ => false,
            };
            if unused {
                changed = true;
            } else {
                current.statements.push(statement);
            }
        }
    });

    changed
}
