use super::visit_blocks_mut;
use crate::ast::{Block, Expression, Literal, Statement, VariableDeclaration};
use crate::optimizer::{OptimizerContext, OptimizerStep};

/// Rewrites `let x, y` into `let x := 0` and `let y := 0` so every
/// variable carries an explicit initializer.
pub struct VarDeclInitializer;

impl OptimizerStep for VarDeclInitializer {
    fn name(&self) -> &'static str {
        "VarDeclInitializer"
    }

    fn abbreviation(&self) -> char {
        'd'
    }

    fn run(&self, _ctx: &mut OptimizerContext, block: &mut Block) {
        visit_blocks_mut(block, &mut |current| {
            let statements = std::mem::take(&mut current.statements);
            for statement in statements {
                match statement {
                    Statement::VariableDeclaration(declaration) if declaration.value.is_none() => {
                        for variable in declaration.variables {
                            current.statements.push(Statement::VariableDeclaration(
                                VariableDeclaration {
                                    variables: vec![variable],
                                    value: Some(Expression::Literal(Literal::zero())),
                                },
                            ));
                        }
                    }
                    other => current.statements.push(other),
                }
            }
        });
    }
}
