// Optimizer step suite: named steps selected by a single-character
// abbreviation, plus the disambiguator, name cleaner and stack compressor
// that frame them.

pub mod context;
pub mod disambiguator;
pub mod name_cleaner;
pub mod passes;
pub mod stack_compressor;

pub use context::{NameDispenser, OptimizerContext};
pub use disambiguator::Disambiguator;
pub use name_cleaner::VarNameCleaner;
pub use stack_compressor::StackCompressor;

use crate::ast::Block;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use log::debug;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum OptimizerError {
    #[error("unknown optimizer step abbreviation `{0}`")]
    UnknownStep(char),
}

/// A single optimizer step. Steps assume disambiguated input: every
/// identifier in the block is unique.
pub trait OptimizerStep: Send + Sync {
    /// Human-readable step name shown in the banner.
    fn name(&self) -> &'static str;

    /// Single-character abbreviation selecting this step.
    fn abbreviation(&self) -> char;

    /// Runs the step over one code block, rewriting it in place.
    fn run(&self, ctx: &mut OptimizerContext, block: &mut Block);
}

fn all_steps() -> Vec<Box<dyn OptimizerStep>> {
    vec![
        Box::new(passes::block_flattener::BlockFlattener),
        Box::new(passes::control_flow_simplifier::ControlFlowSimplifier),
        Box::new(passes::dead_code_eliminator::DeadCodeEliminator),
        Box::new(passes::expression_joiner::ExpressionJoiner),
        Box::new(passes::expression_simplifier::ExpressionSimplifier),
        Box::new(passes::expression_splitter::ExpressionSplitter),
        Box::new(passes::for_loop_init_rewriter::ForLoopInitRewriter),
        Box::new(passes::function_grouper::FunctionGrouper),
        Box::new(passes::function_hoister::FunctionHoister),
        Box::new(passes::literal_rematerialiser::LiteralRematerialiser),
        Box::new(passes::redundant_assign_eliminator::RedundantAssignEliminator),
        Box::new(passes::unused_pruner::UnusedPruner),
        Box::new(passes::var_decl_initializer::VarDeclInitializer),
    ]
}

lazy_static! {
    static ref STEPS: Vec<Box<dyn OptimizerStep>> = all_steps();
}

pub struct OptimizerSuite;

impl OptimizerSuite {
    /// Abbreviation -> step name, in registration order.
    pub fn step_abbreviation_to_name_map() -> IndexMap<char, &'static str> {
        STEPS
            .iter()
            .map(|step| (step.abbreviation(), step.name()))
            .collect()
    }

    /// Applies a sequence of steps, one character per step, left to right.
    /// Whitespace in the sequence is ignored.
    pub fn run_sequence(
        ctx: &mut OptimizerContext,
        sequence: &str,
        block: &mut Block,
    ) -> Result<(), OptimizerError> {
        for abbreviation in sequence.chars() {
            if abbreviation.is_ascii_whitespace() {
                continue;
            }
            let step = STEPS
                .iter()
                .find(|step| step.abbreviation() == abbreviation)
                .ok_or(OptimizerError::UnknownStep(abbreviation))?;
            debug!("running optimizer step {}", step.name());
            step.run(ctx, block);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn abbreviations_are_unique() {
        let mut seen = HashSet::new();
        for step in STEPS.iter() {
            assert!(
                seen.insert(step.abbreviation()),
                "duplicate abbreviation `{}`",
                step.abbreviation()
            );
        }
    }

    #[test]
    fn unknown_abbreviation_is_an_error() {
        let dialect = crate::dialect::Dialect::evm();
        let mut block = crate::ast::Block::default();
        let mut ctx = OptimizerContext::for_block(&dialect, &block);
        assert_eq!(
            OptimizerSuite::run_sequence(&mut ctx, "?", &mut block),
            Err(OptimizerError::UnknownStep('?'))
        );
    }

    #[test]
    fn whitespace_in_sequence_is_ignored() {
        let dialect = crate::dialect::Dialect::evm();
        let mut block = crate::ast::Block::default();
        let mut ctx = OptimizerContext::for_block(&dialect, &block);
        OptimizerSuite::run_sequence(&mut ctx, " f u ", &mut block).unwrap();
    }
}
