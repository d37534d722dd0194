//! Yul intermediate-representation playground: a parser, static analyzer,
//! printer and a suite of optimizer steps that can be applied one at a
//! time to watch how the program changes.
//!
//! The `yulopt` binary drives these pieces interactively; the library
//! exposes them for programmatic use and for the tests.

pub mod analysis;
pub mod ast;
pub mod dialect;
pub mod error_reporting;
pub mod optimizer;
pub mod parser;
pub mod printer;

#[cfg(test)]
mod tests;

pub use analysis::AnalysisError;
pub use ast::{Block, Expression, Identifier, Literal, Object, ParsedInput, Statement};
pub use dialect::Dialect;
pub use optimizer::{
    Disambiguator, OptimizerContext, OptimizerError, OptimizerStep, OptimizerSuite,
    StackCompressor, VarNameCleaner,
};
pub use parser::YulParseError;
pub use printer::Printer;
