// Integration tests spanning the parser, analyzer, printer and optimizer.

pub mod grammar_tests;
pub mod optimizer_tests;
