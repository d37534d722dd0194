use super::{statement_expressions_mut, visit_blocks_mut};
use crate::ast::{Block, Expression, Literal};
use crate::optimizer::{OptimizerContext, OptimizerStep};

/// Constant-folds pure builtins whose arguments are all literals.
/// Arithmetic is evaluated in u128; folds that would need the full 256-bit
/// width (overflow, `not`, negative wrap-around) are skipped rather than
/// miscomputed.
pub struct ExpressionSimplifier;

impl OptimizerStep for ExpressionSimplifier {
    fn name(&self) -> &'static str {
        "ExpressionSimplifier"
    }

    fn abbreviation(&self) -> char {
        's'
    }

    fn run(&self, ctx: &mut OptimizerContext, block: &mut Block) {
        let dialect = ctx.dialect;
        visit_blocks_mut(block, &mut |current| {
            for statement in &mut current.statements {
                for expression in statement_expressions_mut(statement) {
                    fold(dialect, expression);
                }
            }
        });
    }
}

fn fold(dialect: &crate::dialect::Dialect, expression: &mut Expression) {
    let Expression::FunctionCall(call) = expression else {
        return;
    };
    for argument in &mut call.arguments {
        fold(dialect, argument);
    }

    let Some(builtin) = dialect.builtin(call.function.as_str()) else {
        return;
    };
    if !builtin.is_movable() || builtin.returns != 1 || builtin.needs_literal_member {
        return;
    }

    let mut values = Vec::with_capacity(call.arguments.len());
    for argument in &call.arguments {
        match argument {
            Expression::Literal(literal) => match literal.as_u128() {
                Some(value) => values.push(value),
                None => return,
            },
            _ => return,
        }
    }

    if let Some(result) = evaluate(call.function.as_str(), &values) {
        *expression = Expression::Literal(Literal::from_u128(result));
    }
}

fn evaluate(name: &str, args: &[u128]) -> Option<u128> {
    let binary = |f: fn(u128, u128) -> Option<u128>| {
        if args.len() == 2 {
            f(args[0], args[1])
        } else {
            None
        }
    };
    match name {
        "add" => binary(u128::checked_add),
        "sub" => binary(u128::checked_sub),
        "mul" => binary(u128::checked_mul),
        "div" => binary(|a, b| Some(if b == 0 { 0 } else { a / b })),
        "mod" => binary(|a, b| Some(if b == 0 { 0 } else { a % b })),
        "lt" => binary(|a, b| Some((a < b) as u128)),
        "gt" => binary(|a, b| Some((a > b) as u128)),
        "eq" => binary(|a, b| Some((a == b) as u128)),
        "and" => binary(|a, b| Some(a & b)),
        "or" => binary(|a, b| Some(a | b)),
        "xor" => binary(|a, b| Some(a ^ b)),
        // EVM shifts take the shift amount first.
        "shl" => binary(|shift, value| {
            if shift >= 128 || value.leading_zeros() < shift as u32 {
                None
            } else {
                Some(value << shift)
            }
        }),
        "shr" => binary(|shift, value| Some(if shift >= 128 { 0 } else { value >> shift })),
        "iszero" => {
            if args.len() == 1 {
                Some((args[0] == 0) as u128)
            } else {
                None
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::passes::tests::run_on_block;

    #[test]
    fn folds_nested_arithmetic() {
        let output = run_on_block(&ExpressionSimplifier, "{ sstore(0, add(mul(2, 3), 4)) }");
        assert!(output.contains("sstore(0, 10)"));
    }

    #[test]
    fn division_by_zero_folds_to_zero() {
        let output = run_on_block(&ExpressionSimplifier, "{ sstore(0, div(7, 0)) }");
        assert!(output.contains("sstore(0, 0)"));
    }

    #[test]
    fn folds_hex_and_boolean_literals() {
        let output = run_on_block(&ExpressionSimplifier, "{ sstore(0, add(0x10, true)) }");
        assert!(output.contains("sstore(0, 17)"));
    }

    #[test]
    fn keeps_calls_with_variable_arguments() {
        let output = run_on_block(
            &ExpressionSimplifier,
            "{ let x := mload(0) sstore(0, add(x, 1)) }",
        );
        assert!(output.contains("add(x, 1)"));
    }

    #[test]
    fn overflow_is_not_folded() {
        let source = format!("{{ sstore(0, mul({}, 3)) }}", u128::MAX);
        let output = run_on_block(&ExpressionSimplifier, &source);
        assert!(output.contains("mul("));
    }
}
