use crate::ast::{Block, Expression, Identifier, Statement};
use crate::optimizer::context::strip_numeric_suffixes;
use crate::optimizer::OptimizerContext;
use std::collections::HashMap;

/// Undoes the cosmetic damage of disambiguation: renames `x_7` back to `x`
/// (or the lowest free suffix) wherever the shorter name is free. Names
/// must be globally unique when this runs, so a flat rename map is enough.
pub struct VarNameCleaner;

impl VarNameCleaner {
    pub fn run(ctx: &mut OptimizerContext, block: &mut Block) {
        let mut renames = HashMap::new();
        for name in declared_names(block) {
            let base = strip_numeric_suffixes(&name);
            if base == name {
                continue;
            }
            if let Some(cleaned) = lowest_free(ctx, base, &name) {
                ctx.dispenser.mark_used(&cleaned);
                renames.insert(name, cleaned);
            }
        }
        rename_in_block(block, &renames);
    }
}

/// `base`, `base_1`, `base_2`, ... up to (not including) `current`.
fn lowest_free(ctx: &OptimizerContext, base: &str, current: &str) -> Option<String> {
    if !ctx.dispenser.is_used(base) {
        return Some(base.to_string());
    }
    let mut index = 1usize;
    loop {
        let candidate = format!("{}_{}", base, index);
        if candidate == current {
            return None;
        }
        if !ctx.dispenser.is_used(&candidate) {
            return Some(candidate);
        }
        index += 1;
    }
}

fn declared_names(block: &Block) -> Vec<String> {
    let mut names = Vec::new();
    collect_declared(block, &mut names);
    names
}

fn collect_declared(block: &Block, names: &mut Vec<String>) {
    for statement in &block.statements {
        match statement {
            Statement::FunctionDefinition(function) => {
                names.push(function.name.as_str().to_string());
                for identifier in function.parameters.iter().chain(&function.returns) {
                    names.push(identifier.as_str().to_string());
                }
                collect_declared(&function.body, names);
            }
            Statement::VariableDeclaration(declaration) => {
                for variable in &declaration.variables {
                    names.push(variable.as_str().to_string());
                }
            }
            Statement::Block(inner) => collect_declared(inner, names),
            Statement::If(if_statement) => collect_declared(&if_statement.body, names),
            Statement::Switch(switch) => {
                for case in &switch.cases {
                    collect_declared(&case.body, names);
                }
            }
            Statement::ForLoop(for_loop) => {
                collect_declared(&for_loop.pre, names);
                collect_declared(&for_loop.post, names);
                collect_declared(&for_loop.body, names);
            }
            _ => {}
        }
    }
}

fn rename_identifier(identifier: &mut Identifier, renames: &HashMap<String, String>) {
    if let Some(renamed) = renames.get(identifier.as_str()) {
        *identifier = Identifier::new(renamed);
    }
}

fn rename_in_expression(expression: &mut Expression, renames: &HashMap<String, String>) {
    match expression {
        Expression::Literal(_) => {}
        Expression::Identifier(identifier) => rename_identifier(identifier, renames),
        Expression::FunctionCall(call) => {
            rename_identifier(&mut call.function, renames);
            for argument in &mut call.arguments {
                rename_in_expression(argument, renames);
            }
        }
    }
}

fn rename_in_block(block: &mut Block, renames: &HashMap<String, String>) {
    for statement in &mut block.statements {
        match statement {
            Statement::FunctionDefinition(function) => {
                rename_identifier(&mut function.name, renames);
                for identifier in function
                    .parameters
                    .iter_mut()
                    .chain(function.returns.iter_mut())
                {
                    rename_identifier(identifier, renames);
                }
                rename_in_block(&mut function.body, renames);
            }
            Statement::VariableDeclaration(declaration) => {
                for variable in &mut declaration.variables {
                    rename_identifier(variable, renames);
                }
                if let Some(value) = &mut declaration.value {
                    rename_in_expression(value, renames);
                }
            }
            Statement::Assignment(assignment) => {
                for target in &mut assignment.targets {
                    rename_identifier(target, renames);
                }
                rename_in_expression(&mut assignment.value, renames);
            }
            Statement::Expression(expression) => rename_in_expression(expression, renames),
            Statement::Block(inner) => rename_in_block(inner, renames),
            Statement::If(if_statement) => {
                rename_in_expression(&mut if_statement.condition, renames);
                rename_in_block(&mut if_statement.body, renames);
            }
            Statement::Switch(switch) => {
                rename_in_expression(&mut switch.expression, renames);
                for case in &mut switch.cases {
                    rename_in_block(&mut case.body, renames);
                }
            }
            Statement::ForLoop(for_loop) => {
                rename_in_block(&mut for_loop.pre, renames);
                rename_in_expression(&mut for_loop.condition, renames);
                rename_in_block(&mut for_loop.post, renames);
                rename_in_block(&mut for_loop.body, renames);
            }
            Statement::Break | Statement::Continue | Statement::Leave => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis;
    use crate::dialect::Dialect;
    use crate::optimizer::passes::tests::parse_block;
    use crate::printer::Printer;

    fn clean(source: &str) -> String {
        let dialect = Dialect::evm();
        let mut block = parse_block(source);
        analysis::analyze_block(&dialect, &block).expect("input should analyze");
        let mut ctx = OptimizerContext::for_block(&dialect, &block);
        VarNameCleaner::run(&mut ctx, &mut block);
        analysis::analyze_block(&dialect, &block).expect("output should analyze");
        Printer::print_block(&block)
    }

    #[test]
    fn suffixes_drop_when_the_base_is_free() {
        let output = clean("{ let x_2 := 1 sstore(0, x_2) }");
        assert!(output.contains("let x := 1"));
        assert!(output.contains("sstore(0, x)"));
    }

    #[test]
    fn taken_base_names_stay_taken() {
        let output = clean("{ let x := 1 { let x_2 := 2 sstore(x, x_2) } }");
        assert!(output.contains("let x_1 := 2"));
        assert!(output.contains("sstore(x, x_1)"));
    }

    #[test]
    fn builtin_names_are_never_claimed() {
        let output = clean("{ let pop_1 := 1 sstore(0, pop_1) }");
        assert!(output.contains("let pop_1 := 1"));
    }
}
