use crate::ast::{Block, Expression, Identifier, Statement};
use crate::optimizer::OptimizerContext;
use std::collections::{HashMap, HashSet};

/// Alpha-renames the program so every declared name is unique across the
/// whole input. The first occurrence of a name keeps it; every later
/// declaration of the same name gets a fresh one from the dispenser. All
/// the steps assume they run on disambiguated code.
pub struct Disambiguator;

impl Disambiguator {
    pub fn run(ctx: &mut OptimizerContext, block: &mut Block) {
        let mut state = State {
            seen: HashSet::new(),
            scopes: Vec::new(),
        };
        state.walk_block(ctx, block);
    }
}

struct State {
    seen: HashSet<String>,
    scopes: Vec<HashMap<String, String>>,
}

impl State {
    fn walk_block(&mut self, ctx: &mut OptimizerContext, block: &mut Block) {
        self.scopes.push(HashMap::new());
        // Function names are visible in the whole block, rename them before
        // walking any statement so earlier calls pick up the new name.
        for statement in &mut block.statements {
            if let Statement::FunctionDefinition(function) = statement {
                self.declare(ctx, &mut function.name);
            }
        }
        for statement in &mut block.statements {
            self.walk_statement(ctx, statement);
        }
        self.scopes.pop();
    }

    fn walk_statement(&mut self, ctx: &mut OptimizerContext, statement: &mut Statement) {
        match statement {
            Statement::FunctionDefinition(function) => {
                self.scopes.push(HashMap::new());
                for parameter in function
                    .parameters
                    .iter_mut()
                    .chain(function.returns.iter_mut())
                {
                    self.declare(ctx, parameter);
                }
                self.walk_block(ctx, &mut function.body);
                self.scopes.pop();
            }
            Statement::VariableDeclaration(declaration) => {
                if let Some(value) = &mut declaration.value {
                    self.walk_expression(value);
                }
                for variable in &mut declaration.variables {
                    self.declare(ctx, variable);
                }
            }
            Statement::Assignment(assignment) => {
                self.walk_expression(&mut assignment.value);
                for target in &mut assignment.targets {
                    self.resolve(target);
                }
            }
            Statement::Expression(expression) => self.walk_expression(expression),
            Statement::Block(inner) => self.walk_block(ctx, inner),
            Statement::If(if_statement) => {
                self.walk_expression(&mut if_statement.condition);
                self.walk_block(ctx, &mut if_statement.body);
            }
            Statement::Switch(switch) => {
                self.walk_expression(&mut switch.expression);
                for case in &mut switch.cases {
                    self.walk_block(ctx, &mut case.body);
                }
            }
            Statement::ForLoop(for_loop) => {
                // Names declared in the init block stay visible in the
                // condition, the post block and the body.
                self.scopes.push(HashMap::new());
                for statement in &mut for_loop.pre.statements {
                    self.walk_statement(ctx, statement);
                }
                self.walk_expression(&mut for_loop.condition);
                self.walk_block(ctx, &mut for_loop.post);
                self.walk_block(ctx, &mut for_loop.body);
                self.scopes.pop();
            }
            Statement::Break | Statement::Continue | Statement::Leave => {}
        }
    }

    fn walk_expression(&mut self, expression: &mut Expression) {
        match expression {
            Expression::Literal(_) => {}
            Expression::Identifier(identifier) => self.resolve(identifier),
            Expression::FunctionCall(call) => {
                self.resolve(&mut call.function);
                for argument in &mut call.arguments {
                    self.walk_expression(argument);
                }
            }
        }
    }

    fn declare(&mut self, ctx: &mut OptimizerContext, identifier: &mut Identifier) {
        let old = identifier.as_str().to_string();
        if self.seen.contains(&old) {
            let fresh = ctx.dispenser.fresh(&old);
            self.seen.insert(fresh.as_str().to_string());
            if let Some(scope) = self.scopes.last_mut() {
                scope.insert(old, fresh.as_str().to_string());
            }
            *identifier = fresh;
        } else {
            self.seen.insert(old);
        }
    }

    fn resolve(&mut self, identifier: &mut Identifier) {
        for scope in self.scopes.iter().rev() {
            if let Some(renamed) = scope.get(identifier.as_str()) {
                *identifier = Identifier::new(renamed);
                return;
            }
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

    fn disambiguate(source: &str) -> String {
        let dialect = Dialect::evm();
        let mut block = parse_block(source);
        analysis::analyze_block(&dialect, &block).expect("input should analyze");
        let mut ctx = OptimizerContext::for_block(&dialect, &block);
        Disambiguator::run(&mut ctx, &mut block);
        analysis::analyze_block(&dialect, &block).expect("output should analyze");
        Printer::print_block(&block)
    }

    #[test]
    fn sibling_scopes_get_distinct_names() {
        let output = disambiguate("{ { let x := 1 sstore(0, x) } { let x := 2 sstore(1, x) } }");
        assert!(output.contains("let x := 1"));
        assert!(output.contains("let x_1 := 2"));
        assert!(output.contains("sstore(1, x_1)"));
    }

    #[test]
    fn function_locals_are_renamed_per_function() {
        let output = disambiguate(
            "{ function f() -> r { let t := 1 r := t } function g() -> r { let t := 2 r := t } sstore(f(), g()) }",
        );
        assert!(output.contains("-> r {"));
        assert!(output.contains("-> r_1 {"));
        assert!(output.contains("let t_1 := 2"));
    }

    #[test]
    fn unique_inputs_are_untouched() {
        let source = "{ let a := 1 let b := 2 sstore(a, b) }";
        let output = disambiguate(source);
        assert!(output.contains("let a := 1"));
        assert!(output.contains("let b := 2"));
        assert!(!output.contains("a_1"));
    }
}
