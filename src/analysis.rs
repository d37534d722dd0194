// Semantic analysis: scope-checked identifier resolution over an object's
// code. Runs after parsing and again after every optimizer step; a failure
// after a step means the step produced invalid IR.

use crate::ast::{
    Block, Case, Expression, FunctionCall, Identifier, Literal, Object, Statement,
};
use crate::dialect::Dialect;
use indexmap::IndexMap;
use log::debug;
use std::collections::HashSet;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AnalysisError {
    #[error("use of undeclared identifier `{0}`")]
    UndeclaredIdentifier(Identifier),

    #[error("identifier `{0}` is already declared")]
    Redeclaration(Identifier),

    #[error("identifier `{0}` shadows a builtin")]
    ReservedIdentifier(Identifier),

    #[error("`{0}` is not callable")]
    NotCallable(Identifier),

    #[error("function `{0}` used as a value")]
    FunctionUsedAsValue(Identifier),

    #[error("`{function}` expects {expected} arguments, got {actual}")]
    ArgumentCountMismatch {
        function: Identifier,
        expected: usize,
        actual: usize,
    },

    #[error("expression produces {actual} values, expected {expected}")]
    ValueCountMismatch { expected: usize, actual: usize },

    #[error("`break` outside of a for-loop body")]
    BreakOutsideLoop,

    #[error("`continue` outside of a for-loop body")]
    ContinueOutsideLoop,

    #[error("`leave` outside of a function")]
    LeaveOutsideFunction,

    #[error("cannot assign to function `{0}`")]
    AssignToFunction(Identifier),

    #[error("variable `{0}` is not accessible across a function boundary")]
    CrossFunctionAccess(Identifier),

    #[error("`{builtin}` needs a literal string naming an object member")]
    NonLiteralMemberArgument { builtin: Identifier },

    #[error("`{builtin}` references unknown object member \"{member}\"")]
    UnknownObjectMember { builtin: Identifier, member: String },

    #[error("duplicate switch case")]
    DuplicateCase,
}

#[derive(Debug, Clone)]
enum ScopeEntry {
    Variable,
    Function { parameters: usize, returns: usize },
}

struct Scope {
    entries: IndexMap<String, ScopeEntry>,
    /// Function bodies open a boundary scope: variables declared outside
    /// it are not visible inside.
    is_function_boundary: bool,
}

pub struct Analyzer<'a> {
    dialect: &'a Dialect,
    scopes: Vec<Scope>,
    member_names: HashSet<String>,
    loop_depth: usize,
    in_function: bool,
}

/// Analyzes an object and all its sub-objects, children first.
pub fn analyze_object(dialect: &Dialect, object: &Object) -> Result<(), AnalysisError> {
    for sub in object.sub_objects() {
        analyze_object(dialect, sub)?;
    }
    debug!("analyzing object \"{}\"", object.name);
    let members = object
        .member_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    Analyzer::new(dialect, members).analyze(&object.code)
}

/// Analyzes a bare code block with no object members in scope.
pub fn analyze_block(dialect: &Dialect, block: &Block) -> Result<(), AnalysisError> {
    Analyzer::new(dialect, HashSet::new()).analyze(block)
}

impl<'a> Analyzer<'a> {
    fn new(dialect: &'a Dialect, member_names: HashSet<String>) -> Self {
        Analyzer {
            dialect,
            scopes: Vec::new(),
            member_names,
            loop_depth: 0,
            in_function: false,
        }
    }

    fn analyze(mut self, block: &Block) -> Result<(), AnalysisError> {
        self.block(block)
    }

    fn block(&mut self, block: &Block) -> Result<(), AnalysisError> {
        self.enter_scope(false);
        self.register_functions(block)?;
        for statement in &block.statements {
            self.statement(statement)?;
        }
        self.exit_scope();
        Ok(())
    }

    /// Function definitions are visible in the whole enclosing block,
    /// including statements before the definition.
    fn register_functions(&mut self, block: &Block) -> Result<(), AnalysisError> {
        for statement in &block.statements {
            if let Statement::FunctionDefinition(function) = statement {
                self.declare(
                    &function.name,
                    ScopeEntry::Function {
                        parameters: function.parameters.len(),
                        returns: function.returns.len(),
                    },
                )?;
            }
        }
        Ok(())
    }

    fn statement(&mut self, statement: &Statement) -> Result<(), AnalysisError> {
        match statement {
            Statement::Block(block) => self.block(block),
            Statement::FunctionDefinition(function) => {
                let outer_loop_depth = std::mem::replace(&mut self.loop_depth, 0);
                let was_in_function = std::mem::replace(&mut self.in_function, true);

                self.enter_scope(true);
                for name in function.parameters.iter().chain(&function.returns) {
                    self.declare(name, ScopeEntry::Variable)?;
                }
                self.block(&function.body)?;
                self.exit_scope();

                self.loop_depth = outer_loop_depth;
                self.in_function = was_in_function;
                Ok(())
            }
            Statement::VariableDeclaration(declaration) => {
                if let Some(value) = &declaration.value {
                    self.expect_values(value, declaration.variables.len())?;
                }
                for variable in &declaration.variables {
                    self.declare(variable, ScopeEntry::Variable)?;
                }
                Ok(())
            }
            Statement::Assignment(assignment) => {
                for target in &assignment.targets {
                    match self.resolve(target)? {
                        ScopeEntry::Variable => {}
                        ScopeEntry::Function { .. } => {
                            return Err(AnalysisError::AssignToFunction(target.clone()))
                        }
                    }
                }
                self.expect_values(&assignment.value, assignment.targets.len())
            }
            Statement::Expression(expression) => self.expect_values(expression, 0),
            Statement::If(if_statement) => {
                self.expect_values(&if_statement.condition, 1)?;
                self.block(&if_statement.body)
            }
            Statement::Switch(switch) => self.switch(switch),
            Statement::ForLoop(for_loop) => {
                // The init block's declarations stay in scope for the
                // condition, post and body.
                self.enter_scope(false);
                self.register_functions(&for_loop.pre)?;
                for statement in &for_loop.pre.statements {
                    self.statement(statement)?;
                }
                self.expect_values(&for_loop.condition, 1)?;
                self.loop_depth += 1;
                self.block(&for_loop.body)?;
                self.loop_depth -= 1;
                self.block(&for_loop.post)?;
                self.exit_scope();
                Ok(())
            }
            Statement::Break => {
                if self.loop_depth == 0 {
                    return Err(AnalysisError::BreakOutsideLoop);
                }
                Ok(())
            }
            Statement::Continue => {
                if self.loop_depth == 0 {
                    return Err(AnalysisError::ContinueOutsideLoop);
                }
                Ok(())
            }
            Statement::Leave => {
                if !self.in_function {
                    return Err(AnalysisError::LeaveOutsideFunction);
                }
                Ok(())
            }
        }
    }

    fn switch(&mut self, switch: &crate::ast::Switch) -> Result<(), AnalysisError> {
        self.expect_values(&switch.expression, 1)?;
        let mut seen = Vec::new();
        for case in &switch.cases {
            self.case(case, &mut seen)?;
        }
        Ok(())
    }

    fn case(&mut self, case: &Case, seen: &mut Vec<Literal>) -> Result<(), AnalysisError> {
        if let Some(value) = &case.value {
            let duplicate = seen.iter().any(|other| {
                match (value.as_u128(), other.as_u128()) {
                    (Some(a), Some(b)) => a == b,
                    _ => value == other,
                }
            });
            if duplicate {
                return Err(AnalysisError::DuplicateCase);
            }
            seen.push(value.clone());
        }
        self.block(&case.body)
    }

    /// Checks the expression and the number of values it produces.
    fn expect_values(
        &mut self,
        expression: &Expression,
        expected: usize,
    ) -> Result<(), AnalysisError> {
        let actual = self.expression(expression)?;
        if actual != expected {
            return Err(AnalysisError::ValueCountMismatch { expected, actual });
        }
        Ok(())
    }

    fn expression(&mut self, expression: &Expression) -> Result<usize, AnalysisError> {
        match expression {
            Expression::Literal(_) => Ok(1),
            Expression::Identifier(identifier) => match self.resolve(identifier)? {
                ScopeEntry::Variable => Ok(1),
                ScopeEntry::Function { .. } => {
                    Err(AnalysisError::FunctionUsedAsValue(identifier.clone()))
                }
            },
            Expression::FunctionCall(call) => self.function_call(call),
        }
    }

    fn function_call(&mut self, call: &FunctionCall) -> Result<usize, AnalysisError> {
        if let Some(builtin) = self.dialect.builtin(call.function.as_str()) {
            if call.arguments.len() != builtin.parameters {
                return Err(AnalysisError::ArgumentCountMismatch {
                    function: call.function.clone(),
                    expected: builtin.parameters,
                    actual: call.arguments.len(),
                });
            }
            if builtin.needs_literal_member {
                self.check_member_argument(call)?;
                return Ok(builtin.returns);
            }
            for argument in &call.arguments {
                self.expect_values(argument, 1)?;
            }
            return Ok(builtin.returns);
        }

        match self.resolve(&call.function)? {
            ScopeEntry::Variable => Err(AnalysisError::NotCallable(call.function.clone())),
            ScopeEntry::Function {
                parameters,
                returns,
            } => {
                if call.arguments.len() != parameters {
                    return Err(AnalysisError::ArgumentCountMismatch {
                        function: call.function.clone(),
                        expected: parameters,
                        actual: call.arguments.len(),
                    });
                }
                for argument in &call.arguments {
                    self.expect_values(argument, 1)?;
                }
                Ok(returns)
            }
        }
    }

    /// `datasize("name")` / `dataoffset("name")`: the argument must be a
    /// literal string naming a member of the current object.
    fn check_member_argument(&self, call: &FunctionCall) -> Result<(), AnalysisError> {
        match call.arguments.first() {
            Some(Expression::Literal(Literal::Str(member))) => {
                if !self.member_names.contains(member) {
                    return Err(AnalysisError::UnknownObjectMember {
                        builtin: call.function.clone(),
                        member: member.clone(),
                    });
                }
                Ok(())
            }
            _ => Err(AnalysisError::NonLiteralMemberArgument {
                builtin: call.function.clone(),
            }),
        }
    }

    fn enter_scope(&mut self, is_function_boundary: bool) {
        self.scopes.push(Scope {
            entries: IndexMap::new(),
            is_function_boundary,
        });
    }

    fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Identifier, entry: ScopeEntry) -> Result<(), AnalysisError> {
        if self.dialect.is_reserved(name.as_str()) {
            return Err(AnalysisError::ReservedIdentifier(name.clone()));
        }
        // Shadowing is not allowed anywhere in the visible scope chain.
        for scope in &self.scopes {
            if scope.entries.contains_key(name.as_str()) {
                return Err(AnalysisError::Redeclaration(name.clone()));
            }
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.entries.insert(name.as_str().to_string(), entry);
        }
        Ok(())
    }

    fn resolve(&self, name: &Identifier) -> Result<ScopeEntry, AnalysisError> {
        let mut crossed_boundary = false;
        for scope in self.scopes.iter().rev() {
            if let Some(entry) = scope.entries.get(name.as_str()) {
                if crossed_boundary && matches!(entry, ScopeEntry::Variable) {
                    return Err(AnalysisError::CrossFunctionAccess(name.clone()));
                }
                return Ok(entry.clone());
            }
            if scope.is_function_boundary {
                crossed_boundary = true;
            }
        }
        Err(AnalysisError::UndeclaredIdentifier(name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn analyze_source(source: &str) -> Result<(), AnalysisError> {
        let dialect = Dialect::evm();
        match parser::parse(source).unwrap() {
            crate::ast::ParsedInput::Object(object) => analyze_object(&dialect, &object),
            crate::ast::ParsedInput::Block(block) => analyze_block(&dialect, &block),
        }
    }

    #[test]
    fn accepts_valid_code() {
        analyze_source(
            "{ let x := 1 function f(a) -> r { r := add(a, 1) } x := f(x) sstore(0, x) }",
        )
        .unwrap();
    }

    #[test]
    fn rejects_undeclared_identifier() {
        assert_eq!(
            analyze_source("{ sstore(0, y) }"),
            Err(AnalysisError::UndeclaredIdentifier(Identifier::new("y")))
        );
    }

    #[test]
    fn rejects_shadowing() {
        assert!(matches!(
            analyze_source("{ let x := 1 { let x := 2 sstore(0, x) } sstore(1, x) }"),
            Err(AnalysisError::Redeclaration(_))
        ));
    }

    #[test]
    fn functions_are_visible_before_their_definition() {
        analyze_source("{ let x := f() function f() -> r { r := 1 } sstore(0, x) }").unwrap();
    }

    #[test]
    fn rejects_cross_function_variable_access() {
        assert!(matches!(
            analyze_source("{ let x := 1 function f() { sstore(0, x) } f() }"),
            Err(AnalysisError::CrossFunctionAccess(_))
        ));
    }

    #[test]
    fn rejects_break_outside_loop() {
        assert_eq!(
            analyze_source("{ break }"),
            Err(AnalysisError::BreakOutsideLoop)
        );
    }

    #[test]
    fn rejects_leave_outside_function() {
        assert_eq!(
            analyze_source("{ leave }"),
            Err(AnalysisError::LeaveOutsideFunction)
        );
    }

    #[test]
    fn rejects_wrong_builtin_arity() {
        assert!(matches!(
            analyze_source("{ sstore(0) }"),
            Err(AnalysisError::ArgumentCountMismatch { .. })
        ));
    }

    #[test]
    fn rejects_value_dropped_on_the_floor() {
        assert_eq!(
            analyze_source("{ add(1, 2) }"),
            Err(AnalysisError::ValueCountMismatch {
                expected: 0,
                actual: 1
            })
        );
    }

    #[test]
    fn checks_object_member_references() {
        analyze_source(
            r#"object "a" { code { let s := datasize("b") sstore(0, s) } object "b" { code { } } }"#,
        )
        .unwrap();
        assert!(matches!(
            analyze_source(r#"object "a" { code { let s := datasize("missing") sstore(0, s) } }"#),
            Err(AnalysisError::UnknownObjectMember { .. })
        ));
    }

    #[test]
    fn loop_init_declarations_reach_the_condition() {
        analyze_source("{ for { let i := 0 } lt(i, 10) { i := add(i, 1) } { } }").unwrap();
    }

    #[test]
    fn rejects_duplicate_switch_cases() {
        assert_eq!(
            analyze_source("{ switch caller() case 1 { } case 0x1 { } default { } }"),
            Err(AnalysisError::DuplicateCase)
        );
    }
}
