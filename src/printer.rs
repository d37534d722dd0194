// Deterministic pretty-printer: prints an object tree or a bare block back
// to source the parser accepts, with stable formatting.

use crate::ast::{
    Block, Case, DataValue, Expression, Literal, Object, ObjectMember, Statement,
};
use itertools::Itertools;

const INDENT: &str = "    ";

pub struct Printer {
    output: String,
    depth: usize,
}

impl Printer {
    pub fn new() -> Self {
        Printer {
            output: String::new(),
            depth: 0,
        }
    }

    pub fn print_object(object: &Object) -> String {
        let mut printer = Printer::new();
        printer.object(object);
        printer.output
    }

    pub fn print_block(block: &Block) -> String {
        let mut printer = Printer::new();
        printer.block(block);
        printer.output
    }

    fn object(&mut self, object: &Object) {
        self.line(&format!("object {} {{", quote(&object.name)));
        self.depth += 1;
        self.indent();
        self.output.push_str("code ");
        self.block(&object.code);
        self.output.push('\n');
        for member in &object.members {
            match member {
                ObjectMember::Object(sub) => self.object(sub),
                ObjectMember::Data { name, value } => {
                    let payload = match value {
                        DataValue::Hex(digits) => format!("hex\"{}\"", digits),
                        DataValue::Str(text) => quote(text),
                    };
                    self.line(&format!("data {} {}", quote(name), payload));
                }
            }
        }
        self.depth -= 1;
        self.line("}");
    }

    fn block(&mut self, block: &Block) {
        if block.statements.is_empty() {
            self.output.push_str("{ }");
            return;
        }
        self.output.push_str("{\n");
        self.depth += 1;
        for statement in &block.statements {
            self.indent();
            self.statement(statement);
            self.output.push('\n');
        }
        self.depth -= 1;
        self.indent();
        self.output.push('}');
    }

    fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Block(block) => self.block(block),
            Statement::FunctionDefinition(function) => {
                self.output.push_str(&format!(
                    "function {}({})",
                    function.name,
                    function.parameters.iter().join(", ")
                ));
                if !function.returns.is_empty() {
                    self.output
                        .push_str(&format!(" -> {}", function.returns.iter().join(", ")));
                }
                self.output.push(' ');
                self.block(&function.body);
            }
            Statement::VariableDeclaration(declaration) => {
                self.output
                    .push_str(&format!("let {}", declaration.variables.iter().join(", ")));
                if let Some(value) = &declaration.value {
                    self.output.push_str(" := ");
                    self.expression(value);
                }
            }
            Statement::Assignment(assignment) => {
                self.output
                    .push_str(&format!("{} := ", assignment.targets.iter().join(", ")));
                self.expression(&assignment.value);
            }
            Statement::Expression(expression) => self.expression(expression),
            Statement::If(if_statement) => {
                self.output.push_str("if ");
                self.expression(&if_statement.condition);
                self.output.push(' ');
                self.block(&if_statement.body);
            }
            Statement::Switch(switch) => {
                self.output.push_str("switch ");
                self.expression(&switch.expression);
                for case in &switch.cases {
                    self.output.push('\n');
                    self.indent();
                    self.case(case);
                }
            }
            Statement::ForLoop(for_loop) => {
                self.output.push_str("for ");
                self.block(&for_loop.pre);
                self.output.push(' ');
                self.expression(&for_loop.condition);
                self.output.push(' ');
                self.block(&for_loop.post);
                self.output.push(' ');
                self.block(&for_loop.body);
            }
            Statement::Break => self.output.push_str("break"),
            Statement::Continue => self.output.push_str("continue"),
            Statement::Leave => self.output.push_str("leave"),
        }
    }

    fn case(&mut self, case: &Case) {
        match &case.value {
            Some(literal) => {
                self.output.push_str("case ");
                self.literal(literal);
                self.output.push(' ');
            }
            None => self.output.push_str("default "),
        }
        self.block(&case.body);
    }

    fn expression(&mut self, expression: &Expression) {
        match expression {
            Expression::Literal(literal) => self.literal(literal),
            Expression::Identifier(identifier) => self.output.push_str(identifier.as_str()),
            Expression::FunctionCall(call) => {
                self.output.push_str(call.function.as_str());
                self.output.push('(');
                for (i, argument) in call.arguments.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    self.expression(argument);
                }
                self.output.push(')');
            }
        }
    }

    fn literal(&mut self, literal: &Literal) {
        match literal {
            Literal::Number(text) => self.output.push_str(text),
            Literal::Boolean(true) => self.output.push_str("true"),
            Literal::Boolean(false) => self.output.push_str("false"),
            Literal::Str(text) => self.output.push_str(&quote(text)),
        }
    }

    fn line(&mut self, text: &str) {
        self.indent();
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.output.push_str(INDENT);
        }
    }
}

impl Default for Printer {
    fn default() -> Self {
        Printer::new()
    }
}

fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
