// AST for the Yul-style assembly IR
// Object tree, statements and expressions produced by the parser and
// rewritten in place by the optimizer steps.

use std::fmt;

// --- Identifier, Literal ---

#[derive(Debug, PartialEq, Clone, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(s: &str) -> Self {
        Identifier(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, PartialEq, Clone, Eq, Hash)]
pub enum Literal {
    /// Decimal or hex number, kept verbatim as written.
    Number(String),
    /// `"..."` string literal, unescaped content.
    Str(String),
    Boolean(bool),
}

impl Literal {
    pub fn zero() -> Self {
        Literal::Number("0".to_string())
    }

    /// Numeric value when it fits a u128. Booleans count as 0/1.
    pub fn as_u128(&self) -> Option<u128> {
        match self {
            Literal::Number(text) => {
                if let Some(hex) = text.strip_prefix("0x") {
                    u128::from_str_radix(hex, 16).ok()
                } else {
                    text.parse().ok()
                }
            }
            Literal::Boolean(b) => Some(*b as u128),
            Literal::Str(_) => None,
        }
    }

    pub fn from_u128(value: u128) -> Self {
        Literal::Number(value.to_string())
    }

    /// Truthiness for control-flow simplification. `None` for strings.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Literal::Boolean(b) => Some(*b),
            Literal::Number(_) => self.as_u128().map(|v| v != 0),
            Literal::Str(_) => None,
        }
    }
}

// --- Expressions ---

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Literal(Literal),
    Identifier(Identifier),
    FunctionCall(FunctionCall),
}

impl Expression {
    /// Literals and plain identifiers need no splitting and can be
    /// duplicated or dropped freely.
    pub fn is_trivial(&self) -> bool {
        matches!(self, Expression::Literal(_) | Expression::Identifier(_))
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct FunctionCall {
    pub function: Identifier,
    pub arguments: Vec<Expression>,
}

// --- Statements ---

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    Block(Block),
    FunctionDefinition(FunctionDefinition),
    VariableDeclaration(VariableDeclaration),
    Assignment(Assignment),
    Expression(Expression),
    If(If),
    Switch(Switch),
    ForLoop(ForLoop),
    Break,
    Continue,
    Leave,
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

impl Block {
    pub fn new(statements: Vec<Statement>) -> Self {
        Block { statements }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct FunctionDefinition {
    pub name: Identifier,
    pub parameters: Vec<Identifier>,
    pub returns: Vec<Identifier>,
    pub body: Block,
}

#[derive(Debug, PartialEq, Clone)]
pub struct VariableDeclaration {
    pub variables: Vec<Identifier>,
    /// `let x` without initializer leaves this `None`.
    pub value: Option<Expression>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Assignment {
    pub targets: Vec<Identifier>,
    pub value: Expression,
}

#[derive(Debug, PartialEq, Clone)]
pub struct If {
    pub condition: Expression,
    pub body: Block,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Switch {
    pub expression: Expression,
    pub cases: Vec<Case>,
}

/// `case <literal> { ... }`, or `default { ... }` when `value` is `None`.
#[derive(Debug, PartialEq, Clone)]
pub struct Case {
    pub value: Option<Literal>,
    pub body: Block,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ForLoop {
    pub pre: Block,
    pub condition: Expression,
    pub post: Block,
    pub body: Block,
}

// --- Object tree ---

/// A named assembly object: a code block plus nested sub-objects and data
/// segments.
#[derive(Debug, PartialEq, Clone)]
pub struct Object {
    pub name: String,
    pub code: Block,
    pub members: Vec<ObjectMember>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum ObjectMember {
    Object(Object),
    Data { name: String, value: DataValue },
}

#[derive(Debug, PartialEq, Clone)]
pub enum DataValue {
    /// `hex"..."`, raw hex digits without the quotes.
    Hex(String),
    /// `"..."`, unescaped content.
    Str(String),
}

impl Object {
    pub fn new(name: &str, code: Block) -> Self {
        Object {
            name: name.to_string(),
            code,
            members: Vec::new(),
        }
    }

    /// Names addressable by `datasize`/`dataoffset` from this object's code:
    /// the object itself, immediate sub-objects and data segments.
    pub fn member_names(&self) -> Vec<&str> {
        let mut names = vec![self.name.as_str()];
        for member in &self.members {
            names.push(match member {
                ObjectMember::Object(obj) => obj.name.as_str(),
                ObjectMember::Data { name, .. } => name.as_str(),
            });
        }
        names
    }

    pub fn sub_objects(&self) -> impl Iterator<Item = &Object> {
        self.members.iter().filter_map(|member| match member {
            ObjectMember::Object(obj) => Some(obj),
            ObjectMember::Data { .. } => None,
        })
    }

    /// Applies `f` to this object and every sub-object, children first.
    pub fn for_each_mut<E>(
        &mut self,
        f: &mut dyn FnMut(&mut Object) -> Result<(), E>,
    ) -> Result<(), E> {
        for member in &mut self.members {
            if let ObjectMember::Object(sub) = member {
                sub.for_each_mut(f)?;
            }
        }
        f(self)
    }
}

/// What the parser read: a full object tree or a bare code block. The
/// session prints back in the same form it read.
#[derive(Debug, PartialEq, Clone)]
pub enum ParsedInput {
    Object(Object),
    Block(Block),
}

impl ParsedInput {
    /// Wraps a bare block into an unnamed object so the rest of the
    /// pipeline only deals with objects.
    pub fn into_object(self) -> (Object, bool) {
        match self {
            ParsedInput::Object(object) => (object, false),
            ParsedInput::Block(block) => (Object::new("", block), true),
        }
    }
}
