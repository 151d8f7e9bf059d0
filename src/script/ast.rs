//! Abstract syntax tree of the XMLUI scripting language.
//!
//! Every node carries a [`Span`]; a node's span always lies inside its
//! parent's span and sibling spans are ordered and do not overlap. The text
//! a node was parsed from is available through `span.slice(source)`.

use serde::Serialize;

use crate::stream::Span;

// ============================================================================
// STATEMENTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Statement {
    Empty {
        span: Span,
    },
    Expression {
        expression: Expression,
        span: Span,
    },
    Let {
        declarations: Vec<VarDeclaration>,
        span: Span,
    },
    Const {
        declarations: Vec<VarDeclaration>,
        exported: bool,
        span: Span,
    },
    Var {
        declarations: Vec<VarDeclaration>,
        span: Span,
    },
    Block {
        body: Vec<Statement>,
        span: Span,
    },
    If {
        condition: Expression,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
        span: Span,
    },
    DoWhile {
        body: Box<Statement>,
        condition: Expression,
        span: Span,
    },
    While {
        condition: Expression,
        body: Box<Statement>,
        span: Span,
    },
    Return {
        value: Option<Expression>,
        span: Span,
    },
    Break {
        span: Span,
    },
    Continue {
        span: Span,
    },
    For {
        init: Option<Box<Statement>>,
        condition: Option<Expression>,
        update: Option<Expression>,
        body: Box<Statement>,
        span: Span,
    },
    ForIn {
        binding: ForBinding,
        target: Pattern,
        object: Expression,
        body: Box<Statement>,
        span: Span,
    },
    ForOf {
        binding: ForBinding,
        target: Pattern,
        iterable: Expression,
        body: Box<Statement>,
        span: Span,
    },
    Throw {
        value: Expression,
        span: Span,
    },
    Try {
        block: Box<Statement>,
        catch_param: Option<Pattern>,
        catch_block: Option<Box<Statement>>,
        finally_block: Option<Box<Statement>>,
        span: Span,
    },
    Switch {
        discriminant: Expression,
        cases: Vec<SwitchCase>,
        span: Span,
    },
    Function(FunctionDeclaration),
    Import(ImportDeclaration),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Empty { span }
            | Statement::Expression { span, .. }
            | Statement::Let { span, .. }
            | Statement::Const { span, .. }
            | Statement::Var { span, .. }
            | Statement::Block { span, .. }
            | Statement::If { span, .. }
            | Statement::DoWhile { span, .. }
            | Statement::While { span, .. }
            | Statement::Return { span, .. }
            | Statement::Break { span }
            | Statement::Continue { span }
            | Statement::For { span, .. }
            | Statement::ForIn { span, .. }
            | Statement::ForOf { span, .. }
            | Statement::Throw { span, .. }
            | Statement::Try { span, .. }
            | Statement::Switch { span, .. } => *span,
            Statement::Function(func) => func.span,
            Statement::Import(import) => import.span,
        }
    }

    /// Short tag used in debug output and tooling (`LetS`, `IfS`, …).
    pub fn tag(&self) -> &'static str {
        match self {
            Statement::Empty { .. } => "EmptyS",
            Statement::Expression { .. } => "ExprS",
            Statement::Let { .. } => "LetS",
            Statement::Const { .. } => "ConstS",
            Statement::Var { .. } => "VarS",
            Statement::Block { .. } => "BlockS",
            Statement::If { .. } => "IfS",
            Statement::DoWhile { .. } => "DoWS",
            Statement::While { .. } => "WhileS",
            Statement::Return { .. } => "RetS",
            Statement::Break { .. } => "BrkS",
            Statement::Continue { .. } => "ContS",
            Statement::For { .. } => "ForS",
            Statement::ForIn { .. } => "ForInS",
            Statement::ForOf { .. } => "ForOfS",
            Statement::Throw { .. } => "ThrowS",
            Statement::Try { .. } => "TryS",
            Statement::Switch { .. } => "SwitchS",
            Statement::Function(_) => "FuncD",
            Statement::Import(_) => "ImportD",
        }
    }
}

/// How the loop variable of a `for…in` / `for…of` is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ForBinding {
    Let,
    Const,
    Var,
    /// An existing variable (`for (x of items)`).
    None,
}

/// One declarator of a `let`, `const` or `var` statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarDeclaration {
    pub target: Pattern,
    pub init: Option<Expression>,
    pub span: Span,
}

impl VarDeclaration {
    /// The declared name when the target is a plain identifier.
    pub fn name(&self) -> Option<&str> {
        match &self.target {
            Pattern::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchCase {
    /// `None` for the `default` clause.
    pub test: Option<Expression>,
    pub body: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub params: Vec<Binding>,
    pub rest: Option<Box<Pattern>>,
    pub body: Vec<Statement>,
    pub exported: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSpecifier {
    pub name: String,
    pub alias: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportDeclaration {
    /// Imported names with their local aliases, in source order.
    pub specifiers: Vec<ImportSpecifier>,
    pub module: String,
    pub span: Span,
}

// ============================================================================
// BINDING PATTERNS
// ============================================================================

/// A binding target: a plain name or a destructuring pattern.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Pattern {
    Identifier {
        name: String,
        span: Span,
    },
    /// `{ a, b: c, d = 1, ...rest }`
    Object {
        properties: Vec<PropertyBinding>,
        rest: Option<String>,
        span: Span,
    },
    /// `[a, , [b], c = 1, ...rest]`
    Array {
        elements: Vec<Option<Binding>>,
        rest: Option<Box<Pattern>>,
        span: Span,
    },
}

impl Pattern {
    pub fn span(&self) -> Span {
        match self {
            Pattern::Identifier { span, .. } | Pattern::Object { span, .. } | Pattern::Array { span, .. } => {
                *span
            }
        }
    }

    /// All names this pattern binds, in source order.
    pub fn bound_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Pattern::Identifier { name, .. } => names.push(name),
            Pattern::Object { properties, rest, .. } => {
                for prop in properties {
                    prop.binding.target.collect_names(names);
                }
                if let Some(rest) = rest {
                    names.push(rest);
                }
            }
            Pattern::Array { elements, rest, .. } => {
                for element in elements.iter().flatten() {
                    element.target.collect_names(names);
                }
                if let Some(rest) = rest {
                    rest.collect_names(names);
                }
            }
        }
    }
}

/// A pattern with an optional default value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binding {
    pub target: Pattern,
    pub default: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyBinding {
    pub key: String,
    pub binding: Binding,
    pub span: Span,
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Expression {
    Literal {
        value: Literal,
        span: Span,
    },
    Identifier {
        name: String,
        span: Span,
    },
    /// Array literal; `None` marks a hole (`[1, , 2]`).
    Array {
        elements: Vec<Option<Expression>>,
        span: Span,
    },
    Object {
        properties: Vec<ObjectProperty>,
        span: Span,
    },
    Template {
        parts: Vec<TemplatePart>,
        span: Span,
    },
    RegExp {
        pattern: String,
        flags: String,
        span: Span,
    },
    Spread {
        argument: Box<Expression>,
        span: Span,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<Expression>,
        span: Span,
    },
    Update {
        operator: UpdateOperator,
        prefix: bool,
        operand: Box<Expression>,
        span: Span,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
        span: Span,
    },
    Conditional {
        condition: Box<Expression>,
        consequent: Box<Expression>,
        alternate: Box<Expression>,
        span: Span,
    },
    Assignment {
        operator: AssignmentOperator,
        target: Box<Expression>,
        value: Box<Expression>,
        span: Span,
    },
    Sequence {
        expressions: Vec<Expression>,
        parenthesized: bool,
        span: Span,
    },
    Arrow {
        params: Vec<Binding>,
        rest: Option<Box<Pattern>>,
        body: ArrowBody,
        span: Span,
    },
    Member {
        object: Box<Expression>,
        property: String,
        optional: bool,
        span: Span,
    },
    ComputedMember {
        object: Box<Expression>,
        property: Box<Expression>,
        optional: bool,
        span: Span,
    },
    Invocation {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
        optional: bool,
        span: Span,
    },
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Literal { span, .. }
            | Expression::Identifier { span, .. }
            | Expression::Array { span, .. }
            | Expression::Object { span, .. }
            | Expression::Template { span, .. }
            | Expression::RegExp { span, .. }
            | Expression::Spread { span, .. }
            | Expression::Unary { span, .. }
            | Expression::Update { span, .. }
            | Expression::Binary { span, .. }
            | Expression::Conditional { span, .. }
            | Expression::Assignment { span, .. }
            | Expression::Sequence { span, .. }
            | Expression::Arrow { span, .. }
            | Expression::Member { span, .. }
            | Expression::ComputedMember { span, .. }
            | Expression::Invocation { span, .. } => *span,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Expression::Literal { .. } => "LitE",
            Expression::Identifier { .. } => "IdE",
            Expression::Array { .. } => "ALitE",
            Expression::Object { .. } => "OLitE",
            Expression::Template { .. } => "TempLitE",
            Expression::RegExp { .. } => "RLitE",
            Expression::Spread { .. } => "SpreadE",
            Expression::Unary { .. } => "UnaryE",
            Expression::Update { .. } => "PrefE",
            Expression::Binary { .. } => "BinaryE",
            Expression::Conditional { .. } => "CondE",
            Expression::Assignment { .. } => "AsgnE",
            Expression::Sequence { .. } => "SeqE",
            Expression::Arrow { .. } => "ArrowE",
            Expression::Member { .. } => "MembE",
            Expression::ComputedMember { .. } => "CMembE",
            Expression::Invocation { .. } => "InvokeE",
        }
    }

    /// Rebuilds the node with a wider span (used when parentheses wrap it).
    pub(crate) fn with_span(mut self, new_span: Span) -> Self {
        match &mut self {
            Expression::Literal { span, .. }
            | Expression::Identifier { span, .. }
            | Expression::Array { span, .. }
            | Expression::Object { span, .. }
            | Expression::Template { span, .. }
            | Expression::RegExp { span, .. }
            | Expression::Spread { span, .. }
            | Expression::Unary { span, .. }
            | Expression::Update { span, .. }
            | Expression::Binary { span, .. }
            | Expression::Conditional { span, .. }
            | Expression::Assignment { span, .. }
            | Expression::Sequence { span, .. }
            | Expression::Arrow { span, .. }
            | Expression::Member { span, .. }
            | Expression::ComputedMember { span, .. }
            | Expression::Invocation { span, .. } => *span = new_span,
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    /// Integers up to 2^53 - 1.
    Integer(i64),
    /// Integers beyond the safe range.
    BigInt(u128),
    Real(f64),
    String(String),
    Boolean(bool),
    Null,
    Undefined,
    Infinity,
    NaN,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TemplatePart {
    Text(String),
    Expression(Expression),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ObjectProperty {
    KeyValue {
        key: PropertyKey,
        value: Expression,
        span: Span,
    },
    /// `{ name }`
    Shorthand {
        name: String,
        span: Span,
    },
    Spread {
        argument: Expression,
        span: Span,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PropertyKey {
    Name(String),
    String(String),
    Number(String),
    Computed(Box<Expression>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ArrowBody {
    Expression(Box<Expression>),
    Block(Vec<Statement>),
}

// ============================================================================
// OPERATORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOperator {
    Typeof,
    Delete,
    Plus,
    Minus,
    BitwiseNot,
    LogicalNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpdateOperator {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Exponent,
    ShiftLeft,
    SignedShiftRight,
    ShiftRight,
    Equal,
    StrictEqual,
    NotEqual,
    StrictNotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    In,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    LogicalAnd,
    LogicalOr,
    NullCoalesce,
}

impl BinaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Remainder => "%",
            BinaryOperator::Exponent => "**",
            BinaryOperator::ShiftLeft => "<<",
            BinaryOperator::SignedShiftRight => ">>",
            BinaryOperator::ShiftRight => ">>>",
            BinaryOperator::Equal => "==",
            BinaryOperator::StrictEqual => "===",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::StrictNotEqual => "!==",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessThanOrEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterThanOrEqual => ">=",
            BinaryOperator::In => "in",
            BinaryOperator::BitwiseAnd => "&",
            BinaryOperator::BitwiseOr => "|",
            BinaryOperator::BitwiseXor => "^",
            BinaryOperator::LogicalAnd => "&&",
            BinaryOperator::LogicalOr => "||",
            BinaryOperator::NullCoalesce => "??",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AssignmentOperator {
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Exponent,
    ShiftLeft,
    SignedShiftRight,
    ShiftRight,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    LogicalAnd,
    LogicalOr,
    NullCoalesce,
}
