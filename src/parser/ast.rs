//! Abstract syntax tree for the script subset.
//!
//! Node names follow the ESTree vocabulary. Every function node keeps the
//! exact source slice it was parsed from so that function values can be
//! reported verbatim.

use std::fmt;
use std::rc::Rc;

/// Source span of a node, as byte offsets into the script text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Meta {
    pub start_index: usize,
    pub end_index: usize,
}

impl Meta {
    pub fn new(start_index: usize, end_index: usize) -> Self {
        Meta {
            start_index,
            end_index,
        }
    }
}

/// Names declared with `var` and function declarations found in one
/// function body (or script), collected for hoisting.
#[derive(Debug, Clone, Default)]
pub struct HoistedDeclarations {
    pub var_names: Vec<String>,
    pub functions: Vec<Rc<FunctionData>>,
}

impl HoistedDeclarations {
    pub fn add_var_name(&mut self, name: &str) {
        if !self.var_names.iter().any(|n| n == name) {
            self.var_names.push(name.to_string());
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProgramData {
    pub meta: Meta,
    pub body: Vec<StatementType>,
    pub hoisted: HoistedDeclarations,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierData {
    pub meta: Meta,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct ParameterData {
    pub name: String,
    pub default: Option<ExpressionType>,
    pub rest: bool,
}

#[derive(Debug, Clone)]
pub enum FunctionBodyType {
    Block(Vec<StatementType>),
    /// Concise arrow body.
    Expression(Box<ExpressionType>),
}

#[derive(Debug, Clone)]
pub struct FunctionData {
    pub meta: Meta,
    pub id: Option<IdentifierData>,
    pub params: Vec<ParameterData>,
    pub body: FunctionBodyType,
    pub hoisted: HoistedDeclarations,
    pub is_arrow: bool,
    /// Set when the body mentions `arguments`.
    pub uses_arguments: bool,
    pub source: Rc<str>,
}

impl FunctionData {
    pub fn name(&self) -> &str {
        self.id.as_ref().map(|id| id.name.as_str()).unwrap_or("")
    }

    /// Number of declared parameters before the first default or rest one.
    pub fn length(&self) -> usize {
        self.params
            .iter()
            .take_while(|p| p.default.is_none() && !p.rest)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NumberLiteralType {
    IntegerLiteral(i64),
    FloatLiteral(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegExpLiteralData {
    pub pattern: String,
    pub flags: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralType {
    StringLiteral(String),
    BooleanLiteral(bool),
    NullLiteral,
    NumberLiteral(NumberLiteralType),
    RegExpLiteral(RegExpLiteralData),
}

#[derive(Debug, Clone)]
pub struct LiteralData {
    pub meta: Meta,
    pub value: LiteralType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Minus,
    Plus,
    LogicalNot,
    BitwiseNot,
    TypeOf,
    Void,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOperator {
    PlusPlus,
    MinusMinus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    StrictlyEqual,
    StrictlyUnequal,
    LooselyEqual,
    LooselyUnequal,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
    BitwiseLeftShift,
    BitwiseRightShift,
    BitwiseUnsignedRightShift,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Exponent,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    In,
    InstanceOf,
}

impl BinaryOperator {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "===" => BinaryOperator::StrictlyEqual,
            "!==" => BinaryOperator::StrictlyUnequal,
            "==" => BinaryOperator::LooselyEqual,
            "!=" => BinaryOperator::LooselyUnequal,
            "<" => BinaryOperator::LessThan,
            ">" => BinaryOperator::GreaterThan,
            "<=" => BinaryOperator::LessThanEqual,
            ">=" => BinaryOperator::GreaterThanEqual,
            "<<" => BinaryOperator::BitwiseLeftShift,
            ">>" => BinaryOperator::BitwiseRightShift,
            ">>>" => BinaryOperator::BitwiseUnsignedRightShift,
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Subtract,
            "*" => BinaryOperator::Multiply,
            "/" => BinaryOperator::Divide,
            "%" => BinaryOperator::Modulo,
            "**" => BinaryOperator::Exponent,
            "|" => BinaryOperator::BitwiseOr,
            "^" => BinaryOperator::BitwiseXor,
            "&" => BinaryOperator::BitwiseAnd,
            "in" => BinaryOperator::In,
            "instanceof" => BinaryOperator::InstanceOf,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    Or,
    And,
    NullishCoalescing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOperator {
    Equals,
    AddEquals,
    SubtractEquals,
    MultiplyEquals,
    DivideEquals,
    ModuloEquals,
    ExponentEquals,
    BitwiseLeftShiftEquals,
    BitwiseRightShiftEquals,
    BitwiseUnsignedRightShiftEquals,
    BitwiseOrEquals,
    BitwiseXorEquals,
    BitwiseAndEquals,
    LogicalOrEquals,
    LogicalAndEquals,
    NullishEquals,
}

impl AssignmentOperator {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "=" => AssignmentOperator::Equals,
            "+=" => AssignmentOperator::AddEquals,
            "-=" => AssignmentOperator::SubtractEquals,
            "*=" => AssignmentOperator::MultiplyEquals,
            "/=" => AssignmentOperator::DivideEquals,
            "%=" => AssignmentOperator::ModuloEquals,
            "**=" => AssignmentOperator::ExponentEquals,
            "<<=" => AssignmentOperator::BitwiseLeftShiftEquals,
            ">>=" => AssignmentOperator::BitwiseRightShiftEquals,
            ">>>=" => AssignmentOperator::BitwiseUnsignedRightShiftEquals,
            "|=" => AssignmentOperator::BitwiseOrEquals,
            "^=" => AssignmentOperator::BitwiseXorEquals,
            "&=" => AssignmentOperator::BitwiseAndEquals,
            "||=" => AssignmentOperator::LogicalOrEquals,
            "&&=" => AssignmentOperator::LogicalAndEquals,
            "??=" => AssignmentOperator::NullishEquals,
            _ => return None,
        })
    }

    /// The binary operator a compound assignment applies, if any.
    pub fn binary_operator(&self) -> Option<BinaryOperator> {
        Some(match self {
            AssignmentOperator::AddEquals => BinaryOperator::Add,
            AssignmentOperator::SubtractEquals => BinaryOperator::Subtract,
            AssignmentOperator::MultiplyEquals => BinaryOperator::Multiply,
            AssignmentOperator::DivideEquals => BinaryOperator::Divide,
            AssignmentOperator::ModuloEquals => BinaryOperator::Modulo,
            AssignmentOperator::ExponentEquals => BinaryOperator::Exponent,
            AssignmentOperator::BitwiseLeftShiftEquals => BinaryOperator::BitwiseLeftShift,
            AssignmentOperator::BitwiseRightShiftEquals => BinaryOperator::BitwiseRightShift,
            AssignmentOperator::BitwiseUnsignedRightShiftEquals => {
                BinaryOperator::BitwiseUnsignedRightShift
            }
            AssignmentOperator::BitwiseOrEquals => BinaryOperator::BitwiseOr,
            AssignmentOperator::BitwiseXorEquals => BinaryOperator::BitwiseXor,
            AssignmentOperator::BitwiseAndEquals => BinaryOperator::BitwiseAnd,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone)]
pub enum ExpressionOrSpreadElement {
    Expression(ExpressionType),
    SpreadElement(ExpressionType),
}

#[derive(Debug, Clone)]
pub enum PropertyKeyType {
    Static(String),
    Computed(Box<ExpressionType>),
}

#[derive(Debug, Clone)]
pub enum PropertyData {
    Init {
        key: PropertyKeyType,
        value: ExpressionType,
    },
    Spread(ExpressionType),
}

#[derive(Debug, Clone)]
pub enum TemplatePartType {
    Text(String),
    Substitution(ExpressionType),
}

#[derive(Debug, Clone)]
pub enum MemberExpressionType {
    SimpleMemberExpression {
        meta: Meta,
        object: Box<ExpressionType>,
        property: String,
    },
    ComputedMemberExpression {
        meta: Meta,
        object: Box<ExpressionType>,
        property: Box<ExpressionType>,
    },
}

#[derive(Debug, Clone)]
pub enum ExpressionType {
    Literal(LiteralData),
    Identifier(IdentifierData),
    ThisExpression {
        meta: Meta,
    },
    ArrayExpression {
        meta: Meta,
        elements: Vec<Option<ExpressionOrSpreadElement>>,
    },
    ObjectExpression {
        meta: Meta,
        properties: Vec<PropertyData>,
    },
    FunctionOrArrowExpression(Rc<FunctionData>),
    UnaryExpression {
        meta: Meta,
        operator: UnaryOperator,
        argument: Box<ExpressionType>,
    },
    UpdateExpression {
        meta: Meta,
        operator: UpdateOperator,
        argument: Box<ExpressionType>,
        prefix: bool,
    },
    BinaryExpression {
        meta: Meta,
        operator: BinaryOperator,
        left: Box<ExpressionType>,
        right: Box<ExpressionType>,
    },
    LogicalExpression {
        meta: Meta,
        operator: LogicalOperator,
        left: Box<ExpressionType>,
        right: Box<ExpressionType>,
    },
    AssignmentExpression {
        meta: Meta,
        operator: AssignmentOperator,
        left: Box<ExpressionType>,
        right: Box<ExpressionType>,
    },
    ConditionalExpression {
        meta: Meta,
        test: Box<ExpressionType>,
        consequent: Box<ExpressionType>,
        alternate: Box<ExpressionType>,
    },
    CallExpression {
        meta: Meta,
        callee: Box<ExpressionType>,
        arguments: Vec<ExpressionOrSpreadElement>,
    },
    NewExpression {
        meta: Meta,
        callee: Box<ExpressionType>,
        arguments: Vec<ExpressionOrSpreadElement>,
    },
    MemberExpression(MemberExpressionType),
    SequenceExpression {
        meta: Meta,
        expressions: Vec<ExpressionType>,
    },
    TemplateLiteral {
        meta: Meta,
        parts: Vec<TemplatePartType>,
    },
}

impl ExpressionType {
    pub fn get_meta(&self) -> Meta {
        match self {
            ExpressionType::Literal(l) => l.meta,
            ExpressionType::Identifier(id) => id.meta,
            ExpressionType::FunctionOrArrowExpression(f) => f.meta,
            ExpressionType::MemberExpression(MemberExpressionType::SimpleMemberExpression {
                meta,
                ..
            })
            | ExpressionType::MemberExpression(MemberExpressionType::ComputedMemberExpression {
                meta,
                ..
            })
            | ExpressionType::ThisExpression { meta }
            | ExpressionType::ArrayExpression { meta, .. }
            | ExpressionType::ObjectExpression { meta, .. }
            | ExpressionType::UnaryExpression { meta, .. }
            | ExpressionType::UpdateExpression { meta, .. }
            | ExpressionType::BinaryExpression { meta, .. }
            | ExpressionType::LogicalExpression { meta, .. }
            | ExpressionType::AssignmentExpression { meta, .. }
            | ExpressionType::ConditionalExpression { meta, .. }
            | ExpressionType::CallExpression { meta, .. }
            | ExpressionType::NewExpression { meta, .. }
            | ExpressionType::SequenceExpression { meta, .. }
            | ExpressionType::TemplateLiteral { meta, .. } => *meta,
        }
    }

    /// Valid targets for assignment and update operators.
    pub fn is_assignment_target(&self) -> bool {
        matches!(
            self,
            ExpressionType::Identifier(_) | ExpressionType::MemberExpression(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableDeclarationKind {
    Var,
    Let,
    Const,
}

impl fmt::Display for VariableDeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VariableDeclarationKind::Var => "var",
            VariableDeclarationKind::Let => "let",
            VariableDeclarationKind::Const => "const",
        })
    }
}

#[derive(Debug, Clone)]
pub struct VariableDeclaratorData {
    pub meta: Meta,
    pub id: IdentifierData,
    pub init: Option<ExpressionType>,
}

#[derive(Debug, Clone)]
pub struct VariableDeclarationData {
    pub meta: Meta,
    pub kind: VariableDeclarationKind,
    pub declarations: Vec<VariableDeclaratorData>,
}

#[derive(Debug, Clone)]
pub enum DeclarationType {
    VariableDeclaration(VariableDeclarationData),
    FunctionDeclaration(Rc<FunctionData>),
}

#[derive(Debug, Clone)]
pub struct BlockStatementData {
    pub meta: Meta,
    pub body: Vec<StatementType>,
}

#[derive(Debug, Clone)]
pub struct CatchClauseData {
    pub meta: Meta,
    pub param: Option<IdentifierData>,
    pub body: BlockStatementData,
}

#[derive(Debug, Clone)]
pub struct SwitchCaseData {
    pub meta: Meta,
    pub test: Option<ExpressionType>,
    pub consequent: Vec<StatementType>,
}

#[derive(Debug, Clone)]
pub enum ForInitType {
    VariableDeclaration(VariableDeclarationData),
    Expression(ExpressionType),
}

#[derive(Debug, Clone)]
pub enum ForBindingType {
    Declaration {
        kind: VariableDeclarationKind,
        id: IdentifierData,
    },
    Target(ExpressionType),
}

#[derive(Debug, Clone)]
pub struct ForIteratorData {
    pub meta: Meta,
    pub left: ForBindingType,
    pub right: ExpressionType,
    pub body: Box<StatementType>,
}

#[derive(Debug, Clone)]
pub enum StatementType {
    ExpressionStatement {
        meta: Meta,
        expression: ExpressionType,
    },
    BlockStatement(BlockStatementData),
    EmptyStatement {
        meta: Meta,
    },
    DebuggerStatement {
        meta: Meta,
    },
    ReturnStatement {
        meta: Meta,
        argument: Option<ExpressionType>,
    },
    BreakStatement {
        meta: Meta,
    },
    ContinueStatement {
        meta: Meta,
    },
    IfStatement {
        meta: Meta,
        test: ExpressionType,
        consequent: Box<StatementType>,
        alternate: Option<Box<StatementType>>,
    },
    SwitchStatement {
        meta: Meta,
        discriminant: ExpressionType,
        cases: Vec<SwitchCaseData>,
    },
    ThrowStatement {
        meta: Meta,
        argument: ExpressionType,
    },
    TryStatement {
        meta: Meta,
        block: BlockStatementData,
        handler: Option<CatchClauseData>,
        finalizer: Option<BlockStatementData>,
    },
    WhileStatement {
        meta: Meta,
        test: ExpressionType,
        body: Box<StatementType>,
    },
    DoWhileStatement {
        meta: Meta,
        test: ExpressionType,
        body: Box<StatementType>,
    },
    ForStatement {
        meta: Meta,
        init: Option<ForInitType>,
        test: Option<ExpressionType>,
        update: Option<ExpressionType>,
        body: Box<StatementType>,
    },
    ForInStatement(ForIteratorData),
    ForOfStatement(ForIteratorData),
    DeclarationStatement(DeclarationType),
}
