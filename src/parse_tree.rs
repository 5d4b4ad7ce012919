//! Concrete parse tree.
//!
//! One type per grammar rule; rules with several alternatives are enums with
//! one variant per alternative. Children captured in a particular role
//! (`by`, `disallowed`, `until`, ...) are named fields. Keyword and
//! punctuation tokens are kept so every node can be traced back to the text.
//!
//! The tree is produced by [`Parser`](crate::parser::Parser) and consumed
//! once by [`AstBuilder`](crate::builder::AstBuilder).
//!
//! Expression nodes hold their children behind `Box`es so that each node,
//! and each parser frame handling one, stays small however deep the
//! expression nests.

use rust_decimal::Decimal;

use crate::ast::{Position, Token};

/// Byte range of a node: where it starts and one past where it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: Position,
    pub end: usize,
}

impl Span {
    pub fn new(start: Position, end: usize) -> Self {
        Span { start, end }
    }

    pub fn of(token: &Token) -> Self {
        Span::new(token.position, token.end())
    }
}

/// `statement EOF`
#[derive(Debug, Clone, PartialEq)]
pub struct SingleStatementNode {
    pub statement: StatementNode,
    pub eof: Token,
}

/// `expression EOF`
#[derive(Debug, Clone, PartialEq)]
pub struct SingleExpressionNode {
    pub expression: ExpressionNode,
    pub eof: Token,
}

/// `query pipe*`
#[derive(Debug, Clone, PartialEq)]
pub struct StatementNode {
    pub query: QueryNode,
    pub pipes: Vec<PipeNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    Sequence(SequenceNode),
    Join(JoinNode),
    Event(EventQueryNode),
}

/// `WITH MAXSPAN '=' timeUnit`
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceParamsNode {
    pub with: Token,
    pub maxspan: Token,
    pub assign: Token,
    pub time_unit: TimeUnitNode,
}

/// `UNTIL <term>`
#[derive(Debug, Clone, PartialEq)]
pub struct UntilNode<T> {
    pub keyword: Token,
    pub term: T,
}

/// ```text
/// SEQUENCE (by=joinKeys sequenceParams? | sequenceParams disallowed=joinKeys?)?
///     sequenceTerm+ (UNTIL until=sequenceTerm)?
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceNode {
    pub span: Span,
    pub keyword: Token,
    pub by: Option<JoinKeysNode>,
    pub params: Option<SequenceParamsNode>,
    pub disallowed: Option<JoinKeysNode>,
    pub terms: Vec<SequenceTermNode>,
    pub until: Option<UntilNode<SequenceTermNode>>,
}

/// `JOIN by=joinKeys? joinTerm+ (UNTIL until=joinTerm)?`
#[derive(Debug, Clone, PartialEq)]
pub struct JoinNode {
    pub span: Span,
    pub keyword: Token,
    pub by: Option<JoinKeysNode>,
    pub terms: Vec<JoinTermNode>,
    pub until: Option<UntilNode<JoinTermNode>>,
}

/// `'|' kind=IDENTIFIER (booleanExpression (',' booleanExpression)*)?`
#[derive(Debug, Clone, PartialEq)]
pub struct PipeNode {
    pub span: Span,
    pub pipe: Token,
    pub kind: Token,
    pub args: Vec<Box<BooleanExpressionNode>>,
}

/// `BY expression (',' expression)*`
#[derive(Debug, Clone, PartialEq)]
pub struct JoinKeysNode {
    pub by: Token,
    pub keys: Vec<ExpressionNode>,
}

/// `subquery by=joinKeys?`
#[derive(Debug, Clone, PartialEq)]
pub struct JoinTermNode {
    pub span: Span,
    pub subquery: SubqueryNode,
    pub by: Option<JoinKeysNode>,
}

/// `subquery by=joinKeys? (WITH key=IDENTIFIER '=' value=number)?`
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceTermNode {
    pub span: Span,
    pub subquery: SubqueryNode,
    pub by: Option<JoinKeysNode>,
    pub parameter: Option<TermParameterNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TermParameterNode {
    pub with: Token,
    pub key: Token,
    pub assign: Token,
    pub value: NumberNode,
}

/// `'[' eventFilter ']'`
#[derive(Debug, Clone, PartialEq)]
pub struct SubqueryNode {
    pub open: Token,
    pub filter: EventFilterNode,
    pub close: Token,
}

/// `eventFilter`
#[derive(Debug, Clone, PartialEq)]
pub struct EventQueryNode {
    pub filter: EventFilterNode,
}

/// `(ANY | event=eventValue) WHERE expression`
#[derive(Debug, Clone, PartialEq)]
pub struct EventFilterNode {
    pub span: Span,
    pub event: EventValueNode,
    pub where_keyword: Token,
    pub condition: ExpressionNode,
}

/// `ANY`, or `STRING | IDENTIFIER` for a named category.
#[derive(Debug, Clone, PartialEq)]
pub enum EventValueNode {
    Any(Token),
    Value(Token),
}

/// `booleanExpression`
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionNode {
    pub boolean: Box<BooleanExpressionNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BooleanExpressionNode {
    /// `NOT booleanExpression`
    LogicalNot {
        span: Span,
        not: Token,
        operand: Box<BooleanExpressionNode>,
    },
    /// `relationship=IDENTIFIER OF subquery`
    ProcessCheck {
        span: Span,
        relationship: Token,
        of: Token,
        subquery: Box<SubqueryNode>,
    },
    /// `valueExpression`
    BooleanDefault(Box<ValueExpressionNode>),
    /// `left=booleanExpression operator=(AND | OR) right=booleanExpression`
    LogicalBinary {
        span: Span,
        left: Box<BooleanExpressionNode>,
        operator: Token,
        right: Box<BooleanExpressionNode>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValueExpressionNode {
    /// `operatorExpression`
    Default(Box<OperatorExpressionNode>),
    /// `left=operatorExpression comparisonOperator right=operatorExpression`
    Comparison {
        span: Span,
        left: Box<OperatorExpressionNode>,
        operator: ComparisonOperatorNode,
        right: Box<OperatorExpressionNode>,
    },
}

/// `'==' | '!=' | '<' | '<=' | '>' | '>='`
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonOperatorNode {
    pub token: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OperatorExpressionNode {
    /// `primaryExpression predicate?`
    Default {
        span: Span,
        primary: Box<PrimaryExpressionNode>,
        predicate: Option<Box<PredicateNode>>,
    },
    /// `operator=('-' | '+') operatorExpression`
    ArithmeticUnary {
        span: Span,
        operator: Token,
        operand: Box<OperatorExpressionNode>,
    },
    /// `left=operatorExpression operator=('*' | '/' | '%' | '+' | '-') right=operatorExpression`
    ArithmeticBinary {
        span: Span,
        left: Box<OperatorExpressionNode>,
        operator: Token,
        right: Box<OperatorExpressionNode>,
    },
}

/// `NOT? kind=(IN | IN~) ...`, or `kind=(LIKE | LIKE~ | REGEX | REGEX~ | ':') ...`
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateNode {
    pub not: Option<Token>,
    pub kind: Token,
    pub form: PredicateForm,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredicateForm {
    /// `'(' expression (',' expression)* ')'`, membership only
    Expressions(Vec<ExpressionNode>),
    /// `constant`
    Constant(ConstantNode),
    /// `'(' constant (',' constant)* ')'`
    Constants(Vec<ConstantNode>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrimaryExpressionNode {
    Constant(ConstantNode),
    Function(Box<FunctionExpressionNode>),
    Dereference(Box<QualifiedNameNode>),
    /// `'(' expression ')'`
    Parenthesized {
        span: Span,
        open: Token,
        expression: ExpressionNode,
        close: Token,
    },
}

/// `name=functionName '(' (expression (',' expression)*)? ')'`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionExpressionNode {
    pub span: Span,
    pub name: FunctionNameNode,
    pub args: Vec<ExpressionNode>,
}

/// `IDENTIFIER | TILDE_IDENTIFIER`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionNameNode {
    pub token: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstantNode {
    Null(Token),
    Numeric(NumberNode),
    Boolean(BooleanValueNode),
    String(StringNode),
}

/// `TRUE | FALSE`
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanValueNode {
    pub token: Token,
}

/// `STRING`
#[derive(Debug, Clone, PartialEq)]
pub struct StringNode {
    pub token: Token,
}

/// `identifier ('.' identifier | '[' INTEGER_VALUE+ ']')*`
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedNameNode {
    pub span: Span,
    pub first: IdentifierNode,
    pub suffixes: Vec<NameSuffixNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NameSuffixNode {
    /// `'.' identifier`
    Field { dot: Token, name: IdentifierNode },
    /// `'[' INTEGER_VALUE+ ']'`
    Index {
        open: Token,
        indices: Vec<NumberNode>,
        close: Token,
    },
}

/// `IDENTIFIER | QUOTED_IDENTIFIER`
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierNode {
    pub token: Token,
}

/// `number unit=IDENTIFIER?`
#[derive(Debug, Clone, PartialEq)]
pub struct TimeUnitNode {
    pub number: NumberNode,
    pub unit: Option<Token>,
}

/// Numeric token with its value, range-checked by the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberNode {
    Decimal { token: Token, value: Decimal },
    Integer { token: Token, value: i64 },
}

impl NumberNode {
    pub fn token(&self) -> &Token {
        match self {
            NumberNode::Decimal { token, .. } | NumberNode::Integer { token, .. } => token,
        }
    }
}

impl BooleanExpressionNode {
    pub fn span(&self) -> Span {
        match self {
            BooleanExpressionNode::LogicalNot { span, .. }
            | BooleanExpressionNode::ProcessCheck { span, .. }
            | BooleanExpressionNode::LogicalBinary { span, .. } => *span,
            BooleanExpressionNode::BooleanDefault(value) => value.span(),
        }
    }
}

impl ValueExpressionNode {
    pub fn span(&self) -> Span {
        match self {
            ValueExpressionNode::Default(operator) => operator.span(),
            ValueExpressionNode::Comparison { span, .. } => *span,
        }
    }
}

impl OperatorExpressionNode {
    pub fn span(&self) -> Span {
        match self {
            OperatorExpressionNode::Default { span, .. }
            | OperatorExpressionNode::ArithmeticUnary { span, .. }
            | OperatorExpressionNode::ArithmeticBinary { span, .. } => *span,
        }
    }
}

impl PrimaryExpressionNode {
    pub fn span(&self) -> Span {
        match self {
            PrimaryExpressionNode::Constant(constant) => constant.span(),
            PrimaryExpressionNode::Function(function) => function.span,
            PrimaryExpressionNode::Dereference(name) => name.span,
            PrimaryExpressionNode::Parenthesized { span, .. } => *span,
        }
    }
}

impl ConstantNode {
    pub fn span(&self) -> Span {
        match self {
            ConstantNode::Null(token) => Span::of(token),
            ConstantNode::Numeric(number) => Span::of(number.token()),
            ConstantNode::Boolean(value) => Span::of(&value.token),
            ConstantNode::String(value) => Span::of(&value.token),
        }
    }
}

impl ExpressionNode {
    pub fn span(&self) -> Span {
        self.boolean.span()
    }
}
