//! Recursive-descent parser producing the [parse tree](crate::parse_tree).
//!
//! Parse functions take a [`Cursor`] and return the node together with the
//! cursor positioned after it. Boolean and arithmetic operators are parsed by
//! precedence climbing:
//!
//! | tier       | operators (tightest first)        |
//! |------------|-----------------------------------|
//! | boolean    | `not`, `and`, `or`                |
//! | arithmetic | unary `+ -`, `* / %`, binary `+ -` |
//!
//! Binary operators are left-associative. The first mismatch aborts with a
//! [`SyntaxError`] naming the tokens that were acceptable at that point,
//! including those that would have continued a construct already complete
//! before it.
//!
//! Every nested boolean expression, `not` or unary operand, and every
//! operator of a binary chain, takes one level out of
//! [`ParserConfig::max_depth`]. That bounds the height of the resulting
//! tree, and with it the recursion of everything that later walks it.

use std::cell::RefCell;

use rust_decimal::Decimal;
use tracing::debug;

use crate::ast::{Expr, Position, Statement, TimeUnit, Token, TokenKind};
use crate::builder::AstBuilder;
use crate::config::ParserConfig;
use crate::error::{ParseError, SyntaxError};
use crate::lexer::tokenize;
use crate::parse_tree::*;

const NOT_PRECEDENCE: u8 = 3;
const UNARY_PRECEDENCE: u8 = 3;

const EXPRESSION_START: &[TokenKind] = &[
    TokenKind::Not,
    TokenKind::Null,
    TokenKind::True,
    TokenKind::False,
    TokenKind::Plus,
    TokenKind::Minus,
    TokenKind::Lp,
    TokenKind::String,
    TokenKind::IntegerValue,
    TokenKind::DecimalValue,
    TokenKind::Identifier,
    TokenKind::QuotedIdentifier,
    TokenKind::TildeIdentifier,
];

const PRIMARY_START: &[TokenKind] = &[
    TokenKind::Null,
    TokenKind::True,
    TokenKind::False,
    TokenKind::Lp,
    TokenKind::String,
    TokenKind::IntegerValue,
    TokenKind::DecimalValue,
    TokenKind::Identifier,
    TokenKind::QuotedIdentifier,
    TokenKind::TildeIdentifier,
];

const PREDICATE_START: &[TokenKind] = &[
    TokenKind::In,
    TokenKind::InInsensitive,
    TokenKind::Like,
    TokenKind::LikeInsensitive,
    TokenKind::Not,
    TokenKind::Regex,
    TokenKind::RegexInsensitive,
    TokenKind::Seq,
];

const COMPARISON_OPERATORS: &[TokenKind] = &[
    TokenKind::Eq,
    TokenKind::Neq,
    TokenKind::Lt,
    TokenKind::Lte,
    TokenKind::Gt,
    TokenKind::Gte,
];

const ARITHMETIC_OPERATORS: &[TokenKind] = &[
    TokenKind::Plus,
    TokenKind::Minus,
    TokenKind::Asterisk,
    TokenKind::Slash,
    TokenKind::Percent,
];

const LOGICAL_OPERATORS: &[TokenKind] = &[TokenKind::And, TokenKind::Or];

const CONSTANT_START: &[TokenKind] = &[
    TokenKind::Null,
    TokenKind::True,
    TokenKind::False,
    TokenKind::String,
    TokenKind::IntegerValue,
    TokenKind::DecimalValue,
];

const QUERY_START: &[TokenKind] = &[
    TokenKind::Sequence,
    TokenKind::Join,
    TokenKind::Any,
    TokenKind::String,
    TokenKind::Identifier,
];

const EVENT_START: &[TokenKind] = &[TokenKind::Any, TokenKind::String, TokenKind::Identifier];

static END_OF_INPUT: Token = Token {
    kind: TokenKind::Eof,
    text: String::new(),
    position: Position {
        line: 1,
        column: 1,
        offset: 0,
    },
};

/// Position in the token stream, plus the current nesting depth.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'t> {
    tokens: &'t [Token],
    index: usize,
    depth: usize,
}

impl<'t> Cursor<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Cursor {
            tokens,
            index: 0,
            depth: 0,
        }
    }

    /// The token `n` places ahead. Past the end, the trailing `Eof` repeats.
    pub fn peek_nth(&self, n: usize) -> &'t Token {
        match self.tokens.get(self.index + n) {
            Some(token) => token,
            None => match self.tokens.last() {
                Some(last) if last.is(TokenKind::Eof) => last,
                _ => &END_OF_INPUT,
            },
        }
    }

    pub fn peek(&self) -> &'t Token {
        self.peek_nth(0)
    }

    pub fn kind(&self) -> TokenKind {
        self.peek().kind
    }

    pub fn kind_at(&self, n: usize) -> TokenKind {
        self.peek_nth(n).kind
    }

    pub fn check(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    pub fn position(&self) -> Position {
        self.peek().position
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    fn at_depth(self, depth: usize) -> Self {
        Cursor { depth, ..self }
    }

    /// Consumes the current token.
    pub fn bump(self) -> (Token, Cursor<'t>) {
        let token = self.peek().clone();
        let next = Cursor {
            index: self.index + 1,
            ..self
        };
        (token, next)
    }

    /// Span from `start` to the end of the last consumed token.
    fn span_from(&self, start: Position) -> Span {
        let end = self
            .index
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(start.offset, Token::end);
        Span::new(start, end.max(start.offset))
    }
}

type Parsed<'t, T> = Result<(T, Cursor<'t>), ParseError>;

/// Tokens that would have continued a complete construct, gathered at the
/// furthest token index where one ended.
#[derive(Debug, Default)]
struct Follow {
    index: usize,
    kinds: Vec<TokenKind>,
}

pub struct Parser<'t> {
    tokens: &'t [Token],
    max_depth: usize,
    follow: RefCell<Follow>,
}

impl<'t> Parser<'t> {
    /// `tokens` are the significant tokens of a query, ending with `Eof`, as
    /// returned by [`tokenize`].
    pub fn new(tokens: &'t [Token], config: &ParserConfig) -> Self {
        Parser {
            tokens,
            max_depth: config.max_depth,
            follow: RefCell::default(),
        }
    }

    pub fn parse_single_statement(&self) -> Result<SingleStatementNode, ParseError> {
        let cur = Cursor::new(self.tokens);
        let (statement, cur) = self.statement(cur)?;
        let (eof, _) = self.expect(cur, TokenKind::Eof)?;
        Ok(SingleStatementNode { statement, eof })
    }

    pub fn parse_single_expression(&self) -> Result<SingleExpressionNode, ParseError> {
        let cur = Cursor::new(self.tokens);
        let (expression, cur) = self.expression(cur)?;
        let (eof, _) = self.expect(cur, TokenKind::Eof)?;
        Ok(SingleExpressionNode { expression, eof })
    }

    /// Records that `kinds` could have followed what ends at `cur`.
    fn offer(&self, cur: Cursor<'t>, kinds: &[TokenKind]) {
        let mut follow = self.follow.borrow_mut();
        if cur.index > follow.index {
            follow.index = cur.index;
            follow.kinds.clear();
        }
        if cur.index == follow.index {
            follow.kinds.extend_from_slice(kinds);
        }
    }

    fn mismatch(&self, cur: Cursor<'t>, expected: &[TokenKind]) -> ParseError {
        let token = cur.peek();
        let mut expected = expected.to_vec();
        let follow = self.follow.borrow();
        if follow.index == cur.index {
            expected.extend_from_slice(&follow.kinds);
        }
        expected.sort();
        expected.dedup();
        SyntaxError {
            position: token.position,
            found: token.to_string(),
            found_kind: token.kind,
            expected,
        }
        .into()
    }

    fn expect(&self, cur: Cursor<'t>, kind: TokenKind) -> Parsed<'t, Token> {
        self.expect_one_of(cur, kind, &[kind])
    }

    /// Consumes `kind`, reporting `expected` when something else is found.
    fn expect_one_of(
        &self,
        cur: Cursor<'t>,
        kind: TokenKind,
        expected: &[TokenKind],
    ) -> Parsed<'t, Token> {
        if cur.check(kind) {
            Ok(cur.bump())
        } else {
            Err(self.mismatch(cur, expected))
        }
    }

    /// One nesting level deeper than `cur`.
    fn descend(&self, cur: Cursor<'t>) -> Result<Cursor<'t>, ParseError> {
        if cur.depth >= self.max_depth {
            return Err(ParseError::invalid(
                cur.position(),
                format!(
                    "query is too deeply nested or chains too many operators; \
                     at most {} levels are supported",
                    self.max_depth
                ),
            ));
        }
        Ok(cur.at_depth(cur.depth + 1))
    }

    // ========================================================================
    // Statements and queries
    // ========================================================================

    fn statement(&self, cur: Cursor<'t>) -> Parsed<'t, StatementNode> {
        let (query, mut cur) = self.query(cur)?;
        let mut pipes = Vec::new();
        while cur.check(TokenKind::Pipe) {
            let (pipe, next) = self.pipe(cur)?;
            pipes.push(pipe);
            cur = next;
        }
        self.offer(cur, &[TokenKind::Pipe]);
        Ok((StatementNode { query, pipes }, cur))
    }

    fn query(&self, cur: Cursor<'t>) -> Parsed<'t, QueryNode> {
        match cur.kind() {
            TokenKind::Sequence => {
                let (sequence, cur) = self.sequence(cur)?;
                Ok((QueryNode::Sequence(sequence), cur))
            }
            TokenKind::Join => {
                let (join, cur) = self.join(cur)?;
                Ok((QueryNode::Join(join), cur))
            }
            TokenKind::Any | TokenKind::String | TokenKind::Identifier => {
                let (filter, cur) = self.event_filter(cur)?;
                Ok((QueryNode::Event(EventQueryNode { filter }), cur))
            }
            _ => Err(self.mismatch(cur, QUERY_START)),
        }
    }

    fn sequence_params(&self, cur: Cursor<'t>) -> Parsed<'t, SequenceParamsNode> {
        let (with, cur) = self.expect(cur, TokenKind::With)?;
        let (maxspan, cur) = self.expect(cur, TokenKind::Maxspan)?;
        let (assign, cur) = self.expect(cur, TokenKind::Asgn)?;
        let (time_unit, cur) = self.time_unit(cur)?;
        Ok((
            SequenceParamsNode {
                with,
                maxspan,
                assign,
                time_unit,
            },
            cur,
        ))
    }

    fn sequence(&self, cur: Cursor<'t>) -> Parsed<'t, SequenceNode> {
        let start = cur.position();
        let (keyword, cur) = self.expect(cur, TokenKind::Sequence)?;

        let mut by = None;
        let mut params = None;
        let mut disallowed = None;
        let mut cur = cur;
        // Tokens that may come next if the first term is missing.
        let expected: &[TokenKind] = match cur.kind() {
            TokenKind::By => {
                let (keys, next) = self.join_keys(cur)?;
                by = Some(keys);
                cur = next;
                if cur.check(TokenKind::With) {
                    let (p, next) = self.sequence_params(cur)?;
                    params = Some(p);
                    cur = next;
                    &[TokenKind::Lb]
                } else {
                    &[TokenKind::Comma, TokenKind::With, TokenKind::Lb]
                }
            }
            TokenKind::With => {
                let (p, next) = self.sequence_params(cur)?;
                params = Some(p);
                cur = next;
                if cur.check(TokenKind::By) {
                    let (keys, next) = self.join_keys(cur)?;
                    disallowed = Some(keys);
                    cur = next;
                    &[TokenKind::Comma, TokenKind::Lb]
                } else {
                    &[TokenKind::By, TokenKind::Lb]
                }
            }
            _ => &[TokenKind::By, TokenKind::With, TokenKind::Lb],
        };

        if !cur.check(TokenKind::Lb) {
            return Err(self.mismatch(cur, expected));
        }
        let mut terms = Vec::new();
        while cur.check(TokenKind::Lb) {
            let (term, next) = self.sequence_term(cur)?;
            terms.push(term);
            cur = next;
        }

        let (until, cur) = if cur.check(TokenKind::Until) {
            let (keyword, next) = cur.bump();
            let (term, next) = self.sequence_term(next)?;
            (Some(UntilNode { keyword, term }), next)
        } else {
            self.offer(cur, &[TokenKind::Lb, TokenKind::Until]);
            (None, cur)
        };

        Ok((
            SequenceNode {
                span: cur.span_from(start),
                keyword,
                by,
                params,
                disallowed,
                terms,
                until,
            },
            cur,
        ))
    }

    fn join(&self, cur: Cursor<'t>) -> Parsed<'t, JoinNode> {
        let start = cur.position();
        let (keyword, cur) = self.expect(cur, TokenKind::Join)?;

        let (by, mut cur) = if cur.check(TokenKind::By) {
            let (keys, next) = self.join_keys(cur)?;
            (Some(keys), next)
        } else {
            (None, cur)
        };

        if !cur.check(TokenKind::Lb) {
            let expected: &[TokenKind] = if by.is_some() {
                &[TokenKind::Comma, TokenKind::Lb]
            } else {
                &[TokenKind::By, TokenKind::Lb]
            };
            return Err(self.mismatch(cur, expected));
        }
        let mut terms = Vec::new();
        while cur.check(TokenKind::Lb) {
            let (term, next) = self.join_term(cur)?;
            terms.push(term);
            cur = next;
        }

        let (until, cur) = if cur.check(TokenKind::Until) {
            let (keyword, next) = cur.bump();
            let (term, next) = self.join_term(next)?;
            (Some(UntilNode { keyword, term }), next)
        } else {
            self.offer(cur, &[TokenKind::Lb, TokenKind::Until]);
            (None, cur)
        };

        Ok((
            JoinNode {
                span: cur.span_from(start),
                keyword,
                by,
                terms,
                until,
            },
            cur,
        ))
    }

    fn pipe(&self, cur: Cursor<'t>) -> Parsed<'t, PipeNode> {
        let start = cur.position();
        let (pipe, cur) = self.expect(cur, TokenKind::Pipe)?;
        let (kind, mut cur) = self.expect(cur, TokenKind::Identifier)?;

        let mut args = Vec::new();
        if EXPRESSION_START.contains(&cur.kind()) {
            loop {
                let (arg, next) = self.boolean_expression(cur, 1)?;
                args.push(arg);
                cur = next;
                if !cur.check(TokenKind::Comma) {
                    self.offer(cur, &[TokenKind::Comma]);
                    break;
                }
                cur = cur.bump().1;
            }
        } else {
            self.offer(cur, EXPRESSION_START);
        }

        Ok((
            PipeNode {
                span: cur.span_from(start),
                pipe,
                kind,
                args,
            },
            cur,
        ))
    }

    fn join_keys(&self, cur: Cursor<'t>) -> Parsed<'t, JoinKeysNode> {
        let (by, cur) = self.expect(cur, TokenKind::By)?;
        let (keys, cur) = self.expression_list(cur)?;
        Ok((JoinKeysNode { by, keys }, cur))
    }

    fn join_term(&self, cur: Cursor<'t>) -> Parsed<'t, JoinTermNode> {
        let start = cur.position();
        let (subquery, cur) = self.subquery(cur)?;
        let (by, cur) = self.optional_keys(cur)?;
        Ok((
            JoinTermNode {
                span: cur.span_from(start),
                subquery,
                by,
            },
            cur,
        ))
    }

    fn sequence_term(&self, cur: Cursor<'t>) -> Parsed<'t, SequenceTermNode> {
        let start = cur.position();
        let (subquery, cur) = self.subquery(cur)?;
        let (by, cur) = self.optional_keys(cur)?;

        let (parameter, cur) = if cur.check(TokenKind::With) {
            let (with, cur) = cur.bump();
            let (key, cur) = self.expect(cur, TokenKind::Identifier)?;
            let (assign, cur) = self.expect(cur, TokenKind::Asgn)?;
            let (value, cur) = self.number(cur)?;
            (
                Some(TermParameterNode {
                    with,
                    key,
                    assign,
                    value,
                }),
                cur,
            )
        } else {
            self.offer(cur, &[TokenKind::With]);
            (None, cur)
        };

        Ok((
            SequenceTermNode {
                span: cur.span_from(start),
                subquery,
                by,
                parameter,
            },
            cur,
        ))
    }

    fn optional_keys(&self, cur: Cursor<'t>) -> Parsed<'t, Option<JoinKeysNode>> {
        if cur.check(TokenKind::By) {
            let (keys, cur) = self.join_keys(cur)?;
            Ok((Some(keys), cur))
        } else {
            self.offer(cur, &[TokenKind::By]);
            Ok((None, cur))
        }
    }

    fn subquery(&self, cur: Cursor<'t>) -> Parsed<'t, SubqueryNode> {
        let (open, cur) = self.expect(cur, TokenKind::Lb)?;
        let (filter, cur) = self.event_filter(cur)?;
        let (close, cur) = self.expect(cur, TokenKind::Rb)?;
        Ok((
            SubqueryNode {
                open,
                filter,
                close,
            },
            cur,
        ))
    }

    fn event_filter(&self, cur: Cursor<'t>) -> Parsed<'t, EventFilterNode> {
        let start = cur.position();
        let (event, cur) = match cur.kind() {
            TokenKind::Any => {
                let (token, cur) = cur.bump();
                (EventValueNode::Any(token), cur)
            }
            TokenKind::String | TokenKind::Identifier => {
                let (token, cur) = cur.bump();
                (EventValueNode::Value(token), cur)
            }
            _ => return Err(self.mismatch(cur, EVENT_START)),
        };
        let (where_keyword, cur) = self.expect(cur, TokenKind::Where)?;
        let (condition, cur) = self.expression(cur)?;
        Ok((
            EventFilterNode {
                span: cur.span_from(start),
                event,
                where_keyword,
                condition,
            },
            cur,
        ))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn expression(&self, cur: Cursor<'t>) -> Parsed<'t, ExpressionNode> {
        let (boolean, cur) = self.boolean_expression(cur, 1)?;
        Ok((ExpressionNode { boolean }, cur))
    }

    /// `expression (',' expression)*`
    fn expression_list(&self, mut cur: Cursor<'t>) -> Parsed<'t, Vec<ExpressionNode>> {
        let mut expressions = Vec::new();
        loop {
            let (expression, next) = self.expression(cur)?;
            expressions.push(expression);
            cur = next;
            if !cur.check(TokenKind::Comma) {
                self.offer(cur, &[TokenKind::Comma]);
                return Ok((expressions, cur));
            }
            cur = cur.bump().1;
        }
    }

    fn boolean_expression(
        &self,
        cur: Cursor<'t>,
        min_precedence: u8,
    ) -> Parsed<'t, Box<BooleanExpressionNode>> {
        let depth = cur.depth;
        let cur = self.descend(cur)?;
        let start = cur.position();
        let (mut left, mut cur) = match (cur.kind(), cur.kind_at(1)) {
            (TokenKind::Not, _) => {
                let (not, next) = cur.bump();
                let (operand, next) = self.boolean_expression(next, NOT_PRECEDENCE)?;
                let node = BooleanExpressionNode::LogicalNot {
                    span: next.span_from(start),
                    not,
                    operand,
                };
                (Box::new(node), next)
            }
            (TokenKind::Identifier, TokenKind::Of) => self.process_check(cur)?,
            (kind, _) if EXPRESSION_START.contains(&kind) => {
                let (value, next) = self.value_expression(cur)?;
                (Box::new(BooleanExpressionNode::BooleanDefault(value)), next)
            }
            _ => return Err(self.mismatch(cur, EXPRESSION_START)),
        };

        loop {
            let precedence = match cur.kind() {
                TokenKind::And => 2,
                TokenKind::Or => 1,
                _ => break,
            };
            if precedence < min_precedence {
                break;
            }
            let (operator, next) = cur.bump();
            // The chain grows leftwards, one level per operator.
            let next = self.descend(next)?;
            let (right, next) = self.boolean_expression(next, precedence + 1)?;
            let node = BooleanExpressionNode::LogicalBinary {
                span: next.span_from(start),
                left,
                operator,
                right,
            };
            left = Box::new(node);
            cur = next;
        }
        self.offer(cur, LOGICAL_OPERATORS);
        Ok((left, cur.at_depth(depth)))
    }

    /// `relationship=IDENTIFIER OF subquery`
    fn process_check(&self, cur: Cursor<'t>) -> Parsed<'t, Box<BooleanExpressionNode>> {
        let start = cur.position();
        let (relationship, cur) = cur.bump();
        let (of, cur) = self.expect(cur, TokenKind::Of)?;
        let (subquery, cur) = self.subquery(cur)?;
        let node = BooleanExpressionNode::ProcessCheck {
            span: cur.span_from(start),
            relationship,
            of,
            subquery: Box::new(subquery),
        };
        Ok((Box::new(node), cur))
    }

    fn value_expression(&self, cur: Cursor<'t>) -> Parsed<'t, Box<ValueExpressionNode>> {
        let start = cur.position();
        let (left, cur) = self.operator_expression(cur, 1)?;
        if !COMPARISON_OPERATORS.contains(&cur.kind()) {
            self.offer(cur, COMPARISON_OPERATORS);
            return Ok((Box::new(ValueExpressionNode::Default(left)), cur));
        }
        let (token, cur) = cur.bump();
        let (right, cur) = self.operator_expression(cur, 1)?;
        let node = ValueExpressionNode::Comparison {
            span: cur.span_from(start),
            left,
            operator: ComparisonOperatorNode { token },
            right,
        };
        Ok((Box::new(node), cur))
    }

    fn operator_expression(
        &self,
        cur: Cursor<'t>,
        min_precedence: u8,
    ) -> Parsed<'t, Box<OperatorExpressionNode>> {
        let depth = cur.depth;
        let start = cur.position();
        let (mut left, mut cur) = match cur.kind() {
            TokenKind::Plus | TokenKind::Minus => {
                let (operator, next) = cur.bump();
                let next = self.descend(next)?;
                let (operand, next) = self.operator_expression(next, UNARY_PRECEDENCE)?;
                let node = OperatorExpressionNode::ArithmeticUnary {
                    span: next.span_from(start),
                    operator,
                    operand,
                };
                (Box::new(node), next.at_depth(depth))
            }
            _ => {
                self.offer(cur, &[TokenKind::Plus, TokenKind::Minus]);
                self.predicated(cur)?
            }
        };

        loop {
            let precedence = match cur.kind() {
                TokenKind::Asterisk | TokenKind::Slash | TokenKind::Percent => 2,
                TokenKind::Plus | TokenKind::Minus => 1,
                _ => break,
            };
            if precedence < min_precedence {
                break;
            }
            let (operator, next) = cur.bump();
            let next = self.descend(next)?;
            let (right, next) = self.operator_expression(next, precedence + 1)?;
            let node = OperatorExpressionNode::ArithmeticBinary {
                span: next.span_from(start),
                left,
                operator,
                right,
            };
            left = Box::new(node);
            cur = next;
        }
        self.offer(cur, ARITHMETIC_OPERATORS);
        Ok((left, cur.at_depth(depth)))
    }

    /// `primaryExpression predicate?`
    fn predicated(&self, cur: Cursor<'t>) -> Parsed<'t, Box<OperatorExpressionNode>> {
        let start = cur.position();
        let (primary, cur) = self.primary_expression(cur)?;
        let (predicate, cur) = if at_predicate(cur) {
            let (predicate, cur) = self.predicate(cur)?;
            (Some(Box::new(predicate)), cur)
        } else {
            self.offer(cur, PREDICATE_START);
            (None, cur)
        };
        let node = OperatorExpressionNode::Default {
            span: cur.span_from(start),
            primary,
            predicate,
        };
        Ok((Box::new(node), cur))
    }

    fn predicate(&self, cur: Cursor<'t>) -> Parsed<'t, PredicateNode> {
        let (not, cur) = if cur.check(TokenKind::Not) {
            let (not, next) = cur.bump();
            (Some(not), next)
        } else {
            (None, cur)
        };

        match cur.kind() {
            TokenKind::In | TokenKind::InInsensitive => {
                let (kind, cur) = cur.bump();
                let (_, cur) = self.expect(cur, TokenKind::Lp)?;
                let (expressions, cur) = self.expression_list(cur)?;
                let (_, cur) =
                    self.expect_one_of(cur, TokenKind::Rp, &[TokenKind::Comma, TokenKind::Rp])?;
                Ok((
                    PredicateNode {
                        not,
                        kind,
                        form: PredicateForm::Expressions(expressions),
                    },
                    cur,
                ))
            }
            TokenKind::Like
            | TokenKind::LikeInsensitive
            | TokenKind::Regex
            | TokenKind::RegexInsensitive
            | TokenKind::Seq
                if not.is_none() =>
            {
                let (kind, cur) = cur.bump();
                if cur.check(TokenKind::Lp) {
                    let (_, mut cur) = cur.bump();
                    let mut constants = Vec::new();
                    loop {
                        let (constant, next) = self.constant(cur)?;
                        constants.push(constant);
                        cur = next;
                        if !cur.check(TokenKind::Comma) {
                            break;
                        }
                        cur = cur.bump().1;
                    }
                    let (_, cur) = self.expect_one_of(
                        cur,
                        TokenKind::Rp,
                        &[TokenKind::Comma, TokenKind::Rp],
                    )?;
                    Ok((
                        PredicateNode {
                            not,
                            kind,
                            form: PredicateForm::Constants(constants),
                        },
                        cur,
                    ))
                } else {
                    let (constant, cur) = self.constant(cur)?;
                    Ok((
                        PredicateNode {
                            not,
                            kind,
                            form: PredicateForm::Constant(constant),
                        },
                        cur,
                    ))
                }
            }
            _ => Err(self.mismatch(cur, &[TokenKind::In, TokenKind::InInsensitive])),
        }
    }

    fn primary_expression(&self, cur: Cursor<'t>) -> Parsed<'t, Box<PrimaryExpressionNode>> {
        let (node, cur) = match (cur.kind(), cur.kind_at(1)) {
            (kind, _) if CONSTANT_START.contains(&kind) => {
                let (constant, cur) = self.constant(cur)?;
                (PrimaryExpressionNode::Constant(constant), cur)
            }
            (TokenKind::Identifier | TokenKind::TildeIdentifier, TokenKind::Lp) => {
                let (function, cur) = self.function_expression(cur)?;
                (PrimaryExpressionNode::Function(Box::new(function)), cur)
            }
            (TokenKind::TildeIdentifier, _) => {
                return Err(self.mismatch(cur.bump().1, &[TokenKind::Lp]));
            }
            (TokenKind::Identifier | TokenKind::QuotedIdentifier, _) => {
                let (name, cur) = self.qualified_name(cur)?;
                (PrimaryExpressionNode::Dereference(Box::new(name)), cur)
            }
            (TokenKind::Lp, _) => {
                let start = cur.position();
                let (open, cur) = cur.bump();
                let (expression, cur) = self.expression(cur)?;
                let (close, cur) = self.expect(cur, TokenKind::Rp)?;
                let node = PrimaryExpressionNode::Parenthesized {
                    span: cur.span_from(start),
                    open,
                    expression,
                    close,
                };
                (node, cur)
            }
            _ => return Err(self.mismatch(cur, PRIMARY_START)),
        };
        Ok((Box::new(node), cur))
    }

    fn function_expression(&self, cur: Cursor<'t>) -> Parsed<'t, FunctionExpressionNode> {
        let start = cur.position();
        let (token, cur) = cur.bump();
        let (_, cur) = self.expect(cur, TokenKind::Lp)?;
        let (args, cur) = if cur.check(TokenKind::Rp) {
            (Vec::new(), cur)
        } else {
            self.expression_list(cur)?
        };
        let (_, cur) = self.expect_one_of(cur, TokenKind::Rp, &[TokenKind::Comma, TokenKind::Rp])?;
        Ok((
            FunctionExpressionNode {
                span: cur.span_from(start),
                name: FunctionNameNode { token },
                args,
            },
            cur,
        ))
    }

    fn constant(&self, cur: Cursor<'t>) -> Parsed<'t, ConstantNode> {
        match cur.kind() {
            TokenKind::Null => {
                let (token, cur) = cur.bump();
                Ok((ConstantNode::Null(token), cur))
            }
            TokenKind::IntegerValue | TokenKind::DecimalValue => {
                let (number, cur) = self.number(cur)?;
                Ok((ConstantNode::Numeric(number), cur))
            }
            TokenKind::True | TokenKind::False => {
                let (token, cur) = cur.bump();
                Ok((ConstantNode::Boolean(BooleanValueNode { token }), cur))
            }
            TokenKind::String => {
                let (token, cur) = cur.bump();
                Ok((ConstantNode::String(StringNode { token }), cur))
            }
            _ => Err(self.mismatch(cur, CONSTANT_START)),
        }
    }

    fn qualified_name(&self, cur: Cursor<'t>) -> Parsed<'t, QualifiedNameNode> {
        let start = cur.position();
        let (first, mut cur) = self.identifier(cur)?;
        let mut suffixes = Vec::new();
        loop {
            match (cur.kind(), cur.kind_at(1)) {
                (TokenKind::Dot, _) => {
                    let (dot, next) = cur.bump();
                    let (name, next) = self.identifier(next)?;
                    suffixes.push(NameSuffixNode::Field { dot, name });
                    cur = next;
                }
                // Any other `[` opens the next term of a sequence or join.
                (TokenKind::Lb, TokenKind::IntegerValue) => {
                    let (open, mut next) = cur.bump();
                    let mut indices = Vec::new();
                    while next.check(TokenKind::IntegerValue) {
                        let (index, after) = self.number(next)?;
                        indices.push(index);
                        next = after;
                    }
                    let (close, next) = self.expect_one_of(
                        next,
                        TokenKind::Rb,
                        &[TokenKind::IntegerValue, TokenKind::Rb],
                    )?;
                    suffixes.push(NameSuffixNode::Index {
                        open,
                        indices,
                        close,
                    });
                    cur = next;
                }
                _ => {
                    self.offer(cur, &[TokenKind::Dot, TokenKind::Lb]);
                    break;
                }
            }
        }
        Ok((
            QualifiedNameNode {
                span: cur.span_from(start),
                first,
                suffixes,
            },
            cur,
        ))
    }

    fn identifier(&self, cur: Cursor<'t>) -> Parsed<'t, IdentifierNode> {
        match cur.kind() {
            TokenKind::Identifier | TokenKind::QuotedIdentifier => {
                let (token, cur) = cur.bump();
                Ok((IdentifierNode { token }, cur))
            }
            _ => Err(self.mismatch(cur, &[TokenKind::Identifier, TokenKind::QuotedIdentifier])),
        }
    }

    fn time_unit(&self, cur: Cursor<'t>) -> Parsed<'t, TimeUnitNode> {
        let (number, cur) = self.number(cur)?;
        if !cur.check(TokenKind::Identifier) {
            self.offer(cur, &[TokenKind::Identifier]);
            return Ok((TimeUnitNode { number, unit: None }, cur));
        }
        let (unit, cur) = cur.bump();
        if TimeUnit::parse(&unit.text).is_none() {
            return Err(ParseError::invalid(
                unit.position,
                format!(
                    "Unrecognized time unit [{}] in [{}{}], please specify one of [ms, s, m, h, d]",
                    unit.text,
                    number.token().text,
                    unit.text
                ),
            ));
        }
        Ok((
            TimeUnitNode {
                number,
                unit: Some(unit),
            },
            cur,
        ))
    }

    fn number(&self, cur: Cursor<'t>) -> Parsed<'t, NumberNode> {
        match cur.kind() {
            TokenKind::IntegerValue => {
                let (token, cur) = cur.bump();
                let value = token
                    .text
                    .parse::<i64>()
                    .map_err(|_| number_too_large(&token))?;
                Ok((NumberNode::Integer { token, value }, cur))
            }
            TokenKind::DecimalValue => {
                let (token, cur) = cur.bump();
                let value = parse_decimal(&token.text).ok_or_else(|| number_too_large(&token))?;
                Ok((NumberNode::Decimal { token, value }, cur))
            }
            _ => Err(self.mismatch(cur, &[TokenKind::DecimalValue, TokenKind::IntegerValue])),
        }
    }
}

/// `NOT` only starts a predicate as part of `not in` / `not in~`.
fn at_predicate(cur: Cursor<'_>) -> bool {
    match cur.kind() {
        TokenKind::In
        | TokenKind::InInsensitive
        | TokenKind::Like
        | TokenKind::LikeInsensitive
        | TokenKind::Regex
        | TokenKind::RegexInsensitive
        | TokenKind::Seq => true,
        TokenKind::Not => matches!(cur.kind_at(1), TokenKind::In | TokenKind::InInsensitive),
        _ => false,
    }
}

fn number_too_large(token: &Token) -> ParseError {
    ParseError::invalid(
        token.position,
        format!("Number [{}] is too large", token.text),
    )
}

/// Decodes `1.5`, `.5`, `1.`, `2E10`, `1.5e-3`.
fn parse_decimal(text: &str) -> Option<Decimal> {
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(at) => (&text[..at], text[at + 1..].parse::<i32>().ok()?),
        None => (text, 0),
    };
    if exponent.unsigned_abs() > 28 {
        return None;
    }

    let mut normalized = String::with_capacity(mantissa.len() + 2);
    if mantissa.starts_with('.') {
        normalized.push('0');
    }
    normalized.push_str(mantissa);
    if mantissa.ends_with('.') {
        normalized.push('0');
    }

    let mut value = normalized.parse::<Decimal>().ok()?;
    for _ in 0..exponent.unsigned_abs() {
        value = if exponent > 0 {
            value.checked_mul(Decimal::TEN)?
        } else {
            value.checked_div(Decimal::TEN)?
        };
    }
    Some(value)
}

/// Lexes, parses and builds in one call.
///
/// # Example
/// ```
/// use eql_front::parser::EqlParser;
///
/// let statement = EqlParser::new()
///     .create_statement(r#"process where process.name == "cmd.exe" | head 5"#)
///     .unwrap();
/// assert_eq!(statement.pipes.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EqlParser {
    config: ParserConfig,
}

impl EqlParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        EqlParser { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn create_statement(&self, eql: &str) -> Result<Statement, ParseError> {
        let tokens = tokenize(eql)?;
        let tree = Parser::new(&tokens, &self.config)
            .parse_single_statement()
            .inspect_err(|e| debug!(error = %e, "failed to parse statement"))?;
        let statement = AstBuilder::new(eql).build_statement(&tree)?;
        debug!(
            length = eql.len(),
            tokens = tokens.len(),
            pipes = statement.pipes.len(),
            "parsed statement"
        );
        Ok(statement)
    }

    pub fn create_expression(&self, eql: &str) -> Result<Expr, ParseError> {
        let tokens = tokenize(eql)?;
        let tree = Parser::new(&tokens, &self.config)
            .parse_single_expression()
            .inspect_err(|e| debug!(error = %e, "failed to parse expression"))?;
        let expression = AstBuilder::new(eql).build_expression(&tree)?;
        debug!(length = eql.len(), tokens = tokens.len(), "parsed expression");
        Ok(expression)
    }
}
