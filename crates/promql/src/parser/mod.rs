//! Recursive-descent expression parser with precedence climbing.
//!
//! The same [`Parser`] drives the legacy statement grammar; [`Dialect`]
//! selects the keyword and function set.

mod check;

#[cfg(test)]
mod tests;

use std::time::Duration;

use crate::ast::*;
use crate::error::ParseError;
use crate::functions;
use crate::labels::{is_valid_label_name, Labels};
use crate::lexer::{tokenize, Token, TokenKind};

/// Which revision of the expression language to accept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// The current grammar.
    #[default]
    Current,
    /// The legacy grammar: adds the `keep_common` aggregation modifier and
    /// the `count_scalar` / `drop_common_labels` functions.
    Legacy,
}

const KEYWORDS: &[&str] = &[
    "and",
    "or",
    "unless",
    "by",
    "without",
    "on",
    "ignoring",
    "group_left",
    "group_right",
    "bool",
    "offset",
];

const LEGACY_KEYWORDS: &[&str] = &["alert", "if", "for", "labels", "annotations", "keep_common"];

/// Parse an expression in the current dialect.
pub fn parse_expr(input: &str) -> Result<Expr, ParseError> {
    parse_expr_with(input, Dialect::Current)
}

/// Parse an expression in the given dialect.
pub fn parse_expr_with(input: &str, dialect: Dialect) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(input, dialect)?;
    if parser.at_eof() {
        return Err(parser.error_here("no expression found in input"));
    }
    let expr = parser.expression()?;
    if !parser.at_eof() {
        return Err(parser.unexpected("expression"));
    }
    Ok(expr)
}

pub(crate) struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    dialect: Dialect,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(input: &'a str, dialect: Dialect) -> Result<Self, ParseError> {
        Ok(Self {
            input,
            tokens: tokenize(input)?,
            pos: 0,
            dialect,
        })
    }

    // ── Token helpers ───────────────────────────────────────────────

    fn peek(&self) -> &Token {
        // The token stream always ends with Eof and `advance` never moves past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn peek_nth_kind(&self, n: usize) -> &TokenKind {
        &self.tokens[(self.pos + n).min(self.tokens.len() - 1)].kind
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn at_eof(&self) -> bool {
        *self.peek_kind() == TokenKind::Eof
    }

    pub(crate) fn offset(&self) -> usize {
        self.peek().offset
    }

    pub(crate) fn error_at(&self, offset: usize, message: impl Into<String>) -> ParseError {
        ParseError::new(self.input, offset, message)
    }

    pub(crate) fn error_here(&self, message: impl Into<String>) -> ParseError {
        self.error_at(self.offset(), message)
    }

    pub(crate) fn unexpected(&self, context: &str) -> ParseError {
        self.error_here(format!("unexpected {} in {}", self.peek_kind().describe(), context))
    }

    fn expect(&mut self, kind: TokenKind, context: &str) -> Result<Token, ParseError> {
        if *self.peek_kind() == kind {
            return Ok(self.advance());
        }
        Err(self.error_here(format!(
            "unexpected {} in {}, expected {}",
            self.peek_kind().describe(),
            context,
            kind.describe()
        )))
    }

    /// Whether the next token is the identifier `keyword` (case-insensitive).
    pub(crate) fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek_kind(), TokenKind::Ident(name) if name.eq_ignore_ascii_case(keyword))
    }

    fn is_keyword(&self, name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        KEYWORDS.contains(&lower.as_str())
            || (self.dialect == Dialect::Legacy && LEGACY_KEYWORDS.contains(&lower.as_str()))
    }

    pub(crate) fn expect_ident(&mut self, context: &str) -> Result<String, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(self.error_here(format!(
                "unexpected {} in {}, expected identifier",
                other.describe(),
                context
            ))),
        }
    }

    pub(crate) fn expect_duration(&mut self, context: &str) -> Result<Duration, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Duration(d) => {
                self.advance();
                Ok(d)
            }
            other => Err(self.error_here(format!(
                "unexpected {} in {}, expected duration",
                other.describe(),
                context
            ))),
        }
    }

    fn expect_string(&mut self, context: &str) -> Result<String, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Str(s) => {
                self.advance();
                Ok(s)
            }
            other => Err(self.error_here(format!(
                "unexpected {} in {}, expected string",
                other.describe(),
                context
            ))),
        }
    }

    fn expect_label_name(&mut self, context: &str) -> Result<String, ParseError> {
        let offset = self.offset();
        let name = self.expect_ident(context)?;
        if !is_valid_label_name(&name) {
            return Err(self.error_at(offset, format!("invalid label name \"{}\"", name)));
        }
        Ok(name)
    }

    // ── Expressions ─────────────────────────────────────────────────

    /// Parse one complete expression, stopping at the first token that
    /// cannot continue it.
    pub(crate) fn expression(&mut self) -> Result<Expr, ParseError> {
        self.expr_bp(0)
    }

    fn peek_binary_op(&self) -> Option<BinaryOp> {
        Some(match self.peek_kind() {
            TokenKind::Add => BinaryOp::Add,
            TokenKind::Sub => BinaryOp::Sub,
            TokenKind::Mul => BinaryOp::Mul,
            TokenKind::Div => BinaryOp::Div,
            TokenKind::Mod => BinaryOp::Mod,
            TokenKind::Pow => BinaryOp::Pow,
            TokenKind::Eql => BinaryOp::Eql,
            TokenKind::Neq => BinaryOp::Neq,
            TokenKind::Gtr => BinaryOp::Gtr,
            TokenKind::Lss => BinaryOp::Lss,
            TokenKind::Gte => BinaryOp::Gte,
            TokenKind::Lte => BinaryOp::Lte,
            TokenKind::Ident(name) if name.eq_ignore_ascii_case("and") => BinaryOp::And,
            TokenKind::Ident(name) if name.eq_ignore_ascii_case("or") => BinaryOp::Or,
            TokenKind::Ident(name) if name.eq_ignore_ascii_case("unless") => BinaryOp::Unless,
            _ => return None,
        })
    }

    fn expr_bp(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.unary()?;

        while let Some(op) = self.peek_binary_op() {
            if op.precedence() < min_prec {
                break;
            }
            let op_offset = self.advance().offset;
            let (return_bool, matching) = self.binary_modifiers(op)?;
            let next_min = if op.is_right_associative() {
                op.precedence()
            } else {
                op.precedence() + 1
            };
            let rhs = self.expr_bp(next_min)?;

            let bin = BinaryExpr {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                return_bool,
                matching,
            };
            check::binary(&bin).map_err(|m| self.error_at(op_offset, m))?;
            lhs = Expr::Binary(bin);
        }

        Ok(lhs)
    }

    fn binary_modifiers(
        &mut self,
        op: BinaryOp,
    ) -> Result<(bool, Option<VectorMatching>), ParseError> {
        let mut return_bool = false;
        if self.peek_keyword("bool") {
            if !op.is_comparison() {
                return Err(
                    self.error_here("bool modifier can only be used on comparison operators")
                );
            }
            self.advance();
            return_bool = true;
        }

        let on = self.peek_keyword("on");
        if !on && !self.peek_keyword("ignoring") {
            if self.peek_keyword("group_left") || self.peek_keyword("group_right") {
                return Err(
                    self.error_here("group modifiers require a preceding on() or ignoring() clause")
                );
            }
            return Ok((return_bool, None));
        }
        self.advance();
        let labels = self.grouping_labels()?;

        let mut cardinality = if op.is_set_operator() {
            Cardinality::ManyToMany
        } else {
            Cardinality::OneToOne
        };
        let mut include = Vec::new();
        let group_left = self.peek_keyword("group_left");
        if group_left || self.peek_keyword("group_right") {
            if op.is_set_operator() {
                return Err(self.error_here(format!(
                    "no grouping allowed for \"{}\" operation",
                    op.as_str()
                )));
            }
            self.advance();
            if *self.peek_kind() == TokenKind::LParen {
                include = self.grouping_labels()?;
            }
            cardinality = if group_left {
                Cardinality::ManyToOne
            } else {
                Cardinality::OneToMany
            };
        }

        let matching = VectorMatching {
            cardinality,
            on,
            labels,
            include,
        };
        check::matching(&matching).map_err(|m| self.error_here(m))?;
        Ok((return_bool, Some(matching)))
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        let negate = match self.peek_kind() {
            TokenKind::Sub => true,
            TokenKind::Add => false,
            _ => return self.postfix(),
        };
        let offset = self.advance().offset;
        let operand = self.expr_bp(BinaryOp::Pow.precedence())?;
        check::unary(&operand).map_err(|m| self.error_at(offset, m))?;

        Ok(match operand {
            _ if !negate => operand,
            Expr::Number(n) => Expr::Number(-n),
            other => Expr::Neg(Box::new(other)),
        })
    }

    fn postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;

        if *self.peek_kind() == TokenKind::LBracket {
            let offset = self.offset();
            let selector = match expr {
                Expr::VectorSelector(sel) if sel.offset.is_none() => sel,
                _ => return Err(self.error_at(offset, "ranges only allowed for vector selectors")),
            };
            self.advance();
            let range = self.expect_duration("range selector")?;
            self.expect(TokenKind::RBracket, "range selector")?;
            expr = Expr::MatrixSelector(MatrixSelector { selector, range });
        }

        if self.peek_keyword("offset") {
            let offset = self.advance().offset;
            let d = self.expect_duration("offset modifier")?;
            let selector = match &mut expr {
                Expr::VectorSelector(sel) => sel,
                Expr::MatrixSelector(m) => &mut m.selector,
                _ => {
                    return Err(self.error_at(
                        offset,
                        "offset modifier must be preceded by an instant or range selector",
                    ))
                }
            };
            if selector.offset.is_some() {
                return Err(self.error_at(offset, "offset may not be set multiple times"));
            }
            selector.offset = Some(d);
        }

        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr::Number(n))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Expr::String(s))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.expression()?;
                if *self.peek_kind() != TokenKind::RParen {
                    return Err(self.error_at(token.offset, "unclosed left parenthesis"));
                }
                self.advance();
                Ok(Expr::Paren(Box::new(inner)))
            }
            TokenKind::LBrace => self.selector(None, token.offset),
            TokenKind::Ident(name) => {
                if name.eq_ignore_ascii_case("inf") {
                    self.advance();
                    return Ok(Expr::Number(f64::INFINITY));
                }
                if name.eq_ignore_ascii_case("nan") {
                    self.advance();
                    return Ok(Expr::Number(f64::NAN));
                }
                if let Some(op) = AggregateOp::from_name(&name) {
                    return self.aggregate(op, token.offset);
                }
                if *self.peek_nth_kind(1) == TokenKind::LParen {
                    return self.call(&name, token.offset);
                }
                if self.is_keyword(&name) {
                    return Err(self.unexpected("expression"));
                }
                self.advance();
                self.selector(Some(name), token.offset)
            }
            TokenKind::Eof => Err(self.error_here("unexpected end of input")),
            _ => Err(self.unexpected("expression")),
        }
    }

    fn selector(&mut self, name: Option<String>, offset: usize) -> Result<Expr, ParseError> {
        let matchers = if *self.peek_kind() == TokenKind::LBrace {
            self.label_matchers()?
        } else {
            Vec::new()
        };
        let sel = VectorSelector {
            name,
            matchers,
            offset: None,
        };
        check::selector(&sel).map_err(|m| self.error_at(offset, m))?;
        Ok(Expr::VectorSelector(sel))
    }

    fn label_matchers(&mut self) -> Result<Vec<LabelMatcher>, ParseError> {
        self.expect(TokenKind::LBrace, "label matching")?;
        let mut matchers = Vec::new();

        loop {
            if *self.peek_kind() == TokenKind::RBrace {
                self.advance();
                break;
            }
            let name = self.expect_label_name("label matching")?;
            let op = match self.peek_kind() {
                TokenKind::Assign => MatchOp::Equal,
                TokenKind::Neq => MatchOp::NotEqual,
                TokenKind::RegexMatch => MatchOp::RegexMatch,
                TokenKind::RegexNoMatch => MatchOp::RegexNoMatch,
                other => {
                    return Err(self.error_here(format!(
                        "unexpected {} in label matching, expected label matching operator",
                        other.describe()
                    )))
                }
            };
            self.advance();
            let value_offset = self.offset();
            let value = self.expect_string("label matching")?;
            if matches!(op, MatchOp::RegexMatch | MatchOp::RegexNoMatch) {
                if let Err(e) = regex::Regex::new(&format!("^(?:{})$", value)) {
                    return Err(self.error_at(
                        value_offset,
                        format!("invalid regular expression in label matcher: {}", e),
                    ));
                }
            }
            matchers.push(LabelMatcher { name, op, value });

            match self.peek_kind() {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                other => {
                    return Err(self.error_here(format!(
                        "unexpected {} in label matching, expected \",\" or \"}}\"",
                        other.describe()
                    )))
                }
            }
        }

        Ok(matchers)
    }

    fn grouping_labels(&mut self) -> Result<Vec<String>, ParseError> {
        self.expect(TokenKind::LParen, "grouping opts")?;
        let mut labels = Vec::new();
        loop {
            if *self.peek_kind() == TokenKind::RParen {
                self.advance();
                break;
            }
            labels.push(self.expect_label_name("grouping opts")?);
            match self.peek_kind() {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::RParen => {
                    self.advance();
                    break;
                }
                other => {
                    return Err(self.error_here(format!(
                        "unexpected {} in grouping opts, expected \",\" or \")\"",
                        other.describe()
                    )))
                }
            }
        }
        Ok(labels)
    }

    /// Parse `by (...)`, `without (...)` and, in the legacy dialect,
    /// `keep_common`, in any order.
    fn aggregate_modifiers(
        &mut self,
        grouping: &mut Option<(Vec<String>, bool)>,
        keep_common: &mut bool,
    ) -> Result<(), ParseError> {
        loop {
            let without = self.peek_keyword("without");
            if without || self.peek_keyword("by") {
                if grouping.is_some() {
                    return Err(
                        self.error_here("aggregation must only contain one grouping clause")
                    );
                }
                self.advance();
                *grouping = Some((self.grouping_labels()?, without));
            } else if self.dialect == Dialect::Legacy && self.peek_keyword("keep_common") {
                if *keep_common {
                    return Err(self.error_here("keep_common may only be set once"));
                }
                self.advance();
                *keep_common = true;
            } else {
                return Ok(());
            }
        }
    }

    fn aggregate(&mut self, op: AggregateOp, offset: usize) -> Result<Expr, ParseError> {
        self.advance();
        let mut grouping = None;
        let mut keep_common = false;
        self.aggregate_modifiers(&mut grouping, &mut keep_common)?;

        self.expect(TokenKind::LParen, "aggregation")?;
        if *self.peek_kind() == TokenKind::RParen {
            return Err(self.error_here("no arguments for aggregate expression provided"));
        }
        let first = self.expression()?;
        let (param, expr) = if *self.peek_kind() == TokenKind::Comma {
            self.advance();
            (Some(Box::new(first)), self.expression()?)
        } else {
            (None, first)
        };
        self.expect(TokenKind::RParen, "aggregation")?;

        self.aggregate_modifiers(&mut grouping, &mut keep_common)?;
        let (grouping, without) = grouping.unwrap_or_default();

        let agg = AggregateExpr {
            op,
            expr: Box::new(expr),
            param,
            grouping,
            without,
            keep_common,
        };
        check::aggregate(&agg).map_err(|m| self.error_at(offset, m))?;
        Ok(Expr::Aggregate(agg))
    }

    fn call(&mut self, name: &str, offset: usize) -> Result<Expr, ParseError> {
        let func = functions::lookup(name, self.dialect)
            .ok_or_else(|| {
                self.error_at(offset, format!("unknown function with name \"{}\"", name))
            })?;
        self.advance();
        self.expect(TokenKind::LParen, "function call")?;

        let mut args = Vec::new();
        if *self.peek_kind() == TokenKind::RParen {
            self.advance();
        } else {
            loop {
                args.push(self.expression()?);
                match self.peek_kind() {
                    TokenKind::Comma => {
                        self.advance();
                    }
                    TokenKind::RParen => {
                        self.advance();
                        break;
                    }
                    other => {
                        return Err(self.error_here(format!(
                            "unexpected {} in function call, expected \",\" or \")\"",
                            other.describe()
                        )))
                    }
                }
            }
        }

        let call = Call { func, args };
        check::call(&call).map_err(|m| self.error_at(offset, m))?;
        Ok(Expr::Call(call))
    }

    // ── Label sets (legacy statements) ──────────────────────────────

    /// Parse `{ name = "value", ... }`.
    pub(crate) fn label_set(&mut self) -> Result<Labels, ParseError> {
        self.expect(TokenKind::LBrace, "label set")?;
        let mut labels = Labels::new();
        loop {
            if *self.peek_kind() == TokenKind::RBrace {
                self.advance();
                break;
            }
            let offset = self.offset();
            let name = self.expect_label_name("label set")?;
            self.expect(TokenKind::Assign, "label set")?;
            let value = self.expect_string("label set")?;
            if labels.insert(name.clone(), value).is_some() {
                return Err(self.error_at(offset, format!("duplicate label name \"{}\"", name)));
            }
            match self.peek_kind() {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                other => {
                    return Err(self.error_here(format!(
                        "unexpected {} in label set, expected \",\" or \"}}\"",
                        other.describe()
                    )))
                }
            }
        }
        Ok(labels)
    }
}
