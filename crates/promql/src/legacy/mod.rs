//! Legacy statement-based rule grammar.
//!
//! ```text
//! ALERT <name> IF <expr> [FOR <duration>] [LABELS <labelset>] [ANNOTATIONS <labelset>]
//! <metric name>[<labelset>] = <expr>
//! ```
//!
//! Keywords are case-insensitive, `#` starts a comment and statements are
//! separated by whitespace only. Expressions use [`Dialect::Legacy`].


use std::time::Duration;

use tracing::debug;

use crate::ast::{Expr, ValueType};
use crate::error::ParseError;
use crate::labels::{is_valid_metric_name, Labels};
use crate::lexer::TokenKind;
use crate::parser::{Dialect, Parser};

/// A single rule statement.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Statement {
    Alert(AlertStmt),
    Record(RecordStmt),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertStmt {
    pub name: String,
    pub expr: Expr,
    /// How long the condition must hold before the alert fires.
    pub duration: Duration,
    pub labels: Labels,
    pub annotations: Labels,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordStmt {
    pub name: String,
    pub expr: Expr,
    pub labels: Labels,
}

/// Parse a legacy rule file into its statements, in source order.
pub fn parse_stmts(input: &str) -> Result<Vec<Statement>, ParseError> {
    let mut parser = Parser::new(input, Dialect::Legacy)?;
    let mut stmts = Vec::new();

    while !parser.at_eof() {
        let stmt = if parser.peek_keyword("alert") {
            alert_stmt(&mut parser)?
        } else {
            record_stmt(&mut parser)?
        };
        stmts.push(stmt);
    }

    debug!(statements = stmts.len(), "parsed legacy rule statements");
    Ok(stmts)
}

fn alert_stmt(p: &mut Parser<'_>) -> Result<Statement, ParseError> {
    p.advance();
    let name = p.expect_ident("alert statement")?;

    if !p.peek_keyword("if") {
        return Err(p.unexpected("alert statement, expected IF"));
    }
    p.advance();

    let expr_offset = p.offset();
    let expr = p.expression()?;
    if expr.value_type() != ValueType::Vector {
        return Err(p.error_at(
            expr_offset,
            format!(
                "alert statement must have an expression of type instant vector, got {}",
                expr.value_type()
            ),
        ));
    }

    let mut duration = Duration::ZERO;
    if p.peek_keyword("for") {
        p.advance();
        duration = p.expect_duration("alert statement")?;
    }

    let mut labels = Labels::new();
    if p.peek_keyword("labels") {
        p.advance();
        labels = p.label_set()?;
    }

    let mut annotations = Labels::new();
    if p.peek_keyword("annotations") {
        p.advance();
        annotations = p.label_set()?;
    }

    Ok(Statement::Alert(AlertStmt {
        name,
        expr,
        duration,
        labels,
        annotations,
    }))
}

fn record_stmt(p: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let name_offset = p.offset();
    let name = match p.advance().kind {
        TokenKind::Ident(name) => name,
        other => {
            return Err(p.error_at(
                name_offset,
                format!(
                    "unexpected {} in statement, expected ALERT or a metric name",
                    other.describe()
                ),
            ))
        }
    };
    if !is_valid_metric_name(&name) {
        return Err(p.error_at(name_offset, format!("invalid recording rule name \"{}\"", name)));
    }

    let labels = if *p.peek_kind() == TokenKind::LBrace {
        p.label_set()?
    } else {
        Labels::new()
    };

    if *p.peek_kind() != TokenKind::Assign {
        return Err(p.unexpected("record statement, expected \"=\""));
    }
    p.advance();

    let expr_offset = p.offset();
    let expr = p.expression()?;
    if !matches!(expr.value_type(), ValueType::Vector | ValueType::Scalar) {
        return Err(p.error_at(
            expr_offset,
            format!(
                "record statement must have an expression of type instant vector or scalar, got {}",
                expr.value_type()
            ),
        ));
    }

    Ok(Statement::Record(RecordStmt { name, expr, labels }))
}
