//! Rule-file grammars for the monitoring configs model.
//!
//! This crate provides:
//! - An expression parser with static type checking (`parse_expr`)
//! - The legacy statement grammar (`ALERT ... IF ...`, `name = expr`)
//! - The group-based YAML rule-file grammar (`rulefmt`)
//! - Label and duration helpers shared by all three

mod ast;
mod duration;
mod error;
mod functions;
mod labels;
mod lexer;
mod parser;

pub mod legacy;
pub mod rulefmt;

pub use ast::*;
pub use duration::{format_duration, parse_duration};
pub use error::{ParseError, Position};
pub use functions::Function;
pub use labels::{is_valid_label_name, is_valid_metric_name, Labels};
pub use parser::{parse_expr, parse_expr_with, Dialect};
