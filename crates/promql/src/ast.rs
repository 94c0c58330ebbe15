//! Expression tree produced by the parser.
//!
//! `Display` renders the canonical text of an expression. Canonical text of
//! a tree produced by the current dialect parses back into an equal tree.

use std::fmt;
use std::time::Duration;

use crate::duration::format_duration;
use crate::functions::Function;

/// Static type of an expression's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Scalar,
    Vector,
    Matrix,
    String,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Scalar => write!(f, "scalar"),
            ValueType::Vector => write!(f, "instant vector"),
            ValueType::Matrix => write!(f, "range vector"),
            ValueType::String => write!(f, "string"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    String(String),
    VectorSelector(VectorSelector),
    MatrixSelector(MatrixSelector),
    Call(Call),
    Aggregate(AggregateExpr),
    Binary(BinaryExpr),
    /// Unary minus applied to a non-literal operand.
    Neg(Box<Expr>),
    Paren(Box<Expr>),
}

impl Expr {
    pub fn value_type(&self) -> ValueType {
        match self {
            Expr::Number(_) => ValueType::Scalar,
            Expr::String(_) => ValueType::String,
            Expr::VectorSelector(_) => ValueType::Vector,
            Expr::MatrixSelector(_) => ValueType::Matrix,
            Expr::Call(call) => call.func.return_type,
            Expr::Aggregate(_) => ValueType::Vector,
            Expr::Binary(bin) => {
                if bin.lhs.value_type() == ValueType::Scalar
                    && bin.rhs.value_type() == ValueType::Scalar
                {
                    ValueType::Scalar
                } else {
                    ValueType::Vector
                }
            }
            Expr::Neg(inner) | Expr::Paren(inner) => inner.value_type(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchOp {
    Equal,
    NotEqual,
    RegexMatch,
    RegexNoMatch,
}

impl fmt::Display for MatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchOp::Equal => "=",
            MatchOp::NotEqual => "!=",
            MatchOp::RegexMatch => "=~",
            MatchOp::RegexNoMatch => "!~",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelMatcher {
    pub name: String,
    pub op: MatchOp,
    pub value: String,
}

impl LabelMatcher {
    /// Whether the matcher accepts the empty string (an absent label).
    pub fn matches_empty(&self) -> bool {
        match self.op {
            MatchOp::Equal => self.value.is_empty(),
            MatchOp::NotEqual => !self.value.is_empty(),
            MatchOp::RegexMatch | MatchOp::RegexNoMatch => {
                let full = regex::Regex::new(&format!("^(?:{})$", self.value))
                    .map(|re| re.is_match(""))
                    .unwrap_or(false);
                (self.op == MatchOp::RegexMatch) == full
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorSelector {
    pub name: Option<String>,
    /// Label matchers, excluding the implicit `__name__` matcher of `name`.
    pub matchers: Vec<LabelMatcher>,
    pub offset: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatrixSelector {
    pub selector: VectorSelector,
    pub range: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub func: &'static Function,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateOp {
    Sum,
    Min,
    Max,
    Avg,
    Stddev,
    Stdvar,
    Count,
    CountValues,
    Bottomk,
    Topk,
    Quantile,
}

impl AggregateOp {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "sum" => AggregateOp::Sum,
            "min" => AggregateOp::Min,
            "max" => AggregateOp::Max,
            "avg" => AggregateOp::Avg,
            "stddev" => AggregateOp::Stddev,
            "stdvar" => AggregateOp::Stdvar,
            "count" => AggregateOp::Count,
            "count_values" => AggregateOp::CountValues,
            "bottomk" => AggregateOp::Bottomk,
            "topk" => AggregateOp::Topk,
            "quantile" => AggregateOp::Quantile,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AggregateOp::Sum => "sum",
            AggregateOp::Min => "min",
            AggregateOp::Max => "max",
            AggregateOp::Avg => "avg",
            AggregateOp::Stddev => "stddev",
            AggregateOp::Stdvar => "stdvar",
            AggregateOp::Count => "count",
            AggregateOp::CountValues => "count_values",
            AggregateOp::Bottomk => "bottomk",
            AggregateOp::Topk => "topk",
            AggregateOp::Quantile => "quantile",
        }
    }

    /// Type of the leading parameter, for the operators that take one.
    pub fn param_type(self) -> Option<ValueType> {
        match self {
            AggregateOp::CountValues => Some(ValueType::String),
            AggregateOp::Bottomk | AggregateOp::Topk | AggregateOp::Quantile => {
                Some(ValueType::Scalar)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateExpr {
    pub op: AggregateOp,
    pub expr: Box<Expr>,
    pub param: Option<Box<Expr>>,
    pub grouping: Vec<String>,
    pub without: bool,
    /// Legacy-only modifier; rejected by the current dialect.
    pub keep_common: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eql,
    Neq,
    Gtr,
    Lss,
    Gte,
    Lte,
    And,
    Or,
    Unless,
}

impl BinaryOp {
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And | BinaryOp::Unless => 2,
            BinaryOp::Eql
            | BinaryOp::Neq
            | BinaryOp::Gtr
            | BinaryOp::Lss
            | BinaryOp::Gte
            | BinaryOp::Lte => 3,
            BinaryOp::Add | BinaryOp::Sub => 4,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 5,
            BinaryOp::Pow => 6,
        }
    }

    pub fn is_right_associative(self) -> bool {
        self == BinaryOp::Pow
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eql
                | BinaryOp::Neq
                | BinaryOp::Gtr
                | BinaryOp::Lss
                | BinaryOp::Gte
                | BinaryOp::Lte
        )
    }

    pub fn is_set_operator(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or | BinaryOp::Unless)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "^",
            BinaryOp::Eql => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::Gtr => ">",
            BinaryOp::Lss => "<",
            BinaryOp::Gte => ">=",
            BinaryOp::Lte => "<=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Unless => "unless",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    OneToOne,
    ManyToOne,
    OneToMany,
    ManyToMany,
}

/// Explicit `on`/`ignoring` clause of a binary expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorMatching {
    pub cardinality: Cardinality,
    /// `true` for `on(...)`, `false` for `ignoring(...)`.
    pub on: bool,
    pub labels: Vec<String>,
    /// Extra labels copied from the "one" side by `group_left`/`group_right`.
    pub include: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub return_bool: bool,
    pub matching: Option<VectorMatching>,
}

/// Escape a string for inclusion between double quotes.
pub(crate) fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

fn write_label_list(f: &mut fmt::Formatter<'_>, labels: &[String]) -> fmt::Result {
    write!(f, "({})", labels.join(", "))
}

fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Inf" } else { "-Inf" })
    } else {
        write!(f, "{}", n)
    }
}

impl fmt::Display for VectorSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            f.write_str(name)?;
        }
        if !self.matchers.is_empty() || self.name.is_none() {
            f.write_str("{")?;
            for (i, m) in self.matchers.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}{}\"{}\"", m.name, m.op, escape_string(&m.value))?;
            }
            f.write_str("}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write_number(f, *n),
            Expr::String(s) => write!(f, "\"{}\"", escape_string(s)),
            Expr::VectorSelector(sel) => {
                write!(f, "{}", sel)?;
                if let Some(offset) = sel.offset {
                    write!(f, " offset {}", format_duration(offset))?;
                }
                Ok(())
            }
            Expr::MatrixSelector(m) => {
                write!(f, "{}[{}]", m.selector, format_duration(m.range))?;
                if let Some(offset) = m.selector.offset {
                    write!(f, " offset {}", format_duration(offset))?;
                }
                Ok(())
            }
            Expr::Call(call) => {
                write!(f, "{}(", call.func.name)?;
                for (i, arg) in call.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            Expr::Aggregate(agg) => {
                f.write_str(agg.op.as_str())?;
                if agg.without {
                    f.write_str(" without ")?;
                    write_label_list(f, &agg.grouping)?;
                } else if !agg.grouping.is_empty() {
                    f.write_str(" by ")?;
                    write_label_list(f, &agg.grouping)?;
                }
                if agg.keep_common {
                    f.write_str(" keep_common")?;
                }
                if agg.without || !agg.grouping.is_empty() || agg.keep_common {
                    f.write_str(" ")?;
                }
                f.write_str("(")?;
                if let Some(param) = &agg.param {
                    write!(f, "{}, ", param)?;
                }
                write!(f, "{})", agg.expr)
            }
            Expr::Binary(bin) => {
                write!(f, "{} {}", bin.lhs, bin.op.as_str())?;
                if bin.return_bool {
                    f.write_str(" bool")?;
                }
                if let Some(matching) = &bin.matching {
                    f.write_str(if matching.on { " on" } else { " ignoring" })?;
                    write_label_list(f, &matching.labels)?;
                    match matching.cardinality {
                        Cardinality::ManyToOne => {
                            f.write_str(" group_left")?;
                            write_label_list(f, &matching.include)?;
                        }
                        Cardinality::OneToMany => {
                            f.write_str(" group_right")?;
                            write_label_list(f, &matching.include)?;
                        }
                        Cardinality::OneToOne | Cardinality::ManyToMany => {}
                    }
                }
                write!(f, " {}", bin.rhs)
            }
            Expr::Neg(inner) => write!(f, "-{}", inner),
            Expr::Paren(inner) => write!(f, "({})", inner),
        }
    }
}
