//! Function table used to resolve and type-check calls.

use crate::ast::ValueType;
use crate::parser::Dialect;

use crate::ast::ValueType::{Matrix, Scalar, String as Str, Vector};

/// Signature of a built-in function.
#[derive(Debug, PartialEq, Eq)]
pub struct Function {
    pub name: &'static str,
    pub arg_types: &'static [ValueType],
    /// `0`: exact arity. `n > 0`: up to `n` trailing arguments may be
    /// omitted. `-1`: the last argument type repeats without bound.
    pub variadic: i32,
    pub return_type: ValueType,
}

macro_rules! func {
    ($name:literal, [$($arg:expr),*], $variadic:expr, $ret:expr) => {
        Function {
            name: $name,
            arg_types: &[$($arg),*],
            variadic: $variadic,
            return_type: $ret,
        }
    };
}

static FUNCTIONS: &[Function] = &[
    func!("abs", [Vector], 0, Vector),
    func!("absent", [Vector], 0, Vector),
    func!("avg_over_time", [Matrix], 0, Vector),
    func!("ceil", [Vector], 0, Vector),
    func!("changes", [Matrix], 0, Vector),
    func!("clamp_max", [Vector, Scalar], 0, Vector),
    func!("clamp_min", [Vector, Scalar], 0, Vector),
    func!("count_over_time", [Matrix], 0, Vector),
    func!("day_of_month", [Vector], 1, Vector),
    func!("day_of_week", [Vector], 1, Vector),
    func!("days_in_month", [Vector], 1, Vector),
    func!("delta", [Matrix], 0, Vector),
    func!("deriv", [Matrix], 0, Vector),
    func!("exp", [Vector], 0, Vector),
    func!("floor", [Vector], 0, Vector),
    func!("histogram_quantile", [Scalar, Vector], 0, Vector),
    func!("holt_winters", [Matrix, Scalar, Scalar], 0, Vector),
    func!("hour", [Vector], 1, Vector),
    func!("idelta", [Matrix], 0, Vector),
    func!("increase", [Matrix], 0, Vector),
    func!("irate", [Matrix], 0, Vector),
    func!("label_join", [Vector, Str, Str, Str], -1, Vector),
    func!("label_replace", [Vector, Str, Str, Str, Str], 0, Vector),
    func!("ln", [Vector], 0, Vector),
    func!("log10", [Vector], 0, Vector),
    func!("log2", [Vector], 0, Vector),
    func!("max_over_time", [Matrix], 0, Vector),
    func!("min_over_time", [Matrix], 0, Vector),
    func!("minute", [Vector], 1, Vector),
    func!("month", [Vector], 1, Vector),
    func!("predict_linear", [Matrix, Scalar], 0, Vector),
    func!("quantile_over_time", [Scalar, Matrix], 0, Vector),
    func!("rate", [Matrix], 0, Vector),
    func!("resets", [Matrix], 0, Vector),
    func!("round", [Vector, Scalar], 1, Vector),
    func!("scalar", [Vector], 0, Scalar),
    func!("sort", [Vector], 0, Vector),
    func!("sort_desc", [Vector], 0, Vector),
    func!("sqrt", [Vector], 0, Vector),
    func!("stddev_over_time", [Matrix], 0, Vector),
    func!("stdvar_over_time", [Matrix], 0, Vector),
    func!("sum_over_time", [Matrix], 0, Vector),
    func!("time", [], 0, Scalar),
    func!("timestamp", [Vector], 0, Vector),
    func!("vector", [Scalar], 0, Vector),
    func!("year", [Vector], 1, Vector),
];

/// Functions that only exist in the legacy dialect.
static LEGACY_FUNCTIONS: &[Function] = &[
    func!("count_scalar", [Vector], 0, Scalar),
    func!("drop_common_labels", [Vector], 0, Vector),
];

/// Look up a function by its exact name.
pub(crate) fn lookup(name: &str, dialect: Dialect) -> Option<&'static Function> {
    FUNCTIONS.iter().find(|f| f.name == name).or_else(|| match dialect {
        Dialect::Legacy => LEGACY_FUNCTIONS.iter().find(|f| f.name == name),
        Dialect::Current => None,
    })
}

impl Function {
    /// Validate the number of arguments supplied in a call.
    pub(crate) fn check_arity(&self, got: usize) -> Result<(), String> {
        let declared = self.arg_types.len();
        let ok = match self.variadic {
            0 => got == declared,
            -1 => got >= declared.saturating_sub(1),
            n => got <= declared && got >= declared.saturating_sub(n as usize),
        };
        if ok {
            return Ok(());
        }
        let expected = match self.variadic {
            0 => format!("{}", declared),
            -1 => format!("at least {}", declared.saturating_sub(1)),
            n => format!("{} to {}", declared.saturating_sub(n as usize), declared),
        };
        Err(format!(
            "expected {} argument(s) in call to \"{}\", got {}",
            expected, self.name, got
        ))
    }

    /// Expected type of the argument at `index` (the last type repeats).
    pub(crate) fn arg_type(&self, index: usize) -> Option<ValueType> {
        self.arg_types
            .get(index)
            .or_else(|| self.arg_types.last())
            .copied()
    }
}
