//! Rules as handed to the evaluation engine.

use std::fmt;
use std::time::Duration;

use vigil_promql::{Expr, Labels};

/// Which kind of rule a [`Rule`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Alerting,
    Recording,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Alerting => write!(f, "alerting"),
            RuleKind::Recording => write!(f, "recording"),
        }
    }
}

/// A parsed, evaluable rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Alerting(AlertingRule),
    Recording(RecordingRule),
}

impl Rule {
    pub fn name(&self) -> &str {
        match self {
            Rule::Alerting(r) => &r.name,
            Rule::Recording(r) => &r.name,
        }
    }

    pub fn expr(&self) -> &Expr {
        match self {
            Rule::Alerting(r) => &r.expr,
            Rule::Recording(r) => &r.expr,
        }
    }

    pub fn labels(&self) -> &Labels {
        match self {
            Rule::Alerting(r) => &r.labels,
            Rule::Recording(r) => &r.labels,
        }
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::Alerting(_) => RuleKind::Alerting,
            Rule::Recording(_) => RuleKind::Recording,
        }
    }

    pub fn as_alerting(&self) -> Option<&AlertingRule> {
        match self {
            Rule::Alerting(r) => Some(r),
            Rule::Recording(_) => None,
        }
    }

    pub fn as_recording(&self) -> Option<&RecordingRule> {
        match self {
            Rule::Recording(r) => Some(r),
            Rule::Alerting(_) => None,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rule {}: {}", self.kind(), self.name(), self.expr())
    }
}

/// An alert that fires once its expression has returned results for
/// `hold_duration`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertingRule {
    pub name: String,
    pub expr: Expr,
    pub hold_duration: Duration,
    pub labels: Labels,
    pub annotations: Labels,
    /// Set when pending state has been restored from storage. Rules built
    /// from a configuration start restored, so no restoration is attempted.
    pub restored: bool,
}

impl AlertingRule {
    pub fn new(
        name: impl Into<String>,
        expr: Expr,
        hold_duration: Duration,
        labels: Labels,
        annotations: Labels,
    ) -> Self {
        Self {
            name: name.into(),
            expr,
            hold_duration,
            labels,
            annotations,
            restored: true,
        }
    }
}

/// A rule whose result is stored as a new series named `name`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingRule {
    pub name: String,
    pub expr: Expr,
    pub labels: Labels,
}

impl RecordingRule {
    pub fn new(name: impl Into<String>, expr: Expr, labels: Labels) -> Self {
        Self {
            name: name.into(),
            expr,
            labels,
        }
    }
}

impl From<AlertingRule> for Rule {
    fn from(rule: AlertingRule) -> Self {
        Rule::Alerting(rule)
    }
}

impl From<RecordingRule> for Rule {
    fn from(rule: RecordingRule) -> Self {
        Rule::Recording(rule)
    }
}
