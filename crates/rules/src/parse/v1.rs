use tracing::debug;
use vigil_promql::legacy::{self, Statement};
use vigil_promql::{parse_expr, Expr};

use super::RuleGroups;
use crate::configs::RulesConfig;
use crate::error::{Result, RulesError};
use crate::rule::{AlertingRule, RecordingRule, Rule};

pub(super) fn parse(config: &RulesConfig) -> Result<RuleGroups> {
    let mut result = RuleGroups::new();

    for (file, content) in config.files() {
        let stmts = legacy::parse_stmts(content).map_err(|e| RulesError::file_parse(file, e))?;

        let mut rules = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            let rule = match stmt {
                Statement::Alert(alert) => Rule::Alerting(AlertingRule::new(
                    alert.name,
                    reparse(&alert.expr)?,
                    alert.duration,
                    alert.labels,
                    alert.annotations,
                )),
                Statement::Record(record) => {
                    let expr = reparse(&record.expr)?;
                    Rule::Recording(RecordingRule::new(record.name, expr, record.labels))
                }
                _ => return Err(RulesError::UnrecognizedStatement { file: file.to_string() }),
            };
            rules.push(rule);
        }

        debug!(file, rules = rules.len(), "parsed legacy rule file");
        result.insert(file.to_string(), rules);
    }

    Ok(result)
}

/// Legacy trees are not valid current trees: go through the canonical text.
fn reparse(expr: &Expr) -> Result<Expr> {
    Ok(parse_expr(&expr.to_string())?)
}
