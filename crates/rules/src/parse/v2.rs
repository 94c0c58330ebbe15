use tracing::debug;
use vigil_promql::{parse_expr, rulefmt, Labels};

use super::RuleGroups;
use crate::configs::RulesConfig;
use crate::error::{Result, RulesError};
use crate::rule::{AlertingRule, RecordingRule, Rule};

pub(super) fn parse(config: &RulesConfig) -> Result<RuleGroups> {
    let mut groups = RuleGroups::new();

    for (file, content) in config.files() {
        let parsed = rulefmt::parse(content).map_err(|mut errs| {
            debug!(file, errors = errs.len(), "rule file rejected");
            RulesError::file_parse(file, errs.remove(0))
        })?;

        for group in parsed.groups {
            let mut rules = Vec::with_capacity(group.rules.len());
            for node in group.rules {
                // Expression errors are returned as-is, without the file name.
                let expr = parse_expr(&node.expr)?;
                let hold_duration = node.hold_duration();

                let rule = match node.alert {
                    Some(alert) if !alert.is_empty() => Rule::Alerting(AlertingRule::new(
                        alert,
                        expr,
                        hold_duration,
                        Labels::from(node.labels),
                        Labels::from(node.annotations),
                    )),
                    _ => Rule::Recording(RecordingRule::new(
                        node.record.unwrap_or_default(),
                        expr,
                        Labels::from(node.labels),
                    )),
                };
                rules.push(rule);
            }

            debug!(file, group = %group.name, rules = rules.len(), "parsed rule group");
            // Group names are only unique within one file.
            groups.insert(format!("{};{}", group.name, file), rules);
        }
    }

    Ok(groups)
}
