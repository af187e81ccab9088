//! `no-debugger`: disallow `debugger` statements.

use lintpool_diagnostic::{RuleMeta, RuleType};

use super::{Report, Rule, RuleContext, RuleFailure};

pub struct NoDebugger;

impl Rule for NoDebugger {
    fn meta(&self) -> RuleMeta {
        RuleMeta::new(RuleType::Problem, "Disallow the use of `debugger`")
    }

    fn check(&self, context: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
        let source = context.source;
        for index in 0..source.tokens.len() {
            if source.is_keyword(index, "debugger") {
                context.report(
                    Report::new(source.tokens[index].span, "Unexpected 'debugger' statement.")
                        .with_message_id("unexpected"),
                );
            }
        }
        Ok(())
    }
}
