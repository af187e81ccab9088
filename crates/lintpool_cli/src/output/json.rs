//! JSON output formatter

use lintpool_diagnostic::{LintResult, RulesMeta};
use miette::{IntoDiagnostic, Result};

pub fn format_json(results: &[LintResult]) -> Result<String> {
    serde_json::to_string(results).into_diagnostic()
}

/// Results plus the metadata of every rule that reported.
pub fn format_json_with_metadata(results: &[LintResult], rules_meta: &RulesMeta) -> Result<String> {
    let output = serde_json::json!({
        "results": results,
        "metadata": { "rulesMeta": rules_meta },
    });
    serde_json::to_string(&output).into_diagnostic()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lintpool_diagnostic::{LintMessage, RuleMeta, RuleType, Severity};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_uses_wire_names() {
        let results = vec![LintResult::with_messages(
            "/p/a.js",
            vec![LintMessage::new("semi", Severity::Error, "Missing semicolon.", 1, 10)],
        )];
        let value: serde_json::Value =
            serde_json::from_str(&format_json(&results).unwrap()).unwrap();

        assert_eq!(value[0]["filePath"], "/p/a.js");
        assert_eq!(value[0]["messages"][0]["ruleId"], "semi");
        assert_eq!(value[0]["messages"][0]["severity"], 2);
        assert_eq!(value[0]["errorCount"], 1);
    }

    #[test]
    fn test_metadata_carries_rules_meta() {
        let mut meta = RulesMeta::new();
        meta.insert("semi".to_string(), RuleMeta::new(RuleType::Layout, "Require semicolons"));
        let output = format_json_with_metadata(&[], &meta).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["results"], serde_json::json!([]));
        assert_eq!(value["metadata"]["rulesMeta"]["semi"]["type"], "layout");
    }
}
