//! Small helpers shared by the engine and its callers.

use std::path::{Component, Path, PathBuf};

use lintpool_diagnostic::{LintMessage, LintResult, Severity};
use serde_json::Value;

use crate::config::ConfigStatus;

const PLUGIN_PREFIXES: [&str; 2] = ["eslint-plugin", "lintpool-plugin"];

/// Returns true if `value` is a non-empty string.
pub fn is_non_empty_string(value: &str) -> bool {
    !value.is_empty()
}

/// Returns true if every element is a non-empty string. An empty slice is
/// accepted, matching an absent list.
pub fn is_array_of_non_empty_string<S: AsRef<str>>(values: &[S]) -> bool {
    values.iter().all(|value| is_non_empty_string(value.as_ref()))
}

/// Normalizes a severity to `0` (off), `1` (warn) or `2` (error).
///
/// Accepts the integers `0..=2`, their string forms and the words
/// `off`, `warn` and `error` in any case.
pub fn normalize_severity(value: &Value) -> Option<u8> {
    match value {
        Value::Number(number) => match number.as_u64() {
            Some(n @ 0..=2) => Some(n as u8),
            _ => None,
        },
        Value::String(word) => normalize_severity_word(word),
        _ => None,
    }
}

/// Normalizes a bare severity word such as `"warn"` or `"2"`.
pub fn normalize_severity_word(word: &str) -> Option<u8> {
    match word.to_ascii_lowercase().as_str() {
        "off" | "0" => Some(0),
        "warn" | "1" => Some(1),
        "error" | "2" => Some(2),
        _ => None,
    }
}

/// Converts a normalized severity into a message severity. `0` yields `None`.
pub fn severity_from_level(level: u8) -> Option<Severity> {
    match level {
        1 => Some(Severity::Warning),
        2 => Some(Severity::Error),
        _ => None,
    }
}

/// Returns the conventional short name of a plugin package.
///
/// `eslint-plugin-foo` becomes `foo`, `@scope/eslint-plugin` becomes
/// `@scope` and `@scope/eslint-plugin-foo` becomes `@scope/foo`. The
/// `lintpool-plugin` prefix is handled the same way.
pub fn get_shorthand_name(full_name: &str) -> String {
    if let Some(rest) = full_name.strip_prefix('@') {
        if let Some((scope, name)) = rest.split_once('/') {
            for prefix in PLUGIN_PREFIXES {
                if name == prefix {
                    return format!("@{scope}");
                }
                if let Some(short) = name
                    .strip_prefix(prefix)
                    .and_then(|tail| tail.strip_prefix('-'))
                {
                    return format!("@{scope}/{short}");
                }
            }
        }
        return full_name.to_string();
    }

    for prefix in PLUGIN_PREFIXES {
        if let Some(short) = full_name
            .strip_prefix(prefix)
            .and_then(|tail| tail.strip_prefix('-'))
        {
            return short.to_string();
        }
    }
    full_name.to_string()
}

/// Lexically removes `.` and `..` components.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Creates the result reported for an explicitly passed file that is not
/// linted.
pub fn create_ignore_result(file_path: &Path, cwd: &Path, status: ConfigStatus) -> LintResult {
    let message = match status {
        ConfigStatus::External => "File ignored because outside of base path.".to_string(),
        ConfigStatus::Unconfigured => {
            "File ignored because no matching configuration was supplied.".to_string()
        }
        ConfigStatus::Ignored | ConfigStatus::Matched => {
            let relative = file_path.strip_prefix(cwd).unwrap_or(file_path);
            let in_node_modules = relative
                .components()
                .any(|component| component.as_os_str() == "node_modules");
            if in_node_modules {
                "File ignored by default because it is located under the node_modules directory. Use ignore pattern \"!**/node_modules/\" to disable file ignore settings or use \"--no-warn-ignored\" to suppress this warning.".to_string()
            } else {
                "File ignored because of a matching ignore pattern. Use \"--no-ignore\" to disable file ignore settings or use \"--no-warn-ignored\" to suppress this warning.".to_string()
            }
        }
    };

    LintResult::with_messages(file_path, vec![LintMessage::notice(Severity::Warning, message)])
}
