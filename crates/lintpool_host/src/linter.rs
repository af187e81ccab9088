//! Runs rules over one file's text and assembles its result.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use lintpool_diagnostic::{
    LintMessage, LintResult, LintStats, RuleMeta, RuleType, RulesMeta, Severity, SuppressedMessage,
    UsedDeprecatedRule,
};
use tracing::{debug, trace};

use crate::HostError;
use crate::config::ResolvedConfig;
use crate::directives::{apply_directives, collect_directives, inline_config_warnings};
use crate::fixer::apply_fixes_to_content;
use crate::helpers::severity_from_level;
use crate::options::EngineOptions;
use crate::plugins::{PluginRegistry, split_rule_id};
use crate::rules::{Rule, RuleContext, RuleRegistry};
use crate::source::SourceCode;

/// Upper bound on fix passes per file.
pub const MAX_FIX_PASSES: u32 = 10;

/// Messages produced by one verification pass.
#[derive(Debug, Default)]
pub struct Verification {
    pub messages: Vec<LintMessage>,
    pub suppressed_messages: Vec<SuppressedMessage>,
    pub rule_times: BTreeMap<String, f64>,
}

/// The rule-running half of the engine.
#[derive(Debug, Clone)]
pub struct Linter {
    rules: RuleRegistry,
    plugins: PluginRegistry,
}

impl Linter {
    pub fn new(plugins: PluginRegistry) -> Self {
        Self {
            rules: RuleRegistry::builtin(),
            plugins,
        }
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    /// Looks up a rule. `Ok(None)` is an unknown core rule, which lints as a
    /// message rather than failing the run.
    pub fn resolve_rule(
        &self,
        rule_id: &str,
        config: &ResolvedConfig,
    ) -> Result<Option<Arc<dyn Rule>>, HostError> {
        let (plugin_name, rule_name) = split_rule_id(rule_id);
        let Some(plugin_name) = plugin_name else {
            return Ok(self.rules.get(rule_id).cloned());
        };

        if !config.plugins.contains(plugin_name) {
            return Err(HostError::config(format!(
                "Key \"rules\": Key \"{rule_id}\": Could not find plugin \"{plugin_name}\"."
            )));
        }
        let plugin = self
            .plugins
            .get(plugin_name)
            .ok_or_else(|| HostError::plugin(format!("Could not find plugin \"{plugin_name}\".")))?;
        plugin
            .rules()
            .get(rule_name)
            .cloned()
            .map(Some)
            .ok_or_else(|| {
                HostError::config(format!(
                    "Key \"rules\": Key \"{rule_id}\": Could not find \"{rule_name}\" in plugin \"{plugin_name}\"."
                ))
            })
    }

    /// Metadata of the given rules, skipping unknown ones.
    pub fn rules_meta<'a>(&self, rule_ids: impl IntoIterator<Item = &'a str>) -> RulesMeta {
        rule_ids
            .into_iter()
            .filter_map(|id| {
                let rule = match split_rule_id(id) {
                    (None, _) => self.rules.get(id),
                    (Some(plugin), name) => {
                        self.plugins.get(plugin).and_then(|p| p.rules().get(name))
                    }
                };
                rule.map(|rule| (id.to_string(), rule.meta()))
            })
            .collect()
    }

    /// Runs every enabled rule once over `text`.
    pub fn verify(
        &self,
        text: &str,
        path: &Path,
        config: &ResolvedConfig,
        options: &EngineOptions,
    ) -> Result<Verification, HostError> {
        for plugin in &config.plugins {
            if self.plugins.get(plugin).is_none() {
                return Err(HostError::plugin(format!(
                    "Could not find plugin \"{plugin}\"."
                )));
            }
        }

        let source = match SourceCode::parse(text) {
            Ok(source) => source,
            Err(error) => {
                debug!("{}: {}", path.display(), error);
                return Ok(Verification {
                    messages: vec![LintMessage::fatal(
                        error.to_string(),
                        error.line,
                        error.column,
                    )],
                    ..Verification::default()
                });
            }
        };

        let mut messages = Vec::new();
        let mut rule_times = BTreeMap::new();

        for (rule_id, setting) in config.enabled_rules() {
            if !options.rule_filter.allows(setting.level) {
                continue;
            }
            let Some(severity) = severity_from_level(setting.level) else {
                continue;
            };
            let Some(rule) = self.resolve_rule(rule_id, config)? else {
                messages.push(LintMessage::new(
                    rule_id,
                    Severity::Error,
                    format!("Definition for rule '{rule_id}' was not found."),
                    1,
                    1,
                ));
                continue;
            };

            let started = options.stats.then(Instant::now);
            let mut context = RuleContext::new(&source, &setting.options, &config.globals);
            rule.check(&mut context)
                .map_err(|failure| HostError::rule(rule_id, path, failure.0))?;
            if let Some(started) = started {
                rule_times.insert(
                    rule_id.to_string(),
                    started.elapsed().as_secs_f64() * 1000.0,
                );
            }

            for report in context.into_reports() {
                let (line, column) = source.line_col(report.span.start);
                let (end_line, end_column) = source.line_col(report.span.end);
                let mut message = LintMessage::new(rule_id, severity, report.message, line, column)
                    .with_end(end_line, end_column);
                if let Some(message_id) = report.message_id {
                    message = message.with_message_id(message_id);
                }
                if let Some(fix) = report.fix {
                    message = message.with_fix(fix);
                }
                messages.push(message);
            }
        }

        messages.sort_by_key(|message| (message.line, message.column));

        let (directives, problems) = collect_directives(&source);
        messages.extend(problems);

        let verification = if config.no_inline_config {
            if options.allow_inline_config {
                messages.extend(inline_config_warnings(&directives));
            }
            messages.sort_by_key(|message| (message.line, message.column));
            Verification {
                messages,
                ..Verification::default()
            }
        } else if !options.allow_inline_config {
            Verification {
                messages,
                ..Verification::default()
            }
        } else {
            let outcome = apply_directives(
                messages,
                &directives,
                config.report_unused_disable_directives,
            );
            Verification {
                messages: outcome.messages,
                suppressed_messages: outcome.suppressed,
                ..Verification::default()
            }
        };

        trace!(
            "{}: {} messages, {} suppressed",
            path.display(),
            verification.messages.len(),
            verification.suppressed_messages.len()
        );

        Ok(Verification {
            rule_times,
            ..verification
        })
    }

    /// Lints `text`, applying fixes in up to [`MAX_FIX_PASSES`] passes when
    /// fixing is enabled.
    pub fn lint_text(
        &self,
        text: &str,
        path: &Path,
        config: &ResolvedConfig,
        options: &EngineOptions,
    ) -> Result<LintResult, HostError> {
        let mut current = text.to_string();
        let mut passes = 0;
        let mut times: BTreeMap<String, f64> = BTreeMap::new();

        let verification = loop {
            let verification = self.verify(&current, path, config, options)?;
            for (rule_id, time) in &verification.rule_times {
                *times.entry(rule_id.clone()).or_default() += time;
            }
            if !options.fix.is_enabled() || passes >= MAX_FIX_PASSES {
                break verification;
            }

            let fixable: Vec<&LintMessage> = verification
                .messages
                .iter()
                .filter(|message| {
                    message.fix.is_some()
                        && options.should_fix(message, self.rule_type(message, config))
                })
                .collect();
            if fixable.is_empty() {
                break verification;
            }

            let fixed = apply_fixes_to_content(&current, &fixable);
            if !fixed.modified {
                break verification;
            }
            debug!(
                "{}: pass {} applied {} fixes",
                path.display(),
                passes + 1,
                fixed.fixes_applied
            );
            current = fixed.fixed_content;
            passes += 1;
        };

        let mut result = LintResult::new(path);
        result.messages = verification.messages;
        result.suppressed_messages = verification.suppressed_messages;
        if current != text {
            result.output = Some(current);
        } else if result.has_messages() {
            result.source = Some(text.to_string());
        }
        result.used_deprecated_rules = self.used_deprecated_rules(config, options);
        if options.stats {
            result.stats = Some(LintStats {
                fix_passes: passes,
                rule_times: times,
            });
        }
        result.recount();
        Ok(result)
    }

    fn rule_type(&self, message: &LintMessage, config: &ResolvedConfig) -> Option<RuleType> {
        let rule_id = message.rule_id.as_deref()?;
        let rule = self.resolve_rule(rule_id, config).ok().flatten()?;
        Some(rule.meta().rule_type)
    }

    fn used_deprecated_rules(
        &self,
        config: &ResolvedConfig,
        options: &EngineOptions,
    ) -> Vec<UsedDeprecatedRule> {
        config
            .enabled_rules()
            .filter(|(_, setting)| options.rule_filter.allows(setting.level))
            .filter_map(|(rule_id, _)| {
                let rule = self.resolve_rule(rule_id, config).ok().flatten()?;
                let RuleMeta {
                    deprecated,
                    replaced_by,
                    ..
                } = rule.meta();
                deprecated.then(|| UsedDeprecatedRule {
                    rule_id: rule_id.to_string(),
                    replaced_by,
                })
            })
            .collect()
    }
}
