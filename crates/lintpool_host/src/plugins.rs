//! Plugins: named groups of rules registered by the embedding program.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::HostError;
use crate::helpers::get_shorthand_name;
use crate::rules::{Rule, RuleRegistry};

/// A plugin and its rules, addressed as `<plugin>/<rule>`.
#[derive(Debug, Clone)]
pub struct Plugin {
    name: String,
    rules: RuleRegistry,
}

impl Plugin {
    /// Creates an empty plugin. Package-style names are shortened, so
    /// `eslint-plugin-foo` registers as `foo`.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: get_shorthand_name(name.as_ref()),
            rules: RuleRegistry::default(),
        }
    }

    pub fn with_rule(mut self, id: impl Into<String>, rule: impl Rule + 'static) -> Self {
        self.rules.register(id, rule);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }
}

/// Plugins available to an engine, keyed by short name.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: BTreeMap<String, Arc<Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: Plugin) {
        self.plugins
            .insert(plugin.name().to_string(), Arc::new(plugin));
    }

    pub fn with_plugin(mut self, plugin: Plugin) -> Self {
        self.register(plugin);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Plugin>> {
        self.plugins.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Resolves a plugin named on the command line, returning its short
    /// name. `relative_to` only shapes the error message.
    pub fn resolve(&self, name: &str, relative_to: &Path) -> Result<String, HostError> {
        let short = get_shorthand_name(name);
        if self.plugins.contains_key(&short) {
            Ok(short)
        } else {
            Err(HostError::plugin(format!(
                "Failed to load plugin '{short}' declared in 'CLIOptions': Cannot find module '{name}' relative to '{}'",
                relative_to.display()
            )))
        }
    }
}

/// Splits a rule id into plugin name and rule name. Core rules have no
/// plugin.
pub fn split_rule_id(rule_id: &str) -> (Option<&str>, &str) {
    match rule_id.rfind('/') {
        Some(index) => (Some(&rule_id[..index]), &rule_id[index + 1..]),
        None => (None, rule_id),
    }
}
