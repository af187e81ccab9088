//! A loaded config array and per-file config resolution.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use globset::{GlobBuilder, GlobMatcher};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

use super::object::{ConfigObject, GlobalAccess, LanguageOptions, RuleSetting};
use crate::HostError;

/// Files linted when no config object says otherwise.
pub const DEFAULT_FILES: &[&str] = &["**/*.js", "**/*.mjs", "**/*.cjs"];

/// Ignored unless ignoring is disabled.
pub const DEFAULT_IGNORES: &[&str] = &["**/node_modules/", ".git/"];

/// Parsers the built-in tokenizer stands in for.
const SUPPORTED_PARSERS: &[&str] = &["espree", "default"];

/// How a config array relates to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigStatus {
    /// A config object's `files` matches the file.
    Matched,
    /// A global ignore pattern matches the file.
    Ignored,
    /// No config object matches the file.
    Unconfigured,
    /// The file is outside the array's base path.
    External,
}

/// The merged configuration for one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    pub rules: BTreeMap<String, RuleSetting>,
    pub globals: BTreeMap<String, GlobalAccess>,
    pub parser: Option<String>,
    pub parser_options: Option<Value>,
    pub plugins: BTreeSet<String>,
    pub report_unused_disable_directives: u8,
    pub no_inline_config: bool,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            rules: BTreeMap::new(),
            globals: BTreeMap::new(),
            parser: None,
            parser_options: None,
            plugins: BTreeSet::new(),
            report_unused_disable_directives: 1,
            no_inline_config: false,
        }
    }
}

impl ResolvedConfig {
    /// Fingerprint of the config, used to invalidate cached results.
    pub fn hash(&self) -> String {
        let content = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(content.as_bytes()).to_hex().to_string()
    }

    /// Rules with a level above off.
    pub fn enabled_rules(&self) -> impl Iterator<Item = (&str, &RuleSetting)> {
        self.rules
            .iter()
            .filter(|(_, setting)| setting.level > 0)
            .map(|(id, setting)| (id.as_str(), setting))
    }

    fn apply(&mut self, object: &CompiledObject) {
        for (id, setting) in &object.rules {
            match self.rules.get_mut(id) {
                Some(existing) => existing.merge(setting),
                None => {
                    self.rules.insert(id.clone(), setting.clone());
                }
            }
        }
        if let Some(language) = &object.language_options {
            for (name, access) in &language.globals {
                self.globals.insert(name.clone(), *access);
            }
            if let Some(parser) = &language.parser {
                self.parser = Some(parser.clone());
            }
            if let Some(options) = &language.parser_options {
                self.parser_options = Some(merge_values(self.parser_options.take(), options));
            }
        }
        if let Some(level) = object.report_unused {
            self.report_unused_disable_directives = level;
        }
        if let Some(no_inline) = object.no_inline_config {
            self.no_inline_config = no_inline;
        }
        self.plugins.extend(object.plugins.iter().cloned());
    }
}

fn merge_values(base: Option<Value>, later: &Value) -> Value {
    match (base, later) {
        (Some(Value::Object(mut base)), Value::Object(later)) => {
            for (key, value) in later {
                base.insert(key.clone(), value.clone());
            }
            Value::Object(base)
        }
        (_, later) => later.clone(),
    }
}

#[derive(Debug)]
struct Pattern {
    matcher: GlobMatcher,
    /// Matches a directory named by a `dir/` pattern.
    directory: Option<GlobMatcher>,
    negated: bool,
}

impl Pattern {
    fn compile(raw: &str) -> Result<Self, HostError> {
        let (negated, body) = match raw.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let body = body.strip_prefix("./").unwrap_or(body);
        let body = body.strip_prefix('/').unwrap_or(body);

        let (glob, directory) = match body.strip_suffix('/') {
            Some(dir) => (format!("{dir}/**"), Some(build_matcher(dir, raw)?)),
            None => (body.to_string(), None),
        };

        Ok(Self {
            matcher: build_matcher(&glob, raw)?,
            directory,
            negated,
        })
    }

    fn matches(&self, relative: &Path) -> bool {
        self.matcher.is_match(relative)
    }

    fn matches_directory(&self, relative: &Path) -> bool {
        self.directory
            .as_ref()
            .is_some_and(|matcher| matcher.is_match(relative))
    }
}

fn build_matcher(glob: &str, raw: &str) -> Result<GlobMatcher, HostError> {
    GlobBuilder::new(glob)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|e| HostError::config(format!("Invalid glob pattern \"{raw}\": {e}")))
}

/// Applies ordered patterns; a later negated pattern un-ignores.
fn matches_all(patterns: &[Pattern], relative: &Path) -> bool {
    let mut matched = false;
    for pattern in patterns {
        if pattern.matches(relative) {
            matched = !pattern.negated;
        }
    }
    matched
}

#[derive(Debug)]
struct CompiledObject {
    base_path: PathBuf,
    files: Option<Vec<Pattern>>,
    ignores: Vec<Pattern>,
    rules: BTreeMap<String, RuleSetting>,
    language_options: Option<LanguageOptions>,
    report_unused: Option<u8>,
    no_inline_config: Option<bool>,
    plugins: Vec<String>,
}

impl CompiledObject {
    fn compile(object: &ConfigObject, default_base: &Path) -> Result<Self, HostError> {
        let base_path = object
            .base_path
            .clone()
            .unwrap_or_else(|| default_base.to_path_buf());

        let files = object
            .files
            .as_ref()
            .map(|patterns| {
                patterns
                    .iter()
                    .map(|p| Pattern::compile(p))
                    .collect::<Result<Vec<_>, HostError>>()
            })
            .transpose()?;
        let ignores = object
            .ignores
            .iter()
            .flatten()
            .map(|p| Pattern::compile(p))
            .collect::<Result<Vec<_>, _>>()?;

        let mut rules = BTreeMap::new();
        for (id, value) in &object.rules {
            rules.insert(id.clone(), RuleSetting::parse(id, value)?);
        }

        if let Some(parser) = object
            .language_options
            .as_ref()
            .and_then(|language| language.parser.as_deref())
            && !SUPPORTED_PARSERS.contains(&parser)
        {
            return Err(HostError::config(format!(
                "Key \"languageOptions\": Key \"parser\": Parser \"{parser}\" is not supported."
            )));
        }

        let (report_unused, no_inline_config) = match &object.linter_options {
            Some(linter) => (linter.unused_directive_level()?, linter.no_inline_config),
            None => (None, None),
        };

        Ok(Self {
            base_path,
            files,
            ignores,
            rules,
            language_options: object.language_options.clone(),
            report_unused,
            no_inline_config,
            plugins: object.plugins.clone(),
        })
    }

    /// `Some(true)` if `files` matches, `None` if the object has no `files`.
    fn files_match(&self, path: &Path) -> Option<bool> {
        let relative = path.strip_prefix(&self.base_path).ok();
        let files = self.files.as_ref()?;
        Some(relative.is_some_and(|rel| {
            files.iter().any(|p| !p.negated && p.matches(rel)) && !matches_all(&self.ignores, rel)
        }))
    }

    fn applies_to(&self, path: &Path) -> bool {
        match self.files_match(path) {
            Some(matched) => matched,
            None => {
                let Ok(relative) = path.strip_prefix(&self.base_path) else {
                    return self.ignores.is_empty();
                };
                !matches_all(&self.ignores, relative)
            }
        }
    }
}

/// An ordered list of config objects with a base path.
#[derive(Debug)]
pub struct ConfigArray {
    base_path: PathBuf,
    config_file: Option<PathBuf>,
    objects: Vec<CompiledObject>,
    global_ignores: Vec<(PathBuf, Pattern)>,
    user_object_count: usize,
    resolved: Mutex<HashMap<PathBuf, Option<Arc<ResolvedConfig>>>>,
}

impl ConfigArray {
    /// Compiles `objects` after the default objects. Global ignores are
    /// dropped when `ignore` is false.
    pub fn new(
        objects: &[ConfigObject],
        base_path: impl Into<PathBuf>,
        config_file: Option<PathBuf>,
        ignore: bool,
    ) -> Result<Self, HostError> {
        let base_path = base_path.into();

        let defaults = [
            ConfigObject {
                files: Some(DEFAULT_FILES.iter().map(|s| s.to_string()).collect()),
                ..ConfigObject::default()
            },
            ConfigObject::global_ignores(
                DEFAULT_IGNORES.iter().map(|s| s.to_string()).collect(),
                None,
            ),
        ];

        let mut compiled = Vec::new();
        let mut global_ignores = Vec::new();
        for object in defaults.iter().chain(objects) {
            if object.is_global_ignore() {
                if !ignore {
                    continue;
                }
                let base = object.base_path.clone().unwrap_or_else(|| base_path.clone());
                for raw in object.ignores.iter().flatten() {
                    global_ignores.push((base.clone(), Pattern::compile(raw)?));
                }
            } else {
                compiled.push(CompiledObject::compile(object, &base_path)?);
            }
        }

        Ok(Self {
            base_path,
            config_file,
            objects: compiled,
            global_ignores,
            user_object_count: objects.len(),
            resolved: Mutex::new(HashMap::new()),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Number of objects that came from the caller.
    pub fn user_object_count(&self) -> usize {
        self.user_object_count
    }

    /// True if a global ignore pattern matches `path`. Files under an
    /// ignored directory cannot be re-included by a negated pattern.
    pub fn is_ignored(&self, path: &Path) -> bool {
        let parent_ignored = path
            .ancestors()
            .skip(1)
            .any(|dir| self.is_directory_ignored(dir));
        if parent_ignored {
            return true;
        }

        let mut ignored = false;
        for (base, pattern) in &self.global_ignores {
            let Ok(relative) = path.strip_prefix(base) else {
                continue;
            };
            if pattern.matches(relative) {
                ignored = !pattern.negated;
            }
        }
        ignored
    }

    /// True if `dir` is ignored as a whole, so walking it can be skipped.
    pub fn is_directory_ignored(&self, dir: &Path) -> bool {
        self.global_ignores.iter().any(|(base, pattern)| {
            !pattern.negated
                && dir
                    .strip_prefix(base)
                    .is_ok_and(|relative| pattern.matches_directory(relative))
        })
    }

    pub fn get_config_status(&self, path: &Path) -> ConfigStatus {
        if path.strip_prefix(&self.base_path).is_err() {
            return ConfigStatus::External;
        }
        if self.is_ignored(path) {
            return ConfigStatus::Ignored;
        }
        let matched = self
            .objects
            .iter()
            .any(|object| object.files_match(path) == Some(true));
        if matched {
            ConfigStatus::Matched
        } else {
            ConfigStatus::Unconfigured
        }
    }

    /// The merged config for `path`, or `None` unless the file is matched.
    pub fn get_config(&self, path: &Path) -> Option<Arc<ResolvedConfig>> {
        if let Some(cached) = self.resolved.lock().get(path) {
            return cached.clone();
        }

        let resolved = (self.get_config_status(path) == ConfigStatus::Matched).then(|| {
            let mut config = ResolvedConfig::default();
            for object in self.objects.iter().filter(|o| o.applies_to(path)) {
                config.apply(object);
            }
            Arc::new(config)
        });

        self.resolved
            .lock()
            .insert(path.to_path_buf(), resolved.clone());
        resolved
    }
}
