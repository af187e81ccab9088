//! Expands command-line patterns into the ordered list of files to lint.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use globset::{GlobBuilder, GlobMatcher};
use ignore::WalkBuilder;
use tracing::{debug, info};

use crate::HostError;
use crate::config::{ConfigLoader, ConfigStatus};
use crate::helpers::normalize_path;
use crate::options::FindFilesOptions;

const GLOB_CHARS: &[char] = &['*', '?', '[', '{'];

/// Returns true if `pattern` contains glob syntax.
pub fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains(GLOB_CHARS)
}

/// Finds the files named by `options.patterns`.
///
/// Existing files are returned as given, even when ignored, so the caller
/// can report them. Directories and globs are walked and yield only files
/// some config object matches. Results keep pattern order, without
/// duplicates.
pub fn find_files(
    options: &FindFilesOptions,
    loader: &Arc<ConfigLoader>,
) -> Result<Vec<PathBuf>, HostError> {
    let mut files = Vec::new();
    let mut seen = HashSet::new();

    for pattern in &options.patterns {
        let absolute = normalize_path(&options.cwd.join(pattern));
        let found = if absolute.is_file() {
            vec![absolute]
        } else if absolute.is_dir() {
            walk(&absolute, None, pattern, options, loader)?
        } else if options.glob_input_paths && is_glob_pattern(pattern) {
            let matcher = GlobBuilder::new(&absolute.to_string_lossy())
                .literal_separator(true)
                .build()
                .map_err(|e| HostError::config(format!("Invalid pattern '{}': {}", pattern, e)))?
                .compile_matcher();
            let base = glob_base(&absolute);
            if base.is_dir() {
                walk(&base, Some(&matcher), pattern, options, loader)?
            } else {
                unmatched(pattern, options, 0)?
            }
        } else {
            unmatched(pattern, options, 0)?
        };

        for file in found {
            if seen.insert(file.clone()) {
                files.push(file);
            }
        }
    }

    info!("Discovered {} files to lint", files.len());
    Ok(files)
}

fn walk(
    root: &Path,
    matcher: Option<&GlobMatcher>,
    pattern: &str,
    options: &FindFilesOptions,
    loader: &Arc<ConfigLoader>,
) -> Result<Vec<PathBuf>, HostError> {
    let prune = Arc::clone(loader);
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            if entry.depth() == 0 || !is_dir {
                return true;
            }
            let dir = entry.path();
            let parent = dir.parent().unwrap_or(dir);
            prune
                .load_config_array_for_directory(parent)
                .map(|array| !array.is_directory_ignored(dir))
                .unwrap_or(true)
        })
        .build();

    let mut matched = Vec::new();
    let mut ignored = 0;

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = entry.path();
        if matcher.is_some_and(|m| !m.is_match(path)) {
            continue;
        }
        let array = loader.load_config_array_for_file(path)?;
        match array.get_config_status(path) {
            ConfigStatus::Matched => matched.push(path.to_path_buf()),
            ConfigStatus::Ignored => ignored += 1,
            ConfigStatus::Unconfigured | ConfigStatus::External => {}
        }
    }

    if matched.is_empty() {
        return unmatched(pattern, options, ignored);
    }
    matched.sort();
    Ok(matched)
}

fn unmatched(
    pattern: &str,
    options: &FindFilesOptions,
    ignored: usize,
) -> Result<Vec<PathBuf>, HostError> {
    if !options.error_on_unmatched_pattern {
        return Ok(Vec::new());
    }
    if ignored > 0 {
        Err(HostError::AllFilesIgnored(pattern.to_string()))
    } else {
        Err(HostError::NoFilesFound(pattern.to_string()))
    }
}

/// The longest leading part of `pattern` without glob syntax.
fn glob_base(pattern: &Path) -> PathBuf {
    let mut base = PathBuf::new();
    for component in pattern.components() {
        if let Component::Normal(part) = component
            && part.to_string_lossy().contains(GLOB_CHARS)
        {
            break;
        }
        base.push(component);
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::EngineHooks;
    use crate::options::EngineOptions;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let temp = tempfile::tempdir().unwrap();
        for file in [
            "a.js",
            "b.mjs",
            "readme.md",
            "src/c.js",
            "src/d.js",
            "src/nested/e.js",
            "node_modules/pkg/index.js",
            "dist/out.js",
        ] {
            let path = temp.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "a();\n").unwrap();
        }
        fs::write(
            temp.path().join("lintpool.config.json"),
            r#"[{ "ignores": ["dist/"] }, { "rules": { "semi": "error" } }]"#,
        )
        .unwrap();
        temp
    }

    fn find(temp: &TempDir, patterns: &[&str]) -> Result<Vec<String>, HostError> {
        let engine_options = EngineOptions::new(temp.path());
        let loader = Arc::new(ConfigLoader::new(&engine_options, EngineHooks::default()));
        let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        let options = FindFilesOptions::from_engine(&engine_options, &patterns);
        find_files(&options, &loader).map(|files| {
            files
                .iter()
                .map(|f| {
                    f.strip_prefix(temp.path())
                        .unwrap()
                        .to_string_lossy()
                        .replace('\\', "/")
                })
                .collect()
        })
    }

    #[test]
    fn test_directory_walk_skips_ignored_and_unconfigured() {
        let temp = project();
        assert_eq!(
            find(&temp, &["."]).unwrap(),
            vec!["a.js", "b.mjs", "src/c.js", "src/d.js", "src/nested/e.js"]
        );
    }

    #[test]
    fn test_explicit_files_keep_order_and_dedupe() {
        let temp = project();
        assert_eq!(
            find(&temp, &["src/d.js", "a.js", "src/d.js", "dist/out.js"]).unwrap(),
            vec!["src/d.js", "a.js", "dist/out.js"]
        );
    }

    #[test]
    fn test_glob_pattern() {
        let temp = project();
        assert_eq!(find(&temp, &["src/*.js"]).unwrap(), vec!["src/c.js", "src/d.js"]);
        assert_eq!(
            find(&temp, &["src/**/*.js"]).unwrap(),
            vec!["src/c.js", "src/d.js", "src/nested/e.js"]
        );
    }

    #[rstest]
    #[case::missing_file(&["missing.js"], "No files matching the pattern \"missing.js\"")]
    #[case::no_match(&["src/*.ts"], "No files matching the pattern \"src/*.ts\"")]
    #[case::all_ignored(&["dist"], "All files matched by 'dist' are ignored.")]
    fn test_unmatched_patterns(#[case] patterns: &[&str], #[case] expected: &str) {
        let temp = project();
        let error = find(&temp, patterns).unwrap_err();
        assert!(error.to_string().contains(expected), "{error}");
    }

    #[test]
    fn test_unmatched_pattern_allowed() {
        let temp = project();
        let engine_options = EngineOptions {
            error_on_unmatched_pattern: false,
            ..EngineOptions::new(temp.path())
        };
        let loader = Arc::new(ConfigLoader::new(&engine_options, EngineHooks::default()));
        let options = FindFilesOptions::from_engine(&engine_options, &["missing.js".to_string()]);
        assert!(find_files(&options, &loader).unwrap().is_empty());
    }

    #[test]
    fn test_glob_disabled_treats_pattern_literally() {
        let temp = project();
        let engine_options = EngineOptions {
            glob_input_paths: false,
            ..EngineOptions::new(temp.path())
        };
        let loader = Arc::new(ConfigLoader::new(&engine_options, EngineHooks::default()));
        let options = FindFilesOptions::from_engine(&engine_options, &["src/*.js".to_string()]);
        assert!(matches!(
            find_files(&options, &loader),
            Err(HostError::NoFilesFound(_))
        ));
    }

    #[rstest]
    #[case("/p/src/**/*.js", "/p/src")]
    #[case("/p/*.js", "/p")]
    #[case("/p/a/b.js", "/p/a/b.js")]
    fn test_glob_base(#[case] pattern: &str, #[case] expected: &str) {
        assert_eq!(glob_base(Path::new(pattern)), PathBuf::from(expected));
    }
}
