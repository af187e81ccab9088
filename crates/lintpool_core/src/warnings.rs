//! Empty-config warning fan-in.
//!
//! Workers would each report the same empty config file; the parent emits
//! each distinct file once per engine.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use lintpool_host::{EngineHooks, HostWarning};
use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Emits empty-config warnings once per config file.
#[derive(Debug)]
pub struct EmptyConfigWarnings {
    seen: Mutex<HashSet<PathBuf>>,
    hooks: EngineHooks,
}

impl EmptyConfigWarnings {
    /// Forwards first-seen warnings to `hooks`.
    pub fn new(hooks: EngineHooks) -> Self {
        Self {
            seen: Mutex::new(HashSet::new()),
            hooks,
        }
    }

    /// Emits the warning for `config_file` unless it was already emitted.
    pub fn issue(&self, config_file: PathBuf) -> bool {
        if !self.seen.lock().insert(config_file.clone()) {
            return false;
        }
        self.hooks.emit(HostWarning::EmptyConfig { config_file });
        true
    }

    /// Hooks for the parent engine: empty-config warnings are deduplicated
    /// with those raised by workers, everything else passes through.
    pub fn parent_hooks(self: &Arc<Self>) -> EngineHooks {
        let warnings = Arc::clone(self);
        EngineHooks::default().with_warning_sink(move |warning| match warning {
            HostWarning::EmptyConfig { config_file } => {
                warnings.issue(config_file);
            }
            other => warnings.hooks.emit(other),
        })
    }
}

/// A per-run channel carrying empty-config file paths from workers.
#[derive(Debug)]
pub struct WarningChannel {
    name: String,
    sender: Sender<PathBuf>,
    receiver: Receiver<PathBuf>,
}

impl WarningChannel {
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            name: format!("lintpool-empty-config-{}", Uuid::new_v4()),
            sender,
            receiver,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Splits the channel; the receiver ends once every sender is dropped.
    pub fn split(self) -> (String, Sender<PathBuf>, Receiver<PathBuf>) {
        (self.name, self.sender, self.receiver)
    }
}

impl Default for WarningChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Hooks for a worker engine: empty-config notices go to the parent and
/// the legacy ignore-file notice is dropped.
pub fn worker_hooks(channel_name: String, sender: Sender<PathBuf>) -> EngineHooks {
    EngineHooks::default().with_warning_sink(move |warning| match warning {
        HostWarning::EmptyConfig { config_file } => {
            if sender.send(config_file).is_err() {
                debug!("Warning channel {} closed", channel_name);
            }
        }
        HostWarning::LegacyIgnoreFile { .. } => {}
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn recording_hooks() -> (EngineHooks, Arc<Mutex<Vec<HostWarning>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let hooks = EngineHooks::default().with_warning_sink(move |w| sink.lock().push(w));
        (hooks, seen)
    }

    #[test]
    fn test_issue_deduplicates_by_path() {
        let (hooks, seen) = recording_hooks();
        let warnings = EmptyConfigWarnings::new(hooks);

        assert!(warnings.issue(PathBuf::from("/p/lintpool.config.json")));
        assert!(!warnings.issue(PathBuf::from("/p/lintpool.config.json")));
        assert!(warnings.issue(PathBuf::from("/p/pkg/lintpool.config.json")));
        assert_eq!(seen.lock().len(), 2);
    }

    #[test]
    fn test_parent_hooks_share_dedupe() {
        let (hooks, seen) = recording_hooks();
        let warnings = Arc::new(EmptyConfigWarnings::new(hooks));
        let parent = warnings.parent_hooks();

        let path = PathBuf::from("/p/lintpool.config.json");
        parent.emit(HostWarning::EmptyConfig { config_file: path.clone() });
        warnings.issue(path);
        parent.emit(HostWarning::LegacyIgnoreFile {
            path: PathBuf::from("/p/.lintpoolignore"),
        });

        assert_eq!(seen.lock().len(), 2);
    }

    #[test]
    fn test_worker_hooks_forward_and_swallow() {
        let channel = WarningChannel::new();
        assert!(channel.name().starts_with("lintpool-empty-config-"));
        let (name, sender, receiver) = channel.split();

        let hooks = worker_hooks(name, sender);
        hooks.emit(HostWarning::EmptyConfig {
            config_file: PathBuf::from("/p/lintpool.config.json"),
        });
        hooks.emit(HostWarning::LegacyIgnoreFile {
            path: PathBuf::from("/p/.lintpoolignore"),
        });
        drop(hooks);

        let received: Vec<PathBuf> = receiver.iter().collect();
        assert_eq!(received, vec![PathBuf::from("/p/lintpool.config.json")]);
    }
}
