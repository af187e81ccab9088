//! Worker pool that lints a fixed list of files.
//!
//! Workers steal file indices from one shared atomic counter, buffer their
//! results locally and post the buffer once when they run out of work.
//! Results are put back in input order by index.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;

use crossbeam_channel::Sender;
use lintpool_diagnostic::{LintResult, RulesMeta};
use lintpool_host::{ConfigLoader, HostEngine, HostFactory};
use tracing::{debug, info, warn};

use crate::abort::AbortController;
use crate::error::CoreError;
use crate::options::{CliOptions, translate_options};
use crate::prewarm::prewarm_configs;
use crate::warnings::{EmptyConfigWarnings, WarningChannel, worker_hooks};

/// One linted file as reported by a worker.
#[derive(Debug)]
pub struct FileOutcome {
    pub result: LintResult,
    /// Metadata of the rules that reported in `result`.
    pub rules_meta: RulesMeta,
}

/// What a worker posts to the parent when it stops.
type WorkerReport = Result<Vec<(usize, Option<FileOutcome>)>, CoreError>;

/// Everything a run shares with its workers.
pub struct Scheduler<'a> {
    pub cli_options: &'a CliOptions,
    pub factory: &'a Arc<dyn HostFactory>,
    pub file_paths: &'a [PathBuf],
    /// The parent engine's loader, pre-warmed alongside the workers.
    pub loader: &'a ConfigLoader,
    pub warnings: &'a EmptyConfigWarnings,
    pub max_concurrency: usize,
}

impl Scheduler<'_> {
    /// Lints every file on `workers` threads.
    ///
    /// Returns one outcome per linted file in input order; files a worker
    /// skipped are left out. The first failure aborts the run and is
    /// returned; no partial results escape.
    pub fn run(&self, workers: usize) -> Result<Vec<FileOutcome>, CoreError> {
        let len = u32::try_from(self.file_paths.len())
            .map_err(|_| CoreError::internal("Too many files to lint in one run"))?;
        let counter = Arc::new(AtomicU32::new(0));
        let abort = AbortController::new();
        {
            let counter = Arc::clone(&counter);
            abort.on_abort(move || counter.store(len, Ordering::SeqCst));
        }

        let (channel_name, warning_tx, warning_rx) = WarningChannel::new().split();
        let (report_tx, report_rx) = crossbeam_channel::unbounded::<(usize, WorkerReport)>();
        let mut slots: Vec<Option<FileOutcome>> = Vec::new();
        slots.resize_with(self.file_paths.len(), || None);

        info!("Linting {} files on {} workers", len, workers);

        thread::scope(|scope| {
            let abort = &abort;

            let prewarm = thread::Builder::new()
                .name("lintpool-prewarm".to_string())
                .spawn_scoped(scope, move || {
                    prewarm_configs(self.loader, self.file_paths, self.max_concurrency, abort)
                });
            if let Err(e) = prewarm {
                debug!("Could not start config pre-warm: {}", e);
            }

            let forwarder = thread::Builder::new()
                .name("lintpool-warnings".to_string())
                .spawn_scoped(scope, move || {
                    for config_file in warning_rx {
                        self.warnings.issue(config_file);
                    }
                });
            if let Err(e) = forwarder {
                abort.abort(e.into());
            }

            for id in 0..workers {
                if abort.is_aborted() {
                    break;
                }
                let worker = Worker {
                    cli_options: self.cli_options,
                    factory: self.factory,
                    file_paths: self.file_paths,
                    counter: Arc::clone(&counter),
                    abort,
                    channel_name: channel_name.clone(),
                    warnings: warning_tx.clone(),
                };
                let report_tx = report_tx.clone();
                let spawned = thread::Builder::new()
                    .name(format!("lintpool-worker-{id}"))
                    .spawn_scoped(scope, move || {
                        let report = worker.run();
                        let _ = report_tx.send((id, report));
                    });
                if let Err(e) = spawned {
                    abort.abort(e.into());
                }
            }
            drop(warning_tx);
            drop(report_tx);

            for (id, report) in report_rx {
                match report {
                    Ok(buffer) => {
                        debug!("Worker {} finished {} files", id, buffer.len());
                        for (index, outcome) in buffer {
                            slots[index] = outcome;
                        }
                    }
                    Err(error) => {
                        warn!("Worker {} failed: {}", id, error);
                        abort.abort(error);
                    }
                }
            }
        });

        if let Some(error) = abort.take_reason() {
            return Err(error);
        }
        Ok(slots.into_iter().flatten().collect())
    }
}

/// The state one worker thread runs with.
struct Worker<'a> {
    cli_options: &'a CliOptions,
    factory: &'a Arc<dyn HostFactory>,
    file_paths: &'a [PathBuf],
    counter: Arc<AtomicU32>,
    abort: &'a AbortController,
    channel_name: String,
    warnings: Sender<PathBuf>,
}

impl Worker<'_> {
    fn run(self) -> WorkerReport {
        let counter = Arc::clone(&self.counter);
        let len = self.file_paths.len() as u32;

        let report = match catch_unwind(AssertUnwindSafe(|| self.lint_assigned())) {
            Ok(report) => report,
            Err(payload) => Err(CoreError::WorkerPanic(panic_message(payload.as_ref()))),
        };
        if report.is_err() {
            counter.store(len, Ordering::SeqCst);
        }
        report
    }

    fn lint_assigned(&self) -> WorkerReport {
        let translated = translate_options(self.cli_options, self.factory.as_ref())?;
        let hooks = worker_hooks(self.channel_name.clone(), self.warnings.clone());
        let engine = self.factory.create_engine(translated.engine, hooks)?;

        let mut buffer = Vec::new();
        loop {
            if self.abort.is_aborted() {
                break;
            }
            let index = self.counter.fetch_add(1, Ordering::SeqCst) as usize;
            if index >= self.file_paths.len() {
                break;
            }
            buffer.push((index, lint_one(engine.as_ref(), &self.file_paths[index])?));
        }
        Ok(buffer)
    }
}

fn lint_one(engine: &dyn HostEngine, path: &Path) -> Result<Option<FileOutcome>, CoreError> {
    let Some(result) = engine.lint_file(path)? else {
        return Ok(None);
    };
    let rules_meta = engine.rules_meta_for_results(std::slice::from_ref(&result))?;
    Ok(Some(FileOutcome { result, rules_meta }))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
