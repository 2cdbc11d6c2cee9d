//! Step dispatch: one build pass over the project tree.
//!
//! A pass runs in two phases with a hard ordering invariant between them:
//!
//! 1. **Loaders** run sequentially against a fresh, mutable
//!    [`ContentStore`].
//! 2. **Producers** run against the frozen store: `Once` routes first (in
//!    declaration order), then per-file routes, with independent files
//!    fanned out across rayon workers. Producers only ever hold
//!    `&ContentStore`, so the no-mutation-during-produce rule is checked
//!    by the compiler.
//!
//! Per-file failures are recovered into the [`BuildReport`]; loader and
//! `Once`-step failures abort the pass. Output collisions are warnings:
//! last writer wins, and the conflict is reported.

mod report;
mod walk;


pub use report::{BuildReport, FileError};
pub use walk::{is_reserved, project_files};

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use rayon::prelude::*;
use thiserror::Error;

use crate::cache::{CacheEntry, StepCache};
use crate::config::Config;
use crate::debug;
use crate::freshness::Fingerprint;
use crate::route::{OutputPolicy, Route, RouteConfig};
use crate::step::{StepContext, StepError, StepOutput};
use crate::store::ContentStore;

/// Fatal pass failure. Everything recoverable lands in the report instead.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("loader `{name}` failed")]
    Loader {
        name: String,
        #[source]
        source: StepError,
    },

    #[error("step `{name}` failed")]
    OnceStep {
        name: String,
        #[source]
        source: StepError,
    },

    #[error("output root `{path}` is unusable")]
    OutputRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Ledger of output paths written during one pass, for collision detection.
/// Keyed by output-relative path; value identifies the producing
/// (step, input) pair.
type OutputLedger = DashMap<PathBuf, String>;

/// Executes build passes against a project.
///
/// Cheap to clone; the watch loop and the serve thread share one via
/// `Arc`-held parts.
#[derive(Clone)]
pub struct Dispatcher {
    config: Arc<Config>,
    routes: Arc<RouteConfig>,
    cache: Arc<StepCache>,
}

impl Dispatcher {
    pub fn new(config: Arc<Config>, routes: Arc<RouteConfig>, cache: Arc<StepCache>) -> Self {
        Self {
            config,
            routes,
            cache,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &StepCache {
        &self.cache
    }

    /// One full pass: every project file plus all `Once` routes.
    pub fn run_full(&self) -> Result<BuildReport, DispatchError> {
        let files = walk::project_files(&self.config);
        debug!("build"; "dispatching over {} project files", files.len());
        self.run_pass(&files)
    }

    /// Incremental pass: the changed-file set plus all `Once` routes.
    ///
    /// Callers hand in project-relative paths of files that still exist;
    /// outputs of unrelated files are never touched.
    pub fn run_incremental(&self, changed: &[PathBuf]) -> Result<BuildReport, DispatchError> {
        debug!("build"; "incremental pass over {} files", changed.len());
        self.run_pass(changed)
    }

    fn run_pass(&self, files: &[PathBuf]) -> Result<BuildReport, DispatchError> {
        let started = Instant::now();

        let out_root = self.config.output_dir();
        fs::create_dir_all(&out_root).map_err(|source| DispatchError::OutputRoot {
            path: out_root.clone(),
            source,
        })?;

        // Phase 1: loaders populate a fresh store.
        let mut store = ContentStore::new();
        for loader in self.routes.loaders() {
            debug!("build"; "loader `{}`", loader.name());
            loader
                .load(&self.config.root, &mut store)
                .map_err(|source| DispatchError::Loader {
                    name: loader.name().to_string(),
                    source,
                })?;
        }
        let store = store; // frozen: producers only get &store

        let ledger: OutputLedger = DashMap::new();
        let mut report = BuildReport::default();

        // Phase 2a: once routes, declaration order, sequential.
        for route in self.routes.once_routes() {
            report.absorb(self.run_once_route(route, &store, &ledger)?);
        }

        // Phase 2b: per-file routes, parallel across files.
        let outcomes: Vec<BuildReport> = files
            .par_iter()
            .map(|rel| self.process_file(rel, &store, &ledger))
            .collect();
        for outcome in outcomes {
            report.absorb(outcome);
        }

        report.elapsed = started.elapsed();
        Ok(report)
    }

    /// Run one `Once` route against the synthetic global input.
    fn run_once_route(
        &self,
        route: &Route,
        store: &ContentStore,
        ledger: &OutputLedger,
    ) -> Result<BuildReport, DispatchError> {
        let name = route.step.name().to_string();
        let owner = format!("{name}(once)");
        let mut report = BuildReport::default();

        if let Some(entry) = self.cache.get_once(&name) {
            let rewritten = self
                .restore_outputs(&entry, &owner, ledger, &mut report.warnings)
                .map_err(|message| DispatchError::OnceStep {
                    name: name.clone(),
                    source: StepError::msg(message),
                })?;
            report.cached += 1;
            report.written += rewritten;
            return Ok(report);
        }

        let ctx = StepContext {
            store,
            root: &self.config.root,
            input: None,
        };
        let output = route
            .step
            .run(&ctx)
            .map_err(|source| DispatchError::OnceStep {
                name: name.clone(),
                source,
            })?;

        report.invoked += 1;
        let paths = self
            .write_output(&route.policy, None, &output, &owner, ledger, &mut report.warnings)
            .map_err(|message| DispatchError::OnceStep {
                name: name.clone(),
                source: StepError::msg(message),
            })?;
        report.written += paths.len();

        self.cache.put_once(
            &name,
            CacheEntry {
                fingerprint: Fingerprint::Missing,
                output,
                outputs: paths,
            },
        );
        Ok(report)
    }

    /// Run every matching route for one project file.
    ///
    /// All failures here are recovered: recorded, and the pass continues.
    fn process_file(&self, rel: &Path, store: &ContentStore, ledger: &OutputLedger) -> BuildReport {
        let mut report = BuildReport::default();
        let abs = self.config.root.join(rel);

        for route in self.routes.matching(&self.config.root, rel) {
            let name = route.step.name();
            let owner = format!("{name}({})", rel.display());
            let fingerprint = Fingerprint::of(&abs, self.config.build.fingerprint);

            if let Some(entry) = self.cache.get(name, rel, &fingerprint) {
                debug!("build"; "cache hit: {owner}");
                match self.restore_outputs(&entry, &owner, ledger, &mut report.warnings) {
                    Ok(rewritten) => {
                        report.cached += 1;
                        report.written += rewritten;
                    }
                    Err(message) => report.errors.push(FileError {
                        path: rel.to_path_buf(),
                        step: name.to_string(),
                        message,
                    }),
                }
                continue;
            }

            let ctx = StepContext {
                store,
                root: &self.config.root,
                input: Some(rel),
            };
            report.invoked += 1;

            match route.step.run(&ctx) {
                Ok(output) => {
                    match self.write_output(
                        &route.policy,
                        Some(rel),
                        &output,
                        &owner,
                        ledger,
                        &mut report.warnings,
                    ) {
                        Ok(paths) => {
                            report.written += paths.len();
                            self.cache.put(
                                name,
                                rel,
                                CacheEntry {
                                    fingerprint,
                                    output,
                                    outputs: paths,
                                },
                            );
                        }
                        Err(message) => report.errors.push(FileError {
                            path: rel.to_path_buf(),
                            step: name.to_string(),
                            message,
                        }),
                    }
                }
                Err(e) => report.errors.push(FileError {
                    path: rel.to_path_buf(),
                    step: name.to_string(),
                    message: e.to_string(),
                }),
            }
        }

        report
    }

    /// Resolve output path(s) for a step result and write the content.
    ///
    /// Returns the output-relative paths written.
    fn write_output(
        &self,
        policy: &OutputPolicy,
        input: Option<&Path>,
        output: &StepOutput,
        owner: &str,
        ledger: &OutputLedger,
        warnings: &mut Vec<String>,
    ) -> Result<Vec<PathBuf>, String> {
        match output {
            StepOutput::Files(files) => {
                if !matches!(policy, OutputPolicy::MultipleFiles) {
                    return Err(
                        "step returned a file set but the route's policy names a single output"
                            .to_string(),
                    );
                }
                let mut paths = Vec::with_capacity(files.len());
                for (rel_out, bytes) in files {
                    self.write_one(rel_out, bytes, owner, ledger, warnings)?;
                    paths.push(rel_out.clone());
                }
                Ok(paths)
            }
            single => {
                if matches!(policy, OutputPolicy::MultipleFiles) {
                    return Err(
                        "step result must be a file set under the MultipleFiles policy".to_string(),
                    );
                }
                let Some(rel_out) = policy.resolve(input) else {
                    return Err("output policy yields no path for this invocation".to_string());
                };
                let bytes = single.as_bytes().unwrap_or(&[]);
                self.write_one(&rel_out, bytes, owner, ledger, warnings)?;
                Ok(vec![rel_out])
            }
        }
    }

    /// Write one output file, creating parent directories as needed.
    fn write_one(
        &self,
        rel_out: &Path,
        bytes: &[u8],
        owner: &str,
        ledger: &OutputLedger,
        warnings: &mut Vec<String>,
    ) -> Result<(), String> {
        if rel_out.as_os_str().is_empty()
            || rel_out.is_absolute()
            || rel_out
                .components()
                .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(format!(
                "output path `{}` escapes the output directory",
                rel_out.display()
            ));
        }

        self.claim_output(rel_out, owner, ledger, warnings);

        let abs = self.config.output_dir().join(rel_out);
        if let Some(parent) = abs.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("failed to create `{}`: {e}", parent.display()))?;
        }
        fs::write(&abs, bytes).map_err(|e| format!("failed to write `{}`: {e}", rel_out.display()))
    }

    /// Register an output path in the collision ledger.
    fn claim_output(
        &self,
        rel_out: &Path,
        owner: &str,
        ledger: &OutputLedger,
        warnings: &mut Vec<String>,
    ) {
        if let Some(previous) = ledger.insert(rel_out.to_path_buf(), owner.to_string()) {
            if previous != owner {
                warnings.push(format!(
                    "output collision: `{}` produced by both {previous} and {owner}; last writer wins",
                    rel_out.display()
                ));
            }
        }
    }

    /// Make a cache hit's outputs present on disk without re-invoking the
    /// step: rewrite only the files that are missing.
    ///
    /// Returns how many outputs were rewritten.
    fn restore_outputs(
        &self,
        entry: &CacheEntry,
        owner: &str,
        ledger: &OutputLedger,
        warnings: &mut Vec<String>,
    ) -> Result<usize, String> {
        let out_root = self.config.output_dir();
        let mut rewritten = 0;

        for rel_out in &entry.outputs {
            self.claim_output(rel_out, owner, ledger, warnings);

            let abs = out_root.join(rel_out);
            if abs.exists() {
                continue;
            }

            let bytes = match &entry.output {
                StepOutput::Files(files) => files
                    .iter()
                    .find(|(path, _)| path == rel_out)
                    .map(|(_, bytes)| bytes.as_slice())
                    .unwrap_or(&[]),
                single => single.as_bytes().unwrap_or(&[]),
            };

            if let Some(parent) = abs.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| format!("failed to create `{}`: {e}", parent.display()))?;
            }
            fs::write(&abs, bytes)
                .map_err(|e| format!("failed to write `{}`: {e}", rel_out.display()))?;
            rewritten += 1;
        }

        Ok(rewritten)
    }
}
