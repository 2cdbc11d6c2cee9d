//! Declarative route entries and their resolution into a [`RouteConfig`].
//!
//! TOML can only express the name-based half of the routing model: exact
//! file, extension, and once triggers, plus the non-closure output
//! policies. Predicate triggers and custom naming functions are registered
//! programmatically by embedders through the `RouteConfig` API.

use std::path::PathBuf;

use serde::Deserialize;

use super::{Config, ConfigDiagnostics, ConfigError};
use crate::route::{OutputPolicy, Route, RouteConfig, Trigger};
use crate::step::StepRegistry;

/// One `[[loader]]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoaderEntry {
    pub step: String,
}

/// One `[[route]]` table.
///
/// Exactly one trigger key (`file`, `ext`, or `once = true`) must be set.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteEntry {
    pub step: String,
    pub file: Option<PathBuf>,
    pub ext: Option<String>,
    #[serde(default)]
    pub once: bool,
    pub output: Option<OutputEntry>,
}

/// The `output = { ... }` inline table of a route.
///
/// Exactly one key: `same = true`, `ext = "..."`, `name = "..."`, or
/// `files = true`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputEntry {
    #[serde(default)]
    pub same: bool,
    pub ext: Option<String>,
    pub name: Option<PathBuf>,
    #[serde(default)]
    pub files: bool,
}

impl RouteEntry {
    pub(super) fn validate(&self, index: usize, diag: &mut ConfigDiagnostics) {
        let field = format!("route.{index}");

        let triggers =
            usize::from(self.file.is_some()) + usize::from(self.ext.is_some()) + usize::from(self.once);
        if triggers == 0 {
            diag.error(&field, "needs a trigger: one of `file`, `ext`, `once = true`");
        } else if triggers > 1 {
            diag.error(&field, "has more than one trigger; pick one of `file`, `ext`, `once`");
        }

        if let Some(output) = &self.output {
            let outputs = usize::from(output.same)
                + usize::from(output.ext.is_some())
                + usize::from(output.name.is_some())
                + usize::from(output.files);
            if outputs != 1 {
                diag.error(
                    &format!("{field}.output"),
                    "needs exactly one of `same`, `ext`, `name`, `files`",
                );
            }
            if let Some(name) = &output.name {
                if name.is_absolute() {
                    diag.error(
                        &format!("{field}.output.name"),
                        "must be relative to the output directory",
                    );
                }
            }
        }

        if self.once && self.output.as_ref().is_none_or(|o| o.name.is_none() && !o.files) {
            diag.error(
                &field,
                "a once route has no input path; give it `output = { name = \"...\" }` or `{ files = true }`",
            );
        }
    }

    fn trigger(&self) -> Trigger {
        if self.once {
            Trigger::Once
        } else if let Some(file) = &self.file {
            Trigger::File(file.clone())
        } else if let Some(ext) = &self.ext {
            Trigger::ext(ext)
        } else {
            // validate() rejects this before resolution runs
            Trigger::Once
        }
    }

    fn policy(&self) -> OutputPolicy {
        match &self.output {
            None => OutputPolicy::SameFileName,
            Some(output) => {
                if output.files {
                    OutputPolicy::MultipleFiles
                } else if let Some(ext) = &output.ext {
                    OutputPolicy::change_ext(ext)
                } else if let Some(name) = &output.name {
                    OutputPolicy::NewFileName(name.clone())
                } else {
                    OutputPolicy::SameFileName
                }
            }
        }
    }
}

/// Resolve declarative entries into a runnable [`RouteConfig`].
///
/// Unresolvable step names are fatal, per the configuration-error policy.
pub fn resolve_routes(config: &Config, registry: &StepRegistry) -> Result<RouteConfig, ConfigError> {
    let mut routes = RouteConfig::new();

    for (index, entry) in config.loaders.iter().enumerate() {
        let loader =
            registry
                .resolve_loader(&entry.step)
                .ok_or_else(|| ConfigError::UnknownLoader {
                    index,
                    step: entry.step.clone(),
                })?;
        routes.add_loader(loader);
    }

    for (index, entry) in config.routes.iter().enumerate() {
        let step = registry
            .resolve(&entry.step)
            .ok_or_else(|| ConfigError::UnknownStep {
                index,
                step: entry.step.clone(),
                available: registry.step_names().join(", "),
            })?;
        routes.add_route(Route::new(step, entry.trigger(), entry.policy()));
    }

    Ok(routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::path::Path;

    fn entry(toml: &str) -> RouteEntry {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_trigger_resolution() {
        let file = entry("step = \"copy\"\nfile = \"about.md\"");
        assert!(matches!(file.trigger(), Trigger::File(_)));

        let ext = entry("step = \"copy\"\next = \".css\"");
        assert!(matches!(ext.trigger(), Trigger::Extension(ref e) if e == "css"));

        let once = entry("step = \"copy\"\nonce = true");
        assert!(once.trigger().is_once());
    }

    #[test]
    fn test_policy_defaults_to_same_file_name() {
        let e = entry("step = \"copy\"\next = \"css\"");
        assert!(matches!(e.policy(), OutputPolicy::SameFileName));
    }

    #[test]
    fn test_policy_variants() {
        let ext = entry("step = \"r\"\next = \"md\"\noutput = { ext = \"html\" }");
        assert!(matches!(ext.policy(), OutputPolicy::ChangeExtension(ref e) if e == "html"));

        let name = entry("step = \"r\"\nonce = true\noutput = { name = \"feed.xml\" }");
        assert!(matches!(name.policy(), OutputPolicy::NewFileName(_)));

        let files = entry("step = \"r\"\next = \"md\"\noutput = { files = true }");
        assert!(matches!(files.policy(), OutputPolicy::MultipleFiles));
    }

    #[test]
    fn test_validate_requires_one_trigger() {
        let mut diag = ConfigDiagnostics::new();
        entry("step = \"copy\"").validate(0, &mut diag);
        assert!(diag.has_errors());

        let mut diag = ConfigDiagnostics::new();
        entry("step = \"copy\"\next = \"css\"\nfile = \"a.css\"").validate(0, &mut diag);
        assert!(diag.has_errors());
    }

    #[test]
    fn test_validate_once_needs_named_output() {
        let mut diag = ConfigDiagnostics::new();
        entry("step = \"feed\"\nonce = true").validate(0, &mut diag);
        assert!(diag.has_errors());

        let mut diag = ConfigDiagnostics::new();
        entry("step = \"feed\"\nonce = true\noutput = { name = \"feed.xml\" }").validate(0, &mut diag);
        assert!(!diag.has_errors());
    }

    #[test]
    fn test_resolve_unknown_step_fatal() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut config = Config::with_root(temp.path());
        config.routes.push(entry("step = \"no-such-step\"\next = \"md\""));

        let registry = StepRegistry::with_builtins();
        let result = resolve_routes(&config, &registry);
        assert!(matches!(result, Err(ConfigError::UnknownStep { .. })));
    }

    #[test]
    fn test_resolve_builtin_copy() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut config = Config::with_root(temp.path());
        config.routes.push(entry("step = \"copy\"\next = \"css\""));

        let registry = StepRegistry::with_builtins();
        let routes = resolve_routes(&config, &registry).unwrap();
        assert_eq!(routes.routes().len(), 1);
        assert!(
            routes
                .matching(Path::new("/p"), Path::new("style.css"))
                .next()
                .is_some()
        );
    }
}
