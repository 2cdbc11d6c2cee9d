//! Project configuration.
//!
//! Loaded once from `sitemill.toml` at process start and immutable for the
//! process lifetime — editing the config requires a restart, and the
//! watcher deliberately ignores it.

mod error;
mod routes;

pub use error::{ConfigDiagnostics, ConfigError};
pub use routes::{LoaderEntry, OutputEntry, RouteEntry, resolve_routes};

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::freshness::FingerprintMode;
use crate::utils::path::normalize_path;

/// Sidecar directory reserved for engine bookkeeping.
///
/// Ignored by both the walker and the watcher; removed by `clean`.
pub const CACHE_DIR: &str = ".sitemill";

/// Default config file name.
pub const CONFIG_FILE: &str = "sitemill.toml";

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSection {
    /// Output directory, relative to the project root.
    pub output: PathBuf,
    /// Freshness signal for the step cache.
    pub fingerprint: FingerprintMode,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            output: PathBuf::from("public"),
            fingerprint: FingerprintMode::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchSection {
    /// Quiet period after the last filesystem event before a rebuild.
    pub debounce_ms: u64,
    /// Minimum gap between two rebuild passes.
    pub cooldown_ms: u64,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            cooldown_ms: 800,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServeSection {
    pub port: u16,
    pub interface: IpAddr,
}

impl Default for ServeSection {
    fn default() -> Self {
        Self {
            port: 8000,
            interface: IpAddr::from([127, 0, 0, 1]),
        }
    }
}

// =============================================================================
// Config
// =============================================================================

/// Raw deserialized config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    build: BuildSection,
    watch: WatchSection,
    serve: ServeSection,
    #[serde(rename = "loader")]
    loaders: Vec<LoaderEntry>,
    #[serde(rename = "route")]
    routes: Vec<RouteEntry>,
}

/// Validated project configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Absolute project root.
    pub root: PathBuf,
    pub build: BuildSection,
    pub watch: WatchSection,
    pub serve: ServeSection,
    pub loaders: Vec<LoaderEntry>,
    pub routes: Vec<RouteEntry>,
}

impl Config {
    /// Load and validate `sitemill.toml`.
    ///
    /// `config_path` may be absolute or relative to `root`.
    pub fn load(root: &Path, config_path: &Path) -> Result<Self, ConfigError> {
        let root = normalize_path(root);
        let path = if config_path.is_absolute() {
            config_path.to_path_buf()
        } else {
            root.join(config_path)
        };

        let text =
            std::fs::read_to_string(&path).map_err(|e| ConfigError::Io(path.clone(), e))?;
        let file: ConfigFile = toml::from_str(&text)?;

        let config = Self {
            root,
            build: file.build,
            watch: file.watch,
            serve: file.serve,
            loaders: file.loaders,
            routes: file.routes,
        };
        config.validate()?;
        Ok(config)
    }

    /// A config with defaults and no routes, for tests and embedding.
    pub fn with_root(root: &Path) -> Self {
        Self {
            root: normalize_path(root),
            build: BuildSection::default(),
            watch: WatchSection::default(),
            serve: ServeSection::default(),
            loaders: Vec::new(),
            routes: Vec::new(),
        }
    }

    /// Absolute output directory.
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.build.output)
    }

    /// Absolute cache sidecar directory.
    pub fn cache_dir(&self) -> PathBuf {
        self.root.join(CACHE_DIR)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        if self.build.output.as_os_str().is_empty() || self.build.output == Path::new(".") {
            diag.error("build.output", "must name a subdirectory, not the project root");
        }
        if self.build.output.is_absolute() {
            diag.error("build.output", "must be relative to the project root");
        }

        for (i, entry) in self.routes.iter().enumerate() {
            entry.validate(i, &mut diag);
        }

        diag.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_config(dir: &Path, text: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILE);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_load_minimal_config() {
        let temp = tempfile::TempDir::new().unwrap();
        write_config(temp.path(), "");

        let config = Config::load(temp.path(), Path::new(CONFIG_FILE)).unwrap();
        assert_eq!(config.build.output, PathBuf::from("public"));
        assert_eq!(config.watch.debounce_ms, 300);
        assert_eq!(config.serve.port, 8000);
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_load_full_config() {
        let temp = tempfile::TempDir::new().unwrap();
        write_config(
            temp.path(),
            r#"
[build]
output = "dist"
fingerprint = "hash"

[watch]
debounce_ms = 100
cooldown_ms = 200

[serve]
port = 4321

[[loader]]
step = "pages"

[[route]]
step = "copy"
ext = "css"

[[route]]
step = "render"
ext = "md"
output = { ext = "html" }
"#,
        );

        let config = Config::load(temp.path(), Path::new(CONFIG_FILE)).unwrap();
        assert_eq!(config.build.output, PathBuf::from("dist"));
        assert_eq!(config.build.fingerprint, FingerprintMode::Hash);
        assert_eq!(config.serve.port, 4321);
        assert_eq!(config.loaders.len(), 1);
        assert_eq!(config.routes.len(), 2);
    }

    #[test]
    fn test_missing_config_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let result = Config::load(temp.path(), Path::new(CONFIG_FILE));
        assert!(matches!(result, Err(ConfigError::Io(..))));
    }

    #[test]
    fn test_malformed_toml() {
        let temp = tempfile::TempDir::new().unwrap();
        write_config(temp.path(), "[build\noutput=");
        let result = Config::load(temp.path(), Path::new(CONFIG_FILE));
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let temp = tempfile::TempDir::new().unwrap();
        write_config(temp.path(), "[build]\noutptu = \"public\"\n");
        assert!(Config::load(temp.path(), Path::new(CONFIG_FILE)).is_err());
    }

    #[test]
    fn test_absolute_output_rejected() {
        let temp = tempfile::TempDir::new().unwrap();
        write_config(temp.path(), "[build]\noutput = \"/tmp/out\"\n");
        let result = Config::load(temp.path(), Path::new(CONFIG_FILE));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
