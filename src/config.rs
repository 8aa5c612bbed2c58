//! Site configuration: URL layout, link resolution mode, source locations.
//!
//! Loaded from a TOML file; every field has a default so an empty file (or
//! no file at all) is valid.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site root, without a trailing slash.
    pub home_url: String,

    /// Put every reference URL under `reference/`.
    pub use_prefix: bool,

    /// Namespace stripped from displayed namespaces, e.g. `Vendor\Project`.
    pub root_namespace: String,

    /// Look references up in the repository before linking them. When off,
    /// only functions and hooks are linked, by URL synthesis.
    pub strict_links: bool,

    pub source: SourceConfig,
}

/// Where the documented source code lives, locally and on GitHub.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Directory the parser imported from; source excerpts are read here.
    pub root_dir: Option<PathBuf>,
    /// `owner/repo`
    pub github_repository: String,
    /// Subdirectory of the repository that corresponds to `root_dir`.
    pub github_root_dir: String,
    /// Tag or branch to link to; `master` when empty.
    pub project_version: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            home_url: "http://localhost".to_string(),
            use_prefix: true,
            root_namespace: String::new(),
            strict_links: true,
            source: SourceConfig::default(),
        }
    }
}

impl Config {
    pub fn from_toml(text: &str, path: &Path) -> Result<Self> {
        let mut config: Config = toml::from_str(text).map_err(|source| Error::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.home_url = config.home_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    /// Load a config file. A relative `source.root_dir` is taken relative to
    /// the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut config = Self::from_toml(&text, path)?;
        if let (Some(root), Some(base)) = (config.source.root_dir.as_mut(), path.parent()) {
            if root.is_relative() {
                *root = base.join(&*root);
            }
        }
        tracing::debug!(path = %path.display(), home_url = %config.home_url, "loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let c = Config::from_toml("", Path::new("x.toml")).unwrap();
        assert_eq!(c, Config::default());
        assert!(c.use_prefix);
        assert!(c.strict_links);
    }

    #[test]
    fn parses_nested_source_table() {
        let text = r#"
home_url = "https://docs.example.org/"
use_prefix = false
strict_links = false

[source]
github_repository = "acme/widgets"
project_version = "4.2"
"#;
        let c = Config::from_toml(text, Path::new("x.toml")).unwrap();
        assert_eq!(c.home_url, "https://docs.example.org");
        assert!(!c.use_prefix);
        assert!(!c.strict_links);
        assert_eq!(c.source.github_repository, "acme/widgets");
        assert_eq!(c.source.project_version, "4.2");
        assert!(c.source.root_dir.is_none());
    }

    #[test]
    fn bad_toml_reports_path() {
        let err = Config::from_toml("use_prefix = 3", Path::new("site.toml")).unwrap_err();
        assert!(err.to_string().contains("site.toml"));
    }

    #[test]
    fn relative_root_dir_follows_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("refdoc.toml");
        fs::write(&path, "[source]\nroot_dir = \"src\"\n").unwrap();
        let c = Config::load(&path).unwrap();
        assert_eq!(c.source.root_dir, Some(dir.path().join("src")));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = Config::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
