//! Configuration loading and merging
//!
//! Settings are resolved once per invocation from three layers: built-in
//! defaults, an optional YAML file, and command-line overrides (CLI
//! wins). The resolved [`Config`] is immutable and passed by value into
//! every pipeline stage; there is no process-wide configuration state.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::{DelimiterConfig, DEFAULT_ENVIRONMENTS};

/// Configuration loading error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

// ============================================================
// Sections
// ============================================================

/// Equation delimiter settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquationsConfig {
    /// Canonical `[open, close]` pair for inline math
    pub inline_delimiters: Vec<String>,
    /// Canonical `[open, close]` pair for display math
    pub display_delimiters: Vec<String>,
    /// Environment names accepted without a warning
    pub recognized_environments: Vec<String>,
    /// Warn on bare environments lacking a display-math wrapper
    pub require_math_wrapper: bool,
}

impl Default for EquationsConfig {
    fn default() -> Self {
        Self {
            inline_delimiters: vec!["$".to_string(), "$".to_string()],
            display_delimiters: vec!["$$".to_string(), "$$".to_string()],
            recognized_environments: DEFAULT_ENVIRONMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            require_math_wrapper: false,
        }
    }
}

/// Extracted-media settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Directory (relative to the output file) for extracted media
    pub extract_path: PathBuf,
    /// Downscale oversized images after extraction
    pub optimize: bool,
    /// Maximum width in pixels when optimizing
    pub max_width: u32,
    /// Maximum height in pixels when optimizing
    pub max_height: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            extract_path: PathBuf::from("./media"),
            optimize: false,
            max_width: 1200,
            max_height: 900,
        }
    }
}

/// Table post-processing settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TablesConfig {
    /// Output table format (`pipe` is the only writer today)
    pub format: String,
    /// Header cell emphasis style
    pub header_style: String,
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            format: "pipe".to_string(),
            header_style: "bold".to_string(),
        }
    }
}

/// External converter settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PandocConfig {
    /// Extra arguments appended to every pandoc invocation
    pub extra_args: Vec<String>,
}

impl Default for PandocConfig {
    fn default() -> Self {
        Self {
            extra_args: vec!["--wrap=none".to_string()],
        }
    }
}

/// Pipeline step gates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Run the delimiter fix pass after conversion
    pub fix_delimiters: bool,
    /// Extract embedded media during conversion
    pub extract_images: bool,
    /// Tidy pipe tables after conversion
    pub process_tables: bool,
    /// Worker thread cap for batch conversion
    pub threads: Option<usize>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            fix_delimiters: true,
            extract_images: true,
            process_tables: true,
            threads: None,
        }
    }
}

// ============================================================
// Config
// ============================================================

/// Resolved tool configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub equations: EquationsConfig,
    pub images: ImagesConfig,
    pub tables: TablesConfig,
    pub pandoc: PandocConfig,
    pub processing: ProcessingConfig,
}

/// Delimiter pairs the scanner can round-trip, keyed inline/display.
/// Anything else would break fix idempotence, so unknown pairs fall
/// back to the defaults with a warning.
const VALID_INLINE_PAIRS: &[(&str, &str)] = &[("$", "$"), ("\\(", "\\)")];
const VALID_DISPLAY_PAIRS: &[(&str, &str)] = &[("$$", "$$"), ("\\[", "\\]")];

impl Config {
    /// Load configuration from the default locations: `./mathdown.yaml`,
    /// then the user config directory.
    pub fn load() -> Result<Self, ConfigError> {
        let local = Path::new("mathdown.yaml");
        if local.exists() {
            return Self::load_from_path(local);
        }
        if let Some(user) = Self::user_config_path() {
            if user.exists() {
                return Self::load_from_path(&user);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit YAML file
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Per-user config file location
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("mathdown/config.yaml"))
    }

    /// Apply command-line overrides on top of this configuration.
    /// CLI values take precedence over file values.
    pub fn merge_with_cli(&self, overrides: &CliOverrides) -> Config {
        let mut merged = self.clone();

        if let Some((open, close)) = &overrides.inline_delimiters {
            merged.equations.inline_delimiters = vec![open.clone(), close.clone()];
        }
        if let Some((open, close)) = &overrides.display_delimiters {
            merged.equations.display_delimiters = vec![open.clone(), close.clone()];
        }
        if let Some(require) = overrides.require_math_wrapper {
            merged.equations.require_math_wrapper = require;
        }
        if let Some(fix) = overrides.fix_delimiters {
            merged.processing.fix_delimiters = fix;
        }
        if let Some(extract) = overrides.extract_images {
            merged.processing.extract_images = extract;
        }
        if let Some(tables) = overrides.process_tables {
            merged.processing.process_tables = tables;
        }
        if overrides.threads.is_some() {
            merged.processing.threads = overrides.threads;
        }

        merged
    }

    /// Build the engine-facing delimiter settings.
    ///
    /// Malformed pairs (wrong arity, or a style the scanner cannot
    /// round-trip) are replaced by the defaults, matching the lenient
    /// validation of the config file loader.
    pub fn delimiter_config(&self) -> DelimiterConfig {
        let defaults = DelimiterConfig::default();

        let (inline_open, inline_close) =
            match checked_pair(&self.equations.inline_delimiters, VALID_INLINE_PAIRS) {
                Some(pair) => pair,
                None => {
                    tracing::warn!(
                        "invalid equations.inline_delimiters {:?}, using defaults",
                        self.equations.inline_delimiters
                    );
                    (defaults.inline_open.clone(), defaults.inline_close.clone())
                }
            };
        let (display_open, display_close) =
            match checked_pair(&self.equations.display_delimiters, VALID_DISPLAY_PAIRS) {
                Some(pair) => pair,
                None => {
                    tracing::warn!(
                        "invalid equations.display_delimiters {:?}, using defaults",
                        self.equations.display_delimiters
                    );
                    (
                        defaults.display_open.clone(),
                        defaults.display_close.clone(),
                    )
                }
            };

        DelimiterConfig {
            inline_open,
            inline_close,
            display_open,
            display_close,
            recognized_environments: self
                .equations
                .recognized_environments
                .iter()
                .cloned()
                .collect::<BTreeSet<_>>(),
            require_math_wrapper: self.equations.require_math_wrapper,
        }
    }
}

fn checked_pair(pair: &[String], valid: &[(&str, &str)]) -> Option<(String, String)> {
    match pair {
        [open, close] if valid.iter().any(|(o, c)| o == open && c == close) => {
            Some((open.clone(), close.clone()))
        }
        _ => None,
    }
}

// ============================================================
// CLI overrides
// ============================================================

/// Options the command line may override.
///
/// Only values the user explicitly set are `Some`, so clap defaults
/// never clobber config-file values.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub inline_delimiters: Option<(String, String)>,
    pub display_delimiters: Option<(String, String)>,
    pub require_math_wrapper: Option<bool>,
    pub fix_delimiters: Option<bool>,
    pub extract_images: Option<bool>,
    pub process_tables: Option<bool>,
    pub threads: Option<usize>,
}

impl CliOverrides {
    /// Create an empty set of overrides
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.equations.inline_delimiters, vec!["$", "$"]);
        assert_eq!(config.equations.display_delimiters, vec!["$$", "$$"]);
        assert!(config.processing.fix_delimiters);
        assert!(config.processing.extract_images);
        assert!(!config.images.optimize);
        assert_eq!(config.tables.format, "pipe");
        assert_eq!(config.pandoc.extra_args, vec!["--wrap=none"]);
    }

    #[test]
    fn test_yaml_partial_override() {
        let yaml = r#"
equations:
  inline_delimiters: ["\\(", "\\)"]
processing:
  fix_delimiters: false
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.equations.inline_delimiters, vec!["\\(", "\\)"]);
        // Untouched sections keep their defaults
        assert_eq!(config.equations.display_delimiters, vec!["$$", "$$"]);
        assert!(!config.processing.fix_delimiters);
        assert!(config.processing.process_tables);
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let result = Config::load_from_path(Path::new("/nonexistent/config.yaml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_load_from_path_bad_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "equations: [not, a, mapping]").unwrap();
        let result = Config::load_from_path(&path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_merge_with_cli_precedence() {
        let mut config = Config::default();
        config.processing.fix_delimiters = false;

        let overrides = CliOverrides {
            fix_delimiters: Some(true),
            threads: Some(4),
            ..Default::default()
        };
        let merged = config.merge_with_cli(&overrides);
        assert!(merged.processing.fix_delimiters);
        assert_eq!(merged.processing.threads, Some(4));
        // Untouched values survive the merge
        assert!(merged.processing.extract_images);
    }

    #[test]
    fn test_delimiter_config_roundtrip() {
        let config = Config::default();
        let delims = config.delimiter_config();
        assert_eq!(delims.inline_open, "$");
        assert_eq!(delims.display_close, "$$");
        assert!(delims.recognizes("pmatrix"));
    }

    #[test]
    fn test_delimiter_config_rejects_unknown_pair() {
        let mut config = Config::default();
        config.equations.inline_delimiters = vec!["<m>".to_string(), "</m>".to_string()];
        let delims = config.delimiter_config();
        assert_eq!(delims.inline_open, "$");
        assert_eq!(delims.inline_close, "$");
    }

    #[test]
    fn test_delimiter_config_rejects_wrong_arity() {
        let mut config = Config::default();
        config.equations.display_delimiters = vec!["$$".to_string()];
        let delims = config.delimiter_config();
        assert_eq!(delims.display_open, "$$");
        assert_eq!(delims.display_close, "$$");
    }

    #[test]
    fn test_tex_pair_accepted() {
        let mut config = Config::default();
        config.equations.inline_delimiters = vec!["\\(".to_string(), "\\)".to_string()];
        config.equations.display_delimiters = vec!["\\[".to_string(), "\\]".to_string()];
        let delims = config.delimiter_config();
        assert_eq!(delims.inline_open, "\\(");
        assert_eq!(delims.display_close, "\\]");
    }
}
