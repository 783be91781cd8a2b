//! Service configuration
//!
//! Layered: built-in defaults, then an optional JSON file, then `FILLPDF_*`
//! environment variables. The server binary applies command-line flags last.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the JSON config file
pub const CONFIG_ENV: &str = "FILLPDF_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Listen address (default: 0.0.0.0:8082)
    #[serde(default = "default_bind")]
    pub bind: String,
    /// pdftk executable, looked up on PATH unless absolute
    #[serde(default = "default_pdftk")]
    pub pdftk: PathBuf,
    /// Parent directory for per-request workspaces
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,
    /// Seconds before a pdftk run is killed; 0 disables the limit
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum request body size in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

fn default_bind() -> String {
    "0.0.0.0:8082".to_string()
}

fn default_pdftk() -> PathBuf {
    PathBuf::from(crate::pdftk::DEFAULT_PROGRAM)
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_body_limit() -> usize {
    32 * 1024 * 1024 // base64 PDFs get large
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            pdftk: default_pdftk(),
            temp_dir: default_temp_dir(),
            timeout_secs: default_timeout_secs(),
            body_limit: default_body_limit(),
        }
    }
}

impl Config {
    /// Read a JSON config file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
        serde_json::from_str(&content)
            .map_err(|e| format!("Invalid config {}: {}", path.display(), e))
    }

    /// Defaults, then `file` (or `$FILLPDF_CONFIG`), then environment overrides.
    pub fn load(file: Option<&Path>) -> Result<Self, String> {
        let from_env = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()).map(PathBuf::from);
        let mut config = match file.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `FILLPDF_*` overrides read through `lookup`. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), String> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(bind) = get("FILLPDF_BIND") {
            self.bind = bind;
        }
        if let Some(pdftk) = get("FILLPDF_PDFTK") {
            self.pdftk = PathBuf::from(pdftk);
        }
        if let Some(dir) = get("FILLPDF_TMPDIR") {
            self.temp_dir = PathBuf::from(dir);
        }
        if let Some(secs) = get("FILLPDF_TIMEOUT_SECS") {
            self.timeout_secs = secs
                .trim()
                .parse()
                .map_err(|e| format!("Invalid FILLPDF_TIMEOUT_SECS '{}': {}", secs, e))?;
        }
        if let Some(limit) = get("FILLPDF_BODY_LIMIT") {
            self.body_limit = limit
                .trim()
                .parse()
                .map_err(|e| format!("Invalid FILLPDF_BODY_LIMIT '{}': {}", limit, e))?;
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Version reported by `GET /version`.
///
/// `FILLPDF_VERSION` set at build time wins over the crate version.
pub fn version() -> &'static str {
    option_env!("FILLPDF_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}
