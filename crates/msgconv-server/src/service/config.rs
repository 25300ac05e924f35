//! Process-wide service configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable holding the converter call timeout in whole
/// seconds.
pub const ENV_CONVERT_TIMEOUT: &str = "MSGCONVERT_TIMEOUT";

/// Environment variable overriding the converter program.
pub const ENV_CONVERTER: &str = "MSGCONVERT_COMMAND";

/// Default converter program, resolved via the search path.
pub const DEFAULT_CONVERTER: &str = "msgconvert";

/// Default converter call timeout in seconds.
pub const DEFAULT_CONVERT_TIMEOUT_SECS: u64 = 30;

/// Immutable configuration for the conversion service.
///
/// Constructed once at startup and never mutated during request
/// handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Converter program name or path.
    #[serde(default = "default_converter")]
    pub converter: String,

    /// Maximum time in seconds one converter invocation may run.
    #[serde(default = "default_convert_timeout_secs")]
    pub convert_timeout_secs: u64,

    /// Root directory for per-request workspaces.
    ///
    /// `None` uses the system temporary directory. Tests point this at a
    /// private directory to observe that no workspace outlives its
    /// request.
    #[serde(default)]
    pub workspace_root: Option<PathBuf>,
}

fn default_converter() -> String {
    DEFAULT_CONVERTER.to_string()
}

fn default_convert_timeout_secs() -> u64 {
    DEFAULT_CONVERT_TIMEOUT_SECS
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            converter: default_converter(),
            convert_timeout_secs: default_convert_timeout_secs(),
            workspace_root: None,
        }
    }
}

impl ServiceConfig {
    /// Builds the configuration from the process environment.
    ///
    /// An absent or malformed `MSGCONVERT_TIMEOUT` falls back to the
    /// default rather than failing startup.
    pub fn from_env() -> Self {
        Self {
            converter: converter_from(env::var(ENV_CONVERTER).ok().as_deref()),
            convert_timeout_secs: timeout_from(env::var(ENV_CONVERT_TIMEOUT).ok().as_deref()),
            workspace_root: None,
        }
    }

    /// Returns the converter call timeout as a [`Duration`].
    pub fn convert_timeout(&self) -> Duration {
        Duration::from_secs(self.convert_timeout_secs)
    }
}

/// Parses the timeout value, defaulting on absent, malformed, or zero
/// input. A zero deadline could never let a conversion finish.
fn timeout_from(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|&secs| secs > 0)
        .unwrap_or(DEFAULT_CONVERT_TIMEOUT_SECS)
}

/// Picks the converter program, defaulting on absent or blank input.
fn converter_from(raw: Option<&str>) -> String {
    match raw {
        Some(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => DEFAULT_CONVERTER.to_string(),
    }
}
