//! CLI configuration management.
//!
//! Network binding and lifecycle settings come from CLI arguments or
//! environment variables via clap; the conversion settings
//! (`MSGCONVERT_TIMEOUT`, `MSGCONVERT_COMMAND`) are read from the
//! environment by `msgconv_server::service::ServiceConfig`, which must
//! tolerate malformed values by falling back to defaults.
//!
//! # Example
//!
//! ```bash
//! msgconv --host 0.0.0.0 --port 9000
//!
//! # Or via environment variables
//! HOST=0.0.0.0 PORT=9000 msgconv
//! ```

mod server;

use clap::Parser;
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "msgconv")]
#[command(about = "HTTP wrapper around the msgconvert command-line converter")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
