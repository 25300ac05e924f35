//! Service configuration and shared state.

mod config;
mod state;

pub use config::{
    DEFAULT_CONVERT_TIMEOUT_SECS, DEFAULT_CONVERTER, ENV_CONVERT_TIMEOUT, ENV_CONVERTER,
    ServiceConfig,
};
pub use state::ServiceState;
