//! Shared service state injected into handlers.

use std::sync::Arc;

use axum::extract::FromRef;
use msgconv_core::Invoker;

use crate::service::ServiceConfig;

/// Process-wide, read-only state shared by all request handlers.
///
/// Cloning is cheap; the configuration sits behind an [`Arc`] and the
/// invoker is a couple of small fields. No request ever mutates this.
#[derive(Debug, Clone)]
pub struct ServiceState {
    config: Arc<ServiceConfig>,
    invoker: Invoker,
}

impl ServiceState {
    /// Creates the service state from its configuration.
    pub fn new(config: ServiceConfig) -> Self {
        let invoker = Invoker::new(&config.converter, config.convert_timeout());

        Self {
            config: Arc::new(config),
            invoker,
        }
    }

    /// Returns the service configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Returns the converter invoker.
    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }
}

impl FromRef<ServiceState> for Invoker {
    fn from_ref(state: &ServiceState) -> Self {
        state.invoker.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn invoker_is_derived_from_config() {
        let state = ServiceState::new(ServiceConfig {
            converter: "/usr/local/bin/msgconvert".to_string(),
            convert_timeout_secs: 7,
            workspace_root: None,
        });

        assert_eq!(
            state.invoker().program(),
            std::path::Path::new("/usr/local/bin/msgconvert")
        );
        assert_eq!(state.invoker().timeout(), Duration::from_secs(7));
    }
}
