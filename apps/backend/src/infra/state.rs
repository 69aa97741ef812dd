use std::sync::Arc;

use tracing::info;

use crate::auth::TokenAuthority;
use crate::config::backends::{BackendsConfig, MailConfig};
use crate::config::Config;
use crate::error::AppError;
use crate::infra::registry::{Backend, Backends};
use crate::mail::Mailer;
use crate::state::app_state::AppState;
use crate::state::security_config::SecurityConfig;

/// Builder for the process-wide [`AppState`] (used in both tests and main).
pub struct StateBuilder {
    security: SecurityConfig,
    backends: BackendsConfig,
    mail: MailConfig,
}

impl StateBuilder {
    pub fn new(security: SecurityConfig) -> Self {
        Self {
            security,
            backends: BackendsConfig::unconfigured(),
            mail: MailConfig {
                api_key: None,
                from: String::new(),
                api_base: crate::config::backends::SENDGRID_API_BASE.to_string(),
            },
        }
    }

    pub fn with_backends(mut self, backends: BackendsConfig) -> Self {
        self.backends = backends;
        self
    }

    pub fn with_mail(mut self, mail: MailConfig) -> Self {
        self.mail = mail;
        self
    }

    /// Validate the signing secret, then bring up every backend. A fatal
    /// backend failure is returned before any state exists.
    pub async fn build(self) -> Result<AppState, AppError> {
        let tokens = TokenAuthority::new(self.security)?;
        let mailer = Mailer::new(self.mail)?;
        let backends = Backends::initialize(&self.backends).await?;

        info!(
            db = backends.is_ready(Backend::Store),
            cache = backends.is_ready(Backend::Cache),
            object_store = backends.is_ready(Backend::ObjectStore),
            mail = mailer.is_configured(),
            "application state ready"
        );
        Ok(AppState::new(Arc::new(backends), tokens, mailer))
    }
}

pub fn build_state(config: &Config) -> StateBuilder {
    StateBuilder::new(config.security.clone())
        .with_backends(config.backends.clone())
        .with_mail(config.mail.clone())
}
