use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::security_config::SecurityConfig;
use crate::auth::TokenAuthority;
use crate::config::backends::MailConfig;
use crate::error::AppError;
use crate::infra::registry::{BackendHandle, Backends};
use crate::mail::Mailer;

/// Application state containing shared resources
#[derive(Debug, Clone)]
pub struct AppState {
    /// Backend handles built once at startup
    pub backends: Arc<Backends>,
    /// Issues and verifies access tokens
    pub tokens: TokenAuthority,
    pub mailer: Mailer,
}

impl AppState {
    pub fn new(backends: Arc<Backends>, tokens: TokenAuthority, mailer: Mailer) -> Self {
        Self {
            backends,
            tokens,
            mailer,
        }
    }

    pub fn db(&self) -> Result<&DatabaseConnection, AppError> {
        self.backends.db()
    }

    /// State around an optional database connection, with cache and object
    /// store unavailable and mail unconfigured.
    pub fn for_tests(db: Option<DatabaseConnection>, security: SecurityConfig) -> Result<Self, AppError> {
        let db = match db {
            Some(conn) => BackendHandle::Ready(conn),
            None => BackendHandle::unavailable("not configured: no database in tests"),
        };
        let backends = Backends::new(
            db,
            BackendHandle::unavailable("not configured: no cache in tests"),
            BackendHandle::unavailable("not configured: no object store in tests"),
        );
        let mailer = Mailer::new(MailConfig {
            api_key: None,
            from: String::new(),
            api_base: String::new(),
        })?;
        Ok(Self::new(
            Arc::new(backends),
            TokenAuthority::new(security)?,
            mailer,
        ))
    }
}
