//! Process-wide handles to external backends.
//!
//! Each backend is initialized independently and tagged with a failure
//! policy. A `Fatal` failure aborts startup; a `Degraded` one is logged and
//! leaves the handle [`BackendHandle::Unavailable`], which every dependent
//! call checks through [`BackendHandle::get`].

use std::fmt;

use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

use crate::config::backends::{BackendsConfig, CacheConfig, ObjectStoreConfig};
use crate::config::db::DbConfig;
use crate::config::Configured;
use crate::error::AppError;
use crate::infra::cache::Cache;
use crate::infra::db::bootstrap_db;
use crate::storage::ObjectStorage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Store,
    Cache,
    ObjectStore,
}

impl Backend {
    pub fn name(self) -> &'static str {
        match self {
            Backend::Store => "database",
            Backend::Cache => "cache",
            Backend::ObjectStore => "object_store",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a failed initialization means for the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop before serving any request.
    Fatal,
    /// Keep starting; the backend stays unavailable.
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitFailure {
    pub backend: Backend,
    pub policy: FailurePolicy,
    pub detail: String,
}

impl InitFailure {
    pub fn fatal(backend: Backend, detail: impl fmt::Display) -> Self {
        Self {
            backend,
            policy: FailurePolicy::Fatal,
            detail: detail.to_string(),
        }
    }

    pub fn degraded(backend: Backend, detail: impl fmt::Display) -> Self {
        Self {
            backend,
            policy: FailurePolicy::Degraded,
            detail: detail.to_string(),
        }
    }
}

/// A fully initialized backend client, or an explicit marker that it is not
/// available. There is no partially constructed state.
#[derive(Debug, Clone)]
pub enum BackendHandle<T> {
    Ready(T),
    Unavailable { reason: String },
}

impl<T> BackendHandle<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, BackendHandle::Ready(_))
    }

    pub fn get(&self, backend: Backend) -> Result<&T, AppError> {
        match self {
            BackendHandle::Ready(inner) => Ok(inner),
            BackendHandle::Unavailable { reason } => {
                Err(AppError::backend_unavailable(backend.name(), reason.clone()))
            }
        }
    }
}

/// Apply the failure policy to one initialization result.
pub fn settle<T>(result: Result<T, InitFailure>) -> Result<BackendHandle<T>, AppError> {
    match result {
        Ok(inner) => Ok(BackendHandle::Ready(inner)),
        Err(InitFailure {
            backend,
            policy: FailurePolicy::Degraded,
            detail,
        }) => {
            warn!(
                event = "BACKEND_DEGRADED",
                backend = backend.name(),
                detail = %detail,
                "backend unavailable, continuing startup"
            );
            Ok(BackendHandle::unavailable(detail))
        }
        Err(InitFailure {
            backend,
            policy: FailurePolicy::Fatal,
            detail,
        }) => {
            error!(
                event = "BACKEND_INIT_FATAL",
                backend = backend.name(),
                detail = %detail,
                "backend initialization failed"
            );
            Err(AppError::backend_init(backend.name(), detail))
        }
    }
}

/// Relational store: configuration is mandatory and every failure is fatal.
pub async fn init_database(config: &Configured<DbConfig>) -> Result<DatabaseConnection, InitFailure> {
    let config = config
        .as_ref()
        .map_err(|missing| InitFailure::fatal(Backend::Store, missing))?;
    bootstrap_db(config)
        .await
        .map_err(|e| InitFailure::fatal(Backend::Store, e))
}

/// Cache: never fatal. The liveness probe only feeds the logs.
pub async fn init_cache(config: &Configured<CacheConfig>) -> Result<Cache, InitFailure> {
    let config = config
        .as_ref()
        .map_err(|missing| {
            InitFailure::degraded(Backend::Cache, format!("not configured: {missing}"))
        })?;
    let cache = Cache::open(config).map_err(|e| InitFailure::degraded(Backend::Cache, e))?;

    match cache.ping().await {
        Ok(()) => info!(backend = "cache", "Connected to cache"),
        Err(e) => warn!(
            event = "BACKEND_PROBE_FAILED",
            backend = "cache",
            error = %e,
            "Could not reach cache; calls will fail until it recovers"
        ),
    }
    Ok(cache)
}

/// Object store: unconfigured is degraded, configured-but-broken is fatal.
pub fn init_object_store(
    config: &Configured<ObjectStoreConfig>,
) -> Result<ObjectStorage, InitFailure> {
    let config = config
        .as_ref()
        .map_err(|missing| {
            InitFailure::degraded(Backend::ObjectStore, format!("not configured: {missing}"))
        })?;
    let storage =
        ObjectStorage::connect(config).map_err(|e| InitFailure::fatal(Backend::ObjectStore, e))?;
    info!(backend = "object_store", bucket = storage.bucket(), "object store ready");
    Ok(storage)
}

/// The set of backend handles shared by request handlers and the scheduler.
#[derive(Debug)]
pub struct Backends {
    db: BackendHandle<DatabaseConnection>,
    cache: BackendHandle<Cache>,
    object_store: BackendHandle<ObjectStorage>,
}

impl Backends {
    pub fn new(
        db: BackendHandle<DatabaseConnection>,
        cache: BackendHandle<Cache>,
        object_store: BackendHandle<ObjectStorage>,
    ) -> Self {
        Self {
            db,
            cache,
            object_store,
        }
    }

    /// Initialize every backend concurrently and apply each failure policy.
    ///
    /// All results are settled (and logged) before the first fatal one is
    /// returned.
    pub async fn initialize(config: &BackendsConfig) -> Result<Self, AppError> {
        let (db, cache, object_store) = tokio::join!(
            init_database(&config.db),
            init_cache(&config.cache),
            async { init_object_store(&config.object_store) },
        );

        let db = settle(db);
        let cache = settle(cache);
        let object_store = settle(object_store);

        Ok(Self {
            db: db?,
            cache: cache?,
            object_store: object_store?,
        })
    }

    pub fn db(&self) -> Result<&DatabaseConnection, AppError> {
        self.db.get(Backend::Store)
    }

    pub fn cache(&self) -> Result<&Cache, AppError> {
        self.cache.get(Backend::Cache)
    }

    pub fn object_storage(&self) -> Result<&ObjectStorage, AppError> {
        self.object_store.get(Backend::ObjectStore)
    }

    pub fn is_ready(&self, backend: Backend) -> bool {
        match backend {
            Backend::Store => self.db.is_ready(),
            Backend::Cache => self.cache.is_ready(),
            Backend::ObjectStore => self.object_store.is_ready(),
        }
    }

    /// Delete a file from the object store, failing cleanly when it is not
    /// configured.
    pub async fn delete_file(&self, name: &str) -> Result<(), AppError> {
        self.object_storage()?.delete_file(name).await
    }
}
