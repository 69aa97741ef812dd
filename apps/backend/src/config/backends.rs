use std::time::Duration;

use crate::config::{opt_var, parse_var, require_vars, Configured, MissingConfig};
use crate::error::AppError;

/// Cache connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub url: String,
}

impl CacheConfig {
    /// Read `REDIS_URL`. A bare `host:port` is accepted and treated as
    /// `redis://host:port`.
    pub fn from_env() -> Configured<Self> {
        let [raw] = require_vars(["REDIS_URL"])?;
        Ok(Self::from_address(&raw))
    }

    pub fn from_address(raw: &str) -> Self {
        let raw = raw.trim();
        let url = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("redis://{raw}")
        };
        Self { url }
    }
}

/// S3-compatible object store settings.
#[derive(Clone, PartialEq, Eq)]
pub struct ObjectStoreConfig {
    /// Full endpoint URL, e.g. `https://nyc3.digitaloceanspaces.com`
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub region: String,
}

impl std::fmt::Debug for ObjectStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStoreConfig")
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .finish()
    }
}

pub const DEFAULT_S3_REGION: &str = "us-east-1";

impl ObjectStoreConfig {
    /// Read `S3_URL`, `S3_KEY_ID` and `S3_SECRET_ACCESS_KEY` (required) plus
    /// `S3_BUCKET` and `S3_REGION` (optional).
    pub fn from_env() -> Configured<Self> {
        let [url, access_key_id, secret_access_key] =
            require_vars(["S3_URL", "S3_KEY_ID", "S3_SECRET_ACCESS_KEY"])?;
        Ok(Self::new(
            &url,
            access_key_id,
            secret_access_key,
            opt_var("S3_BUCKET"),
            opt_var("S3_REGION"),
        ))
    }

    /// `url` may omit the scheme, in which case https is assumed. Without an
    /// explicit bucket the endpoint host doubles as the bucket name.
    pub fn new(
        url: &str,
        access_key_id: String,
        secret_access_key: String,
        bucket: Option<String>,
        region: Option<String>,
    ) -> Self {
        let url = url.trim().trim_end_matches('/');
        let (endpoint, host) = match url.split_once("://") {
            Some((_, rest)) => (url.to_string(), rest.to_string()),
            None => (format!("https://{url}"), url.to_string()),
        };
        Self {
            endpoint,
            access_key_id,
            secret_access_key,
            bucket: bucket.unwrap_or(host),
            region: region.unwrap_or_else(|| DEFAULT_S3_REGION.to_string()),
        }
    }
}

/// Outbound mail settings. The API key is checked at send time.
#[derive(Clone, PartialEq, Eq)]
pub struct MailConfig {
    pub api_key: Option<String>,
    pub from: String,
    pub api_base: String,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("from", &self.from)
            .field("api_base", &self.api_base)
            .finish()
    }
}

pub const SENDGRID_API_BASE: &str = "https://api.sendgrid.com";

impl MailConfig {
    /// Read `SENDGRID_API_KEY` and `MAIL_FROM`.
    pub fn from_env() -> Self {
        Self {
            api_key: opt_var("SENDGRID_API_KEY"),
            from: opt_var("MAIL_FROM").unwrap_or_default(),
            api_base: SENDGRID_API_BASE.to_string(),
        }
    }
}

/// Settings for the recurring object cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceConfig {
    pub period: Duration,
    pub prefix: String,
    pub max_age: Duration,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(24 * 60 * 60),
            prefix: "tmp/".to_string(),
            max_age: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl MaintenanceConfig {
    /// Read `MAINTENANCE_PERIOD_SECS`, `MAINTENANCE_PREFIX` and
    /// `MAINTENANCE_MAX_AGE_HOURS`, each optional.
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();
        let period_secs = parse_var("MAINTENANCE_PERIOD_SECS", defaults.period.as_secs())?;
        if period_secs == 0 {
            return Err(AppError::config("MAINTENANCE_PERIOD_SECS must be positive"));
        }
        let max_age_hours = parse_var("MAINTENANCE_MAX_AGE_HOURS", 24u64)?;
        let max_age_secs = max_age_hours.checked_mul(60 * 60).ok_or_else(|| {
            AppError::config(format!(
                "MAINTENANCE_MAX_AGE_HOURS is too large: {max_age_hours}"
            ))
        })?;
        Ok(Self {
            period: Duration::from_secs(period_secs),
            prefix: opt_var("MAINTENANCE_PREFIX").unwrap_or(defaults.prefix),
            max_age: Duration::from_secs(max_age_secs),
        })
    }
}

/// Configuration of every external backend, gathered before initialization.
#[derive(Debug, Clone)]
pub struct BackendsConfig {
    pub db: Configured<crate::config::db::DbConfig>,
    pub cache: Configured<CacheConfig>,
    pub object_store: Configured<ObjectStoreConfig>,
}

impl BackendsConfig {
    pub fn from_env() -> Self {
        Self {
            db: crate::config::db::DbConfig::from_env(),
            cache: CacheConfig::from_env(),
            object_store: ObjectStoreConfig::from_env(),
        }
    }

    /// Every backend left unconfigured, for tests and tooling.
    pub fn unconfigured() -> Self {
        Self {
            db: Err(MissingConfig(vec!["DB_HOST"])),
            cache: Err(MissingConfig(vec!["REDIS_URL"])),
            object_store: Err(MissingConfig(vec!["S3_URL"])),
        }
    }
}
