use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};

use crate::config::backends::CacheConfig;
use crate::error::AppError;
use crate::infra::bounded;

/// Cache client handle.
///
/// Opening only validates the URL; connections are made per call, so an
/// unreachable server surfaces as an error on first use rather than at
/// startup.
#[derive(Debug, Clone)]
pub struct Cache {
    client: Client,
}

impl Cache {
    pub fn open(config: &CacheConfig) -> Result<Self, AppError> {
        let client = Client::open(config.url.as_str())
            .map_err(|err| AppError::config(format!("Invalid REDIS_URL: {err}")))?;
        Ok(Self { client })
    }

    async fn connection(&self) -> Result<MultiplexedConnection, AppError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|err| AppError::upstream("cache", err.to_string()))
    }

    /// Single round-trip liveness probe.
    pub async fn ping(&self) -> Result<(), AppError> {
        bounded("cache ping", async {
            let mut conn = self.connection().await?;
            redis::cmd("PING")
                .query_async::<String>(&mut conn)
                .await
                .map_err(|err| AppError::upstream("cache", err.to_string()))?;
            Ok(())
        })
        .await
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        bounded("cache get", async {
            let mut conn = self.connection().await?;
            conn.get::<_, Option<String>>(key)
                .await
                .map_err(|err| AppError::upstream("cache", err.to_string()))
        })
        .await
    }

    pub async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), AppError> {
        bounded("cache set", async {
            let mut conn = self.connection().await?;
            conn.set_ex::<_, _, ()>(key, value, ttl_secs)
                .await
                .map_err(|err| AppError::upstream("cache", err.to_string()))
        })
        .await
    }
}
