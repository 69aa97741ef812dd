use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::{require_vars, Configured};

/// Characters escaped in URL userinfo; RFC 3986 unreserved ones pass through.
const USERINFO: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Connection settings for the relational store. Every field is mandatory.
#[derive(Clone, PartialEq)]
pub struct DbConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub name: String,
    pub port: String,
}

impl std::fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("port", &self.port)
            .finish()
    }
}

impl DbConfig {
    /// Read `DB_HOST`, `DB_USER`, `DB_PASSWORD`, `DB_NAME` and `DB_PORT`.
    pub fn from_env() -> Configured<Self> {
        let [host, user, password, name, port] =
            require_vars(["DB_HOST", "DB_USER", "DB_PASSWORD", "DB_NAME", "DB_PORT"])?;
        Ok(Self {
            host,
            user,
            password,
            name,
            port,
        })
    }

    /// Builds the PostgreSQL connection URL
    pub fn url(&self) -> String {
        let user = utf8_percent_encode(&self.user, USERINFO);
        let password = utf8_percent_encode(&self.password, USERINFO);
        format!(
            "postgresql://{user}:{password}@{}:{}/{}",
            self.host, self.port, self.name
        )
    }
}
