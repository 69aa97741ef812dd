//! Environment-sourced configuration.

pub mod app;
pub mod backends;
pub mod db;

pub use app::Config;

use std::env;
use std::fmt;

use crate::error::AppError;

/// Names of required environment variables that were absent or empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingConfig(pub Vec<&'static str>);

impl fmt::Display for MissingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing environment variables: {}", self.0.join(", "))
    }
}

impl std::error::Error for MissingConfig {}

/// A backend's configuration, or the variables that prevented building it.
pub type Configured<T> = Result<T, MissingConfig>;

/// Read a variable, treating empty values as absent.
pub(crate) fn opt_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Read several required variables at once, collecting every missing name.
pub(crate) fn require_vars<const N: usize>(
    names: [&'static str; N],
) -> Result<[String; N], MissingConfig> {
    let values = names.map(opt_var);
    let missing: Vec<&'static str> = names
        .iter()
        .zip(values.iter())
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(MissingConfig(missing));
    }
    Ok(values.map(Option::unwrap_or_default))
}

/// Parse an optional numeric variable, falling back to `default` when unset.
pub(crate) fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match opt_var(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|_| {
            AppError::config(format!("{name} has an invalid value '{raw}'"))
        }),
    }
}
