//! Client configuration.
//!
//! A [`ClientConfig`] is plain data: deserialize it from your own config file
//! or read it from the process environment with [`ClientConfig::from_env`].

use serde::Deserialize;

use crate::error::{RedmineError, RedmineResult};
use crate::format::MimeFormat;

pub const ENV_HOST: &str = "REDMINE_HOST";
pub const ENV_FORMAT: &str = "REDMINE_FORMAT";
pub const ENV_API_KEY: &str = "REDMINE_API_KEY";
pub const ENV_IMPERSONATE: &str = "REDMINE_IMPERSONATE";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub host: String,
    #[serde(default)]
    pub format: MimeFormat,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Login of the user to act as (admin API keys only).
    #[serde(default)]
    pub impersonate: Option<String>,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, format: MimeFormat) -> Self {
        Self {
            host: host.into(),
            format,
            api_key: None,
            impersonate: None,
        }
    }

    pub fn from_env() -> RedmineResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the same variables as [`from_env`](Self::from_env) through
    /// `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> RedmineResult<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let host = var(ENV_HOST)
            .ok_or_else(|| RedmineError::InvalidConfig(format!("{ENV_HOST} is not set")))?;
        let format = match var(ENV_FORMAT) {
            Some(format) => format.parse()?,
            None => MimeFormat::default(),
        };
        Ok(Self {
            host,
            format,
            api_key: var(ENV_API_KEY),
            impersonate: var(ENV_IMPERSONATE),
        })
    }
}
