//! Runtime configuration from environment variables and the command line.

use std::env;
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

use crate::storage::{MemoryOnly, PersistenceMode};

pub const DEFAULT_BIND: &str = "0.0.0.0:5000";
pub const DEFAULT_ACCOUNTS_FILE: &str = "accounts.json";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid bind address {value}: {source}")]
    InvalidBind {
        value: String,
        source: AddrParseError,
    },

    #[error("Usage: atm-server [accounts.json]")]
    Usage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtmConfig {
    /// `ATM_BIND`
    pub bind: SocketAddr,
    /// `ATM_ACCOUNTS_FILE`, or the first positional argument
    pub accounts_file: PathBuf,
    /// `ATM_PERSIST`; when off nothing touches the disk
    pub persist: bool,
    /// `ATM_LOG_JSON`
    pub log_json: bool,
}

impl AtmConfig {
    /// Read the process environment; `args` includes the program name
    pub fn from_env(args: &[String]) -> Result<Self, ConfigError> {
        Self::from_lookup(args, |name| env::var(name).ok())
    }

    pub fn from_lookup<F>(args: &[String], lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let positional = match args {
            [] | [_] => None,
            [_, file] => Some(PathBuf::from(file)),
            _ => return Err(ConfigError::Usage),
        };

        let bind_value = lookup("ATM_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_value
            .parse()
            .map_err(|source| ConfigError::InvalidBind {
                value: bind_value.clone(),
                source,
            })?;

        let accounts_file = positional
            .or_else(|| lookup("ATM_ACCOUNTS_FILE").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ACCOUNTS_FILE));

        Ok(Self {
            bind,
            accounts_file,
            persist: flag(lookup("ATM_PERSIST"), true),
            log_json: flag(lookup("ATM_LOG_JSON"), false),
        })
    }

    pub fn persistence(&self) -> PersistenceMode {
        if self.persist {
            PersistenceMode::file(&self.accounts_file)
        } else {
            PersistenceMode::Memory(MemoryOnly)
        }
    }
}

fn flag(value: Option<String>, default: bool) -> bool {
    value
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}
