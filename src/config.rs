//! Configuration loading from environment.
//!
//! Reads the bot token and guild ids from environment variables and the
//! role mapping tables from an optional JSON file.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::directory::DEFAULT_API_BASE;
use crate::error::{Result, RoleSyncError};
use crate::fetcher::{RetryPolicy, DEFAULT_MAX_RETRIES};
use crate::mapping::MappingTables;
use crate::resolver::GuildIds;

pub const DEFAULT_RETRY_BUFFER_MS: u64 = 500;
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 10;
pub const DEFAULT_DATABASE_PATH: &str = "fcrp.db";
pub const DEFAULT_WEB_PORT: u16 = 3000;

/// Main configuration for the role sync service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Discord bot token.
    pub discord_token: String,
    /// Base URL of the Discord REST API.
    pub discord_api_base: String,
    /// Guilds consulted during resolution.
    pub guilds: GuildIds,
    /// Rate-limit retry behaviour.
    pub retry: RetryPolicy,
    /// Outgoing Discord request budget.
    pub requests_per_second: u32,
    /// SQLite database file.
    pub database_path: String,
    /// Port for the HTTP API.
    pub web_port: u16,
    /// Role and department mapping tables.
    pub mappings: MappingTables,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `DISCORD_BOT_TOKEN`: Discord bot token
    /// - `MAIN_GUILD_ID`: Guild whose roles map to forum roles
    /// - `DEPARTMENT_GUILD_ID`: Guild whose roles map to departments
    /// - `WHITELIST_GUILD_ID`: Community guild carrying the whitelist role
    /// - `WHITELIST_ROLE_ID`: Whitelist marker role
    ///
    /// Optional environment variables:
    /// - `DISCORD_API_BASE`: REST API base (default: https://discord.com/api/v10)
    /// - `RATE_LIMIT_MAX_RETRIES`: Retries on 429 (default: 3)
    /// - `RATE_LIMIT_BUFFER_MS`: Added to each retry-after (default: 500)
    /// - `DISCORD_REQUESTS_PER_SECOND`: Outgoing request budget (default: 10)
    /// - `DATABASE_PATH`: SQLite file (default: fcrp.db)
    /// - `WEB_PORT`: HTTP port (default: 3000)
    /// - `ROLE_MAPPING_PATH`: JSON file with role/department mappings
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| RoleSyncError::Config(format!("{} not set", key)))
        };

        let discord_token = required("DISCORD_BOT_TOKEN")?;
        let guilds = GuildIds {
            main_guild: required("MAIN_GUILD_ID")?,
            department_guild: required("DEPARTMENT_GUILD_ID")?,
            whitelist_guild: required("WHITELIST_GUILD_ID")?,
            whitelist_role: required("WHITELIST_ROLE_ID")?.into(),
        };

        let discord_api_base =
            lookup("DISCORD_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let retry = RetryPolicy {
            max_retries: parse_or(&lookup, "RATE_LIMIT_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            buffer: Duration::from_millis(parse_or(
                &lookup,
                "RATE_LIMIT_BUFFER_MS",
                DEFAULT_RETRY_BUFFER_MS,
            )?),
        };

        let requests_per_second = parse_or(
            &lookup,
            "DISCORD_REQUESTS_PER_SECOND",
            DEFAULT_REQUESTS_PER_SECOND,
        )?;
        if requests_per_second == 0 {
            return Err(RoleSyncError::Config(
                "DISCORD_REQUESTS_PER_SECOND must be positive".to_string(),
            ));
        }

        let database_path =
            lookup("DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string());
        let web_port = parse_or(&lookup, "WEB_PORT", DEFAULT_WEB_PORT)?;

        let mappings = match lookup("ROLE_MAPPING_PATH") {
            Some(path) => MappingTables::from_file(&path)?,
            None => MappingTables::default(),
        };

        Ok(Self {
            discord_token,
            discord_api_base,
            guilds,
            retry,
            requests_per_second,
            database_path,
            web_port,
            mappings,
        })
    }
}

/// Parse an optional variable, falling back to `default` when unset.
///
/// A value that is set but malformed is an error rather than silently
/// replaced by the default.
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| RoleSyncError::Config(format!("{} has invalid value: {}", key, raw))),
    }
}
