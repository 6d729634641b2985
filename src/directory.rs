//! Discord guild membership lookups.
//!
//! One call is one round trip. Rate-limit signals are reported to the caller
//! as data; retrying is the job of [`crate::fetcher::RoleFetcher`].

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::{Quota, RateLimiter as GovRateLimiter};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::error::{Result, RoleSyncError};
use crate::roles::ExternalRoleId;

/// Default Discord REST base.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Fallback delay when a 429 carries no usable retry hint.
const DEFAULT_RETRY_AFTER_SECS: f64 = 1.0;

/// Outcome of a single member lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberLookup {
    /// Member found, with role ids in the order Discord returned them.
    Roles(Vec<ExternalRoleId>),
    /// The user is not a member of the guild (or the guild is unknown).
    NotMember,
    /// Too many requests; wait this many seconds before retrying.
    RateLimited { retry_after: f64 },
}

/// A directory that can answer "which roles does this user hold in this guild".
#[async_trait]
pub trait GuildDirectory: Send + Sync {
    async fn member_roles(&self, guild_id: &str, user_id: &str) -> Result<MemberLookup>;
}

/// Rate limiter type alias.
type RateLimiter = GovRateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Guild member payload; only the fields we read.
#[derive(Debug, Deserialize)]
struct GuildMember {
    #[serde(default)]
    roles: Vec<String>,
}

/// Discord 429 payload.
#[derive(Debug, Deserialize)]
struct RateLimitBody {
    retry_after: f64,
}

/// Bot-token client for the Discord REST API.
pub struct DiscordDirectory {
    client: Client,
    api_base: String,
    bot_token: String,
    rate_limiter: Arc<RateLimiter>,
}

impl DiscordDirectory {
    /// Create a directory client paced at `requests_per_second`.
    pub fn new(
        api_base: impl Into<String>,
        bot_token: impl Into<String>,
        requests_per_second: u32,
    ) -> Result<Self> {
        let quota =
            Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN));

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| RoleSyncError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            rate_limiter: Arc::new(GovRateLimiter::direct(quota)),
        })
    }

    fn member_url(&self, guild_id: &str, user_id: &str) -> String {
        format!("{}/guilds/{}/members/{}", self.api_base, guild_id, user_id)
    }
}

#[async_trait]
impl GuildDirectory for DiscordDirectory {
    async fn member_roles(&self, guild_id: &str, user_id: &str) -> Result<MemberLookup> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(self.member_url(guild_id, user_id))
            .header("Authorization", format!("Bot {}", self.bot_token))
            .send()
            .await
            .map_err(|e| {
                RoleSyncError::ExternalServiceUnavailable(format!("Member request failed: {}", e))
            })?;

        match response.status() {
            StatusCode::OK => {
                let member: GuildMember = response.json().await.map_err(|e| {
                    RoleSyncError::ExternalServiceUnavailable(format!(
                        "Failed to parse member response: {}",
                        e
                    ))
                })?;
                Ok(MemberLookup::Roles(
                    member.roles.into_iter().map(ExternalRoleId::new).collect(),
                ))
            }
            StatusCode::NOT_FOUND => Ok(MemberLookup::NotMember),
            StatusCode::TOO_MANY_REQUESTS => {
                let header_hint = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<f64>().ok());
                let body = response.text().await.unwrap_or_default();
                let retry_after = serde_json::from_str::<RateLimitBody>(&body)
                    .ok()
                    .map(|b| b.retry_after)
                    .or(header_hint)
                    .filter(|secs| secs.is_finite() && *secs >= 0.0)
                    .unwrap_or(DEFAULT_RETRY_AFTER_SECS);

                tracing::debug!(
                    guild_id,
                    user_id,
                    retry_after,
                    "Discord rate limited member lookup"
                );
                Ok(MemberLookup::RateLimited { retry_after })
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(RoleSyncError::ExternalServiceUnavailable(format!(
                    "Member lookup failed ({}): {}",
                    status, body
                )))
            }
        }
    }
}
