//! Role fetching with bounded retry on Discord rate limits.

use std::sync::Arc;
use std::time::Duration;

use crate::directory::{GuildDirectory, MemberLookup};
use crate::error::{Result, RoleSyncError};
use crate::roles::ExternalRoleId;

/// Default number of rate-limit retries before giving up.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay added on top of the announced retry-after.
pub const DEFAULT_RETRY_BUFFER: Duration = Duration::from_millis(500);

/// How rate-limit signals are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt. Each 429 consumes one.
    pub max_retries: u32,
    /// Added to every announced delay.
    pub buffer: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            buffer: DEFAULT_RETRY_BUFFER,
        }
    }
}

/// Fetches a member's role ids from one guild at a time.
pub struct RoleFetcher {
    directory: Arc<dyn GuildDirectory>,
    policy: RetryPolicy,
}

impl RoleFetcher {
    pub fn new(directory: Arc<dyn GuildDirectory>, policy: RetryPolicy) -> Self {
        Self { directory, policy }
    }

    /// Fetch role ids, surfacing every failure.
    ///
    /// `NotMember` yields an empty list. Each rate-limit signal sleeps for the
    /// announced delay plus the policy buffer and re-issues the same request;
    /// once `max_retries` signals have been absorbed the next one fails with
    /// `ExternalServiceUnavailable`.
    pub async fn try_fetch_roles(
        &self,
        guild_id: &str,
        user_id: &str,
    ) -> Result<Vec<ExternalRoleId>> {
        let mut retries = 0u32;

        loop {
            match self.directory.member_roles(guild_id, user_id).await? {
                MemberLookup::Roles(roles) => return Ok(roles),
                MemberLookup::NotMember => {
                    tracing::debug!(guild_id, user_id, "User is not a guild member");
                    return Ok(Vec::new());
                }
                MemberLookup::RateLimited { retry_after } => {
                    if retries >= self.policy.max_retries {
                        tracing::warn!(
                            guild_id,
                            user_id,
                            retries,
                            "Rate limit retries exhausted"
                        );
                        return Err(RoleSyncError::ExternalServiceUnavailable(format!(
                            "still rate limited after {} retries",
                            retries
                        )));
                    }
                    retries += 1;

                    let delay = Duration::try_from_secs_f64(retry_after)
                        .ok()
                        .and_then(|d| d.checked_add(self.policy.buffer))
                        .ok_or_else(|| {
                            RoleSyncError::ExternalServiceUnavailable(format!(
                                "unusable retry-after hint: {}",
                                retry_after
                            ))
                        })?;
                    tracing::warn!(
                        guild_id,
                        user_id,
                        retry_count = retries,
                        delay_ms = delay.as_millis() as u64,
                        "Rate limited, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Fetch role ids, failing soft.
    ///
    /// Any error (unreachable service, malformed response, exhausted retries)
    /// is logged and reported as an empty list.
    pub async fn fetch_roles(&self, guild_id: &str, user_id: &str) -> Vec<ExternalRoleId> {
        match self.try_fetch_roles(guild_id, user_id).await {
            Ok(roles) => roles,
            Err(e) => {
                tracing::warn!(error = %e, guild_id, user_id, "Failed to fetch Discord roles");
                Vec::new()
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Scripted, ScriptedDirectory};
    use super::*;

    fn fetcher(dir: Arc<ScriptedDirectory>, max_retries: u32) -> RoleFetcher {
        RoleFetcher::new(
            dir,
            RetryPolicy {
                max_retries,
                buffer: Duration::from_millis(500),
            },
        )
    }

    fn limited(secs: f64) -> Scripted {
        Scripted::Lookup(MemberLookup::RateLimited { retry_after: secs })
    }

    #[tokio::test]
    async fn returns_roles_on_success() {
        let dir = Arc::new(ScriptedDirectory::new().with_roles("g", "u", &["1", "2"]));
        let roles = fetcher(dir.clone(), 3).fetch_roles("g", "u").await;
        assert_eq!(roles, vec![ExternalRoleId::new("1"), ExternalRoleId::new("2")]);
        assert_eq!(dir.call_count(), 1);
    }

    #[tokio::test]
    async fn not_member_is_empty() {
        let dir = Arc::new(ScriptedDirectory::new());
        let roles = fetcher(dir, 3).try_fetch_roles("g", "u").await.unwrap();
        assert!(roles.is_empty());
    }

    #[tokio::test]
    async fn outage_fails_soft() {
        let dir = Arc::new(ScriptedDirectory::new().with_roles("g", "u", &["1"]));
        dir.push("g", "u", Scripted::Unavailable);
        let f = fetcher(dir.clone(), 3);

        assert!(f.fetch_roles("g", "u").await.is_empty());
        // Outages are not retried.
        assert_eq!(dir.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_waits_then_retries_once() {
        let dir = Arc::new(ScriptedDirectory::new().with_roles("g", "u", &["7"]));
        dir.push("g", "u", limited(2.0));

        let start = tokio::time::Instant::now();
        let roles = fetcher(dir.clone(), 3).fetch_roles("g", "u").await;

        assert_eq!(roles, vec![ExternalRoleId::new("7")]);
        let calls = dir.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].2, start);
        assert!(calls[1].2 - calls[0].2 >= Duration::from_millis(2500));
    }

    #[tokio::test(start_paused = true)]
    async fn second_rate_limit_triggers_second_wait() {
        let dir = Arc::new(ScriptedDirectory::new().with_roles("g", "u", &["7"]));
        dir.push("g", "u", limited(2.0));
        dir.push("g", "u", limited(1.0));

        let roles = fetcher(dir.clone(), 3).fetch_roles("g", "u").await;

        assert_eq!(roles.len(), 1);
        let calls = dir.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[1].2 - calls[0].2 >= Duration::from_millis(2500));
        assert!(calls[2].2 - calls[1].2 >= Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_are_unavailable() {
        let dir = Arc::new(ScriptedDirectory::new().with_roles("g", "u", &["7"]));
        for _ in 0..3 {
            dir.push("g", "u", limited(0.1));
        }

        let err = fetcher(dir.clone(), 2)
            .try_fetch_roles("g", "u")
            .await
            .unwrap_err();

        assert!(matches!(err, RoleSyncError::ExternalServiceUnavailable(_)));
        // One initial attempt plus two retries.
        assert_eq!(dir.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_fail_soft() {
        let dir = Arc::new(ScriptedDirectory::new());
        dir.push("g", "u", limited(0.1));
        dir.push("g", "u", limited(0.1));

        let roles = fetcher(dir.clone(), 1).fetch_roles("g", "u").await;
        assert!(roles.is_empty());
        assert_eq!(dir.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn oversized_retry_after_fails_soft() {
        let dir = Arc::new(ScriptedDirectory::new().with_roles("g", "u", &["7"]));
        dir.push("g", "u", limited(1e30));
        let f = fetcher(dir.clone(), 3);

        assert!(f.fetch_roles("g", "u").await.is_empty());
        assert_eq!(dir.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_retry_after_is_unavailable() {
        let dir = Arc::new(ScriptedDirectory::new());
        dir.push("g", "u", limited(f64::NAN));
        dir.push("g", "u", limited(-1.0));
        let f = fetcher(dir, 3);

        for _ in 0..2 {
            assert!(matches!(
                f.try_fetch_roles("g", "u").await,
                Err(RoleSyncError::ExternalServiceUnavailable(_))
            ));
        }
    }

    #[test]
    fn default_policy_is_bounded() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.buffer, Duration::from_millis(500));
    }
}
