use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Authenticated session carried inside the sealed session token
///
/// Deadlines are absolute instants. `None` is the zero value: an unset deadline
/// is always in the past, and an unset grace period start never opens a window.
/// Nothing derived from the deadlines is stored here; callers recompute usability
/// from the deadlines and the current instant on every request.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionState {
    pub provider_slug: String,
    pub provider_type: String,

    pub access_token: String,
    pub refresh_token: String,

    #[serde(with = "timestamp")]
    pub lifetime_deadline: Option<DateTime<Utc>>,
    #[serde(with = "timestamp")]
    pub refresh_deadline: Option<DateTime<Utc>>,
    #[serde(with = "timestamp")]
    pub valid_deadline: Option<DateTime<Utc>>,
    #[serde(with = "timestamp")]
    pub grace_period_start: Option<DateTime<Utc>>,

    pub email: String,
    pub user: String,
}

/// Time-to-live settings used to compute session deadlines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLifetimes {
    /// Hard ceiling on the whole session
    pub lifetime: Duration,
    /// How long a refresh token may be used to mint new access tokens
    pub refresh: Duration,
    /// How long an access token is trusted before it must be re-validated
    pub validation: Duration,
    /// Tolerance window after a failed refresh or validation
    pub grace_period: Duration,
}

impl Default for SessionLifetimes {
    fn default() -> Self {
        Self {
            lifetime: Duration::hours(720),
            refresh: Duration::hours(1),
            validation: Duration::minutes(1),
            grace_period: Duration::hours(3),
        }
    }
}

impl SessionState {
    /// Start building a session after a successful identity provider exchange
    #[must_use]
    pub fn builder() -> SessionStateBuilder {
        SessionStateBuilder::default()
    }

    /// Check if the absolute session lifetime has passed
    #[must_use]
    pub fn lifetime_period_expired(&self, now: DateTime<Utc>) -> bool {
        deadline_passed(self.lifetime_deadline, now)
    }

    /// Check if the refresh token may no longer be used
    #[must_use]
    pub fn refresh_period_expired(&self, now: DateTime<Utc>) -> bool {
        deadline_passed(self.refresh_deadline, now)
    }

    /// Check if the current access token needs re-validation
    #[must_use]
    pub fn validation_period_expired(&self, now: DateTime<Utc>) -> bool {
        deadline_passed(self.valid_deadline, now)
    }

    /// Check if a failure has opened a grace period
    #[must_use]
    pub fn grace_period_started(&self) -> bool {
        self.grace_period_start.is_some()
    }

    /// Check if `now` falls inside the grace window opened by the first failure
    ///
    /// The window is inclusive of its end: `now == start + window` is inside.
    #[must_use]
    pub fn is_within_grace_period(&self, window: Duration, now: DateTime<Utc>) -> bool {
        self.grace_period_start.is_some_and(|start| {
            start
                .checked_add_signed(window)
                .is_none_or(|grace_end| now <= grace_end)
        })
    }

    /// Open the grace period at `now` unless one is already running
    ///
    /// Returns `true` if this call started it.
    pub fn start_grace_period(&mut self, now: DateTime<Utc>) -> bool {
        if self.grace_period_start.is_some() {
            return false;
        }
        self.grace_period_start = Some(now);
        true
    }

    pub fn clear_grace_period(&mut self) {
        self.grace_period_start = None;
    }

    /// Apply the result of a successful token refresh
    ///
    /// Rewrites the tokens, advances the refresh and validation deadlines and
    /// closes any running grace period. The lifetime deadline is never moved.
    pub fn record_refresh(
        &mut self,
        access_token: String,
        refresh_token: Option<String>,
        now: DateTime<Utc>,
        lifetimes: &SessionLifetimes,
    ) {
        self.access_token = access_token;
        if let Some(refresh_token) = refresh_token {
            self.refresh_token = refresh_token;
        }
        self.refresh_deadline = Some(extend(now, lifetimes.refresh));
        self.valid_deadline = Some(extend(now, lifetimes.validation));
        self.clear_grace_period();
    }

    /// Apply the result of a successful access token validation
    pub fn record_validation(&mut self, now: DateTime<Utc>, lifetimes: &SessionLifetimes) {
        self.valid_deadline = Some(extend(now, lifetimes.validation));
        self.clear_grace_period();
    }
}

// Tokens are credentials, keep them out of logs
impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("provider_slug", &self.provider_slug)
            .field("provider_type", &self.provider_type)
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &redact(&self.refresh_token))
            .field("lifetime_deadline", &self.lifetime_deadline)
            .field("refresh_deadline", &self.refresh_deadline)
            .field("valid_deadline", &self.valid_deadline)
            .field("grace_period_start", &self.grace_period_start)
            .field("email", &self.email)
            .field("user", &self.user)
            .finish()
    }
}

/// Builder for a freshly authenticated [`SessionState`]
#[derive(Clone, Default)]
pub struct SessionStateBuilder {
    provider_slug: String,
    provider_type: String,
    access_token: String,
    refresh_token: String,
    email: String,
    user: String,
}

impl SessionStateBuilder {
    #[must_use]
    pub fn provider(mut self, slug: &str, provider_type: &str) -> Self {
        self.provider_slug = slug.to_string();
        self.provider_type = provider_type.to_string();
        self
    }

    #[must_use]
    pub fn tokens(mut self, access_token: &str, refresh_token: &str) -> Self {
        self.access_token = access_token.to_string();
        self.refresh_token = refresh_token.to_string();
        self
    }

    #[must_use]
    pub fn identity(mut self, email: &str, user: &str) -> Self {
        self.email = email.to_string();
        self.user = user.to_string();
        self
    }

    /// Build the session with every deadline measured from `now`
    #[must_use]
    pub fn build(self, now: DateTime<Utc>, lifetimes: &SessionLifetimes) -> SessionState {
        SessionState {
            provider_slug: self.provider_slug,
            provider_type: self.provider_type,
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            lifetime_deadline: Some(extend(now, lifetimes.lifetime)),
            refresh_deadline: Some(extend(now, lifetimes.refresh)),
            valid_deadline: Some(extend(now, lifetimes.validation)),
            grace_period_start: None,
            email: self.email,
            user: self.user,
        }
    }
}

fn deadline_passed(deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    deadline.is_none_or(|deadline| now > deadline)
}

/// `now + ttl`, saturating at the representable range
fn extend(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    now.checked_add_signed(ttl).unwrap_or(if ttl < Duration::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}

fn redact(token: &str) -> &'static str {
    if token.is_empty() {
        ""
    } else {
        "<redacted>"
    }
}

/// Serde adapter writing instants as `[seconds, nanoseconds]`
///
/// Covers the full chrono range without precision loss, and keeps `None`
/// distinct from every real instant.
mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value
            .map(|instant| (instant.timestamp(), instant.timestamp_subsec_nanos()))
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let Some((secs, nanos)) = Option::<(i64, u32)>::deserialize(deserializer)? else {
            return Ok(None);
        };
        DateTime::from_timestamp(secs, nanos)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {secs}s {nanos}ns")))
    }
}
