//! Control-plane configuration, loaded from environment variables the way
//! the teacher's `integrations::config::Config` does: an `impl Default`
//! reading `std::env::var(...).ok().and_then(...)` with a sane fallback per
//! field, grouped into nested sub-configs for each component (§10.3).

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },
}

fn parse_env<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(raw) => raw.parse::<T>().map_err(|e| ConfigError::InvalidValue {
            var,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Local,
    Oidc,
}

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Shared secret for `X-Hub-Signature-256` verification (§6). Absent
    /// means the intake endpoint must reject with 503 rather than process
    /// unauthenticated events (§4.C).
    pub shared_secret: Option<String>,
    /// Bearer token the build-worker callback must present (§4.D, §6).
    pub build_callback_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub registry_url: String,
    /// Build semaphore capacity (§4.D, §5), typically 1-2.
    pub semaphore_capacity: usize,
    pub build_deadline: Duration,
    /// Base URL of the out-of-process build worker API, when dispatched
    /// mode is used (§6).
    pub build_worker_api_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    pub worker_count: usize,
    pub queue_capacity: usize,
    pub sweep_interval: Duration,
    pub reconcile_step_deadline: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

#[derive(Debug, Clone)]
pub struct PreviewConfig {
    pub default_auto_sleep_minutes: u32,
    pub preview_domain_suffix: String,
}

#[derive(Debug, Clone)]
pub struct LogStreamConfig {
    pub allowed_origins: Vec<String>,
    pub buffer_capacity: usize,
    pub historical_line_cap: usize,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub mode: AuthMode,
    pub oidc_provider_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub webhook: WebhookConfig,
    pub build: BuildConfig,
    pub reconciler: ReconcilerConfig,
    pub preview: PreviewConfig,
    pub log_stream: LogStreamConfig,
    pub auth: AuthConfig,
    /// Dashboard read-cache TTL (§5).
    pub dashboard_cache_ttl: Duration,
    pub webhook_processing_deadline: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let semaphore_capacity = parse_env("BUILD_SEMAPHORE_CAPACITY", 2usize)?;
        let worker_count = parse_env("RECONCILER_WORKER_COUNT", 4usize)?;
        let queue_capacity = parse_env("RECONCILER_QUEUE_CAPACITY", 1000usize)?;
        let sweep_interval_secs = parse_env("RECONCILER_SWEEP_INTERVAL_SECS", 30u64)?;
        let default_auto_sleep_minutes = parse_env("PREVIEW_AUTO_SLEEP_MINUTES", 30u32)?;
        let log_buffer_capacity = parse_env("LOG_STREAM_BUFFER_CAPACITY", 100usize)?;
        let historical_line_cap = parse_env("LOG_STREAM_HISTORICAL_LINE_CAP", 10_000usize)?;
        let dashboard_cache_ttl_secs = parse_env("DASHBOARD_CACHE_TTL_SECS", 5u64)?;

        let mode = match std::env::var("AUTH_MODE").as_deref() {
            Ok("oidc") => AuthMode::Oidc,
            _ => AuthMode::Local,
        };

        let allowed_origins = std::env::var("WS_ALLOWED_ORIGINS")
            .ok()
            .map(|v| v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        Ok(Self {
            webhook: WebhookConfig {
                shared_secret: std::env::var("WEBHOOK_SHARED_SECRET").ok().filter(|s| !s.is_empty()),
                build_callback_token: std::env::var("BUILD_CALLBACK_TOKEN").ok().filter(|s| !s.is_empty()),
            },
            build: BuildConfig {
                registry_url: std::env::var("REGISTRY_URL").unwrap_or_else(|_| "registry.enclii.app".to_string()),
                semaphore_capacity,
                build_deadline: Duration::from_secs(parse_env("BUILD_DEADLINE_SECS", 1800u64)?),
                build_worker_api_url: std::env::var("BUILD_WORKER_API_URL").ok().filter(|s| !s.is_empty()),
            },
            reconciler: ReconcilerConfig {
                worker_count,
                queue_capacity,
                sweep_interval: Duration::from_secs(sweep_interval_secs),
                reconcile_step_deadline: Duration::from_secs(parse_env("RECONCILE_STEP_DEADLINE_SECS", 120u64)?),
                initial_backoff: Duration::from_secs(parse_env("RECONCILER_INITIAL_BACKOFF_SECS", 5u64)?),
                max_backoff: Duration::from_secs(parse_env("RECONCILER_MAX_BACKOFF_SECS", 300u64)?),
            },
            preview: PreviewConfig {
                default_auto_sleep_minutes,
                preview_domain_suffix: std::env::var("PREVIEW_DOMAIN_SUFFIX")
                    .unwrap_or_else(|_| "preview.enclii.app".to_string()),
            },
            log_stream: LogStreamConfig {
                allowed_origins,
                buffer_capacity: log_buffer_capacity,
                historical_line_cap,
            },
            auth: AuthConfig {
                mode,
                oidc_provider_url: std::env::var("OIDC_PROVIDER_URL").ok().filter(|s| !s.is_empty()),
            },
            dashboard_cache_ttl: Duration::from_secs(dashboard_cache_ttl_secs),
            webhook_processing_deadline: Duration::from_secs(parse_env("WEBHOOK_PROCESSING_DEADLINE_SECS", 30u64)?),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env().unwrap_or_else(|e| panic!("invalid control-plane configuration: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults_apply_when_env_unset() {
        std::env::remove_var("BUILD_SEMAPHORE_CAPACITY");
        std::env::remove_var("WEBHOOK_SHARED_SECRET");
        let config = Config::from_env().unwrap();
        assert_eq!(config.build.semaphore_capacity, 2);
        assert!(config.webhook.shared_secret.is_none());
    }

    #[test]
    #[serial]
    fn overrides_are_parsed() {
        std::env::set_var("BUILD_SEMAPHORE_CAPACITY", "5");
        std::env::set_var("AUTH_MODE", "oidc");
        let config = Config::from_env().unwrap();
        assert_eq!(config.build.semaphore_capacity, 5);
        assert_eq!(config.auth.mode, AuthMode::Oidc);
        std::env::remove_var("BUILD_SEMAPHORE_CAPACITY");
        std::env::remove_var("AUTH_MODE");
    }

    #[test]
    #[serial]
    fn invalid_numeric_value_is_rejected() {
        std::env::set_var("BUILD_SEMAPHORE_CAPACITY", "not-a-number");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: "BUILD_SEMAPHORE_CAPACITY", .. }));
        std::env::remove_var("BUILD_SEMAPHORE_CAPACITY");
    }
}
