use std::time::Duration;

use awswrap_core::EnvProfile;
use serde::Serialize;

/// Region used when neither `ATHENA_REGION` nor `AWS_REGION` is set.
pub const DEFAULT_REGION: &str = "ap-northeast-1";

const DEFAULT_POLLING_SECONDS: f64 = 10.0;
const DEFAULT_TIMEOUT_SECONDS: f64 = 60.0;

// ── TransportConfig ──────────────────────────────────────────────

/// Transport settings handed to the AWS SDK clients.
///
/// Derived from [`AthenaSettings`] by [`AthenaSettings::rebuild`]; never
/// updated behind the caller's back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransportConfig {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Retries after the first attempt; 0 disables retrying.
    pub max_attempts: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECONDS),
            read_timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECONDS),
            max_attempts: 0,
        }
    }
}

// ── AthenaSettings ───────────────────────────────────────────────

/// Configuration for the query runner.
///
/// Fields are plain data. After mutating `connect_timeout`, `read_timeout`
/// or `max_attempts`, call [`rebuild`](Self::rebuild) to refresh the derived
/// [`TransportConfig`].
#[derive(Debug, Clone, Serialize)]
pub struct AthenaSettings {
    /// Named AWS credential profile.
    pub profile: Option<String>,
    pub region: String,
    /// Default database for queries that do not name one.
    pub database: Option<String>,
    /// S3 prefix Athena writes results to.
    pub workplace: Option<String>,
    pub workgroup: Option<String>,
    /// Sleep between poll cycles.
    pub polling_interval: Duration,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub max_attempts: u32,
    /// Abort the batch on the first failed query instead of yielding `None`.
    pub error_as_exception: bool,
    /// Treat a non-empty statement message as an error (needs `error_as_exception`).
    pub non_query_message_as_exception: bool,
    #[serde(skip)]
    transport: TransportConfig,
}

impl Default for AthenaSettings {
    fn default() -> Self {
        let transport = TransportConfig::default();
        Self {
            profile: None,
            region: DEFAULT_REGION.to_string(),
            database: None,
            workplace: None,
            workgroup: None,
            polling_interval: Duration::from_secs_f64(DEFAULT_POLLING_SECONDS),
            connect_timeout: transport.connect_timeout,
            read_timeout: transport.read_timeout,
            max_attempts: transport.max_attempts,
            error_as_exception: true,
            non_query_message_as_exception: true,
            transport,
        }
    }
}

impl AthenaSettings {
    /// Build settings from environment variables.
    ///
    /// Reads `AWSWRAP_PROFILE` to determine the profile prefix, then each
    /// `ATHENA_*` key (profiled first). `ATHENA_REGION` falls back to
    /// `AWS_REGION`, and the credential profile comes from `AWS_PROFILE`.
    pub fn from_env() -> Self {
        Self::from_env_profiled(&EnvProfile::from_env())
    }

    pub fn from_env_profiled(env: &EnvProfile) -> Self {
        let defaults = Self::default();
        let seconds = |key: &str, default: Duration| {
            Duration::try_from_secs_f64(env.parse_or(key, default.as_secs_f64()).max(0.0))
                .unwrap_or(default)
        };

        let mut settings = Self {
            profile: env.opt("AWS_PROFILE"),
            region: env
                .opt("ATHENA_REGION")
                .or_else(|| env.opt("AWS_REGION"))
                .unwrap_or(defaults.region),
            database: env.opt("ATHENA_DATABASE"),
            workplace: env.opt("ATHENA_OUTPUT_LOCATION"),
            workgroup: env.opt("ATHENA_WORKGROUP"),
            polling_interval: seconds("ATHENA_POLLING_SECONDS", defaults.polling_interval),
            connect_timeout: seconds("ATHENA_CONNECT_TIMEOUT_SECONDS", defaults.connect_timeout),
            read_timeout: seconds("ATHENA_READ_TIMEOUT_SECONDS", defaults.read_timeout),
            max_attempts: env.parse_or("ATHENA_MAX_ATTEMPTS", defaults.max_attempts),
            error_as_exception: env.bool_or("ATHENA_ERROR_AS_EXCEPTION", defaults.error_as_exception),
            non_query_message_as_exception: env.bool_or(
                "ATHENA_NON_QUERY_MESSAGE_AS_EXCEPTION",
                defaults.non_query_message_as_exception,
            ),
            transport: defaults.transport,
        };
        settings.rebuild();
        tracing::debug!(
            env_profile = env.label(),
            region = %settings.region,
            database = ?settings.database,
            "loaded athena settings from env"
        );
        settings
    }

    /// Refresh the derived transport config from the timeout/retry fields.
    pub fn rebuild(&mut self) {
        self.transport = TransportConfig {
            connect_timeout: self.connect_timeout,
            read_timeout: self.read_timeout,
            max_attempts: self.max_attempts,
        };
    }

    pub fn transport(&self) -> &TransportConfig {
        &self.transport
    }

    /// Replace the transport config, copying its values back into the
    /// timeout/retry fields.
    pub fn set_transport(&mut self, transport: TransportConfig) {
        self.connect_timeout = transport.connect_timeout;
        self.read_timeout = transport.read_timeout;
        self.max_attempts = transport.max_attempts;
        self.transport = transport;
    }

    /// Result prefix passed to Athena, always ending in `/`.
    pub fn output_location(&self) -> Option<String> {
        self.workplace.as_ref().map(|w| {
            if w.ends_with('/') {
                w.clone()
            } else {
                format!("{w}/")
            }
        })
    }

    // ── builder helpers ──

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_workplace(mut self, workplace: impl Into<String>) -> Self {
        self.workplace = Some(workplace.into());
        self
    }

    pub fn with_workgroup(mut self, workgroup: impl Into<String>) -> Self {
        self.workgroup = Some(workgroup.into());
        self
    }

    pub fn with_polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = interval;
        self
    }

    pub fn with_error_as_exception(mut self, enabled: bool) -> Self {
        self.error_as_exception = enabled;
        self
    }

    pub fn with_non_query_message_as_exception(mut self, enabled: bool) -> Self {
        self.non_query_message_as_exception = enabled;
        self
    }
}

// ── Tests ────────────────────────────────────────────────────────
