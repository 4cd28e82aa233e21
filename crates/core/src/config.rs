use std::env;
use std::str::FromStr;

/// Env var naming the active profile prefix.
pub const PROFILE_ENV: &str = "AWSWRAP_PROFILE";

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "loaded .env");
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Profile-aware environment lookup.
///
/// When the profile is `PROD`, every key is first looked up as
/// `PROD_{KEY}`, falling back to the bare `{KEY}`. An empty profile reads
/// bare keys only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvProfile {
    prefix: String,
}

impl EnvProfile {
    /// Profile named by `AWSWRAP_PROFILE` (upper-cased), or the default profile.
    pub fn from_env() -> Self {
        Self::named(&env_opt(PROFILE_ENV).unwrap_or_default())
    }

    pub fn named(profile: &str) -> Self {
        Self {
            prefix: profile.to_uppercase(),
        }
    }

    pub fn label(&self) -> &str {
        if self.prefix.is_empty() {
            "default"
        } else {
            &self.prefix
        }
    }

    /// Read a profiled env var: tries `{PROFILE}_{KEY}` first, falls back to `{KEY}`.
    pub fn opt(&self, key: &str) -> Option<String> {
        if !self.prefix.is_empty() {
            if let Some(v) = env_opt(&format!("{}_{}", self.prefix, key)) {
                return Some(v);
            }
        }
        env_opt(key)
    }

    pub fn or(&self, key: &str, default: &str) -> String {
        self.opt(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a profiled value, falling back to `default` when unset or malformed.
    pub fn parse_or<T: FromStr>(&self, key: &str, default: T) -> T {
        self.opt(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// `true`/`1` enable, `false`/`0` disable, anything else keeps `default`.
    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        match self.opt(key).as_deref() {
            Some("true" | "1") => true,
            Some("false" | "0") => false,
            _ => default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Env-based tests must run serially to avoid interfering with each other.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for k in [
            PROFILE_ENV,
            "CORE_TEST_KEY",
            "DEV_CORE_TEST_KEY",
            "CORE_TEST_NUM",
            "CORE_TEST_FLAG",
        ] {
            env::remove_var(k);
        }
    }

    #[test]
    fn default_profile_reads_bare_keys() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();

        env::set_var("CORE_TEST_KEY", "bare");
        let profile = EnvProfile::from_env();
        assert_eq!(profile.label(), "default");
        assert_eq!(profile.opt("CORE_TEST_KEY").as_deref(), Some("bare"));

        clear_env();
    }

    #[test]
    fn prefixed_key_wins_and_falls_back() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();

        env::set_var(PROFILE_ENV, "dev");
        env::set_var("CORE_TEST_KEY", "bare");
        env::set_var("DEV_CORE_TEST_KEY", "dev-value");

        let profile = EnvProfile::from_env();
        assert_eq!(profile.label(), "DEV");
        assert_eq!(profile.or("CORE_TEST_KEY", "x"), "dev-value");

        env::remove_var("DEV_CORE_TEST_KEY");
        assert_eq!(profile.or("CORE_TEST_KEY", "x"), "bare");

        clear_env();
    }

    #[test]
    fn empty_values_count_as_unset() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();

        env::set_var("CORE_TEST_KEY", "");
        assert_eq!(EnvProfile::named("").or("CORE_TEST_KEY", "fallback"), "fallback");

        clear_env();
    }

    #[test]
    fn parse_and_bool_fallbacks() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();

        let profile = EnvProfile::named("");
        env::set_var("CORE_TEST_NUM", "not_a_number");
        assert_eq!(profile.parse_or("CORE_TEST_NUM", 7u32), 7);
        env::set_var("CORE_TEST_NUM", "2.5");
        assert!((profile.parse_or("CORE_TEST_NUM", 0.0f64) - 2.5).abs() < f64::EPSILON);

        env::set_var("CORE_TEST_FLAG", "1");
        assert!(profile.bool_or("CORE_TEST_FLAG", false));
        env::set_var("CORE_TEST_FLAG", "false");
        assert!(!profile.bool_or("CORE_TEST_FLAG", true));
        env::set_var("CORE_TEST_FLAG", "maybe");
        assert!(profile.bool_or("CORE_TEST_FLAG", true));

        clear_env();
    }
}
