//! Settings loaded through a named env profile.

use std::env;
use std::sync::Mutex;
use std::time::Duration;

use awswrap_athena::*;
use awswrap_core::EnvProfile;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for k in [
        "AWSWRAP_PROFILE",
        "STAGING_ATHENA_DATABASE",
        "STAGING_ATHENA_OUTPUT_LOCATION",
        "STAGING_ATHENA_POLLING_SECONDS",
        "STAGING_ATHENA_ERROR_AS_EXCEPTION",
        "ATHENA_DATABASE",
        "ATHENA_OUTPUT_LOCATION",
    ] {
        env::remove_var(k);
    }
}

#[test]
fn profile_selected_by_env_var() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env();

    env::set_var("AWSWRAP_PROFILE", "staging");
    env::set_var("ATHENA_DATABASE", "prod_db");
    env::set_var("STAGING_ATHENA_DATABASE", "staging_db");
    env::set_var("STAGING_ATHENA_OUTPUT_LOCATION", "s3://staging-results/q");
    env::set_var("STAGING_ATHENA_POLLING_SECONDS", "2");
    env::set_var("STAGING_ATHENA_ERROR_AS_EXCEPTION", "0");

    let settings = AthenaSettings::from_env();
    assert_eq!(settings.database.as_deref(), Some("staging_db"));
    assert_eq!(settings.output_location().as_deref(), Some("s3://staging-results/q/"));
    assert_eq!(settings.polling_interval, Duration::from_secs(2));
    assert!(!settings.error_as_exception);

    clear_env();
}

#[test]
fn unprofiled_keys_are_the_fallback() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env();

    env::set_var("ATHENA_OUTPUT_LOCATION", "s3://results");
    let settings = AthenaSettings::from_env_profiled(&EnvProfile::named("staging"));
    assert_eq!(settings.workplace.as_deref(), Some("s3://results"));
    assert_eq!(settings.database, None);

    clear_env();
}
