//! Loading configuration files from disk.

use std::io::Write;
use std::time::Duration;

use resilient_call::client::{Operation, OperationProfiles};
use resilient_call::config::{load_config, ConfigError, LogFormat, ResilienceConfig, ValidationError};
use resilient_call::resilience::RetryPolicy;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"
        [default]
        max_retries = 5
        base_delay_ms = 250
        max_delay_ms = 4000
        jitter_ratio = 0.1
        deadline_ms = 30000

        [operations.generate_image]
        max_retries = 1
        base_delay_ms = 3000

        [observability]
        log_level = "resilient_call=debug,info"
        log_format = "json"
        metrics_enabled = false
        "#,
    );

    let config = load_config(file.path()).unwrap();

    let policy = config.default.to_policy();
    assert_eq!(policy.max_retries(), 5);
    assert_eq!(policy.base_delay(), Duration::from_millis(250));
    assert_eq!(policy.backoff().max(), Some(Duration::from_secs(4)));
    assert_eq!(policy.deadline(), Some(Duration::from_secs(30)));

    let profiles = config.operations.to_profiles();
    assert_eq!(profiles.policy(Operation::GenerateImage), &RetryPolicy::from_millis(1, 3000));
    assert_eq!(profiles.policy(Operation::StorageUpload), &RetryPolicy::from_millis(2, 1000));

    assert_eq!(config.observability.log_format, LogFormat::Json);
    assert!(!config.observability.metrics_enabled);
}

#[test]
fn test_empty_file_gives_builtin_profiles() {
    let file = write_config("");

    let config = load_config(file.path()).unwrap();

    assert_eq!(config, ResilienceConfig::default());
    assert_eq!(config.operations.to_profiles(), OperationProfiles::default());
}

#[test]
fn test_invalid_values_are_all_reported() {
    let file = write_config(
        r#"
        [operations.auth]
        max_retries = 1000

        [operations.storage_upload]
        base_delay_ms = 500
        max_delay_ms = 100

        [observability]
        log_level = "resilient_call=loud"
        "#,
    );

    let err = load_config(file.path()).unwrap_err();

    let errors = match err {
        ConfigError::Validation(errors) => errors,
        other => panic!("expected validation error, got {other}"),
    };
    assert_eq!(errors.len(), 3, "{errors:?}");
    assert!(matches!(errors[0], ValidationError::TooManyRetries { value: 1000, .. }));
    assert!(matches!(errors[1], ValidationError::CapBelowBase { max_delay_ms: 100, .. }));
    assert!(matches!(errors[2], ValidationError::InvalidLogLevel { .. }));
}

#[test]
fn test_unknown_log_format_is_parse_error() {
    let file = write_config("[observability]\nlog_format = \"xml\"\n");

    let err = load_config(file.path()).unwrap_err();

    assert!(matches!(err, ConfigError::Parse(_)), "{err}");
}
