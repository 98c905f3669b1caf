use ncli::cli::GlobalArgs;
use ncli::config::{Config, ConfigError, ConfigSource, FileConfigSource};
use serial_test::serial;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// A helper function to run a test with a temporary config file.
fn with_config_file<F>(yaml_content: &str, test_fn: F)
where
    F: FnOnce(PathBuf),
{
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", yaml_content).unwrap();
    let path = file.path().to_path_buf();
    test_fn(path);
}

#[test]
#[serial]
fn test_load_full_valid_config() {
    let yaml_content = r#"
logLevel: debug
timeoutSeconds: 5
http:
  timeoutSeconds: 3
  retries: 1
discord:
  webhookUrl: https://discord.com/api/webhooks/1/abc
  messageFormat: "**{{message}}**"
slack:
  webhookUrl: https://hooks.slack.com/triggers/T1/2/xyz
custom:
  targetUrl: https://example.com/hook
  payloadTemplate: '{"text":"{{message}}"}'
  method: put
  headers:
    Authorization: Bearer token
"#;

    with_config_file(yaml_content, |path| {
        let config = FileConfigSource::new(path).load().unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.timeout_seconds, 5);
        assert_eq!(config.http.timeout_seconds, 3);
        assert_eq!(config.http.retries, 1);

        let discord = config.discord.as_ref().unwrap();
        assert_eq!(discord.webhook_url, "https://discord.com/api/webhooks/1/abc");
        assert_eq!(discord.message_format, "**{{message}}**");

        let slack = config.slack.as_ref().unwrap();
        assert_eq!(slack.message_format, "");

        let custom = config.custom.as_ref().unwrap();
        assert_eq!(custom.method, "put");
        assert_eq!(
            custom.headers.get("Authorization").map(String::as_str),
            Some("Bearer token")
        );
    });
}

#[test]
#[serial]
fn test_missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_from(&dir.path().join("absent.yaml"), None).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
#[serial]
fn test_null_block_disables_channel() {
    let yaml_content = r#"
slack: null
discord:
  webhookUrl: https://discord.com/api/webhooks/1/abc
"#;

    with_config_file(yaml_content, |path| {
        let config = Config::load_from(&path, None).unwrap();
        assert!(config.slack.is_none());
        assert!(config.discord.is_some());
        assert!(config.custom.is_none());
    });
}

#[test]
#[serial]
fn test_env_overrides_file() {
    let yaml_content = r#"
timeoutSeconds: 5
slack:
  webhookUrl: https://hooks.slack.com/triggers/from-file
"#;

    with_config_file(yaml_content, |path| {
        std::env::set_var("N_CLI_TIMEOUTSECONDS", "2");
        std::env::set_var("N_CLI_SLACK__WEBHOOKURL", "https://hooks.slack.com/triggers/from-env");
        std::env::set_var("N_CLI_HTTP__RETRIES", "7");

        let result = Config::load_from(&path, None);

        std::env::remove_var("N_CLI_TIMEOUTSECONDS");
        std::env::remove_var("N_CLI_SLACK__WEBHOOKURL");
        std::env::remove_var("N_CLI_HTTP__RETRIES");

        let config = result.unwrap();
        assert_eq!(config.timeout_seconds, 2);
        assert_eq!(config.http.retries, 7);
        assert_eq!(
            config.slack.unwrap().webhook_url,
            "https://hooks.slack.com/triggers/from-env"
        );
    });
}

#[test]
#[serial]
fn test_cli_overrides_file() {
    with_config_file("logLevel: debug\n", |path| {
        let args = GlobalArgs {
            config: Some(path.clone()),
            log_level: Some("trace".to_string()),
        };
        let source = FileConfigSource::from_args(&args).unwrap();
        assert_eq!(source.path(), path.as_path());

        let config = source.load().unwrap();
        assert_eq!(config.log_level, "trace");
    });
}

#[test]
#[serial]
fn test_malformed_file_is_an_error() {
    with_config_file("timeoutSeconds: [not, a, number]\n", |path| {
        let err = Config::load_from(&path, None).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    });
}

#[test]
#[serial]
fn test_file_edits_apply_to_next_load() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "timeoutSeconds: 4\n").unwrap();
    let source = FileConfigSource::new(file.path());
    assert_eq!(source.load().unwrap().timeout_seconds, 4);

    std::fs::write(file.path(), "timeoutSeconds: 9\n").unwrap();
    assert_eq!(source.load().unwrap().timeout_seconds, 9);
}
